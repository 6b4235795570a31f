//! [Emulator] for executing LS-8 [programs](crate::program::Program).

use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use slog::{debug, o, trace, Discard, Logger};

use crate::alu::{self, AluError, Outcome};
use crate::error::EmulationError;
use crate::instruction::{Header, Instruction, JumpCondition, OpCode, Register, SP};
use crate::memory::Ram;
use crate::program::Program;

/// Initial value of the stack pointer.
pub const STACK_BASE: u8 = 0xF4;

/// Contains the execution environment of the LS-8 processor.
#[derive(Debug, Clone)]
pub struct Context {
    /// The Program Counter stores the address of the next instruction to be executed.
    pub pc: u8,

    /// The Instruction Register holds the opcode byte of the latest fetched instruction.
    pub ir: u8,

    /// Array containing values for all the eight general purpose registers.
    /// Register [R7](SP) is the stack pointer.
    pub r: [u8; 8],

    /// The comparison result flags stored in the FL register.
    pub flags: Flags,

    /// Number of instructions executed so far.
    pub cycles: u64,
}

impl Default for Context {
    fn default() -> Context {
        let mut r = [0; 8];
        r[SP.index()] = STACK_BASE;

        Context {
            pc: 0,
            ir: 0,
            r,
            flags: Flags::default(),
            cycles: 0,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PC: {:02X} | IR: {:02X} | FL: {:03b} | {}",
            self.pc,
            self.ir,
            self.flags.as_byte(),
            self.r.iter().map(|value| format!("{:02X}", value)).join(" "),
        )
    }
}

/// Represents the FL register.
///
/// Holds the result of the latest CMP instruction.
/// Used to determine if JEQ, JNE, JGT, JGE, JLT and JLE instructions result in a jump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Bit 0. The compared values were equal.
    pub equal: bool,
    /// Bit 1. The first compared value was greater.
    pub greater: bool,
    /// Bit 2. The first compared value was less.
    pub less: bool,
}

impl Flags {
    /// Clears all flags.
    fn zero(&mut self) {
        self.greater = false;
        self.equal = false;
        self.less = false;
    }

    /// Records the result of a comparison. Exactly one flag is set afterwards.
    pub fn set_comparison(&mut self, ordering: Ordering) {
        self.zero();

        match ordering {
            Ordering::Less => self.less = true,
            Ordering::Equal => self.equal = true,
            Ordering::Greater => self.greater = true,
        }
    }

    pub fn as_byte(&self) -> u8 {
        let mut byte = 0;

        if self.equal {
            byte |= 1 << 0;
        }

        if self.greater {
            byte |= 1 << 1;
        }

        if self.less {
            byte |= 1 << 2;
        }

        byte
    }

    pub fn from_byte(byte: u8) -> Flags {
        Flags {
            equal: byte & (1 << 0) != 0,
            greater: byte & (1 << 1) != 0,
            less: byte & (1 << 2) != 0,
        }
    }

    fn holds(&self, condition: JumpCondition) -> bool {
        match condition {
            JumpCondition::Always => true,
            JumpCondition::Equal => self.equal,
            JumpCondition::NotEqual => !self.equal,
            JumpCondition::Greater => self.greater,
            JumpCondition::GreaterOrEqual => self.equal || self.greater,
            JumpCondition::Less => self.less,
            JumpCondition::LessOrEqual => self.equal || self.less,
        }
    }
}

/// Interface to the output devices of the LS-8.
pub trait InputOutput {
    /// Called when a PRN instruction is executed.
    ///
    /// # Parameters
    /// - `value`: The value of the register specified in the instruction.
    fn print_number(&mut self, value: u8);

    /// Called when a PRA instruction is executed.
    ///
    /// # Parameters
    /// - `character`: The character whose code is stored in the addressed memory cell.
    fn print_char(&mut self, character: char);
}

impl<T: InputOutput + ?Sized> InputOutput for &mut T {
    fn print_number(&mut self, value: u8) {
        (**self).print_number(value)
    }

    fn print_char(&mut self, character: char) {
        (**self).print_char(character)
    }
}

/// What the execution loop does after an instruction has been emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    /// Proceed with the instruction the program counter points to.
    Continue,

    /// Move the program counter to the address.
    Jump(u8),

    /// Stop the execution.
    Halt,
}

/// Utility struct for implementing methods in the context of emulating a single instruction.
struct InstructionEmulationContext<'e, 'i, IO> {
    /// The emulator in whose context the instruction is being emulated.
    emulator: &'e mut Emulator<IO>,

    /// The instruction that we are currently emulating.
    instruction: &'i Instruction,

    /// The address the instruction was fetched from.
    address: u8,
}

impl<'e, 'i, IO> InstructionEmulationContext<'e, 'i, IO>
    where IO: InputOutput,
{
    fn register(&self, register: Register) -> u8 {
        self.emulator.context.r[register.index()]
    }

    fn set_register(&mut self, register: Register, value: u8) {
        self.emulator.context.r[register.index()] = value;
    }

    /// Returns the value of the register named by the first operand.
    fn first_operand(&self) -> u8 {
        self.register(self.instruction.first_register())
    }

    /// Sets the value of the register named by the first operand.
    fn set_first_operand(&mut self, value: u8) {
        self.set_register(self.instruction.first_register(), value);
    }

    /// Returns the value of the register named by the second operand.
    fn second_operand(&self) -> u8 {
        self.register(self.instruction.second_register())
    }

    /// Address of the instruction following the current one.
    fn next_address(&self) -> u8 {
        self.address.wrapping_add(self.instruction.len())
    }

    fn push_stack(&mut self, value: u8) -> Result<(), EmulationError> {
        let sp = self.register(SP);
        let heap_boundary = self.emulator.heap_boundary;

        let new_sp = match sp.checked_sub(1) {
            Some(new_sp) if new_sp as usize > heap_boundary => new_sp,
            _ => {
                return Err(EmulationError::StackOverflow {
                    address: self.address,
                    stack_pointer: sp,
                    heap_boundary,
                })
            }
        };

        self.set_register(SP, new_sp);
        self.emulator.memory.write(new_sp, value);

        Ok(())
    }

    fn pop_stack(&mut self) -> u8 {
        let sp = self.register(SP);
        let value = self.emulator.memory.read(sp);
        self.set_register(SP, sp.wrapping_add(1));

        value
    }

    /// Branch target for a jump instruction: the first operand if `condition` holds, otherwise
    /// the following instruction.
    fn jump_target(&self, condition: JumpCondition) -> u8 {
        if self.emulator.context.flags.holds(condition) {
            self.first_operand()
        } else {
            self.next_address()
        }
    }

    /// Execute the instruction.
    ///
    /// # Returns
    /// What the execution loop should do next, or the fatal condition the instruction raised.
    fn emulate(&mut self) -> Result<Control, EmulationError> {
        let control = match self.instruction.opcode {
            OpCode::NoOperation => Control::Continue,

            OpCode::Halt => Control::Halt,

            OpCode::LoadImmediate => {
                self.set_first_operand(self.instruction.operands[1]);
                Control::Continue
            },

            OpCode::Load => {
                let value = self.emulator.memory.read(self.second_operand());
                self.set_first_operand(value);
                Control::Continue
            },

            OpCode::Store => {
                let address = self.first_operand();
                let value = self.second_operand();
                self.emulator.memory.write(address, value);
                Control::Continue
            },

            OpCode::Push => {
                let value = self.first_operand();
                self.push_stack(value)?;
                Control::Continue
            },

            OpCode::Pop => {
                let value = self.pop_stack();
                self.set_first_operand(value);
                Control::Continue
            },

            OpCode::PrintNumber => {
                let value = self.first_operand();
                self.emulator.io.print_number(value);
                Control::Continue
            },

            OpCode::PrintAscii => {
                let code = self.emulator.memory.read(self.first_operand());
                self.emulator.io.print_char(char::from(code));
                Control::Continue
            },

            OpCode::Call => {
                let target = self.first_operand();
                self.push_stack(self.next_address())?;
                Control::Jump(target)
            },

            OpCode::Return => Control::Jump(self.pop_stack()),

            // Interrupts are not emulated.
            OpCode::Interrupt | OpCode::InterruptReturn => Control::Jump(self.next_address()),

            OpCode::Jump { condition } => Control::Jump(self.jump_target(condition)),

            OpCode::Alu(op) => {
                let a = self.first_operand();
                let b = self.second_operand();

                let outcome = alu::evaluate(op, a, b).map_err(|err| match err {
                    AluError::DivisionByZero => EmulationError::DivisionByZero {
                        address: self.address,
                    },
                })?;

                match outcome {
                    Outcome::Value(value) => self.set_first_operand(value),
                    Outcome::Comparison(ordering) => {
                        self.emulator.context.flags.set_comparison(ordering)
                    },
                }

                Control::Continue
            },
        };

        Ok(control)
    }
}

/// The emulator contains all neccessary context for executing an LS-8 program
/// and an interface for doing output.
pub struct Emulator<IO> {
    /// The memory of the emulated machine.
    /// Contains all the instructions and data required by the program as well as the stack.
    pub memory: Ram,

    /// The execution context, which includes the registers and flags of the CPU.
    pub context: Context,

    /// Interface for doing output operations.
    pub io: IO,

    /// True if the execution has been halted.
    pub halted: bool,

    heap_boundary: usize,

    logger: Logger,
}

impl<IO> Emulator<IO> where IO: InputOutput {
    /// Create a new emulator with `program` loaded into memory.
    ///
    /// # Parameters
    /// - `program`: The [Program] to execute.
    /// - `io`: An [output handler](InputOutput).
    ///
    /// # Returns
    /// A new [Emulator] instance.
    pub fn new(program: &Program, io: IO) -> Emulator<IO> {
        let mut memory = Ram::new();
        memory.load(program.as_bytes());

        Emulator {
            memory,
            context: Context::default(),
            io,
            halted: false,
            heap_boundary: program.heap_boundary(),
            logger: Logger::root(Discard, o!()),
        }
    }

    /// Replaces the logger. Every executed instruction is logged at trace level, halts and
    /// errors at debug level.
    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = logger.new(o!("stage" => "emulation"));
    }

    /// The first address not occupied by the loaded program.
    pub fn heap_boundary(&self) -> usize {
        self.heap_boundary
    }

    /// Decodes the instruction at the address pointed by the Program Counter register.
    ///
    /// # Errors
    /// Returns [EmulationError::UnknownOpcode] if the byte does not decode to an instruction.
    pub fn fetch(&self) -> Result<Instruction, EmulationError> {
        let pc = self.context.pc;
        let bytes = [
            self.memory.read(pc),
            self.memory.read(pc.wrapping_add(1)),
            self.memory.read(pc.wrapping_add(2)),
        ];

        Instruction::decode(&bytes).ok_or(EmulationError::UnknownOpcode {
            address: pc,
            opcode: bytes[0],
        })
    }

    /// Executes a single instruction fetched from `address`.
    ///
    /// Does not advance the `PC` register past the instruction or do anything else related to
    /// the instruction fetching. Instructions that position the program counter themselves
    /// still do so.
    ///
    /// # Errors
    /// Returns the fatal condition raised by the instruction.
    pub fn emulate_instruction(&mut self, address: u8, ins: &Instruction) -> Result<(), EmulationError> {
        let mut ctx = InstructionEmulationContext {
            emulator: self,
            instruction: ins,
            address,
        };

        match ctx.emulate()? {
            Control::Continue => (),
            Control::Jump(target) => self.context.pc = target,
            Control::Halt => {
                debug!(self.logger, "halt"; "address" => address, "cycles" => self.context.cycles);
                self.halted = true;
            },
        }

        Ok(())
    }

    /// Fetches the next instruction, advances the program counter if the instruction doesn't do
    /// it itself and executes the instruction.
    ///
    /// Does nothing once the emulator has halted.
    ///
    /// # Errors
    /// Returns the fatal condition raised by the instruction.
    pub fn step(&mut self) -> Result<(), EmulationError> {
        if self.halted {
            return Ok(());
        }

        let address = self.context.pc;

        let ins = self.fetch().map_err(|err| {
            debug!(self.logger, "fetch failed"; "error" => %err);
            err
        })?;

        self.context.ir = self.memory.read(address);

        if !Header::from_byte(self.context.ir).sets_pc {
            self.context.pc = address.wrapping_add(ins.len());
        }

        trace!(self.logger, "execute";
            "address" => address,
            "instruction" => %ins,
            "state" => %self.context);

        self.context.cycles += 1;

        self.emulate_instruction(address, &ins).map_err(|err| {
            debug!(self.logger, "execution failed"; "error" => %err);
            err
        })
    }

    /// Executes the program until it halts the execution or an error occurs.
    ///
    /// # Errors
    /// Returns the fatal condition that stopped the execution.
    pub fn run(&mut self) -> Result<(), EmulationError> {
        while !self.halted {
            self.step()?;
        }

        Ok(())
    }
}

/// A value written by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Written by PRN.
    Number(u8),
    /// Written by PRA.
    Char(char),
}

/// An output handler for testing purposes.
///
/// Appends printed values to an output buffer.
#[derive(Debug, Default)]
pub struct TestIo {
    output_buffer: Vec<Output>,
}

impl TestIo {
    pub fn new() -> TestIo {
        TestIo {
            output_buffer: Vec::new(),
        }
    }

    pub fn output(&self) -> &[Output] {
        &self.output_buffer[..]
    }

    pub fn into_output(self) -> Vec<Output> {
        self.output_buffer
    }

    /// The output as it would have appeared on the terminal.
    pub fn text(&self) -> String {
        self.output_buffer
            .iter()
            .map(|output| match output {
                Output::Number(value) => value.to_string(),
                Output::Char(character) => character.to_string(),
            })
            .join("")
    }
}

impl InputOutput for TestIo {
    fn print_number(&mut self, value: u8) {
        self.output_buffer.push(Output::Number(value));
    }

    fn print_char(&mut self, character: char) {
        self.output_buffer.push(Output::Char(character));
    }
}

/// An output handler that prints numbers and characters to the standard output without any
/// separators.
pub struct StdIo;

impl InputOutput for StdIo {
    fn print_number(&mut self, value: u8) {
        print!("{}", value);
    }

    fn print_char(&mut self, character: char) {
        print!("{}", character);
    }
}
