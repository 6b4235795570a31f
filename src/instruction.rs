//! Types for representing instructions and their parts.
//!
//! An LS-8 instruction is an opcode byte followed by zero, one or two operand bytes.
//! The opcode byte is laid out as `AABCDDDD`:
//!
//! - `AA`: number of operand bytes following the opcode.
//! - `B`: set for instructions handled by the ALU.
//! - `C`: set for instructions that position the program counter themselves.
//! - `DDDD`: index of the instruction inside its (`B`, `C`) bucket.

use std::fmt;

/// Describes the predicate for a (un)conditional jump instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpCondition {
    /// Unconditional jump. (`JMP`)
    Always,

    /// Jump if the [equal-flag](crate::emulator::Flags::equal) is set. (`JEQ`)
    Equal,

    /// Jump if the equal-flag is clear. (`JNE`)
    NotEqual,

    /// Jump if the [greater-flag](crate::emulator::Flags::greater) is set. (`JGT`)
    Greater,

    /// Jump if either the equal-flag or the greater-flag is set. (`JGE`)
    GreaterOrEqual,

    /// Jump if the [less-flag](crate::emulator::Flags::less) is set. (`JLT`)
    Less,

    /// Jump if either the equal-flag or the less-flag is set. (`JLE`)
    LessOrEqual,
}

/// Operations of the arithmetic and logic unit.
///
/// Binary operations combine the values of both operand registers, unary operations only
/// use the first one. See [crate::alu] for their semantics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Increment,
    Decrement,
    Compare,
    And,
    Not,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
}

/// Instructions of the LS-8 instruction architecture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpCode {
    /// Does nothing besides advancing the program counter.
    NoOperation,

    /// Stops the execution.
    Halt,

    /// Copies the immediate second operand into a register.
    LoadImmediate,

    /// Copies the memory cell addressed by the second register into the first register.
    Load,

    /// Copies the second register into the memory cell addressed by the first register.
    Store,

    /// Pushes the value of a register onto the stack.
    Push,

    /// Pops the top of the stack into a register.
    Pop,

    /// Prints the value of a register as a decimal number.
    PrintNumber,

    /// Prints the memory cell addressed by a register as a character.
    PrintAscii,

    /// Pushes the address of the next instruction and jumps to the address in a register.
    Call,

    /// Pops the return address pushed by [OpCode::Call] into the program counter.
    Return,

    /// Software interrupt. Interrupts are not emulated, so this behaves like a no-op.
    Interrupt,

    /// Return from an interrupt handler. Behaves like a no-op.
    InterruptReturn,

    /// Changes the value of the program counter to the address in a register if a condition is
    /// met.
    Jump {
        /// The condition that needs to be met in order for the jump to happen.
        condition: JumpCondition,
    },

    /// An operation executed by the ALU.
    Alu(AluOp),
}

/// The fields of an opcode byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Number of operand bytes following the opcode byte.
    pub operand_count: u8,

    /// Selects the ALU bucket.
    pub alu: bool,

    /// Set if the instruction positions the program counter itself.
    pub sets_pc: bool,

    /// Index of the instruction inside its bucket.
    pub index: u8,
}

impl Header {
    pub fn from_byte(byte: u8) -> Header {
        Header {
            operand_count: byte >> 6,
            alu: byte & 0b0010_0000 != 0,
            sets_pc: byte & 0b0001_0000 != 0,
            index: byte & 0b0000_1111,
        }
    }

    pub fn as_byte(&self) -> u8 {
        let mut byte = (self.operand_count << 6) | (self.index & 0b1111);

        if self.alu {
            byte |= 0b0010_0000;
        }

        if self.sets_pc {
            byte |= 0b0001_0000;
        }

        byte
    }
}

impl OpCode {
    /// Every opcode known to the LS-8, in encoding order.
    pub const ALL: [OpCode; 34] = [
        OpCode::Alu(AluOp::Add),
        OpCode::Alu(AluOp::Subtract),
        OpCode::Alu(AluOp::Multiply),
        OpCode::Alu(AluOp::Divide),
        OpCode::Alu(AluOp::Modulo),
        OpCode::Alu(AluOp::Increment),
        OpCode::Alu(AluOp::Decrement),
        OpCode::Alu(AluOp::Compare),
        OpCode::Alu(AluOp::And),
        OpCode::Alu(AluOp::Not),
        OpCode::Alu(AluOp::Or),
        OpCode::Alu(AluOp::Xor),
        OpCode::Alu(AluOp::ShiftLeft),
        OpCode::Alu(AluOp::ShiftRight),
        OpCode::Call,
        OpCode::Return,
        OpCode::Interrupt,
        OpCode::InterruptReturn,
        OpCode::Jump { condition: JumpCondition::Always },
        OpCode::Jump { condition: JumpCondition::Equal },
        OpCode::Jump { condition: JumpCondition::NotEqual },
        OpCode::Jump { condition: JumpCondition::Greater },
        OpCode::Jump { condition: JumpCondition::Less },
        OpCode::Jump { condition: JumpCondition::LessOrEqual },
        OpCode::Jump { condition: JumpCondition::GreaterOrEqual },
        OpCode::NoOperation,
        OpCode::Halt,
        OpCode::LoadImmediate,
        OpCode::Load,
        OpCode::Store,
        OpCode::Push,
        OpCode::Pop,
        OpCode::PrintNumber,
        OpCode::PrintAscii,
    ];

    /// Looks up the opcode registered for the (ALU, sets-PC, index) triple of `header`.
    ///
    /// Returns `None` if no opcode is registered for the triple or if the header claims more
    /// than two operand bytes.
    pub fn decode(header: &Header) -> Option<OpCode> {
        use self::AluOp::*;
        use self::JumpCondition::*;

        if header.operand_count > 2 {
            return None;
        }

        let opcode = match (header.alu, header.sets_pc, header.index) {
            (true, false, 0x0) => OpCode::Alu(Add),
            (true, false, 0x1) => OpCode::Alu(Subtract),
            (true, false, 0x2) => OpCode::Alu(Multiply),
            (true, false, 0x3) => OpCode::Alu(Divide),
            (true, false, 0x4) => OpCode::Alu(Modulo),
            (true, false, 0x5) => OpCode::Alu(Increment),
            (true, false, 0x6) => OpCode::Alu(Decrement),
            (true, false, 0x7) => OpCode::Alu(Compare),
            (true, false, 0x8) => OpCode::Alu(And),
            (true, false, 0x9) => OpCode::Alu(Not),
            (true, false, 0xA) => OpCode::Alu(Or),
            (true, false, 0xB) => OpCode::Alu(Xor),
            (true, false, 0xC) => OpCode::Alu(ShiftLeft),
            (true, false, 0xD) => OpCode::Alu(ShiftRight),

            (false, true, 0x0) => OpCode::Call,
            (false, true, 0x1) => OpCode::Return,
            (false, true, 0x2) => OpCode::Interrupt,
            (false, true, 0x3) => OpCode::InterruptReturn,
            (false, true, 0x4) => OpCode::Jump { condition: Always },
            (false, true, 0x5) => OpCode::Jump { condition: Equal },
            (false, true, 0x6) => OpCode::Jump { condition: NotEqual },
            (false, true, 0x7) => OpCode::Jump { condition: Greater },
            (false, true, 0x8) => OpCode::Jump { condition: Less },
            (false, true, 0x9) => OpCode::Jump { condition: LessOrEqual },
            (false, true, 0xA) => OpCode::Jump { condition: GreaterOrEqual },

            (false, false, 0x0) => OpCode::NoOperation,
            (false, false, 0x1) => OpCode::Halt,
            (false, false, 0x2) => OpCode::LoadImmediate,
            (false, false, 0x3) => OpCode::Load,
            (false, false, 0x4) => OpCode::Store,
            (false, false, 0x5) => OpCode::Push,
            (false, false, 0x6) => OpCode::Pop,
            (false, false, 0x7) => OpCode::PrintNumber,
            (false, false, 0x8) => OpCode::PrintAscii,

            _ => return None,
        };

        Some(opcode)
    }

    /// The canonical opcode byte header of this instruction.
    pub fn header(&self) -> Header {
        use self::AluOp::*;
        use self::JumpCondition::*;

        let (alu, sets_pc, index) = match self {
            OpCode::Alu(Add) => (true, false, 0x0),
            OpCode::Alu(Subtract) => (true, false, 0x1),
            OpCode::Alu(Multiply) => (true, false, 0x2),
            OpCode::Alu(Divide) => (true, false, 0x3),
            OpCode::Alu(Modulo) => (true, false, 0x4),
            OpCode::Alu(Increment) => (true, false, 0x5),
            OpCode::Alu(Decrement) => (true, false, 0x6),
            OpCode::Alu(Compare) => (true, false, 0x7),
            OpCode::Alu(And) => (true, false, 0x8),
            OpCode::Alu(Not) => (true, false, 0x9),
            OpCode::Alu(Or) => (true, false, 0xA),
            OpCode::Alu(Xor) => (true, false, 0xB),
            OpCode::Alu(ShiftLeft) => (true, false, 0xC),
            OpCode::Alu(ShiftRight) => (true, false, 0xD),

            OpCode::Call => (false, true, 0x0),
            OpCode::Return => (false, true, 0x1),
            OpCode::Interrupt => (false, true, 0x2),
            OpCode::InterruptReturn => (false, true, 0x3),
            OpCode::Jump { condition: Always } => (false, true, 0x4),
            OpCode::Jump { condition: Equal } => (false, true, 0x5),
            OpCode::Jump { condition: NotEqual } => (false, true, 0x6),
            OpCode::Jump { condition: Greater } => (false, true, 0x7),
            OpCode::Jump { condition: Less } => (false, true, 0x8),
            OpCode::Jump { condition: LessOrEqual } => (false, true, 0x9),
            OpCode::Jump { condition: GreaterOrEqual } => (false, true, 0xA),

            OpCode::NoOperation => (false, false, 0x0),
            OpCode::Halt => (false, false, 0x1),
            OpCode::LoadImmediate => (false, false, 0x2),
            OpCode::Load => (false, false, 0x3),
            OpCode::Store => (false, false, 0x4),
            OpCode::Push => (false, false, 0x5),
            OpCode::Pop => (false, false, 0x6),
            OpCode::PrintNumber => (false, false, 0x7),
            OpCode::PrintAscii => (false, false, 0x8),
        };

        Header {
            operand_count: self.operand_count(),
            alu,
            sets_pc,
            index,
        }
    }

    /// Number of operand bytes in the canonical encoding of this instruction.
    pub fn operand_count(&self) -> u8 {
        match self {
            OpCode::NoOperation
            | OpCode::Halt
            | OpCode::Return
            | OpCode::InterruptReturn => 0,

            OpCode::Push
            | OpCode::Pop
            | OpCode::PrintNumber
            | OpCode::PrintAscii
            | OpCode::Call
            | OpCode::Interrupt
            | OpCode::Jump { .. }
            | OpCode::Alu(AluOp::Increment)
            | OpCode::Alu(AluOp::Decrement)
            | OpCode::Alu(AluOp::Not) => 1,

            OpCode::LoadImmediate
            | OpCode::Load
            | OpCode::Store
            | OpCode::Alu(_) => 2,
        }
    }

    pub fn as_byte(&self) -> u8 {
        self.header().as_byte()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            OpCode::NoOperation => "NOP",
            OpCode::Halt => "HLT",
            OpCode::LoadImmediate => "LDI",
            OpCode::Load => "LD",
            OpCode::Store => "ST",
            OpCode::Push => "PUSH",
            OpCode::Pop => "POP",
            OpCode::PrintNumber => "PRN",
            OpCode::PrintAscii => "PRA",

            OpCode::Call => "CALL",
            OpCode::Return => "RET",
            OpCode::Interrupt => "INT",
            OpCode::InterruptReturn => "IRET",

            OpCode::Jump { condition } => match condition {
                JumpCondition::Always => "JMP",
                JumpCondition::Equal => "JEQ",
                JumpCondition::NotEqual => "JNE",
                JumpCondition::Greater => "JGT",
                JumpCondition::GreaterOrEqual => "JGE",
                JumpCondition::Less => "JLT",
                JumpCondition::LessOrEqual => "JLE",
            },

            OpCode::Alu(op) => match op {
                AluOp::Add => "ADD",
                AluOp::Subtract => "SUB",
                AluOp::Multiply => "MUL",
                AluOp::Divide => "DIV",
                AluOp::Modulo => "MOD",
                AluOp::Increment => "INC",
                AluOp::Decrement => "DEC",
                AluOp::Compare => "CMP",
                AluOp::And => "AND",
                AluOp::Not => "NOT",
                AluOp::Or => "OR",
                AluOp::Xor => "XOR",
                AluOp::ShiftLeft => "SHL",
                AluOp::ShiftRight => "SHR",
            },
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

/// The register reserved for the stack pointer.
pub const SP: Register = Register::R7;

impl Register {
    /// Interprets an operand byte as a register. Only the three lowest bits are significant.
    pub fn from_byte(byte: u8) -> Register {
        match byte & 0b111 {
            0 => Register::R0,
            1 => Register::R1,
            2 => Register::R2,
            3 => Register::R3,
            4 => Register::R4,
            5 => Register::R5,
            6 => Register::R6,
            _ => Register::R7,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Register::R0 => 0,
            Register::R1 => 1,
            Register::R2 => 2,
            Register::R3 => 3,
            Register::R4 => 4,
            Register::R5 => 5,
            Register::R6 => 6,
            Register::R7 => 7,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}", self.index())
    }
}

/// A decoded instruction: the opcode and the operand bytes that followed it in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,

    /// Number of operand bytes the opcode byte declared.
    pub operand_count: u8,

    /// The operand bytes. Cells beyond `operand_count` are zero.
    pub operands: [u8; 2],
}

impl Instruction {
    /// Creates an instruction in its canonical encoding.
    pub fn new(opcode: OpCode, operands: &[u8]) -> Instruction {
        let mut cells = [0; 2];

        for (cell, operand) in cells.iter_mut().zip(operands) {
            *cell = *operand;
        }

        Instruction {
            opcode,
            operand_count: opcode.operand_count(),
            operands: cells,
        }
    }

    /// Decodes the instruction starting at `bytes[0]`.
    ///
    /// Operand bytes missing from the end of `bytes` read as zero.
    /// Returns `None` if the opcode byte does not decode to a known instruction.
    pub fn decode(bytes: &[u8]) -> Option<Instruction> {
        let header = Header::from_byte(*bytes.first()?);
        let opcode = OpCode::decode(&header)?;

        let mut operands = [0; 2];

        for (i, cell) in operands.iter_mut().take(header.operand_count as usize).enumerate() {
            *cell = bytes.get(i + 1).copied().unwrap_or(0);
        }

        Some(Instruction {
            opcode,
            operand_count: header.operand_count,
            operands,
        })
    }

    /// Total length of the instruction in bytes, including the opcode byte.
    pub fn len(&self) -> u8 {
        self.operand_count + 1
    }

    /// The first operand interpreted as a register.
    pub fn first_register(&self) -> Register {
        Register::from_byte(self.operands[0])
    }

    /// The second operand interpreted as a register.
    pub fn second_register(&self) -> Register {
        Register::from_byte(self.operands[1])
    }

    /// The encoded bytes of the instruction, opcode byte first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = self.opcode.header();
        header.operand_count = self.operand_count;

        let mut bytes = vec![header.as_byte()];
        bytes.extend_from_slice(&self.operands[..self.operand_count as usize]);
        bytes
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;

        match (self.opcode, self.operand_count) {
            (_, 0) => Ok(()),
            (OpCode::LoadImmediate, _) => {
                write!(f, " {}, {}", self.first_register(), self.operands[1])
            }
            (_, 1) => write!(f, " {}", self.first_register()),
            (_, _) => write!(f, " {}, {}", self.first_register(), self.second_register()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields() {
        let header = Header::from_byte(0b1010_0111);

        assert_eq!(header.operand_count, 2);
        assert!(header.alu);
        assert!(!header.sets_pc);
        assert_eq!(header.index, 7);
        assert_eq!(header.as_byte(), 0b1010_0111);

        let header = Header::from_byte(0b0101_0101);

        assert_eq!(header.operand_count, 1);
        assert!(!header.alu);
        assert!(header.sets_pc);
        assert_eq!(header.index, 5);
    }

    #[test]
    fn test_decode_well_known_bytes() {
        let cases = [
            (0b1000_0010, OpCode::LoadImmediate),
            (0b0100_0111, OpCode::PrintNumber),
            (0b0000_0001, OpCode::Halt),
            (0b1010_0010, OpCode::Alu(AluOp::Multiply)),
            (0b0101_0000, OpCode::Call),
            (0b0001_0001, OpCode::Return),
            (0b0101_1010, OpCode::Jump { condition: JumpCondition::GreaterOrEqual }),
        ];

        for (byte, opcode) in cases.iter() {
            assert_eq!(OpCode::decode(&Header::from_byte(*byte)), Some(*opcode), "byte {:08b}", byte);
        }
    }

    #[test]
    fn test_canonical_encodings_decode_to_themselves() {
        for opcode in OpCode::ALL.iter() {
            let header = Header::from_byte(opcode.as_byte());
            assert_eq!(OpCode::decode(&header), Some(*opcode), "{}", opcode);
            assert_eq!(header.operand_count, opcode.operand_count(), "{}", opcode);
        }
    }

    #[test]
    fn test_decode_unknown_triples() {
        // ALU bucket only goes up to SHR.
        assert_eq!(OpCode::decode(&Header::from_byte(0b1010_1110)), None);
        // ALU and sets-PC at once.
        assert_eq!(OpCode::decode(&Header::from_byte(0b0011_0000)), None);
        // Past JGE.
        assert_eq!(OpCode::decode(&Header::from_byte(0b0101_1011)), None);
        // Three operand bytes.
        assert_eq!(OpCode::decode(&Header::from_byte(0b1100_0001)), None);
    }

    #[test]
    fn test_instruction_decode_and_display() {
        let ins = Instruction::decode(&[0b1000_0010, 0, 8]).unwrap();

        assert_eq!(ins.opcode, OpCode::LoadImmediate);
        assert_eq!(ins.len(), 3);
        assert_eq!(ins.to_string(), "LDI R0, 8");

        let ins = Instruction::decode(&[0b1010_0000, 0, 1]).unwrap();
        assert_eq!(ins.to_string(), "ADD R0, R1");

        let ins = Instruction::decode(&[0b0100_0111, 3]).unwrap();
        assert_eq!(ins.to_string(), "PRN R3");

        let ins = Instruction::decode(&[0b0000_0001]).unwrap();
        assert_eq!(ins.to_string(), "HLT");
    }

    #[test]
    fn test_missing_operands_read_as_zero() {
        let ins = Instruction::decode(&[0b1010_0000, 5]).unwrap();

        assert_eq!(ins.operands, [5, 0]);
        assert_eq!(ins.operand_count, 2);
    }

    #[test]
    fn test_register_operands_are_masked() {
        assert_eq!(Register::from_byte(0b1111_1010), Register::R2);
        assert_eq!(Register::from_byte(7), SP);
    }

    #[test]
    fn test_instruction_bytes() {
        let ins = Instruction::new(OpCode::Store, &[1, 2]);
        assert_eq!(ins.to_bytes(), vec![0b1000_0100, 1, 2]);

        let ins = Instruction::new(OpCode::Return, &[]);
        assert_eq!(ins.to_bytes(), vec![0b0001_0001]);
    }
}
