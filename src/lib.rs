//! A crate for loading and executing programs for the LS-8, a small 8-bit computer used for
//! teaching how a processor fetches, decodes and executes instructions.
//!
//! Currently this crate provides the functionality to:
//! - Read and write `.ls8` program files.
//! - Disassemble LS-8 machine code.
//! - Execute LS-8 machine code.
//!
//! # Machine
//!
//! - 256 bytes of memory, shared by the program, its data and the stack.
//! - Eight 8-bit registers `R0`-`R7`. `R7` is the stack pointer and starts at `0xF4`.
//! - The `FL` register, holding the equal/greater/less result of the latest `CMP`.
//!
//! # Unimplemented stuff
//! - Interrupts. `INT` and `IRET` are decoded but behave like `NOP`.
//!
//! # Example
//! ```
//! use ls8::{
//!     program::Program,
//!     emulator::{Emulator, TestIo},
//! };
//!
//! fn main() {
//!     // Adds 8 and 9 together and prints the answer.
//!     let source = r#"
//!         10000010 # LDI R0,8
//!         00000000
//!         00001000
//!         10000010 # LDI R1,9
//!         00000001
//!         00001001
//!         10100000 # ADD R0,R1
//!         00000000
//!         00000001
//!         01000111 # PRN R0
//!         00000000
//!         00000001 # HLT
//!     "#;
//!
//!     // Parse the program file into a memory image.
//!     let program = Program::parse(source).unwrap();
//!
//!     // Load the image into an emulator which records the output.
//!     let mut emulator = Emulator::new(&program, TestIo::new());
//!
//!     // Execute the program.
//!     emulator.run()
//!         .expect("an error occured while emulating the program");
//!
//!     assert_eq!(emulator.io.text(), "17");
//! }
//! ```
//!
//! # Executables
//!
//! ## `ls8run`
//!
//! Loads a program file and executes it, writing the program output to the standard output.
//!
//! ```text
//! $ ls8run mult.ls8
//! 72
//! $ ls8run -vv mult.ls8     # trace every executed instruction
//! $ ls8run -d mult.ls8      # print an annotated listing instead of running
//! ```
pub mod alu;
pub mod emulator;
pub mod error;
pub mod instruction;
pub mod memory;
pub mod program;

pub use emulator::{Emulator, StdIo, TestIo};
pub use program::Program;
