use itertools::Itertools;

use super::parser::parse_program_file;
use crate::error::LoadError;
use crate::instruction::Instruction;
use crate::memory::MEMORY_SIZE;

/// A memory image to be loaded into the LS-8, starting from address 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    /// Parses the text of a program file.
    ///
    /// Each non-blank line holds one byte written as eight binary digits and may be followed by a
    /// `#` comment. Lines containing only whitespace or a comment are skipped.
    ///
    /// # Errors
    /// Returns [LoadError::Parse] with the location of the first malformed line, or
    /// [LoadError::TooLarge] if the program does not fit into memory.
    pub fn parse(source: &str) -> Result<Program, LoadError> {
        let bytes = parse_program_file(source)?;

        Program::from_bytes(bytes)
    }

    /// Creates a program from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Program, LoadError> {
        if bytes.len() > MEMORY_SIZE {
            return Err(LoadError::TooLarge { size: bytes.len() });
        }

        Ok(Program { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The first address not occupied by the program once it has been loaded.
    /// The stack may never grow down to this address.
    pub fn heap_boundary(&self) -> usize {
        self.bytes.len()
    }

    /// Renders the program in the program file format.
    ///
    /// Opcode bytes are annotated with the disassembled instruction and their operand bytes
    /// follow on separate lines. Bytes that do not start a complete instruction are emitted
    /// without a comment. Parsing the output yields the same program.
    pub fn to_source(&self) -> String {
        let mut lines = Vec::new();
        let mut address = 0;

        while address < self.bytes.len() {
            let rest = &self.bytes[address..];

            match Instruction::decode(rest) {
                Some(ins) if (ins.len() as usize) <= rest.len() => {
                    lines.push(format!("{:08b} # {}", rest[0], ins));

                    for operand in &rest[1..ins.len() as usize] {
                        lines.push(format!("{:08b}", operand));
                    }

                    address += ins.len() as usize;
                }
                _ => {
                    lines.push(format!("{:08b}", rest[0]));
                    address += 1;
                }
            }
        }

        lines.into_iter().map(|line| line + "\n").join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINT8: &str = r#"
        # Print the number 8

        10000010 # LDI R0,8
        00000000
        00001000
        01000111 # PRN R0
        00000000
        00000001 # HLT
    "#;

    #[test]
    fn test_parse() {
        let program = Program::parse(PRINT8).unwrap();

        assert_eq!(program.as_bytes(), &[0b1000_0010, 0, 8, 0b0100_0111, 0, 1]);
        assert_eq!(program.heap_boundary(), 6);
    }

    #[test]
    fn test_to_source() {
        let program = Program::parse(PRINT8).unwrap();

        assert_eq!(
            program.to_source(),
            "10000010 # LDI R0, 8\n\
             00000000\n\
             00001000\n\
             01000111 # PRN R0\n\
             00000000\n\
             00000001 # HLT\n",
        );

        assert_eq!(Program::parse(&program.to_source()).unwrap(), program);
    }

    #[test]
    fn test_to_source_truncated_instruction() {
        // LDI missing its immediate operand.
        let program = Program::from_bytes(vec![0b1000_0010, 0]).unwrap();

        assert_eq!(program.to_source(), "10000010\n00000000 # NOP\n");
    }

    #[test]
    fn test_too_large() {
        let source = "00000000\n".repeat(MEMORY_SIZE + 1);

        assert_eq!(Program::parse(&source), Err(LoadError::TooLarge { size: MEMORY_SIZE + 1 }));
        assert!(Program::parse(&"00000000\n".repeat(MEMORY_SIZE)).is_ok());
    }
}
