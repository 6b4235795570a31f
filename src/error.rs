//! Error types for loading and executing programs.

use std::error::Error;
use std::fmt::{self, Display};

use nom::error::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
enum InnerError {
    Incomplete,
    Context(&'static str),
    Nom(ErrorKind),
}

impl fmt::Display for InnerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InnerError::Context(ctx) => write!(f, "invalid {}", ctx),
            InnerError::Nom(_err) => write!(f, "unexpected input"),
            InnerError::Incomplete => write!(f, "expected more input"),
        }
    }
}

/// Error produced by the program line parser.
///
/// Holds the reasons of the error together with the unconsumed input. Location information is
/// attached with [ParseError::locate] once the line number is known.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    stack: Vec<(String, InnerError)>,
}

impl ParseError {
    pub(crate) fn incomplete() -> ParseError {
        ParseError {
            stack: vec![(String::new(), InnerError::Incomplete)],
        }
    }

    /// Calculates the error location from the [ParseError] and the line it was produced from.
    ///
    /// # Parameters
    /// - `line`: The line number of `input` in the program source, starting from 1.
    /// - `input`: The full line given to the parser.
    pub(crate) fn locate(self, line: usize, input: &str) -> ProgramError {
        // Prefer the outermost context, it names what was being parsed.
        let (rest, kind) = self
            .stack
            .iter()
            .rev()
            .find(|(_, kind)| matches!(kind, InnerError::Context(_)))
            .or_else(|| self.stack.first())
            .cloned()
            .unwrap_or_else(|| (String::new(), InnerError::Nom(ErrorKind::Eof)));

        let offset = input.len().saturating_sub(rest.len());

        ProgramError {
            line,
            column: input[..offset].chars().count() + 1,
            kind,
            rest: rest.chars().take(20).collect(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.stack.first() {
            Some((input, kind)) => write!(f, "{} at: {}", kind, input),
            None => write!(f, "parse error"),
        }
    }
}

impl nom::error::ParseError<&str> for ParseError {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        ParseError {
            stack: vec![(input.to_string(), InnerError::Nom(kind))],
        }
    }

    fn append(input: &str, kind: ErrorKind, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Nom(kind)));
        other
    }

    fn add_context(input: &str, ctx: &'static str, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Context(ctx)));
        other
    }
}

/// A malformed line in a program file, with its location.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramError {
    /// The line number of the error location.
    pub line: usize,
    /// The column number of the error location.
    pub column: usize,
    kind: InnerError,
    rest: String,
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "at line {} col {}: {}, at '{}'", self.line, self.column, self.kind, self.rest)
    }
}

impl Error for ProgramError {}

/// Errors that prevent a program from being loaded into memory.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadError {
    /// The program text is malformed.
    Parse(ProgramError),

    /// The program does not fit into memory.
    TooLarge {
        /// Size of the program in bytes.
        size: usize,
    },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Parse(err) => write!(f, "malformed program {}", err),
            LoadError::TooLarge { size } => write!(
                f,
                "program is {} bytes long but the memory only holds {}",
                size,
                crate::memory::MEMORY_SIZE,
            ),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Parse(err) => Some(err),
            LoadError::TooLarge { .. } => None,
        }
    }
}

impl From<ProgramError> for LoadError {
    fn from(err: ProgramError) -> LoadError {
        LoadError::Parse(err)
    }
}

/// Fatal conditions raised while executing a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmulationError {
    /// The byte at `address` does not decode to a known instruction.
    UnknownOpcode {
        address: u8,
        opcode: u8,
    },

    /// A push would have moved the stack pointer into the program.
    StackOverflow {
        /// Address of the pushing instruction.
        address: u8,
        /// Value of the stack pointer before the push.
        stack_pointer: u8,
        /// First address not occupied by the program.
        heap_boundary: usize,
    },

    /// `DIV` or `MOD` with a zero divisor.
    DivisionByZero {
        address: u8,
    },
}

impl Display for EmulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmulationError::UnknownOpcode { address, opcode } => {
                write!(f, "unknown opcode 0b{:08b} at 0x{:02x}", opcode, address)
            }
            EmulationError::StackOverflow { address, stack_pointer, heap_boundary } => write!(
                f,
                "stack overflow at 0x{:02x}: stack pointer 0x{:02x} reached the heap boundary 0x{:02x}",
                address, stack_pointer, heap_boundary,
            ),
            EmulationError::DivisionByZero { address } => {
                write!(f, "division by zero at 0x{:02x}", address)
            }
        }
    }
}

impl Error for EmulationError {}
