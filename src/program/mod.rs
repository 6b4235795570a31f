//! Reading and writing LS-8 program files.

mod parser;
mod program;

pub use self::program::Program;
