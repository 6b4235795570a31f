//! The arithmetic and logic unit.
//!
//! All operations work on unsigned 8-bit values and wrap around on overflow.

use std::cmp::Ordering;
use std::fmt;

use crate::instruction::AluOp;

/// The result of an ALU operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A new value for the first operand register.
    Value(u8),

    /// The ordering of the operands, produced by [AluOp::Compare].
    /// Only the flags register is updated.
    Comparison(Ordering),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AluError {
    DivisionByZero,
}

impl fmt::Display for AluError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AluError::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

/// Evaluates `op` on the operand values `a` and `b`.
///
/// Unary operations ignore `b`.
pub fn evaluate(op: AluOp, a: u8, b: u8) -> Result<Outcome, AluError> {
    let value = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Subtract => a.wrapping_sub(b),
        AluOp::Multiply => a.wrapping_mul(b),
        AluOp::Divide => a.checked_div(b).ok_or(AluError::DivisionByZero)?,
        AluOp::Modulo => a.checked_rem(b).ok_or(AluError::DivisionByZero)?,

        AluOp::Increment => a.wrapping_add(1),
        AluOp::Decrement => a.wrapping_sub(1),

        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Not => !a,

        // Shifting by the full width or more clears the value.
        AluOp::ShiftLeft => a.checked_shl(b as u32).unwrap_or(0),
        AluOp::ShiftRight => a.checked_shr(b as u32).unwrap_or(0),

        AluOp::Compare => return Ok(Outcome::Comparison(a.cmp(&b))),
    };

    Ok(Outcome::Value(value))
}
