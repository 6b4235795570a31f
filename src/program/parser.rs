use std::result::Result as StdResult;

use nom::{
    IResult,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{not_line_ending, one_of, space0},
    combinator::{all_consuming, cut, map_res, opt, peek},
    sequence::{delimited, pair, preceded},
    error::context,
};

use crate::error::{ParseError, ProgramError};

type Result<'a, T> = IResult<&'a str, T, ParseError>;

fn is_binary_digit(c: char) -> bool {
    c == '0' || c == '1'
}

fn take_byte(input: &str) -> Result<u8> {
    context(
        "instruction byte",
        cut(map_res(
            take_while_m_n(8, 8, is_binary_digit),
            |s: &str| u8::from_str_radix(s, 2),
        )),
    )(input)
}

fn comment(input: &str) -> Result<&str> {
    preceded(tag("#"), not_line_ending)(input)
}

/// Parses a single line of a program file.
///
/// Returns `None` for lines that only contain whitespace or a comment.
fn parse_line(input: &str) -> Result<Option<u8>> {
    all_consuming(delimited(
        space0,
        opt(preceded(peek(one_of("01")), take_byte)),
        pair(space0, opt(comment)),
    ))(input)
}

/// Parses the text of a program file into the bytes to be loaded into memory.
pub(crate) fn parse_program_file(input: &str) -> StdResult<Vec<u8>, ProgramError> {
    let mut bytes = Vec::new();

    for (index, line) in input.lines().enumerate() {
        match parse_line(line) {
            Ok((_, Some(byte))) => bytes.push(byte),
            Ok((_, None)) => (),
            Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
                return Err(err.locate(index + 1, line));
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(ParseError::incomplete().locate(index + 1, line));
            }
        }
    }

    Ok(bytes)
}
