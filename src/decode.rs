use crate::error::{Error, Result};
use crate::instruction::{Instruction, Opcode};

/// Split a line into whitespace-separated tokens.
///
/// Leading and trailing whitespace is ignored and runs of whitespace count as one separator.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Decode one line of text into an [`Instruction`].
///
/// The mnemonic is matched case-insensitively; operands are passed through as written.
/// Only the shape of the line is checked here. Register names and integer literals are
/// validated when the instruction executes.
///
/// Errors:
/// - `InvalidSyntax` for an empty line or a wrong operand count,
/// - `UnknownInstruction` when the first token is not a mnemonic.
pub fn decode(line: &str) -> Result<Instruction> {
    let tokens = tokenize(line);
    let Some((&head, operands)) = tokens.split_first() else {
        return Err(invalid_line(line));
    };
    let opcode: Opcode = head.parse()?;
    if operands.len() != opcode.arity() {
        return Err(invalid_line(line));
    }
    Instruction::new(opcode, operands)
}

fn invalid_line(line: &str) -> Error {
    Error::InvalidSyntax(format!("Invalid instruction syntax: {line}"))
}
