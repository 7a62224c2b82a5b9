use std::fmt;

use thiserror::Error;

/// Errors produced while decoding or executing instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A register operand or lookup named something other than A, B, C or D.
    #[error("Invalid register: {0}")]
    UnknownRegister(String),
    /// Malformed line, wrong operand count, or an unparseable integer literal.
    #[error("{0}")]
    InvalidSyntax(String),
    /// The opcode token is not one of the seven known mnemonics.
    #[error("Unknown instruction type: {0}")]
    UnknownInstruction(String),
    /// A batch was submitted with no instructions.
    #[error("batch must contain at least one instruction")]
    EmptyBatch,
    /// An instruction inside a batch failed. Earlier instructions stay committed.
    #[error(transparent)]
    Batch(#[from] BatchFailure),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The first failing instruction of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// 0-based position of the failing line. Equal to the number of committed instructions.
    pub index: usize,
    /// The failing line, verbatim.
    pub line: String,
    /// What went wrong with that line.
    pub source: Box<Error>,
}

impl BatchFailure {
    pub fn new(index: usize, line: impl Into<String>, source: Error) -> Self {
        Self {
            index,
            line: line.into(),
            source: Box::new(source),
        }
    }

    /// Number of instructions that ran to completion before the failure.
    pub fn executed(&self) -> usize {
        self.index
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error executing instruction at index {}: {} - {}",
            self.index, self.line, self.source
        )
    }
}

impl std::error::Error for BatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl Error {
    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownRegister(_) => "unknown_register",
            Error::InvalidSyntax(_) => "invalid_syntax",
            Error::UnknownInstruction(_) => "unknown_instruction",
            Error::EmptyBatch => "empty_batch",
            Error::Batch(_) => "batch_failure",
        }
    }
}
