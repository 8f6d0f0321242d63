//! Terminal failures and the reporter that turns them into a diagnostic line.

use std::io::{self, Write};

use thiserror::Error;

use crate::container::AllocError;

/// Exit status for every failure kind.
pub const EXIT_FAILURE: u8 = 1;

pub type Result<T> = std::result::Result<T, MontyError>;

/// Everything that ends a run early. The `Display` text of each variant is the exact
/// diagnostic line written to stderr.
#[derive(Debug, Error)]
pub enum MontyError {
    #[error("USAGE: monty file")]
    Usage,

    #[error("Error: Can't open file {path}")]
    FileOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("L{line}: unknown instruction {opcode}")]
    UnknownInstruction { line: usize, opcode: String },

    #[error("Error: Memory allocation (malloc) failed")]
    Allocation,

    #[error("L{line}: usage: push integer")]
    PushArgument { line: usize },

    #[error("L{line}: can't pint, stack empty")]
    EmptyPint { line: usize },

    #[error("L{line}: can't pop an empty stack")]
    EmptyPop { line: usize },

    #[error("L{line}: can't {op}, stack too short")]
    ShortStack { line: usize, op: &'static str },

    #[error("Division by zero")]
    DivisionByZero { line: usize },

    #[error("L{line}: can't pchar, value out of range")]
    PcharRange { line: usize },

    #[error("L{line}: can't pchar, stack empty")]
    PcharEmpty { line: usize },

    #[error("Error: Can't write output")]
    Output(#[from] io::Error),
}

impl From<AllocError> for MontyError {
    fn from(_: AllocError) -> Self {
        MontyError::Allocation
    }
}

impl MontyError {
    /// The source line the failure was raised on, if it belongs to one.
    pub fn line(&self) -> Option<usize> {
        match *self {
            MontyError::UnknownInstruction { line, .. }
            | MontyError::PushArgument { line }
            | MontyError::EmptyPint { line }
            | MontyError::EmptyPop { line }
            | MontyError::ShortStack { line, .. }
            | MontyError::DivisionByZero { line }
            | MontyError::PcharRange { line }
            | MontyError::PcharEmpty { line } => Some(line),
            MontyError::Usage
            | MontyError::FileOpen { .. }
            | MontyError::Allocation
            | MontyError::Output(..) => None,
        }
    }
}

/// Writes the single diagnostic line for `err` and returns the exit status. Whatever owns the
/// container has to release it before calling this.
pub fn report(err: &MontyError, diag: &mut impl Write) -> u8 {
    // nothing left to tell anyone if stderr itself is gone
    let _ = writeln!(diag, "{}", err);
    let _ = diag.flush();
    EXIT_FAILURE
}
