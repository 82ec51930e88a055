//! Error types for building and encoding context documents.
//!
//! Failures fall into three classes with different propagation rules:
//!
//! - **Resource failures** (missing file, failed command, unparseable loader
//!   input) never surface here; the builder degrades them to warnings on its
//!   [`Reporter`](crate::Reporter) and continues.
//! - **Malformed input** (TOON text or a context script violating its
//!   grammar) is fatal to the parse call only, with line information.
//! - **Structural misuse** (building a second document on one builder) is a
//!   programmer error and surfaces immediately.

use std::fmt;
use thiserror::Error;

/// All errors this crate can return.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// TOON text violates the grammar
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// An inline or block list does not contain the number of elements its
    /// `key[N]` annotation declares
    #[error("List count mismatch at line {line}: header declares {declared} elements, found {found}")]
    CountMismatch {
        line: usize,
        declared: usize,
        found: usize,
    },

    /// A context script could not be parsed
    #[error("Script error at line {line}: {msg}")]
    Script { line: usize, msg: String },

    /// A second root document was requested from the same builder
    #[error("only one document may be built per builder")]
    MultipleDocuments,

    /// Custom error
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates a list count mismatch error for a `key[N]` annotation whose
    /// list held a different number of elements.
    pub fn count_mismatch(line: usize, declared: usize, found: usize) -> Self {
        Error::CountMismatch {
            line,
            declared,
            found,
        }
    }

    /// Creates a script parse error.
    pub fn script(line: usize, msg: impl Into<String>) -> Self {
        Error::Script {
            line,
            msg: msg.into(),
        }
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
