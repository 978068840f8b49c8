//! Error types for model loading

use thiserror::Error;

/// Errors raised while reading or parsing an OBJ source.
///
/// Line numbers are 1-based and refer to the line of the source text that
/// stopped the parse.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: `{record}` record expects {expected} numbers, found {found}")]
    MissingField {
        line: usize,
        record: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: invalid face reference `{token}`")]
    InvalidFaceRef { line: usize, token: String },

    #[error("line {line}: unsupported index {index} in `{token}` (only positive 1-based indices are supported)")]
    UnsupportedIndex {
        line: usize,
        token: String,
        index: i64,
    },
}

impl ParseError {
    /// Source line that caused the failure, if the error is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Io(_) => None,
            ParseError::MissingField { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::InvalidFaceRef { line, .. }
            | ParseError::UnsupportedIndex { line, .. } => Some(*line),
        }
    }
}

/// Result type alias for model loading
pub type Result<T> = std::result::Result<T, ParseError>;
