//! Error types for value model operations

use crate::dom::value::Kind;
use std::fmt;

/// Errors raised by the typed accessors and mutators of the value model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A typed accessor was called on a value of another kind
    TypeMismatch { expected: Kind, found: Kind },
    /// The container implementation does not support mutation
    NotMutable { type_key: &'static str },
    /// Checked index access past the end of an array
    IndexOutOfRange { index: usize, size: usize },
    /// Free-form error raised by a native function
    Message(String),
}

impl Error {
    pub fn message(msg: impl Into<String>) -> Self {
        Error::Message(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch { expected, found } => {
                write!(f, "expected {}, found {}", expected.article_name(), found)
            }
            Error::NotMutable { type_key } => write!(f, "{} is not mutable", type_key),
            Error::IndexOutOfRange { index, size } => {
                write!(f, "index {} out of range for array of size {}", index, size)
            }
            Error::Message(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the value model
pub type Result<T> = std::result::Result<T, Error>;
