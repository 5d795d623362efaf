//! Error types for jskim.
//!
//! Only path compilation can fail. Everything that depends on the shape of
//! the queried data is reported through a non-existent value instead.

use alloc::string::String;
use core::fmt;

/// Result type alias for jskim operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for path compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The path expression is empty.
    EmptyPath,
    /// A `#[...]` filter is unbalanced or its expression cannot be read.
    InvalidFilter {
        message: String,
        position: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyPath => write!(f, "Empty path expression"),
            Error::InvalidFilter { message, position } => {
                write!(f, "Invalid filter at position {}: {}", position, message)
            }
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Creates an invalid filter error.
    pub fn invalid_filter(message: impl Into<String>, position: usize) -> Self {
        Error::InvalidFilter {
            message: message.into(),
            position,
        }
    }

    /// Returns the byte offset in the path where the error was detected.
    pub fn position(&self) -> usize {
        match self {
            Error::EmptyPath => 0,
            Error::InvalidFilter { position, .. } => *position,
        }
    }
}
