//! Error handling for GCodeView
//!
//! Provides the error types shared by every conversion stage:
//! - G-Code errors (malformed toolpath input)
//! - I/O errors (reading the source, writing into the output sink)
//! - Serialization errors (layer document encoding)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Represents errors raised while interpreting a toolpath command stream.
/// Any of these aborts the conversion that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// Invalid numeric parameter value
    #[error("Invalid parameter '{param}' at line {line_number}: {reason}")]
    InvalidParameter {
        /// The line number (1-based) where the invalid parameter was found.
        line_number: u64,
        /// The raw parameter word, e.g. `X1.2.3`.
        param: String,
        /// The reason the parameter is invalid.
        reason: String,
    },

    /// Tool index outside the supported range
    #[error("Tool {tool} is outside the supported range 0..={max}")]
    ToolOutOfRange {
        /// The rejected tool index.
        tool: u32,
        /// The highest supported tool index.
        max: u8,
    },

    /// Generic G-Code error
    #[error("G-Code error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Main error type for GCodeView
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layer document encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
