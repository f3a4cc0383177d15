//! Error types for the Yu compiler.
//!
//! This module defines the error type shared by the compiler pipeline,
//! from lexing through machine-code emission.

use std::error::Error;
use std::fmt;

/// Main error type for the Yu compiler.
///
/// Each variant corresponds to a pipeline stage. Lexical problems are not
/// errors at this level: the lexer records them as token flag bits and the
/// parser turns them into diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YucError {
    /// The parser accumulated ERROR or FATAL diagnostics.
    ParseError(String),
    /// An IR validator rejected a sealed module.
    ValidationError(String),
    /// Errors during machine-code emission.
    CodegenError(String),
    /// Internal compiler errors indicating bugs.
    InternalError(String),
}

impl fmt::Display for YucError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YucError::ParseError(msg) => write!(f, "Parse Error: {}", msg),
            YucError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            YucError::CodegenError(msg) => write!(f, "Codegen Error: {}", msg),
            YucError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl Error for YucError {}

/// Result type alias used throughout the compiler.
pub type Result<T> = std::result::Result<T, YucError>;
