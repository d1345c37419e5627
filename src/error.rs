//! Global error handling for promptmap
//!
//! Only structurally invalid top-level calls surface as errors. Per-entry
//! scan problems and per-file read problems are carried as data instead
//! (see [`crate::types::Entry::error`] and [`crate::types::ReadError`]).

use std::io;
use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Global error type for promptmap operations
#[derive(Error, Debug)]
pub enum PromptMapError {
    /// Scan root or other required path does not exist
    #[error("Path not found: {0}")]
    NotFound(String),

    /// Argument is structurally invalid (e.g. scan root is a file)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Tokenizer-related errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Specialized Result type for promptmap operations
pub type Result<T> = std::result::Result<T, PromptMapError>;

/// Creates a PromptMapError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::PromptMapError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            PromptMapError::Unexpected(format!("{}: {}", context, e))
        })
    }
}

// The binary returns io::Result from main
impl From<PromptMapError> for io::Error {
    fn from(err: PromptMapError) -> Self {
        let kind = match &err {
            PromptMapError::NotFound(_) => io::ErrorKind::NotFound,
            PromptMapError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            PromptMapError::Io(e) => e.kind(),
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err.to_string())
    }
}
