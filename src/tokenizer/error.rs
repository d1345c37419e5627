//! Error types for the tokenizer module

use thiserror::Error;

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Errors that can occur while setting up a tokenizer
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The vocabulary for an encoding could not be built
    #[error("Failed to load encoding {0}: {1}")]
    EncodingLoad(String, String),
}
