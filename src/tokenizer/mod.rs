//! Tokenizer module for token counting with OpenAI models
//!
//! Wraps the `tiktoken` vocabularies behind a small model table and adds
//! batch counting over a selection with a per-file cache.

mod cache;
mod counter;
mod error;
mod model;

// Re-exports for public API
pub use cache::{CacheStats, TokenCache};
pub use counter::{count_selection_tokens, FileTokens, TokenReport};
pub use error::{TokenizerError, TokenizerResult};
pub use model::{EncodingName, Model};

use log::{debug, warn};
use tiktoken_rs::CoreBPE;

/// Interface for anything that can count tokens in text
pub trait CountTokens: Send + Sync {
    /// Count tokens in `text`; `None` and empty text count 0
    fn count_tokens(&self, text: Option<&str>) -> usize;

    /// Name of the model counts are made for
    fn model_name(&self) -> &str;

    /// Context limit of the model, `None` when it has none
    fn model_max_tokens(&self) -> Option<usize>;
}

/// Token counter bound to one model and its encoding
pub struct Tokenizer {
    model: Model,
    encoding: CoreBPE,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").field("model", &self.model).finish()
    }
}

impl Tokenizer {
    /// Create a tokenizer for `model_name`. Unknown names fall back to the
    /// default model with a warning.
    pub fn new(model_name: &str) -> TokenizerResult<Self> {
        let model = Model::from_name(model_name).unwrap_or_else(|| {
            warn!(
                "Unknown model '{}', falling back to {}",
                model_name,
                Model::default()
            );
            Model::default()
        });

        let encoding = model.encoding().load()?;
        debug!("Tokenizer ready: {} ({})", model, model.encoding());

        Ok(Self { model, encoding })
    }

    /// The resolved model
    pub fn model(&self) -> Model {
        self.model
    }

    /// Count tokens in `text`; `None` and empty text count 0.
    ///
    /// Special-token markup such as `<|endoftext|>` is encoded as ordinary
    /// text and counted. A strict encoder that rejects special tokens would
    /// instead fail on such input and report 0 for the whole text.
    pub fn count_tokens(&self, text: Option<&str>) -> usize {
        match text {
            None | Some("") => 0,
            Some(text) => self.encoding.encode_ordinary(text).len(),
        }
    }

    /// Names of every model in the table
    pub fn get_available_models() -> Vec<&'static str> {
        Model::names()
    }

    /// Context limit for `model_name`, or for this tokenizer's model when
    /// `None`. Unknown models and models without a limit both give `None`.
    pub fn get_model_max_tokens(&self, model_name: Option<&str>) -> Option<usize> {
        match model_name {
            None => self.model.max_tokens(),
            Some(name) => Model::from_name(name).and_then(|model| model.max_tokens()),
        }
    }
}

impl CountTokens for Tokenizer {
    fn count_tokens(&self, text: Option<&str>) -> usize {
        Tokenizer::count_tokens(self, text)
    }

    fn model_name(&self) -> &str {
        self.model.name()
    }

    fn model_max_tokens(&self) -> Option<usize> {
        self.model.max_tokens()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_cl100k() {
        let tokenizer = Tokenizer::new("gpt-4").unwrap();
        assert_eq!(tokenizer.model(), Model::Gpt4);
        assert_eq!(tokenizer.count_tokens(Some("hello world")), 2);
        assert!(tokenizer.count_tokens(Some("fn main() {}\n")) > 0);
    }

    #[test]
    fn test_empty_text_counts_zero() {
        let tokenizer = Tokenizer::new("gpt-3.5-turbo").unwrap();
        assert_eq!(tokenizer.count_tokens(None), 0);
        assert_eq!(tokenizer.count_tokens(Some("")), 0);
    }

    #[test]
    fn test_special_token_text_counts_as_ordinary() {
        let tokenizer = Tokenizer::new("gpt-4").unwrap();
        assert!(tokenizer.count_tokens(Some("<|endoftext|>")) > 1);
    }

    #[test]
    fn test_unknown_model_falls_back_to_default() {
        let tokenizer = Tokenizer::new("no-such-model").unwrap();
        assert_eq!(tokenizer.model(), Model::default());
        assert_eq!(tokenizer.model_name(), "gpt-3.5-turbo");
        assert_eq!(tokenizer.model_max_tokens(), Some(4096));
    }

    #[test]
    fn test_get_model_max_tokens() {
        let tokenizer = Tokenizer::new("gpt-4-32k").unwrap();
        assert_eq!(tokenizer.get_model_max_tokens(None), Some(32768));
        assert_eq!(tokenizer.get_model_max_tokens(Some("gpt-4-turbo")), Some(128000));
        // No limit and unknown model look the same
        assert_eq!(tokenizer.get_model_max_tokens(Some("text-embedding-ada-002")), None);
        assert_eq!(tokenizer.get_model_max_tokens(Some("nope")), None);
    }

    #[test]
    fn test_available_models() {
        let models = Tokenizer::get_available_models();
        assert_eq!(models.len(), 6);
        assert_eq!(models[0], "gpt-3.5-turbo");
        assert!(models.contains(&"text-embedding-ada-002"));
    }
}
