//! Model table: model name to vocabulary encoding and context limit

use std::str::FromStr;

use strum::{Display, EnumIter, EnumProperty, EnumString, IntoEnumIterator, IntoStaticStr};
use tiktoken_rs::CoreBPE;

use crate::tokenizer::error::{TokenizerError, TokenizerResult};

/// Supported models for token counting
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
    EnumProperty,
)]
pub enum Model {
    #[default]
    #[strum(serialize = "gpt-3.5-turbo", props(encoding = "cl100k_base", max_tokens = "4096"))]
    Gpt35Turbo,

    #[strum(
        serialize = "gpt-3.5-turbo-16k",
        props(encoding = "cl100k_base", max_tokens = "16384")
    )]
    Gpt35Turbo16k,

    #[strum(serialize = "gpt-4", props(encoding = "cl100k_base", max_tokens = "8192"))]
    Gpt4,

    #[strum(serialize = "gpt-4-32k", props(encoding = "cl100k_base", max_tokens = "32768"))]
    Gpt4_32k,

    #[strum(serialize = "gpt-4-turbo", props(encoding = "cl100k_base", max_tokens = "128000"))]
    Gpt4Turbo,

    // Embedding model, no context limit
    #[strum(serialize = "text-embedding-ada-002", props(encoding = "cl100k_base"))]
    TextEmbeddingAda002,
}

impl Model {
    /// Look up a model by its table name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// Table name of this model
    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    /// Names of every model in table order
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|model| model.name()).collect()
    }

    /// Vocabulary encoding used by this model
    pub fn encoding(&self) -> EncodingName {
        self.get_str("encoding")
            .and_then(|name| EncodingName::from_str(name).ok())
            .unwrap_or_default()
    }

    /// Context limit in tokens, `None` when the model has none
    pub fn max_tokens(&self) -> Option<usize> {
        self.get_str("max_tokens").and_then(|v| v.parse().ok())
    }
}

/// Vocabulary encodings bundled with `tiktoken-rs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
pub enum EncodingName {
    #[default]
    #[strum(serialize = "cl100k_base")]
    Cl100kBase,
    #[strum(serialize = "o200k_base")]
    O200kBase,
    #[strum(serialize = "p50k_base")]
    P50kBase,
    #[strum(serialize = "r50k_base")]
    R50kBase,
}

impl EncodingName {
    /// Build the encoder; vocabularies ship with the crate, no network is used
    pub fn load(&self) -> TokenizerResult<CoreBPE> {
        let loaded = match self {
            Self::Cl100kBase => tiktoken_rs::cl100k_base(),
            Self::O200kBase => tiktoken_rs::o200k_base(),
            Self::P50kBase => tiktoken_rs::p50k_base(),
            Self::R50kBase => tiktoken_rs::r50k_base(),
        };

        loaded.map_err(|e| TokenizerError::EncodingLoad(self.to_string(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_table() {
        assert_eq!(Model::default(), Model::Gpt35Turbo);
        assert_eq!(Model::from_name("gpt-4"), Some(Model::Gpt4));
        assert_eq!(Model::from_name("gpt-5-ultra"), None);
        assert_eq!(Model::Gpt4Turbo.max_tokens(), Some(128000));
        assert_eq!(Model::TextEmbeddingAda002.max_tokens(), None);
        assert_eq!(Model::Gpt4_32k.encoding(), EncodingName::Cl100kBase);
        assert_eq!(Model::Gpt35Turbo16k.to_string(), "gpt-3.5-turbo-16k");
    }

    #[test]
    fn test_model_names_in_table_order() {
        assert_eq!(
            Model::names(),
            [
                "gpt-3.5-turbo",
                "gpt-3.5-turbo-16k",
                "gpt-4",
                "gpt-4-32k",
                "gpt-4-turbo",
                "text-embedding-ada-002",
            ]
        );
    }
}
