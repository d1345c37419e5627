//! In-memory token count cache

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Cached count for one file
#[derive(Debug, Clone)]
struct TokenCacheEntry {
    /// Hash of the content that was counted
    hash: u64,
    /// Model used for counting
    model: String,
    tokens: usize,
}

/// Statistics for token cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl CacheStats {
    /// Share of lookups served from cache, in percent
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

/// Token counts keyed by file path.
///
/// An entry is only served while the file content and model are unchanged,
/// so edits on disk invalidate it implicitly.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: HashMap<PathBuf, TokenCacheEntry>,
    hits: usize,
    misses: usize,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Get the token count for `path` if it was counted from the same content
    pub fn get(&mut self, path: &Path, content: &str, model: &str) -> Option<usize> {
        let hash = Self::hash_content(content);

        let result = self
            .entries
            .get(path)
            .filter(|entry| entry.hash == hash && entry.model == model)
            .map(|entry| entry.tokens);

        if result.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }

        result
    }

    /// Store a count, replacing any earlier one for `path`
    pub fn insert(&mut self, path: &Path, content: &str, model: &str, tokens: usize) {
        self.entries.insert(
            path.to_path_buf(),
            TokenCacheEntry {
                hash: Self::hash_content(content),
                model: model.to_string(),
                tokens,
            },
        );
    }

    /// Forget the count for one file
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    /// Forget every count and reset statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }
}
