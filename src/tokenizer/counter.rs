//! Batch token counting over selected files

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use log::{debug, info};
use serde::Serialize;

use super::cache::{CacheStats, TokenCache};
use super::CountTokens;
use crate::classify::read_text_file;
use crate::types::OutputItem;

/// Token count for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTokens {
    /// Path relative to the project root
    pub path: PathBuf,
    pub tokens: usize,
}

/// Outcome of a counting run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenReport {
    pub model: String,
    pub max_tokens: Option<usize>,
    /// Counts in selection order
    pub files: Vec<FileTokens>,
    pub total: usize,
    /// Set when the stop flag ended the run early
    pub stopped: bool,
    pub cache: CacheStats,
}

impl TokenReport {
    /// Share of the model's context window used, when it has a limit
    pub fn context_usage(&self) -> Option<f64> {
        self.max_tokens
            .filter(|max| *max > 0)
            .map(|max| self.total as f64 / max as f64 * 100.0)
    }
}

/// Count tokens for every file in `items`, in order.
///
/// `stop` is checked before each file so another thread can cancel the run;
/// counts made so far are kept. Binary and unreadable files count 0.
pub fn count_selection_tokens<T: OutputItem>(
    counter: &dyn CountTokens,
    items: &[T],
    cache: &mut TokenCache,
    stop: &AtomicBool,
    progress: &ProgressBar,
) -> TokenReport {
    let files: Vec<&T> = items.iter().filter(|item| !item.is_directory()).collect();
    progress.set_length(files.len() as u64);

    let mut report = TokenReport {
        model: counter.model_name().to_string(),
        max_tokens: counter.model_max_tokens(),
        ..Default::default()
    };

    for item in files {
        if stop.load(Ordering::Relaxed) {
            info!("Token counting stopped after {} files", report.files.len());
            report.stopped = true;
            break;
        }

        let path = item.absolute_path();
        progress.set_message(item.relative_path().display().to_string());

        let tokens = match read_text_file(path) {
            Ok(text) => match cache.get(path, &text, &report.model) {
                Some(tokens) => tokens,
                None => {
                    let tokens = counter.count_tokens(Some(&text));
                    cache.insert(path, &text, &report.model, tokens);
                    tokens
                }
            },
            Err(e) => {
                debug!("Counting 0 tokens for {}: {}", path.display(), e);
                0
            }
        };

        report.total += tokens;
        report.files.push(FileTokens {
            path: item.relative_path().to_path_buf(),
            tokens,
        });
        progress.inc(1);
    }

    report.cache = cache.get_stats();
    progress.finish_and_clear();
    report
}
