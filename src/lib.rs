/*!
 * promptmap - Render a folder as an LLM prompt
 *
 * Scans a folder, prunes hidden entries, `.gitignore` matches and virtualenv
 * folders, and formats the selection as a `<file_map>` tree followed by a
 * `<file_contents>` block of fenced code. Token counts come from tiktoken.
 */

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod project;
pub mod report;
pub mod scanner;
pub mod selection;
pub mod sort;
pub mod tokenizer;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use classify::{is_binary_file, is_hidden, read_text_file};
pub use config::Config;
pub use error::{PromptMapError, Result};
pub use filter::IgnoreFilter;
pub use formatter::{OutputFormatter, OutputOptions};
pub use project::{load_project, ProjectOptions};
pub use report::{ReportFormat, Reporter};
pub use scanner::{scan_directory, ScanOptions, Scanner};
pub use selection::Selection;
pub use sort::{sort_entries, SortBy};
pub use tokenizer::{CountTokens, Model, Tokenizer};
pub use types::{Entry, OutputItem, ReadError, ReadErrorKind, SelectionItem};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
