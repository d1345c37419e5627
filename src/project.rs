/*!
 * Project loading: scan, prune and order the entries of a root folder
 */

use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use log::info;

use crate::error::Result;
use crate::filter::{is_virtualenv_path, IgnoreFilter};
use crate::scanner::{ScanOptions, Scanner};
use crate::sort::{sort_entries, SortBy};
use crate::types::Entry;

/// How a project folder is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectOptions {
    pub scan: ScanOptions,
    /// Drop entries matched by the root `.gitignore`
    pub apply_gitignore: bool,
    /// Keep `venv`/`.venv`/`env`/`virtualenv`/`venv-*` folders
    pub keep_virtualenvs: bool,
    pub sort_by: SortBy,
    pub reverse: bool,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            apply_gitignore: true,
            keep_virtualenvs: false,
            sort_by: SortBy::Name,
            reverse: false,
        }
    }
}

/// Load the entries of `root` ready for presentation.
///
/// The root entry always survives pruning.
pub fn load_project(root: &Path, options: &ProjectOptions) -> Result<Vec<Entry>> {
    load_project_with_progress(root, options, Arc::new(ProgressBar::hidden()))
}

/// [`load_project`] reporting scan progress to `progress`
pub fn load_project_with_progress(
    root: &Path,
    options: &ProjectOptions,
    progress: Arc<ProgressBar>,
) -> Result<Vec<Entry>> {
    let mut entries = Scanner::with_progress(options.scan, progress).scan(root)?;
    info!("Scanned {} entries", entries.len());

    if options.apply_gitignore {
        let filter = IgnoreFilter::new(root);
        if filter.has_rules() {
            entries.retain(|entry| entry.is_root() || !filter.should_ignore(&entry.path));
            info!("{} entries after gitignore rules", entries.len());
        }
    }

    if !options.keep_virtualenvs {
        entries.retain(|entry| entry.is_root() || !is_virtualenv_path(&entry.rel_path));
        info!("{} entries after virtualenv pruning", entries.len());
    }

    Ok(sort_entries(entries, options.sort_by, options.reverse))
}
