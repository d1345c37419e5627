/*!
 * Directory scanning functionality
 *
 * Produces a flat list of [`Entry`] values in scan order. Per-entry
 * problems are recorded on the entry or logged; only a bad root aborts.
 */

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classify::is_hidden;
use crate::ensure;
use crate::error::Result;
use crate::types::{Entry, EntryError};

/// Options controlling a directory scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Traverse into symlinked directories
    pub follow_symlinks: bool,
    /// Keep hidden entries (and descend into hidden directories)
    pub include_hidden: bool,
}

/// Scanner for directory contents
pub struct Scanner {
    options: ScanOptions,
    /// Progress bar, ticked once per discovered entry
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner with a hidden progress bar
    pub fn new(options: ScanOptions) -> Self {
        Self::with_progress(options, Arc::new(ProgressBar::hidden()))
    }

    /// Create a new scanner reporting to `progress`
    pub fn with_progress(options: ScanOptions, progress: Arc<ProgressBar>) -> Self {
        Self { options, progress }
    }

    /// Scan `root` recursively.
    ///
    /// The first entry is always the root itself with `rel_path == "."`.
    /// The rest follow walk order; sort explicitly before presenting them.
    pub fn scan(&self, root: &Path) -> Result<Vec<Entry>> {
        ensure!(root.exists(), NotFound, "Path does not exist: {}", root.display());
        ensure!(
            root.is_dir(),
            InvalidArgument,
            "Path is not a directory: {}",
            root.display()
        );

        info!("Scanning directory: {}", root.display());

        let mut entries = vec![root_entry(root)];
        let mut recorded: HashSet<PathBuf> = HashSet::new();
        recorded.insert(root.to_path_buf());

        let include_hidden = self.options.include_hidden;
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || include_hidden || !is_hidden(e.path()));

        for result in walker {
            match result {
                Ok(dent) => {
                    let entry = self.entry_from(root, &dent);
                    self.progress.inc(1);
                    self.progress
                        .set_message(format!("Scanning: {}", entry.rel_path.display()));
                    recorded.insert(entry.path.clone());
                    entries.push(entry);
                }
                Err(err) => self.record_walk_error(root, err, &recorded, &mut entries),
            }
        }

        info!(
            "Scan complete: {} ({} entries)",
            root.display(),
            entries.len()
        );

        Ok(entries)
    }

    fn entry_from(&self, root: &Path, dent: &DirEntry) -> Entry {
        let path = dent.path().to_path_buf();
        let is_symlink = dent.path_is_symlink();
        // Without following, a symlink is listed but never treated as a directory
        let is_dir = dent.file_type().is_dir() && (!is_symlink || self.options.follow_symlinks);

        let (size, modified) = match dent.metadata() {
            Ok(metadata) => (
                if is_dir { 0 } else { metadata.len() },
                metadata.modified().ok(),
            ),
            Err(e) => {
                debug!("No metadata for {}: {}", path.display(), e);
                (0, None)
            }
        };

        Entry {
            rel_path: relative_to(root, &path),
            is_dir: Some(is_dir),
            is_symlink,
            is_hidden: is_hidden(&path),
            size,
            modified,
            error: None,
            path,
        }
    }

    /// Recover from a walk error: a failed directory listing is logged and
    /// skipped, an uninspectable child is recorded with an error marker
    fn record_walk_error(
        &self,
        root: &Path,
        err: walkdir::Error,
        recorded: &HashSet<PathBuf>,
        entries: &mut Vec<Entry>,
    ) {
        let Some(path) = err.path().map(Path::to_path_buf) else {
            error!("Error while scanning {}: {}", root.display(), err);
            return;
        };

        // Followed link back to an ancestor: list the link, do not descend
        if let Some(ancestor) = err.loop_ancestor() {
            warn!(
                "Symlink loop at {} (points back to {})",
                path.display(),
                ancestor.display()
            );
            self.push_unfollowed_link(root, path, entries);
            return;
        }

        let kind = err.io_error().map(io::Error::kind);

        if recorded.contains(&path) {
            match kind {
                Some(io::ErrorKind::PermissionDenied) => {
                    warn!("Directory access denied: {}", path.display())
                }
                _ => error!("Error scanning directory {}: {}", path.display(), err),
            }
            return;
        }

        match kind {
            Some(io::ErrorKind::PermissionDenied) => {
                warn!("Access denied: {}", path.display());
                let is_hidden = is_hidden(&path);
                if is_hidden && !self.options.include_hidden {
                    return;
                }
                entries.push(Entry {
                    rel_path: relative_to(root, &path),
                    is_dir: None,
                    is_symlink: path.is_symlink(),
                    is_hidden,
                    size: 0,
                    modified: None,
                    error: Some(EntryError::AccessDenied),
                    path,
                });
            }
            // Dangling symlink while following: list it like an unfollowed link
            Some(io::ErrorKind::NotFound) if path.is_symlink() => {
                debug!("Dangling symlink: {}", path.display());
                self.push_unfollowed_link(root, path, entries);
            }
            _ => error!("Error processing entry {}: {}", path.display(), err),
        }
    }

    /// Record a symlink that could not be followed as a plain link entry.
    /// Walk errors bypass the hidden filter, so it is applied here.
    fn push_unfollowed_link(&self, root: &Path, path: PathBuf, entries: &mut Vec<Entry>) {
        let is_hidden = is_hidden(&path);
        if is_hidden && !self.options.include_hidden {
            return;
        }

        entries.push(Entry {
            rel_path: relative_to(root, &path),
            is_dir: Some(false),
            is_symlink: true,
            is_hidden,
            size: 0,
            modified: None,
            error: None,
            path,
        });
    }
}

/// Scan `root` with the given flags; see [`Scanner::scan`]
pub fn scan_directory(root: &Path, follow_symlinks: bool, include_hidden: bool) -> Result<Vec<Entry>> {
    Scanner::new(ScanOptions {
        follow_symlinks,
        include_hidden,
    })
    .scan(root)
}

fn root_entry(root: &Path) -> Entry {
    let modified = fs::metadata(root).and_then(|m| m.modified()).ok();

    Entry {
        path: root.to_path_buf(),
        rel_path: PathBuf::from("."),
        is_dir: Some(true),
        is_symlink: root.is_symlink(),
        is_hidden: is_hidden(root),
        size: 0,
        modified,
        error: None,
    }
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
