/*!
 * Point-in-time selection of files and directories to format
 */

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use log::warn;

use crate::types::{Entry, SelectionItem};

/// Checked subset of a project's entries.
///
/// Built once from loaded entries and handed to the formatter; it never
/// tracks changes on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<SelectionItem>,
}

impl Selection {
    /// Select every entry, the root included
    pub fn all(entries: &[Entry]) -> Self {
        Self {
            items: entries.iter().map(SelectionItem::from).collect(),
        }
    }

    /// Select the entries named by `rel_paths`. Selecting a directory also
    /// selects everything loaded beneath it, like checking a tree node.
    ///
    /// Paths that match no entry are logged and skipped.
    pub fn from_paths<P: AsRef<Path>>(entries: &[Entry], rel_paths: &[P]) -> Self {
        let wanted: Vec<PathBuf> = rel_paths.iter().map(|p| normalize(p.as_ref())).collect();

        for path in &wanted {
            if !entries.iter().any(|e| normalize(&e.rel_path) == *path) {
                warn!("Selected path not found in project: {}", path.display());
            }
        }

        let selected_dirs: Vec<&PathBuf> = wanted
            .iter()
            .filter(|path| {
                entries
                    .iter()
                    .any(|e| e.is_dir == Some(true) && normalize(&e.rel_path) == **path)
            })
            .collect();

        let mut seen = HashSet::new();
        let items = entries
            .iter()
            .filter(|entry| {
                let rel = normalize(&entry.rel_path);
                wanted.contains(&rel) || selected_dirs.iter().any(|dir| is_under(&rel, dir))
            })
            .filter(|entry| seen.insert(entry.path.clone()))
            .map(SelectionItem::from)
            .collect();

        Self { items }
    }

    /// Wrap caller-built items as they are
    pub fn from_items(items: Vec<SelectionItem>) -> Self {
        Self { items }
    }

    /// All selected items, files and directories
    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    /// Selected files only
    pub fn files(&self) -> Vec<&SelectionItem> {
        self.items.iter().filter(|item| !item.is_dir).collect()
    }

    /// Number of selected files
    pub fn file_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_dir).count()
    }

    /// Number of selected directories, excluding the root
    pub fn dir_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.is_dir && item.relative_path != Path::new("."))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Drop `.` components so `./src` and `src` compare equal; the root stays `.`
fn normalize(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

fn is_under(path: &Path, dir: &Path) -> bool {
    if dir == Path::new(".") {
        return true;
    }
    path != dir && path.starts_with(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rel: &str, is_dir: bool) -> Entry {
        Entry {
            path: Path::new("/proj").join(rel),
            rel_path: PathBuf::from(rel),
            is_dir: Some(is_dir),
            is_symlink: false,
            is_hidden: false,
            size: 0,
            modified: None,
            error: None,
        }
    }

    fn entries() -> Vec<Entry> {
        vec![
            entry(".", true),
            entry("a.py", false),
            entry("sub", true),
            entry("sub/b.txt", false),
            entry("sub/deep", true),
            entry("sub/deep/c.rs", false),
            entry("subway.txt", false),
        ]
    }

    fn rels(selection: &Selection) -> Vec<String> {
        selection
            .items()
            .iter()
            .map(|i| i.relative_path.display().to_string())
            .collect()
    }

    #[test]
    fn test_select_all() {
        let selection = Selection::all(&entries());
        assert_eq!(selection.items().len(), 7);
        assert_eq!(selection.file_count(), 4);
        assert_eq!(selection.dir_count(), 2);
    }

    #[test]
    fn test_directory_selects_descendants() {
        let selection = Selection::from_paths(&entries(), &["sub"]);
        assert_eq!(rels(&selection), ["sub", "sub/b.txt", "sub/deep", "sub/deep/c.rs"]);
    }

    #[test]
    fn test_file_selection_and_normalization() {
        let selection = Selection::from_paths(&entries(), &["./a.py", "sub/deep/c.rs", "missing.txt"]);
        assert_eq!(rels(&selection), ["a.py", "sub/deep/c.rs"]);
        assert_eq!(selection.files().len(), 2);
        assert_eq!(selection.dir_count(), 0);
    }

    #[test]
    fn test_root_selects_everything_once() {
        let selection = Selection::from_paths(&entries(), &[".", "sub"]);
        assert_eq!(selection.items().len(), 7);
    }
}
