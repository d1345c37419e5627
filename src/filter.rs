/*!
 * Ignore-rule filtering
 *
 * Loads the `.gitignore` sitting directly in a project root and answers
 * whether paths under that root are excluded. Also hosts the virtual
 * environment predicate used when loading a project.
 */

use std::path::{Component, Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{error, info, warn};

use crate::utils::VIRTUALENV_DIRS;

/// Name of the ignore-rules file looked up in the root
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Gitignore-based path filter for a single project root.
///
/// Inert when the root has no readable `.gitignore`: nothing is ignored.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    root: PathBuf,
    rules: Option<Gitignore>,
    ignore_path: Option<PathBuf>,
}

impl IgnoreFilter {
    /// Load `<root>/.gitignore`; parent and child directories are not searched
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let candidate = root.join(IGNORE_FILE_NAME);

        if !candidate.is_file() {
            info!("No {} found at {}", IGNORE_FILE_NAME, candidate.display());
            return Self::inert(root);
        }

        let mut builder = GitignoreBuilder::new(&root);
        if let Some(err) = builder.add(&candidate) {
            // Partial errors (bad glob lines) still leave the valid rules in place
            if err.is_io() {
                error!("Failed to read {}: {}", candidate.display(), err);
                return Self::inert(root);
            }
            warn!("Some rules in {} were skipped: {}", candidate.display(), err);
        }

        match builder.build() {
            Ok(rules) => {
                info!("Loaded {} ({} rules)", candidate.display(), rules.num_ignores() + rules.num_whitelists());
                Self {
                    root,
                    rules: Some(rules),
                    ignore_path: Some(candidate),
                }
            }
            Err(e) => {
                error!("Failed to compile {}: {}", candidate.display(), e);
                Self::inert(root)
            }
        }
    }

    fn inert(root: PathBuf) -> Self {
        Self {
            root,
            rules: None,
            ignore_path: None,
        }
    }

    /// Whether an ignore file was loaded
    pub fn has_rules(&self) -> bool {
        self.rules.is_some()
    }

    /// Path of the loaded ignore file, if any
    pub fn gitignore_path(&self) -> Option<&Path> {
        self.ignore_path.as_deref()
    }

    /// Root directory this filter has jurisdiction over
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` is excluded by the loaded rules.
    ///
    /// Absolute paths outside the root are never ignored. Relative paths
    /// are taken as relative to the root. A rule matching any parent
    /// directory also excludes everything beneath it.
    pub fn should_ignore(&self, path: &Path) -> bool {
        let Some(rules) = &self.rules else {
            return false;
        };

        let (relative, absolute) = if path.is_absolute() {
            match path.strip_prefix(&self.root) {
                Ok(rel) => (rel.to_path_buf(), path.to_path_buf()),
                Err(_) => return false,
            }
        } else {
            (path.to_path_buf(), self.root.join(path))
        };

        let Some(normalized) = normalize_separators(&relative) else {
            error!("Cannot match path outside of root: {}", path.display());
            return false;
        };
        if normalized.is_empty() {
            return false;
        }

        rules
            .matched_path_or_any_parents(Path::new(&normalized), absolute.is_dir())
            .is_ignore()
    }

    /// Keep only the paths that are not ignored
    pub fn filter_paths<P: AsRef<Path>>(&self, paths: Vec<P>) -> Vec<P> {
        if !self.has_rules() {
            return paths;
        }

        paths
            .into_iter()
            .filter(|p| !self.should_ignore(p.as_ref()))
            .collect()
    }
}

/// Join normal components with `/`, dropping `.`; `None` if the path climbs
/// out with `..` or carries a root/prefix
fn normalize_separators(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Whether a relative path lies inside a Python virtual environment folder
pub fn is_virtualenv_path(rel_path: &Path) -> bool {
    rel_path.components().any(|component| match component {
        Component::Normal(part) => {
            let part = part.to_string_lossy();
            VIRTUALENV_DIRS.contains(&part.as_ref()) || part.starts_with("venv-")
        }
        _ => false,
    })
}
