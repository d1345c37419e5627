/*!
 * Core types and data structures for promptmap
 */

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Marker for an entry that could not be fully inspected during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryError {
    /// Permission denied while inspecting the entry
    AccessDenied,
}

/// One filesystem item discovered by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Absolute location
    pub path: PathBuf,
    /// Path relative to the scan root, `"."` for the root itself
    pub rel_path: PathBuf,
    /// `None` when the entry carries an error and its kind is unknown.
    /// Symlinks that are not followed are always `Some(false)`.
    pub is_dir: Option<bool>,
    /// Whether the entry itself is a symbolic link
    pub is_symlink: bool,
    /// Dot-prefixed name or platform hidden attribute
    pub is_hidden: bool,
    /// Size in bytes (0 for directories and failed entries)
    pub size: u64,
    /// Last modification time, if it could be read
    pub modified: Option<SystemTime>,
    /// Set when the entry could not be fully inspected
    pub error: Option<EntryError>,
}

impl Entry {
    /// Whether this is the synthesized scan root
    pub fn is_root(&self) -> bool {
        self.rel_path == Path::new(".")
    }

    /// Base name of the entry, empty for paths without one
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// A caller-provided record identifying one checked file or directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Absolute location on disk
    pub absolute_path: PathBuf,
    /// Path relative to the project root, `"."` for the root itself
    pub relative_path: PathBuf,
    /// Whether the item renders as a directory
    pub is_dir: bool,
}

impl SelectionItem {
    /// Build an item from its absolute and root-relative paths
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<PathBuf>,
        is_dir: bool,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            relative_path: relative_path.into(),
            is_dir,
        }
    }
}

impl From<&Entry> for SelectionItem {
    fn from(entry: &Entry) -> Self {
        Self {
            absolute_path: entry.path.clone(),
            relative_path: entry.rel_path.clone(),
            is_dir: entry.is_dir.unwrap_or(false),
        }
    }
}

/// Anything the output formatter can place in a file map or contents block
pub trait OutputItem {
    /// Absolute location of the item on disk
    fn absolute_path(&self) -> &Path;
    /// Location relative to the project root
    fn relative_path(&self) -> &Path;
    /// Whether the item renders as a directory
    fn is_directory(&self) -> bool;
}

impl OutputItem for Entry {
    fn absolute_path(&self) -> &Path {
        &self.path
    }

    fn relative_path(&self) -> &Path {
        &self.rel_path
    }

    // Entries of unknown kind render as files
    fn is_directory(&self) -> bool {
        self.is_dir.unwrap_or(false)
    }
}

impl OutputItem for SelectionItem {
    fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    fn is_directory(&self) -> bool {
        self.is_dir
    }
}

/// Why a file's text could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReadErrorKind {
    /// The file does not exist (e.g. deleted after selection)
    FileNotFound,
    /// Permission denied while reading
    AccessDenied,
    /// The file was classified binary
    BinaryFile,
    /// None of the candidate encodings decoded the file
    EncodingDetectionFailed,
    /// Any other I/O failure
    ReadError,
}

/// Failure record returned in place of file text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} - {details}")]
pub struct ReadError {
    pub kind: ReadErrorKind,
    pub details: String,
    /// Encodings tried, only for `EncodingDetectionFailed`
    pub attempted_encodings: Vec<&'static str>,
    /// First few decoder messages, only for `EncodingDetectionFailed`
    pub decode_errors: Vec<String>,
}

impl ReadError {
    pub fn new(kind: ReadErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
            attempted_encodings: Vec::new(),
            decode_errors: Vec::new(),
        }
    }
}

/// Result of reading a file as text
pub type ReadResult = std::result::Result<String, ReadError>;
