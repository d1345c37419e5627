/*!
 * Entry ordering for presentation
 */

use std::cmp::Ordering;
use std::str::FromStr;

use log::{debug, warn};
use strum::{Display, EnumIter, EnumString};

use crate::types::Entry;
use crate::utils::dotted_extension;

/// Secondary sort key; directories always come first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortBy {
    /// Case-insensitive name
    #[default]
    Name,
    /// Size in bytes
    Size,
    /// Extension, then case-insensitive name
    Type,
    /// Modification time
    Date,
}

impl SortBy {
    /// Parse a key name, falling back to [`SortBy::Name`] for unknown keys
    pub fn parse_or_default(key: &str) -> Self {
        Self::from_str(key).unwrap_or_else(|_| {
            warn!("Unknown sort key {:?}, sorting by name", key);
            Self::Name
        })
    }
}

/// Stable sort of `entries`: directories before files, then by `sort_by`.
///
/// `reverse` flips the whole ordering, directory grouping included; entries
/// that compare equal keep their original relative order either way.
/// Entries of unknown kind sort with the files.
pub fn sort_entries(mut entries: Vec<Entry>, sort_by: SortBy, reverse: bool) -> Vec<Entry> {
    debug!("Sorting {} entries by {} (reverse={})", entries.len(), sort_by, reverse);

    entries.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });

    entries
}

fn compare(a: &Entry, b: &Entry, sort_by: SortBy) -> Ordering {
    let files_last = is_file_like(a).cmp(&is_file_like(b));

    files_last.then_with(|| match sort_by {
        SortBy::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        SortBy::Size => a.size.cmp(&b.size),
        SortBy::Type => dotted_extension(&a.path)
            .cmp(&dotted_extension(&b.path))
            .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase())),
        SortBy::Date => a.modified.cmp(&b.modified),
    })
}

fn is_file_like(entry: &Entry) -> bool {
    entry.is_dir != Some(true)
}
