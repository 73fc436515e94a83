//! Sorting and filtering of listing entries for display.
//!
//! The cache keeps entries in fetch order. A [`ViewPolicy`] decides which
//! of them a panel shows and in what order, by producing indices into the
//! listing rather than copying entries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::archive::DirectoryEntry;
use crate::config::settings::ViewConfig;

/// The field by which entries are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Keep the order the remote returned.
    Fetch,
    /// Alphabetically by name, case-insensitive.
    #[default]
    Name,
    /// By size in bytes.
    Size,
    /// By last-modified time; entries without one come first.
    Modified,
}

/// How a panel presents a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPolicy {
    pub sort: SortField,
    pub descending: bool,
    pub folders_first: bool,
    pub show_hidden: bool,
    /// Entries whose name contains any of these substrings are hidden.
    pub exclude: Vec<String>,
    /// Suffix removed from display names, e.g. `.pdf`.
    pub strip_suffix: Option<String>,
}

impl Default for ViewPolicy {
    fn default() -> Self {
        Self {
            sort: SortField::Name,
            descending: false,
            folders_first: true,
            show_hidden: false,
            exclude: Vec::new(),
            strip_suffix: None,
        }
    }
}

impl From<&ViewConfig> for ViewPolicy {
    fn from(config: &ViewConfig) -> Self {
        Self {
            sort: config.sort,
            descending: config.descending,
            folders_first: config.folders_first,
            show_hidden: config.show_hidden,
            exclude: config
                .exclude
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
            strip_suffix: Some(config.strip_suffix.clone()).filter(|s| !s.is_empty()),
        }
    }
}

impl ViewPolicy {
    /// Returns `true` if `entry` passes the hidden and exclude filters.
    pub fn is_visible(&self, entry: &DirectoryEntry) -> bool {
        if !self.show_hidden && entry.is_hidden() {
            return false;
        }
        !self.exclude.iter().any(|s| entry.name().contains(s.as_str()))
    }

    /// Returns the indices of the visible entries in display order.
    ///
    /// The sort is stable, so entries that compare equal keep fetch order.
    pub fn arrange(&self, entries: &[DirectoryEntry]) -> Vec<usize> {
        let mut order: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.is_visible(e))
            .map(|(i, _)| i)
            .collect();

        order.sort_by(|&ia, &ib| {
            let (a, b) = (&entries[ia], &entries[ib]);
            if self.folders_first {
                let kind = b.is_folder().cmp(&a.is_folder());
                if kind != Ordering::Equal {
                    return kind;
                }
            }
            let ord = match self.sort {
                SortField::Fetch => ia.cmp(&ib),
                field => compare_by_field(a, b, field),
            };
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });
        order
    }

    /// Name shown for `entry`, with the configured suffix removed from files.
    pub fn display_name<'a>(&self, entry: &'a DirectoryEntry) -> &'a str {
        match &self.strip_suffix {
            Some(suffix) if !entry.is_folder() => entry
                .name()
                .strip_suffix(suffix.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or(entry.name()),
            _ => entry.name(),
        }
    }
}

fn compare_by_field(a: &DirectoryEntry, b: &DirectoryEntry, field: SortField) -> Ordering {
    match field {
        SortField::Fetch => Ordering::Equal,
        SortField::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        SortField::Size => a.size().cmp(&b.size()),
        SortField::Modified => a.modified_at().cmp(&b.modified_at()),
    }
}
