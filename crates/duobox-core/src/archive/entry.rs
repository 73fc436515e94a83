//! Directory entry representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{CoreError, CoreResult};

/// Whether an entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// A single file or folder inside a remote directory.
///
/// `DirectoryEntry` is immutable. Folder sizes are always reported as `0`;
/// `modified_at` is `None` for folders because the remote service does not
/// track it for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    name: String,
    kind: EntryKind,
    size: u64,
    modified_at: Option<DateTime<Utc>>,
    remote_id: String,
}

impl DirectoryEntry {
    /// Creates an entry, validating and NFC-normalizing `name`.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidName`] if the name is empty, `.`/`..`, or
    /// contains a `/`.
    pub fn new(
        name: &str,
        kind: EntryKind,
        size: u64,
        modified_at: Option<DateTime<Utc>>,
        remote_id: impl Into<String>,
    ) -> CoreResult<Self> {
        let name: String = name.nfc().collect();
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(CoreError::InvalidName(name));
        }
        Ok(Self {
            name,
            kind,
            size: match kind {
                EntryKind::File => size,
                EntryKind::Folder => 0,
            },
            modified_at,
            remote_id: remote_id.into(),
        })
    }

    /// Shorthand for a folder entry.
    pub fn folder(name: &str, remote_id: impl Into<String>) -> CoreResult<Self> {
        Self::new(name, EntryKind::Folder, 0, None, remote_id)
    }

    /// Shorthand for a file entry.
    pub fn file(name: &str, size: u64, remote_id: impl Into<String>) -> CoreResult<Self> {
        Self::new(name, EntryKind::File, size, None, remote_id)
    }

    /// Returns a copy with the modification time set.
    pub fn with_modified_at(self, modified_at: DateTime<Utc>) -> Self {
        Self {
            modified_at: Some(modified_at),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns `true` for folders.
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Size in bytes. Always `0` for folders.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// Opaque, stable identity of the remote object.
    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    /// Returns `true` if the name starts with `.`.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_keeps_size() {
        let entry = DirectoryEntry::file("notes.txt", 120, "id:1").unwrap();
        assert_eq!(entry.name(), "notes.txt");
        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.size(), 120);
        assert_eq!(entry.remote_id(), "id:1");
        assert!(!entry.is_folder());
        assert!(entry.modified_at().is_none());
    }

    #[test]
    fn folder_size_is_forced_to_zero() {
        let entry = DirectoryEntry::new("jan", EntryKind::Folder, 4096, None, "id:2").unwrap();
        assert!(entry.is_folder());
        assert_eq!(entry.size(), 0, "folder size should always be 0");
    }

    #[test]
    fn rejects_empty_name() {
        let err = DirectoryEntry::file("", 1, "id").unwrap_err();
        assert!(matches!(err, CoreError::InvalidName(_)));
    }

    #[test]
    fn rejects_separator_in_name() {
        assert!(DirectoryEntry::folder("a/b", "id").is_err());
    }

    #[test]
    fn rejects_dot_names() {
        assert!(DirectoryEntry::folder(".", "id").is_err());
        assert!(DirectoryEntry::folder("..", "id").is_err());
    }

    #[test]
    fn hidden_detection() {
        let entry = DirectoryEntry::file(".env", 3, "id").unwrap();
        assert!(entry.is_hidden());
    }

    #[test]
    fn with_modified_at_sets_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let entry = DirectoryEntry::file("a.pdf", 1, "id").unwrap().with_modified_at(ts);
        assert_eq!(entry.modified_at(), Some(ts));
    }

    #[test]
    fn names_are_nfc_normalized() {
        let entry = DirectoryEntry::file("cafe\u{301}.txt", 1, "id").unwrap();
        assert_eq!(entry.name(), "caf\u{e9}.txt");
    }

    #[test]
    fn entry_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntryKind::Folder).unwrap();
        assert_eq!(json, "\"folder\"");
    }
}
