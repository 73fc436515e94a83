//! Data model of the remote archive.
//!
//! [`path::RemotePath`] is the normalized cache key, [`entry::DirectoryEntry`]
//! one immutable file or folder, and [`listing::Listing`] the possibly-partial
//! contents of a directory assembled from [`listing::Page`]s.

pub mod entry;
pub mod listing;
pub mod path;

pub use entry::{DirectoryEntry, EntryKind};
pub use listing::{Cursor, Listing, Page};
pub use path::RemotePath;
