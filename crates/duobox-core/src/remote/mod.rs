//! Remote directory service boundary.
//!
//! [`RemoteDirectoryClient`] is the only way the core talks to the remote
//! archive. [`dropbox::DropboxClient`] implements it over HTTP;
//! [`memory::MemoryArchive`] is an in-memory tree used for `--demo` mode
//! and in tests.

pub mod dropbox;
pub mod memory;

use async_trait::async_trait;

use crate::archive::{Cursor, DirectoryEntry, Page, RemotePath};
use crate::error::TransportError;

/// Capability to list and stat paths in a remote archive.
///
/// Implementations must be safe to call concurrently for different paths.
/// The navigation core guarantees at most one outstanding `list` call per
/// path.
#[async_trait]
pub trait RemoteDirectoryClient: Send + Sync {
    /// Lists one page of `path`, resuming from `cursor` when given.
    async fn list(
        &self,
        path: &RemotePath,
        cursor: Option<&Cursor>,
    ) -> Result<Page, TransportError>;

    /// Returns fresh metadata for a single path.
    async fn stat(&self, path: &RemotePath) -> Result<DirectoryEntry, TransportError>;

    /// Short label for the header, e.g. the account name.
    fn label(&self) -> String;
}

pub use dropbox::{DropboxClient, DropboxConfig};
pub use memory::MemoryArchive;
