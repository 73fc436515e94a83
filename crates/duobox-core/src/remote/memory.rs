//! In-memory archive implementing [`RemoteDirectoryClient`].
//!
//! Serves paginated listings from a fixed tree, optionally with latency,
//! and records how many `list` calls each path received. Failures can be
//! injected per path.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::RemoteDirectoryClient;
use crate::archive::{Cursor, DirectoryEntry, Page, RemotePath};
use crate::error::TransportError;

#[derive(Debug, Default)]
struct ArchiveState {
    folders: HashMap<RemotePath, Vec<DirectoryEntry>>,
    list_calls: HashMap<RemotePath, usize>,
    stat_calls: usize,
    fail_next: HashMap<RemotePath, TransportError>,
}

/// A remote archive held entirely in memory.
#[derive(Debug)]
pub struct MemoryArchive {
    page_size: usize,
    latency: Option<Duration>,
    state: Mutex<ArchiveState>,
}

impl MemoryArchive {
    /// Creates an empty archive serving `page_size` entries per page.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            latency: None,
            state: Mutex::new(ArchiveState::default()),
        }
    }

    /// Delays every call by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..self
        }
    }

    /// Sets the contents of `path`, in listing order.
    pub fn with_folder(self, path: &str, entries: Vec<DirectoryEntry>) -> Self {
        self.state()
            .folders
            .insert(RemotePath::parse(path), entries);
        self
    }

    /// A small band library used by `--demo` mode.
    pub fn demo() -> Self {
        let folder = |name: &str| DirectoryEntry::folder(name, format!("id:{name}"));
        let file = |name: &str, size: u64| DirectoryEntry::file(name, size, format!("id:{name}"));

        let mut archive = Self::new(25).with_latency(Duration::from_millis(300));
        let roots = [folder("Archive"), folder("Library"), file("README.txt", 812)];
        archive = archive.with_folder("/", roots.into_iter().flatten().collect());

        let years = ["2022", "2023", "2024"].map(folder);
        archive = archive.with_folder("/Archive", years.into_iter().flatten().collect());
        for year in ["2022", "2023", "2024"] {
            let months = [
                "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
            ];
            let mut entries: Vec<DirectoryEntry> = months.into_iter().flat_map(folder).collect();
            entries.extend(file("notes.txt", 120));
            archive = archive.with_folder(&format!("/Archive/{year}"), entries);
        }

        let instruments = [
            "altsax", "tenorsax", "trumpet1", "trumpet2", "trombone", "piano", "bass", "drums",
        ];
        let charts: Vec<DirectoryEntry> = (1..=120)
            .flat_map(|n| {
                let instrument = instruments[n % instruments.len()];
                file(&format!("chart{n:03}_{instrument}.pdf"), 40_000 + n as u64 * 97)
            })
            .collect();
        archive.with_folder("/Library", charts)
    }

    /// Makes the next `list` call for `path` fail with `error`.
    pub fn fail_next(&self, path: &str, error: TransportError) {
        self.state().fail_next.insert(RemotePath::parse(path), error);
    }

    /// Deletes `path` (and its entry in the parent folder).
    pub fn remove(&self, path: &str) {
        let path = RemotePath::parse(path);
        let mut state = self.state();
        state.folders.remove(&path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(siblings) = state.folders.get_mut(&parent) {
                siblings.retain(|e| e.name() != name);
            }
        }
    }

    /// Number of `list` calls `path` has received.
    pub fn list_calls(&self, path: &str) -> usize {
        self.state()
            .list_calls
            .get(&RemotePath::parse(path))
            .copied()
            .unwrap_or(0)
    }

    /// Number of `list` calls across all paths.
    pub fn total_list_calls(&self) -> usize {
        self.state().list_calls.values().sum()
    }

    /// Number of `stat` calls received.
    pub fn stat_calls(&self) -> usize {
        self.state().stat_calls
    }

    fn state(&self) -> MutexGuard<'_, ArchiveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn cursor_for(path: &RemotePath, offset: usize) -> Cursor {
        Cursor::new(format!("{path}#{offset}"))
    }

    fn offset_from(path: &RemotePath, cursor: &Cursor) -> Result<usize, TransportError> {
        let (cursor_path, offset) = cursor
            .as_str()
            .rsplit_once('#')
            .ok_or_else(|| TransportError::Protocol(format!("bad cursor {}", cursor.as_str())))?;
        if cursor_path != path.as_str() {
            return Err(TransportError::Protocol(format!(
                "cursor for {cursor_path} used on {path}"
            )));
        }
        offset
            .parse()
            .map_err(|_| TransportError::Protocol(format!("bad cursor {}", cursor.as_str())))
    }
}

#[async_trait]
impl RemoteDirectoryClient for MemoryArchive {
    async fn list(
        &self,
        path: &RemotePath,
        cursor: Option<&Cursor>,
    ) -> Result<Page, TransportError> {
        *self.state().list_calls.entry(path.clone()).or_default() += 1;
        self.delay().await;

        let offset = match cursor {
            Some(c) => Self::offset_from(path, c)?,
            None => 0,
        };

        let mut state = self.state();
        if let Some(error) = state.fail_next.remove(path) {
            return Err(error);
        }
        let Some(entries) = state.folders.get(path) else {
            if path.is_root() {
                return Ok(Page::last(Vec::new()));
            }
            return Err(TransportError::NotFound(path.to_string()));
        };

        let end = (offset + self.page_size).min(entries.len());
        let page: Vec<DirectoryEntry> = entries.get(offset..end).unwrap_or_default().to_vec();
        if end < entries.len() {
            Ok(Page::more(page, Self::cursor_for(path, end)))
        } else {
            Ok(Page::last(page))
        }
    }

    async fn stat(&self, path: &RemotePath) -> Result<DirectoryEntry, TransportError> {
        self.state().stat_calls += 1;
        self.delay().await;

        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Err(TransportError::Protocol("the root has no metadata".to_string()));
        };
        self.state()
            .folders
            .get(&parent)
            .and_then(|entries| entries.iter().find(|e| e.name() == name).cloned())
            .ok_or_else(|| TransportError::NotFound(path.to_string()))
    }

    fn label(&self) -> String {
        "demo archive".to_string()
    }
}
