//! Possibly-partial directory listings and the pages they are built from.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::entry::DirectoryEntry;
use super::path::RemotePath;

/// Opaque continuation token returned by a paginated listing call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page as returned by [`RemoteDirectoryClient::list`].
///
/// [`RemoteDirectoryClient::list`]: crate::remote::RemoteDirectoryClient::list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub entries: Vec<DirectoryEntry>,
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

impl Page {
    /// A final page with no continuation.
    pub fn last(entries: Vec<DirectoryEntry>) -> Self {
        Self {
            entries,
            next_cursor: None,
            has_more: false,
        }
    }

    /// A page followed by more, resumable from `cursor`.
    pub fn more(entries: Vec<DirectoryEntry>, cursor: Cursor) -> Self {
        Self {
            entries,
            next_cursor: Some(cursor),
            has_more: true,
        }
    }

    /// Whether this page ends the listing.
    ///
    /// A page claiming `has_more` without a cursor cannot be continued and
    /// is treated as final.
    fn is_final(&self) -> bool {
        if self.has_more && self.next_cursor.is_none() {
            tracing::warn!("page reports more entries but carries no cursor");
        }
        !self.has_more || self.next_cursor.is_none()
    }
}

/// The known contents of one directory at a point in time.
///
/// Immutable: appending a page produces a new `Listing`. While
/// [`is_complete`](Self::is_complete) is `false` the entries are only the
/// pages fetched so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    path: RemotePath,
    entries: Vec<DirectoryEntry>,
    cursor: Option<Cursor>,
    complete: bool,
    fetched_at: Instant,
}

impl Listing {
    /// Builds a listing from the first page of a fresh fetch.
    pub fn from_first_page(path: RemotePath, page: Page, now: Instant) -> Self {
        let complete = page.is_final();
        let cursor = if complete { None } else { page.next_cursor };
        let mut seen = HashSet::new();
        let entries = page
            .entries
            .into_iter()
            .filter(|e| seen.insert(e.name().to_string()))
            .collect();
        Self {
            path,
            entries,
            cursor,
            complete,
            fetched_at: now,
        }
    }

    /// Returns a new listing with `page` appended.
    ///
    /// Names already present are skipped. `fetched_at` keeps the time of the
    /// first page, so staleness is measured from the start of the snapshot.
    pub fn with_page(&self, page: Page) -> Self {
        let complete = page.is_final();
        let cursor = if complete { None } else { page.next_cursor };
        let mut seen: HashSet<String> = self.entries.iter().map(|e| e.name().to_string()).collect();
        let mut entries = self.entries.clone();
        for entry in page.entries {
            if seen.insert(entry.name().to_string()) {
                entries.push(entry);
            } else {
                tracing::debug!(
                    path = %self.path,
                    name = entry.name(),
                    "skipping duplicate name in page"
                );
            }
        }
        Self {
            path: self.path.clone(),
            entries,
            cursor,
            complete,
            fetched_at: self.fetched_at,
        }
    }

    /// Returns a new listing without the entry called `name`.
    pub fn without_entry(&self, name: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|e| e.name() != name)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Continuation token for the next page, if pagination is ongoing.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    /// Looks up an entry by name.
    pub fn entry(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// Returns `true` once the listing is older than `ttl` at `now`.
    pub fn is_stale_at(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<DirectoryEntry> {
        names
            .iter()
            .map(|n| DirectoryEntry::file(n, 1, format!("id:{n}")).unwrap())
            .collect()
    }

    fn names(listing: &Listing) -> Vec<&str> {
        listing.entries().iter().map(|e| e.name()).collect()
    }

    #[test]
    fn single_final_page_is_complete() {
        let listing = Listing::from_first_page(
            RemotePath::parse("/a"),
            Page::last(files(&["x", "y"])),
            Instant::now(),
        );
        assert!(listing.is_complete());
        assert!(listing.cursor().is_none());
        assert_eq!(names(&listing), vec!["x", "y"]);
    }

    #[test]
    fn pages_append_in_order() {
        let now = Instant::now();
        let first = Listing::from_first_page(
            RemotePath::parse("/a"),
            Page::more(files(&["a", "b"]), Cursor::new("c1")),
            now,
        );
        assert!(!first.is_complete());
        assert_eq!(first.cursor(), Some(&Cursor::new("c1")));

        let second = first.with_page(Page::more(files(&["c", "d"]), Cursor::new("c2")));
        let third = second.with_page(Page::last(files(&["e"])));

        assert_eq!(names(&third), vec!["a", "b", "c", "d", "e"]);
        assert!(third.is_complete());
        assert!(third.cursor().is_none());
        assert_eq!(third.fetched_at(), now);
        // the original is untouched
        assert_eq!(names(&first), vec!["a", "b"]);
    }

    #[test]
    fn duplicate_names_are_skipped() {
        let first = Listing::from_first_page(
            RemotePath::parse("/a"),
            Page::more(files(&["a", "a", "b"]), Cursor::new("c1")),
            Instant::now(),
        );
        let next = first.with_page(Page::last(files(&["b", "c"])));
        assert_eq!(names(&next), vec!["a", "b", "c"]);
    }

    #[test]
    fn has_more_without_cursor_is_final() {
        let page = Page {
            entries: files(&["a"]),
            next_cursor: None,
            has_more: true,
        };
        let listing = Listing::from_first_page(RemotePath::root(), page, Instant::now());
        assert!(listing.is_complete());
    }

    #[test]
    fn without_entry_removes_by_name() {
        let listing = Listing::from_first_page(
            RemotePath::root(),
            Page::last(files(&["a", "b", "c"])),
            Instant::now(),
        );
        let trimmed = listing.without_entry("b");
        assert_eq!(names(&trimmed), vec!["a", "c"]);
        assert!(trimmed.entry("b").is_none());
        assert!(listing.entry("b").is_some());
    }

    #[test]
    fn staleness_is_measured_from_first_page() {
        let now = Instant::now();
        let listing = Listing::from_first_page(RemotePath::root(), Page::last(vec![]), now);
        let ttl = Duration::from_secs(60);
        assert!(!listing.is_stale_at(ttl, now + Duration::from_secs(60)));
        assert!(listing.is_stale_at(ttl, now + Duration::from_secs(61)));
    }
}
