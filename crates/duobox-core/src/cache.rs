//! Shared cache of directory listings.
//!
//! [`ListingCache`] holds at most `capacity` listings in LRU order, reports
//! staleness against a TTL, and keeps a registry of in-flight fetches so
//! that each path has at most one outstanding remote call. Callers that
//! ask for a path already being fetched are attached as waiters and
//! receive the same result.
//!
//! The cache never performs I/O itself: [`ListingCache::fetch`] hands out a
//! [`FetchTicket`] describing the call to make, and the result comes back
//! through [`ListingCache::complete`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::archive::{Cursor, Listing, Page, RemotePath};
use crate::error::TransportError;

/// A remote `list` call the caller must issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub path: RemotePath,
    /// `None` for a first page, otherwise the cursor to continue from.
    pub cursor: Option<Cursor>,
    /// Unique per issued call.
    pub generation: u64,
}

impl FetchTicket {
    pub fn is_continuation(&self) -> bool {
        self.cursor.is_some()
    }
}

/// The result of a ticket's remote call.
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Page, TransportError>,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The page was committed; this is the listing now cached.
    Applied(Arc<Listing>),
    /// The call failed. Only already committed pages remain cached.
    Failed(TransportError),
    /// The result was ignored because the fetch had been superseded or no
    /// longer fits the cached listing. Waiters should re-request.
    Discarded,
}

/// A completed fetch together with everyone waiting on it.
#[derive(Debug)]
pub struct Resolution<W> {
    pub path: RemotePath,
    pub continuation: bool,
    pub outcome: Outcome,
    pub waiters: Vec<W>,
    /// Waiters that asked for the other kind of page (first page vs.
    /// continuation) and were only parked on this fetch. The outcome does
    /// not apply to them; they should re-request.
    pub followers: Vec<W>,
}

#[derive(Debug)]
struct Slot {
    listing: Arc<Listing>,
    touched: u64,
}

#[derive(Debug)]
struct PendingFetch<W> {
    generation: u64,
    cursor: Option<Cursor>,
    waiters: Vec<W>,
    followers: Vec<W>,
    superseded: bool,
}

/// LRU + TTL listing cache with in-flight fetch deduplication.
///
/// `W` identifies a waiter; the navigation layer uses it to route results
/// back to the panel that asked.
#[derive(Debug)]
pub struct ListingCache<W> {
    capacity: usize,
    ttl: Duration,
    listings: HashMap<RemotePath, Slot>,
    pending: HashMap<RemotePath, PendingFetch<W>>,
    tick: u64,
    next_generation: u64,
}

impl<W: PartialEq> ListingCache<W> {
    /// Creates an empty cache. A capacity of `0` is treated as `1`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            listings: HashMap::new(),
            pending: HashMap::new(),
            tick: 0,
            next_generation: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of cached listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Returns the cached listing for `path`, stale or not, and marks it as
    /// recently used.
    pub fn get(&mut self, path: &RemotePath) -> Option<Arc<Listing>> {
        let tick = self.bump();
        self.listings.get_mut(path).map(|slot| {
            slot.touched = tick;
            Arc::clone(&slot.listing)
        })
    }

    /// Like [`get`](Self::get) without touching recency.
    pub fn peek(&self, path: &RemotePath) -> Option<Arc<Listing>> {
        self.listings.get(path).map(|slot| Arc::clone(&slot.listing))
    }

    /// Returns `true` if `path` is absent or older than the TTL.
    pub fn is_stale(&self, path: &RemotePath) -> bool {
        self.is_stale_at(path, Instant::now())
    }

    pub fn is_stale_at(&self, path: &RemotePath, now: Instant) -> bool {
        self.listings
            .get(path)
            .map_or(true, |slot| slot.listing.is_stale_at(self.ttl, now))
    }

    /// Returns `true` while a live fetch for `path` is outstanding.
    pub fn is_pending(&self, path: &RemotePath) -> bool {
        self.pending.get(path).is_some_and(|p| !p.superseded)
    }

    /// Returns `true` while any fetch, live or superseded, awaits its result.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Requests a page of `path` on behalf of `waiter`.
    ///
    /// Returns the ticket to issue, or `None` when the waiter was attached
    /// to a fetch already in flight. A first-page request replaces an
    /// in-flight continuation; a continuation request joins whatever is in
    /// flight.
    ///
    /// A waiter only receives the outcome of a fetch of the kind it asked
    /// for. Waiters that end up on a fetch of the other kind (by joining it,
    /// or by being carried over when it replaced their own) are returned as
    /// [`Resolution::followers`].
    pub fn fetch(
        &mut self,
        path: &RemotePath,
        cursor: Option<Cursor>,
        waiter: W,
    ) -> Option<FetchTicket> {
        let mut waiters = Vec::new();
        let mut followers = Vec::new();
        if let Some(pending) = self.pending.get_mut(path) {
            let same_kind = pending.cursor.is_some() == cursor.is_some();
            let replaces = pending.superseded || (cursor.is_none() && pending.cursor.is_some());
            if !replaces {
                let known =
                    pending.waiters.contains(&waiter) || pending.followers.contains(&waiter);
                if !known && same_kind {
                    pending.waiters.push(waiter);
                } else if !known {
                    pending.followers.push(waiter);
                }
                tracing::debug!(%path, generation = pending.generation, "joined in-flight fetch");
                return None;
            }
            followers = std::mem::take(&mut pending.followers);
            if same_kind {
                waiters = std::mem::take(&mut pending.waiters);
            } else {
                followers.append(&mut pending.waiters);
            }
        }
        followers.retain(|w| *w != waiter);
        if !waiters.contains(&waiter) {
            waiters.push(waiter);
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.pending.insert(
            path.clone(),
            PendingFetch {
                generation,
                cursor: cursor.clone(),
                waiters,
                followers,
                superseded: false,
            },
        );
        tracing::debug!(%path, generation, continuation = cursor.is_some(), "issuing fetch");
        Some(FetchTicket {
            path: path.clone(),
            cursor,
            generation,
        })
    }

    /// Commits the result of a ticket and hands back its waiters.
    ///
    /// Returns `None` when the ticket is no longer the live fetch for its
    /// path (it was superseded and a newer ticket issued); the newer ticket
    /// owns the waiters.
    pub fn complete(&mut self, completion: FetchCompletion) -> Option<Resolution<W>> {
        let FetchCompletion { ticket, result } = completion;
        let path = ticket.path;

        let live = self
            .pending
            .get(&path)
            .is_some_and(|p| p.generation == ticket.generation);
        if !live {
            tracing::debug!(
                %path,
                generation = ticket.generation,
                "dropping result of replaced fetch"
            );
            return None;
        }
        let pending = self.pending.remove(&path)?;
        let continuation = ticket.cursor.is_some();

        if pending.superseded {
            tracing::debug!(
                %path,
                generation = ticket.generation,
                "discarding result of invalidated fetch"
            );
            return Some(Resolution {
                path,
                continuation,
                outcome: Outcome::Discarded,
                waiters: pending.waiters,
                followers: pending.followers,
            });
        }

        let outcome = match result {
            Ok(page) => match ticket.cursor {
                None => {
                    let listing =
                        Arc::new(Listing::from_first_page(path.clone(), page, Instant::now()));
                    self.insert(listing.clone());
                    Outcome::Applied(listing)
                }
                Some(cursor) => {
                    let current = self
                        .listings
                        .get(&path)
                        .map(|slot| Arc::clone(&slot.listing))
                        .filter(|listing| listing.cursor() == Some(&cursor));
                    match current {
                        Some(listing) => {
                            let next = Arc::new(listing.with_page(page));
                            self.insert(next.clone());
                            Outcome::Applied(next)
                        }
                        None => {
                            tracing::debug!(%path, "continuation no longer matches cached listing");
                            Outcome::Discarded
                        }
                    }
                }
            },
            Err(error) => {
                if error.is_not_found() {
                    self.forget(&path);
                }
                tracing::warn!(%path, %error, continuation, "fetch failed");
                Outcome::Failed(error)
            }
        };

        Some(Resolution {
            path,
            continuation,
            outcome,
            waiters: pending.waiters,
            followers: pending.followers,
        })
    }

    /// Drops the cached listing of `path` and supersedes its in-flight
    /// fetch, if any.
    pub fn invalidate(&mut self, path: &RemotePath) {
        self.listings.remove(path);
        if let Some(pending) = self.pending.get_mut(path) {
            pending.superseded = true;
        }
        tracing::debug!(%path, "invalidated");
    }

    /// Stores `listing`, replacing any cached listing for its path.
    pub fn store(&mut self, listing: Arc<Listing>) {
        self.insert(listing);
    }

    /// Removes the entry `name` from the cached listing of `parent`.
    pub fn remove_entry(&mut self, parent: &RemotePath, name: &str) {
        if let Some(slot) = self.listings.get_mut(parent) {
            if slot.listing.entry(name).is_some() {
                slot.listing = Arc::new(slot.listing.without_entry(name));
            }
        }
    }

    /// Forgets a path that no longer exists remotely.
    fn forget(&mut self, path: &RemotePath) {
        self.listings.remove(path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            self.remove_entry(&parent, name);
        }
    }

    fn bump(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn insert(&mut self, listing: Arc<Listing>) {
        let path = listing.path().clone();
        let touched = self.bump();
        self.listings.insert(path.clone(), Slot { listing, touched });
        self.evict(&path);
    }

    fn evict(&mut self, keep: &RemotePath) {
        while self.listings.len() > self.capacity {
            let victim = self
                .listings
                .iter()
                .filter(|(path, _)| *path != keep && !self.pending.contains_key(*path))
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(path, _)| path.clone());
            match victim {
                Some(path) => {
                    self.listings.remove(&path);
                    tracing::debug!(%path, "evicted listing");
                }
                None => {
                    tracing::debug!(
                        len = self.listings.len(),
                        capacity = self.capacity,
                        "cache capacity exceeded: every other listing is pending"
                    );
                    break;
                }
            }
        }
    }
}
