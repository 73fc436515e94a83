//! Routing of user intents and fetch completions between the panels and
//! the shared listing cache.
//!
//! The controller runs on a single control thread. Remote calls are spawned
//! as tokio tasks that report back through an unbounded channel; every
//! completion is then fed to [`NavigationController::handle_event`], so
//! cache and panel state are only ever touched serially.
//!
//! Each panel carries a generation counter that is bumped on every
//! navigation and refresh. A fetch records the generation of the panel
//! that asked for it, and its result is applied only if that panel has not
//! moved on since. Remote calls are never aborted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::archive::{Cursor, RemotePath};
use crate::cache::{FetchCompletion, FetchTicket, ListingCache, Outcome, Resolution};
use crate::config::settings::Config;
use crate::event::{FetchEvent, Intent};
use crate::nav::filter::ViewPolicy;
use crate::nav::history::History;
use crate::nav::panel::{PanelState, PanelStatus};
use crate::remote::RemoteDirectoryClient;

/// Which of the two panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// A panel waiting on a fetch, tagged with the generation it had when it
/// asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    pub side: Side,
    pub generation: u64,
}

/// Tunables for [`NavigationController`].
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    pub cache_capacity: usize,
    pub ttl: Duration,
    /// Rows from the end of the loaded entries at which the next page is
    /// requested.
    pub prefetch_margin: usize,
    pub policy: ViewPolicy,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for NavigationOptions {
    fn from(config: &Config) -> Self {
        Self {
            cache_capacity: config.cache.capacity,
            ttl: config.cache.ttl(),
            prefetch_margin: config.view.prefetch_margin,
            policy: ViewPolicy::from(&config.view),
        }
    }
}

/// Owns both panels and the shared cache.
pub struct NavigationController {
    panels: [PanelState; 2],
    focused: Side,
    cache: ListingCache<Waiter>,
    client: Arc<dyn RemoteDirectoryClient>,
    events: UnboundedSender<FetchEvent>,
    policy: ViewPolicy,
    prefetch_margin: usize,
}

impl NavigationController {
    /// Creates a controller with both panels idle at the root and the left
    /// panel focused.
    ///
    /// Completions of the remote calls it issues are sent to `events`.
    pub fn new(
        client: Arc<dyn RemoteDirectoryClient>,
        events: UnboundedSender<FetchEvent>,
        options: NavigationOptions,
    ) -> Self {
        Self {
            panels: [
                PanelState::new(RemotePath::root()).with_focus(true),
                PanelState::new(RemotePath::root()),
            ],
            focused: Side::Left,
            cache: ListingCache::new(options.cache_capacity, options.ttl),
            client,
            events,
            policy: options.policy,
            prefetch_margin: options.prefetch_margin,
        }
    }

    /// Opens the start paths of both panels.
    pub fn start(&mut self, left: RemotePath, right: RemotePath) {
        self.navigate(Side::Left, left, None);
        self.navigate(Side::Right, right, None);
    }

    pub fn panel(&self, side: Side) -> &PanelState {
        &self.panels[side.index()]
    }

    pub fn focused(&self) -> Side {
        self.focused
    }

    pub fn policy(&self) -> &ViewPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &ListingCache<Waiter> {
        &self.cache
    }

    /// Label of the remote archive, for the header.
    pub fn remote_label(&self) -> String {
        self.client.label()
    }

    /// Applies a user intent. Never blocks on the remote.
    pub fn handle_intent(&mut self, intent: Intent) {
        let side = self.focused;
        match intent {
            Intent::EnterSelected => {
                let Some(entry) = self.panel(side).selected_entry() else {
                    return;
                };
                if entry.is_folder() {
                    let target = self.panel(side).path().join(entry.name());
                    self.navigate(side, target, None);
                } else {
                    self.inspect(side);
                }
            }
            Intent::GoUp => {
                if let Some(parent) = self.panel(side).path().parent() {
                    self.navigate(side, parent, None);
                }
            }
            Intent::SwitchFocus => {
                self.focused = side.other();
                self.update(side, |p| p.with_focus(false));
                self.update(side.other(), |p| p.with_focus(true));
            }
            Intent::Refresh => self.refresh(side),
            Intent::MoveSelection(delta) => {
                self.update(side, |p| p.with_selection_moved(delta));
                self.maybe_continue(side);
            }
            Intent::Scroll(delta) => {
                self.update(side, |p| p.with_scroll(delta));
                self.maybe_continue(side);
            }
            Intent::SelectFirst => self.update(side, PanelState::with_first),
            Intent::SelectLast => {
                self.update(side, PanelState::with_last);
                self.maybe_continue(side);
            }
            Intent::GoTo(path) => self.navigate(side, path, None),
            Intent::GoBack => {
                let panel = self.panel(side);
                if let Some((history, target)) = panel.history().go_back(panel.path()) {
                    self.navigate(side, target, Some(history));
                }
            }
            Intent::GoForward => {
                let panel = self.panel(side);
                if let Some((history, target)) = panel.history().go_forward(panel.path()) {
                    self.navigate(side, target, Some(history));
                }
            }
            Intent::ToggleMark => self.update(side, PanelState::with_toggled_mark),
            Intent::ToggleHidden => {
                self.policy.show_hidden = !self.policy.show_hidden;
                tracing::debug!(show_hidden = self.policy.show_hidden, "toggled hidden entries");
                for side in [Side::Left, Side::Right] {
                    let panel = self.take(side).rearranged(&self.policy);
                    self.put(side, panel);
                    self.maybe_continue(side);
                }
            }
            Intent::Inspect => self.inspect(side),
            Intent::SetViewport(rows) => {
                for side in [Side::Left, Side::Right] {
                    self.update(side, |p| p.with_viewport(rows));
                    self.maybe_continue(side);
                }
            }
        }
    }

    /// Applies the completion of a remote call.
    pub fn handle_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Listing(completion) => {
                if let Some(resolution) = self.cache.complete(completion) {
                    self.resolve(resolution);
                }
            }
            FetchEvent::Stat {
                side,
                generation,
                path,
                result,
            } => {
                if self.panel(side).generation() != generation {
                    tracing::debug!(%path, "discarding stat for superseded panel state");
                    return;
                }
                match result {
                    Ok(entry) => self.update(side, |p| p.with_detail(Some(entry))),
                    Err(error) => {
                        if error.is_not_found() {
                            if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
                                self.cache.remove_entry(&parent, name);
                            }
                        }
                        tracing::warn!(%path, %error, "stat failed");
                        self.update(side, |p| p.apply_notice(format!("inspect failed: {error}")));
                    }
                }
            }
        }
    }

    fn navigate(&mut self, side: Side, path: RemotePath, history: Option<History>) {
        let cached = self.cache.get(&path);
        let stale = self.cache.is_stale(&path);
        let needs_fetch = cached.is_none() || stale;
        tracing::debug!(?side, %path, hit = cached.is_some(), stale, "navigate");

        let panel = self.take(side);
        let panel = match history {
            Some(history) => panel.revisit(history, path.clone(), cached, stale, &self.policy),
            None => panel.navigate_to(path.clone(), cached, stale, &self.policy),
        };
        self.put(side, panel);

        if needs_fetch {
            self.request(side, &path, None);
        }
        self.maybe_continue(side);
    }

    fn refresh(&mut self, side: Side) {
        let path = self.panel(side).path().clone();
        self.cache.invalidate(&path);
        self.update(side, PanelState::refreshing);
        self.request(side, &path, None);
    }

    fn inspect(&mut self, side: Side) {
        let panel = self.panel(side);
        let Some(entry) = panel.selected_entry() else {
            return;
        };
        let path = panel.path().join(entry.name());
        let generation = panel.generation();
        let client = Arc::clone(&self.client);
        let tx = self.events.clone();
        tracing::debug!(%path, "issuing stat");
        tokio::spawn(async move {
            let result = client.stat(&path).await;
            let _ = tx.send(FetchEvent::Stat {
                side,
                generation,
                path,
                result,
            });
        });
    }

    /// Asks the cache for a page on behalf of `side`, issuing a remote call
    /// unless one is already in flight.
    fn request(&mut self, side: Side, path: &RemotePath, cursor: Option<Cursor>) {
        let waiter = Waiter {
            side,
            generation: self.panel(side).generation(),
        };
        if let Some(ticket) = self.cache.fetch(path, cursor, waiter) {
            self.spawn_list(ticket);
        }
    }

    fn spawn_list(&self, ticket: FetchTicket) {
        let client = Arc::clone(&self.client);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = client.list(&ticket.path, ticket.cursor.as_ref()).await;
            let _ = tx.send(FetchEvent::Listing(FetchCompletion { ticket, result }));
        });
    }

    fn resolve(&mut self, resolution: Resolution<Waiter>) {
        let Resolution {
            path,
            continuation,
            outcome,
            waiters,
            followers,
        } = resolution;

        for waiter in waiters {
            let side = waiter.side;
            if self.panel(side).generation() != waiter.generation {
                tracing::debug!(?side, %path, "discarding result for superseded panel state");
                continue;
            }
            match &outcome {
                Outcome::Applied(listing) => {
                    let panel = self.take(side).apply_listing(Arc::clone(listing), &self.policy);
                    self.put(side, panel);
                    self.maybe_continue(side);
                }
                Outcome::Failed(error) if continuation => {
                    let message = format!("loading more failed: {error}");
                    self.update(side, |p| p.halt_continuation(message));
                }
                Outcome::Failed(error) => {
                    self.update(side, |p| p.apply_error(error.to_string()));
                }
                Outcome::Discarded => self.resubscribe(side, &path),
            }
        }

        for waiter in followers {
            if self.panel(waiter.side).generation() == waiter.generation {
                self.resubscribe(waiter.side, &path);
            }
        }
    }

    /// Re-requests whatever `side` is still waiting for: the first page while
    /// it is loading, otherwise the next page.
    fn resubscribe(&mut self, side: Side, path: &RemotePath) {
        if self.panel(side).status().is_busy() {
            self.request(side, path, None);
        } else {
            self.maybe_continue(side);
        }
    }

    /// Requests the next page for `side` when its listing is incomplete and
    /// the user is close to the end of the loaded entries.
    fn maybe_continue(&mut self, side: Side) {
        let panel = self.panel(side);
        let Some(shown) = panel.listing().cloned() else {
            return;
        };
        let failed = matches!(panel.status(), PanelStatus::Error(_));
        if shown.is_complete() || panel.is_halted() || failed {
            return;
        }
        let path = panel.path().clone();

        if self.cache.is_pending(&path) {
            // stay subscribed to whatever is in flight
            self.request(side, &path, shown.cursor().cloned());
            return;
        }

        let current = match self.cache.peek(&path) {
            Some(listing) => listing,
            None => {
                tracing::debug!(%path, "re-seeding evicted listing from panel");
                self.cache.store(Arc::clone(&shown));
                shown
            }
        };
        if !Arc::ptr_eq(&current, self.panel(side).listing().unwrap_or(&current)) {
            let panel = self.take(side).apply_listing(Arc::clone(&current), &self.policy);
            self.put(side, panel);
        }

        let panel = self.panel(side);
        if current.is_complete() || !panel.is_near_end(self.prefetch_margin) {
            return;
        }
        if let Some(cursor) = current.cursor().cloned() {
            self.request(side, &path, Some(cursor));
        }
    }

    fn take(&mut self, side: Side) -> PanelState {
        std::mem::take(&mut self.panels[side.index()])
    }

    fn put(&mut self, side: Side, panel: PanelState) {
        self.panels[side.index()] = panel;
    }

    fn update(&mut self, side: Side, f: impl FnOnce(PanelState) -> PanelState) {
        let panel = self.take(side);
        self.put(side, f(panel));
    }
}
