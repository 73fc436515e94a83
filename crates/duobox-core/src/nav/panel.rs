//! Per-panel navigation state.
//!
//! A [`PanelState`] is one of the two side-by-side views. It owns the
//! listing snapshot it displays, so the two panels stay independent even
//! when they show the same path. All transitions consume `self` and return
//! the next state.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::archive::{DirectoryEntry, Listing, RemotePath};
use crate::nav::filter::ViewPolicy;
use crate::nav::history::History;

/// Load status of a panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Waiting for the first page of the current path.
    Loading,
    /// Showing a listing of the current path.
    Loaded,
    /// The last request failed; any previous listing is still shown.
    Error(String),
    /// Showing a listing past its TTL while a refresh is in flight.
    Stale,
}

impl PanelStatus {
    /// Short label for panel titles.
    pub fn label(&self) -> &str {
        match self {
            PanelStatus::Idle => "idle",
            PanelStatus::Loading => "loading",
            PanelStatus::Loaded => "loaded",
            PanelStatus::Error(_) => "error",
            PanelStatus::Stale => "stale",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, PanelStatus::Loading | PanelStatus::Stale)
    }
}

/// State of one navigable panel.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    path: RemotePath,
    generation: u64,
    status: PanelStatus,
    listing: Option<Arc<Listing>>,
    /// Indices into `listing` in display order.
    order: Vec<usize>,
    /// Index into `order`.
    selected: Option<usize>,
    scroll_offset: usize,
    viewport: usize,
    focused: bool,
    notice: Option<String>,
    /// Set when a continuation failed; cleared by navigation or refresh.
    halted: bool,
    marked: BTreeSet<String>,
    detail: Option<DirectoryEntry>,
    history: History,
}

impl PanelState {
    /// Creates an idle panel at `path`.
    pub fn new(path: RemotePath) -> Self {
        Self {
            path,
            viewport: 1,
            ..Self::default()
        }
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    /// Incremented on every navigation and refresh.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    /// The listing snapshot currently displayed, if any.
    pub fn listing(&self) -> Option<&Arc<Listing>> {
        self.listing.as_ref()
    }

    /// Visible entries in display order.
    pub fn visible_entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        let entries = self.listing.as_deref().map(Listing::entries).unwrap_or_default();
        self.order.iter().filter_map(move |&i| entries.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.order.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&DirectoryEntry> {
        let index = *self.order.get(self.selected?)?;
        self.listing.as_ref()?.entries().get(index)
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Transient message about a failed continuation or stat.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Returns `true` if pagination stopped after a failure.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn marked(&self) -> &BTreeSet<String> {
        &self.marked
    }

    pub fn is_marked(&self, name: &str) -> bool {
        self.marked.contains(name)
    }

    /// Metadata of the last inspected entry.
    pub fn detail(&self) -> Option<&DirectoryEntry> {
        self.detail.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Navigates to `path`, recording the current path in history.
    ///
    /// `cached` is shown immediately if present; `stale` marks it as due
    /// for refresh.
    pub fn navigate_to(
        self,
        path: RemotePath,
        cached: Option<Arc<Listing>>,
        stale: bool,
        policy: &ViewPolicy,
    ) -> Self {
        let history = if path == self.path {
            self.history.clone()
        } else {
            self.history.push(self.path.clone())
        };
        self.revisit(history, path, cached, stale, policy)
    }

    /// Navigates to `path` with an explicit history, as back/forward do.
    pub fn revisit(
        self,
        history: History,
        path: RemotePath,
        cached: Option<Arc<Listing>>,
        stale: bool,
        policy: &ViewPolicy,
    ) -> Self {
        let status = match &cached {
            None => PanelStatus::Loading,
            Some(_) if stale => PanelStatus::Stale,
            Some(_) => PanelStatus::Loaded,
        };
        let order = cached
            .as_deref()
            .map(|l| policy.arrange(l.entries()))
            .unwrap_or_default();
        let selected = if order.is_empty() { None } else { Some(0) };
        Self {
            path,
            generation: self.generation + 1,
            status,
            listing: cached,
            order,
            selected,
            scroll_offset: 0,
            notice: None,
            halted: false,
            marked: BTreeSet::new(),
            detail: None,
            history,
            ..self
        }
    }

    /// Shows `listing`, moving to `Loaded`.
    ///
    /// Re-applying the same path keeps the selected entry by name;
    /// a listing for another path is ignored.
    pub fn apply_listing(self, listing: Arc<Listing>, policy: &ViewPolicy) -> Self {
        if listing.path() != &self.path {
            tracing::debug!(
                panel = %self.path,
                listing = %listing.path(),
                "ignoring listing for another path"
            );
            return self;
        }
        let keep = self.selected_entry().map(|e| e.name().to_string());
        let order = policy.arrange(listing.entries());
        let selected = match keep.and_then(|name| {
            order
                .iter()
                .position(|&i| listing.entries().get(i).is_some_and(|e| e.name() == name))
        }) {
            Some(index) => Some(index),
            None if order.is_empty() => None,
            None => Some(self.selected.unwrap_or(0).min(order.len() - 1)),
        };
        let marked = self
            .marked
            .iter()
            .filter(|name| listing.entry(name).is_some())
            .cloned()
            .collect();
        Self {
            status: PanelStatus::Loaded,
            listing: Some(listing),
            order,
            selected,
            marked,
            ..self
        }
        .follow_selection()
    }

    /// Moves to `Error(message)`; the displayed listing stays underneath.
    pub fn apply_error(self, message: impl Into<String>) -> Self {
        Self {
            status: PanelStatus::Error(message.into()),
            ..self
        }
    }

    /// Shows a transient notice without changing the status.
    pub fn apply_notice(self, message: impl Into<String>) -> Self {
        Self {
            notice: Some(message.into()),
            ..self
        }
    }

    /// Stops pagination and shows why. The loaded entries stay usable.
    pub fn halt_continuation(self, message: impl Into<String>) -> Self {
        Self {
            halted: true,
            ..self.apply_notice(message)
        }
    }

    pub fn with_detail(self, detail: Option<DirectoryEntry>) -> Self {
        Self { detail, ..self }
    }

    /// Starts a refresh of the current path.
    pub fn refreshing(self) -> Self {
        let status = if self.listing.is_some() {
            PanelStatus::Stale
        } else {
            PanelStatus::Loading
        };
        Self {
            generation: self.generation + 1,
            status,
            notice: None,
            halted: false,
            detail: None,
            ..self
        }
    }

    /// Re-arranges the displayed listing under a new policy.
    pub fn rearranged(self, policy: &ViewPolicy) -> Self {
        match self.listing.clone() {
            Some(listing) => {
                let status = self.status.clone();
                Self {
                    status,
                    ..self.apply_listing(listing, policy)
                }
            }
            None => self,
        }
    }

    /// Moves the selection by `delta` rows, clamped. No-op when empty.
    pub fn with_selection_moved(self, delta: isize) -> Self {
        let Some(current) = self.selected else {
            return self;
        };
        let last = self.order.len().saturating_sub(1);
        let target = current.saturating_add_signed(delta).min(last);
        self.with_selection(target)
    }

    /// Scrolls the viewport by `delta` rows, dragging the selection along
    /// so it stays visible.
    pub fn with_scroll(self, delta: isize) -> Self {
        if self.order.is_empty() {
            return self;
        }
        let max_offset = self.order.len().saturating_sub(self.viewport);
        let scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max_offset);
        let bottom = scroll_offset + self.viewport.max(1) - 1;
        let selected = self
            .selected
            .map(|s| s.clamp(scroll_offset, bottom.min(self.order.len() - 1)));
        Self {
            scroll_offset,
            selected,
            ..self
        }
    }

    /// Jumps to the first entry (`gg`).
    pub fn with_first(self) -> Self {
        self.with_selection(0)
    }

    /// Jumps to the last loaded entry (`G`).
    pub fn with_last(self) -> Self {
        let last = self.order.len().saturating_sub(1);
        self.with_selection(last)
    }

    /// Toggles the mark on the selected entry and advances the selection.
    pub fn with_toggled_mark(self) -> Self {
        let Some(name) = self.selected_entry().map(|e| e.name().to_string()) else {
            return self;
        };
        let mut marked = self.marked.clone();
        if !marked.remove(&name) {
            marked.insert(name);
        }
        Self { marked, ..self }.with_selection_moved(1)
    }

    pub fn with_focus(self, focused: bool) -> Self {
        Self { focused, ..self }
    }

    /// Sets the number of visible rows.
    pub fn with_viewport(self, rows: usize) -> Self {
        Self {
            viewport: rows.max(1),
            ..self
        }
        .follow_selection()
    }

    /// Returns `true` when the selection or the bottom of the viewport is
    /// within `margin` rows of the last loaded entry.
    pub fn is_near_end(&self, margin: usize) -> bool {
        let len = self.order.len();
        if len == 0 {
            return true;
        }
        let bottom = self.scroll_offset + self.viewport.max(1) - 1;
        let lowest = bottom.max(self.selected.unwrap_or(0));
        lowest + margin + 1 >= len
    }

    fn with_selection(self, index: usize) -> Self {
        if self.order.is_empty() {
            return Self {
                selected: None,
                ..self
            };
        }
        Self {
            selected: Some(index.min(self.order.len() - 1)),
            ..self
        }
        .follow_selection()
    }

    /// Adjusts the scroll offset so the selection is on screen.
    fn follow_selection(self) -> Self {
        let viewport = self.viewport.max(1);
        let max_offset = self.order.len().saturating_sub(viewport);
        let mut scroll_offset = self.scroll_offset.min(max_offset);
        if let Some(selected) = self.selected {
            if selected < scroll_offset {
                scroll_offset = selected;
            } else if selected >= scroll_offset + viewport {
                scroll_offset = selected + 1 - viewport;
            }
        }
        Self {
            scroll_offset,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{Cursor, Page};
    use std::time::Instant;

    fn listing(path: &str, names: &[&str]) -> Arc<Listing> {
        let entries = names
            .iter()
            .map(|n| DirectoryEntry::file(n, 1, format!("id:{n}")).unwrap())
            .collect();
        Arc::new(Listing::from_first_page(
            RemotePath::parse(path),
            Page::last(entries),
            Instant::now(),
        ))
    }

    fn numbered(path: &str, count: usize) -> Arc<Listing> {
        let names: Vec<String> = (0..count).map(|n| format!("f{n:03}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        listing(path, &refs)
    }

    fn policy() -> ViewPolicy {
        ViewPolicy::default()
    }

    fn loaded(path: &str, names: &[&str]) -> PanelState {
        PanelState::new(RemotePath::root()).navigate_to(
            RemotePath::parse(path),
            Some(listing(path, names)),
            false,
            &policy(),
        )
    }

    #[test]
    fn new_panel_is_idle() {
        let panel = PanelState::new(RemotePath::root());
        assert_eq!(panel.status(), &PanelStatus::Idle);
        assert_eq!(panel.generation(), 0);
        assert!(panel.selected_index().is_none());
    }

    #[test]
    fn navigate_without_cache_is_loading() {
        let panel = PanelState::new(RemotePath::root()).navigate_to(
            RemotePath::parse("/a"),
            None,
            false,
            &policy(),
        );
        assert_eq!(panel.status(), &PanelStatus::Loading);
        assert_eq!(panel.generation(), 1);
        assert!(panel.selected_index().is_none());
        assert!(panel.history().can_go_back());
    }

    #[test]
    fn navigate_with_fresh_cache_is_loaded() {
        let panel = loaded("/a", &["x", "y"]);
        assert_eq!(panel.status(), &PanelStatus::Loaded);
        assert_eq!(panel.selected_index(), Some(0));
        assert_eq!(panel.selected_entry().unwrap().name(), "x");
    }

    #[test]
    fn navigate_with_stale_cache_is_stale() {
        let panel = PanelState::new(RemotePath::root()).navigate_to(
            RemotePath::parse("/a"),
            Some(listing("/a", &["x"])),
            true,
            &policy(),
        );
        assert_eq!(panel.status(), &PanelStatus::Stale);
        assert_eq!(panel.visible_len(), 1);
    }

    #[test]
    fn apply_listing_keeps_selection_by_name() {
        let panel = loaded("/a", &["b", "c", "d"]).with_selection_moved(1);
        assert_eq!(panel.selected_entry().unwrap().name(), "c");

        let panel = panel.apply_listing(listing("/a", &["a", "b", "c", "d"]), &policy());
        assert_eq!(panel.selected_entry().unwrap().name(), "c");
        assert_eq!(panel.selected_index(), Some(2));
    }

    #[test]
    fn apply_listing_clamps_when_selection_vanished() {
        let panel = loaded("/a", &["a", "b", "c"]).with_last();
        let panel = panel.apply_listing(listing("/a", &["a"]), &policy());
        assert_eq!(panel.selected_index(), Some(0));
    }

    #[test]
    fn apply_listing_for_other_path_is_ignored() {
        let panel = loaded("/a", &["x"]);
        let panel = panel.apply_listing(listing("/b", &["y", "z"]), &policy());
        assert_eq!(panel.visible_len(), 1);
    }

    #[test]
    fn error_keeps_previous_listing() {
        let panel = loaded("/a", &["x"]).refreshing();
        assert_eq!(panel.status(), &PanelStatus::Stale);
        let panel = panel.apply_error("connection failed");
        assert_eq!(panel.status(), &PanelStatus::Error("connection failed".to_string()));
        assert_eq!(panel.visible_len(), 1);
    }

    #[test]
    fn halt_sets_notice_until_refresh() {
        let panel = loaded("/a", &["x"]).halt_continuation("rate limited");
        assert!(panel.is_halted());
        assert_eq!(panel.notice(), Some("rate limited"));
        assert_eq!(panel.status(), &PanelStatus::Loaded);

        let panel = panel.refreshing();
        assert!(!panel.is_halted());
        assert!(panel.notice().is_none());
    }

    #[test]
    fn refresh_without_listing_is_loading() {
        let panel = PanelState::new(RemotePath::root()).refreshing();
        assert_eq!(panel.status(), &PanelStatus::Loading);
        assert_eq!(panel.generation(), 1);
    }

    #[test]
    fn move_selection_clamps() {
        let panel = loaded("/a", &["x", "y", "z"]);
        let panel = panel.with_selection_moved(10);
        assert_eq!(panel.selected_index(), Some(2));
        let panel = panel.with_selection_moved(-10);
        assert_eq!(panel.selected_index(), Some(0));
    }

    #[test]
    fn move_selection_on_empty_is_noop() {
        let panel = loaded("/a", &[]).with_selection_moved(1);
        assert!(panel.selected_index().is_none());
    }

    #[test]
    fn selection_drags_scroll_offset() {
        let panel = PanelState::new(RemotePath::root())
            .with_viewport(5)
            .navigate_to(RemotePath::parse("/a"), Some(numbered("/a", 20)), false, &policy())
            .with_selection_moved(7);
        assert_eq!(panel.scroll_offset(), 3);
        let panel = panel.with_first();
        assert_eq!(panel.scroll_offset(), 0);
    }

    #[test]
    fn scroll_drags_selection_into_view() {
        let panel = PanelState::new(RemotePath::root())
            .with_viewport(5)
            .navigate_to(RemotePath::parse("/a"), Some(numbered("/a", 20)), false, &policy())
            .with_scroll(10);
        assert_eq!(panel.scroll_offset(), 10);
        assert_eq!(panel.selected_index(), Some(10));

        let panel = panel.with_scroll(100);
        assert_eq!(panel.scroll_offset(), 15);
    }

    #[test]
    fn near_end_uses_margin() {
        let panel = PanelState::new(RemotePath::root())
            .with_viewport(5)
            .navigate_to(RemotePath::parse("/a"), Some(numbered("/a", 30)), false, &policy());
        assert!(!panel.is_near_end(10));
        let panel = panel.with_selection_moved(19);
        assert!(panel.is_near_end(10));
    }

    #[test]
    fn marks_toggle_and_clear_on_navigation() {
        let panel = loaded("/a", &["x", "y"]).with_toggled_mark();
        assert!(panel.is_marked("x"));
        assert_eq!(panel.selected_index(), Some(1));

        let panel = panel.with_first().with_toggled_mark();
        assert!(!panel.is_marked("x"));

        let panel = panel.with_toggled_mark();
        let panel = panel.navigate_to(RemotePath::parse("/b"), None, false, &policy());
        assert!(panel.marked().is_empty());
    }

    #[test]
    fn revisit_uses_given_history() {
        let panel = loaded("/a", &["x"]);
        let (history, target) = panel.history().go_back(panel.path()).unwrap();
        let panel = panel.revisit(history, target.clone(), None, false, &policy());
        assert_eq!(panel.path(), &target);
        assert!(panel.history().can_go_forward());
    }

    #[test]
    fn rearranged_keeps_status() {
        let panel = loaded("/a", &[".dot", "x"]).refreshing();
        let shown = ViewPolicy {
            show_hidden: true,
            ..policy()
        };
        let panel = panel.rearranged(&shown);
        assert_eq!(panel.status(), &PanelStatus::Stale);
        assert_eq!(panel.visible_len(), 2);
    }

    #[test]
    fn incomplete_listing_is_displayed() {
        let partial = Arc::new(Listing::from_first_page(
            RemotePath::parse("/a"),
            Page::more(vec![DirectoryEntry::file("x", 1, "1").unwrap()], Cursor::new("c")),
            Instant::now(),
        ));
        let panel = PanelState::new(RemotePath::root()).navigate_to(
            RemotePath::parse("/a"),
            Some(partial),
            false,
            &policy(),
        );
        assert!(!panel.listing().unwrap().is_complete());
        assert_eq!(panel.visible_len(), 1);
    }
}
