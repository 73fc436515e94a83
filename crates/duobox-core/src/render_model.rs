//! Display-ready projection of the navigation state.
//!
//! [`snapshot`] copies what a frontend needs out of the
//! [`NavigationController`] so drawing never borrows live state.

use chrono::{DateTime, Utc};

use crate::archive::{DirectoryEntry, EntryKind};
use crate::nav::panel::{PanelState, PanelStatus};
use crate::nav::{NavigationController, Side};

/// Both panels as they should be drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub left: PanelView,
    pub right: PanelView,
    pub focused: Side,
}

impl Snapshot {
    pub fn panel(&self, side: Side) -> &PanelView {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn focused_panel(&self) -> &PanelView {
        self.panel(self.focused)
    }
}

/// One row of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    pub name: String,
    /// Name after the view policy's suffix stripping.
    pub display_name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
    pub hidden: bool,
    pub marked: bool,
}

impl EntryView {
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// One panel as it should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub path: String,
    pub visible_entries: Vec<EntryView>,
    pub selected_index: Option<usize>,
    pub scroll_offset: usize,
    pub status: PanelStatus,
    /// Entries fetched so far, before filtering.
    pub loaded: usize,
    /// `false` while more pages remain on the remote.
    pub complete: bool,
    pub notice: Option<String>,
    pub focused: bool,
    pub detail: Option<EntryView>,
    pub marked_count: usize,
}

impl PanelView {
    pub fn selected(&self) -> Option<&EntryView> {
        self.visible_entries.get(self.selected_index?)
    }

    /// Entry count for titles; a trailing `+` means more pages remain.
    pub fn count_label(&self) -> String {
        if self.complete {
            self.visible_entries.len().to_string()
        } else {
            format!("{}+", self.visible_entries.len())
        }
    }

    /// The error message when the last request failed.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            PanelStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Projects the controller's current state.
pub fn snapshot(controller: &NavigationController) -> Snapshot {
    Snapshot {
        left: panel_view(controller, controller.panel(Side::Left)),
        right: panel_view(controller, controller.panel(Side::Right)),
        focused: controller.focused(),
    }
}

fn panel_view(controller: &NavigationController, panel: &PanelState) -> PanelView {
    let policy = controller.policy();
    let entry_view = |entry: &DirectoryEntry| EntryView {
        name: entry.name().to_string(),
        display_name: policy.display_name(entry).to_string(),
        kind: entry.kind(),
        size: entry.size(),
        modified_at: entry.modified_at(),
        hidden: entry.is_hidden(),
        marked: panel.is_marked(entry.name()),
    };
    let listing = panel.listing();

    PanelView {
        path: panel.path().to_string(),
        visible_entries: panel.visible_entries().map(entry_view).collect(),
        selected_index: panel.selected_index(),
        scroll_offset: panel.scroll_offset(),
        status: panel.status().clone(),
        loaded: listing.map_or(0, |l| l.entries().len()),
        complete: listing.map_or(true, |l| l.is_complete()),
        notice: panel.notice().map(str::to_string),
        focused: panel.is_focused(),
        detail: panel.detail().map(entry_view),
        marked_count: panel.marked().len(),
    }
}
