//! Messages flowing into the navigation core.
//!
//! The UI translates key presses into [`Intent`]s and hands them to
//! [`NavigationController::handle_intent`](crate::nav::NavigationController::handle_intent).
//! Remote calls finish on spawned tasks and report back as [`FetchEvent`]s
//! through [`NavigationController::handle_event`](crate::nav::NavigationController::handle_event).

use crate::archive::{DirectoryEntry, RemotePath};
use crate::cache::FetchCompletion;
use crate::error::TransportError;
use crate::nav::Side;

/// A user request, always addressed to the focused panel unless noted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Open the selected folder, or inspect the selected file.
    EnterSelected,
    /// Move to the parent folder. No-op at the root.
    GoUp,
    /// Move focus to the other panel.
    SwitchFocus,
    /// Re-fetch the current folder, bypassing the cache.
    Refresh,
    /// Move the selection by the given number of rows.
    MoveSelection(isize),
    /// Scroll the viewport by the given number of rows.
    Scroll(isize),
    SelectFirst,
    SelectLast,
    /// Open an arbitrary path.
    GoTo(RemotePath),
    GoBack,
    GoForward,
    /// Mark or unmark the selected entry.
    ToggleMark,
    /// Show or hide dot entries in both panels.
    ToggleHidden,
    /// Fetch fresh metadata for the selected entry.
    Inspect,
    /// The number of visible rows per panel changed.
    SetViewport(usize),
}

/// Completion of a remote call issued by the controller.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// A `list` call finished.
    Listing(FetchCompletion),
    /// A `stat` call finished.
    Stat {
        side: Side,
        generation: u64,
        path: RemotePath,
        result: Result<DirectoryEntry, TransportError>,
    },
}
