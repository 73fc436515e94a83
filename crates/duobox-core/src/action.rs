//! Unified action system for duobox.
//!
//! Every user-triggerable action is represented by the [`Action`] enum.
//! [`ActionRegistry`] provides metadata (id, name, description, category)
//! for keymap parsing and the help popup.

use crate::event::Intent;

/// Every user-triggerable action in duobox.
///
/// Variants carry no parameters; context is determined at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Navigation
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    CursorTop,
    CursorBottom,
    EnterDir,
    GoParent,
    GoBack,
    GoForward,
    Refresh,
    // Panel
    SwitchPanel,
    ToggleMark,
    Inspect,
    // View
    ToggleHidden,
    // System
    Help,
    Quit,
}

impl Action {
    /// Translates the action into a navigation intent.
    ///
    /// `page_rows` is the scroll distance for page up/down. Returns `None`
    /// for actions the frontend handles itself (help, quit).
    pub fn intent(self, page_rows: usize) -> Option<Intent> {
        let page = isize::try_from(page_rows.max(1)).unwrap_or(isize::MAX);
        let intent = match self {
            Action::CursorUp => Intent::MoveSelection(-1),
            Action::CursorDown => Intent::MoveSelection(1),
            Action::PageUp => Intent::Scroll(-page),
            Action::PageDown => Intent::Scroll(page),
            Action::CursorTop => Intent::SelectFirst,
            Action::CursorBottom => Intent::SelectLast,
            Action::EnterDir => Intent::EnterSelected,
            Action::GoParent => Intent::GoUp,
            Action::GoBack => Intent::GoBack,
            Action::GoForward => Intent::GoForward,
            Action::Refresh => Intent::Refresh,
            Action::SwitchPanel => Intent::SwitchFocus,
            Action::ToggleMark => Intent::ToggleMark,
            Action::Inspect => Intent::Inspect,
            Action::ToggleHidden => Intent::ToggleHidden,
            Action::Help | Action::Quit => return None,
        };
        Some(intent)
    }
}

/// Broad category for grouping actions in the help popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Panel,
    View,
    System,
}

impl ActionCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Panel => "Panel",
            Self::View => "View",
            Self::System => "System",
        }
    }
}

/// Metadata for a single action.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub action: Action,
    /// Snake-case identifier used in `keymap.toml` (e.g. `"cursor_up"`).
    pub id: &'static str,
    /// Human-readable name (e.g. `"Cursor Up"`).
    pub name: &'static str,
    /// Short description (e.g. `"Move cursor up one entry"`).
    pub description: &'static str,
    pub category: ActionCategory,
}

/// Registry of all available actions.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    /// Builds the registry containing every known action.
    pub fn new() -> Self {
        let descriptors = vec![
            // Navigation
            ActionDescriptor {
                action: Action::CursorUp,
                id: "cursor_up",
                name: "Cursor Up",
                description: "Move cursor up one entry",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::CursorDown,
                id: "cursor_down",
                name: "Cursor Down",
                description: "Move cursor down one entry",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::PageUp,
                id: "page_up",
                name: "Page Up",
                description: "Scroll up one screen",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::PageDown,
                id: "page_down",
                name: "Page Down",
                description: "Scroll down one screen, loading more if needed",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::CursorTop,
                id: "go_first",
                name: "Go to First",
                description: "Jump to the first entry",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::CursorBottom,
                id: "go_last",
                name: "Go to Last",
                description: "Jump to the last loaded entry",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::EnterDir,
                id: "enter_dir",
                name: "Enter",
                description: "Open folder or inspect file",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::GoParent,
                id: "go_parent",
                name: "Go to Parent",
                description: "Navigate to parent folder",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::GoBack,
                id: "go_back",
                name: "Go Back",
                description: "Navigate back in history",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::GoForward,
                id: "go_forward",
                name: "Go Forward",
                description: "Navigate forward in history",
                category: ActionCategory::Navigation,
            },
            ActionDescriptor {
                action: Action::Refresh,
                id: "refresh",
                name: "Refresh",
                description: "Re-fetch the current folder",
                category: ActionCategory::Navigation,
            },
            // Panel
            ActionDescriptor {
                action: Action::SwitchPanel,
                id: "switch_panel",
                name: "Switch Panel",
                description: "Move focus to the other panel",
                category: ActionCategory::Panel,
            },
            ActionDescriptor {
                action: Action::ToggleMark,
                id: "toggle_mark",
                name: "Toggle Mark",
                description: "Mark or unmark the selected entry",
                category: ActionCategory::Panel,
            },
            ActionDescriptor {
                action: Action::Inspect,
                id: "inspect",
                name: "Inspect",
                description: "Fetch fresh metadata for the selected entry",
                category: ActionCategory::Panel,
            },
            // View
            ActionDescriptor {
                action: Action::ToggleHidden,
                id: "toggle_hidden",
                name: "Toggle Hidden",
                description: "Show or hide dot entries",
                category: ActionCategory::View,
            },
            // System
            ActionDescriptor {
                action: Action::Help,
                id: "help",
                name: "Help",
                description: "Show key bindings",
                category: ActionCategory::System,
            },
            ActionDescriptor {
                action: Action::Quit,
                id: "quit",
                name: "Quit",
                description: "Exit duobox",
                category: ActionCategory::System,
            },
        ];
        Self { descriptors }
    }

    /// Returns all descriptors.
    pub fn all(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    /// Finds an action by its string id (for keymap.toml parsing).
    pub fn find_by_id(&self, id: &str) -> Option<Action> {
        self.descriptors
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.action)
    }

    /// Returns the descriptor for a given action.
    pub fn descriptor_for(&self, action: Action) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.action == action)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
