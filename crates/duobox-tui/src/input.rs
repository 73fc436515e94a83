use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use duobox_core::action::Action;
use duobox_core::config::keymap::Keymap;

use crate::app::AppMode;

/// Actions that can result from a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Run a bound action.
    Dispatch(Action),
    /// Enter a new AppMode.
    EnterMode(AppMode),
    /// Quit the application.
    Quit,
    /// No action for this key.
    None,
}

/// Tracks state for multi-key sequences like "gg".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputState {
    pending: Option<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The keys typed so far of an unfinished sequence.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}

/// Maps a key event to an InputAction based on the current mode.
/// Returns the action and a new InputState (immutable pattern).
///
/// In Normal mode every key is resolved through the `Keymap`, including
/// arrows and multi-key sequences. Ctrl+C always quits.
pub fn handle_key(
    key: KeyEvent,
    mode: &AppMode,
    state: &InputState,
    keymap: &Keymap,
) -> (InputAction, InputState) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return (InputAction::Quit, InputState::new());
    }
    match mode {
        AppMode::Normal => handle_normal_key(key, state, keymap),
        AppMode::Help => handle_help_key(key),
    }
}

/// Returns the keymap name of a key event (e.g. `"j"`, `"Enter"`, `"Ctrl+d"`).
pub fn key_name(key: &KeyEvent) -> Option<String> {
    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            format!("Ctrl+{}", c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => return None,
    };
    Some(name)
}

fn handle_normal_key(
    key: KeyEvent,
    state: &InputState,
    keymap: &Keymap,
) -> (InputAction, InputState) {
    let Some(name) = key_name(&key) else {
        return (InputAction::None, InputState::new());
    };

    let sequence = match state.pending() {
        Some(prefix) => format!("{prefix}{name}"),
        None => name,
    };

    if keymap.is_prefix(&sequence) {
        return (
            InputAction::None,
            InputState {
                pending: Some(sequence),
            },
        );
    }

    let action = match keymap.action_for_key(&sequence) {
        Some(Action::Quit) => InputAction::Quit,
        Some(Action::Help) => InputAction::EnterMode(AppMode::Help),
        Some(action) => InputAction::Dispatch(action),
        None => InputAction::None,
    };
    (action, InputState::new())
}

fn handle_help_key(key: KeyEvent) -> (InputAction, InputState) {
    let action = match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
            InputAction::EnterMode(AppMode::Normal)
        }
        _ => InputAction::None,
    };
    (action, InputState::new())
}
