//! Key binding configuration.
//!
//! Key bindings map key names (e.g. `"j"`, `"gg"`, `"Enter"`) to [`Action`]
//! values. The default bindings follow vim conventions.
//!
//! TOML files use string action identifiers (e.g. `"cursor_down"`);
//! these are resolved to [`Action`] via [`ActionRegistry::find_by_id`] at load time.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionRegistry};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawKeymap {
    #[serde(default)]
    bindings: HashMap<String, String>,
}

/// Complete set of key bindings.
///
/// The default instance provides vim-style navigation plus arrow keys.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, Action>,
    /// Action → bound keys, sorted (for the help popup).
    reverse: HashMap<Action, Vec<String>>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut bindings = HashMap::new();

        // Movement
        bindings.insert("j".to_string(), Action::CursorDown);
        bindings.insert("Down".to_string(), Action::CursorDown);
        bindings.insert("k".to_string(), Action::CursorUp);
        bindings.insert("Up".to_string(), Action::CursorUp);
        bindings.insert("PageDown".to_string(), Action::PageDown);
        bindings.insert("Ctrl+d".to_string(), Action::PageDown);
        bindings.insert("PageUp".to_string(), Action::PageUp);
        bindings.insert("Ctrl+u".to_string(), Action::PageUp);
        bindings.insert("gg".to_string(), Action::CursorTop);
        bindings.insert("Home".to_string(), Action::CursorTop);
        bindings.insert("G".to_string(), Action::CursorBottom);
        bindings.insert("End".to_string(), Action::CursorBottom);

        // Navigation
        bindings.insert("l".to_string(), Action::EnterDir);
        bindings.insert("Right".to_string(), Action::EnterDir);
        bindings.insert("Enter".to_string(), Action::EnterDir);
        bindings.insert("h".to_string(), Action::GoParent);
        bindings.insert("Left".to_string(), Action::GoParent);
        bindings.insert("Backspace".to_string(), Action::GoParent);
        bindings.insert("H".to_string(), Action::GoBack);
        bindings.insert("L".to_string(), Action::GoForward);
        bindings.insert("r".to_string(), Action::Refresh);

        // Panels
        bindings.insert("Tab".to_string(), Action::SwitchPanel);
        bindings.insert("Space".to_string(), Action::ToggleMark);
        bindings.insert("i".to_string(), Action::Inspect);
        bindings.insert(".".to_string(), Action::ToggleHidden);

        // Misc
        bindings.insert("?".to_string(), Action::Help);
        bindings.insert("q".to_string(), Action::Quit);
        bindings.insert("Ctrl+c".to_string(), Action::Quit);

        let reverse = build_reverse(&bindings);
        Self { bindings, reverse }
    }
}

fn build_reverse(bindings: &HashMap<String, Action>) -> HashMap<Action, Vec<String>> {
    let mut reverse: HashMap<Action, Vec<String>> = HashMap::new();
    for (key, action) in bindings {
        reverse.entry(*action).or_default().push(key.clone());
    }
    for keys in reverse.values_mut() {
        keys.sort();
    }
    reverse
}

impl Keymap {
    /// Loads key bindings from a TOML file at `path`.
    ///
    /// Bindings in the file are layered over the defaults. Unknown action
    /// strings are logged and skipped.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        let raw: RawKeymap =
            toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        Ok(Self::default().overlay(raw))
    }

    fn overlay(mut self, raw: RawKeymap) -> Self {
        let registry = ActionRegistry::new();
        for (key, action_id) in raw.bindings {
            match registry.find_by_id(&action_id) {
                Some(action) => {
                    self.bindings.insert(key, action);
                }
                None => tracing::warn!(%key, action = %action_id, "unknown action in keymap"),
            }
        }
        self.reverse = build_reverse(&self.bindings);
        self
    }

    /// Returns the action mapped to `key`, or `None` if unbound.
    pub fn action_for_key(&self, key: &str) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    /// Returns the key(s) bound to a given action.
    pub fn keys_for_action(&self, action: Action) -> Option<&[String]> {
        self.reverse.get(&action).map(|v| v.as_slice())
    }

    /// True if `prefix` is the start of a multi-key sequence such as `gg`.
    ///
    /// Named keys (`Enter`, `Home`, `Ctrl+d`) start with an uppercase letter
    /// and are never sequences.
    pub fn is_prefix(&self, prefix: &str) -> bool {
        self.bindings.keys().any(|key| {
            key.len() > prefix.len()
                && key.starts_with(prefix)
                && !key.starts_with(|c: char| c.is_ascii_uppercase())
        })
    }

    pub fn bindings(&self) -> &HashMap<String, Action> {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_keymap_has_movement_keys() {
        let keymap = Keymap::default();

        assert_eq!(keymap.action_for_key("j"), Some(Action::CursorDown));
        assert_eq!(keymap.action_for_key("Down"), Some(Action::CursorDown));
        assert_eq!(keymap.action_for_key("k"), Some(Action::CursorUp));
        assert_eq!(keymap.action_for_key("gg"), Some(Action::CursorTop));
        assert_eq!(keymap.action_for_key("G"), Some(Action::CursorBottom));
        assert_eq!(keymap.action_for_key("PageDown"), Some(Action::PageDown));
    }

    #[test]
    fn default_keymap_has_navigation_keys() {
        let keymap = Keymap::default();

        assert_eq!(keymap.action_for_key("l"), Some(Action::EnterDir));
        assert_eq!(keymap.action_for_key("Enter"), Some(Action::EnterDir));
        assert_eq!(keymap.action_for_key("h"), Some(Action::GoParent));
        assert_eq!(keymap.action_for_key("Backspace"), Some(Action::GoParent));
        assert_eq!(keymap.action_for_key("H"), Some(Action::GoBack));
        assert_eq!(keymap.action_for_key("L"), Some(Action::GoForward));
        assert_eq!(keymap.action_for_key("r"), Some(Action::Refresh));
    }

    #[test]
    fn default_keymap_has_panel_keys() {
        let keymap = Keymap::default();

        assert_eq!(keymap.action_for_key("Tab"), Some(Action::SwitchPanel));
        assert_eq!(keymap.action_for_key("Space"), Some(Action::ToggleMark));
        assert_eq!(keymap.action_for_key("i"), Some(Action::Inspect));
        assert_eq!(keymap.action_for_key("."), Some(Action::ToggleHidden));
        assert_eq!(keymap.action_for_key("q"), Some(Action::Quit));
        assert_eq!(keymap.action_for_key("Ctrl+c"), Some(Action::Quit));
    }

    #[test]
    fn action_for_unknown_key_returns_none() {
        let keymap = Keymap::default();
        assert_eq!(keymap.action_for_key("z"), None);
        assert_eq!(keymap.action_for_key(""), None);
        assert_eq!(keymap.action_for_key("Ctrl+x"), None);
    }

    #[test]
    fn g_is_a_prefix_but_j_is_not() {
        let keymap = Keymap::default();
        assert!(keymap.is_prefix("g"));
        assert!(!keymap.is_prefix("j"));
        assert!(!keymap.is_prefix("Ctrl"));
    }

    #[test]
    fn uppercase_keys_are_not_swallowed_by_named_keys() {
        let keymap = Keymap::default();
        assert!(!keymap.is_prefix("H"), "Home must not shadow H");
        assert!(!keymap.is_prefix("L"), "Left must not shadow L");
        assert!(!keymap.is_prefix("E"));
    }

    #[test]
    fn load_overlays_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keymap.toml");
        fs::write(
            &path,
            r#"
[bindings]
j = "cursor_up"
x = "quit"
"#,
        )
        .unwrap();

        let keymap = Keymap::load(&path).unwrap();

        assert_eq!(keymap.action_for_key("j"), Some(Action::CursorUp));
        assert_eq!(keymap.action_for_key("x"), Some(Action::Quit));
        assert_eq!(keymap.action_for_key("h"), Some(Action::GoParent));
    }

    #[test]
    fn load_ignores_unknown_actions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keymap.toml");
        fs::write(
            &path,
            r#"
[bindings]
x = "nonexistent_action"
"#,
        )
        .unwrap();

        let keymap = Keymap::load(&path).unwrap();
        assert_eq!(keymap.action_for_key("x"), None);
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Keymap::load(&tmp.path().join("nope.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn load_invalid_toml_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keymap.toml");
        fs::write(&path, "invalid[[[toml").unwrap();

        let result = Keymap::load(&path);
        assert!(matches!(result.unwrap_err(), CoreError::ConfigParse(_)));
    }

    #[test]
    fn keys_for_action_returns_sorted_keys() {
        let keymap = Keymap::default();
        let keys = keymap.keys_for_action(Action::CursorDown).unwrap();
        assert_eq!(keys, ["Down", "j"]);
    }

    #[test]
    fn every_action_has_a_default_key() {
        let keymap = Keymap::default();
        for descriptor in ActionRegistry::new().all() {
            assert!(
                keymap.keys_for_action(descriptor.action).is_some(),
                "{} unbound",
                descriptor.id
            );
        }
    }
}
