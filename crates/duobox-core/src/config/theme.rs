//! Theme configuration for duobox.
//!
//! Colors are stored as strings (e.g. `"blue"`, `"#ff5500"`) and converted
//! to [`ratatui::style::Color`] at render time via [`parse_color`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Complete theme configuration with per-component color groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub header: HeaderTheme,
    #[serde(default)]
    pub panel: PanelTheme,
    #[serde(default)]
    pub statusbar: StatusBarTheme,
    #[serde(default)]
    pub popup: PopupTheme,
}

impl Theme {
    /// Loads a theme from a TOML file at `path`.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Title bar colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderTheme {
    pub bg: String,
    pub title_fg: String,
    pub remote_fg: String,
}

impl Default for HeaderTheme {
    fn default() -> Self {
        Self {
            bg: "dark_gray".to_string(),
            title_fg: "cyan".to_string(),
            remote_fg: "white".to_string(),
        }
    }
}

/// Listing panel colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelTheme {
    pub folder_fg: String,
    pub hidden_fg: String,
    pub selected_fg: String,
    pub marked_fg: String,
    pub border_fg: String,
    pub focused_border_fg: String,
    pub loading_fg: String,
    pub error_fg: String,
}

impl Default for PanelTheme {
    fn default() -> Self {
        Self {
            folder_fg: "blue".to_string(),
            hidden_fg: "dark_gray".to_string(),
            selected_fg: "yellow".to_string(),
            marked_fg: "magenta".to_string(),
            border_fg: "dark_gray".to_string(),
            focused_border_fg: "cyan".to_string(),
            loading_fg: "yellow".to_string(),
            error_fg: "red".to_string(),
        }
    }
}

/// Status bar colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBarTheme {
    pub bg: String,
    pub position_fg: String,
    pub status_fg: String,
    pub message_fg: String,
}

impl Default for StatusBarTheme {
    fn default() -> Self {
        Self {
            bg: "white".to_string(),
            position_fg: "black".to_string(),
            status_fg: "blue".to_string(),
            message_fg: "magenta".to_string(),
        }
    }
}

/// Popup/dialog colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupTheme {
    pub border_fg: String,
    pub key_fg: String,
}

impl Default for PopupTheme {
    fn default() -> Self {
        Self {
            border_fg: "yellow".to_string(),
            key_fg: "cyan".to_string(),
        }
    }
}

/// Parses a color string into a `ratatui::style::Color`.
///
/// Supports named colors (`"blue"`, `"dark_gray"`) and hex (`"#rrggbb"`).
/// Returns `Color::Reset` for unrecognised values.
pub fn parse_color(s: &str) -> ratatui::style::Color {
    use ratatui::style::Color;

    match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Color::DarkGray,
        "light_red" | "lightred" => Color::LightRed,
        "light_green" | "lightgreen" => Color::LightGreen,
        "light_yellow" | "lightyellow" => Color::LightYellow,
        "light_blue" | "lightblue" => Color::LightBlue,
        "light_magenta" | "lightmagenta" => Color::LightMagenta,
        "light_cyan" | "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        "reset" => Color::Reset,
        hex if hex.starts_with('#') && hex.len() == 7 => {
            let channel =
                |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
            Color::Rgb(channel(1..3), channel(3..5), channel(5..7))
        }
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_theme_panel() {
        let theme = Theme::default();
        assert_eq!(theme.panel.folder_fg, "blue");
        assert_eq!(theme.panel.selected_fg, "yellow");
        assert_eq!(theme.panel.focused_border_fg, "cyan");
        assert_eq!(theme.panel.error_fg, "red");
    }

    #[test]
    fn parse_color_named() {
        assert_eq!(parse_color("blue"), Color::Blue);
        assert_eq!(parse_color("dark_gray"), Color::DarkGray);
        assert_eq!(parse_color("grey"), Color::Gray);
        assert_eq!(parse_color("light_cyan"), Color::LightCyan);
    }

    #[test]
    fn parse_color_case_insensitive() {
        assert_eq!(parse_color("Blue"), Color::Blue);
        assert_eq!(parse_color("YELLOW"), Color::Yellow);
    }

    #[test]
    fn parse_color_hex() {
        assert_eq!(parse_color("#ff5500"), Color::Rgb(255, 85, 0));
        assert_eq!(parse_color("#000000"), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn parse_color_unknown_returns_reset() {
        assert_eq!(parse_color("chartreuse"), Color::Reset);
        assert_eq!(parse_color("#fff"), Color::Reset);
        assert_eq!(parse_color(""), Color::Reset);
    }

    #[test]
    fn load_partial_theme_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("theme.toml");
        fs::write(
            &path,
            r##"
[panel]
folder_fg = "green"

[popup]
border_fg = "#112233"
"##,
        )
        .unwrap();

        let theme = Theme::load(&path).unwrap();
        assert_eq!(theme.panel.folder_fg, "green");
        assert_eq!(theme.panel.selected_fg, "yellow");
        assert_eq!(theme.popup.border_fg, "#112233");
        assert_eq!(theme.popup.key_fg, "cyan");
        assert_eq!(theme.statusbar.bg, "white");
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Theme::load(&tmp.path().join("missing.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }
}
