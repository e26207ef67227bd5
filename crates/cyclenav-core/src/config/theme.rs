//! Theme configuration for CycleNav.
//!
//! Colors are stored as strings (e.g. `"green"`, `"#3a7d44"`) and converted
//! to [`ratatui::style::Color`] at render time via [`parse_color`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Complete theme configuration with per-component color groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub map: MapTheme,
    #[serde(default)]
    pub card: CardTheme,
    #[serde(default)]
    pub nav: NavTheme,
    #[serde(default)]
    pub notification: NotificationTheme,
    #[serde(default)]
    pub popup: PopupTheme,
}

impl Theme {
    /// Loads a theme from a TOML file at `path`.
    ///
    /// Missing groups keep their defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Map area colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapTheme {
    pub bg: String,
    pub grid_fg: String,
    pub waypoint_fg: String,
    pub marker_fg: String,
}

impl Default for MapTheme {
    fn default() -> Self {
        Self {
            bg: "reset".to_string(),
            grid_fg: "dark_gray".to_string(),
            waypoint_fg: "green".to_string(),
            marker_fg: "light_red".to_string(),
        }
    }
}

/// Bottom card colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardTheme {
    pub border_fg: String,
    pub title_fg: String,
    pub label_fg: String,
    pub selected_fg: String,
    pub disabled_fg: String,
    pub error_fg: String,
    pub breadcrumb_fg: String,
}

impl Default for CardTheme {
    fn default() -> Self {
        Self {
            border_fg: "green".to_string(),
            title_fg: "white".to_string(),
            label_fg: "gray".to_string(),
            selected_fg: "yellow".to_string(),
            disabled_fg: "dark_gray".to_string(),
            error_fg: "red".to_string(),
            breadcrumb_fg: "dark_gray".to_string(),
        }
    }
}

/// Navigation drawer colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavTheme {
    pub bg: String,
    pub item_fg: String,
    pub selected_fg: String,
    pub active_layer_fg: String,
}

impl Default for NavTheme {
    fn default() -> Self {
        Self {
            bg: "black".to_string(),
            item_fg: "white".to_string(),
            selected_fg: "yellow".to_string(),
            active_layer_fg: "green".to_string(),
        }
    }
}

/// Notification banner colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTheme {
    pub bg: String,
    pub fg: String,
}

impl Default for NotificationTheme {
    fn default() -> Self {
        Self {
            bg: "#3a7d44".to_string(),
            fg: "white".to_string(),
        }
    }
}

/// Popup/dialog colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupTheme {
    pub border_fg: String,
}

impl Default for PopupTheme {
    fn default() -> Self {
        Self {
            border_fg: "yellow".to_string(),
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
        "white" => Color::White,
        hex if hex.starts_with('#') && hex.len() == 7 && hex.is_ascii() => {
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
    fn default_theme_card() {
        let theme = Theme::default();
        assert_eq!(theme.card.border_fg, "green");
        assert_eq!(theme.card.error_fg, "red");
        assert_eq!(theme.card.disabled_fg, "dark_gray");
    }

    #[test]
    fn default_theme_notification_is_hex() {
        let theme = Theme::default();
        assert_eq!(parse_color(&theme.notification.bg), Color::Rgb(0x3a, 0x7d, 0x44));
    }

    #[test]
    fn parse_color_named() {
        assert_eq!(parse_color("blue"), Color::Blue);
        assert_eq!(parse_color("dark_gray"), Color::DarkGray);
        assert_eq!(parse_color("light_red"), Color::LightRed);
        assert_eq!(parse_color("reset"), Color::Reset);
    }

    #[test]
    fn parse_color_case_insensitive() {
        assert_eq!(parse_color("Green"), Color::Green);
        assert_eq!(parse_color("DarkGray"), Color::DarkGray);
    }

    #[test]
    fn parse_color_hex() {
        assert_eq!(parse_color("#ff0000"), Color::Rgb(255, 0, 0));
        assert_eq!(parse_color("#FF5500"), Color::Rgb(255, 85, 0));
    }

    #[test]
    fn parse_color_rejects_bad_input() {
        assert_eq!(parse_color("nonexistent"), Color::Reset);
        assert_eq!(parse_color(""), Color::Reset);
        assert_eq!(parse_color("#zzzzzz"), Color::Rgb(0, 0, 0));
        // Seven bytes but not ASCII
        assert_eq!(parse_color("#ééé"), Color::Reset);
    }

    #[test]
    fn load_partial_theme_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("theme.toml");
        fs::write(
            &path,
            r##"
[card]
border_fg = "#00ff00"
title_fg = "white"
label_fg = "gray"
selected_fg = "cyan"
disabled_fg = "dark_gray"
error_fg = "red"
breadcrumb_fg = "gray"
"##,
        )
        .unwrap();

        let theme = Theme::load(&path).unwrap();
        assert_eq!(theme.card.border_fg, "#00ff00");
        assert_eq!(theme.card.selected_fg, "cyan");
        assert_eq!(theme.nav.selected_fg, "yellow");
        assert_eq!(theme.popup.border_fg, "yellow");
    }

    #[test]
    fn load_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = Theme::load(&tmp.path().join("missing.toml"));
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn load_invalid_toml_returns_config_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("theme.toml");
        fs::write(&path, "[card\nborder_fg = 1").unwrap();
        assert!(matches!(
            Theme::load(&path).unwrap_err(),
            CoreError::ConfigParse(_)
        ));
    }
}
