//! Key binding configuration.
//!
//! Key bindings map key names (e.g. `"m"`, `"Tab"`, `"Enter"`) to [`Action`]
//! values. Arrow keys and `Esc` are handled by the frontend directly and
//! cannot be rebound.
//!
//! TOML files use string action identifiers (e.g. `"toggle_drawer"`);
//! these are resolved to [`Action`] via [`ActionRegistry::find_by_id`] at load time.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::action::{Action, ActionRegistry};
use crate::error::{CoreError, CoreResult};

/// Raw TOML representation, resolved after deserialization.
#[derive(Debug, Clone, Deserialize)]
struct RawKeymap {
    #[serde(default)]
    bindings: HashMap<String, String>,
}

/// Complete set of key bindings.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, Action>,
    /// Action → bound keys, for the help overlay.
    reverse: HashMap<Action, Vec<String>>,
}

impl Default for Keymap {
    fn default() -> Self {
        let defaults = [
            // Navigation
            ("m", Action::ToggleDrawer),
            ("Tab", Action::ToggleDrawer),
            ("h", Action::Back),
            ("Backspace", Action::Back),
            ("l", Action::Forward),
            ("H", Action::Home),
            ("j", Action::NextItem),
            ("k", Action::PrevItem),
            ("Enter", Action::Select),
            // Forms
            ("e", Action::EditField),
            ("s", Action::SaveForm),
            ("w", Action::StartWizard),
            // Map
            ("/", Action::FocusJourneySearch),
            ("g", Action::BrowseSearch),
            ("a", Action::AddWaypoint),
            ("c", Action::MapClick),
            ("p", Action::OpenPopup),
            // System
            ("x", Action::DismissNotification),
            ("?", Action::Help),
            ("q", Action::Quit),
        ];
        let bindings: HashMap<String, Action> = defaults
            .into_iter()
            .map(|(key, action)| (key.to_string(), action))
            .collect();
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
    /// Unknown action strings are logged and skipped. The file replaces the
    /// defaults entirely; keys it does not mention are unbound.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        let raw: RawKeymap =
            toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawKeymap) -> Self {
        let registry = ActionRegistry::new();
        let bindings: HashMap<String, Action> = raw
            .bindings
            .into_iter()
            .filter_map(|(key, action_id)| match registry.find_by_id(&action_id) {
                Some(action) => Some((key, action)),
                None => {
                    tracing::warn!(key = %key, action = %action_id, "unknown action in keymap");
                    None
                }
            })
            .collect();
        let reverse = build_reverse(&bindings);
        Self { bindings, reverse }
    }

    /// Returns the action mapped to `key`, or `None` if unbound.
    pub fn action_for_key(&self, key: &str) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    /// Returns the key(s) bound to `action`, sorted.
    pub fn keys_for_action(&self, action: Action) -> Option<&[String]> {
        self.reverse.get(&action).map(|v| v.as_slice())
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
    fn default_keymap_has_navigation_keys() {
        let keymap = Keymap::default();

        assert_eq!(keymap.action_for_key("m"), Some(Action::ToggleDrawer));
        assert_eq!(keymap.action_for_key("h"), Some(Action::Back));
        assert_eq!(keymap.action_for_key("l"), Some(Action::Forward));
        assert_eq!(keymap.action_for_key("j"), Some(Action::NextItem));
        assert_eq!(keymap.action_for_key("k"), Some(Action::PrevItem));
        assert_eq!(keymap.action_for_key("Enter"), Some(Action::Select));
    }

    #[test]
    fn default_keymap_has_map_keys() {
        let keymap = Keymap::default();

        assert_eq!(keymap.action_for_key("/"), Some(Action::FocusJourneySearch));
        assert_eq!(keymap.action_for_key("a"), Some(Action::AddWaypoint));
        assert_eq!(keymap.action_for_key("c"), Some(Action::MapClick));
    }

    #[test]
    fn every_action_has_a_default_key() {
        let keymap = Keymap::default();
        for d in ActionRegistry::new().all() {
            assert!(
                keymap.keys_for_action(d.action).is_some(),
                "{} is unbound",
                d.id
            );
        }
    }

    #[test]
    fn action_for_unknown_key_returns_none() {
        let keymap = Keymap::default();
        assert_eq!(keymap.action_for_key("z"), None);
        assert_eq!(keymap.action_for_key(""), None);
        assert_eq!(keymap.action_for_key("Ctrl+X"), None);
    }

    #[test]
    fn load_custom_keymap() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keymap.toml");
        fs::write(
            &path,
            r#"
[bindings]
b = "back"
n = "forward"
Q = "quit"
"#,
        )
        .unwrap();

        let keymap = Keymap::load(&path).unwrap();

        assert_eq!(keymap.action_for_key("b"), Some(Action::Back));
        assert_eq!(keymap.action_for_key("n"), Some(Action::Forward));
        assert_eq!(keymap.action_for_key("Q"), Some(Action::Quit));
        // No merging with defaults
        assert_eq!(keymap.action_for_key("h"), None);
    }

    #[test]
    fn load_custom_keymap_ignores_unknown_actions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keymap.toml");
        fs::write(
            &path,
            r#"
[bindings]
h = "back"
x = "fly_to_the_moon"
"#,
        )
        .unwrap();

        let keymap = Keymap::load(&path).unwrap();
        assert_eq!(keymap.action_for_key("h"), Some(Action::Back));
        assert_eq!(keymap.action_for_key("x"), None);
    }

    #[test]
    fn load_empty_keymap_has_no_bindings() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("keymap.toml");
        fs::write(&path, "").unwrap();

        let keymap = Keymap::load(&path).unwrap();
        assert!(keymap.bindings().is_empty());
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
    fn keys_for_action_are_sorted() {
        let keymap = Keymap::default();
        let keys = keymap.keys_for_action(Action::Back).unwrap();
        assert_eq!(keys, ["Backspace".to_string(), "h".to_string()]);
    }
}
