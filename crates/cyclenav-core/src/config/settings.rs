//! Application configuration loaded from a TOML file.
//!
//! Every field has a default, so CycleNav runs without a config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::nav::panel::{PanelGroup, PanelId, PanelRegistry};
use crate::routing::LngLat;
use crate::viewport::{MapOptions, PanelHeights};

/// Top-level application configuration.
///
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Remote API endpoints.
///
/// URL templates may contain `{%apiBaseUrl}` and `{%apiKey}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key")]
    pub key: String,
    #[serde(default = "default_authentication_url")]
    pub authentication_url: String,
    #[serde(default = "default_account_creation_url")]
    pub account_creation_url: String,
    #[serde(default = "default_password_reset_url")]
    pub password_reset_url: String,
    #[serde(default = "default_photomap_tags_url")]
    pub photomap_tags_url: String,
    #[serde(default = "default_blog_posts_url")]
    pub blog_posts_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            key: default_api_key(),
            authentication_url: default_authentication_url(),
            account_creation_url: default_account_creation_url(),
            password_reset_url: default_password_reset_url(),
            photomap_tags_url: default_photomap_tags_url(),
            blog_posts_url: default_blog_posts_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Initial map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_container")]
    pub container: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_map_style")]
    pub style: String,
    #[serde(default = "default_tile_layer")]
    pub tile_layer: String,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

impl MapConfig {
    pub fn center(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }

    /// Parameters for creating the map.
    pub fn options(&self) -> MapOptions {
        MapOptions {
            container: self.container.clone(),
            center: self.center(),
            zoom: self.zoom.min(self.max_zoom),
            style: self.style.clone(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: default_map_container(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            zoom: default_zoom(),
            style: default_map_style(),
            tile_layer: default_tile_layer(),
            max_zoom: default_max_zoom(),
        }
    }
}

/// Behaviour of the panels and notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_home_panel")]
    pub home_panel: String,
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
    #[serde(default = "default_layers")]
    pub default_layers: Vec<String>,
    #[serde(default = "default_pois")]
    pub default_pois: Vec<String>,
    #[serde(default = "default_shortcut_locations")]
    pub shortcut_locations: Vec<String>,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_autocomplete_min_chars")]
    pub autocomplete_min_chars: usize,
}

impl UiConfig {
    /// The configured home panel.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownPanel`] if `home_panel` names no panel, or names
    /// a popup rather than a card.
    pub fn home_panel(&self) -> CoreResult<PanelId> {
        let panel: PanelId = self.home_panel.parse()?;
        match PanelRegistry::default().group(panel) {
            PanelGroup::Main => Ok(panel),
            PanelGroup::Popup => Err(CoreError::UnknownPanel(format!(
                "{panel} is a popup and cannot be the home panel"
            ))),
        }
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            home_panel: default_home_panel(),
            notification_ms: default_notification_ms(),
            default_layers: default_layers(),
            default_pois: default_pois(),
            shortcut_locations: default_shortcut_locations(),
            recent_limit: default_recent_limit(),
            autocomplete_min_chars: default_autocomplete_min_chars(),
        }
    }
}

/// Panel heights, keyed by panel name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_panel_height")]
    pub default_height: u32,
    #[serde(default)]
    pub collapsed: BTreeMap<String, u32>,
    #[serde(default)]
    pub expanded: BTreeMap<String, u32>,
}

impl LayoutConfig {
    /// Resolves panel names into a [`PanelHeights`] table.
    ///
    /// Unknown panel names are logged and ignored.
    pub fn to_heights(&self) -> PanelHeights {
        let resolve = |table: &BTreeMap<String, u32>| {
            table
                .iter()
                .filter_map(|(name, height)| match name.parse::<PanelId>() {
                    Ok(panel) => Some((panel, *height)),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring layout entry");
                        None
                    }
                })
                .collect()
        };
        PanelHeights {
            default_height: self.default_height,
            collapsed: resolve(&self.collapsed),
            expanded: resolve(&self.expanded),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let heights = PanelHeights::default();
        let named = |table: &BTreeMap<PanelId, u32>| {
            table
                .iter()
                .map(|(panel, height)| (panel.to_string(), *height))
                .collect()
        };
        Self {
            default_height: heights.default_height,
            collapsed: named(&heights.collapsed),
            expanded: named(&heights.expanded),
        }
    }
}

/// Where preferences are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file for preferences. Without one the frontend picks a location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "https://api.cyclestreets.net".to_string()
}

fn default_api_key() -> String {
    "YOUR_API_KEY".to_string()
}

fn default_authentication_url() -> String {
    "{%apiBaseUrl}/v2/user.authenticate?key={%apiKey}".to_string()
}

fn default_account_creation_url() -> String {
    "{%apiBaseUrl}/v2/user.create?key={%apiKey}".to_string()
}

fn default_password_reset_url() -> String {
    "https://www.cyclestreets.net/signin/resetpassword/".to_string()
}

fn default_photomap_tags_url() -> String {
    "{%apiBaseUrl}/v2/photomap.tags?key={%apiKey}&limit=10".to_string()
}

fn default_blog_posts_url() -> String {
    "https://www.cyclestreets.org/wp-json/wp/v2/posts".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_map_container() -> String {
    "map".to_string()
}

fn default_latitude() -> f64 {
    53.78
}

fn default_longitude() -> f64 {
    -2.37
}

fn default_zoom() -> f64 {
    5.0
}

fn default_map_style() -> String {
    "mapbox://styles/mapbox/light-v9".to_string()
}

fn default_tile_layer() -> String {
    "opencyclemap".to_string()
}

fn default_max_zoom() -> f64 {
    20.0
}

fn default_home_panel() -> String {
    PanelId::JourneySearch.to_string()
}

fn default_notification_ms() -> u64 {
    2500
}

fn default_layers() -> Vec<String> {
    vec!["photomap".to_string()]
}

fn default_pois() -> Vec<String> {
    vec!["cycleparking".to_string()]
}

fn default_shortcut_locations() -> Vec<String> {
    vec!["home".to_string(), "work".to_string()]
}

fn default_recent_limit() -> usize {
    10
}

fn default_autocomplete_min_chars() -> usize {
    3
}

fn default_panel_height() -> u32 {
    PanelHeights::default().default_height
}
