//! Typed preference store.
//!
//! Each [`PrefKey`] has one value shape. Reads deserialize into that shape
//! and fall back to the key's default when the stored text is missing or
//! does not fit; writes serialize to JSON text.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::nav::panel::PanelId;
use crate::prefs::backend::PreferenceBackend;
use crate::prefs::schema::{Credentials, EncodedCredentials, PrefKey, RecentJourney, SavedLocation};

const DEFAULT_RECENT_LIMIT: usize = 10;

/// Schema-aware access to a [`PreferenceBackend`].
#[derive(Debug, Clone)]
pub struct PreferenceStore<B> {
    backend: B,
    recent_limit: usize,
    default_pois: Vec<String>,
}

impl<B: PreferenceBackend> PreferenceStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            recent_limit: DEFAULT_RECENT_LIMIT,
            default_pois: Vec::new(),
        }
    }

    /// Caps recent journeys and recent searches at `limit` entries.
    pub fn with_recent_limit(self, limit: usize) -> Self {
        Self {
            recent_limit: limit.max(1),
            ..self
        }
    }

    /// POI selection reported while nothing is stored.
    pub fn with_default_pois(self, pois: Vec<String>) -> Self {
        Self {
            default_pois: pois,
            ..self
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read<T: DeserializeOwned>(&self, key: PrefKey) -> Option<T> {
        let raw = self.backend.read(key.as_str())?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, error = %e, "stored preference has unexpected shape, using default");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: PrefKey, value: &T) -> CoreResult<()> {
        let text = serde_json::to_string(value).map_err(|e| CoreError::Preference(e.to_string()))?;
        self.backend.write(key.as_str(), text)
    }

    // --- Recent journeys and searches ---

    /// Planned journeys, oldest first.
    pub fn recent_journeys(&self) -> Vec<RecentJourney> {
        self.read(PrefKey::RecentJourneys).unwrap_or_default()
    }

    /// Appends `journey`, dropping the oldest entries beyond the limit.
    pub fn add_recent_journey(&mut self, journey: RecentJourney) -> CoreResult<()> {
        let mut journeys = self.recent_journeys();
        journeys.push(journey);
        let excess = journeys.len().saturating_sub(self.recent_limit);
        journeys.drain(..excess);
        self.write(PrefKey::RecentJourneys, &journeys)
    }

    /// Searched places, newest first.
    pub fn recent_searches(&self) -> Vec<String> {
        self.read(PrefKey::RecentSearches).unwrap_or_default()
    }

    /// Moves `search` to the front. Blank searches are ignored.
    pub fn add_recent_search(&mut self, search: &str) -> CoreResult<()> {
        let search = search.trim();
        if search.is_empty() {
            return Ok(());
        }
        let mut searches = self.recent_searches();
        searches.retain(|s| s != search);
        searches.insert(0, search.to_string());
        searches.truncate(self.recent_limit);
        self.write(PrefKey::RecentSearches, &searches)
    }

    // --- Saved locations ---

    pub fn saved_locations(&self) -> Vec<SavedLocation> {
        self.read(PrefKey::SavedLocations).unwrap_or_default()
    }

    pub fn saved_location(&self, title: &str) -> Option<SavedLocation> {
        self.saved_locations().into_iter().find(|l| l.title == title)
    }

    /// Replaces the location with the same title, or appends a new one.
    pub fn upsert_saved_location(&mut self, location: SavedLocation) -> CoreResult<()> {
        let mut locations = self.saved_locations();
        match locations.iter_mut().find(|l| l.title == location.title) {
            Some(existing) => *existing = location,
            None => locations.push(location),
        }
        self.write(PrefKey::SavedLocations, &locations)
    }

    // --- POIs ---

    /// Active POI categories, or the configured default when none are stored.
    pub fn pois_activated(&self) -> Vec<String> {
        self.read(PrefKey::PoisActivated)
            .unwrap_or_else(|| self.default_pois.clone())
    }

    /// Makes `poi` the only active category.
    ///
    /// Returns `false` without writing if it already is active.
    pub fn select_poi(&mut self, poi: &str) -> CoreResult<bool> {
        if self.pois_activated().iter().any(|p| p == poi) {
            return Ok(false);
        }
        self.write(PrefKey::PoisActivated, &[poi])?;
        Ok(true)
    }

    // --- Credentials ---

    pub fn credentials(&self) -> Option<Credentials> {
        let encoded: EncodedCredentials = self.read(PrefKey::Credentials)?;
        let decoded = Credentials::decode(&encoded);
        if decoded.is_none() {
            tracing::warn!("stored credentials are not valid base64, ignoring");
        }
        decoded
    }

    pub fn store_credentials(&mut self, credentials: &Credentials) -> CoreResult<()> {
        self.write(PrefKey::Credentials, &credentials.encode())
    }

    pub fn clear_credentials(&mut self) -> CoreResult<()> {
        self.backend.remove(PrefKey::Credentials.as_str())
    }

    // --- Blog ---

    pub fn last_viewed_blog_post(&self) -> Option<u64> {
        self.read(PrefKey::LastViewedBlogPostId)
    }

    pub fn set_last_viewed_blog_post(&mut self, id: u64) -> CoreResult<()> {
        self.write(PrefKey::LastViewedBlogPostId, &id)
    }

    // --- Form values ---

    /// Every saved form value, keyed `panel.field`.
    pub fn form_values(&self) -> BTreeMap<String, String> {
        self.read(PrefKey::FormValues).unwrap_or_default()
    }

    /// Saved values grouped by panel. Keys naming unknown panels are skipped.
    pub fn form_values_by_panel(&self) -> BTreeMap<PanelId, Vec<(String, String)>> {
        let mut grouped: BTreeMap<PanelId, Vec<(String, String)>> = BTreeMap::new();
        for (key, value) in self.form_values() {
            let Some((panel, field)) = key.split_once('.') else {
                continue;
            };
            match panel.parse::<PanelId>() {
                Ok(panel) => grouped
                    .entry(panel)
                    .or_default()
                    .push((field.to_string(), value)),
                Err(e) => tracing::warn!(error = %e, "skipping saved form value"),
            }
        }
        grouped
    }

    /// Replaces the saved values of `panel` with `values`.
    pub fn save_form_values(
        &mut self,
        panel: PanelId,
        values: &BTreeMap<String, String>,
    ) -> CoreResult<()> {
        let prefix = format!("{panel}.");
        let mut all = self.form_values();
        all.retain(|key, _| !key.starts_with(&prefix));
        for (field, value) in values {
            all.insert(format!("{prefix}{field}"), value.clone());
        }
        self.write(PrefKey::FormValues, &all)
    }
}
