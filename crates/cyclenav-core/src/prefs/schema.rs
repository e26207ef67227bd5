//! Keys and value shapes of persisted preferences.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::routing::{LngLat, Waypoint};

/// Every key the preference store writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    /// `Vec<RecentJourney>`, oldest first.
    RecentJourneys,
    /// `Vec<String>`, newest first.
    RecentSearches,
    /// `Vec<SavedLocation>`.
    SavedLocations,
    /// `Vec<String>` of POI category ids.
    PoisActivated,
    /// Base64-encoded [`Credentials`].
    Credentials,
    /// `u64` id of the newest blog post the user has seen.
    LastViewedBlogPostId,
    /// `BTreeMap<String, String>` keyed `panel.field`.
    FormValues,
}

impl PrefKey {
    pub const ALL: [PrefKey; 7] = [
        Self::RecentJourneys,
        Self::RecentSearches,
        Self::SavedLocations,
        Self::PoisActivated,
        Self::Credentials,
        Self::LastViewedBlogPostId,
        Self::FormValues,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecentJourneys => "recentJourneys",
            Self::RecentSearches => "recentSearches",
            Self::SavedLocations => "savedLocations",
            Self::PoisActivated => "poisActivated",
            Self::Credentials => "credentials",
            Self::LastViewedBlogPostId => "lastViewedBlogPostId",
            Self::FormValues => "formValues",
        }
    }
}

impl fmt::Display for PrefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A journey the user planned, replayable from the search card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentJourney {
    pub origin: String,
    pub destination: String,
    pub waypoints: Vec<Waypoint>,
}

/// A named shortcut location such as "home" or "work".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub title: String,
    /// Absent when the user saved without placing a marker.
    pub coordinates: Option<LngLat>,
    pub address: String,
}

/// Sign-in credentials kept so the user stays logged in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// On-disk shape of [`Credentials`]: both parts base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EncodedCredentials {
    identifier: String,
    password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    pub(crate) fn encode(&self) -> EncodedCredentials {
        EncodedCredentials {
            identifier: STANDARD.encode(self.identifier.as_bytes()),
            password: STANDARD.encode(self.password.as_bytes()),
        }
    }

    /// Decodes a stored value. `None` if either part is not valid base64 UTF-8.
    pub(crate) fn decode(encoded: &EncodedCredentials) -> Option<Self> {
        let part = |s: &str| {
            STANDARD
                .decode(s)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
        };
        Some(Self {
            identifier: part(&encoded.identifier)?,
            password: part(&encoded.password)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_camel_case_names() {
        assert_eq!(PrefKey::LastViewedBlogPostId.as_str(), "lastViewedBlogPostId");
        assert_eq!(PrefKey::PoisActivated.to_string(), "poisActivated");
    }

    #[test]
    fn credentials_are_base64_on_disk() {
        let creds = Credentials::new("rider", "p@ss wörd");
        let encoded = creds.encode();
        let json = serde_json::to_value(&encoded).unwrap();
        assert_eq!(json["identifier"], "cmlkZXI=");
        assert_eq!(Credentials::decode(&encoded), Some(creds));
    }

    #[test]
    fn invalid_base64_does_not_decode() {
        let encoded: EncodedCredentials =
            serde_json::from_str(r#"{"identifier":"!!!","password":"cGFzcw=="}"#).unwrap();
        assert_eq!(Credentials::decode(&encoded), None);
    }

    #[test]
    fn debug_hides_password() {
        let text = format!("{:?}", Credentials::new("rider", "secret"));
        assert!(text.contains("rider"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn saved_location_without_coordinates_parses() {
        let loc: SavedLocation =
            serde_json::from_str(r#"{"title":"home","coordinates":null,"address":"1 Lane"}"#)
                .unwrap();
        assert_eq!(loc.coordinates, None);
    }
}
