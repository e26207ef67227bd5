//! Panel identity and the panel registry.
//!
//! Every UI card is named by a [`PanelId`]. The [`PanelRegistry`] carries the
//! metadata the navigation engine needs about each panel: which group it
//! belongs to, which wizard (if any) it is a step of, which form fields it
//! holds, and which panel is the home fallback.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::nav::form::{FieldKind, FormScope};

/// A named UI region.
///
/// Declaration order is the display order used when "the first visible
/// panel" has to be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelId {
    JourneySearch,
    JourneySelect,
    JourneySetLocation,
    RideTrackerTrack,
    RideTrackerAddDetails,
    RideTrackerShowTrackedRide,
    Settings,
    About,
    Pois,
    Photomap,
    PhotomapAddLocation,
    PhotomapAddDetails,
    PhotomapUploading,
    Blog,
    Account,
    ChooseUsername,
    ChoosePassword,
    CreatingAccount,
    LoggedIn,
    ResetPassword,
    FeedbackError,
    PlacesPopup,
    PhotomapPopup,
}

impl PanelId {
    /// Every panel, in declaration order.
    pub const ALL: [PanelId; 23] = [
        Self::JourneySearch,
        Self::JourneySelect,
        Self::JourneySetLocation,
        Self::RideTrackerTrack,
        Self::RideTrackerAddDetails,
        Self::RideTrackerShowTrackedRide,
        Self::Settings,
        Self::About,
        Self::Pois,
        Self::Photomap,
        Self::PhotomapAddLocation,
        Self::PhotomapAddDetails,
        Self::PhotomapUploading,
        Self::Blog,
        Self::Account,
        Self::ChooseUsername,
        Self::ChoosePassword,
        Self::CreatingAccount,
        Self::LoggedIn,
        Self::ResetPassword,
        Self::FeedbackError,
        Self::PlacesPopup,
        Self::PhotomapPopup,
    ];

    /// Kebab-case identifier, e.g. `"journey-search"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JourneySearch => "journey-search",
            Self::JourneySelect => "journey-select",
            Self::JourneySetLocation => "journey-set-location",
            Self::RideTrackerTrack => "ride-tracker-track",
            Self::RideTrackerAddDetails => "ride-tracker-add-details",
            Self::RideTrackerShowTrackedRide => "ride-tracker-show-tracked-ride",
            Self::Settings => "settings",
            Self::About => "about",
            Self::Pois => "pois",
            Self::Photomap => "photomap",
            Self::PhotomapAddLocation => "photomap-add-location",
            Self::PhotomapAddDetails => "photomap-add-details",
            Self::PhotomapUploading => "photomap-uploading",
            Self::Blog => "blog",
            Self::Account => "account",
            Self::ChooseUsername => "choose-username",
            Self::ChoosePassword => "choose-password",
            Self::CreatingAccount => "creating-account",
            Self::LoggedIn => "logged-in",
            Self::ResetPassword => "reset-password",
            Self::FeedbackError => "feedback-error",
            Self::PlacesPopup => "places-popup",
            Self::PhotomapPopup => "photomap-popup",
        }
    }

    /// Human-readable card title.
    pub fn title(self) -> &'static str {
        match self {
            Self::JourneySearch => "Where do you want to go?",
            Self::JourneySelect => "Choose a route",
            Self::JourneySetLocation => "Set location",
            Self::RideTrackerTrack => "Ride tracker",
            Self::RideTrackerAddDetails => "Add ride details",
            Self::RideTrackerShowTrackedRide => "Your ride",
            Self::Settings => "Settings",
            Self::About => "About",
            Self::Pois => "Points of interest",
            Self::Photomap => "Photomap",
            Self::PhotomapAddLocation => "Photo location",
            Self::PhotomapAddDetails => "Photo details",
            Self::PhotomapUploading => "Uploading",
            Self::Blog => "Blog",
            Self::Account => "Sign in",
            Self::ChooseUsername => "Choose a username",
            Self::ChoosePassword => "Choose a password",
            Self::CreatingAccount => "Please wait",
            Self::LoggedIn => "Signed in",
            Self::ResetPassword => "Reset password",
            Self::FeedbackError => "Something went wrong",
            Self::PlacesPopup => "Place",
            Self::PhotomapPopup => "Photo",
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::UnknownPanel(s.to_string()))
    }
}

/// Independent visibility groups. At most one panel per group is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelGroup {
    /// The card stack at the bottom of the screen.
    Main,
    /// Overlays shown above the map, independent of the card stack.
    Popup,
}

/// Linear multi-step flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardId {
    Photomap,
    Account,
}

/// Declaration of a single form field on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Static metadata for one panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSpec {
    pub id: PanelId,
    pub group: PanelGroup,
    pub wizard: Option<WizardId>,
    pub fields: Vec<FieldSpec>,
}

/// Entries of the slide-out navigation drawer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MenuItem {
    JourneyPlanner,
    RideTracker,
    Photomap,
    Pois,
    Settings,
    Account,
    Blog,
    /// The "Data" entry, which only toggles its submenu.
    Data,
    /// A data layer inside the Data submenu.
    DataLayer(String),
}

impl MenuItem {
    /// The top-level entries, in drawer order.
    pub const TOP_LEVEL: [MenuItem; 8] = [
        MenuItem::JourneyPlanner,
        MenuItem::RideTracker,
        MenuItem::Photomap,
        MenuItem::Pois,
        MenuItem::Settings,
        MenuItem::Account,
        MenuItem::Blog,
        MenuItem::Data,
    ];

    /// The panel the item opens, if it opens one.
    pub fn panel(&self) -> Option<PanelId> {
        match self {
            Self::JourneyPlanner => Some(PanelId::JourneySearch),
            Self::RideTracker => Some(PanelId::RideTrackerTrack),
            Self::Photomap => Some(PanelId::Photomap),
            Self::Pois => Some(PanelId::Pois),
            Self::Settings => Some(PanelId::Settings),
            Self::Account => Some(PanelId::Account),
            Self::Blog => Some(PanelId::Blog),
            Self::Data | Self::DataLayer(_) => None,
        }
    }

    /// Drawer label.
    pub fn label(&self) -> &str {
        match self {
            Self::JourneyPlanner => "Journey planner",
            Self::RideTracker => "Ride tracker",
            Self::Photomap => "Photomap",
            Self::Pois => "Places",
            Self::Settings => "Settings",
            Self::Account => "Sign in",
            Self::Blog => "Blog",
            Self::Data => "Data",
            Self::DataLayer(id) => id.as_str(),
        }
    }
}

/// Registry of every panel's metadata plus the wizard sequences.
#[derive(Debug, Clone)]
pub struct PanelRegistry {
    specs: BTreeMap<PanelId, PanelSpec>,
    wizards: BTreeMap<WizardId, Vec<PanelId>>,
    home: PanelId,
}

impl PanelRegistry {
    /// Builds the registry of the journey-planner application with the
    /// given home panel.
    pub fn new(home: PanelId) -> Self {
        use FieldKind::{Input, SegmentedControl, Select, TextArea};

        let mut specs = BTreeMap::new();
        let mut add = |id: PanelId, group: PanelGroup, wizard: Option<WizardId>, fields: Vec<FieldSpec>| {
            specs.insert(
                id,
                PanelSpec {
                    id,
                    group,
                    wizard,
                    fields,
                },
            );
        };

        add(
            PanelId::JourneySearch,
            PanelGroup::Main,
            None,
            vec![
                FieldSpec::required("origin", Input),
                FieldSpec::required("destination", Input),
            ],
        );
        add(PanelId::JourneySelect, PanelGroup::Main, None, vec![]);
        add(
            PanelId::JourneySetLocation,
            PanelGroup::Main,
            None,
            vec![FieldSpec::required("location", Input)],
        );
        add(PanelId::RideTrackerTrack, PanelGroup::Main, None, vec![]);
        add(
            PanelId::RideTrackerAddDetails,
            PanelGroup::Main,
            None,
            vec![
                FieldSpec::optional("title", Input),
                FieldSpec::optional("notes", TextArea),
            ],
        );
        add(PanelId::RideTrackerShowTrackedRide, PanelGroup::Main, None, vec![]);
        add(
            PanelId::Settings,
            PanelGroup::Main,
            None,
            vec![
                FieldSpec::optional("speed", SegmentedControl),
                FieldSpec::optional("units", SegmentedControl),
            ],
        );
        add(PanelId::About, PanelGroup::Main, None, vec![]);
        add(PanelId::Pois, PanelGroup::Main, None, vec![]);
        add(PanelId::Photomap, PanelGroup::Main, None, vec![]);
        add(
            PanelId::PhotomapAddLocation,
            PanelGroup::Main,
            Some(WizardId::Photomap),
            vec![FieldSpec::required("location", Input)],
        );
        add(
            PanelId::PhotomapAddDetails,
            PanelGroup::Main,
            Some(WizardId::Photomap),
            vec![
                FieldSpec::required("photo", Input),
                FieldSpec::required("caption", TextArea),
                FieldSpec::required("category", Select),
                FieldSpec::optional("tags", Input),
            ],
        );
        add(
            PanelId::PhotomapUploading,
            PanelGroup::Main,
            Some(WizardId::Photomap),
            vec![],
        );
        add(PanelId::Blog, PanelGroup::Main, None, vec![]);
        add(
            PanelId::Account,
            PanelGroup::Main,
            None,
            vec![
                FieldSpec::required("identifier", Input),
                FieldSpec::required("password", Input),
            ],
        );
        add(
            PanelId::ChooseUsername,
            PanelGroup::Main,
            Some(WizardId::Account),
            vec![
                FieldSpec::required("username", Input),
                FieldSpec::required("email", Input),
            ],
        );
        add(
            PanelId::ChoosePassword,
            PanelGroup::Main,
            Some(WizardId::Account),
            vec![FieldSpec::required("password", Input)],
        );
        add(PanelId::CreatingAccount, PanelGroup::Main, None, vec![]);
        add(PanelId::LoggedIn, PanelGroup::Main, None, vec![]);
        add(
            PanelId::ResetPassword,
            PanelGroup::Main,
            None,
            vec![FieldSpec::required("email", Input)],
        );
        add(PanelId::FeedbackError, PanelGroup::Main, None, vec![]);
        add(PanelId::PlacesPopup, PanelGroup::Popup, None, vec![]);
        add(PanelId::PhotomapPopup, PanelGroup::Popup, None, vec![]);

        let wizards = BTreeMap::from([
            (
                WizardId::Photomap,
                vec![
                    PanelId::PhotomapAddLocation,
                    PanelId::PhotomapAddDetails,
                    PanelId::PhotomapUploading,
                ],
            ),
            (
                WizardId::Account,
                vec![PanelId::ChooseUsername, PanelId::ChoosePassword],
            ),
        ]);

        Self {
            specs,
            wizards,
            home,
        }
    }

    /// The panel shown when there is no navigation history.
    pub fn home(&self) -> PanelId {
        self.home
    }

    pub fn spec(&self, id: PanelId) -> Option<&PanelSpec> {
        self.specs.get(&id)
    }

    /// Visibility group of `id`. Unregistered panels count as `Main`.
    pub fn group(&self, id: PanelId) -> PanelGroup {
        self.specs.get(&id).map_or(PanelGroup::Main, |s| s.group)
    }

    /// The wizard `id` is a step of, if any.
    pub fn wizard_of(&self, id: PanelId) -> Option<WizardId> {
        self.specs.get(&id).and_then(|s| s.wizard)
    }

    /// The ordered steps of `wizard`.
    pub fn wizard_steps(&self, wizard: WizardId) -> &[PanelId] {
        self.wizards.get(&wizard).map_or(&[], Vec::as_slice)
    }

    /// First step of `wizard`.
    pub fn first_in_wizard(&self, wizard: WizardId) -> Option<PanelId> {
        self.wizard_steps(wizard).first().copied()
    }

    /// The structural next sibling of `id` within its wizard.
    ///
    /// Returns `None` for the last step and for panels outside any wizard.
    pub fn next_in_wizard(&self, id: PanelId) -> Option<PanelId> {
        let steps = self.wizard_steps(self.wizard_of(id)?);
        let index = steps.iter().position(|p| *p == id)?;
        steps.get(index + 1).copied()
    }

    /// Builds an empty form for every panel that declares fields.
    pub fn empty_forms(&self) -> BTreeMap<PanelId, FormScope> {
        self.specs
            .values()
            .filter(|spec| !spec.fields.is_empty())
            .map(|spec| (spec.id, FormScope::from_specs(&spec.fields)))
            .collect()
    }
}

impl Default for PanelRegistry {
    fn default() -> Self {
        Self::new(PanelId::JourneySearch)
    }
}
