//! Event system for communication between UI and Core.
//!
//! The UI translates user gestures into [`Command`]s, which the
//! [`Controller`](crate::controller::Controller) processes. Work the core
//! cannot do itself (network requests, the platform share sheet) comes
//! back as [`Effect`]s for the frontend to carry out.

use crate::api::PendingRequest;
use crate::nav::panel::{MenuItem, PanelId, WizardId};

/// A user gesture the UI asks the core to handle.
///
/// Commands flow **UI → Core**. The core never creates commands itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // --- Navigation drawer ---
    /// The hamburger icon was pressed.
    OpenNav,
    /// The drawer was swiped closed.
    CloseNav,
    /// A click landed on the map.
    MapClicked,
    /// A drawer entry was chosen.
    MenuSelect(MenuItem),
    /// The eye icon of an active layer was pressed.
    DeactivateLayer(String),

    // --- Generic panel controls ---
    /// Back chevron, optionally with a target declared on the control.
    Back { declared: Option<PanelId> },
    /// Forward/confirm control of the visible panel.
    Forward,
    /// Cancel button: return to the home panel.
    ReturnHome,
    StartWizard(WizardId),
    /// A form control changed.
    SetField {
        panel: PanelId,
        field: String,
        value: String,
    },
    /// Persist the values of a panel's form.
    SaveForm(PanelId),

    // --- Journey planner ---
    /// Focus or swipe-up on the journey search card.
    OpenJourneyCard,
    /// Replan the recent journey at this index.
    SelectRecentJourney(usize),
    /// A shortcut icon such as "home" or "work".
    Shortcut(String),
    AddWaypoint,

    // --- Settings, POIs, photomap ---
    OpenAbout,
    /// Start placing the named shortcut location on the map.
    SetSavedLocation(String),
    SelectPoi(String),
    /// Text typed into the photomap tag field.
    TagQuery(String),

    // --- Account ---
    ForgottenPassword,

    // --- Browse box, popups, notifications ---
    OpenBrowse,
    CloseBrowse,
    OpenPopup(PanelId),
    ClosePopups,
    /// "Get directions" on a places popup.
    GetDirections,
    /// The visible notification was clicked.
    DismissNotification,
}

/// Work the frontend must perform on the core's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Execute a remote call and report back with its ticket.
    Request(PendingRequest),
    /// Offer content to the platform share sheet.
    Share {
        title: String,
        text: String,
        url: String,
    },
}
