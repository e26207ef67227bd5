//! CycleNav core library: UI-agnostic journey-planner interface logic.
//!
//! `cyclenav-core` holds everything behind the panels of a mobile cycling
//! map: which card is on screen and how to get back, the notification
//! slot, how much of the map a card covers, what the user has saved, and
//! the remote calls for accounts, tags and the blog. It has no rendering
//! code; the terminal frontend (`cyclenav-tui`) drives it through
//! [`Controller`].
//!
//! # Modules
//!
//! - [`nav`]: Panel registry, breadcrumbs, forms and the [`Navigator`] state machine.
//! - [`notify`]: Single-slot FIFO [`NotificationQueue`].
//! - [`viewport`]: Keeps the map's bottom inset in step with the visible card.
//! - [`prefs`]: Typed, validated [`PreferenceStore`] over memory or a JSON file.
//! - [`api`]: Remote calls, request tickets and the reqwest-based [`HttpApiClient`].
//! - [`routing`]: The narrow handle on the external route planner.
//! - [`controller`]: UI action handlers.
//! - [`config`]: TOML settings, keymaps and themes.
//! - [`event`]: Command and effect types for UI ↔ Core communication.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod action;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod nav;
pub mod notify;
pub mod prefs;
pub mod routing;
pub mod viewport;

pub use error::{CoreError, CoreResult};
pub use event::{Command, Effect};

pub use api::{
    ApiCall, ApiClient, ApiError, ApiReply, ApiResult, BlogPost, HttpApiClient, PendingRequest,
    RequestTicket,
};
pub use controller::Controller;
pub use nav::engine::{Chrome, Navigator, Transition, TransitionKind};
pub use nav::panel::{MenuItem, PanelGroup, PanelId, PanelRegistry, WizardId};
pub use notify::{Notification, NotificationEvent, NotificationQueue};
pub use prefs::backend::{FileBackend, MemoryBackend, PreferenceBackend};
pub use prefs::store::PreferenceStore;
pub use routing::{LngLat, LocalRouting, Routing, Waypoint};
pub use viewport::{MapOptions, MapSurface, PanelHeights, PanelMeasure};

pub use action::{Action, ActionCategory, ActionDescriptor, ActionRegistry};
pub use config::keymap::Keymap;
pub use config::settings::Config;
pub use config::theme::{parse_color, Theme};
