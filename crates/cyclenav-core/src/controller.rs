//! UI action handlers.
//!
//! [`Controller`] receives [`Command`]s from the frontend, drives the
//! [`Navigator`], notification queue, preference store and routing
//! collaborator, and hands back [`Effect`]s for work it cannot do itself.
//! Remote results come back through [`Controller::complete`].

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::api::blog::{count_new_posts, new_posts_message, newest_post_id};
use crate::api::{ApiCall, ApiError, ApiReply, ApiResult, BlogPurpose, PendingRequest, RequestTicket};
use crate::config::settings::{Config, UiConfig};
use crate::error::CoreResult;
use crate::event::{Command, Effect};
use crate::nav::engine::Navigator;
use crate::nav::panel::{MenuItem, PanelId, PanelRegistry, WizardId};
use crate::notify::{Notification, NotificationEvent, NotificationQueue};
use crate::prefs::backend::PreferenceBackend;
use crate::prefs::schema::{Credentials, RecentJourney, SavedLocation};
use crate::prefs::store::PreferenceStore;
use crate::routing::{Routing, Waypoint};
use crate::viewport::MapSurface;

const TICK_ICON: &str = "/images/tick-green.png";
const BLOG_ICON: &str = "/images/icon-hashtag.svg";

const LOGGING_IN: &str = "Logging in...";
const CREATING_ACCOUNT: &str = "Creating your account...";
const SIGNED_IN: &str = "You are now logged in.";
const SIGNED_OUT: &str = "You have logged out.";
const RESET_REQUESTED: &str = "We've sent an email with recovery instructions.";

const BROWSE_PLACEHOLDER: &str = "Move map to place or postcode";
const SET_LOCATION_PLACEHOLDER: &str = "Search or click the map to set a location";

const SHARE_TITLE: &str = "My CycleStreets Journey";
const SHARE_TEXT: &str = "View my latest journey here!";
const SHARE_URL: &str = "https://www.cyclestreets.net/journey/";

const PHOTOMAP_LAYER: &str = "photomap";
const POIS_LAYER: &str = "pois";

/// Logs a failed preference write. Preference failures never abort a gesture.
fn persist<T>(result: CoreResult<T>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, what, "failed to save preference");
            None
        }
    }
}

/// Glue between user gestures and the core components.
#[derive(Debug)]
pub struct Controller<M, R, B> {
    navigator: Navigator<M>,
    notifications: NotificationQueue,
    prefs: PreferenceStore<B>,
    routing: R,
    ui: UiConfig,
    /// Text shown on status cards and headings, by panel.
    messages: BTreeMap<PanelId, String>,
    tag_suggestions: Vec<String>,
    active_layers: BTreeSet<String>,
    tracking: bool,
    /// Title of the shortcut location being placed.
    setting_location: Option<String>,
    pending_sign_in: Option<Credentials>,
    pending_username: Option<String>,
}

impl<M, R, B> Controller<M, R, B>
where
    M: MapSurface,
    R: Routing,
    B: PreferenceBackend,
{
    /// Builds the controller with the configured home panel visible.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownPanel`](crate::error::CoreError::UnknownPanel) if
    /// the configured home panel does not exist.
    pub fn new(config: &Config, map: M, routing: R, backend: B) -> CoreResult<Self> {
        let registry = PanelRegistry::new(config.ui.home_panel()?);
        let navigator = Navigator::new(registry, config.layout.to_heights(), map);
        let prefs = PreferenceStore::new(backend)
            .with_recent_limit(config.ui.recent_limit)
            .with_default_pois(config.ui.default_pois.clone());

        Ok(Self {
            navigator,
            notifications: NotificationQueue::new(config.ui.notification_duration()),
            prefs,
            routing,
            ui: config.ui.clone(),
            messages: BTreeMap::new(),
            tag_suggestions: Vec::new(),
            active_layers: BTreeSet::new(),
            tracking: false,
            setting_location: None,
            pending_sign_in: None,
            pending_username: None,
        })
    }

    /// Restores saved form values, activates the default layers and
    /// returns the startup blog check.
    pub fn startup(&mut self) -> Vec<Effect> {
        for (panel, fields) in self.prefs.form_values_by_panel() {
            for (field, value) in fields {
                if !self.navigator.set_field(panel, &field, value) {
                    tracing::debug!(%panel, field = %field, "dropping saved value for unknown field");
                }
            }
        }
        self.active_layers = self.ui.default_layers.iter().cloned().collect();
        if self.prefs.credentials().is_some() {
            tracing::info!("restored signed-in session");
        }
        vec![unbound(ApiCall::BlogPosts(BlogPurpose::CheckUnread))]
    }

    // --- Accessors ---

    pub fn navigator(&self) -> &Navigator<M> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator<M> {
        &mut self.navigator
    }

    pub fn routing(&self) -> &R {
        &self.routing
    }

    pub fn routing_mut(&mut self) -> &mut R {
        &mut self.routing
    }

    pub fn prefs(&self) -> &PreferenceStore<B> {
        &self.prefs
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Status text or heading set on `panel` by the last flow that used it.
    pub fn panel_message(&self, panel: PanelId) -> Option<&str> {
        self.messages.get(&panel).map(String::as_str)
    }

    pub fn tag_suggestions(&self) -> &[String] {
        &self.tag_suggestions
    }

    pub fn active_layers(&self) -> &BTreeSet<String> {
        &self.active_layers
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn is_signed_in(&self) -> bool {
        self.prefs.credentials().is_some()
    }

    pub fn shortcut_locations(&self) -> &[String] {
        &self.ui.shortcut_locations
    }

    // --- Clock ---

    /// Advances the notification daemon.
    pub fn tick(&mut self, now: Instant) -> Vec<NotificationEvent> {
        self.notifications.tick(now)
    }

    fn notify(&mut self, notification: Notification, now: Instant) {
        if let Some(event) = self.notifications.enqueue(notification, now) {
            tracing::debug!(?event, "notification shown");
        }
    }

    // --- Commands ---

    /// Handles one user gesture.
    pub fn handle(&mut self, command: Command, now: Instant) -> Vec<Effect> {
        tracing::trace!(?command, "command");
        match command {
            Command::OpenNav => self.navigator.open_nav(),
            Command::CloseNav => self.navigator.close_nav(),
            Command::MapClicked => self.map_clicked(),
            Command::MenuSelect(item) => return self.menu_select(item, now),
            Command::DeactivateLayer(layer) => {
                self.active_layers.remove(&layer);
            }
            Command::Back { declared } => self.back(declared),
            Command::Forward => return self.forward(now),
            Command::ReturnHome => {
                self.navigator.reset_to_default();
            }
            Command::StartWizard(wizard) => {
                self.navigator.start_wizard(wizard);
            }
            Command::SetField {
                panel,
                field,
                value,
            } => {
                if !self.navigator.set_field(panel, &field, value) {
                    tracing::debug!(%panel, field = %field, "no such field");
                }
            }
            Command::SaveForm(panel) => self.save_form(panel),
            Command::OpenJourneyCard => self.open_journey_card(),
            Command::SelectRecentJourney(index) => self.select_recent_journey(index),
            Command::Shortcut(name) => self.shortcut(&name, now),
            Command::AddWaypoint => {
                self.navigator.hide_shortcuts();
                self.routing.add_map_center();
            }
            Command::OpenAbout => {
                self.navigator.switch_panel(PanelId::Settings, PanelId::About);
            }
            Command::SetSavedLocation(name) => self.begin_set_location(name),
            Command::SelectPoi(poi) => {
                persist(self.prefs.select_poi(&poi), "POI selection");
            }
            Command::TagQuery(term) => return self.tag_query(term),
            Command::ForgottenPassword => {
                self.navigator
                    .switch_panel(PanelId::Account, PanelId::ResetPassword);
            }
            Command::OpenBrowse => {
                self.navigator.reset_ui();
                self.navigator
                    .open_browse(Some(BROWSE_PLACEHOLDER.to_string()));
            }
            Command::CloseBrowse => self.navigator.close_browse(),
            Command::OpenPopup(popup) => self.navigator.open_popup(popup),
            Command::ClosePopups => self.navigator.close_popups(),
            Command::GetDirections => {
                self.navigator
                    .switch_panel(PanelId::PlacesPopup, PanelId::JourneySelect);
            }
            Command::DismissNotification => {
                self.notifications.dismiss_active(now);
            }
        }
        Vec::new()
    }

    fn field(&self, panel: PanelId, name: &str) -> String {
        self.navigator
            .form(panel)
            .map(|form| form.value(name).to_string())
            .unwrap_or_default()
    }

    fn request(&self, call: ApiCall) -> Effect {
        Effect::Request(PendingRequest {
            ticket: self.navigator.ticket(),
            call,
        })
    }

    fn map_clicked(&mut self) {
        if self.navigator.chrome().nav_open {
            self.navigator.reset_ui();
            return;
        }
        if self.setting_location.is_none() {
            return;
        }
        if let Some(position) = self.routing.single_marker_location() {
            let text = format!("{:.5}, {:.5}", position.lat, position.lng);
            self.navigator
                .set_field(PanelId::JourneySetLocation, "location", text);
        }
    }

    fn menu_select(&mut self, item: MenuItem, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        match &item {
            MenuItem::Account if self.is_signed_in() => {
                self.sign_out(now);
                return effects;
            }
            MenuItem::Blog => effects.push(unbound(ApiCall::BlogPosts(BlogPurpose::MarkViewed))),
            MenuItem::Photomap => {
                self.active_layers.insert(PHOTOMAP_LAYER.to_string());
            }
            MenuItem::Pois => {
                self.active_layers.insert(POIS_LAYER.to_string());
            }
            MenuItem::DataLayer(layer) => {
                if !self.active_layers.remove(layer) {
                    self.active_layers.insert(layer.clone());
                }
            }
            _ => {}
        }
        self.navigator.open_from_menu(&item);
        effects
    }

    fn back(&mut self, declared: Option<PanelId>) {
        match self.navigator.current() {
            // Cancelling a ride leaves the tracker card in its idle state
            Some(PanelId::RideTrackerTrack) if self.tracking => {
                self.stop_tracking("cancelled");
                return;
            }
            Some(PanelId::JourneySetLocation) => self.leave_set_location(),
            _ => {}
        }
        self.navigator.go_back(declared);
    }

    fn forward(&mut self, now: Instant) -> Vec<Effect> {
        let Some(current) = self.navigator.current() else {
            return Vec::new();
        };
        if current != PanelId::JourneySearch && !self.navigator.forward_enabled(current) {
            tracing::debug!(panel = %current, "forward disabled");
            return Vec::new();
        }

        match current {
            PanelId::JourneySearch => self.plan_journey(),
            PanelId::JourneySetLocation => self.confirm_location(),
            PanelId::RideTrackerTrack => self.toggle_tracking(),
            PanelId::RideTrackerAddDetails => {
                self.navigator
                    .switch_panel(current, PanelId::RideTrackerShowTrackedRide);
            }
            PanelId::RideTrackerShowTrackedRide => {
                return vec![Effect::Share {
                    title: SHARE_TITLE.to_string(),
                    text: SHARE_TEXT.to_string(),
                    url: SHARE_URL.to_string(),
                }]
            }
            PanelId::Account => return self.sign_in(),
            PanelId::ChoosePassword => return self.sign_up(),
            PanelId::ResetPassword => return self.request_password_reset(now),
            _ if self.navigator.registry().wizard_of(current).is_some() => {
                self.navigator.advance_wizard(current);
            }
            _ => tracing::debug!(panel = %current, "no forward action"),
        }
        Vec::new()
    }

    // --- Journey planner ---

    fn plan_journey(&mut self) {
        let waypoints = self.routing.waypoints();
        if waypoints.len() < 2 {
            tracing::debug!(count = waypoints.len(), "journey needs two waypoints");
            return;
        }
        let origin = self.field(PanelId::JourneySearch, "origin");
        let destination = self.field(PanelId::JourneySearch, "destination");

        persist(self.prefs.add_recent_search(&destination), "recent search");
        persist(
            self.prefs.add_recent_journey(RecentJourney {
                origin,
                destination,
                waypoints,
            }),
            "recent journey",
        );
        self.routing.plannable();
        self.navigator
            .switch_panel(PanelId::JourneySearch, PanelId::JourneySelect);
    }

    fn open_journey_card(&mut self) {
        let card = PanelId::JourneySearch;
        if !self.navigator.is_visible(card) || self.navigator.is_expanded(card) {
            return;
        }
        self.navigator.reset_ui();
        self.navigator.expand(card);
        self.routing.add_map_center();
    }

    fn select_recent_journey(&mut self, index: usize) {
        let Some(journey) = self.prefs.recent_journeys().into_iter().nth(index) else {
            tracing::debug!(index, "no recent journey at index");
            return;
        };
        self.navigator
            .set_field(PanelId::JourneySearch, "origin", journey.origin);
        self.navigator
            .set_field(PanelId::JourneySearch, "destination", journey.destination);
        self.routing.set_waypoints(journey.waypoints);
        self.routing.plannable();
        self.navigator
            .switch_panel(PanelId::JourneySearch, PanelId::JourneySelect);
    }

    fn shortcut(&mut self, name: &str, now: Instant) {
        let Some(location) = self.prefs.saved_location(name) else {
            self.notify(
                Notification::new(
                    format!("You can set your {name} location in Settings."),
                    format!("/images/icon-{name}.svg"),
                ),
                now,
            );
            return;
        };
        self.navigator
            .set_field(PanelId::JourneySearch, "destination", location.address);
        if let Some(position) = location.coordinates {
            let mut waypoints = self.routing.waypoints();
            waypoints.push(Waypoint::labelled(position, location.title));
            self.routing.set_waypoints(waypoints);
        }
    }

    // --- Settings ---

    fn save_form(&mut self, panel: PanelId) {
        let Some(form) = self.navigator.form(panel) else {
            return;
        };
        let mut values = form.values();
        values.remove("password");
        persist(self.prefs.save_form_values(panel, &values), "form values");
    }

    fn begin_set_location(&mut self, name: String) {
        self.routing.set_single_marker_mode(true);
        self.messages
            .insert(PanelId::JourneySetLocation, format!("Set your {name} location"));
        self.setting_location = Some(name);
        self.navigator
            .switch_panel(PanelId::Settings, PanelId::JourneySetLocation);
        self.navigator
            .open_browse(Some(SET_LOCATION_PLACEHOLDER.to_string()));
    }

    fn confirm_location(&mut self) {
        let Some(title) = self.setting_location.clone() else {
            tracing::debug!("no shortcut location is being set");
            return;
        };
        let location = SavedLocation {
            title,
            coordinates: self.routing.single_marker_location(),
            address: self.field(PanelId::JourneySetLocation, "location"),
        };
        persist(self.prefs.upsert_saved_location(location), "saved location");

        self.leave_set_location();
        self.navigator.clear_form(PanelId::JourneySetLocation);
        self.navigator
            .switch_panel(PanelId::JourneySetLocation, PanelId::Settings);
    }

    fn leave_set_location(&mut self) {
        self.routing.set_single_marker_mode(false);
        self.navigator.close_browse();
        self.setting_location = None;
    }

    // --- Ride tracker ---

    fn toggle_tracking(&mut self) {
        if self.tracking {
            self.stop_tracking("finished");
            self.navigator
                .switch_panel(PanelId::RideTrackerTrack, PanelId::RideTrackerAddDetails);
        } else {
            self.tracking = true;
            self.navigator.expand(PanelId::RideTrackerTrack);
            tracing::info!("ride tracking started");
        }
    }

    fn stop_tracking(&mut self, outcome: &str) {
        self.tracking = false;
        self.navigator.collapse(PanelId::RideTrackerTrack);
        tracing::info!(outcome, "ride tracking stopped");
    }

    // --- Photomap ---

    fn tag_query(&mut self, term: String) -> Vec<Effect> {
        let trimmed = term.trim().to_string();
        self.navigator
            .set_field(PanelId::PhotomapAddDetails, "tags", term);
        if trimmed.chars().count() < self.ui.autocomplete_min_chars {
            self.tag_suggestions.clear();
            return Vec::new();
        }
        vec![self.request(ApiCall::PhotomapTags { term: trimmed })]
    }

    // --- Account ---

    fn sign_in(&mut self) -> Vec<Effect> {
        let identifier = self.field(PanelId::Account, "identifier").trim().to_string();
        let password = self.field(PanelId::Account, "password");

        self.messages
            .insert(PanelId::CreatingAccount, LOGGING_IN.to_string());
        self.navigator.switch_to(PanelId::CreatingAccount);
        self.navigator.set_field(PanelId::Account, "password", "");
        self.pending_sign_in = Some(Credentials::new(identifier.clone(), password.clone()));

        vec![self.request(ApiCall::Authenticate {
            identifier,
            password,
        })]
    }

    fn sign_up(&mut self) -> Vec<Effect> {
        if !self.navigator.can_progress(PanelId::ChooseUsername) {
            tracing::debug!("account wizard incomplete");
            return Vec::new();
        }
        let username = self.field(PanelId::ChooseUsername, "username").trim().to_string();
        let email = self.field(PanelId::ChooseUsername, "email").trim().to_string();
        let password = self.field(PanelId::ChoosePassword, "password");

        self.messages
            .insert(PanelId::CreatingAccount, CREATING_ACCOUNT.to_string());
        self.navigator.switch_to(PanelId::CreatingAccount);
        self.navigator
            .set_field(PanelId::ChoosePassword, "password", "");
        self.navigator.set_field(PanelId::Account, "password", "");
        self.pending_username = Some(username.clone());

        vec![self.request(ApiCall::CreateAccount {
            username,
            email,
            password,
        })]
    }

    fn request_password_reset(&mut self, now: Instant) -> Vec<Effect> {
        let email = self.field(PanelId::ResetPassword, "email").trim().to_string();
        self.navigator.reset_ui();
        self.notify(Notification::new(RESET_REQUESTED, TICK_ICON), now);
        self.navigator.clear_form(PanelId::ResetPassword);
        vec![unbound(ApiCall::ResetPassword { email })]
    }

    fn sign_out(&mut self, now: Instant) {
        persist(self.prefs.clear_credentials(), "credentials");
        self.navigator.set_field(PanelId::Account, "password", "");
        self.navigator.reset_ui();
        self.notify(Notification::new(SIGNED_OUT, TICK_ICON), now);
        tracing::info!("signed out");
    }

    fn show_error(&mut self, error: &ApiError) {
        self.messages
            .insert(PanelId::FeedbackError, error.user_message());
        self.navigator.replace(PanelId::FeedbackError);
    }

    // --- Completions ---

    /// Applies the result of `request`.
    ///
    /// Results whose ticket no longer matches the navigation context are
    /// dropped.
    pub fn complete(&mut self, request: PendingRequest, result: ApiResult, now: Instant) {
        if !self.navigator.accepts(request.ticket) {
            tracing::debug!(call = request.call.name(), "discarding stale result");
            return;
        }
        match result {
            Ok(reply) => self.apply_reply(reply, now),
            Err(error) => self.apply_failure(&request.call, error),
        }
    }

    fn apply_reply(&mut self, reply: ApiReply, now: Instant) {
        match reply {
            ApiReply::Authenticated => {
                if let Some(credentials) = self.pending_sign_in.take() {
                    persist(self.prefs.store_credentials(&credentials), "credentials");
                }
                self.messages
                    .insert(PanelId::LoggedIn, SIGNED_IN.to_string());
                self.navigator.replace(PanelId::LoggedIn);
                tracing::info!("signed in");
            }
            ApiReply::AccountCreated { success_message } => {
                self.messages.insert(PanelId::LoggedIn, success_message);
                self.navigator.replace(PanelId::LoggedIn);
                self.navigator.clear_wizard(WizardId::Account);
                if let Some(username) = self.pending_username.take() {
                    self.navigator
                        .set_field(PanelId::Account, "identifier", username);
                }
                tracing::info!("account created");
            }
            ApiReply::ResetRequested => tracing::debug!("password reset requested"),
            ApiReply::Tags(tags) => self.tag_suggestions = tags,
            ApiReply::BlogPosts {
                purpose: BlogPurpose::CheckUnread,
                posts,
            } => {
                let count = count_new_posts(self.prefs.last_viewed_blog_post(), &posts);
                if let Some(message) = new_posts_message(count) {
                    self.notify(Notification::new(message, BLOG_ICON), now);
                }
            }
            ApiReply::BlogPosts {
                purpose: BlogPurpose::MarkViewed,
                posts,
            } => {
                if let Some(id) = newest_post_id(&posts) {
                    persist(self.prefs.set_last_viewed_blog_post(id), "last viewed blog post");
                }
            }
        }
    }

    fn apply_failure(&mut self, call: &ApiCall, error: ApiError) {
        tracing::warn!(call = call.name(), error = %error, "api request failed");
        match call {
            ApiCall::Authenticate { .. } => {
                self.pending_sign_in = None;
                self.show_error(&error);
            }
            ApiCall::CreateAccount { .. } => {
                self.pending_username = None;
                let ApiError::Rejected(message) = &error else {
                    self.show_error(&error);
                    return;
                };
                let return_to = if message.contains("username") {
                    PanelId::ChooseUsername
                } else {
                    PanelId::ChoosePassword
                };
                self.messages
                    .insert(PanelId::FeedbackError, message.clone());
                self.navigator.hide_all_panels();
                self.navigator.switch_panel(return_to, PanelId::FeedbackError);
            }
            ApiCall::PhotomapTags { .. } => self.tag_suggestions.clear(),
            ApiCall::ResetPassword { .. } | ApiCall::BlogPosts(_) => {}
        }
    }
}

fn unbound(call: ApiCall) -> Effect {
    Effect::Request(PendingRequest {
        ticket: RequestTicket::unbound(),
        call,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BlogPost;
    use crate::prefs::backend::MemoryBackend;
    use crate::routing::{LngLat, LocalRouting};
    use crate::viewport::tests::RecordingMap;
    use std::time::Duration;

    type TestController = Controller<RecordingMap, LocalRouting, MemoryBackend>;

    fn controller() -> TestController {
        Controller::new(
            &Config::default(),
            RecordingMap::default(),
            LocalRouting::new(LngLat::new(-2.37, 53.78)),
            MemoryBackend::new(),
        )
        .unwrap()
    }

    fn set(c: &mut TestController, panel: PanelId, field: &str, value: &str, now: Instant) {
        c.handle(
            Command::SetField {
                panel,
                field: field.to_string(),
                value: value.to_string(),
            },
            now,
        );
    }

    fn single_request(effects: Vec<Effect>) -> PendingRequest {
        match effects.as_slice() {
            [Effect::Request(request)] => request.clone(),
            other => panic!("expected one request, got {other:?}"),
        }
    }

    fn signed_in_form(c: &mut TestController, now: Instant) {
        c.handle(Command::MenuSelect(MenuItem::Account), now);
        set(c, PanelId::Account, "identifier", "rider", now);
        set(c, PanelId::Account, "password", "secret", now);
    }

    #[test]
    fn startup_issues_blog_check_and_activates_layers() {
        let mut c = controller();
        let request = single_request(c.startup());
        assert_eq!(request.call, ApiCall::BlogPosts(BlogPurpose::CheckUnread));
        assert_eq!(request.ticket, RequestTicket::unbound());
        assert!(c.active_layers().contains("photomap"));
    }

    #[test]
    fn startup_restores_saved_form_values() {
        let mut c = controller();
        let now = Instant::now();
        set(&mut c, PanelId::Settings, "units", "miles", now);
        c.handle(Command::SaveForm(PanelId::Settings), now);
        c.navigator_mut().clear_form(PanelId::Settings);

        c.startup();
        let value = c.navigator().form(PanelId::Settings).unwrap().value("units").to_string();
        assert_eq!(value, "miles");
    }

    #[test]
    fn map_click_closes_open_drawer() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::OpenNav, now);
        assert!(c.navigator().chrome().nav_open);
        c.handle(Command::MapClicked, now);
        assert!(!c.navigator().chrome().nav_open);
    }

    #[test]
    fn sign_in_success_stores_credentials() {
        let mut c = controller();
        let now = Instant::now();
        signed_in_form(&mut c, now);

        let request = single_request(c.handle(Command::Forward, now));
        assert_eq!(c.navigator().current(), Some(PanelId::CreatingAccount));
        assert_eq!(c.panel_message(PanelId::CreatingAccount), Some("Logging in..."));
        assert_eq!(c.navigator().form(PanelId::Account).unwrap().value("password"), "");

        c.complete(request, Ok(ApiReply::Authenticated), now);
        assert_eq!(c.navigator().current(), Some(PanelId::LoggedIn));
        let stored = c.prefs().credentials().unwrap();
        assert_eq!(stored.identifier, "rider");
        assert_eq!(stored.password, "secret");
    }

    #[test]
    fn sign_in_rejection_shows_server_message() {
        let mut c = controller();
        let now = Instant::now();
        signed_in_form(&mut c, now);
        let request = single_request(c.handle(Command::Forward, now));

        c.complete(
            request,
            Err(ApiError::Rejected("Invalid password".to_string())),
            now,
        );
        assert_eq!(c.navigator().current(), Some(PanelId::FeedbackError));
        assert_eq!(c.panel_message(PanelId::FeedbackError), Some("Invalid password"));
        assert!(!c.is_signed_in());

        c.handle(Command::Back { declared: None }, now);
        assert_eq!(c.navigator().current(), Some(PanelId::Account));
    }

    #[test]
    fn sign_in_without_password_is_disabled() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::MenuSelect(MenuItem::Account), now);
        set(&mut c, PanelId::Account, "identifier", "rider", now);
        assert!(c.handle(Command::Forward, now).is_empty());
        assert_eq!(c.navigator().current(), Some(PanelId::Account));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut c = controller();
        let now = Instant::now();
        signed_in_form(&mut c, now);
        let request = single_request(c.handle(Command::Forward, now));

        c.handle(Command::ReturnHome, now);
        c.complete(request, Ok(ApiReply::Authenticated), now);
        assert_eq!(c.navigator().current(), Some(PanelId::JourneySearch));
        assert!(!c.is_signed_in());
    }

    fn fill_account_wizard(c: &mut TestController, now: Instant) {
        c.handle(Command::MenuSelect(MenuItem::Account), now);
        c.handle(Command::StartWizard(WizardId::Account), now);
        set(c, PanelId::ChooseUsername, "username", "newrider", now);
        set(c, PanelId::ChooseUsername, "email", "new@example.org", now);
        c.handle(Command::Forward, now);
        set(c, PanelId::ChoosePassword, "password", "pw", now);
    }

    #[test]
    fn sign_up_username_error_returns_to_username_step() {
        let mut c = controller();
        let now = Instant::now();
        fill_account_wizard(&mut c, now);
        assert_eq!(c.navigator().current(), Some(PanelId::ChoosePassword));

        let request = single_request(c.handle(Command::Forward, now));
        assert_eq!(c.panel_message(PanelId::CreatingAccount), Some("Creating your account..."));
        c.complete(
            request,
            Err(ApiError::Rejected("That username is taken".to_string())),
            now,
        );
        assert_eq!(c.navigator().current(), Some(PanelId::FeedbackError));

        c.handle(Command::Back { declared: None }, now);
        assert_eq!(c.navigator().current(), Some(PanelId::ChooseUsername));
    }

    #[test]
    fn sign_up_other_error_returns_to_password_step() {
        let mut c = controller();
        let now = Instant::now();
        fill_account_wizard(&mut c, now);
        let request = single_request(c.handle(Command::Forward, now));
        c.complete(
            request,
            Err(ApiError::Rejected("Password too short".to_string())),
            now,
        );
        c.handle(Command::Back { declared: None }, now);
        assert_eq!(c.navigator().current(), Some(PanelId::ChoosePassword));
    }

    #[test]
    fn sign_up_success_prefills_sign_in() {
        let mut c = controller();
        let now = Instant::now();
        fill_account_wizard(&mut c, now);
        let request = single_request(c.handle(Command::Forward, now));
        c.complete(
            request,
            Ok(ApiReply::AccountCreated {
                success_message: "Welcome aboard".to_string(),
            }),
            now,
        );
        assert_eq!(c.navigator().current(), Some(PanelId::LoggedIn));
        assert_eq!(c.panel_message(PanelId::LoggedIn), Some("Welcome aboard"));
        let nav = c.navigator();
        assert_eq!(nav.form(PanelId::Account).unwrap().value("identifier"), "newrider");
        assert_eq!(nav.form(PanelId::ChooseUsername).unwrap().value("username"), "");
    }

    #[test]
    fn password_reset_notifies_and_clears() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::MenuSelect(MenuItem::Account), now);
        c.handle(Command::ForgottenPassword, now);
        set(&mut c, PanelId::ResetPassword, "email", "me@example.org", now);

        let request = single_request(c.handle(Command::Forward, now));
        assert_eq!(request.ticket, RequestTicket::unbound());
        assert_eq!(
            request.call,
            ApiCall::ResetPassword {
                email: "me@example.org".to_string()
            }
        );
        let active = c.notifications().active().unwrap();
        assert_eq!(active.message, "We've sent an email with recovery instructions.");
        assert_eq!(active.icon, "/images/tick-green.png");
        assert_eq!(c.navigator().form(PanelId::ResetPassword).unwrap().value("email"), "");
    }

    #[test]
    fn account_item_signs_out_when_signed_in() {
        let mut c = controller();
        let now = Instant::now();
        signed_in_form(&mut c, now);
        let request = single_request(c.handle(Command::Forward, now));
        c.complete(request, Ok(ApiReply::Authenticated), now);

        c.handle(Command::MenuSelect(MenuItem::Account), now);
        assert!(!c.is_signed_in());
        assert_eq!(c.notifications().active().unwrap().message, "You have logged out.");
        assert_eq!(c.navigator().current(), Some(PanelId::LoggedIn));
    }

    #[test]
    fn unset_shortcut_notifies() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::Shortcut("home".to_string()), now);
        let active = c.notifications().active().unwrap();
        assert_eq!(active.message, "You can set your home location in Settings.");
        assert_eq!(active.icon, "/images/icon-home.svg");
    }

    #[test]
    fn set_location_flow_saves_and_returns_to_settings() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::MenuSelect(MenuItem::Settings), now);
        c.handle(Command::SetSavedLocation("work".to_string()), now);

        assert_eq!(c.navigator().current(), Some(PanelId::JourneySetLocation));
        assert_eq!(c.panel_message(PanelId::JourneySetLocation), Some("Set your work location"));
        assert!(c.routing().is_single_marker_mode());
        assert_eq!(
            c.navigator().chrome().browse_placeholder.as_deref(),
            Some("Search or click the map to set a location")
        );

        c.routing_mut().click(LngLat::new(-0.1, 51.5));
        c.handle(Command::MapClicked, now);
        c.handle(Command::Forward, now);

        assert_eq!(c.navigator().current(), Some(PanelId::Settings));
        assert!(!c.routing().is_single_marker_mode());
        assert!(!c.navigator().chrome().browse_open);
        let saved = c.prefs().saved_location("work").unwrap();
        assert_eq!(saved.coordinates, Some(LngLat::new(-0.1, 51.5)));
        assert_eq!(saved.address, "51.50000, -0.10000");
    }

    #[test]
    fn saved_shortcut_fills_destination_and_adds_waypoint() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::MenuSelect(MenuItem::Settings), now);
        c.handle(Command::SetSavedLocation("home".to_string()), now);
        set(&mut c, PanelId::JourneySetLocation, "location", "1 High Street", now);
        c.handle(Command::Forward, now);

        c.handle(Command::MenuSelect(MenuItem::JourneyPlanner), now);
        c.handle(Command::Shortcut("home".to_string()), now);
        let form = c.navigator().form(PanelId::JourneySearch).unwrap();
        assert_eq!(form.value("destination"), "1 High Street");
        // Saved without a marker, so no waypoint
        assert!(c.routing().waypoints().is_empty());
    }

    #[test]
    fn back_from_set_location_leaves_single_marker_mode() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::MenuSelect(MenuItem::Settings), now);
        c.handle(Command::SetSavedLocation("home".to_string()), now);
        c.handle(Command::Back { declared: None }, now);

        assert_eq!(c.navigator().current(), Some(PanelId::Settings));
        assert!(!c.routing().is_single_marker_mode());
        assert!(!c.navigator().chrome().browse_open);
    }

    #[test]
    fn journey_needs_two_waypoints() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::OpenJourneyCard, now);
        assert!(c.navigator().is_expanded(PanelId::JourneySearch));
        assert_eq!(c.routing().waypoints().len(), 1);

        c.handle(Command::Forward, now);
        assert_eq!(c.navigator().current(), Some(PanelId::JourneySearch));

        set(&mut c, PanelId::JourneySearch, "destination", "Leeds", now);
        c.handle(Command::AddWaypoint, now);
        assert!(!c.navigator().chrome().shortcuts_visible);
        c.handle(Command::Forward, now);

        assert_eq!(c.navigator().current(), Some(PanelId::JourneySelect));
        assert_eq!(c.routing().plans_requested(), 1);
        assert_eq!(c.prefs().recent_searches(), vec!["Leeds".to_string()]);
        assert_eq!(c.prefs().recent_journeys().len(), 1);
    }

    #[test]
    fn recent_journey_replans() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::OpenJourneyCard, now);
        c.handle(Command::AddWaypoint, now);
        c.handle(Command::Forward, now);
        c.handle(Command::ReturnHome, now);
        c.routing_mut().set_waypoints(Vec::new());

        c.handle(Command::SelectRecentJourney(0), now);
        assert_eq!(c.navigator().current(), Some(PanelId::JourneySelect));
        assert_eq!(c.routing().waypoints().len(), 2);
        assert_eq!(c.routing().plans_requested(), 2);
    }

    #[test]
    fn ride_tracker_start_finish_and_share() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::MenuSelect(MenuItem::RideTracker), now);
        c.handle(Command::Forward, now);
        assert!(c.is_tracking());
        assert_eq!(c.navigator().current(), Some(PanelId::RideTrackerTrack));

        c.handle(Command::Forward, now);
        assert!(!c.is_tracking());
        assert_eq!(c.navigator().current(), Some(PanelId::RideTrackerAddDetails));

        c.handle(Command::Forward, now);
        assert_eq!(c.navigator().current(), Some(PanelId::RideTrackerShowTrackedRide));
        let effects = c.handle(Command::Forward, now);
        assert!(matches!(
            effects.as_slice(),
            [Effect::Share { title, .. }] if title == "My CycleStreets Journey"
        ));
    }

    #[test]
    fn back_while_tracking_cancels() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::MenuSelect(MenuItem::RideTracker), now);
        c.handle(Command::Forward, now);
        c.handle(Command::Back { declared: None }, now);
        assert!(!c.is_tracking());
        assert!(!c.navigator().is_expanded(PanelId::RideTrackerTrack));
        assert_eq!(c.navigator().current(), Some(PanelId::RideTrackerTrack));

        c.handle(Command::Back { declared: None }, now);
        assert_eq!(c.navigator().current(), Some(PanelId::JourneySearch));
    }

    #[test]
    fn tag_query_respects_minimum_length() {
        let mut c = controller();
        let now = Instant::now();
        assert!(c.handle(Command::TagQuery("cy".to_string()), now).is_empty());

        let request = single_request(c.handle(Command::TagQuery("cycle".to_string()), now));
        assert_eq!(
            request.call,
            ApiCall::PhotomapTags {
                term: "cycle".to_string()
            }
        );
        c.complete(
            request,
            Ok(ApiReply::Tags(vec!["cycleparking".to_string()])),
            now,
        );
        assert_eq!(c.tag_suggestions(), ["cycleparking".to_string()]);
    }

    #[test]
    fn blog_check_notifies_unread_posts() {
        let mut c = controller();
        let now = Instant::now();
        let request = single_request(c.startup());
        let posts = vec![BlogPost { id: 9, link: None }, BlogPost { id: 8, link: None }];
        c.complete(
            request,
            Ok(ApiReply::BlogPosts {
                purpose: BlogPurpose::CheckUnread,
                posts,
            }),
            now,
        );
        let active = c.notifications().active().unwrap();
        assert_eq!(active.message, "There are 2 new blog posts.");
        assert_eq!(active.icon, "/images/icon-hashtag.svg");
    }

    #[test]
    fn opening_blog_marks_newest_viewed() {
        let mut c = controller();
        let now = Instant::now();
        let request = single_request(c.handle(Command::MenuSelect(MenuItem::Blog), now));
        assert_eq!(c.navigator().current(), Some(PanelId::Blog));
        c.complete(
            request,
            Ok(ApiReply::BlogPosts {
                purpose: BlogPurpose::MarkViewed,
                posts: vec![BlogPost { id: 42, link: None }],
            }),
            now,
        );
        assert_eq!(c.prefs().last_viewed_blog_post(), Some(42));
    }

    #[test]
    fn data_layers_toggle_and_deactivate() {
        let mut c = controller();
        let now = Instant::now();
        let layer = MenuItem::DataLayer("collisions".to_string());
        c.handle(Command::MenuSelect(layer.clone()), now);
        assert!(c.active_layers().contains("collisions"));
        assert_eq!(c.navigator().current(), None);

        c.handle(Command::DeactivateLayer("collisions".to_string()), now);
        assert!(!c.active_layers().contains("collisions"));
    }

    #[test]
    fn notifications_run_in_order() {
        let mut c = controller();
        let start = Instant::now();
        c.handle(Command::Shortcut("home".to_string()), start);
        c.handle(Command::Shortcut("work".to_string()), start);
        assert_eq!(c.notifications().pending_len(), 1);

        let events = c.tick(start + Duration::from_millis(2500));
        assert_eq!(events.len(), 2);
        assert!(c.notifications().active().unwrap().message.contains("work"));

        c.handle(Command::DismissNotification, start + Duration::from_millis(2600));
        assert!(c.notifications().is_idle());
    }

    #[test]
    fn poi_selection_is_persisted() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::SelectPoi("bikeshops".to_string()), now);
        assert_eq!(c.prefs().pois_activated(), vec!["bikeshops".to_string()]);
    }

    #[test]
    fn get_directions_leaves_popup() {
        let mut c = controller();
        let now = Instant::now();
        c.handle(Command::OpenPopup(PanelId::PlacesPopup), now);
        c.handle(Command::GetDirections, now);
        assert!(!c.navigator().is_visible(PanelId::PlacesPopup));
        assert_eq!(c.navigator().current(), Some(PanelId::JourneySelect));
    }
}
