//! Application state for the terminal frontend.
//!
//! [`App`] owns the core [`Controller`] plus everything that only exists
//! on a terminal: the input mode, the card cursor and the status line.
//! Card contents are derived from the controller on every call to
//! [`App::card_items`], so they never go stale.

use std::time::Instant;

use cyclenav_core::action::ActionRegistry;
use cyclenav_core::config::keymap::Keymap;
use cyclenav_core::config::theme::Theme;
use cyclenav_core::event::{Command, Effect};
use cyclenav_core::nav::form::FieldKind;
use cyclenav_core::{
    ApiResult, Controller, LngLat, LocalRouting, MapOptions, MapSurface, MenuItem, PanelId,
    PendingRequest, PreferenceBackend, Routing, WizardId,
};

pub type Preferences = Box<dyn PreferenceBackend>;
pub type AppController = Controller<TerminalMap, LocalRouting, Preferences>;

/// Layers listed under the drawer's Data entry.
pub const DATA_LAYERS: [&str; 4] = ["collisions", "taxidata", "trafficcounts", "planningapplications"];

/// POI categories offered on the places card.
pub const POI_CATEGORIES: [&str; 5] = ["bikeshops", "cycleparking", "toilets", "cafes", "supermarkets"];

const MIN_ZOOM: f64 = 1.0;
/// Fraction of the visible span moved by one pan step.
const PAN_STEP: f64 = 0.1;
const MAX_LATITUDE: f64 = 85.0;

const SPEED_CHOICES: &[&str] = &["slow", "medium", "fast"];
const UNIT_CHOICES: &[&str] = &["miles", "kilometres"];

fn segment_choices(field: &str) -> &'static [&'static str] {
    match field {
        "speed" => SPEED_CHOICES,
        "units" => UNIT_CHOICES,
        _ => &[],
    }
}

/// The choice after `value` for a segmented control, wrapping around.
/// An unset control starts at its first choice.
pub fn next_choice(field: &str, value: &str) -> String {
    let choices = segment_choices(field);
    let next = match choices.iter().position(|c| *c == value) {
        Some(i) => choices.get((i + 1) % choices.len()),
        None => choices.first(),
    };
    next.map_or_else(|| value.to_string(), |c| c.to_string())
}

/// Text shown for a field value; passwords are masked.
pub fn display_value(field: &str, value: &str) -> String {
    if field == "password" {
        "\u{2022}".repeat(value.chars().count())
    } else {
        value.to_string()
    }
}

/// Map surface drawn with ratatui's canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalMap {
    zoom: f64,
    max_zoom: f64,
    bottom_inset: u32,
}

impl TerminalMap {
    pub fn new(options: &MapOptions, max_zoom: f64) -> Self {
        let max_zoom = max_zoom.max(MIN_ZOOM);
        Self {
            zoom: options.zoom.clamp(MIN_ZOOM, max_zoom),
            max_zoom,
            bottom_inset: 0,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Rows at the bottom of the screen covered by the card.
    pub fn bottom_inset(&self) -> u32 {
        self.bottom_inset
    }

    /// Degrees of longitude visible across the map.
    pub fn span(&self) -> f64 {
        360.0 / 2f64.powf(self.zoom)
    }

    pub fn zoom_by(&mut self, steps: i32) {
        self.zoom = (self.zoom + f64::from(steps)).clamp(MIN_ZOOM, self.max_zoom);
    }
}

impl MapSurface for TerminalMap {
    fn set_bottom_inset(&mut self, inset: u32) {
        self.bottom_inset = inset;
    }

    /// The canvas is laid out again on every frame.
    fn resize(&mut self) {
        tracing::trace!(inset = self.bottom_inset, "map resized");
    }
}

/// Application mode. Determines how input is routed.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    /// The navigation drawer has focus; `selected` is the cursor index.
    Drawer { selected: usize },
    /// Typing into a form field; `buffer` is committed on Enter.
    Editing {
        panel: PanelId,
        field: String,
        buffer: String,
    },
    /// Typing into the move-map search box.
    Browse(String),
    Help,
}

/// One selectable row of the visible card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardItem {
    Field {
        panel: PanelId,
        name: String,
        value: String,
        kind: FieldKind,
        required: bool,
    },
    Entry {
        label: String,
        command: Command,
        enabled: bool,
    },
}

fn entry(label: impl Into<String>, command: Command) -> CardItem {
    CardItem::Entry {
        label: label.into(),
        command,
        enabled: true,
    }
}

fn forward(label: &str, enabled: bool) -> CardItem {
    CardItem::Entry {
        label: label.to_string(),
        command: Command::Forward,
        enabled,
    }
}

pub struct App {
    controller: AppController,
    mode: AppMode,
    /// Cursor on the focused card.
    selected: usize,
    /// Panel the cursor belongs to; the cursor resets when it changes.
    shown: Option<PanelId>,
    keymap: Keymap,
    action_registry: ActionRegistry,
    theme: Theme,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(controller: AppController, keymap: Keymap, theme: Theme) -> Self {
        let app = Self {
            controller,
            mode: AppMode::Normal,
            selected: 0,
            shown: None,
            keymap,
            action_registry: ActionRegistry::new(),
            theme,
            status_message: None,
            should_quit: false,
        };
        app.synced()
    }

    pub fn mode(&self) -> &AppMode {
        &self.mode
    }

    pub fn controller(&self) -> &AppController {
        &self.controller
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn action_registry(&self) -> &ActionRegistry {
        &self.action_registry
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn with_mode(self, mode: AppMode) -> Self {
        Self { mode, ..self }
    }

    pub fn with_status(self, msg: String) -> Self {
        Self {
            status_message: Some(msg),
            ..self
        }
    }

    pub fn with_clear_status(self) -> Self {
        Self {
            status_message: None,
            ..self
        }
    }

    pub fn with_quit(self) -> Self {
        Self {
            should_quit: true,
            ..self
        }
    }

    // --- Focus ---

    /// The overlay popup currently shown, if any.
    pub fn visible_popup(&self) -> Option<PanelId> {
        let nav = self.controller.navigator();
        [PanelId::PlacesPopup, PanelId::PhotomapPopup]
            .into_iter()
            .find(|p| nav.is_visible(*p))
    }

    /// The panel the card cursor operates on. A popup wins over the card stack.
    pub fn focused_panel(&self) -> Option<PanelId> {
        self.visible_popup()
            .or_else(|| self.controller.navigator().current())
    }

    /// Re-derives the mode and cursor after the controller changed state.
    fn synced(mut self) -> Self {
        let focus = self.focused_panel();
        if focus != self.shown {
            self.shown = focus;
            self.selected = 0;
        }

        let chrome = self.controller.navigator().chrome();
        let (nav_open, browse_open) = (chrome.nav_open, chrome.browse_open);
        self.mode = match self.mode {
            AppMode::Drawer { .. } if !nav_open => AppMode::Normal,
            AppMode::Normal if nav_open => AppMode::Drawer { selected: 0 },
            AppMode::Browse(_) if !browse_open => AppMode::Normal,
            other => other,
        };

        let drawer_len = self.drawer_items().len();
        if let AppMode::Drawer { selected } = &mut self.mode {
            *selected = (*selected).min(drawer_len.saturating_sub(1));
        }
        let count = self.card_items().len();
        self.selected = self.selected.min(count.saturating_sub(1));
        self
    }

    /// Restores saved state and returns the startup requests.
    pub fn startup(mut self) -> (Self, Vec<Effect>) {
        let effects = self.controller.startup();
        (self.synced(), effects)
    }

    /// Hands `command` to the controller.
    pub fn dispatch(mut self, command: Command, now: Instant) -> (Self, Vec<Effect>) {
        let effects = self.controller.handle(command, now);
        (self.synced(), effects)
    }

    /// Applies a finished remote call.
    pub fn complete(mut self, request: PendingRequest, result: ApiResult, now: Instant) -> Self {
        self.controller.complete(request, result, now);
        self.synced()
    }

    /// Advances the notification clock.
    pub fn tick(mut self, now: Instant) -> Self {
        for event in self.controller.tick(now) {
            tracing::trace!(?event, "notification");
        }
        self
    }

    // --- Drawer ---

    /// Drawer entries in display order, with the data layers inlined below
    /// "Data" while its submenu is open.
    pub fn drawer_items(&self) -> Vec<MenuItem> {
        let data_open = self.controller.navigator().chrome().data_menu_open;
        let mut items = Vec::new();
        for item in MenuItem::TOP_LEVEL {
            let is_data = item == MenuItem::Data;
            items.push(item);
            if is_data && data_open {
                items.extend(
                    DATA_LAYERS
                        .iter()
                        .map(|layer| MenuItem::DataLayer(layer.to_string())),
                );
            }
        }
        items
    }

    pub fn drawer_label(&self, item: &MenuItem) -> String {
        match item {
            MenuItem::Account if self.controller.is_signed_in() => "Sign out".to_string(),
            MenuItem::DataLayer(layer) => format!("  {layer}"),
            other => other.label().to_string(),
        }
    }

    pub fn toggle_drawer(self, now: Instant) -> (Self, Vec<Effect>) {
        let command = if self.controller.navigator().chrome().nav_open {
            Command::CloseNav
        } else {
            Command::OpenNav
        };
        self.dispatch(command, now)
    }

    /// Switches off the data layer under the drawer cursor.
    pub fn deactivate_layer(self, now: Instant) -> (Self, Vec<Effect>) {
        let AppMode::Drawer { selected } = self.mode else {
            return (self, Vec::new());
        };
        match self.drawer_items().get(selected) {
            Some(MenuItem::DataLayer(layer)) if self.controller.active_layers().contains(layer) => {
                let layer = layer.clone();
                self.dispatch(Command::DeactivateLayer(layer), now)
            }
            _ => (self, Vec::new()),
        }
    }

    // --- Card ---

    /// Rows of the focused card: its form fields, then its entries.
    pub fn card_items(&self) -> Vec<CardItem> {
        let Some(panel) = self.focused_panel() else {
            return Vec::new();
        };
        let nav = self.controller.navigator();
        let mut items: Vec<CardItem> = nav
            .form(panel)
            .map(|form| {
                form.fields()
                    .iter()
                    .map(|field| CardItem::Field {
                        panel,
                        name: field.name.clone(),
                        value: field.value().to_string(),
                        kind: field.kind,
                        required: field.required,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let can_forward = nav.forward_enabled(panel);
        match panel {
            PanelId::JourneySearch => {
                if nav.chrome().shortcuts_visible {
                    for name in self.controller.shortcut_locations() {
                        items.push(entry(format!("Go {name}"), Command::Shortcut(name.clone())));
                    }
                }
                let journeys = self.controller.prefs().recent_journeys();
                for (index, journey) in journeys.iter().enumerate().rev() {
                    let label = if journey.destination.is_empty() {
                        format!("Recent journey {}", index + 1)
                    } else {
                        format!("{} to {}", journey.origin, journey.destination)
                    };
                    items.push(entry(label, Command::SelectRecentJourney(index)));
                }
                items.push(entry("Add waypoint", Command::AddWaypoint));
                let planned = self.controller.routing().waypoints().len() >= 2;
                items.push(forward("Plan journey", planned));
            }
            PanelId::JourneySelect => items.push(entry("New journey", Command::ReturnHome)),
            PanelId::JourneySetLocation => items.push(forward("Save location", true)),
            PanelId::RideTrackerTrack => {
                let label = if self.controller.is_tracking() {
                    "Finish ride"
                } else {
                    "Start tracking"
                };
                items.push(forward(label, true));
            }
            PanelId::RideTrackerAddDetails => items.push(forward("Save ride", can_forward)),
            PanelId::RideTrackerShowTrackedRide => {
                items.push(forward("Share", true));
                items.push(entry("Done", Command::ReturnHome));
            }
            PanelId::Settings => {
                for name in self.controller.shortcut_locations() {
                    items.push(entry(
                        format!("Set {name} location"),
                        Command::SetSavedLocation(name.clone()),
                    ));
                }
                items.push(entry("Save settings", Command::SaveForm(PanelId::Settings)));
                items.push(entry("About", Command::OpenAbout));
            }
            PanelId::Pois => {
                let active = self.controller.prefs().pois_activated();
                for poi in POI_CATEGORIES {
                    let mark = if active.iter().any(|p| p == poi) { "x" } else { " " };
                    items.push(entry(format!("[{mark}] {poi}"), Command::SelectPoi(poi.to_string())));
                }
            }
            PanelId::Photomap => {
                items.push(entry("Add a photo", Command::StartWizard(WizardId::Photomap)))
            }
            PanelId::PhotomapAddDetails => {
                for tag in self.controller.tag_suggestions() {
                    items.push(entry(
                        format!("#{tag}"),
                        Command::SetField {
                            panel,
                            field: "tags".to_string(),
                            value: tag.clone(),
                        },
                    ));
                }
                items.push(forward("Next", can_forward));
            }
            PanelId::PhotomapAddLocation | PanelId::ChooseUsername => {
                items.push(forward("Next", can_forward))
            }
            PanelId::Account => {
                items.push(forward("Sign in", can_forward));
                items.push(entry("Forgotten password", Command::ForgottenPassword));
                items.push(entry("Create an account", Command::StartWizard(WizardId::Account)));
            }
            PanelId::ChoosePassword => items.push(forward("Create account", can_forward)),
            PanelId::ResetPassword => items.push(forward("Send reset email", can_forward)),
            PanelId::LoggedIn => items.push(entry("Done", Command::ReturnHome)),
            PanelId::About | PanelId::FeedbackError => {
                items.push(entry("Back", Command::Back { declared: None }))
            }
            PanelId::PlacesPopup => {
                items.push(entry("Get directions", Command::GetDirections));
                items.push(entry("Close", Command::ClosePopups));
            }
            PanelId::PhotomapPopup => items.push(entry("Close", Command::ClosePopups)),
            PanelId::PhotomapUploading | PanelId::Blog | PanelId::CreatingAccount => {}
        }
        items
    }

    pub fn selected_item(&self) -> Option<CardItem> {
        self.card_items().into_iter().nth(self.selected)
    }

    pub fn with_cursor_down(self) -> Self {
        match self.mode {
            AppMode::Drawer { selected } => {
                let last = self.drawer_items().len().saturating_sub(1);
                self.with_mode(AppMode::Drawer {
                    selected: (selected + 1).min(last),
                })
            }
            _ => {
                let last = self.card_items().len().saturating_sub(1);
                let selected = (self.selected + 1).min(last);
                Self { selected, ..self }
            }
        }
    }

    pub fn with_cursor_up(self) -> Self {
        match self.mode {
            AppMode::Drawer { selected } => self.with_mode(AppMode::Drawer {
                selected: selected.saturating_sub(1),
            }),
            _ => {
                let selected = self.selected.saturating_sub(1);
                Self { selected, ..self }
            }
        }
    }

    /// Activates the row under the cursor.
    ///
    /// Entries run their command, segmented controls advance to their next
    /// choice and other fields open for editing.
    pub fn select(self, now: Instant) -> (Self, Vec<Effect>) {
        if let AppMode::Drawer { selected } = self.mode {
            return match self.drawer_items().get(selected).cloned() {
                Some(item) => self.dispatch(Command::MenuSelect(item), now),
                None => (self, Vec::new()),
            };
        }
        match self.selected_item() {
            Some(CardItem::Entry {
                command,
                enabled: true,
                ..
            }) => self.dispatch(command, now),
            Some(CardItem::Entry { .. }) => (
                self.with_status("Complete the required fields first".to_string()),
                Vec::new(),
            ),
            Some(CardItem::Field {
                panel,
                name,
                value,
                kind: FieldKind::SegmentedControl,
                ..
            }) => {
                let value = next_choice(&name, &value);
                self.dispatch(
                    Command::SetField {
                        panel,
                        field: name,
                        value,
                    },
                    now,
                )
            }
            Some(CardItem::Field { .. }) => (self.edit_field(), Vec::new()),
            None => (self, Vec::new()),
        }
    }

    // --- Editing ---

    /// Opens the field under the cursor for typing.
    pub fn edit_field(self) -> Self {
        match self.selected_item() {
            Some(CardItem::Field {
                kind: FieldKind::SegmentedControl,
                ..
            }) => self.with_status("Press Enter to change this setting".to_string()),
            Some(CardItem::Field {
                panel, name, value, ..
            }) => self.with_mode(AppMode::Editing {
                panel,
                field: name,
                buffer: value,
            }),
            _ => self.with_status("Select a field to edit".to_string()),
        }
    }

    pub fn edit_push_char(self, c: char, now: Instant) -> (Self, Vec<Effect>) {
        let AppMode::Editing {
            panel,
            field,
            mut buffer,
        } = self.mode.clone()
        else {
            return (self, Vec::new());
        };
        buffer.push(c);
        self.edit_updated(panel, field, buffer, now)
    }

    pub fn edit_pop_char(self, now: Instant) -> (Self, Vec<Effect>) {
        let AppMode::Editing {
            panel,
            field,
            mut buffer,
        } = self.mode.clone()
        else {
            return (self, Vec::new());
        };
        buffer.pop();
        self.edit_updated(panel, field, buffer, now)
    }

    /// The photomap tag field asks for suggestions on every keystroke.
    fn edit_updated(
        self,
        panel: PanelId,
        field: String,
        buffer: String,
        now: Instant,
    ) -> (Self, Vec<Effect>) {
        let live_query = panel == PanelId::PhotomapAddDetails && field == "tags";
        let term = buffer.clone();
        let app = self.with_mode(AppMode::Editing {
            panel,
            field,
            buffer,
        });
        if live_query {
            app.dispatch(Command::TagQuery(term), now)
        } else {
            (app, Vec::new())
        }
    }

    pub fn edit_confirm(self, now: Instant) -> (Self, Vec<Effect>) {
        let AppMode::Editing {
            panel,
            field,
            buffer,
        } = self.mode.clone()
        else {
            return (self, Vec::new());
        };
        self.with_mode(AppMode::Normal).dispatch(
            Command::SetField {
                panel,
                field,
                value: buffer,
            },
            now,
        )
    }

    pub fn edit_cancel(self) -> Self {
        self.with_mode(AppMode::Normal)
    }

    // --- Card actions ---

    pub fn save_form(self, now: Instant) -> (Self, Vec<Effect>) {
        let Some(panel) = self.controller.navigator().current() else {
            return (self, Vec::new());
        };
        let (app, effects) = self.dispatch(Command::SaveForm(panel), now);
        (app.with_status(format!("Saved {}", panel.title())), effects)
    }

    /// Begins the wizard offered by the visible card.
    pub fn start_wizard(self, now: Instant) -> (Self, Vec<Effect>) {
        let wizard = match self.controller.navigator().current() {
            Some(PanelId::Photomap) => WizardId::Photomap,
            Some(PanelId::Account) => WizardId::Account,
            _ => {
                return (
                    self.with_status("Nothing to start on this card".to_string()),
                    Vec::new(),
                )
            }
        };
        self.dispatch(Command::StartWizard(wizard), now)
    }

    // --- Map ---

    /// A click at the map centre. With the drawer open the click only
    /// closes it.
    pub fn map_click(mut self, now: Instant) -> (Self, Vec<Effect>) {
        if !self.controller.navigator().chrome().nav_open {
            let center = self.controller.routing().center();
            self.controller.routing_mut().click(center);
        }
        self.dispatch(Command::MapClicked, now)
    }

    pub fn open_popup(self, now: Instant) -> (Self, Vec<Effect>) {
        self.dispatch(Command::OpenPopup(PanelId::PlacesPopup), now)
    }

    pub fn pan(mut self, dx: i32, dy: i32) -> Self {
        let span = self.controller.navigator().map().span();
        let center = self.controller.routing().center();
        let lng = center.lng + span * PAN_STEP * f64::from(dx);
        let lat = center.lat + span * PAN_STEP * f64::from(dy);
        let moved = LngLat::new(
            (lng + 180.0).rem_euclid(360.0) - 180.0,
            lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        );
        self.controller.routing_mut().set_center(moved);
        self
    }

    pub fn zoom(mut self, steps: i32) -> Self {
        self.controller.navigator_mut().map_mut().zoom_by(steps);
        self
    }

    // --- Browse box ---

    /// Focuses the move-map box, opening it unless a flow already has.
    pub fn open_browse(self, now: Instant) -> (Self, Vec<Effect>) {
        if self.controller.navigator().chrome().browse_open {
            return (self.with_mode(AppMode::Browse(String::new())), Vec::new());
        }
        let (app, effects) = self.dispatch(Command::OpenBrowse, now);
        (app.with_mode(AppMode::Browse(String::new())), effects)
    }

    pub fn browse_push_char(self, c: char) -> Self {
        match self.mode.clone() {
            AppMode::Browse(mut text) => {
                text.push(c);
                self.with_mode(AppMode::Browse(text))
            }
            _ => self,
        }
    }

    pub fn browse_pop_char(self) -> Self {
        match self.mode.clone() {
            AppMode::Browse(mut text) => {
                text.pop();
                self.with_mode(AppMode::Browse(text))
            }
            _ => self,
        }
    }

    fn setting_location(&self) -> bool {
        self.controller.navigator().current() == Some(PanelId::JourneySetLocation)
    }

    /// Submits the box. While a location is being set the text becomes
    /// its address; otherwise there is no geocoder to ask and the box closes.
    pub fn browse_submit(self, now: Instant) -> (Self, Vec<Effect>) {
        let AppMode::Browse(text) = self.mode.clone() else {
            return (self, Vec::new());
        };
        if self.setting_location() {
            return self.with_mode(AppMode::Normal).dispatch(
                Command::SetField {
                    panel: PanelId::JourneySetLocation,
                    field: "location".to_string(),
                    value: text,
                },
                now,
            );
        }
        let (app, effects) = self.dispatch(Command::CloseBrowse, now);
        (app.with_status(format!("No place search available for \"{text}\"")), effects)
    }

    pub fn browse_cancel(self, now: Instant) -> (Self, Vec<Effect>) {
        if self.setting_location() {
            return (self.with_mode(AppMode::Normal), Vec::new());
        }
        self.dispatch(Command::CloseBrowse, now)
    }

    // --- Effects ---

    /// Terminals have no share sheet; the content goes to the status line.
    pub fn with_share(self, title: &str, text: &str, url: &str) -> Self {
        self.with_status(format!("{title}: {text} {url}"))
    }
}
