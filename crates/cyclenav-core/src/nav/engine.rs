//! The panel navigation engine.
//!
//! [`Navigator`] decides which panel is visible, keeps the breadcrumb trail
//! used by back navigation, gates wizard progress on form completion, and
//! refits the map after every transition.
//!
//! It is constructed once per application and mutated only from the UI
//! event loop. Each transition advances a generation counter; asynchronous
//! work started from one navigation context carries a [`RequestTicket`] and
//! its result is applied only while the generation still matches.

use std::collections::{BTreeMap, BTreeSet};

use crate::api::RequestTicket;
use crate::nav::breadcrumbs::Breadcrumbs;
use crate::nav::form::{can_progress, FormScope};
use crate::nav::panel::{MenuItem, PanelGroup, PanelId, PanelRegistry, WizardId};
use crate::viewport::{MapSurface, PanelHeights, PanelMeasure, ViewportAdapter};

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// `switch_panel` with a breadcrumb push.
    Forward,
    /// A breadcrumb was popped.
    Back,
    /// Back navigation followed a target declared on the control.
    Declared,
    /// The home panel was shown.
    Home,
    /// A top-level navigation drawer entry was opened.
    Menu,
    /// A wizard was started or advanced.
    Wizard,
}

/// The outcome of a navigation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub from: Option<PanelId>,
    pub to: Option<PanelId>,
    /// Map bottom inset after the refit.
    pub map_inset: u32,
}

/// Transient UI sub-state outside the card stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chrome {
    pub nav_open: bool,
    pub data_menu_open: bool,
    /// The "move map to" search box.
    pub browse_open: bool,
    pub browse_placeholder: Option<String>,
    /// Home/work shortcut icons on the journey search card.
    pub shortcuts_visible: bool,
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            nav_open: false,
            data_menu_open: false,
            browse_open: false,
            browse_placeholder: None,
            shortcuts_visible: true,
        }
    }
}

/// Which panels are shown and how tall they are.
#[derive(Debug, Clone)]
pub struct PanelStage {
    registry: PanelRegistry,
    visible: BTreeSet<PanelId>,
    expanded: BTreeSet<PanelId>,
    heights: PanelHeights,
}

impl PanelStage {
    fn new(registry: PanelRegistry, heights: PanelHeights) -> Self {
        Self {
            registry,
            visible: BTreeSet::new(),
            expanded: BTreeSet::new(),
            heights,
        }
    }

    /// Shows `panel`, hiding every other panel of its group.
    fn show(&mut self, panel: PanelId) {
        let group = self.registry.group(panel);
        let registry = &self.registry;
        self.visible.retain(|p| registry.group(*p) != group);
        self.visible.insert(panel);
    }

    fn hide(&mut self, panel: PanelId) {
        self.visible.remove(&panel);
    }

    fn hide_group(&mut self, group: PanelGroup) {
        let registry = &self.registry;
        self.visible.retain(|p| registry.group(*p) != group);
    }

    fn hide_all(&mut self) {
        self.visible.clear();
    }

    /// The visible card of the main stack.
    pub fn current(&self) -> Option<PanelId> {
        self.visible
            .iter()
            .copied()
            .find(|p| self.registry.group(*p) == PanelGroup::Main)
    }

    pub fn is_visible(&self, panel: PanelId) -> bool {
        self.visible.contains(&panel)
    }

    pub fn is_expanded(&self, panel: PanelId) -> bool {
        self.expanded.contains(&panel)
    }

    pub fn visible(&self) -> impl Iterator<Item = PanelId> + '_ {
        self.visible.iter().copied()
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn heights(&self) -> &PanelHeights {
        &self.heights
    }
}

impl PanelMeasure for PanelStage {
    /// The main card if one is shown, otherwise the first visible overlay.
    fn visible_panel(&self) -> Option<PanelId> {
        self.current().or_else(|| self.visible.iter().next().copied())
    }

    fn rendered_height(&self, panel: PanelId) -> u32 {
        self.heights.height(panel, self.is_expanded(panel))
    }
}

/// Single-focus panel switching with breadcrumb back navigation.
#[derive(Debug)]
pub struct Navigator<M> {
    stage: PanelStage,
    viewport: ViewportAdapter<M>,
    breadcrumbs: Breadcrumbs,
    chrome: Chrome,
    forms: BTreeMap<PanelId, FormScope>,
    forward_enabled: BTreeMap<PanelId, bool>,
    generation: u64,
}

impl<M: MapSurface> Navigator<M> {
    /// Creates the engine with the home panel visible and the map fitted.
    pub fn new(registry: PanelRegistry, heights: PanelHeights, map: M) -> Self {
        let forms = registry.empty_forms();
        let forward_enabled = forms
            .iter()
            .map(|(id, scope)| (*id, can_progress(scope)))
            .collect();
        let home = registry.home();

        let mut nav = Self {
            stage: PanelStage::new(registry, heights),
            viewport: ViewportAdapter::new(map),
            breadcrumbs: Breadcrumbs::new(),
            chrome: Chrome::default(),
            forms,
            forward_enabled,
            generation: 0,
        };
        nav.stage.show(home);
        nav.fit(Some(home));
        nav
    }

    // --- State accessors ---

    /// The visible card of the main stack.
    pub fn current(&self) -> Option<PanelId> {
        self.stage.current()
    }

    pub fn is_visible(&self, panel: PanelId) -> bool {
        self.stage.is_visible(panel)
    }

    pub fn stage(&self) -> &PanelStage {
        &self.stage
    }

    pub fn registry(&self) -> &PanelRegistry {
        self.stage.registry()
    }

    pub fn breadcrumbs(&self) -> &Breadcrumbs {
        &self.breadcrumbs
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn map(&self) -> &M {
        self.viewport.map()
    }

    pub fn map_mut(&mut self) -> &mut M {
        self.viewport.map_mut()
    }

    /// The map inset applied by the last fit.
    pub fn map_inset(&self) -> u32 {
        self.viewport.inset()
    }

    // --- Transitions ---

    /// Hides `from`, shows `to` and pushes `from` onto the breadcrumbs.
    ///
    /// Hiding a panel that is not visible is a no-op. Switching a panel to
    /// itself pushes nothing.
    pub fn switch_panel(&mut self, from: PanelId, to: PanelId) -> Transition {
        self.stage.hide(from);
        self.stage.show(to);
        if from != to {
            self.breadcrumbs = self.breadcrumbs.push(from);
        }
        self.finish(TransitionKind::Forward, Some(from), Some(to), Some(to))
    }

    /// [`switch_panel`](Self::switch_panel) from whatever card is visible.
    ///
    /// With no card visible `to` is shown without a breadcrumb.
    pub fn switch_to(&mut self, to: PanelId) -> Transition {
        match self.current() {
            Some(from) => self.switch_panel(from, to),
            None => {
                self.stage.show(to);
                self.finish(TransitionKind::Forward, None, Some(to), Some(to))
            }
        }
    }

    /// Shows `to` in place of the visible card without recording a breadcrumb.
    ///
    /// For interstitial cards such as "Logging in..." that back navigation
    /// should skip.
    pub fn replace(&mut self, to: PanelId) -> Transition {
        let from = self.current();
        if let Some(current) = from {
            self.stage.hide(current);
        }
        self.stage.show(to);
        self.finish(TransitionKind::Forward, from, Some(to), Some(to))
    }

    /// Back navigation.
    ///
    /// A `declared` target is a lateral jump: it is shown directly and no
    /// breadcrumb is pushed or popped. Otherwise the top breadcrumb is
    /// popped and shown with every other panel hidden, and with an empty
    /// trail the home panel is shown.
    pub fn go_back(&mut self, declared: Option<PanelId>) -> Transition {
        let from = self.current();

        if let Some(target) = declared {
            if let Some(current) = from {
                self.stage.hide(current);
            }
            self.stage.show(target);
            return self.finish(TransitionKind::Declared, from, Some(target), None);
        }

        match self.breadcrumbs.pop() {
            Some((rest, previous)) => {
                self.breadcrumbs = rest;
                self.stage.hide_all();
                self.stage.show(previous);
                self.finish(TransitionKind::Back, from, Some(previous), None)
            }
            None => self.return_home(from),
        }
    }

    /// Closes transient chrome, hides every panel and shows the home panel.
    pub fn reset_to_default(&mut self) -> Transition {
        let from = self.current();
        self.return_home(from)
    }

    fn return_home(&mut self, from: Option<PanelId>) -> Transition {
        self.reset_chrome();
        self.stage.hide_all();
        let home = self.stage.registry().home();
        self.stage.show(home);
        self.finish(TransitionKind::Home, from, Some(home), None)
    }

    /// Switches into the first step of `wizard`, pushing the current panel.
    ///
    /// Returns `None` for a wizard without steps.
    pub fn start_wizard(&mut self, wizard: WizardId) -> Option<Transition> {
        let first = self.stage.registry().first_in_wizard(wizard)?;
        let mut transition = self.switch_to(first);
        transition.kind = TransitionKind::Wizard;
        tracing::debug!(?wizard, "wizard started");
        Some(transition)
    }

    /// Moves from `current` to the next step of its wizard.
    ///
    /// A no-op returning `None` when `current`'s form cannot progress, when
    /// `current` is the last step, or when it is not in a wizard.
    pub fn advance_wizard(&mut self, current: PanelId) -> Option<Transition> {
        if !self.can_progress(current) {
            tracing::debug!(panel = %current, "wizard blocked by incomplete form");
            return None;
        }
        let next = self.stage.registry().next_in_wizard(current)?;
        let mut transition = self.switch_panel(current, next);
        transition.kind = TransitionKind::Wizard;
        Some(transition)
    }

    /// Opens a navigation drawer entry as the start of a new flow.
    ///
    /// The breadcrumb trail is cleared. A data layer hides every panel
    /// without showing another, and the "Data" entry only toggles its
    /// submenu, returning `None`.
    pub fn open_from_menu(&mut self, item: &MenuItem) -> Option<Transition> {
        if *item == MenuItem::Data {
            self.chrome.data_menu_open = !self.chrome.data_menu_open;
            return None;
        }

        let from = self.current();
        self.reset_chrome();
        self.stage.hide_all();

        let target = item.panel();
        if let Some(panel) = target {
            self.breadcrumbs = Breadcrumbs::new();
            self.stage.show(panel);
        }
        Some(self.finish(TransitionKind::Menu, from, target, None))
    }

    /// Hides every panel and refits the map to the full screen.
    pub fn hide_all_panels(&mut self) -> u32 {
        self.stage.hide_all();
        self.generation += 1;
        self.fit(None)
    }

    /// Shows an overlay without touching the card stack or breadcrumbs.
    pub fn open_popup(&mut self, popup: PanelId) {
        self.stage.show(popup);
        tracing::debug!(%popup, "popup opened");
    }

    pub fn close_popups(&mut self) {
        self.stage.hide_group(PanelGroup::Popup);
    }

    fn finish(
        &mut self,
        kind: TransitionKind,
        from: Option<PanelId>,
        to: Option<PanelId>,
        fit_target: Option<PanelId>,
    ) -> Transition {
        if let Some(shown) = to {
            self.breadcrumbs = self.breadcrumbs.trimmed_above(shown);
        }
        self.generation += 1;
        let map_inset = self.fit(fit_target);
        tracing::debug!(
            ?kind,
            from = ?from,
            to = ?to,
            depth = self.breadcrumbs.len(),
            "panel transition"
        );
        Transition {
            kind,
            from,
            to,
            map_inset,
        }
    }

    fn fit(&mut self, panel: Option<PanelId>) -> u32 {
        self.viewport.fit_to_panel(panel, &self.stage)
    }

    /// Refits the map to the visible panel after a height change.
    pub fn refit(&mut self) -> u32 {
        self.fit(None)
    }

    // --- Card expansion ---

    /// Expands `panel`. Returns `false` if it already was expanded.
    pub fn expand(&mut self, panel: PanelId) -> bool {
        let changed = self.stage.expanded.insert(panel);
        if changed && self.stage.is_visible(panel) {
            self.refit();
        }
        changed
    }

    /// Collapses `panel`. Returns `false` if it was not expanded.
    pub fn collapse(&mut self, panel: PanelId) -> bool {
        let changed = self.stage.expanded.remove(&panel);
        if changed && self.stage.is_visible(panel) {
            self.refit();
        }
        changed
    }

    pub fn is_expanded(&self, panel: PanelId) -> bool {
        self.stage.is_expanded(panel)
    }

    // --- Chrome ---

    pub fn open_nav(&mut self) {
        self.chrome.nav_open = true;
    }

    pub fn close_nav(&mut self) {
        self.chrome.nav_open = false;
    }

    pub fn open_browse(&mut self, placeholder: Option<String>) {
        self.chrome.browse_open = true;
        self.chrome.browse_placeholder = placeholder;
    }

    pub fn close_browse(&mut self) {
        self.chrome.browse_open = false;
        self.chrome.browse_placeholder = None;
    }

    /// Hides the shortcut icons; the journey card shrinks so the map is refit.
    pub fn hide_shortcuts(&mut self) -> u32 {
        self.chrome.shortcuts_visible = false;
        self.refit()
    }

    /// Closes the drawer, collapses the journey search card and hides the
    /// browse box.
    pub fn reset_ui(&mut self) {
        self.reset_chrome();
        if self.stage.is_visible(PanelId::JourneySearch) {
            self.refit();
        }
    }

    fn reset_chrome(&mut self) {
        self.chrome.nav_open = false;
        self.chrome.data_menu_open = false;
        self.close_browse();
        self.stage.expanded.remove(&PanelId::JourneySearch);
    }

    // --- Forms ---

    pub fn form(&self, panel: PanelId) -> Option<&FormScope> {
        self.forms.get(&panel)
    }

    /// Sets a field and recomputes the panel's forward affordance.
    ///
    /// Returns `false` if the panel has no such field.
    pub fn set_field(&mut self, panel: PanelId, name: &str, value: impl Into<String>) -> bool {
        let Some(scope) = self.forms.get_mut(&panel) else {
            return false;
        };
        if !scope.set(name, value) {
            return false;
        }
        self.forward_enabled.insert(panel, can_progress(scope));
        true
    }

    pub fn clear_form(&mut self, panel: PanelId) {
        if let Some(scope) = self.forms.get_mut(&panel) {
            scope.clear();
            self.forward_enabled.insert(panel, can_progress(scope));
        }
    }

    /// Clears the form of every step of `wizard`.
    pub fn clear_wizard(&mut self, wizard: WizardId) {
        let steps = self.stage.registry().wizard_steps(wizard).to_vec();
        for step in steps {
            self.clear_form(step);
        }
    }

    /// Whether every required field of `panel` is filled.
    ///
    /// Panels without a form can always progress.
    pub fn can_progress(&self, panel: PanelId) -> bool {
        self.forms.get(&panel).map_or(true, can_progress)
    }

    /// The stored forward affordance state of `panel`.
    pub fn forward_enabled(&self, panel: PanelId) -> bool {
        self.forward_enabled.get(&panel).copied().unwrap_or(true)
    }

    // --- Request tickets ---

    /// A ticket bound to the current navigation context.
    pub fn ticket(&self) -> RequestTicket {
        RequestTicket::bound(self.generation)
    }

    /// Whether a completion carrying `ticket` may still be applied.
    pub fn accepts(&self, ticket: RequestTicket) -> bool {
        ticket
            .generation()
            .map_or(true, |generation| generation == self.generation)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
