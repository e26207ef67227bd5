//! Unified action system for CycleNav.
//!
//! Every key-bindable action is represented by the [`Action`] enum.
//! [`ActionRegistry`] provides metadata (id, name, description, category)
//! used to resolve keymap files and to list bindings in the help overlay.

/// Every key-bindable action in CycleNav.
///
/// Variants carry no parameters; context is determined at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Navigation
    ToggleDrawer,
    Back,
    Forward,
    Home,
    NextItem,
    PrevItem,
    Select,
    // Forms
    EditField,
    SaveForm,
    StartWizard,
    // Map
    FocusJourneySearch,
    BrowseSearch,
    AddWaypoint,
    MapClick,
    OpenPopup,
    // System
    DismissNotification,
    Help,
    Quit,
}

/// Broad category for grouping actions in the help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Form,
    Map,
    System,
}

impl ActionCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Form => "Form",
            Self::Map => "Map",
            Self::System => "System",
        }
    }
}

/// Metadata for a single action.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub action: Action,
    /// Snake-case identifier used in `keymap.toml` (e.g. `"toggle_drawer"`).
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ActionCategory,
}

/// Registry of all available actions.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    /// Builds the registry containing every known action.
    pub fn new() -> Self {
        use Action as A;
        use ActionCategory as C;

        let d = |action, id, name, description, category| ActionDescriptor {
            action,
            id,
            name,
            description,
            category,
        };

        let descriptors = vec![
            d(A::ToggleDrawer, "toggle_drawer", "Menu", "Open or close the navigation drawer", C::Navigation),
            d(A::Back, "back", "Back", "Return to the previous card", C::Navigation),
            d(A::Forward, "forward", "Forward", "Confirm the current card", C::Navigation),
            d(A::Home, "home", "Home", "Close everything and show the journey planner", C::Navigation),
            d(A::NextItem, "next_item", "Next", "Select the next field or entry", C::Navigation),
            d(A::PrevItem, "prev_item", "Previous", "Select the previous field or entry", C::Navigation),
            d(A::Select, "select", "Select", "Activate the selected entry", C::Navigation),
            d(A::EditField, "edit_field", "Edit Field", "Type into the selected field", C::Form),
            d(A::SaveForm, "save_form", "Save", "Remember the values on this card", C::Form),
            d(A::StartWizard, "start_wizard", "Start", "Begin the flow offered by this card", C::Form),
            d(A::FocusJourneySearch, "focus_journey_search", "Plan Journey", "Expand the journey search card", C::Map),
            d(A::BrowseSearch, "browse_search", "Move Map", "Open the move-map-to search box", C::Map),
            d(A::AddWaypoint, "add_waypoint", "Add Waypoint", "Add a waypoint at the map centre", C::Map),
            d(A::MapClick, "map_click", "Click Map", "Click the map at its centre", C::Map),
            d(A::OpenPopup, "open_popup", "Place Info", "Show the place under the map centre", C::Map),
            d(A::DismissNotification, "dismiss_notification", "Dismiss", "Hide the visible notification", C::System),
            d(A::Help, "help", "Help", "Show keyboard shortcuts", C::System),
            d(A::Quit, "quit", "Quit", "Exit CycleNav", C::System),
        ];
        Self { descriptors }
    }

    /// Returns all descriptors.
    pub fn all(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    /// Descriptors of one category, in registry order.
    pub fn in_category(&self, category: ActionCategory) -> impl Iterator<Item = &ActionDescriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.category == category)
    }

    /// Finds an action by its string id (for keymap.toml parsing).
    pub fn find_by_id(&self, id: &str) -> Option<Action> {
        self.descriptors
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.action)
    }

    /// Returns the descriptor for a given action.
    pub fn descriptor_for(&self, action: Action) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.action == action)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_descriptor() {
        let registry = ActionRegistry::new();
        assert_eq!(registry.all().len(), 18);
        for d in registry.all() {
            assert_eq!(registry.descriptor_for(d.action).unwrap().id, d.id);
        }
    }

    #[test]
    fn ids_are_unique() {
        let registry = ActionRegistry::new();
        let mut ids: Vec<_> = registry.all().iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), registry.all().len());
    }

    #[test]
    fn find_by_id_returns_correct_action() {
        let registry = ActionRegistry::new();
        assert_eq!(registry.find_by_id("back"), Some(Action::Back));
        assert_eq!(registry.find_by_id("toggle_drawer"), Some(Action::ToggleDrawer));
        assert_eq!(registry.find_by_id("nonexistent"), None);
    }

    #[test]
    fn categories_partition_the_registry() {
        let registry = ActionRegistry::new();
        let total: usize = [
            ActionCategory::Navigation,
            ActionCategory::Form,
            ActionCategory::Map,
            ActionCategory::System,
        ]
        .into_iter()
        .map(|c| registry.in_category(c).count())
        .sum();
        assert_eq!(total, registry.all().len());
    }

    #[test]
    fn category_labels() {
        assert_eq!(ActionCategory::Navigation.label(), "Navigation");
        assert_eq!(ActionCategory::Map.label(), "Map");
    }
}
