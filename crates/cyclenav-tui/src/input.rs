use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use cyclenav_core::action::Action;
use cyclenav_core::config::keymap::Keymap;
use cyclenav_core::event::Command;

use crate::app::AppMode;

/// Actions that can result from a key press.
#[derive(Debug, PartialEq)]
pub enum InputAction {
    /// Dispatch a core Command.
    Command(Command),
    /// Enter a new AppMode.
    EnterMode(AppMode),
    /// Quit the application.
    Quit,
    /// Open or close the navigation drawer.
    ToggleDrawer,
    /// Move the selection down in the card or drawer.
    CursorDown,
    /// Move the selection up in the card or drawer.
    CursorUp,
    /// Activate the selected entry.
    Select,
    /// Start typing into the selected field.
    EditField,
    /// Persist the values of the visible card.
    SaveForm,
    /// Begin the wizard the visible card offers.
    StartWizard,
    /// Click the map at its centre.
    MapClick,
    /// Show the place popup for the map centre.
    OpenPopup,
    /// Move the map by a tenth of its width or height.
    Pan { dx: i32, dy: i32 },
    /// Change the zoom level by whole steps.
    Zoom(i32),
    /// Switch off the data layer under the drawer cursor.
    DeactivateLayer,
    /// Append a character to the field being edited.
    EditChar(char),
    /// Remove the last character from the field being edited.
    EditBackspace,
    /// Store the edited value.
    EditConfirm,
    /// Drop the edited value.
    EditCancel,
    /// Append a character to the move-map search box.
    BrowseChar(char),
    /// Remove the last character from the move-map search box.
    BrowseBackspace,
    /// Submit the move-map search box.
    BrowseSubmit,
    /// Close the move-map search box.
    BrowseCancel,
    /// No action for this key.
    None,
}

/// Maps a key event to an InputAction based on the current mode.
///
/// In Normal mode, character keys (plus Tab and Backspace) are resolved
/// through the `Keymap`; arrow keys, Enter, Esc, zoom and Ctrl+C are
/// hardcoded. The modal modes are hardcoded throughout.
pub fn handle_key(key: KeyEvent, mode: &AppMode, keymap: &Keymap) -> InputAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return InputAction::Quit;
    }
    match mode {
        AppMode::Normal => handle_normal_key(key, keymap),
        AppMode::Drawer { .. } => handle_drawer_key(key, keymap),
        AppMode::Editing { .. } => handle_editing_key(key),
        AppMode::Browse(_) => handle_browse_key(key),
        AppMode::Help => handle_help_key(key),
    }
}

/// Converts an `Action` enum variant to the corresponding `InputAction`.
fn action_to_input_action(action: Action) -> InputAction {
    match action {
        Action::ToggleDrawer => InputAction::ToggleDrawer,
        Action::Back => InputAction::Command(Command::Back { declared: None }),
        Action::Forward => InputAction::Command(Command::Forward),
        Action::Home => InputAction::Command(Command::ReturnHome),
        Action::NextItem => InputAction::CursorDown,
        Action::PrevItem => InputAction::CursorUp,
        Action::Select => InputAction::Select,
        Action::EditField => InputAction::EditField,
        Action::SaveForm => InputAction::SaveForm,
        Action::StartWizard => InputAction::StartWizard,
        Action::FocusJourneySearch => InputAction::Command(Command::OpenJourneyCard),
        Action::BrowseSearch => InputAction::EnterMode(AppMode::Browse(String::new())),
        Action::AddWaypoint => InputAction::Command(Command::AddWaypoint),
        Action::MapClick => InputAction::MapClick,
        Action::OpenPopup => InputAction::OpenPopup,
        Action::DismissNotification => InputAction::Command(Command::DismissNotification),
        Action::Help => InputAction::EnterMode(AppMode::Help),
        Action::Quit => InputAction::Quit,
    }
}

fn lookup(keymap: &Keymap, key: &str) -> InputAction {
    keymap
        .action_for_key(key)
        .map(action_to_input_action)
        .unwrap_or(InputAction::None)
}

fn pan_for(code: KeyCode) -> Option<InputAction> {
    let (dx, dy) = match code {
        KeyCode::Left => (-1, 0),
        KeyCode::Right => (1, 0),
        KeyCode::Up => (0, 1),
        KeyCode::Down => (0, -1),
        _ => return None,
    };
    Some(InputAction::Pan { dx, dy })
}

fn handle_normal_key(key: KeyEvent, keymap: &Keymap) -> InputAction {
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        if let Some(pan) = pan_for(key.code) {
            return pan;
        }
    }

    // Hardcoded keys: arrows, Enter, Esc, zoom (not remappable)
    match key.code {
        KeyCode::Down => InputAction::CursorDown,
        KeyCode::Up => InputAction::CursorUp,
        KeyCode::Left => InputAction::Command(Command::Back { declared: None }),
        KeyCode::Right => InputAction::Command(Command::Forward),
        KeyCode::Enter => InputAction::Select,
        KeyCode::Esc => InputAction::Command(Command::ClosePopups),
        KeyCode::Char('+') => InputAction::Zoom(1),
        KeyCode::Char('-') => InputAction::Zoom(-1),
        KeyCode::Tab => lookup(keymap, "Tab"),
        KeyCode::Backspace => lookup(keymap, "Backspace"),
        KeyCode::Char(c) => lookup(keymap, &c.to_string()),
        _ => InputAction::None,
    }
}

fn handle_drawer_key(key: KeyEvent, keymap: &Keymap) -> InputAction {
    match key.code {
        KeyCode::Down => InputAction::CursorDown,
        KeyCode::Up => InputAction::CursorUp,
        KeyCode::Enter => InputAction::Select,
        KeyCode::Esc => InputAction::ToggleDrawer,
        KeyCode::Char('d') => InputAction::DeactivateLayer,
        KeyCode::Tab => lookup(keymap, "Tab"),
        KeyCode::Char(c) => match keymap.action_for_key(&c.to_string()) {
            Some(
                action @ (Action::ToggleDrawer
                | Action::NextItem
                | Action::PrevItem
                | Action::Select
                | Action::Quit),
            ) => action_to_input_action(action),
            _ => InputAction::None,
        },
        _ => InputAction::None,
    }
}

fn handle_editing_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::EditCancel,
        KeyCode::Enter => InputAction::EditConfirm,
        KeyCode::Backspace => InputAction::EditBackspace,
        KeyCode::Char(c) => InputAction::EditChar(c),
        _ => InputAction::None,
    }
}

fn handle_browse_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::BrowseCancel,
        KeyCode::Enter => InputAction::BrowseSubmit,
        KeyCode::Backspace => InputAction::BrowseBackspace,
        KeyCode::Char(c) => InputAction::BrowseChar(c),
        _ => InputAction::None,
    }
}

fn handle_help_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            InputAction::EnterMode(AppMode::Normal)
        }
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
    use cyclenav_core::PanelId;

    fn key(code: KeyCode) -> KeyEvent {
        key_with_mod(code, KeyModifiers::NONE)
    }

    fn key_with_mod(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn normal(code: KeyCode) -> InputAction {
        handle_key(key(code), &AppMode::Normal, &Keymap::default())
    }

    fn editing() -> AppMode {
        AppMode::Editing {
            panel: PanelId::Account,
            field: "identifier".to_string(),
            buffer: String::new(),
        }
    }

    // --- Normal mode ---

    #[test]
    fn normal_j_and_k_move_the_cursor() {
        assert_eq!(normal(KeyCode::Char('j')), InputAction::CursorDown);
        assert_eq!(normal(KeyCode::Char('k')), InputAction::CursorUp);
    }

    #[test]
    fn normal_h_goes_back() {
        assert_eq!(
            normal(KeyCode::Char('h')),
            InputAction::Command(Command::Back { declared: None })
        );
        assert_eq!(
            normal(KeyCode::Backspace),
            InputAction::Command(Command::Back { declared: None })
        );
    }

    #[test]
    fn normal_l_and_right_go_forward() {
        assert_eq!(normal(KeyCode::Char('l')), InputAction::Command(Command::Forward));
        assert_eq!(normal(KeyCode::Right), InputAction::Command(Command::Forward));
    }

    #[test]
    fn normal_m_and_tab_toggle_the_drawer() {
        assert_eq!(normal(KeyCode::Char('m')), InputAction::ToggleDrawer);
        assert_eq!(normal(KeyCode::Tab), InputAction::ToggleDrawer);
    }

    #[test]
    fn normal_capital_h_returns_home() {
        assert_eq!(
            normal(KeyCode::Char('H')),
            InputAction::Command(Command::ReturnHome)
        );
    }

    #[test]
    fn normal_enter_selects() {
        assert_eq!(normal(KeyCode::Enter), InputAction::Select);
    }

    #[test]
    fn normal_esc_closes_popups() {
        assert_eq!(normal(KeyCode::Esc), InputAction::Command(Command::ClosePopups));
    }

    #[test]
    fn normal_g_opens_browse_box() {
        assert_eq!(
            normal(KeyCode::Char('g')),
            InputAction::EnterMode(AppMode::Browse(String::new()))
        );
    }

    #[test]
    fn normal_map_keys() {
        assert_eq!(
            normal(KeyCode::Char('/')),
            InputAction::Command(Command::OpenJourneyCard)
        );
        assert_eq!(normal(KeyCode::Char('a')), InputAction::Command(Command::AddWaypoint));
        assert_eq!(normal(KeyCode::Char('c')), InputAction::MapClick);
        assert_eq!(normal(KeyCode::Char('p')), InputAction::OpenPopup);
        assert_eq!(normal(KeyCode::Char('+')), InputAction::Zoom(1));
        assert_eq!(normal(KeyCode::Char('-')), InputAction::Zoom(-1));
    }

    #[test]
    fn shift_arrows_pan_the_map() {
        let km = Keymap::default();
        let action = handle_key(
            key_with_mod(KeyCode::Left, KeyModifiers::SHIFT),
            &AppMode::Normal,
            &km,
        );
        assert_eq!(action, InputAction::Pan { dx: -1, dy: 0 });
        let action = handle_key(
            key_with_mod(KeyCode::Up, KeyModifiers::SHIFT),
            &AppMode::Normal,
            &km,
        );
        assert_eq!(action, InputAction::Pan { dx: 0, dy: 1 });
    }

    #[test]
    fn normal_form_keys() {
        assert_eq!(normal(KeyCode::Char('e')), InputAction::EditField);
        assert_eq!(normal(KeyCode::Char('s')), InputAction::SaveForm);
        assert_eq!(normal(KeyCode::Char('w')), InputAction::StartWizard);
    }

    #[test]
    fn normal_x_dismisses_notification() {
        assert_eq!(
            normal(KeyCode::Char('x')),
            InputAction::Command(Command::DismissNotification)
        );
    }

    #[test]
    fn normal_unbound_char_is_none() {
        assert_eq!(normal(KeyCode::Char('Z')), InputAction::None);
    }

    #[test]
    fn ctrl_c_quits_in_every_mode() {
        let km = Keymap::default();
        let ctrl_c = key_with_mod(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [
            AppMode::Normal,
            AppMode::Drawer { selected: 0 },
            editing(),
            AppMode::Browse(String::new()),
            AppMode::Help,
        ] {
            assert_eq!(handle_key(ctrl_c, &mode, &km), InputAction::Quit);
        }
    }

    #[test]
    fn question_mark_opens_help() {
        assert_eq!(
            normal(KeyCode::Char('?')),
            InputAction::EnterMode(AppMode::Help)
        );
    }

    // --- Drawer ---

    #[test]
    fn drawer_navigation() {
        let km = Keymap::default();
        let mode = AppMode::Drawer { selected: 0 };
        assert_eq!(handle_key(key(KeyCode::Char('j')), &mode, &km), InputAction::CursorDown);
        assert_eq!(handle_key(key(KeyCode::Up), &mode, &km), InputAction::CursorUp);
        assert_eq!(handle_key(key(KeyCode::Enter), &mode, &km), InputAction::Select);
        assert_eq!(handle_key(key(KeyCode::Esc), &mode, &km), InputAction::ToggleDrawer);
        assert_eq!(handle_key(key(KeyCode::Char('m')), &mode, &km), InputAction::ToggleDrawer);
        assert_eq!(
            handle_key(key(KeyCode::Char('d')), &mode, &km),
            InputAction::DeactivateLayer
        );
    }

    #[test]
    fn drawer_ignores_card_actions() {
        let km = Keymap::default();
        let mode = AppMode::Drawer { selected: 0 };
        assert_eq!(handle_key(key(KeyCode::Char('l')), &mode, &km), InputAction::None);
        assert_eq!(handle_key(key(KeyCode::Char('e')), &mode, &km), InputAction::None);
    }

    // --- Editing ---

    #[test]
    fn editing_routes_text_keys() {
        let km = Keymap::default();
        let mode = editing();
        assert_eq!(handle_key(key(KeyCode::Char('j')), &mode, &km), InputAction::EditChar('j'));
        assert_eq!(handle_key(key(KeyCode::Backspace), &mode, &km), InputAction::EditBackspace);
        assert_eq!(handle_key(key(KeyCode::Enter), &mode, &km), InputAction::EditConfirm);
        assert_eq!(handle_key(key(KeyCode::Esc), &mode, &km), InputAction::EditCancel);
    }

    // --- Browse ---

    #[test]
    fn browse_routes_text_keys() {
        let km = Keymap::default();
        let mode = AppMode::Browse("Man".to_string());
        assert_eq!(handle_key(key(KeyCode::Char('q')), &mode, &km), InputAction::BrowseChar('q'));
        assert_eq!(handle_key(key(KeyCode::Backspace), &mode, &km), InputAction::BrowseBackspace);
        assert_eq!(handle_key(key(KeyCode::Enter), &mode, &km), InputAction::BrowseSubmit);
        assert_eq!(handle_key(key(KeyCode::Esc), &mode, &km), InputAction::BrowseCancel);
    }

    // --- Help ---

    #[test]
    fn help_closes_on_esc_q_or_question_mark() {
        let km = Keymap::default();
        for code in [KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('?')] {
            assert_eq!(
                handle_key(key(code), &AppMode::Help, &km),
                InputAction::EnterMode(AppMode::Normal)
            );
        }
        assert_eq!(handle_key(key(KeyCode::Char('j')), &AppMode::Help, &km), InputAction::None);
    }
}
