use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use cyclenav_core::config::theme::parse_color;

use crate::app::{App, AppMode};
use crate::ui::card::render_card;
use crate::ui::drawer::render_drawer;
use crate::ui::map::render_map;
use crate::ui::notification::render_notification;
use crate::ui::popup::{centered_rect, render_help_popup};
use crate::ui::statusbar::render_statusbar;

/// Rows kept for the map however tall the card is.
const MIN_MAP_ROWS: u16 = 3;
const POPUP_ROWS: u16 = 7;

/// Height of the card area: the map inset, clamped to the screen.
pub fn card_rows(inset: u32, screen_rows: u16) -> u16 {
    let room = screen_rows.saturating_sub(MIN_MAP_ROWS + 1);
    u16::try_from(inset).unwrap_or(u16::MAX).min(room)
}

/// Composes the full UI layout each frame.
pub fn render(f: &mut Frame, app: &App) {
    let nav = app.controller().navigator();
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MIN_MAP_ROWS),
            Constraint::Length(card_rows(nav.map().bottom_inset(), area.height)),
            Constraint::Length(1),
        ])
        .split(area);

    render_map(f, chunks[0], app);
    if nav.chrome().browse_open {
        render_browse_box(f, chunks[0], app);
    }

    let popup = app.visible_popup();
    if let Some(panel) = nav.current() {
        render_card(f, chunks[1], app, panel, popup.is_none());
    }
    if let Some(panel) = popup {
        let rect = popup_rect(chunks[0]);
        render_card(f, rect, app, panel, true);
    }

    render_statusbar(f, chunks[2], app);

    if let Some(notification) = app.controller().notifications().active() {
        render_notification(f, chunks[0], notification, app.theme());
    }

    // Render modal overlays based on mode
    match app.mode() {
        AppMode::Drawer { selected } => render_drawer(f, chunks[0], app, Some(*selected)),
        AppMode::Help => render_help_popup(f, app.action_registry(), app.keymap(), app.theme()),
        AppMode::Normal | AppMode::Editing { .. } | AppMode::Browse(_) => {}
    }
}

fn popup_rect(map_area: Rect) -> Rect {
    let rect = centered_rect(60, 100, map_area);
    let height = rect.height.min(POPUP_ROWS);
    Rect {
        y: rect.y + (rect.height - height) / 2,
        height,
        ..rect
    }
}

fn render_browse_box(f: &mut Frame, map_area: Rect, app: &App) {
    if map_area.height == 0 {
        return;
    }
    let theme = &app.theme().card;
    let row = Rect {
        height: 1,
        ..map_area
    };
    let placeholder = app
        .controller()
        .navigator()
        .chrome()
        .browse_placeholder
        .clone()
        .unwrap_or_default();
    let line = match app.mode() {
        AppMode::Browse(text) if !text.is_empty() => Line::from(vec![
            Span::styled(" Search: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{text}_")),
        ]),
        AppMode::Browse(_) => Line::from(vec![
            Span::styled(" Search: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("_{placeholder}"),
                Style::default().fg(parse_color(&theme.disabled_fg)),
            ),
        ]),
        _ => Line::from(Span::styled(
            format!(" {placeholder}  (g to type)"),
            Style::default().fg(parse_color(&theme.disabled_fg)),
        )),
    };
    f.render_widget(Clear, row);
    f.render_widget(
        Paragraph::new(line).style(Style::default().fg(parse_color(&theme.label_fg))),
        row,
    );
}
