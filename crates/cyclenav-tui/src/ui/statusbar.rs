//! Status bar rendering.
//!
//! The status bar occupies a single row at the bottom of the terminal and
//! shows the input mode, the breadcrumb trail to the visible card, the
//! sign-in state and an optional status message.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use cyclenav_core::config::theme::parse_color;
use cyclenav_core::PanelId;

use crate::app::{App, AppMode};

pub fn mode_label(mode: &AppMode) -> &'static str {
    match mode {
        AppMode::Normal => "MAP",
        AppMode::Drawer { .. } => "MENU",
        AppMode::Editing { .. } => "EDIT",
        AppMode::Browse(_) => "SEARCH",
        AppMode::Help => "HELP",
    }
}

/// Titles from the oldest breadcrumb to `current`, joined with `>`.
pub fn trail(crumbs: &[PanelId], current: Option<PanelId>) -> String {
    crumbs
        .iter()
        .copied()
        .chain(current)
        .map(PanelId::title)
        .collect::<Vec<_>>()
        .join(" > ")
}

pub fn render_statusbar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme().card;
    let nav = app.controller().navigator();

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode_label(app.mode())),
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", trail(nav.breadcrumbs().as_slice(), nav.current())),
            Style::default().fg(parse_color(&theme.breadcrumb_fg)),
        ),
    ];
    if app.controller().is_signed_in() {
        spans.push(Span::styled(
            "  [signed in]",
            Style::default().fg(parse_color(&theme.label_fg)),
        ));
    }
    let tail = app
        .status_message()
        .map(str::to_string)
        .unwrap_or_else(|| "  m menu  ? help  q quit".to_string());
    spans.push(Span::styled(
        format!("  {tail}"),
        Style::default().add_modifier(Modifier::ITALIC),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
