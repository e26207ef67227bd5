//! The slide-out navigation drawer.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use cyclenav_core::config::theme::parse_color;
use cyclenav_core::MenuItem;

use crate::app::App;

const DRAWER_WIDTH: u16 = 28;

/// Draws the drawer down the left edge of `area`.
pub fn render_drawer(f: &mut Frame, area: Rect, app: &App, selected: Option<usize>) {
    let theme = &app.theme().nav;
    let width = area.width.min(DRAWER_WIDTH);
    let drawer = Rect { width, ..area };
    let base = Style::default().bg(parse_color(&theme.bg));

    let lines: Vec<Line> = app
        .drawer_items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let active = matches!(item, MenuItem::DataLayer(layer)
                if app.controller().active_layers().contains(layer));
            let style = if Some(index) == selected {
                base.fg(parse_color(&theme.selected_fg))
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if active {
                base.fg(parse_color(&theme.active_layer_fg))
            } else {
                base.fg(parse_color(&theme.item_fg))
            };
            let mark = if active { " *" } else { "" };
            Line::from(Span::styled(format!(" {}{mark}", app.drawer_label(item)), style))
        })
        .collect();

    f.render_widget(Clear, drawer);
    f.render_widget(
        Paragraph::new(lines)
            .style(base)
            .block(Block::default().borders(Borders::RIGHT).title(" CycleStreets ").style(base)),
        drawer,
    );
}
