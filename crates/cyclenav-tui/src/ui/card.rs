//! The card that slides up over the bottom of the map.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use cyclenav_core::config::theme::parse_color;
use cyclenav_core::PanelId;

use crate::app::{display_value, App, AppMode, CardItem};

/// Computes the visible window `(start, end)` for a list of `total` items
/// so that `selected` is always in view within `max_visible` lines.
pub fn visible_window(selected: usize, total: usize, max_visible: usize) -> (usize, usize) {
    if total <= max_visible {
        return (0, total);
    }
    let half = max_visible / 2;
    let start = if selected <= half {
        0
    } else if selected + half >= total {
        total.saturating_sub(max_visible)
    } else {
        selected - half
    };
    let end = (start + max_visible).min(total);
    (start, end)
}

fn item_text(item: &CardItem, mode: &AppMode) -> String {
    match item {
        CardItem::Field {
            panel,
            name,
            value,
            required,
            ..
        } => {
            let marker = if *required { "*" } else { "" };
            let shown = match mode {
                AppMode::Editing {
                    panel: p,
                    field,
                    buffer,
                } if p == panel && field == name => format!("{}_", display_value(name, buffer)),
                _ => display_value(name, value),
            };
            format!("{name}{marker}: {shown}")
        }
        CardItem::Entry { label, .. } => format!("[ {label} ]"),
    }
}

/// Draws `panel` in `area`. The cursor is only drawn on a focused card.
pub fn render_card(f: &mut Frame, area: Rect, app: &App, panel: PanelId, focused: bool) {
    if area.height == 0 {
        return;
    }
    let theme = &app.theme().card;
    let controller = app.controller();
    let label_fg = parse_color(&theme.label_fg);
    let selected_fg = parse_color(&theme.selected_fg);
    let disabled_fg = parse_color(&theme.disabled_fg);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(message) = controller.panel_message(panel) {
        let fg = if panel == PanelId::FeedbackError {
            parse_color(&theme.error_fg)
        } else {
            label_fg
        };
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        )));
    }
    if panel == PanelId::RideTrackerTrack && controller.is_tracking() {
        lines.push(Line::from(Span::styled(
            "Tracking your ride...",
            Style::default().fg(label_fg),
        )));
    }

    let items = if focused {
        app.card_items()
    } else {
        Vec::new()
    };
    let room = usize::from(area.height.saturating_sub(2)).saturating_sub(lines.len());
    let (start, end) = visible_window(app.selected(), items.len(), room.max(1));
    for (index, item) in items.iter().enumerate().take(end).skip(start) {
        let is_selected = index == app.selected();
        let enabled = !matches!(item, CardItem::Entry { enabled: false, .. });
        let style = if is_selected {
            Style::default().fg(selected_fg).add_modifier(Modifier::BOLD)
        } else if !enabled {
            Style::default().fg(disabled_fg)
        } else {
            Style::default().fg(label_fg)
        };
        let cursor = if is_selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{cursor}{}", item_text(item, app.mode())),
            style,
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", panel.title()),
            Style::default()
                .fg(parse_color(&theme.title_fg))
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(parse_color(&theme.border_fg)));

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: &str, required: bool) -> CardItem {
        CardItem::Field {
            panel: PanelId::Account,
            name: name.to_string(),
            value: value.to_string(),
            kind: cyclenav_core::nav::form::FieldKind::Input,
            required,
        }
    }

    #[test]
    fn visible_window_fits_all() {
        assert_eq!(visible_window(0, 5, 10), (0, 5));
    }

    #[test]
    fn visible_window_follows_selection() {
        assert_eq!(visible_window(0, 20, 5), (0, 5));
        assert_eq!(visible_window(10, 20, 5), (8, 13));
        assert_eq!(visible_window(19, 20, 5), (15, 20));
    }

    #[test]
    fn required_fields_are_marked() {
        let text = item_text(&field("identifier", "rider", true), &AppMode::Normal);
        assert_eq!(text, "identifier*: rider");
    }

    #[test]
    fn password_is_masked_while_editing() {
        let mode = AppMode::Editing {
            panel: PanelId::Account,
            field: "password".to_string(),
            buffer: "ab".to_string(),
        };
        let text = item_text(&field("password", "", true), &mode);
        assert_eq!(text, "password*: \u{2022}\u{2022}_");
    }

    #[test]
    fn entries_are_bracketed() {
        let item = CardItem::Entry {
            label: "Sign in".to_string(),
            command: cyclenav_core::Command::Forward,
            enabled: true,
        };
        assert_eq!(item_text(&item, &AppMode::Normal), "[ Sign in ]");
    }
}
