use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use cyclenav_core::action::{ActionCategory, ActionRegistry};
use cyclenav_core::config::keymap::Keymap;
use cyclenav_core::config::theme::{parse_color, Theme};

/// Renders a centered popup dialog with the given title and message lines.
pub fn render_popup(f: &mut Frame, title: &str, lines: &[String], theme: &Theme) {
    let area = centered_rect(60, 70, f.area());
    let border_fg = parse_color(&theme.popup.border_fg);

    f.render_widget(Clear, area);

    let content: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();

    let popup = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_owned())
            .border_style(Style::default().fg(border_fg)),
    );

    f.render_widget(popup, area);
}

/// Help lines: every action grouped by category, with its bound keys.
pub fn help_lines(registry: &ActionRegistry, keymap: &Keymap) -> Vec<String> {
    let mut lines = Vec::new();
    for category in [
        ActionCategory::Navigation,
        ActionCategory::Form,
        ActionCategory::Map,
        ActionCategory::System,
    ] {
        lines.push(format!("{}:", category.label()));
        for d in registry.in_category(category) {
            let keys = keymap
                .keys_for_action(d.action)
                .map(|keys| keys.join(", "))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("  {keys:<14} {} - {}", d.name, d.description));
        }
    }
    lines.push("  Shift+arrows   Pan the map".to_owned());
    lines.push("  +/-            Zoom in/out".to_owned());
    lines.push(String::new());
    lines.push("Press Esc or ? to close".to_owned());
    lines
}

pub fn render_help_popup(f: &mut Frame, registry: &ActionRegistry, keymap: &Keymap, theme: &Theme) {
    render_popup(f, "Help", &help_lines(registry, keymap), theme);
}

/// Calculates a centered rectangle of the given percentage size within the parent area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_action() {
        let registry = ActionRegistry::new();
        let lines = help_lines(&registry, &Keymap::default());
        for d in registry.all() {
            assert!(lines.iter().any(|l| l.contains(d.name)), "missing {}", d.id);
        }
        assert!(lines.iter().any(|l| l.contains("Backspace, h")));
        assert_eq!(lines.last().map(String::as_str), Some("Press Esc or ? to close"));
    }

    #[test]
    fn centered_rect_is_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(60, 70, parent);
        assert!(rect.x >= parent.x && rect.right() <= parent.right());
        assert!(rect.y >= parent.y && rect.bottom() <= parent.bottom());
        assert_eq!(rect.width, 60);
    }
}
