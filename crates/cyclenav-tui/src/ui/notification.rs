//! The notification banner.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use cyclenav_core::config::theme::{parse_color, Theme};
use cyclenav_core::Notification;

/// Draws `notification` across the top of `area`.
pub fn render_notification(f: &mut Frame, area: Rect, notification: &Notification, theme: &Theme) {
    let height = area.height.min(3);
    if height == 0 {
        return;
    }
    let banner = Rect {
        height,
        ..area
    };
    let style = Style::default()
        .fg(parse_color(&theme.notification.fg))
        .bg(parse_color(&theme.notification.bg));

    f.render_widget(Clear, banner);
    f.render_widget(
        Paragraph::new(notification.message.as_str())
            .alignment(Alignment::Center)
            .style(style.add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).style(style)),
        banner,
    );
}
