//! The map, drawn on a ratatui canvas.
//!
//! The view is centred on the routing centre and spans
//! `360 / 2^zoom` degrees of longitude. Terminal cells are roughly twice
//! as tall as they are wide, which the latitude span accounts for.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Span,
    widgets::canvas::{Canvas, Line as Segment, Map as WorldMap, MapResolution, Points},
    widgets::{Block, Borders},
    Frame,
};
use cyclenav_core::config::theme::parse_color;
use cyclenav_core::Routing;

use crate::app::App;

/// Height-to-width ratio of a terminal cell.
const CELL_ASPECT: f64 = 2.0;

/// Visible `(x_bounds, y_bounds)` for a map of `span` degrees centred on
/// `(lng, lat)` in an area of `width` x `height` cells.
pub fn view_bounds(lng: f64, lat: f64, span: f64, width: u16, height: u16) -> ([f64; 2], [f64; 2]) {
    let half_w = span / 2.0;
    let aspect = if width == 0 {
        1.0
    } else {
        f64::from(height) * CELL_ASPECT / f64::from(width)
    };
    let half_h = half_w * aspect;
    ([lng - half_w, lng + half_w], [lat - half_h, lat + half_h])
}

pub fn render_map(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme().map;
    let controller = app.controller();
    let surface = controller.navigator().map();
    let routing = controller.routing();
    let center = routing.center();

    let (x_bounds, y_bounds) =
        view_bounds(center.lng, center.lat, surface.span(), area.width, area.height);

    let waypoints: Vec<(f64, f64)> = routing
        .waypoints()
        .iter()
        .map(|w| (w.position.lng, w.position.lat))
        .collect();
    let marker = routing.single_marker_location();

    let grid = parse_color(&theme.grid_fg);
    let waypoint_fg = parse_color(&theme.waypoint_fg);
    let marker_fg = parse_color(&theme.marker_fg);

    let layers: Vec<&str> = controller.active_layers().iter().map(String::as_str).collect();
    let title = format!(" z{:.0}  {} ", surface.zoom(), layers.join(", "));

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::NONE).title(title))
        .background_color(parse_color(&theme.bg))
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&WorldMap {
                color: grid,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for pair in waypoints.windows(2) {
                ctx.draw(&Segment {
                    x1: pair[0].0,
                    y1: pair[0].1,
                    x2: pair[1].0,
                    y2: pair[1].1,
                    color: waypoint_fg,
                });
            }
            ctx.draw(&Points {
                coords: &waypoints,
                color: waypoint_fg,
            });
            if let Some(position) = marker {
                ctx.print(
                    position.lng,
                    position.lat,
                    Span::styled("X", Style::default().fg(marker_fg)),
                );
            }
            ctx.print(center.lng, center.lat, "+");
        });

    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_centred() {
        let (x, y) = view_bounds(-2.0, 53.0, 4.0, 80, 40);
        assert_eq!(x, [-4.0, 0.0]);
        assert_eq!(y, [51.0, 55.0]);
    }

    #[test]
    fn zero_width_does_not_divide_by_zero() {
        let (x, y) = view_bounds(0.0, 0.0, 2.0, 0, 10);
        assert_eq!(x, [-1.0, 1.0]);
        assert_eq!(y, [-1.0, 1.0]);
    }
}
