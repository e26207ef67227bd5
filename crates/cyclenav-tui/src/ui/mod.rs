//! UI widget modules for the TUI frontend.
//!
//! Each sub-module renders a single UI component using ratatui.

pub mod card;
pub mod drawer;
pub mod map;
pub mod notification;
pub mod popup;
pub mod statusbar;
