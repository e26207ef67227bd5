//! Configuration management for CycleNav.
//!
//! Application settings ([`settings::Config`]), key bindings
//! ([`keymap::Keymap`]) and colours ([`theme::Theme`]) are stored as TOML
//! files and loaded at startup. Each one falls back to built-in defaults.

pub mod keymap;
pub mod settings;
pub mod theme;
