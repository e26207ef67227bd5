//! Navigation logic for CycleNav.
//!
//! This module contains the [`panel::PanelRegistry`] and panel identities,
//! the immutable [`breadcrumbs::Breadcrumbs`] trail, per-panel
//! [`form::FormScope`]s with the wizard progress gate, and the
//! [`engine::Navigator`] state machine that ties them together.

pub mod breadcrumbs;
pub mod engine;
pub mod form;
pub mod panel;
