//! Persistent user preferences.
//!
//! [`backend`] provides raw string storage (in memory or a JSON file),
//! [`schema`] names the keys and their value shapes, and [`store`] offers
//! typed, validated access on top of a backend.

pub mod backend;
pub mod schema;
pub mod store;
