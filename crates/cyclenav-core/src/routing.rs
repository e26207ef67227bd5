//! The routing collaborator.
//!
//! Route planning happens outside this crate. The navigation layer only
//! needs a narrow handle on the routing UI: read and replace the waypoint
//! list, ask for a plan, and toggle the single-marker mode used when the
//! user picks a saved location on the map.

use serde::{Deserialize, Serialize};

/// A longitude/latitude pair, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A point the route must pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: LngLat,
    #[serde(default)]
    pub label: Option<String>,
}

impl Waypoint {
    pub fn at(position: LngLat) -> Self {
        Self {
            position,
            label: None,
        }
    }

    pub fn labelled(position: LngLat, label: impl Into<String>) -> Self {
        Self {
            position,
            label: Some(label.into()),
        }
    }
}

/// Operations the navigation layer invokes on the routing UI.
pub trait Routing {
    /// Waypoints currently placed on the map.
    fn waypoints(&self) -> Vec<Waypoint>;
    /// Replaces every waypoint.
    fn set_waypoints(&mut self, waypoints: Vec<Waypoint>);
    /// Plans routes between the current waypoints and builds the result tabs.
    fn plannable(&mut self);
    /// In single-marker mode a map click places one marker instead of a waypoint.
    fn set_single_marker_mode(&mut self, enabled: bool);
    /// Where the single marker currently sits.
    fn single_marker_location(&self) -> Option<LngLat>;
    /// Drops a waypoint at the centre of the map.
    fn add_map_center(&mut self);
}

/// In-process routing handle that keeps state but computes nothing.
///
/// Used by the terminal frontend and by tests; a real deployment would
/// forward these calls to the routing service's UI.
#[derive(Debug, Clone)]
pub struct LocalRouting {
    center: LngLat,
    waypoints: Vec<Waypoint>,
    single_marker_mode: bool,
    single_marker: Option<LngLat>,
    plans_requested: usize,
}

impl LocalRouting {
    pub fn new(center: LngLat) -> Self {
        Self {
            center,
            waypoints: Vec::new(),
            single_marker_mode: false,
            single_marker: None,
            plans_requested: 0,
        }
    }

    /// Moves the map centre (the frontend's pan).
    pub fn set_center(&mut self, center: LngLat) {
        self.center = center;
    }

    pub fn center(&self) -> LngLat {
        self.center
    }

    /// A map click: places the single marker, or appends a waypoint.
    pub fn click(&mut self, position: LngLat) {
        if self.single_marker_mode {
            self.single_marker = Some(position);
        } else {
            self.waypoints.push(Waypoint::at(position));
        }
    }

    pub fn is_single_marker_mode(&self) -> bool {
        self.single_marker_mode
    }

    /// How many times a plan was requested.
    pub fn plans_requested(&self) -> usize {
        self.plans_requested
    }
}

impl Routing for LocalRouting {
    fn waypoints(&self) -> Vec<Waypoint> {
        self.waypoints.clone()
    }

    fn set_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
    }

    fn plannable(&mut self) {
        self.plans_requested += 1;
        tracing::debug!(waypoints = self.waypoints.len(), "route plan requested");
    }

    fn set_single_marker_mode(&mut self, enabled: bool) {
        self.single_marker_mode = enabled;
        if !enabled {
            self.single_marker = None;
        }
    }

    fn single_marker_location(&self) -> Option<LngLat> {
        self.single_marker
    }

    fn add_map_center(&mut self) {
        self.waypoints.push(Waypoint::at(self.center));
    }
}
