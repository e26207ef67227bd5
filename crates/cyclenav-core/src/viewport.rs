//! Map viewport adapter.
//!
//! Cards slide up over the bottom of the map. After every navigation
//! transition the map's bottom inset is set to the height of the visible
//! card and the map is told to recompute its layout, so the drawable area
//! always ends where the card begins.

use std::collections::BTreeMap;

use crate::nav::panel::PanelId;
use crate::routing::LngLat;

/// Parameters for creating the embedded map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub container: String,
    pub center: LngLat,
    pub zoom: f64,
    pub style: String,
}

/// The rendering side of the map, implemented by the frontend.
pub trait MapSurface {
    /// Sets the distance between the bottom of the map and the screen edge.
    fn set_bottom_inset(&mut self, inset: u32);
    /// Recomputes the map's internal layout and redraws.
    fn resize(&mut self);
}

/// Source of panel geometry for [`ViewportAdapter::fit_to_panel`].
pub trait PanelMeasure {
    /// The panel to measure when no explicit panel is given.
    fn visible_panel(&self) -> Option<PanelId>;
    /// Current rendered height of `panel`.
    fn rendered_height(&self, panel: PanelId) -> u32;
}

/// Table of panel heights, collapsed and expanded, in screen rows.
///
/// Panels without an entry use `default_height`; an expanded panel without
/// an expanded entry falls back to its collapsed height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelHeights {
    pub default_height: u32,
    pub collapsed: BTreeMap<PanelId, u32>,
    pub expanded: BTreeMap<PanelId, u32>,
}

impl Default for PanelHeights {
    fn default() -> Self {
        Self {
            default_height: 10,
            collapsed: BTreeMap::from([
                (PanelId::JourneySearch, 6),
                (PanelId::RideTrackerTrack, 6),
                (PanelId::CreatingAccount, 4),
                (PanelId::LoggedIn, 5),
                (PanelId::PhotomapAddDetails, 14),
            ]),
            expanded: BTreeMap::from([
                (PanelId::JourneySearch, 16),
                (PanelId::RideTrackerTrack, 9),
            ]),
        }
    }
}

impl PanelHeights {
    /// A table where every panel has `height`.
    pub fn uniform(height: u32) -> Self {
        Self {
            default_height: height,
            collapsed: BTreeMap::new(),
            expanded: BTreeMap::new(),
        }
    }

    /// Height of `panel` in the given state.
    pub fn height(&self, panel: PanelId, expanded: bool) -> u32 {
        let collapsed = self
            .collapsed
            .get(&panel)
            .copied()
            .unwrap_or(self.default_height);
        if expanded {
            self.expanded.get(&panel).copied().unwrap_or(collapsed)
        } else {
            collapsed
        }
    }

    /// Returns a new table with `panel`'s heights replaced.
    pub fn with_panel(mut self, panel: PanelId, collapsed: u32, expanded: u32) -> Self {
        self.collapsed.insert(panel, collapsed);
        self.expanded.insert(panel, expanded);
        self
    }
}

/// Keeps a [`MapSurface`] sized to the visible panel.
#[derive(Debug)]
pub struct ViewportAdapter<M> {
    map: M,
    inset: u32,
}

impl<M: MapSurface> ViewportAdapter<M> {
    pub fn new(map: M) -> Self {
        Self { map, inset: 0 }
    }

    /// Fits the map above `panel`, or above whichever panel `measure`
    /// reports as visible when `panel` is `None`.
    ///
    /// With nothing visible the inset becomes zero. Returns the new inset.
    pub fn fit_to_panel<P>(&mut self, panel: Option<PanelId>, measure: &P) -> u32
    where
        P: PanelMeasure + ?Sized,
    {
        let target = panel.or_else(|| measure.visible_panel());
        let height = target.map_or(0, |p| measure.rendered_height(p));

        self.inset = height;
        self.map.set_bottom_inset(height);
        self.map.resize();
        tracing::trace!(panel = ?target, inset = height, "map fitted");
        height
    }

    /// The inset applied by the last fit.
    pub fn inset(&self) -> u32 {
        self.inset
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }
}
