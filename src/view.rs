//! View controller: pan/zoom transform and the selected node.
//!
//! `screen = world * zoom + pan`. The controller never computes layout; it
//! is synced with each new payload and keeps the selection only while the
//! selected node is still drawn.

use serde::Serialize;

use crate::config::{LayoutConfig, ViewConfig};
use crate::layout::{Bounds, DisplayId, LayoutPayload, Point};
use crate::spatial::SpatialIndex;

/// Current pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

pub struct ViewController {
    config: ViewConfig,
    transform: ViewTransform,
    selected: Option<DisplayId>,
    index: SpatialIndex,
    /// Display id per payload slot, for mapping hit-test results back.
    slots: Vec<DisplayId>,
}

impl ViewController {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            transform: ViewTransform::default(),
            selected: None,
            index: SpatialIndex::new(),
            slots: Vec::new(),
        }
    }

    /// Swap in new limits, re-clamping the current zoom.
    pub fn set_config(&mut self, config: ViewConfig) {
        self.config = config;
        self.transform.zoom = self.clamp_zoom(self.transform.zoom);
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn selected(&self) -> Option<&DisplayId> {
        self.selected.as_ref()
    }

    /// Adopt a freshly computed payload.
    pub fn sync(&mut self, payload: &LayoutPayload) {
        self.index = SpatialIndex::from_payload(payload);
        self.slots = payload.nodes.iter().map(|n| n.id.clone()).collect();
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| !self.slots.contains(selected))
        {
            self.selected = None;
        }
    }

    // =========================================================================
    // Transform
    // =========================================================================

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.transform.pan_x += dx;
        self.transform.pan_y += dy;
    }

    /// Zoom by `factor` keeping the world point under `(sx, sy)` fixed.
    pub fn zoom_at(&mut self, factor: f32, sx: f32, sy: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.screen_to_world(sx, sy);
        self.transform.zoom = self.clamp_zoom(self.transform.zoom * factor);
        self.transform.pan_x = sx - anchor.x * self.transform.zoom;
        self.transform.pan_y = sy - anchor.y * self.transform.zoom;
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32) -> Point {
        let t = self.transform;
        Point::new((sx - t.pan_x) / t.zoom, (sy - t.pan_y) / t.zoom)
    }

    pub fn world_to_screen(&self, point: Point) -> Point {
        let t = self.transform;
        Point::new(point.x * t.zoom + t.pan_x, point.y * t.zoom + t.pan_y)
    }

    /// Frame `bounds` (node centers) inside a viewport of the given size.
    pub fn fit_bounds(
        &mut self,
        bounds: Bounds,
        layout: &LayoutConfig,
        viewport_width: f32,
        viewport_height: f32,
    ) {
        let framed = bounds.expanded(layout.node_width / 2.0, layout.node_height / 2.0);
        let available_w = (viewport_width - 2.0 * self.config.fit_padding).max(1.0);
        let available_h = (viewport_height - 2.0 * self.config.fit_padding).max(1.0);

        let zoom = if framed.width() > f32::EPSILON && framed.height() > f32::EPSILON {
            (available_w / framed.width()).min(available_h / framed.height())
        } else {
            1.0
        };
        self.transform.zoom = self.clamp_zoom(zoom);

        let center = framed.center();
        self.transform.pan_x = viewport_width / 2.0 - center.x * self.transform.zoom;
        self.transform.pan_y = viewport_height / 2.0 - center.y * self.transform.zoom;
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        // Not `f32::clamp`: limits come from user config and may be inverted.
        zoom.max(self.config.min_zoom).min(self.config.max_zoom)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a drawn node. Returns false (and keeps the current selection)
    /// when the id is not in the current payload.
    pub fn select(&mut self, id: DisplayId) -> bool {
        if self.slots.contains(&id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Select the person node under a screen point, or clear the selection
    /// when nothing is within the hit radius.
    pub fn select_at(&mut self, sx: f32, sy: f32) -> Option<&DisplayId> {
        let world = self.screen_to_world(sx, sy);
        let radius = self.config.hit_radius / self.transform.zoom;
        self.selected = self
            .index
            .nearest_within(world.x, world.y, radius)
            .and_then(|slot| self.slots.get(slot).cloned());
        self.selected.as_ref()
    }
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
