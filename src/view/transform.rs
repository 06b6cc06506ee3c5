use serde::{Deserialize, Serialize};

use crate::graph::model::GraphNode;

// Zoom bounds shared by the wheel, the toolbar buttons, and fit-to-view
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;
// Breathing room around the graph bounds when fitting, in layout units
pub const FIT_PADDING: f32 = 40.0;
// Drawn extents of a node card, in layout units
pub const NODE_WIDTH: f32 = 150.0;
pub const NODE_HEIGHT: f32 = 44.0;
// Degenerate viewport dimensions clamp up to this
pub const MIN_VIEWPORT: f32 = 1.0;

// Layout space to screen space: screen = layout * scale + (x, y)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self { scale: 1.0, x: 0.0, y: 0.0 };

    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.x, y * self.scale + self.y)
    }

    pub fn to_layout(&self, sx: f32, sy: f32) -> (f32, f32) {
        ((sx - self.x) / self.scale, (sy - self.y) / self.scale)
    }

    // Translation moves by the screen-pixel delta, unchanged
    pub fn pan_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            scale: self.scale,
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    // Scale by `factor`, clamped, keeping the layout point under the anchor
    // fixed on screen
    pub fn zoom_at(&self, anchor_x: f32, anchor_y: f32, factor: f32) -> Self {
        let scale = (self.scale * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (lx, ly) = self.to_layout(anchor_x, anchor_y);
        Self {
            scale,
            x: anchor_x - lx * scale,
            y: anchor_y - ly * scale,
        }
    }

    // Persisted transforms come back through here; garbage collapses to the
    // identity rather than propagating NaN into the canvas
    pub fn sanitized(&self) -> Self {
        if !(self.scale.is_finite() && self.x.is_finite() && self.y.is_finite()) {
            return Self::IDENTITY;
        }
        Self {
            scale: self.scale.clamp(MIN_ZOOM, MAX_ZOOM),
            x: self.x,
            y: self.y,
        }
    }
}

// Largest scale that shows every node card plus padding, capped at 1.0 and
// floored at MIN_ZOOM, with the padded bounds centered in the viewport.
// An empty graph fits to the identity.
pub fn fit_transform(nodes: &[GraphNode], viewport_w: f32, viewport_h: f32) -> ViewTransform {
    let Some(first) = nodes.first() else {
        return ViewTransform::IDENTITY;
    };
    let width = viewport_w.max(MIN_VIEWPORT);
    let height = viewport_h.max(MIN_VIEWPORT);

    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for node in nodes {
        min_x = min_x.min(node.x);
        max_x = max_x.max(node.x);
        min_y = min_y.min(node.y);
        max_y = max_y.max(node.y);
    }
    min_x -= NODE_WIDTH / 2.0 + FIT_PADDING;
    max_x += NODE_WIDTH / 2.0 + FIT_PADDING;
    min_y -= NODE_HEIGHT / 2.0 + FIT_PADDING;
    max_y += NODE_HEIGHT / 2.0 + FIT_PADDING;

    let bounds_w = max_x - min_x;
    let bounds_h = max_y - min_y;
    let scale = (width / bounds_w)
        .min(height / bounds_h)
        .min(1.0)
        .max(MIN_ZOOM);

    ViewTransform {
        scale,
        x: (width - bounds_w * scale) / 2.0 - min_x * scale,
        y: (height - bounds_h * scale) / 2.0 - min_y * scale,
    }
}
