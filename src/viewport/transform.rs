use crate::foundation::core::{Affine, Point, Rect, Vec2};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;

/// Global scene-to-screen transform: `screen = pan + zoom * rotate(rotation) * world`.
///
/// Only this transform changes on zoom and pan; drawable geometry is never touched.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
    /// Degrees, clockwise.
    rotation: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            rotation: 0.0,
            width,
            height,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Multiplies the zoom by `factor` (clamped) keeping the scene point under the screen-space
    /// `anchor` fixed. Non-positive or non-finite factors are ignored. Returns whether anything
    /// changed.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }
        self.set_zoom_at(self.zoom * factor, anchor)
    }

    /// Sets an absolute zoom (clamped) around a screen-space anchor.
    pub fn set_zoom_at(&mut self, zoom: f64, anchor: Point) -> bool {
        if !(zoom.is_finite() && anchor.x.is_finite() && anchor.y.is_finite()) {
            return false;
        }
        let new_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.zoom {
            return false;
        }
        let ratio = new_zoom / self.zoom;
        let a = anchor.to_vec2();
        self.pan = a - (a - self.pan) * ratio;
        self.zoom = new_zoom;
        true
    }

    /// Adds `step` to the zoom around the viewport centre.
    pub fn zoom_in(&mut self, step: f64) -> bool {
        self.set_zoom_at(self.zoom + step, self.center())
    }

    /// Subtracts `step` from the zoom around the viewport centre.
    pub fn zoom_out(&mut self, step: f64) -> bool {
        self.set_zoom_at(self.zoom - step, self.center())
    }

    /// Additive, unclamped translation in screen px.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !(dx.is_finite() && dy.is_finite()) || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        self.pan += Vec2::new(dx, dy);
        true
    }

    pub fn set_rotation(&mut self, degrees: f64) -> bool {
        if !degrees.is_finite() || degrees == self.rotation {
            return false;
        }
        self.rotation = degrees.rem_euclid(360.0);
        true
    }

    /// Zoom 1, no pan, no rotation.
    pub fn reset(&mut self) -> bool {
        let changed = self.zoom != 1.0 || self.pan != Vec2::ZERO || self.rotation != 0.0;
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
        self.rotation = 0.0;
        changed
    }

    pub fn affine(&self) -> Affine {
        let t = Affine::translate(self.pan) * Affine::scale(self.zoom);
        if self.rotation == 0.0 {
            t
        } else {
            t * Affine::rotate(self.rotation.to_radians())
        }
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        self.affine() * p
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        self.affine().inverse() * p
    }

    /// Scene-space bounding box of the screen rectangle.
    pub fn visible_world_rect(&self) -> Rect {
        self.affine()
            .inverse()
            .transform_rect_bbox(Rect::new(0.0, 0.0, self.width, self.height))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/transform.rs"]
mod tests;
