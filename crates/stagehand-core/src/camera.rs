//! Screen/world coordinate transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Converts between screen coordinates and world (object authoring) coordinates.
///
/// The selection engine only ever consumes the current transform; whoever
/// owns the viewport implements this trait.
pub trait WorldTransform {
    /// Convert a screen point to world coordinates.
    fn screen_to_world(&self, screen_point: Point) -> Point;

    /// Convert a world point to screen coordinates.
    fn world_to_screen(&self, world_point: Point) -> Point;

    /// Screen pixels per world unit. Used to keep handle hit areas constant on screen.
    fn zoom(&self) -> f64 {
        1.0
    }
}

/// Transform used when no pan/zoom/origin plugin is active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentityTransform;

impl WorldTransform for IdentityTransform {
    fn screen_to_world(&self, screen_point: Point) -> Point {
        screen_point
    }

    fn world_to_screen(&self, world_point: Point) -> Point {
        world_point
    }
}

/// Pan/zoom camera with an optional recentred world origin.
///
/// World point `w` lands on screen at `offset + zoom * (w + origin)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Shift applied to world coordinates before zooming (recentred origin).
    pub origin: Vec2,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            origin: Vec2::ZERO,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Affine transform taking world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom) * Affine::translate(self.origin)
    }

    /// Affine transform taking screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.origin)
            * Affine::scale(1.0 / self.zoom)
            * Affine::translate(-self.offset)
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Move the world origin so that world `(0, 0)` sits at `world_point`'s current spot.
    pub fn recentre(&mut self, world_point: Point) {
        self.origin = world_point.to_vec2() + self.origin;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        // Adjust offset so world_point stays under the cursor
        let new_screen = self.world_to_screen(world_point);
        self.offset += screen_point - new_screen;
    }

    /// Reset pan, zoom and origin.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
        self.origin = Vec2::ZERO;
    }
}

impl WorldTransform for Camera {
    fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }
}
