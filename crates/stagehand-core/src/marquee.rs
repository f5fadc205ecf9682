//! Drag-drawn rectangle for multi-selection.

use crate::geometry::rects_overlap;
use crate::object::{ObjectId, SceneObject};
use kurbo::{Point, Rect};

/// Tracks a marquee drag in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeTracker {
    origin: Point,
    current: Point,
    dead_zone: f64,
}

impl MarqueeTracker {
    pub fn new(origin: Point, dead_zone: f64) -> Self {
        Self {
            origin,
            current: origin,
            dead_zone,
        }
    }

    /// Extend the marquee to `point`.
    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Normalized rectangle between the press point and the current point.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.origin, self.current)
    }

    /// Whether the drag is large enough to count as a marquee rather than a click.
    pub fn exceeds_dead_zone(&self) -> bool {
        let delta = self.current - self.origin;
        delta.x.abs() > self.dead_zone || delta.y.abs() > self.dead_zone
    }

    /// Ids of the interactable objects whose world bounds strictly overlap the marquee.
    pub fn hits<'a>(&self, objects: impl IntoIterator<Item = &'a SceneObject>) -> Vec<ObjectId> {
        let rect = self.rect();
        objects
            .into_iter()
            .filter(|object| object.interactable() && rects_overlap(rect, object.world_bounds()))
            .map(SceneObject::id)
            .collect()
    }
}
