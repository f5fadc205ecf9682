//! Small geometric helpers shared by gestures, marquee and handles.

use kurbo::{Point, Rect};

/// Clamp `value` into `[min, max]`.
///
/// Unlike `f64::clamp` this never panics when `min > max`; the lower bound wins.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Angle in radians of the vector from `from` to `to`, as returned by `atan2`.
pub fn angle_between(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Strict axis-aligned overlap test.
///
/// Rectangles that only share an edge do not overlap.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    let a = a.abs();
    let b = b.abs();
    !(a.x1 <= b.x0 || b.x1 <= a.x0 || a.y1 <= b.y0 || b.y1 <= a.y0)
}

/// Rectangle from an `{x, y, width, height}` quadruple.
pub fn rect_from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::new(x, y, x + width, y + height)
}
