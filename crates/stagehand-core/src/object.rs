//! Scene objects: the positioned things the editor selects and transforms.

use crate::geometry::{clamp, rect_from_xywh};
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// Line height multiplier used to derive text height from font size.
pub const TEXT_LINE_HEIGHT: f64 = 1.25;

/// A mutable property exposed by every scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    X,
    Y,
    Rotation,
    ZIndex,
    Width,
    Height,
    Visible,
    Interactable,
    Opacity,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Rotation => "rotation",
            Property::ZIndex => "z-index",
            Property::Width => "width",
            Property::Height => "height",
            Property::Visible => "visible",
            Property::Interactable => "interactable",
            Property::Opacity => "opacity",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value carried by a property change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    Integer(i64),
    Flag(bool),
}

impl PropertyValue {
    pub fn as_number(self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer(self) -> Option<i64> {
        match self {
            PropertyValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_flag(self) -> Option<bool> {
        match self {
            PropertyValue::Flag(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Flag(value)
    }
}

/// The concrete kind of an object. Only the size derivation differs between kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Rectangle {
        width: f64,
        height: f64,
    },
    Ellipse {
        radius_x: f64,
        radius_y: f64,
    },
    /// Image placeholder; decoding happens elsewhere, only the natural size is known.
    Image {
        natural_width: f64,
        natural_height: f64,
        scale_x: f64,
        scale_y: f64,
    },
    /// Text box whose height follows from its font size and line count.
    Text {
        content: String,
        font_size: f64,
        box_width: f64,
    },
}

impl ObjectKind {
    pub fn width(&self) -> f64 {
        match self {
            ObjectKind::Rectangle { width, .. } => *width,
            ObjectKind::Ellipse { radius_x, .. } => radius_x * 2.0,
            ObjectKind::Image {
                natural_width,
                scale_x,
                ..
            } => natural_width * scale_x.abs(),
            ObjectKind::Text { box_width, .. } => *box_width,
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            ObjectKind::Rectangle { height, .. } => *height,
            ObjectKind::Ellipse { radius_y, .. } => radius_y * 2.0,
            ObjectKind::Image {
                natural_height,
                scale_y,
                ..
            } => natural_height * scale_y.abs(),
            ObjectKind::Text {
                content, font_size, ..
            } => text_line_count(content) as f64 * font_size * TEXT_LINE_HEIGHT,
        }
    }

    fn set_width(&mut self, value: f64) {
        match self {
            ObjectKind::Rectangle { width, .. } => *width = value,
            ObjectKind::Ellipse { radius_x, .. } => *radius_x = value / 2.0,
            ObjectKind::Image {
                natural_width,
                scale_x,
                ..
            } => {
                if *natural_width > 0.0 {
                    *scale_x = value / *natural_width;
                }
            }
            ObjectKind::Text { box_width, .. } => *box_width = value,
        }
    }

    fn set_height(&mut self, value: f64) {
        match self {
            ObjectKind::Rectangle { height, .. } => *height = value,
            ObjectKind::Ellipse { radius_y, .. } => *radius_y = value / 2.0,
            ObjectKind::Image {
                natural_height,
                scale_y,
                ..
            } => {
                if *natural_height > 0.0 {
                    *scale_y = value / *natural_height;
                }
            }
            ObjectKind::Text {
                content, font_size, ..
            } => {
                *font_size = value / (text_line_count(content) as f64 * TEXT_LINE_HEIGHT);
            }
        }
    }
}

fn text_line_count(content: &str) -> usize {
    content.lines().count().max(1)
}

/// Geometry captured at gesture start, restored on cancel.
///
/// `width` and `height` are derived from `kind`; restoring `kind` brings both
/// back bit for bit.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub kind: ObjectKind,
}

/// A positioned, selectable object in the scene.
///
/// Fields are only mutable through [`crate::scene::ObjectMut`], so every change
/// is observed and recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub(crate) id: ObjectId,
    /// Top-left corner of the local bounds in world space.
    pub(crate) position: Point,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub(crate) rotation: f64,
    #[serde(default)]
    pub(crate) z_index: i64,
    pub(crate) visible: bool,
    pub(crate) interactable: bool,
    pub(crate) opacity: f64,
    pub(crate) kind: ObjectKind,
}

impl SceneObject {
    /// Create an object of the given kind at `position`.
    pub fn new(position: Point, kind: ObjectKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            rotation: 0.0,
            z_index: 0,
            visible: true,
            interactable: true,
            opacity: 1.0,
            kind,
        }
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            Point::new(x, y),
            ObjectKind::Rectangle {
                width: width.max(0.0),
                height: height.max(0.0),
            },
        )
    }

    /// Ellipse whose bounding box starts at `(x, y)`.
    pub fn ellipse(x: f64, y: f64, radius_x: f64, radius_y: f64) -> Self {
        Self::new(
            Point::new(x, y),
            ObjectKind::Ellipse {
                radius_x: radius_x.max(0.0),
                radius_y: radius_y.max(0.0),
            },
        )
    }

    pub fn image(x: f64, y: f64, natural_width: f64, natural_height: f64) -> Self {
        Self::new(
            Point::new(x, y),
            ObjectKind::Image {
                natural_width: natural_width.max(0.0),
                natural_height: natural_height.max(0.0),
                scale_x: 1.0,
                scale_y: 1.0,
            },
        )
    }

    pub fn text(x: f64, y: f64, content: impl Into<String>, font_size: f64, box_width: f64) -> Self {
        Self::new(
            Point::new(x, y),
            ObjectKind::Text {
                content: content.into(),
                font_size: font_size.max(0.0),
                box_width: box_width.max(0.0),
            },
        )
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_interactable(mut self, interactable: bool) -> Self {
        self.interactable = interactable;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp(opacity, 0.0, 1.0);
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn z_index(&self) -> i64 {
        self.z_index
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn interactable(&self) -> bool {
        self.interactable
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn width(&self) -> f64 {
        self.kind.width()
    }

    pub fn height(&self) -> f64 {
        self.kind.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Bounds in the object's own space (before its position is applied).
    pub fn local_bounds(&self) -> Rect {
        rect_from_xywh(0.0, 0.0, self.width(), self.height())
    }

    /// Local bounds offset by the object's position. Rotation is ignored.
    pub fn world_bounds(&self) -> Rect {
        self.local_bounds() + self.position.to_vec2()
    }

    /// Rotation pivot: position plus half the size.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width() / 2.0,
            self.position.y + self.height() / 2.0,
        )
    }

    /// Check if a world point hits this object, honouring rotation.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let bounds = self.world_bounds();
        let local = if self.rotation.abs() < f64::EPSILON {
            point
        } else {
            Affine::rotate_about(-self.rotation, bounds.center()) * point
        };
        bounds.inflate(tolerance, tolerance).contains(local)
    }

    pub fn snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            width: self.width(),
            height: self.height(),
            rotation: self.rotation,
            kind: self.kind.clone(),
        }
    }

    /// Read a property by tag.
    pub fn get(&self, property: Property) -> PropertyValue {
        match property {
            Property::X => PropertyValue::Number(self.position.x),
            Property::Y => PropertyValue::Number(self.position.y),
            Property::Rotation => PropertyValue::Number(self.rotation),
            Property::ZIndex => PropertyValue::Integer(self.z_index),
            Property::Width => PropertyValue::Number(self.width()),
            Property::Height => PropertyValue::Number(self.height()),
            Property::Visible => PropertyValue::Flag(self.visible),
            Property::Interactable => PropertyValue::Flag(self.interactable),
            Property::Opacity => PropertyValue::Number(self.opacity),
        }
    }

    /// Coerce a value into the form stored for `property`.
    ///
    /// Returns `None` when the value has the wrong type or is not finite.
    pub(crate) fn normalize(property: Property, value: PropertyValue) -> Option<PropertyValue> {
        match (property, value) {
            (Property::X | Property::Y | Property::Rotation, PropertyValue::Number(v)) => {
                v.is_finite().then_some(PropertyValue::Number(v))
            }
            (Property::Width | Property::Height, PropertyValue::Number(v)) => {
                v.is_finite().then_some(PropertyValue::Number(v.max(0.0)))
            }
            (Property::Opacity, PropertyValue::Number(v)) => {
                v.is_finite().then_some(PropertyValue::Number(clamp(v, 0.0, 1.0)))
            }
            (Property::ZIndex, PropertyValue::Integer(_)) => Some(value),
            (Property::Visible | Property::Interactable, PropertyValue::Flag(_)) => Some(value),
            _ => None,
        }
    }

    /// Store an already-normalized value.
    pub(crate) fn apply(&mut self, property: Property, value: PropertyValue) {
        match (property, value) {
            (Property::X, PropertyValue::Number(v)) => self.position.x = v,
            (Property::Y, PropertyValue::Number(v)) => self.position.y = v,
            (Property::Rotation, PropertyValue::Number(v)) => self.rotation = v,
            (Property::ZIndex, PropertyValue::Integer(v)) => self.z_index = v,
            (Property::Width, PropertyValue::Number(v)) => self.kind.set_width(v),
            (Property::Height, PropertyValue::Number(v)) => self.kind.set_height(v),
            (Property::Visible, PropertyValue::Flag(v)) => self.visible = v,
            (Property::Interactable, PropertyValue::Flag(v)) => self.interactable = v,
            (Property::Opacity, PropertyValue::Number(v)) => self.opacity = v,
            _ => {}
        }
    }

    /// Give the object a fresh identifier (used when pasting copies).
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_bounds() {
        let rect = SceneObject::rectangle(10.0, 20.0, 100.0, 50.0);
        let local = rect.local_bounds();
        assert!((local.x0).abs() < f64::EPSILON);
        assert!((local.width() - 100.0).abs() < f64::EPSILON);

        let world = rect.world_bounds();
        assert!((world.x0 - 10.0).abs() < f64::EPSILON);
        assert!((world.y0 - 20.0).abs() < f64::EPSILON);
        assert!((world.x1 - 110.0).abs() < f64::EPSILON);
        assert!((world.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_kind_specific_sizes() {
        let ellipse = SceneObject::ellipse(0.0, 0.0, 20.0, 10.0);
        assert!((ellipse.width() - 40.0).abs() < f64::EPSILON);
        assert!((ellipse.height() - 20.0).abs() < f64::EPSILON);

        let image = SceneObject::image(0.0, 0.0, 640.0, 480.0);
        assert!((image.width() - 640.0).abs() < f64::EPSILON);

        let text = SceneObject::text(0.0, 0.0, "one\ntwo", 16.0, 120.0);
        assert!((text.width() - 120.0).abs() < f64::EPSILON);
        assert!((text.height() - 2.0 * 16.0 * TEXT_LINE_HEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_size_setters_follow_kind() {
        let mut image = SceneObject::image(0.0, 0.0, 200.0, 100.0);
        image.apply(Property::Width, PropertyValue::Number(100.0));
        assert!((image.width() - 100.0).abs() < 1e-9);
        match image.kind() {
            ObjectKind::Image { scale_x, .. } => assert!((scale_x - 0.5).abs() < 1e-9),
            _ => panic!("Expected image kind"),
        }

        let mut text = SceneObject::text(0.0, 0.0, "hello", 10.0, 50.0);
        text.apply(Property::Height, PropertyValue::Number(25.0));
        assert!((text.height() - 25.0).abs() < 1e-9);
        match text.kind() {
            ObjectKind::Text { font_size, .. } => assert!((font_size - 20.0).abs() < 1e-9),
            _ => panic!("Expected text kind"),
        }
    }

    #[test]
    fn test_normalize_rejects_bad_values() {
        assert!(SceneObject::normalize(Property::X, PropertyValue::Flag(true)).is_none());
        assert!(SceneObject::normalize(Property::Y, PropertyValue::Number(f64::NAN)).is_none());
        assert_eq!(
            SceneObject::normalize(Property::Width, PropertyValue::Number(-4.0)),
            Some(PropertyValue::Number(0.0))
        );
        assert_eq!(
            SceneObject::normalize(Property::Opacity, PropertyValue::Number(3.0)),
            Some(PropertyValue::Number(1.0))
        );
    }

    #[test]
    fn test_hit_test_honours_rotation() {
        let rect = SceneObject::rectangle(0.0, 0.0, 100.0, 10.0);
        assert!(rect.hit_test(Point::new(90.0, 5.0), 0.0));
        assert!(!rect.hit_test(Point::new(50.0, 40.0), 0.0));

        let rotated = rect.with_rotation(std::f64::consts::FRAC_PI_2);
        // Rotated a quarter turn about (50, 5): now spans y in [-45, 55].
        assert!(!rotated.hit_test(Point::new(90.0, 5.0), 0.0));
        assert!(rotated.hit_test(Point::new(50.0, 40.0), 0.0));
    }

    #[test]
    fn test_regenerate_id() {
        let mut rect = SceneObject::rectangle(0.0, 0.0, 1.0, 1.0);
        let before = rect.id();
        rect.regenerate_id();
        assert_ne!(before, rect.id());
    }

    #[test]
    fn test_serde_roundtrip_keeps_kind() {
        let text = SceneObject::text(3.0, 4.0, "hi", 12.0, 40.0).with_z_index(7);
        let json = serde_json::to_string(&text).unwrap();
        let back: SceneObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, text);
    }
}
