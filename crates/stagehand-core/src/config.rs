//! Editor configuration.

use kurbo::Vec2;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Appearance of the selection outline and its handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleConfig {
    pub outline_color: SerializableColor,
    pub handle_fill_color: SerializableColor,
    /// Handle edge length in screen pixels.
    pub handle_size: f64,
}

impl HandleConfig {
    pub fn outline(&self) -> Color {
        self.outline_color.into()
    }

    pub fn handle_fill(&self) -> Color {
        self.handle_fill_color.into()
    }
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            outline_color: SerializableColor::new(0x3b, 0x82, 0xf6, 255),
            handle_fill_color: SerializableColor::white(),
            handle_size: 8.0,
        }
    }
}

/// Tunables for the selection engine. All distances are in world units
/// unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub handles: HandleConfig,
    /// Offset applied to pasted objects.
    pub paste_offset: Vec2,
    /// Marquee drags at or below this extent on both axes select nothing.
    pub marquee_dead_zone: f64,
    /// Smallest width/height a resize may produce.
    pub min_extent: f64,
    /// Distance of the rotate handle above the top edge.
    pub rotate_handle_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handles: HandleConfig::default(),
            paste_offset: Vec2::new(20.0, 20.0),
            marquee_dead_zone: 3.0,
            min_extent: 5.0,
            rotate_handle_offset: 30.0,
        }
    }
}
