//! Selection outline, resize handles and rotate handle.

use crate::config::HandleConfig;
use crate::error::EditorError;
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Identity of a selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner resize handle.
    Corner(Corner),
    /// Edge midpoint resize handle.
    Edge(Edge),
    /// Rotation handle (above top-center).
    Rotate,
}

/// Which sides of a box a handle drags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl HandleKind {
    /// The eight resize handles, clockwise from the top-left corner.
    pub const RESIZE: [HandleKind; 8] = [
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Edge(Edge::Top),
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Edge(Edge::Right),
        HandleKind::Corner(Corner::BottomRight),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Corner(Corner::BottomLeft),
        HandleKind::Edge(Edge::Left),
    ];

    pub fn tag(self) -> &'static str {
        match self {
            HandleKind::Corner(Corner::TopLeft) => "top-left",
            HandleKind::Edge(Edge::Top) => "top",
            HandleKind::Corner(Corner::TopRight) => "top-right",
            HandleKind::Edge(Edge::Right) => "right",
            HandleKind::Corner(Corner::BottomRight) => "bottom-right",
            HandleKind::Edge(Edge::Bottom) => "bottom",
            HandleKind::Corner(Corner::BottomLeft) => "bottom-left",
            HandleKind::Edge(Edge::Left) => "left",
            HandleKind::Rotate => "rotate",
        }
    }

    pub fn is_resize(self) -> bool {
        !matches!(self, HandleKind::Rotate)
    }

    /// Sides moved by this handle. The rotate handle moves none.
    pub fn sides(self) -> Sides {
        match self {
            HandleKind::Corner(Corner::TopLeft) => Sides {
                left: true,
                top: true,
                ..Sides::default()
            },
            HandleKind::Corner(Corner::TopRight) => Sides {
                right: true,
                top: true,
                ..Sides::default()
            },
            HandleKind::Corner(Corner::BottomLeft) => Sides {
                left: true,
                bottom: true,
                ..Sides::default()
            },
            HandleKind::Corner(Corner::BottomRight) => Sides {
                right: true,
                bottom: true,
                ..Sides::default()
            },
            HandleKind::Edge(Edge::Top) => Sides {
                top: true,
                ..Sides::default()
            },
            HandleKind::Edge(Edge::Right) => Sides {
                right: true,
                ..Sides::default()
            },
            HandleKind::Edge(Edge::Bottom) => Sides {
                bottom: true,
                ..Sides::default()
            },
            HandleKind::Edge(Edge::Left) => Sides {
                left: true,
                ..Sides::default()
            },
            HandleKind::Rotate => Sides::default(),
        }
    }

    /// Position of a resize handle on `bounds`. `None` for the rotate handle.
    pub fn anchor(self, bounds: Rect) -> Option<Point> {
        let center = bounds.center();
        let point = match self {
            HandleKind::Corner(Corner::TopLeft) => Point::new(bounds.x0, bounds.y0),
            HandleKind::Corner(Corner::TopRight) => Point::new(bounds.x1, bounds.y0),
            HandleKind::Corner(Corner::BottomLeft) => Point::new(bounds.x0, bounds.y1),
            HandleKind::Corner(Corner::BottomRight) => Point::new(bounds.x1, bounds.y1),
            HandleKind::Edge(Edge::Top) => Point::new(center.x, bounds.y0),
            HandleKind::Edge(Edge::Right) => Point::new(bounds.x1, center.y),
            HandleKind::Edge(Edge::Bottom) => Point::new(center.x, bounds.y1),
            HandleKind::Edge(Edge::Left) => Point::new(bounds.x0, center.y),
            HandleKind::Rotate => return None,
        };
        Some(point)
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for HandleKind {
    type Err = EditorError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        if tag == "rotate" {
            return Ok(HandleKind::Rotate);
        }
        HandleKind::RESIZE
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| EditorError::UnknownHandle(tag.to_string()))
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Outline plus handles drawn around the current selection.
///
/// Holds geometry only; a renderer draws it with the configured colors.
#[derive(Debug, Clone)]
pub struct SelectionHandleSet {
    config: HandleConfig,
    rotate_offset: f64,
    outline: Option<Rect>,
    handles: Vec<Handle>,
    rotate: Option<Handle>,
    visible: bool,
}

impl SelectionHandleSet {
    pub fn new(config: HandleConfig, rotate_offset: f64) -> Self {
        Self {
            config,
            rotate_offset,
            outline: None,
            handles: Vec::new(),
            rotate: None,
            visible: false,
        }
    }

    /// Rebuild the geometry around `bounds` and make the set visible.
    pub fn update(&mut self, bounds: Rect, show_rotate: bool) {
        self.handles = HandleKind::RESIZE
            .into_iter()
            .filter_map(|kind| kind.anchor(bounds).map(|p| Handle::new(p, kind)))
            .collect();
        self.rotate = show_rotate.then(|| {
            Handle::new(
                Point::new(bounds.center().x, bounds.y0 - self.rotate_offset),
                HandleKind::Rotate,
            )
        });
        self.outline = Some(bounds);
        self.visible = true;
    }

    /// Hide without discarding geometry.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Show again, if there is geometry to show.
    pub fn show(&mut self) {
        self.visible = self.outline.is_some();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    pub fn outline(&self) -> Option<Rect> {
        self.outline
    }

    pub fn resize_handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn rotate_handle(&self) -> Option<&Handle> {
        self.rotate.as_ref()
    }

    /// Line joining the top-center of the outline to the rotate handle.
    pub fn rotate_guide(&self) -> Option<Line> {
        let outline = self.outline?;
        let rotate = self.rotate?;
        Some(Line::new(
            Point::new(outline.center().x, outline.y0),
            rotate.position,
        ))
    }

    /// Square drawn for `handle`, sized in screen pixels at the given zoom.
    pub fn handle_rect(&self, handle: &Handle, zoom: f64) -> Rect {
        let half = self.config.handle_size / zoom / 2.0;
        Rect::new(
            handle.position.x - half,
            handle.position.y - half,
            handle.position.x + half,
            handle.position.y + half,
        )
    }

    /// Find the handle under a world point. The rotate handle wins ties.
    pub fn hit_test(&self, point: Point, zoom: f64) -> Option<HandleKind> {
        if !self.visible {
            return None;
        }
        let tolerance = self.config.handle_size / zoom;
        self.rotate
            .iter()
            .chain(self.handles.iter())
            .find(|handle| handle.hit_test(point, tolerance))
            .map(|handle| handle.kind)
    }
}
