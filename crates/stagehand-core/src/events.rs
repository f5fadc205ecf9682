//! Notifications emitted by the selection engine.

use crate::handles::HandleKind;
use crate::object::ObjectId;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Phase of a transform gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GesturePhase {
    Start,
    Move,
    End,
}

/// Event queued by the engine. Poll with [`crate::SelectionEngine::poll_events`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Selection membership changed; carries the new selection.
    SelectionChanged { selection: Vec<ObjectId> },
    /// A non-empty selection was cleared.
    SelectionCleared { previous: Vec<ObjectId> },
    Drag {
        phase: GesturePhase,
        objects: Vec<ObjectId>,
        /// Offset from the gesture origin.
        delta: Vec2,
    },
    Resize {
        phase: GesturePhase,
        objects: Vec<ObjectId>,
        handle: HandleKind,
        delta: Vec2,
    },
    Rotate {
        phase: GesturePhase,
        objects: Vec<ObjectId>,
        /// Rotation applied since the gesture started, in radians.
        angle: f64,
    },
}

impl EditorEvent {
    /// Gesture phase, for transform events.
    pub fn phase(&self) -> Option<GesturePhase> {
        match self {
            EditorEvent::Drag { phase, .. }
            | EditorEvent::Resize { phase, .. }
            | EditorEvent::Rotate { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
