//! Pointer events consumed by the selection engine.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys relevant to selection and transform gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Toggle membership on click; keep the selection on background press.
    pub shift: bool,
    /// Constrain the active gesture (aspect-locked resize).
    pub constrain: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        constrain: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn constrain() -> Self {
        Self {
            constrain: true,
            ..Self::NONE
        }
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Position in screen coordinates.
    pub position: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn down(position: Point) -> Self {
        Self {
            phase: PointerPhase::Down,
            position,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(position: Point) -> Self {
        Self {
            phase: PointerPhase::Move,
            position,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(position: Point) -> Self {
        Self {
            phase: PointerPhase::Up,
            position,
            modifiers: Modifiers::NONE,
        }
    }

    /// Replace the modifier state.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(PointerEvent::down(p).phase, PointerPhase::Down);
        assert_eq!(PointerEvent::moved(p).phase, PointerPhase::Move);
        assert_eq!(PointerEvent::up(p).phase, PointerPhase::Up);
        assert_eq!(PointerEvent::up(p).modifiers, Modifiers::NONE);
    }

    #[test]
    fn test_with_modifiers() {
        let event = PointerEvent::down(Point::ZERO).with_modifiers(Modifiers::shift());
        assert!(event.modifiers.shift);
        assert!(!event.modifiers.constrain);
    }
}
