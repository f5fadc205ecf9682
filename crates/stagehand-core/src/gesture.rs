//! Per-drag transform state machine: move, resize and rotate.
//!
//! A gesture snapshots every participating object when it starts, derives
//! each frame from the snapshot plus the pointer offset, and wraps all setter
//! calls up to pointer-up in one recorder transaction.

use crate::events::{EditorEvent, GesturePhase};
use crate::geometry::{angle_between, rect_from_xywh};
use crate::handles::HandleKind;
use crate::object::{ObjectId, ObjectSnapshot};
use crate::scene::Scene;
use kurbo::{Point, Rect, Vec2};

/// What an active gesture does to its objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Move,
    Resize(HandleKind),
    Rotate,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    mode: GestureMode,
    /// Press point in world coordinates.
    origin: Point,
    last: Point,
    snapshots: Vec<ObjectSnapshot>,
}

impl ActiveGesture {
    fn ids(&self) -> Vec<ObjectId> {
        self.snapshots.iter().map(|s| s.id).collect()
    }

    fn describe(&self) -> String {
        let count = self.snapshots.len();
        let verb = match self.mode {
            GestureMode::Move => "Move",
            GestureMode::Resize(_) => "Resize",
            GestureMode::Rotate => "Rotate",
        };
        if count == 1 {
            format!("{verb} object")
        } else {
            format!("{verb} {count} objects")
        }
    }
}

/// Frame of a resized object, or `None` when `handle` is not a resize handle.
///
/// Near-side handles (left/top) move the position so the opposite edge stays
/// put. With `constrain` the snapshot's aspect ratio is kept: corners follow
/// whichever axis changed more in proportion, edges derive the other axis
/// around the centre. Neither extent drops below `min_extent`.
pub fn resize_frame(
    snapshot: &ObjectSnapshot,
    handle: HandleKind,
    delta: Vec2,
    constrain: bool,
    min_extent: f64,
) -> Option<Rect> {
    if !handle.is_resize() {
        return None;
    }
    let sides = handle.sides();

    let mut width = snapshot.width;
    let mut height = snapshot.height;
    if sides.right {
        width += delta.x;
    } else if sides.left {
        width -= delta.x;
    }
    if sides.bottom {
        height += delta.y;
    } else if sides.top {
        height -= delta.y;
    }

    let locked = constrain && snapshot.width > 0.0 && snapshot.height > 0.0;
    if locked {
        let aspect = snapshot.width / snapshot.height;
        match handle {
            HandleKind::Corner(_) => {
                let rel_w = (width - snapshot.width).abs() / snapshot.width;
                let rel_h = (height - snapshot.height).abs() / snapshot.height;
                if rel_w >= rel_h {
                    height = width / aspect;
                } else {
                    width = height * aspect;
                }
            }
            _ if sides.left || sides.right => height = width / aspect,
            _ => width = height * aspect,
        }

        let min_width = min_extent.max(min_extent * aspect);
        if width < min_width {
            width = min_width;
            height = width / aspect;
        }
    } else {
        if (sides.left || sides.right) && width < min_extent {
            width = min_extent;
        }
        if (sides.top || sides.bottom) && height < min_extent {
            height = min_extent;
        }
    }

    let x = if sides.left {
        snapshot.x + snapshot.width - width
    } else if sides.right {
        snapshot.x
    } else {
        snapshot.x + (snapshot.width - width) / 2.0
    };
    let y = if sides.top {
        snapshot.y + snapshot.height - height
    } else if sides.bottom {
        snapshot.y
    } else {
        snapshot.y + (snapshot.height - height) / 2.0
    };

    Some(rect_from_xywh(x, y, width, height))
}

/// Drives one pointer-down, move, pointer-up interaction at a time.
#[derive(Debug, Clone)]
pub struct TransformGesture {
    active: Option<ActiveGesture>,
    min_extent: f64,
}

impl Default for TransformGesture {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl TransformGesture {
    pub fn new(min_extent: f64) -> Self {
        Self {
            active: None,
            min_extent,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn mode(&self) -> Option<GestureMode> {
        self.active.as_ref().map(|g| g.mode)
    }

    /// Ids of the objects taking part in the active gesture.
    pub fn objects(&self) -> Vec<ObjectId> {
        self.active.as_ref().map(ActiveGesture::ids).unwrap_or_default()
    }

    pub fn start_move(
        &mut self,
        scene: &mut Scene,
        objects: &[ObjectId],
        point: Point,
    ) -> Option<EditorEvent> {
        self.start(scene, GestureMode::Move, objects, point)
    }

    pub fn start_resize(
        &mut self,
        scene: &mut Scene,
        objects: &[ObjectId],
        point: Point,
        handle: HandleKind,
    ) -> Option<EditorEvent> {
        self.start(scene, GestureMode::Resize(handle), objects, point)
    }

    pub fn start_rotate(
        &mut self,
        scene: &mut Scene,
        objects: &[ObjectId],
        point: Point,
    ) -> Option<EditorEvent> {
        self.start(scene, GestureMode::Rotate, objects, point)
    }

    fn start(
        &mut self,
        scene: &mut Scene,
        mode: GestureMode,
        objects: &[ObjectId],
        point: Point,
    ) -> Option<EditorEvent> {
        if let Some(active) = &self.active {
            log::warn!(
                "Ignoring {:?} gesture start while a {:?} gesture is active",
                mode,
                active.mode
            );
            return None;
        }

        let snapshots: Vec<ObjectSnapshot> = objects
            .iter()
            .filter_map(|&id| scene.get(id).map(|o| o.snapshot()))
            .collect();
        if snapshots.is_empty() {
            return None;
        }

        scene.recorder_mut().begin_property_transaction();
        log::debug!("Start {:?} gesture on {} object(s)", mode, snapshots.len());
        let gesture = ActiveGesture {
            mode,
            origin: point,
            last: point,
            snapshots,
        };
        let event = gesture_event(&gesture, GesturePhase::Start, Vec2::ZERO, 0.0);
        self.active = Some(gesture);
        Some(event)
    }

    /// Apply the pointer position to every object of the active gesture.
    pub fn on_pointer_move(
        &mut self,
        scene: &mut Scene,
        point: Point,
        constrain: bool,
    ) -> Option<EditorEvent> {
        let gesture = self.active.as_mut()?;
        gesture.last = point;
        let delta = point - gesture.origin;
        let mut angle = 0.0;

        match gesture.mode {
            GestureMode::Move => {
                for snapshot in &gesture.snapshots {
                    if let Some(mut object) = scene.object_mut(snapshot.id) {
                        object.set_position(Point::new(snapshot.x, snapshot.y) + delta);
                    }
                }
            }
            GestureMode::Resize(handle) => {
                for snapshot in &gesture.snapshots {
                    let Some(frame) =
                        resize_frame(snapshot, handle, delta, constrain, self.min_extent)
                    else {
                        continue;
                    };
                    if let Some(mut object) = scene.object_mut(snapshot.id) {
                        object.set_width(frame.width());
                        object.set_height(frame.height());
                        object.set_position(frame.origin());
                    }
                }
            }
            GestureMode::Rotate => {
                for (index, snapshot) in gesture.snapshots.iter().enumerate() {
                    if let Some(mut object) = scene.object_mut(snapshot.id) {
                        let center = object.center();
                        let swept =
                            angle_between(center, point) - angle_between(center, gesture.origin);
                        object.set_rotation(snapshot.rotation + swept);
                        if index == 0 {
                            angle = swept;
                        }
                    }
                }
            }
        }

        log::trace!("Gesture move to ({:.1}, {:.1})", point.x, point.y);
        Some(gesture_event(gesture, GesturePhase::Move, delta, angle))
    }

    /// Finish the gesture, committing its changes as one undoable action.
    pub fn on_pointer_up(&mut self, scene: &mut Scene) -> Option<EditorEvent> {
        let gesture = self.active.take()?;
        let description = gesture.describe();
        let recorded = scene.recorder_mut().commit_transaction(description.as_str());
        log::debug!("{} (recorded: {})", description, recorded);

        let delta = gesture.last - gesture.origin;
        let angle = match gesture.snapshots.first() {
            Some(snapshot) if gesture.mode == GestureMode::Rotate => scene
                .get(snapshot.id)
                .map_or(0.0, |o| o.rotation() - snapshot.rotation),
            _ => 0.0,
        };
        Some(gesture_event(&gesture, GesturePhase::End, delta, angle))
    }

    /// Restore every object to its start-of-gesture snapshot without recording.
    ///
    /// Returns `false` when no gesture was active.
    pub fn cancel(&mut self, scene: &mut Scene) -> bool {
        let Some(gesture) = self.active.take() else {
            return false;
        };
        {
            let _quiet = scene.suppression().suppress();
            for snapshot in &gesture.snapshots {
                if let Some(mut object) = scene.object_mut(snapshot.id) {
                    object.set_kind(snapshot.kind.clone());
                    object.set_position(Point::new(snapshot.x, snapshot.y));
                    object.set_rotation(snapshot.rotation);
                }
            }
        }
        let discarded = scene.recorder_mut().abort_transaction();
        log::debug!("Cancelled {:?} gesture ({} change(s) discarded)", gesture.mode, discarded);
        true
    }
}

fn gesture_event(gesture: &ActiveGesture, phase: GesturePhase, delta: Vec2, angle: f64) -> EditorEvent {
    let objects = gesture.ids();
    match gesture.mode {
        GestureMode::Move => EditorEvent::Drag {
            phase,
            objects,
            delta,
        },
        GestureMode::Resize(handle) => EditorEvent::Resize {
            phase,
            objects,
            handle,
            delta,
        },
        GestureMode::Rotate => EditorEvent::Rotate {
            phase,
            objects,
            angle,
        },
    }
}
