//! Undoable actions produced by guarded property setters.
//!
//! Every observed mutation of a scene object is turned into a [`Change`]. The
//! [`ActionRecorder`] wraps changes into [`UndoableAction`]s, either one per
//! change or one per transaction (a whole drag gesture, a paste, a delete).
//! Replaying an action runs under a [`SuppressGuard`] so the replay is never
//! recorded again.

use crate::object::{ObjectId, ObjectKind, Property, PropertyValue, SceneObject};
use crate::scene::Scene;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared flag that disables recording while set.
#[derive(Debug, Clone, Default)]
pub struct SuppressionFlag(Rc<Cell<bool>>);

impl SuppressionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Set the flag until the returned guard is dropped.
    ///
    /// Guards nest: dropping one restores whatever value the flag had before it.
    pub fn suppress(&self) -> SuppressGuard {
        let previous = self.0.replace(true);
        SuppressGuard {
            flag: Rc::clone(&self.0),
            previous,
        }
    }
}

/// Keeps a [`SuppressionFlag`] set for its lifetime.
#[must_use = "recording resumes as soon as the guard is dropped"]
pub struct SuppressGuard {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// A single observed property mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub id: ObjectId,
    pub property: Property,
    pub old: PropertyValue,
    pub new: PropertyValue,
}

/// A recorded mutation of the scene.
#[derive(Debug, Clone)]
pub enum Change {
    Property(PropertyChange),
    /// Size change, stored as the whole kind so replay restores it exactly.
    Kind {
        id: ObjectId,
        old: ObjectKind,
        new: ObjectKind,
    },
    /// Object inserted at `index` of the scene's insertion order.
    Added { object: SceneObject, index: usize },
    /// Object removed from `index` of the scene's insertion order.
    Removed { object: SceneObject, index: usize },
}

impl Change {
    fn describe(&self) -> String {
        match self {
            Change::Property(change) => format!("Change {}", change.property),
            Change::Kind { .. } => "Resize object".to_string(),
            Change::Added { .. } => "Add object".to_string(),
            Change::Removed { .. } => "Remove object".to_string(),
        }
    }

    /// Whether the change adds or removes an object.
    fn is_structural(&self) -> bool {
        matches!(self, Change::Added { .. } | Change::Removed { .. })
    }

    fn is_noop(&self) -> bool {
        match self {
            Change::Property(p) => p.old == p.new,
            Change::Kind { old, new, .. } => old == new,
            _ => false,
        }
    }

    fn revert(&self, scene: &mut Scene) {
        match self {
            Change::Property(change) => {
                if let Some(mut object) = scene.object_mut(change.id) {
                    object.set(change.property, change.old);
                }
            }
            Change::Kind { id, old, .. } => {
                if let Some(mut object) = scene.object_mut(*id) {
                    object.set_kind(old.clone());
                }
            }
            Change::Added { object, .. } => {
                scene.remove(object.id());
            }
            Change::Removed { object, index } => {
                scene.insert_at(object.clone(), *index);
            }
        }
    }

    fn reapply(&self, scene: &mut Scene) {
        match self {
            Change::Property(change) => {
                if let Some(mut object) = scene.object_mut(change.id) {
                    object.set(change.property, change.new);
                }
            }
            Change::Kind { id, new, .. } => {
                if let Some(mut object) = scene.object_mut(*id) {
                    object.set_kind(new.clone());
                }
            }
            Change::Added { object, index } => {
                scene.insert_at(object.clone(), *index);
            }
            Change::Removed { object, .. } => {
                scene.remove(object.id());
            }
        }
    }
}

type Replay = Box<dyn Fn(&mut Scene)>;

/// An invertible scene mutation.
pub struct UndoableAction {
    description: String,
    undo: Replay,
    redo: Replay,
}

impl UndoableAction {
    /// Build an action from arbitrary replay closures.
    pub fn new(
        description: impl Into<String>,
        undo: impl Fn(&mut Scene) + 'static,
        redo: impl Fn(&mut Scene) + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            undo: Box::new(undo),
            redo: Box::new(redo),
        }
    }

    /// Build an action replaying `changes` through the scene's guarded setters.
    pub(crate) fn from_changes(description: impl Into<String>, changes: Vec<Change>) -> Self {
        let changes: Rc<[Change]> = changes.into();
        let redo_changes = Rc::clone(&changes);
        Self::new(
            description,
            move |scene: &mut Scene| {
                let _quiet = scene.suppression().suppress();
                for change in changes.iter().rev() {
                    change.revert(scene);
                }
            },
            move |scene: &mut Scene| {
                let _quiet = scene.suppression().suppress();
                for change in redo_changes.iter() {
                    change.reapply(scene);
                }
            },
        )
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn undo(&self, scene: &mut Scene) {
        (self.undo)(scene);
    }

    pub fn redo(&self, scene: &mut Scene) {
        (self.redo)(scene);
    }
}

impl fmt::Debug for UndoableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoableAction")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// What an open transaction collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Every change, including object additions and removals.
    All,
    /// Property and size changes only; additions and removals made while the
    /// frame is innermost become actions of their own.
    Properties,
}

#[derive(Debug)]
struct Frame {
    scope: Scope,
    changes: Vec<Change>,
}

impl Frame {
    fn accepts(&self, change: &Change) -> bool {
        self.scope == Scope::All || !change.is_structural()
    }
}

/// Turns observed changes into undoable actions.
#[derive(Debug, Default)]
pub struct ActionRecorder {
    suppression: SuppressionFlag,
    /// Open transactions, innermost last.
    frames: Vec<Frame>,
    pending: Vec<UndoableAction>,
}

impl ActionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder sharing an externally owned suppression flag.
    pub fn with_suppression(suppression: SuppressionFlag) -> Self {
        Self {
            suppression,
            ..Self::default()
        }
    }

    pub fn suppression(&self) -> &SuppressionFlag {
        &self.suppression
    }

    /// Whether changes are currently being recorded.
    pub fn is_recording(&self) -> bool {
        !self.suppression.is_set()
    }

    pub fn in_transaction(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Record a change, unless suppressed.
    pub fn record(&mut self, change: Change) {
        if self.suppression.is_set() {
            return;
        }
        match self.frames.last_mut() {
            Some(frame) if frame.accepts(&change) => coalesce(&mut frame.changes, change),
            _ => {
                let description = change.describe();
                self.pending
                    .push(UndoableAction::from_changes(description, vec![change]));
            }
        }
    }

    /// Start collecting changes into a single action. Transactions nest; an
    /// inner commit folds its changes into the enclosing transaction.
    pub fn begin_transaction(&mut self) {
        self.frames.push(Frame {
            scope: Scope::All,
            changes: Vec::new(),
        });
    }

    /// Like [`begin_transaction`](Self::begin_transaction), but additions and
    /// removals recorded while it is innermost are kept out of it.
    ///
    /// Used by gestures, whose action should only hold the transform.
    pub fn begin_property_transaction(&mut self) {
        self.frames.push(Frame {
            scope: Scope::Properties,
            changes: Vec::new(),
        });
    }

    /// Close the innermost transaction.
    ///
    /// Returns `true` if an action was produced.
    pub fn commit_transaction(&mut self, description: impl Into<String>) -> bool {
        let Some(frame) = self.frames.pop() else {
            log::warn!("commit_transaction called without an open transaction");
            return false;
        };
        let changes: Vec<Change> = frame
            .changes
            .into_iter()
            .filter(|change| !change.is_noop())
            .collect();

        if let Some(parent) = self.frames.last_mut() {
            if changes.iter().all(|change| parent.accepts(change)) {
                for change in changes {
                    coalesce(&mut parent.changes, change);
                }
                return false;
            }
        }

        if changes.is_empty() {
            return false;
        }
        self.pending
            .push(UndoableAction::from_changes(description, changes));
        true
    }

    /// Drop the innermost transaction without producing an action.
    ///
    /// Returns the number of discarded changes.
    pub fn abort_transaction(&mut self) -> usize {
        self.frames.pop().map_or(0, |frame| frame.changes.len())
    }

    /// Take all actions recorded since the last call.
    pub fn take_actions(&mut self) -> Vec<UndoableAction> {
        std::mem::take(&mut self.pending)
    }
}

/// Merge a change into an earlier change of the same object and property
/// (or the same object's kind), keeping the first old value and the latest
/// new value.
fn coalesce(changes: &mut Vec<Change>, change: Change) {
    match change {
        Change::Property(incoming) => {
            let existing = changes.iter_mut().rev().find_map(|c| match c {
                Change::Property(p) if p.id == incoming.id && p.property == incoming.property => {
                    Some(p)
                }
                _ => None,
            });
            match existing {
                Some(existing) => existing.new = incoming.new,
                None => changes.push(Change::Property(incoming)),
            }
        }
        Change::Kind { id, old, new } => {
            let existing = changes.iter_mut().rev().find_map(|c| match c {
                Change::Kind { id: other, new, .. } if *other == id => Some(new),
                _ => None,
            });
            match existing {
                Some(existing) => *existing = new,
                None => changes.push(Change::Kind { id, old, new }),
            }
        }
        other => changes.push(other),
    }
}
