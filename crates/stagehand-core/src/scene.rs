//! Scene registry: owns the objects and routes every mutation through
//! guarded, recorded setters.

use crate::action::{ActionRecorder, Change, PropertyChange, SuppressionFlag, UndoableAction};
use crate::object::{ObjectId, ObjectKind, Property, PropertyValue, SceneObject};
use kurbo::Point;
use std::collections::HashMap;
use std::ops::Deref;

/// Notification emitted by the scene. Poll with [`Scene::poll_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added(ObjectId),
    Removed(ObjectId),
    PropertyChanged {
        id: ObjectId,
        property: Property,
        old: PropertyValue,
        new: PropertyValue,
    },
}

/// All objects of a scene, keyed by id.
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashMap<ObjectId, SceneObject>,
    /// Insertion order; breaks ties between equal stacking keys.
    order: Vec<ObjectId>,
    recorder: ActionRecorder,
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene whose recorder honours an externally owned suppression flag.
    pub fn with_suppression(suppression: SuppressionFlag) -> Self {
        Self {
            recorder: ActionRecorder::with_suppression(suppression),
            ..Self::default()
        }
    }

    /// Add an object to the scene. Returns its id.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let index = self.order.len();
        self.insert_at(object, index)
    }

    /// Insert an object at a position of the insertion order.
    pub(crate) fn insert_at(&mut self, object: SceneObject, index: usize) -> ObjectId {
        let id = object.id();
        if self.objects.contains_key(&id) {
            log::warn!("Object {} is already in the scene", id);
            return id;
        }
        let index = index.min(self.order.len());
        self.order.insert(index, id);
        self.recorder.record(Change::Added {
            object: object.clone(),
            index,
        });
        self.objects.insert(id, object);
        self.events.push(SceneEvent::Added(id));
        id
    }

    /// Remove an object from the scene.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.order.iter().position(|&other| other == id)?;
        let object = self.objects.remove(&id)?;
        self.order.remove(index);
        self.recorder.record(Change::Removed {
            object: object.clone(),
            index,
        });
        self.events.push(SceneEvent::Removed(id));
        Some(object)
    }

    /// Get an object by id.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Mutable handle whose setters notify and record.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<ObjectMut<'_>> {
        let object = self.objects.get_mut(&id)?;
        Some(ObjectMut {
            object,
            recorder: &mut self.recorder,
            events: &mut self.events,
        })
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.order.clone()
    }

    /// Ids sorted back to front by stacking key, ties by insertion order.
    pub fn stacking_order(&self) -> Vec<ObjectId> {
        let mut ids: Vec<(i64, usize, ObjectId)> = self
            .order
            .iter()
            .enumerate()
            .filter_map(|(index, id)| self.objects.get(id).map(|o| (o.z_index(), index, *id)))
            .collect();
        ids.sort_by_key(|&(z, index, _)| (z, index));
        ids.into_iter().map(|(_, _, id)| id).collect()
    }

    pub fn max_z_index(&self) -> Option<i64> {
        self.objects.values().map(SceneObject::z_index).max()
    }

    pub fn min_z_index(&self) -> Option<i64> {
        self.objects.values().map(SceneObject::z_index).min()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn recorder(&self) -> &ActionRecorder {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut ActionRecorder {
        &mut self.recorder
    }

    /// Flag that silences recording while set.
    pub fn suppression(&self) -> &SuppressionFlag {
        self.recorder.suppression()
    }

    /// Take the undoable actions recorded since the last call.
    pub fn take_actions(&mut self) -> Vec<UndoableAction> {
        self.recorder.take_actions()
    }

    /// Poll for pending notifications.
    pub fn poll_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Mutable access to one object through guarded setters.
///
/// A setter is a no-op when the value is unchanged. Otherwise it applies the
/// value, emits [`SceneEvent::PropertyChanged`] and records the change unless
/// recording is suppressed.
pub struct ObjectMut<'a> {
    object: &'a mut SceneObject,
    recorder: &'a mut ActionRecorder,
    events: &'a mut Vec<SceneEvent>,
}

impl ObjectMut<'_> {
    /// Set a property by tag. Returns `true` if the object changed.
    pub fn set(&mut self, property: Property, value: impl Into<PropertyValue>) -> bool {
        let Some(value) = SceneObject::normalize(property, value.into()) else {
            log::warn!("Rejected value for {} on {}", property, self.object.id());
            return false;
        };
        let old = self.object.get(property);
        if old == value {
            return false;
        }
        let old_kind = matches!(property, Property::Width | Property::Height)
            .then(|| self.object.kind.clone());
        self.object.apply(property, value);
        let new = self.object.get(property);
        if new == old {
            if let Some(kind) = old_kind {
                self.object.kind = kind;
            }
            return false;
        }

        let id = self.object.id();
        self.events.push(SceneEvent::PropertyChanged {
            id,
            property,
            old,
            new,
        });
        let change = match old_kind {
            Some(old) => Change::Kind {
                id,
                old,
                new: self.object.kind.clone(),
            },
            None => Change::Property(PropertyChange {
                id,
                property,
                old,
                new,
            }),
        };
        self.recorder.record(change);
        true
    }

    /// Replace the object's kind, restoring its size fields exactly.
    ///
    /// Emits a change event for each of width and height that moved.
    pub fn set_kind(&mut self, kind: ObjectKind) -> bool {
        if self.object.kind == kind {
            return false;
        }
        let id = self.object.id();
        let before = [Property::Width, Property::Height].map(|p| self.object.get(p));
        let old = std::mem::replace(&mut self.object.kind, kind);

        for (property, old) in [Property::Width, Property::Height].into_iter().zip(before) {
            let new = self.object.get(property);
            if new != old {
                self.events.push(SceneEvent::PropertyChanged {
                    id,
                    property,
                    old,
                    new,
                });
            }
        }
        self.recorder.record(Change::Kind {
            id,
            old,
            new: self.object.kind.clone(),
        });
        true
    }

    pub fn set_x(&mut self, x: f64) -> bool {
        self.set(Property::X, x)
    }

    pub fn set_y(&mut self, y: f64) -> bool {
        self.set(Property::Y, y)
    }

    pub fn set_position(&mut self, position: Point) -> bool {
        let x = self.set_x(position.x);
        let y = self.set_y(position.y);
        x || y
    }

    pub fn set_rotation(&mut self, rotation: f64) -> bool {
        self.set(Property::Rotation, rotation)
    }

    pub fn set_z_index(&mut self, z_index: i64) -> bool {
        self.set(Property::ZIndex, z_index)
    }

    pub fn set_width(&mut self, width: f64) -> bool {
        self.set(Property::Width, width)
    }

    pub fn set_height(&mut self, height: f64) -> bool {
        self.set(Property::Height, height)
    }

    pub fn set_visible(&mut self, visible: bool) -> bool {
        self.set(Property::Visible, visible)
    }

    pub fn set_interactable(&mut self, interactable: bool) -> bool {
        self.set(Property::Interactable, interactable)
    }

    pub fn set_opacity(&mut self, opacity: f64) -> bool {
        self.set(Property::Opacity, opacity)
    }
}

impl Deref for ObjectMut<'_> {
    type Target = SceneObject;

    fn deref(&self) -> &SceneObject {
        self.object
    }
}
