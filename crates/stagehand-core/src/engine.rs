//! Selection engine: owns the selection and routes pointer input to
//! handles, gestures and the marquee.

use crate::bounds::bounds_of;
use crate::camera::WorldTransform;
use crate::config::EditorConfig;
use crate::events::EditorEvent;
use crate::gesture::TransformGesture;
use crate::handles::{HandleKind, SelectionHandleSet};
use crate::input::{Modifiers, PointerEvent, PointerPhase};
use crate::marquee::MarqueeTracker;
use crate::object::{ObjectId, SceneObject};
use crate::scene::Scene;
use crate::serializer::{JsonSerializer, ObjectSerializer, Transport};
use crate::zorder;
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// What lies under a world point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(HandleKind),
    Object(ObjectId),
    Background,
}

/// Interactive selection and transform of scene objects.
///
/// Owns the [`Scene`]; every mutation made through the engine is recorded by
/// the scene's recorder, and every removal is reflected in the selection
/// before control returns to the caller.
pub struct SelectionEngine {
    scene: Scene,
    config: EditorConfig,
    selection: HashSet<ObjectId>,
    /// Selection back to front, as of the last handle refresh.
    ordered_selection: Vec<ObjectId>,
    gesture: TransformGesture,
    marquee: Option<MarqueeTracker>,
    handles: SelectionHandleSet,
    clipboard: Vec<Transport>,
    serializer: Box<dyn ObjectSerializer>,
    events: Vec<EditorEvent>,
}

impl SelectionEngine {
    pub fn new(scene: Scene) -> Self {
        Self::with_config(scene, EditorConfig::default())
    }

    pub fn with_config(scene: Scene, config: EditorConfig) -> Self {
        Self {
            scene,
            selection: HashSet::new(),
            ordered_selection: Vec::new(),
            gesture: TransformGesture::new(config.min_extent),
            marquee: None,
            handles: SelectionHandleSet::new(config.handles.clone(), config.rotate_handle_offset),
            clipboard: Vec::new(),
            serializer: Box::new(JsonSerializer),
            events: Vec::new(),
            config,
        }
    }

    /// Replace the clipboard serializer.
    pub fn with_serializer(mut self, serializer: impl ObjectSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access. The selection is reconciled when the guard drops.
    pub fn scene_mut(&mut self) -> SceneMut<'_> {
        SceneMut { engine: self }
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        self.scene.add(object)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.scene.remove(id);
        self.reconcile_selection();
        removed
    }

    // --- Selection ---

    /// Select exactly `id`.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.select_only(&[id])
    }

    /// Replace the selection with the existing objects among `ids`.
    pub fn select_only(&mut self, ids: &[ObjectId]) -> bool {
        let next: HashSet<ObjectId> = ids
            .iter()
            .copied()
            .filter(|&id| self.scene.contains(id))
            .collect();
        if next == self.selection {
            return false;
        }
        if next.is_empty() {
            return self.clear_selection();
        }
        self.selection = next;
        self.selection_changed();
        true
    }

    pub fn add_to_selection(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) || !self.selection.insert(id) {
            return false;
        }
        self.selection_changed();
        true
    }

    pub fn deselect(&mut self, id: ObjectId) -> bool {
        if !self.selection.remove(&id) {
            return false;
        }
        self.selection_changed();
        true
    }

    /// Add every interactable object to the selection.
    pub fn select_all(&mut self) -> bool {
        let mut changed = false;
        for object in self.scene.iter().filter(|o| o.interactable()) {
            changed |= self.selection.insert(object.id());
        }
        if changed {
            self.selection_changed();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let previous = self.selected();
        self.selection.clear();
        self.refresh_handles();
        self.events.push(EditorEvent::SelectionCleared { previous });
        true
    }

    /// Selected ids, back to front.
    pub fn selected(&self) -> Vec<ObjectId> {
        self.scene
            .stacking_order()
            .into_iter()
            .filter(|id| self.selection.contains(id))
            .collect()
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    // --- Editing ---

    /// Serialize the selection onto the clipboard. An empty selection leaves
    /// the clipboard untouched.
    pub fn copy_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.clipboard = self
            .selected()
            .into_iter()
            .filter_map(|id| self.scene.get(id))
            .filter_map(|object| match self.serializer.serialize(object) {
                Ok(transport) => Some(transport),
                Err(err) => {
                    log::warn!("Not copying {}: {}", object.id(), err);
                    None
                }
            })
            .collect();
        self.clipboard.len()
    }

    /// Add offset copies of the clipboard and select them.
    pub fn paste_clipboard(&mut self) -> Vec<ObjectId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }

        self.scene.recorder_mut().begin_transaction();
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for transport in &self.clipboard {
            match self.serializer.deserialize(transport) {
                Ok(mut object) => {
                    object.position += self.config.paste_offset;
                    pasted.push(self.scene.add(object));
                }
                Err(err) => log::warn!("Skipping clipboard entry: {}", err),
            }
        }
        self.scene
            .recorder_mut()
            .commit_transaction(describe("Paste", pasted.len()));

        self.select_only(&pasted);
        pasted
    }

    /// Remove the selected objects from the scene. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selected();
        if ids.is_empty() {
            return 0;
        }
        self.scene.recorder_mut().begin_transaction();
        let removed = ids
            .iter()
            .filter(|&&id| self.scene.remove(id).is_some())
            .count();
        self.scene
            .recorder_mut()
            .commit_transaction(describe("Delete", removed));
        self.selection.clear();
        self.refresh_handles();
        self.events.push(EditorEvent::SelectionCleared { previous: ids });
        removed
    }

    /// Offset the selection by `(dx, dy)` world units.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> bool {
        let ids = self.selected();
        if ids.is_empty() {
            return false;
        }
        let offset = Vec2::new(dx, dy);
        self.scene.recorder_mut().begin_transaction();
        let mut changed = false;
        for id in &ids {
            if let Some(mut object) = self.scene.object_mut(*id) {
                let position = object.position() + offset;
                changed |= object.set_position(position);
            }
        }
        self.scene
            .recorder_mut()
            .commit_transaction(describe("Nudge", ids.len()));
        self.refresh_handles();
        changed
    }

    pub fn bring_selected_to_front(&mut self) -> bool {
        let ids = self.selected();
        self.reorder_selection("Bring to front", ids, zorder::bring_to_front)
    }

    pub fn send_selected_to_back(&mut self) -> bool {
        let ids = self.selected().into_iter().rev().collect();
        self.reorder_selection("Send to back", ids, zorder::send_to_back)
    }

    pub fn move_selected_forward(&mut self) -> bool {
        let ids = self.selected().into_iter().rev().collect();
        self.reorder_selection("Move forward", ids, zorder::move_forward)
    }

    pub fn move_selected_backward(&mut self) -> bool {
        let ids = self.selected();
        self.reorder_selection("Move backward", ids, zorder::move_backward)
    }

    fn reorder_selection(
        &mut self,
        description: &str,
        ids: Vec<ObjectId>,
        op: fn(&mut Scene, ObjectId) -> bool,
    ) -> bool {
        if ids.is_empty() {
            return false;
        }
        self.scene.recorder_mut().begin_transaction();
        let mut changed = false;
        for id in ids {
            changed |= op(&mut self.scene, id);
        }
        self.scene.recorder_mut().commit_transaction(description);
        self.refresh_handles();
        changed
    }

    // --- Pointer input ---

    /// Route a screen-space pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent, transform: &dyn WorldTransform) {
        let point = transform.screen_to_world(event.position);
        log::trace!(
            "{:?} at screen ({:.1}, {:.1}) -> world ({:.1}, {:.1})",
            event.phase,
            event.position.x,
            event.position.y,
            point.x,
            point.y
        );
        match event.phase {
            PointerPhase::Down => self.on_pointer_down(point, event.modifiers, transform.zoom()),
            PointerPhase::Move => self.on_pointer_move(point, event.modifiers),
            PointerPhase::Up => self.on_pointer_up(point),
        }
    }

    /// Pointer press at a world point.
    pub fn on_pointer_down(&mut self, point: Point, modifiers: Modifiers, zoom: f64) {
        match self.hit_test(point, zoom) {
            HitTarget::Handle(kind) => self.on_handle_pointer_down(kind, point),
            HitTarget::Object(id) => self.on_object_pointer_down(id, point, modifiers),
            HitTarget::Background => self.on_background_pointer_down(point, modifiers),
        }
    }

    /// Start a resize or rotate gesture over the selection.
    pub fn on_handle_pointer_down(&mut self, kind: HandleKind, point: Point) {
        let ids = self.selected();
        let event = match kind {
            HandleKind::Rotate => self.gesture.start_rotate(&mut self.scene, &ids, point),
            _ => self.gesture.start_resize(&mut self.scene, &ids, point, kind),
        };
        self.events.extend(event);
    }

    /// Shift toggles membership; a plain press on an unselected object selects
    /// only it. Either way a move gesture starts over the resulting selection.
    pub fn on_object_pointer_down(&mut self, id: ObjectId, point: Point, modifiers: Modifiers) {
        if modifiers.shift {
            if self.is_selected(id) {
                self.deselect(id);
            } else {
                self.add_to_selection(id);
            }
        } else if !self.is_selected(id) {
            self.select(id);
        }

        let ids = self.selected();
        let event = self.gesture.start_move(&mut self.scene, &ids, point);
        self.events.extend(event);
    }

    /// Press on empty canvas: start a marquee, clearing the selection unless shift is held.
    pub fn on_background_pointer_down(&mut self, point: Point, modifiers: Modifiers) {
        if !modifiers.shift {
            self.clear_selection();
        }
        self.marquee = Some(MarqueeTracker::new(point, self.config.marquee_dead_zone));
    }

    pub fn on_pointer_move(&mut self, point: Point, modifiers: Modifiers) {
        if self.gesture.is_active() {
            let event = self
                .gesture
                .on_pointer_move(&mut self.scene, point, modifiers.constrain);
            self.events.extend(event);
            self.refresh_handles();
        } else if let Some(marquee) = &mut self.marquee {
            marquee.update(point);
        }
    }

    pub fn on_pointer_up(&mut self, point: Point) {
        if self.gesture.is_active() {
            let event = self.gesture.on_pointer_up(&mut self.scene);
            self.events.extend(event);
            self.refresh_handles();
            return;
        }

        let Some(mut marquee) = self.marquee.take() else {
            return;
        };
        marquee.update(point);
        if !marquee.exceeds_dead_zone() {
            return;
        }
        let hits = marquee.hits(self.scene.iter());
        log::debug!("Marquee {:?} hit {} object(s)", marquee.rect(), hits.len());
        let mut changed = false;
        for id in hits {
            changed |= self.selection.insert(id);
        }
        if changed {
            self.selection_changed();
        }
    }

    /// Abandon the active gesture or marquee, restoring any transformed objects.
    pub fn cancel_gesture(&mut self) -> bool {
        let marquee = self.marquee.take().is_some();
        let cancelled = self.gesture.cancel(&mut self.scene);
        if cancelled {
            self.refresh_handles();
        }
        cancelled || marquee
    }

    // --- Queries ---

    /// Handle, topmost interactable object, or background under a world point.
    pub fn hit_test(&self, point: Point, zoom: f64) -> HitTarget {
        if let Some(kind) = self.handles.hit_test(point, zoom) {
            return HitTarget::Handle(kind);
        }
        self.scene
            .stacking_order()
            .into_iter()
            .rev()
            .find(|&id| {
                self.scene
                    .get(id)
                    .is_some_and(|o| o.interactable() && o.hit_test(point, 0.0))
            })
            .map_or(HitTarget::Background, HitTarget::Object)
    }

    pub fn combined_bounds(&self) -> Option<Rect> {
        bounds_of(&self.scene, &self.selected())
    }

    pub fn handles(&self) -> &SelectionHandleSet {
        &self.handles
    }

    pub fn marquee_rect(&self) -> Option<Rect> {
        self.marquee.as_ref().map(MarqueeTracker::rect)
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_active()
    }

    /// Poll for pending events.
    pub fn poll_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn selection_changed(&mut self) {
        self.refresh_handles();
        let selection = self.selected();
        self.events.push(EditorEvent::SelectionChanged { selection });
    }

    fn refresh_handles(&mut self) {
        self.ordered_selection = self.selected();
        match bounds_of(&self.scene, &self.ordered_selection) {
            Some(bounds) => self.handles.update(bounds, self.selection.len() == 1),
            None => self.handles.hide(),
        }
    }

    /// Drop ids whose objects left the scene.
    ///
    /// A cleared selection reports its ids in the stacking order they had
    /// before the removal.
    fn reconcile_selection(&mut self) {
        let mut previous: Vec<ObjectId> = self
            .ordered_selection
            .iter()
            .copied()
            .filter(|id| self.selection.contains(id))
            .collect();
        let unordered: Vec<ObjectId> = self
            .selection
            .iter()
            .filter(|id| !previous.contains(id))
            .copied()
            .collect();
        previous.extend(unordered);
        let scene = &self.scene;
        self.selection.retain(|&id| scene.contains(id));

        if self.selection.len() == previous.len() {
            self.refresh_handles();
        } else if self.selection.is_empty() {
            self.refresh_handles();
            self.events.push(EditorEvent::SelectionCleared { previous });
        } else {
            self.selection_changed();
        }
    }
}

impl fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("selection", &self.selection)
            .field("gesture", &self.gesture)
            .field("marquee", &self.marquee)
            .field("clipboard", &self.clipboard.len())
            .finish_non_exhaustive()
    }
}

fn describe(verb: &str, count: usize) -> String {
    if count == 1 {
        format!("{verb} object")
    } else {
        format!("{verb} {count} objects")
    }
}

/// Mutable scene borrowed from a [`SelectionEngine`].
///
/// Dropping the guard removes deleted objects from the selection and
/// refreshes the handles.
pub struct SceneMut<'a> {
    engine: &'a mut SelectionEngine,
}

impl Deref for SceneMut<'_> {
    type Target = Scene;

    fn deref(&self) -> &Scene {
        &self.engine.scene
    }
}

impl DerefMut for SceneMut<'_> {
    fn deref_mut(&mut self) -> &mut Scene {
        &mut self.engine.scene
    }
}

impl Drop for SceneMut<'_> {
    fn drop(&mut self) {
        self.engine.reconcile_selection();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, IdentityTransform};
    use crate::events::GesturePhase;
    use crate::handles::Corner;
    use crate::history::History;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn engine_with(objects: Vec<SceneObject>) -> (SelectionEngine, Vec<ObjectId>) {
        let mut scene = Scene::new();
        let ids = objects.into_iter().map(|o| scene.add(o)).collect();
        scene.take_actions();
        (SelectionEngine::new(scene), ids)
    }

    fn click(engine: &mut SelectionEngine, point: Point, modifiers: Modifiers) {
        engine.handle_pointer(PointerEvent::down(point).with_modifiers(modifiers), &IdentityTransform);
        engine.handle_pointer(PointerEvent::up(point).with_modifiers(modifiers), &IdentityTransform);
    }

    fn selection_set(engine: &SelectionEngine) -> HashSet<ObjectId> {
        engine.selected().into_iter().collect()
    }

    #[test]
    fn test_select_all_skips_non_interactable() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::ellipse(20.0, 0.0, 5.0, 5.0),
            SceneObject::text(40.0, 0.0, "label", 12.0, 60.0),
            SceneObject::rectangle(80.0, 0.0, 10.0, 10.0).with_interactable(false),
        ]);
        assert!(engine.select_all());
        assert_eq!(engine.selected().len(), 3);
        assert!(!engine.is_selected(ids[3]));
        assert!(!engine.select_all());
    }

    #[test]
    fn test_idempotent_selection_emits_nothing() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
        ]);
        assert!(engine.select(ids[0]));
        assert_eq!(
            engine.poll_events(),
            vec![EditorEvent::SelectionChanged {
                selection: vec![ids[0]]
            }]
        );

        assert!(!engine.select(ids[0]));
        assert!(!engine.add_to_selection(ids[0]));
        assert!(!engine.deselect(ids[1]));
        assert!(engine.poll_events().is_empty());

        assert!(engine.clear_selection());
        assert!(!engine.clear_selection());
        assert_eq!(
            engine.poll_events(),
            vec![EditorEvent::SelectionCleared {
                previous: vec![ids[0]]
            }]
        );
    }

    #[test]
    fn test_select_replaces_selection() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
        ]);
        engine.add_to_selection(ids[0]);
        engine.add_to_selection(ids[1]);
        assert!(engine.select(ids[1]));
        assert_eq!(engine.selected(), vec![ids[1]]);
        assert!(!engine.select(uuid::Uuid::new_v4()));
    }

    #[test]
    fn test_click_and_shift_click() {
        init();
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 40.0, 40.0),
            SceneObject::rectangle(60.0, 0.0, 40.0, 40.0),
        ]);

        click(&mut engine, Point::new(20.0, 20.0), Modifiers::NONE);
        assert_eq!(engine.selected(), vec![ids[0]]);

        click(&mut engine, Point::new(80.0, 20.0), Modifiers::shift());
        assert_eq!(selection_set(&engine), ids.iter().copied().collect());

        click(&mut engine, Point::new(20.0, 20.0), Modifiers::shift());
        assert_eq!(engine.selected(), vec![ids[1]]);

        click(&mut engine, Point::new(200.0, 200.0), Modifiers::NONE);
        assert!(engine.selected().is_empty());
        assert!(!engine.is_gesture_active());
        // Clicks without movement record nothing.
        assert!(engine.scene_mut().take_actions().is_empty());
    }

    #[test]
    fn test_topmost_object_wins() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 50.0, 50.0).with_z_index(3),
            SceneObject::rectangle(10.0, 10.0, 50.0, 50.0),
            SceneObject::rectangle(20.0, 20.0, 50.0, 50.0).with_interactable(false).with_z_index(9),
        ]);
        assert_eq!(engine.hit_test(Point::new(30.0, 30.0), 1.0), HitTarget::Object(ids[0]));
        assert_eq!(engine.hit_test(Point::new(55.0, 55.0), 1.0), HitTarget::Object(ids[1]));
        assert_eq!(engine.hit_test(Point::new(65.0, 65.0), 1.0), HitTarget::Background);
        engine.select(ids[1]);
        assert_eq!(
            engine.hit_test(Point::new(60.0, 60.0), 1.0),
            HitTarget::Handle(HandleKind::Corner(Corner::BottomRight))
        );
    }

    #[test]
    fn test_drag_records_one_action() {
        let (mut engine, ids) = engine_with(vec![SceneObject::rectangle(0.0, 0.0, 10.0, 10.0)]);
        let transform = IdentityTransform;
        engine.handle_pointer(PointerEvent::down(Point::new(5.0, 5.0)), &transform);
        assert!(engine.is_gesture_active());
        for step in 1..=4 {
            let point = Point::new(5.0 + step as f64 * 10.0, 5.0);
            engine.handle_pointer(PointerEvent::moved(point), &transform);
        }
        engine.handle_pointer(PointerEvent::up(Point::new(45.0, 5.0)), &transform);

        assert_eq!(engine.scene().get(ids[0]).unwrap().x(), 40.0);
        let outline = engine.handles().outline().unwrap();
        assert!((outline.x0 - 40.0).abs() < f64::EPSILON);

        let phases: Vec<GesturePhase> = engine
            .poll_events()
            .iter()
            .filter_map(EditorEvent::phase)
            .collect();
        assert_eq!(phases.first(), Some(&GesturePhase::Start));
        assert_eq!(phases.last(), Some(&GesturePhase::End));
        assert_eq!(phases.iter().filter(|&&p| p == GesturePhase::End).count(), 1);

        let actions = engine.scene_mut().take_actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].description(), "Move object");
    }

    #[test]
    fn test_resize_through_handle() {
        let (mut engine, ids) = engine_with(vec![SceneObject::rectangle(10.0, 10.0, 100.0, 50.0)]);
        engine.select(ids[0]);
        let transform = IdentityTransform;

        engine.handle_pointer(PointerEvent::down(Point::new(110.0, 60.0)), &transform);
        engine.handle_pointer(PointerEvent::moved(Point::new(130.0, 70.0)), &transform);
        engine.handle_pointer(PointerEvent::up(Point::new(130.0, 70.0)), &transform);

        let bounds = engine.scene().get(ids[0]).unwrap().world_bounds();
        assert_eq!(bounds, Rect::new(10.0, 10.0, 130.0, 70.0));
        assert_eq!(engine.combined_bounds(), Some(bounds));
    }

    #[test]
    fn test_escape_cancels_drag() {
        let (mut engine, ids) = engine_with(vec![SceneObject::rectangle(0.0, 0.0, 10.0, 10.0)]);
        engine.on_pointer_down(Point::new(5.0, 5.0), Modifiers::NONE, 1.0);
        engine.on_pointer_move(Point::new(50.0, 50.0), Modifiers::NONE);
        assert!(engine.cancel_gesture());

        assert_eq!(engine.scene().get(ids[0]).unwrap().position(), Point::ZERO);
        assert!(!engine.is_gesture_active());
        assert!(engine.scene_mut().take_actions().is_empty());
        assert!(!engine.cancel_gesture());
    }

    #[test]
    fn test_marquee_through_zoomed_camera() {
        init();
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(10.0, 10.0, 10.0, 10.0),
            SceneObject::rectangle(51.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(40.0, 40.0, 20.0, 20.0),
            SceneObject::rectangle(20.0, 20.0, 5.0, 5.0).with_interactable(false),
        ]);
        let mut camera = Camera::new();
        camera.zoom = 2.0;

        engine.handle_pointer(PointerEvent::down(Point::ZERO), &camera);
        engine.handle_pointer(PointerEvent::moved(Point::new(60.0, 60.0)), &camera);
        assert_eq!(engine.marquee_rect(), Some(Rect::new(0.0, 0.0, 30.0, 30.0)));
        engine.handle_pointer(PointerEvent::up(Point::new(100.0, 100.0)), &camera);

        assert_eq!(selection_set(&engine), HashSet::from([ids[0], ids[2]]));
        assert!(engine.marquee_rect().is_none());
    }

    #[test]
    fn test_marquee_dead_zone() {
        let (mut engine, _) = engine_with(vec![SceneObject::rectangle(0.0, 0.0, 2.0, 2.0)]);
        engine.on_pointer_down(Point::new(-1.0, -1.0), Modifiers::NONE, 1.0);
        engine.on_pointer_up(Point::new(1.0, 1.0));
        assert!(engine.selected().is_empty());
    }

    #[test]
    fn test_shift_marquee_extends_selection() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(100.0, 100.0, 10.0, 10.0),
        ]);
        engine.select(ids[1]);
        engine.on_pointer_down(Point::new(-5.0, -5.0), Modifiers::shift(), 1.0);
        engine.on_pointer_move(Point::new(20.0, 20.0), Modifiers::shift());
        engine.on_pointer_up(Point::new(20.0, 20.0));
        assert_eq!(selection_set(&engine), HashSet::from([ids[0], ids[1]]));
    }

    #[test]
    fn test_rotate_handle_only_for_single_selection() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
        ]);
        assert!(!engine.handles().is_visible());

        engine.select(ids[0]);
        assert!(engine.handles().rotate_handle().is_some());
        engine.add_to_selection(ids[1]);
        assert!(engine.handles().rotate_handle().is_none());
        assert_eq!(engine.handles().outline(), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));

        engine.clear_selection();
        assert!(!engine.handles().is_visible());
    }

    #[test]
    fn test_rotate_through_handle() {
        let (mut engine, ids) = engine_with(vec![SceneObject::rectangle(0.0, 0.0, 100.0, 100.0)]);
        engine.select(ids[0]);
        let handle = engine.handles().rotate_handle().unwrap().position;

        engine.on_pointer_down(handle, Modifiers::NONE, 1.0);
        // Handle sits straight above the centre; drag to straight right.
        engine.on_pointer_move(Point::new(150.0, 50.0), Modifiers::NONE);
        engine.on_pointer_up(Point::new(150.0, 50.0));

        let rotation = engine.scene().get(ids[0]).unwrap().rotation();
        assert!((rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_copy_paste() {
        let (mut engine, ids) = engine_with(vec![SceneObject::rectangle(10.0, 10.0, 10.0, 10.0)]);
        assert_eq!(engine.copy_selected(), 0);
        assert!(engine.paste_clipboard().is_empty());

        engine.select(ids[0]);
        assert_eq!(engine.copy_selected(), 1);
        let pasted = engine.paste_clipboard();
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], ids[0]);
        assert_eq!(engine.selected(), pasted);
        assert_eq!(
            engine.scene().get(pasted[0]).unwrap().position(),
            Point::new(30.0, 30.0)
        );

        // Empty selection keeps the old clipboard.
        engine.clear_selection();
        assert_eq!(engine.copy_selected(), 0);
        let again = engine.paste_clipboard();
        assert_eq!(again.len(), 1);
        assert_eq!(engine.scene().len(), 3);

        let actions = engine.scene_mut().take_actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].description(), "Paste object");
    }

    #[test]
    fn test_paste_skips_bad_entries() {
        init();
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::ellipse(20.0, 0.0, 5.0, 5.0),
        ]);
        engine.select_all();
        engine.copy_selected();
        engine.clipboard.insert(1, serde_json::json!({ "bogus": true }));

        let pasted = engine.paste_clipboard();
        assert_eq!(pasted.len(), 2);
        assert_eq!(engine.scene().len(), 4);
        assert!(pasted.iter().all(|id| !ids.contains(id)));
    }

    #[test]
    fn test_delete_selected() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(40.0, 0.0, 10.0, 10.0),
        ]);
        engine.select_only(&ids[..2]);
        engine.poll_events();

        assert_eq!(engine.delete_selected(), 2);
        assert_eq!(engine.scene().len(), 1);
        assert!(engine.selected().is_empty());
        assert_eq!(
            engine.poll_events(),
            vec![EditorEvent::SelectionCleared {
                previous: ids[..2].to_vec()
            }]
        );

        let mut history = History::new();
        history.collect(&mut engine.scene_mut());
        assert_eq!(history.undo_description(), Some("Delete 2 objects"));
        assert!(history.undo(&mut engine.scene_mut()));
        assert_eq!(engine.scene().ids(), ids);
        assert_eq!(engine.delete_selected(), 0);
    }

    #[test]
    fn test_removed_object_is_deselected() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
        ]);
        engine.select_all();
        engine.poll_events();

        engine.scene_mut().remove(ids[0]);
        assert_eq!(engine.selected(), vec![ids[1]]);
        assert_eq!(
            engine.poll_events(),
            vec![EditorEvent::SelectionChanged {
                selection: vec![ids[1]]
            }]
        );

        engine.remove_object(ids[1]);
        assert!(engine.selected().is_empty());
        assert!(!engine.handles().is_visible());
        assert_eq!(
            engine.poll_events(),
            vec![EditorEvent::SelectionCleared {
                previous: vec![ids[1]]
            }]
        );
    }

    #[test]
    fn test_nudge_and_undo() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
        ]);
        assert!(!engine.nudge_selected(1.0, 0.0));
        engine.select_all();
        assert!(engine.nudge_selected(5.0, -2.0));
        assert_eq!(engine.scene().get(ids[1]).unwrap().position(), Point::new(25.0, -2.0));

        let mut history = History::new();
        history.collect(&mut engine.scene_mut());
        assert!(history.undo(&mut engine.scene_mut()));
        assert_eq!(engine.scene().get(ids[1]).unwrap().position(), Point::new(20.0, 0.0));
        let outline = engine.handles().outline().unwrap();
        assert_eq!(outline, Rect::new(0.0, 0.0, 30.0, 10.0));
    }

    #[test]
    fn test_selection_z_order() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0).with_z_index(1),
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0).with_z_index(2),
        ]);
        engine.select_only(&ids[..2]);
        assert!(engine.bring_selected_to_front());
        assert_eq!(engine.scene().stacking_order(), vec![ids[2], ids[0], ids[1]]);

        assert!(engine.send_selected_to_back());
        assert_eq!(engine.scene().stacking_order(), vec![ids[0], ids[1], ids[2]]);

        assert!(engine.move_selected_forward());
        assert_eq!(engine.scene().stacking_order(), vec![ids[2], ids[0], ids[1]]);
        assert!(engine.move_selected_backward());
        assert_eq!(engine.scene().stacking_order(), vec![ids[0], ids[1], ids[2]]);

        let actions = engine.scene_mut().take_actions();
        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0].description(), "Bring to front");
    }

    #[test]
    fn test_cleared_selection_keeps_stacking_order() {
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0).with_z_index(2),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(40.0, 0.0, 10.0, 10.0).with_z_index(1),
        ]);
        engine.select_all();
        engine.poll_events();

        {
            let mut scene = engine.scene_mut();
            for &id in &ids {
                scene.remove(id);
            }
        }
        assert_eq!(
            engine.poll_events(),
            vec![EditorEvent::SelectionCleared {
                previous: vec![ids[1], ids[2], ids[0]]
            }]
        );
    }

    #[test]
    fn test_removal_during_drag_is_undone_separately() {
        init();
        let (mut engine, ids) = engine_with(vec![
            SceneObject::rectangle(0.0, 0.0, 10.0, 10.0),
            SceneObject::rectangle(20.0, 0.0, 10.0, 10.0),
        ]);
        let transform = IdentityTransform;
        engine.handle_pointer(PointerEvent::down(Point::new(5.0, 5.0)), &transform);
        engine.scene_mut().remove(ids[1]);
        engine.handle_pointer(PointerEvent::moved(Point::new(15.0, 5.0)), &transform);
        engine.handle_pointer(PointerEvent::up(Point::new(15.0, 5.0)), &transform);

        let mut history = History::new();
        history.collect(&mut engine.scene_mut());
        assert_eq!(history.undo_description(), Some("Move object"));
        assert!(history.undo(&mut engine.scene_mut()));
        assert_eq!(engine.scene().get(ids[0]).unwrap().x(), 0.0);
        assert!(!engine.scene().contains(ids[1]));

        assert_eq!(history.undo_description(), Some("Remove object"));
        assert!(history.undo(&mut engine.scene_mut()));
        assert!(engine.scene().contains(ids[1]));
    }
}
