//! Combined world-space bounds of a set of objects.

use crate::object::{ObjectId, SceneObject};
use crate::scene::Scene;
use kurbo::Rect;

/// Union of the world bounds of `objects`, or `None` for an empty set.
pub fn combined_bounds<'a>(objects: impl IntoIterator<Item = &'a SceneObject>) -> Option<Rect> {
    objects
        .into_iter()
        .map(SceneObject::world_bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}

/// Combined bounds of the objects with the given ids. Missing ids are skipped.
pub fn bounds_of(scene: &Scene, ids: &[ObjectId]) -> Option<Rect> {
    combined_bounds(ids.iter().filter_map(|&id| scene.get(id)))
}
