//! Relative reordering by stacking key.
//!
//! Every key change goes through the scene's guarded setters, so each
//! operation is recorded as one undoable action.

use crate::object::ObjectId;
use crate::scene::Scene;

/// Put `id` above every other object.
pub fn bring_to_front(scene: &mut Scene, id: ObjectId) -> bool {
    if !scene.contains(id) {
        return false;
    }
    let z_index = scene.max_z_index().map_or(0, |max| max + 1);
    set_keys(scene, "Bring to front", &[(id, z_index)])
}

/// Put `id` below every other object.
pub fn send_to_back(scene: &mut Scene, id: ObjectId) -> bool {
    if !scene.contains(id) {
        return false;
    }
    let z_index = scene.min_z_index().map_or(0, |min| min - 1);
    set_keys(scene, "Send to back", &[(id, z_index)])
}

/// Swap stacking keys with the next object up. No-op at the top.
pub fn move_forward(scene: &mut Scene, id: ObjectId) -> bool {
    swap_with_neighbour(scene, id, 1, "Move forward")
}

/// Swap stacking keys with the next object down. No-op at the bottom.
pub fn move_backward(scene: &mut Scene, id: ObjectId) -> bool {
    swap_with_neighbour(scene, id, -1, "Move backward")
}

fn swap_with_neighbour(scene: &mut Scene, id: ObjectId, step: isize, description: &str) -> bool {
    let order = scene.stacking_order();
    let Some(position) = order.iter().position(|&other| other == id) else {
        return false;
    };
    let Some(neighbour) = position
        .checked_add_signed(step)
        .and_then(|index| order.get(index).copied())
    else {
        return false;
    };

    let (Some(own), Some(other)) = (scene.get(id), scene.get(neighbour)) else {
        return false;
    };
    let (own_z, other_z) = (own.z_index(), other.z_index());
    set_keys(scene, description, &[(id, other_z), (neighbour, own_z)])
}

fn set_keys(scene: &mut Scene, description: &str, keys: &[(ObjectId, i64)]) -> bool {
    scene.recorder_mut().begin_transaction();
    let mut changed = false;
    for &(id, z_index) in keys {
        if let Some(mut object) = scene.object_mut(id) {
            changed |= object.set_z_index(z_index);
        }
    }
    scene.recorder_mut().commit_transaction(description);
    changed
}
