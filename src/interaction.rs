//! Moving entity meshes between the world root and the camera node.

use glam::Vec3;

use crate::config::PickPolicy;
use crate::entity::{owning_entity, Entity};
use crate::picking::Hit;
use crate::scene_graph::{ObjectId, Scene};

/// Snaps every entity under `hits` onto the camera at `held_offset`.
/// Returns the indices of the entities now held, in hit order.
pub fn attach_hits(
    scene: &mut Scene,
    camera_node: ObjectId,
    entities: &mut [Entity],
    hits: &[Hit],
    policy: PickPolicy,
    held_offset: Vec3,
) -> Vec<usize> {
    let considered = match policy {
        PickPolicy::AllHits => hits,
        PickPolicy::Nearest => &hits[..hits.len().min(1)],
    };

    let mut attached = Vec::new();

    for hit in considered {
        let Some(index) = owning_entity(scene, entities, hit.object) else {
            log::debug!("Ignoring hit on {:?}, not part of any entity", hit.object);
            continue;
        };

        if attached.contains(&index) {
            continue;
        }

        let entity = &mut entities[index];
        if !scene.set_object_parent(entity.mesh, Some(camera_node)) {
            continue;
        }

        scene.set_object_translation(entity.mesh, held_offset);
        entity.moved = true;
        attached.push(index);

        log::debug!("Picked up {:?} at distance {:.3}", entity.kind, hit.distance);
    }

    attached
}

/// Puts every held entity back under the world root where the camera is
/// currently holding it. Only the position is carried over; rotation and
/// scale keep their local values. Returns the indices of released entities.
pub fn release_all(scene: &mut Scene, camera_node: ObjectId, entities: &mut [Entity]) -> Vec<usize> {
    let root = scene.root();
    let mut released = Vec::new();

    for (index, entity) in entities.iter_mut().enumerate() {
        if !entity.moved {
            continue;
        }

        let held_at = scene
            .get_object_transform(entity.mesh)
            .map(|transform| transform.translation())
            .unwrap_or(Vec3::ZERO);
        let world_position = scene.local_to_world(camera_node, held_at);

        scene.set_object_parent(entity.mesh, Some(root));
        scene.set_object_translation(entity.mesh, world_position);
        entity.moved = false;
        released.push(index);

        log::debug!("Released {:?} at {}", entity.kind, world_position);
    }

    released
}
