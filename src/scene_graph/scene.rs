use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::scene_graph::geometry::{Geometry, GeometryId};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::transform::Transform;

/// Rooted node tree. Every node added through [`Scene::add_child`] hangs off
/// the world root, directly or indirectly.
pub struct Scene {
    pub objects: Arena<Object3D>,
    pub geometries: Arena<Geometry>,
    root: ObjectId,
}

impl Scene {
    pub fn new() -> Self {
        let mut objects = Arena::new();
        let root = objects.alloc(Object3D::named("World"));

        Self {
            objects,
            geometries: Arena::new(),
            root,
        }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn add_child(&mut self, parent_id: ObjectId, object: Object3D) -> ObjectId {
        let object_id = self.objects.alloc(object);
        self.set_object_parent(object_id, Some(parent_id));
        object_id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.alloc(geometry)
    }

    pub fn get_geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    pub fn parent_of(&self, object_id: ObjectId) -> Option<ObjectId> {
        self.objects.get(object_id).and_then(|object| object.parent_id)
    }

    /// True when `ancestor_id` is `object_id` itself or any node above it.
    pub fn is_ancestor(&self, ancestor_id: ObjectId, object_id: ObjectId) -> bool {
        let mut current = Some(object_id);
        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Depth-first list of `start` and everything below it.
    pub fn descendants(&self, start: ObjectId) -> Vec<ObjectId> {
        let mut visited = Vec::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            visited.push(id);
            stack.extend(object.child_ids.iter().rev().copied());
        }

        visited
    }

    /// World matrix composed from the current local transforms, independent
    /// of the cache refreshed by `late_update`.
    pub fn world_matrix(&self, object_id: ObjectId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(object_id);

        while let Some(id) = current {
            let Some(object) = self.objects.get(id) else {
                break;
            };
            matrix = object.transform.local_matrix() * matrix;
            current = object.parent_id;
        }

        matrix
    }

    pub fn local_to_world(&self, object_id: ObjectId, point: Vec3) -> Vec3 {
        self.world_matrix(object_id).transform_point3(point)
    }

    /// Updates cached world matrices in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self.objects.iter().filter_map(|(id, object)| {
            if object.parent_id.is_none() {
                Some(id)
            } else {
                None
            }
        });

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY, false);
        }
    }

    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        if let Some(object) = self.objects.get(object_id) {
            let changed = parent_changed || object.transform.is_world_dirty();
            if changed {
                let world_matrix = parent_world_matrix * object.transform.local_matrix();
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.cached_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix, changed);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships.
    /// Returns false, leaving the tree untouched, when the move would create a cycle.
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) -> bool {
        if let Some(new_parent_id) = new_parent_id {
            if self.is_ancestor(child_id, new_parent_id) {
                log::warn!("Refusing to parent {:?} under its own descendant", child_id);
                return false;
            }
        }

        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
        true
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_transform(
        &mut self,
        object_id: ObjectId,
        translation: Vec3,
        rotation: Quat,
        scale: f32,
    ) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_transform(translation, rotation, scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
