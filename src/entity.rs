use glam::Vec3;

use crate::scene_graph::{Geometry, Object3D, ObjectId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Cube,
    Sphere,
}

/// A draggable object. `moved` is true exactly while `mesh` hangs off the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub mesh: ObjectId,
    pub moved: bool,
}

impl Entity {
    const CUBE_SIZE: f32 = 0.1;
    const SPHERE_RADIUS: f32 = 0.05;

    pub fn cube(scene: &mut Scene, translation: Vec3) -> Self {
        let geometry = scene.add_geometry(Geometry::cube("Moveable cube", Self::CUBE_SIZE));
        let root = scene.root();
        let mesh = scene.add_child(
            root,
            Object3D::named("Moveable cube")
                .with_geometry(geometry, Vec3::new(0.9, 0.35, 0.2))
                .with_translation(translation),
        );

        Self {
            kind: EntityKind::Cube,
            mesh,
            moved: false,
        }
    }

    pub fn sphere(scene: &mut Scene, translation: Vec3) -> Self {
        let geometry = scene.add_geometry(Geometry::uv_sphere(
            "Moveable sphere",
            Self::SPHERE_RADIUS,
            24,
            12,
        ));
        let root = scene.root();
        let mesh = scene.add_child(
            root,
            Object3D::named("Moveable sphere")
                .with_geometry(geometry, Vec3::new(0.2, 0.55, 0.95))
                .with_translation(translation),
        );

        Self {
            kind: EntityKind::Sphere,
            mesh,
            moved: false,
        }
    }

    /// The cube and the sphere, side by side half a metre in front of the start pose.
    pub fn spawn_defaults(scene: &mut Scene) -> Vec<Entity> {
        vec![
            Entity::cube(scene, Vec3::new(-0.1, 0.0, -0.5)),
            Entity::sphere(scene, Vec3::new(0.1, 0.0, -0.5)),
        ]
    }
}

/// Index of the entity whose mesh is `object_id` or one of its ancestors.
pub fn owning_entity(scene: &Scene, entities: &[Entity], object_id: ObjectId) -> Option<usize> {
    entities
        .iter()
        .position(|entity| scene.is_ancestor(entity.mesh, object_id))
}
