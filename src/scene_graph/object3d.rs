use glam::Vec3;
use id_arena::Id;

use crate::scene_graph::geometry::GeometryId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    /// Nodes without geometry are never drawn or picked.
    pub geometry_id: Option<GeometryId>,
    pub color: Vec3,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_geometry(mut self, geometry_id: GeometryId, color: Vec3) -> Self {
        self.geometry_id = Some(geometry_id);
        self.color = color;
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.set_translation(translation);
        self
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            geometry_id: None,
            color: Vec3::ONE,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
