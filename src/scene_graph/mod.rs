pub mod geometry;
pub mod object3d;
pub mod scene;
pub mod transform;

pub use geometry::{Geometry, GeometryId, Vertex};
pub use object3d::{Object3D, ObjectId};
pub use scene::Scene;
