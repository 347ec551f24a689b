use glam::{Vec2, Vec3};

use crate::camera::ArCamera;
use crate::input::Viewport;
use crate::math::ray::Ray;
use crate::scene_graph::{ObjectId, Scene};

/// One intersected object, at most one per object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub object: ObjectId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

/// Ray from the camera through a point given in normalized device coordinates.
pub fn ray_from_camera(scene: &Scene, camera: &ArCamera, ndc: Vec2) -> Ray {
    let origin = camera.world_position(scene);
    let through = camera.unproject(scene, ndc.extend(0.5));
    Ray::new(origin, through - origin)
}

/// Tests `ray` against every object with geometry at or below `start`.
/// Hits come back nearest first.
pub fn intersect_objects(scene: &Scene, ray: &Ray, start: ObjectId) -> Vec<Hit> {
    let mut hits: Vec<Hit> = scene
        .descendants(start)
        .into_iter()
        .filter_map(|object_id| intersect_object(scene, ray, object_id))
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

fn intersect_object(scene: &Scene, ray: &Ray, object_id: ObjectId) -> Option<Hit> {
    let geometry_id = scene.get_object(object_id)?.geometry_id?;
    let geometry = scene.get_geometry(geometry_id)?;

    let world = scene.world_matrix(object_id);
    if world.determinant().abs() < f32::EPSILON {
        return None;
    }

    let local_ray = ray.transform(&world.inverse());
    let t = geometry.intersect_ray(&local_ray)?;
    let point = world.transform_point3(local_ray.at(t));

    Some(Hit {
        object: object_id,
        distance: point.distance(ray.origin),
        point,
    })
}

/// Everything under a pixel, nearest first. An empty viewport picks nothing.
pub fn pick(scene: &Scene, camera: &ArCamera, viewport: Viewport, pixel: Vec2) -> Vec<Hit> {
    let Some(ndc) = viewport.to_ndc(pixel) else {
        return Vec::new();
    };

    let ray = ray_from_camera(scene, camera, ndc);
    intersect_objects(scene, &ray, scene.root())
}
