use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use id_arena::Id;

use crate::math::{bounds::BoundingSphere, ray::Ray};

pub type GeometryId = Id<Geometry>;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Indexed triangle list in the owning node's local space.
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds: BoundingSphere,
}

impl Geometry {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounds = BoundingSphere::from_points(vertices.iter().map(|vertex| vertex.position));

        Self {
            name: name.into(),
            vertices,
            indices,
            bounds,
        }
    }

    /// Axis-aligned cube centered on the origin, four vertices per face so
    /// each face keeps a flat normal.
    pub fn cube(name: impl Into<String>, size: f32) -> Self {
        let half = size * 0.5;
        let normals = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for normal in normals {
            let u = normal.any_orthonormal_vector();
            let v = normal.cross(u);
            let base = vertices.len() as u32;

            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(Vertex {
                    position: (normal + u * su + v * sv) * half,
                    normal,
                });
            }

            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(name, vertices, indices)
    }

    pub fn uv_sphere(name: impl Into<String>, radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        for ring in 0..=rings {
            let theta = ring as f32 / rings as f32 * PI;
            for segment in 0..=segments {
                let phi = segment as f32 / segments as f32 * TAU;
                let normal = Vec3::new(
                    theta.sin() * phi.cos(),
                    theta.cos(),
                    theta.sin() * phi.sin(),
                );
                vertices.push(Vertex {
                    position: normal * radius,
                    normal,
                });
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::new(name, vertices, indices)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|triangle| {
            [
                self.vertices[triangle[0] as usize].position,
                self.vertices[triangle[1] as usize].position,
                self.vertices[triangle[2] as usize].position,
            ]
        })
    }

    /// Nearest hit along a ray given in this geometry's local space.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        self.bounds.intersect_ray(ray)?;

        self.triangles()
            .filter_map(|[a, b, c]| ray.intersect_triangle(a, b, c))
            .min_by(f32::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_flat_faces() {
        let cube = Geometry::cube("Cube", 2.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube
            .vertices
            .iter()
            .all(|v| (v.position.dot(v.normal) - 1.0).abs() < 1e-5));
        assert!((cube.bounds.radius - 3.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn cube_is_hit_on_near_face() {
        let cube = Geometry::cube("Cube", 2.0);
        let ray = Ray::new(Vec3::new(0.2, 0.3, 5.0), Vec3::NEG_Z);
        let t = cube.intersect_ray(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn sphere_is_hit_at_radius() {
        let sphere = Geometry::uv_sphere("Sphere", 1.0, 32, 16);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = sphere.intersect_ray(&ray).unwrap();
        // Tessellation puts the surface slightly inside the ideal sphere.
        assert!(t > 3.999 && t < 4.05, "t = {t}");
    }

    #[test]
    fn miss_is_none() {
        let sphere = Geometry::uv_sphere("Sphere", 1.0, 16, 8);
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(sphere.intersect_ray(&ray).is_none());
    }
}
