use glam::Vec3;

use crate::math::ray::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere centered on the bounding box of `points`, wide enough to hold all of them.
    pub fn from_points(points: impl IntoIterator<Item = Vec3> + Clone) -> BoundingSphere {
        let Some(aabb) = AABB::from_points(points.clone()) else {
            return BoundingSphere {
                center: Vec3::ZERO,
                radius: 0.0,
            };
        };

        let center = aabb.center();
        let radius = points
            .into_iter()
            .map(|point| point.distance(center))
            .fold(0.0, f32::max);

        BoundingSphere { center, radius }
    }

    /// Distance along the ray to the first surface crossing, or zero when the
    /// origin is inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let to_center = self.center - ray.origin;
        let along = to_center.dot(ray.direction);
        let distance_sq = to_center.length_squared() - along * along;
        let radius_sq = self.radius * self.radius;

        if distance_sq > radius_sq {
            return None;
        }

        let half_chord = (radius_sq - distance_sq).sqrt();
        let near = along - half_chord;
        let far = along + half_chord;

        if far < 0.0 {
            None
        } else if near < 0.0 {
            Some(0.0)
        } else {
            Some(near)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(point1: Vec3, point2: Vec3) -> AABB {
        let min = point1.min(point2);
        let max = point1.max(point2);
        AABB { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<AABB> {
        let mut points = points.into_iter();
        let first = points.next()?;

        Some(points.fold(AABB::new(first, first), |aabb, point| AABB {
            min: aabb.min.min(point),
            max: aabb.max.max(point),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_from_cube_corners() {
        let corners = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
        ];
        let sphere = BoundingSphere::from_points(corners);
        assert_eq!(sphere.center, Vec3::ZERO);
        assert!((sphere.radius - 3.0_f32.sqrt()).abs() < 1e-5);
        assert!(corners
            .iter()
            .all(|c| c.distance(sphere.center) <= sphere.radius + 1e-5));
    }

    #[test]
    fn empty_point_set_gives_degenerate_sphere() {
        let sphere = BoundingSphere::from_points(Vec::<Vec3>::new());
        assert_eq!(sphere.radius, 0.0);
    }

    #[test]
    fn ray_hits_sphere_front_surface() {
        let sphere = BoundingSphere {
            center: Vec3::new(0.0, 0.0, -5.0),
            radius: 1.0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let t = sphere.intersect_ray(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_from_inside_reports_zero() {
        let sphere = BoundingSphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(sphere.intersect_ray(&ray), Some(0.0));
    }

    #[test]
    fn ray_misses_sphere_behind_or_beside() {
        let sphere = BoundingSphere {
            center: Vec3::new(0.0, 0.0, 5.0),
            radius: 1.0,
        };
        assert!(sphere
            .intersect_ray(&Ray::new(Vec3::ZERO, Vec3::NEG_Z))
            .is_none());
        assert!(sphere
            .intersect_ray(&Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::Z))
            .is_none());
    }

    #[test]
    fn aabb_spans_its_points() {
        let aabb = AABB::from_points([Vec3::ZERO, Vec3::ONE, Vec3::new(-1.0, 0.5, 0.0)]).unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::new(0.0, 0.5, 0.5));
        assert!(AABB::from_points(std::iter::empty()).is_none());
    }
}
