//! Sphere primitive for ray tracing.

use crate::hittable::{HitRecord, Hittable, MaterialId};
use crate::sampling::{random_sphere_direction, random_to_sphere};
use halo_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere. A non-positive or non-finite radius gives a
    /// degenerate sphere that is never hit and never sampled.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> Self {
        let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y, phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        if self.radius <= 0.0 {
            return None;
        }

        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Nearest root in range, else the far root
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            Self::get_sphere_uv(outward_normal),
            self.material,
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }

    /// Uniform density over the cone the sphere subtends from `origin`.
    /// From inside the sphere every direction hits it, so the density is
    /// uniform over the whole sphere of directions.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        let distance_squared = (self.center - origin).length_squared();
        let radius_squared = self.radius * self.radius;
        if distance_squared <= radius_squared {
            return 1.0 / (4.0 * PI);
        }

        if self.hit(&Ray::new_simple(origin, direction), Interval::new(0.001, f32::INFINITY)).is_none() {
            return 0.0;
        }

        let cos_theta_max = (1.0 - radius_squared / distance_squared).max(0.0).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        if solid_angle <= 0.0 {
            return 0.0;
        }
        1.0 / solid_angle
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        if distance_squared <= self.radius * self.radius {
            return random_sphere_direction(rng);
        }
        Onb::from_w(direction).to_world(random_to_sphere(rng, self.radius, distance_squared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::random_unit_vector;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_sphere() -> Sphere {
        Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, MaterialId::default())
    }

    #[test]
    fn test_sphere_hit() {
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = test_sphere().hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert!((rec.t - 0.5).abs() < 0.001);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_sphere_miss() {
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::Y);
        assert!(test_sphere().hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -1.0), Vec3::X);
        let rec = test_sphere().hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert!((rec.t - 0.5).abs() < 1e-5);
        assert!(!rec.front_face);
        // Reported normal opposes the ray even though the geometric normal is +X
        assert_eq!(rec.normal, -Vec3::X);
    }

    #[test]
    fn test_sphere_both_roots_out_of_range() {
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert!(test_sphere().hit(&ray, Interval::new(0.001, 0.4)).is_none());
        assert!(test_sphere().hit(&ray, Interval::new(1.6, 10.0)).is_none());
    }

    #[test]
    fn test_sphere_hit_point_lies_on_surface() {
        let mut rng = StdRng::seed_from_u64(7);
        let sphere = Sphere::new(Vec3::new(1.0, -2.0, 3.0), 1.5, MaterialId::default());

        for _ in 0..1000 {
            let origin = random_unit_vector(&mut rng) * 6.0 + sphere.center();
            let target = sphere.center() + random_unit_vector(&mut rng) * 1.2;
            let ray = Ray::new_simple(origin, target - origin);
            let rec = sphere.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

            let dist = (ray.at(rec.t) - sphere.center()).length();
            assert!((dist - sphere.radius()).abs() < 1e-4 * sphere.radius());
            assert!((rec.normal.length() - 1.0).abs() < 1e-4);
            assert!(rec.normal.dot(ray.direction()) < 0.0);
        }
    }

    #[test]
    fn test_sphere_cone_sampling_hits_sphere() {
        let mut rng = StdRng::seed_from_u64(11);
        let sphere = test_sphere();
        let origin = Vec3::new(0.0, 3.0, 0.0);

        for _ in 0..200 {
            let dir = sphere.sample_direction(origin, &mut rng);
            assert!(sphere.pdf_value(origin, dir) > 0.0);
        }
        assert_eq!(sphere.pdf_value(origin, Vec3::Y), 0.0);
    }

    #[test]
    fn test_degenerate_sphere_is_never_hit() {
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let range = Interval::new(0.001, f32::INFINITY);

        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let sphere = Sphere::new(Vec3::new(0.0, 0.0, -2.0), radius, MaterialId::default());
            assert_eq!(sphere.radius(), 0.0);
            assert!(sphere.hit(&ray, range).is_none());
            assert_eq!(sphere.pdf_value(Vec3::ZERO, -Vec3::Z), 0.0);
            assert_eq!(sphere.pdf_value(Vec3::new(0.0, 0.0, -2.0), Vec3::X), 0.0);
        }
    }
}
