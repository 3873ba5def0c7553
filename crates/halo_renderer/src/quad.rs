//! General planar parallelogram.

use crate::error::{Error, Result};
use crate::hittable::{HitRecord, Hittable, MaterialId};
use crate::sampling::gen_f32;
use crate::triangle::area_pdf_value;
use halo_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Parallelogram spanned by `u` and `v` from corner `q`.
///
/// The front face is on the side of `u x v`.
#[derive(Debug, Clone)]
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` with `n = u x v`, maps plane offsets to (alpha, beta)
    w: Vec3,
    normal: Vec3,
    /// Plane constant: `normal . x = d` for points on the plane
    d: f32,
    area: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Quad {
    /// Create a quad. Fails if `u` and `v` are parallel or zero.
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: MaterialId) -> Result<Self> {
        let n = u.cross(v);
        let n_len_sq = n.length_squared();
        if !(n_len_sq > 0.0) || !n_len_sq.is_finite() {
            return Err(Error::InvalidInput(format!(
                "quad edges {u} and {v} do not span a plane"
            )));
        }

        let normal = n.normalize();
        let bbox = Aabb::from_point_cloud([q, q + u, q + v, q + u + v])
            .unwrap_or(Aabb::from_points(q, q + u + v));

        Ok(Self {
            q,
            u,
            v,
            w: n / n_len_sq,
            normal,
            d: normal.dot(q),
            area: n_len_sq.sqrt(),
            material,
            bbox,
        })
    }

    pub fn area(&self) -> f32 {
        self.area
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(ray.direction());
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        // Planar coordinates of the hit in the (u, v) basis
        let planar = ray.at(t) - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));
        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, (alpha, beta), self.material))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        area_pdf_value(self, self.area, origin, direction)
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tilted_quad() -> Quad {
        Quad::new(
            Vec3::new(-1.0, -1.0, -3.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, -1.0),
            MaterialId::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_quad_hit_center() {
        let quad = tilted_quad();
        // Center of the quad is q + (u + v) / 2 = (0, 0, -3.5)
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = quad.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();

        assert!((rec.t - 3.5).abs() < 1e-5);
        assert!((rec.u - 0.5).abs() < 1e-5);
        assert!((rec.v - 0.5).abs() < 1e-5);
        assert!(rec.normal.dot(ray.direction()) < 0.0);
    }

    #[test]
    fn test_quad_outside_parallelogram() {
        let quad = tilted_quad();
        let ray = Ray::new_simple(Vec3::new(1.5, 0.0, 0.0), -Vec3::Z);
        assert!(quad.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_quad_rejects_parallel_edges() {
        let result = Quad::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, MaterialId::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_quad_area_and_sampling() {
        let quad = Quad::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.0), MaterialId::default()).unwrap();
        assert!((quad.area() - 4.0).abs() < 1e-6);

        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let dir = quad.sample_direction(Vec3::ZERO, &mut rng);
            assert!(quad.pdf_value(Vec3::ZERO, dir) > 0.0);
        }
        assert!((quad.pdf_value(Vec3::ZERO, Vec3::Y) - 1.0).abs() < 1e-4);
    }
}
