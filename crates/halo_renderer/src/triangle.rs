//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::hittable::{HitRecord, Hittable, MaterialId};
use crate::sampling::gen_f32;
use halo_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Determinants smaller than this mean the ray is parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    v0: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    /// Unit face normal, `edge1 x edge2` orientation
    normal: Vec3,
    area: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices. Counter-clockwise winding
    /// seen from the front face.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let cross = edge1.cross(edge2);

        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            edge1,
            edge2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bbox,
        }
    }

    pub fn area(&self) -> f32 {
        self.area
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let h = ray.direction().cross(self.edge2);
        let a = self.edge1.dot(h);

        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, (u, v), self.material))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        area_pdf_value(self, self.area, origin, direction)
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        // Uniform barycentrics via the square-root warp
        let su = gen_f32(rng).sqrt();
        let b1 = 1.0 - su;
        let b2 = gen_f32(rng) * su;
        let point = self.v0 + b1 * self.edge1 + b2 * self.edge2;
        point - origin
    }
}

/// Solid-angle density of uniformly sampling a flat surface of `area`,
/// evaluated at `direction` from `origin`: `distance^2 / (cos * area)`.
pub(crate) fn area_pdf_value(shape: &dyn Hittable, area: f32, origin: Vec3, direction: Vec3) -> f32 {
    let Some(rec) = shape.hit(&Ray::new_simple(origin, direction), Interval::new(0.001, f32::INFINITY)) else {
        return 0.0;
    };

    let length_squared = direction.length_squared();
    let distance_squared = rec.t * rec.t * length_squared;
    let cosine = (direction.dot(rec.normal) / length_squared.sqrt()).abs();
    if cosine <= 0.0 || area <= 0.0 {
        return 0.0;
    }

    distance_squared / (cosine * area)
}
