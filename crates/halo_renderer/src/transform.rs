//! Instancing decorators: translation, rotation and face flipping.
//!
//! Each wrapper moves the incoming ray into the wrapped primitive's object
//! space, delegates, and moves the hit back into world space.

use crate::hittable::{HitRecord, Hittable};
use crate::Primitive;
use halo_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Offsets a shared primitive by a fixed vector.
pub struct Translate {
    object: Arc<Primitive>,
    offset: Vec3,
    bbox: Option<Aabb>,
}

impl Translate {
    pub fn new(object: impl Into<Arc<Primitive>>, offset: Vec3) -> Self {
        let object = object.into();
        let bbox = object.bounding_box().map(|b| b.translate(offset));
        Self { object, offset, bbox }
    }
}

impl Hittable for Translate {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let mut rec = self.object.hit(&moved, ray_t)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin - self.offset, direction)
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.sample_direction(origin - self.offset, rng)
    }
}

/// Rotates a shared primitive about one of the coordinate axes.
///
/// Positive angles are counter-clockwise looking down the axis toward the
/// origin (right-handed). `sin`/`cos` are computed once.
pub struct Rotate {
    object: Arc<Primitive>,
    axis: Axis,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Option<Aabb>,
}

impl Rotate {
    pub fn new(object: impl Into<Arc<Primitive>>, axis: Axis, degrees: f32) -> Self {
        let object = object.into();
        let (sin_theta, cos_theta) = degrees.to_radians().sin_cos();

        let mut rotate = Self {
            object,
            axis,
            sin_theta,
            cos_theta,
            bbox: None,
        };
        rotate.bbox = rotate.object.bounding_box().map(|b| rotate.world_bounds(&b));
        rotate
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Axis-aligned extent of the 8 rotated corners of `object_bbox`.
    fn world_bounds(&self, object_bbox: &Aabb) -> Aabb {
        let corners = object_bbox.corners().map(|c| self.to_world(c));
        let (lo, hi) = corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(lo, hi), &c| (lo.min(c), hi.max(c)));

        // The object box is already padded; avoid padding it a second time
        Aabb {
            x: Interval::new(lo.x, hi.x),
            y: Interval::new(lo.y, hi.y),
            z: Interval::new(lo.z, hi.z),
        }
    }

    #[inline]
    fn rotate(&self, p: Vec3, sin_theta: f32) -> Vec3 {
        let (a_axis, b_axis) = self.axis.others();
        let (a, b) = (p[a_axis.index()], p[b_axis.index()]);
        let mut out = p;
        out[a_axis.index()] = self.cos_theta * a - sin_theta * b;
        out[b_axis.index()] = sin_theta * a + self.cos_theta * b;
        out
    }

    #[inline]
    fn to_world(&self, p: Vec3) -> Vec3 {
        self.rotate(p, self.sin_theta)
    }

    #[inline]
    fn to_object(&self, p: Vec3) -> Vec3 {
        self.rotate(p, -self.sin_theta)
    }
}

impl Hittable for Rotate {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let local = Ray::new(self.to_object(ray.origin()), self.to_object(ray.direction()), ray.time());
        let mut rec = self.object.hit(&local, ray_t)?;
        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(self.to_object(origin), self.to_object(direction))
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.to_world(self.object.sample_direction(self.to_object(origin), rng))
    }
}

/// Swaps which side of the wrapped surface counts as its front face.
///
/// The reported normal still opposes the incident ray; only `front_face`
/// changes. Used to point one-sided emitters the other way.
pub struct FlipFace {
    object: Arc<Primitive>,
}

impl FlipFace {
    pub fn new(object: impl Into<Arc<Primitive>>) -> Self {
        Self { object: object.into() }
    }
}

impl Hittable for FlipFace {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut rec = self.object.hit(ray, ray_t)?;
        rec.front_face = !rec.front_face;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.object.bounding_box()
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin, direction)
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.sample_direction(origin, rng)
    }
}
