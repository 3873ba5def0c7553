//! Hittable trait, HitRecord, and the linear-scan HittableList.

use crate::Primitive;
use crate::sampling::gen_f32;
use halo_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Handle to a material in the scene's material arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(u32);

impl MaterialId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the material in the scene arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal, always opposing the incident ray
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: MaterialId,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front (outward) face of the surface
    pub front_face: bool,
}

impl HitRecord {
    /// Build a record for a hit at `t`, orienting `outward_normal` against the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, (u, v): (f32, f32), material: MaterialId) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so `front_face` records which side was hit.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Capability shared by every primitive, group and acceleration structure.
///
/// Implementors are immutable after construction and shared read-only
/// between render threads.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray` whose parameter lies in `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord>;

    /// Axis-aligned bounds, or `None` for an empty aggregate.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Solid-angle density of [`Hittable::sample_direction`] from `origin`
    /// evaluated at `direction`. Zero for surfaces that cannot be sampled.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f32 {
        0.0
    }

    /// Direction from `origin` toward a random point on the surface.
    fn sample_direction(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// An unordered list of primitives, intersected by linear scan.
///
/// Also acts as a single compound light: its density is the average of the
/// children's densities and sampling picks a child uniformly.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Arc<Primitive>>,
    bbox: Option<Aabb>,
}

impl HittableList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Arc<Primitive>>) {
        let object = object.into();
        if let Some(b) = object.bounding_box() {
            self.bbox = Some(match self.bbox {
                Some(acc) => acc.union(&b),
                None => b,
            });
        }
        self.objects.push(object);
    }

    /// The objects in insertion order.
    pub fn objects(&self) -> &[Arc<Primitive>] {
        &self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<Arc<Primitive>> for HittableList {
    fn from_iter<I: IntoIterator<Item = Arc<Primitive>>>(iter: I) -> Self {
        let mut list = Self::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;

        for object in &self.objects {
            let max = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(max)) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.objects.iter().map(|o| o.pdf_value(origin, direction)).sum();
        sum / self.objects.len() as f32
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let n = self.objects.len();
        let index = ((gen_f32(rng) * n as f32) as usize).min(n - 1);
        self.objects[index].sample_direction(origin, rng)
    }
}
