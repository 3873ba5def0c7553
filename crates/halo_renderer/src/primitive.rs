//! The closed set of scene primitives.
//!
//! Every concrete shape implements [`Hittable`]; `Primitive` wraps them in a
//! single enum so BVH leaves, groups and transform wrappers can hold any of
//! them behind an `Arc` without trait objects.

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::{AxisRect, BoxShape, BvhNode, FlipFace, Quad, Rotate, Sphere, Translate, Triangle};
use halo_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::RngCore;

/// Any object that can be placed in a scene.
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Rect(AxisRect),
    Quad(Quad),
    Box(BoxShape),
    Translate(Translate),
    Rotate(Rotate),
    FlipFace(FlipFace),
    List(HittableList),
    Bvh(BvhNode),
}

macro_rules! dispatch {
    ($self:ident, $p:ident => $e:expr) => {
        match $self {
            Primitive::Sphere($p) => $e,
            Primitive::Triangle($p) => $e,
            Primitive::Rect($p) => $e,
            Primitive::Quad($p) => $e,
            Primitive::Box($p) => $e,
            Primitive::Translate($p) => $e,
            Primitive::Rotate($p) => $e,
            Primitive::FlipFace($p) => $e,
            Primitive::List($p) => $e,
            Primitive::Bvh($p) => $e,
        }
    };
}

impl Primitive {
    /// Wrap in a [`Translate`].
    pub fn translated(self, offset: Vec3) -> Primitive {
        Translate::new(self, offset).into()
    }

    /// Wrap in a [`Rotate`] about `axis` by `degrees`.
    pub fn rotated(self, axis: Axis, degrees: f32) -> Primitive {
        Rotate::new(self, axis, degrees).into()
    }

    /// Wrap in a [`FlipFace`].
    pub fn flipped(self) -> Primitive {
        FlipFace::new(self).into()
    }

    /// Short variant name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Sphere(_) => "sphere",
            Primitive::Triangle(_) => "triangle",
            Primitive::Rect(_) => "rect",
            Primitive::Quad(_) => "quad",
            Primitive::Box(_) => "box",
            Primitive::Translate(_) => "translate",
            Primitive::Rotate(_) => "rotate",
            Primitive::FlipFace(_) => "flip_face",
            Primitive::List(_) => "list",
            Primitive::Bvh(_) => "bvh",
        }
    }
}

impl Hittable for Primitive {
    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        dispatch!(self, p => p.hit(ray, ray_t))
    }

    #[inline]
    fn bounding_box(&self) -> Option<Aabb> {
        dispatch!(self, p => p.bounding_box())
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        dispatch!(self, p => p.pdf_value(origin, direction))
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        dispatch!(self, p => p.sample_direction(origin, rng))
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Primitive {
                fn from(value: $ty) -> Self {
                    Primitive::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    Sphere(Sphere),
    Triangle(Triangle),
    Rect(AxisRect),
    Quad(Quad),
    Box(BoxShape),
    Translate(Translate),
    Rotate(Rotate),
    FlipFace(FlipFace),
    List(HittableList),
    Bvh(BvhNode),
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::MaterialId;

    #[test]
    fn test_primitive_dispatch_matches_shape() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -2.0), 1.0, MaterialId::default());
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let range = Interval::new(0.001, f32::INFINITY);

        let direct = sphere.hit(&ray, range);
        let wrapped = Primitive::from(sphere);
        assert_eq!(wrapped.hit(&ray, range), direct);
        assert_eq!(wrapped.kind(), "sphere");
    }

    #[test]
    fn test_primitive_combinators() {
        let p = Primitive::from(Sphere::new(Vec3::ZERO, 1.0, MaterialId::default()))
            .rotated(Axis::Z, 45.0)
            .translated(Vec3::new(0.0, 5.0, 0.0))
            .flipped();
        assert_eq!(p.kind(), "flip_face");

        let bbox = p.bounding_box().unwrap();
        assert!(bbox.y.contains(5.0));
        assert!(!bbox.y.contains(0.0));
    }
}
