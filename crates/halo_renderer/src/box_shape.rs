//! Axis-aligned box built from six rectangles.

use crate::error::{Error, Result};
use crate::hittable::{HitRecord, Hittable, HittableList, MaterialId};
use crate::{AxisRect, FlipFace, Primitive};
use halo_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::RngCore;

/// Axis-aligned box. Every face reports an outward-facing geometric normal.
pub struct BoxShape {
    min: Vec3,
    max: Vec3,
    sides: HittableList,
}

impl BoxShape {
    /// Box with opposite corners `a` and `b`, in any order.
    pub fn new(a: Vec3, b: Vec3, material: MaterialId) -> Result<Self> {
        let min = a.min(b);
        let max = a.max(b);
        if !(min.cmplt(max).all()) {
            return Err(Error::InvalidInput(format!("box corners {a} and {b} enclose no volume")));
        }

        let mut sides = HittableList::new();
        for axis in Axis::ALL {
            let (a_axis, b_axis) = axis.others();
            let a_range = (min[a_axis.index()], max[a_axis.index()]);
            let b_range = (min[b_axis.index()], max[b_axis.index()]);

            let far = AxisRect::new(axis, a_range, b_range, max[axis.index()], material)?;
            let near = AxisRect::new(axis, a_range, b_range, min[axis.index()], material)?;
            sides.add(Primitive::from(far));
            sides.add(Primitive::from(FlipFace::new(Primitive::from(near))));
        }

        Ok(Self { min, max, sides })
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }
}

impl Hittable for BoxShape {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.sides.hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(self.min, self.max))
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.sides.pdf_value(origin, direction)
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.sides.sample_direction(origin, rng)
    }
}
