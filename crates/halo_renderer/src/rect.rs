//! Axis-aligned rectangles.

use crate::error::{Error, Result};
use crate::hittable::{HitRecord, Hittable, MaterialId};
use crate::sampling::gen_range_f32;
use crate::triangle::area_pdf_value;
use halo_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::RngCore;

/// A rectangle lying in the plane `coord[axis] = k`.
///
/// The two in-plane extents are stored for the remaining axes in the cyclic
/// order given by [`Axis::others`]. The outward normal is `+axis`; wrap in
/// [`crate::FlipFace`] for a rectangle facing the other way.
#[derive(Debug, Clone)]
pub struct AxisRect {
    axis: Axis,
    k: f32,
    a: Interval,
    b: Interval,
    material: MaterialId,
}

impl AxisRect {
    /// Rectangle normal to `axis` at `k`, spanning `a` and `b` along
    /// `axis.others()`. Ranges may be given in either order.
    pub fn new(axis: Axis, a: (f32, f32), b: (f32, f32), k: f32, material: MaterialId) -> Result<Self> {
        let a = Interval::new(a.0.min(a.1), a.0.max(a.1));
        let b = Interval::new(b.0.min(b.1), b.0.max(b.1));
        if !(a.size() > 0.0 && b.size() > 0.0) || !k.is_finite() {
            return Err(Error::InvalidInput(format!(
                "axis rectangle needs positive extents, got {:?} x {:?} at {k}",
                (a.min, a.max),
                (b.min, b.max)
            )));
        }
        Ok(Self { axis, k, a, b, material })
    }

    /// Rectangle with corners `p0` and `p1`. The two corners must agree on
    /// exactly one coordinate, which becomes the fixed plane.
    pub fn from_corners(p0: Vec3, p1: Vec3, material: MaterialId) -> Result<Self> {
        let shared: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|axis| p0[axis.index()] == p1[axis.index()])
            .collect();

        let &[axis] = shared.as_slice() else {
            return Err(Error::DegenerateRectangle { p0, p1 });
        };

        let (a_axis, b_axis) = axis.others();
        Self::new(
            axis,
            (p0[a_axis.index()], p1[a_axis.index()]),
            (p0[b_axis.index()], p1[b_axis.index()]),
            p0[axis.index()],
            material,
        )
    }

    /// Rectangle in the plane `z = k`.
    pub fn xy(x: (f32, f32), y: (f32, f32), k: f32, material: MaterialId) -> Result<Self> {
        Self::new(Axis::Z, x, y, k, material)
    }

    /// Rectangle in the plane `y = k`.
    pub fn xz(x: (f32, f32), z: (f32, f32), k: f32, material: MaterialId) -> Result<Self> {
        Self::new(Axis::Y, z, x, k, material)
    }

    /// Rectangle in the plane `x = k`.
    pub fn yz(y: (f32, f32), z: (f32, f32), k: f32, material: MaterialId) -> Result<Self> {
        Self::new(Axis::X, y, z, k, material)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn area(&self) -> f32 {
        self.a.size() * self.b.size()
    }

    fn point(&self, a: f32, b: f32) -> Vec3 {
        let (a_axis, b_axis) = self.axis.others();
        let mut p = Vec3::ZERO;
        p[self.axis.index()] = self.k;
        p[a_axis.index()] = a;
        p[b_axis.index()] = b;
        p
    }

    fn outward_normal(&self) -> Vec3 {
        let mut n = Vec3::ZERO;
        n[self.axis.index()] = 1.0;
        n
    }
}

impl Hittable for AxisRect {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let i = self.axis.index();
        // Division by a zero component yields inf/NaN, both rejected by `contains`
        let t = (self.k - ray.origin()[i]) / ray.direction()[i];
        if !ray_t.contains(t) {
            return None;
        }

        let (a_axis, b_axis) = self.axis.others();
        let p = ray.at(t);
        let a = p[a_axis.index()];
        let b = p[b_axis.index()];
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        let uv = ((a - self.a.min) / self.a.size(), (b - self.b.min) / self.b.size());
        let mut rec = HitRecord::new(ray, t, self.outward_normal(), uv, self.material);
        // Keep the hit exactly on the plane
        rec.p[i] = self.k;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::from_points(
            self.point(self.a.min, self.b.min),
            self.point(self.a.max, self.b.max),
        ))
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        area_pdf_value(self, self.area(), origin, direction)
    }

    fn sample_direction(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let a = gen_range_f32(rng, self.a.min, self.a.max);
        let b = gen_range_f32(rng, self.b.min, self.b.max);
        self.point(a, b) - origin
    }
}
