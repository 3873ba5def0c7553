use crate::Vec3;

/// Orthonormal basis built around a single direction.
///
/// `w` is the given direction; `u` and `v` complete a right-handed frame.
/// Used to map canonical (z-up) hemisphere samples onto a surface normal or
/// reflection vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    /// Build a basis whose `w` axis is `n` (normalized here).
    ///
    /// The helper axis is +Y unless `n` is nearly parallel to it, in which case
    /// +X is used, so the cross products below never degenerate.
    pub fn from_w(n: Vec3) -> Self {
        let w = n.normalize();
        let helper = if w.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
        let v = w.cross(helper).normalize();
        let u = v.cross(w);
        Self { u, v, w }
    }

    #[inline]
    pub fn u(&self) -> Vec3 {
        self.u
    }

    #[inline]
    pub fn v(&self) -> Vec3 {
        self.v
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Transform local coordinates `(a, b, c)` to world space.
    #[inline]
    pub fn local(&self, a: f32, b: f32, c: f32) -> Vec3 {
        a * self.u + b * self.v + c * self.w
    }

    /// Transform a local-space vector to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.local(local.x, local.y, local.z)
    }
}
