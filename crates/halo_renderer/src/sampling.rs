//! Random sampling helpers.
//!
//! Every function takes the caller's generator explicitly. Each render worker
//! owns its own `RngCore`, so nothing here touches shared state.
//!
//! Directions returned by the `*_direction` helpers are in a local frame
//! whose +Z axis is the distribution's pole; map them with [`halo_math::Onb`].

use halo_math::{Vec2, Vec3};
use rand::{Rng, RngCore};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform float in [min, max).
#[inline]
pub fn gen_range_f32(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// True with probability `p_true`.
#[inline]
pub fn gen_bool(rng: &mut dyn RngCore, p_true: f32) -> bool {
    gen_f32(rng) < p_true
}

/// Uniformly distributed unit vector on the sphere (rejection sampling).
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Shirley-Chiu concentric mapping of the unit square onto the unit disk.
///
/// Preserves relative area, so uniform `(u1, u2)` give uniform disk points
/// without the clumping of the polar mapping.
pub fn concentric_sample_disk(u1: f32, u2: f32) -> Vec2 {
    let offset = Vec2::new(2.0 * u1 - 1.0, 2.0 * u2 - 1.0);
    if offset.x == 0.0 && offset.y == 0.0 {
        return Vec2::ZERO;
    }

    let (r, theta) = if offset.x.abs() > offset.y.abs() {
        (offset.x, FRAC_PI_4 * (offset.y / offset.x))
    } else {
        (offset.y, FRAC_PI_2 - FRAC_PI_4 * (offset.x / offset.y))
    };
    r * Vec2::new(theta.cos(), theta.sin())
}

/// Cosine-weighted direction about +Z: a concentric disk sample lifted onto
/// the hemisphere (Malley's method). Density is `cos(theta) / PI`.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let d = concentric_sample_disk(gen_f32(rng), gen_f32(rng));
    let z = (1.0 - d.length_squared()).max(0.0).sqrt();
    Vec3::new(d.x, d.y, z)
}

/// Uniform direction on the +Z hemisphere. Density is `1 / (2 PI)`.
pub fn random_hemisphere_direction(rng: &mut dyn RngCore) -> Vec3 {
    let z = gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform direction on the whole sphere. Density is `1 / (4 PI)`.
pub fn random_sphere_direction(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Direction about +Z distributed as `cos^n(alpha)` (Phong lobe).
/// Density is `(n + 1) cos^n(alpha) / (2 PI)`.
pub fn random_phong_lobe_direction(rng: &mut dyn RngCore, exponent: f32) -> Vec3 {
    let cos_alpha = gen_f32(rng).powf(1.0 / (exponent + 1.0));
    let sin_alpha = (1.0 - cos_alpha * cos_alpha).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(sin_alpha * phi.cos(), sin_alpha * phi.sin(), cos_alpha)
}

/// Uniform direction inside the cone subtended by a sphere of `radius`
/// seen from `distance_squared` away, about +Z.
/// Density is `1 / (2 PI (1 - cos_theta_max))`.
pub fn random_to_sphere(rng: &mut dyn RngCore, radius: f32, distance_squared: f32) -> Vec3 {
    let cos_theta_max = (1.0 - radius * radius / distance_squared).max(0.0).sqrt();
    let z = 1.0 + gen_f32(rng) * (cos_theta_max - 1.0);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Mirror `v` about the normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
