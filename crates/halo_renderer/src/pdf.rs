//! Direction sampling strategies.
//!
//! A [`Pdf`] pairs `sample`, which draws a direction, with `density`, which
//! evaluates the solid-angle density of that same distribution at any
//! direction. The integrator weights each sample by `brdf / density`, so the
//! two must agree exactly. PDFs are built per bounce and dropped after it.

use crate::hittable::Hittable;
use crate::sampling::{
    gen_bool, random_cosine_direction, random_hemisphere_direction, random_phong_lobe_direction,
    random_sphere_direction,
};
use halo_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A direction distribution with a matching density.
pub enum Pdf<'a> {
    /// `cos(theta) / PI` about the basis `w` axis.
    Cosine(Onb),
    /// `1 / (2 PI)` over the hemisphere about `w`.
    UniformHemisphere(Onb),
    /// `1 / (4 PI)` over all directions.
    UniformSphere,
    /// `(n + 1) cos^n(alpha) / (2 PI)` about the reflection direction `w`.
    SpecularLobe { onb: Onb, exponent: f32 },
    /// Directions toward a primitive (or group of them) from `origin`.
    Primitive { target: &'a dyn Hittable, origin: Vec3 },
    /// Picks `a` with probability `weight_a`, otherwise `b`.
    Mixture {
        a: Box<Pdf<'a>>,
        b: Box<Pdf<'a>>,
        weight_a: f32,
    },
}

impl<'a> Pdf<'a> {
    pub fn cosine(normal: Vec3) -> Self {
        Pdf::Cosine(Onb::from_w(normal))
    }

    pub fn uniform_hemisphere(normal: Vec3) -> Self {
        Pdf::UniformHemisphere(Onb::from_w(normal))
    }

    pub fn specular_lobe(reflected: Vec3, exponent: f32) -> Self {
        Pdf::SpecularLobe {
            onb: Onb::from_w(reflected),
            exponent,
        }
    }

    pub fn primitive(target: &'a dyn Hittable, origin: Vec3) -> Self {
        Pdf::Primitive { target, origin }
    }

    /// Even 50/50 mixture.
    pub fn mixture(a: Pdf<'a>, b: Pdf<'a>) -> Self {
        Self::weighted_mixture(a, b, 0.5)
    }

    /// Mixture choosing `a` with probability `weight_a` (clamped to [0, 1]).
    pub fn weighted_mixture(a: Pdf<'a>, b: Pdf<'a>, weight_a: f32) -> Self {
        Pdf::Mixture {
            a: Box::new(a),
            b: Box::new(b),
            weight_a: weight_a.clamp(0.0, 1.0),
        }
    }

    /// Solid-angle density at `direction` (need not be normalized).
    pub fn density(&self, direction: Vec3) -> f32 {
        match self {
            Pdf::Cosine(onb) => {
                let cosine = direction.normalize_or_zero().dot(onb.w());
                cosine.max(0.0) / PI
            }
            Pdf::UniformHemisphere(onb) => {
                if direction.dot(onb.w()) > 0.0 {
                    1.0 / (2.0 * PI)
                } else {
                    0.0
                }
            }
            Pdf::UniformSphere => 1.0 / (4.0 * PI),
            Pdf::SpecularLobe { onb, exponent } => {
                let cos_alpha = direction.normalize_or_zero().dot(onb.w());
                if cos_alpha <= 0.0 {
                    return 0.0;
                }
                (exponent + 1.0) * cos_alpha.powf(*exponent) / (2.0 * PI)
            }
            Pdf::Primitive { target, origin } => target.pdf_value(*origin, direction),
            Pdf::Mixture { a, b, weight_a } => {
                weight_a * a.density(direction) + (1.0 - weight_a) * b.density(direction)
            }
        }
    }

    /// Draw a direction from this distribution.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Cosine(onb) => onb.to_world(random_cosine_direction(rng)),
            Pdf::UniformHemisphere(onb) => onb.to_world(random_hemisphere_direction(rng)),
            Pdf::UniformSphere => random_sphere_direction(rng),
            Pdf::SpecularLobe { onb, exponent } => onb.to_world(random_phong_lobe_direction(rng, *exponent)),
            Pdf::Primitive { target, origin } => target.sample_direction(*origin, rng),
            Pdf::Mixture { a, b, weight_a } => {
                if gen_bool(rng, *weight_a) {
                    a.sample(rng)
                } else {
                    b.sample(rng)
                }
            }
        }
    }
}
