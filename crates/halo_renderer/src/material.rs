//! Surface scattering models.
//!
//! A material answers three questions at a hit: where the path goes next
//! ([`Material::scatter`]), how much light it carries back along that
//! direction ([`Material::brdf`], cosine term included), and how much it
//! emits on its own ([`Material::emitted`]).

use crate::error::{Error, Result};
use crate::hittable::HitRecord;
use crate::pdf::Pdf;
use crate::sampling::{random_unit_vector, reflect};
use halo_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Color type alias (linear RGB, unbounded above for emitters)
pub type Color = Vec3;

/// Outcome of a successful scatter.
pub struct ScatterResult {
    /// A direction drawn from the material's own distribution
    pub scattered: Ray,
    /// Throughput applied directly when `pdf` is `None`
    pub attenuation: Color,
    /// Sampling distribution, or `None` for a delta (mirror-like) lobe
    pub pdf: Option<Pdf<'static>>,
}

/// The closed set of surface models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Material {
    /// Lambertian reflector.
    Diffuse { albedo: Color },

    /// Mirror, optionally blurred by perturbing the reflection by
    /// `glossy_fraction` times a random unit vector.
    Specular {
        albedo: Color,
        #[serde(default)]
        glossy_fraction: f32,
    },

    /// Diffuse plus Phong specular lobe. `diffuse_probability` is the share
    /// of samples drawn from the cosine lobe.
    Phong {
        kd: Color,
        ks: Color,
        exponent: f32,
        #[serde(default = "default_diffuse_probability")]
        diffuse_probability: f32,
    },

    /// One-sided emitter. Never scatters.
    DiffuseLight { emit: Color },
}

fn default_diffuse_probability() -> f32 {
    0.5
}

impl Material {
    pub fn diffuse(albedo: Color) -> Self {
        Material::Diffuse { albedo }
    }

    /// Ideal mirror.
    pub fn mirror(albedo: Color) -> Self {
        Self::specular(albedo, 0.0)
    }

    pub fn specular(albedo: Color, glossy_fraction: f32) -> Self {
        Material::Specular {
            albedo,
            glossy_fraction: glossy_fraction.max(0.0),
        }
    }

    pub fn phong(kd: Color, ks: Color, exponent: f32) -> Self {
        Material::Phong {
            kd,
            ks,
            exponent: exponent.max(0.0),
            diffuse_probability: default_diffuse_probability(),
        }
    }

    pub fn diffuse_light(emit: Color) -> Self {
        Material::DiffuseLight { emit }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::DiffuseLight { .. })
    }

    /// Check parameters that deserialization does not clamp.
    ///
    /// Colors must be finite and non-negative, Phong exponents finite and
    /// non-negative, `diffuse_probability` within `[0, 1]` and
    /// `glossy_fraction` finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Material::Diffuse { albedo } => check_color("albedo", albedo),
            Material::Specular { albedo, glossy_fraction } => {
                check_color("albedo", albedo)?;
                if !(glossy_fraction.is_finite() && glossy_fraction >= 0.0) {
                    return Err(Error::InvalidInput(format!(
                        "glossy_fraction {glossy_fraction} must be finite and non-negative"
                    )));
                }
                Ok(())
            }
            Material::Phong {
                kd,
                ks,
                exponent,
                diffuse_probability,
            } => {
                check_color("kd", kd)?;
                check_color("ks", ks)?;
                if !(exponent.is_finite() && exponent >= 0.0) {
                    return Err(Error::InvalidInput(format!(
                        "phong exponent {exponent} must be finite and non-negative"
                    )));
                }
                if !(0.0..=1.0).contains(&diffuse_probability) {
                    return Err(Error::InvalidInput(format!(
                        "diffuse_probability {diffuse_probability} is outside [0, 1]"
                    )));
                }
                Ok(())
            }
            Material::DiffuseLight { emit } => check_color("emit", emit),
        }
    }

    /// Propose the next path segment, or `None` if the path is absorbed.
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        match *self {
            Material::Diffuse { albedo } => {
                let pdf = Pdf::cosine(rec.normal);
                let scattered = Ray::new(rec.p, pdf.sample(rng), ray_in.time());
                Some(ScatterResult {
                    scattered,
                    attenuation: albedo,
                    pdf: Some(pdf),
                })
            }

            Material::Specular { albedo, glossy_fraction } => {
                let mut direction = reflect(ray_in.direction().normalize(), rec.normal);
                if glossy_fraction > 0.0 {
                    direction += glossy_fraction * random_unit_vector(rng);
                }
                if direction.dot(rec.normal) <= 0.0 {
                    return None;
                }
                Some(ScatterResult {
                    scattered: Ray::new(rec.p, direction, ray_in.time()),
                    attenuation: albedo,
                    pdf: None,
                })
            }

            Material::Phong {
                kd,
                exponent,
                diffuse_probability,
                ..
            } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let pdf = Pdf::weighted_mixture(
                    Pdf::cosine(rec.normal),
                    Pdf::specular_lobe(reflected, exponent),
                    diffuse_probability,
                );
                let scattered = Ray::new(rec.p, pdf.sample(rng), ray_in.time());
                Some(ScatterResult {
                    scattered,
                    attenuation: kd,
                    pdf: Some(pdf),
                })
            }

            Material::DiffuseLight { .. } => None,
        }
    }

    /// Reflected radiance weight for light arriving along `scattered` and
    /// leaving toward `-ray_in`, times the cosine at the surface.
    ///
    /// Zero for delta lobes and emitters, which the integrator never asks.
    pub fn brdf(&self, ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> Color {
        let direction = scattered.direction().normalize_or_zero();
        let cos_theta = direction.dot(rec.normal);
        if cos_theta <= 0.0 {
            return Color::ZERO;
        }

        match *self {
            Material::Diffuse { albedo } => albedo * cos_theta / PI,

            Material::Phong { kd, ks, exponent, .. } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let cos_alpha = direction.dot(reflected).max(0.0);
                let specular = ks * (exponent + 2.0) / (2.0 * PI) * cos_alpha.powf(exponent);
                (kd / PI + specular) * cos_theta
            }

            Material::Specular { .. } | Material::DiffuseLight { .. } => Color::ZERO,
        }
    }

    /// Light emitted at the hit. Emitters only shine from their front face.
    pub fn emitted(&self, rec: &HitRecord) -> Color {
        match *self {
            Material::DiffuseLight { emit } if rec.front_face => emit,
            _ => Color::ZERO,
        }
    }
}

fn check_color(name: &str, color: Color) -> Result<()> {
    if !color.is_finite() || color.min_element() < 0.0 {
        return Err(Error::InvalidInput(format!("{name} {color} must be finite and non-negative")));
    }
    Ok(())
}
