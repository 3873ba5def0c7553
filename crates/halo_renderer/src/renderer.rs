//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive radiance estimation with a scatter-depth limit
//! - Mixture sampling of light sources and material lobes
//! - Gamma correction and 8-bit quantization for output

use crate::error::{Error, Result};
use crate::hittable::Hittable;
use crate::pdf::Pdf;
use crate::{Camera, Color, Scene};
use halo_math::{Interval, Ray};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::ops::AddAssign;
use std::path::Path;

/// Near limit for secondary rays, so a surface does not re-hit itself.
pub const RAY_T_MIN: f32 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of scattering events along a path
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Whether to use sky gradient instead of solid background
    pub use_sky_gradient: bool,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Base seed for the per-bucket generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            use_sky_gradient: false,
            bucket_size: 64,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.samples_per_pixel == 0 {
            return Err(Error::InvalidInput("samples_per_pixel must be at least 1".into()));
        }
        if self.bucket_size == 0 {
            return Err(Error::InvalidInput("bucket_size must be at least 1".into()));
        }
        if !self.background.is_finite() {
            return Err(Error::InvalidInput(format!("background {} is not finite", self.background)));
        }
        Ok(())
    }
}

/// Counters gathered while rendering, returned alongside the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Camera rays generated
    pub primary_rays: u64,
    /// Every ray intersected against the scene, primary ones included
    pub rays_traced: u64,
    /// Samples that carried NaN or infinite components
    pub sanitized_samples: u64,
}

impl AddAssign for RenderStats {
    fn add_assign(&mut self, other: Self) {
        self.primary_rays += other.primary_rays;
        self.rays_traced += other.rays_traced;
        self.sanitized_samples += other.sanitized_samples;
    }
}

/// Compute the radiance arriving along `ray`.
///
/// `depth` is the number of scattering events still allowed. At zero the
/// surface hit still contributes its emission but the path stops there.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    stats: &mut RenderStats,
) -> Color {
    stats.rays_traced += 1;

    let Some(rec) = scene.world().hit(ray, Interval::new(RAY_T_MIN, f32::INFINITY)) else {
        return background(ray, config);
    };

    let material = scene.material(rec.material);
    let emission = material.emitted(&rec);
    if depth == 0 {
        return emission;
    }

    let Some(scatter) = material.scatter(ray, &rec, rng) else {
        return emission;
    };

    // Delta lobes have no density; carry the attenuation straight through
    let Some(surface_pdf) = scatter.pdf else {
        let incoming = ray_color(&scatter.scattered, scene, depth - 1, config, rng, stats);
        return emission + scatter.attenuation * incoming;
    };

    let pdf: Pdf<'_> = if scene.lights().is_empty() {
        surface_pdf
    } else {
        Pdf::mixture(Pdf::primitive(scene.lights(), rec.p), surface_pdf)
    };

    let scattered = Ray::new(rec.p, pdf.sample(rng), ray.time());
    let density = pdf.density(scattered.direction());
    if density <= 0.0 {
        return emission;
    }

    let brdf = material.brdf(ray, &rec, &scattered);
    if brdf == Color::ZERO {
        return emission;
    }

    let incoming = ray_color(&scattered, scene, depth - 1, config, rng, stats);
    emission + brdf * incoming / density
}

fn background(ray: &Ray, config: &RenderConfig) -> Color {
    if config.use_sky_gradient {
        sky_gradient(ray)
    } else {
        config.background
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Replace NaN and infinite components with zero.
///
/// Returns the cleaned color and whether anything was replaced.
#[inline]
pub fn sanitize(color: Color) -> (Color, bool) {
    if color.is_finite() {
        return (color, false);
    }
    let clean = Color::new(
        if color.x.is_finite() { color.x } else { 0.0 },
        if color.y.is_finite() { color.y } else { 0.0 },
        if color.z.is_finite() { color.z } else { 0.0 },
    );
    (clean, true)
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    stats: &mut RenderStats,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        stats.primary_rays += 1;

        let (sample, replaced) = sanitize(ray_color(&ray, scene, config.max_depth, config, rng, stats));
        if replaced {
            stats.sanitized_samples += 1;
        }
        pixel_color += sample;
    }

    pixel_color / samples as f32
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize one linear channel: `floor(256 * clamp(sqrt(c), 0, 0.999))`.
#[inline]
fn quantize(linear: f32) -> u8 {
    (256.0 * linear_to_gamma(linear).clamp(0.0, 0.999)) as u8
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Row-major gamma-corrected RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    /// Write as plain-text PPM (P3), rows top to bottom.
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;
        for color in &self.pixels {
            let [r, g, b] = color_to_rgb8(*color);
            writeln!(writer, "{r} {g} {b}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Save to `path`; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = image::RgbImage::from_raw(self.width, self.height, self.to_rgb8())
            .ok_or_else(|| Error::InvalidInput(format!("{}x{} buffer does not match its pixels", self.width, self.height)))?;
        image.save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, Primitive, SceneBuilder, Sphere};
    use halo_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let up_color = sky_gradient(&up_ray);

        // Ray pointing down should be more white (more red)
        let down_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 0.0);
        let down_color = sky_gradient(&down_ray);

        assert!(
            up_color.x < down_color.x,
            "up_color.x={} should be < down_color.x={}",
            up_color.x,
            down_color.x
        );
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(100.0)), [255, 255, 255]);
        // sqrt(0.25) = 0.5, 256 * 0.5 = 128
        assert_eq!(color_to_rgb8(Color::splat(0.25)), [128, 128, 128]);
        assert_eq!(color_to_rgb8(Color::new(-1.0, f32::NAN, 0.0)), [0, 0, 0]);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(Color::ONE), (Color::ONE, false));
        let (clean, replaced) = sanitize(Color::new(f32::NAN, 0.5, f32::INFINITY));
        assert!(replaced);
        assert_eq!(clean, Color::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_empty_scene_returns_background() {
        let scene = SceneBuilder::new().build().unwrap();
        let config = RenderConfig {
            background: Color::new(0.2, 0.3, 0.4),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut stats = RenderStats::default();

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::X);
        let color = ray_color(&ray, &scene, config.max_depth, &config, &mut rng, &mut stats);
        assert_eq!(color, config.background);
        assert_eq!(stats.rays_traced, 1);
    }

    #[test]
    fn test_depth_zero_returns_emission_only() {
        let mut builder = SceneBuilder::new();
        let light = builder.add_material(Material::diffuse_light(Color::splat(3.0)));
        builder.add_light(Primitive::from(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, light)));
        let scene = builder.build().unwrap();

        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut stats = RenderStats::default();

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert_eq!(ray_color(&ray, &scene, 0, &config, &mut rng, &mut stats), Color::splat(3.0));
        assert_eq!(stats.rays_traced, 1);
    }

    #[test]
    fn test_render_pixel() {
        let mut builder = SceneBuilder::new();
        let grey = builder.add_material(Material::diffuse(Color::new(0.5, 0.5, 0.5)));
        builder.add(Primitive::from(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey)));
        let scene = builder.build().unwrap();

        let mut camera = Camera::new().with_resolution(10, 10);
        camera.initialize();

        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 5,
            background: Color::new(0.5, 0.7, 1.0),
            ..Default::default()
        };

        let mut rng = StdRng::seed_from_u64(42);
        let mut stats = RenderStats::default();
        let color = render_pixel(&camera, &scene, 5, 5, &config, &mut rng, &mut stats);

        // Lit only by the background through a half-absorbing surface
        assert!(color.length() > 0.0);
        assert!(color.x < config.background.x);
        assert_eq!(stats.primary_rays, 4);
        assert!(stats.rays_traced > 4);
    }

    #[test]
    fn test_write_ppm() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(1, 0, Color::ONE);

        let mut out = Vec::new();
        image.write_ppm(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "P3\n2 1\n255\n0 0 0\n255 255 255\n");
    }

    #[test]
    fn test_render_config_from_partial_json() {
        let config: RenderConfig = serde_json::from_str(r#"{"samples_per_pixel": 8, "background": [1, 0, 0]}"#).unwrap();
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.background, Color::X);
        assert_eq!(config.max_depth, 50);
        assert!(config.validate().is_ok());

        let bad = RenderConfig {
            samples_per_pixel: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
