//! Camera for ray generation.

use crate::sampling::gen_f32;
use halo_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Pinhole camera for generating rays into the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CameraSettings", into = "CameraSettings")]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    /// Vertical field of view in degrees
    vfov: f32,

    // Cached computed values (set by initialize())
    center: Vec3,
    upper_left: Vec3,
    viewport_u: Vec3,
    viewport_v: Vec3,
    w: Vec3,
}

/// The user-facing part of a [`Camera`], as stored in scene files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    width: u32,
    height: u32,
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
        }
    }
}

impl From<CameraSettings> for Camera {
    fn from(s: CameraSettings) -> Self {
        let mut camera = Camera::new()
            .with_resolution(s.width, s.height)
            .with_position(s.look_from, s.look_at, s.vup)
            .with_fov(s.vfov);
        camera.initialize();
        camera
    }
}

impl From<Camera> for CameraSettings {
    fn from(c: Camera) -> Self {
        Self {
            width: c.image_width,
            height: c.image_height,
            look_from: c.look_from,
            look_at: c.look_at,
            vup: c.vup,
            vfov: c.vfov,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            // Cached values (initialized to defaults)
            center: Vec3::ZERO,
            upper_left: Vec3::ZERO,
            viewport_u: Vec3::ZERO,
            viewport_v: Vec3::ZERO,
            w: Vec3::Z,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.center = self.look_from;

        // Calculate viewport dimensions on the plane one unit ahead
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height.max(1) as f32);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(self.w).normalize();
        let v = self.w.cross(u);

        // Image rows run downward
        self.viewport_u = viewport_width * u;
        self.viewport_v = -viewport_height * v;

        self.upper_left = self.center - self.w - self.viewport_u / 2.0 - self.viewport_v / 2.0;
    }

    /// Ray through image-plane coordinates `(u, v)` in `[0, 1]`.
    ///
    /// `u` runs left to right and `v` top to bottom. Deterministic.
    pub fn ray_for(&self, u: f32, v: f32) -> Ray {
        let target = self.upper_left + u * self.viewport_u + v * self.viewport_v;
        Ray::new(self.center, target - self.center, 0.0)
    }

    /// Generate a ray for pixel (i, j) jittered within the pixel.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let u = (i as f32 + gen_f32(rng)) / self.image_width as f32;
        let v = (j as f32 + gen_f32(rng)) / self.image_height as f32;
        self.ray_for(u, v)
    }

    pub fn look_from(&self) -> Vec3 {
        self.look_from
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_initialize() {
        let mut camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(0.0, 1.0, 0.0),
            )
            .with_fov(90.0);

        camera.initialize();

        assert_eq!(camera.center, Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 0.001);
    }

    #[test]
    fn test_ray_for_corners() {
        let mut camera = Camera::new()
            .with_resolution(100, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(90.0);
        camera.initialize();

        let center = camera.ray_for(0.5, 0.5);
        assert!((center.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);

        // 90 degree fov reaches 45 degrees at the top-left corner
        let top_left = camera.ray_for(0.0, 0.0);
        assert!((top_left.direction() - Vec3::new(-1.0, 1.0, -1.0)).length() < 1e-5);
        assert_eq!(camera.ray_for(0.3, 0.7), camera.ray_for(0.3, 0.7));
    }

    #[test]
    fn test_camera_ray_direction() {
        let mut camera = Camera::new()
            .with_resolution(100, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_fov(90.0);

        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);

        // Center ray should point roughly towards -Z
        let ray = camera.get_ray(50, 50, &mut rng);
        assert!(ray.direction().z < 0.0);
        assert_eq!(ray.time(), 0.0);
    }

    #[test]
    fn test_camera_from_json_is_initialized() {
        let camera: Camera = serde_json::from_str(
            r#"{"width": 4, "height": 2, "look_from": [0, 0, 5], "look_at": [0, 0, 0], "vfov": 40}"#,
        )
        .unwrap();
        assert_eq!(camera.image_width, 4);
        assert!(camera.ray_for(0.5, 0.5).direction().z < 0.0);
    }
}
