//! End-to-end checks of the radiance estimator against closed-form answers.

use halo_renderer::{
    load_scene, ray_color, render, Camera, Color, Material, Primitive, Quad, Ray, RenderConfig, RenderStats,
    SceneBuilder, Sphere, Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::PI;

/// Form factor from a point to an `x` by `y` rectangle corner-aligned above
/// it at unit distance.
fn corner_form_factor(x: f32, y: f32) -> f32 {
    let a = (1.0 + x * x).sqrt();
    let b = (1.0 + y * y).sqrt();
    (x / a * (y / a).atan() + y / b * (x / b).atan()) / (2.0 * PI)
}

/// Diffuse unit sphere under a square emitter one unit above its top.
fn lit_sphere(albedo: f32, emit: f32, half_size: f32) -> halo_renderer::Scene {
    let mut builder = SceneBuilder::new();
    let grey = builder.add_material(Material::diffuse(Color::splat(albedo)));
    let lamp = builder.add_material(Material::diffuse_light(Color::splat(emit)));

    builder.add(Primitive::from(Sphere::new(Vec3::ZERO, 1.0, grey)));
    // u x v points down, so the lamp faces the sphere
    let quad = Quad::new(
        Vec3::new(-half_size, 2.0, -half_size),
        Vec3::new(2.0 * half_size, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0 * half_size),
        lamp,
    )
    .unwrap();
    builder.add_light(Primitive::from(quad));
    builder.build().unwrap()
}

fn estimate(scene: &halo_renderer::Scene, ray: &Ray, config: &RenderConfig, samples: usize, seed: u64) -> (f64, f64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stats = RenderStats::default();
    let (mut sum, mut sum_sq) = (0.0_f64, 0.0_f64);
    for _ in 0..samples {
        let value = ray_color(ray, scene, config.max_depth, config, &mut rng, &mut stats).x as f64;
        sum += value;
        sum_sq += value * value;
    }
    let mean = sum / samples as f64;
    let variance = (sum_sq / samples as f64 - mean * mean).max(0.0);
    (mean, (variance / samples as f64).sqrt())
}

#[test]
fn test_direct_lighting_converges_to_form_factor() {
    let (albedo, emit) = (0.5, 4.0);
    let scene = lit_sphere(albedo, emit, 0.5);
    let config = RenderConfig {
        max_depth: 1,
        background: Color::ZERO,
        ..Default::default()
    };
    // Hits the top of the sphere at (0, 1, 0), facing the lamp
    let ray = Ray::new_simple(Vec3::new(0.0, 1.5, 0.0), -Vec3::Y);

    // Outgoing radiance of a Lambertian point is albedo * L * F
    let expected = (albedo * emit * 4.0 * corner_form_factor(0.5, 0.5)) as f64;

    let (coarse, coarse_se) = estimate(&scene, &ray, &config, 2_500, 1);
    let (fine, fine_se) = estimate(&scene, &ray, &config, 40_000, 2);

    assert!((fine - expected).abs() < 0.03 * expected, "{fine} vs {expected}");
    assert!((fine - expected).abs() < 5.0 * fine_se + 1e-4);
    assert!((coarse - expected).abs() < 5.0 * coarse_se + 1e-4);
    // Standard error shrinks as 1/sqrt(n): 16x the samples, a quarter the error
    assert!(fine_se < 0.35 * coarse_se, "{fine_se} vs {coarse_se}");
}

#[test]
fn test_zero_depth_sees_only_emitters() {
    let scene = lit_sphere(0.5, 4.0, 0.5);
    let config = RenderConfig {
        max_depth: 0,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let mut stats = RenderStats::default();

    let at_sphere = Ray::new_simple(Vec3::new(0.0, 1.5, 0.0), -Vec3::Y);
    assert_eq!(ray_color(&at_sphere, &scene, 0, &config, &mut rng, &mut stats), Color::ZERO);

    let at_lamp = Ray::new_simple(Vec3::new(0.0, 1.5, 0.0), Vec3::Y);
    assert_eq!(ray_color(&at_lamp, &scene, 0, &config, &mut rng, &mut stats), Color::splat(4.0));
    assert_eq!(stats.rays_traced, 2);
}

#[test]
fn test_mirror_reflection_has_no_variance() {
    let mut builder = SceneBuilder::new();
    let mirror = builder.add_material(Material::mirror(Color::splat(0.9)));
    let lamp = builder.add_material(Material::diffuse_light(Color::splat(4.0)));
    builder.add(Primitive::from(Sphere::new(Vec3::ZERO, 1.0, mirror)));
    let quad = Quad::new(Vec3::new(-5.0, 3.0, -5.0), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 10.0), lamp).unwrap();
    builder.add_light(Primitive::from(quad));
    let scene = builder.build().unwrap();

    let config = RenderConfig::default();
    let ray = Ray::new_simple(Vec3::new(0.3, 1.5, 0.0), -Vec3::Y);
    let expected = Color::splat(0.9) * Color::splat(4.0);

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut stats = RenderStats::default();
        let color = ray_color(&ray, &scene, config.max_depth, &config, &mut rng, &mut stats);
        assert_eq!(color, expected);
        assert_eq!(stats.rays_traced, 2);
    }
}

#[test]
fn test_empty_scene_renders_background() {
    let scene = SceneBuilder::new().build().unwrap();
    let mut camera = Camera::new().with_resolution(9, 7);
    camera.initialize();
    let config = RenderConfig {
        samples_per_pixel: 3,
        background: Color::new(0.1, 0.2, 0.3),
        bucket_size: 4,
        ..Default::default()
    };

    let (image, stats) = render(&camera, &scene, &config).unwrap();
    assert!(image.pixels.iter().all(|&c| (c - config.background).abs().max_element() < 1e-6));
    assert_eq!(stats.primary_rays, 9 * 7 * 3);
    assert_eq!(stats.rays_traced, stats.primary_rays);
    assert_eq!(stats.sanitized_samples, 0);
}

#[test]
fn test_bundled_scene_file_renders() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scenes/cornell_box.json");
    let (scene, mut camera, mut config) = load_scene(path).unwrap();
    assert_eq!(scene.lights().len(), 1);

    camera = Camera::new()
        .with_resolution(16, 16)
        .with_position(camera.look_from(), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_fov(40.0);
    camera.initialize();
    config.samples_per_pixel = 2;
    config.max_depth = 4;

    let (image, stats) = render(&camera, &scene, &config).unwrap();
    assert_eq!(stats.sanitized_samples, 0);
    let mean = image.pixels.iter().copied().sum::<Color>() / image.pixels.len() as f32;
    assert!(mean.length() > 0.0);
}
