//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Each bucket owns its random generator and
//! its output pixels, so workers share nothing but the read-only scene.

use crate::error::{Error, Result};
use crate::renderer::{render_pixel, ImageBuffer, RenderStats};
use crate::{Camera, Color, RenderConfig, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets nearest the middle of the frame come first.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    buckets.sort_by(|a, b| {
        let a_center_x = a.x as f32 + a.width as f32 / 2.0;
        let a_center_y = a.y as f32 + a.height as f32 / 2.0;
        let b_center_x = b.x as f32 + b.width as f32 / 2.0;
        let b_center_y = b.y as f32 + b.height as f32 / 2.0;

        let a_dist = (a_center_x - center_x).powi(2) + (a_center_y - center_y).powi(2);
        let b_dist = (b_center_x - center_x).powi(2) + (b_center_y - center_y).powi(2);

        a_dist.total_cmp(&b_dist)
    });
}

/// Seed for one bucket's generator, decorrelated from its neighbours.
fn bucket_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
    /// Counters for this bucket alone
    pub stats: RenderStats,
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket, or
/// [`Error::Cancelled`] as soon as `cancel` is observed set.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> Result<BucketResult> {
    let mut rng = StdRng::seed_from_u64(bucket_seed(config.seed, bucket.index));
    let mut stats = RenderStats::default();
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            pixels.push(render_pixel(camera, scene, global_x, global_y, config, &mut rng, &mut stats));
        }
    }

    log::debug!("Bucket {} ({}, {}) done", bucket.index, bucket.x, bucket.y);
    Ok(BucketResult {
        bucket: *bucket,
        pixels,
        stats,
    })
}

/// Render the whole image in parallel.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> Result<(ImageBuffer, RenderStats)> {
    render_with_cancel(camera, scene, config, &AtomicBool::new(false))
}

/// Render the whole image in parallel, stopping early once `cancel` is set.
pub fn render_with_cancel(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> Result<(ImageBuffer, RenderStats)> {
    config.validate()?;
    let (width, height) = (camera.image_width, camera.image_height);
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!("image size {width}x{height} is empty")));
    }

    let buckets = generate_buckets(width, height, config.bucket_size);
    log::info!(
        "Rendering {}x{} at {} spp, depth {}, {} buckets on {} threads",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        buckets.len(),
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let results = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, scene, config, cancel))
        .collect::<Result<Vec<_>>>()?;

    let mut image = ImageBuffer::new(width, height);
    let mut stats = RenderStats::default();
    for result in results {
        let bucket = result.bucket;
        for (i, color) in result.pixels.into_iter().enumerate() {
            let i = i as u32;
            image.set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, color);
        }
        stats += result.stats;
    }

    let elapsed = start.elapsed();
    log::info!(
        "Rendered in {:.2?}: {} primary rays, {} rays total ({:.2} Mrays/s)",
        elapsed,
        stats.primary_rays,
        stats.rays_traced,
        stats.rays_traced as f64 / elapsed.as_secs_f64().max(1e-9) / 1e6
    );
    if stats.sanitized_samples > 0 {
        log::warn!("Replaced {} non-finite samples with black", stats.sanitized_samples);
    }

    Ok((image, stats))
}
