//! Render the built-in Cornell box.
//!
//! Run with: cargo run --release --example cornell_box -- [samples_per_pixel] [output.png]

use anyhow::{Context, Result};
use halo_renderer::{cornell_box, render};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let (scene, camera, mut config) = cornell_box()?;
    if let Some(spp) = args.get(1) {
        config.samples_per_pixel = spp.parse().context("samples_per_pixel must be a positive integer")?;
    }
    let output = args.get(2).map(String::as_str).unwrap_or("cornell_box.png");

    let (image, stats) = render(&camera, &scene, &config)?;
    println!(
        "{} primary rays, {} rays traced, {} samples sanitized",
        stats.primary_rays, stats.rays_traced, stats.sanitized_samples
    );

    image.save(output)?;

    let ppm = Path::new(output).with_extension("ppm");
    image.write_ppm(BufWriter::new(File::create(&ppm)?))?;
    println!("Saved {} and {}", output, ppm.display());

    Ok(())
}
