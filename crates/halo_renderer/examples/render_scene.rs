//! Render a JSON scene file.
//!
//! Run with: cargo run --release --example render_scene -- scenes/cornell_box.json output.png

use anyhow::{bail, Result};
use halo_renderer::{load_scene, render};
use std::env;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: render_scene <scene.json> [output.png|output.ppm]");
        println!("\nExample:");
        println!("  cargo run --release --example render_scene -- scenes/cornell_box.json cornell.png");
        bail!("missing scene path");
    }

    let (scene, camera, config) = load_scene(&args[1])?;
    let output = args.get(2).map(String::as_str).unwrap_or("output.png");

    let (image, stats) = render(&camera, &scene, &config)?;
    println!(
        "Rendered {}x{}: {} rays traced",
        image.width, image.height, stats.rays_traced
    );

    image.save(output)?;
    println!("Saved to {}", output);
    Ok(())
}
