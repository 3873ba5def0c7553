//! Error type for scene construction and rendering.

use halo_math::Vec3;
use thiserror::Error;

/// Errors raised while building or rendering a scene.
///
/// Geometric degeneracies met while tracing (parallel rays, grazing hits,
/// zero densities) are not errors; they surface as "no hit" or a zero
/// contribution. Only malformed input is rejected, and it is rejected at
/// build time.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate rectangle: corners {p0} and {p1} must share exactly one coordinate")]
    DegenerateRectangle { p0: Vec3, p1: Vec3 },

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Render cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
