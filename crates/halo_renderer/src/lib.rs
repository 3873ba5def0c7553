//! Halo - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering. Scenes are
//! built once into a BVH over shared primitives plus a group of light
//! primitives; the integrator mixes light sampling with each material's own
//! lobe sampling at every diffuse or glossy bounce.

mod box_shape;
mod bucket;
mod bvh;
mod camera;
mod description;
mod error;
mod hittable;
mod material;
mod pdf;
mod primitive;
mod quad;
mod rect;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod transform;
mod triangle;

pub use box_shape::BoxShape;
pub use bucket::{generate_buckets, render, render_bucket, render_with_cancel, Bucket, BucketResult};
pub use bvh::{BvhBuildOptions, BvhNode, BvhStats, SplitPolicy};
pub use camera::{Camera, CameraSettings};
pub use description::{load_scene, parse_scene, ObjectDescription, SceneDescription, ShapeDescription, TransformDescription};
pub use error::{Error, Result};
pub use hittable::{HitRecord, Hittable, HittableList, MaterialId};
pub use material::{Color, Material, ScatterResult};
pub use pdf::Pdf;
pub use primitive::Primitive;
pub use quad::Quad;
pub use rect::AxisRect;
pub use renderer::{color_to_rgb8, ray_color, render_pixel, sanitize, ImageBuffer, RenderConfig, RenderStats, RAY_T_MIN};
pub use sampling::{gen_f32, random_unit_vector, reflect};
pub use scene::{cornell_box, Scene, SceneBuilder};
pub use sphere::Sphere;
pub use transform::{FlipFace, Rotate, Translate};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from halo_math
pub use halo_math::{Aabb, Axis, Interval, Onb, Ray, Vec3};
