//! JSON scene files.
//!
//! ```json
//! {
//!   "camera": { "width": 400, "height": 400, "look_from": [0, 1, 4], "look_at": [0, 1, 0], "vfov": 40 },
//!   "render": { "samples_per_pixel": 64, "max_depth": 8 },
//!   "materials": {
//!     "white": { "type": "diffuse", "albedo": [0.73, 0.73, 0.73] },
//!     "lamp": { "type": "diffuse_light", "emit": [15, 15, 15] }
//!   },
//!   "objects": [
//!     { "type": "sphere", "center": [0, 1, 0], "radius": 1, "material": "white" },
//!     { "type": "rect", "p0": [-1, 3, -1], "p1": [1, 3, 1], "material": "lamp", "light": true, "flip": true },
//!     { "type": "box", "min": [0, 0, 0], "max": [1, 2, 1], "material": "white",
//!       "transforms": [ { "rotate": { "axis": "y", "degrees": 15 } }, { "translate": [2, 0, 0] } ] }
//!   ]
//! }
//! ```

use crate::bvh::BvhBuildOptions;
use crate::error::{Error, Result};
use crate::hittable::MaterialId;
use crate::{AxisRect, BoxShape, Camera, Material, Primitive, Quad, RenderConfig, Scene, SceneBuilder, Sphere, Triangle};
use halo_math::{Axis, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Top-level scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "default_camera")]
    pub camera: Camera,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub bvh: BvhBuildOptions,
    pub materials: BTreeMap<String, Material>,
    pub objects: Vec<ObjectDescription>,
}

fn default_camera() -> Camera {
    let mut camera = Camera::new();
    camera.initialize();
    camera
}

/// One scene object: a shape, its material name, and placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDescription {
    #[serde(flatten)]
    pub shape: ShapeDescription,
    pub material: String,
    /// Applied in order, each wrapping the result of the previous one.
    #[serde(default)]
    pub transforms: Vec<TransformDescription>,
    /// Also sample this object as a light source.
    #[serde(default)]
    pub light: bool,
    /// Swap the front face.
    #[serde(default)]
    pub flip: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescription {
    Sphere { center: Vec3, radius: f32 },
    Triangle { vertices: [Vec3; 3] },
    Rect { p0: Vec3, p1: Vec3 },
    Quad { q: Vec3, u: Vec3, v: Vec3 },
    Box { min: Vec3, max: Vec3 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformDescription {
    Translate(Vec3),
    Rotate { axis: Axis, degrees: f32 },
}

impl ShapeDescription {
    /// `None` for shapes that cannot be seen and are skipped.
    fn build(&self, material: MaterialId) -> Result<Option<Primitive>> {
        let primitive = match *self {
            ShapeDescription::Sphere { center, radius } => {
                if !(radius > 0.0) {
                    return Ok(None);
                }
                Sphere::new(center, radius, material).into()
            }
            ShapeDescription::Triangle { vertices: [v0, v1, v2] } => {
                let triangle = Triangle::new(v0, v1, v2, material);
                if !(triangle.area() > 0.0) {
                    return Ok(None);
                }
                triangle.into()
            }
            ShapeDescription::Rect { p0, p1 } => AxisRect::from_corners(p0, p1, material)?.into(),
            ShapeDescription::Quad { q, u, v } => Quad::new(q, u, v, material)?.into(),
            ShapeDescription::Box { min, max } => BoxShape::new(min, max, material)?.into(),
        };
        Ok(Some(primitive))
    }
}

impl SceneDescription {
    /// Build the scene, camera and render settings.
    pub fn build(self) -> Result<(Scene, Camera, RenderConfig)> {
        if self.camera.image_width == 0 || self.camera.image_height == 0 {
            return Err(Error::InvalidInput(format!(
                "camera resolution {}x{} is empty",
                self.camera.image_width, self.camera.image_height
            )));
        }
        self.render.validate()?;

        for (name, material) in &self.materials {
            material
                .validate()
                .map_err(|err| Error::InvalidInput(format!("material {name:?}: {err}")))?;
        }

        let mut builder = SceneBuilder::new();
        let ids: BTreeMap<&str, MaterialId> = self
            .materials
            .iter()
            .map(|(name, material)| (name.as_str(), builder.add_material(*material)))
            .collect();

        for (index, object) in self.objects.iter().enumerate() {
            let material = *ids
                .get(object.material.as_str())
                .ok_or_else(|| Error::UnknownMaterial(object.material.clone()))?;

            let Some(mut primitive) = object.shape.build(material)? else {
                log::warn!("Skipping object {index}: {:?} has no visible surface", object.shape);
                continue;
            };

            if object.flip {
                primitive = primitive.flipped();
            }
            for transform in &object.transforms {
                primitive = match *transform {
                    TransformDescription::Translate(offset) => primitive.translated(offset),
                    TransformDescription::Rotate { axis, degrees } => primitive.rotated(axis, degrees),
                };
            }

            if object.light {
                builder.add_light(primitive);
            } else {
                builder.add(primitive);
            }
        }

        let scene = builder.build_with(&self.bvh)?;
        Ok((scene, self.camera, self.render))
    }
}

/// Parse and build a scene from JSON text.
pub fn parse_scene(json: &str) -> Result<(Scene, Camera, RenderConfig)> {
    let description: SceneDescription = serde_json::from_str(json)?;
    description.build()
}

/// Load and build a scene from a JSON file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<(Scene, Camera, RenderConfig)> {
    let path = path.as_ref();
    log::info!("Loading scene {}", path.display());
    let json = fs::read_to_string(path)?;
    parse_scene(&json)
}
