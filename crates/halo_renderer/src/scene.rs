//! Scene assembly.
//!
//! A [`SceneBuilder`] collects materials and primitives, then freezes them
//! into a [`Scene`]: a BVH over every primitive, a separate group of light
//! primitives for importance sampling, and the material arena the hit
//! records index into. A built scene is immutable and shared read-only by
//! all render workers.

use crate::bvh::{BvhBuildOptions, BvhNode};
use crate::error::{Error, Result};
use crate::hittable::{HittableList, MaterialId};
use crate::{AxisRect, BoxShape, Camera, Color, Material, Primitive, RenderConfig, Sphere};
use halo_math::{Axis, Vec3};
use std::sync::Arc;
use std::time::Instant;

/// Stand-in for a handle that does not resolve: absorbs everything.
const ABSORBER: Material = Material::DiffuseLight { emit: Color::ZERO };

/// A frozen, render-ready scene.
pub struct Scene {
    world: Primitive,
    lights: HittableList,
    materials: Vec<Material>,
    primitive_count: usize,
}

impl Scene {
    /// Root of the intersection hierarchy.
    pub fn world(&self) -> &Primitive {
        &self.world
    }

    /// Light primitives, also present in the world.
    pub fn lights(&self) -> &HittableList {
        &self.lights
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        self.materials.get(id.index()).unwrap_or(&ABSORBER)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Number of top-level primitives added to the builder.
    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }
}

/// Collects materials and primitives for a [`Scene`].
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<Arc<Primitive>>,
    lights: HittableList,
    materials: Vec<Material>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a material and return its handle.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId::new(self.materials.len() - 1)
    }

    /// Add a primitive that is seen but not sampled as a light.
    pub fn add(&mut self, primitive: impl Into<Arc<Primitive>>) {
        self.objects.push(primitive.into());
    }

    /// Add a primitive to both the world and the light group.
    pub fn add_light(&mut self, primitive: impl Into<Arc<Primitive>>) {
        let primitive = primitive.into();
        self.lights.add(Arc::clone(&primitive));
        self.objects.push(primitive);
    }

    /// Build with the default BVH options.
    pub fn build(self) -> Result<Scene> {
        self.build_with(&BvhBuildOptions::default())
    }

    /// Freeze into a [`Scene`]. An empty builder yields an empty scene.
    pub fn build_with(self, options: &BvhBuildOptions) -> Result<Scene> {
        let start = Instant::now();
        let primitive_count = self.objects.len();

        if primitive_count > 0 && self.materials.is_empty() {
            return Err(Error::InvalidInput("scene has primitives but no materials".into()));
        }
        for material in &self.materials {
            material.validate()?;
        }

        let world = if self.objects.is_empty() {
            Primitive::List(HittableList::new())
        } else {
            let bvh = BvhNode::with_options(self.objects, options)?;
            let stats = bvh.stats();
            log::info!(
                "BVH: {} branches, {} leaves, depth {}",
                stats.branches,
                stats.leaves,
                stats.max_depth
            );
            Primitive::Bvh(bvh)
        };

        if self.lights.is_empty() && primitive_count > 0 {
            log::warn!("Scene has no lights; sampling material lobes only");
        }

        log::info!(
            "Built scene: {} primitives, {} lights, {} materials in {:?}",
            primitive_count,
            self.lights.len(),
            self.materials.len(),
            start.elapsed()
        );

        Ok(Scene {
            world,
            lights: self.lights,
            materials: self.materials,
            primitive_count,
        })
    }
}

/// The classic Cornell box: red and green side walls, a ceiling light, a
/// mirrored tall block, a white short block with a glossy ball on top.
pub fn cornell_box() -> Result<(Scene, Camera, RenderConfig)> {
    let mut builder = SceneBuilder::new();

    let red = builder.add_material(Material::diffuse(Color::new(0.65, 0.05, 0.05)));
    let white = builder.add_material(Material::diffuse(Color::splat(0.73)));
    let green = builder.add_material(Material::diffuse(Color::new(0.12, 0.45, 0.15)));
    let light = builder.add_material(Material::diffuse_light(Color::splat(15.0)));
    let aluminum = builder.add_material(Material::mirror(Color::new(0.8, 0.85, 0.88)));
    let glossy = builder.add_material(Material::phong(Color::new(0.1, 0.2, 0.5), Color::splat(0.4), 60.0));

    builder.add(Primitive::from(AxisRect::yz((0.0, 555.0), (0.0, 555.0), 555.0, green)?));
    builder.add(Primitive::from(AxisRect::yz((0.0, 555.0), (0.0, 555.0), 0.0, red)?));
    builder.add(Primitive::from(AxisRect::xz((0.0, 555.0), (0.0, 555.0), 0.0, white)?));
    builder.add(Primitive::from(AxisRect::xz((0.0, 555.0), (0.0, 555.0), 555.0, white)?));
    builder.add(Primitive::from(AxisRect::xy((0.0, 555.0), (0.0, 555.0), 555.0, white)?));

    // Faces down into the room
    builder.add_light(Primitive::from(AxisRect::xz((213.0, 343.0), (227.0, 332.0), 554.0, light)?).flipped());

    let tall = Primitive::from(BoxShape::new(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), aluminum)?)
        .rotated(Axis::Y, 15.0)
        .translated(Vec3::new(265.0, 0.0, 295.0));
    builder.add(tall);

    let short = Primitive::from(BoxShape::new(Vec3::ZERO, Vec3::splat(165.0), white)?)
        .rotated(Axis::Y, -18.0)
        .translated(Vec3::new(130.0, 0.0, 65.0));
    builder.add(short);

    builder.add(Primitive::from(Sphere::new(Vec3::new(212.0, 225.0, 147.0), 60.0, glossy)));

    let mut camera = Camera::new()
        .with_resolution(600, 600)
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_fov(40.0);
    camera.initialize();

    let config = RenderConfig {
        samples_per_pixel: 100,
        max_depth: 50,
        background: Color::ZERO,
        ..Default::default()
    };

    Ok((builder.build()?, camera, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::Hittable;
    use halo_math::{Interval, Ray};

    #[test]
    fn test_empty_builder_gives_empty_world() {
        let scene = SceneBuilder::new().build().unwrap();
        assert!(matches!(scene.world(), Primitive::List(list) if list.is_empty()));
        assert!(scene.lights().is_empty());
        assert!(scene.world().bounding_box().is_none());
    }

    #[test]
    fn test_light_is_shared_with_world() {
        let mut builder = SceneBuilder::new();
        let emit = builder.add_material(Material::diffuse_light(Color::ONE));
        builder.add_light(Primitive::from(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, emit)));
        let scene = builder.build().unwrap();

        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.primitive_count(), 1);
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = scene.world().hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!(scene.material(rec.material).is_emissive());
    }

    #[test]
    fn test_primitives_without_materials_rejected() {
        let mut builder = SceneBuilder::new();
        builder.add(Primitive::from(Sphere::new(Vec3::ZERO, 1.0, MaterialId::default())));
        assert!(matches!(builder.build(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_material_fails_build() {
        let mut builder = SceneBuilder::new();
        let m = builder.add_material(Material::Phong {
            kd: Color::splat(0.5),
            ks: Color::splat(0.2),
            exponent: -3.0,
            diffuse_probability: 0.5,
        });
        builder.add(Primitive::from(Sphere::new(Vec3::ZERO, 1.0, m)));
        assert!(matches!(builder.build(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_unresolved_material_absorbs() {
        let mut builder = SceneBuilder::new();
        builder.add_material(Material::diffuse(Color::ONE));
        let scene = builder.build().unwrap();
        assert_eq!(*scene.material(MaterialId::new(7)), ABSORBER);
    }

    #[test]
    fn test_cornell_box_builds() {
        let (scene, camera, config) = cornell_box().unwrap();
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.primitive_count(), 9);
        assert_eq!(config.max_depth, 50);

        // The center of the image sees into the box
        let ray = camera.ray_for(0.5, 0.5);
        assert!(scene.world().hit(&ray, Interval::new(0.001, f32::INFINITY)).is_some());

        // Looking straight up from the floor center reaches the light's front
        let up = Ray::new_simple(Vec3::new(278.0, 1.0, 279.5), Vec3::Y);
        let rec = scene.world().hit(&up, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((rec.p.y - 554.0).abs() < 1e-3);
        assert!(rec.front_face);
    }
}
