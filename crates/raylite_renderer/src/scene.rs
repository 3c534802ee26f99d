//! The frozen scene the renderer reads from.
//!
//! A [`Scene`] is assembled with a [`SceneBuilder`] and cannot change once
//! built: the camera is initialized and the BVH is built exactly once in
//! [`SceneBuilder::build`], after which workers share it read-only.

use crate::bvh::{Bvh, DEFAULT_MAX_LEAF_SIZE};
use crate::camera::Camera;
use crate::light::Light;
use crate::material::Material;
use crate::object::{HitRecord, Object, Shape, RAY_EPSILON};
use crate::triangle::Triangle;
use raylite_core::{
    Mesh, SceneDescription, SceneError, SceneResult, ShapeDesc, Texture, TextureCache,
    TextureDesc, Transform,
};
use raylite_math::{Color, Interval, Ray};
use std::collections::HashMap;
use std::sync::Arc;

/// Geometry, lights and camera ready for rendering.
#[derive(Debug)]
pub struct Scene {
    camera: Camera,
    light: Light,
    aux_lights: Vec<Light>,
    objects: Vec<Object>,
    bvh: Bvh,
    background: Color,
    ambient: Color,
}

impl Scene {
    /// Start a scene with its camera and primary light.
    pub fn builder(camera: Camera, light: Light) -> SceneBuilder {
        SceneBuilder::new(camera, light)
    }

    /// Build a scene from a description with the default BVH leaf size.
    pub fn from_description(desc: &SceneDescription, textures: &mut TextureCache) -> SceneResult<Self> {
        Ok(SceneBuilder::from_description(desc, textures)?.build())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Primary light followed by the auxiliary lights.
    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        std::iter::once(&self.light).chain(self.aux_lights.iter())
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn ambient(&self) -> Color {
        self.ambient
    }

    pub fn width(&self) -> u32 {
        self.camera.image_width
    }

    pub fn height(&self) -> u32 {
        self.camera.image_height
    }

    /// Closest object hit inside `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.bvh.intersect(&self.objects, ray, ray_t)
    }

    /// Closest object hit by testing every object. Same answer as
    /// [`Scene::intersect`]; kept for verification and tiny scenes.
    pub fn intersect_linear(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest = ray_t.max;
        let mut best = None;
        for (i, object) in self.objects.iter().enumerate() {
            if let Some(t) = object.intersect_within(ray, ray_t.with_max(closest)) {
                closest = t;
                best = Some((i, t));
            }
        }
        best.map(|(i, t)| HitRecord::new(ray, t, &self.objects[i]))
    }

    /// True when an object blocks `ray` before `max_t`.
    pub fn occluded(&self, ray: &Ray, max_t: f32) -> bool {
        self.bvh
            .occluded(&self.objects, ray, Interval::new(RAY_EPSILON, max_t))
    }

    /// Nearest light surface hit by `ray` before `max_t`, with its distance.
    pub fn visible_light(&self, ray: &Ray, max_t: f32) -> Option<(f32, &Light)> {
        self.lights()
            .filter_map(|light| light.intersect(ray).map(|t| (t, light)))
            .filter(|(t, _)| *t < max_t)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }
}

/// Mutable assembly stage of a [`Scene`].
#[derive(Debug)]
pub struct SceneBuilder {
    camera: Camera,
    light: Light,
    aux_lights: Vec<Light>,
    objects: Vec<Object>,
    background: Color,
    ambient: Color,
    max_leaf_size: usize,
}

impl SceneBuilder {
    pub fn new(camera: Camera, light: Light) -> Self {
        Self {
            camera,
            light,
            aux_lights: Vec::new(),
            objects: Vec::new(),
            background: Color::ZERO,
            ambient: Color::ZERO,
            max_leaf_size: DEFAULT_MAX_LEAF_SIZE,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    /// Override the camera's image size.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.camera = self.camera.with_resolution(width, height);
        self
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.camera.image_width, self.camera.image_height)
    }

    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size.max(1);
        self
    }

    /// Add an auxiliary light.
    pub fn add_light(&mut self, light: Light) -> &mut Self {
        self.aux_lights.push(light);
        self
    }

    /// Add an object. Objects collapsed by a singular transform are
    /// skipped with a warning.
    pub fn add_object(&mut self, object: Object) -> &mut Self {
        if object.is_renderable() {
            self.objects.push(object);
        } else {
            log::warn!("Skipping object with a singular transform");
        }
        self
    }

    /// Add one triangle object per mesh face.
    pub fn add_mesh(&mut self, mesh: &Mesh, transform: &Transform, material: Arc<Material>) -> &mut Self {
        for object in Object::mesh(mesh, transform, material) {
            self.add_object(object);
        }
        self
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Freeze the scene: initialize the camera and build the BVH.
    pub fn build(self) -> Scene {
        let mut camera = self.camera;
        camera.initialize();

        if self.objects.is_empty() {
            log::warn!("Scene has no objects; only the background and lights are visible");
        }
        let bvh = Bvh::build(&self.objects, self.max_leaf_size);

        log::info!(
            "Scene ready: {} objects, {} lights, {}x{}",
            self.objects.len(),
            1 + self.aux_lights.len(),
            camera.image_width,
            camera.image_height
        );

        Scene {
            camera,
            light: self.light,
            aux_lights: self.aux_lights,
            objects: self.objects,
            bvh,
            background: self.background,
            ambient: self.ambient,
        }
    }

    /// Translate a scene description into a builder. Image textures are
    /// loaded through `textures`, so a shared cache decodes each file once.
    pub fn from_description(desc: &SceneDescription, textures: &mut TextureCache) -> SceneResult<Self> {
        let camera = Camera::from_desc(&desc.camera);
        let mut builder = SceneBuilder::new(camera, Light::from_desc(&desc.light))
            .with_background(desc.background)
            .with_ambient(desc.ambient);
        for light in &desc.lights {
            builder.add_light(Light::from_desc(light));
        }

        // Resolve every material up front so meshes share one Arc
        let mut materials: HashMap<&str, Arc<Material>> = HashMap::with_capacity(desc.materials.len());
        for (name, material) in &desc.materials {
            let texture = material
                .texture
                .as_ref()
                .map(|texture| resolve_texture(texture, textures))
                .transpose()?;
            materials.insert(name.as_str(), Arc::new(Material::from_desc(material, texture)));
        }

        for object in &desc.objects {
            let material = materials
                .get(object.material.as_str())
                .cloned()
                .ok_or_else(|| SceneError::UnknownMaterial(object.material.clone()))?;

            let shape = match &object.shape {
                ShapeDesc::Cuboid => Shape::Cuboid,
                ShapeDesc::Sphere => Shape::Sphere,
                ShapeDesc::Quad => Shape::Quad,
                ShapeDesc::Triangle { vertices, uvs } => {
                    let [a, b, c] = *vertices;
                    let triangle = Triangle::new(a, b, c);
                    Shape::Triangle(match uvs {
                        Some(uvs) => triangle.with_uvs(*uvs),
                        None => triangle,
                    })
                }
                ShapeDesc::Mesh { mesh } => {
                    let mesh = desc.mesh(mesh)?.to_mesh();
                    let before = builder.object_count();
                    builder.add_mesh(&mesh, &object.transform, material);
                    log::debug!(
                        "Mesh object '{}': {} triangles",
                        object.name,
                        builder.object_count() - before
                    );
                    continue;
                }
            };
            builder.add_object(Object::with_transform(shape, &object.transform, material));
        }

        Ok(builder)
    }
}

fn resolve_texture(desc: &TextureDesc, textures: &mut TextureCache) -> SceneResult<Arc<Texture>> {
    Ok(match desc {
        TextureDesc::Solid { color } => Arc::new(Texture::Solid(*color)),
        TextureDesc::Checker {
            cols,
            rows,
            even,
            odd,
        } => Arc::new(Texture::checker(*cols, *rows, *even, *odd)),
        TextureDesc::BoxPattern { colors } => Arc::new(Texture::box_pattern(*colors)),
        TextureDesc::Image { path } => textures.load(path)?,
    })
}
