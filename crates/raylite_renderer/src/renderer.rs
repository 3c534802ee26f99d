//! Whitted-style ray tracing renderer.
//!
//! Implements:
//! - Phong direct lighting with hard or soft (area light) shadows
//! - Recursive mirror reflection and Fresnel-weighted refraction
//! - Adaptive anti-aliasing driven by per-pixel luminance variance
//! - Bucket rendering on a dedicated rayon pool, deterministic per seed
//! - Gamma correction

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::error::{RenderError, RenderResult};
use crate::light::Light;
use crate::material::{reflect, reflectance, refract, Material, Surface};
use crate::object::{HitRecord, RAY_EPSILON};
use crate::sampler::{gen_f32, PixelEstimator};
use crate::scene::Scene;
use rand::RngCore;
use rayon::prelude::*;
use raylite_math::{Color, Interval, Ray, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Offset along the surface normal for rays leaving a surface.
pub const SHADOW_BIAS: f32 = 1e-3;

/// Secondary rays whose accumulated weight falls below this are not traced.
pub const MIN_CONTRIBUTION: f32 = 1e-3;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Upper bound on samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Area lights are sampled on a `light_grid_size` square grid
    pub light_grid_size: u32,
    /// Worker threads in the render pool
    pub threads: usize,
    /// Seed for all per-pixel random streams
    pub seed: u64,
    /// Samples taken before the early-exit test applies
    pub adaptive_min_samples: u32,
    /// Standard error of luminance below which a pixel stops sampling;
    /// zero disables early exit
    pub adaptive_tolerance: f32,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// BVH leaf capacity
    pub max_leaf_size: usize,
    /// Output gamma
    pub gamma: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            samples_per_pixel: 16,
            light_grid_size: 1,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            seed: 0,
            adaptive_min_samples: 4,
            adaptive_tolerance: 0.01,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
            max_leaf_size: crate::bvh::DEFAULT_MAX_LEAF_SIZE,
            gamma: 2.2,
        }
    }
}

impl RenderConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_samples(mut self, samples_per_pixel: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    pub fn with_light_grid(mut self, light_grid_size: u32) -> Self {
        self.light_grid_size = light_grid_size;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the adaptive sampling minimum and tolerance.
    pub fn with_adaptive(mut self, min_samples: u32, tolerance: f32) -> Self {
        self.adaptive_min_samples = min_samples;
        self.adaptive_tolerance = tolerance;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size;
        self
    }

    /// Reject settings the renderer cannot honour, before any work starts.
    pub fn validate(&self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));
        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1");
        }
        if self.threads == 0 {
            return invalid("threads must be at least 1");
        }
        if self.light_grid_size == 0 {
            return invalid("light_grid_size must be at least 1");
        }
        if self.max_leaf_size == 0 {
            return invalid("max_leaf_size must be at least 1");
        }
        if self.bucket_size == 0 {
            return invalid("bucket_size must be at least 1");
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return invalid("gamma must be a positive number");
        }
        if !(self.adaptive_tolerance.is_finite() && self.adaptive_tolerance >= 0.0) {
            return invalid("adaptive_tolerance must be zero or positive");
        }
        Ok(())
    }
}

/// Shared flag for stopping a render from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Compute the color seen by a ray.
///
/// `depth` counts the bounces still allowed; `weight` is the product of the
/// blend factors along the path so far and prunes negligible branches.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    weight: f32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let hit = scene.intersect(ray, Interval::new(RAY_EPSILON, f32::INFINITY));
    let nearest = hit.as_ref().map_or(f32::INFINITY, |rec| rec.t);

    // Area lights in front of every object are seen directly
    if let Some((_, light)) = scene.visible_light(ray, nearest) {
        return light.emission();
    }

    match hit {
        Some(rec) => shade(ray, &rec, scene, depth, weight, config, rng),
        None => scene.background(),
    }
}

fn shade(
    ray: &Ray,
    rec: &HitRecord,
    scene: &Scene,
    depth: u32,
    weight: f32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let material = rec.material();
    let surface = material.surface();
    let base = surface.color_at(rec.uv);
    let to_eye = -ray.direction;

    let mut local = surface.ambient * base * scene.ambient();
    for light in scene.lights() {
        local += direct_light(light, rec, surface, base, to_eye, scene, config, rng);
    }

    match *material {
        Material::Diffuse(_) => local,

        Material::Reflective { reflectivity, .. } => {
            let mut color = local * (1.0 - reflectivity);
            let w = weight * reflectivity;
            if depth > 0 && w >= MIN_CONTRIBUTION {
                let mirror = reflect(ray.direction, rec.normal);
                let bounce = Ray::normalized(rec.p + rec.normal * SHADOW_BIAS, mirror);
                color += reflectivity * base * ray_color(&bounce, scene, depth - 1, w, config, rng);
            }
            color
        }

        Material::Refractive {
            ior, transparency, ..
        } => {
            let mut color = local * (1.0 - transparency);
            if depth == 0 || weight * transparency < MIN_CONTRIBUTION {
                return color;
            }

            let refraction_ratio = if rec.front_face { 1.0 / ior } else { ior };
            let cos_theta = (-ray.direction).dot(rec.normal).min(1.0);

            // Total internal reflection sends everything down the mirror ray
            let refracted = refract(ray.direction, rec.normal, refraction_ratio);
            let kr = match refracted {
                Some(_) => reflectance(cos_theta, refraction_ratio),
                None => 1.0,
            };

            let mut through = Color::ZERO;
            let w_reflect = weight * transparency * kr;
            if w_reflect >= MIN_CONTRIBUTION {
                let mirror = reflect(ray.direction, rec.normal);
                let bounce = Ray::normalized(rec.p + rec.normal * SHADOW_BIAS, mirror);
                through += kr * ray_color(&bounce, scene, depth - 1, w_reflect, config, rng);
            }
            if let Some(direction) = refracted {
                let w_refract = weight * transparency * (1.0 - kr);
                if w_refract >= MIN_CONTRIBUTION {
                    let inside = Ray::normalized(rec.p - rec.normal * SHADOW_BIAS, direction);
                    through +=
                        (1.0 - kr) * ray_color(&inside, scene, depth - 1, w_refract, config, rng);
                }
            }

            color += transparency * through;
            color
        }
    }
}

/// Phong contribution of one light, averaged over its shadow samples.
#[allow(clippy::too_many_arguments)]
fn direct_light(
    light: &Light,
    rec: &HitRecord,
    surface: &Surface,
    base: Color,
    to_eye: Vec3,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let (cols, rows) = light.sample_grid(config.light_grid_size);
    let origin = rec.p + rec.normal * SHADOW_BIAS;

    let mut sum = Color::ZERO;
    for j in 0..rows {
        for i in 0..cols {
            let target = light.point_on_light(i, j, cols, rows, rng);
            let to_light = target - origin;
            let distance = to_light.length();
            if distance <= SHADOW_BIAS {
                continue;
            }
            let l = to_light / distance;
            if rec.normal.dot(l) <= 0.0 {
                continue;
            }
            let shadow = Ray::new(origin, l);
            if scene.occluded(&shadow, distance - SHADOW_BIAS) {
                continue;
            }
            sum += surface.phong(rec.normal, l, to_eye, base);
        }
    }

    sum * light.emission() / (cols * rows) as f32
}

/// Render a single pixel with adaptive multi-sampling.
///
/// Returns the mean linear color and the number of samples taken.
pub fn render_pixel(
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> (Color, u32) {
    let budget = config.samples_per_pixel.max(1);
    let min_samples = config.adaptive_min_samples.clamp(1, budget);
    let mut estimator = PixelEstimator::new();

    while estimator.count() < budget {
        // A single sample goes through the pixel centre
        let offset = if budget == 1 {
            Vec2::splat(0.5)
        } else {
            Vec2::new(gen_f32(rng), gen_f32(rng))
        };
        let ray = scene.camera().get_ray(x, y, offset);
        let sample = ray_color(&ray, scene, config.max_depth, 1.0, config, rng);
        estimator.add(if sample.is_finite() { sample } else { Color::ZERO });

        if estimator.count() >= min_samples && estimator.converged(config.adaptive_tolerance) {
            break;
        }
    }

    (estimator.mean(), estimator.count())
}

/// Apply gamma correction.
#[inline]
pub fn linear_to_gamma(linear: f32, gamma: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / gamma)
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color, gamma: f32) -> [u8; 3] {
    let channel = |c: f32| (255.0 * linear_to_gamma(c, gamma).clamp(0.0, 1.0)).round() as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Linear-light image produced by a render.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
    pub gamma: f32,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
            gamma: 2.2,
        }
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Row-major offset of (x, y), computed in `usize`.
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.pixel_index(x, y)]
    }

    /// Copy a finished bucket into place.
    pub fn blit(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (row, chunk) in result.pixels.chunks(bucket.width as usize).enumerate() {
            let start = self.pixel_index(bucket.x, bucket.y + row as u32);
            self.pixels[start..start + chunk.len()].copy_from_slice(chunk);
        }
    }

    /// Gamma-corrected 8-bit RGB bytes, rows top to bottom.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color, self.gamma));
        }
        bytes
    }

    pub fn to_image(&self) -> RenderResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.to_rgb8()).ok_or(
            RenderError::EmptyImage {
                width: self.width,
                height: self.height,
            },
        )
    }

    /// Write the image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.to_image()?.save(path)?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Render the scene and write it to `output_path`.
pub fn render(
    scene: &Scene,
    output_path: impl AsRef<Path>,
    config: &RenderConfig,
) -> RenderResult<Framebuffer> {
    let framebuffer = render_to_buffer(scene, config, &CancelToken::new())?;
    framebuffer.save(output_path)?;
    Ok(framebuffer)
}

/// Render the scene into memory.
///
/// Buckets are rendered in parallel on a pool of exactly `config.threads`
/// workers. Each bucket fills its own pixel vector and the results are
/// copied into the framebuffer after the join. A cancelled render returns
/// [`RenderError::Cancelled`] and produces no image.
pub fn render_to_buffer(
    scene: &Scene,
    config: &RenderConfig,
    cancel: &CancelToken,
) -> RenderResult<Framebuffer> {
    let (width, height) = (scene.width(), scene.height());
    config.validate(width, height)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .thread_name(|i| format!("raylite-worker-{i}"))
        .build()?;

    let buckets = generate_buckets(width, height, config.bucket_size);
    log::info!(
        "Rendering {}x{} in {} buckets on {} threads ({} spp max, depth {}, light grid {})",
        width,
        height,
        buckets.len(),
        config.threads,
        config.samples_per_pixel,
        config.max_depth,
        config.light_grid_size
    );

    let start = Instant::now();
    let completed = AtomicUsize::new(0);
    let results: Vec<Option<BucketResult>> = pool.install(|| {
        buckets
            .par_iter()
            .map(|bucket| {
                if cancel.is_cancelled() {
                    return None;
                }
                let result = render_bucket(bucket, scene, config);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log::trace!("Bucket {} done ({}/{})", bucket.index, done, buckets.len());
                Some(result)
            })
            .collect()
    });

    if cancel.is_cancelled() || results.iter().any(Option::is_none) {
        log::info!("Render cancelled after {:.2?}", start.elapsed());
        return Err(RenderError::Cancelled);
    }

    let mut framebuffer = Framebuffer::new(width, height).with_gamma(config.gamma);
    let mut samples = 0u64;
    for result in results.into_iter().flatten() {
        samples += result.samples;
        framebuffer.blit(&result);
    }

    let elapsed = start.elapsed();
    let pixel_count = width as u64 * height as u64;
    log::info!(
        "Render finished in {:.2?}: {} samples ({:.2} per pixel)",
        elapsed,
        samples,
        samples as f64 / pixel_count as f64
    );

    Ok(framebuffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::object::Object;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use raylite_core::Transform;

    fn box_scene(width: u32, height: u32) -> Scene {
        let _ = env_logger::builder().is_test(true).try_init();
        let camera = Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::new(2.0, 2.0, 4.0), Vec3::ZERO, Vec3::Y)
            .with_fov(45.0);
        let light = Light::point(Vec3::new(3.0, 5.0, 3.0), Color::ONE, 1.0);
        let mut builder = Scene::builder(camera, light)
            .with_background(Color::new(0.1, 0.2, 0.3))
            .with_ambient(Color::splat(0.2));
        builder.add_object(Object::cuboid(
            &Transform::default(),
            Arc::new(Material::diffuse(Color::new(0.8, 0.3, 0.2))),
        ));
        builder.build()
    }

    fn test_config() -> RenderConfig {
        RenderConfig::default()
            .with_max_depth(3)
            .with_samples(8)
            .with_light_grid(1)
            .with_threads(2)
            .with_bucket_size(8)
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0, 2.2), 0.0);
        assert!((linear_to_gamma(1.0, 2.2) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25, 2.0) - 0.5).abs() < 0.0001);
        assert_eq!(color_to_rgb(Color::new(-1.0, 0.0, 4.0), 2.2), [0, 0, 255]);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let ok = RenderConfig::default();
        assert!(ok.validate(16, 16).is_ok());
        assert!(matches!(
            ok.validate(0, 16),
            Err(RenderError::EmptyImage { width: 0, height: 16 })
        ));
        for bad in [
            ok.clone().with_samples(0),
            ok.clone().with_threads(0),
            ok.clone().with_light_grid(0),
            ok.clone().with_max_leaf_size(0),
            ok.clone().with_bucket_size(0),
        ] {
            assert!(matches!(bad.validate(16, 16), Err(RenderError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "max_depth": 3, "samples_per_pixel": 64 }"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.samples_per_pixel, 64);
        assert_eq!(config.light_grid_size, 1);
        assert_eq!(config.gamma, 2.2);
    }

    #[test]
    fn test_render_small_box() {
        let scene = box_scene(16, 16);
        let image = render_to_buffer(&scene, &test_config(), &CancelToken::new()).unwrap();

        assert_eq!((image.width, image.height), (16, 16));
        assert_eq!(image.to_rgb8().len(), 16 * 16 * 3);
        assert!(image.pixels.iter().all(|c| c.is_finite()));

        // The box fills the middle of the frame
        let center = image.get(8, 8);
        assert_ne!(center, scene.background());
        assert!(center.x > center.z, "box is red-dominant: {center:?}");
        // The corner sees the background
        assert_eq!(image.get(0, 0), scene.background());
    }

    #[test]
    fn test_render_is_idempotent() {
        let scene = box_scene(16, 12);
        let config = test_config().with_seed(99);
        let first = render_to_buffer(&scene, &config, &CancelToken::new()).unwrap();
        let second = render_to_buffer(&scene, &config, &CancelToken::new()).unwrap();
        assert_eq!(first.to_rgb8(), second.to_rgb8());
        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let scene = box_scene(24, 20);
        let single = render_to_buffer(&scene, &test_config().with_threads(1), &CancelToken::new()).unwrap();
        let many = render_to_buffer(&scene, &test_config().with_threads(4), &CancelToken::new()).unwrap();
        assert_eq!(single.pixels, many.pixels);
        assert_eq!(single.to_rgb8(), many.to_rgb8());
    }

    #[test]
    fn test_empty_scene_is_uniform_background() {
        let camera = Camera::new().with_resolution(12, 8);
        let light = Light::point(Vec3::Y * 5.0, Color::ONE, 1.0);
        let background = Color::new(0.2, 0.4, 0.6);
        let scene = Scene::builder(camera, light).with_background(background).build();

        let image = render_to_buffer(&scene, &test_config(), &CancelToken::new()).unwrap();
        let expected = color_to_rgb(background, 2.2);
        for px in image.to_rgb8().chunks(3) {
            assert_eq!(px, expected);
        }
    }

    #[test]
    fn test_cancelled_render() {
        let scene = box_scene(16, 16);
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = render_to_buffer(&scene, &test_config(), &cancel);
        assert!(matches!(result, Err(RenderError::Cancelled)));
    }

    #[test]
    fn test_invalid_config_does_no_work() {
        let scene = box_scene(16, 16);
        let result = render_to_buffer(&scene, &test_config().with_threads(0), &CancelToken::new());
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_adaptive_sampling_stops_early_on_flat_pixels() {
        let scene = box_scene(16, 16);
        let config = test_config().with_samples(64).with_adaptive(4, 0.01);
        let mut rng = crate::sampler::pixel_rng(0, 0, 0);
        // Corner pixel only sees the flat background
        let (color, samples) = render_pixel(&scene, 0, 0, &config, &mut rng);
        assert_eq!(color, scene.background());
        assert_eq!(samples, 4);

        let exhaustive = config.with_adaptive(4, 0.0);
        let (_, samples) = render_pixel(&scene, 0, 0, &exhaustive, &mut rng);
        assert_eq!(samples, 64);
    }

    #[test]
    fn test_mirror_sees_reflected_color() {
        // Camera looks down at a mirror floor; above it hangs a green quad
        // facing down, outside the direct view.
        let camera = Camera::new()
            .with_resolution(9, 9)
            .with_position(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, Vec3::Z)
            .with_fov(20.0);
        let light = Light::point(Vec3::new(0.0, 0.5, 0.0), Color::ONE, 1.0);
        let mut builder = Scene::builder(camera, light).with_ambient(Color::ONE);

        let mut mirror = Material::reflective(Color::ONE, 1.0);
        mirror.surface_mut().specular = 0.0;
        builder.add_object(Object::quad(
            &Transform::default().with_scale(Vec3::splat(4.0)),
            Arc::new(mirror),
        ));
        let mut green = Material::diffuse(Color::new(0.0, 1.0, 0.0));
        green.surface_mut().ambient = 1.0;
        green.surface_mut().specular = 0.0;
        builder.add_object(Object::quad(
            &Transform::from_euler_degrees(Vec3::new(0.0, 2.0, 0.0), Vec3::new(180.0, 0.0, 0.0), Vec3::splat(4.0)),
            Arc::new(green),
        ));
        let scene = builder.build();

        let config = RenderConfig::default().with_samples(1).with_max_depth(2).with_threads(1);
        let mut rng = crate::sampler::pixel_rng(0, 4, 4);
        let (color, _) = render_pixel(&scene, 4, 4, &config, &mut rng);
        assert!(color.y > 0.5, "{color:?}");
        assert!(color.x < 0.1 && color.z < 0.1, "{color:?}");
    }

    #[test]
    fn test_total_internal_reflection_follows_mirror_ray() {
        let camera = Camera::new().with_resolution(4, 4);
        let light = Light::point(Vec3::new(0.0, 5.0, 0.0), Color::ONE, 1.0);
        let mut builder = Scene::builder(camera, light)
            .with_background(Color::ZERO)
            .with_ambient(Color::ONE);

        // Glass slab spanning y in [-1, 1]
        builder.add_object(Object::cuboid(
            &Transform::default().with_scale(Vec3::new(4.0, 2.0, 4.0)),
            Arc::new(Material::refractive(Color::ONE, 1.5, 1.0)),
        ));
        // Green block inside the slab, reachable only along the mirror ray
        let green = Surface::new(Color::new(0.0, 1.0, 0.0)).with_coefficients(1.0, 0.0, 0.0);
        builder.add_object(Object::cuboid(
            &Transform::from_translation(Vec3::new(1.1, 0.5, 0.0)).with_scale(Vec3::splat(0.3)),
            Arc::new(Material::Diffuse(green)),
        ));
        let scene = builder.build();
        let config = RenderConfig::default().with_max_depth(3);
        let mut rng = StdRng::seed_from_u64(1);

        // 60 degrees off the top face normal, past the ~41.8 degree critical angle
        let inside = Ray::normalized(Vec3::new(-1.5, 0.0, 0.0), Vec3::new(3f32.sqrt() / 2.0, 0.5, 0.0));
        let rec = scene
            .intersect(&inside, Interval::new(RAY_EPSILON, f32::INFINITY))
            .unwrap();
        assert!(!rec.front_face);
        assert!(refract(inside.direction, rec.normal, 1.5).is_none());

        let mirror = Ray::normalized(
            rec.p + rec.normal * SHADOW_BIAS,
            reflect(inside.direction, rec.normal),
        );
        let seen = ray_color(&mirror, &scene, 2, 1.0, &config, &mut rng);
        assert!((seen - Color::new(0.0, 1.0, 0.0)).length() < 1e-5, "{seen:?}");

        let color = ray_color(&inside, &scene, 3, 1.0, &config, &mut rng);
        assert!(color.is_finite());
        assert!((color - seen).length() < 1e-5, "{color:?} vs {seen:?}");
    }

    fn floor_under_area_light(blocker: Option<Transform>) -> Scene {
        let camera = Camera::new().with_resolution(4, 4);
        let light = Light::area(
            Vec3::new(-1.0, 4.0, -1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Color::ONE,
            1.0,
        );
        let mut builder = Scene::builder(camera, light)
            .with_background(Color::ZERO)
            .with_ambient(Color::splat(0.2));

        let grey = Surface::new(Color::splat(0.8)).with_coefficients(0.5, 0.9, 0.0);
        builder.add_object(Object::quad(
            &Transform::default().with_scale(Vec3::new(20.0, 1.0, 20.0)),
            Arc::new(Material::Diffuse(grey.clone())),
        ));
        if let Some(transform) = blocker {
            builder.add_object(Object::quad(&transform, Arc::new(Material::Diffuse(grey))));
        }
        builder.build()
    }

    #[test]
    fn test_half_blocked_area_light_gives_penumbra() {
        let config = RenderConfig::default().with_light_grid(4);
        let down = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y);
        let shade_origin = |scene: &Scene| {
            let mut rng = StdRng::seed_from_u64(7);
            ray_color(&down, scene, 1, 1.0, &config, &mut rng)
        };

        let lit = shade_origin(&floor_under_area_light(None));
        // Covers x < 0 halfway up: the shadow rays toward the -x half of the
        // light are blocked
        let half = shade_origin(&floor_under_area_light(Some(
            Transform::from_translation(Vec3::new(-5.0, 2.0, 0.0)).with_scale(Vec3::new(10.0, 1.0, 10.0)),
        )));
        let dark = shade_origin(&floor_under_area_light(Some(
            Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)).with_scale(Vec3::new(10.0, 1.0, 10.0)),
        )));

        // Fully shadowed leaves only the ambient term
        assert!((dark - Color::splat(0.5 * 0.8 * 0.2)).length() < 1e-5, "{dark:?}");
        assert!(half.x > dark.x + 1e-3 && half.x < lit.x - 1e-3, "{dark:?} < {half:?} < {lit:?}");
        assert!(half.is_finite() && lit.is_finite());
    }

    #[test]
    fn test_area_light_is_seen_directly() {
        let scene = floor_under_area_light(None);
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let up = Ray::new(Vec3::new(0.2, 1.0, -0.3), Vec3::Y);
        assert_eq!(ray_color(&up, &scene, 3, 1.0, &config, &mut rng), Color::ONE);
    }

    #[test]
    fn test_pixel_index_does_not_overflow_u32() {
        let framebuffer = Framebuffer {
            width: 100_000,
            height: 100_000,
            pixels: Vec::new(),
            gamma: 2.2,
        };
        assert_eq!(framebuffer.pixel_index(5, 99_999), 99_999 * 100_000 + 5);
    }

    #[test]
    fn test_save_writes_png() {
        let scene = box_scene(8, 8);
        let dir = std::env::temp_dir().join("raylite_render_test");
        let path = dir.join("box.png");
        let image = render(&scene, &path, &test_config()).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.into_raw(), image.to_rgb8());
        let _ = std::fs::remove_file(&path);
    }
}
