//! raylite renderer - CPU Whitted-style ray tracing
//!
//! Turns a frozen [`Scene`] into an image: Phong shading with shadows from
//! point and area lights, recursive reflection and refraction, adaptive
//! anti-aliasing, and bucket rendering across a fixed pool of threads.
//!
//! # Example
//!
//! ```ignore
//! use raylite_renderer::{render, RenderConfig, Scene};
//!
//! let scene = Scene::from_description(&desc, &mut textures)?;
//! let config = RenderConfig::default().with_samples(32).with_threads(8);
//! render(&scene, "out.png", &config)?;
//! ```

mod bucket;
mod bvh;
mod camera;
mod cuboid;
mod error;
mod light;
mod material;
mod object;
mod quad;
mod renderer;
mod sampler;
mod scene;
mod sphere;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode, DEFAULT_MAX_LEAF_SIZE};
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use light::Light;
pub use material::{reflect, reflectance, refract, Material, Surface};
pub use object::{HitRecord, Object, Shape, RAY_EPSILON};
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, render_to_buffer,
    CancelToken, Framebuffer, RenderConfig, MIN_CONTRIBUTION, SHADOW_BIAS,
};
pub use sampler::{gen_f32, luminance, pixel_rng, splitmix64, PixelEstimator};
pub use scene::{Scene, SceneBuilder};
pub use triangle::Triangle;

/// Re-export common math types from raylite_math
pub use raylite_math::{Aabb, Color, Interval, Ray, Vec2, Vec3};
