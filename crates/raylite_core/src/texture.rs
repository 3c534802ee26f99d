//! Textures and texture loading.
//!
//! A texture is a pure function from UV coordinates to a linear RGB color.
//! Image textures are decoded once (through the `image` crate) and shared
//! between objects with `Arc`, so every variant is safe to read from many
//! render threads at once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use raylite_math::{Color, Vec2};
use thiserror::Error;

/// Errors that can occur during texture construction or loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Texture pixel count {actual} doesn't match {width}x{height}")]
    SizeMismatch { width: u32, height: u32, actual: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded raster texture in linear RGB, row-major, top row first.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageTexture {
    /// Nearest-texel lookup.
    ///
    /// u and v are clamped to [0, 1]; v = 0 is the bottom row of the image.
    pub fn sample(&self, uv: Vec2) -> Color {
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = (((1.0 - v) * self.height as f32) as u32).min(self.height - 1);

        self.pixels[(y * self.width + x) as usize]
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Color>()
    }
}

/// Surface color as a function of UV.
#[derive(Clone, Debug)]
pub enum Texture {
    /// One color everywhere.
    Solid(Color),

    /// Alternating cells; `cols` x `rows` cells across the [0,1] UV square.
    Checker {
        cols: u32,
        rows: u32,
        even: Color,
        odd: Color,
    },

    /// Five regions: `[center, top, bottom, left, right]`. Top and bottom
    /// bands (v > 0.75, v < 0.25) take priority over the side bands.
    BoxPattern([Color; 5]),

    Image(ImageTexture),
}

impl Texture {
    /// Build an image texture from decoded linear RGB pixels.
    pub fn image(width: u32, height: u32, pixels: Vec<Color>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Texture::Image(ImageTexture {
            width,
            height,
            pixels,
        }))
    }

    /// Checkerboard with at least one cell per axis.
    pub fn checker(cols: u32, rows: u32, even: Color, odd: Color) -> Self {
        Texture::Checker {
            cols: cols.max(1),
            rows: rows.max(1),
            even,
            odd,
        }
    }

    pub fn box_pattern(colors: [Color; 5]) -> Self {
        Texture::BoxPattern(colors)
    }

    /// Sample the texture at UV coordinates.
    pub fn color_at(&self, uv: Vec2) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker {
                cols,
                rows,
                even,
                odd,
            } => {
                let cu = (uv.x * *cols as f32).floor() as i64;
                let cv = (uv.y * *rows as f32).floor() as i64;
                if (cu + cv).rem_euclid(2) == 0 {
                    *even
                } else {
                    *odd
                }
            }
            Texture::BoxPattern([center, top, bottom, left, right]) => {
                if uv.y > 0.75 {
                    *top
                } else if uv.y < 0.25 {
                    *bottom
                } else if uv.x < 0.25 {
                    *left
                } else if uv.x > 0.75 {
                    *right
                } else {
                    *center
                }
            }
            Texture::Image(image) => image.sample(uv),
        }
    }
}

/// Cache for loaded textures.
///
/// Textures are loaded on-demand and cached for reuse.
pub struct TextureCache {
    /// Cached textures by file path
    textures: HashMap<String, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        if let Texture::Image(image) = texture.as_ref() {
            log::debug!(
                "Loaded texture: {} ({}x{}, {:.1} KB)",
                path,
                image.width,
                image.height,
                image.size_bytes() as f32 / 1024.0
            );
        }

        Ok(texture)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image file into a linear RGB texture.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: path.display().to_string(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels = rgb
        .pixels()
        .map(|p| {
            Color::new(
                srgb_to_linear(p[0]),
                srgb_to_linear(p[1]),
                srgb_to_linear(p[2]),
            )
        })
        .collect();

    Texture::image(width, height, pixels)
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(1.0, 0.0, 0.0);
    const BLUE: Color = Color::new(0.0, 0.0, 1.0);

    fn gradient_2x2() -> Texture {
        // Top row: red, blue. Bottom row: black, white.
        Texture::image(2, 2, vec![RED, BLUE, Color::ZERO, Color::ONE]).unwrap()
    }

    #[test]
    fn test_image_sample_nearest() {
        let tex = gradient_2x2();
        assert_eq!(tex.color_at(Vec2::new(0.1, 0.9)), RED);
        assert_eq!(tex.color_at(Vec2::new(0.9, 0.9)), BLUE);
        assert_eq!(tex.color_at(Vec2::new(0.1, 0.1)), Color::ZERO);
        assert_eq!(tex.color_at(Vec2::new(0.9, 0.1)), Color::ONE);
    }

    #[test]
    fn test_image_sample_clamps_out_of_range() {
        let tex = gradient_2x2();
        assert_eq!(tex.color_at(Vec2::new(-3.0, 7.0)), RED);
        assert_eq!(tex.color_at(Vec2::new(1.0, 0.0)), Color::ONE);
        assert_eq!(tex.color_at(Vec2::new(42.0, -42.0)), Color::ONE);
        assert_eq!(tex.color_at(Vec2::new(f32::NAN, 0.9)), RED);
    }

    #[test]
    fn test_image_rejects_bad_sizes() {
        assert!(matches!(
            Texture::image(0, 4, vec![]),
            Err(TextureError::Empty { .. })
        ));
        assert!(matches!(
            Texture::image(2, 2, vec![RED]),
            Err(TextureError::SizeMismatch { actual: 1, .. })
        ));
    }

    #[test]
    fn test_checker_alternates() {
        let tex = Texture::checker(2, 2, RED, BLUE);
        assert_eq!(tex.color_at(Vec2::new(0.25, 0.25)), RED);
        assert_eq!(tex.color_at(Vec2::new(0.75, 0.25)), BLUE);
        assert_eq!(tex.color_at(Vec2::new(0.75, 0.75)), RED);
        // Negative UVs keep alternating instead of mirroring
        assert_eq!(tex.color_at(Vec2::new(-0.25, 0.25)), BLUE);
    }

    #[test]
    fn test_box_pattern_regions() {
        let colors = [Color::ONE, RED, BLUE, Color::X, Color::Y];
        let tex = Texture::box_pattern(colors);
        assert_eq!(tex.color_at(Vec2::new(0.5, 0.5)), Color::ONE);
        assert_eq!(tex.color_at(Vec2::new(0.1, 0.9)), RED);
        assert_eq!(tex.color_at(Vec2::new(0.9, 0.1)), BLUE);
        assert_eq!(tex.color_at(Vec2::new(0.1, 0.5)), Color::X);
        assert_eq!(tex.color_at(Vec2::new(0.9, 0.5)), Color::Y);
    }

    #[test]
    fn test_texture_cache_missing_file() {
        let mut cache = TextureCache::with_base_dir("/definitely/not/here");
        assert!(cache.is_empty());
        assert!(matches!(cache.load("nope.png"), Err(TextureError::Load { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_texture_cache_roundtrip() {
        let dir = std::env::temp_dir().join(format!("raylite_tex_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([255, 0, 0]));
        img.save(dir.join("red.png")).unwrap();

        let mut cache = TextureCache::with_base_dir(&dir);
        let first = cache.load("red.png").unwrap();
        let second = cache.load("red.png").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let c = first.color_at(Vec2::new(0.5, 0.5));
        assert!((c.x - 1.0).abs() < 1e-4 && c.y == 0.0 && c.z == 0.0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        let mid = srgb_to_linear(128);
        assert!(mid < 0.5 && mid > 0.1);
    }
}
