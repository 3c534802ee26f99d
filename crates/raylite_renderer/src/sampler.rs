//! Per-pixel random streams and adaptive sample control.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use raylite_math::Color;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// SplitMix64 finalizer, used to spread seeds.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Random stream for one pixel.
///
/// Seeded from the render seed and the pixel coordinate only, so a pixel
/// draws the same numbers whichever thread renders it and in whatever
/// order. The seed is mixed before the coordinate is folded in, so two
/// seeds never share streams across shifted pixels.
pub fn pixel_rng(seed: u64, x: u32, y: u32) -> StdRng {
    let coord = ((y as u64) << 32) | x as u64;
    StdRng::seed_from_u64(splitmix64(splitmix64(seed) ^ coord))
}

/// Running estimate of a pixel's color.
///
/// Tracks the running mean color plus the variance of luminance
/// (Welford), which drives the early-exit test. A run of identical samples
/// keeps the mean exactly equal to them.
#[derive(Debug, Clone, Default)]
pub struct PixelEstimator {
    count: u32,
    mean: Color,
    mean_luma: f64,
    m2: f64,
}

impl PixelEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sample: Color) {
        self.count += 1;
        self.mean += (sample - self.mean) / self.count as f32;

        let luma = luminance(sample) as f64;
        let delta = luma - self.mean_luma;
        self.mean_luma += delta / self.count as f64;
        self.m2 += delta * (luma - self.mean_luma);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn mean(&self) -> Color {
        self.mean
    }

    /// Sample variance of luminance.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard error of the mean luminance.
    pub fn standard_error(&self) -> f64 {
        if self.count == 0 {
            f64::INFINITY
        } else {
            (self.variance() / self.count as f64).sqrt()
        }
    }

    /// True once the mean is known to within `tolerance`. A tolerance of
    /// zero or less never converges.
    pub fn converged(&self, tolerance: f32) -> bool {
        tolerance > 0.0 && self.count >= 2 && self.standard_error() <= tolerance as f64
    }
}

/// Rec. 709 luminance of a linear color.
#[inline]
pub fn luminance(c: Color) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}
