//! raylite math kernel.
//!
//! Vectors and matrices come straight from glam (value types, right-handed
//! conventions). This crate adds the ray-tracing specific pieces on top:
//! intervals, bounding boxes, rays and a few matrix helpers.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;

/// Linear RGB color. Channels are unbounded until tone mapping.
pub type Color = Vec3;
