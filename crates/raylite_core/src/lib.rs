//! raylite core - asset contracts and scene description.
//!
//! This crate provides:
//!
//! - **Meshes**: indexed triangle geometry produced by loaders
//! - **Textures**: solid, procedural and decoded image textures, plus a cache
//! - **Scene description**: the serializable scene the renderer consumes
//!
//! # Example
//!
//! ```ignore
//! use raylite_core::load_scene_file;
//!
//! let desc = load_scene_file("scene.json")?;
//! println!("{} objects", desc.objects.len());
//! ```

pub mod mesh;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use mesh::{Mesh, MeshTriangle};
pub use scene::{
    load_scene_file, CameraDesc, LightDesc, MaterialDesc, MaterialKind, MeshDesc, ObjectDesc,
    SceneDescription, SceneError, SceneResult, ShapeDesc, TextureDesc, Transform,
};
pub use texture::{ImageTexture, Texture, TextureCache, TextureError, TextureResult};
