//! Scene description types.
//!
//! This is the renderer-agnostic, serializable form of a scene: what an
//! editor saves and what `raylite` reads from disk. It only carries the
//! fields the renderer needs. The renderer turns it into its own frozen
//! `Scene` (with resolved materials, textures and a BVH) before tracing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use raylite_math::{Color, EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::Mesh;
use crate::texture::TextureError;

/// Errors raised while reading or resolving a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scene description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Object references unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("Object references unknown mesh '{0}'")]
    UnknownMesh(String),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Placement of an object: scale, then rotate, then translate.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "TransformDesc")]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Create a new transform with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Rotation given as XYZ Euler angles in degrees.
    pub fn from_euler_degrees(translation: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        let r = rotation_degrees * (std::f32::consts::PI / 180.0);
        Self::new(
            translation,
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            scale,
        )
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Object-to-world matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// World-to-object matrix.
    pub fn inverse_matrix(&self) -> Mat4 {
        self.to_matrix().inverse()
    }
}

/// On-disk form of `Transform`, with Euler angles instead of a quaternion.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
struct TransformDesc {
    translation: Vec3,
    rotation: Vec3,
    scale: Vec3,
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl From<TransformDesc> for Transform {
    fn from(desc: TransformDesc) -> Self {
        Transform::from_euler_degrees(desc.translation, desc.rotation, desc.scale)
    }
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_fov() -> f32 {
    60.0
}

fn default_one() -> f32 {
    1.0
}

fn default_white() -> Color {
    Color::ONE
}

fn default_background() -> Color {
    Color::new(0.05, 0.05, 0.08)
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CameraDesc {
    pub position: Vec3,
    pub look_at: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDesc {
    Point {
        position: Vec3,
        #[serde(default = "default_white")]
        color: Color,
        #[serde(default = "default_one")]
        brightness: f32,
    },
    /// Parallelogram spanned by `edge_u` and `edge_v` from `corner`.
    Area {
        corner: Vec3,
        edge_u: Vec3,
        edge_v: Vec3,
        #[serde(default = "default_white")]
        color: Color,
        #[serde(default = "default_one")]
        brightness: f32,
    },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureDesc {
    Solid { color: Color },
    Checker { cols: u32, rows: u32, even: Color, odd: Color },
    BoxPattern { colors: [Color; 5] },
    /// Path relative to the scene file
    Image { path: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    #[default]
    Diffuse,
    Reflective,
    Refractive,
}

/// Flat material record. Fields that don't apply to `kind` are ignored.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MaterialDesc {
    pub kind: MaterialKind,
    pub color: Color,
    pub texture: Option<TextureDesc>,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    pub reflectivity: f32,
    pub ior: f32,
    pub transparency: f32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            color: Color::splat(0.8),
            texture: None,
            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.2,
            shininess: 32.0,
            reflectivity: 0.8,
            ior: 1.5,
            transparency: 0.9,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MeshDesc {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    #[serde(default)]
    pub uvs: Option<Vec<Vec2>>,
}

impl MeshDesc {
    pub fn to_mesh(&self) -> Mesh {
        Mesh::with_uvs(self.positions.clone(), self.indices.clone(), self.uvs.clone())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDesc {
    /// Unit cube centred on the origin
    Cuboid,
    /// Unit-radius sphere centred on the origin
    Sphere,
    /// Unit square in the XZ plane facing +Y
    Quad,
    Triangle {
        vertices: [Vec3; 3],
        #[serde(default)]
        uvs: Option<[Vec2; 3]>,
    },
    /// Reference into `SceneDescription::meshes`
    Mesh { mesh: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct ObjectDesc {
    #[serde(default)]
    pub name: String,
    pub shape: ShapeDesc,
    #[serde(default)]
    pub transform: Transform,
    pub material: String,
}

/// Everything the renderer needs to build a frozen scene.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub name: String,
    pub camera: CameraDesc,
    /// Primary light
    pub light: LightDesc,
    /// Auxiliary lights
    #[serde(default)]
    pub lights: Vec<LightDesc>,
    #[serde(default)]
    pub materials: HashMap<String, MaterialDesc>,
    #[serde(default)]
    pub meshes: HashMap<String, MeshDesc>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default)]
    pub ambient: Color,
    /// Optional render settings, interpreted by the renderer
    #[serde(default)]
    pub render: Option<serde_json::Value>,
    /// Directory textures are resolved against (the scene file's folder)
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl SceneDescription {
    /// Parse a scene description from JSON text.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn material(&self, name: &str) -> SceneResult<&MaterialDesc> {
        self.materials
            .get(name)
            .ok_or_else(|| SceneError::UnknownMaterial(name.to_string()))
    }

    pub fn mesh(&self, name: &str) -> SceneResult<&MeshDesc> {
        self.meshes
            .get(name)
            .ok_or_else(|| SceneError::UnknownMesh(name.to_string()))
    }
}

/// Read a JSON scene file. Texture paths resolve against its directory.
pub fn load_scene_file(path: impl AsRef<Path>) -> SceneResult<SceneDescription> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut desc = SceneDescription::from_json(&text)?;
    desc.base_dir = path.parent().map(Path::to_path_buf);
    if desc.name.is_empty() {
        desc.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    log::info!(
        "Loaded scene '{}': {} objects, {} materials, {} lights",
        desc.name,
        desc.objects.len(),
        desc.materials.len(),
        desc.lights.len() + 1
    );

    Ok(desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "camera": { "position": [0, 1, 5], "look_at": [0, 0, 0], "width": 32, "height": 24 },
        "light": { "type": "point", "position": [2, 4, 2], "brightness": 2.0 },
        "lights": [
            { "type": "area", "corner": [-1, 5, -1], "edge_u": [2, 0, 0], "edge_v": [0, 0, 2] }
        ],
        "materials": {
            "floor": { "texture": { "type": "checker", "cols": 8, "rows": 8, "even": [1, 1, 1], "odd": [0, 0, 0] } },
            "glass": { "kind": "refractive", "ior": 1.33 }
        },
        "meshes": {
            "tri": { "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "indices": [0, 1, 2] }
        },
        "objects": [
            { "shape": { "type": "quad" }, "material": "floor",
              "transform": { "scale": [10, 1, 10] } },
            { "shape": { "type": "sphere" }, "material": "glass",
              "transform": { "translation": [0, 1, 0], "rotation": [0, 90, 0] } },
            { "shape": { "type": "mesh", "mesh": "tri" }, "material": "floor" }
        ]
    }"#;

    #[test]
    fn test_parse_scene_description() {
        let desc = SceneDescription::from_json(SCENE).unwrap();

        assert_eq!(desc.camera.width, 32);
        assert_eq!(desc.camera.up, Vec3::Y);
        assert_eq!(desc.camera.fov, 60.0);
        assert_eq!(desc.objects.len(), 3);
        assert_eq!(desc.lights.len(), 1);
        assert!(matches!(desc.light, LightDesc::Point { brightness, .. } if brightness == 2.0));

        let glass = desc.material("glass").unwrap();
        assert_eq!(glass.kind, MaterialKind::Refractive);
        assert_eq!(glass.ior, 1.33);
        // Unspecified fields fall back to defaults
        assert_eq!(glass.shininess, 32.0);

        assert_eq!(desc.mesh("tri").unwrap().to_mesh().triangle_count(), 1);
        assert!(matches!(desc.material("chrome"), Err(SceneError::UnknownMaterial(_))));
    }

    #[test]
    fn test_transform_from_euler_degrees() {
        let desc = SceneDescription::from_json(SCENE).unwrap();
        let sphere = &desc.objects[1];

        // 90 degrees about Y maps +X to -Z
        let m = sphere.transform.to_matrix();
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 1.0, -1.0)).length() < 1e-5);

        let floor = &desc.objects[0];
        assert_eq!(floor.transform.scale, Vec3::new(10.0, 1.0, 10.0));
        assert_eq!(floor.transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_transform_matrix_inverse() {
        let transform = Transform::from_euler_degrees(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(10.0, 45.0, -30.0),
            Vec3::new(2.0, 0.5, 1.0),
        );
        let p = Vec3::new(0.3, -0.7, 2.0);
        let back = transform
            .inverse_matrix()
            .transform_point3(transform.to_matrix().transform_point3(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = SceneDescription::from_json("{ \"camera\": 3 }").unwrap_err();
        assert!(matches!(err, SceneError::Json(_)));
    }

    #[test]
    fn test_load_scene_file_sets_base_dir_and_name() {
        let dir = std::env::temp_dir().join(format!("raylite_scene_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("demo.json");
        std::fs::write(&path, SCENE).unwrap();

        let desc = load_scene_file(&path).unwrap();
        assert_eq!(desc.name, "demo");
        assert_eq!(desc.base_dir.as_deref(), Some(dir.as_path()));

        assert!(matches!(
            load_scene_file(dir.join("missing.json")),
            Err(SceneError::Io { .. })
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
