//! Mesh geometry handed to the renderer by asset loaders.
//!
//! The renderer never parses mesh files itself. Loaders (or code building
//! geometry by hand) produce a `Mesh`, and the renderer consumes its ordered
//! triangle list.

use raylite_math::{Aabb, Vec2, Vec3};

/// One face of a mesh, with optional per-vertex UVs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshTriangle {
    pub positions: [Vec3; 3],
    pub uvs: Option<[Vec2; 3]>,
}

/// An indexed triangle mesh. Immutable once built.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// UV coordinates (optional - one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self::with_uvs(positions, indices, None)
    }

    /// Create a new mesh with UV coordinates.
    ///
    /// UVs whose count doesn't match the vertex count are dropped.
    pub fn with_uvs(positions: Vec<Vec3>, indices: Vec<u32>, uvs: Option<Vec<Vec2>>) -> Self {
        let uvs = match uvs {
            Some(uvs) if uvs.len() != positions.len() => {
                log::warn!(
                    "UV count ({}) doesn't match vertex count ({}), ignoring UVs",
                    uvs.len(),
                    positions.len()
                );
                None
            }
            other => other,
        };
        let bounds = Aabb::from_point_cloud(positions.iter().copied());
        Self {
            positions,
            uvs,
            indices,
            bounds,
        }
    }

    /// Build an unindexed mesh from a flat triangle soup.
    pub fn from_triangles(triangles: &[[Vec3; 3]]) -> Self {
        let positions: Vec<Vec3> = triangles.iter().flatten().copied().collect();
        let indices = (0..positions.len() as u32).collect();
        Self::new(positions, indices)
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// The ordered triangle list.
    ///
    /// Faces referencing a vertex that doesn't exist are skipped with a
    /// warning; a trailing partial face is ignored.
    pub fn triangles(&self) -> Vec<MeshTriangle> {
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for chunk in self.indices.chunks_exact(3) {
            let idx = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];

            if idx.iter().any(|&i| i >= self.positions.len()) {
                log::warn!(
                    "Invalid triangle indices: {:?}, vertex count: {}",
                    idx,
                    self.positions.len()
                );
                continue;
            }

            triangles.push(MeshTriangle {
                positions: idx.map(|i| self.positions[i]),
                uvs: self.uvs.as_ref().map(|uvs| idx.map(|i| uvs[i])),
            });
        }

        triangles
    }
}
