//! Renderable geometry buffers
//!
//! Vertex attributes are held behind `Arc<[T]>` so LOD variants can share the
//! original vertex data and differ only in their index buffer.

use std::sync::Arc;

use crate::core::types::{Vec2, Vec3};
use crate::math::Aabb;

/// Triangle geometry with optional index buffer
///
/// An empty position buffer means the geometry has no position attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    positions: Arc<[Vec3]>,
    normals: Option<Arc<[Vec3]>>,
    uvs: Option<Arc<[Vec2]>>,
    indices: Option<Arc<[u32]>>,
}

impl Geometry {
    /// Non-indexed geometry from positions (every three positions form a triangle)
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions: positions.into(),
            normals: None,
            uvs: None,
            indices: None,
        }
    }

    /// Indexed triangle geometry
    pub fn indexed(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self::new(positions).with_indices(indices)
    }

    /// Geometry with no attributes at all
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals.into());
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs.into());
        self
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices.into());
        self
    }

    /// Same vertex attributes, different index buffer
    pub(crate) fn with_index_buffer(&self, indices: Vec<u32>) -> Self {
        Self {
            positions: Arc::clone(&self.positions),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            indices: Some(indices.into()),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn has_positions(&self) -> bool {
        !self.positions.is_empty()
    }

    /// True when both geometries reference the same position buffer
    pub fn shares_vertices_with(&self, other: &Geometry) -> bool {
        Arc::ptr_eq(&self.positions, &other.positions)
    }

    /// Triangle count: index count / 3, or position count / 3 without indices
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Vertex count (position attribute length)
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Local-space bounds of the position buffer, `None` without positions
    pub fn compute_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter())
    }
}
