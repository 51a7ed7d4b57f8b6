//! Scene graph node types
//!
//! Node IDs, transforms, content variants, and nodes.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::geometry::Geometry;
use crate::math::Aabb;

use super::material::Material;

/// Unique identifier for a scene graph node.
///
/// Opaque and stable for the node's lifetime; never reused by a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub u64);

/// Local transform relative to the parent node.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    /// Identity transform (no translation, rotation, or scaling).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        )
    }
}

/// A renderable mesh: the active geometry plus its materials.
///
/// `geometry` is the binding the renderer draws. The optimizer swaps it between
/// the original and simplified LOD variants.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub geometry: Arc<Geometry>,
    pub materials: Vec<Material>,
}

impl MeshNode {
    pub fn new(geometry: Arc<Geometry>) -> Self {
        Self {
            geometry,
            materials: Vec::new(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    /// Bounds of the active geometry in local space.
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.geometry.compute_bounds()
    }
}

/// What a scene node contains.
#[derive(Clone, Debug)]
pub enum NodeContent {
    /// A grouping node with no geometry of its own.
    Group,

    /// A mesh with geometry and materials.
    Mesh(MeshNode),
}

/// A single node in the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
    pub local_transform: LocalTransform,
    /// Cached world transform (recomputed during propagation).
    pub world_transform: Mat4,
    pub visible: bool,
    pub content: NodeContent,
}

impl SceneNode {
    /// Create a new scene node.
    pub fn new(id: SceneNodeId, name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: LocalTransform::identity(),
            world_transform: Mat4::IDENTITY,
            visible: true,
            content,
        }
    }

    pub fn mesh(&self) -> Option<&MeshNode> {
        match &self.content {
            NodeContent::Mesh(mesh) => Some(mesh),
            NodeContent::Group => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshNode> {
        match &mut self.content {
            NodeContent::Mesh(mesh) => Some(mesh),
            NodeContent::Group => None,
        }
    }

    /// World-space position of the node origin.
    pub fn world_position(&self) -> Vec3 {
        self.world_transform.transform_point3(Vec3::ZERO)
    }
}
