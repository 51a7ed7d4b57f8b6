//! Scene graph of meshes and materials

pub mod graph;
pub mod material;
pub mod node;

pub use graph::SceneGraph;
pub use material::{BoundVariant, Material, MaterialKind, TextureSlot};
pub use node::{LocalTransform, MeshNode, NodeContent, SceneNode, SceneNodeId};
