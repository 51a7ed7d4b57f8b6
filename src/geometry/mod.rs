//! Mesh geometry and LOD simplification

pub mod mesh;
pub mod simplify;

pub use mesh::Geometry;
pub use simplify::{simplify, try_simplify, MIN_SIMPLIFICATION_RATIO};
