//! Sceneopt - LOD, culling and texture budget management for large 3D scenes

pub mod core;
pub mod math;
pub mod geometry;
pub mod scene;
pub mod texture;
pub mod optimize;

pub use optimize::{FrameStats, OptimizationConfig, OptimizationConfigPatch, SceneOptimizer};
