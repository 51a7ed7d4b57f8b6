//! Per-frame scene optimization: culling, LOD and statistics

pub mod catalog;
pub mod config;
pub mod culling;
pub mod lod;
pub mod optimizer;
pub mod stats;

pub use catalog::{GeometryCatalog, GeometryRecord};
pub use config::{OptimizationConfig, OptimizationConfigPatch};
pub use culling::{Visibility, VisibilityEvaluator};
pub use optimizer::SceneOptimizer;
pub use stats::{FrameStats, StatsAggregator};
