//! Texture optimization: variant pipeline, bounded cache and eviction

pub mod budget;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod optimizer;
pub mod pipeline;
pub mod role;
pub mod stats;
pub mod texture;

pub use budget::MemoryBudget;
pub use cache::{CacheKey, TextureCache, TextureCacheEntry};
pub use capabilities::{CompressionFamily, CompressionPreference, CompressionSupport, CompressionTag};
pub use config::{CacheStrategy, PreferredFormats, TextureOptimizationConfig, TextureOptimizationPatch};
pub use optimizer::TextureOptimizer;
pub use role::TextureRole;
pub use stats::TextureStats;
pub use texture::{PixelFormat, Texture, TextureFilter, TextureId, TextureVariant};
