//! Texture cache metrics

use serde::{Deserialize, Serialize};

use super::cache::TextureCache;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Snapshot of texture optimizer state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureStats {
    /// Distinct source textures with at least one resident variant
    pub total_textures: usize,
    /// Resident cache entries
    pub cached_textures: usize,
    pub memory_usage_bytes: u64,
    pub memory_usage_mb: f32,
    /// Fraction of source memory saved by the resident variants
    pub compression_ratio: f32,
    /// Hits over lookups since the cache was created or cleared
    pub cache_hit_rate: f32,
    /// Mean texel count of resident variants
    pub average_resolution: f32,
    pub mipmapped_textures: usize,
}

impl TextureStats {
    /// Compute stats from current cache contents
    pub fn collect(cache: &TextureCache) -> Self {
        let mut sources = Vec::new();
        let mut source_bytes = 0u64;
        let mut resident_bytes = 0u64;
        let mut resolution_sum = 0u64;
        let mut variant_count = 0usize;
        let mut mipmapped_textures = 0usize;

        for (key, entry) in cache.entries() {
            sources.push(key.texture);
            source_bytes += entry.source_bytes();
            resident_bytes += entry.memory_bytes();

            for variant in entry.variants() {
                resolution_sum += variant.resolution();
                variant_count += 1;
                if variant.generate_mipmaps {
                    mipmapped_textures += 1;
                }
            }
        }
        sources.sort_unstable();
        sources.dedup();

        let compression_ratio = if source_bytes == 0 {
            0.0
        } else {
            (1.0 - resident_bytes as f64 / source_bytes as f64) as f32
        };
        let average_resolution = if variant_count == 0 {
            0.0
        } else {
            resolution_sum as f32 / variant_count as f32
        };

        Self {
            total_textures: sources.len(),
            cached_textures: cache.len(),
            memory_usage_bytes: cache.memory_used(),
            memory_usage_mb: (cache.memory_used() as f64 / BYTES_PER_MB) as f32,
            compression_ratio,
            cache_hit_rate: cache.hit_rate(),
            average_resolution,
            mipmapped_textures,
        }
    }
}
