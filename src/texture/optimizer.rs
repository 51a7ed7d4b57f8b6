//! Texture optimizer: runs the variant pipeline and owns the cache
//!
//! The compression tag is resolved from backend capabilities once, at
//! construction and again on config updates, and then stamped on every
//! variant. Optimizing never fails: a texture whose variant cannot be cached
//! is still returned and bound.

use std::sync::Arc;

use crate::core::time::FrameClock;
use crate::scene::material::Material;

use super::cache::{CacheKey, TextureCache, TextureCacheEntry};
use super::capabilities::{CompressionSupport, CompressionTag};
use super::config::{TextureOptimizationConfig, TextureOptimizationPatch};
use super::pipeline::build_variant;
use super::role::TextureRole;
use super::stats::TextureStats;
use super::texture::{Texture, TextureVariant};

/// Builds, caches and binds optimized texture variants
pub struct TextureOptimizer {
    config: TextureOptimizationConfig,
    support: CompressionSupport,
    compression: CompressionTag,
    cache: TextureCache,
    clock: FrameClock,
}

impl TextureOptimizer {
    /// Create an optimizer for a backend with the given compression support
    pub fn new(mut config: TextureOptimizationConfig, support: CompressionSupport) -> Self {
        config.sanitize();
        let compression = resolve_compression(&config, &support);
        let cache = TextureCache::new(config.budget_bytes(), config.cache_strategy);

        log::info!(
            "Texture optimizer initialized: {} MB cache ({:?}), compression {:?}",
            config.max_cache_size_mb,
            config.cache_strategy,
            compression
        );

        Self {
            config,
            support,
            compression,
            cache,
            clock: FrameClock::new(),
        }
    }

    pub fn config(&self) -> &TextureOptimizationConfig {
        &self.config
    }

    /// Compression tag applied to new variants
    pub fn compression(&self) -> CompressionTag {
        self.compression
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    /// Optimized variant of `texture` for a role and LOD level
    ///
    /// Served from the cache when resident (refreshing recency and reference
    /// count), otherwise built and inserted, which may evict other entries.
    pub fn optimize_texture(
        &mut self,
        texture: &Arc<Texture>,
        role: TextureRole,
        lod_level: u32,
    ) -> Arc<TextureVariant> {
        self.optimize_texture_sparing(texture, role, lod_level, &[])
    }

    /// Like [`optimize_texture`], but an insertion never evicts `protect`
    ///
    /// [`optimize_texture`]: TextureOptimizer::optimize_texture
    fn optimize_texture_sparing(
        &mut self,
        texture: &Arc<Texture>,
        role: TextureRole,
        lod_level: u32,
        protect: &[CacheKey],
    ) -> Arc<TextureVariant> {
        let key = CacheKey::new(texture.id(), role, lod_level);
        let stamp = self.clock.stamp();

        if self.config.enable_texture_cache {
            if let Some(variant) = self.cache.touch(&key, stamp) {
                return variant;
            }
        }
        self.cache.record_miss();

        let variant = Arc::new(build_variant(texture, role, lod_level, &self.config, self.compression));
        let evicted = self.cache.insert_protected(
            key,
            TextureCacheEntry::new(texture, Arc::clone(&variant), stamp),
            protect,
        );
        if !evicted.is_empty() {
            log::debug!("Inserting {} evicted {} texture cache entries", key, evicted.len());
        }

        variant
    }

    /// Optimize and bind every texture slot of `material` for a LOD level
    ///
    /// Unsupported material kinds are left untouched. Returns the number of
    /// slots bound.
    pub fn optimize_material(&mut self, material: &mut Material, lod_level: u32) -> usize {
        if !material.kind().is_optimizable() {
            log::debug!(
                "Skipping texture optimization for material '{}' ({:?})",
                material.name,
                material.kind()
            );
            return 0;
        }

        let mut bound: Vec<CacheKey> = Vec::new();
        for (role, slot) in material.slots_mut() {
            let source = Arc::clone(slot.source());
            // Later slots of this material must not evict earlier ones
            let variant = self.optimize_texture_sparing(&source, role, lod_level, &bound);
            let key = CacheKey::new(source.id(), role, lod_level);
            self.cache.pin(&key);
            slot.bind(key, variant);
            bound.push(key);
        }
        bound.len()
    }

    /// Merge a partial config and apply it to the cache
    pub fn update_config(&mut self, patch: TextureOptimizationPatch) {
        patch.apply(&mut self.config);

        let compression = resolve_compression(&self.config, &self.support);
        if compression != self.compression {
            log::info!("Texture compression changed: {:?} -> {:?}", self.compression, compression);
            self.compression = compression;
        }

        self.cache.set_strategy(self.config.cache_strategy);
        let evicted = self.cache.set_budget(self.config.budget_bytes());
        if !evicted.is_empty() {
            log::debug!("Budget change evicted {} texture cache entries", evicted.len());
        }
    }

    /// Start a frame: pins from earlier frames lapse
    pub fn begin_frame(&mut self, frame: u64) {
        self.cache.begin_frame(frame);
    }

    /// Keep `key` resident until the next frame begins
    pub fn pin(&mut self, key: &CacheKey) -> bool {
        self.cache.pin(key)
    }

    /// Whether the variant behind `key` is still owned by the cache
    pub fn is_resident(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    pub fn stats(&self) -> TextureStats {
        TextureStats::collect(&self.cache)
    }

    /// Drop every cached variant. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.cache.is_empty() {
            return;
        }
        log::info!("Disposing texture cache ({} entries)", self.cache.len());
        self.cache.clear();
    }
}

fn resolve_compression(config: &TextureOptimizationConfig, support: &CompressionSupport) -> CompressionTag {
    let tag = support.resolve(config.compression_format);
    if config.enable_compression && tag == CompressionTag::Uncompressed {
        log::warn!(
            "No supported texture compression for {:?}; variants stay uncompressed",
            config.compression_format
        );
    }
    tag
}
