//! Texture optimization configuration

use serde::{Deserialize, Serialize};

use super::capabilities::CompressionPreference;
use super::texture::{PixelFormat, TextureFilter};

/// Rule for choosing which cache entries to discard when over budget
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheStrategy {
    /// Oldest last-used first
    #[default]
    #[serde(rename = "LRU")]
    Lru,
    /// Fewest references first, a cheap stand-in for distance to camera
    #[serde(rename = "distance")]
    Distance,
    /// Lowest role importance first
    #[serde(rename = "importance")]
    Importance,
}

/// Preferred channel formats per texture class
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreferredFormats {
    pub diffuse: PixelFormat,
    pub normal: PixelFormat,
    pub roughness: PixelFormat,
    pub metalness: PixelFormat,
}

impl Default for PreferredFormats {
    fn default() -> Self {
        Self {
            diffuse: PixelFormat::Rgba,
            normal: PixelFormat::Rgba,
            roughness: PixelFormat::Red,
            metalness: PixelFormat::Red,
        }
    }
}

/// Largest accepted texture edge
pub const MAX_TEXTURE_EDGE: u32 = 16_384;

/// Per-texture pipeline and cache settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureOptimizationConfig {
    pub enable_compression: bool,
    pub compression_format: CompressionPreference,

    pub enable_resolution_scaling: bool,
    /// Upper bound for each axis of a downscaled variant
    pub max_texture_size: u32,
    /// Scale factor per LOD level; levels past the end are not scaled
    pub lod_texture_scaling: Vec<f32>,

    pub enable_texture_cache: bool,
    /// Cache budget in megabytes
    pub max_cache_size_mb: u64,
    pub cache_strategy: CacheStrategy,

    pub enable_mipmaps: bool,
    pub mipmap_filter: TextureFilter,

    pub enable_format_optimization: bool,
    pub preferred_formats: PreferredFormats,
}

impl Default for TextureOptimizationConfig {
    fn default() -> Self {
        Self {
            enable_compression: true,
            compression_format: CompressionPreference::Auto,
            enable_resolution_scaling: true,
            max_texture_size: 1024,
            lod_texture_scaling: vec![1.0, 0.8, 0.6, 0.4],
            enable_texture_cache: true,
            max_cache_size_mb: 512,
            cache_strategy: CacheStrategy::Lru,
            enable_mipmaps: true,
            mipmap_filter: TextureFilter::LinearMipmapLinear,
            enable_format_optimization: true,
            preferred_formats: PreferredFormats::default(),
        }
    }
}

impl TextureOptimizationConfig {
    /// Cache budget in bytes
    pub fn budget_bytes(&self) -> u64 {
        self.max_cache_size_mb.saturating_mul(1024 * 1024)
    }

    /// Clamp out-of-range values to the nearest valid bound
    pub fn sanitize(&mut self) {
        self.max_texture_size = self.max_texture_size.clamp(1, MAX_TEXTURE_EDGE);
        for (level, scale) in self.lod_texture_scaling.iter_mut().enumerate() {
            *scale = if level == 0 || !scale.is_finite() {
                1.0
            } else {
                scale.clamp(f32::EPSILON, 1.0)
            };
        }
    }

    /// Scale factor for a LOD level (level 0 is never rescaled)
    pub fn scale_for_level(&self, lod_level: u32) -> f32 {
        if lod_level == 0 {
            return 1.0;
        }
        self.lod_texture_scaling
            .get(lod_level as usize)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Partial update for [`TextureOptimizationConfig`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureOptimizationPatch {
    pub enable_compression: Option<bool>,
    pub compression_format: Option<CompressionPreference>,
    pub enable_resolution_scaling: Option<bool>,
    pub max_texture_size: Option<u32>,
    pub lod_texture_scaling: Option<Vec<f32>>,
    pub enable_texture_cache: Option<bool>,
    pub max_cache_size_mb: Option<u64>,
    pub cache_strategy: Option<CacheStrategy>,
    pub enable_mipmaps: Option<bool>,
    pub mipmap_filter: Option<TextureFilter>,
    pub enable_format_optimization: Option<bool>,
    pub preferred_formats: Option<PreferredFormats>,
}

impl TextureOptimizationPatch {
    /// Merge set fields into `config`, then sanitize it
    pub fn apply(self, config: &mut TextureOptimizationConfig) {
        let patch = self;
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field { config.$field = value; })*
            };
        }
        merge!(
            enable_compression,
            compression_format,
            enable_resolution_scaling,
            max_texture_size,
            lod_texture_scaling,
            enable_texture_cache,
            max_cache_size_mb,
            cache_strategy,
            enable_mipmaps,
            mipmap_filter,
            enable_format_optimization,
            preferred_formats,
        );
        config.sanitize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TextureOptimizationConfig::default();
        assert_eq!(config.max_texture_size, 1024);
        assert_eq!(config.lod_texture_scaling, vec![1.0, 0.8, 0.6, 0.4]);
        assert_eq!(config.cache_strategy, CacheStrategy::Lru);
        assert_eq!(config.budget_bytes(), 512 * 1024 * 1024);
        assert_eq!(config.mipmap_filter, TextureFilter::LinearMipmapLinear);
        assert_eq!(config.preferred_formats.roughness, PixelFormat::Red);
    }

    #[test]
    fn test_scale_for_level() {
        let config = TextureOptimizationConfig::default();
        assert_eq!(config.scale_for_level(0), 1.0);
        assert_eq!(config.scale_for_level(1), 0.8);
        assert_eq!(config.scale_for_level(3), 0.4);
        assert_eq!(config.scale_for_level(9), 1.0);
    }

    #[test]
    fn test_sanitize_clamps() {
        let mut config = TextureOptimizationConfig {
            max_texture_size: 0,
            lod_texture_scaling: vec![0.5, -1.0, 3.0, f32::NAN],
            ..Default::default()
        };
        config.sanitize();
        assert_eq!(config.max_texture_size, 1);
        assert_eq!(config.lod_texture_scaling[0], 1.0);
        assert!(config.lod_texture_scaling[1] > 0.0);
        assert_eq!(config.lod_texture_scaling[2], 1.0);
        assert_eq!(config.lod_texture_scaling[3], 1.0);
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut config = TextureOptimizationConfig::default();
        TextureOptimizationPatch {
            max_cache_size_mb: Some(64),
            cache_strategy: Some(CacheStrategy::Importance),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.max_cache_size_mb, 64);
        assert_eq!(config.cache_strategy, CacheStrategy::Importance);
        assert!(config.enable_mipmaps);
        assert_eq!(config.max_texture_size, 1024);
    }

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(serde_json::to_string(&CacheStrategy::Lru).unwrap(), "\"LRU\"");
        let parsed: CacheStrategy = serde_json::from_str("\"importance\"").unwrap();
        assert_eq!(parsed, CacheStrategy::Importance);
    }

    #[test]
    fn test_patch_from_partial_json() {
        let patch: TextureOptimizationPatch =
            serde_json::from_str(r#"{ "enable_mipmaps": false, "cache_strategy": "distance" }"#).unwrap();
        let mut config = TextureOptimizationConfig::default();
        patch.apply(&mut config);
        assert!(!config.enable_mipmaps);
        assert_eq!(config.cache_strategy, CacheStrategy::Distance);
    }
}
