//! Scene optimization configuration
//!
//! Plain serde value types. Out-of-range values are clamped by
//! [`OptimizationConfig::sanitize`] rather than rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::geometry::simplify::clamp_ratio;
use crate::texture::config::{TextureOptimizationConfig, TextureOptimizationPatch};

/// Upper bound on LOD levels, original included
pub const MAX_LOD_LEVELS: u32 = 8;

/// Widest accepted hysteresis dead zone, as a fraction of a threshold
pub const MAX_LOD_HYSTERESIS: f32 = 0.5;

/// Scene-level texture cache budget in megabytes
const SCENE_TEXTURE_CACHE_MB: u64 = 256;

/// Configuration snapshot for the scene optimizer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    pub enable_lod: bool,
    /// Number of LOD levels including the original (level 0)
    pub lod_levels: u32,
    /// Ascending distance thresholds; exceeding threshold i selects level i + 1
    pub lod_distances: Vec<f32>,
    /// Dead zone around each threshold, as a fraction of it. 0 disables.
    pub lod_hysteresis: f32,

    pub enable_simplification: bool,
    /// Base ratio; level i keeps ratio^i of the triangles
    pub simplification_ratio: f32,

    pub enable_frustum_culling: bool,
    pub enable_distance_culling: bool,
    pub culling_distance: f32,

    /// Reserved; not consulted by the optimizer
    pub enable_instancing: bool,
    pub instancing_min_count: u32,

    pub texture: TextureOptimizationConfig,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            enable_lod: true,
            lod_levels: 4,
            lod_distances: vec![100.0, 200.0, 500.0, 1000.0],
            lod_hysteresis: 0.0,
            enable_simplification: true,
            simplification_ratio: 0.5,
            enable_frustum_culling: true,
            enable_distance_culling: true,
            culling_distance: 5000.0,
            enable_instancing: false,
            instancing_min_count: 10,
            texture: TextureOptimizationConfig {
                max_cache_size_mb: SCENE_TEXTURE_CACHE_MB,
                ..Default::default()
            },
        }
    }
}

impl OptimizationConfig {
    /// Highest selectable LOD level
    pub fn max_lod_level(&self) -> u32 {
        self.lod_levels.saturating_sub(1)
    }

    /// Effective simplification ratio for a LOD level
    ///
    /// # Examples
    /// ```
    /// use sceneopt::optimize::OptimizationConfig;
    ///
    /// let config = OptimizationConfig::default();
    /// assert_eq!(config.ratio_for_level(0), 1.0);
    /// assert_eq!(config.ratio_for_level(2), 0.25);
    /// ```
    pub fn ratio_for_level(&self, level: u32) -> f32 {
        self.simplification_ratio.powi(level as i32)
    }

    /// Clamp every field into its valid range
    pub fn sanitize(&mut self) {
        self.simplification_ratio = clamp_ratio(self.simplification_ratio);
        self.lod_levels = self.lod_levels.clamp(1, MAX_LOD_LEVELS);

        self.lod_distances.retain(|d| d.is_finite());
        for distance in &mut self.lod_distances {
            *distance = distance.max(0.0);
        }
        self.lod_distances.sort_by(f32::total_cmp);

        self.lod_hysteresis = if self.lod_hysteresis.is_finite() {
            self.lod_hysteresis.clamp(0.0, MAX_LOD_HYSTERESIS)
        } else {
            0.0
        };

        self.culling_distance = if self.culling_distance.is_nan() {
            0.0
        } else {
            self.culling_distance.max(0.0)
        };

        self.texture.sanitize();
    }

    /// Sanitized copy
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON; missing fields take defaults, the result is sanitized
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config.sanitized())
    }
}

/// Partial update for [`OptimizationConfig`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfigPatch {
    pub enable_lod: Option<bool>,
    pub lod_levels: Option<u32>,
    pub lod_distances: Option<Vec<f32>>,
    pub lod_hysteresis: Option<f32>,
    pub enable_simplification: Option<bool>,
    pub simplification_ratio: Option<f32>,
    pub enable_frustum_culling: Option<bool>,
    pub enable_distance_culling: Option<bool>,
    pub culling_distance: Option<f32>,
    pub enable_instancing: Option<bool>,
    pub instancing_min_count: Option<u32>,
    pub texture: Option<TextureOptimizationPatch>,
}

impl OptimizationConfigPatch {
    /// Merge set fields into `config`, then sanitize it
    pub fn apply(self, config: &mut OptimizationConfig) {
        let patch = self;
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field { config.$field = value; })*
            };
        }
        merge!(
            enable_lod,
            lod_levels,
            lod_distances,
            lod_hysteresis,
            enable_simplification,
            simplification_ratio,
            enable_frustum_culling,
            enable_distance_culling,
            culling_distance,
            enable_instancing,
            instancing_min_count,
        );
        if let Some(texture) = patch.texture {
            texture.apply(&mut config.texture);
        }
        config.sanitize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::config::CacheStrategy;

    #[test]
    fn test_defaults() {
        let config = OptimizationConfig::default();
        assert!(config.enable_lod);
        assert_eq!(config.lod_levels, 4);
        assert_eq!(config.lod_distances, vec![100.0, 200.0, 500.0, 1000.0]);
        assert_eq!(config.simplification_ratio, 0.5);
        assert_eq!(config.culling_distance, 5000.0);
        assert!(!config.enable_instancing);
        assert_eq!(config.instancing_min_count, 10);
        assert_eq!(config.texture.max_cache_size_mb, 256);
        assert_eq!(config.texture.cache_strategy, CacheStrategy::Lru);
    }

    #[test]
    fn test_sanitize_clamps() {
        let mut config = OptimizationConfig {
            lod_levels: 0,
            lod_distances: vec![500.0, f32::NAN, -10.0, 100.0, f32::INFINITY],
            lod_hysteresis: 2.0,
            simplification_ratio: -1.0,
            culling_distance: -5.0,
            ..Default::default()
        };
        config.sanitize();

        assert_eq!(config.lod_levels, 1);
        assert_eq!(config.lod_distances, vec![0.0, 100.0, 500.0]);
        assert_eq!(config.lod_hysteresis, MAX_LOD_HYSTERESIS);
        assert_eq!(config.simplification_ratio, 0.01);
        assert_eq!(config.culling_distance, 0.0);

        config.lod_levels = 100;
        config.simplification_ratio = 3.0;
        config.sanitize();
        assert_eq!(config.lod_levels, MAX_LOD_LEVELS);
        assert_eq!(config.simplification_ratio, 1.0);
    }

    #[test]
    fn test_ratio_for_level() {
        let config = OptimizationConfig::default();
        assert_eq!(config.ratio_for_level(1), 0.5);
        assert_eq!(config.ratio_for_level(3), 0.125);
        assert_eq!(config.max_lod_level(), 3);
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut config = OptimizationConfig::default();
        OptimizationConfigPatch {
            enable_lod: Some(false),
            culling_distance: Some(250.0),
            texture: Some(TextureOptimizationPatch {
                cache_strategy: Some(CacheStrategy::Distance),
                ..Default::default()
            }),
            ..Default::default()
        }
        .apply(&mut config);

        assert!(!config.enable_lod);
        assert_eq!(config.culling_distance, 250.0);
        assert_eq!(config.texture.cache_strategy, CacheStrategy::Distance);
        assert_eq!(config.lod_levels, 4);
        assert_eq!(config.texture.max_cache_size_mb, 256);
    }

    #[test]
    fn test_patch_is_sanitized() {
        let mut config = OptimizationConfig::default();
        OptimizationConfigPatch {
            simplification_ratio: Some(0.0),
            lod_distances: Some(vec![300.0, 50.0]),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.simplification_ratio, 0.01);
        assert_eq!(config.lod_distances, vec![50.0, 300.0]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("optimizer.json");

        let config = OptimizationConfig {
            lod_levels: 3,
            lod_hysteresis: 0.05,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = OptimizationConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(
            &path,
            r#"{ "lod_levels": 2, "texture": { "cache_strategy": "importance" } }"#,
        )
        .unwrap();

        let loaded = OptimizationConfig::load(&path).unwrap();
        assert_eq!(loaded.lod_levels, 2);
        assert_eq!(loaded.texture.cache_strategy, CacheStrategy::Importance);
        assert_eq!(loaded.culling_distance, 5000.0);
        // Nested defaults come from the texture config itself
        assert_eq!(loaded.texture.max_cache_size_mb, 512);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = OptimizationConfig::load(&path);
        assert!(matches!(result, Err(crate::core::Error::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = OptimizationConfig::load(Path::new("/nonexistent/sceneopt.json"));
        assert!(matches!(result, Err(crate::core::Error::Io(_))));
    }
}
