//! Distance-based LOD selection and switching
//!
//! Levels run from 0 (original geometry) to `lod_levels - 1`. Exceeding the
//! threshold at index i selects level i + 1, capped at the highest level.
//! Comparisons are strict, so a distance exactly on a threshold keeps the
//! finer level.

use crate::scene::MeshNode;
use crate::texture::TextureOptimizer;

use super::catalog::GeometryRecord;
use super::config::OptimizationConfig;

/// LOD level for a distance
///
/// `thresholds` must be ascending.
///
/// # Examples
/// ```
/// use sceneopt::optimize::lod::select_lod_level;
///
/// let thresholds = [100.0, 200.0, 500.0, 1000.0];
/// assert_eq!(select_lod_level(50.0, &thresholds, 4), 0);
/// assert_eq!(select_lod_level(150.0, &thresholds, 4), 1);
/// assert_eq!(select_lod_level(600.0, &thresholds, 4), 3);
/// assert_eq!(select_lod_level(5000.0, &thresholds, 4), 3); // capped
/// ```
pub fn select_lod_level(distance: f32, thresholds: &[f32], lod_levels: u32) -> u32 {
    let exceeded = thresholds.iter().take_while(|&&t| distance > t).count() as u32;
    exceeded.min(lod_levels.saturating_sub(1))
}

/// LOD level with a dead zone of `margin` (fraction of each threshold)
///
/// Moving to a coarser level needs the distance to exceed the threshold by
/// the margin; moving back needs it to fall below by the margin. A margin of
/// 0 behaves exactly like [`select_lod_level`].
///
/// # Examples
/// ```
/// use sceneopt::optimize::lod::select_lod_level_with_hysteresis;
///
/// let thresholds = [100.0, 200.0];
/// // Just past 100 but inside the 5% dead zone: stay at 0
/// assert_eq!(select_lod_level_with_hysteresis(103.0, 0, &thresholds, 3, 0.05), 0);
/// // Same distance coming from level 1: stay at 1
/// assert_eq!(select_lod_level_with_hysteresis(103.0, 1, &thresholds, 3, 0.05), 1);
/// assert_eq!(select_lod_level_with_hysteresis(110.0, 0, &thresholds, 3, 0.05), 1);
/// ```
pub fn select_lod_level_with_hysteresis(
    distance: f32,
    current: u32,
    thresholds: &[f32],
    lod_levels: u32,
    margin: f32,
) -> u32 {
    if margin <= 0.0 {
        return select_lod_level(distance, thresholds, lod_levels);
    }

    let coarser = select_lod_level(distance / (1.0 + margin), thresholds, lod_levels);
    if coarser > current {
        return coarser;
    }
    let finer = select_lod_level(distance / (1.0 - margin), thresholds, lod_levels);
    if finer < current {
        return finer;
    }
    current
}

/// Target level for a record under the current config
///
/// With LOD disabled every object goes back to level 0.
pub fn target_level(record: &GeometryRecord, distance: f32, config: &OptimizationConfig) -> u32 {
    if !config.enable_lod {
        return 0;
    }
    select_lod_level_with_hysteresis(
        distance,
        record.current_lod,
        &config.lod_distances,
        config.lod_levels,
        config.lod_hysteresis,
    )
}

/// Select and apply the LOD level for one mesh
///
/// Only swaps when the level changes. Returns true on a transition.
pub fn update_lod(
    mesh: &mut MeshNode,
    record: &mut GeometryRecord,
    distance: f32,
    config: &OptimizationConfig,
    textures: Option<&mut TextureOptimizer>,
) -> bool {
    let level = target_level(record, distance, config);
    if level == record.current_lod {
        return false;
    }
    apply_lod(mesh, record, level, textures);
    true
}

/// Bind the geometry and texture variants for `level`
pub fn apply_lod(
    mesh: &mut MeshNode,
    record: &mut GeometryRecord,
    level: u32,
    textures: Option<&mut TextureOptimizer>,
) {
    log::trace!("LOD {} -> {} at distance {:.1}", record.current_lod, level, record.distance);

    mesh.geometry = record.geometry_for_level(level);
    if let Some(textures) = textures {
        for material in &mut mesh.materials {
            textures.optimize_material(material, level);
        }
    }
    record.current_lod = level;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::types::Vec3;
    use crate::geometry::Geometry;
    use crate::scene::{Material, SceneNodeId};
    use crate::texture::{CompressionSupport, PixelFormat, Texture, TextureId, TextureOptimizationConfig, TextureRole};

    const THRESHOLDS: [f32; 4] = [100.0, 200.0, 500.0, 1000.0];

    fn strip(n: usize) -> Arc<Geometry> {
        let positions: Vec<Vec3> = (0..n + 2).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let indices: Vec<u32> = (0..n as u32).flat_map(|i| [i, i + 1, i + 2]).collect();
        Arc::new(Geometry::indexed(positions, indices))
    }

    fn mesh_and_record(config: &OptimizationConfig) -> (MeshNode, GeometryRecord) {
        let geometry = strip(1000);
        let record = GeometryRecord::new(SceneNodeId(1), geometry.clone(), config);
        (MeshNode::new(geometry), record)
    }

    #[test]
    fn test_distance_scenario() {
        assert_eq!(select_lod_level(50.0, &THRESHOLDS, 4), 0);
        assert_eq!(select_lod_level(150.0, &THRESHOLDS, 4), 1);
        assert_eq!(select_lod_level(600.0, &THRESHOLDS, 4), 3);
    }

    #[test]
    fn test_threshold_equality_stays_finer() {
        assert_eq!(select_lod_level(100.0, &THRESHOLDS, 4), 0);
        assert_eq!(select_lod_level(200.0, &THRESHOLDS, 4), 1);
        assert_eq!(select_lod_level(100.001, &THRESHOLDS, 4), 1);
    }

    #[test]
    fn test_level_always_in_range() {
        for levels in 1..=6 {
            for d in [0.0, 99.0, 101.0, 250.0, 750.0, 1e6, f32::INFINITY] {
                assert!(select_lod_level(d, &THRESHOLDS, levels) < levels);
            }
        }
        assert_eq!(select_lod_level(f32::NAN, &THRESHOLDS, 4), 0);
        assert_eq!(select_lod_level(500.0, &[], 4), 0);
    }

    #[test]
    fn test_fewer_thresholds_than_levels() {
        assert_eq!(select_lod_level(1e6, &[10.0], 4), 1);
    }

    #[test]
    fn test_hysteresis_dead_zone() {
        let t = [100.0];
        // Oscillating around 100 within 5% never switches from either side
        for d in [96.0, 99.0, 101.0, 104.0] {
            assert_eq!(select_lod_level_with_hysteresis(d, 0, &t, 2, 0.05), 0);
            assert_eq!(select_lod_level_with_hysteresis(d, 1, &t, 2, 0.05), 1);
        }
        assert_eq!(select_lod_level_with_hysteresis(106.0, 0, &t, 2, 0.05), 1);
        assert_eq!(select_lod_level_with_hysteresis(94.0, 1, &t, 2, 0.05), 0);
    }

    #[test]
    fn test_hysteresis_follows_level_cap() {
        // Current level above the cap after a config change drops immediately
        assert_eq!(select_lod_level_with_hysteresis(5000.0, 5, &THRESHOLDS, 2, 0.05), 1);
    }

    #[test]
    fn test_update_lod_transitions() {
        let config = OptimizationConfig::default();
        let (mut mesh, mut record) = mesh_and_record(&config);

        assert!(!update_lod(&mut mesh, &mut record, 50.0, &config, None));
        assert_eq!(record.current_lod, 0);

        assert!(update_lod(&mut mesh, &mut record, 150.0, &config, None));
        assert_eq!(record.current_lod, 1);
        assert_eq!(mesh.geometry.triangle_count(), 500);

        assert!(!update_lod(&mut mesh, &mut record, 160.0, &config, None));

        assert!(update_lod(&mut mesh, &mut record, 600.0, &config, None));
        assert_eq!(record.current_lod, 3);
        assert_eq!(mesh.geometry.triangle_count(), 125);

        assert!(update_lod(&mut mesh, &mut record, 10.0, &config, None));
        assert!(Arc::ptr_eq(&mesh.geometry, record.original()));
    }

    #[test]
    fn test_disabled_lod_returns_to_original() {
        let mut config = OptimizationConfig::default();
        let (mut mesh, mut record) = mesh_and_record(&config);
        update_lod(&mut mesh, &mut record, 900.0, &config, None);
        assert_eq!(record.current_lod, 3);

        config.enable_lod = false;
        assert!(update_lod(&mut mesh, &mut record, 900.0, &config, None));
        assert_eq!(record.current_lod, 0);
        assert_eq!(mesh.geometry.triangle_count(), 1000);
    }

    #[test]
    fn test_missing_variant_falls_back_to_original() {
        let config = OptimizationConfig {
            enable_simplification: false,
            ..Default::default()
        };
        let (mut mesh, mut record) = mesh_and_record(&config);
        assert!(update_lod(&mut mesh, &mut record, 300.0, &config, None));
        assert_eq!(record.current_lod, 2);
        assert_eq!(mesh.geometry.triangle_count(), 1000);
    }

    #[test]
    fn test_transition_rebinds_textures() {
        let config = OptimizationConfig::default();
        let (mesh, mut record) = mesh_and_record(&config);
        let texture = Arc::new(Texture::descriptor(TextureId(9), "albedo", 256, 256, PixelFormat::Rgba));
        let mut mesh = mesh.with_material(Material::standard("m").with_texture(TextureRole::Map, texture));
        let mut textures = TextureOptimizer::new(TextureOptimizationConfig::default(), CompressionSupport::none());

        update_lod(&mut mesh, &mut record, 300.0, &config, Some(&mut textures));

        let bound = mesh.materials[0].slot(TextureRole::Map).unwrap().bound().unwrap();
        assert_eq!(bound.key.lod_level, 2);
        // Level 2 scale 0.6
        assert_eq!(bound.texture.width, 153);
    }
}
