//! Scene optimizer facade
//!
//! Owns the geometry catalog and, when the backend reported its compression
//! capabilities, a texture optimizer. [`SceneOptimizer::update`] runs once per
//! rendered frame:
//!
//! 1. propagate world transforms
//! 2. cull every tracked mesh (frustum + distance) and set its visibility
//! 3. pin the texture variants bound to visible meshes for this frame
//! 4. select LOD for visible meshes, swapping geometry and textures on change
//!    and rebinding any variant the cache no longer holds
//! 5. unbind evicted variants from hidden meshes
//! 6. recompute [`FrameStats`]
//!
//! Nothing on this path returns an error; missing resources fall back to the
//! original geometry or source texture.

use crate::core::camera::Camera;
use crate::core::time::FrameClock;
use crate::scene::{MeshNode, SceneGraph, SceneNodeId};
use crate::texture::{CompressionSupport, TextureOptimizer};

use super::catalog::GeometryCatalog;
use super::config::{OptimizationConfig, OptimizationConfigPatch};
use super::culling::VisibilityEvaluator;
use super::lod::update_lod;
use super::stats::{FrameStats, StatsAggregator};

/// Per-frame LOD, culling and texture-budget manager for one scene
pub struct SceneOptimizer {
    config: OptimizationConfig,
    catalog: GeometryCatalog,
    textures: Option<TextureOptimizer>,
    clock: FrameClock,
    stats: FrameStats,
}

impl SceneOptimizer {
    /// Create an optimizer
    ///
    /// Texture optimization is active only when `backend` describes the
    /// renderer's compression support.
    pub fn new(config: OptimizationConfig, backend: Option<CompressionSupport>) -> Self {
        let config = config.sanitized();
        let textures = backend.map(|support| TextureOptimizer::new(config.texture.clone(), support));

        log::info!(
            "Scene optimizer initialized: LOD {} ({} levels), frustum culling {}, distance culling {}, textures {}",
            config.enable_lod,
            config.lod_levels,
            config.enable_frustum_culling,
            config.enable_distance_culling,
            textures.is_some()
        );

        Self {
            config,
            catalog: GeometryCatalog::new(),
            textures,
            clock: FrameClock::new(),
            stats: FrameStats::default(),
        }
    }

    /// Start tracking every mesh under `object`
    pub fn register_object(&mut self, scene: &mut SceneGraph, object: SceneNodeId) {
        self.catalog
            .register(scene, object, &self.config, self.textures.as_mut());
    }

    /// Stop tracking `object`, restoring original geometry and textures
    pub fn unregister_object(&mut self, scene: &mut SceneGraph, object: SceneNodeId) {
        self.catalog.unregister(scene, object);
    }

    /// Run culling, LOD selection and stats for one frame
    pub fn update(&mut self, scene: &mut SceneGraph, camera: &Camera) {
        let frame = self.clock.begin_frame();
        scene.update_world_transforms();
        if let Some(textures) = self.textures.as_mut() {
            textures.begin_frame(frame);
        }

        self.update_visibility(scene, camera);

        if let Some(textures) = self.textures.as_mut() {
            for (id, record) in self.catalog.records() {
                if !record.visible {
                    continue;
                }
                let Some(mesh) = scene.mesh(id) else {
                    continue;
                };
                for key in mesh.materials.iter().flat_map(|m| m.bound_keys()) {
                    textures.pin(&key);
                }
            }
        }

        for (id, record) in self.catalog.records_mut() {
            let Some(mesh) = scene.mesh_mut(id) else {
                continue;
            };

            if record.visible {
                let distance = record.distance;
                let changed = update_lod(mesh, record, distance, &self.config, self.textures.as_mut());
                if !changed {
                    if let Some(textures) = self.textures.as_mut() {
                        rebind_evicted(mesh, record.current_lod, textures);
                    }
                }
            } else if let Some(textures) = self.textures.as_ref() {
                unbind_evicted(mesh, textures);
            }
        }

        self.stats = self.aggregate(scene, frame);
    }

    fn update_visibility(&mut self, scene: &mut SceneGraph, camera: &Camera) {
        let evaluator = VisibilityEvaluator::evaluate(camera, &self.config);

        for (id, record) in self.catalog.records_mut() {
            let Some(node) = scene.get(id) else {
                continue;
            };
            let result = evaluator.test(record.local_bounds(), &node.world_transform);
            record.visible = result.visible;
            record.distance = result.distance;
            scene.set_visible(id, result.visible);
        }
    }

    fn aggregate(&self, scene: &SceneGraph, frame: u64) -> FrameStats {
        let mut aggregator = StatsAggregator::new(frame);
        for (id, record) in self.catalog.records() {
            let Some(mesh) = scene.mesh(id) else {
                continue;
            };
            aggregator.record(
                record.visible,
                record.current_lod,
                record.triangle_count(),
                record.vertex_count(),
                mesh.geometry.triangle_count(),
                mesh.geometry.vertex_count(),
            );
        }
        aggregator.finish(self.textures.as_ref().map(TextureOptimizer::stats))
    }

    /// Statistics from the last update
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Merge a partial config; takes effect from the next update
    ///
    /// Already-built LOD variants are kept.
    pub fn update_config(&mut self, patch: OptimizationConfigPatch) {
        let texture_patch = patch.texture.clone();
        patch.apply(&mut self.config);
        if let (Some(textures), Some(texture_patch)) = (self.textures.as_mut(), texture_patch) {
            textures.update_config(texture_patch);
        }
        log::info!("Optimization config updated");
    }

    pub fn catalog(&self) -> &GeometryCatalog {
        &self.catalog
    }

    pub fn textures(&self) -> Option<&TextureOptimizer> {
        self.textures.as_ref()
    }

    /// Release every LOD variant and cached texture. Safe to call repeatedly.
    pub fn dispose(&mut self, scene: &mut SceneGraph) {
        if !self.catalog.is_empty() || self.catalog.object_count() > 0 {
            log::info!("Disposing scene optimizer ({} meshes)", self.catalog.len());
        }
        self.catalog.dispose(scene);
        if let Some(textures) = self.textures.as_mut() {
            textures.dispose();
        }
        self.stats = FrameStats::default();
    }
}

/// Re-optimize materials whose bound variants were evicted or never bound
fn rebind_evicted(mesh: &mut MeshNode, lod_level: u32, textures: &mut TextureOptimizer) {
    for material in &mut mesh.materials {
        if !material.kind().is_optimizable() {
            continue;
        }
        let stale = material
            .slots()
            .any(|(_, slot)| slot.bound().is_none_or(|bound| !textures.is_resident(&bound.key)));
        if stale {
            textures.optimize_material(material, lod_level);
        }
    }
}

/// Point slots of a hidden mesh back at their sources when their variant is gone
fn unbind_evicted(mesh: &mut MeshNode, textures: &TextureOptimizer) {
    for material in &mut mesh.materials {
        for (_, slot) in material.slots_mut() {
            let evicted = slot
                .bound()
                .is_some_and(|bound| !textures.is_resident(&bound.key));
            if evicted {
                slot.unbind();
            }
        }
    }
}
