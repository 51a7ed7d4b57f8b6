//! Registry of per-mesh geometry records
//!
//! Registering an object walks its subtree and creates one [`GeometryRecord`]
//! per mesh, snapshotting the original geometry and building every simplified
//! LOD variant up front. Records are keyed by mesh node id and iterated in id
//! order, so per-frame passes are deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::geometry::{try_simplify, Geometry};
use crate::math::Aabb;
use crate::scene::{SceneGraph, SceneNodeId};
use crate::texture::TextureOptimizer;

use super::config::OptimizationConfig;

/// Tracked state of one registered mesh
#[derive(Clone, Debug)]
pub struct GeometryRecord {
    /// Registered object this mesh was found under
    owner: SceneNodeId,
    /// Shared with the scene; never released by the catalog
    original: Arc<Geometry>,
    /// Owned LOD variants, levels 1..lod_levels
    simplified: BTreeMap<u32, Arc<Geometry>>,
    triangle_count: usize,
    vertex_count: usize,
    local_bounds: Option<Aabb>,
    pub visible: bool,
    /// Camera distance from the last update
    pub distance: f32,
    pub current_lod: u32,
}

impl GeometryRecord {
    /// Snapshot `original` and build its LOD variants
    pub fn new(owner: SceneNodeId, original: Arc<Geometry>, config: &OptimizationConfig) -> Self {
        let simplified = build_lod_variants(&original, config);

        Self {
            owner,
            triangle_count: original.triangle_count(),
            vertex_count: original.vertex_count(),
            local_bounds: original.compute_bounds(),
            original,
            simplified,
            visible: true,
            distance: 0.0,
            current_lod: 0,
        }
    }

    pub fn owner(&self) -> SceneNodeId {
        self.owner
    }

    pub fn original(&self) -> &Arc<Geometry> {
        &self.original
    }

    pub fn simplified(&self, level: u32) -> Option<&Arc<Geometry>> {
        self.simplified.get(&level)
    }

    pub fn simplified_count(&self) -> usize {
        self.simplified.len()
    }

    /// Geometry to bind for a level; the original when no variant exists
    pub fn geometry_for_level(&self, level: u32) -> Arc<Geometry> {
        if level == 0 {
            return Arc::clone(&self.original);
        }
        self.simplified
            .get(&level)
            .map_or_else(|| Arc::clone(&self.original), Arc::clone)
    }

    /// Triangle count of the original geometry
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Vertex count of the original geometry
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Local bounds of the original; simplified variants share its vertices
    pub fn local_bounds(&self) -> Option<&Aabb> {
        self.local_bounds.as_ref()
    }
}

/// Simplified variants for levels 1..lod_levels, built in parallel
///
/// Empty when LOD or simplification is disabled, or when the geometry cannot
/// be simplified.
pub fn build_lod_variants(original: &Geometry, config: &OptimizationConfig) -> BTreeMap<u32, Arc<Geometry>> {
    if !config.enable_lod || !config.enable_simplification || config.lod_levels <= 1 {
        return BTreeMap::new();
    }

    if let Err(e) = try_simplify(original, 1.0) {
        log::debug!("No LOD variants built: {}", e);
        return BTreeMap::new();
    }

    (1..config.lod_levels)
        .into_par_iter()
        .filter_map(|level| {
            try_simplify(original, config.ratio_for_level(level))
                .ok()
                .map(|geometry| (level, Arc::new(geometry)))
        })
        .collect()
}

/// Geometry records of every registered object
#[derive(Default)]
pub struct GeometryCatalog {
    records: BTreeMap<SceneNodeId, GeometryRecord>,
    /// Registered object -> meshes it contributed
    objects: BTreeMap<SceneNodeId, Vec<SceneNodeId>>,
}

impl GeometryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track every mesh under `object`
    ///
    /// Meshes already tracked through another object are skipped. Each new
    /// mesh has its materials optimized at LOD 0. Registering an object twice
    /// is a no-op. Returns the number of meshes newly tracked.
    pub fn register(
        &mut self,
        scene: &mut SceneGraph,
        object: SceneNodeId,
        config: &OptimizationConfig,
        mut textures: Option<&mut TextureOptimizer>,
    ) -> usize {
        if self.objects.contains_key(&object) {
            log::debug!("Object {:?} already registered", object);
            return 0;
        }

        let meshes = scene.meshes_in(object);
        if meshes.is_empty() {
            log::warn!("Object {:?} has no renderable geometry; not registered", object);
            return 0;
        }

        let mut tracked = Vec::with_capacity(meshes.len());
        for mesh_id in meshes {
            if self.records.contains_key(&mesh_id) {
                continue;
            }
            let Some(mesh) = scene.mesh_mut(mesh_id) else {
                continue;
            };

            let record = GeometryRecord::new(object, Arc::clone(&mesh.geometry), config);
            log::debug!(
                "Registered mesh {:?}: {} triangles, {} LOD variants",
                mesh_id,
                record.triangle_count(),
                record.simplified_count()
            );

            if let Some(textures) = textures.as_deref_mut() {
                for material in &mut mesh.materials {
                    textures.optimize_material(material, 0);
                }
            }

            self.records.insert(mesh_id, record);
            tracked.push(mesh_id);
        }

        let count = tracked.len();
        self.objects.insert(object, tracked);
        count
    }

    /// Stop tracking `object`'s meshes
    ///
    /// Meshes still in the scene get their original geometry and source
    /// textures back before the LOD variants are dropped. Returns the number
    /// of records removed.
    pub fn unregister(&mut self, scene: &mut SceneGraph, object: SceneNodeId) -> usize {
        let Some(meshes) = self.objects.remove(&object) else {
            return 0;
        };

        let mut removed = 0;
        for mesh_id in meshes {
            let Some(record) = self.records.remove(&mesh_id) else {
                continue;
            };
            if let Some(mesh) = scene.mesh_mut(mesh_id) {
                mesh.geometry = Arc::clone(record.original());
                for material in &mut mesh.materials {
                    material.unbind_all();
                }
            }
            removed += 1;
        }

        log::debug!("Unregistered object {:?} ({} meshes)", object, removed);
        removed
    }

    pub fn get(&self, mesh: SceneNodeId) -> Option<&GeometryRecord> {
        self.records.get(&mesh)
    }

    pub fn get_mut(&mut self, mesh: SceneNodeId) -> Option<&mut GeometryRecord> {
        self.records.get_mut(&mesh)
    }

    /// Records in mesh id order
    pub fn records(&self) -> impl Iterator<Item = (SceneNodeId, &GeometryRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = (SceneNodeId, &mut GeometryRecord)> {
        self.records.iter_mut().map(|(id, record)| (*id, record))
    }

    pub fn is_registered(&self, object: SceneNodeId) -> bool {
        self.objects.contains_key(&object)
    }

    /// Number of tracked mesh records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Unregister every object
    pub fn dispose(&mut self, scene: &mut SceneGraph) {
        let objects: Vec<SceneNodeId> = self.objects.keys().copied().collect();
        for object in objects {
            self.unregister(scene, object);
        }
        self.records.clear();
    }
}
