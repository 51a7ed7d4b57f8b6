//! Per-frame optimization statistics

use serde::{Deserialize, Serialize};

use crate::texture::TextureStats;

/// Buckets in the LOD histogram; higher levels fold into the last one
pub const LOD_HISTOGRAM_BUCKETS: usize = 4;

/// Snapshot recomputed at the end of every update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub frame: u64,

    pub total_objects: usize,
    pub visible_objects: usize,
    pub culled_objects: usize,

    /// Triangles of every tracked mesh at full detail
    pub total_triangles: usize,
    /// Triangles of visible meshes at their active LOD
    pub rendered_triangles: usize,
    pub total_vertices: usize,
    pub rendered_vertices: usize,
    /// Percent of `total_triangles` not rendered
    pub triangle_reduction: f32,
    pub vertex_reduction: f32,
    /// Culled objects over total objects
    pub culling_ratio: f32,

    /// Visible objects per LOD level
    pub lod_distribution: [usize; LOD_HISTOGRAM_BUCKETS],

    /// Present when a texture optimizer is active
    pub textures: Option<TextureStats>,
}

/// Accumulates one frame's counts
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: FrameStats,
}

impl StatsAggregator {
    pub fn new(frame: u64) -> Self {
        Self {
            stats: FrameStats {
                frame,
                ..Default::default()
            },
        }
    }

    /// Count one tracked mesh
    ///
    /// `rendered_*` are the counts of the active geometry and only contribute
    /// when the mesh is visible.
    pub fn record(
        &mut self,
        visible: bool,
        lod_level: u32,
        triangles: usize,
        vertices: usize,
        rendered_triangles: usize,
        rendered_vertices: usize,
    ) {
        let stats = &mut self.stats;
        stats.total_objects += 1;
        stats.total_triangles += triangles;
        stats.total_vertices += vertices;

        if visible {
            stats.visible_objects += 1;
            stats.rendered_triangles += rendered_triangles;
            stats.rendered_vertices += rendered_vertices;
            let bucket = (lod_level as usize).min(LOD_HISTOGRAM_BUCKETS - 1);
            stats.lod_distribution[bucket] += 1;
        } else {
            stats.culled_objects += 1;
        }
    }

    /// Derive ratios and attach texture metrics
    pub fn finish(mut self, textures: Option<TextureStats>) -> FrameStats {
        let stats = &mut self.stats;
        stats.triangle_reduction = reduction_percent(stats.total_triangles, stats.rendered_triangles);
        stats.vertex_reduction = reduction_percent(stats.total_vertices, stats.rendered_vertices);
        stats.culling_ratio = if stats.total_objects == 0 {
            0.0
        } else {
            stats.culled_objects as f32 / stats.total_objects as f32
        };
        stats.textures = textures;
        self.stats
    }
}

fn reduction_percent(total: usize, rendered: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (1.0 - rendered as f64 / total as f64) as f32 * 100.0
}
