//! Deterministic stride-based triangle subsampling
//!
//! Reduction keeps every `step`-th triangle of the index buffer in original
//! order and leaves vertex attributes untouched. The output depends only on
//! the input geometry and ratio, so LOD tables are reproducible.
//!
//! # Example
//! ```
//! use sceneopt::geometry::{Geometry, simplify};
//! use glam::Vec3;
//!
//! let positions = vec![Vec3::ZERO; 3];
//! let indices: Vec<u32> = (0..1000).flat_map(|_| [0, 1, 2]).collect();
//! let mesh = Geometry::indexed(positions, indices);
//!
//! assert_eq!(simplify(&mesh, 0.25).triangle_count(), 250);
//! assert_eq!(simplify(&mesh, 1.0).triangle_count(), 1000);
//! ```

use crate::core::error::Error;
use crate::core::types::Result;

use super::mesh::Geometry;

/// Smallest accepted simplification ratio; lower values are clamped up to it
pub const MIN_SIMPLIFICATION_RATIO: f32 = 0.01;

/// Clamp a ratio into the valid `(0, 1]` range
///
/// Non-finite input is treated as "no reduction".
pub fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        return 1.0;
    }
    ratio.clamp(MIN_SIMPLIFICATION_RATIO, 1.0)
}

/// Triangle stride for a given triangle count and ratio
///
/// Target count floors at 1, so the stride never exceeds the triangle count.
///
/// # Examples
/// ```
/// use sceneopt::geometry::simplify::stride_for;
///
/// assert_eq!(stride_for(1000, 1.0), 1);
/// assert_eq!(stride_for(1000, 0.5), 2);
/// assert_eq!(stride_for(1000, 0.25), 4);
/// assert_eq!(stride_for(10, 0.01), 10);
/// ```
pub fn stride_for(triangle_count: usize, ratio: f32) -> usize {
    let ratio = clamp_ratio(ratio) as f64;
    let target = ((triangle_count as f64 * ratio).floor() as usize).max(1);
    (triangle_count / target).max(1)
}

/// Reduce `geometry` to roughly `ratio` of its triangles
///
/// Geometry that cannot be simplified (no index buffer or no positions) comes
/// back as an unmodified copy.
pub fn simplify(geometry: &Geometry, ratio: f32) -> Geometry {
    match try_simplify(geometry, ratio) {
        Ok(simplified) => simplified,
        Err(e) => {
            log::debug!("Simplification skipped: {}", e);
            geometry.clone()
        }
    }
}

/// Like [`simplify`] but reports why a geometry could not be reduced
pub fn try_simplify(geometry: &Geometry, ratio: f32) -> Result<Geometry> {
    if !geometry.has_positions() {
        return Err(Error::MissingResource("position attribute".into()));
    }
    let indices = geometry
        .indices()
        .ok_or_else(|| Error::MissingResource("index buffer".into()))?;

    let triangle_count = indices.len() / 3;
    if triangle_count == 0 {
        return Ok(geometry.clone());
    }

    let step = stride_for(triangle_count, ratio);
    let mut reduced = Vec::with_capacity(triangle_count.div_ceil(step) * 3);
    for triangle in indices.chunks_exact(3).step_by(step) {
        reduced.extend_from_slice(triangle);
    }

    Ok(geometry.with_index_buffer(reduced))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;

    /// Strip of `n` triangles over a row of vertices
    fn strip(n: usize) -> Geometry {
        let positions: Vec<Vec3> = (0..n + 2)
            .map(|i| Vec3::new(i as f32, (i % 2) as f32, 0.0))
            .collect();
        let indices: Vec<u32> = (0..n as u32).flat_map(|i| [i, i + 1, i + 2]).collect();
        Geometry::indexed(positions, indices)
    }

    #[test]
    fn test_ratio_one_is_identity() {
        let g = strip(37);
        let out = simplify(&g, 1.0);
        assert_eq!(out.triangle_count(), 37);
        assert_eq!(out.indices(), g.indices());
    }

    #[test]
    fn test_thousand_triangles_at_quarter() {
        let out = simplify(&strip(1000), 0.25);
        assert_eq!(out.triangle_count(), 250);
    }

    #[test]
    fn test_keeps_every_step_triangle_in_order() {
        let out = simplify(&strip(6), 0.5);
        // step 2: triangles 0, 2, 4
        assert_eq!(out.indices().unwrap(), &[0, 1, 2, 2, 3, 4, 4, 5, 6]);
    }

    #[test]
    fn test_vertex_buffers_untouched() {
        let g = strip(100);
        let out = simplify(&g, 0.1);
        assert_eq!(out.vertex_count(), g.vertex_count());
        assert!(out.shares_vertices_with(&g));
    }

    #[test]
    fn test_never_exceeds_original_and_monotonic() {
        for n in [1usize, 2, 3, 7, 100, 999, 1000, 1001] {
            let g = strip(n);
            let mut previous = usize::MAX;
            for step in 1..=100 {
                let ratio = step as f32 / 100.0;
                let count = simplify(&g, ratio).triangle_count();
                assert!(count <= n, "n={} ratio={} gave {}", n, ratio, count);
                assert!(count >= 1);
                if step > 1 {
                    assert!(count >= previous, "count must not drop as ratio grows");
                }
                previous = count;
            }
            assert_eq!(simplify(&g, 1.0).triangle_count(), n);
        }
    }

    #[test]
    fn test_deterministic() {
        let g = strip(513);
        for ratio in [0.9, 0.5, 0.33, 0.125, 0.01] {
            let a = simplify(&g, ratio);
            let b = simplify(&g, ratio);
            assert_eq!(a.indices(), b.indices());
            assert_eq!(a.triangle_count(), b.triangle_count());
        }
    }

    #[test]
    fn test_out_of_range_ratio_is_clamped() {
        let g = strip(200);
        assert_eq!(simplify(&g, 0.0).triangle_count(), simplify(&g, MIN_SIMPLIFICATION_RATIO).triangle_count());
        assert_eq!(simplify(&g, -3.0).triangle_count(), simplify(&g, 0.0).triangle_count());
        assert_eq!(simplify(&g, 7.0).triangle_count(), 200);
        assert_eq!(simplify(&g, f32::NAN).triangle_count(), 200);
    }

    #[test]
    fn test_non_indexed_returned_unchanged() {
        let g = Geometry::new(vec![Vec3::ZERO; 30]);
        let out = simplify(&g, 0.1);
        assert_eq!(out, g);
        assert!(matches!(try_simplify(&g, 0.1), Err(Error::MissingResource(_))));
    }

    #[test]
    fn test_missing_positions_returned_unchanged() {
        let g = Geometry::empty().with_indices(vec![0, 1, 2, 0, 2, 3]);
        let out = simplify(&g, 0.5);
        assert_eq!(out, g);
        assert!(try_simplify(&g, 0.5).is_err());
    }

    #[test]
    fn test_target_floors_at_one_triangle() {
        let out = simplify(&strip(50), MIN_SIMPLIFICATION_RATIO);
        assert_eq!(out.triangle_count(), 1);
    }
}
