//! Frustum and distance culling

use crate::core::camera::Camera;
use crate::core::types::{Mat4, Vec3};
use crate::math::{Aabb, Frustum};

use super::config::OptimizationConfig;

/// Per-frame culling state derived from the camera and config
#[derive(Clone, Debug)]
pub struct VisibilityEvaluator {
    camera_position: Vec3,
    /// `None` when frustum culling is disabled
    frustum: Option<Frustum>,
    /// `None` when distance culling is disabled
    cutoff: Option<f32>,
}

/// Culling outcome for one object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    pub visible: bool,
    pub distance: f32,
}

impl VisibilityEvaluator {
    /// Extract the frustum for this frame
    pub fn evaluate(camera: &Camera, config: &OptimizationConfig) -> Self {
        let frustum = config
            .enable_frustum_culling
            .then(|| Frustum::from_view_projection(&camera.view_projection()));
        let cutoff = config.enable_distance_culling.then_some(config.culling_distance);

        Self {
            camera_position: camera.position,
            frustum,
            cutoff,
        }
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    pub fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }

    /// Test an object given its active geometry's local bounds and world matrix
    ///
    /// Distance is measured to the world-space bounds center, or to the object
    /// origin when bounds are missing or degenerate. Such objects always pass
    /// the frustum test but are still subject to the distance cutoff.
    pub fn test(&self, local_bounds: Option<&Aabb>, world: &Mat4) -> Visibility {
        let world_bounds = local_bounds
            .filter(|bounds| !bounds.is_degenerate())
            .map(|bounds| bounds.transformed(world))
            .filter(|bounds| !bounds.is_degenerate());

        let anchor = match &world_bounds {
            Some(bounds) => bounds.center(),
            None => world.transform_point3(Vec3::ZERO),
        };
        let distance = self.camera_position.distance(anchor);

        Visibility {
            visible: self.is_visible(world_bounds.as_ref(), distance),
            distance,
        }
    }

    /// Frustum test AND distance cutoff
    pub fn is_visible(&self, world_bounds: Option<&Aabb>, distance: f32) -> bool {
        if let Some(cutoff) = self.cutoff {
            if distance > cutoff {
                return false;
            }
        }

        match (&self.frustum, world_bounds) {
            (Some(frustum), Some(bounds)) => frustum.intersects_aabb(bounds),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        // At origin looking down -Z
        Camera::perspective(Vec3::ZERO, 60.0, 1.0, 0.1, 10_000.0)
    }

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    fn at(position: Vec3) -> Mat4 {
        Mat4::from_translation(position)
    }

    #[test]
    fn test_object_in_front_is_visible() {
        let eval = VisibilityEvaluator::evaluate(&camera(), &OptimizationConfig::default());
        let result = eval.test(Some(&unit_box()), &at(Vec3::new(0.0, 0.0, -50.0)));
        assert!(result.visible);
        assert!((result.distance - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_object_behind_is_culled() {
        let eval = VisibilityEvaluator::evaluate(&camera(), &OptimizationConfig::default());
        let result = eval.test(Some(&unit_box()), &at(Vec3::new(0.0, 0.0, 50.0)));
        assert!(!result.visible);
    }

    #[test]
    fn test_partially_visible_object_kept() {
        let eval = VisibilityEvaluator::evaluate(&camera(), &OptimizationConfig::default());
        // Straddles the camera plane: mostly behind, partly in front
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -5.0), Vec3::new(1.0, 1.0, 20.0));
        assert!(eval.test(Some(&bounds), &Mat4::IDENTITY).visible);
    }

    #[test]
    fn test_distance_cutoff_overrides_frustum() {
        let config = OptimizationConfig {
            culling_distance: 100.0,
            ..Default::default()
        };
        let eval = VisibilityEvaluator::evaluate(&camera(), &config);
        let result = eval.test(Some(&unit_box()), &at(Vec3::new(0.0, 0.0, -150.0)));
        assert!(!result.visible);

        let config = OptimizationConfig {
            culling_distance: 100.0,
            enable_distance_culling: false,
            ..Default::default()
        };
        let eval = VisibilityEvaluator::evaluate(&camera(), &config);
        assert!(eval.test(Some(&unit_box()), &at(Vec3::new(0.0, 0.0, -150.0))).visible);
    }

    #[test]
    fn test_frustum_culling_disabled() {
        let config = OptimizationConfig {
            enable_frustum_culling: false,
            ..Default::default()
        };
        let eval = VisibilityEvaluator::evaluate(&camera(), &config);
        assert!(eval.frustum().is_none());
        assert!(eval.test(Some(&unit_box()), &at(Vec3::new(0.0, 0.0, 50.0))).visible);
    }

    #[test]
    fn test_missing_bounds_fail_open() {
        let eval = VisibilityEvaluator::evaluate(&camera(), &OptimizationConfig::default());
        let result = eval.test(None, &at(Vec3::new(0.0, 0.0, 50.0)));
        assert!(result.visible);
        assert!((result.distance - 50.0).abs() < 1e-4);

        let inverted = Aabb::new(Vec3::ONE, -Vec3::ONE);
        assert!(eval.test(Some(&inverted), &at(Vec3::new(0.0, 0.0, 50.0))).visible);
    }

    #[test]
    fn test_missing_bounds_still_distance_culled() {
        let config = OptimizationConfig {
            culling_distance: 10.0,
            ..Default::default()
        };
        let eval = VisibilityEvaluator::evaluate(&camera(), &config);
        assert!(!eval.test(None, &at(Vec3::new(0.0, 0.0, -20.0))).visible);
    }

    #[test]
    fn test_orthographic_camera() {
        let camera = Camera::orthographic(Vec3::new(0.0, 0.0, 10.0), 5.0, 5.0, 0.1, 100.0);
        let eval = VisibilityEvaluator::evaluate(&camera, &OptimizationConfig::default());
        assert!(eval.test(Some(&unit_box()), &Mat4::IDENTITY).visible);
        assert!(!eval.test(Some(&unit_box()), &at(Vec3::new(20.0, 0.0, 0.0))).visible);
    }
}
