//! View frustum for culling

use crate::core::types::{Vec3, Vec4, Mat4};
use super::aabb::Aabb;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// View frustum with 6 planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix (Gribb/Hartmann).
    ///
    /// Works the same for perspective and orthographic projections; only the
    /// matrix handed in differs.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let left = Self::normalize_plane(rows[3] + rows[0]);
        let right = Self::normalize_plane(rows[3] - rows[0]);
        let bottom = Self::normalize_plane(rows[3] + rows[1]);
        let top = Self::normalize_plane(rows[3] - rows[1]);
        // glam's RH projections map depth to [0, 1], so near is row2 alone
        let near = Self::normalize_plane(rows[2]);
        let far = Self::normalize_plane(rows[3] - rows[2]);

        Self {
            planes: [near, far, left, right, top, bottom],
        }
    }

    fn normalize_plane(plane: Vec4) -> Plane {
        let normal = Vec3::new(plane.x, plane.y, plane.z);
        let len = normal.length();
        if len > 0.0 && len.is_finite() {
            Plane {
                normal: normal / len,
                distance: plane.w / len,
            }
        } else {
            // Degenerate row: a plane that rejects nothing
            Plane::new(Vec3::ZERO, 0.0)
        }
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(point) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Check if AABB intersects frustum (conservative test)
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            // Find the corner most aligned with plane normal (p-vertex)
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            // If p-vertex is outside, AABB is completely outside
            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective_frustum() -> Frustum {
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 100.0);
        Frustum::from_view_projection(&proj)
    }

    #[test]
    fn test_plane_distance() {
        let plane = Plane::new(Vec3::Y, 0.0); // XZ plane
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)), 5.0);
        assert_eq!(plane.distance_to_point(Vec3::new(0.0, -3.0, 0.0)), -3.0);
    }

    #[test]
    fn test_planes_normalized() {
        let frustum = perspective_frustum();
        for plane in &frustum.planes {
            assert!((plane.normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_frustum_contains_point() {
        let proj = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let frustum = Frustum::from_view_projection(&(proj * view));

        assert!(frustum.contains_point(Vec3::ZERO));
        assert!(!frustum.contains_point(Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_inside_frustum() {
        let frustum = perspective_frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -5.0));
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_aabb_behind_camera() {
        let frustum = perspective_frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 10.0));
        assert!(!frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_aabb_beyond_far_plane() {
        let frustum = perspective_frustum();
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -200.0), Vec3::new(1.0, 1.0, -150.0));
        assert!(!frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_aabb_partially_inside_counts() {
        let frustum = perspective_frustum();
        // Straddles the left side plane
        let aabb = Aabb::new(Vec3::new(-500.0, -1.0, -20.0), Vec3::new(0.0, 1.0, -10.0));
        assert!(frustum.intersects_aabb(&aabb));
    }

    #[test]
    fn test_degenerate_matrix_rejects_nothing() {
        let frustum = Frustum::from_view_projection(&Mat4::ZERO);
        assert!(frustum.intersects_aabb(&Aabb::new(Vec3::splat(1e6), Vec3::splat(1e6 + 1.0))));
    }
}
