use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::math::{
    bounds::{Aabb, BoundingSphere},
    plane::Plane,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Frustum {
    // Planes are in the order: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the six clip planes from `projection * view` by combining the
    /// matrix rows (Gribb & Hartmann). Assumes OpenGL clip space, where
    /// visible depth is `-w..w`. Normals point into the frustum.
    pub fn from_view_projection(view_projection: Mat4) -> Frustum {
        let row0 = view_projection.row(0);
        let row1 = view_projection.row(1);
        let row2 = view_projection.row(2);
        let row3 = view_projection.row(3);

        let planes = [
            // Left
            Plane::from_coefficients(row3 + row0),
            // Right
            Plane::from_coefficients(row3 - row0),
            // Bottom
            Plane::from_coefficients(row3 + row1),
            // Top
            Plane::from_coefficients(row3 - row1),
            // Near
            Plane::from_coefficients(row3 + row2),
            // Far
            Plane::from_coefficients(row3 - row2),
        ];

        Frustum { planes }
    }

    /// False only when the sphere lies entirely behind some plane. Touching a
    /// plane counts as visible.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance_to_point(sphere.center) >= -sphere.radius)
    }

    /// Positive-vertex test: for each plane, only the corner furthest along
    /// the plane normal needs checking.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let positive = Vec3::select(plane.normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            plane.signed_distance_to_point(positive) >= 0.0
        })
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance_to_point(point) >= 0.0)
    }
}
