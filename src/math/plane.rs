use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

/// A plane in Hessian normal form: `dot(normal, p) + distance = 0`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Builds a plane from `(a, b, c, d)` coefficients and rescales it so the
    /// normal has unit length. A zero-length normal is left as-is.
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.length();

        if length > 0.0 {
            Self::new(normal / length, coefficients.w / length)
        } else {
            Self::new(normal, coefficients.w)
        }
    }

    /// Positive on the side the normal points to.
    pub fn signed_distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    pub fn flip(self) -> Self {
        Self::new(-self.normal, -self.distance)
    }
}
