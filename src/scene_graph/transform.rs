use glam::{Mat4, Quat, Vec3};
use std::cell::Cell;

/// Position, Euler rotation and scale of a node relative to its parent.
///
/// The local matrix is `T * Rx * Ry * Rz * S`: scale first, then rotation
/// about Z, Y and X (in that order when applied to a point), then translation.
/// Euler composition is order dependent and can gimbal-lock;
/// [`Transform::rotation_quat`] exposes the same rotation as a quaternion.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,

    local_matrix: Cell<Mat4>,
    local_dirty: Cell<bool>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            local_matrix: Cell::new(Mat4::IDENTITY),
            local_dirty: Cell::new(true),
        }
    }

    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let mut transform = Self::from_position(position);
        transform.rotation = rotation;
        transform.scale = scale;
        transform
    }

    /// Recomputed on read if any setter ran since the last read.
    pub fn local_matrix(&self) -> Mat4 {
        if self.local_dirty.get() {
            let matrix =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position);

            self.local_matrix.set(matrix);
            self.local_dirty.set(false);
        }

        self.local_matrix.get()
    }

    pub fn rotation_quat(&self) -> Quat {
        Quat::from_rotation_x(self.rotation.x)
            * Quat::from_rotation_y(self.rotation.y)
            * Quat::from_rotation_z(self.rotation.z)
    }

    fn invalidate_local(&self) {
        self.local_dirty.set(true);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.invalidate_local();
    }

    /// Euler angles in radians, applied about X, then Y, then Z.
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.invalidate_local();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.invalidate_local();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.invalidate_local();
    }

    pub fn rotate_by(&mut self, delta: Vec3) {
        self.rotation += delta;
        self.invalidate_local();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_by_default() {
        assert_eq!(Transform::default().local_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn matrix_is_translation_rotation_scale_in_fixed_order() {
        let rotation = Vec3::new(0.3, -1.1, 0.7);
        let transform = Transform::new(Vec3::new(1.0, 2.0, 3.0), rotation, Vec3::new(2.0, 1.0, 0.5));

        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_rotation_x(rotation.x)
            * Mat4::from_rotation_y(rotation.y)
            * Mat4::from_rotation_z(rotation.z)
            * Mat4::from_scale(Vec3::new(2.0, 1.0, 0.5));

        assert!(transform.local_matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn setters_invalidate_cached_matrix() {
        let mut transform = Transform::default();
        let _ = transform.local_matrix();

        transform.set_position(Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(transform.local_matrix().w_axis.truncate(), Vec3::new(4.0, 0.0, 0.0));

        transform.set_scale(Vec3::splat(2.0));
        assert_eq!(transform.local_matrix().x_axis.x, 2.0);
    }

    #[test]
    fn relative_moves_invalidate_cached_matrix() {
        let mut transform = Transform::from_position(Vec3::X);
        assert_eq!(transform.local_matrix().w_axis.truncate(), Vec3::X);

        transform.translate(Vec3::Y);
        assert_eq!(transform.local_matrix().w_axis.truncate(), Vec3::new(1.0, 1.0, 0.0));

        transform.rotate_by(Vec3::new(0.0, 0.0, FRAC_PI_2));
        let point = transform.local_matrix().transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn rotation_about_z_turns_x_into_y() {
        let mut transform = Transform::default();
        transform.set_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2));

        let point = transform.local_matrix().transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::Y, 1e-6));
    }
}
