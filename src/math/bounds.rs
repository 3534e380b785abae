use glam::{Mat4, Vec3};

use crate::math::frustum::Frustum;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere enclosing the box: centered on it, radius is half the diagonal.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: (aabb.max - aabb.min).length() * 0.5,
        }
    }

    /// Moves the center through `matrix` and scales the radius by the largest
    /// axis scale, so non-uniform scale still yields an enclosing sphere.
    pub fn transform(&self, matrix: &Mat4) -> BoundingSphere {
        let center = matrix.transform_point3(self.center);
        let radius = self.radius * max_axis_scale(matrix);
        BoundingSphere { center, radius }
    }

    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_sphere(self)
    }

    pub fn intersects_sphere(&self, other: &BoundingSphere) -> bool {
        let radius_sum = self.radius + other.radius;
        (self.center - other.center).length_squared() <= radius_sum * radius_sum
    }

    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let closest = aabb.closest_point(self.center);
        (closest - self.center).length_squared() <= self.radius * self.radius
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    /// Expands component-wise over all points. No points gives a zero-size
    /// box at the origin, which still takes part in tests as a single point.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Aabb {
        let mut points = points.into_iter();

        let Some(first) = points.next() else {
            return Aabb::new(Vec3::ZERO, Vec3::ZERO);
        };

        points.fold(Aabb::new(first, first), |aabb, point| Aabb {
            min: aabb.min.min(point),
            max: aabb.max.max(point),
        })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Transforms all eight corners and re-fits an axis-aligned box around
    /// them. Rotated boxes grow; the result is conservative, never tight.
    pub fn transform(&self, matrix: &Mat4) -> Aabb {
        Aabb::from_points(
            self.corners()
                .map(|corner| matrix.transform_point3(corner)),
        )
    }

    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_aabb(self)
    }

    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

/// Which shape a volume test uses.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeKind {
    #[default]
    Sphere,
    Aabb,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BoundingVolume {
    Sphere(BoundingSphere),
    Aabb(Aabb),
}

impl BoundingVolume {
    pub fn kind(&self) -> VolumeKind {
        match self {
            BoundingVolume::Sphere(_) => VolumeKind::Sphere,
            BoundingVolume::Aabb(_) => VolumeKind::Aabb,
        }
    }

    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        match (self, other) {
            (BoundingVolume::Sphere(a), BoundingVolume::Sphere(b)) => a.intersects_sphere(b),
            (BoundingVolume::Aabb(a), BoundingVolume::Aabb(b)) => a.intersects_aabb(b),
            (BoundingVolume::Sphere(sphere), BoundingVolume::Aabb(aabb))
            | (BoundingVolume::Aabb(aabb), BoundingVolume::Sphere(sphere)) => {
                sphere.intersects_aabb(aabb)
            }
        }
    }

    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        match self {
            BoundingVolume::Sphere(sphere) => frustum.intersects_sphere(sphere),
            BoundingVolume::Aabb(aabb) => frustum.intersects_aabb(aabb),
        }
    }
}

/// Object-space bounds of a node, computed once from its geometry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    aabb: Aabb,
    sphere: BoundingSphere,
}

impl Bounds {
    pub fn from_aabb(aabb: Aabb) -> Self {
        Self {
            aabb,
            sphere: BoundingSphere::from_aabb(&aabb),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        Self::from_aabb(Aabb::from_points(points))
    }

    /// Keeps the sphere as given instead of deriving it from a box, for
    /// objects that are round to begin with.
    pub fn from_sphere(sphere: BoundingSphere) -> Self {
        let extent = Vec3::splat(sphere.radius);
        Self {
            aabb: Aabb::new(sphere.center - extent, sphere.center + extent),
            sphere,
        }
    }

    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn sphere(&self) -> &BoundingSphere {
        &self.sphere
    }

    /// World-space volume of the requested kind under `world_matrix`.
    pub fn world_volume(&self, kind: VolumeKind, world_matrix: &Mat4) -> BoundingVolume {
        match kind {
            VolumeKind::Sphere => BoundingVolume::Sphere(self.sphere.transform(world_matrix)),
            VolumeKind::Aabb => BoundingVolume::Aabb(self.aabb.transform(world_matrix)),
        }
    }
}

fn max_axis_scale(matrix: &Mat4) -> f32 {
    Vec3::new(
        matrix.x_axis.truncate().length(),
        matrix.y_axis.truncate().length(),
        matrix.z_axis.truncate().length(),
    )
    .max_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn from_points_expands_component_wise() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
        ]);

        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
    }

    #[test]
    fn empty_point_set_is_degenerate_box() {
        let aabb = Aabb::from_points(std::iter::empty());

        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::ZERO);
        assert!(aabb.contains_point(Vec3::ZERO));
        assert!(!aabb.intersects_aabb(&Aabb::new(Vec3::splat(0.1), Vec3::ONE)));
        assert!(aabb.intersects_aabb(&Aabb::new(Vec3::ZERO, Vec3::ONE)));
    }

    #[test]
    fn sphere_from_aabb_uses_half_diagonal() {
        let sphere = BoundingSphere::from_aabb(&Aabb::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 1.0)));

        assert_eq!(sphere.center, Vec3::new(1.0, 1.0, 0.5));
        assert_eq!(sphere.radius, 1.5);
    }

    #[test]
    fn rotated_box_transform_is_conservative() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let rotation = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));

        let rotated = aabb.transform(&rotation);

        let expected = std::f32::consts::SQRT_2;
        assert!((rotated.max.x - expected).abs() < 1e-5);
        assert!((rotated.max.z - expected).abs() < 1e-5);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn sphere_transform_uses_largest_scale() {
        let sphere = BoundingSphere::new(Vec3::ZERO, 1.0);
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 3.0, 2.0),
            Quat::IDENTITY,
            Vec3::new(5.0, 0.0, 0.0),
        );

        let transformed = sphere.transform(&matrix);

        assert_eq!(transformed.center, Vec3::new(5.0, 0.0, 0.0));
        assert!((transformed.radius - 3.0).abs() < 1e-6);
    }

    #[test]
    fn sphere_touching_box_face_intersects() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);

        assert!(BoundingSphere::new(Vec3::new(2.0, 0.5, 0.5), 1.0).intersects_aabb(&aabb));
        assert!(!BoundingSphere::new(Vec3::new(2.5, 0.5, 0.5), 1.0).intersects_aabb(&aabb));
    }

    #[test]
    fn mixed_volumes_intersect_symmetrically() {
        let sphere = BoundingVolume::Sphere(BoundingSphere::new(Vec3::new(1.5, 0.5, 0.5), 0.6));
        let aabb = BoundingVolume::Aabb(Aabb::new(Vec3::ZERO, Vec3::ONE));

        assert!(sphere.intersects(&aabb));
        assert!(aabb.intersects(&sphere));
        assert_eq!(sphere.kind(), VolumeKind::Sphere);
    }
}
