pub mod bounds;
pub mod frustum;
pub mod plane;

pub use bounds::{Aabb, BoundingSphere, BoundingVolume, Bounds, VolumeKind};
pub use frustum::Frustum;
pub use plane::Plane;
