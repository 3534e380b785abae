use crate::math::VolumeKind;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Skip nodes whose world bounds fall outside the camera frustum.
    pub frustum_culling: bool,
    /// Volume used for the frustum test.
    pub cull_volume: VolumeKind,
    /// Route visible nodes through the batch manager instead of drawing them
    /// in traversal order.
    pub use_batching: bool,
    pub check_collisions: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frustum_culling: true,
            cull_volume: VolumeKind::Sphere,
            use_batching: true,
            check_collisions: true,
        }
    }
}
