use glam::Mat4;

use crate::assets::{GeometryHandle, MaterialHandle};
use crate::rendering::instancing::InstanceData;

/// Renderer-side object created from a geometry/material pair. The renderer
/// owns whatever GPU resources back it; the scene only keeps this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderableRef(pub u64);

/// Drawable payload of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderable {
    pub handle: RenderableRef,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
}

/// The GPU abstraction the core draws through.
///
/// Every submission carries all the state it needs. The core never relies on
/// something being "currently bound"; `bind_material` only lets a renderer
/// skip redundant state changes when draws arrive grouped by material.
pub trait Renderer {
    fn create_renderable(
        &mut self,
        geometry: GeometryHandle,
        material: MaterialHandle,
    ) -> anyhow::Result<RenderableRef>;

    fn bind_material(&mut self, material: MaterialHandle) -> anyhow::Result<()>;

    fn submit_draw(
        &mut self,
        renderable: RenderableRef,
        model: &Mat4,
        view: &Mat4,
        projection: &Mat4,
    ) -> anyhow::Result<()>;

    /// One draw covering every instance in `instances`. `changed` is false
    /// when the data is identical to the previous submission for this
    /// renderable, so a GPU-backed renderer can reuse its instance buffer.
    fn submit_instanced(
        &mut self,
        renderable: RenderableRef,
        instances: &[InstanceData],
        changed: bool,
        view: &Mat4,
        projection: &Mat4,
    ) -> anyhow::Result<()>;
}
