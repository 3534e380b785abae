mod asset_library;
mod gltf_loader;
pub mod primitives;

use glam::{Vec2, Vec3};
use id_arena::Id;

use crate::math::Bounds;

pub use asset_library::AssetLibrary;

pub type GeometryHandle = Id<Geometry>;
pub type MaterialHandle = Id<Material>;

/// Untransformed mesh data. Plain data, so it can be prepared on another
/// thread and handed to the main loop for registration.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Object-space bounds over every vertex position.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.positions.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Opaque key the renderer maps to a shader program.
    pub shader: String,
}

/// Where geometry and materials come from. Implementations own the loaded
/// data; the core only holds handles and reads geometry to compute bounds.
pub trait AssetProvider {
    fn load_geometry(&mut self, source: &str) -> anyhow::Result<GeometryHandle>;

    fn load_material(&mut self, source: &str) -> anyhow::Result<MaterialHandle>;

    fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry>;

    fn material(&self, handle: MaterialHandle) -> Option<&Material>;
}
