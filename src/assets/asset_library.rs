use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context};
use id_arena::Arena;

use crate::assets::{
    gltf_loader::load_gltf_geometry, primitives, AssetProvider, Geometry, GeometryHandle, Material,
    MaterialHandle,
};

const BUILTIN_PREFIX: &str = "builtin:";
const DEFAULT_SHADER: &str = "basic";

/// In-memory [`AssetProvider`]. Loading the same source twice returns the
/// same handle.
///
/// Geometry sources:
/// - `builtin:cube`, `builtin:plane`, `builtin:triangle`, `builtin:sphere`,
///   optionally followed by `:<size>` (edge length, or radius for spheres)
/// - a `.gltf`/`.glb` path, optionally followed by `#<mesh name>`
///
/// Material sources are `<name>` or `<name>:<shader>`.
pub struct AssetLibrary {
    geometries: Arena<Geometry>,
    materials: Arena<Material>,
    geometry_by_source: HashMap<String, GeometryHandle>,
    material_by_name: HashMap<String, MaterialHandle>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self {
            geometries: Arena::new(),
            materials: Arena::new(),
            geometry_by_source: HashMap::new(),
            material_by_name: HashMap::new(),
        }
    }

    /// Registers geometry built elsewhere, e.g. prepared on a worker thread.
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.alloc(geometry)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        let name = material.name.clone();
        let id = self.materials.alloc(material);
        self.material_by_name.insert(name, id);
        id
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter().map(|(_, material)| material)
    }

    fn build_geometry(source: &str) -> anyhow::Result<Geometry> {
        if let Some(builtin) = source.strip_prefix(BUILTIN_PREFIX) {
            return builtin_geometry(builtin);
        }

        let (path, mesh_name) = match source.split_once('#') {
            Some((path, mesh_name)) => (path, Some(mesh_name)),
            None => (source, None),
        };

        let path = Path::new(path);
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("gltf" | "glb") => load_gltf_geometry(path, mesh_name),
            _ => bail!("Unsupported geometry source: {}", source),
        }
    }
}

impl Default for AssetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_geometry(builtin: &str) -> anyhow::Result<Geometry> {
    let (kind, size) = match builtin.split_once(':') {
        Some((kind, size)) => {
            let size: f32 = size
                .parse()
                .with_context(|| format!("Invalid size in builtin:{}", builtin))?;
            (kind, Some(size))
        }
        None => (builtin, None),
    };

    let geometry = match kind {
        "cube" => primitives::cube(size.unwrap_or(1.0)),
        "plane" => primitives::plane(size.unwrap_or(1.0)),
        "sphere" => primitives::sphere(size.unwrap_or(0.5), 16),
        "triangle" => primitives::triangle(),
        _ => bail!("Unknown builtin geometry: {}", kind),
    };

    Ok(geometry)
}

impl AssetProvider for AssetLibrary {
    fn load_geometry(&mut self, source: &str) -> anyhow::Result<GeometryHandle> {
        if let Some(&handle) = self.geometry_by_source.get(source) {
            return Ok(handle);
        }

        let geometry = Self::build_geometry(source)?;
        log::debug!(
            "Loaded geometry {} ({} vertices) from {}",
            geometry.name,
            geometry.vertex_count(),
            source
        );

        let handle = self.add_geometry(geometry);
        self.geometry_by_source.insert(source.to_string(), handle);
        Ok(handle)
    }

    fn load_material(&mut self, source: &str) -> anyhow::Result<MaterialHandle> {
        let (name, shader) = source.split_once(':').unwrap_or((source, DEFAULT_SHADER));

        if name.is_empty() {
            bail!("Material source without a name: {:?}", source);
        }

        if let Some(&handle) = self.material_by_name.get(name) {
            return Ok(handle);
        }

        Ok(self.add_material(Material {
            name: name.to_string(),
            shader: shader.to_string(),
        }))
    }

    fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle)
    }

    fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }
}
