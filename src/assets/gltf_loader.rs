use std::path::Path;

use anyhow::Context;
use glam::{Vec2, Vec3};

use crate::assets::Geometry;

pub type Buffers<'a> = &'a [gltf::buffer::Data];

/// Loads one mesh from a glTF file, merging its triangle primitives into a
/// single geometry. `mesh_name` picks a mesh by name; otherwise the first
/// mesh in the document is used.
pub fn load_gltf_geometry(path: &Path, mesh_name: Option<&str>) -> anyhow::Result<Geometry> {
    let (document, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to import glTF file {}", path.display()))?;

    let mesh = match mesh_name {
        Some(name) => document
            .meshes()
            .find(|mesh| mesh.name() == Some(name))
            .with_context(|| format!("No mesh named {} in {}", name, path.display()))?,
        None => document
            .meshes()
            .next()
            .with_context(|| format!("No meshes in {}", path.display()))?,
    };

    let name = mesh
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("{} (Mesh {})", path.display(), mesh.index()));

    geometry_from_mesh(name, mesh, &buffers)
}

fn geometry_from_mesh(name: String, mesh: gltf::Mesh, buffers: Buffers) -> anyhow::Result<Geometry> {
    let mut geometry = Geometry {
        name,
        ..Default::default()
    };

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(anyhow::anyhow!(
                "Unsupported primitive mode: {:?}",
                primitive.mode()
            ));
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()].0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Primitive without positions")?
            .map(Vec3::from)
            .collect();
        let vertex_count = positions.len();

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals.map(Vec3::from).collect(),
            None => vec![Vec3::ZERO; vertex_count],
        };

        let tex_coords: Vec<Vec2> = match reader.read_tex_coords(0) {
            Some(tex_coords) => tex_coords.into_f32().map(Vec2::from).collect(),
            None => vec![Vec2::ZERO; vertex_count],
        };

        let base = geometry.positions.len() as u32;
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().map(|index| base + index).collect(),
            None => (base..base + vertex_count as u32).collect(),
        };

        geometry.positions.extend(positions);
        geometry.normals.extend(normals);
        geometry.tex_coords.extend(tex_coords);
        geometry.indices.extend(indices);
    }

    if geometry.positions.is_empty() {
        return Err(anyhow::anyhow!("Mesh without primitives: {}", geometry.name));
    }

    Ok(geometry)
}
