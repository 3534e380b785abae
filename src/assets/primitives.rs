//! Procedural meshes, centered on the origin.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::assets::Geometry;

pub fn triangle() -> Geometry {
    Geometry {
        name: "triangle".to_string(),
        positions: vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        ],
        normals: vec![Vec3::Z; 3],
        tex_coords: vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(0.5, 0.0)],
        indices: vec![0, 1, 2],
    }
}

/// Unit plane in XZ, facing +Y.
pub fn plane(size: f32) -> Geometry {
    let half = size * 0.5;

    Geometry {
        name: "plane".to_string(),
        positions: vec![
            Vec3::new(-half, 0.0, -half),
            Vec3::new(half, 0.0, -half),
            Vec3::new(half, 0.0, half),
            Vec3::new(-half, 0.0, half),
        ],
        normals: vec![Vec3::Y; 4],
        tex_coords: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ],
        indices: vec![0, 2, 1, 0, 3, 2],
    }
}

/// Axis-aligned cube with per-face normals, 24 vertices.
pub fn cube(size: f32) -> Geometry {
    let half = size * 0.5;
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::NEG_Z, Vec3::X),
        (Vec3::Z, Vec3::Y, Vec3::NEG_X),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut geometry = Geometry {
        name: "cube".to_string(),
        ..Default::default()
    };

    for (normal, up, right) in faces {
        let base = geometry.positions.len() as u32;
        let center = normal * half;

        for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            geometry
                .positions
                .push(center + right * (u * half) + up * (v * half));
            geometry.normals.push(normal);
            geometry
                .tex_coords
                .push(Vec2::new((u + 1.0) * 0.5, 1.0 - (v + 1.0) * 0.5));
        }

        geometry
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    geometry
}

/// UV sphere with `segments` longitudinal and `segments / 2` latitudinal bands.
pub fn sphere(radius: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);
    let rings = (segments / 2).max(2);

    let mut geometry = Geometry {
        name: "sphere".to_string(),
        ..Default::default()
    };

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;

        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let theta = u * 2.0 * PI;

            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            geometry.positions.push(normal * radius);
            geometry.normals.push(normal);
            geometry.tex_coords.push(Vec2::new(u, v));
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            geometry
                .indices
                .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    geometry
}
