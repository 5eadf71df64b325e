//! Procedural meshes for the host scene
//!
//! - Extruded five-pointed star for the emblem
//! - Flat ribbon segment

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::asset::RenderAssetUsages;

use crate::constants::*;
use crate::layout::star_outline;

// ============================================================================
// STAR MESH
// ============================================================================

pub fn create_star_mesh(meshes: &mut Assets<Mesh>) -> Handle<Mesh> {
    meshes.add(build_star_mesh(STAR_POINTS, STAR_OUTER_RADIUS, STAR_INNER_RADIUS, STAR_DEPTH))
}

/// Star outline extruded along Z, centred on the origin.
/// Caps are fans around the centre; each side quad gets its own flat normal.
pub fn build_star_mesh(points: usize, outer_radius: f32, inner_radius: f32, depth: f32) -> Mesh {
    let outline = star_outline(points, outer_radius, inner_radius);
    let n = outline.len() as u32;
    let half = depth / 2.0;

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    // Front (+Z) and back (-Z) caps
    for (z, normal) in [(half, 1.0_f32), (-half, -1.0)] {
        let centre = positions.len() as u32;
        positions.push([0.0, 0.0, z]);
        normals.push([0.0, 0.0, normal]);
        for p in &outline {
            positions.push([p.x, p.y, z]);
            normals.push([0.0, 0.0, normal]);
        }
        for i in 0..n {
            let a = centre + 1 + i;
            let b = centre + 1 + (i + 1) % n;
            // The outline runs clockwise seen from +Z
            if normal > 0.0 {
                indices.extend_from_slice(&[centre, b, a]);
            } else {
                indices.extend_from_slice(&[centre, a, b]);
            }
        }
    }

    // Side walls
    for i in 0..outline.len() {
        let p0 = outline[i];
        let p1 = outline[(i + 1) % outline.len()];
        let edge = p1 - p0;
        // Clockwise outline: the outward normal is the edge turned counter-clockwise
        let outward = Vec3::new(-edge.y, edge.x, 0.0).normalize_or_zero();

        let base = positions.len() as u32;
        positions.extend_from_slice(&[
            [p0.x, p0.y, half],
            [p1.x, p1.y, half],
            [p1.x, p1.y, -half],
            [p0.x, p0.y, -half],
        ]);
        normals.extend_from_slice(&[outward.to_array(); 4]);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

// ============================================================================
// RIBBON SEGMENT
// ============================================================================

/// A thin flat plate, wider than tall, in the XY plane
pub fn create_ribbon_segment_mesh(meshes: &mut Assets<Mesh>) -> Handle<Mesh> {
    meshes.add(Cuboid::new(0.8, 0.12, 0.02))
}
