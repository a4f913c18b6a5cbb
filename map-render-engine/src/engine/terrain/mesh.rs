use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use super::edge_fade::EdgeFadeMask;
use super::height::TerrainShape;

/// CPU-side terrain grid: `(segments + 1)^2` vertices spanning the terrain
/// extents, displaced by the height field.
///
/// Vertex `(col, row)` lives at index `row * (segments + 1) + col`; rows run
/// from the far (-Z) edge to the near (+Z) edge, matching UV `v`.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    pub segments: u32,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
    width: f64,
    depth: f64,
}

impl TerrainGrid {
    pub fn build(shape: &TerrainShape, segments: u32, fade: &EdgeFadeMask) -> Self {
        let segments = segments.max(1);
        let stride = segments as usize + 1;
        let vertex_count = stride * stride;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut colors = Vec::with_capacity(vertex_count);

        for row in 0..stride {
            let v = row as f64 / segments as f64;
            let z = (v - 0.5) * shape.depth;
            for col in 0..stride {
                let u = col as f64 / segments as f64;
                let x = (u - 0.5) * shape.width;
                let y = shape.height(x, z);

                positions.push([x as f32, y as f32, z as f32]);
                uvs.push([u as f32, v as f32]);
                colors.push([1.0, 1.0, 1.0, fade.sample(u, v)]);
            }
        }

        let mut indices = Vec::with_capacity(segments as usize * segments as usize * 6);
        for row in 0..segments {
            for col in 0..segments {
                let a = row * (segments + 1) + col;
                let b = a + 1;
                let c = a + segments + 1;
                let d = c + 1;
                // Counter-clockwise seen from above.
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        let normals = smooth_normals(&positions, &indices);

        Self {
            segments,
            positions,
            normals,
            uvs,
            colors,
            indices,
            width: shape.width,
            depth: shape.depth,
        }
    }

    /// Index of the grid vertex closest to world `(x, z)`.
    pub fn nearest_vertex(&self, x: f64, z: f64) -> usize {
        let n = self.segments as f64;
        let col = ((x / self.width + 0.5) * n).round().clamp(0.0, n) as usize;
        let row = ((z / self.depth + 0.5) * n).round().clamp(0.0, n) as usize;
        row * (self.segments as usize + 1) + col
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn into_mesh(self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD);
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, self.colors);
        mesh.insert_indices(Indices::U32(self.indices));
        mesh
    }
}

/// Area-weighted vertex normals from the displaced positions.
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from_array(positions[i0]);
        let p1 = Vec3::from_array(positions[i1]);
        let p2 = Vec3::from_array(positions[i2]);
        let face = (p1 - p0).cross(p2 - p0);
        accum[i0] += face;
        accum[i1] += face;
        accum[i2] += face;
    }

    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
