//! Terrain mesh construction from a height field.
//!
//! The field is walked with a stride set by the level of detail. Each visited
//! cell becomes one vertex, and each visited cell that is not on the last
//! visited row or column opens a quad of two triangles toward its lower-right
//! neighbor.
//!
//! When `(width - 1)` or `(height - 1)` is not a multiple of the stride, the
//! walk stops on the last whole step and the remaining partial row/column is
//! dropped. No triangle ever references a vertex that was not emitted.

use serde::Serialize;

use crate::curve::HeightCurve;
use crate::noise_field::HeightField;
use crate::params::LevelOfDetail;

/// Geometry ready for a renderer. `vertices[i]` pairs with `uvs[i]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MeshData {
    pub vertices: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub triangles: Vec<u32>,
    /// Vertices per row of the strided grid
    pub vertices_per_row: usize,
}

impl MeshData {
    fn with_capacity(vertices_per_row: usize, rows: usize) -> Self {
        let quads = vertices_per_row.saturating_sub(1) * rows.saturating_sub(1);
        Self {
            vertices: Vec::with_capacity(vertices_per_row * rows),
            uvs: Vec::with_capacity(vertices_per_row * rows),
            triangles: Vec::with_capacity(quads * 6),
            vertices_per_row,
        }
    }

    fn add_triangle(&mut self, a: usize, b: usize, c: usize) {
        self.triangles.extend_from_slice(&[a as u32, b as u32, c as u32]);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Area-weighted per-vertex normals derived from the triangles.
    /// Vertices not used by any triangle get straight up.
    pub fn normals(&self) -> Vec<[f32; 3]> {
        let mut normals = vec![[0.0f32; 3]; self.vertices.len()];

        for tri in self.triangles.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = cross(sub(self.vertices[b], self.vertices[a]), sub(self.vertices[c], self.vertices[a]));
            for idx in [a, b, c] {
                for axis in 0..3 {
                    normals[idx][axis] += face[axis];
                }
            }
        }

        for n in &mut normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            *n = if len > f32::EPSILON {
                [n[0] / len, n[1] / len, n[2] / len]
            } else {
                [0.0, 1.0, 0.0]
            };
        }

        normals
    }

    /// Vertex positions as raw bytes for a GPU vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Triangle indices as raw bytes for a GPU index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Build a mesh centered on the origin in x/z, with elevation
/// `curve(height) * height_multiplier`.
pub fn build_mesh(
    field: &HeightField,
    height_multiplier: f32,
    curve: &HeightCurve,
    level_of_detail: LevelOfDetail,
) -> MeshData {
    let width = field.width();
    let height = field.height();
    let step = level_of_detail.step();
    let vertices_per_row = level_of_detail.vertices_per_line(width);
    let rows = level_of_detail.vertices_per_line(height);

    // Row 0 is the far edge, at +z
    let top_left_x = (width as f32 - 1.0) / -2.0;
    let top_left_z = (height as f32 - 1.0) / 2.0;

    let mut mesh = MeshData::with_capacity(vertices_per_row, rows);
    let mut vertex_index = 0;

    for (row, y) in (0..height).step_by(step).take(rows).enumerate() {
        for (col, x) in (0..width).step_by(step).take(vertices_per_row).enumerate() {
            let elevation = curve.evaluate(field.get(x, y)) * height_multiplier;
            mesh.vertices.push([top_left_x + x as f32, elevation, top_left_z - y as f32]);
            mesh.uvs.push([x as f32 / width as f32, y as f32 / height as f32]);

            if col + 1 < vertices_per_row && row + 1 < rows {
                mesh.add_triangle(vertex_index, vertex_index + vertices_per_row + 1, vertex_index + vertices_per_row);
                mesh.add_triangle(vertex_index + vertices_per_row + 1, vertex_index, vertex_index + 1);
            }

            vertex_index += 1;
        }
    }

    if (width - 1) % step != 0 || (height - 1) % step != 0 {
        log::debug!(
            "{}x{} field is not aligned to stride {}; trailing cells dropped",
            width, height, step
        );
    }
    log::debug!(
        "built mesh at {}: {} vertices, {} triangles",
        level_of_detail,
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    mesh
}
