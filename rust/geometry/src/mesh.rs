// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indexed triangle meshes in f32, the output format of every builder

use crate::bounds::Aabb;
use nalgebra::{Point3, Vector3};

/// Triangle mesh with per-vertex normals
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Empty mesh with room for `vertex_count` vertices and `index_count` indices
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Append another mesh, rebasing its indices
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = (self.positions.len() / 3) as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Append several meshes with a single reservation
    pub fn merge_all(&mut self, meshes: &[Mesh]) {
        let total_positions: usize = meshes.iter().map(|m| m.positions.len()).sum();
        let total_indices: usize = meshes.iter().map(|m| m.indices.len()).sum();

        self.positions.reserve(total_positions);
        self.normals.reserve(total_positions);
        self.indices.reserve(total_indices);

        for mesh in meshes {
            self.merge(mesh);
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of a vertex in f64
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        let i = index * 3;
        Point3::new(
            self.positions[i] as f64,
            self.positions[i + 1] as f64,
            self.positions[i + 2] as f64,
        )
    }

    /// Normal of a vertex in f64
    #[inline]
    pub fn normal(&self, index: usize) -> Vector3<f64> {
        let i = index * 3;
        Vector3::new(
            self.normals[i] as f64,
            self.normals[i + 1] as f64,
            self.normals[i + 2] as f64,
        )
    }

    /// Iterate triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.position(tri[0] as usize),
                self.position(tri[1] as usize),
                self.position(tri[2] as usize),
            ]
        })
    }

    /// Geometric normal of a triangle, `None` for degenerate triangles
    pub fn triangle_normal(&self, triangle: usize) -> Option<Vector3<f64>> {
        let base = triangle * 3;
        let tri = self.indices.get(base..base + 3)?;
        let v0 = self.position(tri[0] as usize);
        let v1 = self.position(tri[1] as usize);
        let v2 = self.position(tri[2] as usize);
        (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-12)
    }

    /// Keep only the triangles accepted by `keep`, compacting the vertex buffers
    pub fn filter_triangles<F>(&self, mut keep: F) -> Mesh
    where
        F: FnMut(usize) -> bool,
    {
        let mut out = Mesh::with_capacity(self.vertex_count(), self.indices.len());
        let mut remap = vec![u32::MAX; self.vertex_count()];

        for (t, tri) in self.indices.chunks_exact(3).enumerate() {
            if !keep(t) {
                continue;
            }
            let mut mapped = [0u32; 3];
            for (slot, &old) in mapped.iter_mut().zip(tri) {
                let old = old as usize;
                if remap[old] == u32::MAX {
                    remap[old] = out.vertex_count() as u32;
                    out.add_vertex(self.position(old), self.normal(old));
                }
                *slot = remap[old];
            }
            out.add_triangle(mapped[0], mapped[1], mapped[2]);
        }

        out
    }

    /// Calculate bounds (min, max) in f32
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Bounding box in f64, `None` for an empty mesh
    pub fn aabb(&self) -> Option<Aabb> {
        if self.is_empty() {
            return None;
        }
        let (min, max) = self.bounds();
        Some(Aabb::new(
            Point3::new(min.x as f64, min.y as f64, min.z as f64),
            Point3::new(max.x as f64, max.y as f64, max.z as f64),
        ))
    }

    /// Move every vertex by `offset`
    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.positions.chunks_exact_mut(3).for_each(|chunk| {
            chunk[0] = (chunk[0] as f64 + offset.x) as f32;
            chunk[1] = (chunk[1] as f64 + offset.y) as f32;
            chunk[2] = (chunk[2] as f64 + offset.z) as f32;
        });
    }

    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::box_mesh;

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.aabb().is_none());
    }

    #[test]
    fn test_merge_offsets_indices_of_second_slab() {
        let mut wall = box_mesh(Point3::origin(), Point3::new(4.0, 3.0, 0.2));
        let plate = box_mesh(Point3::new(0.0, -0.2, 0.0), Point3::new(4.0, 0.0, 4.0));
        let before = wall.vertex_count() as u32;

        wall.merge(&plate);
        assert_eq!(wall.vertex_count(), 48);
        assert_eq!(wall.triangle_count(), 24);
        assert!(wall.indices[36..].iter().all(|&i| i >= before));

        let bounds = wall.aabb().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, -0.2f32 as f64, 0.0));
        assert_eq!(bounds.max.z, 4.0);
    }

    #[test]
    fn test_merge_all_matches_sequential_merge() {
        let pieces = [
            box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0)),
            Mesh::new(),
            box_mesh(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)),
        ];
        let mut batched = Mesh::new();
        batched.merge_all(&pieces);

        let mut sequential = Mesh::new();
        for piece in &pieces {
            sequential.merge(piece);
        }
        assert_eq!(batched, sequential);
        assert_eq!(batched.vertex_count(), 48);
    }

    #[test]
    fn test_translate_moves_bounds() {
        let mut mesh = box_mesh(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        mesh.translate(Vector3::new(0.0, 5.0, 0.0));
        let aabb = mesh.aabb().unwrap();
        assert_eq!(aabb.min, Point3::new(0.0, 5.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 7.0, 3.0));
    }

    #[test]
    fn test_filter_triangles_compacts_vertices() {
        let mesh = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let up_only = mesh.filter_triangles(|t| {
            mesh.triangle_normal(t)
                .map(|n| n.y > 0.9)
                .unwrap_or(false)
        });
        assert_eq!(up_only.triangle_count(), 2);
        assert_eq!(up_only.vertex_count(), 4);
    }
}
