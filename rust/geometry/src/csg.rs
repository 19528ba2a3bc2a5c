// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG subtraction of opening volumes from wall slabs
//!
//! Meshes are converted into csgrs polygon soups, differenced, then converted
//! back and re-triangulated. Callers treat an error as "keep the uncut host".

use crate::bounds::Aabb;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::primitives::box_mesh;
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
use csgrs::traits::CSG;
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// Boolean subtraction backed by csgrs
#[derive(Debug, Clone, Copy)]
pub struct ClippingProcessor {
    /// Epsilon for floating point comparisons
    pub epsilon: f64,
}

impl ClippingProcessor {
    pub fn new() -> Self {
        Self { epsilon: 1e-6 }
    }

    /// Box subtraction - removes everything inside the box from the mesh
    pub fn subtract_box(&self, mesh: &Mesh, cutter: &Aabb) -> Result<Mesh> {
        self.subtract_boxes(mesh, std::slice::from_ref(cutter))
    }

    /// Subtract several boxes in sequence, skipping cutters that miss the host
    pub fn subtract_boxes(&self, mesh: &Mesh, cutters: &[Aabb]) -> Result<Mesh> {
        let Some(host_bounds) = mesh.aabb() else {
            return Ok(Mesh::new());
        };

        let relevant: Vec<&Aabb> = cutters
            .iter()
            .filter(|c| c.is_solid() && c.intersects(&host_bounds))
            .collect();
        if relevant.is_empty() {
            return Ok(mesh.clone());
        }

        let mut result = self.mesh_to_csgrs(mesh)?;
        for cutter in relevant {
            let cutter_csg = self.mesh_to_csgrs(&box_mesh(cutter.min, cutter.max))?;
            result = result.difference(&cutter_csg);
        }

        let out = self.csgrs_to_mesh(&result);
        if out.is_empty() {
            return Err(Error::EmptyMesh(
                "CSG difference removed the whole host".to_string(),
            ));
        }
        Ok(out)
    }

    /// Convert our Mesh format to a csgrs polygon soup
    fn mesh_to_csgrs(&self, mesh: &Mesh) -> Result<CSGMesh<()>> {
        if mesh.is_empty() {
            return Ok(CSGMesh {
                polygons: Vec::new(),
                bounding_box: OnceLock::new(),
                metadata: None,
            });
        }

        let mut polygons = Vec::with_capacity(mesh.triangle_count());
        for [v0, v1, v2] in mesh.triangles() {
            // Degenerate triangles would put NaN normals into the BSP
            let face_normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(self.epsilon * 1e-4) {
                Some(n) => n,
                None => continue,
            };
            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];
            polygons.push(Polygon::new(vertices, None));
        }

        if polygons.is_empty() {
            return Err(Error::EmptyMesh(
                "mesh has no non-degenerate triangles".to_string(),
            ));
        }

        Ok(CSGMesh::from_polygons(&polygons, None))
    }

    /// Convert csgrs polygons back into a triangle mesh
    fn csgrs_to_mesh(&self, csg_mesh: &CSGMesh<()>) -> Mesh {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            let points_3d: Vec<Point3<f64>> = vertices.iter().map(|v| v.pos).collect();

            let raw_normal: Vector3<f64> = vertices[0].normal;
            let normal = match raw_normal.try_normalize(1e-10) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => match calculate_polygon_normal(&points_3d).try_normalize(1e-10) {
                    Some(n) => n,
                    None => continue,
                },
            };

            let indices = if points_3d.len() == 3 {
                vec![0, 1, 2]
            } else {
                let (points_2d, _, _) = project_to_2d(&points_3d, &normal);
                match triangulate_polygon(&points_2d) {
                    Ok(idx) => idx,
                    Err(_) => continue,
                }
            };

            let base = mesh.vertex_count() as u32;
            for p in &points_3d {
                mesh.add_vertex(*p, normal);
            }
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(
                    base + tri[0] as u32,
                    base + tri[1] as u32,
                    base + tri[2] as u32,
                );
            }
        }

        mesh
    }
}

impl Default for ClippingProcessor {
    fn default() -> Self {
        Self::new()
    }
}
