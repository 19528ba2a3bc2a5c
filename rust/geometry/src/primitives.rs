// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Box primitives for wall slabs, stair steps, lift shafts and cutters

use crate::bounds::Aabb;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};

/// Create a flat-shaded box mesh from min/max bounds
///
/// 24 vertices (4 per face so each face keeps its own normal) and 12
/// triangles, counter-clockwise when viewed from outside.
pub fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    let (a, b) = (min, max);
    let mut mesh = Mesh::with_capacity(24, 36);

    let faces: [([Point3<f64>; 4], Vector3<f64>); 6] = [
        // -Z
        (
            [
                Point3::new(a.x, a.y, a.z),
                Point3::new(a.x, b.y, a.z),
                Point3::new(b.x, b.y, a.z),
                Point3::new(b.x, a.y, a.z),
            ],
            -Vector3::z(),
        ),
        // +Z
        (
            [
                Point3::new(a.x, a.y, b.z),
                Point3::new(b.x, a.y, b.z),
                Point3::new(b.x, b.y, b.z),
                Point3::new(a.x, b.y, b.z),
            ],
            Vector3::z(),
        ),
        // -X
        (
            [
                Point3::new(a.x, a.y, a.z),
                Point3::new(a.x, a.y, b.z),
                Point3::new(a.x, b.y, b.z),
                Point3::new(a.x, b.y, a.z),
            ],
            -Vector3::x(),
        ),
        // +X
        (
            [
                Point3::new(b.x, a.y, a.z),
                Point3::new(b.x, b.y, a.z),
                Point3::new(b.x, b.y, b.z),
                Point3::new(b.x, a.y, b.z),
            ],
            Vector3::x(),
        ),
        // -Y
        (
            [
                Point3::new(a.x, a.y, a.z),
                Point3::new(b.x, a.y, a.z),
                Point3::new(b.x, a.y, b.z),
                Point3::new(a.x, a.y, b.z),
            ],
            -Vector3::y(),
        ),
        // +Y
        (
            [
                Point3::new(a.x, b.y, a.z),
                Point3::new(a.x, b.y, b.z),
                Point3::new(b.x, b.y, b.z),
                Point3::new(b.x, b.y, a.z),
            ],
            Vector3::y(),
        ),
    ];

    for (corners, normal) in faces {
        let base = mesh.vertex_count() as u32;
        for corner in corners {
            mesh.add_vertex(corner, normal);
        }
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }

    mesh
}

/// Create a box mesh from a bounding box, rejecting flat or non-finite boxes
pub fn aabb_to_mesh(aabb: &Aabb) -> Result<Mesh> {
    if !aabb.is_solid() {
        return Err(Error::DegenerateBox {
            min: [aabb.min.x, aabb.min.y, aabb.min.z],
            max: [aabb.max.x, aabb.max.y, aabb.max.z],
        });
    }
    Ok(box_mesh(aabb.min, aabb.max))
}
