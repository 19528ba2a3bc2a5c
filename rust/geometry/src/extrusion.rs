// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D profiles to 3D meshes

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use std::f64::consts::FRAC_PI_2;

/// Extrude a 2D profile along the Z axis
pub fn extrude_profile(
    profile: &Profile2D,
    depth: f64,
    transform: Option<Matrix4<f64>>,
) -> Result<Mesh> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(Error::InvalidExtrusion(format!(
            "Depth must be positive, got {}",
            depth
        )));
    }

    let triangulation = profile.triangulate()?;

    let side_vertex_count: usize = profile.outer.len() * 4
        + profile.holes.iter().map(|h| h.len() * 4).sum::<usize>();
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + side_vertex_count,
        triangulation.indices.len() * 2 + side_vertex_count / 4 * 6,
    );

    create_cap_mesh(&triangulation, 0.0, -Vector3::z(), &mut mesh);
    create_cap_mesh(&triangulation, depth, Vector3::z(), &mut mesh);

    create_side_walls(&profile.outer, depth, &mut mesh);
    for hole in &profile.holes {
        create_side_walls(hole, depth, &mut mesh);
    }

    if let Some(mat) = transform {
        apply_transform(&mut mesh, &mat);
    }

    Ok(mesh)
}

/// Extrude a plan-view profile upward
///
/// The profile is given in floor plan coordinates (`x`, `z`); the slab spans
/// `y_bottom..y_bottom + thickness`.
pub fn extrude_profile_y_up(profile: &Profile2D, y_bottom: f64, thickness: f64) -> Result<Mesh> {
    // Rotating -90° about X maps local (u, v, e) to (u, e, -v), so plan z is
    // stored negated; reversing keeps outer contours counter-clockwise.
    let flip = |contour: &[Point2<f64>]| -> Vec<Point2<f64>> {
        contour.iter().rev().map(|p| Point2::new(p.x, -p.y)).collect()
    };
    let local = Profile2D {
        outer: flip(&profile.outer),
        holes: profile.holes.iter().map(|h| flip(h)).collect(),
    };

    let transform = Matrix4::new_translation(&Vector3::new(0.0, y_bottom, 0.0))
        * Matrix4::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2);

    extrude_profile(&local, thickness, Some(transform))
}

/// Create a cap mesh (top or bottom) from triangulation
#[inline]
fn create_cap_mesh(triangulation: &Triangulation, z: f64, normal: Vector3<f64>, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        // Reverse winding for the bottom cap
        if normal.z < 0.0 {
            mesh.add_triangle(i0, i2, i1);
        } else {
            mesh.add_triangle(i0, i1, i2);
        }
    }
}

/// Create side walls for a profile boundary
fn create_side_walls(boundary: &[Point2<f64>], depth: f64, mesh: &mut Mesh) {
    for i in 0..boundary.len() {
        let p0 = &boundary[i];
        let p1 = &boundary[(i + 1) % boundary.len()];

        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue, // duplicate consecutive points
        };

        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(Point3::new(p0.x, p0.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, depth), normal);
        mesh.add_vertex(Point3::new(p0.x, p0.y, depth), normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);
    }
}

/// Apply transformation matrix to mesh
pub fn apply_transform(mesh: &mut Mesh, transform: &Matrix4<f64>) {
    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = transform.transform_point(&point);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    // Normals use the inverse transpose
    let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

    mesh.normals.chunks_exact_mut(3).for_each(|chunk| {
        let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = (normal_matrix * normal.to_homogeneous())
            .xyz()
            .try_normalize(1e-12)
            .unwrap_or(normal);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });
}
