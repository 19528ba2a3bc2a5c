// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! earcutr for planar polygons, plus the projection used to bring 3D CSG
//! output polygons onto a plane before triangulating them.

use crate::{Error, Point2, Point3, Result, Vector3};

fn flatten(contours: &[&[Point2<f64>]]) -> (Vec<f64>, Vec<usize>) {
    let total: usize = contours.iter().map(|c| c.len()).sum();
    let mut vertices = Vec::with_capacity(total * 2);
    let mut hole_starts = Vec::with_capacity(contours.len().saturating_sub(1));
    for (i, contour) in contours.iter().enumerate() {
        if i > 0 {
            hole_starts.push(vertices.len() / 2);
        }
        for p in contour.iter() {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }
    (vertices, hole_starts)
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    match points.len() {
        0..=2 => Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        )),
        3 => Ok(vec![0, 1, 2]),
        _ => {
            let (vertices, _) = flatten(&[points]);
            earcutr::earcut(&vertices, &[], 2)
                .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
        }
    }
}

/// Triangulate a polygon with holes
/// Returns triangle indices into the combined vertex array (outer, then holes in order)
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }
    if holes.is_empty() {
        return triangulate_polygon(outer);
    }

    let mut contours: Vec<&[Point2<f64>]> = Vec::with_capacity(holes.len() + 1);
    contours.push(outer);
    contours.extend(holes.iter().map(|h| h.as_slice()));
    let (vertices, hole_starts) = flatten(&contours);

    earcutr::earcut(&vertices, &hole_starts, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Project 3D points onto the plane through the first point with the given normal
///
/// Returns the 2D points and the in-plane `(u, v)` axes. The basis is right
/// handed with respect to `normal`, so a polygon wound counter-clockwise
/// around the normal stays counter-clockwise in 2D.
pub fn project_to_2d(
    points_3d: &[Point3<f64>],
    normal: &Vector3<f64>,
) -> (Vec<Point2<f64>>, Vector3<f64>, Vector3<f64>) {
    let Some(origin) = points_3d.first() else {
        return (Vec::new(), Vector3::zeros(), Vector3::zeros());
    };

    // Pick the world axis least aligned with the normal for a stable cross product
    let reference = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let u_axis = reference.cross(normal).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    let points_2d = points_3d
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u_axis), d.dot(&v_axis))
        })
        .collect();

    (points_2d, u_axis, v_axis)
}

/// Polygon normal by Newell's method, +Z for degenerate input
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    if n < 3 {
        return Vector3::z();
    }

    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal.try_normalize(1e-10).unwrap_or_else(Vector3::z)
}
