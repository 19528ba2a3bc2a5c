// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray casting against boxes and triangle meshes

use crate::bounds::Aabb;
use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};

const EPSILON: f64 = 1e-9;

/// Half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

/// Nearest intersection of a ray with a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f64,
    pub point: Point3<f64>,
    pub triangle: usize,
}

impl Ray {
    /// Create a ray, normalizing the direction; `None` for a zero direction
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        let direction = direction.try_normalize(EPSILON)?;
        Some(Self { origin, direction })
    }

    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Slab test, returns entry distance (or exit distance when starting inside)
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f64> {
        let inv = Vector3::new(
            1.0 / self.direction.x,
            1.0 / self.direction.y,
            1.0 / self.direction.z,
        );

        let t1 = (aabb.min - self.origin).component_mul(&inv);
        let t2 = (aabb.max - self.origin).component_mul(&inv);

        let tmin = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
        let tmax = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

        if tmax < 0.0 || tmin > tmax {
            return None;
        }

        Some(if tmin < 0.0 { tmax } else { tmin })
    }

    /// Möller–Trumbore, two-sided
    pub fn intersect_triangle(
        &self,
        v0: &Point3<f64>,
        v1: &Point3<f64>,
        v2: &Point3<f64>,
    ) -> Option<f64> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(&edge2);
        let a = edge1.dot(&h);

        if a.abs() < EPSILON {
            return None; // parallel
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * self.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > EPSILON).then_some(t)
    }

    /// Nearest triangle hit on a mesh, with a bounding-box early out
    pub fn intersect_mesh(&self, mesh: &Mesh) -> Option<RayHit> {
        let bounds = mesh.aabb()?;
        // f32 storage can shave the last ulp off a face
        let padded = Aabb::new(
            bounds.min - Vector3::repeat(1e-5),
            bounds.max + Vector3::repeat(1e-5),
        );
        self.intersect_aabb(&padded)?;

        mesh.triangles()
            .enumerate()
            .filter_map(|(triangle, [v0, v1, v2])| {
                self.intersect_triangle(&v0, &v1, &v2)
                    .map(|distance| (triangle, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(triangle, distance)| RayHit {
                distance,
                point: self.at(distance),
                triangle,
            })
    }
}
