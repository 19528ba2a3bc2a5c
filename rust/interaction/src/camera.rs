// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera model and screen ↔ world conversions
//!
//! Screen coordinates are pixels with the origin at the top-left corner of
//! the viewport and Y growing downwards.

use floorplan_geometry::{Aabb, Matrix4, Point2, Point3, Ray, Vector3};
use nalgebra::Vector4;

/// Projection of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Vertical field of view in radians
    Perspective { fov_y: f64, near: f64, far: f64 },
    /// Half of the visible height in world units
    Orthographic { half_height: f64, near: f64, far: f64 },
}

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl ScreenRect {
    /// Rectangle spanned by two corners in any order
    pub fn from_corners(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    fn from_points(points: impl IntoIterator<Item = Point2<f64>>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<ScreenRect>, p| {
            Some(match acc {
                None => ScreenRect { min: p, max: p },
                Some(r) => ScreenRect {
                    min: Point2::new(r.min.x.min(p.x), r.min.y.min(p.y)),
                    max: Point2::new(r.max.x.max(p.x), r.max.y.max(p.y)),
                },
            })
        })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Inclusive containment of another rectangle
    pub fn contains_rect(&self, other: &ScreenRect) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Overlap test, touching edges count
    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// Look-at camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub projection: Projection,
}

impl Camera {
    /// Perspective camera with a vertical field of view in degrees
    pub fn perspective(eye: Point3<f64>, target: Point3<f64>, fov_y_degrees: f64) -> Self {
        Self {
            eye,
            target,
            up: Vector3::y(),
            projection: Projection::Perspective {
                fov_y: fov_y_degrees.to_radians(),
                near: 0.1,
                far: 1000.0,
            },
        }
    }

    /// Orthographic camera showing `half_height` world units above and below the target
    pub fn orthographic(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        half_height: f64,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            projection: Projection::Orthographic {
                half_height,
                near: 0.1,
                far: 1000.0,
            },
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(&self.eye, &self.target, &self.up)
    }

    pub fn projection_matrix(&self, aspect: f64) -> Matrix4<f64> {
        match self.projection {
            Projection::Perspective { fov_y, near, far } => {
                Matrix4::new_perspective(aspect, fov_y, near, far)
            }
            Projection::Orthographic {
                half_height,
                near,
                far,
            } => {
                let half_width = half_height * aspect;
                Matrix4::new_orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    near,
                    far,
                )
            }
        }
    }

    pub fn view_projection(&self, viewport: &Viewport) -> Matrix4<f64> {
        self.projection_matrix(viewport.aspect()) * self.view_matrix()
    }

    /// Ray through a screen pixel, from the near plane towards the far plane
    pub fn screen_to_ray(&self, screen: Point2<f64>, viewport: &Viewport) -> Option<Ray> {
        let inverse = self.view_projection(viewport).try_inverse()?;
        let ndc_x = 2.0 * screen.x / viewport.width - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / viewport.height;

        let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));
        Ray::new(near, far - near)
    }

    /// Screen position and NDC depth of a world point; `None` behind the camera
    pub fn project_point(&self, point: &Point3<f64>, viewport: &Viewport) -> Option<Point3<f64>> {
        clip_to_screen(&(self.view_projection(viewport) * point.to_homogeneous()), viewport)
    }

    /// Screen bounds of the part of a box in front of the near plane
    ///
    /// Edges crossing the near plane are cut there, so a box around the eye
    /// still covers the pixels of its visible part. `None` when the whole box
    /// is behind the near plane.
    pub fn project_aabb(&self, aabb: &Aabb, viewport: &Viewport) -> Option<ScreenRect> {
        let view_projection = self.view_projection(viewport);
        let clip = aabb.corners().map(|c| view_projection * c.to_homogeneous());
        // Signed distance to the near plane in clip space (z = -w)
        let near = |c: &Vector4<f64>| c.z + c.w;

        let mut kept: Vec<Vector4<f64>> = clip.iter().filter(|c| near(c) >= 0.0).copied().collect();
        for (a, b) in AABB_EDGES {
            let (da, db) = (near(&clip[a]), near(&clip[b]));
            if (da >= 0.0) != (db >= 0.0) {
                let t = da / (da - db);
                kept.push(clip[a] + (clip[b] - clip[a]) * t);
            }
        }
        ScreenRect::from_points(
            kept.iter()
                .filter_map(|c| clip_to_screen(c, viewport))
                .map(|p| Point2::new(p.x, p.y)),
        )
    }
}

/// Corner index pairs of the twelve box edges, in `Aabb::corners` order
const AABB_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

fn clip_to_screen(clip: &Vector4<f64>, viewport: &Viewport) -> Option<Point3<f64>> {
    if clip.w <= f64::EPSILON {
        return None;
    }
    let ndc = clip.xyz() / clip.w;
    Some(Point3::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
        ndc.z,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn top_down() -> (Camera, Viewport) {
        let camera = Camera::orthographic(
            Point3::new(6.0, 50.0, 2.0),
            Point3::new(6.0, 0.0, 2.0),
            -Vector3::z(),
            2.0,
        );
        (camera, Viewport::new(1200.0, 400.0))
    }

    #[test]
    fn test_orthographic_projection_maps_plan_to_pixels() {
        let (camera, viewport) = top_down();
        let p = camera
            .project_point(&Point3::new(0.0, 0.0, 0.0), &viewport)
            .unwrap();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);

        let p = camera
            .project_point(&Point3::new(12.0, 0.0, 4.0), &viewport)
            .unwrap();
        assert_relative_eq!(p.x, 1200.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 400.0, epsilon = 1e-6);
    }

    #[test]
    fn test_screen_to_ray_points_down() {
        let (camera, viewport) = top_down();
        let ray = camera
            .screen_to_ray(Point2::new(300.0, 100.0), &viewport)
            .unwrap();
        assert_relative_eq!(ray.direction.y, -1.0, epsilon = 1e-9);
        assert_relative_eq!(ray.origin.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(ray.origin.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_perspective_center_ray_hits_target() {
        let camera = Camera::perspective(Point3::new(0.0, 10.0, 10.0), Point3::origin(), 60.0);
        let viewport = Viewport::new(800.0, 600.0);
        let ray = camera
            .screen_to_ray(Point2::new(400.0, 300.0), &viewport)
            .unwrap();
        let expected = (Point3::origin() - camera.eye).normalize();
        assert_relative_eq!(ray.direction, expected, epsilon = 1e-9);

        // A point behind the eye does not project
        assert!(camera
            .project_point(&Point3::new(0.0, 20.0, 20.0), &viewport)
            .is_none());
    }

    #[test]
    fn test_box_around_eye_is_clipped_to_near_plane() {
        let camera = Camera::perspective(
            Point3::new(2.0, 1.5, 2.0),
            Point3::new(10.0, 1.5, 2.0),
            60.0,
        );
        let viewport = Viewport::new(800.0, 600.0);
        let room = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(8.0, 3.0, 4.0));
        let rect = camera.project_aabb(&room, &viewport).unwrap();
        let center = ScreenRect::from_corners(Point2::new(390.0, 290.0), Point2::new(410.0, 310.0));
        assert!(rect.intersects(&center));

        let behind = Aabb::new(Point3::new(-6.0, 0.0, 0.0), Point3::new(-2.0, 3.0, 4.0));
        assert!(camera.project_aabb(&behind, &viewport).is_none());
    }

    #[test]
    fn test_screen_rect_tests() {
        let outer = ScreenRect::from_corners(Point2::new(100.0, 450.0), Point2::new(900.0, -50.0));
        let inner = ScreenRect::from_corners(Point2::new(400.0, 0.0), Point2::new(800.0, 400.0));
        let side = ScreenRect::from_corners(Point2::new(0.0, 0.0), Point2::new(400.0, 400.0));
        assert!(outer.contains_rect(&inner));
        assert!(!outer.contains_rect(&side));
        assert!(outer.intersects(&side));
        assert_relative_eq!(outer.width(), 800.0);
    }
}
