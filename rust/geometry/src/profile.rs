// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions and triangulation

use crate::error::{Error, Result};
use crate::triangulation::triangulate_polygon_with_holes;
use nalgebra::Point2;

/// 2D Profile with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Axis-aligned rectangle, counter-clockwise
    pub fn rectangle(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self::new(vec![
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        ])
    }

    /// Add a hole to the profile
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Enclosed area (outer minus holes)
    pub fn area(&self) -> f64 {
        let outer = signed_area(&self.outer).abs();
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        outer - holes
    }

    /// Triangulate the profile using earcutr
    /// Returns triangle indices into the flattened vertex array
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let indices = triangulate_polygon_with_holes(&self.outer, &self.holes)?;
        let points = self
            .outer
            .iter()
            .chain(self.holes.iter().flatten())
            .copied()
            .collect();

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// Signed area of a contour, positive for counter-clockwise
pub fn signed_area(contour: &[Point2<f64>]) -> f64 {
    let n = contour.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_is_ccw() {
        let rect = Profile2D::rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 2.0));
        assert!(signed_area(&rect.outer) > 0.0);
        assert_relative_eq!(rect.area(), 8.0);
    }

    #[test]
    fn test_triangulate_with_hole() {
        let mut rect = Profile2D::rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0));
        let mut hole = Profile2D::rectangle(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)).outer;
        hole.reverse();
        rect.add_hole(hole);
        let tri = rect.triangulate().unwrap();
        assert_eq!(tri.points.len(), 8);
        assert_eq!(tri.indices.len() % 3, 0);
        assert_relative_eq!(rect.area(), 15.0);
    }

    #[test]
    fn test_degenerate_profile_rejected() {
        let profile = Profile2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(profile.triangulate().is_err());
    }
}
