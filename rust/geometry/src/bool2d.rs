// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Floor-Plate Footprints
//!
//! Stair and lift shafts are removed from floor plates in plan view before
//! extrusion, which is cheaper and more robust than a 3D CSG pass. Unlike a
//! wall opening, a penetration can split a plate in two, so every resulting
//! shape is returned.

use crate::error::{Error, Result};
use crate::profile::{signed_area, Profile2D};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Axis-aligned rectangle in plan coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Rect2 {
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle from an origin corner and a size
    pub fn from_origin_size(x: f64, y: f64, width: f64, depth: f64) -> Self {
        Self::new(Point2::new(x, y), Point2::new(x + width, y + depth))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.depth()
    }

    /// Strict overlap; shared edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect2) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Overlapping region, `None` when the rectangles do not overlap
    pub fn intersection(&self, other: &Rect2) -> Option<Rect2> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Rect2 {
            min: Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }

    /// Counter-clockwise contour
    pub fn contour(&self) -> Vec<Point2<f64>> {
        Profile2D::rectangle(self.min, self.max).outer
    }
}

/// Subtract rectangles from a profile, returning every remaining shape
///
/// Rectangles that do not overlap the profile's bounds are ignored; if none
/// overlap, the profile is returned unchanged as a single shape.
pub fn subtract_rectangles_2d(profile: &Profile2D, rects: &[Rect2]) -> Result<Vec<Profile2D>> {
    let contours: Vec<Vec<Point2<f64>>> = rects
        .iter()
        .filter(|r| r.area() > MIN_AREA_THRESHOLD)
        .map(Rect2::contour)
        .collect();
    subtract_contours_2d(profile, &contours)
}

/// Subtract arbitrary contours from a profile, returning every remaining shape
pub fn subtract_contours_2d(
    profile: &Profile2D,
    contours: &[Vec<Point2<f64>>],
) -> Result<Vec<Profile2D>> {
    if profile.outer.len() < 3 {
        return Err(Error::InvalidProfile(
            "Profile must have at least 3 vertices".to_string(),
        ));
    }

    let Some((pmin, pmax)) = contour_bounds(&profile.outer) else {
        return Ok(vec![profile.clone()]);
    };
    let profile_rect = Rect2::new(pmin, pmax);

    let clip: Vec<Vec<[f64; 2]>> = contours
        .iter()
        .filter(|c| c.len() >= 3)
        .filter(|c| {
            contour_bounds(c)
                .map(|(min, max)| Rect2::new(min, max).overlaps(&profile_rect))
                .unwrap_or(false)
        })
        .map(|c| contour_to_path(c))
        .collect();

    if clip.is_empty() {
        return Ok(vec![profile.clone()]);
    }

    let subject = profile_to_paths(profile);
    let result = subject.overlay(&clip, OverlayRule::Difference, FillRule::EvenOdd);

    Ok(shapes_to_profiles(&result))
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let first = contour.first()?;
    Some(contour.iter().skip(1).fold((*first, *first), |(min, max), p| {
        (
            Point2::new(min.x.min(p.x), min.y.min(p.y)),
            Point2::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

fn oriented(contour: &[Point2<f64>], ccw: bool) -> Vec<Point2<f64>> {
    if (signed_area(contour) > 0.0) == ccw {
        contour.to_vec()
    } else {
        contour.iter().rev().copied().collect()
    }
}

fn profile_to_paths(profile: &Profile2D) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::with_capacity(1 + profile.holes.len());
    paths.push(contour_to_path(&oriented(&profile.outer, true)));
    for hole in &profile.holes {
        paths.push(contour_to_path(&oriented(hole, false)));
    }
    paths
}

fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

/// Convert i_overlay shapes (first contour outer, rest holes) into profiles
fn shapes_to_profiles(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Profile2D> {
    let to_points = |path: &Vec<[f64; 2]>| -> Vec<Point2<f64>> {
        path.iter().map(|p| Point2::new(p[0], p[1])).collect()
    };

    shapes
        .iter()
        .filter_map(|shape| {
            let (outer, holes) = shape.split_first()?;
            let outer = to_points(outer);
            if signed_area(&outer).abs() <= MIN_AREA_THRESHOLD {
                return None;
            }
            let mut profile = Profile2D::new(oriented(&outer, true));
            for hole in holes {
                let hole = to_points(hole);
                if signed_area(&hole).abs() > MIN_AREA_THRESHOLD {
                    profile.add_hole(oriented(&hole, false));
                }
            }
            Some(profile)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plate() -> Profile2D {
        Profile2D::rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0))
    }

    #[test]
    fn test_inner_penetration_becomes_hole() {
        let shapes =
            subtract_rectangles_2d(&plate(), &[Rect2::from_origin_size(1.0, 1.0, 1.0, 2.0)])
                .unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
        assert_relative_eq!(shapes[0].area(), 14.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_width_penetration_splits_plate() {
        let shapes =
            subtract_rectangles_2d(&plate(), &[Rect2::from_origin_size(-1.0, 1.0, 6.0, 1.0)])
                .unwrap();
        assert_eq!(shapes.len(), 2);
        let total: f64 = shapes.iter().map(Profile2D::area).sum();
        assert_relative_eq!(total, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disjoint_penetration_leaves_plate_untouched() {
        let shapes =
            subtract_rectangles_2d(&plate(), &[Rect2::from_origin_size(10.0, 10.0, 1.0, 1.0)])
                .unwrap();
        assert_eq!(shapes, vec![plate()]);
    }

    #[test]
    fn test_covering_penetration_removes_plate() {
        let shapes =
            subtract_rectangles_2d(&plate(), &[Rect2::from_origin_size(-1.0, -1.0, 6.0, 6.0)])
                .unwrap();
        assert!(shapes.is_empty());
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect2::from_origin_size(0.0, 0.0, 4.0, 4.0);
        let b = Rect2::from_origin_size(3.0, 1.0, 4.0, 1.0);
        let i = a.intersection(&b).unwrap();
        assert_relative_eq!(i.area(), 1.0);
        assert!(a.intersection(&Rect2::from_origin_size(4.0, 0.0, 1.0, 1.0)).is_none());
    }
}
