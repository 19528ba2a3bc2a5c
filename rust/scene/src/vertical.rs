// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stairs, lifts and the shafts they punch through the floor above

use crate::registry::EntityId;
use floorplan_geometry::{box_mesh, Mesh, Point2, Point3, Rect2};
use floorplan_model::units::{DEFAULT_STEP_RISE_M, MAX_STAIR_STEPS};
use floorplan_model::{Config, Lift, Stair, WallDirection};

/// Footprint removed from the floor plates of the next floor up
#[derive(Debug, Clone, PartialEq)]
pub struct Penetration {
    /// Plan-view footprint (`x`, `z`)
    pub footprint: Rect2,
    /// Height of the shaft on the floor that emits it
    pub height: f64,
    pub source: EntityId,
}

fn footprint(x: f64, z: f64, width: f64, depth: f64) -> Rect2 {
    Rect2::new(Point2::new(x, z), Point2::new(x + width, z + depth))
}

/// Number of steps for a stair climbing `height`, at most `MAX_STAIR_STEPS`
pub fn step_count(stair: &Stair, height: f64, config: &Config) -> u32 {
    match stair.steps {
        Some(n) if n > 0 => n.min(MAX_STAIR_STEPS),
        _ => {
            let rise = config.metric(DEFAULT_STEP_RISE_M);
            let n = (height / rise).ceil();
            if n.is_finite() {
                n.clamp(1.0, MAX_STAIR_STEPS as f64) as u32
            } else {
                1
            }
        }
    }
}

/// Stacked step boxes climbing toward the stair's direction
///
/// Step `i` occupies the `i`-th slice of the run and rises to `(i + 1) / n` of
/// the full height, so the top step is flush with the next floor.
pub fn stair_mesh(stair: &Stair, height: f64, config: &Config) -> Mesh {
    let n = step_count(stair, height, config);
    let rise = height / n as f64;
    let (x0, z0) = (stair.x, stair.z);
    let (x1, z1) = (stair.x + stair.width, stair.z + stair.depth);

    let mut mesh = Mesh::with_capacity(24 * n as usize, 36 * n as usize);
    for i in 0..n {
        let (a, b) = (i as f64 / n as f64, (i + 1) as f64 / n as f64);
        let top = rise * (i + 1) as f64;
        let (min, max) = match stair.direction {
            // Climbing toward -Z starts at the bottom edge
            WallDirection::Top => (
                Point3::new(x0, 0.0, z1 - (z1 - z0) * b),
                Point3::new(x1, top, z1 - (z1 - z0) * a),
            ),
            WallDirection::Bottom => (
                Point3::new(x0, 0.0, z0 + (z1 - z0) * a),
                Point3::new(x1, top, z0 + (z1 - z0) * b),
            ),
            WallDirection::Left => (
                Point3::new(x1 - (x1 - x0) * b, 0.0, z0),
                Point3::new(x1 - (x1 - x0) * a, top, z1),
            ),
            WallDirection::Right => (
                Point3::new(x0 + (x1 - x0) * a, 0.0, z0),
                Point3::new(x0 + (x1 - x0) * b, top, z1),
            ),
        };
        mesh.merge(&box_mesh(min, max));
    }
    mesh
}

pub fn stair_penetration(floor: &str, stair: &Stair, height: f64) -> Penetration {
    Penetration {
        footprint: footprint(stair.x, stair.z, stair.width, stair.depth),
        height,
        source: EntityId::stair(floor, stair),
    }
}

/// Shaft box from the floor base to `height`
pub fn lift_mesh(lift: &Lift, height: f64) -> Mesh {
    box_mesh(
        Point3::new(lift.x, 0.0, lift.z),
        Point3::new(lift.x + lift.width, height, lift.z + lift.depth),
    )
}

pub fn lift_penetration(floor: &str, lift: &Lift, height: f64) -> Penetration {
    Penetration {
        footprint: footprint(lift.x, lift.z, lift.width, lift.depth),
        height,
        source: EntityId::lift(floor, lift),
    }
}
