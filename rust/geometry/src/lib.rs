// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan Geometry Processing
//!
//! Mesh construction for floorplan scenes: box primitives for slabs, 2D
//! profiles extruded into floor plates, i_overlay footprint clipping for
//! stair and lift penetrations, csgrs boolean subtraction for door and window
//! openings, and the ray math used for picking.

pub mod bool2d;
pub mod bounds;
pub mod csg;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod primitives;
pub mod profile;
pub mod ray;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use bool2d::{subtract_rectangles_2d, Rect2};
pub use bounds::Aabb;
pub use csg::ClippingProcessor;
pub use error::{Error, Result};
pub use extrusion::{apply_transform, extrude_profile, extrude_profile_y_up};
pub use mesh::Mesh;
pub use primitives::{aabb_to_mesh, box_mesh};
pub use profile::Profile2D;
pub use ray::{Ray, RayHit};
pub use triangulation::triangulate_polygon;
