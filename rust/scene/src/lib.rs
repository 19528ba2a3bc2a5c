// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan Scene Builder
//!
//! Converts a scene description into a renderable scene graph with exactly one
//! slab per shared wall, door and window openings cut with CSG, stair and lift
//! shafts removed from the floor above, and floors stacked with an adjustable
//! exploded-view separation. Every drawable node is recorded in a
//! [`MeshRegistry`] that maps it back to its logical entity and source range.
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_model::SceneDescription;
//! use floorplan_scene::FloorplanScene;
//!
//! let description = SceneDescription::from_json(json)?;
//! let (mut scene, report) = FloorplanScene::from_description(&description)?;
//! scene.set_exploded_view(0.5);
//! ```

pub mod annotations;
pub mod builder;
pub mod error;
pub mod floor;
pub mod graph;
pub mod keys;
pub mod material;
pub mod obj;
pub mod openings;
pub mod ownership;
pub mod registry;
pub mod vertical;
pub mod walls;

pub use annotations::{DimensionAnnotation, DimensionKind};
pub use builder::{BuildReport, FloorLayout, FloorplanScene};
pub use error::{BuildWarning, Error, Result, WarningKind};
pub use floor::FloorOutput;
pub use graph::{NodeHighlight, Primitive, SceneGraph, SceneNode};
pub use keys::{EntityKey, MaterialKey, NodeKey};
pub use material::{HighlightStyle, Material, MaterialLibrary, SurfaceRole};
pub use obj::{write_obj, ObjStats};
pub use openings::{Opening, OpeningSource};
pub use ownership::{resolve_ownership, Neighbor, Span, WallOwnership};
pub use registry::{EntityId, EntityKind, EntityPayload, MeshRegistry, RegisteredEntity};
pub use vertical::Penetration;
pub use walls::{generate_wall, WallFace, WallGeometry, WallPiece, WallSettings};
