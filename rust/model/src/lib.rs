// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan scene description model
//!
//! The scene description is the immutable input of the rendering core: floors
//! made of rooms, walls, stairs and lifts, plus top-level connections, styles
//! and configuration. It is produced by an external parser and carries optional
//! source ranges that link every entity back to the text it was declared in.
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_model::SceneDescription;
//!
//! let description = SceneDescription::from_json(json)?;
//! description.validate()?;
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod source;
pub mod style;
pub mod units;
pub mod validation;

pub use config::{resolve_height, Config, Theme};
pub use description::{
    Connection, Floor, Lift, OpeningType, Room, SceneDescription, Stair, Swing, Wall,
    WallDirection, WallRef, WallType,
};
pub use error::{Error, Result};
pub use source::{SourceRange, TextPosition};
pub use style::{
    resolve_style, Color, Style, StyleCatalog, StyleDefinition, StyleResolution, StyleResolver,
    StyleSource,
};
pub use units::LengthUnit;
pub use validation::ValidationIssue;
