// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use floorplan_model::SourceRange;
use thiserror::Error;

/// Result type for scene building operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors of a scene build or scene query
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] floorplan_model::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] floorplan_geometry::Error),

    #[error("Unknown floor: {0}")]
    UnknownFloor(String),
}

/// Category of a non-fatal build problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A connection or wall references a room or side that does not exist
    MalformedReference,
    /// A style name could not be resolved and a fallback style was used
    UnknownStyle,
    /// A boolean operation failed and uncut geometry was kept
    GeometryFallback,
    /// An opening does not fit on its wall and was clamped or dropped
    DegenerateOpening,
}

/// Non-fatal problem surfaced to the caller; the rest of the scene still builds
#[derive(Debug, Clone, PartialEq)]
pub struct BuildWarning {
    pub kind: WarningKind,
    pub message: String,
    pub floor: Option<String>,
    pub source_range: Option<SourceRange>,
}

impl BuildWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            floor: None,
            source_range: None,
        }
    }

    pub fn on_floor(mut self, floor: &str) -> Self {
        self.floor = Some(floor.to_string());
        self
    }

    pub fn at(mut self, range: Option<SourceRange>) -> Self {
        self.source_range = range;
        self
    }
}
