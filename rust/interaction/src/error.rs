// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use floorplan_scene::{EntityId, EntityKind};
use thiserror::Error;

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] floorplan_model::Error),

    #[error(transparent)]
    Scene(#[from] floorplan_scene::Error),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Why a property edit could not be turned into a text patch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Nothing is selected")]
    NoSelection,

    #[error("Property edits need exactly one selected entity, {0} are selected")]
    MultipleSelection(usize),

    #[error("Selected entity {0} is no longer in the scene")]
    MissingEntity(EntityId),

    #[error("Entity {0} has no source range")]
    NoSourceRange(EntityId),

    #[error("Entity {0} only has its parent's source range")]
    InheritedRange(EntityId),

    #[error("Edit does not apply to a {kind}: {reason}")]
    InvalidEdit { kind: EntityKind, reason: String },

    #[error("Formatter could not render {0}")]
    FormatterRefused(EntityId),
}
