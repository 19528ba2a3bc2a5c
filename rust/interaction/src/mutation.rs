// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property edits turned into text patches
//!
//! The write path reads the selection and the registry, and nothing else.
//! It produces a [`TextPatch`] that replaces exactly the edited entity's own
//! source range; the host applies it to the text and re-parses, which in turn
//! rebuilds the scene. Neither the registry nor the selection is touched here.

use crate::error::MutationError;
use floorplan_model::{OpeningType, SourceRange, Swing, WallDirection, WallType};
use floorplan_scene::{EntityId, EntityKind, EntityPayload, MeshRegistry};
use serde_json::Value;

/// One property change on a single entity
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    /// Room, stair or lift identifier
    Rename(String),
    /// Plan origin of a room, stair or lift
    Position { x: f64, z: f64 },
    /// Plan size of a room, stair or lift
    Size { width: f64, depth: f64 },
    /// Explicit height; `None` falls back to the floor/config height
    Height(Option<f64>),
    Elevation(f64),
    Style(Option<String>),
    WallType(WallType),
    /// Door/window position along a wall or connection, percent
    OpeningPosition(f64),
    OpeningType(OpeningType),
    OpeningWidth(Option<f64>),
    OpeningHeight(Option<f64>),
    Swing(Swing),
    Steps(Option<u32>),
    StairDirection(WallDirection),
}

/// Replacement text for one entity declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TextPatch {
    pub entity: EntityId,
    pub range: SourceRange,
    pub replacement: String,
}

/// Renders an entity payload back into declaration text
pub trait DeclarationFormatter {
    /// `None` when the payload cannot be expressed in the source language
    fn format(&self, payload: &EntityPayload) -> Option<String>;
}

/// Formats declarations as JSON objects without source ranges or nulls
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeclarationFormatter {
    pub pretty: bool,
}

impl DeclarationFormatter for JsonDeclarationFormatter {
    fn format(&self, payload: &EntityPayload) -> Option<String> {
        let value = match payload {
            EntityPayload::Room(room) => serde_json::to_value(room),
            EntityPayload::Wall { wall, .. } => serde_json::to_value(wall),
            EntityPayload::Connection(connection) => serde_json::to_value(connection),
            EntityPayload::Stair(stair) => serde_json::to_value(stair),
            EntityPayload::Lift(lift) => serde_json::to_value(lift),
        }
        .ok()?;
        let value = strip_annotations(value);
        if self.pretty {
            serde_json::to_string_pretty(&value).ok()
        } else {
            serde_json::to_string(&value).ok()
        }
    }
}

fn strip_annotations(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, v)| key != "sourceRange" && !v.is_null())
                .map(|(key, v)| (key, strip_annotations(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_annotations).collect()),
        other => other,
    }
}

/// Turn an edit of the single selected entity into a text patch
pub fn apply_property_edit(
    registry: &MeshRegistry,
    selection: &[EntityId],
    edit: &PropertyEdit,
    formatter: &dyn DeclarationFormatter,
) -> Result<TextPatch, MutationError> {
    let id = match selection {
        [] => return Err(MutationError::NoSelection),
        [id] => id,
        many => return Err(MutationError::MultipleSelection(many.len())),
    };
    let entity = registry
        .find(id)
        .ok_or_else(|| MutationError::MissingEntity(id.clone()))?;
    let range = match entity.own_range() {
        Some(range) => range,
        None if entity.range_inherited => return Err(MutationError::InheritedRange(id.clone())),
        None => return Err(MutationError::NoSourceRange(id.clone())),
    };

    let mut payload = entity.payload.clone();
    edit_payload(&mut payload, edit)?;
    let replacement = formatter
        .format(&payload)
        .ok_or_else(|| MutationError::FormatterRefused(id.clone()))?;

    tracing::debug!(entity = %id, range = %range, "property edit");
    Ok(TextPatch {
        entity: id.clone(),
        range,
        replacement,
    })
}

fn invalid(kind: EntityKind, reason: impl Into<String>) -> MutationError {
    MutationError::InvalidEdit {
        kind,
        reason: reason.into(),
    }
}

fn positive(kind: EntityKind, what: &str, value: f64) -> Result<f64, MutationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(kind, format!("{} must be positive, got {}", what, value)))
    }
}

fn finite(kind: EntityKind, what: &str, value: f64) -> Result<f64, MutationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(kind, format!("{} must be finite", what)))
    }
}

fn percent(kind: EntityKind, value: f64) -> Result<f64, MutationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(kind, format!("position {} is outside 0-100", value)))
    }
}

fn name(kind: EntityKind, value: &str) -> Result<String, MutationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(invalid(kind, "name must not be empty"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional_positive(
    kind: EntityKind,
    what: &str,
    value: Option<f64>,
) -> Result<Option<f64>, MutationError> {
    value.map(|v| positive(kind, what, v)).transpose()
}

fn edit_payload(payload: &mut EntityPayload, edit: &PropertyEdit) -> Result<(), MutationError> {
    let kind = payload.kind();
    match (payload, edit) {
        // Rooms
        (EntityPayload::Room(room), PropertyEdit::Rename(n)) => room.name = name(kind, n)?,
        (EntityPayload::Room(room), PropertyEdit::Position { x, z }) => {
            room.x = finite(kind, "x", *x)?;
            room.z = finite(kind, "z", *z)?;
        }
        (EntityPayload::Room(room), PropertyEdit::Size { width, depth }) => {
            room.width = positive(kind, "width", *width)?;
            room.depth = positive(kind, "depth", *depth)?;
        }
        (EntityPayload::Room(room), PropertyEdit::Height(h)) => {
            room.height = optional_positive(kind, "height", *h)?;
        }
        (EntityPayload::Room(room), PropertyEdit::Elevation(e)) => {
            room.elevation = finite(kind, "elevation", *e)?;
        }
        (EntityPayload::Room(room), PropertyEdit::Style(style)) => room.style = style.clone(),

        // Walls
        (EntityPayload::Wall { wall, .. }, PropertyEdit::WallType(t)) => wall.wall_type = *t,
        (EntityPayload::Wall { wall, .. }, PropertyEdit::OpeningPosition(p)) => {
            wall.position = Some(percent(kind, *p)?);
        }

        // Connections
        (EntityPayload::Connection(c), PropertyEdit::OpeningType(t)) => c.opening_type = *t,
        (EntityPayload::Connection(c), PropertyEdit::OpeningPosition(p)) => {
            c.position = Some(percent(kind, *p)?);
        }
        (EntityPayload::Connection(c), PropertyEdit::OpeningWidth(w)) => {
            c.width = optional_positive(kind, "width", *w)?;
        }
        (EntityPayload::Connection(c), PropertyEdit::OpeningHeight(h)) => {
            c.height = optional_positive(kind, "height", *h)?;
        }
        (EntityPayload::Connection(c), PropertyEdit::Swing(s)) => c.swing = *s,

        // Stairs
        (EntityPayload::Stair(stair), PropertyEdit::Rename(n)) => stair.id = name(kind, n)?,
        (EntityPayload::Stair(stair), PropertyEdit::Position { x, z }) => {
            stair.x = finite(kind, "x", *x)?;
            stair.z = finite(kind, "z", *z)?;
        }
        (EntityPayload::Stair(stair), PropertyEdit::Size { width, depth }) => {
            stair.width = positive(kind, "width", *width)?;
            stair.depth = positive(kind, "depth", *depth)?;
        }
        (EntityPayload::Stair(stair), PropertyEdit::Height(h)) => {
            stair.height = optional_positive(kind, "height", *h)?;
        }
        (EntityPayload::Stair(stair), PropertyEdit::Steps(steps)) => {
            if *steps == Some(0) {
                return Err(invalid(kind, "a stair needs at least one step"));
            }
            stair.steps = *steps;
        }
        (EntityPayload::Stair(stair), PropertyEdit::StairDirection(d)) => stair.direction = *d,

        // Lifts
        (EntityPayload::Lift(lift), PropertyEdit::Rename(n)) => lift.id = name(kind, n)?,
        (EntityPayload::Lift(lift), PropertyEdit::Position { x, z }) => {
            lift.x = finite(kind, "x", *x)?;
            lift.z = finite(kind, "z", *z)?;
        }
        (EntityPayload::Lift(lift), PropertyEdit::Size { width, depth }) => {
            lift.width = positive(kind, "width", *width)?;
            lift.depth = positive(kind, "depth", *depth)?;
        }
        (EntityPayload::Lift(lift), PropertyEdit::Height(h)) => {
            lift.height = optional_positive(kind, "height", *h)?;
        }

        (_, edit) => {
            return Err(invalid(kind, format!("{:?} is not a {} property", edit, kind)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_model::SceneDescription;
    use floorplan_scene::FloorplanScene;

    fn scene() -> FloorplanScene {
        let json = r#"{"floors": [{"id": "g", "rooms": [
            {"name": "A", "x": 0, "z": 0, "width": 4, "depth": 4,
             "walls": [{"direction": "top"},
                       {"direction": "left", "type": "window",
                        "sourceRange": {"startLine": 3, "startColumn": 6, "endLine": 3, "endColumn": 40}}],
             "sourceRange": {"startLine": 1, "startColumn": 2, "endLine": 5, "endColumn": 3}},
            {"name": "B", "x": 5, "z": 0, "width": 4, "depth": 4}
        ]}]}"#;
        let description = SceneDescription::from_json(json).unwrap();
        FloorplanScene::from_description(&description).unwrap().0
    }

    fn formatter() -> JsonDeclarationFormatter {
        JsonDeclarationFormatter::default()
    }

    #[test]
    fn test_patch_replaces_own_range() {
        let scene = scene();
        let selection = [EntityId::room("g", "A")];
        let patch = apply_property_edit(
            scene.registry(),
            &selection,
            &PropertyEdit::Size {
                width: 5.0,
                depth: 3.5,
            },
            &formatter(),
        )
        .unwrap();

        assert_eq!(patch.range, SourceRange::new(1, 2, 5, 3));
        let value: Value = serde_json::from_str(&patch.replacement).unwrap();
        assert_eq!(value["width"], 5.0);
        assert_eq!(value["depth"], 3.5);
        assert!(value.get("sourceRange").is_none());
        assert!(value["walls"][1].get("sourceRange").is_none());

        // The registry still describes the old room
        match &scene.registry().find(&selection[0]).unwrap().payload {
            EntityPayload::Room(room) => assert_eq!(room.width, 4.0),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_wall_with_own_range() {
        let scene = scene();
        let selection = [EntityId::wall("g", "A", WallDirection::Left)];
        let patch = apply_property_edit(
            scene.registry(),
            &selection,
            &PropertyEdit::WallType(WallType::Door),
            &formatter(),
        )
        .unwrap();
        assert_eq!(patch.range.start_line, 3);
        assert!(patch.replacement.contains("\"door\""));
    }

    #[test]
    fn test_selection_errors() {
        let scene = scene();
        let edit = PropertyEdit::Height(Some(2.5));
        let registry = scene.registry();

        assert_eq!(
            apply_property_edit(registry, &[], &edit, &formatter()),
            Err(MutationError::NoSelection)
        );
        let two = [EntityId::room("g", "A"), EntityId::room("g", "B")];
        assert_eq!(
            apply_property_edit(registry, &two, &edit, &formatter()),
            Err(MutationError::MultipleSelection(2))
        );
        let top = [EntityId::wall("g", "A", WallDirection::Top)];
        assert_eq!(
            apply_property_edit(registry, &top, &edit, &formatter()),
            Err(MutationError::InheritedRange(top[0].clone()))
        );
        let b = [EntityId::room("g", "B")];
        assert_eq!(
            apply_property_edit(registry, &b, &edit, &formatter()),
            Err(MutationError::NoSourceRange(b[0].clone()))
        );
        let gone = [EntityId::room("g", "Z")];
        assert!(matches!(
            apply_property_edit(registry, &gone, &edit, &formatter()),
            Err(MutationError::MissingEntity(_))
        ));
    }

    #[test]
    fn test_invalid_edits() {
        let scene = scene();
        let a = [EntityId::room("g", "A")];
        let registry = scene.registry();
        let err = apply_property_edit(
            registry,
            &a,
            &PropertyEdit::Size {
                width: -1.0,
                depth: 2.0,
            },
            &formatter(),
        )
        .unwrap_err();
        assert!(matches!(err, MutationError::InvalidEdit { kind: EntityKind::Room, .. }));

        let err = apply_property_edit(registry, &a, &PropertyEdit::Swing(Swing::Left), &formatter())
            .unwrap_err();
        assert!(matches!(err, MutationError::InvalidEdit { .. }));
    }

    #[test]
    fn test_formatter_refusal() {
        struct Refuses;
        impl DeclarationFormatter for Refuses {
            fn format(&self, _payload: &EntityPayload) -> Option<String> {
                None
            }
        }
        let scene = scene();
        let a = [EntityId::room("g", "A")];
        assert_eq!(
            apply_property_edit(scene.registry(), &a, &PropertyEdit::Elevation(0.5), &Refuses),
            Err(MutationError::FormatterRefused(a[0].clone()))
        );
    }
}
