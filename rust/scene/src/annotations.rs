// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room dimension labels

use crate::registry::EntityId;
use floorplan_geometry::Point3;
use floorplan_model::{resolve_height, Config, Floor, Room};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    Width,
    Depth,
    Height,
}

/// A measured room dimension with a label anchor in floor-local space
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAnnotation {
    pub entity: EntityId,
    pub kind: DimensionKind,
    pub value: f64,
    pub label: String,
    pub anchor: Point3<f64>,
}

/// Width along the top edge, depth along the left edge, height at the top-left corner
pub fn room_annotations(floor: &Floor, room: &Room, config: &Config) -> [DimensionAnnotation; 3] {
    let entity = EntityId::room(&floor.id, &room.name);
    let height = resolve_height(room.height, floor.height, config);
    let y = room.elevation;
    let make = |kind, value: f64, anchor| DimensionAnnotation {
        entity: entity.clone(),
        kind,
        value,
        label: config.unit.format(value),
        anchor,
    };
    [
        make(
            DimensionKind::Width,
            room.width,
            Point3::new(room.x + room.width * 0.5, y, room.z),
        ),
        make(
            DimensionKind::Depth,
            room.depth,
            Point3::new(room.x, y, room.z + room.depth * 0.5),
        ),
        make(
            DimensionKind::Height,
            height,
            Point3::new(room.x, y + height * 0.5, room.z),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_model::LengthUnit;

    #[test]
    fn test_labels_use_scene_unit_and_resolved_height() {
        let floor = Floor {
            id: "ground".into(),
            height: Some(2.7),
            ..Default::default()
        };
        let room = Room {
            name: "A".into(),
            width: 4.0,
            depth: 3.5,
            ..Default::default()
        };
        let config = Config {
            unit: LengthUnit::Meters,
            ..Default::default()
        };
        let [w, d, h] = room_annotations(&floor, &room, &config);
        assert_eq!(w.label, "4.00 m");
        assert_eq!(d.label, "3.50 m");
        assert_eq!(h.kind, DimensionKind::Height);
        assert_eq!(h.label, "2.70 m");
    }
}
