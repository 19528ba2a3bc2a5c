// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-build validation of a scene description
//!
//! Validation collects every problem in one pass so the caller can report them
//! together. Degenerate dimensions are rejected here, before any geometry is
//! built, so the mesh pipeline never sees NaN or inverted boxes. Dangling
//! connection references are *not* validation errors; the builder skips them
//! with a warning.

use crate::description::{Connection, Floor, SceneDescription};
use crate::error::{Error, Result};
use crate::source::SourceRange;
use crate::style::Color;
use crate::units::MAX_STAIR_STEPS;
use rustc_hash::FxHashSet;
use std::fmt;

/// One validation problem
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Entity the issue refers to, e.g. `room "Kitchen"`
    pub entity: String,
    pub floor: Option<String>,
    pub message: String,
    pub source_range: Option<SourceRange>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.floor {
            Some(floor) => write!(f, "{} on floor \"{}\": {}", self.entity, floor, self.message),
            None => write!(f, "{}: {}", self.entity, self.message),
        }
    }
}

#[derive(Default)]
struct Collector {
    issues: Vec<ValidationIssue>,
}

impl Collector {
    fn push(
        &mut self,
        entity: String,
        floor: Option<&str>,
        message: impl Into<String>,
        source_range: Option<SourceRange>,
    ) {
        self.issues.push(ValidationIssue {
            entity,
            floor: floor.map(str::to_string),
            message: message.into(),
            source_range,
        });
    }

    fn positive(
        &mut self,
        value: f64,
        what: &str,
        entity: &str,
        floor: Option<&str>,
        range: Option<SourceRange>,
    ) {
        if !value.is_finite() || value <= 0.0 {
            self.push(
                entity.to_string(),
                floor,
                format!("{} must be a positive number (got {})", what, value),
                range,
            );
        }
    }

    fn finite(
        &mut self,
        value: f64,
        what: &str,
        entity: &str,
        floor: Option<&str>,
        range: Option<SourceRange>,
    ) {
        if !value.is_finite() {
            self.push(
                entity.to_string(),
                floor,
                format!("{} must be finite", what),
                range,
            );
        }
    }

    fn percent(
        &mut self,
        value: Option<f64>,
        entity: &str,
        floor: Option<&str>,
        range: Option<SourceRange>,
    ) {
        if let Some(p) = value {
            if !p.is_finite() || !(0.0..=100.0).contains(&p) {
                self.push(
                    entity.to_string(),
                    floor,
                    format!("position must be a percentage between 0 and 100 (got {})", p),
                    range,
                );
            }
        }
    }
}

impl SceneDescription {
    /// Validate the description, reporting every issue at once
    pub fn validate(&self) -> Result<()> {
        let issues = self.validation_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(issues))
        }
    }

    /// All validation issues, empty when the description is buildable
    pub fn validation_issues(&self) -> Vec<ValidationIssue> {
        let mut c = Collector::default();

        validate_config(self, &mut c);

        let mut floor_ids = FxHashSet::default();
        for floor in &self.floors {
            if !floor_ids.insert(floor.id.as_str()) {
                c.push(
                    format!("floor \"{}\"", floor.id),
                    None,
                    "duplicate floor id",
                    floor.source_range,
                );
            }
            validate_floor(floor, &mut c);
        }

        for connection in &self.connections {
            validate_connection(connection, &mut c);
        }

        for style in &self.styles {
            let colors = [
                ("floorColor", &style.floor_color),
                ("wallColor", &style.wall_color),
                ("exteriorColor", &style.exterior_color),
            ];
            for (field, value) in colors {
                if let Some(hex) = value {
                    if Color::from_hex(hex).is_none() {
                        c.push(
                            format!("style \"{}\"", style.name),
                            None,
                            format!("{} \"{}\" is not a #rrggbb colour", field, hex),
                            None,
                        );
                    }
                }
            }
        }

        c.issues
    }
}

fn validate_config(scene: &SceneDescription, c: &mut Collector) {
    let config = &scene.config;
    let fields = [
        ("defaultHeight", config.default_height),
        ("wallThickness", config.wall_thickness),
        ("floorThickness", config.floor_thickness),
    ];
    for (what, value) in fields {
        if let Some(v) = value {
            c.positive(v, what, "config", None, None);
        }
    }
    if let Some(sep) = config.max_exploded_separation {
        if !sep.is_finite() || sep < 0.0 {
            c.push(
                "config".to_string(),
                None,
                "maxExplodedSeparation must be zero or positive",
                None,
            );
        }
    }
}

fn validate_floor(floor: &Floor, c: &mut Collector) {
    let fid = Some(floor.id.as_str());
    if let Some(h) = floor.height {
        c.positive(h, "height", &format!("floor \"{}\"", floor.id), None, floor.source_range);
    }

    let mut names = FxHashSet::default();
    for room in &floor.rooms {
        let entity = format!("room \"{}\"", room.name);
        let range = room.source_range;
        if !names.insert(room.name.as_str()) {
            c.push(entity.clone(), fid, "duplicate room name on this floor", range);
        }
        c.finite(room.x, "x", &entity, fid, range);
        c.finite(room.z, "z", &entity, fid, range);
        c.finite(room.elevation, "elevation", &entity, fid, range);
        c.positive(room.width, "width", &entity, fid, range);
        c.positive(room.depth, "depth", &entity, fid, range);
        if let Some(h) = room.height {
            c.positive(h, "height", &entity, fid, range);
        }

        let mut sides = FxHashSet::default();
        for wall in &room.walls {
            let wall_entity = format!("wall \"{}_{}\"", room.name, wall.direction);
            let wall_range = wall.source_range.or(range);
            if !sides.insert(wall.direction) {
                c.push(wall_entity.clone(), fid, "wall side declared more than once", wall_range);
            }
            c.percent(wall.position, &wall_entity, fid, wall_range);
        }
    }

    for stair in &floor.stairs {
        let entity = format!("stair \"{}\"", stair.id);
        let range = stair.source_range;
        c.finite(stair.x, "x", &entity, fid, range);
        c.finite(stair.z, "z", &entity, fid, range);
        c.positive(stair.width, "width", &entity, fid, range);
        c.positive(stair.depth, "depth", &entity, fid, range);
        if let Some(h) = stair.height {
            c.positive(h, "height", &entity, fid, range);
        }
        match stair.steps {
            Some(0) => c.push(entity, fid, "steps must be at least 1", range),
            Some(n) if n > MAX_STAIR_STEPS => c.push(
                entity,
                fid,
                format!("steps must be at most {MAX_STAIR_STEPS}, got {n}"),
                range,
            ),
            _ => {}
        }
    }

    for lift in &floor.lifts {
        let entity = format!("lift \"{}\"", lift.id);
        let range = lift.source_range;
        c.finite(lift.x, "x", &entity, fid, range);
        c.finite(lift.z, "z", &entity, fid, range);
        c.positive(lift.width, "width", &entity, fid, range);
        c.positive(lift.depth, "depth", &entity, fid, range);
        if let Some(h) = lift.height {
            c.positive(h, "height", &entity, fid, range);
        }
    }
}

fn validate_connection(connection: &Connection, c: &mut Collector) {
    let entity = format!("connection \"{}\"", connection.id());
    let floor = connection.floor.as_deref();
    let range = connection.source_range;
    c.percent(connection.position, &entity, floor, range);
    if let Some(w) = connection.width {
        c.positive(w, "width", &entity, floor, range);
    }
    if let Some(h) = connection.height {
        c.positive(h, "height", &entity, floor, range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{Room, Stair, Wall, WallDirection, WallRef, WallType};

    fn room(name: &str, x: f64, width: f64) -> Room {
        Room {
            name: name.into(),
            x,
            z: 0.0,
            width,
            depth: 4.0,
            ..Default::default()
        }
    }

    fn scene(rooms: Vec<Room>) -> SceneDescription {
        SceneDescription {
            floors: vec![Floor {
                id: "ground".into(),
                rooms,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_scene_passes() {
        assert!(scene(vec![room("A", 0.0, 4.0), room("B", 4.0, 4.0)])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_degenerate_dimensions_rejected() {
        let mut bad = room("A", 0.0, 0.0);
        bad.depth = f64::NAN;
        let err = scene(vec![bad]).validate().unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert!(err.issues()[0].message.contains("width"));
        assert_eq!(err.issues()[0].floor.as_deref(), Some("ground"));
    }

    #[test]
    fn test_duplicate_names_and_sides() {
        let mut a = room("A", 0.0, 4.0);
        a.walls = vec![
            Wall::new(WallDirection::Left, WallType::Solid),
            Wall::new(WallDirection::Left, WallType::Door),
        ];
        let issues = scene(vec![a, room("A", 4.0, 4.0)]).validation_issues();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.message.contains("duplicate room")));
        assert!(issues.iter().any(|i| i.message.contains("more than once")));
    }

    #[test]
    fn test_stair_step_bounds() {
        let mut s = scene(vec![room("A", 0.0, 4.0)]);
        let stair = |id: &str, steps| Stair {
            id: id.into(),
            x: 0.0,
            z: 0.0,
            width: 1.0,
            depth: 3.0,
            direction: WallDirection::Top,
            steps,
            height: None,
            source_range: None,
        };
        s.floors[0].stairs = vec![
            stair("ok", Some(MAX_STAIR_STEPS)),
            stair("none", Some(0)),
            stair("huge", Some(4_000_000_000)),
        ];
        let issues = s.validation_issues();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("at least 1"));
        assert!(issues[1].entity.contains("huge"));
        assert!(issues[1].message.contains("at most 500"));
    }

    #[test]
    fn test_bad_connection_values() {
        let mut s = scene(vec![room("A", 0.0, 4.0)]);
        s.connections.push(Connection {
            floor: None,
            from: WallRef::new("A", WallDirection::Right),
            to: None,
            opening_type: Default::default(),
            position: Some(140.0),
            width: Some(-1.0),
            height: None,
            swing: Default::default(),
            source_range: None,
        });
        let issues = s.validation_issues();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_dangling_reference_is_not_a_validation_error() {
        let mut s = scene(vec![room("A", 0.0, 4.0)]);
        s.connections.push(Connection {
            floor: None,
            from: WallRef::new("Ghost", WallDirection::Right),
            to: Some(WallRef::new("A", WallDirection::Left)),
            opening_type: Default::default(),
            position: None,
            width: None,
            height: None,
            swing: Default::default(),
            source_range: None,
        });
        assert!(s.validate().is_ok());
    }
}
