// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene description types
//!
//! A room occupies `[x, x + width] × [z, z + depth]` in floor-local XZ
//! coordinates with Y pointing up. Its `top` wall lies at `z`, `bottom` at
//! `z + depth`, `left` at `x` and `right` at `x + width`.

use crate::config::Config;
use crate::error::Result;
use crate::source::SourceRange;
use crate::style::StyleDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete scene description, immutable per load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDescription {
    pub floors: Vec<Floor>,
    pub connections: Vec<Connection>,
    pub styles: Vec<StyleDefinition>,
    pub config: Config,
}

impl SceneDescription {
    /// Deserialize a scene description produced by the external parser
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn floor(&self, id: &str) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    /// Floor a connection belongs to: its explicit floor, or the first floor
    /// declaring the `from` room
    pub fn connection_floor(&self, connection: &Connection) -> Option<&Floor> {
        match connection.floor.as_deref() {
            Some(id) => self.floor(id),
            None => self
                .floors
                .iter()
                .find(|f| f.room(&connection.from.room).is_some()),
        }
    }
}

/// One storey of the building
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub stairs: Vec<Stair>,
    #[serde(default)]
    pub lifts: Vec<Lift>,
    #[serde(default)]
    pub source_range: Option<SourceRange>,
}

impl Floor {
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name == name)
    }
}

/// Axis-aligned room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub name: String,
    pub x: f64,
    pub z: f64,
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub source_range: Option<SourceRange>,
}

impl Room {
    pub fn wall(&self, direction: WallDirection) -> Option<&Wall> {
        self.walls.iter().find(|w| w.direction == direction)
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn min_z(&self) -> f64 {
        self.z
    }

    #[inline]
    pub fn max_z(&self) -> f64 {
        self.z + self.depth
    }

    /// Coordinate of the boundary line a wall side lies on (X for left/right, Z for top/bottom)
    pub fn boundary(&self, direction: WallDirection) -> f64 {
        match direction {
            WallDirection::Top => self.min_z(),
            WallDirection::Bottom => self.max_z(),
            WallDirection::Left => self.min_x(),
            WallDirection::Right => self.max_x(),
        }
    }

    /// Extent of a wall side along its own axis, as `(start, end)`
    pub fn side_extent(&self, direction: WallDirection) -> (f64, f64) {
        if direction.is_vertical() {
            (self.min_z(), self.max_z())
        } else {
            (self.min_x(), self.max_x())
        }
    }
}

/// Side of a room a wall belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallDirection {
    Top,
    Right,
    Bottom,
    Left,
}

impl WallDirection {
    pub const ALL: [WallDirection; 4] = [
        WallDirection::Top,
        WallDirection::Right,
        WallDirection::Bottom,
        WallDirection::Left,
    ];

    /// Left/right walls run along Z (constant X)
    #[inline]
    pub fn is_vertical(&self) -> bool {
        matches!(self, WallDirection::Left | WallDirection::Right)
    }

    pub fn opposite(&self) -> WallDirection {
        match self {
            WallDirection::Top => WallDirection::Bottom,
            WallDirection::Bottom => WallDirection::Top,
            WallDirection::Left => WallDirection::Right,
            WallDirection::Right => WallDirection::Left,
        }
    }

    /// Outward normal in floor-local XZ
    pub fn outward(&self) -> (f64, f64) {
        match self {
            WallDirection::Top => (0.0, -1.0),
            WallDirection::Bottom => (0.0, 1.0),
            WallDirection::Left => (-1.0, 0.0),
            WallDirection::Right => (1.0, 0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WallDirection::Top => "top",
            WallDirection::Right => "right",
            WallDirection::Bottom => "bottom",
            WallDirection::Left => "left",
        }
    }
}

impl fmt::Display for WallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall construction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallType {
    #[default]
    Solid,
    Door,
    Window,
    Open,
}

/// Wall declared on one side of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub direction: WallDirection,
    #[serde(rename = "type", default)]
    pub wall_type: WallType,
    /// Position of a door/window along the wall, percent 0–100
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub source_range: Option<SourceRange>,
}

impl Wall {
    pub fn new(direction: WallDirection, wall_type: WallType) -> Self {
        Self {
            direction,
            wall_type,
            position: None,
            source_range: None,
        }
    }
}

/// Reference to one side of a named room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallRef {
    pub room: String,
    pub wall: WallDirection,
}

impl WallRef {
    pub fn new(room: impl Into<String>, wall: WallDirection) -> Self {
        Self {
            room: room.into(),
            wall,
        }
    }
}

impl fmt::Display for WallRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.room, self.wall)
    }
}

/// Opening kind of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpeningType {
    #[default]
    Door,
    DoubleDoor,
    Window,
    Opening,
}

/// Door swing side, which decides the hinge end of the opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Swing {
    Left,
    Right,
    #[default]
    None,
}

/// Door, window or opening between two rooms or to the exterior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub floor: Option<String>,
    pub from: WallRef,
    /// Absent for openings to the exterior
    #[serde(default)]
    pub to: Option<WallRef>,
    #[serde(rename = "type", default)]
    pub opening_type: OpeningType,
    /// Percent along the `from` wall, 0–100
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub swing: Swing,
    #[serde(default)]
    pub source_range: Option<SourceRange>,
}

impl Connection {
    /// Connection with default size, position and swing
    pub fn new(from: WallRef, to: Option<WallRef>, opening_type: OpeningType) -> Self {
        Self {
            floor: None,
            from,
            to,
            opening_type,
            position: None,
            width: None,
            height: None,
            swing: Swing::None,
            source_range: None,
        }
    }

    /// Stable identifier derived from the endpoints
    pub fn id(&self) -> String {
        match &self.to {
            Some(to) => format!("{}_{}-{}_{}", self.from.room, self.from.wall, to.room, to.wall),
            None => format!("{}_{}-exterior", self.from.room, self.from.wall),
        }
    }

    /// Whether the connection has an endpoint on the given room side
    pub fn touches(&self, room: &str, wall: WallDirection) -> bool {
        (self.from.room == room && self.from.wall == wall)
            || self
                .to
                .as_ref()
                .map(|t| t.room == room && t.wall == wall)
                .unwrap_or(false)
    }
}

/// Straight stair run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stair {
    pub id: String,
    pub x: f64,
    pub z: f64,
    pub width: f64,
    pub depth: f64,
    /// Direction the stair climbs towards
    #[serde(default = "default_climb")]
    pub direction: WallDirection,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub source_range: Option<SourceRange>,
}

fn default_climb() -> WallDirection {
    WallDirection::Top
}

/// Lift shaft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lift {
    pub id: String,
    pub x: f64,
    pub z: f64,
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub source_range: Option<SourceRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "floors": [{
            "id": "ground",
            "rooms": [
                {"name": "A", "x": 0, "z": 0, "width": 4, "depth": 4,
                 "walls": [{"direction": "right", "type": "solid"}],
                 "sourceRange": {"startLine": 1, "startColumn": 0, "endLine": 3, "endColumn": 1}},
                {"name": "B", "x": 4, "z": 0, "width": 4, "depth": 4, "style": "wood",
                 "walls": [{"direction": "left"}]}
            ],
            "stairs": [{"id": "s1", "x": 1, "z": 1, "width": 1, "depth": 3}]
        }],
        "connections": [
            {"from": {"room": "A", "wall": "right"}, "to": {"room": "B", "wall": "left"},
             "type": "door", "position": 50, "width": 1, "swing": "left"}
        ],
        "config": {"theme": "blueprint"}
    }"#;

    #[test]
    fn test_parse_sample() {
        let scene = SceneDescription::from_json(SAMPLE).unwrap();
        assert_eq!(scene.floors.len(), 1);
        let floor = &scene.floors[0];
        assert_eq!(floor.rooms.len(), 2);
        let a = floor.room("A").unwrap();
        assert_eq!(a.wall(WallDirection::Right).unwrap().wall_type, WallType::Solid);
        assert!(a.source_range.is_some());
        let b = floor.room("B").unwrap();
        assert_eq!(b.wall(WallDirection::Left).unwrap().wall_type, WallType::Solid);
        assert_eq!(floor.stairs[0].direction, WallDirection::Top);
        assert_eq!(scene.connections[0].swing, Swing::Left);
    }

    #[test]
    fn test_connection_floor_resolution() {
        let scene = SceneDescription::from_json(SAMPLE).unwrap();
        let floor = scene.connection_floor(&scene.connections[0]).unwrap();
        assert_eq!(floor.id, "ground");
        assert_eq!(scene.connections[0].id(), "A_right-B_left");
    }

    #[test]
    fn test_boundaries() {
        let room = Room {
            name: "A".into(),
            x: 1.0,
            z: 2.0,
            width: 4.0,
            depth: 3.0,
            ..Default::default()
        };
        assert_eq!(room.boundary(WallDirection::Right), 5.0);
        assert_eq!(room.boundary(WallDirection::Bottom), 5.0);
        assert_eq!(room.side_extent(WallDirection::Left), (2.0, 5.0));
        assert_eq!(room.side_extent(WallDirection::Top), (1.0, 5.0));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(SceneDescription::from_json("{\"floors\": 3}").is_err());
    }
}
