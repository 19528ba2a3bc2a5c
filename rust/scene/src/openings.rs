// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opening resolution
//!
//! Connections and `door`/`window` wall types are turned into floor-local
//! openings once per floor: a boundary line, a span along it and a vertical
//! range. The wall generator then cuts every opening lying on its line out of
//! whichever wall span is rendered there, so a door declared on a suppressed
//! wall still cuts the owner's slab.

use crate::error::{BuildWarning, WarningKind};
use crate::ownership::{Span, BOUNDARY_EPSILON};
use floorplan_geometry::{box_mesh, Aabb, Mesh, Point3};
use floorplan_model::units::{
    DEFAULT_DOOR_HEIGHT_M, DEFAULT_DOOR_WIDTH_M, DEFAULT_WINDOW_HEIGHT_M, DEFAULT_WINDOW_SILL_M,
    DEFAULT_WINDOW_WIDTH_M,
};
use floorplan_model::{
    Config, Connection, Floor, OpeningType, SceneDescription, SourceRange, Swing, WallRef, WallType,
};

/// Cutters start slightly below the wall base so coplanar faces never survive
const CUTTER_UNDERSHOOT_M: f64 = 0.01;
const DOOR_LEAF_THICKNESS_M: f64 = 0.04;
const GLASS_THICKNESS_M: f64 = 0.02;

/// Where an opening was declared
#[derive(Debug, Clone, PartialEq)]
pub enum OpeningSource {
    /// Index into the description's connection list
    Connection(usize),
    /// A `door` or `window` wall type
    WallType,
}

/// Resolved opening in floor-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Opening {
    pub source: OpeningSource,
    pub kind: OpeningType,
    /// Room side the opening is declared on
    pub host: WallRef,
    /// Boundary coordinate (X for left/right walls, Z for top/bottom walls)
    pub line: f64,
    pub span: Span,
    /// Bottom of the opening
    pub bottom: f64,
    pub height: f64,
    pub swing: Swing,
    pub source_range: Option<SourceRange>,
}

impl Opening {
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.host.wall.is_vertical()
    }

    #[inline]
    pub fn center(&self) -> f64 {
        (self.span.start + self.span.end) * 0.5
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.span.length()
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    /// True when the opening sits on a wall of the given orientation and line
    pub fn lies_on(&self, vertical: bool, line: f64) -> bool {
        self.is_vertical() == vertical && (self.line - line).abs() <= BOUNDARY_EPSILON
    }

    /// Box removed from a wall slab of the given thickness
    pub fn cutter(&self, wall_thickness: f64, undershoot: f64) -> Aabb {
        let (y0, y1) = (self.bottom - undershoot, self.top());
        let (a0, a1) = (self.line - wall_thickness, self.line + wall_thickness);
        if self.is_vertical() {
            Aabb::new(
                Point3::new(a0, y0, self.span.start),
                Point3::new(a1, y1, self.span.end),
            )
        } else {
            Aabb::new(
                Point3::new(self.span.start, y0, a0),
                Point3::new(self.span.end, y1, a1),
            )
        }
    }
}

/// Default width, height and sill for an opening type, in scene units
pub fn default_dimensions(kind: OpeningType, config: &Config) -> (f64, f64, f64) {
    let door = (
        config.metric(DEFAULT_DOOR_WIDTH_M),
        config.metric(DEFAULT_DOOR_HEIGHT_M),
        0.0,
    );
    match kind {
        OpeningType::Door | OpeningType::Opening => door,
        OpeningType::DoubleDoor => (door.0 * 2.0, door.1, 0.0),
        OpeningType::Window => (
            config.metric(DEFAULT_WINDOW_WIDTH_M),
            config.metric(DEFAULT_WINDOW_HEIGHT_M),
            config.metric(DEFAULT_WINDOW_SILL_M),
        ),
    }
}

/// Place an opening of `width` at `percent` along `span`, keeping it inside the span
///
/// Returns the placed span and whether the width had to be clamped.
pub fn place_along(span: Span, percent: f64, width: f64) -> (Span, bool) {
    let available = span.length();
    let clamped = width > available;
    let width = width.min(available);
    let center = span.start + available * (percent.clamp(0.0, 100.0) / 100.0);
    let start = (center - width * 0.5).clamp(span.start, span.end - width);
    (Span::new(start, start + width), clamped)
}

/// Openings of one floor, plus warnings for every reference that could not be resolved
#[derive(Debug, Default)]
pub struct FloorOpenings {
    pub openings: Vec<Opening>,
    pub warnings: Vec<BuildWarning>,
}

/// Resolve every opening on a floor
pub fn resolve_openings(floor: &Floor, description: &SceneDescription) -> FloorOpenings {
    let config = &description.config;
    let mut out = FloorOpenings::default();

    let floor_connections: Vec<(usize, &Connection)> = description
        .connections
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            description
                .connection_floor(c)
                .map(|f| f.id == floor.id)
                .unwrap_or(false)
        })
        .collect();

    for &(index, connection) in &floor_connections {
        match resolve_connection(floor, connection, config) {
            Ok(mut opening) => {
                opening.source = OpeningSource::Connection(index);
                if opening_was_clamped(connection, &opening, config) {
                    out.warnings.push(
                        BuildWarning::new(
                            WarningKind::DegenerateOpening,
                            format!(
                                "connection {} is wider than its wall and was clamped",
                                connection.id()
                            ),
                        )
                        .on_floor(&floor.id)
                        .at(connection.source_range),
                    );
                }
                out.openings.push(opening);
            }
            Err(message) => {
                tracing::warn!(floor = %floor.id, connection = %connection.id(), "{}", message);
                out.warnings.push(
                    BuildWarning::new(WarningKind::MalformedReference, message)
                        .on_floor(&floor.id)
                        .at(connection.source_range),
                );
            }
        }
    }

    for room in &floor.rooms {
        for wall in &room.walls {
            let kind = match wall.wall_type {
                WallType::Door => OpeningType::Door,
                WallType::Window => OpeningType::Window,
                WallType::Solid | WallType::Open => continue,
            };
            // An explicit connection on the same side takes precedence
            if floor_connections
                .iter()
                .any(|(_, c)| c.touches(&room.name, wall.direction))
            {
                continue;
            }
            let (width, height, sill) = default_dimensions(kind, config);
            let (start, end) = room.side_extent(wall.direction);
            let (span, _) = place_along(
                Span::new(start, end),
                wall.position.unwrap_or(50.0),
                width,
            );
            out.openings.push(Opening {
                source: OpeningSource::WallType,
                kind,
                host: WallRef::new(room.name.clone(), wall.direction),
                line: room.boundary(wall.direction),
                span,
                bottom: room.elevation + sill,
                height,
                swing: Swing::None,
                source_range: wall.source_range.or(room.source_range),
            });
        }
    }

    out
}

fn opening_was_clamped(connection: &Connection, opening: &Opening, config: &Config) -> bool {
    let requested = connection
        .width
        .unwrap_or_else(|| default_dimensions(connection.opening_type, config).0);
    requested - opening.width() > BOUNDARY_EPSILON
}

fn resolve_connection(
    floor: &Floor,
    connection: &Connection,
    config: &Config,
) -> Result<Opening, String> {
    let from = floor.room(&connection.from.room).ok_or_else(|| {
        format!(
            "connection {} references unknown room '{}'",
            connection.id(),
            connection.from.room
        )
    })?;
    let direction = connection.from.wall;
    let line = from.boundary(direction);
    let (fs, fe) = from.side_extent(direction);
    let mut span = Span::new(fs, fe);
    let mut declared = from.wall(direction).is_some();

    if let Some(to) = &connection.to {
        let target = floor.room(&to.room).ok_or_else(|| {
            format!(
                "connection {} references unknown room '{}'",
                connection.id(),
                to.room
            )
        })?;
        if (target.boundary(to.wall) - line).abs() > BOUNDARY_EPSILON
            || to.wall.is_vertical() != direction.is_vertical()
        {
            return Err(format!(
                "connection {} joins walls that do not share a boundary",
                connection.id()
            ));
        }
        let (ts, te) = target.side_extent(to.wall);
        span = span.intersection(&Span::new(ts, te)).ok_or_else(|| {
            format!(
                "connection {} joins rooms that do not overlap along the wall",
                connection.id()
            )
        })?;
        declared |= target.wall(to.wall).is_some();
    }

    if !declared {
        return Err(format!(
            "connection {} is on a side no room declares a wall for",
            connection.id()
        ));
    }

    let (default_width, default_height, sill) = default_dimensions(connection.opening_type, config);
    let (span, _) = place_along(
        span,
        connection.position.unwrap_or(50.0),
        connection.width.unwrap_or(default_width),
    );

    Ok(Opening {
        source: OpeningSource::WallType,
        kind: connection.opening_type,
        host: connection.from.clone(),
        line,
        span,
        bottom: from.elevation + sill,
        height: connection.height.unwrap_or(default_height),
        swing: connection.swing,
        source_range: connection.source_range,
    })
}

/// What fills an opening once it is cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    DoorLeaf,
    Glass,
}

/// Door leaves (opened 90° into the host room) or a window pane for an opening
///
/// The hinge sits at the start of the span for a left swing and at the end for
/// a right swing; double doors hinge at both ends. Doors without a swing and
/// plain openings get no fixture.
pub fn fixtures(opening: &Opening, wall_thickness: f64, config: &Config) -> Vec<(FixtureKind, Mesh)> {
    let leaf = config.metric(DOOR_LEAF_THICKNESS_M);
    match opening.kind {
        OpeningType::Window => {
            let glass = config.metric(GLASS_THICKNESS_M) * 0.5;
            vec![(
                FixtureKind::Glass,
                oriented_box(opening, (opening.line - glass, opening.line + glass), opening.span),
            )]
        }
        OpeningType::Opening => Vec::new(),
        OpeningType::Door => {
            let hinge = match opening.swing {
                Swing::Left => HingeEnd::Start,
                Swing::Right => HingeEnd::End,
                Swing::None => return Vec::new(),
            };
            vec![(
                FixtureKind::DoorLeaf,
                door_leaf(opening, hinge, opening.width(), leaf, wall_thickness),
            )]
        }
        OpeningType::DoubleDoor => {
            if opening.swing == Swing::None {
                return Vec::new();
            }
            let width = opening.width() * 0.5;
            [HingeEnd::Start, HingeEnd::End]
                .into_iter()
                .map(|h| {
                    (
                        FixtureKind::DoorLeaf,
                        door_leaf(opening, h, width, leaf, wall_thickness),
                    )
                })
                .collect()
        }
    }
}

#[derive(Clone, Copy)]
enum HingeEnd {
    Start,
    End,
}

fn door_leaf(opening: &Opening, hinge: HingeEnd, width: f64, leaf: f64, wall_thickness: f64) -> Mesh {
    let (ox, oz) = opening.host.wall.outward();
    // Leaves open into the host room, away from the outward normal
    let inward = -(ox + oz);
    let face = opening.line + inward * wall_thickness * 0.5;
    let across = (face, face + inward * width);
    let along = match hinge {
        HingeEnd::Start => Span::new(opening.span.start, opening.span.start + leaf),
        HingeEnd::End => Span::new(opening.span.end - leaf, opening.span.end),
    };
    oriented_box(opening, across, along)
}

/// Box spanning `across` perpendicular to the wall and `along` the wall axis
fn oriented_box(opening: &Opening, across: (f64, f64), along: Span) -> Mesh {
    let (a0, a1) = (across.0.min(across.1), across.0.max(across.1));
    let (y0, y1) = (opening.bottom, opening.top());
    if opening.is_vertical() {
        box_mesh(Point3::new(a0, y0, along.start), Point3::new(a1, y1, along.end))
    } else {
        box_mesh(Point3::new(along.start, y0, a0), Point3::new(along.end, y1, a1))
    }
}

/// Default cutter undershoot in scene units
pub fn cutter_undershoot(config: &Config) -> f64 {
    config.metric(CUTTER_UNDERSHOOT_M)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorplan_model::{Room, Wall, WallDirection};

    fn room(name: &str, x: f64, w: f64) -> Room {
        Room {
            name: name.into(),
            x,
            z: 0.0,
            width: w,
            depth: 4.0,
            walls: WallDirection::ALL
                .iter()
                .map(|&d| Wall::new(d, WallType::Solid))
                .collect(),
            ..Default::default()
        }
    }

    fn description(connections: Vec<Connection>) -> SceneDescription {
        SceneDescription {
            floors: vec![Floor {
                id: "ground".into(),
                rooms: vec![room("A", 0.0, 4.0), room("B", 4.0, 4.0)],
                ..Default::default()
            }],
            connections,
            ..Default::default()
        }
    }

    fn door(from: &str, wall: WallDirection, to: Option<WallRef>) -> Connection {
        let mut connection = Connection::new(WallRef::new(from, wall), to, OpeningType::Door);
        connection.width = Some(1.0);
        connection
    }

    #[test]
    fn test_door_centered_on_shared_wall() {
        let desc = description(vec![door(
            "A",
            WallDirection::Right,
            Some(WallRef::new("B", WallDirection::Left)),
        )]);
        let resolved = resolve_openings(&desc.floors[0], &desc);
        assert!(resolved.warnings.is_empty());
        let opening = &resolved.openings[0];
        assert_eq!(opening.source, OpeningSource::Connection(0));
        assert_relative_eq!(opening.line, 4.0);
        assert_relative_eq!(opening.span.start, 1.5);
        assert_relative_eq!(opening.span.end, 2.5);
        assert_relative_eq!(opening.height, 2.1);
    }

    #[test]
    fn test_unknown_room_is_skipped_with_warning() {
        let desc = description(vec![
            door("A", WallDirection::Right, Some(WallRef::new("Ghost", WallDirection::Left))),
            door("B", WallDirection::Right, None),
        ]);
        let resolved = resolve_openings(&desc.floors[0], &desc);
        assert_eq!(resolved.openings.len(), 1);
        assert_eq!(resolved.warnings.len(), 1);
        assert_eq!(resolved.warnings[0].kind, WarningKind::MalformedReference);
    }

    #[test]
    fn test_placement_stays_inside_wall() {
        let (span, clamped) = place_along(Span::new(0.0, 4.0), 100.0, 1.0);
        assert!(!clamped);
        assert_relative_eq!(span.end, 4.0);
        let (span, clamped) = place_along(Span::new(0.0, 0.8), 50.0, 1.0);
        assert!(clamped);
        assert_relative_eq!(span.length(), 0.8);
    }

    #[test]
    fn test_left_swing_leaf_opens_into_host_room() {
        let mut connection = door("A", WallDirection::Right, None);
        connection.swing = Swing::Left;
        let desc = description(vec![connection]);
        let resolved = resolve_openings(&desc.floors[0], &desc);
        let parts = fixtures(&resolved.openings[0], 0.2, &desc.config);
        assert_eq!(parts.len(), 1);
        let aabb = parts[0].1.aabb().unwrap();
        // Hinged at z 1.5, swung toward -X into room A
        assert_relative_eq!(aabb.max.x, 3.9, epsilon = 1e-5);
        assert_relative_eq!(aabb.min.x, 2.9, epsilon = 1e-5);
        assert_relative_eq!(aabb.min.z, 1.5, epsilon = 1e-5);
        assert_relative_eq!(aabb.max.z, 1.54, epsilon = 1e-5);
    }

    #[test]
    fn test_door_without_swing_has_no_leaf() {
        let desc = description(vec![door("A", WallDirection::Right, None)]);
        let resolved = resolve_openings(&desc.floors[0], &desc);
        assert!(fixtures(&resolved.openings[0], 0.2, &desc.config).is_empty());
    }

    #[test]
    fn test_window_wall_type_uses_sill() {
        let mut desc = description(Vec::new());
        desc.floors[0].rooms[0].walls[0].wall_type = WallType::Window;
        let resolved = resolve_openings(&desc.floors[0], &desc);
        let opening = &resolved.openings[0];
        assert_eq!(opening.kind, OpeningType::Window);
        assert_relative_eq!(opening.bottom, 0.9);
        assert!(!opening.is_vertical());
    }
}
