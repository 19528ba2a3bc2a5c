// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall Ownership Resolver
//!
//! Two rooms that declare walls on facing sides of the same boundary line
//! would otherwise draw two coincident slabs. Exactly one of them owns each
//! shared stretch: the room with the smaller X for left/right walls, the room
//! with the smaller Z for top/bottom walls. Ownership depends only on room
//! geometry, never on declaration order.
//!
//! Rooms that share only part of a boundary split the wall: the stretch owned
//! by a neighbour is suppressed and the remainder is still rendered, so the
//! result is a list of spans along the wall axis rather than a single flag.

use floorplan_model::{Room, WallDirection};
use smallvec::SmallVec;

/// Tolerance for boundary coincidence and span lengths
pub const BOUNDARY_EPSILON: f64 = 1e-6;

/// Interval along a wall axis (Z for left/right walls, X for top/bottom walls)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Overlap with positive length, if any
    pub fn intersection(&self, other: &Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start > BOUNDARY_EPSILON).then_some(Span { start, end })
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }
}

/// Subtract a set of intervals from a span, returning the ordered remainder
pub fn subtract_spans(span: Span, cuts: &[Span]) -> SmallVec<[Span; 2]> {
    let mut sorted: SmallVec<[Span; 4]> = cuts.iter().copied().collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut out = SmallVec::new();
    let mut cursor = span.start;
    for cut in sorted {
        if cut.end <= cursor {
            continue;
        }
        if cut.start >= span.end {
            break;
        }
        if cut.start - cursor > BOUNDARY_EPSILON {
            out.push(Span::new(cursor, cut.start));
        }
        cursor = cursor.max(cut.end);
    }
    if span.end - cursor > BOUNDARY_EPSILON {
        out.push(Span::new(cursor, span.end));
    }
    out
}

/// A room on the other side of a wall's boundary line
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub room: String,
    /// Shared stretch along the wall axis
    pub overlap: Span,
    /// True when the neighbour, not the declaring room, owns the shared stretch
    pub owns: bool,
}

/// Outcome of ownership resolution for one declared wall
#[derive(Debug, Clone, PartialEq)]
pub struct WallOwnership {
    pub should_render: bool,
    /// Room that renders the (largest part of the) boundary
    pub owner: String,
    pub neighbors: SmallVec<[Neighbor; 2]>,
    /// Stretches this room must draw, empty when fully suppressed
    pub rendered_spans: SmallVec<[Span; 2]>,
}

impl WallOwnership {
    /// True when no neighbour shares any part of the boundary
    pub fn is_exterior(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbour sharing the given point of the wall axis
    pub fn neighbor_at(&self, along: f64) -> Option<&Neighbor> {
        self.neighbors.iter().find(|n| n.overlap.contains(along))
    }
}

/// True when `a` owns a boundary it shares with `b`
///
/// Smaller X owns vertical boundaries, smaller Z owns horizontal ones. Rooms on
/// opposite sides of one line cannot share that coordinate when they have
/// positive extents; the name comparison only keeps the order total.
pub fn owns_boundary(a: &Room, b: &Room, direction: WallDirection) -> bool {
    let (ka, kb) = if direction.is_vertical() {
        (a.x, b.x)
    } else {
        (a.z, b.z)
    };
    match ka.total_cmp(&kb) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => a.name < b.name,
    }
}

/// Decide which parts of `room`'s wall on `direction` this room renders
///
/// Only rooms that declare a wall on the facing side take part; a room whose
/// facing side is undeclared leaves the whole boundary to `room`.
pub fn resolve_ownership(room: &Room, direction: WallDirection, rooms: &[Room]) -> WallOwnership {
    let line = room.boundary(direction);
    let (start, end) = room.side_extent(direction);
    let own_span = Span::new(start, end);
    let facing = direction.opposite();

    let neighbors: SmallVec<[Neighbor; 2]> = rooms
        .iter()
        .filter(|other| other.name != room.name)
        .filter(|other| other.wall(facing).is_some())
        .filter(|other| (other.boundary(facing) - line).abs() <= BOUNDARY_EPSILON)
        .filter_map(|other| {
            let (os, oe) = other.side_extent(facing);
            own_span.intersection(&Span::new(os, oe)).map(|overlap| Neighbor {
                room: other.name.clone(),
                overlap,
                owns: !owns_boundary(room, other, direction),
            })
        })
        .collect();

    let suppressed: SmallVec<[Span; 4]> = neighbors
        .iter()
        .filter(|n| n.owns)
        .map(|n| n.overlap)
        .collect();
    let rendered_spans = subtract_spans(own_span, &suppressed);
    let should_render = !rendered_spans.is_empty();

    let owner = if should_render {
        room.name.clone()
    } else {
        neighbors
            .iter()
            .filter(|n| n.owns)
            .max_by(|a, b| a.overlap.length().total_cmp(&b.overlap.length()))
            .map(|n| n.room.clone())
            .unwrap_or_else(|| room.name.clone())
    };

    WallOwnership {
        should_render,
        owner,
        neighbors,
        rendered_spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_model::{Wall, WallType};

    fn room(name: &str, x: f64, z: f64, w: f64, d: f64) -> Room {
        Room {
            name: name.into(),
            x,
            z,
            width: w,
            depth: d,
            walls: WallDirection::ALL
                .iter()
                .map(|&dir| Wall::new(dir, WallType::Solid))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_smaller_x_owns_shared_wall() {
        let rooms = vec![room("A", 0.0, 0.0, 4.0, 4.0), room("B", 4.0, 0.0, 4.0, 4.0)];
        let a = resolve_ownership(&rooms[0], WallDirection::Right, &rooms);
        let b = resolve_ownership(&rooms[1], WallDirection::Left, &rooms);
        assert!(a.should_render);
        assert!(!b.should_render);
        assert_eq!(a.owner, "A");
        assert_eq!(b.owner, "A");
        assert_eq!(a.neighbors.len(), 1);
        assert!(!a.neighbors[0].owns);
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let forward = vec![room("A", 0.0, 0.0, 4.0, 4.0), room("B", 0.0, 4.0, 4.0, 4.0)];
        let reversed: Vec<Room> = forward.iter().rev().cloned().collect();
        for rooms in [&forward, &reversed] {
            let a = rooms.iter().find(|r| r.name == "A").unwrap();
            let b = rooms.iter().find(|r| r.name == "B").unwrap();
            assert!(resolve_ownership(a, WallDirection::Bottom, rooms).should_render);
            assert!(!resolve_ownership(b, WallDirection::Top, rooms).should_render);
        }
    }

    #[test]
    fn test_exterior_wall_without_neighbor() {
        let rooms = vec![room("A", 0.0, 0.0, 4.0, 4.0)];
        let a = resolve_ownership(&rooms[0], WallDirection::Right, &rooms);
        assert!(a.should_render && a.is_exterior());
        assert_eq!(a.rendered_spans.as_slice(), &[Span::new(0.0, 4.0)]);
    }

    #[test]
    fn test_neighbor_without_facing_wall_is_ignored() {
        let mut b = room("B", 4.0, 0.0, 4.0, 4.0);
        b.walls.retain(|w| w.direction != WallDirection::Left);
        let rooms = vec![room("A", 0.0, 0.0, 4.0, 4.0), b];
        let a = resolve_ownership(&rooms[0], WallDirection::Right, &rooms);
        assert!(a.is_exterior());
    }

    #[test]
    fn test_partial_overlap_splits_suppressed_wall() {
        // A spans z 0..6 on x = 4; B spans z 2..4 to its right; C z 0..6 on the left of A
        let rooms = vec![
            room("A", 2.0, 0.0, 2.0, 6.0),
            room("B", 4.0, 2.0, 3.0, 2.0),
            room("C", 0.0, 1.0, 2.0, 2.0),
        ];
        // B's left wall is owned by A over its full length
        let b = resolve_ownership(&rooms[1], WallDirection::Left, &rooms);
        assert!(!b.should_render);

        // A's left wall on x = 2 is owned by C over z 1..3 only
        let a_left = resolve_ownership(&rooms[0], WallDirection::Left, &rooms);
        assert!(a_left.should_render);
        assert_eq!(
            a_left.rendered_spans.as_slice(),
            &[Span::new(0.0, 1.0), Span::new(3.0, 6.0)]
        );
        assert_eq!(a_left.neighbor_at(2.0).unwrap().room, "C");
    }

    #[test]
    fn test_corner_touch_is_not_adjacency() {
        let rooms = vec![room("A", 0.0, 0.0, 4.0, 4.0), room("B", 4.0, 4.0, 4.0, 4.0)];
        let a = resolve_ownership(&rooms[0], WallDirection::Right, &rooms);
        assert!(a.is_exterior());
    }

    #[test]
    fn test_subtract_spans() {
        let rest = subtract_spans(
            Span::new(0.0, 10.0),
            &[Span::new(8.0, 12.0), Span::new(2.0, 3.0), Span::new(2.5, 4.0)],
        );
        assert_eq!(
            rest.as_slice(),
            &[Span::new(0.0, 2.0), Span::new(4.0, 8.0)]
        );
    }
}
