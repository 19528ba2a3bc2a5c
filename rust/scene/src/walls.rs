// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall slab generation
//!
//! A declared wall becomes zero or more slab pieces: one per rendered span,
//! split again wherever the room on the far side changes so that each piece
//! has a single outward material. Every opening on the same boundary line is
//! subtracted from each piece with csgrs. When the boolean fails the uncut slab
//! is kept and a warning is recorded.

use crate::error::{BuildWarning, WarningKind};
use crate::openings::Opening;
use crate::ownership::{resolve_ownership, Span, WallOwnership, BOUNDARY_EPSILON};
use floorplan_geometry::{box_mesh, Aabb, ClippingProcessor, Mesh, Point3};
use floorplan_model::{Room, Wall, WallDirection, WallType};
use smallvec::SmallVec;

/// Which side of a slab a group of triangles faces
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WallFace {
    /// Toward the declaring room, plus caps, ends and opening reveals
    Interior,
    /// Toward the outside of the building
    Exterior,
    /// Toward a neighbouring room that does not render this stretch
    Neighbor(String),
}

/// Dimensions shared by every piece of one wall
#[derive(Debug, Clone, Copy)]
pub struct WallSettings {
    pub thickness: f64,
    /// Bottom of the slab
    pub base: f64,
    pub height: f64,
    /// How far opening cutters reach below the slab base
    pub undershoot: f64,
}

/// One rendered slab piece
#[derive(Debug, Clone)]
pub struct WallPiece {
    pub span: Span,
    pub outward: WallFace,
    pub faces: Vec<(WallFace, Mesh)>,
    pub openings_cut: usize,
}

impl WallPiece {
    /// All faces merged into one mesh
    pub fn mesh(&self) -> Mesh {
        let mut mesh = Mesh::new();
        for (_, part) in &self.faces {
            mesh.merge(part);
        }
        mesh
    }
}

/// Result of generating one declared wall
#[derive(Debug, Clone)]
pub struct WallGeometry {
    pub direction: WallDirection,
    pub ownership: WallOwnership,
    pub pieces: Vec<WallPiece>,
    pub warnings: Vec<BuildWarning>,
}

impl WallGeometry {
    pub fn is_rendered(&self) -> bool {
        !self.pieces.is_empty()
    }

    pub fn openings_cut(&self) -> usize {
        self.pieces.iter().map(|p| p.openings_cut).sum()
    }
}

/// Generate the slab pieces `room` renders for `wall`
///
/// `rooms` is every room on the floor and `openings` every opening resolved on
/// it; ownership and cutter selection happen here.
pub fn generate_wall(
    room: &Room,
    wall: &Wall,
    rooms: &[Room],
    openings: &[Opening],
    settings: &WallSettings,
    clipper: &ClippingProcessor,
) -> WallGeometry {
    let direction = wall.direction;
    let ownership = resolve_ownership(room, direction, rooms);
    let mut geometry = WallGeometry {
        direction,
        ownership,
        pieces: Vec::new(),
        warnings: Vec::new(),
    };

    if wall.wall_type == WallType::Open || !geometry.ownership.should_render {
        return geometry;
    }

    let line = room.boundary(direction);
    let vertical = direction.is_vertical();
    let (extent_start, extent_end) = room.side_extent(direction);
    let cutters: SmallVec<[Aabb; 2]> = openings
        .iter()
        .filter(|o| o.lies_on(vertical, line))
        .map(|o| o.cutter(settings.thickness, settings.undershoot))
        .collect();

    for span in split_at_neighbors(&geometry.ownership) {
        let outward = match geometry
            .ownership
            .neighbors
            .iter()
            .find(|n| !n.owns && n.overlap.contains((span.start + span.end) * 0.5))
        {
            Some(neighbor) => WallFace::Neighbor(neighbor.room.clone()),
            None => WallFace::Exterior,
        };

        let half = settings.thickness * 0.5;
        let start = if (span.start - extent_start).abs() <= BOUNDARY_EPSILON {
            span.start - half
        } else {
            span.start
        };
        let end = if (span.end - extent_end).abs() <= BOUNDARY_EPSILON {
            span.end + half
        } else {
            span.end
        };
        let slab_box = slab_bounds(vertical, line, Span::new(start, end), settings);
        let slab = box_mesh(slab_box.min, slab_box.max);

        let relevant: SmallVec<[Aabb; 2]> = cutters
            .iter()
            .filter(|c| c.intersects(&slab_box))
            .copied()
            .collect();

        let cut = if relevant.is_empty() {
            slab
        } else {
            match clipper.subtract_boxes(&slab, &relevant) {
                Ok(mesh) => mesh,
                Err(err) => {
                    tracing::warn!(
                        room = %room.name,
                        wall = %direction,
                        error = %err,
                        "opening cut failed, keeping uncut wall"
                    );
                    geometry.warnings.push(
                        BuildWarning::new(
                            WarningKind::GeometryFallback,
                            format!("could not cut openings in {}.{}: {}", room.name, direction, err),
                        )
                        .at(wall.source_range.or(room.source_range)),
                    );
                    slab
                }
            }
        };

        geometry.pieces.push(WallPiece {
            span,
            faces: split_faces(&cut, direction, &outward),
            outward,
            openings_cut: relevant.len(),
        });
    }

    geometry
}

/// Rendered spans, split where a neighbouring room begins or ends
fn split_at_neighbors(ownership: &WallOwnership) -> Vec<Span> {
    let mut out = Vec::new();
    for span in &ownership.rendered_spans {
        let mut cuts: SmallVec<[f64; 4]> = ownership
            .neighbors
            .iter()
            .filter(|n| !n.owns)
            .flat_map(|n| [n.overlap.start, n.overlap.end])
            .filter(|&p| p - span.start > BOUNDARY_EPSILON && span.end - p > BOUNDARY_EPSILON)
            .collect();
        cuts.sort_by(|a, b| a.total_cmp(b));
        cuts.dedup_by(|a, b| (*a - *b).abs() <= BOUNDARY_EPSILON);

        let mut cursor = span.start;
        for p in cuts {
            out.push(Span::new(cursor, p));
            cursor = p;
        }
        out.push(Span::new(cursor, span.end));
    }
    out
}

fn slab_bounds(vertical: bool, line: f64, span: Span, settings: &WallSettings) -> Aabb {
    let half = settings.thickness * 0.5;
    let (y0, y1) = (settings.base, settings.base + settings.height);
    if vertical {
        Aabb::new(
            Point3::new(line - half, y0, span.start),
            Point3::new(line + half, y1, span.end),
        )
    } else {
        Aabb::new(
            Point3::new(span.start, y0, line - half),
            Point3::new(span.end, y1, line + half),
        )
    }
}

/// Split a slab into its interior part and its outward-facing part
fn split_faces(mesh: &Mesh, direction: WallDirection, outward: &WallFace) -> Vec<(WallFace, Mesh)> {
    let (ox, oz) = direction.outward();
    let faces_out: Vec<bool> = (0..mesh.triangle_count())
        .map(|t| {
            mesh.triangle_normal(t)
                .map(|n| n.x * ox + n.z * oz > 0.9)
                .unwrap_or(false)
        })
        .collect();

    let exterior = mesh.filter_triangles(|t| faces_out[t]);
    let interior = mesh.filter_triangles(|t| !faces_out[t]);

    let mut out = Vec::with_capacity(2);
    if !interior.is_empty() {
        out.push((WallFace::Interior, interior));
    }
    if !exterior.is_empty() {
        out.push((outward.clone(), exterior));
    }
    out
}
