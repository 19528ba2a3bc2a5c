// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-floor assembly
//!
//! Builds one floor group: room floor plates clipped by the shafts of the floor
//! below, owned wall pieces with their openings cut, door leaves and window
//! panes, stairs and lifts. Every drawable node is registered in the Mesh
//! Registry as it is created. Geometry stays in floor-local space; the floor
//! group's translation is owned by the stacking step.

use crate::builder::BuildReport;
use crate::error::{BuildWarning, WarningKind};
use crate::graph::{Primitive, SceneGraph};
use crate::keys::{EntityKey, NodeKey};
use crate::material::SurfaceRole;
use crate::openings::{cutter_undershoot, fixtures, resolve_openings, FixtureKind, OpeningSource};
use crate::registry::{EntityId, EntityPayload, MeshRegistry};
use crate::vertical::{lift_mesh, lift_penetration, stair_mesh, stair_penetration, Penetration};
use crate::walls::{generate_wall, WallFace, WallSettings};
use floorplan_geometry::{
    extrude_profile_y_up, subtract_rectangles_2d, ClippingProcessor, Mesh, Point2, Profile2D,
    Rect2,
};
use floorplan_model::{
    resolve_height, resolve_style, Floor, Room, SceneDescription, SourceRange, Style,
    StyleResolver,
};
use rustc_hash::FxHashMap;

/// Result of building one floor
#[derive(Debug, Clone)]
pub struct FloorOutput {
    pub group: NodeKey,
    /// Shafts this floor punches into the floor above
    pub penetrations: Vec<Penetration>,
}

/// Writes floors into a scene graph and its registry
pub(crate) struct FloorBuilder<'a, R: StyleResolver + ?Sized> {
    pub graph: &'a mut SceneGraph,
    pub registry: &'a mut MeshRegistry,
    pub report: &'a mut BuildReport,
    pub description: &'a SceneDescription,
    pub resolver: &'a R,
    pub clipper: ClippingProcessor,
}

impl<'a, R: StyleResolver + ?Sized> FloorBuilder<'a, R> {
    /// Build `floor` under the scene root, clipping plates by `below`
    pub fn build_floor(&mut self, floor: &Floor, below: &[Penetration]) -> FloorOutput {
        let description = self.description;
        let config = &description.config;
        let root = self.graph.root();
        let group = self.graph.add_group(root, format!("floor:{}", floor.id));

        let styles = self.resolve_room_styles(floor);
        let fallback = resolve_style(self.resolver, None, config).style;

        for room in &floor.rooms {
            let style = styles.get(&room.name).unwrap_or(&fallback);
            self.build_room(floor, room, style, below, group);
        }

        let resolved = resolve_openings(floor, description);
        for warning in resolved.warnings {
            self.warn(warning);
        }

        let settings_for = |room: &Room| WallSettings {
            thickness: config.wall_thickness(),
            base: room.elevation,
            height: resolve_height(room.height, floor.height, config),
            undershoot: cutter_undershoot(config),
        };

        for room in &floor.rooms {
            let style = styles.get(&room.name).unwrap_or(&fallback);
            for wall in &room.walls {
                let geometry = generate_wall(
                    room,
                    wall,
                    &floor.rooms,
                    &resolved.openings,
                    &settings_for(room),
                    &self.clipper,
                );
                for warning in geometry.warnings.iter().cloned() {
                    self.warn(warning.on_floor(&floor.id));
                }
                if !geometry.ownership.should_render {
                    self.report.walls_suppressed += 1;
                    continue;
                }
                if !geometry.is_rendered() {
                    continue;
                }
                self.report.walls_rendered += 1;
                self.report.openings_cut += geometry.openings_cut();

                let id = EntityId::wall(&floor.id, &room.name, wall.direction);
                let (range, inherited) = match wall.source_range {
                    Some(range) => (Some(range), false),
                    None => (room.source_range, room.source_range.is_some()),
                };
                let key = self.registry.register(
                    id.clone(),
                    EntityPayload::Wall {
                        room: room.name.clone(),
                        wall: wall.clone(),
                        owner: geometry.ownership.owner.clone(),
                    },
                    range,
                    inherited,
                );

                for (i, piece) in geometry.pieces.iter().enumerate() {
                    let primitives = piece
                        .faces
                        .iter()
                        .map(|(face, mesh)| {
                            let (face_style, role) = match face {
                                WallFace::Interior => (style, SurfaceRole::WallInterior),
                                WallFace::Exterior => (style, SurfaceRole::WallExterior),
                                WallFace::Neighbor(name) => (
                                    styles.get(name).unwrap_or(&fallback),
                                    SurfaceRole::WallInterior,
                                ),
                            };
                            Primitive {
                                mesh: mesh.clone(),
                                material: self.graph.materials_mut().surface(face_style, role),
                                role,
                            }
                        })
                        .collect();
                    self.add_registered(key, group, format!("{}#{}", id, i), primitives);
                }
            }
        }

        for opening in &resolved.openings {
            let OpeningSource::Connection(index) = opening.source else {
                continue;
            };
            let Some(connection) = description.connections.get(index) else {
                continue;
            };
            let key = self.registry.register(
                EntityId::connection(&floor.id, connection),
                EntityPayload::Connection(connection.clone()),
                connection.source_range,
                false,
            );
            let style = styles.get(&opening.host.room).unwrap_or(&fallback);
            for (i, (kind, mesh)) in fixtures(opening, config.wall_thickness(), config)
                .into_iter()
                .enumerate()
            {
                let role = match kind {
                    FixtureKind::DoorLeaf => SurfaceRole::DoorLeaf,
                    FixtureKind::Glass => SurfaceRole::Glass,
                };
                let material = self.graph.materials_mut().surface(style, role);
                self.add_registered(
                    key,
                    group,
                    format!("connection:{}/{}#{}", floor.id, connection.id(), i),
                    vec![Primitive {
                        mesh,
                        material,
                        role,
                    }],
                );
            }
        }

        let mut penetrations = Vec::new();
        for stair in &floor.stairs {
            let height = resolve_height(stair.height, floor.height, config);
            let id = EntityId::stair(&floor.id, stair);
            let key = self.registry.register(
                id.clone(),
                EntityPayload::Stair(stair.clone()),
                stair.source_range,
                false,
            );
            let material = self.graph.materials_mut().surface(&fallback, SurfaceRole::Stair);
            self.add_registered(
                key,
                group,
                id.to_string(),
                vec![Primitive {
                    mesh: stair_mesh(stair, height, config),
                    material,
                    role: SurfaceRole::Stair,
                }],
            );
            penetrations.push(stair_penetration(&floor.id, stair, height));
        }

        for lift in &floor.lifts {
            let height = resolve_height(lift.height, floor.height, config);
            let id = EntityId::lift(&floor.id, lift);
            let key = self.registry.register(
                id.clone(),
                EntityPayload::Lift(lift.clone()),
                lift.source_range,
                false,
            );
            let material = self.graph.materials_mut().surface(&fallback, SurfaceRole::Lift);
            self.add_registered(
                key,
                group,
                id.to_string(),
                vec![Primitive {
                    mesh: lift_mesh(lift, height),
                    material,
                    role: SurfaceRole::Lift,
                }],
            );
            penetrations.push(lift_penetration(&floor.id, lift, height));
        }

        tracing::debug!(
            floor = %floor.id,
            rooms = floor.rooms.len(),
            penetrations_in = below.len(),
            penetrations_out = penetrations.len(),
            "floor built"
        );

        FloorOutput {
            group,
            penetrations,
        }
    }

    fn resolve_room_styles(&mut self, floor: &Floor) -> FxHashMap<String, Style> {
        let description = self.description;
        let config = &description.config;
        let mut styles = FxHashMap::default();
        for room in &floor.rooms {
            let resolution = resolve_style(self.resolver, room.style.as_deref(), config);
            for name in &resolution.missing {
                tracing::warn!(floor = %floor.id, room = %room.name, style = %name, "unknown style");
                self.warn(
                    BuildWarning::new(
                        WarningKind::UnknownStyle,
                        format!("room {} uses unknown style '{}'", room.name, name),
                    )
                    .on_floor(&floor.id)
                    .at(room.source_range),
                );
            }
            styles.insert(room.name.clone(), resolution.style);
        }
        styles
    }

    fn build_room(
        &mut self,
        floor: &Floor,
        room: &Room,
        style: &Style,
        below: &[Penetration],
        group: NodeKey,
    ) {
        let key = self.registry.register(
            EntityId::room(&floor.id, &room.name),
            EntityPayload::Room(room.clone()),
            room.source_range,
            false,
        );
        self.report.rooms += 1;

        let plate = self.floor_plate(floor, room, below);
        if plate.is_empty() {
            return;
        }
        let material = self.graph.materials_mut().surface(style, SurfaceRole::Floor);
        self.add_registered(
            key,
            group,
            format!("room:{}/{}", floor.id, room.name),
            vec![Primitive {
                mesh: plate,
                material,
                role: SurfaceRole::Floor,
            }],
        );
    }

    /// Thin slab under the room with every overlapping shaft removed
    fn floor_plate(&mut self, floor: &Floor, room: &Room, below: &[Penetration]) -> Mesh {
        let description = self.description;
        let config = &description.config;
        let thickness = config.floor_thickness();
        let bottom = room.elevation - thickness;
        let outline = Profile2D::rectangle(
            Point2::new(room.min_x(), room.min_z()),
            Point2::new(room.max_x(), room.max_z()),
        );
        let room_rect = Rect2::new(
            Point2::new(room.min_x(), room.min_z()),
            Point2::new(room.max_x(), room.max_z()),
        );
        let holes: Vec<Rect2> = below
            .iter()
            .filter(|p| p.footprint.overlaps(&room_rect))
            .map(|p| p.footprint)
            .collect();

        let shapes = if holes.is_empty() {
            vec![outline.clone()]
        } else {
            match subtract_rectangles_2d(&outline, &holes) {
                Ok(shapes) => shapes,
                Err(err) => {
                    self.geometry_fallback(floor, room, room.source_range, &err.to_string());
                    vec![outline.clone()]
                }
            }
        };

        let mut plate = Mesh::new();
        for shape in &shapes {
            match extrude_profile_y_up(shape, bottom, thickness) {
                Ok(mesh) => plate.merge(&mesh),
                Err(err) => self.geometry_fallback(floor, room, room.source_range, &err.to_string()),
            }
        }
        plate
    }

    fn geometry_fallback(
        &mut self,
        floor: &Floor,
        room: &Room,
        range: Option<SourceRange>,
        error: &str,
    ) {
        tracing::warn!(floor = %floor.id, room = %room.name, error = %error, "floor plate fallback");
        self.warn(
            BuildWarning::new(
                WarningKind::GeometryFallback,
                format!("floor plate of {}: {}", room.name, error),
            )
            .on_floor(&floor.id)
            .at(range),
        );
    }

    fn add_registered(
        &mut self,
        key: EntityKey,
        parent: NodeKey,
        name: String,
        primitives: Vec<Primitive>,
    ) -> NodeKey {
        let node = self.graph.add_drawable(parent, name, primitives);
        self.registry.attach_node(key, node);
        node
    }

    fn warn(&mut self, warning: BuildWarning) {
        self.report.warnings.push(warning);
    }
}
