// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scene building from JSON descriptions

use approx::assert_relative_eq;
use floorplan_geometry::{Mesh, Point3, Ray, Vector3};
use floorplan_model::{SceneDescription, WallDirection};
use floorplan_scene::{EntityId, EntityKind, FloorplanScene, SurfaceRole, WarningKind};

const ALL_WALLS: &str = r#"[{"direction": "top"}, {"direction": "right"},
                           {"direction": "bottom"}, {"direction": "left"}]"#;

fn two_rooms(with_b: bool, connections: &str) -> SceneDescription {
    let b = if with_b {
        format!(
            r#", {{"name": "B", "x": 4, "z": 0, "width": 4, "depth": 4, "walls": {}}}"#,
            ALL_WALLS
        )
    } else {
        String::new()
    };
    let json = format!(
        r#"{{
            "floors": [{{
                "id": "ground",
                "height": 3,
                "rooms": [
                    {{"name": "A", "x": 0, "z": 0, "width": 4, "depth": 4, "walls": {walls},
                      "sourceRange": {{"startLine": 2, "startColumn": 0, "endLine": 8, "endColumn": 1}}}}
                    {b}
                ]
            }}],
            "connections": {connections}
        }}"#,
        walls = ALL_WALLS,
        b = b,
        connections = connections
    );
    SceneDescription::from_json(&json).unwrap()
}

fn wall_meshes(scene: &FloorplanScene, room: &str, direction: WallDirection) -> Vec<Mesh> {
    let id = EntityId::wall("ground", room, direction);
    let entity = scene.registry().find(&id).expect("wall registered");
    entity
        .nodes
        .iter()
        .filter_map(|&n| scene.graph().world_mesh(n))
        .collect()
}

#[test]
fn shared_wall_rendered_once_by_smaller_x() {
    let (scene, report) = FloorplanScene::from_description(&two_rooms(true, "[]")).unwrap();

    assert_eq!(report.walls_rendered, 7);
    assert_eq!(report.walls_suppressed, 1);
    assert!(scene
        .registry()
        .find(&EntityId::wall("ground", "A", WallDirection::Right))
        .is_some());
    assert!(scene
        .registry()
        .find(&EntityId::wall("ground", "B", WallDirection::Left))
        .is_none());

    // Exactly one slab sits on the x = 4 line
    let on_shared_line = scene
        .registry()
        .of_kind(EntityKind::Wall)
        .into_iter()
        .flat_map(|e| e.nodes.iter().copied())
        .filter_map(|n| scene.graph().world_aabb(n))
        .filter(|b| b.min.x < 4.0 && b.max.x > 4.0 && b.size().x < 0.5)
        .count();
    assert_eq!(on_shared_line, 1);
}

#[test]
fn ownership_is_stable_across_rebuilds() {
    let description = two_rooms(true, "[]");
    let (mut scene, first) = FloorplanScene::from_description(&description).unwrap();
    let ids: Vec<_> = scene
        .registry()
        .of_kind(EntityKind::Wall)
        .iter()
        .map(|e| e.id.clone())
        .collect();

    let catalog = floorplan_model::StyleCatalog::default();
    let second = scene.rebuild(&description, &catalog).unwrap();
    let again: Vec<_> = scene
        .registry()
        .of_kind(EntityKind::Wall)
        .iter()
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(ids, again);
    assert_eq!(first.walls_rendered, second.walls_rendered);
}

#[test]
fn removing_neighbor_makes_wall_exterior() {
    let (scene, _) = FloorplanScene::from_description(&two_rooms(true, "[]")).unwrap();
    let entity = scene
        .registry()
        .find(&EntityId::wall("ground", "A", WallDirection::Right))
        .unwrap();
    let node = scene.graph().node(entity.nodes[0]).unwrap();
    assert!(node.primitives.iter().all(|p| p.role != SurfaceRole::WallExterior));

    let (scene, report) = FloorplanScene::from_description(&two_rooms(false, "[]")).unwrap();
    assert_eq!(report.walls_suppressed, 0);
    let entity = scene
        .registry()
        .find(&EntityId::wall("ground", "A", WallDirection::Right))
        .unwrap();
    let node = scene.graph().node(entity.nodes[0]).unwrap();
    assert!(node.primitives.iter().any(|p| p.role == SurfaceRole::WallExterior));
}

#[test]
fn walls_inherit_room_range() {
    let (scene, _) = FloorplanScene::from_description(&two_rooms(true, "[]")).unwrap();
    let wall = scene
        .registry()
        .find(&EntityId::wall("ground", "A", WallDirection::Top))
        .unwrap();
    assert!(wall.range_inherited);
    assert_eq!(wall.source_range.unwrap().start_line, 2);
    assert!(wall.own_range().is_none());
}

#[test]
fn door_leaves_a_gap_in_owned_wall() {
    let connections = r#"[{"from": {"room": "A", "wall": "right"},
                           "to": {"room": "B", "wall": "left"},
                           "type": "door", "position": 50, "width": 1}]"#;
    let (scene, report) =
        FloorplanScene::from_description(&two_rooms(true, connections)).unwrap();
    assert!(report.warnings.is_empty());
    assert!(report.openings_cut >= 1);

    let meshes = wall_meshes(&scene, "A", WallDirection::Right);
    let cast = |z: f64| {
        let ray = Ray::new(Point3::new(0.5, 1.0, z), Vector3::x()).unwrap();
        meshes
            .iter()
            .filter_map(|m| ray.intersect_mesh(m))
            .map(|h| h.distance)
            .reduce(f64::min)
    };

    // 50% of a 4 unit wall, ±0.5
    for z in [1.6, 2.0, 2.4] {
        assert!(cast(z).is_none(), "expected a gap at z = {}", z);
    }
    assert_relative_eq!(cast(1.0).unwrap(), 3.4, epsilon = 1e-4);
    assert_relative_eq!(cast(3.0).unwrap(), 3.4, epsilon = 1e-4);

    // Above the door head the lintel is solid
    let lintel = Ray::new(Point3::new(0.5, 2.5, 2.0), Vector3::x()).unwrap();
    assert!(meshes.iter().any(|m| lintel.intersect_mesh(m).is_some()));

    // The connection itself is registered
    assert_eq!(scene.registry().of_kind(EntityKind::Connection).len(), 1);
}

#[test]
fn malformed_connection_is_skipped() {
    let connections = r#"[{"from": {"room": "A", "wall": "right"},
                           "to": {"room": "Nowhere", "wall": "left"}},
                          {"from": {"room": "A", "wall": "top"}, "type": "window"}]"#;
    let (scene, report) =
        FloorplanScene::from_description(&two_rooms(true, connections)).unwrap();
    assert_eq!(report.warnings_of(WarningKind::MalformedReference).count(), 1);
    assert_eq!(scene.registry().of_kind(EntityKind::Connection).len(), 1);
    assert_eq!(scene.registry().of_kind(EntityKind::Room).len(), 2);
}

#[test]
fn every_drawable_round_trips_through_registry() {
    let connections = r#"[{"from": {"room": "A", "wall": "bottom"}, "type": "window"},
                          {"from": {"room": "B", "wall": "right"}, "type": "door", "swing": "left"}]"#;
    let (scene, _) = FloorplanScene::from_description(&two_rooms(true, connections)).unwrap();

    let mut drawables = 0;
    for (node, _) in scene.graph().drawables() {
        drawables += 1;
        let entity = scene.registry().lookup_node(node).expect("node registered");
        assert!(entity.nodes.contains(&node));
        assert_eq!(entity.kind(), entity.payload.kind());
        assert_eq!(scene.registry().find(&entity.id).unwrap().id, entity.id);
    }
    assert_eq!(drawables, scene.registry().node_count());
}

#[test]
fn shaft_cuts_floor_plate_above() {
    let json = r#"{
        "floors": [
            {"id": "ground", "height": 3,
             "rooms": [{"name": "Hall", "x": 0, "z": 0, "width": 4, "depth": 4}],
             "stairs": [{"id": "s1", "x": 1, "z": 1, "width": 1, "depth": 2, "direction": "top"}]},
            {"id": "first", "height": 3,
             "rooms": [{"name": "Landing", "x": 0, "z": 0, "width": 4, "depth": 4}]}
        ]
    }"#;
    let description = SceneDescription::from_json(json).unwrap();
    let (scene, _) = FloorplanScene::from_description(&description).unwrap();

    let first = scene.floor("first").unwrap();
    assert_eq!(first.penetrations.len(), 1);
    assert_eq!(first.penetrations[0].source.name, "s1");

    let landing = scene
        .registry()
        .find(&EntityId::room("first", "Landing"))
        .unwrap();
    let plate = scene.graph().world_mesh(landing.nodes[0]).unwrap();
    let down = |x: f64, z: f64| {
        Ray::new(Point3::new(x, 10.0, z), -Vector3::y())
            .unwrap()
            .intersect_mesh(&plate)
    };

    assert!(down(1.5, 2.0).is_none());
    let hit = down(3.0, 2.0).unwrap();
    assert_relative_eq!(hit.point.y, 3.0, epsilon = 1e-4);

    // The ground floor plate is untouched
    let hall = scene.registry().find(&EntityId::room("ground", "Hall")).unwrap();
    let plate = scene.graph().world_mesh(hall.nodes[0]).unwrap();
    let ray = Ray::new(Point3::new(1.5, 0.5, 2.0), -Vector3::y()).unwrap();
    assert!(ray.intersect_mesh(&plate).is_some());
}

#[test]
fn restacking_is_idempotent_and_keeps_geometry() {
    let json = r#"{
        "floors": [
            {"id": "ground", "rooms": [{"name": "A", "x": 0, "z": 0, "width": 4, "depth": 4}]},
            {"id": "first", "height": 2.5, "rooms": [{"name": "B", "x": 0, "z": 0, "width": 4, "depth": 4}]}
        ],
        "config": {"maxExplodedSeparation": 2}
    }"#;
    let description = SceneDescription::from_json(json).unwrap();
    let (mut scene, _) = FloorplanScene::from_description(&description).unwrap();

    let vertices = |scene: &FloorplanScene| -> usize {
        scene
            .graph()
            .drawables()
            .flat_map(|(_, n)| n.primitives.iter())
            .map(|p| p.mesh.vertex_count())
            .sum()
    };
    let before = vertices(&scene);

    scene.set_exploded_view(0.75);
    let once = scene.floor_offset("first").unwrap();
    scene.set_exploded_view(0.75);
    let twice = scene.floor_offset("first").unwrap();

    assert_relative_eq!(once, twice);
    assert_relative_eq!(once, 3.0 + 1.5);
    assert_relative_eq!(scene.floor_offset("ground").unwrap(), 0.0);
    assert_eq!(vertices(&scene), before);
}
