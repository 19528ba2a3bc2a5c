// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hit testing of registered entities
//!
//! Both pointer picking and marquee tests go through the Mesh Registry, so a
//! node without a registry entry can never be selected.

use crate::camera::{Camera, ScreenRect, Viewport};
use floorplan_geometry::{Aabb, Point3, Ray};
use floorplan_scene::{EntityKey, FloorplanScene, NodeKey, RegisteredEntity};
use std::fmt;
use std::str::FromStr;

/// How a marquee rectangle matches an entity's projected bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarqueeMode {
    /// Any overlap with the rectangle
    #[default]
    Intersection,
    /// Projected bounds entirely inside the rectangle
    Containment,
}

impl MarqueeMode {
    pub fn toggled(self) -> Self {
        match self {
            MarqueeMode::Intersection => MarqueeMode::Containment,
            MarqueeMode::Containment => MarqueeMode::Intersection,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarqueeMode::Intersection => "intersection",
            MarqueeMode::Containment => "containment",
        }
    }
}

impl fmt::Display for MarqueeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarqueeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intersection" | "intersect" => Ok(MarqueeMode::Intersection),
            "containment" | "contain" => Ok(MarqueeMode::Containment),
            other => Err(format!("unknown marquee mode '{}'", other)),
        }
    }
}

/// Nearest entity under a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub entity: EntityKey,
    pub node: NodeKey,
    pub distance: f64,
    pub point: Point3<f64>,
}

/// Cast a ray against every visible registered node and keep the nearest hit
pub fn pick<F>(scene: &FloorplanScene, ray: &Ray, mut accept: F) -> Option<PickHit>
where
    F: FnMut(&RegisteredEntity) -> bool,
{
    let graph = scene.graph();
    let registry = scene.registry();
    let mut best: Option<PickHit> = None;

    for (node, _) in graph.drawables() {
        if !graph.is_effectively_visible(node) {
            continue;
        }
        let Some(entity) = registry.key_for_node(node) else {
            continue;
        };
        let Some(record) = registry.get(entity) else {
            continue;
        };
        if !accept(record) {
            continue;
        }

        // Cheap box rejection before the triangle pass
        let Some(bounds) = graph.world_aabb(node) else {
            continue;
        };
        match ray.intersect_aabb(&bounds) {
            Some(t) if best.map_or(true, |b| t <= b.distance) => {}
            _ => continue,
        }

        let Some(mesh) = graph.world_mesh(node) else {
            continue;
        };
        if let Some(hit) = ray.intersect_mesh(&mesh) {
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(PickHit {
                    entity,
                    node,
                    distance: hit.distance,
                    point: hit.point,
                });
            }
        }
    }

    best
}

/// World bounds of every visible node of an entity
pub fn visible_bounds(scene: &FloorplanScene, entity: &RegisteredEntity) -> Option<Aabb> {
    let graph = scene.graph();
    entity
        .nodes
        .iter()
        .filter(|&&n| graph.is_effectively_visible(n))
        .filter_map(|&n| graph.world_aabb(n))
        .reduce(|a, b| a.union(&b))
}

/// Whether the user can currently see an entity
///
/// Entities without geometry (plain openings, fully penetrated plates) follow
/// the visibility of their floor group.
pub fn is_entity_visible(scene: &FloorplanScene, entity: &RegisteredEntity) -> bool {
    let graph = scene.graph();
    if entity.nodes.is_empty() {
        return scene
            .floor(&entity.id.floor)
            .map_or(false, |floor| graph.is_effectively_visible(floor.group));
    }
    entity.nodes.iter().any(|&n| graph.is_effectively_visible(n))
}

/// Entities whose projected bounds match the rectangle, in id order
pub fn marquee<F>(
    scene: &FloorplanScene,
    camera: &Camera,
    viewport: &Viewport,
    rect: &ScreenRect,
    mode: MarqueeMode,
    mut accept: F,
) -> Vec<EntityKey>
where
    F: FnMut(&RegisteredEntity) -> bool,
{
    let mut matched: Vec<(EntityKey, &RegisteredEntity)> = scene
        .registry()
        .iter()
        .filter(|(_, entity)| accept(*entity))
        .filter(|(_, entity)| {
            let Some(bounds) = visible_bounds(scene, *entity) else {
                return false;
            };
            let Some(projected) = camera.project_aabb(&bounds, viewport) else {
                return false;
            };
            match mode {
                MarqueeMode::Intersection => rect.intersects(&projected),
                MarqueeMode::Containment => rect.contains_rect(&projected),
            }
        })
        .collect();
    matched.sort_by(|a, b| a.1.id.cmp(&b.1.id));
    matched.into_iter().map(|(key, _)| key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_geometry::Vector3;
    use floorplan_model::SceneDescription;
    use floorplan_scene::{EntityId, EntityKind};

    fn scene() -> FloorplanScene {
        let json = r#"{"floors": [{"id": "g", "height": 3, "rooms": [
            {"name": "A", "x": 0, "z": 0, "width": 4, "depth": 4,
             "walls": [{"direction": "right"}]},
            {"name": "B", "x": 4, "z": 0, "width": 4, "depth": 4}
        ]}]}"#;
        let description = SceneDescription::from_json(json).unwrap();
        FloorplanScene::from_description(&description).unwrap().0
    }

    #[test]
    fn test_pick_nearest_entity() {
        let scene = scene();
        let ray = Ray::new(Point3::new(2.0, 10.0, 2.0), -Vector3::y()).unwrap();
        let hit = pick(&scene, &ray, |_| true).unwrap();
        let entity = scene.registry().get(hit.entity).unwrap();
        assert_eq!(entity.id, EntityId::room("g", "A"));

        // The wall stands in front of the plate when looking down near x = 4
        let ray = Ray::new(Point3::new(3.95, 10.0, 2.0), -Vector3::y()).unwrap();
        let hit = pick(&scene, &ray, |_| true).unwrap();
        assert_eq!(scene.registry().get(hit.entity).unwrap().kind(), EntityKind::Wall);
    }

    #[test]
    fn test_pick_respects_filter_and_visibility() {
        let mut scene = scene();
        let ray = Ray::new(Point3::new(3.95, 10.0, 2.0), -Vector3::y()).unwrap();
        let hit = pick(&scene, &ray, |e| e.kind() == EntityKind::Room).unwrap();
        assert_eq!(scene.registry().get(hit.entity).unwrap().kind(), EntityKind::Room);

        scene.set_floor_visible("g", false).unwrap();
        assert!(pick(&scene, &ray, |_| true).is_none());
    }

    #[test]
    fn test_marquee_mode_parse() {
        assert_eq!("Containment".parse::<MarqueeMode>(), Ok(MarqueeMode::Containment));
        assert!("lasso".parse::<MarqueeMode>().is_err());
        assert_eq!(MarqueeMode::Intersection.toggled(), MarqueeMode::Containment);
    }
}
