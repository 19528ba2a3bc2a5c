// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ export of the visible scene

use crate::builder::FloorplanScene;
use std::io::{self, Write};

/// Counts written by [`write_obj`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjStats {
    pub objects: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Write every effectively visible registered entity as one `o` object in world space
///
/// Entities are written in id order so the output is stable across rebuilds.
pub fn write_obj<W: Write>(scene: &FloorplanScene, out: &mut W) -> io::Result<ObjStats> {
    let graph = scene.graph();
    let registry = scene.registry();
    let mut stats = ObjStats::default();

    let mut entities: Vec<_> = registry.iter().map(|(_, e)| e).collect();
    entities.sort_by(|a, b| a.id.cmp(&b.id));

    writeln!(out, "# floorplan scene, unit {}", scene.unit().symbol())?;
    for entity in entities {
        let meshes: Vec<_> = entity
            .nodes
            .iter()
            .filter(|&&node| graph.is_effectively_visible(node))
            .filter_map(|&node| graph.world_mesh(node))
            .collect();
        if meshes.is_empty() {
            continue;
        }

        writeln!(out, "o {}", entity.id)?;
        stats.objects += 1;
        for mesh in meshes {
            // OBJ indices are 1-based and global across objects
            let base = stats.vertices + 1;
            for i in 0..mesh.vertex_count() {
                let p = mesh.position(i);
                writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
            }
            for tri in mesh.indices.chunks_exact(3) {
                writeln!(
                    out,
                    "f {} {} {}",
                    base + tri[0] as usize,
                    base + tri[1] as usize,
                    base + tri[2] as usize
                )?;
            }
            stats.vertices += mesh.vertex_count();
            stats.triangles += mesh.triangle_count();
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_model::{Floor, Room, SceneDescription};

    #[test]
    fn test_hidden_floor_is_not_exported() {
        let description = SceneDescription {
            floors: vec![
                Floor {
                    id: "ground".into(),
                    rooms: vec![Room {
                        name: "A".into(),
                        width: 4.0,
                        depth: 4.0,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                Floor {
                    id: "first".into(),
                    rooms: vec![Room {
                        name: "B".into(),
                        width: 4.0,
                        depth: 4.0,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let (mut scene, _) = FloorplanScene::from_description(&description).unwrap();

        let mut all = Vec::new();
        let stats = write_obj(&scene, &mut all).unwrap();
        assert_eq!(stats.objects, 2);

        scene.set_floor_visible("first", false).unwrap();
        let mut visible = Vec::new();
        let stats = write_obj(&scene, &mut visible).unwrap();
        assert_eq!(stats.objects, 1);
        let text = String::from_utf8(visible).unwrap();
        assert!(text.contains("o room:ground/A"));
        assert!(!text.contains("first"));
        assert!(text.lines().any(|l| l.starts_with("f 1 ")));
    }
}
