// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projection of the selection and preview sets onto node highlight overlays

use floorplan_scene::{EntityId, FloorplanScene, HighlightStyle};

/// Rewrite every node overlay from the given sets
///
/// Overlays live on nodes, never on shared materials, so unhighlighting an
/// entity cannot leak into others that use the same material.
pub fn reconcile_highlights(scene: &mut FloorplanScene, selected: &[EntityId], preview: &[EntityId]) {
    let mut nodes_selected = Vec::new();
    let mut nodes_previewed = Vec::new();
    {
        let registry = scene.registry();
        for id in selected {
            if let Some(entity) = registry.find(id) {
                nodes_selected.extend(entity.nodes.iter().copied());
            }
        }
        for id in preview {
            if let Some(entity) = registry.find(id) {
                nodes_previewed.extend(entity.nodes.iter().copied());
            }
        }
    }

    let graph = scene.graph_mut();
    graph.clear_highlights();
    for node in nodes_selected {
        graph.set_selected(node, true);
    }
    for node in nodes_previewed {
        graph.set_previewed(node, true);
    }
}

/// Install the overlay styles used for selection and preview
pub fn set_highlight_styles(
    scene: &mut FloorplanScene,
    selection: HighlightStyle,
    preview: HighlightStyle,
) {
    let graph = scene.graph_mut();
    graph.set_selection_style(selection);
    graph.set_preview_style(preview);
}
