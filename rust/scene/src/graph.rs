// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph arena
//!
//! A tree of group and drawable nodes stored in a [`SlotMap`]. Transforms are
//! translation-only: floor groups move along Y when floors are restacked and
//! everything below them follows. Primitive meshes stay in node-local space and
//! are never touched by restacking.

use crate::keys::{MaterialKey, NodeKey};
use crate::material::{HighlightStyle, Material, MaterialLibrary, SurfaceRole};
use floorplan_geometry::{Aabb, Mesh, Vector3};
use slotmap::SlotMap;

/// A mesh drawn with one base material
#[derive(Debug, Clone)]
pub struct Primitive {
    pub mesh: Mesh,
    pub material: MaterialKey,
    pub role: SurfaceRole,
}

/// Highlight overlay state of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeHighlight {
    pub selected: bool,
    pub preview: bool,
}

impl NodeHighlight {
    #[inline]
    pub fn is_none(&self) -> bool {
        !self.selected && !self.preview
    }
}

/// Node of the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub translation: Vector3<f64>,
    pub visible: bool,
    pub primitives: Vec<Primitive>,
    pub highlight: NodeHighlight,
}

impl SceneNode {
    fn new(name: impl Into<String>, parent: Option<NodeKey>) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            translation: Vector3::zeros(),
            visible: true,
            primitives: Vec::new(),
            highlight: NodeHighlight::default(),
        }
    }

    /// Drawable nodes carry at least one primitive
    #[inline]
    pub fn is_drawable(&self) -> bool {
        !self.primitives.is_empty()
    }
}

/// Hierarchical, renderable scene
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
    materials: MaterialLibrary,
    selection_style: HighlightStyle,
    preview_style: HighlightStyle,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new("scene", None));
        Self {
            nodes,
            root,
            materials: MaterialLibrary::new(),
            selection_style: HighlightStyle::selection(),
            preview_style: HighlightStyle::preview(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter()
    }

    /// Nodes that carry geometry
    pub fn drawables(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> {
        self.nodes.iter().filter(|(_, n)| n.is_drawable())
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub(crate) fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    /// Drop every node except the root, and all materials
    pub(crate) fn clear(&mut self) {
        let root = self.root;
        self.nodes.retain(|key, _| key == root);
        if let Some(root) = self.nodes.get_mut(root) {
            root.children.clear();
            root.primitives.clear();
            root.translation = Vector3::zeros();
            root.visible = true;
            root.highlight = NodeHighlight::default();
        }
        self.materials.clear();
    }

    /// Add an empty group node; a stale parent falls back to the root
    pub(crate) fn add_group(&mut self, parent: NodeKey, name: impl Into<String>) -> NodeKey {
        self.add_node(parent, name, Vec::new())
    }

    pub(crate) fn add_drawable(
        &mut self,
        parent: NodeKey,
        name: impl Into<String>,
        primitives: Vec<Primitive>,
    ) -> NodeKey {
        self.add_node(parent, name, primitives)
    }

    fn add_node(
        &mut self,
        parent: NodeKey,
        name: impl Into<String>,
        primitives: Vec<Primitive>,
    ) -> NodeKey {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            self.root
        };
        let mut node = SceneNode::new(name, Some(parent));
        node.primitives = primitives;
        let key = self.nodes.insert(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(key);
        }
        key
    }

    /// Set a node's translation; returns false for a stale key
    pub(crate) fn set_translation(&mut self, key: NodeKey, translation: Vector3<f64>) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                node.translation = translation;
                true
            }
            None => false,
        }
    }

    /// Accumulated translation from the root down to this node
    pub fn world_translation(&self, key: NodeKey) -> Vector3<f64> {
        let mut offset = Vector3::zeros();
        let mut current = Some(key);
        while let Some(k) = current {
            match self.nodes.get(k) {
                Some(node) => {
                    offset += node.translation;
                    current = node.parent;
                }
                None => break,
            }
        }
        offset
    }

    pub fn set_visible(&mut self, key: NodeKey, visible: bool) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Visible only if the node and every ancestor are visible
    pub fn is_effectively_visible(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            match self.nodes.get(k) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Node geometry merged and moved into world space
    pub fn world_mesh(&self, key: NodeKey) -> Option<Mesh> {
        let node = self.nodes.get(key)?;
        if !node.is_drawable() {
            return None;
        }
        let mut mesh = Mesh::new();
        for primitive in &node.primitives {
            mesh.merge(&primitive.mesh);
        }
        mesh.translate(self.world_translation(key));
        Some(mesh)
    }

    /// World-space bounds of a node's own primitives
    pub fn world_aabb(&self, key: NodeKey) -> Option<Aabb> {
        let node = self.nodes.get(key)?;
        let local = node
            .primitives
            .iter()
            .filter_map(|p| p.mesh.aabb())
            .reduce(|a, b| a.union(&b))?;
        Some(local.translated(self.world_translation(key)))
    }

    pub fn set_selected(&mut self, key: NodeKey, selected: bool) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.highlight.selected = selected;
        }
    }

    pub fn set_previewed(&mut self, key: NodeKey, preview: bool) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.highlight.preview = preview;
        }
    }

    /// Reset every highlight overlay
    pub fn clear_highlights(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            node.highlight = NodeHighlight::default();
        }
    }

    pub fn selection_style(&self) -> &HighlightStyle {
        &self.selection_style
    }

    pub fn set_selection_style(&mut self, style: HighlightStyle) {
        self.selection_style = style;
    }

    pub fn preview_style(&self) -> &HighlightStyle {
        &self.preview_style
    }

    pub fn set_preview_style(&mut self, style: HighlightStyle) {
        self.preview_style = style;
    }

    /// Material a renderer should use for one primitive of a node
    ///
    /// Selection wins over preview. The shared base material is never modified.
    pub fn effective_material(&self, key: NodeKey, primitive: usize) -> Option<Material> {
        let node = self.nodes.get(key)?;
        let base = self.materials.get(node.primitives.get(primitive)?.material)?;
        Some(if node.highlight.selected {
            self.selection_style.apply(base)
        } else if node.highlight.preview {
            self.preview_style.apply(base)
        } else {
            base.clone()
        })
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
