// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared base materials and highlight overlays
//!
//! Identically styled surfaces share one base material. Highlighting never
//! writes to a base material; it is composed on a copy when a consumer asks
//! for the effective material of a highlighted node.

use crate::keys::MaterialKey;
use floorplan_model::{Color, Style};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

/// What a surface represents, used to pick a colour from a style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceRole {
    Floor,
    /// Wall face looking into the room that declares it
    WallInterior,
    /// Wall face looking away from any room
    WallExterior,
    Stair,
    Lift,
    DoorLeaf,
    Glass,
}

impl SurfaceRole {
    fn suffix(&self) -> &'static str {
        match self {
            SurfaceRole::Floor => "floor",
            SurfaceRole::WallInterior => "wall",
            SurfaceRole::WallExterior => "exterior",
            SurfaceRole::Stair => "stair",
            SurfaceRole::Lift => "lift",
            SurfaceRole::DoorLeaf => "door",
            SurfaceRole::Glass => "glass",
        }
    }
}

/// Renderable surface parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub emissive: Color,
    /// Edge outline colour, drawn by the consumer when present
    pub outline: Option<Color>,
}

impl Material {
    /// Material for one surface role of a resolved style
    pub fn for_surface(style: &Style, role: SurfaceRole) -> Self {
        let (color, opacity, roughness) = match role {
            SurfaceRole::Floor => (style.floor_color, style.opacity, style.roughness),
            SurfaceRole::WallInterior => (style.wall_color, style.opacity, style.roughness),
            SurfaceRole::WallExterior => (style.exterior_color, style.opacity, style.roughness),
            SurfaceRole::Stair => (
                style.floor_color.mix(Color::rgb(0.0, 0.0, 0.0), 0.15),
                style.opacity,
                style.roughness,
            ),
            SurfaceRole::Lift => (
                style.wall_color.mix(Color::rgb(0.5, 0.5, 0.55), 0.5),
                style.opacity,
                0.4,
            ),
            SurfaceRole::DoorLeaf => (Color::rgb(0.545, 0.412, 0.078), 1.0, 0.7),
            SurfaceRole::Glass => (Color::rgb(0.678, 0.847, 0.902), 0.35, 0.05),
        };
        Self {
            name: format!("{}:{}", style.name, role.suffix()),
            color,
            roughness,
            metalness: style.metalness,
            opacity,
            emissive: Color::rgb(0.0, 0.0, 0.0),
            outline: None,
        }
    }
}

/// Visual treatment applied on top of a base material
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    /// Colour blended into the base colour
    pub tint: Color,
    /// Blend factor 0..1
    pub tint_strength: f32,
    pub emissive: Color,
    pub outline: Option<Color>,
}

impl HighlightStyle {
    /// Committed-selection look: orange outline with a warm emissive tint
    pub fn selection() -> Self {
        Self {
            tint: Color::rgb(1.0, 0.596, 0.0),
            tint_strength: 0.35,
            emissive: Color::rgb(0.35, 0.2, 0.0),
            outline: Some(Color::rgb(1.0, 0.596, 0.0)),
        }
    }

    /// Preview look: cool blue tint without an outline
    pub fn preview() -> Self {
        Self {
            tint: Color::rgb(0.259, 0.647, 0.961),
            tint_strength: 0.25,
            emissive: Color::rgb(0.05, 0.15, 0.3),
            outline: None,
        }
    }

    /// Compose this overlay onto a copy of a base material
    pub fn apply(&self, base: &Material) -> Material {
        Material {
            name: base.name.clone(),
            color: base.color.mix(self.tint, self.tint_strength),
            emissive: self.emissive,
            outline: self.outline.or(base.outline),
            ..base.clone()
        }
    }
}

/// Arena of shared base materials, deduplicated by name
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: SlotMap<MaterialKey, Material>,
    by_name: FxHashMap<String, MaterialKey>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a material unless one with the same name exists
    pub fn get_or_insert(&mut self, material: Material) -> MaterialKey {
        if let Some(&key) = self.by_name.get(&material.name) {
            return key;
        }
        let name = material.name.clone();
        let key = self.materials.insert(material);
        self.by_name.insert(name, key);
        key
    }

    /// Shared material for one surface role of a style
    pub fn surface(&mut self, style: &Style, role: SurfaceRole) -> MaterialKey {
        let name = format!("{}:{}", style.name, role.suffix());
        if let Some(&key) = self.by_name.get(&name) {
            return key;
        }
        self.get_or_insert(Material::for_surface(style, role))
    }

    pub fn get(&self, key: MaterialKey) -> Option<&Material> {
        self.materials.get(key)
    }

    pub fn by_name(&self, name: &str) -> Option<MaterialKey> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn clear(&mut self) {
        self.materials.clear();
        self.by_name.clear();
    }
}
