// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named material parameter sets and their resolution
//!
//! A room's style is resolved in priority order: explicit room style, then the
//! config default style, then the theme default. Style lookup itself goes through
//! the [`StyleResolver`] trait so the surrounding application can supply its own
//! catalogue; [`StyleCatalog`] is the implementation built from the description.

use crate::config::{Config, Theme};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Linear RGBA colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b, 1.0])
    }

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| -> Option<f32> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }

    #[inline]
    pub fn r(&self) -> f32 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> f32 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> f32 {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> f32 {
        self.0[3]
    }

    /// Blend towards another colour by `t` (0 = self, 1 = other), alpha untouched
    pub fn mix(&self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color([
            self.r() + (other.r() - self.r()) * t,
            self.g() + (other.g() - self.g()) * t,
            self.b() + (other.b() - self.b()) * t,
            self.a(),
        ])
    }
}

/// Style as declared in the scene description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    pub name: String,
    #[serde(default)]
    pub floor_color: Option<String>,
    #[serde(default)]
    pub wall_color: Option<String>,
    #[serde(default)]
    pub exterior_color: Option<String>,
    #[serde(default)]
    pub roughness: Option<f32>,
    #[serde(default)]
    pub metalness: Option<f32>,
    #[serde(default)]
    pub opacity: Option<f32>,
}

/// Fully resolved visual parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: String,
    pub floor_color: Color,
    pub wall_color: Color,
    pub exterior_color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
}

impl Style {
    /// Default style of a theme
    pub fn theme_default(theme: Theme) -> Self {
        let (name, floor, wall, exterior) = match theme {
            Theme::Light => (
                "theme:light",
                Color::rgb(0.878, 0.839, 0.784),
                Color::rgb(0.961, 0.957, 0.941),
                Color::rgb(0.851, 0.831, 0.800),
            ),
            Theme::Dark => (
                "theme:dark",
                Color::rgb(0.227, 0.227, 0.251),
                Color::rgb(0.353, 0.353, 0.388),
                Color::rgb(0.290, 0.290, 0.322),
            ),
            Theme::Blueprint => (
                "theme:blueprint",
                Color::rgb(0.118, 0.227, 0.373),
                Color::rgb(0.910, 0.941, 1.0),
                Color::rgb(0.616, 0.706, 0.839),
            ),
        };
        Self {
            name: name.to_string(),
            floor_color: floor,
            wall_color: wall,
            exterior_color: exterior,
            roughness: 0.8,
            metalness: 0.0,
            opacity: 1.0,
        }
    }

    /// Overlay a definition on top of a base style; unparseable colours keep the base value
    pub fn from_definition(definition: &StyleDefinition, base: &Style) -> Self {
        let color = |value: &Option<String>, fallback: Color| {
            value
                .as_deref()
                .and_then(Color::from_hex)
                .unwrap_or(fallback)
        };
        let wall_color = color(&definition.wall_color, base.wall_color);
        Self {
            name: definition.name.clone(),
            floor_color: color(&definition.floor_color, base.floor_color),
            wall_color,
            // Exterior faces default to the declared wall colour rather than the theme
            exterior_color: color(
                &definition.exterior_color,
                if definition.wall_color.is_some() {
                    wall_color
                } else {
                    base.exterior_color
                },
            ),
            roughness: definition.roughness.unwrap_or(base.roughness).clamp(0.0, 1.0),
            metalness: definition.metalness.unwrap_or(base.metalness).clamp(0.0, 1.0),
            opacity: definition.opacity.unwrap_or(base.opacity).clamp(0.0, 1.0),
        }
    }
}

/// Lookup of named styles, supplied by the surrounding application
pub trait StyleResolver {
    fn lookup(&self, name: &str) -> Option<Style>;
}

/// Where a resolved style came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSource {
    Room,
    ConfigDefault,
    Theme,
}

/// Outcome of style resolution for one room
#[derive(Debug, Clone)]
pub struct StyleResolution {
    pub style: Style,
    pub source: StyleSource,
    /// Style names that were requested but not found, in priority order
    pub missing: Vec<String>,
}

/// Resolve a room's style: explicit room style > config default style > theme default
pub fn resolve_style<R: StyleResolver + ?Sized>(
    resolver: &R,
    room_style: Option<&str>,
    config: &Config,
) -> StyleResolution {
    let mut missing = Vec::new();

    if let Some(name) = room_style {
        match resolver.lookup(name) {
            Some(style) => {
                return StyleResolution {
                    style,
                    source: StyleSource::Room,
                    missing,
                }
            }
            None => missing.push(name.to_string()),
        }
    }

    if let Some(name) = config.default_style.as_deref() {
        match resolver.lookup(name) {
            Some(style) => {
                return StyleResolution {
                    style,
                    source: StyleSource::ConfigDefault,
                    missing,
                }
            }
            None => missing.push(name.to_string()),
        }
    }

    StyleResolution {
        style: Style::theme_default(config.theme),
        source: StyleSource::Theme,
        missing,
    }
}

/// Style catalogue built from the description's style definitions
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: FxHashMap<String, Style>,
}

impl StyleCatalog {
    /// Build a catalogue; definitions inherit unspecified values from the theme
    pub fn from_definitions(definitions: &[StyleDefinition], theme: Theme) -> Self {
        let base = Style::theme_default(theme);
        let styles = definitions
            .iter()
            .map(|def| (def.name.clone(), Style::from_definition(def, &base)))
            .collect();
        Self { styles }
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl StyleResolver for StyleCatalog {
    fn lookup(&self, name: &str) -> Option<Style> {
        self.styles.get(name).cloned()
    }
}
