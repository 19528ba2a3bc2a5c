// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Global scene configuration and height resolution

use crate::units::{
    LengthUnit, DEFAULT_FLOOR_THICKNESS_M, DEFAULT_HEIGHT_M, DEFAULT_MAX_SEPARATION_M,
    DEFAULT_WALL_THICKNESS_M,
};
use serde::{Deserialize, Serialize};

/// Colour theme used when no style applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Blueprint,
}

/// Global defaults declared by the scene description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Default storey height in scene units
    pub default_height: Option<f64>,
    /// Wall slab thickness in scene units
    pub wall_thickness: Option<f64>,
    /// Floor plate thickness in scene units
    pub floor_thickness: Option<f64>,
    pub unit: LengthUnit,
    pub theme: Theme,
    /// Style applied to rooms without an explicit style
    pub default_style: Option<String>,
    /// Gap between floors at exploded factor 1.0, in scene units
    pub max_exploded_separation: Option<f64>,
}

impl Config {
    /// Config default height, falling back to the built-in constant
    #[inline]
    pub fn default_height(&self) -> f64 {
        self.default_height
            .unwrap_or_else(|| self.unit.from_meters(DEFAULT_HEIGHT_M))
    }

    #[inline]
    pub fn wall_thickness(&self) -> f64 {
        self.wall_thickness
            .unwrap_or_else(|| self.unit.from_meters(DEFAULT_WALL_THICKNESS_M))
    }

    #[inline]
    pub fn floor_thickness(&self) -> f64 {
        self.floor_thickness
            .unwrap_or_else(|| self.unit.from_meters(DEFAULT_FLOOR_THICKNESS_M))
    }

    #[inline]
    pub fn max_exploded_separation(&self) -> f64 {
        self.max_exploded_separation
            .unwrap_or_else(|| self.unit.from_meters(DEFAULT_MAX_SEPARATION_M))
    }

    /// Convert a built-in metric default into scene units
    #[inline]
    pub fn metric(&self, meters: f64) -> f64 {
        self.unit.from_meters(meters)
    }
}

/// Resolve an effective height: room > floor > config > built-in constant
///
/// Used for wall heights, penetration heights and annotation defaults alike so
/// every consumer agrees on the same number.
#[inline]
pub fn resolve_height(room: Option<f64>, floor: Option<f64>, config: &Config) -> f64 {
    room.or(floor).unwrap_or_else(|| config.default_height())
}
