// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length units and built-in dimensional defaults
//!
//! Scene geometry is expressed in the unit the description declares. Built-in
//! defaults are stored in meters and converted on lookup.

use serde::{Deserialize, Serialize};

/// Built-in storey height (meters)
pub const DEFAULT_HEIGHT_M: f64 = 3.0;
/// Built-in wall thickness (meters)
pub const DEFAULT_WALL_THICKNESS_M: f64 = 0.2;
/// Built-in floor plate thickness (meters)
pub const DEFAULT_FLOOR_THICKNESS_M: f64 = 0.2;
/// Largest gap inserted between floors at exploded factor 1.0 (meters)
pub const DEFAULT_MAX_SEPARATION_M: f64 = 5.0;

pub const DEFAULT_DOOR_WIDTH_M: f64 = 1.0;
pub const DEFAULT_DOOR_HEIGHT_M: f64 = 2.1;
pub const DEFAULT_WINDOW_WIDTH_M: f64 = 1.2;
pub const DEFAULT_WINDOW_HEIGHT_M: f64 = 1.2;
pub const DEFAULT_WINDOW_SILL_M: f64 = 0.9;
/// Rise of a single stair step (meters)
pub const DEFAULT_STEP_RISE_M: f64 = 0.18;
/// Upper bound on the number of steps in one stair run
pub const MAX_STAIR_STEPS: u32 = 500;

/// Length unit of a scene description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "in")]
    Inches,
}

impl LengthUnit {
    /// Meters per one unit
    #[inline]
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            LengthUnit::Meters => 1.0,
            LengthUnit::Centimeters => 0.01,
            LengthUnit::Millimeters => 0.001,
            LengthUnit::Feet => 0.3048,
            LengthUnit::Inches => 0.0254,
        }
    }

    /// Convert a value in meters into this unit
    #[inline]
    pub fn from_meters(&self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }

    /// Convert a value in this unit into meters
    #[inline]
    pub fn to_meters(&self, value: f64) -> f64 {
        value * self.meters_per_unit()
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
        }
    }

    /// Format a length for display with a precision suited to the unit
    pub fn format(&self, value: f64) -> String {
        match self {
            LengthUnit::Millimeters => format!("{:.0} {}", value, self.symbol()),
            LengthUnit::Centimeters | LengthUnit::Inches => {
                format!("{:.1} {}", value, self.symbol())
            }
            LengthUnit::Meters | LengthUnit::Feet => format!("{:.2} {}", value, self.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_conversion_round_trip() {
        let feet = LengthUnit::Feet;
        assert_relative_eq!(feet.from_meters(0.3048), 1.0, epsilon = 1e-12);
        assert_relative_eq!(feet.to_meters(10.0), 3.048, epsilon = 1e-12);
        assert_relative_eq!(LengthUnit::Centimeters.from_meters(DEFAULT_HEIGHT_M), 300.0);
    }

    #[test]
    fn test_format() {
        assert_eq!(LengthUnit::Meters.format(4.0), "4.00 m");
        assert_eq!(LengthUnit::Millimeters.format(2100.0), "2100 mm");
        assert_eq!(LengthUnit::Centimeters.format(12.34), "12.3 cm");
    }

    #[test]
    fn test_serde_symbols() {
        let unit: LengthUnit = serde_json::from_str("\"ft\"").unwrap();
        assert_eq!(unit, LengthUnit::Feet);
        assert_eq!(serde_json::to_string(&LengthUnit::Meters).unwrap(), "\"m\"");
    }
}
