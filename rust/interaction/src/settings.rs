// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer settings loaded from environment variables.

use crate::picking::MarqueeMode;
use floorplan_scene::HighlightStyle;
use std::time::Duration;

/// Runtime settings of the interactive core.
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    /// Delay between the last cursor move and editor-to-scene selection.
    pub cursor_debounce: Duration,
    /// How long a sync direction lock is held before it releases itself.
    pub sync_lock_timeout: Duration,
    /// How long the reveal flash stays in the editor.
    pub flash_timeout: Duration,
    /// Pointer travel in pixels before a press becomes a marquee drag.
    pub drag_threshold_px: f64,
    /// Marquee mode used until toggled.
    pub marquee_mode: MarqueeMode,
    pub selection_style: HighlightStyle,
    pub preview_style: HighlightStyle,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            cursor_debounce: Duration::from_millis(100),
            sync_lock_timeout: Duration::from_millis(200),
            flash_timeout: Duration::from_millis(3000),
            drag_threshold_px: 4.0,
            marquee_mode: MarqueeMode::Intersection,
            selection_style: HighlightStyle::selection(),
            preview_style: HighlightStyle::preview(),
        }
    }
}

impl ViewerSettings {
    /// Load settings from `FLOORPLAN_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cursor_debounce: env_millis("FLOORPLAN_CURSOR_DEBOUNCE_MS")
                .unwrap_or(defaults.cursor_debounce),
            sync_lock_timeout: env_millis("FLOORPLAN_SYNC_LOCK_MS")
                .unwrap_or(defaults.sync_lock_timeout),
            flash_timeout: env_millis("FLOORPLAN_FLASH_MS").unwrap_or(defaults.flash_timeout),
            drag_threshold_px: std::env::var("FLOORPLAN_DRAG_THRESHOLD_PX")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.drag_threshold_px),
            marquee_mode: std::env::var("FLOORPLAN_MARQUEE_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.marquee_mode),
            ..defaults
        }
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.cursor_debounce, Duration::from_millis(100));
        assert_eq!(settings.sync_lock_timeout, Duration::from_millis(200));
        assert_eq!(settings.flash_timeout, Duration::from_millis(3000));
        assert_eq!(settings.marquee_mode, MarqueeMode::Intersection);
    }

    #[test]
    fn test_env_override_and_fallback() {
        std::env::set_var("FLOORPLAN_SYNC_LOCK_MS", "350");
        std::env::set_var("FLOORPLAN_FLASH_MS", "not a number");
        std::env::set_var("FLOORPLAN_MARQUEE_MODE", "containment");
        let settings = ViewerSettings::from_env();
        std::env::remove_var("FLOORPLAN_SYNC_LOCK_MS");
        std::env::remove_var("FLOORPLAN_FLASH_MS");
        std::env::remove_var("FLOORPLAN_MARQUEE_MODE");

        assert_eq!(settings.sync_lock_timeout, Duration::from_millis(350));
        assert_eq!(settings.flash_timeout, Duration::from_millis(3000));
        assert_eq!(settings.marquee_mode, MarqueeMode::Containment);
    }
}
