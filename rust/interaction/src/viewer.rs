// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer orchestrator
//!
//! Wires the scene, the Selection Manager and the Sync Bridge together and
//! exposes the three trigger classes of the interactive core: input events,
//! text-surface events and the per-frame tick. Every entry point runs to
//! completion synchronously; timers are driven by the `now` passed in.

use crate::camera::{Camera, Viewport};
use crate::error::{MutationError, Result};
use crate::highlight::{reconcile_highlights, set_highlight_styles};
use crate::mutation::{apply_property_edit, DeclarationFormatter, PropertyEdit, TextPatch};
use crate::picking::MarqueeMode;
use crate::selection::{Modifiers, SelectMode, SelectionManager, SelectionOrigin};
use crate::settings::ViewerSettings;
use crate::sync::{SyncBridge, TextSurface};
use floorplan_geometry::{Point2, Point3};
use floorplan_model::{SceneDescription, SourceRange, StyleCatalog, TextPosition};
use floorplan_scene::{BuildReport, EntityId, FloorplanScene, HighlightStyle};
use std::time::Instant;

/// Keyboard commands understood by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    /// Enable or disable interactive selection
    ToggleSelection,
    /// Switch between intersection and containment marquee
    ToggleMarqueeMode,
    /// Abort a drag, or clear the selection when idle
    Escape,
}

pub struct Viewer<S: TextSurface> {
    scene: FloorplanScene,
    selection: SelectionManager,
    bridge: SyncBridge<S>,
    camera: Camera,
    viewport: Viewport,
    report: BuildReport,
}

impl<S: TextSurface> Viewer<S> {
    /// Empty viewer talking to `surface`
    pub fn new(surface: S, settings: ViewerSettings) -> Self {
        let mut scene = FloorplanScene::new();
        set_highlight_styles(
            &mut scene,
            settings.selection_style.clone(),
            settings.preview_style.clone(),
        );
        Self {
            scene,
            selection: SelectionManager::new(&settings),
            bridge: SyncBridge::new(surface, &settings),
            camera: Camera::perspective(Point3::new(15.0, 20.0, 15.0), Point3::origin(), 50.0),
            viewport: Viewport::new(800.0, 600.0),
            report: BuildReport::default(),
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn scene(&self) -> &FloorplanScene {
        &self.scene
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Listener registration and selectable-kind filters
    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    pub fn bridge(&self) -> &SyncBridge<S> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut SyncBridge<S> {
        &mut self.bridge
    }

    pub fn surface(&self) -> &S {
        self.bridge.surface()
    }

    /// Report of the last successful load
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.selection.cancel_gesture();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.selection.cancel_gesture();
    }

    // -- loading ------------------------------------------------------------

    /// Replace the scene
    ///
    /// An invalid description is rejected before anything is torn down. On
    /// success the old selection is cleared first, then the scene is rebuilt
    /// and the entity-location index refreshed.
    pub fn load(&mut self, description: &SceneDescription, now: Instant) -> Result<&BuildReport> {
        description.validate()?;

        self.selection.reset();
        let catalog = StyleCatalog::from_definitions(&description.styles, description.config.theme);
        self.report = self.scene.rebuild(description, &catalog)?;
        self.bridge.update_entity_locations(self.scene.registry());

        self.pump(now);
        self.reconcile();
        Ok(&self.report)
    }

    /// Parse and load a description; a parse failure keeps the current scene
    pub fn load_json(&mut self, json: &str, now: Instant) -> Result<&BuildReport> {
        match SceneDescription::from_json(json) {
            Ok(description) => self.load(&description, now),
            Err(e) => {
                self.on_parse_failed();
                Err(e.into())
            }
        }
    }

    /// The host could not parse its text; geometry and index stay as they were
    pub fn on_parse_failed(&mut self) {
        self.bridge.on_parse_failed();
    }

    // -- pointer and keyboard -----------------------------------------------

    pub fn pointer_down(&mut self, position: Point2<f64>, modifiers: Modifiers) {
        self.selection.pointer_down(position, modifiers);
    }

    pub fn pointer_move(&mut self, position: Point2<f64>) {
        self.selection.pointer_move(position);
    }

    /// Finish a click or marquee; returns true when the selection changed
    pub fn pointer_up(&mut self, position: Point2<f64>, now: Instant) -> bool {
        let changed =
            self.selection
                .pointer_up(position, &self.scene, &self.camera, &self.viewport);
        self.pump(now);
        self.reconcile();
        changed
    }

    pub fn key_pressed(&mut self, key: ViewerKey, now: Instant) {
        match key {
            ViewerKey::ToggleSelection => self.selection.toggle_enabled(),
            ViewerKey::ToggleMarqueeMode => {
                let mode = self.selection.toggle_marquee_mode();
                tracing::debug!(%mode, "marquee mode");
            }
            ViewerKey::Escape => {
                if self.selection.marquee_rect().is_some() {
                    self.selection.cancel_gesture();
                } else {
                    self.selection.clear();
                }
            }
        }
        self.pump(now);
        self.reconcile();
    }

    // -- selection API ------------------------------------------------------

    /// Select entities by id from outside the viewer
    pub fn select(&mut self, ids: &[EntityId], mode: SelectMode, now: Instant) -> bool {
        let changed = self
            .selection
            .select(&self.scene, ids, mode, SelectionOrigin::Programmatic);
        self.pump(now);
        self.reconcile();
        changed
    }

    pub fn clear_selection(&mut self, now: Instant) -> bool {
        let changed = self.selection.clear();
        self.pump(now);
        self.reconcile();
        changed
    }

    pub fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection.set_enabled(enabled);
    }

    pub fn set_marquee_mode(&mut self, mode: MarqueeMode) {
        self.selection.set_marquee_mode(mode);
    }

    pub fn set_highlight_styles(&mut self, selection: HighlightStyle, preview: HighlightStyle) {
        set_highlight_styles(&mut self.scene, selection, preview);
    }

    // -- view ---------------------------------------------------------------

    pub fn set_exploded_view(&mut self, factor: f64) {
        self.scene.set_exploded_view(factor);
    }

    /// Hide or show a floor; selected entities on a hidden floor drop out on the next frame
    pub fn set_floor_visible(&mut self, floor: &str, visible: bool) -> Result<()> {
        self.scene.set_floor_visible(floor, visible)?;
        Ok(())
    }

    // -- text surface -------------------------------------------------------

    pub fn text_cursor_moved(&mut self, positions: &[TextPosition], now: Instant) {
        self.bridge.cursor_moved(positions, now);
    }

    /// Preview the entities under a text selection; an empty range clears the preview
    pub fn text_selection_changed(&mut self, range: SourceRange, now: Instant) {
        if let Some(ids) = self.bridge.text_selection_changed(range, now) {
            if ids.is_empty() {
                self.selection.clear_preview();
            } else {
                self.selection.set_preview(&self.scene, &ids);
            }
            self.reconcile();
        }
    }

    // -- frame --------------------------------------------------------------

    /// Per-frame update: timers, cursor sync, visibility pruning, highlights
    pub fn frame(&mut self, now: Instant) {
        if let Some(ids) = self.bridge.tick(now) {
            self.selection
                .select(&self.scene, &ids, SelectMode::Replace, SelectionOrigin::Editor);
        }
        self.selection.prune(&self.scene);
        self.pump(now);
        self.reconcile();
    }

    // -- write path ---------------------------------------------------------

    /// Text patch for an edit of the single selected entity
    pub fn property_edit(
        &self,
        edit: &PropertyEdit,
        formatter: &dyn DeclarationFormatter,
    ) -> std::result::Result<TextPatch, MutationError> {
        apply_property_edit(
            self.scene.registry(),
            self.selection.selection(),
            edit,
            formatter,
        )
    }

    fn pump(&mut self, now: Instant) {
        for event in self.selection.take_events() {
            self.bridge.selection_changed(&event, now);
        }
    }

    fn reconcile(&mut self) {
        reconcile_highlights(
            &mut self.scene,
            self.selection.selection(),
            self.selection.preview(),
        );
    }
}

impl<S: TextSurface + std::fmt::Debug> std::fmt::Debug for Viewer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("generation", &self.scene.generation())
            .field("selection", &self.selection)
            .field("bridge", &self.bridge)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::NullSurface;

    const JSON: &str = r#"{"floors": [{"id": "g", "rooms": [
        {"name": "A", "x": 0, "z": 0, "width": 4, "depth": 4}
    ]}]}"#;

    #[test]
    fn test_stale_parse_keeps_scene_and_selection() {
        let now = Instant::now();
        let mut viewer = Viewer::new(NullSurface, ViewerSettings::default());
        viewer.load_json(JSON, now).unwrap();
        let a = EntityId::room("g", "A");
        assert!(viewer.select(&[a.clone()], SelectMode::Replace, now));

        assert!(viewer.load_json("{ not json", now).is_err());
        assert_eq!(viewer.scene().generation(), 1);
        assert_eq!(viewer.selection().selection(), [a.clone()]);
        assert_eq!(viewer.bridge().locations().len(), 0);

        // Invalid but parseable input is rejected before teardown too
        let invalid = r#"{"floors": [{"id": "g", "rooms": [
            {"name": "A", "x": 0, "z": 0, "width": -4, "depth": 4}]}]}"#;
        assert!(viewer.load_json(invalid, now).is_err());
        assert_eq!(viewer.selection().selection(), [a]);
    }

    #[test]
    fn test_reload_clears_selection_before_rebuild() {
        let now = Instant::now();
        let mut viewer = Viewer::new(NullSurface, ViewerSettings::default());
        viewer.load_json(JSON, now).unwrap();
        viewer.select(&[EntityId::room("g", "A")], SelectMode::Replace, now);

        viewer.load_json(JSON, now).unwrap();
        assert!(viewer.selection().selection().is_empty());
        assert_eq!(viewer.scene().generation(), 2);
        assert!(viewer
            .scene()
            .graph()
            .iter()
            .all(|(_, node)| node.highlight.is_none()));
    }

    #[test]
    fn test_escape_clears_selection() {
        let now = Instant::now();
        let mut viewer = Viewer::new(NullSurface, ViewerSettings::default());
        viewer.load_json(JSON, now).unwrap();
        viewer.select(&[EntityId::room("g", "A")], SelectMode::Replace, now);
        let node = viewer.scene().registry().find(&EntityId::room("g", "A")).unwrap().nodes[0];
        assert!(viewer.scene().graph().node(node).unwrap().highlight.selected);

        viewer.key_pressed(ViewerKey::Escape, now);
        assert!(viewer.selection().selection().is_empty());
        assert!(!viewer.scene().graph().node(node).unwrap().highlight.selected);
    }
}
