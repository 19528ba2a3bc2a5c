// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor ↔ scene synchronization
//!
//! Scene to editor: selection changes reveal and decorate source ranges.
//! Editor to scene: cursor moves are debounced and resolved to entity ids,
//! text selections resolve to a preview set. Both directions take the
//! [`SyncLock`] first and back off while the other direction holds it.

use super::lock::{SyncDirection, SyncLock};
use super::locations::EntityLocationIndex;
use super::surface::TextSurface;
use crate::selection::{SelectionEvent, SelectionOrigin};
use crate::settings::ViewerSettings;
use floorplan_model::{SourceRange, TextPosition};
use floorplan_scene::{EntityId, MeshRegistry};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

type PreviewListener = Box<dyn FnMut(&[EntityId])>;

#[derive(Debug, Clone)]
struct PendingCursor {
    positions: SmallVec<[TextPosition; 2]>,
    due: Instant,
}

pub struct SyncBridge<S: TextSurface> {
    surface: S,
    index: EntityLocationIndex,
    lock: SyncLock,
    debounce: Duration,
    flash_timeout: Duration,
    pending: Option<PendingCursor>,
    flash_until: Option<Instant>,
    preview_listeners: Vec<PreviewListener>,
}

impl<S: TextSurface> SyncBridge<S> {
    pub fn new(surface: S, settings: &ViewerSettings) -> Self {
        Self {
            surface,
            index: EntityLocationIndex::new(),
            lock: SyncLock::new(settings.sync_lock_timeout),
            debounce: settings.cursor_debounce,
            flash_timeout: settings.flash_timeout,
            pending: None,
            flash_until: None,
            preview_listeners: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn locations(&self) -> &EntityLocationIndex {
        &self.index
    }

    pub fn lock(&self) -> &SyncLock {
        &self.lock
    }

    /// Rebuild the location index after a successful parse
    pub fn update_entity_locations(&mut self, registry: &MeshRegistry) {
        self.index = EntityLocationIndex::from_registry(registry);
        tracing::debug!(entities = self.index.len(), "entity locations updated");
    }

    /// Keep the last good index when the source does not parse
    pub fn on_parse_failed(&mut self) {
        tracing::info!(
            entities = self.index.len(),
            "parse failed, keeping previous entity locations"
        );
    }

    /// Be told about text-range preview results
    pub fn subscribe_preview<F>(&mut self, listener: F)
    where
        F: FnMut(&[EntityId]) + 'static,
    {
        self.preview_listeners.push(Box::new(listener));
    }

    // -- scene → editor -----------------------------------------------------

    /// React to a selection change; returns true when the editor was updated
    pub fn selection_changed(&mut self, event: &SelectionEvent, now: Instant) -> bool {
        if event.origin == SelectionOrigin::Editor {
            return false;
        }
        // Only a reveal moves the editor cursor, so only a reveal takes the lock
        let reveals = matches!(
            event.origin,
            SelectionOrigin::Click | SelectionOrigin::Marquee | SelectionOrigin::Programmatic
        );
        if reveals {
            if !self.lock.try_acquire(SyncDirection::SceneToEditor, now) {
                return false;
            }
        } else if self.lock.is_blocked(SyncDirection::SceneToEditor, now) {
            return false;
        }

        let ranges: Vec<SourceRange> = event
            .selection
            .iter()
            .filter_map(|id| self.index.range_of(id))
            .filter_map(|range| self.surface.resolve_range(range))
            .collect();
        self.surface.set_selection_decorations(&ranges);

        if reveals {
            let primary = event
                .primary()
                .and_then(|id| self.index.range_of(id))
                .and_then(|range| self.surface.resolve_range(range));
            if let Some(range) = primary {
                self.surface.reveal(range);
                self.surface.flash(range);
                self.flash_until = Some(now + self.flash_timeout);
            }
        }
        true
    }

    // -- editor → scene -----------------------------------------------------

    /// Record cursor positions; resolution happens after the debounce delay
    ///
    /// The first position is the primary cursor. A new call restarts the delay.
    pub fn cursor_moved(&mut self, positions: &[TextPosition], now: Instant) {
        if self.lock.is_blocked(SyncDirection::EditorToScene, now) {
            tracing::trace!("cursor move ignored while the scene updates the editor");
            return;
        }
        if positions.is_empty() {
            self.pending = None;
            return;
        }
        self.pending = Some(PendingCursor {
            positions: positions.iter().copied().collect(),
            due: now + self.debounce,
        });
    }

    /// Resolve a text selection to entities to preview
    ///
    /// An empty range yields an empty preview. Returns `None` while the scene
    /// holds the lock.
    pub fn text_selection_changed(
        &mut self,
        range: SourceRange,
        now: Instant,
    ) -> Option<Vec<EntityId>> {
        if self.lock.is_blocked(SyncDirection::EditorToScene, now) {
            return None;
        }
        let ids: Vec<EntityId> = self
            .index
            .find_entities_in_range(&range)
            .into_iter()
            .cloned()
            .collect();
        for listener in &mut self.preview_listeners {
            listener(&ids);
        }
        Some(ids)
    }

    /// Advance timers; returns the ids to select once a debounced cursor move fires
    pub fn tick(&mut self, now: Instant) -> Option<Vec<EntityId>> {
        self.lock.expire(now);
        if self.flash_until.map_or(false, |until| now >= until) {
            self.flash_until = None;
            self.surface.clear_flash();
        }

        if !self.pending.as_ref().map_or(false, |p| now >= p.due) {
            return None;
        }
        let pending = self.pending.take()?;
        if self.lock.is_blocked(SyncDirection::EditorToScene, now) {
            return None;
        }

        let mut ids: Vec<EntityId> = Vec::with_capacity(pending.positions.len());
        for position in &pending.positions {
            if let Some(id) = self.index.find_entity_at_position(*position) {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        if ids.is_empty() {
            tracing::trace!("cursor is not inside any entity");
            return None;
        }
        if !self.lock.try_acquire(SyncDirection::EditorToScene, now) {
            return None;
        }
        Some(ids)
    }

    /// True while a cursor move waits for its debounce delay
    pub fn has_pending_cursor(&self) -> bool {
        self.pending.is_some()
    }
}

impl<S: TextSurface + std::fmt::Debug> std::fmt::Debug for SyncBridge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBridge")
            .field("surface", &self.surface)
            .field("entities", &self.index.len())
            .field("lock", &self.lock)
            .field("pending", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::locations::EntityLocation;

    #[derive(Debug, Default)]
    struct Recorder {
        reveals: Vec<SourceRange>,
        decorations: Vec<SourceRange>,
        flashing: bool,
    }

    impl TextSurface for Recorder {
        fn reveal(&mut self, range: SourceRange) {
            self.reveals.push(range);
        }

        fn set_selection_decorations(&mut self, ranges: &[SourceRange]) {
            self.decorations = ranges.to_vec();
        }

        fn flash(&mut self, _range: SourceRange) {
            self.flashing = true;
        }

        fn clear_flash(&mut self) {
            self.flashing = false;
        }
    }

    fn bridge() -> SyncBridge<Recorder> {
        let mut bridge = SyncBridge::new(Recorder::default(), &ViewerSettings::default());
        bridge.index.update_entity_locations([
            EntityLocation {
                id: EntityId::room("g", "A"),
                range: SourceRange::new(0, 0, 5, 0),
                inherited: false,
            },
            EntityLocation {
                id: EntityId::room("g", "B"),
                range: SourceRange::new(6, 0, 9, 0),
                inherited: false,
            },
        ]);
        bridge
    }

    fn event(ids: &[EntityId], origin: SelectionOrigin) -> SelectionEvent {
        SelectionEvent {
            selection: ids.to_vec(),
            origin,
        }
    }

    #[test]
    fn test_debounce_restarts() {
        let t0 = Instant::now();
        let mut bridge = bridge();
        bridge.cursor_moved(&[TextPosition::new(1, 0)], t0);
        assert!(bridge.tick(t0 + Duration::from_millis(60)).is_none());

        // Superseding move restarts the delay
        bridge.cursor_moved(&[TextPosition::new(7, 0)], t0 + Duration::from_millis(60));
        assert!(bridge.tick(t0 + Duration::from_millis(120)).is_none());

        let ids = bridge.tick(t0 + Duration::from_millis(160)).unwrap();
        assert_eq!(ids, [EntityId::room("g", "B")]);
        assert!(!bridge.has_pending_cursor());
    }

    #[test]
    fn test_multiple_cursors_primary_first() {
        let t0 = Instant::now();
        let mut bridge = bridge();
        bridge.cursor_moved(
            &[
                TextPosition::new(7, 0),
                TextPosition::new(1, 0),
                TextPosition::new(8, 0),
            ],
            t0,
        );
        let ids = bridge.tick(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(ids, [EntityId::room("g", "B"), EntityId::room("g", "A")]);
    }

    #[test]
    fn test_scene_to_editor_reveals_primary_and_flashes() {
        let t0 = Instant::now();
        let mut bridge = bridge();
        let ids = [EntityId::room("g", "B"), EntityId::room("g", "A")];
        assert!(bridge.selection_changed(&event(&ids, SelectionOrigin::Click), t0));

        let surface = bridge.surface();
        assert_eq!(surface.reveals, [SourceRange::new(6, 0, 9, 0)]);
        assert_eq!(surface.decorations.len(), 2);
        assert!(surface.flashing);

        bridge.tick(t0 + Duration::from_millis(2999));
        assert!(bridge.surface().flashing);
        bridge.tick(t0 + Duration::from_millis(3000));
        assert!(!bridge.surface().flashing);
    }

    #[test]
    fn test_editor_origin_and_echo_are_ignored() {
        let t0 = Instant::now();
        let mut bridge = bridge();
        let a = [EntityId::room("g", "A")];
        assert!(!bridge.selection_changed(&event(&a, SelectionOrigin::Editor), t0));
        assert!(bridge.surface().reveals.is_empty());

        // Reveal moves the editor cursor; that echo must not come back
        assert!(bridge.selection_changed(&event(&a, SelectionOrigin::Click), t0));
        bridge.cursor_moved(&[TextPosition::new(0, 0)], t0 + Duration::from_millis(10));
        assert!(!bridge.has_pending_cursor());
        assert!(bridge.tick(t0 + Duration::from_millis(150)).is_none());
    }

    #[test]
    fn test_pruned_selection_decorates_without_reveal() {
        let t0 = Instant::now();
        let mut bridge = bridge();
        assert!(bridge.selection_changed(&event(&[], SelectionOrigin::Pruned), t0));
        assert!(bridge.surface().reveals.is_empty());
        assert!(bridge.surface().decorations.is_empty());
        assert!(bridge.lock().holder(t0).is_none());
    }

    #[test]
    fn test_text_selection_previews() {
        let t0 = Instant::now();
        let mut bridge = bridge();
        let seen = std::rc::Rc::new(std::cell::Cell::new(0));
        let sink = std::rc::Rc::clone(&seen);
        bridge.subscribe_preview(move |ids| sink.set(ids.len()));

        let ids = bridge
            .text_selection_changed(SourceRange::new(4, 0, 7, 0), t0)
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(seen.get(), 2);

        let ids = bridge
            .text_selection_changed(SourceRange::new(4, 0, 4, 0), t0)
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(seen.get(), 0);
    }
}
