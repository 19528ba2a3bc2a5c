// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection Manager
//!
//! Owns the selection set, the preview set and the pointer gesture state
//! machine. The set holds [`EntityId`]s, so it stays meaningful while the
//! registry is rebuilt underneath it; stale ids are dropped on the next
//! [`SelectionManager::prune`].
//!
//! ```text
//! Disabled ──enable──▶ Navigation ──press + drag past threshold──▶ Selecting
//!     ▲                    ▲  │                                       │
//!     └──────disable───────┘  └─────────────── release ◀──────────────┘
//! ```

use crate::camera::{Camera, ScreenRect, Viewport};
use crate::picking::{self, MarqueeMode};
use crate::settings::ViewerSettings;
use floorplan_geometry::Point2;
use floorplan_scene::{EntityId, EntityKind, FloorplanScene, RegisteredEntity};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Interaction state of the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Disabled,
    /// Pointer input navigates; clicks select
    Navigation,
    /// A marquee drag is in progress
    Selecting,
}

/// Modifier keys held during a pointer gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Adds to the selection
    pub shift: bool,
    /// Toggles membership (Ctrl or Cmd)
    pub toggle: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        toggle: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            toggle: false,
        }
    }

    pub fn toggle() -> Self {
        Self {
            shift: false,
            toggle: true,
        }
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.shift || self.toggle
    }
}

/// How a set of ids is merged into the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    Replace,
    Add,
    Toggle,
}

/// What caused a selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    Click,
    Marquee,
    /// External select-by-key call
    Programmatic,
    /// Cursor placement in the text editor
    Editor,
    /// Entities became invisible or disappeared
    Pruned,
    /// Selection was cleared explicitly or by a reload
    Cleared,
}

/// Selection-changed notification carrying the full current set
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    pub selection: Vec<EntityId>,
    pub origin: SelectionOrigin,
}

impl SelectionEvent {
    /// First selected entity
    pub fn primary(&self) -> Option<&EntityId> {
        self.selection.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Events kept for [`SelectionManager::take_events`]; older ones are dropped
pub const EVENT_QUEUE_CAPACITY: usize = 64;

type Listener = Box<dyn FnMut(&SelectionEvent)>;

#[derive(Debug, Clone, Copy)]
struct Gesture {
    start: Point2<f64>,
    current: Point2<f64>,
    modifiers: Modifiers,
    dragging: bool,
}

pub struct SelectionManager {
    state: SelectionState,
    selected: Vec<EntityId>,
    preview: Vec<EntityId>,
    mode: MarqueeMode,
    selectable: FxHashSet<EntityKind>,
    drag_threshold: f64,
    gesture: Option<Gesture>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    queue: VecDeque<SelectionEvent>,
}

impl std::fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("state", &self.state)
            .field("selected", &self.selected)
            .field("preview", &self.preview)
            .field("mode", &self.mode)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new(&ViewerSettings::default())
    }
}

impl SelectionManager {
    /// New manager in the navigation state with every kind selectable
    pub fn new(settings: &ViewerSettings) -> Self {
        Self {
            state: SelectionState::Navigation,
            selected: Vec::new(),
            preview: Vec::new(),
            mode: settings.marquee_mode,
            selectable: EntityKind::ALL.into_iter().collect(),
            drag_threshold: settings.drag_threshold_px,
            gesture: None,
            listeners: Vec::new(),
            next_listener: 0,
            queue: VecDeque::new(),
        }
    }

    // -- state --------------------------------------------------------------

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state != SelectionState::Disabled
    }

    /// Enable or disable interactive selection; the current set is kept
    pub fn set_enabled(&mut self, enabled: bool) {
        self.gesture = None;
        self.state = if enabled {
            SelectionState::Navigation
        } else {
            SelectionState::Disabled
        };
        tracing::trace!(state = ?self.state, "selection state");
    }

    /// Bound to the selection toggle key
    pub fn toggle_enabled(&mut self) {
        self.set_enabled(!self.is_enabled());
    }

    pub fn marquee_mode(&self) -> MarqueeMode {
        self.mode
    }

    pub fn set_marquee_mode(&mut self, mode: MarqueeMode) {
        self.mode = mode;
    }

    pub fn toggle_marquee_mode(&mut self) -> MarqueeMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Restrict which entity kinds clicks and marquees can select
    pub fn set_selectable_kinds(&mut self, kinds: &[EntityKind]) {
        self.selectable = kinds.iter().copied().collect();
    }

    pub fn is_selectable(&self, kind: EntityKind) -> bool {
        self.selectable.contains(&kind)
    }

    // -- selection set ------------------------------------------------------

    pub fn selection(&self) -> &[EntityId] {
        &self.selected
    }

    pub fn primary(&self) -> Option<&EntityId> {
        self.selected.first()
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.contains(id)
    }

    pub fn preview(&self) -> &[EntityId] {
        &self.preview
    }

    /// Select entities by id
    ///
    /// Ids that are not registered or whose kind is not selectable are
    /// ignored. Returns true when the set changed.
    pub fn select(
        &mut self,
        scene: &FloorplanScene,
        ids: &[EntityId],
        mode: SelectMode,
        origin: SelectionOrigin,
    ) -> bool {
        let valid: Vec<EntityId> = ids
            .iter()
            .filter(|id| self.is_selectable(id.kind) && scene.registry().find(id).is_some())
            .cloned()
            .collect();
        self.apply(valid, mode, origin)
    }

    /// Drop every selected entity
    pub fn clear(&mut self) -> bool {
        self.apply(Vec::new(), SelectMode::Replace, SelectionOrigin::Cleared)
    }

    /// Forget selection, preview and gesture after a reload
    pub fn reset(&mut self) {
        self.gesture = None;
        self.preview.clear();
        if self.state == SelectionState::Selecting {
            self.state = SelectionState::Navigation;
        }
        self.clear();
    }

    fn apply(&mut self, ids: Vec<EntityId>, mode: SelectMode, origin: SelectionOrigin) -> bool {
        let mut next = match mode {
            SelectMode::Replace => Vec::with_capacity(ids.len()),
            SelectMode::Add | SelectMode::Toggle => self.selected.clone(),
        };
        for id in ids {
            match (mode, next.iter().position(|s| *s == id)) {
                (SelectMode::Toggle, Some(i)) => {
                    next.remove(i);
                }
                (_, Some(_)) => {}
                (_, None) => next.push(id),
            }
        }

        if next == self.selected {
            return false;
        }
        self.selected = next;
        tracing::trace!(count = self.selected.len(), origin = ?origin, "selection changed");
        self.emit(SelectionEvent {
            selection: self.selected.clone(),
            origin,
        });
        true
    }

    // -- preview ------------------------------------------------------------

    /// Highlight entities without selecting them
    pub fn set_preview(&mut self, scene: &FloorplanScene, ids: &[EntityId]) {
        self.preview = ids
            .iter()
            .filter(|id| scene.registry().find(id).is_some())
            .cloned()
            .collect();
    }

    pub fn clear_preview(&mut self) {
        self.preview.clear();
    }

    // -- events -------------------------------------------------------------

    /// Register a listener called synchronously on every selection change
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SelectionEvent) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Drain queued events in emission order
    ///
    /// At most [`EVENT_QUEUE_CAPACITY`] events are kept between drains. Every
    /// event carries the full set, so the newest one is always current; hosts
    /// that only use listeners may ignore the queue.
    pub fn take_events(&mut self) -> Vec<SelectionEvent> {
        self.queue.drain(..).collect()
    }

    fn emit(&mut self, event: SelectionEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        if self.queue.len() == EVENT_QUEUE_CAPACITY {
            self.queue.pop_front();
            tracing::trace!("selection event queue full, dropped oldest");
        }
        self.queue.push_back(event);
    }

    // -- frame tick ---------------------------------------------------------

    /// Drop selected entities that vanished or are no longer visible
    ///
    /// Returns true when the selection changed.
    pub fn prune(&mut self, scene: &FloorplanScene) -> bool {
        let visible = |id: &EntityId| {
            scene
                .registry()
                .find(id)
                .map_or(false, |e| picking::is_entity_visible(scene, e))
        };
        self.preview.retain(|id| visible(id));

        let kept: Vec<EntityId> = self.selected.iter().filter(|id| visible(id)).cloned().collect();
        if kept.len() == self.selected.len() {
            return false;
        }
        tracing::debug!(
            removed = self.selected.len() - kept.len(),
            "pruned invisible entities from selection"
        );
        self.apply(kept, SelectMode::Replace, SelectionOrigin::Pruned)
    }

    // -- pointer gestures ---------------------------------------------------

    pub fn pointer_down(&mut self, position: Point2<f64>, modifiers: Modifiers) {
        if !self.is_enabled() {
            return;
        }
        self.gesture = Some(Gesture {
            start: position,
            current: position,
            modifiers,
            dragging: false,
        });
    }

    pub fn pointer_move(&mut self, position: Point2<f64>) {
        let threshold = self.drag_threshold;
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        gesture.current = position;
        if !gesture.dragging && (position - gesture.start).norm() > threshold {
            gesture.dragging = true;
            self.state = SelectionState::Selecting;
        }
    }

    /// Live marquee rectangle while dragging
    pub fn marquee_rect(&self) -> Option<ScreenRect> {
        self.gesture
            .filter(|g| g.dragging)
            .map(|g| ScreenRect::from_corners(g.start, g.current))
    }

    /// Abandon the current gesture without touching the selection
    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
        if self.state == SelectionState::Selecting {
            self.state = SelectionState::Navigation;
        }
    }

    /// Finish a click or marquee gesture
    ///
    /// Returns true when the selection changed.
    pub fn pointer_up(
        &mut self,
        position: Point2<f64>,
        scene: &FloorplanScene,
        camera: &Camera,
        viewport: &Viewport,
    ) -> bool {
        self.pointer_move(position);
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if self.state == SelectionState::Selecting {
            self.state = SelectionState::Navigation;
        }

        if gesture.dragging {
            self.commit_marquee(&gesture, scene, camera, viewport)
        } else {
            self.commit_click(&gesture, scene, camera, viewport)
        }
    }

    fn accepts(&self, entity: &RegisteredEntity) -> bool {
        self.selectable.contains(&entity.kind())
    }

    fn commit_click(
        &mut self,
        gesture: &Gesture,
        scene: &FloorplanScene,
        camera: &Camera,
        viewport: &Viewport,
    ) -> bool {
        let hit = camera
            .screen_to_ray(gesture.start, viewport)
            .and_then(|ray| picking::pick(scene, &ray, |e| self.accepts(e)))
            .and_then(|hit| scene.registry().get(hit.entity))
            .map(|entity| entity.id.clone());

        match hit {
            Some(id) => {
                let mode = if gesture.modifiers.toggle {
                    SelectMode::Toggle
                } else if gesture.modifiers.shift {
                    SelectMode::Add
                } else {
                    SelectMode::Replace
                };
                self.apply(vec![id], mode, SelectionOrigin::Click)
            }
            None if !gesture.modifiers.any() => {
                self.apply(Vec::new(), SelectMode::Replace, SelectionOrigin::Click)
            }
            None => false,
        }
    }

    fn commit_marquee(
        &mut self,
        gesture: &Gesture,
        scene: &FloorplanScene,
        camera: &Camera,
        viewport: &Viewport,
    ) -> bool {
        let rect = ScreenRect::from_corners(gesture.start, gesture.current);
        let ids: Vec<EntityId> =
            picking::marquee(scene, camera, viewport, &rect, self.mode, |e| self.accepts(e))
                .into_iter()
                .filter_map(|key| scene.registry().get(key))
                .map(|e| e.id.clone())
                .collect();

        let mode = if gesture.modifiers.shift {
            SelectMode::Add
        } else {
            SelectMode::Replace
        };
        self.apply(ids, mode, SelectionOrigin::Marquee)
    }
}
