// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan Interaction
//!
//! Picking, selection and editor synchronization for scenes built by
//! `floorplan-scene`. The [`Viewer`] ties everything together:
//!
//! - the [`SelectionManager`] hit-tests clicks and marquee rectangles against
//!   the Mesh Registry and keeps a selection set plus a preview set;
//! - the [`SyncBridge`] maps selections to source ranges in a text editor and
//!   cursor positions back to entities, guarded by a [`SyncLock`];
//! - [`apply_property_edit`] turns a property change of the selected entity
//!   into a [`TextPatch`] for the host to apply.
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_interaction::{NullSurface, Viewer, ViewerSettings};
//! use std::time::Instant;
//!
//! let mut viewer = Viewer::new(NullSurface, ViewerSettings::from_env());
//! viewer.load_json(json, Instant::now())?;
//! // every animation frame
//! viewer.frame(Instant::now());
//! ```

pub mod camera;
pub mod error;
pub mod highlight;
pub mod mutation;
pub mod picking;
pub mod selection;
pub mod settings;
pub mod sync;
pub mod viewer;

pub use camera::{Camera, Projection, ScreenRect, Viewport};
pub use error::{Error, MutationError, Result};
pub use highlight::{reconcile_highlights, set_highlight_styles};
pub use mutation::{
    apply_property_edit, DeclarationFormatter, JsonDeclarationFormatter, PropertyEdit, TextPatch,
};
pub use picking::{is_entity_visible, marquee, pick, MarqueeMode, PickHit};
pub use selection::{
    ListenerId, Modifiers, SelectMode, SelectionEvent, SelectionManager, SelectionOrigin,
    SelectionState, EVENT_QUEUE_CAPACITY,
};
pub use settings::ViewerSettings;
pub use sync::{
    EntityLocation, EntityLocationIndex, NullSurface, SyncBridge, SyncDirection, SyncLock,
    TextSurface,
};
pub use viewer::{Viewer, ViewerKey};
