// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor ↔ scene synchronization on top of registry source ranges

pub mod bridge;
pub mod locations;
pub mod lock;
pub mod surface;

pub use bridge::SyncBridge;
pub use locations::{EntityLocation, EntityLocationIndex};
pub use lock::{SyncDirection, SyncLock};
pub use surface::{NullSurface, TextSurface};
