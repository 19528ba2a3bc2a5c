// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena key types.
//!
//! Keys are created by `slotmap::SlotMap` and stay valid (or detectably stale)
//! across removals. All three arenas are wiped on every scene load.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a node of the scene graph.
    pub struct NodeKey;

    /// Key for a shared base material.
    pub struct MaterialKey;

    /// Key for a registered logical entity.
    pub struct EntityKey;
}
