// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh Registry
//!
//! The single source of truth for which logical entity a scene node draws.
//! Entities live in a slot map; two indices give O(1) lookup from a node to
//! its entity and from a composite entity id to its entity. Only the scene
//! builder registers entities, and it does so after clearing the previous
//! scene in full.

use crate::keys::{EntityKey, NodeKey};
use floorplan_model::{Connection, Lift, Room, SourceRange, Stair, Wall, WallDirection};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::fmt;

/// Kind of a logical entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Wall,
    Connection,
    Stair,
    Lift,
    Room,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Room,
        EntityKind::Wall,
        EntityKind::Connection,
        EntityKind::Stair,
        EntityKind::Lift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Room => "room",
            EntityKind::Wall => "wall",
            EntityKind::Connection => "connection",
            EntityKind::Stair => "stair",
            EntityKind::Lift => "lift",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of an entity, stable across rebuilds of the same input
///
/// `name` is the room name for rooms, `{room}_{direction}` for walls, the
/// connection id for connections and the declared id for stairs and lifts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub kind: EntityKind,
    pub floor: String,
    pub name: String,
}

impl EntityId {
    pub fn new(kind: EntityKind, floor: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            floor: floor.into(),
            name: name.into(),
        }
    }

    pub fn room(floor: &str, room: &str) -> Self {
        Self::new(EntityKind::Room, floor, room)
    }

    pub fn wall(floor: &str, room: &str, direction: WallDirection) -> Self {
        Self::new(EntityKind::Wall, floor, format!("{}_{}", room, direction))
    }

    pub fn connection(floor: &str, connection: &Connection) -> Self {
        Self::new(EntityKind::Connection, floor, connection.id())
    }

    pub fn stair(floor: &str, stair: &Stair) -> Self {
        Self::new(EntityKind::Stair, floor, stair.id.clone())
    }

    pub fn lift(floor: &str, lift: &Lift) -> Self {
        Self::new(EntityKind::Lift, floor, lift.id.clone())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.kind, self.floor, self.name)
    }
}

/// Kind-specific data of an entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityPayload {
    Room(Room),
    Wall {
        room: String,
        wall: Wall,
        /// Room that renders this boundary
        owner: String,
    },
    Connection(Connection),
    Stair(Stair),
    Lift(Lift),
}

impl EntityPayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityPayload::Room(_) => EntityKind::Room,
            EntityPayload::Wall { .. } => EntityKind::Wall,
            EntityPayload::Connection(_) => EntityKind::Connection,
            EntityPayload::Stair(_) => EntityKind::Stair,
            EntityPayload::Lift(_) => EntityKind::Lift,
        }
    }
}

/// Registry record of one logical entity
#[derive(Debug, Clone)]
pub struct RegisteredEntity {
    pub id: EntityId,
    pub payload: EntityPayload,
    pub source_range: Option<SourceRange>,
    /// True when the range was borrowed from the parent room
    pub range_inherited: bool,
    pub nodes: SmallVec<[NodeKey; 2]>,
}

impl RegisteredEntity {
    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.id.kind
    }

    /// Range owned by this entity's own declaration, if any
    pub fn own_range(&self) -> Option<SourceRange> {
        if self.range_inherited {
            None
        } else {
            self.source_range
        }
    }
}

/// Bidirectional node ↔ entity map
#[derive(Debug, Default)]
pub struct MeshRegistry {
    entities: SlotMap<EntityKey, RegisteredEntity>,
    by_node: FxHashMap<NodeKey, EntityKey>,
    by_id: FxHashMap<EntityId, EntityKey>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity; registering an existing id returns the existing key
    pub(crate) fn register(
        &mut self,
        id: EntityId,
        payload: EntityPayload,
        source_range: Option<SourceRange>,
        range_inherited: bool,
    ) -> EntityKey {
        if let Some(&key) = self.by_id.get(&id) {
            return key;
        }
        let key = self.entities.insert(RegisteredEntity {
            id: id.clone(),
            payload,
            source_range,
            range_inherited,
            nodes: SmallVec::new(),
        });
        self.by_id.insert(id, key);
        key
    }

    /// Associate a drawn node with an entity
    pub(crate) fn attach_node(&mut self, key: EntityKey, node: NodeKey) {
        if let Some(entity) = self.entities.get_mut(key) {
            entity.nodes.push(node);
            self.by_node.insert(node, key);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        self.by_node.clear();
        self.by_id.clear();
    }

    pub fn get(&self, key: EntityKey) -> Option<&RegisteredEntity> {
        self.entities.get(key)
    }

    /// Entity drawn by a node, `None` for unregistered nodes
    pub fn lookup_node(&self, node: NodeKey) -> Option<&RegisteredEntity> {
        self.by_node.get(&node).and_then(|&k| self.entities.get(k))
    }

    pub fn key_for_node(&self, node: NodeKey) -> Option<EntityKey> {
        self.by_node.get(&node).copied()
    }

    pub fn key_for_id(&self, id: &EntityId) -> Option<EntityKey> {
        self.by_id.get(id).copied()
    }

    pub fn find(&self, id: &EntityId) -> Option<&RegisteredEntity> {
        self.key_for_id(id).and_then(|k| self.entities.get(k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &RegisteredEntity)> {
        self.entities.iter()
    }

    /// Entities of one kind, sorted by id for deterministic output
    pub fn of_kind(&self, kind: EntityKind) -> Vec<&RegisteredEntity> {
        let mut out: Vec<_> = self
            .entities
            .values()
            .filter(|e| e.id.kind == kind)
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn on_floor<'a>(&'a self, floor: &'a str) -> impl Iterator<Item = &'a RegisteredEntity> {
        self.entities.values().filter(move |e| e.id.floor == floor)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of node associations
    pub fn node_count(&self) -> usize {
        self.by_node.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_model::WallType;
    use slotmap::SlotMap;

    #[test]
    fn test_register_and_lookup_both_ways() {
        let mut nodes: SlotMap<NodeKey, ()> = SlotMap::with_key();
        let n1 = nodes.insert(());
        let n2 = nodes.insert(());

        let mut registry = MeshRegistry::new();
        let id = EntityId::wall("ground", "A", WallDirection::Right);
        let key = registry.register(
            id.clone(),
            EntityPayload::Wall {
                room: "A".into(),
                wall: Wall::new(WallDirection::Right, WallType::Solid),
                owner: "A".into(),
            },
            Some(SourceRange::new(1, 0, 4, 1)),
            true,
        );
        registry.attach_node(key, n1);
        registry.attach_node(key, n2);

        assert_eq!(id.name, "A_right");
        assert_eq!(registry.lookup_node(n2).unwrap().id, id);
        assert_eq!(registry.find(&id).unwrap().nodes.len(), 2);
        assert!(registry.find(&id).unwrap().own_range().is_none());
        assert_eq!(registry.register(id, EntityPayload::Room(Room::default()), None, false), key);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut nodes: SlotMap<NodeKey, ()> = SlotMap::with_key();
        let n = nodes.insert(());
        let mut registry = MeshRegistry::new();
        let key = registry.register(
            EntityId::room("ground", "A"),
            EntityPayload::Room(Room::default()),
            None,
            false,
        );
        registry.attach_node(key, n);
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.lookup_node(n).is_none());
    }
}
