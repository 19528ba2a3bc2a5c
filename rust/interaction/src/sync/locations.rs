// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity ↔ text range index

use floorplan_model::{SourceRange, TextPosition};
use floorplan_scene::{EntityId, MeshRegistry};
use rustc_hash::FxHashMap;

/// Source range of one registered entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityLocation {
    pub id: EntityId,
    pub range: SourceRange,
    /// Range borrowed from the parent room
    pub inherited: bool,
}

impl EntityLocation {
    /// Smaller sorts first: fewer lines, then fewer columns, own ranges
    /// before inherited ones, then entity kind
    fn specificity_key(&self) -> (u32, i64, bool, floorplan_scene::EntityKind) {
        let (lines, columns) = self.range.specificity();
        (lines, columns, self.inherited, self.id.kind)
    }
}

/// Index from entity id to source range, rebuilt after every successful parse
#[derive(Debug, Clone, Default)]
pub struct EntityLocationIndex {
    locations: Vec<EntityLocation>,
    by_id: FxHashMap<EntityId, usize>,
}

impl EntityLocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every registered entity that carries a range
    pub fn from_registry(registry: &MeshRegistry) -> Self {
        let mut index = Self::new();
        index.update_entity_locations(registry.iter().filter_map(|(_, entity)| {
            entity.source_range.map(|range| EntityLocation {
                id: entity.id.clone(),
                range,
                inherited: entity.range_inherited,
            })
        }));
        index
    }

    /// Replace the whole index
    pub fn update_entity_locations<I>(&mut self, locations: I)
    where
        I: IntoIterator<Item = EntityLocation>,
    {
        self.locations.clear();
        self.by_id.clear();
        for location in locations {
            match self.by_id.get(&location.id) {
                Some(&i) => self.locations[i] = location,
                None => {
                    self.by_id.insert(location.id.clone(), self.locations.len());
                    self.locations.push(location);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&EntityLocation> {
        self.by_id.get(id).map(|&i| &self.locations[i])
    }

    pub fn range_of(&self, id: &EntityId) -> Option<SourceRange> {
        self.get(id).map(|l| l.range)
    }

    /// Most specific entity whose range contains the position
    pub fn find_entity_at_position(&self, position: TextPosition) -> Option<&EntityId> {
        self.locations
            .iter()
            .filter(|l| l.range.contains(position))
            .min_by(|a, b| {
                a.specificity_key()
                    .cmp(&b.specificity_key())
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|l| &l.id)
    }

    /// Entities whose range overlaps a text selection, most specific first
    ///
    /// An empty selection matches nothing.
    pub fn find_entities_in_range(&self, range: &SourceRange) -> Vec<&EntityId> {
        if range.is_empty() {
            return Vec::new();
        }
        let mut found: Vec<&EntityLocation> = self
            .locations
            .iter()
            .filter(|l| l.range.overlaps(range))
            .collect();
        found.sort_by(|a, b| {
            a.specificity_key()
                .cmp(&b.specificity_key())
                .then_with(|| a.id.cmp(&b.id))
        });
        found.into_iter().map(|l| &l.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_model::WallDirection;

    fn location(id: EntityId, range: SourceRange, inherited: bool) -> EntityLocation {
        EntityLocation {
            id,
            range,
            inherited,
        }
    }

    fn index() -> EntityLocationIndex {
        let mut index = EntityLocationIndex::new();
        index.update_entity_locations([
            location(EntityId::room("g", "A"), SourceRange::new(2, 4, 10, 5), false),
            location(
                EntityId::wall("g", "A", WallDirection::Top),
                SourceRange::new(5, 8, 5, 40),
                false,
            ),
            location(
                EntityId::wall("g", "A", WallDirection::Left),
                SourceRange::new(2, 4, 10, 5),
                true,
            ),
            location(EntityId::room("g", "B"), SourceRange::new(11, 4, 15, 5), false),
        ]);
        index
    }

    #[test]
    fn test_nested_wall_wins_over_room() {
        let index = index();
        let found = index.find_entity_at_position(TextPosition::new(5, 10)).unwrap();
        assert_eq!(*found, EntityId::wall("g", "A", WallDirection::Top));
    }

    #[test]
    fn test_own_range_wins_over_inherited_twin() {
        let index = index();
        let found = index.find_entity_at_position(TextPosition::new(3, 0)).unwrap();
        assert_eq!(*found, EntityId::room("g", "A"));
    }

    #[test]
    fn test_no_match_is_none() {
        let index = index();
        assert!(index.find_entity_at_position(TextPosition::new(0, 0)).is_none());
        // Half-open end
        assert!(index.find_entity_at_position(TextPosition::new(15, 5)).is_none());
    }

    #[test]
    fn test_entities_in_range() {
        let index = index();
        let found = index.find_entities_in_range(&SourceRange::new(9, 0, 12, 0));
        assert_eq!(found.len(), 3);
        assert_eq!(*found[0], EntityId::room("g", "B"));

        assert!(index
            .find_entities_in_range(&SourceRange::new(5, 10, 5, 10))
            .is_empty());
    }

    #[test]
    fn test_update_replaces_everything() {
        let mut index = index();
        assert_eq!(index.len(), 4);
        index.update_entity_locations([location(
            EntityId::room("g", "C"),
            SourceRange::new(0, 0, 1, 0),
            false,
        )]);
        assert_eq!(index.len(), 1);
        assert!(index.get(&EntityId::room("g", "A")).is_none());
        assert!(index.range_of(&EntityId::room("g", "C")).is_some());
    }
}
