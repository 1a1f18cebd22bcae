//! Side table from scene entities to the city they belong to.
//!
//! Every entity of a marker subtree is registered, so hover picking resolves
//! a hit entity to its city with one lookup instead of walking parents.

use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;

use crate::data::{CityId, CityRecord};

struct CityEntry {
    record: CityRecord,
    root: Entity,
    position: Vec3,
}

/// Registry of live city markers.
#[derive(Resource, Default)]
pub struct CityRegistry {
    cities: BTreeMap<CityId, CityEntry>,
    nodes: HashMap<Entity, CityId>,
    /// Ids are never reused, so a stale id can't alias a newer city.
    next_id: usize,
}

impl CityRegistry {
    /// Registers a city whose marker root is `root` at globe-local `position`.
    pub fn insert(&mut self, record: CityRecord, root: Entity, position: Vec3) -> CityId {
        let id = CityId(self.next_id);
        self.next_id += 1;
        self.cities.insert(
            id,
            CityEntry {
                record,
                root,
                position,
            },
        );
        self.nodes.insert(root, id);
        id
    }

    /// Maps an additional node of the marker subtree to `id`.
    pub fn attach_node(&mut self, id: CityId, node: Entity) {
        self.nodes.insert(node, id);
    }

    /// Removes a city and all its node mappings. Returns the record if present.
    pub fn remove(&mut self, id: CityId) -> Option<CityRecord> {
        let entry = self.cities.remove(&id)?;
        self.nodes.retain(|_, city| *city != id);
        Some(entry.record)
    }

    pub fn city_for_node(&self, node: Entity) -> Option<CityId> {
        self.nodes.get(&node).copied()
    }

    pub fn record(&self, id: CityId) -> Option<&CityRecord> {
        self.entry(id).map(|entry| &entry.record)
    }

    pub fn root(&self, id: CityId) -> Option<Entity> {
        self.entry(id).map(|entry| entry.root)
    }

    /// Marker position in globe-local coordinates.
    pub fn position(&self, id: CityId) -> Option<Vec3> {
        self.entry(id).map(|entry| entry.position)
    }

    pub fn find_by_name(&self, name: &str) -> Option<CityId> {
        self.iter()
            .find(|(_, record)| record.name == name)
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CityId, &CityRecord)> {
        self.cities.iter().map(|(id, entry)| (*id, &entry.record))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: CityId) -> Option<&CityEntry> {
        self.cities.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_resolve_to_their_city_until_removed() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let child = world.spawn_empty().id();
        let stranger = world.spawn_empty().id();

        let mut registry = CityRegistry::default();
        let id = registry.insert(CityRecord::new("Lima", -77.0, -12.0, 0xffffff), root, Vec3::X);
        registry.attach_node(id, child);

        assert_eq!(registry.city_for_node(root), Some(id));
        assert_eq!(registry.city_for_node(child), Some(id));
        assert_eq!(registry.city_for_node(stranger), None);
        assert_eq!(registry.find_by_name("Lima"), Some(id));

        assert_eq!(registry.remove(id).map(|r| r.name), Some("Lima".to_string()));
        assert_eq!(registry.city_for_node(child), None);
        assert!(registry.record(id).is_none());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_stay_stable_after_removal() {
        let mut world = World::new();
        let mut registry = CityRegistry::default();
        let a = registry.insert(CityRecord::new("A", 0.0, 0.0, 0), world.spawn_empty().id(), Vec3::X);
        let b = registry.insert(CityRecord::new("B", 0.0, 0.0, 0), world.spawn_empty().id(), Vec3::Y);

        registry.remove(a);

        assert_eq!(registry.position(b), Some(Vec3::Y));
        assert_eq!(registry.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![b]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut world = World::new();
        let mut registry = CityRegistry::default();
        let a = registry.insert(CityRecord::new("A", 0.0, 0.0, 0), world.spawn_empty().id(), Vec3::X);
        registry.remove(a);
        let b = registry.insert(CityRecord::new("B", 0.0, 0.0, 0), world.spawn_empty().id(), Vec3::Y);

        assert_ne!(a, b);
        assert!(registry.record(a).is_none());
        assert_eq!(registry.cities.len(), 1);
    }
}
