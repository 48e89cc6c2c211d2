use bevy_ecs::prelude::{Entity, Resource};
use std::collections::HashMap;

/// The set of currently idle (P1) vehicles, maintained incrementally: O(1)
/// insert and O(1) remove (swap-remove backed by an index map), rather than
/// filtering the whole vehicle population every tick.
#[derive(Debug, Clone, Default, Resource)]
pub struct IdleSet {
    vehicles: Vec<Entity>,
    index: HashMap<Entity, usize>,
}

impl IdleSet {
    pub fn insert(&mut self, vehicle: Entity) {
        if self.index.contains_key(&vehicle) {
            return;
        }
        self.index.insert(vehicle, self.vehicles.len());
        self.vehicles.push(vehicle);
    }

    pub fn remove(&mut self, vehicle: Entity) {
        if let Some(&idx) = self.index.get(&vehicle) {
            let last = self.vehicles.len() - 1;
            self.vehicles.swap(idx, last);
            self.vehicles.pop();
            self.index.remove(&vehicle);
            if idx < self.vehicles.len() {
                let moved = self.vehicles[idx];
                self.index.insert(moved, idx);
            }
        }
    }

    pub fn contains(&self, vehicle: Entity) -> bool {
        self.index.contains_key(&vehicle)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.vehicles.iter()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;

    fn entities(world: &mut World, n: usize) -> Vec<Entity> {
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn insert_and_remove_maintain_membership() {
        let mut world = World::new();
        let ids = entities(&mut world, 4);
        let mut set = IdleSet::default();
        for id in &ids {
            set.insert(*id);
        }
        assert_eq!(set.len(), 4);

        set.remove(ids[1]);
        assert_eq!(set.len(), 3);
        assert!(!set.contains(ids[1]));
        assert!(set.contains(ids[0]));
        assert!(set.contains(ids[2]));
        assert!(set.contains(ids[3]));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut world = World::new();
        let ids = entities(&mut world, 2);
        let mut set = IdleSet::default();
        set.insert(ids[0]);
        set.remove(ids[0]);
        set.remove(ids[0]);
        assert!(set.is_empty());
    }

    #[test]
    fn swap_remove_keeps_remaining_entries_findable() {
        let mut world = World::new();
        let ids = entities(&mut world, 5);
        let mut set = IdleSet::default();
        for id in &ids {
            set.insert(*id);
        }
        set.remove(ids[0]);
        for id in ids.iter().skip(1) {
            assert!(set.contains(*id));
        }
    }
}
