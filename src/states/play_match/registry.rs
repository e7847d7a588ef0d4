//! Combatant Registry
//!
//! Slot → entity map for the combatants of the current match. Anything that needs
//! combatants in slot order (bot drivers, match results) looks them up here instead
//! of relying on query iteration order.

use bevy::prelude::*;

use super::constants::MAX_PLAYERS;

#[derive(Resource, Debug, Clone, Default)]
pub struct CombatantRegistry {
    slots: [Option<Entity>; MAX_PLAYERS],
}

impl CombatantRegistry {
    /// Record the combatant of `slot`. Out-of-range slots are ignored.
    pub fn register(&mut self, slot: usize, entity: Entity) {
        match self.slots.get_mut(slot) {
            Some(entry) => *entry = Some(entity),
            None => warn!("Cannot register combatant for slot {}", slot),
        }
    }

    pub fn entity(&self, slot: usize) -> Option<Entity> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.slots.iter().position(|e| *e == Some(entity))
    }

    /// Occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.map(|e| (slot, e)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_PLAYERS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CombatantRegistry::default();
        let a = Entity::from_raw(10);
        let b = Entity::from_raw(11);
        registry.register(2, b);
        registry.register(0, a);
        registry.register(7, a);

        assert_eq!(registry.entity(0), Some(a));
        assert_eq!(registry.entity(1), None);
        assert_eq!(registry.slot_of(b), Some(2));
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![(0, a), (2, b)]);
        assert_eq!(registry.len(), 2);
    }
}
