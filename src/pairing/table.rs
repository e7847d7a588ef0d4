//! Device pairing table
//!
//! Maps physical controllers to combatant slots. Assignment is greedy and stable:
//! a paired controller stays with its slot until it disconnects, and free controllers
//! go to the lowest slot that lacks one, in the order they connected.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::states::play_match::constants::MAX_PLAYERS;

/// One pairing transition, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingChange {
    Paired { slot: usize, controller: Entity },
    Unpaired { slot: usize, controller: Entity },
    /// The slot lost its last input source and became inert
    Deactivated { slot: usize },
    /// An inert slot got an input source back
    Reactivated { slot: usize },
}

impl PairingChange {
    pub fn slot(&self) -> usize {
        match *self {
            PairingChange::Paired { slot, .. }
            | PairingChange::Unpaired { slot, .. }
            | PairingChange::Deactivated { slot }
            | PairingChange::Reactivated { slot } => slot,
        }
    }
}

pub type PairingChanges = SmallVec<[PairingChange; 4]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SlotPairing {
    registered: bool,
    controller: Option<Entity>,
    inert: bool,
}

/// Process-wide controller ↔ slot table.
#[derive(Resource, Debug, Clone)]
pub struct DevicePairing {
    slots: [SlotPairing; MAX_PLAYERS],
    /// Connected controllers in connection order
    connected: Vec<Entity>,
    /// Whether slot 0 may be driven from the keyboard
    pub keyboard_fallback: bool,
    /// Whether a slot without any input source is inert
    pub require_controller: bool,
}

impl Default for DevicePairing {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl DevicePairing {
    pub fn new(keyboard_fallback: bool, require_controller: bool) -> Self {
        Self {
            slots: [SlotPairing::default(); MAX_PLAYERS],
            connected: Vec::new(),
            keyboard_fallback,
            require_controller,
        }
    }

    /// Make `slot` eligible for pairing and assign a free controller if one exists.
    pub fn register_slot(&mut self, slot: usize) -> PairingChanges {
        let mut changes = PairingChanges::new();
        let Some(entry) = self.slots.get_mut(slot) else {
            warn!("Cannot register pairing slot {}", slot);
            return changes;
        };
        entry.registered = true;
        changes.extend(self.assign_unpaired_controllers());
        self.refresh_inert(slot, &mut changes);
        changes
    }

    /// Release a slot's controller and take it out of pairing.
    pub fn release_slot(&mut self, slot: usize) -> PairingChanges {
        let mut changes = PairingChanges::new();
        if let Some(entry) = self.slots.get_mut(slot) {
            if let Some(controller) = entry.controller.take() {
                changes.push(PairingChange::Unpaired { slot, controller });
            }
            *entry = SlotPairing::default();
        }
        changes.extend(self.assign_unpaired_controllers());
        changes
    }

    /// Give every free connected controller to the lowest slot lacking one.
    pub fn assign_unpaired_controllers(&mut self) -> PairingChanges {
        let mut changes = PairingChanges::new();
        let mut free = self
            .connected
            .iter()
            .copied()
            .filter(|c| !self.slots.iter().any(|s| s.controller == Some(*c)))
            .collect::<SmallVec<[Entity; MAX_PLAYERS]>>()
            .into_iter();

        for slot in 0..MAX_PLAYERS {
            let entry = self.slots[slot];
            if !entry.registered || entry.controller.is_some() {
                continue;
            }
            let Some(controller) = free.next() else {
                break;
            };
            self.slots[slot].controller = Some(controller);
            changes.push(PairingChange::Paired { slot, controller });
            self.refresh_inert(slot, &mut changes);
        }
        changes
    }

    pub fn controller_connected(&mut self, controller: Entity) -> PairingChanges {
        if !self.connected.contains(&controller) {
            self.connected.push(controller);
        }
        self.assign_unpaired_controllers()
    }

    pub fn controller_disconnected(&mut self, controller: Entity) -> PairingChanges {
        let mut changes = PairingChanges::new();
        self.connected.retain(|c| *c != controller);

        if let Some(slot) = self.slot_for(controller) {
            self.slots[slot].controller = None;
            changes.push(PairingChange::Unpaired { slot, controller });
            // A spare controller takes over before the slot can go inert
            changes.extend(self.assign_unpaired_controllers());
            self.refresh_inert(slot, &mut changes);
        }
        changes
    }

    fn refresh_inert(&mut self, slot: usize, changes: &mut PairingChanges) {
        let has_source = self.slots[slot].controller.is_some() || self.has_keyboard_fallback(slot);
        let inert = self.require_controller && self.slots[slot].registered && !has_source;
        let was_inert = std::mem::replace(&mut self.slots[slot].inert, inert);
        match (was_inert, inert) {
            (false, true) => changes.push(PairingChange::Deactivated { slot }),
            (true, false) => changes.push(PairingChange::Reactivated { slot }),
            _ => {}
        }
    }

    pub fn controller_for(&self, slot: usize) -> Option<Entity> {
        self.slots.get(slot).and_then(|s| s.controller)
    }

    pub fn slot_for(&self, controller: Entity) -> Option<usize> {
        self.slots.iter().position(|s| s.controller == Some(controller))
    }

    /// Only slot 0 can use the keyboard.
    pub fn has_keyboard_fallback(&self, slot: usize) -> bool {
        slot == 0 && self.keyboard_fallback
    }

    pub fn is_inert(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.inert)
    }

    pub fn connected_controllers(&self) -> &[Entity] {
        &self.connected
    }
}
