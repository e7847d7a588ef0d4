//! Pairing systems
//!
//! Hot-plug flows through [`ControllerConnectionEvent`]. Live mode bridges Bevy's
//! gamepad connection events into it; the headless runner sends it from its
//! hot-plug script.

use bevy::input::gamepad::{GamepadConnection, GamepadConnectionEvent};
use bevy::prelude::*;

use crate::states::play_match::components::{Body, Combatant, CombatantInput, ControlState};
use crate::states::play_match::input::ControllerFrame;
use super::table::{DevicePairing, PairingChange, PairingChanges};

/// A controller appeared or went away.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConnectionEvent {
    pub controller: Entity,
    pub connected: bool,
}

/// One change of the pairing table.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingChangedEvent(pub PairingChange);

fn announce(changes: PairingChanges, events: &mut EventWriter<PairingChangedEvent>) {
    for change in changes {
        match change {
            PairingChange::Paired { slot, controller } => {
                info!("Controller {:?} paired with Player {}", controller, slot + 1)
            }
            PairingChange::Unpaired { slot, controller } => {
                info!("Controller {:?} unpaired from Player {}", controller, slot + 1)
            }
            PairingChange::Deactivated { slot } => {
                warn!("Player {} has no input source and is inactive", slot + 1)
            }
            PairingChange::Reactivated { slot } => info!("Player {} is active again", slot + 1),
        }
        events.send(PairingChangedEvent(change));
    }
}

/// Translate Bevy gamepad hot-plug events into controller connection events.
pub fn bridge_gamepad_connections(
    mut commands: Commands,
    mut gamepad_events: EventReader<GamepadConnectionEvent>,
    mut connections: EventWriter<ControllerConnectionEvent>,
) {
    for event in gamepad_events.read() {
        let connected = matches!(event.connection, GamepadConnection::Connected { .. });
        if connected {
            commands
                .entity(event.gamepad)
                .insert(ControllerFrame::default());
        }
        connections.send(ControllerConnectionEvent {
            controller: event.gamepad,
            connected,
        });
    }
}

/// Apply connection events to the pairing table.
pub fn handle_controller_connections(
    mut connections: EventReader<ControllerConnectionEvent>,
    mut pairing: ResMut<DevicePairing>,
    mut changed: EventWriter<PairingChangedEvent>,
) {
    for event in connections.read() {
        let changes = if event.connected {
            pairing.controller_connected(event.controller)
        } else {
            pairing.controller_disconnected(event.controller)
        };
        announce(changes, &mut changed);
    }
}

/// Register any combatant whose slot the pairing table does not know yet.
pub fn register_combatant_slots(
    mut pairing: ResMut<DevicePairing>,
    new_combatants: Query<&Combatant, Added<Combatant>>,
    mut changed: EventWriter<PairingChangedEvent>,
) {
    for combatant in new_combatants.iter() {
        let changes = pairing.register_slot(combatant.slot);
        announce(changes, &mut changed);
    }
}

/// Mirror the pairing table's inert flags onto the combatants.
///
/// Going inert freezes the body in place; coming back resumes simulation only for a
/// combatant that is alive.
pub fn sync_control_state(
    pairing: Res<DevicePairing>,
    mut combatants: Query<(&mut Combatant, &mut Body, &mut CombatantInput)>,
) {
    if !pairing.is_changed() {
        return;
    }
    for (mut combatant, mut body, mut input) in combatants.iter_mut() {
        let desired = if pairing.is_inert(combatant.slot) {
            ControlState::Inert
        } else {
            ControlState::Active
        };
        if combatant.control == desired {
            continue;
        }
        combatant.control = desired;
        match desired {
            ControlState::Inert => {
                body.freeze();
                combatant.attacks.reset();
                *input = CombatantInput::default();
            }
            ControlState::Active => {
                body.simulated = combatant.lifecycle.is_active();
            }
        }
    }
}
