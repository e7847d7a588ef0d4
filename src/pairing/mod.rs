//! Device Pairing Protocol
//!
//! Binds physical controllers to combatant slots and keeps the binding across
//! disconnects and reconnects. Slot 0 may fall back to the keyboard.

use bevy::prelude::*;

pub mod systems;
pub mod table;

pub use systems::{ControllerConnectionEvent, PairingChangedEvent};
pub use table::{DevicePairing, PairingChange};

/// Pairing events and the table resource. Systems are scheduled by the match plugin.
pub struct PairingPlugin;

impl Plugin for PairingPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ControllerConnectionEvent>()
            .add_event::<PairingChangedEvent>();
        if !app.world().contains_resource::<DevicePairing>() {
            app.init_resource::<DevicePairing>();
        }
    }
}
