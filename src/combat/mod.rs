//! Combat system
//!
//! Events exchanged between the controller phases and the combat log that records
//! them. The recording system itself is scheduled with the rest of the match flow.

use bevy::prelude::*;

pub mod events;
pub mod log;
pub mod systems;

use events::*;

/// Plugin for combat events and the combat log
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Combat events
            .add_event::<KnockbackRequest>()
            .add_event::<HitLandedEvent>()
            .add_event::<CombatantDiedEvent>()
            .add_event::<CombatantRespawnedEvent>()
            .add_event::<ProjectileFiredEvent>()
            .add_event::<ProjectileExpiredEvent>()
            // Resources
            .init_resource::<log::CombatLog>();
    }
}
