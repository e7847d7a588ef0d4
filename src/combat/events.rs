//! Combat events
//!
//! Messages passed between the controller phases within a tick, and read afterwards
//! by the combat log and match flow.

use bevy::prelude::*;

use crate::states::play_match::knockback::AttackCategory;

/// A landed attack asking for knockback on `target`.
///
/// Resolved by the knockback phase in the order the requests were sent.
#[derive(Event, Debug, Clone)]
pub struct KnockbackRequest {
    /// Combatant credited with the hit (projectile owner for projectiles)
    pub attacker: Entity,
    /// Point the knockback direction is measured from
    pub attacker_position: Vec2,
    pub target: Entity,
    /// Base knockback magnitude
    pub base: f32,
    pub category: AttackCategory,
}

/// Fired when a hit actually moved a combatant (not discarded by invulnerability)
#[derive(Event, Debug, Clone)]
pub struct HitLandedEvent {
    pub attacker: Entity,
    pub target: Entity,
    pub category: AttackCategory,
    /// Velocity given to the target
    pub knockback: Vec2,
    /// Whether this hit was an overflow launch
    pub launched: bool,
    /// Target's accumulated-hit counter after the hit
    pub accumulated_hits: u32,
}

/// Fired when a combatant falls out of the arena
#[derive(Event, Debug, Clone)]
pub struct CombatantDiedEvent {
    pub entity: Entity,
    pub slot: usize,
    /// True when this death used up the last respawn
    pub eliminated: bool,
    pub respawns_used: u32,
}

#[derive(Event, Debug, Clone)]
pub struct CombatantRespawnedEvent {
    pub entity: Entity,
    pub slot: usize,
    pub position: Vec2,
}

/// Fired when the one-shot special projectile is spawned
#[derive(Event, Debug, Clone)]
pub struct ProjectileFiredEvent {
    pub owner: Entity,
    pub projectile: Entity,
}

/// Fired when a projectile runs out of lifetime without hitting anything
#[derive(Event, Debug, Clone)]
pub struct ProjectileExpiredEvent {
    pub owner: Entity,
    pub projectile: Entity,
}
