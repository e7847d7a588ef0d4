//! Lifecycle State Machine
//!
//! ```text
//! Active ──fell below death height──► Respawning ──delay──► Active
//!    │
//!    └──fell with no respawns left──► Eliminated (terminal)
//! ```
//!
//! Also owns the per-tick timer phase (timer bank, pending hit delays, deferred
//! actions) and the animation-flag derivation that closes each controller tick.

use bevy::prelude::*;

use crate::combat::events::{CombatantDiedEvent, CombatantRespawnedEvent};
use super::components::{
    AnimationFlags, Body, Combatant, ControlState, MatchClock, SpawnPoint,
};
use super::deferred::DeferredAction;
use super::timers::TimerName;
use super::tuning::CombatTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifeState {
    #[default]
    Active,
    Respawning,
    Eliminated,
}

/// Result of a death.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathOutcome {
    /// A respawn was scheduled under this generation
    Respawning { generation: u32 },
    Eliminated,
}

/// Life state and respawn budget of one combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    pub state: LifeState,
    pub respawns_used: u32,
    pub respawns_allowed: u32,
    /// Bumped on every death; a scheduled respawn only applies to its own generation
    pub generation: u32,
}

impl Lifecycle {
    pub fn new(respawns_allowed: u32) -> Self {
        Self {
            state: LifeState::Active,
            respawns_used: 0,
            respawns_allowed,
            generation: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == LifeState::Active
    }

    pub fn is_respawning(&self) -> bool {
        self.state == LifeState::Respawning
    }

    pub fn is_eliminated(&self) -> bool {
        self.state == LifeState::Eliminated
    }

    /// Register a fall out of the arena. Only an active combatant can die, so a
    /// repeated check on the same fall returns `None`.
    pub fn on_fell_out(&mut self) -> Option<DeathOutcome> {
        if !self.is_active() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.respawns_used >= self.respawns_allowed {
            self.state = LifeState::Eliminated;
            return Some(DeathOutcome::Eliminated);
        }
        self.respawns_used += 1;
        self.state = LifeState::Respawning;
        Some(DeathOutcome::Respawning {
            generation: self.generation,
        })
    }

    /// Finish a respawn scheduled under `generation`. Returns false for stale requests.
    pub fn complete_respawn(&mut self, generation: u32) -> bool {
        if self.state != LifeState::Respawning || generation != self.generation {
            return false;
        }
        self.state = LifeState::Active;
        true
    }

    pub fn respawns_remaining(&self) -> u32 {
        self.respawns_allowed.saturating_sub(self.respawns_used)
    }
}

/// Put a dead combatant out of play: cancels everything in flight and takes the body
/// out of the simulation.
fn take_out_of_play(combatant: &mut Combatant, body: &mut Body) {
    combatant.hits.reset();
    combatant.timers.clear_all();
    combatant.attacks.reset();
    combatant.locomotion.reset();
    body.freeze();
    body.collider_enabled = false;
    body.ignored_platforms.clear();
}

/// Kill combatants that fell below the death height.
pub fn check_out_of_bounds(
    clock: Res<MatchClock>,
    tuning: Res<CombatTuning>,
    mut combatants: Query<(Entity, &mut Combatant, &mut Body, &Transform)>,
    mut died: EventWriter<CombatantDiedEvent>,
) {
    for (entity, mut combatant, mut body, transform) in combatants.iter_mut() {
        if combatant.control == ControlState::Inert {
            continue;
        }
        if transform.translation.y >= tuning.lifecycle.death_height {
            continue;
        }
        let Some(outcome) = combatant.lifecycle.on_fell_out() else {
            continue;
        };

        take_out_of_play(&mut combatant, &mut body);
        combatant.stats.deaths += 1;

        let eliminated = match outcome {
            DeathOutcome::Respawning { generation } => {
                let due = clock.tick + clock.ticks_for(tuning.lifecycle.respawn_delay);
                combatant
                    .deferred
                    .schedule(due, DeferredAction::Respawn { generation });
                info!(
                    "Player {} fell out ({} of {} respawns used)",
                    combatant.player_number(),
                    combatant.lifecycle.respawns_used,
                    combatant.lifecycle.respawns_allowed
                );
                false
            }
            DeathOutcome::Eliminated => {
                info!("Player {} has been eliminated", combatant.player_number());
                true
            }
        };

        died.send(CombatantDiedEvent {
            entity,
            slot: combatant.slot,
            eliminated,
            respawns_used: combatant.lifecycle.respawns_used,
        });
    }
}

/// Decrement every combatant's timers and run deferred actions that fell due.
pub fn tick_combatant_timers(
    clock: Res<MatchClock>,
    tuning: Res<CombatTuning>,
    mut combatants: Query<(Entity, &mut Combatant, &mut Body, &mut Transform), Without<SpawnPoint>>,
    anchors: Query<&Transform, With<SpawnPoint>>,
    mut respawned: EventWriter<CombatantRespawnedEvent>,
) {
    for (entity, mut combatant, mut body, mut transform) in combatants.iter_mut() {
        if combatant.control == ControlState::Inert || combatant.is_eliminated() {
            continue;
        }
        let combatant = &mut *combatant;

        combatant.hits.just_launched = false;

        for name in combatant.timers.tick(clock.dt) {
            if name == TimerName::Dash {
                combatant
                    .timers
                    .set(TimerName::DashCooldown, tuning.locomotion.dash_cooldown);
            }
            combatant.attacks.on_timer_expired(name);
        }
        combatant
            .attacks
            .tick_delays(clock.dt, tuning.attacks.underflow_guard);

        for action in combatant.deferred.take_due(clock.tick) {
            match action {
                DeferredAction::Respawn { generation } => {
                    if !combatant.lifecycle.complete_respawn(generation) {
                        debug!(
                            "Player {} ignored stale respawn (generation {})",
                            combatant.player_number(),
                            generation
                        );
                        continue;
                    }
                    let position = match combatant.anchor.map(|a| anchors.get(a)) {
                        Some(Ok(anchor)) => anchor.translation.truncate(),
                        Some(Err(_)) => {
                            warn!(
                                "Player {} respawn anchor missing, using spawn position",
                                combatant.player_number()
                            );
                            combatant.spawn_position
                        }
                        None => combatant.spawn_position,
                    };
                    transform.translation = position.extend(transform.translation.z);
                    combatant.facing = combatant.spawn_facing;
                    combatant.timers.clear_all();
                    combatant.attacks.reset();
                    combatant.locomotion.reset();
                    combatant.hits.reset();
                    combatant.timers.set(
                        TimerName::Invulnerability,
                        tuning.lifecycle.invulnerability_duration,
                    );
                    body.velocity = Vec2::ZERO;
                    body.collider_enabled = true;
                    body.simulated = true;
                    body.ignored_platforms.clear();

                    info!("Player {} respawned", combatant.player_number());
                    respawned.send(CombatantRespawnedEvent {
                        entity,
                        slot: combatant.slot,
                        position,
                    });
                }
                DeferredAction::RestorePlatformCollision {
                    platform,
                    generation,
                } => {
                    if body.ignored_platforms.get(&platform) == Some(&generation) {
                        body.ignored_platforms.remove(&platform);
                    }
                }
            }
        }
    }
}

/// Flags for the animation layer, derived from controller state after every update.
pub fn animation_flags(combatant: &Combatant, body: &Body) -> AnimationFlags {
    if !combatant.lifecycle.is_active() || combatant.control == ControlState::Inert {
        return AnimationFlags::default();
    }
    let attacks = &combatant.attacks;
    let locomotion = &combatant.locomotion;
    AnimationFlags {
        moving: locomotion.grounded && locomotion.blend.abs() > 0.1,
        light_attack: attacks.light_active,
        heavy_attack: attacks.heavy_active,
        forward_attack: attacks.slows_movement()
            || (attacks.heavy_active
                && attacks.heavy_variant == super::attacks::AttackVariant::Forward),
        jumping: !locomotion.grounded && body.velocity.y > 0.0,
        airborne: !locomotion.grounded,
        dashing: combatant.timers.is_running(TimerName::Dash),
        hit: combatant.timers.is_running(TimerName::KnockbackLock),
        launched: combatant.hits.just_launched,
    }
}

pub fn derive_animation_flags(mut combatants: Query<(&Combatant, &Body, &mut AnimationFlags)>) {
    for (combatant, body, mut flags) in combatants.iter_mut() {
        let next = animation_flags(combatant, body);
        if *flags != next {
            *flags = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_plus_one_deaths_eliminate() {
        let mut life = Lifecycle::new(3);
        for expected_used in 1..=3 {
            let outcome = life.on_fell_out();
            assert!(matches!(outcome, Some(DeathOutcome::Respawning { .. })));
            assert_eq!(life.respawns_used, expected_used);
            assert!(life.complete_respawn(life.generation));
        }
        assert_eq!(life.on_fell_out(), Some(DeathOutcome::Eliminated));
        assert!(life.is_eliminated());
        assert_eq!(life.respawns_used, 3);
    }

    #[test]
    fn test_death_check_is_idempotent() {
        let mut life = Lifecycle::new(3);
        assert!(life.on_fell_out().is_some());
        assert_eq!(life.on_fell_out(), None);
        assert_eq!(life.respawns_used, 1);
    }

    #[test]
    fn test_stale_respawn_is_ignored() {
        let mut life = Lifecycle::new(3);
        let Some(DeathOutcome::Respawning { generation }) = life.on_fell_out() else {
            panic!("expected respawn");
        };
        assert!(!life.complete_respawn(generation + 1));
        assert!(life.is_respawning());
        assert!(life.complete_respawn(generation));
        assert!(!life.complete_respawn(generation));
    }

    #[test]
    fn test_zero_budget_eliminates_on_first_death() {
        let mut life = Lifecycle::new(0);
        assert_eq!(life.on_fell_out(), Some(DeathOutcome::Eliminated));
        assert_eq!(life.respawns_remaining(), 0);
    }

    #[test]
    fn test_eliminated_has_no_transitions() {
        let mut life = Lifecycle::new(0);
        life.on_fell_out();
        assert_eq!(life.on_fell_out(), None);
        assert!(!life.complete_respawn(life.generation));
        assert!(life.is_eliminated());
    }
}
