//! Locomotion Engine
//!
//! Turns sampled input plus the grounded flag into a body velocity: smoothed
//! horizontal movement, ground and air jumps, dash and platform drop-through.
//! The physics step integrates the result afterwards.

use bevy::prelude::*;

use super::components::{Body, Combatant, CombatantInput, Facing, GameplayGate, MatchClock};
use super::deferred::DeferredAction;
use super::timers::TimerName;
use super::tuning::{CombatTuning, LocomotionTuning};

/// Platform directly underfoot, as reported by the ground probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundContact {
    pub platform: Entity,
    /// One-way, not the main floor, and within the short drop probe
    pub droppable: bool,
}

/// Movement bookkeeping of one combatant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocomotionState {
    pub grounded: bool,
    /// Jumps used since last touching the ground
    pub jump_count: u8,
    /// Smoothed horizontal velocity written this tick
    pub blend: f32,
    pub ground: Option<GroundContact>,
    /// Bumped on every drop-through; restores scheduled under older values are ignored
    pub drop_generation: u32,
}

impl LocomotionState {
    /// Apply the result of this tick's ground probe.
    pub fn set_ground(&mut self, contact: Option<GroundContact>) {
        self.grounded = contact.is_some();
        self.ground = contact;
        if self.grounded {
            self.jump_count = 0;
        }
    }

    pub fn reset(&mut self) {
        let drop_generation = self.drop_generation;
        *self = LocomotionState {
            drop_generation,
            ..LocomotionState::default()
        };
    }
}

/// How much control horizontal input has this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementGate {
    Free,
    /// Forward light attack: reduced top speed
    Slowed,
    /// Stationary attack: blend toward standing still
    Rooted,
    /// Knockback lock: velocity left to the knockback
    Locked,
}

pub fn movement_gate(combatant: &Combatant) -> MovementGate {
    if combatant.timers.is_running(TimerName::KnockbackLock) {
        MovementGate::Locked
    } else if combatant.attacks.roots_movement() {
        MovementGate::Rooted
    } else if combatant.attacks.slows_movement() {
        MovementGate::Slowed
    } else {
        MovementGate::Free
    }
}

/// Horizontal speed the blend aims for, or `None` when velocity is left untouched.
pub fn target_speed(axis_x: f32, gate: MovementGate, tuning: &LocomotionTuning) -> Option<f32> {
    let axis_x = axis_x.clamp(-1.0, 1.0);
    match gate {
        MovementGate::Free => Some(axis_x * tuning.top_speed),
        MovementGate::Slowed => Some(axis_x * tuning.top_speed * tuning.attacking_speed_factor),
        MovementGate::Rooted => Some(0.0),
        MovementGate::Locked => None,
    }
}

/// Exponential-style approach of `current` toward `target`.
pub fn blend_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Something the locomotion step did this tick, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionEvent {
    Jumped { air: bool },
    Dashed,
    DroppedThrough(Entity),
}

/// One locomotion tick for a controllable combatant.
///
/// `gameplay` is false while the gameplay gate is closed: input is ignored and the
/// combatant coasts to a stop.
pub fn step_locomotion(
    combatant: &mut Combatant,
    body: &mut Body,
    input: &CombatantInput,
    gameplay: bool,
    clock: &MatchClock,
    tuning: &LocomotionTuning,
) -> Option<LocomotionEvent> {
    let input = if gameplay {
        *input
    } else {
        CombatantInput::default()
    };
    let gate = movement_gate(combatant);

    // Dash overrides everything else while it runs.
    if combatant.timers.is_running(TimerName::Dash) {
        if gate != MovementGate::Locked {
            body.velocity.x = combatant.facing.sign() * tuning.dash_speed;
            body.velocity.y = body.velocity.y.max(0.0);
        }
        combatant.locomotion.blend = body.velocity.x;
        return None;
    }

    if matches!(gate, MovementGate::Free | MovementGate::Slowed) {
        if let Some(facing) = Facing::from_axis(input.axis.x) {
            combatant.facing = facing;
        }
    }

    if input.dash_pressed
        && gate != MovementGate::Locked
        && !combatant.timers.is_running(TimerName::DashCooldown)
    {
        combatant.timers.set(TimerName::Dash, tuning.dash_duration);
        body.velocity.x = combatant.facing.sign() * tuning.dash_speed;
        body.velocity.y = body.velocity.y.max(0.0);
        combatant.locomotion.blend = body.velocity.x;
        return Some(LocomotionEvent::Dashed);
    }

    let mut event = None;

    if input.down && combatant.locomotion.grounded {
        if let Some(contact) = combatant.locomotion.ground.filter(|c| c.droppable) {
            if !combatant.timers.is_running(TimerName::DropThroughCooldown) {
                let locomotion = &mut combatant.locomotion;
                locomotion.drop_generation = locomotion.drop_generation.wrapping_add(1);
                let generation = locomotion.drop_generation;
                body.ignored_platforms.insert(contact.platform, generation);
                locomotion.grounded = false;
                locomotion.ground = None;
                combatant.deferred.schedule(
                    clock.tick + clock.ticks_for(tuning.drop_through_delay),
                    DeferredAction::RestorePlatformCollision {
                        platform: contact.platform,
                        generation,
                    },
                );
                combatant
                    .timers
                    .set(TimerName::DropThroughCooldown, tuning.drop_through_cooldown);
                event = Some(LocomotionEvent::DroppedThrough(contact.platform));
            }
        }
    }

    if input.jump_pressed && event.is_none() && gate != MovementGate::Locked {
        let locomotion = &mut combatant.locomotion;
        if locomotion.grounded {
            body.velocity.y = tuning.jump_impulse;
            locomotion.jump_count = 1;
            locomotion.grounded = false;
            event = Some(LocomotionEvent::Jumped { air: false });
        } else if locomotion.jump_count < tuning.max_jumps {
            body.velocity.y = tuning.jump_impulse;
            locomotion.jump_count += 1;
            event = Some(LocomotionEvent::Jumped { air: true });
        }
    }

    if let Some(target) = target_speed(input.axis.x, gate, tuning) {
        let rate = if combatant.locomotion.grounded {
            tuning.ground_blend_rate
        } else {
            tuning.air_blend_rate
        };
        body.velocity.x = blend_toward(body.velocity.x, target, rate, clock.dt);
    }
    combatant.locomotion.blend = body.velocity.x;

    event
}

/// Run locomotion for every controllable combatant.
pub fn apply_locomotion(
    gate: Res<GameplayGate>,
    clock: Res<MatchClock>,
    tuning: Res<CombatTuning>,
    mut combatants: Query<(&mut Combatant, &mut Body, &CombatantInput)>,
) {
    for (mut combatant, mut body, input) in combatants.iter_mut() {
        if !combatant.is_controllable() || !body.simulated {
            continue;
        }
        let event = step_locomotion(
            &mut combatant,
            &mut body,
            input,
            gate.enabled,
            &clock,
            &tuning.locomotion,
        );
        if let Some(event) = event {
            debug!("Player {} {:?}", combatant.player_number(), event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::play_match::constants::{PLAYER_HEIGHT, PLAYER_WIDTH};

    fn setup() -> (Combatant, Body, MatchClock, LocomotionTuning) {
        let tuning = CombatTuning::default();
        let combatant = Combatant::new(0, Vec2::ZERO, Facing::Right, &tuning);
        let body = Body::new(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT) * 0.5);
        (combatant, body, MatchClock::new(60.0), tuning.locomotion)
    }

    fn grounded_on(combatant: &mut Combatant, platform: Entity, droppable: bool) {
        combatant
            .locomotion
            .set_ground(Some(GroundContact { platform, droppable }));
    }

    #[test]
    fn test_blend_approaches_top_speed() {
        let (mut c, mut body, clock, tuning) = setup();
        grounded_on(&mut c, Entity::from_raw(9), false);
        let input = CombatantInput { axis: Vec2::new(1.0, 0.0), ..default() };
        for _ in 0..120 {
            step_locomotion(&mut c, &mut body, &input, true, &clock, &tuning);
        }
        assert!((body.velocity.x - tuning.top_speed).abs() < 0.01);
        assert_eq!(c.facing, Facing::Right);
    }

    #[test]
    fn test_air_blend_is_slower_than_ground() {
        let (mut c, mut body, clock, tuning) = setup();
        let input = CombatantInput { axis: Vec2::new(1.0, 0.0), ..default() };
        step_locomotion(&mut c, &mut body, &input, true, &clock, &tuning);
        let air = body.velocity.x;

        let (mut c2, mut body2, _, _) = setup();
        grounded_on(&mut c2, Entity::from_raw(9), false);
        step_locomotion(&mut c2, &mut body2, &input, true, &clock, &tuning);
        assert!(body2.velocity.x > air);
    }

    #[test]
    fn test_forward_light_attack_halves_target() {
        assert_eq!(
            target_speed(1.0, MovementGate::Slowed, &LocomotionTuning::default()),
            Some(4.0)
        );
        let tuning = LocomotionTuning::default();
        assert_eq!(target_speed(-1.0, MovementGate::Rooted, &tuning), Some(0.0));
        assert_eq!(target_speed(1.0, MovementGate::Locked, &tuning), None);
    }

    #[test]
    fn test_knockback_lock_leaves_velocity() {
        let (mut c, mut body, clock, tuning) = setup();
        c.timers.set(TimerName::KnockbackLock, 0.2);
        body.velocity = Vec2::new(-9.0, 5.0);
        let input = CombatantInput {
            axis: Vec2::new(1.0, 0.0),
            jump_pressed: true,
            ..default()
        };
        step_locomotion(&mut c, &mut body, &input, true, &clock, &tuning);
        assert_eq!(body.velocity, Vec2::new(-9.0, 5.0));
        assert_eq!(c.facing, Facing::Right);
    }

    #[test]
    fn test_ground_then_air_jump_budget() {
        let (mut c, mut body, clock, tuning) = setup();
        grounded_on(&mut c, Entity::from_raw(9), false);
        let jump = CombatantInput { jump_pressed: true, ..default() };

        let first = step_locomotion(&mut c, &mut body, &jump, true, &clock, &tuning);
        assert_eq!(first, Some(LocomotionEvent::Jumped { air: false }));
        assert_eq!(c.locomotion.jump_count, 1);

        c.locomotion.set_ground(None);
        body.velocity.y = 2.0;
        let second = step_locomotion(&mut c, &mut body, &jump, true, &clock, &tuning);
        assert_eq!(second, Some(LocomotionEvent::Jumped { air: true }));
        assert_eq!(body.velocity.y, tuning.jump_impulse);

        body.velocity.y = 2.0;
        let third = step_locomotion(&mut c, &mut body, &jump, true, &clock, &tuning);
        assert_eq!(third, None);
        assert_eq!(body.velocity.y, 2.0);

        c.locomotion.set_ground(Some(GroundContact {
            platform: Entity::from_raw(9),
            droppable: false,
        }));
        assert_eq!(c.locomotion.jump_count, 0);
    }

    #[test]
    fn test_dash_forces_facing_speed_then_cooldown_blocks() {
        let (mut c, mut body, clock, tuning) = setup();
        c.facing = Facing::Left;
        let dash = CombatantInput { dash_pressed: true, ..default() };
        let event = step_locomotion(&mut c, &mut body, &dash, true, &clock, &tuning);
        assert_eq!(event, Some(LocomotionEvent::Dashed));
        assert_eq!(body.velocity.x, -tuning.dash_speed);

        // while dashing, movement input is overridden
        let push_right = CombatantInput { axis: Vec2::new(1.0, 0.0), ..default() };
        step_locomotion(&mut c, &mut body, &push_right, true, &clock, &tuning);
        assert_eq!(body.velocity.x, -tuning.dash_speed);
        assert_eq!(c.facing, Facing::Left);

        c.timers.clear(TimerName::Dash);
        c.timers.set(TimerName::DashCooldown, tuning.dash_cooldown);
        let again = step_locomotion(&mut c, &mut body, &dash, true, &clock, &tuning);
        assert_ne!(again, Some(LocomotionEvent::Dashed));
    }

    #[test]
    fn test_drop_through_schedules_restore() {
        let (mut c, mut body, clock, tuning) = setup();
        let platform = Entity::from_raw(4);
        grounded_on(&mut c, platform, true);
        let down = CombatantInput { down: true, axis: Vec2::new(0.0, -1.0), ..default() };

        let event = step_locomotion(&mut c, &mut body, &down, true, &clock, &tuning);
        assert_eq!(event, Some(LocomotionEvent::DroppedThrough(platform)));
        assert_eq!(body.ignored_platforms.get(&platform), Some(&1));
        assert!(!c.locomotion.grounded);
        assert_eq!(c.deferred.len(), 1);
        assert!(c.timers.is_running(TimerName::DropThroughCooldown));
    }

    #[test]
    fn test_main_floor_is_not_droppable() {
        let (mut c, mut body, clock, tuning) = setup();
        grounded_on(&mut c, Entity::from_raw(1), false);
        let down = CombatantInput { down: true, ..default() };
        let event = step_locomotion(&mut c, &mut body, &down, true, &clock, &tuning);
        assert_eq!(event, None);
        assert!(body.ignored_platforms.is_empty());
        assert!(c.locomotion.grounded);
    }

    #[test]
    fn test_closed_gate_ignores_input() {
        let (mut c, mut body, clock, tuning) = setup();
        grounded_on(&mut c, Entity::from_raw(9), false);
        let input = CombatantInput {
            axis: Vec2::new(-1.0, 0.0),
            jump_pressed: true,
            ..default()
        };
        let event = step_locomotion(&mut c, &mut body, &input, false, &clock, &tuning);
        assert_eq!(event, None);
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(c.facing, Facing::Right);
    }
}
