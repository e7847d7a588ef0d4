//! Combo & Attack Resolver
//!
//! Per-combatant attack state machine:
//!
//! ```text
//! Idle ──light──► LightWindup(1) ──light within window──► LightWindup(2)
//!   │                                                          │
//!   └──heavy──► HeavyWindup        (window expiry) ◄───────────┘
//! ```
//!
//! Each windup arms a pending hit whose delay timer counts down in the timer phase.
//! The hit lands exactly once, on the first tick its timer is at or below zero and
//! still above the underflow guard. Light and heavy cooldowns are independent.
//!
//! Pressing light and heavy on the same tick fires the one-shot special projectile
//! instead, once per session.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::events::{KnockbackRequest, ProjectileFiredEvent};
use super::components::{
    Body, Combatant, CombatantInput, Facing, GameplayGate, PlayMatchEntity, Projectile, Prop,
};
use super::knockback::AttackCategory;
use super::timers::TimerName;
use super::tuning::{AttackTuning, CombatTuning};

/// Presentation variant of an attack. Forward attacks still allow movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttackVariant {
    Forward,
    #[default]
    Stationary,
}

impl AttackVariant {
    pub fn from_axis(x: f32) -> Self {
        if x != 0.0 {
            AttackVariant::Forward
        } else {
            AttackVariant::Stationary
        }
    }
}

/// Attack state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    Idle,
    /// Light combo windup for hit 1 or 2
    LightWindup(u8),
    HeavyWindup,
}

/// A hit waiting for its delay to elapse.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PendingHit {
    /// Seconds until the hit lands; may go negative down to the underflow guard
    pub delay: f32,
    pub armed: bool,
    /// Set once the hit has landed; stays set until the owning window/cooldown resets it
    pub applied: bool,
}

impl PendingHit {
    fn arm(&mut self, delay: f32) {
        self.delay = delay;
        self.armed = true;
        self.applied = false;
    }

    fn reset(&mut self) {
        *self = PendingHit::default();
    }

    /// Count the delay down, clamping at the guard. A hit that reaches the guard
    /// without landing is disarmed.
    fn tick(&mut self, dt: f32, guard: f32) {
        if !self.armed {
            return;
        }
        self.delay = (self.delay - dt).max(guard);
        if self.delay <= guard && !self.applied {
            self.armed = false;
        }
    }

    pub fn is_due(&self, guard: f32) -> bool {
        self.armed && !self.applied && self.delay <= 0.0 && self.delay > guard
    }
}

/// Something an attack press started this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackTrigger {
    Projectile,
    Light { hit_index: usize, variant: AttackVariant },
    Heavy { variant: AttackVariant },
}

/// A hit whose delay elapsed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueHit {
    Light(usize),
    Heavy,
}

/// Light combo and heavy attack state of one combatant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackState {
    /// Light hits in the current combo (0-2)
    pub combo_count: u8,
    pub light_hits: [PendingHit; 2],
    pub heavy_hit: PendingHit,
    pub light_active: bool,
    pub light_variant: AttackVariant,
    pub heavy_active: bool,
    pub heavy_variant: AttackVariant,
    /// One-shot special projectile consumed for the rest of the session
    pub projectile_fired: bool,
}

impl AttackState {
    pub fn phase(&self) -> AttackPhase {
        if self.heavy_hit.armed && !self.heavy_hit.applied {
            return AttackPhase::HeavyWindup;
        }
        for (index, hit) in self.light_hits.iter().enumerate().rev() {
            if hit.armed && !hit.applied {
                return AttackPhase::LightWindup(index as u8 + 1);
            }
        }
        AttackPhase::Idle
    }

    /// Whether a stationary attack currently roots the combatant.
    pub fn roots_movement(&self) -> bool {
        (self.light_active && self.light_variant == AttackVariant::Stationary)
            || (self.heavy_active && self.heavy_variant == AttackVariant::Stationary)
    }

    /// Whether a forward light attack slows movement.
    pub fn slows_movement(&self) -> bool {
        self.light_active && self.light_variant == AttackVariant::Forward
    }

    /// Handle this tick's attack presses.
    pub fn press(
        &mut self,
        light: bool,
        heavy: bool,
        axis_x: f32,
        timers: &mut super::timers::TimerBank,
        tuning: &AttackTuning,
    ) -> SmallVec<[AttackTrigger; 2]> {
        let mut triggers = SmallVec::new();

        if light && heavy && !self.projectile_fired {
            self.projectile_fired = true;
            triggers.push(AttackTrigger::Projectile);
            return triggers;
        }

        let variant = AttackVariant::from_axis(axis_x);
        if light {
            if let Some(trigger) = self.press_light(variant, timers, tuning) {
                triggers.push(trigger);
            }
        }
        if heavy {
            if let Some(trigger) = self.press_heavy(variant, timers, tuning) {
                triggers.push(trigger);
            }
        }
        triggers
    }

    fn press_light(
        &mut self,
        variant: AttackVariant,
        timers: &mut super::timers::TimerBank,
        tuning: &AttackTuning,
    ) -> Option<AttackTrigger> {
        if timers.is_running(TimerName::LightCooldown) {
            return None;
        }

        let advanced = if timers.is_running(TimerName::ComboWindow) {
            let previous = self.combo_count;
            self.combo_count = (self.combo_count + 1).min(2);
            self.combo_count != previous
        } else {
            self.combo_count = 1;
            for hit in self.light_hits.iter_mut() {
                hit.reset();
            }
            true
        };

        timers.set(TimerName::LightCooldown, tuning.light_cooldown);
        timers.set(TimerName::ComboWindow, tuning.combo_window);
        self.light_active = true;
        self.light_variant = variant;

        if !advanced {
            return None;
        }

        let hit_index = usize::from(self.combo_count - 1);
        let hit = &mut self.light_hits[hit_index];
        if hit.armed || hit.applied {
            return None;
        }
        hit.arm(tuning.light_hit_delays[hit_index]);
        Some(AttackTrigger::Light { hit_index, variant })
    }

    fn press_heavy(
        &mut self,
        variant: AttackVariant,
        timers: &mut super::timers::TimerBank,
        tuning: &AttackTuning,
    ) -> Option<AttackTrigger> {
        if timers.is_running(TimerName::HeavyCooldown) {
            return None;
        }
        timers.set(TimerName::HeavyCooldown, tuning.heavy_cooldown);
        self.heavy_active = true;
        self.heavy_variant = variant;
        self.heavy_hit.arm(tuning.heavy_hit_delay);
        Some(AttackTrigger::Heavy { variant })
    }

    /// React to a timer from the bank reaching zero.
    pub fn on_timer_expired(&mut self, name: TimerName) {
        match name {
            TimerName::LightCooldown => {
                self.light_active = false;
            }
            TimerName::HeavyCooldown => {
                self.heavy_active = false;
                self.heavy_hit.reset();
            }
            TimerName::ComboWindow => {
                self.combo_count = 0;
                for hit in self.light_hits.iter_mut() {
                    hit.reset();
                }
            }
            _ => {}
        }
    }

    /// Count pending hit delays down by one tick.
    pub fn tick_delays(&mut self, dt: f32, guard: f32) {
        for hit in self.light_hits.iter_mut() {
            hit.tick(dt, guard);
        }
        self.heavy_hit.tick(dt, guard);
    }

    /// Hits that land this tick.
    pub fn due_hits(&self, guard: f32) -> SmallVec<[DueHit; 3]> {
        let mut due = SmallVec::new();
        for (index, hit) in self.light_hits.iter().enumerate() {
            if hit.is_due(guard) {
                due.push(DueHit::Light(index));
            }
        }
        if self.heavy_hit.is_due(guard) {
            due.push(DueHit::Heavy);
        }
        due
    }

    pub fn mark_applied(&mut self, hit: DueHit) {
        match hit {
            DueHit::Light(index) => self.light_hits[index].applied = true,
            DueHit::Heavy => self.heavy_hit.applied = true,
        }
    }

    /// Clear every in-flight attack. The projectile stays consumed.
    pub fn reset(&mut self) {
        let projectile_fired = self.projectile_fired;
        *self = AttackState {
            projectile_fired,
            ..AttackState::default()
        };
    }
}

// ============================================================================
// Hit detection
// ============================================================================

/// Axis-aligned box used for hitboxes and bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        delta.x < reach.x && delta.y < reach.y
    }
}

/// Hitbox of an attack in front of the attacker.
pub fn attack_hitbox(position: Vec2, facing: Facing, hit: DueHit, tuning: &AttackTuning) -> Aabb {
    let size = match hit {
        DueHit::Light(_) => tuning.light_hitbox,
        DueHit::Heavy => tuning.heavy_hitbox,
    };
    Aabb::new(
        position + Vec2::new(facing.sign() * tuning.hitbox_reach, 0.0),
        Vec2::new(size[0], size[1]) * 0.5,
    )
}

/// Something an attack can hit.
#[derive(Debug, Clone, Copy)]
pub struct HitTarget {
    pub entity: Entity,
    pub bounds: Aabb,
}

/// Targets overlapping `hitbox`, excluding the attacker itself.
pub fn overlapping_targets(
    hitbox: &Aabb,
    attacker: Entity,
    targets: &[HitTarget],
) -> SmallVec<[Entity; 4]> {
    targets
        .iter()
        .filter(|t| t.entity != attacker && hitbox.overlaps(&t.bounds))
        .map(|t| t.entity)
        .collect()
}

// ============================================================================
// Systems
// ============================================================================

/// Trigger attacks from this tick's presses and land every hit whose delay elapsed.
pub fn resolve_attacks(
    mut commands: Commands,
    gate: Res<GameplayGate>,
    tuning: Res<CombatTuning>,
    mut requests: EventWriter<KnockbackRequest>,
    mut fired: EventWriter<ProjectileFiredEvent>,
    mut combatants: Query<(Entity, &mut Combatant, &Transform, &Body, &CombatantInput)>,
    props: Query<(Entity, &Transform, &Body), (With<Prop>, Without<Combatant>)>,
) {
    if !gate.enabled {
        return;
    }

    let attack_tuning = &tuning.attacks;
    let mut targets: Vec<HitTarget> = combatants
        .iter()
        .filter(|(_, c, _, _, _)| c.is_hittable())
        .map(|(entity, _, transform, body, _)| HitTarget {
            entity,
            bounds: Aabb::new(transform.translation.truncate(), body.half_extents),
        })
        .collect();
    targets.extend(
        props
            .iter()
            .filter(|(_, _, body)| body.collider_enabled)
            .map(|(entity, transform, body)| HitTarget {
                entity,
                bounds: Aabb::new(transform.translation.truncate(), body.half_extents),
            }),
    );

    for (entity, mut combatant, transform, _body, input) in combatants.iter_mut() {
        if !combatant.is_controllable() || combatant.timers.is_running(TimerName::Dash) {
            continue;
        }
        let position = transform.translation.truncate();
        let combatant = &mut *combatant;

        let triggers = combatant.attacks.press(
            input.light_pressed,
            input.heavy_pressed,
            input.axis.x,
            &mut combatant.timers,
            attack_tuning,
        );
        for trigger in triggers {
            match trigger {
                AttackTrigger::Projectile => {
                    let direction = Vec2::new(combatant.facing.sign(), 0.0);
                    let projectile = commands
                        .spawn((
                            Projectile {
                                owner: entity,
                                direction,
                                speed: attack_tuning.projectile_speed,
                                knockback: attack_tuning.projectile_knockback,
                                lifetime: attack_tuning.projectile_lifetime,
                                radius: attack_tuning.projectile_radius,
                            },
                            Transform::from_translation(
                                (position + direction * attack_tuning.hitbox_reach).extend(0.0),
                            ),
                            PlayMatchEntity,
                        ))
                        .id();
                    fired.send(ProjectileFiredEvent {
                        owner: entity,
                        projectile,
                    });
                    info!("Player {} fired their special projectile", combatant.player_number());
                }
                AttackTrigger::Light { hit_index, variant } => {
                    debug!(
                        "Player {} light attack {} ({:?})",
                        combatant.player_number(),
                        hit_index + 1,
                        variant
                    );
                }
                AttackTrigger::Heavy { variant } => {
                    debug!("Player {} heavy attack ({:?})", combatant.player_number(), variant);
                }
            }
        }

        for hit in combatant.attacks.due_hits(attack_tuning.underflow_guard) {
            let hitbox = attack_hitbox(position, combatant.facing, hit, attack_tuning);
            let (base, category) = match hit {
                DueHit::Light(_) => (attack_tuning.light_knockback, AttackCategory::Light),
                DueHit::Heavy => (attack_tuning.heavy_knockback, AttackCategory::Heavy),
            };
            for target in overlapping_targets(&hitbox, entity, &targets) {
                requests.send(KnockbackRequest {
                    attacker: entity,
                    attacker_position: position,
                    target,
                    base,
                    category,
                });
            }
            combatant.attacks.mark_applied(hit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::play_match::timers::TimerBank;

    const DT: f32 = 1.0 / 60.0;

    fn tick(state: &mut AttackState, timers: &mut TimerBank, tuning: &AttackTuning) {
        for name in timers.tick(DT) {
            state.on_timer_expired(name);
        }
        state.tick_delays(DT, tuning.underflow_guard);
    }

    #[test]
    fn test_first_light_press_starts_combo() {
        let tuning = AttackTuning::default();
        let mut timers = TimerBank::default();
        let mut state = AttackState::default();

        let triggers = state.press(true, false, 0.0, &mut timers, &tuning);
        assert_eq!(
            triggers.as_slice(),
            &[AttackTrigger::Light { hit_index: 0, variant: AttackVariant::Stationary }]
        );
        assert_eq!(state.combo_count, 1);
        assert_eq!(state.phase(), AttackPhase::LightWindup(1));
        assert!(state.roots_movement());
    }

    #[test]
    fn test_light_hit_lands_once_after_delay() {
        let tuning = AttackTuning::default();
        let mut timers = TimerBank::default();
        let mut state = AttackState::default();
        state.press(true, false, 1.0, &mut timers, &tuning);
        assert!(state.slows_movement());

        let mut landed = 0;
        for _ in 0..30 {
            tick(&mut state, &mut timers, &tuning);
            for hit in state.due_hits(tuning.underflow_guard) {
                assert_eq!(hit, DueHit::Light(0));
                state.mark_applied(hit);
                landed += 1;
            }
        }
        assert_eq!(landed, 1);
    }

    #[test]
    fn test_combo_caps_at_two() {
        let tuning = AttackTuning::default();
        let mut timers = TimerBank::default();
        let mut state = AttackState::default();

        state.press(true, false, 0.0, &mut timers, &tuning);
        // wait out the light cooldown but stay inside the combo window
        for _ in 0..16 {
            tick(&mut state, &mut timers, &tuning);
        }
        let second = state.press(true, false, 0.0, &mut timers, &tuning);
        assert_eq!(second.len(), 1);
        assert_eq!(state.combo_count, 2);

        for _ in 0..16 {
            tick(&mut state, &mut timers, &tuning);
        }
        let third = state.press(true, false, 0.0, &mut timers, &tuning);
        assert!(third.is_empty(), "a third press must not open another hit");
        assert_eq!(state.combo_count, 2);
    }

    #[test]
    fn test_press_on_cooldown_is_ignored() {
        let tuning = AttackTuning::default();
        let mut timers = TimerBank::default();
        let mut state = AttackState::default();
        state.press(true, false, 0.0, &mut timers, &tuning);
        tick(&mut state, &mut timers, &tuning);
        let again = state.press(true, false, 0.0, &mut timers, &tuning);
        assert!(again.is_empty());
        assert_eq!(state.combo_count, 1);
    }

    #[test]
    fn test_combo_window_expiry_resets() {
        let tuning = AttackTuning::default();
        let mut timers = TimerBank::default();
        let mut state = AttackState::default();
        state.press(true, false, 0.0, &mut timers, &tuning);
        for _ in 0..60 {
            tick(&mut state, &mut timers, &tuning);
            for hit in state.due_hits(tuning.underflow_guard) {
                state.mark_applied(hit);
            }
        }
        assert_eq!(state.combo_count, 0);
        assert!(!state.light_hits[0].applied);
        assert!(!state.light_active);
        assert_eq!(state.phase(), AttackPhase::Idle);
    }

    #[test]
    fn test_simultaneous_press_fires_projectile_once() {
        let tuning = AttackTuning::default();
        let mut timers = TimerBank::default();
        let mut state = AttackState::default();

        let first = state.press(true, true, 0.0, &mut timers, &tuning);
        assert_eq!(first.as_slice(), &[AttackTrigger::Projectile]);
        assert!(state.projectile_fired);

        for _ in 0..120 {
            tick(&mut state, &mut timers, &tuning);
        }
        let second = state.press(true, true, 0.0, &mut timers, &tuning);
        assert!(!second.contains(&AttackTrigger::Projectile));
    }

    #[test]
    fn test_heavy_independent_of_light_cooldown() {
        let tuning = AttackTuning::default();
        let mut timers = TimerBank::default();
        let mut state = AttackState::default();
        state.press(true, false, 0.0, &mut timers, &tuning);
        let heavy = state.press(false, true, 0.5, &mut timers, &tuning);
        assert_eq!(
            heavy.as_slice(),
            &[AttackTrigger::Heavy { variant: AttackVariant::Forward }]
        );
        assert_eq!(state.phase(), AttackPhase::HeavyWindup);
    }

    #[test]
    fn test_hit_past_underflow_guard_never_lands() {
        let tuning = AttackTuning::default();
        let mut hit = PendingHit::default();
        hit.arm(0.05);
        // one big step straight past zero and the guard
        hit.tick(1.0, tuning.underflow_guard);
        assert!(!hit.is_due(tuning.underflow_guard));
        assert!(!hit.armed);
    }

    #[test]
    fn test_reset_keeps_projectile_consumed() {
        let mut state = AttackState {
            projectile_fired: true,
            combo_count: 2,
            ..AttackState::default()
        };
        state.reset();
        assert!(state.projectile_fired);
        assert_eq!(state.combo_count, 0);
    }

    #[test]
    fn test_hitbox_follows_facing() {
        let tuning = AttackTuning::default();
        let right = attack_hitbox(Vec2::ZERO, Facing::Right, DueHit::Light(0), &tuning);
        let left = attack_hitbox(Vec2::ZERO, Facing::Left, DueHit::Light(0), &tuning);
        assert!(right.center.x > 0.0);
        assert_eq!(left.center.x, -right.center.x);
    }

    #[test]
    fn test_overlapping_targets_excludes_attacker() {
        let me = Entity::from_raw(1);
        let other = Entity::from_raw(2);
        let far = Entity::from_raw(3);
        let hitbox = Aabb::new(Vec2::new(0.9, 0.0), Vec2::new(0.6, 0.5));
        let targets = [
            HitTarget {
                entity: me,
                bounds: Aabb::new(Vec2::ZERO, Vec2::new(0.4, 0.8)),
            },
            HitTarget {
                entity: other,
                bounds: Aabb::new(Vec2::new(1.2, 0.0), Vec2::new(0.4, 0.8)),
            },
            HitTarget {
                entity: far,
                bounds: Aabb::new(Vec2::new(5.0, 0.0), Vec2::new(0.4, 0.8)),
            },
        ];
        let hits = overlapping_targets(&hitbox, me, &targets);
        assert_eq!(hits.as_slice(), &[other]);
    }
}
