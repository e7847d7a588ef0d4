//! Knockback & Health Model
//!
//! Turns a landed hit into a velocity for the target. Combatants count the hits they
//! absorb; once the count passes the threshold the next hit becomes an overflow launch
//! and the counter starts over.
//!
//! Non-combatant props receive the plain light/heavy vector without counting, lock or
//! invulnerability checks.

use bevy::prelude::*;

use crate::combat::events::{HitLandedEvent, KnockbackRequest};
use super::components::{Body, Combatant, Prop};
use super::timers::TimerName;
use super::tuning::{CombatTuning, KnockbackTuning};

/// What kind of attack produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackCategory {
    Light,
    Heavy,
    Projectile,
}

impl AttackCategory {
    pub fn name(&self) -> &'static str {
        match self {
            AttackCategory::Light => "light attack",
            AttackCategory::Heavy => "heavy attack",
            AttackCategory::Projectile => "projectile",
        }
    }
}

/// Which formula produced a knockback vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnockbackKind {
    Standard,
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackOutcome {
    pub velocity: Vec2,
    pub kind: KnockbackKind,
}

/// Accumulated-hit counter of a combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct HitCounter {
    /// Hits absorbed since the last launch or respawn
    pub accumulated: u32,
    /// The hit that takes `accumulated` past this value launches
    pub threshold: u32,
    /// Raised for the tick in which an overflow launch fired
    pub just_launched: bool,
}

impl HitCounter {
    pub fn new(threshold: u32) -> Self {
        Self {
            accumulated: 0,
            threshold,
            just_launched: false,
        }
    }

    pub fn reset(&mut self) {
        self.accumulated = 0;
        self.just_launched = false;
    }
}

/// Unit vector from attacker to target (zero when they coincide).
pub fn knockback_direction(attacker: Vec2, target: Vec2) -> Vec2 {
    (target - attacker).normalize_or_zero()
}

/// Light/projectile and heavy knockback vectors.
pub fn standard_knockback(
    direction: Vec2,
    base: f32,
    category: AttackCategory,
    tuning: &KnockbackTuning,
) -> Vec2 {
    let vertical = match category {
        AttackCategory::Heavy => tuning.heavy_vertical_factor,
        AttackCategory::Light | AttackCategory::Projectile => tuning.light_vertical_factor,
    };
    Vec2::new(direction.x * base, base * vertical)
}

/// Overflow launch vector.
///
/// The horizontal component keeps the sign of the scaled value; only when that value
/// is exactly zero does the raw direction decide. A hit from directly above or below
/// therefore still launches sideways at the minimum speed.
pub fn overflow_launch(direction: Vec2, base: f32, tuning: &KnockbackTuning) -> Vec2 {
    let mut horizontal = direction.x
        * base
        * tuning.overflow_horizontal_multiplier
        * tuning.overflow_horizontal_boost;

    if horizontal.abs() < tuning.overflow_min_horizontal_speed {
        let sign = if horizontal != 0.0 {
            horizontal.signum()
        } else {
            direction.x.signum()
        };
        horizontal = sign * tuning.overflow_min_horizontal_speed;
    }

    Vec2::new(horizontal, base * tuning.overflow_vertical_multiplier)
}

/// Resolve a hit against a combatant's counter.
///
/// Returns `None` when the target is invulnerable; the counter is left untouched.
pub fn resolve_combatant_hit(
    counter: &mut HitCounter,
    invulnerable: bool,
    direction: Vec2,
    base: f32,
    category: AttackCategory,
    tuning: &KnockbackTuning,
) -> Option<KnockbackOutcome> {
    if invulnerable {
        return None;
    }

    counter.accumulated += 1;

    if counter.accumulated > counter.threshold {
        counter.accumulated = 0;
        counter.just_launched = true;
        return Some(KnockbackOutcome {
            velocity: overflow_launch(direction, base, tuning),
            kind: KnockbackKind::Overflow,
        });
    }

    Some(KnockbackOutcome {
        velocity: standard_knockback(direction, base, category, tuning),
        kind: KnockbackKind::Standard,
    })
}

/// Apply every knockback request queued this tick, in request order.
pub fn apply_knockback(
    tuning: Res<CombatTuning>,
    mut requests: EventReader<KnockbackRequest>,
    mut hit_events: EventWriter<HitLandedEvent>,
    mut targets: Query<(&Transform, &mut Body, Option<&mut Combatant>, Has<Prop>)>,
) {
    let mut landed: Vec<Entity> = Vec::new();

    for request in requests.read() {
        let Ok((transform, mut body, combatant, is_prop)) = targets.get_mut(request.target) else {
            warn!("Knockback target {:?} has no body, skipping", request.target);
            continue;
        };

        let target_position = transform.translation.truncate();
        let direction = knockback_direction(request.attacker_position, target_position);

        match combatant {
            Some(mut target) => {
                if !target.is_hittable() {
                    continue;
                }
                let invulnerable = target.is_invulnerable();
                let Some(outcome) = resolve_combatant_hit(
                    &mut target.hits,
                    invulnerable,
                    direction,
                    request.base,
                    request.category,
                    &tuning.knockback,
                ) else {
                    debug!("Player {} is invulnerable, hit discarded", target.player_number());
                    continue;
                };

                body.velocity = outcome.velocity;
                target.timers.set(TimerName::KnockbackLock, tuning.knockback.lock_duration);
                target.stats.hits_taken += 1;
                if outcome.kind == KnockbackKind::Overflow {
                    target.stats.launches_taken += 1;
                }

                hit_events.send(HitLandedEvent {
                    attacker: request.attacker,
                    target: request.target,
                    category: request.category,
                    knockback: outcome.velocity,
                    launched: outcome.kind == KnockbackKind::Overflow,
                    accumulated_hits: target.hits.accumulated,
                });
                landed.push(request.attacker);
            }
            None if is_prop => {
                body.velocity = standard_knockback(
                    direction,
                    request.base,
                    request.category,
                    &tuning.knockback,
                );
            }
            None => {
                debug!("Knockback target {:?} is neither combatant nor prop", request.target);
            }
        }
    }

    // Credit attackers once every target is resolved.
    for attacker in landed {
        if let Ok((_, _, Some(mut combatant), _)) = targets.get_mut(attacker) {
            combatant.stats.hits_landed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> KnockbackTuning {
        KnockbackTuning::default()
    }

    #[test]
    fn test_light_knockback_vector() {
        let v = standard_knockback(Vec2::X, 8.0, AttackCategory::Light, &tuning());
        assert_eq!(v, Vec2::new(8.0, 6.4));
    }

    #[test]
    fn test_heavy_knockback_vector() {
        let v = standard_knockback(Vec2::NEG_X, 10.0, AttackCategory::Heavy, &tuning());
        assert_eq!(v, Vec2::new(-10.0, 15.0));
    }

    #[test]
    fn test_overflow_fires_past_threshold_and_resets() {
        let mut counter = HitCounter::new(20);
        counter.accumulated = 20;
        let outcome = resolve_combatant_hit(
            &mut counter,
            false,
            Vec2::X,
            8.0,
            AttackCategory::Light,
            &tuning(),
        )
        .expect("hit should land");
        assert_eq!(outcome.kind, KnockbackKind::Overflow);
        assert_eq!(counter.accumulated, 0);
        assert!(counter.just_launched);
        assert_eq!(outcome.velocity.y, 8.0 * tuning().overflow_vertical_multiplier);
        assert!(outcome.velocity.x >= tuning().overflow_min_horizontal_speed);
    }

    #[test]
    fn test_at_threshold_is_still_standard() {
        let mut counter = HitCounter::new(3);
        counter.accumulated = 2;
        let outcome = resolve_combatant_hit(
            &mut counter,
            false,
            Vec2::X,
            8.0,
            AttackCategory::Light,
            &tuning(),
        )
        .expect("hit should land");
        assert_eq!(outcome.kind, KnockbackKind::Standard);
        assert_eq!(counter.accumulated, 3);
    }

    #[test]
    fn test_invulnerable_discards_hit() {
        let mut counter = HitCounter::new(20);
        counter.accumulated = 5;
        let outcome = resolve_combatant_hit(
            &mut counter,
            true,
            Vec2::X,
            8.0,
            AttackCategory::Heavy,
            &tuning(),
        );
        assert!(outcome.is_none());
        assert_eq!(counter.accumulated, 5);
    }

    #[test]
    fn test_overflow_exact_zero_uses_raw_direction() {
        // Straight down: scaled horizontal is exactly zero, raw x is +0.0
        let v = overflow_launch(Vec2::new(0.0, -1.0), 8.0, &tuning());
        assert_eq!(v.x, tuning().overflow_min_horizontal_speed);

        let v = overflow_launch(Vec2::new(-0.0, 1.0), 8.0, &tuning());
        assert_eq!(v.x, -tuning().overflow_min_horizontal_speed);
    }

    #[test]
    fn test_overflow_small_component_keeps_scaled_sign() {
        let dir = Vec2::new(-0.05, 0.9987).normalize();
        let v = overflow_launch(dir, 8.0, &tuning());
        assert_eq!(v.x, -tuning().overflow_min_horizontal_speed);
    }

    #[test]
    fn test_overflow_large_component_is_not_clamped() {
        let v = overflow_launch(Vec2::X, 20.0, &tuning());
        assert!((v.x - 20.0 * 1.5 * 1.2).abs() < 1e-4);
    }

    #[test]
    fn test_direction_of_coincident_points_is_zero() {
        assert_eq!(knockback_direction(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }
}
