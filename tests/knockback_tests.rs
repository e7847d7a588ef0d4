//! Tests for the knockback and hit-counter model through the public API
//!
//! These tests verify that:
//! - The accumulated-hit counter stays within 0..=threshold
//! - Every (threshold + 1)th hit launches
//! - Overflow launches respect the minimum horizontal speed and its sign rule
//! - Invulnerable targets never count a hit

use bevy::math::Vec2;
use skybrawl::states::play_match::knockback::{
    knockback_direction, overflow_launch, resolve_combatant_hit, standard_knockback,
    AttackCategory, HitCounter, KnockbackKind,
};
use skybrawl::states::play_match::tuning::KnockbackTuning;

fn hit(counter: &mut HitCounter, direction: Vec2) -> KnockbackKind {
    resolve_combatant_hit(
        counter,
        false,
        direction,
        8.0,
        AttackCategory::Light,
        &KnockbackTuning::default(),
    )
    .expect("vulnerable target")
    .kind
}

#[test]
fn test_counter_never_leaves_its_range() {
    let mut counter = HitCounter::new(20);
    for _ in 0..200 {
        hit(&mut counter, Vec2::X);
        assert!(counter.accumulated <= counter.threshold);
    }
}

#[test]
fn test_every_twenty_first_hit_launches() {
    let mut counter = HitCounter::new(20);
    let launches: Vec<usize> = (1..=63)
        .filter(|_| hit(&mut counter, Vec2::NEG_X) == KnockbackKind::Overflow)
        .collect();
    assert_eq!(launches, vec![21, 42, 63]);
}

#[test]
fn test_zero_threshold_launches_every_hit() {
    let mut counter = HitCounter::new(0);
    for _ in 0..5 {
        assert_eq!(hit(&mut counter, Vec2::X), KnockbackKind::Overflow);
        assert_eq!(counter.accumulated, 0);
    }
}

#[test]
fn test_invulnerable_target_is_untouched() {
    let tuning = KnockbackTuning::default();
    let mut counter = HitCounter::new(20);
    for _ in 0..30 {
        let outcome = resolve_combatant_hit(
            &mut counter,
            true,
            Vec2::X,
            14.0,
            AttackCategory::Heavy,
            &tuning,
        );
        assert!(outcome.is_none());
    }
    assert_eq!(counter.accumulated, 0);
    assert!(!counter.just_launched);
}

#[test]
fn test_overflow_speed_floor_from_any_angle() {
    let tuning = KnockbackTuning::default();
    for step in 0..36 {
        let angle = (step as f32 * 10.0).to_radians();
        let direction = Vec2::new(angle.cos(), angle.sin());
        let launch = overflow_launch(direction, 8.0, &tuning);
        assert!(
            launch.x.abs() >= tuning.overflow_min_horizontal_speed - 1e-4,
            "angle {} gave {:?}",
            step * 10,
            launch
        );
        assert_eq!(launch.y, 8.0 * tuning.overflow_vertical_multiplier);
    }
}

#[test]
fn test_overflow_pushes_away_from_attacker() {
    let tuning = KnockbackTuning::default();
    let left_of_target = knockback_direction(Vec2::new(-1.0, 0.0), Vec2::ZERO);
    let right_of_target = knockback_direction(Vec2::new(1.0, 0.2), Vec2::ZERO);
    assert!(overflow_launch(left_of_target, 8.0, &tuning).x > 0.0);
    assert!(overflow_launch(right_of_target, 8.0, &tuning).x < 0.0);
}

#[test]
fn test_heavy_lifts_more_than_light() {
    let tuning = KnockbackTuning::default();
    let light = standard_knockback(Vec2::X, 10.0, AttackCategory::Light, &tuning);
    let heavy = standard_knockback(Vec2::X, 10.0, AttackCategory::Heavy, &tuning);
    let projectile = standard_knockback(Vec2::X, 10.0, AttackCategory::Projectile, &tuning);
    assert_eq!(light.x, heavy.x);
    assert!(heavy.y > light.y);
    assert_eq!(projectile, light);
}

#[test]
fn test_vertical_hit_keeps_full_upward_component() {
    // Standard knockback ignores the direction's vertical part
    let tuning = KnockbackTuning::default();
    let v = standard_knockback(Vec2::NEG_Y, 8.0, AttackCategory::Light, &tuning);
    assert_eq!(v.x, 0.0);
    assert!(v.y > 0.0);
}
