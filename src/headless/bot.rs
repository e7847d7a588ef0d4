//! Seeded bot input for headless matches
//!
//! Bots only produce device input: they steer toward the nearest opponent and mash
//! attacks in range. Everything else goes through the same controller as a player.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::states::play_match::components::Combatant;
use crate::states::play_match::input::Buttons;

/// Seedable random number generator for reproducible bot behaviour.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Random f32 in [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.random_f32() < probability
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Horizontal distance at which a bot stops approaching and starts attacking.
pub const BOT_ATTACK_RANGE: f32 = 1.4;

/// Height difference that makes a bot jump after its target.
pub const BOT_JUMP_HEIGHT: f32 = 1.5;

/// Per-slot bot memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct BotMemory {
    /// Buttons held last tick; a bot releases before pressing again
    pub last_held: Buttons,
}

/// What a bot holds this tick.
pub fn bot_decision(
    rng: &mut GameRng,
    memory: &mut BotMemory,
    position: Vec2,
    target: Option<Vec2>,
) -> (Vec2, Buttons) {
    let Some(target) = target else {
        memory.last_held = Buttons::default();
        return (Vec2::ZERO, Buttons::default());
    };

    let offset = target - position;
    let mut held = Buttons::default();
    let axis_x = if offset.x.abs() > BOT_ATTACK_RANGE {
        offset.x.signum()
    } else {
        // Face the target without walking through it
        offset.x.signum() * 0.3
    };

    let releasing = memory.last_held != Buttons::default();
    if !releasing {
        if offset.y > BOT_JUMP_HEIGHT && rng.chance(0.1) {
            held.jump = true;
        } else if offset.x.abs() <= BOT_ATTACK_RANGE && offset.y.abs() < BOT_JUMP_HEIGHT {
            if rng.chance(0.25) {
                held.light = true;
            } else if rng.chance(0.05) {
                held.heavy = true;
            }
        } else if rng.chance(0.01) {
            held.dash = true;
        }
    }

    memory.last_held = held;
    (Vec2::new(axis_x, 0.0), held)
}

/// Position of the nearest opponent still in the match.
pub fn nearest_opponent(
    slot: usize,
    position: Vec2,
    others: impl IntoIterator<Item = (usize, Vec2, bool)>,
) -> Option<Vec2> {
    others
        .into_iter()
        .filter(|(other, _, available)| *other != slot && *available)
        .map(|(_, pos, _)| pos)
        .min_by(|a, b| {
            a.distance_squared(position)
                .total_cmp(&b.distance_squared(position))
        })
}

/// Whether a combatant is worth chasing.
pub fn is_target(combatant: &Combatant) -> bool {
    combatant.lifecycle.is_active()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_repeats() {
        let mut a = GameRng::from_seed(7);
        let mut b = GameRng::from_seed(7);
        for _ in 0..10 {
            assert_eq!(a.random_f32(), b.random_f32());
        }
    }

    #[test]
    fn test_bot_walks_toward_far_target() {
        let mut rng = GameRng::from_seed(1);
        let mut memory = BotMemory::default();
        let (axis, _) = bot_decision(&mut rng, &mut memory, Vec2::ZERO, Some(Vec2::new(-6.0, 0.0)));
        assert_eq!(axis.x, -1.0);
    }

    #[test]
    fn test_bot_releases_between_presses() {
        let mut rng = GameRng::from_seed(3);
        let mut memory = BotMemory {
            last_held: Buttons { light: true, ..default() },
        };
        let (_, held) = bot_decision(&mut rng, &mut memory, Vec2::ZERO, Some(Vec2::new(0.5, 0.0)));
        assert_eq!(held, Buttons::default());
    }

    #[test]
    fn test_nearest_opponent_skips_self_and_unavailable() {
        let others = [
            (0, Vec2::ZERO, true),
            (1, Vec2::new(1.0, 0.0), false),
            (2, Vec2::new(3.0, 0.0), true),
            (3, Vec2::new(-5.0, 0.0), true),
        ];
        assert_eq!(nearest_opponent(0, Vec2::ZERO, others), Some(Vec2::new(3.0, 0.0)));
    }
}
