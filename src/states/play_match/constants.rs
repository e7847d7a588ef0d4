//! Simulation Constants
//!
//! Fixed values that are not part of [`CombatTuning`](super::tuning::CombatTuning):
//! tick rate, body sizes, probe distances and the physics step.

use bevy::prelude::Color;

// ============================================================================
// Session
// ============================================================================

/// Maximum number of simultaneous combatants.
pub const MAX_PLAYERS: usize = 4;

/// Minimum number of combatants in a match.
pub const MIN_PLAYERS: usize = 2;

/// Simulation ticks per second (`FixedUpdate` rate).
pub const TICK_RATE_HZ: f64 = 60.0;

/// Pre-match countdown before the gameplay gate opens, in seconds.
pub const PREMATCH_COUNTDOWN: f32 = 3.0;

// ============================================================================
// Bodies
// ============================================================================

pub const PLAYER_WIDTH: f32 = 0.8;
pub const PLAYER_HEIGHT: f32 = 1.6;

// ============================================================================
// Ground Probes
// ============================================================================

/// Downward probe length below the feet used for the grounded check.
pub const GROUND_PROBE_DISTANCE: f32 = 0.1;

/// Horizontal inset of the narrow probe from each side of the body.
pub const NARROW_PROBE_INSET: f32 = 0.25;

/// Extra horizontal reach of the wide fallback probe beyond the body.
pub const WIDE_PROBE_MARGIN: f32 = 0.1;

/// Short probe used to find a droppable platform directly underfoot.
pub const DROP_PROBE_DISTANCE: f32 = 0.05;

// ============================================================================
// Physics
// ============================================================================

/// Downward acceleration in units per second squared.
pub const GRAVITY: f32 = 30.0;

/// Terminal falling speed.
pub const MAX_FALL_SPEED: f32 = 40.0;

/// Horizontal damping applied to props on the ground (per second).
pub const PROP_GROUND_FRICTION: f32 = 6.0;

// ============================================================================
// Presentation
// ============================================================================

/// Debug sprite color per slot.
pub const PLAYER_COLORS: [Color; MAX_PLAYERS] = [
    Color::srgb(0.90, 0.30, 0.30),
    Color::srgb(0.30, 0.55, 0.95),
    Color::srgb(0.35, 0.85, 0.40),
    Color::srgb(0.95, 0.80, 0.25),
];
