//! Component Definitions for Play Match
//!
//! ECS components and resources shared by the combatant controller, the physics
//! step and the match flow. Sub-state types (timers, locomotion, attacks, hit
//! counter, lifecycle) live in their own modules and are composed here.

use bevy::prelude::*;
use std::collections::HashMap;

use super::attacks::AttackState;
use super::deferred::DeferredQueue;
use super::knockback::HitCounter;
use super::lifecycle::Lifecycle;
use super::locomotion::LocomotionState;
use super::timers::{TimerBank, TimerName};
use super::tuning::CombatTuning;

// ============================================================================
// Resources
// ============================================================================

/// Process-wide switch read by every combatant each tick.
///
/// Only the pre-match countdown writes it. While closed, combatants still track
/// the ground and their timers but ignore movement and attack input.
#[derive(Resource, Debug, Clone, Copy)]
pub struct GameplayGate {
    pub enabled: bool,
}

impl Default for GameplayGate {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Simulation tick counter with a fixed step length.
#[derive(Resource, Debug, Clone, Copy)]
pub struct MatchClock {
    /// Ticks simulated so far
    pub tick: u64,
    /// Length of one tick in seconds
    pub dt: f32,
}

impl MatchClock {
    pub fn new(hz: f64) -> Self {
        Self {
            tick: 0,
            dt: (1.0 / hz) as f32,
        }
    }

    /// Seconds elapsed since the match started.
    pub fn elapsed_secs(&self) -> f32 {
        self.tick as f32 * self.dt
    }

    /// Number of whole ticks covering `seconds`, never less than one.
    pub fn ticks_for(&self, seconds: f32) -> u64 {
        ((seconds / self.dt).round() as u64).max(1)
    }
}

impl Default for MatchClock {
    fn default() -> Self {
        Self::new(super::constants::TICK_RATE_HZ)
    }
}

/// Pre-match countdown. The gameplay gate stays closed until it runs out.
#[derive(Resource, Debug, Clone)]
pub struct MatchCountdown {
    /// Seconds left before gameplay is enabled
    pub time_remaining: f32,
    /// Whether the countdown has finished
    pub finished: bool,
}

impl MatchCountdown {
    pub fn new(seconds: f32) -> Self {
        Self {
            time_remaining: seconds,
            finished: false,
        }
    }
}

impl Default for MatchCountdown {
    fn default() -> Self {
        Self::new(super::constants::PREMATCH_COUNTDOWN)
    }
}

/// Result of a finished match: set once at most one combatant remains.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Slot of the last combatant standing (None if everyone was eliminated on the same tick)
    pub winner: Option<usize>,
    /// Tick on which the match ended
    pub tick: u64,
}

// ============================================================================
// Marker Components
// ============================================================================

/// Marker component for all entities spawned for the match.
#[derive(Component)]
pub struct PlayMatchEntity;

/// Scenery with a physics body. Props take knockback but have no hit counter,
/// invulnerability or movement lock.
#[derive(Component)]
pub struct Prop;

/// Respawn anchor for a combatant slot.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpawnPoint {
    pub slot: usize,
}

// ============================================================================
// Facing
// ============================================================================

/// Horizontal facing. All mirrored transforms (hitbox offsets, dash direction,
/// sprite flip) are derived from this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// +1 for right, -1 for left
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_axis(x: f32) -> Option<Facing> {
        if x > 0.0 {
            Some(Facing::Right)
        } else if x < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

// ============================================================================
// Physics
// ============================================================================

/// Kinematic body driven by the physics step.
///
/// The controller only writes velocity and the enable flags; the physics step owns
/// integration and platform collision.
#[derive(Component, Debug, Clone)]
pub struct Body {
    pub velocity: Vec2,
    /// Half width and half height of the collision box
    pub half_extents: Vec2,
    /// When false the body passes through all platforms
    pub collider_enabled: bool,
    /// When false the physics step leaves the body untouched
    pub simulated: bool,
    /// Platforms this body currently passes through, with the drop-through generation
    /// that requested it
    pub ignored_platforms: HashMap<Entity, u32>,
}

impl Body {
    pub fn new(half_extents: Vec2) -> Self {
        Self {
            velocity: Vec2::ZERO,
            half_extents,
            collider_enabled: true,
            simulated: true,
            ignored_platforms: HashMap::new(),
        }
    }

    pub fn ignores(&self, platform: Entity) -> bool {
        self.ignored_platforms.contains_key(&platform)
    }

    /// Stop the body and take it out of the simulation.
    pub fn freeze(&mut self) {
        self.velocity = Vec2::ZERO;
        self.simulated = false;
    }
}

/// Static platform geometry. Position comes from the entity's `Transform`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Platform {
    pub half_extents: Vec2,
    /// One-way platforms are only solid from above and can be dropped through
    pub one_way: bool,
    /// The main floor is never droppable
    pub main: bool,
}

// ============================================================================
// Input & Presentation
// ============================================================================

/// Input sampled for a combatant this tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct CombatantInput {
    /// Movement axis, each component in [-1, 1]
    pub axis: Vec2,
    /// Whether "down" is held
    pub down: bool,
    pub jump_pressed: bool,
    pub dash_pressed: bool,
    pub light_pressed: bool,
    pub heavy_pressed: bool,
}

/// Named flags read by the animation layer every tick. Never read back by gameplay.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationFlags {
    pub moving: bool,
    pub light_attack: bool,
    pub heavy_attack: bool,
    pub forward_attack: bool,
    pub jumping: bool,
    pub airborne: bool,
    pub dashing: bool,
    pub hit: bool,
    pub launched: bool,
}

// ============================================================================
// Combatant
// ============================================================================

/// Whether the pairing layer currently gives this combatant an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Active,
    /// No controller (and no keyboard fallback) while one is required: every tick is a no-op
    Inert,
}

/// Per-match statistics, reported at match end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatantStats {
    pub hits_landed: u32,
    pub hits_taken: u32,
    pub launches_taken: u32,
    pub deaths: u32,
}

/// Core combatant component: the per-slot controller state machine.
#[derive(Component, Debug, Clone)]
pub struct Combatant {
    /// Player slot (0-3)
    pub slot: usize,
    pub facing: Facing,
    /// Facing restored on respawn
    pub spawn_facing: Facing,
    /// Anchor entity this combatant respawns at
    pub anchor: Option<Entity>,
    /// Fallback respawn position if the anchor entity is missing
    pub spawn_position: Vec2,
    pub timers: TimerBank,
    pub locomotion: LocomotionState,
    pub attacks: AttackState,
    pub hits: HitCounter,
    pub lifecycle: Lifecycle,
    pub control: ControlState,
    pub deferred: DeferredQueue,
    pub stats: CombatantStats,
}

impl Combatant {
    pub fn new(slot: usize, spawn_position: Vec2, facing: Facing, tuning: &CombatTuning) -> Self {
        Self {
            slot,
            facing,
            spawn_facing: facing,
            anchor: None,
            spawn_position,
            timers: TimerBank::default(),
            locomotion: LocomotionState::default(),
            attacks: AttackState::default(),
            hits: HitCounter::new(tuning.knockback.hit_threshold),
            lifecycle: Lifecycle::new(tuning.lifecycle.max_respawns),
            control: ControlState::Active,
            deferred: DeferredQueue::default(),
            stats: CombatantStats::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: Entity) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// 1-based player number shown to players and used in logs.
    pub fn player_number(&self) -> usize {
        self.slot + 1
    }

    pub fn is_eliminated(&self) -> bool {
        self.lifecycle.is_eliminated()
    }

    pub fn is_invulnerable(&self) -> bool {
        self.timers.is_running(TimerName::Invulnerability)
    }

    /// Whether the controller processes this combatant this tick.
    pub fn is_controllable(&self) -> bool {
        self.control == ControlState::Active && self.lifecycle.is_active()
    }

    /// Whether other combatants' hits can reach this one.
    pub fn is_hittable(&self) -> bool {
        self.is_controllable()
    }
}

/// Straight-line projectile fired by the one-shot special attack.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner: Entity,
    /// Unit travel direction
    pub direction: Vec2,
    pub speed: f32,
    pub knockback: f32,
    /// Seconds left before the projectile despawns
    pub lifetime: f32,
    pub radius: f32,
}
