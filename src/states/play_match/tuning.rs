//! Data-Driven Combat Tuning
//!
//! Every gameplay constant the combatant controller reads lives in [`CombatTuning`].
//! Values can be overridden from `assets/config/tuning.ron`; any field left out of
//! the file keeps its built-in default.
//!
//! ## Usage
//! ```ignore
//! fn my_system(tuning: Res<CombatTuning>) {
//!     println!("Combo window: {}s", tuning.attacks.combo_window);
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Default location of the tuning override file.
pub const TUNING_PATH: &str = "assets/config/tuning.ron";

/// Horizontal movement, jumping, dashing and platform drop-through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    /// Top horizontal speed in units per second
    pub top_speed: f32,
    /// Blend rate toward the target speed while grounded (per second)
    pub ground_blend_rate: f32,
    /// Blend rate toward the target speed while airborne (per second)
    pub air_blend_rate: f32,
    /// Speed multiplier while a forward light attack is active
    pub attacking_speed_factor: f32,
    /// Upward velocity granted by a jump
    pub jump_impulse: f32,
    /// Maximum jumps per airborne sequence (ground jump + air jumps)
    pub max_jumps: u8,
    /// Horizontal speed forced during a dash
    pub dash_speed: f32,
    /// Dash duration in seconds
    pub dash_duration: f32,
    /// Cooldown after a dash ends, in seconds
    pub dash_cooldown: f32,
    /// Time a dropped-through platform stays passable, in seconds
    pub drop_through_delay: f32,
    /// Cooldown between two drop-throughs, in seconds
    pub drop_through_cooldown: f32,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            top_speed: 8.0,
            ground_blend_rate: 12.0,
            air_blend_rate: 5.0,
            attacking_speed_factor: 0.5,
            jump_impulse: 13.0,
            max_jumps: 2,
            dash_speed: 20.0,
            dash_duration: 0.18,
            dash_cooldown: 0.9,
            drop_through_delay: 0.5,
            drop_through_cooldown: 0.3,
        }
    }
}

/// Light combo, heavy attack and the one-shot special projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTuning {
    /// Time after a light attack during which the next light press continues the combo
    pub combo_window: f32,
    /// Cooldown between light attack presses
    pub light_cooldown: f32,
    /// Cooldown between heavy attack presses
    pub heavy_cooldown: f32,
    /// Delay before each light combo hit lands, indexed by combo hit
    pub light_hit_delays: [f32; 2],
    /// Delay before the heavy hit lands
    pub heavy_hit_delay: f32,
    /// A pending hit whose delay timer falls to or below this value is dropped unapplied
    pub underflow_guard: f32,
    /// Base knockback of a light hit
    pub light_knockback: f32,
    /// Base knockback of a heavy hit
    pub heavy_knockback: f32,
    /// Light hitbox size [width, height]
    pub light_hitbox: [f32; 2],
    /// Heavy hitbox size [width, height]
    pub heavy_hitbox: [f32; 2],
    /// Horizontal distance from the combatant center to the hitbox center
    pub hitbox_reach: f32,
    /// Projectile travel speed
    pub projectile_speed: f32,
    /// Projectile lifetime in seconds
    pub projectile_lifetime: f32,
    /// Projectile base knockback
    pub projectile_knockback: f32,
    /// Projectile collision radius
    pub projectile_radius: f32,
}

impl Default for AttackTuning {
    fn default() -> Self {
        Self {
            combo_window: 0.6,
            light_cooldown: 0.25,
            heavy_cooldown: 0.8,
            light_hit_delays: [0.1, 0.12],
            heavy_hit_delay: 0.35,
            underflow_guard: -0.5,
            light_knockback: 8.0,
            heavy_knockback: 14.0,
            light_hitbox: [1.2, 1.0],
            heavy_hitbox: [1.6, 1.2],
            hitbox_reach: 0.9,
            projectile_speed: 14.0,
            projectile_lifetime: 2.0,
            projectile_knockback: 10.0,
            projectile_radius: 0.35,
        }
    }
}

/// Knockback vectors and the accumulated-hit overflow launch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackTuning {
    /// Hits a combatant can absorb before the next one launches them
    pub hit_threshold: u32,
    /// Vertical factor for heavy hits
    pub heavy_vertical_factor: f32,
    /// Vertical factor for light and projectile hits
    pub light_vertical_factor: f32,
    /// Overflow launch horizontal multiplier
    pub overflow_horizontal_multiplier: f32,
    /// Extra overflow horizontal boost applied on top of the multiplier
    pub overflow_horizontal_boost: f32,
    /// Overflow launch vertical multiplier
    pub overflow_vertical_multiplier: f32,
    /// Minimum absolute horizontal speed of an overflow launch
    pub overflow_min_horizontal_speed: f32,
    /// Movement-input lockout after receiving knockback, in seconds
    pub lock_duration: f32,
}

impl Default for KnockbackTuning {
    fn default() -> Self {
        Self {
            hit_threshold: 20,
            heavy_vertical_factor: 1.5,
            light_vertical_factor: 0.8,
            overflow_horizontal_multiplier: 1.5,
            overflow_horizontal_boost: 1.2,
            overflow_vertical_multiplier: 3.0,
            overflow_min_horizontal_speed: 12.0,
            lock_duration: 0.2,
        }
    }
}

/// Death, respawn and elimination rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleTuning {
    /// Falling below this height kills the combatant
    pub death_height: f32,
    /// Time hidden before respawning, in seconds
    pub respawn_delay: f32,
    /// Invulnerability granted on respawn, in seconds
    pub invulnerability_duration: f32,
    /// Number of respawns before the next death eliminates
    pub max_respawns: u32,
}

impl Default for LifecycleTuning {
    fn default() -> Self {
        Self {
            death_height: -12.0,
            respawn_delay: 2.0,
            invulnerability_duration: 1.5,
            max_respawns: 3,
        }
    }
}

/// Complete set of gameplay constants.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub locomotion: LocomotionTuning,
    pub attacks: AttackTuning,
    pub knockback: KnockbackTuning,
    pub lifecycle: LifecycleTuning,
}

impl CombatTuning {
    /// Load tuning from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let tuning: CombatTuning = ron::from_str(&contents)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the controller's timing assumptions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.attacks;
        if a.underflow_guard >= 0.0 {
            return Err(ConfigError::Invalid(
                "attacks.underflow_guard must be negative".to_string(),
            ));
        }
        if a.combo_window <= 0.0 || a.light_cooldown < 0.0 || a.heavy_cooldown < 0.0 {
            return Err(ConfigError::Invalid(
                "attack windows and cooldowns must be non-negative".to_string(),
            ));
        }
        // Window and cooldown expiry clear pending hits, so every delay must fit inside
        if a.light_hit_delays.iter().any(|d| *d < 0.0 || *d >= a.combo_window) {
            return Err(ConfigError::Invalid(
                "light hit delays must be shorter than the combo window".to_string(),
            ));
        }
        if a.heavy_hit_delay < 0.0 || a.heavy_hit_delay >= a.heavy_cooldown {
            return Err(ConfigError::Invalid(
                "heavy hit delay must be shorter than the heavy cooldown".to_string(),
            ));
        }
        if self.locomotion.max_jumps == 0 {
            return Err(ConfigError::Invalid(
                "locomotion.max_jumps must be at least 1".to_string(),
            ));
        }
        if self.knockback.hit_threshold == 0 {
            return Err(ConfigError::Invalid(
                "knockback.hit_threshold must be positive".to_string(),
            ));
        }
        if self.lifecycle.respawn_delay < 0.0 || self.lifecycle.invulnerability_duration < 0.0 {
            return Err(ConfigError::Invalid(
                "lifecycle durations must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Load the default tuning file, keeping built-in values when it is missing or broken.
    pub fn load_or_default() -> Self {
        let path = Path::new(TUNING_PATH);
        if !path.exists() {
            info!("No tuning file at {:?}, using built-in values", path);
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(tuning) => {
                info!("Loaded combat tuning from {:?}", path);
                tuning
            }
            Err(e) => {
                warn!("Failed to load combat tuning: {}", e);
                Self::default()
            }
        }
    }
}

/// Plugin that makes [`CombatTuning`] available, unless a tuning was already inserted.
pub struct TuningPlugin;

impl Plugin for TuningPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<CombatTuning>() {
            app.insert_resource(CombatTuning::load_or_default());
        }
    }
}
