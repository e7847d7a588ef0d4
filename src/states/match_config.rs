//! Match configuration data structures and resource
//!
//! Everything decided before a match starts: how many slots are filled, on which
//! stage, with which respawn budget and input policy.

use bevy::prelude::*;

use crate::error::ConfigError;
use super::play_match::constants::{MAX_PLAYERS, MIN_PLAYERS, PREMATCH_COUNTDOWN};
use super::play_match::stage::StageId;

/// Configuration for the match to be played
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Number of combatants (2-4); slots 0..players are filled
    pub players: usize,
    pub stage: StageId,
    /// Overrides the tuning's respawn budget when set
    pub max_respawns: Option<u32>,
    /// Slots without any input source are inert instead of idle
    pub require_controller: bool,
    /// Slot 0 may be driven from the keyboard
    pub keyboard_fallback: bool,
    /// Pre-match countdown in seconds
    pub countdown_secs: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            players: 2,
            stage: StageId::Battlefield,
            max_respawns: None,
            require_controller: false,
            keyboard_fallback: true,
            countdown_secs: PREMATCH_COUNTDOWN,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(ConfigError::Invalid(format!(
                "players must be between {} and {}, got {}",
                MIN_PLAYERS, MAX_PLAYERS, self.players
            )));
        }
        if self.countdown_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "countdown_secs must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
