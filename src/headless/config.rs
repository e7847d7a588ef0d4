//! JSON configuration parsing for headless mode
//!
//! Parses JSON match configurations (players, stage, scripted input, controller
//! hot-plug, bots) and converts them to the game's MatchConfig format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::states::match_config::MatchConfig;
use crate::states::play_match::constants::MAX_PLAYERS;
use crate::states::play_match::stage::StageId;
use crate::states::play_match::tuning::CombatTuning;

/// Headless match configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessMatchConfig {
    /// Number of combatants (2-4)
    #[serde(default = "default_players")]
    pub players: usize,
    /// Stage name (default: "Battlefield")
    #[serde(default)]
    pub stage: StageId,
    /// Maximum match duration in seconds (default: 120)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for the bots; reproducible matches when set
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Slots without a controller (and without keyboard fallback) are inert
    #[serde(default)]
    pub require_controller: bool,
    /// Let slot 0 fall back to the (scripted) keyboard
    #[serde(default)]
    pub keyboard_fallback: bool,
    /// Virtual controllers connected at match start (default: one per player)
    #[serde(default)]
    pub controllers: Option<usize>,
    /// Overrides the respawn budget of every combatant
    #[serde(default)]
    pub max_respawns: Option<u32>,
    /// Pre-match countdown in seconds (default: none)
    #[serde(default)]
    pub countdown_secs: f32,
    /// Full tuning override; built-in values when absent
    #[serde(default)]
    pub tuning: Option<CombatTuning>,
    /// Slots driven by the seeded bot
    #[serde(default)]
    pub bots: Vec<usize>,
    /// Timed input for individual slots
    #[serde(default)]
    pub scripts: Vec<InputScript>,
    /// Controller connect/disconnect events after the start
    #[serde(default)]
    pub hotplug: Vec<HotplugStep>,
}

fn default_players() -> usize {
    2
}

fn default_max_duration() -> f32 {
    120.0
}

impl Default for HeadlessMatchConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            stage: StageId::default(),
            max_duration_secs: default_max_duration(),
            random_seed: None,
            require_controller: false,
            keyboard_fallback: false,
            controllers: None,
            max_respawns: None,
            countdown_secs: 0.0,
            tuning: None,
            bots: Vec::new(),
            scripts: Vec::new(),
            hotplug: Vec::new(),
        }
    }
}

/// Digital buttons a script can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptButton {
    Jump,
    Dash,
    Light,
    Heavy,
}

/// One held-input segment: `axis` and `buttons` are held for `start <= t < end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub start: f32,
    pub end: f32,
    #[serde(default)]
    pub axis: [f32; 2],
    #[serde(default)]
    pub buttons: Vec<ScriptButton>,
}

impl ScriptStep {
    pub fn is_active(&self, t: f32) -> bool {
        t >= self.start && t < self.end
    }
}

/// Input script of one slot. Drives whatever source the slot is paired with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    pub slot: usize,
    pub steps: Vec<ScriptStep>,
}

/// Connect or disconnect virtual controller `controller` at `at` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotplugStep {
    pub at: f32,
    pub controller: usize,
    pub connected: bool,
}

impl HeadlessMatchConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: HeadlessMatchConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: HeadlessMatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of virtual controllers connected at the start.
    pub fn initial_controllers(&self) -> usize {
        self.controllers.unwrap_or(self.players)
    }

    /// Number of virtual controllers the match needs in total.
    pub fn controller_count(&self) -> usize {
        self.hotplug
            .iter()
            .map(|step| step.controller + 1)
            .chain(std::iter::once(self.initial_controllers()))
            .max()
            .unwrap_or(0)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_match_config().validate()?;

        if self.max_duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "max_duration_secs must be positive".to_string(),
            ));
        }
        if let Some(tuning) = &self.tuning {
            tuning.validate()?;
        }
        for slot in self.bots.iter().chain(self.scripts.iter().map(|s| &s.slot)) {
            if *slot >= self.players {
                return Err(ConfigError::Invalid(format!(
                    "slot {} is out of range ({} players)",
                    slot, self.players
                )));
            }
        }
        for script in &self.scripts {
            if self.bots.contains(&script.slot) {
                return Err(ConfigError::Invalid(format!(
                    "slot {} has both a script and a bot",
                    script.slot
                )));
            }
            if let Some(step) = script.steps.iter().find(|s| s.end < s.start) {
                return Err(ConfigError::Invalid(format!(
                    "script step {}..{} for slot {} ends before it starts",
                    step.start, step.end, script.slot
                )));
            }
        }
        if self.controller_count() > MAX_PLAYERS * 2 {
            return Err(ConfigError::Invalid(format!(
                "at most {} virtual controllers are supported",
                MAX_PLAYERS * 2
            )));
        }
        if self.hotplug.iter().any(|step| step.at < 0.0) {
            return Err(ConfigError::Invalid(
                "hotplug times must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert to the game's MatchConfig format
    pub fn to_match_config(&self) -> MatchConfig {
        MatchConfig {
            players: self.players,
            stage: self.stage,
            max_respawns: self.max_respawns,
            require_controller: self.require_controller,
            keyboard_fallback: self.keyboard_fallback,
            countdown_secs: self.countdown_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config = HeadlessMatchConfig::from_json("{}").expect("valid");
        assert_eq!(config.players, 2);
        assert_eq!(config.stage, StageId::Battlefield);
        assert_eq!(config.initial_controllers(), 2);
        assert!(config.tuning.is_none());
    }

    #[test]
    fn test_script_and_hotplug_parse() {
        let json = r#"{
            "players": 3,
            "stage": "Plateau",
            "controllers": 2,
            "scripts": [
                {
                    "slot": 1,
                    "steps": [
                        { "start": 0.5, "end": 1.0, "axis": [1.0, 0.0], "buttons": ["Light"] }
                    ]
                }
            ],
            "hotplug": [ { "at": 2.0, "controller": 3, "connected": true } ]
        }"#;
        let config = HeadlessMatchConfig::from_json(json).expect("valid");
        assert_eq!(config.scripts[0].steps[0].buttons, vec![ScriptButton::Light]);
        assert!(config.scripts[0].steps[0].is_active(0.5));
        assert!(!config.scripts[0].steps[0].is_active(1.0));
        assert_eq!(config.controller_count(), 4);
    }

    #[test]
    fn test_out_of_range_slot_rejected() {
        let result = HeadlessMatchConfig::from_json(r#"{ "players": 2, "bots": [2] }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_player_count_rejected() {
        let result = HeadlessMatchConfig::from_json(r#"{ "players": 5 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_a_json_error() {
        let result = HeadlessMatchConfig::from_json("{ players: ");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
