//! Skybrawl - Local Multiplayer Platform Arena Brawler
//!
//! Up to four players share one screen, knock each other around a small platform
//! stage and try to be the last one standing.
//!
//! This library exposes the simulation core, the pairing layer and headless
//! execution for testing and reuse.

pub mod cli;
pub mod combat;
pub mod error;
pub mod headless;
pub mod keybindings;
pub mod pairing;
pub mod settings;
pub mod states;
pub mod view;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use error::ConfigError;
pub use headless::{run_headless_match, HeadlessMatchConfig, MatchResult};
pub use states::match_config::MatchConfig;
