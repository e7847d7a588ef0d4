//! Match setup and simulation
//!
//! `match_config` holds what is decided before a match; `play_match` runs it.

pub mod match_config;
pub mod play_match;

pub use match_config::MatchConfig;
