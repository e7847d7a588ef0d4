//! Headless mode for automated testing
//!
//! This module runs arena matches without any graphical output. Virtual controllers
//! replace gamepads, and input comes from per-slot scripts or seeded bots.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless match
//! cargo run --release -- --headless match_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "players": 3,
//!   "stage": "Battlefield",
//!   "max_duration_secs": 60,
//!   "random_seed": 42,
//!   "require_controller": true,
//!   "bots": [0, 2],
//!   "scripts": [
//!     { "slot": 1, "steps": [ { "start": 0.0, "end": 2.0, "axis": [1.0, 0.0] } ] }
//!   ],
//!   "hotplug": [ { "at": 5.0, "controller": 2, "connected": false } ]
//! }
//! ```

pub mod bot;
pub mod config;
pub mod runner;

pub use config::{HeadlessMatchConfig, HotplugStep, InputScript, ScriptButton, ScriptStep};
pub use runner::{
    build_headless_app, collect_match_result, run_headless_app, run_headless_match,
    CombatantResult, HeadlessPlugin, MatchResult,
};
