//! Configuration errors
//!
//! Simulation code never fails: missing collaborators degrade to logged no-ops.
//! Only loading settings, tuning and headless configs can return an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("failed to serialize RON: {0}")]
    RonWrite(#[from] ron::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
