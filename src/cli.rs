//! Command-line interface for Skybrawl
//!
//! Supports both graphical (default) and headless modes.

use clap::Parser;
use std::path::PathBuf;

use crate::states::play_match::stage::StageId;

/// Local multiplayer platform arena brawler
#[derive(Parser, Debug)]
#[command(name = "skybrawl")]
#[command(about = "Local multiplayer platform arena brawler")]
#[command(version)]
pub struct Args {
    /// Run in headless mode with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Settings file to load instead of ./settings.ron
    #[arg(long, value_name = "SETTINGS_FILE")]
    pub settings: Option<PathBuf>,

    /// Maximum match duration in seconds (headless mode only, overrides the config)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Number of players (2-4)
    #[arg(long, default_value_t = 2)]
    pub players: usize,

    /// Stage to play on (live mode)
    #[arg(long, value_enum, default_value_t = StageArg::Battlefield)]
    pub stage: StageArg,
}

/// Stage names accepted on the command line
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageArg {
    Battlefield,
    Plateau,
}

impl From<StageArg> for StageId {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Battlefield => StageId::Battlefield,
            StageArg::Plateau => StageId::Plateau,
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
