//! Skybrawl - Local Multiplayer Platform Arena Brawler
//!
//! Windowed by default; `--headless <CONFIG>` runs a scripted match without a
//! window and prints the result.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::process::ExitCode;

use skybrawl::cli::{self, Args};
use skybrawl::headless::{build_headless_app, run_headless_app, HeadlessMatchConfig};
use skybrawl::settings::{GameSettings, SettingsPlugin};
use skybrawl::states::match_config::MatchConfig;
use skybrawl::states::play_match::input::{read_gamepads, read_keyboard};
use skybrawl::states::play_match::systems::{advance_match_clock, InputStep};
use skybrawl::states::play_match::PlayMatchPlugin;
use skybrawl::pairing::systems::bridge_gamepad_connections;
use skybrawl::view::ViewPlugin;

fn main() -> ExitCode {
    let args = cli::parse_args();

    match &args.headless {
        Some(path) => run_headless(path, &args),
        None => run_live(&args),
    }
}

fn run_headless(path: &std::path::Path, args: &Args) -> ExitCode {
    let mut config = match HeadlessMatchConfig::load_from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load headless config {:?}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }

    println!("Starting headless match simulation...");
    println!("  Players: {}", config.players);
    println!("  Stage: {}", config.stage.name());
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let mut app = match build_headless_app(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Invalid headless config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    app.add_plugins(LogPlugin::default());
    let result = run_headless_app(app);

    for message in &result.log_messages {
        println!("[log] {}", message);
    }
    match (result.winner, result.timed_out) {
        (Some(slot), _) => println!("Winner: Player {}", slot + 1),
        (None, true) => println!("Match timed out after {:.1}s", result.match_time),
        (None, false) => println!("Match ended with no survivors"),
    }
    for c in &result.combatants {
        println!(
            "  Player {}: {} | respawns used {} | hits {} landed / {} taken | launched {}x",
            c.slot + 1,
            if c.eliminated {
                "eliminated"
            } else if c.inert {
                "inactive"
            } else {
                "standing"
            },
            c.respawns_used,
            c.hits_landed,
            c.hits_taken,
            c.launches_taken
        );
    }
    ExitCode::SUCCESS
}

fn run_live(args: &Args) -> ExitCode {
    let settings = match &args.settings {
        Some(path) => match GameSettings::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to load settings {:?}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => GameSettings::load(),
    };

    let match_config = MatchConfig {
        players: args.players,
        stage: args.stage.into(),
        max_respawns: None,
        require_controller: settings.require_controller,
        keyboard_fallback: settings.keyboard_fallback,
        countdown_secs: settings.countdown_secs,
    };
    if let Err(e) = match_config.validate() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let window = settings.window();
    let tuning = settings.tuning.clone();
    let mut app = App::new();
    if let Some(tuning) = tuning {
        info!("Using combat tuning from settings");
        app.insert_resource(tuning);
    }
    app
        // Bevy default plugins with custom window settings
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(window),
            ..default()
        }))
        .insert_resource(settings)
        .insert_resource(match_config)
        // Our game plugins
        .add_plugins((SettingsPlugin, PlayMatchPlugin, ViewPlugin))
        // Physical devices feed the simulation
        .add_systems(
            FixedUpdate,
            bridge_gamepad_connections
                .after(advance_match_clock)
                .in_set(InputStep::Frames),
        )
        .add_systems(
            FixedUpdate,
            (read_gamepads, read_keyboard).in_set(InputStep::Devices),
        )
        .run();

    ExitCode::SUCCESS
}
