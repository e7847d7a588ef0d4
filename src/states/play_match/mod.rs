//! Play Match - 2D Platform Arena
//!
//! Per-player simulation core of a local multiplayer arena brawler for up to four
//! combatants.
//!
//! ## Combatant Controller
//! - **Locomotion**: smoothed running, ground and air jump, dash, one-way platform drop-through
//! - **Attacks**: two-hit light combo, heavy attack, one-shot special projectile
//! - **Knockback**: every hit pushes; enough accumulated hits turn the next one into a launch
//! - **Lifecycle**: falling out costs a respawn; running out of respawns eliminates
//!
//! ## Flow
//! 1. `setup_play_match`: spawns the stage and one combatant per configured slot
//! 2. Every fixed tick runs the phases described in [`systems`]
//! 3. The match ends when at most one combatant is left standing ([`MatchOutcome`])

// Submodules
pub mod attacks;
pub mod components;
pub mod constants;
pub mod deferred;
pub mod input;
pub mod knockback;
pub mod lifecycle;
pub mod locomotion;
pub mod match_flow;
pub mod physics;
pub mod projectiles;
pub mod registry;
pub mod stage;
pub mod systems;
pub mod timers;
pub mod tuning;

// Re-exports
pub use components::*;
pub use registry::CombatantRegistry;
pub use stage::StageId;
pub use tuning::CombatTuning;

use bevy::prelude::*;

use crate::combat::CombatPlugin;
use crate::pairing::{DevicePairing, PairingPlugin};
use super::match_config::MatchConfig;
use constants::{PLAYER_HEIGHT, PLAYER_WIDTH, TICK_RATE_HZ};
use input::KeyboardFrame;
use lifecycle::Lifecycle;

/// Plugin for the match simulation: resources, events, setup and the fixed-tick systems.
///
/// Device drivers (gamepads and keyboard in live mode, scripts and bots headless)
/// are added by the caller.
pub struct PlayMatchPlugin;

impl Plugin for PlayMatchPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<MatchConfig>() {
            app.init_resource::<MatchConfig>();
        }
        app.add_plugins((tuning::TuningPlugin, CombatPlugin, PairingPlugin))
            .insert_resource(Time::<Fixed>::from_hz(TICK_RATE_HZ))
            .insert_resource(MatchClock::new(TICK_RATE_HZ))
            .init_resource::<GameplayGate>()
            .init_resource::<MatchCountdown>()
            .init_resource::<CombatantRegistry>()
            .init_resource::<KeyboardFrame>()
            .add_systems(Startup, setup_play_match);

        systems::add_core_simulation_systems(app);
    }
}

/// Spawn the stage and the combatants described by [`MatchConfig`].
pub fn setup_play_match(
    mut commands: Commands,
    config: Res<MatchConfig>,
    tuning: Res<CombatTuning>,
    mut registry: ResMut<CombatantRegistry>,
) {
    if let Err(e) = config.validate() {
        error!("Invalid match configuration: {}", e);
        return;
    }

    let layout = config.stage.layout();
    let stage = stage::spawn_stage(&mut commands, config.stage);
    let respawns = config
        .max_respawns
        .unwrap_or(tuning.lifecycle.max_respawns);

    registry.clear();
    for slot in 0..config.players {
        let Some((position, facing)) = layout.spawn_center(slot) else {
            warn!("Stage {} has no spawn for slot {}", config.stage.name(), slot);
            continue;
        };

        let mut combatant = Combatant::new(slot, position, facing, &tuning);
        combatant.lifecycle = Lifecycle::new(respawns);
        if let Some(anchor) = stage.anchors.get(slot) {
            combatant = combatant.with_anchor(*anchor);
        }

        let entity = commands
            .spawn((
                combatant,
                Body::new(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT) * 0.5),
                CombatantInput::default(),
                AnimationFlags::default(),
                Transform::from_translation(position.extend(1.0)),
                PlayMatchEntity,
            ))
            .id();
        registry.register(slot, entity);
    }

    commands.insert_resource(DevicePairing::new(
        config.keyboard_fallback,
        config.require_controller,
    ));
    commands.insert_resource(MatchCountdown::new(config.countdown_secs));
    commands.insert_resource(GameplayGate {
        enabled: config.countdown_secs <= 0.0,
    });
    commands.insert_resource(MatchClock::new(TICK_RATE_HZ));
    commands.remove_resource::<MatchOutcome>();

    info!(
        "Match set up: {} players on {} ({} respawns each)",
        config.players,
        config.stage.name(),
        respawns
    );
}
