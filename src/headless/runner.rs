//! Headless match execution
//!
//! Runs arena matches without any graphical output, suitable for automated testing.
//! Virtual controllers stand in for gamepads; scripts, bots and the hot-plug
//! timeline drive them through the same pairing and input path as live devices.

use bevy::app::PluginsState;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::combat::log::CombatLog;
use crate::error::ConfigError;
use crate::pairing::{ControllerConnectionEvent, DevicePairing};
use crate::states::play_match::constants::{MAX_PLAYERS, TICK_RATE_HZ};
use crate::states::play_match::input::{Buttons, ControllerFrame, KeyboardFrame};
use crate::states::play_match::systems::{advance_match_clock, InputStep};
use crate::states::play_match::{
    Combatant, CombatantRegistry, ControlState, MatchClock, MatchOutcome, PlayMatchPlugin,
};

use super::bot::{bot_decision, is_target, nearest_opponent, BotMemory, GameRng};
use super::config::{HeadlessMatchConfig, ScriptButton};

/// Result of a completed headless match
///
/// This struct provides programmatic access to match results for testing and analysis.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Slot of the winner, or None when nobody is left or the match timed out
    pub winner: Option<usize>,
    /// Simulation ticks run
    pub ticks: u64,
    /// Simulated match time in seconds
    pub match_time: f32,
    /// Whether the match hit `max_duration_secs` before a winner was decided
    pub timed_out: bool,
    /// Per-combatant statistics, in slot order
    pub combatants: Vec<CombatantResult>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Combat log messages in order
    pub log_messages: Vec<String>,
}

impl MatchResult {
    pub fn combatant(&self, slot: usize) -> Option<&CombatantResult> {
        self.combatants.iter().find(|c| c.slot == slot)
    }
}

/// Statistics for a single combatant after the match
#[derive(Debug, Clone)]
pub struct CombatantResult {
    pub slot: usize,
    pub eliminated: bool,
    /// Whether the combatant ended the match without an input source
    pub inert: bool,
    pub respawns_used: u32,
    pub hits_landed: u32,
    pub hits_taken: u32,
    pub launches_taken: u32,
    pub deaths: u32,
    pub final_position: Vec2,
}

/// Marker for a headless stand-in controller; `index` is its number in the config.
#[derive(Component, Debug, Clone, Copy)]
pub struct VirtualController {
    pub index: usize,
}

/// Virtual controller entities by index.
#[derive(Resource, Debug, Clone, Default)]
pub struct VirtualControllers(pub Vec<Entity>);

/// Resource to track headless match state
#[derive(Resource, Debug, Clone)]
pub struct HeadlessMatchState {
    pub config: HeadlessMatchConfig,
    /// Tick at which the match is called off
    pub max_ticks: u64,
}

/// Plugin for headless match execution
pub struct HeadlessPlugin {
    pub config: HeadlessMatchConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let max_ticks = MatchClock::new(TICK_RATE_HZ).ticks_for(self.config.max_duration_secs);
        let rng = match self.config.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };

        app.insert_resource(self.config.to_match_config())
            .insert_resource(self.config.tuning.clone().unwrap_or_default())
            .insert_resource(HeadlessMatchState {
                config: self.config.clone(),
                max_ticks,
            })
            .insert_resource(rng)
            .init_resource::<VirtualControllers>()
            .add_plugins(PlayMatchPlugin)
            .add_systems(Startup, spawn_virtual_controllers)
            .add_systems(
                FixedUpdate,
                apply_hotplug_script
                    .after(advance_match_clock)
                    .in_set(InputStep::Frames),
            )
            .add_systems(
                FixedUpdate,
                (drive_scripted_input, drive_bots)
                    .chain()
                    .in_set(InputStep::Devices),
            );
    }
}

/// Spawn every virtual controller the config mentions. None is connected yet.
fn spawn_virtual_controllers(
    mut commands: Commands,
    state: Res<HeadlessMatchState>,
    mut controllers: ResMut<VirtualControllers>,
) {
    controllers.0 = (0..state.config.controller_count())
        .map(|index| {
            commands
                .spawn((VirtualController { index }, ControllerFrame::default()))
                .id()
        })
        .collect();
    info!(
        "Spawned {} virtual controllers ({} connected at start)",
        controllers.0.len(),
        state.config.initial_controllers()
    );
}

/// Connect the initial controllers on the first tick, then play the hot-plug timeline.
fn apply_hotplug_script(
    clock: Res<MatchClock>,
    state: Res<HeadlessMatchState>,
    controllers: Res<VirtualControllers>,
    mut connections: EventWriter<ControllerConnectionEvent>,
) {
    if clock.tick == 1 {
        for controller in controllers.0.iter().take(state.config.initial_controllers()) {
            connections.send(ControllerConnectionEvent {
                controller: *controller,
                connected: true,
            });
        }
    }

    for step in &state.config.hotplug {
        if clock.ticks_for(step.at) != clock.tick {
            continue;
        }
        let Some(controller) = controllers.0.get(step.controller) else {
            warn!("Hotplug step names unknown controller {}", step.controller);
            continue;
        };
        debug!(
            "Virtual controller {} {} at {:.2}s",
            step.controller,
            if step.connected { "connected" } else { "disconnected" },
            step.at
        );
        connections.send(ControllerConnectionEvent {
            controller: *controller,
            connected: step.connected,
        });
    }
}

/// Route one slot's held input to whatever source the slot is paired with.
fn write_slot_input(
    slot: usize,
    axis: Vec2,
    held: Buttons,
    pairing: &DevicePairing,
    frames: &mut Query<&mut ControllerFrame, With<VirtualController>>,
    keyboard: &mut KeyboardFrame,
) {
    if let Some(mut frame) = pairing
        .controller_for(slot)
        .and_then(|controller| frames.get_mut(controller).ok())
    {
        frame.0.set(axis, held);
    } else if pairing.has_keyboard_fallback(slot) {
        keyboard.0.set(axis, held);
    }
}

fn script_buttons(buttons: &[ScriptButton]) -> Buttons {
    let mut held = Buttons::default();
    for button in buttons {
        match button {
            ScriptButton::Jump => held.jump = true,
            ScriptButton::Dash => held.dash = true,
            ScriptButton::Light => held.light = true,
            ScriptButton::Heavy => held.heavy = true,
        }
    }
    held
}

fn drive_scripted_input(
    clock: Res<MatchClock>,
    state: Res<HeadlessMatchState>,
    pairing: Res<DevicePairing>,
    mut frames: Query<&mut ControllerFrame, With<VirtualController>>,
    mut keyboard: ResMut<KeyboardFrame>,
) {
    let t = clock.elapsed_secs();
    for script in &state.config.scripts {
        let (axis, held) = script
            .steps
            .iter()
            .find(|step| step.is_active(t))
            .map(|step| (Vec2::from(step.axis), script_buttons(&step.buttons)))
            .unwrap_or_default();
        write_slot_input(script.slot, axis, held, &pairing, &mut frames, &mut keyboard);
    }
}

fn drive_bots(
    state: Res<HeadlessMatchState>,
    pairing: Res<DevicePairing>,
    mut rng: ResMut<GameRng>,
    mut memories: Local<[BotMemory; MAX_PLAYERS]>,
    registry: Res<CombatantRegistry>,
    combatants: Query<(&Combatant, &Transform)>,
    mut frames: Query<&mut ControllerFrame, With<VirtualController>>,
    mut keyboard: ResMut<KeyboardFrame>,
) {
    if state.config.bots.is_empty() {
        return;
    }
    let roster: Vec<(usize, Vec2, bool)> = registry
        .iter()
        .filter_map(|(slot, entity)| {
            let (combatant, transform) = combatants.get(entity).ok()?;
            Some((slot, transform.translation.truncate(), is_target(combatant)))
        })
        .collect();

    for &slot in &state.config.bots {
        let Some(&(_, position, _)) = roster.iter().find(|(s, _, _)| *s == slot) else {
            continue;
        };
        let Some(memory) = memories.get_mut(slot) else {
            continue;
        };
        let target = nearest_opponent(slot, position, roster.iter().copied());
        let (axis, held) = bot_decision(&mut rng, memory, position, target);
        write_slot_input(slot, axis, held, &pairing, &mut frames, &mut keyboard);
    }
}

/// Build a headless match app without running it.
///
/// Callers may add more plugins (logging, say) before stepping it. Each
/// `app.update()` advances exactly one simulation tick after the first, which only
/// starts the clock.
///
/// Without an explicit `tuning` in the config the built-in defaults are used, so a
/// scripted match never depends on the working directory.
pub fn build_headless_app(config: &HeadlessMatchConfig) -> Result<App, ConfigError> {
    config.validate()?;

    let mut app = App::new();
    // Minimal plugins - no window, no rendering
    app.add_plugins(MinimalPlugins)
        .add_plugins(TransformPlugin)
        .add_plugins(HierarchyPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / TICK_RATE_HZ,
        )))
        .add_plugins(HeadlessPlugin {
            config: config.clone(),
        });
    Ok(app)
}

/// Step `app` until the match has an outcome or runs out of time.
pub fn run_headless_app(mut app: App) -> MatchResult {
    if app.plugins_state() == PluginsState::Ready {
        app.finish();
        app.cleanup();
    }
    let max_ticks = app.world().resource::<HeadlessMatchState>().max_ticks;
    // The fixed timestep can lag a frame behind the virtual clock
    let max_updates = max_ticks * 2 + 10;

    for _ in 0..max_updates {
        app.update();
        let world = app.world();
        if world.contains_resource::<MatchOutcome>()
            || world.resource::<MatchClock>().tick >= max_ticks
        {
            break;
        }
    }

    collect_match_result(&mut app)
}

/// Read the final state of a headless app into a [`MatchResult`].
pub fn collect_match_result(app: &mut App) -> MatchResult {
    let world = app.world_mut();
    let clock = *world.resource::<MatchClock>();
    let outcome = world.get_resource::<MatchOutcome>().cloned();
    let random_seed = world.resource::<GameRng>().seed;
    let log_messages = world
        .resource::<CombatLog>()
        .entries
        .iter()
        .map(|entry| entry.message.clone())
        .collect();

    let registry = world.resource::<CombatantRegistry>().clone();
    let mut query = world.query::<(&Combatant, &Transform)>();
    let combatants: Vec<CombatantResult> = registry
        .iter()
        .filter_map(|(_, entity)| query.get(world, entity).ok())
        .map(|(combatant, transform)| CombatantResult {
            slot: combatant.slot,
            eliminated: combatant.is_eliminated(),
            inert: combatant.control == ControlState::Inert,
            respawns_used: combatant.lifecycle.respawns_used,
            hits_landed: combatant.stats.hits_landed,
            hits_taken: combatant.stats.hits_taken,
            launches_taken: combatant.stats.launches_taken,
            deaths: combatant.stats.deaths,
            final_position: transform.translation.truncate(),
        })
        .collect();

    if outcome.is_none() {
        info!("Match timed out after {:.1}s", clock.elapsed_secs());
    }

    MatchResult {
        winner: outcome.as_ref().and_then(|o| o.winner),
        ticks: clock.tick,
        match_time: clock.elapsed_secs(),
        timed_out: outcome.is_none(),
        combatants,
        random_seed,
        log_messages,
    }
}

/// Run a headless match with the given configuration
pub fn run_headless_match(config: HeadlessMatchConfig) -> Result<MatchResult, ConfigError> {
    let app = build_headless_app(&config)?;
    Ok(run_headless_app(app))
}
