//! Simulation Systems API
//!
//! This module provides a stable API for the per-tick simulation systems.
//! Both live and headless modes add the core systems through here and plug their
//! own connection sources into [`InputStep::Frames`] and input drivers into
//! [`InputStep::Devices`].
//!
//! ## System Phases
//!
//! Every fixed tick runs four ordered phases:
//!
//! 1. **Input** - Clock, pairing, device frames, input sampling
//! 2. **Controller** - Ground probe, timers, attacks, projectiles, knockback,
//!    locomotion, animation flags, out-of-bounds
//! 3. **Physics** - Integration and platform collision
//! 4. **Flow** - Countdown, match end, combat log
//!
//! ## Usage
//!
//! ```ignore
//! use crate::states::play_match::systems::{self, InputStep};
//!
//! systems::add_core_simulation_systems(&mut app);
//! app.add_systems(FixedUpdate, my_driver.in_set(InputStep::Devices));
//! ```

use bevy::prelude::*;

// Re-export all simulation systems from internal modules
// This provides a stable API - internal renames only require updating these re-exports

// === Phase 1: Input ===
pub use super::match_flow::advance_match_clock;
pub use super::input::{roll_input_frames, sample_combatant_input};
pub use crate::pairing::systems::{
    handle_controller_connections, register_combatant_slots, sync_control_state,
};

// === Phase 2: Controller ===
pub use super::physics::probe_ground;
pub use super::lifecycle::{check_out_of_bounds, derive_animation_flags, tick_combatant_timers};
pub use super::attacks::resolve_attacks;
pub use super::projectiles::{move_projectiles, process_projectile_hits};
pub use super::knockback::apply_knockback;
pub use super::locomotion::apply_locomotion;

// === Phase 3: Physics ===
pub use super::physics::integrate_bodies;

// === Phase 4: Flow ===
pub use super::match_flow::{check_match_end, update_countdown};
pub use crate::combat::systems::record_combat_log;

/// System set labels for simulation ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimPhase {
    /// Phase 1: clock, devices, pairing, input sampling
    Input,
    /// Phase 2: the combatant controller
    Controller,
    /// Phase 3: physics step
    Physics,
    /// Phase 4: countdown, match end, combat log
    Flow,
}

/// Ordered steps inside [`SimPhase::Input`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputStep {
    /// Clock advance, previous-frame roll, connection sources
    Frames,
    /// Connection events, slot registration, inert sync
    Pairing,
    /// Device readers and scripted drivers write controller frames here
    Devices,
    /// Frames become combatant input
    Sample,
}

/// Configures the ordering between simulation phases.
pub fn configure_simulation_ordering(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            SimPhase::Input,
            SimPhase::Controller,
            SimPhase::Physics,
            SimPhase::Flow,
        )
            .chain(),
    );
    app.configure_sets(
        FixedUpdate,
        (
            InputStep::Frames,
            InputStep::Pairing,
            InputStep::Devices,
            InputStep::Sample,
        )
            .chain()
            .in_set(SimPhase::Input),
    );
}

/// Adds the core simulation systems to `FixedUpdate`.
///
/// These are the systems needed for a match to run. Both live and headless modes
/// need these; only the device drivers differ.
pub fn add_core_simulation_systems(app: &mut App) {
    configure_simulation_ordering(app);

    // Phase 1: Input
    app.add_systems(
        FixedUpdate,
        (advance_match_clock, roll_input_frames)
            .chain()
            .in_set(InputStep::Frames),
    );
    app.add_systems(
        FixedUpdate,
        (
            handle_controller_connections,
            register_combatant_slots,
            sync_control_state,
        )
            .chain()
            .in_set(InputStep::Pairing),
    );
    app.add_systems(
        FixedUpdate,
        sample_combatant_input.in_set(InputStep::Sample),
    );

    // Phase 2: Controller
    app.add_systems(
        FixedUpdate,
        (
            probe_ground,
            tick_combatant_timers,
            resolve_attacks,
            move_projectiles,
            process_projectile_hits,
            apply_knockback,
            apply_locomotion,
            derive_animation_flags,
            check_out_of_bounds,
        )
            .chain()
            .in_set(SimPhase::Controller),
    );

    // Phase 3: Physics
    app.add_systems(FixedUpdate, integrate_bodies.in_set(SimPhase::Physics));

    // Phase 4: Flow
    app.add_systems(
        FixedUpdate,
        (update_countdown, check_match_end, record_combat_log)
            .chain()
            .in_set(SimPhase::Flow),
    );
}
