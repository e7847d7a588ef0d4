//! Match Flow Systems
//!
//! Handles the overall flow of a match:
//! - Simulation clock
//! - Pre-match countdown and the gameplay gate
//! - Match end detection

use bevy::prelude::*;

use crate::combat::log::{CombatLog, CombatLogEventType};
use super::components::*;

/// Advance the tick counter. First system of every simulation tick.
pub fn advance_match_clock(mut clock: ResMut<MatchClock>) {
    clock.tick += 1;
}

/// Count the pre-match countdown down and open the gameplay gate when it runs out.
pub fn update_countdown(
    clock: Res<MatchClock>,
    mut countdown: ResMut<MatchCountdown>,
    mut gate: ResMut<GameplayGate>,
    mut combat_log: ResMut<CombatLog>,
) {
    if countdown.finished {
        return;
    }

    countdown.time_remaining -= clock.dt;
    if countdown.time_remaining > 0.0 {
        if gate.enabled {
            gate.enabled = false;
        }
        return;
    }

    countdown.time_remaining = 0.0;
    countdown.finished = true;
    gate.enabled = true;
    combat_log.log(CombatLogEventType::MatchEvent, "Fight!".to_string());
    info!("Countdown finished - gameplay enabled");
}

/// End the match once at most one combatant is left standing.
///
/// Inert combatants are never eliminated and therefore still count as standing.
pub fn check_match_end(
    mut commands: Commands,
    clock: Res<MatchClock>,
    outcome: Option<Res<MatchOutcome>>,
    combatants: Query<&Combatant>,
    mut combat_log: ResMut<CombatLog>,
) {
    if outcome.is_some() {
        return;
    }

    let total = combatants.iter().count();
    if total < 2 {
        return;
    }
    let mut standing = combatants.iter().filter(|c| !c.is_eliminated());
    let first = standing.next();
    if standing.next().is_some() {
        return;
    }

    let winner = first.map(|c| c.slot);
    let message = match winner {
        Some(slot) => format!("Player {} wins!", slot + 1),
        None => "Match ended with no survivors".to_string(),
    };
    info!("Match over after {} ticks: {}", clock.tick, message);
    combat_log.log(CombatLogEventType::MatchEvent, message);

    commands.insert_resource(MatchOutcome {
        winner,
        tick: clock.tick,
    });
}
