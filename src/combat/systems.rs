//! Combat log recording

use bevy::prelude::*;

use crate::pairing::{PairingChange, PairingChangedEvent};
use crate::states::play_match::components::{Combatant, MatchClock};
use super::events::*;
use super::log::CombatLog;

fn player_label(slot: Option<usize>) -> String {
    match slot {
        Some(slot) => format!("Player {}", slot + 1),
        None => "Unknown".to_string(),
    }
}

/// Write this tick's combat events into the [`CombatLog`].
#[allow(clippy::too_many_arguments)]
pub fn record_combat_log(
    clock: Res<MatchClock>,
    mut combat_log: ResMut<CombatLog>,
    mut hit_events: EventReader<HitLandedEvent>,
    mut death_events: EventReader<CombatantDiedEvent>,
    mut respawn_events: EventReader<CombatantRespawnedEvent>,
    mut fired_events: EventReader<ProjectileFiredEvent>,
    mut expired_events: EventReader<ProjectileExpiredEvent>,
    mut pairing_events: EventReader<PairingChangedEvent>,
    combatant_query: Query<&Combatant>,
) {
    combat_log.match_time = clock.elapsed_secs();
    let slot_of = |entity: Entity| combatant_query.get(entity).ok().map(|c| c.slot);

    for event in hit_events.read() {
        let (Some(attacker), Some(target)) = (slot_of(event.attacker), slot_of(event.target)) else {
            continue;
        };
        let message = if event.launched {
            format!(
                "{}'s {} launches {}",
                player_label(Some(attacker)),
                event.category.name(),
                player_label(Some(target))
            )
        } else {
            format!(
                "{}'s {} hits {} (hits absorbed: {})",
                player_label(Some(attacker)),
                event.category.name(),
                player_label(Some(target)),
                event.accumulated_hits
            )
        };
        combat_log.log_hit(
            attacker,
            target,
            event.category.name().to_string(),
            event.launched,
            event.accumulated_hits,
            message,
        );
    }

    for event in death_events.read() {
        let message = if event.eliminated {
            format!("{} has been eliminated", player_label(Some(event.slot)))
        } else {
            let allowed = combatant_query
                .get(event.entity)
                .map(|c| c.lifecycle.respawns_allowed)
                .unwrap_or(event.respawns_used);
            format!(
                "{} fell out ({}/{} respawns used)",
                player_label(Some(event.slot)),
                event.respawns_used,
                allowed
            )
        };
        combat_log.log_death(event.slot, event.eliminated, event.respawns_used, message);
    }

    for event in respawn_events.read() {
        let message = format!("{} respawned", player_label(Some(event.slot)));
        combat_log.log_respawn(event.slot, message);
    }

    for event in fired_events.read() {
        let Some(owner) = slot_of(event.owner) else {
            continue;
        };
        let message = format!("{} fires their special projectile", player_label(Some(owner)));
        combat_log.log_projectile(owner, false, message);
    }

    for event in expired_events.read() {
        let Some(owner) = slot_of(event.owner) else {
            continue;
        };
        let message = format!("{}'s projectile fizzles out", player_label(Some(owner)));
        combat_log.log_projectile(owner, true, message);
    }

    for PairingChangedEvent(change) in pairing_events.read() {
        let message = match *change {
            PairingChange::Paired { slot, .. } => {
                format!("Controller paired with {}", player_label(Some(slot)))
            }
            PairingChange::Unpaired { slot, .. } => {
                format!("Controller disconnected from {}", player_label(Some(slot)))
            }
            PairingChange::Deactivated { slot } => {
                format!("{} is inactive (no input source)", player_label(Some(slot)))
            }
            PairingChange::Reactivated { slot } => {
                format!("{} is active again", player_label(Some(slot)))
            }
        };
        combat_log.log_pairing(change.slot(), message);
    }
}
