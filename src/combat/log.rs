//! Combat logging
//!
//! Records every hit, launch, death, respawn, pairing change and match milestone
//! for post-match analysis and headless test assertions.

use bevy::prelude::*;

/// A single entry in the combat log
#[derive(Debug, Clone)]
pub struct CombatLogEntry {
    /// Timestamp in match time (seconds since match start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    /// Structured data for queries, if the event involves combatants
    pub data: Option<StructuredEventData>,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatLogEventType {
    /// A hit that moved its target
    Hit,
    /// Overflow launch
    Launch,
    /// Fell out of the arena with respawns left
    Death,
    Respawn,
    /// Fell out with no respawns left
    Elimination,
    /// Special projectile fired or expired
    Projectile,
    /// Controller paired, unpaired, slot deactivated or reactivated
    Pairing,
    /// Match event (countdown, start, end)
    MatchEvent,
}

/// Machine-readable payload of an entry. Combatants are identified by slot.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredEventData {
    Hit {
        attacker: usize,
        target: usize,
        category: String,
        launched: bool,
        accumulated_hits: u32,
    },
    Death {
        slot: usize,
        eliminated: bool,
        respawns_used: u32,
    },
    Respawn {
        slot: usize,
    },
    Projectile {
        owner: usize,
        expired: bool,
    },
    Pairing {
        slot: usize,
    },
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current match time
    pub match_time: f32,
}

impl CombatLog {
    /// Clear the log for a new match
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.push(event_type, message, None);
    }

    fn push(
        &mut self,
        event_type: CombatLogEventType,
        message: String,
        data: Option<StructuredEventData>,
    ) {
        self.entries.push(CombatLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
            data,
        });
    }

    /// Log a hit; overflow launches are logged as [`CombatLogEventType::Launch`].
    pub fn log_hit(
        &mut self,
        attacker: usize,
        target: usize,
        category: String,
        launched: bool,
        accumulated_hits: u32,
        message: String,
    ) {
        let event_type = if launched {
            CombatLogEventType::Launch
        } else {
            CombatLogEventType::Hit
        };
        self.push(
            event_type,
            message,
            Some(StructuredEventData::Hit {
                attacker,
                target,
                category,
                launched,
                accumulated_hits,
            }),
        );
    }

    pub fn log_death(
        &mut self,
        slot: usize,
        eliminated: bool,
        respawns_used: u32,
        message: String,
    ) {
        let event_type = if eliminated {
            CombatLogEventType::Elimination
        } else {
            CombatLogEventType::Death
        };
        self.push(
            event_type,
            message,
            Some(StructuredEventData::Death {
                slot,
                eliminated,
                respawns_used,
            }),
        );
    }

    pub fn log_respawn(&mut self, slot: usize, message: String) {
        self.push(
            CombatLogEventType::Respawn,
            message,
            Some(StructuredEventData::Respawn { slot }),
        );
    }

    pub fn log_projectile(&mut self, owner: usize, expired: bool, message: String) {
        self.push(
            CombatLogEventType::Projectile,
            message,
            Some(StructuredEventData::Projectile { owner, expired }),
        );
    }

    pub fn log_pairing(&mut self, slot: usize, message: String) {
        self.push(
            CombatLogEventType::Pairing,
            message,
            Some(StructuredEventData::Pairing { slot }),
        );
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Number of hits (launches included) `slot` received.
    pub fn hits_taken_by(&self, slot: usize) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(e.data, Some(StructuredEventData::Hit { target, .. }) if target == slot)
            })
            .count()
    }

    /// Number of hits (launches included) `slot` dealt.
    pub fn hits_dealt_by(&self, slot: usize) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.data,
                    Some(StructuredEventData::Hit { attacker, .. }) if attacker == slot
                )
            })
            .count()
    }

    /// Number of overflow launches `slot` suffered.
    pub fn launches_of(&self, slot: usize) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.data,
                    Some(StructuredEventData::Hit { target, launched: true, .. }) if target == slot
                )
            })
            .count()
    }

    /// Deaths of `slot`, the eliminating one included.
    pub fn deaths_of(&self, slot: usize) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(e.data, Some(StructuredEventData::Death { slot: s, .. }) if s == slot)
            })
            .count()
    }

    /// Slots that were eliminated, in elimination order.
    pub fn eliminated_slots(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter_map(|e| match e.data {
                Some(StructuredEventData::Death { slot, eliminated: true, .. }) => Some(slot),
                _ => None,
            })
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }
}
