//! Tests for combat log queries and the messages a match writes
//!
//! These tests verify that the CombatLog correctly:
//! - Counts hits, launches and deaths per slot
//! - Tracks eliminations in order
//! - Receives human-readable messages from a running match

use regex::Regex;
use skybrawl::combat::log::{CombatLog, CombatLogEventType, StructuredEventData};
use skybrawl::headless::{
    run_headless_match, HeadlessMatchConfig, InputScript, ScriptButton, ScriptStep,
};

fn create_test_log() -> CombatLog {
    CombatLog::default()
}

fn log_hit(log: &mut CombatLog, attacker: usize, target: usize, launched: bool, accumulated: u32) {
    log.log_hit(
        attacker,
        target,
        "light attack".to_string(),
        launched,
        accumulated,
        "Test message".to_string(),
    );
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_empty_log_queries() {
    let log = create_test_log();
    assert_eq!(log.hits_taken_by(0), 0);
    assert_eq!(log.hits_dealt_by(0), 0);
    assert!(log.eliminated_slots().is_empty());
    assert!(log.recent(5).is_empty());
}

#[test]
fn test_hits_are_counted_per_slot() {
    let mut log = create_test_log();
    log_hit(&mut log, 0, 1, false, 1);
    log_hit(&mut log, 0, 1, false, 2);
    log_hit(&mut log, 2, 1, true, 0);
    log_hit(&mut log, 1, 0, false, 1);

    assert_eq!(log.hits_taken_by(1), 3);
    assert_eq!(log.hits_dealt_by(0), 2);
    assert_eq!(log.hits_dealt_by(2), 1);
    assert_eq!(log.launches_of(1), 1);
    assert_eq!(log.launches_of(0), 0);
}

#[test]
fn test_launches_use_their_own_event_type() {
    let mut log = create_test_log();
    log_hit(&mut log, 0, 1, false, 1);
    log_hit(&mut log, 0, 1, true, 0);

    assert_eq!(log.filter_by_type(CombatLogEventType::Hit).len(), 1);
    assert_eq!(log.filter_by_type(CombatLogEventType::Launch).len(), 1);
}

#[test]
fn test_deaths_and_eliminations() {
    let mut log = create_test_log();
    log.log_death(1, false, 1, "Player 2 fell out".to_string());
    log.log_death(2, true, 0, "Player 3 has been eliminated".to_string());
    log.log_death(1, true, 1, "Player 2 has been eliminated".to_string());

    assert_eq!(log.deaths_of(1), 2);
    assert_eq!(log.eliminated_slots(), vec![2, 1]);
    assert_eq!(log.filter_by_type(CombatLogEventType::Death).len(), 1);
    assert_eq!(log.filter_by_type(CombatLogEventType::Elimination).len(), 2);
}

#[test]
fn test_entries_carry_match_time() {
    let mut log = create_test_log();
    log.match_time = 4.5;
    log.log_respawn(0, "Player 1 respawned".to_string());

    let entry = &log.entries[0];
    assert_eq!(entry.timestamp, 4.5);
    assert_eq!(entry.data, Some(StructuredEventData::Respawn { slot: 0 }));
}

#[test]
fn test_recent_returns_last_entries_in_order() {
    let mut log = create_test_log();
    for i in 0..5 {
        log.log(CombatLogEventType::MatchEvent, format!("event {}", i));
    }
    let recent: Vec<&str> = log.recent(2).iter().map(|e| e.message.as_str()).collect();
    assert_eq!(recent, vec!["event 3", "event 4"]);
}

#[test]
fn test_clear_resets_entries_and_time() {
    let mut log = create_test_log();
    log.match_time = 2.0;
    log.log(CombatLogEventType::MatchEvent, "Fight!".to_string());
    log.clear();
    assert!(log.entries.is_empty());
    assert_eq!(log.match_time, 0.0);
}

// =============================================================================
// Message Format Tests
// =============================================================================

fn projectile_match() -> HeadlessMatchConfig {
    HeadlessMatchConfig {
        max_duration_secs: 2.0,
        scripts: vec![InputScript {
            slot: 0,
            steps: vec![ScriptStep {
                start: 0.1,
                end: 0.2,
                axis: [0.0, 0.0],
                buttons: vec![ScriptButton::Light, ScriptButton::Heavy],
            }],
        }],
        ..Default::default()
    }
}

#[test]
fn test_projectile_messages() {
    let result = run_headless_match(projectile_match()).expect("valid config");

    let fired = Regex::new(r"^Player 1 fires their special projectile$").unwrap();
    let hit = Regex::new(r"^Player 1's projectile hits Player 2 \(hits absorbed: 1\)$").unwrap();

    assert!(
        result.log_messages.iter().any(|m| fired.is_match(m)),
        "missing fire message in {:?}",
        result.log_messages
    );
    assert!(
        result.log_messages.iter().any(|m| hit.is_match(m)),
        "missing hit message in {:?}",
        result.log_messages
    );
    assert_eq!(result.combatant(0).map(|c| c.hits_landed), Some(1));
    assert_eq!(result.combatant(1).map(|c| c.hits_taken), Some(1));
}

#[test]
fn test_pairing_messages_name_players() {
    let result = run_headless_match(HeadlessMatchConfig {
        max_duration_secs: 0.5,
        ..Default::default()
    })
    .expect("valid config");

    let paired = Regex::new(r"^Controller paired with Player [12]$").unwrap();
    let count = result.log_messages.iter().filter(|m| paired.is_match(m)).count();
    assert_eq!(count, 2, "{:?}", result.log_messages);
}

#[test]
fn test_every_player_reference_is_one_based() {
    let result = run_headless_match(projectile_match()).expect("valid config");
    let player = Regex::new(r"Player (\d+)").unwrap();
    for message in &result.log_messages {
        for caps in player.captures_iter(message) {
            let n: usize = caps[1].parse().unwrap();
            assert!((1..=4).contains(&n), "bad player number in {:?}", message);
        }
    }
}
