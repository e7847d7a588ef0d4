//! Timer Bank
//!
//! Every per-combatant countdown lives in one [`TimerBank`] so a single call per tick
//! decrements all of them. Countdowns clamp at zero; a timer that crosses zero during
//! [`TimerBank::tick`] is reported as expired exactly once.

use smallvec::SmallVec;

/// Named countdowns owned by a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerName {
    /// Light attack cooldown; the light attack state is active while it runs
    LightCooldown,
    /// Heavy attack cooldown; the heavy attack state is active while it runs
    HeavyCooldown,
    /// Span in which another light press continues the combo
    ComboWindow,
    /// Remaining dash duration
    Dash,
    /// Cooldown before the next dash
    DashCooldown,
    /// Movement input is ignored while this runs
    KnockbackLock,
    /// Incoming hits are discarded while this runs
    Invulnerability,
    /// Cooldown before the next platform drop-through
    DropThroughCooldown,
}

impl TimerName {
    pub const COUNT: usize = 8;

    pub fn all() -> [TimerName; Self::COUNT] {
        [
            TimerName::LightCooldown,
            TimerName::HeavyCooldown,
            TimerName::ComboWindow,
            TimerName::Dash,
            TimerName::DashCooldown,
            TimerName::KnockbackLock,
            TimerName::Invulnerability,
            TimerName::DropThroughCooldown,
        ]
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Timers that reached zero during one tick.
pub type ExpiredTimers = SmallVec<[TimerName; 4]>;

/// Fixed set of named countdowns, in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerBank {
    remaining: [f32; TimerName::COUNT],
}

impl TimerBank {
    /// Start (or restart) a countdown. Negative durations are clamped to zero.
    pub fn set(&mut self, name: TimerName, seconds: f32) {
        self.remaining[name.index()] = seconds.max(0.0);
    }

    pub fn get(&self, name: TimerName) -> f32 {
        self.remaining[name.index()]
    }

    pub fn is_running(&self, name: TimerName) -> bool {
        self.get(name) > 0.0
    }

    pub fn clear(&mut self, name: TimerName) {
        self.remaining[name.index()] = 0.0;
    }

    /// Zero every countdown.
    pub fn clear_all(&mut self) {
        self.remaining = [0.0; TimerName::COUNT];
    }

    /// Decrement all running countdowns by `dt` and report the ones that expired.
    pub fn tick(&mut self, dt: f32) -> ExpiredTimers {
        let mut expired = ExpiredTimers::new();
        for name in TimerName::all() {
            let value = &mut self.remaining[name.index()];
            if *value <= 0.0 {
                continue;
            }
            *value = (*value - dt).max(0.0);
            if *value <= 0.0 {
                expired.push(name);
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_reports_expiry_once() {
        let mut bank = TimerBank::default();
        bank.set(TimerName::Dash, 0.03);

        let first = bank.tick(0.02);
        assert!(first.is_empty());
        assert!(bank.is_running(TimerName::Dash));

        let second = bank.tick(0.02);
        assert_eq!(second.as_slice(), &[TimerName::Dash]);
        assert_eq!(bank.get(TimerName::Dash), 0.0);

        let third = bank.tick(0.02);
        assert!(third.is_empty());
    }

    #[test]
    fn test_negative_set_is_clamped() {
        let mut bank = TimerBank::default();
        bank.set(TimerName::KnockbackLock, -1.0);
        assert_eq!(bank.get(TimerName::KnockbackLock), 0.0);
        assert!(!bank.is_running(TimerName::KnockbackLock));
    }

    #[test]
    fn test_clear_all() {
        let mut bank = TimerBank::default();
        for name in TimerName::all() {
            bank.set(name, 1.0);
        }
        bank.clear_all();
        assert!(TimerName::all().iter().all(|n| !bank.is_running(*n)));
    }
}
