//! Deferred single-shot actions
//!
//! Delayed effects (respawn, re-enabling a dropped-through platform) are queued on
//! the owning combatant, keyed by the tick they fall due. Each action carries the
//! generation it was scheduled under; the handler compares it against current state
//! and drops stale actions instead of applying them.

use bevy::prelude::*;
use smallvec::SmallVec;

/// Action to run once its tick comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Bring the combatant back if it is still in the respawn of this life generation
    Respawn { generation: u32 },
    /// Make a dropped-through platform solid again for this combatant
    RestorePlatformCollision { platform: Entity, generation: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    due_tick: u64,
    action: DeferredAction,
}

/// Pending actions of one combatant. Independent actions may be pending at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredQueue {
    pending: Vec<Scheduled>,
}

impl DeferredQueue {
    pub fn schedule(&mut self, due_tick: u64, action: DeferredAction) {
        self.pending.push(Scheduled { due_tick, action });
    }

    /// Remove and return every action due at or before `now`, in scheduling order.
    pub fn take_due(&mut self, now: u64) -> SmallVec<[DeferredAction; 2]> {
        let mut due = SmallVec::new();
        self.pending.retain(|scheduled| {
            if scheduled.due_tick <= now {
                due.push(scheduled.action);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_keeps_future_actions() {
        let mut queue = DeferredQueue::default();
        queue.schedule(10, DeferredAction::Respawn { generation: 1 });
        queue.schedule(5, DeferredAction::RestorePlatformCollision {
            platform: Entity::from_raw(3),
            generation: 1,
        });

        assert!(queue.take_due(4).is_empty());

        let due = queue.take_due(5);
        assert_eq!(due.len(), 1);
        assert!(matches!(due[0], DeferredAction::RestorePlatformCollision { .. }));
        assert_eq!(queue.len(), 1);

        let due = queue.take_due(12);
        assert_eq!(due.as_slice(), &[DeferredAction::Respawn { generation: 1 }]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overdue_actions_preserve_order() {
        let mut queue = DeferredQueue::default();
        queue.schedule(2, DeferredAction::Respawn { generation: 1 });
        queue.schedule(1, DeferredAction::Respawn { generation: 2 });
        let due = queue.take_due(3);
        assert_eq!(
            due.as_slice(),
            &[
                DeferredAction::Respawn { generation: 1 },
                DeferredAction::Respawn { generation: 2 }
            ]
        );
    }
}
