//! One-shot cooldowns keyed by spot, driven by the session clock.
use serde::{Deserialize, Serialize};

use crate::world::SpotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub spot: SpotId,
    pub due_at: u64,
}

/// Pending removal/respawn cooldowns in scheduling order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    cooldowns: Vec<Cooldown>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `spot` for removal at `due_at`. A spot already pending keeps
    /// its first entry and `false` is returned.
    pub fn schedule(&mut self, spot: SpotId, due_at: u64) -> bool {
        if self.is_pending(spot) {
            return false;
        }
        self.cooldowns.push(Cooldown { spot, due_at });
        true
    }

    #[must_use]
    pub fn is_pending(&self, spot: SpotId) -> bool {
        self.cooldowns.iter().any(|c| c.spot == spot)
    }

    /// Remove and return every cooldown due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: u64) -> Vec<Cooldown> {
        let (mut due, pending): (Vec<Cooldown>, Vec<Cooldown>) =
            std::mem::take(&mut self.cooldowns)
                .into_iter()
                .partition(|c| c.due_at <= now);
        self.cooldowns = pending;
        due.sort_by_key(|c| c.due_at);
        due
    }

    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.cooldowns.iter().map(|c| c.due_at).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cooldowns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cooldowns.is_empty()
    }
}
