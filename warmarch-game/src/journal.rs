//! Player-facing battle log feed and transient reward popup.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::BATTLE_LOG_CAPACITY;

/// One line of the battle log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Game clock when the line was written.
    pub at: u64,
    /// Stable key for localisation or styling (e.g. `log.battle.victory`).
    pub key: String,
    pub message: String,
}

/// Bounded feed, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for BattleLog {
    fn default() -> Self {
        Self::with_capacity(BATTLE_LOG_CAPACITY)
    }
}

impl BattleLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend a line, evicting the oldest beyond capacity.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub text: String,
    pub expires_at: u64,
}

/// Single on-screen popup; a newer one replaces the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupSlot {
    current: Option<Popup>,
}

impl PopupSlot {
    pub fn show(&mut self, text: impl Into<String>, now: u64, duration_secs: u32) {
        self.current = Some(Popup {
            text: text.into(),
            expires_at: now.saturating_add(u64::from(duration_secs)),
        });
    }

    /// Clear an expired popup. Returns `true` when one was cleared.
    pub fn expire(&mut self, now: u64) -> bool {
        if self.current.as_ref().is_some_and(|p| p.expires_at <= now) {
            self.current = None;
            return true;
        }
        false
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Popup> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(at: u64) -> LogEntry {
        LogEntry {
            at,
            key: "log.test".to_string(),
            message: format!("line {at}"),
        }
    }

    #[test]
    fn log_keeps_newest_first_and_bounds_size() {
        let mut log = BattleLog::default();
        for at in 0..8 {
            log.push(entry(at));
        }
        assert_eq!(log.len(), 5);
        let order: Vec<u64> = log.iter().map(|e| e.at).collect();
        assert_eq!(order, vec![7, 6, 5, 4, 3]);
        assert_eq!(log.newest().map(|e| e.at), Some(7));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = BattleLog::with_capacity(0);
        log.push(entry(1));
        log.push(entry(2));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.newest().map(|e| e.at), Some(2));
    }

    #[test]
    fn popup_expires_after_duration() {
        let mut slot = PopupSlot::default();
        slot.show("+3 gold", 10, 1);
        assert!(!slot.expire(10));
        assert_eq!(slot.current().map(|p| p.text.as_str()), Some("+3 gold"));
        assert!(slot.expire(11));
        assert!(slot.current().is_none());
        assert!(!slot.expire(12));
    }

    #[test]
    fn newer_popup_replaces_older() {
        let mut slot = PopupSlot::default();
        slot.show("first", 0, 1);
        slot.show("second", 0, 1);
        assert_eq!(slot.current().map(|p| p.text.as_str()), Some("second"));
    }
}
