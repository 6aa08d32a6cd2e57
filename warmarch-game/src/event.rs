//! Typed events flowing out of the core and between its components.
//!
//! [`DomainEvent`]s are produced by mutating actions and consumed by the
//! quest engine. [`GameEvent`]s are the outbound stream the presentation
//! layer subscribes to; each one is wrapped in an [`Event`] with a stable id.

use serde::{Deserialize, Serialize};

use crate::battle::BattleOutcome;
use crate::economy::{ResourceKind, TroopKind};
use crate::journal::LogEntry;
use crate::quest::Quest;
use crate::world::{Spot, SpotId};

/// Stable, deterministic identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId {
    /// Game clock (whole seconds) when the event was emitted.
    pub tick: u64,
    /// Sequence number within the tick.
    pub seq: u32,
}

impl EventId {
    #[must_use]
    pub const fn new(tick: u64, seq: u32) -> Self {
        Self { tick, seq }
    }
}

/// Progress-relevant facts emitted by economy and battle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    ResourceCollected { resource: ResourceKind },
    TroopBuilt { troop: TroopKind },
    MonsterDefeated { level: u8 },
}

/// Severity tier for an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
}

/// Hint for how the UI should surface an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSurfaceHint {
    Map,
    Hud,
    Log,
    Toast,
    QuestPanel,
}

/// Outbound notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    SpotAdded { spot: Spot },
    /// The spot's marker should disappear; the spot itself lingers until its cooldown.
    SpotCollected { id: SpotId },
    SpotRemoved { id: SpotId },
    ResourceChanged { kind: ResourceKind, value: u32 },
    TroopChanged { kind: TroopKind, value: u32 },
    Log { entry: LogEntry },
    Popup { text: String },
    PopupCleared,
    QuestSetChanged { set_number: u32, quests: Vec<Quest> },
    MarchStarted { target: SpotId, eta_secs: u32 },
    MarchProgress { target: SpotId, remaining_secs: u32 },
    MarchResolved { target: SpotId, outcome: BattleOutcome },
}

impl GameEvent {
    #[must_use]
    pub const fn surface_hint(&self) -> UiSurfaceHint {
        match self {
            Self::SpotAdded { .. } | Self::SpotCollected { .. } | Self::SpotRemoved { .. } => {
                UiSurfaceHint::Map
            }
            Self::ResourceChanged { .. }
            | Self::TroopChanged { .. }
            | Self::MarchStarted { .. }
            | Self::MarchProgress { .. }
            | Self::MarchResolved { .. } => UiSurfaceHint::Hud,
            Self::Log { .. } => UiSurfaceHint::Log,
            Self::Popup { .. } | Self::PopupCleared => UiSurfaceHint::Toast,
            Self::QuestSetChanged { .. } => UiSurfaceHint::QuestPanel,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> EventSeverity {
        match self {
            Self::MarchResolved {
                outcome: BattleOutcome::Defeat { .. } | BattleOutcome::Stale { .. },
                ..
            } => EventSeverity::Warning,
            _ => EventSeverity::Info,
        }
    }
}

/// Outbound event with id and presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub severity: EventSeverity,
    pub ui_surface_hint: UiSurfaceHint,
    pub payload: GameEvent,
}

impl Event {
    #[must_use]
    pub fn new(id: EventId, payload: GameEvent) -> Self {
        Self {
            id,
            severity: payload.severity(),
            ui_surface_hint: payload.surface_hint(),
            payload,
        }
    }
}

/// Ordered outbox assigning ids as events are pushed.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<Event>,
    tick: u64,
    seq: u32,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the id clock forward; sequence numbers restart per tick.
    pub fn set_tick(&mut self, tick: u64) {
        if tick != self.tick {
            self.tick = tick;
            self.seq = 0;
        }
    }

    pub fn push(&mut self, payload: GameEvent) {
        let id = EventId::new(self.tick, self.seq);
        self.seq = self.seq.saturating_add(1);
        self.events.push(Event::new(id, payload));
    }

    /// Take every pending event in emission order.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn queue_assigns_sequential_ids_per_tick() {
        let mut queue = EventQueue::new();
        queue.push(GameEvent::PopupCleared);
        queue.push(GameEvent::SpotRemoved { id: SpotId(1) });
        queue.set_tick(4);
        queue.push(GameEvent::PopupCleared);

        let events = queue.drain();
        let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![EventId::new(0, 0), EventId::new(0, 1), EventId::new(4, 0)]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn ids_stay_unique_past_sixty_five_thousand_events_in_one_tick() {
        let mut queue = EventQueue::new();
        let count = u32::from(u16::MAX) + 10;
        for n in 0..count {
            queue.push(GameEvent::SpotRemoved { id: SpotId(n) });
        }
        let ids: HashSet<EventId> = queue.drain().iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), count as usize);
        assert!(ids.contains(&EventId::new(0, count - 1)));
    }

    #[test]
    fn defeat_is_a_warning_on_the_hud() {
        let event = Event::new(
            EventId::new(3, 0),
            GameEvent::MarchResolved {
                target: SpotId(2),
                outcome: BattleOutcome::Defeat {
                    player_power: 3,
                    monster_power: 150,
                },
            },
        );
        assert_eq!(event.severity, EventSeverity::Warning);
        assert_eq!(event.ui_surface_hint, UiSurfaceHint::Hud);
    }

    #[test]
    fn events_serialize_with_kebab_tags() {
        let event = GameEvent::ResourceChanged {
            kind: ResourceKind::Wood,
            value: 3,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "resource-changed");
        assert_eq!(json["kind"], "wood");
        let restored: GameEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, event);
    }
}
