use log::debug;
use serde::{Deserialize, Serialize};

use crate::battle::{self, BattleOutcome};
use crate::config::WorldConfig;
use crate::constants::{
    LOG_BATTLE_DEFEAT, LOG_BATTLE_STALE, LOG_BATTLE_VICTORY, LOG_MARCH_PROGRESS, LOG_MARCH_START,
    LOG_QUEST_COMPLETED, LOG_QUEST_ROTATION,
};
use crate::economy::{ResourceKind, TroopBuilt, TroopKind};
use crate::error::GameError;
use crate::event::{DomainEvent, Event, EventQueue, GameEvent};
use crate::journal::LogEntry;
use crate::march::{March, MarchTick};
use crate::rng::RngBundle;
use crate::state::GameState;
use crate::world::{GenerationReport, Position, RespawnOutcome, SpotId};

/// What an `interact` call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Interaction {
    Collected { resource: ResourceKind, value: u32 },
    MarchStarted(March),
    /// The spot was already collected; nothing changed.
    Ignored,
}

/// Single controller binding the game state to its RNG streams and outbox.
///
/// All mutation goes through here: player actions, the clock, and the quest
/// engine's reaction to the domain events those produce.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    rng: RngBundle,
    events: EventQueue,
}

impl GameSession {
    /// Session with an empty map and the first quest set.
    #[must_use]
    pub fn new(seed: u64, config: WorldConfig) -> Self {
        let rng = RngBundle::from_user_seed(seed);
        let state = GameState::new(seed, config, &rng);
        Self {
            state,
            rng,
            events: EventQueue::new(),
        }
    }

    /// Session populated with the configured number of spots, announcing the
    /// initial quest set.
    #[must_use]
    pub fn bootstrap(seed: u64, config: WorldConfig) -> Self {
        let initial = config.initial_spots;
        let mut session = Self::new(seed, config);
        session.request_generation(initial);
        session.emit_quest_set();
        session
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Consume the session, returning the owned state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.state.clock
    }

    /// Deterministically reseed every RNG stream.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RngBundle::from_user_seed(seed);
        self.state.seed = seed;
    }

    /// Take every outbound event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Populate the map up to `count` active spots.
    pub fn request_generation(&mut self, count: u32) -> GenerationReport {
        let report = self
            .state
            .world
            .generate(count, &self.state.config, &mut *self.rng.world());
        for id in &report.placed {
            self.emit_spot_added(*id);
        }
        report
    }

    /// Move the view; the next march departs from here.
    pub fn set_view_center(&mut self, position: Position) {
        self.state.view_center = position;
    }

    /// Click/tap on a spot: collect a resource or march on a monster.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownSpot`] for an id not on the map, or any march
    /// rejection from [`GameSession::start_march`].
    pub fn interact(&mut self, id: SpotId) -> Result<Interaction, GameError> {
        let spot = self.state.world.get(id).ok_or(GameError::UnknownSpot(id))?;
        if spot.collected {
            return Ok(Interaction::Ignored);
        }
        if spot.is_monster() {
            return self.start_march(id).map(Interaction::MarchStarted);
        }
        Ok(self
            .collect(id)?
            .map_or(Interaction::Ignored, |(resource, value)| {
                Interaction::Collected { resource, value }
            }))
    }

    /// Collect a resource spot. `Ok(None)` when it was already collected.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownSpot`] when the id is not on the map.
    pub fn collect(&mut self, id: SpotId) -> Result<Option<(ResourceKind, u32)>, GameError> {
        let spot = self.state.world.get(id).ok_or(GameError::UnknownSpot(id))?;
        let Some(resource) = spot.kind.resource() else {
            return Ok(None);
        };
        if !self.state.world.mark_collected(id) {
            return Ok(None);
        }
        let value = self.state.economy.collect(resource);
        self.events
            .push(GameEvent::ResourceChanged { kind: resource, value });
        self.events.push(GameEvent::SpotCollected { id });
        self.schedule_retirement(id);
        self.dispatch(DomainEvent::ResourceCollected { resource });
        Ok(Some((resource, value)))
    }

    /// Build one troop, debiting its full cost.
    ///
    /// # Errors
    ///
    /// [`GameError::InsufficientResources`] when any cost is unaffordable;
    /// nothing is debited in that case.
    pub fn build_troop(&mut self, kind: TroopKind) -> Result<TroopBuilt, GameError> {
        let built = self.state.economy.build_troop(kind)?;
        for (resource, _) in built.spent.entries() {
            self.emit_resource(resource);
        }
        self.events.push(GameEvent::TroopChanged {
            kind,
            value: built.count,
        });
        self.dispatch(DomainEvent::TroopBuilt { troop: kind });
        Ok(built)
    }

    /// Send the whole roster toward a monster spot.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownSpot`], [`GameError::MarchAlreadyInProgress`] or
    /// [`GameError::NoTroopsAvailable`]; state is unchanged on rejection.
    pub fn start_march(&mut self, id: SpotId) -> Result<March, GameError> {
        let spot = self.state.world.get(id).ok_or(GameError::UnknownSpot(id))?;
        let march = self.state.march.start(
            spot,
            self.state.view_center,
            self.state.economy.troops.total(),
            self.state.config.troop_speed,
        )?;
        self.log_line(
            LOG_MARCH_START,
            format!(
                "🚶‍♂️ Troops marching to Lvl {} monster. ETA: {}s",
                march.target_level, march.eta_secs
            ),
        );
        self.events.push(GameEvent::MarchStarted {
            target: march.target,
            eta_secs: march.eta_secs,
        });
        Ok(march)
    }

    /// Advance the game clock by `secs` whole seconds.
    ///
    /// Each second runs the march countdown, then due cooldowns, then popup
    /// expiry.
    pub fn advance(&mut self, secs: u32) {
        for _ in 0..secs {
            self.step();
        }
    }

    fn step(&mut self) {
        self.state.clock = self.state.clock.saturating_add(1);
        self.events.set_tick(self.state.clock);

        match self.state.march.tick() {
            MarchTick::Idle => {}
            MarchTick::Progress {
                target,
                remaining_secs,
            } => {
                self.log_line(
                    LOG_MARCH_PROGRESS,
                    format!("⏳ Arriving in {remaining_secs}s..."),
                );
                self.events.push(GameEvent::MarchProgress {
                    target,
                    remaining_secs,
                });
            }
            MarchTick::Arrived(march) => {
                self.resolve_battle(&march);
            }
        }

        for cooldown in self.state.cooldowns.take_due(self.state.clock) {
            self.retire_spot(cooldown.spot);
        }

        if self.state.popup.expire(self.state.clock) {
            self.events.push(GameEvent::PopupCleared);
        }
    }

    fn resolve_battle(&mut self, march: &March) {
        let outcome = battle::engage(
            &mut self.state.world,
            &mut self.state.economy,
            march.target,
            march.target_level,
            &mut *self.rng.battle(),
        );
        self.events.push(GameEvent::MarchResolved {
            target: march.target,
            outcome,
        });
        match outcome {
            BattleOutcome::Victory { level, gold, .. } => {
                for (resource, _) in outcome.reward().entries() {
                    self.emit_resource(resource);
                }
                self.log_line(
                    LOG_BATTLE_VICTORY,
                    format!("✅ Defeated Lvl {level} monster! +{gold} Gold"),
                );
                self.show_popup(format!("+{gold} 💰 Gold"));
                self.events.push(GameEvent::SpotCollected { id: march.target });
                self.schedule_retirement(march.target);
                self.dispatch(DomainEvent::MonsterDefeated { level });
            }
            BattleOutcome::Defeat { .. } => {
                for kind in TroopKind::ALL {
                    self.events.push(GameEvent::TroopChanged {
                        kind,
                        value: self.state.economy.troops.get(kind),
                    });
                }
                self.log_line(
                    LOG_BATTLE_DEFEAT,
                    format!(
                        "❌ You lost to Lvl {} monster! Troops lost.",
                        march.target_level
                    ),
                );
            }
            BattleOutcome::Stale { level } => {
                self.log_line(
                    LOG_BATTLE_STALE,
                    format!("⚠️ Monster Lvl {level} already defeated."),
                );
            }
        }
    }

    fn schedule_retirement(&mut self, id: SpotId) {
        let due_at = self
            .state
            .clock
            .saturating_add(u64::from(self.state.config.respawn_cooldown_secs));
        self.state.cooldowns.schedule(id, due_at);
    }

    /// Cooldown elapsed: drop the spot and try to replace it.
    fn retire_spot(&mut self, id: SpotId) {
        if self.state.world.remove(id).is_none() {
            debug!("cooldown for {id} fired after the spot was gone");
            return;
        }
        self.events.push(GameEvent::SpotRemoved { id });
        let outcome = self
            .state
            .world
            .respawn(&self.state.config, &mut *self.rng.world());
        if let RespawnOutcome::Placed(new_id) = outcome {
            self.emit_spot_added(new_id);
        }
    }

    /// Feed a domain event to the quest engine and surface what it did.
    fn dispatch(&mut self, event: DomainEvent) {
        let update =
            self.state
                .quests
                .on_event(&event, &mut self.state.economy, &mut *self.rng.quest());
        if !update.changed {
            return;
        }
        for quest in &update.completed {
            self.log_line(
                LOG_QUEST_COMPLETED,
                format!("🎯 Quest Completed: {}", quest.description),
            );
            self.show_popup("🎯 Quest Reward!");
        }
        for (resource, _) in update.rewards.entries() {
            self.emit_resource(resource);
        }
        if update.rotated_to.is_some() {
            self.log_line(
                LOG_QUEST_ROTATION,
                "🌟 New Quest Set Unlocked! Difficulty Increased.".to_string(),
            );
            self.show_popup("🌟 New Quests Available!");
        }
        self.emit_quest_set();
    }

    fn log_line(&mut self, key: &str, message: String) {
        let entry = LogEntry {
            at: self.state.clock,
            key: key.to_string(),
            message,
        };
        self.state.log.push(entry.clone());
        self.events.push(GameEvent::Log { entry });
    }

    fn show_popup(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.state.popup.show(
            text.clone(),
            self.state.clock,
            self.state.config.popup_duration_secs,
        );
        self.events.push(GameEvent::Popup { text });
    }

    fn emit_resource(&mut self, kind: ResourceKind) {
        self.events.push(GameEvent::ResourceChanged {
            kind,
            value: self.state.economy.resources.get(kind),
        });
    }

    fn emit_spot_added(&mut self, id: SpotId) {
        if let Some(spot) = self.state.world.get(id) {
            self.events.push(GameEvent::SpotAdded { spot: spot.clone() });
        }
    }

    fn emit_quest_set(&mut self) {
        self.events.push(GameEvent::QuestSetChanged {
            set_number: self.state.quests.set_number(),
            quests: self.state.quests.quests().to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{ResourceStock, TroopRoster};
    use crate::quest::QuestObjective;
    use crate::world::SpotKind;

    fn empty_session() -> GameSession {
        GameSession::new(4242, WorldConfig::default())
    }

    fn payloads(events: &[Event]) -> Vec<&GameEvent> {
        events.iter().map(|e| &e.payload).collect()
    }

    #[test]
    fn bootstrap_populates_map_and_announces_quests() {
        let mut session = GameSession::bootstrap(7, WorldConfig::default());
        assert!(!session.state().world.is_empty());
        let events = session.drain_events();
        let added = events
            .iter()
            .filter(|e| matches!(e.payload, GameEvent::SpotAdded { .. }))
            .count();
        assert_eq!(added, session.state().world.len());
        assert!(matches!(
            events.last().map(|e| &e.payload),
            Some(GameEvent::QuestSetChanged { set_number: 1, .. })
        ));
    }

    #[test]
    fn collecting_twice_is_a_no_op() {
        let mut session = empty_session();
        let id = session
            .state_mut()
            .world
            .place(Position::new(50.0, 50.0), SpotKind::Wood, 1);
        assert_eq!(
            session.interact(id).unwrap(),
            Interaction::Collected {
                resource: ResourceKind::Wood,
                value: 1
            }
        );
        let first = session.drain_events();
        assert!(payloads(&first).contains(&&GameEvent::SpotCollected { id }));

        let snapshot = session.state().clone();
        assert_eq!(session.interact(id).unwrap(), Interaction::Ignored);
        assert_eq!(session.collect(id).unwrap(), None);
        assert!(session.drain_events().is_empty());
        assert_eq!(session.state(), &snapshot);
    }

    #[test]
    fn collected_spot_is_retired_after_cooldown_and_replaced() {
        let mut session = empty_session();
        let id = session
            .state_mut()
            .world
            .place(Position::new(50.0, 50.0), SpotKind::Stone, 1);
        session.collect(id).unwrap();
        session.drain_events();

        session.advance(29);
        assert!(session.state().world.get(id).is_some());
        session.advance(1);
        assert!(session.state().world.get(id).is_none());
        assert_eq!(session.state().world.len(), 1);
        let events = session.drain_events();
        let removed = events
            .iter()
            .position(|e| e.payload == GameEvent::SpotRemoved { id });
        let added = events
            .iter()
            .position(|e| matches!(e.payload, GameEvent::SpotAdded { .. }));
        assert!(removed.is_some() && added.is_some() && removed < added);
    }

    #[test]
    fn unknown_spot_is_rejected() {
        let mut session = empty_session();
        assert_eq!(
            session.interact(SpotId(999)),
            Err(GameError::UnknownSpot(SpotId(999)))
        );
    }

    #[test]
    fn failed_build_changes_nothing() {
        let mut session = empty_session();
        let before = session.state().clone();
        let err = session.build_troop(TroopKind::Archer).unwrap_err();
        assert!(matches!(err, GameError::InsufficientResources { .. }));
        assert_eq!(session.state(), &before);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn build_emits_hud_updates() {
        let mut session = empty_session();
        session.state_mut().economy.resources = ResourceStock::new(2, 1, 0);
        session.build_troop(TroopKind::Infantry).unwrap();
        let events = session.drain_events();
        let payloads = payloads(&events);
        assert!(payloads.contains(&&GameEvent::ResourceChanged {
            kind: ResourceKind::Wood,
            value: 0
        }));
        assert!(payloads.contains(&&GameEvent::ResourceChanged {
            kind: ResourceKind::Stone,
            value: 0
        }));
        assert!(payloads.contains(&&GameEvent::TroopChanged {
            kind: TroopKind::Infantry,
            value: 1
        }));
    }

    #[test]
    fn march_counts_down_and_wins() {
        let mut session = empty_session();
        session.set_view_center(Position::new(0.0, 0.0));
        let id = session
            .state_mut()
            .world
            .place(Position::new(600.0, 0.0), SpotKind::Monster, 10);
        session.state_mut().economy.troops = TroopRoster::new(0, 0, 10);

        let Interaction::MarchStarted(march) = session.interact(id).unwrap() else {
            panic!("monster interaction should march");
        };
        assert_eq!(march.eta_secs, 2);
        assert_eq!(
            session.state().log.newest().map(|e| e.message.as_str()),
            Some("🚶‍♂️ Troops marching to Lvl 10 monster. ETA: 2s")
        );

        session.advance(1);
        assert_eq!(
            session.state().log.newest().map(|e| e.message.as_str()),
            Some("⏳ Arriving in 1s...")
        );
        session.advance(1);
        assert!(!session.state().march.is_marching());
        assert!(session.state().world.get(id).is_some_and(|s| s.collected));
        assert_eq!(session.state().economy.troops, TroopRoster::new(0, 0, 10));
        let resources = *session.state().resources();
        assert_eq!((resources.wood, resources.stone), (1, 1));
        assert!((3..=7).contains(&resources.gold));
        assert!(session.state().popup.current().is_some());
        assert!(session.state().cooldowns.is_pending(id));
    }

    #[test]
    fn defeat_halves_troops_and_keeps_monster() {
        let mut session = empty_session();
        session.set_view_center(Position::new(0.0, 0.0));
        let id = session
            .state_mut()
            .world
            .place(Position::new(10.0, 0.0), SpotKind::Monster, 30);
        session.state_mut().economy.troops = TroopRoster::new(1, 0, 0);
        session.start_march(id).unwrap();
        session.advance(1);
        assert_eq!(session.state().economy.troops, TroopRoster::new(0, 0, 0));
        assert!(session.state().world.get(id).is_some_and(|s| !s.collected));
        assert_eq!(
            session.state().log.newest().map(|e| e.key.as_str()),
            Some(LOG_BATTLE_DEFEAT)
        );
    }

    #[test]
    fn second_march_is_rejected() {
        let mut session = empty_session();
        session.set_view_center(Position::new(0.0, 0.0));
        let far = session
            .state_mut()
            .world
            .place(Position::new(3_000.0, 0.0), SpotKind::Monster, 1);
        let near = session
            .state_mut()
            .world
            .place(Position::new(100.0, 0.0), SpotKind::Monster, 1);
        session.state_mut().economy.troops = TroopRoster::new(3, 0, 0);
        session.start_march(far).unwrap();
        session.advance(2);
        let err = session.interact(near).unwrap_err();
        assert_eq!(
            err,
            GameError::MarchAlreadyInProgress {
                target: far,
                remaining_secs: 8
            }
        );
        assert_eq!(
            session.state().march.active().map(|m| m.remaining_secs),
            Some(8)
        );
    }

    #[test]
    fn stale_target_logs_notice() {
        let mut session = empty_session();
        session.set_view_center(Position::new(0.0, 0.0));
        let id = session
            .state_mut()
            .world
            .place(Position::new(900.0, 0.0), SpotKind::Monster, 2);
        session.state_mut().economy.troops = TroopRoster::new(5, 0, 0);
        session.start_march(id).unwrap();
        session.state_mut().world.mark_collected(id);
        session.advance(3);
        assert_eq!(
            session.state().log.newest().map(|e| e.message.as_str()),
            Some("⚠️ Monster Lvl 2 already defeated.")
        );
        assert!(session.state().resources().is_empty());
    }

    #[test]
    fn popup_clears_after_its_duration() {
        let mut session = empty_session();
        session.show_popup("hello");
        session.advance(1);
        assert!(session.state().popup.current().is_none());
        assert!(
            session
                .drain_events()
                .iter()
                .any(|e| e.payload == GameEvent::PopupCleared)
        );
    }

    #[test]
    fn completing_resource_quest_pays_and_logs() {
        let mut session = empty_session();
        let QuestObjective::Resource(wanted) = session.state().quests.quests()[0].objective else {
            panic!("first quest should be a resource quest");
        };
        let kind = match wanted {
            ResourceKind::Wood => SpotKind::Wood,
            ResourceKind::Stone => SpotKind::Stone,
            ResourceKind::Gold => SpotKind::Gold,
        };
        for i in 0..5_u32 {
            let id = session.state_mut().world.place(
                Position::new(f64::from(i) * 100.0, 0.0),
                kind,
                1,
            );
            session.collect(id).unwrap();
        }
        let quest = &session.state().quests.quests()[0];
        assert!(quest.completed);
        assert_eq!(
            session.state().log.newest().map(|e| e.key.as_str()),
            Some(LOG_QUEST_COMPLETED)
        );
        assert_eq!(
            session.state().popup.current().map(|p| p.text.as_str()),
            Some("🎯 Quest Reward!")
        );
        let expected_gold = if wanted == ResourceKind::Gold { 10 } else { 5 };
        assert_eq!(session.state().resources().gold, expected_gold);
    }
}
