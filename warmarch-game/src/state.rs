//! The explicit game-state aggregate owned by a single session.
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::economy::{Economy, ResourceStock, TroopRoster};
use crate::journal::{BattleLog, PopupSlot};
use crate::march::MarchState;
use crate::quest::QuestBook;
use crate::rng::RngBundle;
use crate::scheduler::Scheduler;
use crate::world::{Position, WorldGrid};

/// Everything the core knows about one game. Serializable as a snapshot for
/// the presentation layer; there is no persistence API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    /// Whole seconds elapsed since the session started.
    pub clock: u64,
    pub config: WorldConfig,
    pub world: WorldGrid,
    pub economy: Economy,
    pub march: MarchState,
    pub quests: QuestBook,
    pub log: BattleLog,
    pub popup: PopupSlot,
    pub cooldowns: Scheduler,
    /// Where the player is looking; marches depart from here.
    pub view_center: Position,
}

impl GameState {
    /// Fresh state with an empty map and the first quest set.
    #[must_use]
    pub fn new(seed: u64, config: WorldConfig, rng: &RngBundle) -> Self {
        let quests = QuestBook::new(&mut *rng.quest());
        Self {
            seed,
            clock: 0,
            log: BattleLog::with_capacity(config.log_capacity),
            view_center: config.start_view_center,
            config,
            world: WorldGrid::new(),
            economy: Economy::new(),
            march: MarchState::default(),
            quests,
            popup: PopupSlot::default(),
            cooldowns: Scheduler::new(),
        }
    }

    #[must_use]
    pub const fn resources(&self) -> &ResourceStock {
        &self.economy.resources
    }

    #[must_use]
    pub const fn troops(&self) -> &TroopRoster {
        &self.economy.troops
    }

    #[must_use]
    pub const fn quest_set_number(&self) -> u32 {
        self.quests.set_number()
    }
}
