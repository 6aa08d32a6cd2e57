//! Centralized balance and tuning constants for Warmarch game logic.
//!
//! Map geometry and timing live in [`crate::config::WorldConfig`] so they can
//! be overridden from data; the values here are fixed balance tables that only
//! change through reviewed code.

// Log keys -----------------------------------------------------------------
// Stable `LogEntry::key` values; consumers match on these.
pub const LOG_MARCH_START: &str = "log.march.start";
pub const LOG_MARCH_PROGRESS: &str = "log.march.progress";
pub const LOG_BATTLE_VICTORY: &str = "log.battle.victory";
pub const LOG_BATTLE_DEFEAT: &str = "log.battle.defeat";
pub const LOG_BATTLE_STALE: &str = "log.battle.stale";
pub const LOG_QUEST_COMPLETED: &str = "log.quest.completed";
pub const LOG_QUEST_ROTATION: &str = "log.quest.rotation";

// World defaults -----------------------------------------------------------
pub(crate) const MAP_WIDTH: f64 = 15_000.0;
pub(crate) const MAP_HEIGHT: f64 = 15_000.0;
pub(crate) const SPOT_SIZE: f64 = 50.0;
pub(crate) const MIN_SPOT_DISTANCE: f64 = 70.0;
pub(crate) const TROOP_SPEED: f64 = 300.0;
pub(crate) const RESPAWN_COOLDOWN_SECS: u32 = 30;
pub(crate) const INITIAL_SPOTS: u32 = 300;
pub(crate) const GENERATION_ATTEMPT_FACTOR: u32 = 10;
pub(crate) const RESPAWN_ATTEMPT_CAP: u32 = 100;
pub(crate) const BATTLE_LOG_CAPACITY: usize = 5;
pub(crate) const POPUP_DURATION_SECS: u32 = 1;
pub(crate) const START_VIEW_CENTER_X: f64 = 640.0;
pub(crate) const START_VIEW_CENTER_Y: f64 = 360.0;

/// Inclusive spot level range.
pub const SPOT_LEVEL_MIN: u8 = 1;
pub const SPOT_LEVEL_MAX: u8 = 30;

// Troop balance ------------------------------------------------------------
pub(crate) const INFANTRY_POWER: u32 = 3;
pub(crate) const ARCHER_POWER: u32 = 4;
pub(crate) const CAVALRY_POWER: u32 = 6;
pub(crate) const MONSTER_POWER_PER_LEVEL: u32 = 5;

/// Build costs as `(wood, stone, gold)`.
pub(crate) const INFANTRY_COST: (u32, u32, u32) = (2, 1, 0);
pub(crate) const ARCHER_COST: (u32, u32, u32) = (1, 0, 2);
pub(crate) const CAVALRY_COST: (u32, u32, u32) = (0, 3, 3);

// Battle rewards -----------------------------------------------------------

/// A contiguous level band with its gold roll and flat resource bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RewardBand {
    pub max_level: u8,
    pub gold_min: u32,
    pub gold_max: u32,
    pub flat_bonus: u32,
}

/// Ordered by `max_level`; the first band whose ceiling covers the level wins.
pub(crate) const REWARD_BANDS: [RewardBand; 5] = [
    RewardBand {
        max_level: 4,
        gold_min: 1,
        gold_max: 2,
        flat_bonus: 0,
    },
    RewardBand {
        max_level: 10,
        gold_min: 2,
        gold_max: 6,
        flat_bonus: 1,
    },
    RewardBand {
        max_level: 18,
        gold_min: 5,
        gold_max: 13,
        flat_bonus: 0,
    },
    RewardBand {
        max_level: 20,
        gold_min: 5,
        gold_max: 13,
        flat_bonus: 3,
    },
    RewardBand {
        max_level: u8::MAX,
        gold_min: 10,
        gold_max: 20,
        flat_bonus: 5,
    },
];

// Quests -------------------------------------------------------------------
pub(crate) const QUEST_BASE_AMOUNT: u32 = 5;
