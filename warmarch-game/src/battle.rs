//! Battle resolution against monster spots.
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{MONSTER_POWER_PER_LEVEL, REWARD_BANDS, RewardBand};
use crate::economy::{Economy, ResourceStock};
use crate::rng::random_int;
use crate::world::{SpotId, WorldGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BattleOutcome {
    /// Monster defeated; `gold` is the banded roll, `bonus` the flat amount of each resource.
    Victory {
        level: u8,
        gold: u32,
        bonus: u32,
        player_power: u32,
        monster_power: u32,
    },
    /// Troops halved; the monster stays on the map.
    Defeat {
        player_power: u32,
        monster_power: u32,
    },
    /// Target already collected or gone; nothing changed.
    Stale { level: u8 },
}

impl BattleOutcome {
    /// Total resources granted by this outcome.
    #[must_use]
    pub const fn reward(&self) -> ResourceStock {
        match self {
            Self::Victory { gold, bonus, .. } => {
                ResourceStock::new(*bonus, *bonus, gold.saturating_add(*bonus))
            }
            Self::Defeat { .. } | Self::Stale { .. } => ResourceStock::new(0, 0, 0),
        }
    }

    #[must_use]
    pub const fn is_victory(&self) -> bool {
        matches!(self, Self::Victory { .. })
    }
}

#[must_use]
pub const fn monster_power(level: u8) -> u32 {
    (level as u32).saturating_mul(MONSTER_POWER_PER_LEVEL)
}

pub(crate) fn reward_band(level: u8) -> RewardBand {
    REWARD_BANDS
        .iter()
        .copied()
        .find(|band| level <= band.max_level)
        .unwrap_or(REWARD_BANDS[REWARD_BANDS.len() - 1])
}

/// Roll the gold reward and look up the flat bonus for a monster level.
pub fn roll_reward<R: Rng + ?Sized>(level: u8, rng: &mut R) -> (u32, u32) {
    let band = reward_band(level);
    let gold = random_int(rng, band.gold_min, band.gold_max);
    (gold, band.flat_bonus)
}

/// Fight the monster at `target` with the whole roster.
///
/// Victory marks the spot collected and credits the reward; defeat halves
/// every troop count. Scheduling the spot's removal is the caller's job.
pub fn engage<R: Rng + ?Sized>(
    world: &mut WorldGrid,
    economy: &mut Economy,
    target: SpotId,
    fallback_level: u8,
    rng: &mut R,
) -> BattleOutcome {
    let Some(spot) = world.get(target).filter(|spot| !spot.collected) else {
        let level = world.get(target).map_or(fallback_level, |spot| spot.level);
        warn!("battle against {target} skipped: target no longer available");
        return BattleOutcome::Stale { level };
    };
    let level = spot.level;
    let monster_power = monster_power(level);
    let player_power = economy.troops.power();

    if player_power < monster_power {
        economy.lose_troops();
        debug!("defeat at {target}: power {player_power} < {monster_power}");
        return BattleOutcome::Defeat {
            player_power,
            monster_power,
        };
    }

    let (gold, bonus) = roll_reward(level, rng);
    let outcome = BattleOutcome::Victory {
        level,
        gold,
        bonus,
        player_power,
        monster_power,
    };
    world.mark_collected(target);
    economy.apply_delta(&outcome.reward());
    debug!("victory at {target}: +{gold} gold, bonus {bonus}");
    outcome
}
