//! Resource stockpile, troop roster and troop build costs.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    ARCHER_COST, ARCHER_POWER, CAVALRY_COST, CAVALRY_POWER, INFANTRY_COST, INFANTRY_POWER,
};
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Wood,
    Stone,
    Gold,
}

impl ResourceKind {
    pub const ALL: [Self; 3] = [Self::Wood, Self::Stone, Self::Gold];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wood" => Ok(Self::Wood),
            "stone" => Ok(Self::Stone),
            "gold" => Ok(Self::Gold),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TroopKind {
    Infantry,
    Archer,
    Cavalry,
}

impl TroopKind {
    pub const ALL: [Self; 3] = [Self::Infantry, Self::Archer, Self::Cavalry];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Infantry => "infantry",
            Self::Archer => "archer",
            Self::Cavalry => "cavalry",
        }
    }

    /// Capitalized name used in quest descriptions.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Infantry => "Infantry",
            Self::Archer => "Archer",
            Self::Cavalry => "Cavalry",
        }
    }

    /// Fixed build cost.
    #[must_use]
    pub const fn cost(self) -> ResourceStock {
        let (wood, stone, gold) = match self {
            Self::Infantry => INFANTRY_COST,
            Self::Archer => ARCHER_COST,
            Self::Cavalry => CAVALRY_COST,
        };
        ResourceStock { wood, stone, gold }
    }

    /// Battle power contributed by one unit.
    #[must_use]
    pub const fn power(self) -> u32 {
        match self {
            Self::Infantry => INFANTRY_POWER,
            Self::Archer => ARCHER_POWER,
            Self::Cavalry => CAVALRY_POWER,
        }
    }
}

impl fmt::Display for TroopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TroopKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "infantry" => Ok(Self::Infantry),
            "archer" => Ok(Self::Archer),
            "cavalry" => Ok(Self::Cavalry),
            _ => Err(()),
        }
    }
}

/// Resource counters. Also used as a partial delta where zero means "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceStock {
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub stone: u32,
    #[serde(default)]
    pub gold: u32,
}

impl ResourceStock {
    #[must_use]
    pub const fn new(wood: u32, stone: u32, gold: u32) -> Self {
        Self { wood, stone, gold }
    }

    /// Same amount of every resource.
    #[must_use]
    pub const fn uniform(amount: u32) -> Self {
        Self::new(amount, amount, amount)
    }

    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
            ResourceKind::Gold => self.gold,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Gold => &mut self.gold,
        }
    }

    /// Add `amount` to one counter, returning the new value.
    pub fn credit(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
        *slot
    }

    /// Add every counter of `delta`.
    pub fn add(&mut self, delta: &Self) {
        for kind in ResourceKind::ALL {
            self.credit(kind, delta.get(kind));
        }
    }

    /// True when every counter is at least the matching counter in `cost`.
    #[must_use]
    pub fn covers(&self, cost: &Self) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|kind| self.get(*kind) >= cost.get(*kind))
    }

    /// Per-resource amount still missing to afford `cost`.
    #[must_use]
    pub fn shortfall(&self, cost: &Self) -> Self {
        Self {
            wood: cost.wood.saturating_sub(self.wood),
            stone: cost.stone.saturating_sub(self.stone),
            gold: cost.gold.saturating_sub(self.gold),
        }
    }

    /// Subtract `cost` only if every counter can pay it.
    #[must_use]
    pub fn checked_sub(&self, cost: &Self) -> Option<Self> {
        Some(Self {
            wood: self.wood.checked_sub(cost.wood)?,
            stone: self.stone.checked_sub(cost.stone)?,
            gold: self.gold.checked_sub(cost.gold)?,
        })
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.wood == 0 && self.stone == 0 && self.gold == 0
    }

    /// Non-zero entries in wood, stone, gold order.
    pub fn entries(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|(_, amount)| *amount > 0)
    }
}

impl fmt::Display for ResourceStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, amount) in self.entries() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{amount} {kind}")?;
            first = false;
        }
        if first {
            f.write_str("nothing")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TroopRoster {
    #[serde(default)]
    pub infantry: u32,
    #[serde(default)]
    pub archer: u32,
    #[serde(default)]
    pub cavalry: u32,
}

impl TroopRoster {
    #[must_use]
    pub const fn new(infantry: u32, archer: u32, cavalry: u32) -> Self {
        Self {
            infantry,
            archer,
            cavalry,
        }
    }

    #[must_use]
    pub const fn get(&self, kind: TroopKind) -> u32 {
        match kind {
            TroopKind::Infantry => self.infantry,
            TroopKind::Archer => self.archer,
            TroopKind::Cavalry => self.cavalry,
        }
    }

    fn slot_mut(&mut self, kind: TroopKind) -> &mut u32 {
        match kind {
            TroopKind::Infantry => &mut self.infantry,
            TroopKind::Archer => &mut self.archer,
            TroopKind::Cavalry => &mut self.cavalry,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.infantry
            .saturating_add(self.archer)
            .saturating_add(self.cavalry)
    }

    /// Weighted battle power of the whole roster.
    #[must_use]
    pub fn power(&self) -> u32 {
        TroopKind::ALL.iter().fold(0_u32, |acc, kind| {
            acc.saturating_add(self.get(*kind).saturating_mul(kind.power()))
        })
    }

    fn halve(&mut self) {
        for kind in TroopKind::ALL {
            let slot = self.slot_mut(kind);
            *slot /= 2;
        }
    }
}

/// Result of a successful troop build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TroopBuilt {
    pub kind: TroopKind,
    pub count: u32,
    pub spent: ResourceStock,
}

/// Owner of the stockpile and the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    pub resources: ResourceStock,
    pub troops: TroopRoster,
}

impl Economy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn can_afford(&self, kind: TroopKind) -> bool {
        self.resources.covers(&kind.cost())
    }

    /// Amount still missing to build one `kind`; empty when affordable.
    #[must_use]
    pub fn shortfall(&self, kind: TroopKind) -> ResourceStock {
        self.resources.shortfall(&kind.cost())
    }

    /// Debit the build cost and add one unit, or change nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientResources`] when any cost exceeds the stock.
    pub fn build_troop(&mut self, kind: TroopKind) -> Result<TroopBuilt, GameError> {
        let cost = kind.cost();
        let Some(remaining) = self.resources.checked_sub(&cost) else {
            return Err(GameError::InsufficientResources {
                troop: kind,
                shortfall: self.resources.shortfall(&cost),
            });
        };
        self.resources = remaining;
        let slot = self.troops.slot_mut(kind);
        *slot = slot.saturating_add(1);
        Ok(TroopBuilt {
            kind,
            count: *slot,
            spent: cost,
        })
    }

    /// Credit a single collected resource, returning the new counter value.
    pub fn collect(&mut self, kind: ResourceKind) -> u32 {
        self.resources.credit(kind, 1)
    }

    /// Add an arbitrary partial reward to the stock.
    pub fn apply_delta(&mut self, delta: &ResourceStock) {
        self.resources.add(delta);
    }

    /// Defeat penalty: every troop count is halved, rounding down.
    pub fn lose_troops(&mut self) {
        self.troops.halve();
    }
}
