//! World grid: spot population under a minimum-distance constraint.
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::WorldConfig;
use crate::constants::{MIN_SPOT_DISTANCE, SPOT_LEVEL_MAX, SPOT_LEVEL_MIN};
use crate::economy::ResourceKind;
use crate::numbers::{ceil_f64_to_u32, distance, floor_f64_to_i64};
use crate::rng::pick;

/// Point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }
}

/// Stable identifier for a spot; never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotId(pub u32);

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spot#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotKind {
    Wood,
    Stone,
    Gold,
    Monster,
}

impl SpotKind {
    pub const ALL: [Self; 4] = [Self::Wood, Self::Stone, Self::Gold, Self::Monster];

    /// Resource granted when a spot of this kind is collected.
    #[must_use]
    pub const fn resource(self) -> Option<ResourceKind> {
        match self {
            Self::Wood => Some(ResourceKind::Wood),
            Self::Stone => Some(ResourceKind::Stone),
            Self::Gold => Some(ResourceKind::Gold),
            Self::Monster => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Gold => "gold",
            Self::Monster => "monster",
        }
    }
}

impl fmt::Display for SpotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point of interest on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: SpotId,
    pub position: Position,
    pub kind: SpotKind,
    /// 1..=30; only meaningful for monsters.
    pub level: u8,
    pub collected: bool,
}

impl Spot {
    #[must_use]
    pub const fn is_monster(&self) -> bool {
        matches!(self.kind, SpotKind::Monster)
    }
}

/// Outcome of a bulk generation pass.
///
/// Falling short of `requested` is a degraded success on a crowded map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub requested: u32,
    pub placed: Vec<SpotId>,
    pub attempts: u32,
}

impl GenerationReport {
    #[must_use]
    pub fn exhausted(&self, population: usize) -> bool {
        population < self.requested as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespawnOutcome {
    Placed(SpotId),
    /// No free position was found within the attempt cap; population shrinks.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
struct SpotDraft {
    position: Position,
    kind: SpotKind,
    level: u8,
}

/// Grid cell key for the placement index.
type CellKey = (i64, i64);

/// Edge length of an index cell; queries widen to cover any `min_distance`.
const INDEX_CELL_SIZE: f64 = MIN_SPOT_DISTANCE;

/// Owns every active spot, collected or not, until its cooldown retires it.
///
/// Spots are keyed by id (ids only grow, so iteration is insertion order) and
/// bucketed into a coarse grid so placement checks only look at nearby cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "WorldGridSnapshot", into = "WorldGridSnapshot")]
pub struct WorldGrid {
    spots: BTreeMap<SpotId, Spot>,
    cells: HashMap<CellKey, SmallVec<[SpotId; 4]>>,
    next_id: u32,
}

/// Serialized form; the cell index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct WorldGridSnapshot {
    spots: Vec<Spot>,
    next_id: u32,
}

impl From<WorldGridSnapshot> for WorldGrid {
    fn from(snapshot: WorldGridSnapshot) -> Self {
        let mut grid = Self {
            next_id: snapshot.next_id,
            ..Self::default()
        };
        for spot in snapshot.spots {
            grid.index(spot);
        }
        grid
    }
}

impl From<WorldGrid> for WorldGridSnapshot {
    fn from(grid: WorldGrid) -> Self {
        Self {
            spots: grid.spots.into_values().collect(),
            next_id: grid.next_id,
        }
    }
}

impl PartialEq for WorldGrid {
    fn eq(&self, other: &Self) -> bool {
        self.next_id == other.next_id && self.spots == other.spots
    }
}

fn cell_of(position: Position) -> CellKey {
    (
        floor_f64_to_i64(position.x / INDEX_CELL_SIZE),
        floor_f64_to_i64(position.y / INDEX_CELL_SIZE),
    )
}

impl WorldGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the map up to `count` active spots by rejection sampling.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        count: u32,
        cfg: &WorldConfig,
        rng: &mut R,
    ) -> GenerationReport {
        let max_attempts = count.saturating_mul(cfg.generation_attempt_factor);
        let mut report = GenerationReport {
            requested: count,
            ..GenerationReport::default()
        };
        while self.spots.len() < count as usize && report.attempts < max_attempts {
            report.attempts += 1;
            let draft = sample_draft(cfg, rng);
            if self.is_valid_position(draft.position, cfg.min_distance) {
                report.placed.push(self.insert(draft));
            }
        }
        if report.exhausted(self.spots.len()) {
            warn!(
                "spot generation exhausted after {} attempts: {} of {} active",
                report.attempts,
                self.spots.len(),
                count
            );
        } else {
            debug!(
                "generated {} spots in {} attempts",
                report.placed.len(),
                report.attempts
            );
        }
        report
    }

    /// Place a single replacement spot, giving up after the respawn cap.
    pub fn respawn<R: Rng + ?Sized>(&mut self, cfg: &WorldConfig, rng: &mut R) -> RespawnOutcome {
        for _ in 0..cfg.respawn_attempt_cap {
            let draft = sample_draft(cfg, rng);
            if self.is_valid_position(draft.position, cfg.min_distance) {
                return RespawnOutcome::Placed(self.insert(draft));
            }
        }
        warn!(
            "respawn exhausted after {} attempts; population now {}",
            cfg.respawn_attempt_cap,
            self.spots.len()
        );
        RespawnOutcome::Exhausted
    }

    /// True when `position` keeps at least `min_distance` from every active spot.
    #[must_use]
    pub fn is_valid_position(&self, position: Position, min_distance: f64) -> bool {
        let too_close = |spot: &Spot| spot.position.distance_to(position) < min_distance;
        let reach = i64::from(ceil_f64_to_u32(min_distance / INDEX_CELL_SIZE));
        let span = u64::try_from(reach.saturating_mul(2).saturating_add(1)).unwrap_or(u64::MAX);
        let cells_to_scan = span.saturating_mul(span);
        let population = u64::try_from(self.spots.len()).unwrap_or(u64::MAX);
        if !min_distance.is_finite() || cells_to_scan > population {
            return !self.spots.values().any(too_close);
        }
        let (cx, cy) = cell_of(position);
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let Some(bucket) = self.cells.get(&(cx.saturating_add(dx), cy.saturating_add(dy)))
                else {
                    continue;
                };
                if bucket
                    .iter()
                    .filter_map(|id| self.spots.get(id))
                    .any(too_close)
                {
                    return false;
                }
            }
        }
        true
    }

    fn insert(&mut self, draft: SpotDraft) -> SpotId {
        let id = SpotId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.index(Spot {
            id,
            position: draft.position,
            kind: draft.kind,
            level: draft.level,
            collected: false,
        });
        id
    }

    fn index(&mut self, spot: Spot) {
        self.cells
            .entry(cell_of(spot.position))
            .or_default()
            .push(spot.id);
        self.spots.insert(spot.id, spot);
    }

    /// Insert a spot at an exact position, bypassing the distance check.
    ///
    /// Used to stage scripted scenarios; the caller owns the spacing invariant.
    pub fn place(&mut self, position: Position, kind: SpotKind, level: u8) -> SpotId {
        self.insert(SpotDraft {
            position,
            kind,
            level: level.clamp(SPOT_LEVEL_MIN, SPOT_LEVEL_MAX),
        })
    }

    #[must_use]
    pub fn get(&self, id: SpotId) -> Option<&Spot> {
        self.spots.get(&id)
    }

    /// Flag a spot collected. Returns `false` when missing or already collected.
    pub fn mark_collected(&mut self, id: SpotId) -> bool {
        match self.spots.get_mut(&id) {
            Some(spot) if !spot.collected => {
                spot.collected = true;
                true
            }
            _ => false,
        }
    }

    /// Retire a spot from the active set.
    pub fn remove(&mut self, id: SpotId) -> Option<Spot> {
        let spot = self.spots.remove(&id)?;
        let key = cell_of(spot.position);
        if let Some(bucket) = self.cells.get_mut(&key) {
            bucket.retain(|other| *other != id);
            if bucket.is_empty() {
                self.cells.remove(&key);
            }
        }
        Some(spot)
    }

    /// Active spots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Spot> {
        self.spots.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Closest uncollected spot to `from` accepted by `filter`.
    pub fn nearest(&self, from: Position, filter: impl Fn(&Spot) -> bool) -> Option<&Spot> {
        self.spots
            .values()
            .filter(|spot| !spot.collected && filter(spot))
            .min_by(|a, b| {
                a.position
                    .distance_to(from)
                    .total_cmp(&b.position.distance_to(from))
            })
    }
}

fn sample_draft<R: Rng + ?Sized>(cfg: &WorldConfig, rng: &mut R) -> SpotDraft {
    let x = rng.r#gen::<f64>() * cfg.map_width;
    let y = rng.r#gen::<f64>() * cfg.map_height;
    let kind = pick(rng, &SpotKind::ALL).unwrap_or(SpotKind::Wood);
    let level = rng.gen_range(SPOT_LEVEL_MIN..=SPOT_LEVEL_MAX);
    SpotDraft {
        position: Position::new(x, y),
        kind,
        level,
    }
}
