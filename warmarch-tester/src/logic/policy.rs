use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use warmarch_game::{
    GameState, Position, QuestObjective, ResourceKind, SpotId, SpotKind, TroopKind, monster_power,
};

/// One player input produced by a [`BotPolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BotAction {
    /// Tap a spot: collects resources, marches on monsters.
    Interact(SpotId),
    Build(TroopKind),
    MoveView(Position),
}

/// Policy interface for automated play strategies.
pub trait BotPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Inputs to issue before the clock advances by one second.
    fn plan_turn(&mut self, state: &GameState) -> Vec<BotAction>;
}

/// Built-in bot strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BotStrategy {
    /// Collects resources and never fights.
    Gatherer,
    /// Builds the strongest affordable troops and fights anything it can beat.
    Warlord,
    /// Works only on whatever the active quest set asks for.
    QuestRush,
    /// Random taps and builds, including ones the engine must reject.
    Chaos,
}

impl BotStrategy {
    pub const ALL: [Self; 4] = [Self::Gatherer, Self::Warlord, Self::QuestRush, Self::Chaos];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gatherer => "Gatherer",
            Self::Warlord => "Warlord",
            Self::QuestRush => "Quest Rush",
            Self::Chaos => "Chaos",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn BotPolicy + Send> {
        match self {
            Self::Gatherer => Box::new(GathererPolicy),
            Self::Warlord => Box::new(WarlordPolicy),
            Self::QuestRush => Box::new(QuestRushPolicy),
            Self::Chaos => Box::new(ChaosPolicy::new(seed)),
        }
    }
}

impl fmt::Display for BotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct GathererPolicy;
struct WarlordPolicy;
struct QuestRushPolicy;

struct ChaosPolicy {
    rng: ChaCha20Rng,
}

impl ChaosPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

const fn spot_kind_for(resource: ResourceKind) -> SpotKind {
    match resource {
        ResourceKind::Wood => SpotKind::Wood,
        ResourceKind::Stone => SpotKind::Stone,
        ResourceKind::Gold => SpotKind::Gold,
    }
}

/// Up to `limit` nearest open resource spots of the wanted kinds.
fn nearest_resources(state: &GameState, kinds: &[SpotKind], limit: usize) -> Vec<(SpotId, f64)> {
    let here = state.view_center;
    let mut found: Vec<(SpotId, f64)> = state
        .world
        .iter()
        .filter(|spot| !spot.collected && kinds.contains(&spot.kind))
        .map(|spot| (spot.id, spot.position.distance_to(here)))
        .collect();
    found.sort_by(|a, b| a.1.total_cmp(&b.1));
    found.truncate(limit);
    found
}

/// Nearest uncollected monster the current roster is guaranteed to beat.
fn beatable_monster(state: &GameState) -> Option<SpotId> {
    let power = state.troops().power();
    state
        .world
        .nearest(state.view_center, |spot| {
            spot.is_monster() && monster_power(spot.level) <= power
        })
        .map(|spot| spot.id)
}

fn collect_actions(state: &GameState, kinds: &[SpotKind], limit: usize) -> Vec<BotAction> {
    nearest_resources(state, kinds, limit)
        .into_iter()
        .map(|(id, _)| BotAction::Interact(id))
        .collect()
}

const RESOURCE_SPOTS: [SpotKind; 3] = [SpotKind::Wood, SpotKind::Stone, SpotKind::Gold];

impl BotPolicy for GathererPolicy {
    fn name(&self) -> &'static str {
        "Gatherer"
    }

    fn plan_turn(&mut self, state: &GameState) -> Vec<BotAction> {
        let mut actions = collect_actions(state, &RESOURCE_SPOTS, 2);
        if let Some(spot) = actions.first().and_then(|action| match action {
            BotAction::Interact(id) => state.world.get(*id),
            _ => None,
        }) {
            actions.push(BotAction::MoveView(spot.position));
        }
        actions
    }
}

impl BotPolicy for WarlordPolicy {
    fn name(&self) -> &'static str {
        "Warlord"
    }

    fn plan_turn(&mut self, state: &GameState) -> Vec<BotAction> {
        let mut actions = collect_actions(state, &RESOURCE_SPOTS, 3);
        if let Some(kind) = TroopKind::ALL
            .into_iter()
            .rev()
            .find(|kind| state.economy.can_afford(*kind))
        {
            actions.push(BotAction::Build(kind));
        }
        if !state.march.is_marching()
            && let Some(id) = beatable_monster(state)
        {
            actions.push(BotAction::Interact(id));
        }
        actions
    }
}

impl BotPolicy for QuestRushPolicy {
    fn name(&self) -> &'static str {
        "Quest Rush"
    }

    fn plan_turn(&mut self, state: &GameState) -> Vec<BotAction> {
        let mut actions = Vec::new();
        let mut wanted_troop = None;
        let mut wants_monster = false;
        for quest in state.quests.quests().iter().filter(|q| !q.completed) {
            match quest.objective {
                QuestObjective::Resource(resource) => {
                    actions.extend(collect_actions(state, &[spot_kind_for(resource)], 2));
                }
                QuestObjective::Monster => wants_monster = true,
                QuestObjective::Troop(kind) => wanted_troop = Some(kind),
            }
        }

        // Troops are needed for both the troop quest and the monster quest.
        let build = wanted_troop.or_else(|| wants_monster.then_some(TroopKind::Cavalry));
        match build {
            Some(kind) if state.economy.can_afford(kind) => actions.push(BotAction::Build(kind)),
            Some(kind) => {
                let missing: Vec<SpotKind> = state
                    .economy
                    .shortfall(kind)
                    .entries()
                    .map(|(resource, _)| spot_kind_for(resource))
                    .collect();
                actions.extend(collect_actions(state, &missing, 2));
            }
            None => {}
        }

        if wants_monster
            && !state.march.is_marching()
            && let Some(id) = beatable_monster(state)
        {
            actions.push(BotAction::Interact(id));
        }
        actions
    }
}

impl BotPolicy for ChaosPolicy {
    fn name(&self) -> &'static str {
        "Chaos"
    }

    fn plan_turn(&mut self, state: &GameState) -> Vec<BotAction> {
        let taps = self.rng.gen_range(0..=3_usize);
        let mut actions = Vec::with_capacity(taps + 2);
        let spots: Vec<_> = state.world.iter().collect();
        for _ in 0..taps {
            if spots.is_empty() {
                break;
            }
            let idx = self.rng.gen_range(0..spots.len());
            actions.push(BotAction::Interact(spots[idx].id));
        }
        if self.rng.gen_bool(0.3) {
            let kind = TroopKind::ALL[self.rng.gen_range(0..TroopKind::ALL.len())];
            actions.push(BotAction::Build(kind));
        }
        if self.rng.gen_bool(0.1) {
            let x = self.rng.r#gen::<f64>() * state.config.map_width;
            let y = self.rng.r#gen::<f64>() * state.config.map_height;
            actions.push(BotAction::MoveView(Position::new(x, y)));
        }
        actions
    }
}
