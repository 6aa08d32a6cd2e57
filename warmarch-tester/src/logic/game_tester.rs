use std::sync::Arc;

use anyhow::Result;
use log::debug;
use warmarch_game::constants::LOG_QUEST_COMPLETED;
use warmarch_game::{
    BattleOutcome, BundledLoader, DataLoader, Event, GameError, GameEvent, GameSession, GameState,
    Interaction, QuestCategory, ResourceStock, TroopRoster, WorldConfig,
};

use crate::logic::policy::{BotAction, BotPolicy, BotStrategy};

pub const DEFAULT_MAX_SECONDS: u32 = 600;

/// Full pairwise spacing checks are quadratic, so they run on this cadence.
const SPACING_CHECK_INTERVAL: u64 = 15;

/// Declarative plan for running a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: BotStrategy,
    pub max_seconds: Option<u32>,
    pub world: Option<fn(&mut WorldConfig)>,
    pub setup: Option<fn(&mut GameSession)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: BotStrategy) -> Self {
        Self {
            strategy,
            max_seconds: None,
            world: None,
            setup: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_seconds(mut self, max_seconds: u32) -> Self {
        self.max_seconds = Some(max_seconds);
        self
    }

    #[must_use]
    pub fn with_world(mut self, world: fn(&mut WorldConfig)) -> Self {
        self.world = Some(world);
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut GameSession)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Counters gathered from the outbound event stream and action results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunMetrics {
    pub seconds: u64,
    pub initial_population: usize,
    pub spots_collected: u32,
    pub spots_removed: u32,
    pub spots_added: u32,
    pub troops_built: u32,
    pub marches_started: u32,
    pub victories: u32,
    pub defeats: u32,
    pub stale_battles: u32,
    pub quests_completed: u32,
    pub rejected_builds: u32,
    pub rejected_marches: u32,
    pub ignored_taps: u32,
    pub events_seen: usize,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: BotStrategy,
    pub metrics: RunMetrics,
    pub violations: Vec<String>,
    pub final_state: GameState,
}

impl SimulationSummary {
    #[must_use]
    pub const fn resources(&self) -> &ResourceStock {
        self.final_state.resources()
    }

    #[must_use]
    pub const fn troops(&self) -> &TroopRoster {
        self.final_state.troops()
    }
}

/// Headless deterministic runner for the core game logic.
#[derive(Debug, Clone)]
pub struct GameTester {
    verbose: bool,
    config: WorldConfig,
}

impl GameTester {
    pub fn new(verbose: bool) -> Self {
        let Ok(config) = BundledLoader.load_world_config();
        Self { verbose, config }
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut config = self.config.clone();
        if let Some(world) = plan.world {
            world(&mut config);
        }
        let mut session = GameSession::bootstrap(seed, config);
        if let Some(setup) = plan.setup {
            setup(&mut session);
        }

        let mut metrics = RunMetrics {
            initial_population: session.state().world.len(),
            ..RunMetrics::default()
        };
        let mut violations = Vec::new();
        let mut policy = plan.strategy.create_policy(seed);
        let max_seconds = plan.max_seconds.unwrap_or(DEFAULT_MAX_SECONDS);

        record_events(&mut metrics, &session.drain_events());
        for _ in 0..max_seconds {
            for action in policy.plan_turn(session.state()) {
                apply_action(&mut session, action, &mut metrics);
            }
            session.advance(1);
            record_events(&mut metrics, &session.drain_events());

            let spacing = session.clock() % SPACING_CHECK_INTERVAL == 0;
            for violation in check_invariants(session.state(), spacing) {
                if violations.len() < 20 {
                    violations.push(format!("t={}s: {violation}", session.clock()));
                }
            }
        }
        metrics.seconds = session.clock();

        let summary = SimulationSummary {
            seed,
            strategy: plan.strategy,
            metrics,
            violations,
            final_state: session.into_state(),
        };
        if self.verbose {
            println!(
                "   🤖 {} seed {}: {} collected, {}W/{}L, quest set {}",
                policy.name(),
                seed,
                summary.metrics.spots_collected,
                summary.metrics.victories,
                summary.metrics.defeats,
                summary.final_state.quest_set_number()
            );
        }
        summary
    }
}

fn apply_action(session: &mut GameSession, action: BotAction, metrics: &mut RunMetrics) {
    match action {
        BotAction::Interact(id) => match session.interact(id) {
            Ok(Interaction::Ignored) => metrics.ignored_taps += 1,
            Ok(_) => {}
            Err(GameError::MarchAlreadyInProgress { .. } | GameError::NoTroopsAvailable) => {
                metrics.rejected_marches += 1;
            }
            Err(err) => debug!("tap on {id} rejected: {err}"),
        },
        BotAction::Build(kind) => match session.build_troop(kind) {
            Ok(_) => metrics.troops_built += 1,
            Err(err) => {
                debug!("build rejected: {err}");
                metrics.rejected_builds += 1;
            }
        },
        BotAction::MoveView(position) => session.set_view_center(position),
    }
}

fn record_events(metrics: &mut RunMetrics, events: &[Event]) {
    metrics.events_seen += events.len();
    for event in events {
        match &event.payload {
            GameEvent::SpotAdded { .. } => metrics.spots_added += 1,
            GameEvent::SpotCollected { .. } => metrics.spots_collected += 1,
            GameEvent::SpotRemoved { .. } => metrics.spots_removed += 1,
            GameEvent::MarchStarted { .. } => metrics.marches_started += 1,
            GameEvent::MarchResolved { outcome, .. } => match outcome {
                BattleOutcome::Victory { .. } => metrics.victories += 1,
                BattleOutcome::Defeat { .. } => metrics.defeats += 1,
                BattleOutcome::Stale { .. } => metrics.stale_battles += 1,
            },
            GameEvent::Log { entry } if entry.key == LOG_QUEST_COMPLETED => {
                metrics.quests_completed += 1;
            }
            _ => {}
        }
    }
}

/// Rules every reachable state must satisfy.
pub fn check_invariants(state: &GameState, check_spacing: bool) -> Vec<String> {
    let mut violations = Vec::new();
    let config = &state.config;

    for spot in state.world.iter() {
        let inside = (0.0..=config.map_width).contains(&spot.position.x)
            && (0.0..=config.map_height).contains(&spot.position.y);
        if !inside {
            violations.push(format!("{} lies outside the map", spot.id));
        }
        if spot.collected && !state.cooldowns.is_pending(spot.id) {
            violations.push(format!("{} is collected but has no cooldown", spot.id));
        }
    }

    if check_spacing {
        let spots: Vec<_> = state.world.iter().collect();
        for (i, a) in spots.iter().enumerate() {
            for b in &spots[i + 1..] {
                if a.position.distance_to(b.position) < config.min_distance {
                    violations.push(format!("{} and {} are closer than min distance", a.id, b.id));
                }
            }
        }
    }

    if let Some(march) = state.march.active() {
        match state.world.get(march.target) {
            Some(spot) if spot.collected => {
                violations.push(format!("march target {} already collected", march.target));
            }
            Some(_) => {}
            None => violations.push(format!("march target {} is gone", march.target)),
        }
        if march.remaining_secs > march.eta_secs {
            violations.push("march remaining time exceeds its ETA".to_string());
        }
    }

    let quests = state.quests.quests();
    let categories: Vec<QuestCategory> = quests.iter().map(|q| q.category()).collect();
    if categories != [QuestCategory::Resource, QuestCategory::Monster, QuestCategory::Troop] {
        violations.push(format!("quest set has categories {categories:?}"));
    }
    for quest in quests {
        if quest.progress > quest.target {
            violations.push(format!("{} progress exceeds its target", quest.id));
        }
        if quest.completed != (quest.progress >= quest.target) {
            violations.push(format!("{} completion flag disagrees with progress", quest.id));
        }
    }

    if state.log.len() > state.log.capacity() {
        violations.push("battle log exceeds its capacity".to_string());
    }
    violations
}
