use anyhow::{Result, anyhow, ensure};
use log::warn;
use warmarch_game::{
    GameSession, Position, Spot, TroopRoster, WorldConfig, decode_to_seed, encode_friendly,
};

use crate::logic::{BotStrategy, GameTester, SimulationPlan, SimulationSummary};

pub struct CatalogEntry {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub plan: fn() -> SimulationPlan,
}

pub const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        key: "smoke",
        title: "Smoke Test",
        description: "Bootstrap a world and gather for a minute",
        plan: smoke_plan,
    },
    CatalogEntry {
        key: "world-generation",
        title: "World Generation and Respawn",
        description: "Full initial population; collected spots retire and respawn",
        plan: world_generation_plan,
    },
    CatalogEntry {
        key: "crowded-map",
        title: "Crowded Map Degradation",
        description: "Generation on an undersized map places fewer spots without failing",
        plan: crowded_map_plan,
    },
    CatalogEntry {
        key: "economy",
        title: "Troop Economy",
        description: "Builds only when affordable and never overdraws",
        plan: economy_plan,
    },
    CatalogEntry {
        key: "march-combat",
        title: "March and Combat",
        description: "Marches on beatable monsters and wins",
        plan: march_combat_plan,
    },
    CatalogEntry {
        key: "defeat-penalty",
        title: "Defeat Penalty",
        description: "A lone infantry loses and the roster is halved to zero",
        plan: defeat_penalty_plan,
    },
    CatalogEntry {
        key: "quest-progression",
        title: "Quest Progression",
        description: "Quest-driven play completes and rotates quest sets",
        plan: quest_progression_plan,
    },
    CatalogEntry {
        key: "deterministic-gameplay",
        title: "Deterministic Gameplay",
        description: "Same seed and inputs replay to the same state",
        plan: determinism_plan,
    },
    CatalogEntry {
        key: "share-code-consistency",
        title: "Share Code Consistency",
        description: "Share codes round-trip to the seed that builds the same world",
        plan: share_code_plan,
    },
    CatalogEntry {
        key: "chaos",
        title: "Chaos Inputs",
        description: "Random taps and builds; rejections leave state consistent",
        plan: chaos_plan,
    },
];

fn smoke_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Gatherer)
        .with_max_seconds(60)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            ensure!(
                summary.metrics.spots_collected > 0,
                "gatherer collected nothing"
            );
            ensure!(
                !summary.resources().is_empty(),
                "no resources after gathering"
            );
            Ok(())
        })
}

fn world_generation_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Gatherer)
        .with_max_seconds(90)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            let requested = summary.final_state.config.initial_spots as usize;
            ensure!(
                summary.metrics.initial_population == requested,
                "initial population {} != {requested}",
                summary.metrics.initial_population
            );
            ensure!(
                summary.metrics.spots_removed > 0,
                "no collected spot was retired after its cooldown"
            );
            ensure!(
                summary.final_state.world.len() == requested,
                "population drifted to {}",
                summary.final_state.world.len()
            );
            Ok(())
        })
}

fn crowded_map_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Gatherer)
        .with_max_seconds(120)
        .with_world(|config: &mut WorldConfig| {
            config.map_width = 1_000.0;
            config.map_height = 1_000.0;
            config.start_view_center = Position::new(500.0, 500.0);
        })
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            let population = summary.metrics.initial_population;
            let requested = summary.final_state.config.initial_spots as usize;
            ensure!(population > 0, "crowded map produced no spots");
            ensure!(
                population < requested,
                "expected degraded generation, got {population} of {requested}"
            );
            Ok(())
        })
}

fn economy_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Warlord)
        .with_max_seconds(300)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            ensure!(summary.metrics.troops_built > 0, "no troops were built");
            ensure!(
                summary.metrics.rejected_builds == 0,
                "{} affordable builds were rejected",
                summary.metrics.rejected_builds
            );
            Ok(())
        })
}

fn march_combat_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Warlord).with_expectation(
        |summary: &SimulationSummary| -> Result<()> {
            let metrics = &summary.metrics;
            ensure!(metrics.victories > 0, "no monster defeated");
            ensure!(
                metrics.defeats == 0,
                "lost {} battles the bot judged winnable",
                metrics.defeats
            );
            ensure!(metrics.stale_battles == 0, "unexpected stale battle");
            Ok(())
        },
    )
}

/// Send a single infantry at the nearest monster before play starts.
fn doomed_march(session: &mut GameSession) {
    session.state_mut().economy.troops = TroopRoster::new(1, 0, 0);
    let origin = session.state().view_center;
    let target = session
        .state()
        .world
        .nearest(origin, Spot::is_monster)
        .map(|spot| spot.id);
    if let Some(id) = target
        && let Err(err) = session.start_march(id)
    {
        warn!("setup march rejected: {err}");
    }
}

fn defeat_penalty_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Gatherer)
        .with_max_seconds(120)
        .with_setup(doomed_march)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            ensure!(
                summary.metrics.marches_started == 1,
                "setup march did not start"
            );
            ensure!(summary.metrics.defeats == 1, "expected exactly one defeat");
            ensure!(
                *summary.troops() == TroopRoster::new(0, 0, 0),
                "troops should be halved to zero, got {:?}",
                summary.troops()
            );
            Ok(())
        })
}

fn quest_progression_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::QuestRush)
        .with_max_seconds(900)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            let set = summary.final_state.quest_set_number();
            ensure!(set >= 2, "still on quest set {set}");
            ensure!(
                summary.metrics.quests_completed >= 3,
                "only {} quests completed",
                summary.metrics.quests_completed
            );
            Ok(())
        })
}

fn determinism_base() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Warlord).with_max_seconds(120)
}

fn determinism_plan() -> SimulationPlan {
    determinism_base().with_expectation(|summary: &SimulationSummary| -> Result<()> {
        let seconds = u32::try_from(summary.metrics.seconds)?;
        let replay_plan = determinism_base().with_max_seconds(seconds);
        let replay = GameTester::new(false).run_plan(&replay_plan, summary.seed);
        ensure!(
            replay.final_state == summary.final_state,
            "replay of seed {} diverged",
            summary.seed
        );
        ensure!(replay.metrics == summary.metrics, "replay metrics diverged");
        Ok(())
    })
}

fn share_code_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Gatherer)
        .with_max_seconds(1)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            let code = encode_friendly(summary.seed);
            let seed = decode_to_seed(&code).ok_or_else(|| anyhow!("{code} does not decode"))?;
            ensure!(
                encode_friendly(seed) == code,
                "{code} re-encodes differently"
            );
            let config = summary.final_state.config.clone();
            let a = GameSession::bootstrap(seed, config.clone());
            let b = GameSession::bootstrap(seed, config);
            ensure!(
                a.state() == b.state(),
                "{code} builds different worlds"
            );
            Ok(())
        })
}

fn chaos_plan() -> SimulationPlan {
    SimulationPlan::new(BotStrategy::Chaos)
        .with_max_seconds(300)
        .with_expectation(|summary: &SimulationSummary| -> Result<()> {
            let metrics = &summary.metrics;
            let rejected = metrics.rejected_builds + metrics.rejected_marches + metrics.ignored_taps;
            ensure!(rejected > 0, "chaos inputs were never rejected");
            Ok(())
        })
}
