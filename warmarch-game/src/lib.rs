//! Warmarch Game Engine
//!
//! Platform-agnostic core for the Warmarch map strategy game: a bounded world
//! of resource and monster spots, a troop economy, a single timed march with
//! battle resolution, and rotating quest sets. No rendering or input handling
//! lives here; the presentation layer consumes [`Event`]s and snapshots of
//! [`GameState`].

pub mod battle;
pub mod config;
pub mod constants;
pub mod economy;
pub mod error;
pub mod event;
pub mod journal;
pub mod march;
pub mod numbers;
pub mod quest;
pub mod rng;
pub mod scheduler;
pub mod seed;
pub mod session;
pub mod state;
pub mod world;

use anyhow::Context;
use std::convert::Infallible;

// Re-export commonly used types
pub use battle::{BattleOutcome, engage, monster_power, roll_reward};
pub use config::{ConfigError, WorldConfig};
pub use economy::{Economy, ResourceKind, ResourceStock, TroopBuilt, TroopKind, TroopRoster};
pub use error::GameError;
pub use event::{
    DomainEvent, Event, EventId, EventQueue, EventSeverity, GameEvent, UiSurfaceHint,
};
pub use journal::{BattleLog, LogEntry, Popup, PopupSlot};
pub use march::{March, MarchState, MarchTick, travel_time};
pub use quest::{Quest, QuestBook, QuestCategory, QuestId, QuestObjective, QuestUpdate};
pub use rng::{CountingRng, RngBundle};
pub use scheduler::{Cooldown, Scheduler};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy};
pub use session::{GameSession, Interaction};
pub use state::GameState;
pub use world::{GenerationReport, Position, RespawnOutcome, Spot, SpotId, SpotKind, WorldGrid};

/// Trait for abstracting where world configuration comes from.
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the world configuration from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or parsed.
    fn load_world_config(&self) -> Result<WorldConfig, Self::Error>;
}

/// Loader backed by the configuration bundled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLoader;

impl DataLoader for BundledLoader {
    type Error = Infallible;

    fn load_world_config(&self) -> Result<WorldConfig, Self::Error> {
        Ok(WorldConfig::load_from_static())
    }
}

/// Main game engine for creating validated game sessions
pub struct GameEngine<L>
where
    L: DataLoader,
{
    data_loader: L,
}

impl<L> GameEngine<L>
where
    L: DataLoader,
{
    /// Create a new game engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    /// Load and validate the world configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the configuration is invalid.
    pub fn world_config(&self) -> anyhow::Result<WorldConfig> {
        let config = self
            .data_loader
            .load_world_config()
            .context("loading world configuration")?;
        config.validate().context("validating world configuration")?;
        Ok(config)
    }

    /// Construct a bootstrapped session: populated map and first quest set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn create_session(&self, seed: u64) -> anyhow::Result<GameSession> {
        let config = self.world_config()?;
        Ok(GameSession::bootstrap(seed, config))
    }

    /// Create a new game state with the specified seed
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn create_game(&self, seed: u64) -> anyhow::Result<GameState> {
        self.create_session(seed).map(GameSession::into_state)
    }

    /// Start a session from a `WM-` share code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is malformed or the configuration fails.
    pub fn create_session_from_code(&self, code: &str) -> anyhow::Result<GameSession> {
        let seed = decode_to_seed(code)
            .with_context(|| format!("invalid share code {code:?}"))?;
        self.create_session(seed)
    }
}
