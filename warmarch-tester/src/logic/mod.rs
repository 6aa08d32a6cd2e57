pub mod game_tester;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use game_tester::{GameTester, SimulationPlan, SimulationSummary};
pub use policy::BotStrategy;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
