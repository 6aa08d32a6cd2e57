//! Player-action rejections. None are fatal; each leaves prior state unchanged.
use thiserror::Error;

use crate::economy::{ResourceStock, TroopKind};
use crate::world::SpotId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("not enough resources to build {troop}: missing {shortfall}")]
    InsufficientResources {
        troop: TroopKind,
        shortfall: ResourceStock,
    },
    #[error("no troops available to march")]
    NoTroopsAvailable,
    #[error("a march to {target} is already underway ({remaining_secs}s remaining)")]
    MarchAlreadyInProgress { target: SpotId, remaining_secs: u32 },
    #[error("unknown {0}")]
    UnknownSpot(SpotId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_rejection() {
        let err = GameError::InsufficientResources {
            troop: TroopKind::Archer,
            shortfall: ResourceStock::new(0, 0, 2),
        };
        assert_eq!(
            err.to_string(),
            "not enough resources to build archer: missing 2 gold"
        );
        let err = GameError::MarchAlreadyInProgress {
            target: SpotId(4),
            remaining_secs: 12,
        };
        assert_eq!(
            err.to_string(),
            "a march to spot#4 is already underway (12s remaining)"
        );
        assert_eq!(GameError::UnknownSpot(SpotId(9)).to_string(), "unknown spot#9");
    }
}
