//! Single-march timer: `Idle -> Marching -> (resolve) -> Idle`.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::numbers::ceil_f64_to_u32;
use crate::world::{Position, Spot, SpotId};

/// Whole seconds needed to cover the distance at `speed` units per second.
#[must_use]
pub fn travel_time(from: Position, to: Position, speed: f64) -> u32 {
    if speed <= 0.0 {
        return u32::MAX;
    }
    ceil_f64_to_u32(from.distance_to(to) / speed)
}

/// A march in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct March {
    pub target: SpotId,
    /// Level seen when the march started, used if the spot vanishes en route.
    pub target_level: u8,
    pub origin: Position,
    pub destination: Position,
    pub eta_secs: u32,
    pub remaining_secs: u32,
}

/// Result of one countdown second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarchTick {
    Idle,
    Progress { target: SpotId, remaining_secs: u32 },
    /// Countdown finished; the march is cleared and battle should resolve.
    Arrived(March),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarchState {
    active: Option<March>,
}

impl MarchState {
    #[must_use]
    pub const fn active(&self) -> Option<&March> {
        self.active.as_ref()
    }

    #[must_use]
    pub const fn is_marching(&self) -> bool {
        self.active.is_some()
    }

    /// Begin a march toward `target` from `origin`.
    ///
    /// # Errors
    ///
    /// Rejects with [`GameError::MarchAlreadyInProgress`] while a march is in
    /// flight, and with [`GameError::NoTroopsAvailable`] for an empty roster.
    pub fn start(
        &mut self,
        target: &Spot,
        origin: Position,
        troop_total: u32,
        troop_speed: f64,
    ) -> Result<March, GameError> {
        if let Some(current) = &self.active {
            return Err(GameError::MarchAlreadyInProgress {
                target: current.target,
                remaining_secs: current.remaining_secs,
            });
        }
        if troop_total == 0 {
            return Err(GameError::NoTroopsAvailable);
        }
        let eta_secs = travel_time(origin, target.position, troop_speed);
        let march = March {
            target: target.id,
            target_level: target.level,
            origin,
            destination: target.position,
            eta_secs,
            remaining_secs: eta_secs,
        };
        debug!("march to {} started, eta {eta_secs}s", target.id);
        self.active = Some(march);
        Ok(march)
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> MarchTick {
        let Some(march) = self.active.as_mut() else {
            return MarchTick::Idle;
        };
        march.remaining_secs = march.remaining_secs.saturating_sub(1);
        if march.remaining_secs > 0 {
            return MarchTick::Progress {
                target: march.target,
                remaining_secs: march.remaining_secs,
            };
        }
        let arrived = *march;
        self.active = None;
        debug!("march to {} arrived", arrived.target);
        MarchTick::Arrived(arrived)
    }
}
