//! Matchmaker - pairs connections into matches

use tracing::{debug, info};
use uuid::Uuid;

use crate::game::{GameConfig, GameMatch, MatchId, MatchRegistry};
use crate::ws::protocol::ConnectionId;

use super::queue::WaitingSlot;

/// Protocol misuse reported back to the offending connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("You are already in a match")]
    AlreadyInMatch,

    #[error("You are not in a match")]
    NotInMatch,

    #[error("Invalid match or player state")]
    MatchMismatch,
}

/// Result of a successful match request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRequest {
    /// No opponent yet; the caller now holds the waiting slot
    Waiting,
    /// A match was created and is already playing
    Paired {
        match_id: MatchId,
        left: ConnectionId,
        right: ConnectionId,
    },
}

/// First-come first-served pairing with a single waiting slot
pub struct Matchmaker {
    slot: WaitingSlot,
    game_config: GameConfig,
}

impl Matchmaker {
    pub fn new(game_config: GameConfig) -> Self {
        Self {
            slot: WaitingSlot::new(),
            game_config,
        }
    }

    /// Pair `connection_id` with the waiting player, or make it the waiter.
    ///
    /// The waiting player always takes the left side.
    pub fn request_match(
        &mut self,
        connection_id: ConnectionId,
        registry: &mut MatchRegistry,
    ) -> Result<MatchRequest, MatchError> {
        if registry.is_bound(&connection_id) {
            return Err(MatchError::AlreadyInMatch);
        }

        if self.slot.contains(&connection_id) {
            debug!(connection_id = %connection_id, "Repeated match request while waiting");
            return Ok(MatchRequest::Waiting);
        }

        let Some(waiter) = self.slot.take() else {
            self.slot.occupy(connection_id);
            info!(connection_id = %connection_id, "Player waiting for an opponent");
            return Ok(MatchRequest::Waiting);
        };

        let match_id = Uuid::new_v4();
        let seed = rand::random::<u64>();
        let left = waiter.connection_id;
        let right = connection_id;

        let mut game_match = GameMatch::new(match_id, left, right, self.game_config, seed);
        game_match.sim.start();
        registry.insert(game_match);

        info!(
            match_id = %match_id,
            left = %left,
            right = %right,
            waited_ms = waiter.wait_time().as_millis() as u64,
            "Created new match"
        );

        Ok(MatchRequest::Paired {
            match_id,
            left,
            right,
        })
    }

    /// Drop `connection_id` from the waiting slot. Returns whether it was there.
    pub fn cancel(&mut self, connection_id: &ConnectionId) -> bool {
        self.slot.release(connection_id).is_some()
    }

    #[cfg(test)]
    pub fn is_waiting(&self, connection_id: &ConnectionId) -> bool {
        self.slot.contains(connection_id)
    }

    pub fn waiting_count(&self) -> usize {
        self.slot.len()
    }
}
