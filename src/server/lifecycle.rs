//! Connection lifecycle: match requests, input, leaving and disconnects

use tracing::{debug, info, warn};

use crate::game::{Direction, MatchId, Side};
use crate::matchmaking::{MatchError, MatchRequest};
use crate::ws::protocol::{ConnectionId, EndReason, ServerMsg};

use super::{GameServer, Outbox};

const WAITING_MESSAGE: &str = "Waiting for opponent...";
const OPPONENT_LEFT_MESSAGE: &str = "Your opponent disconnected. Game ended.";
const YOU_LEFT_MESSAGE: &str = "You left the match.";

impl<O: Outbox> GameServer<O> {
    pub(crate) fn handle_request_match(&mut self, connection_id: ConnectionId) {
        match self.matchmaker.request_match(connection_id, &mut self.registry) {
            Ok(MatchRequest::Waiting) => {
                self.outbox.send(
                    connection_id,
                    ServerMsg::WaitingForOpponent {
                        message: WAITING_MESSAGE.to_string(),
                    },
                );
            }
            Ok(MatchRequest::Paired {
                match_id,
                left,
                right,
            }) => self.announce_match(match_id, left, right),
            Err(e) => self.reject(connection_id, e),
        }
    }

    /// Tell both players about their new match and send the opening state
    fn announce_match(&self, match_id: MatchId, left: ConnectionId, right: ConnectionId) {
        let Some(game_match) = self.registry.get(&match_id) else {
            return;
        };

        self.outbox.send(
            left,
            ServerMsg::MatchFound {
                match_id,
                side: Side::Left,
            },
        );
        self.outbox.send(
            right,
            ServerMsg::MatchFound {
                match_id,
                side: Side::Right,
            },
        );

        let snapshot = game_match.sim.snapshot();
        for conn in game_match.connections() {
            self.outbox.send(conn, ServerMsg::StateSnapshot(snapshot.clone()));
        }
    }

    /// Buffer a paddle direction after checking the sender really plays in
    /// the named match. Last write wins.
    pub(crate) fn handle_paddle_move(
        &mut self,
        connection_id: ConnectionId,
        match_id: MatchId,
        direction: Direction,
    ) {
        let Some(binding) = self.registry.binding(&connection_id) else {
            self.reject(connection_id, MatchError::NotInMatch);
            return;
        };

        if binding.match_id != match_id || !self.registry.set_intent(binding, direction) {
            warn!(
                connection_id = %connection_id,
                claimed_match = %match_id,
                bound_match = %binding.match_id,
                "Paddle move for wrong match"
            );
            self.reject(connection_id, MatchError::MatchMismatch);
        }
    }

    /// Explicit forfeit. Cleans up exactly like a disconnect, and also
    /// confirms the end of the match to the player who left.
    pub(crate) fn handle_leave(&mut self, connection_id: ConnectionId) {
        if self.forfeit(connection_id) {
            self.outbox.send(
                connection_id,
                ServerMsg::MatchEnd {
                    winner: None,
                    reason: EndReason::OpponentLeft,
                    message: YOU_LEFT_MESSAGE.to_string(),
                },
            );
        } else if self.matchmaker.cancel(&connection_id) {
            info!(connection_id = %connection_id, "Waiting player left the queue");
        } else {
            debug!(connection_id = %connection_id, "Leave request with nothing to leave");
        }
    }

    pub(crate) fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        if self.forfeit(connection_id) {
            return;
        }
        if self.matchmaker.cancel(&connection_id) {
            info!(connection_id = %connection_id, "Waiting player disconnected");
        } else {
            debug!(connection_id = %connection_id, "Connection closed");
        }
    }

    /// Tear down the match `connection_id` is playing in and notify the
    /// opponent. Returns false if the connection was not in a match.
    fn forfeit(&mut self, connection_id: ConnectionId) -> bool {
        let Some(binding) = self.registry.binding(&connection_id) else {
            return false;
        };
        let Some(game_match) = self.registry.remove(&binding.match_id) else {
            return false;
        };

        if let Some(opponent) = *game_match.players.get(binding.side.opponent()) {
            self.outbox.send(
                opponent,
                ServerMsg::OpponentDisconnected {
                    message: OPPONENT_LEFT_MESSAGE.to_string(),
                },
            );
        }

        info!(
            match_id = %binding.match_id,
            connection_id = %connection_id,
            side = ?binding.side,
            "Match ended by forfeit"
        );
        true
    }

    fn reject(&self, connection_id: ConnectionId, error: MatchError) {
        warn!(connection_id = %connection_id, error = %error, "Rejected client request");
        self.outbox.send(connection_id, ServerMsg::error(error.to_string()));
    }
}
