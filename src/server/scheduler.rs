//! Per-tick driver for every active match

use tracing::{debug, info, trace};

use crate::game::{GameMatch, MatchId, MatchStatus, Side};
use crate::ws::protocol::{EndReason, ServerMsg};

use super::{GameServer, Outbox};

impl<O: Outbox> GameServer<O> {
    /// Advance every match by `dt` seconds of wall-clock time, broadcast the
    /// new state, and tear down matches that finished.
    pub fn tick(&mut self, dt: f32) {
        self.ticks += 1;
        let mut finished: Vec<MatchId> = Vec::new();

        for game_match in self.registry.iter_mut() {
            game_match.apply_intents(dt);
            let outcome = game_match.sim.update(dt);

            if let Some(side) = outcome.scored {
                let score = game_match.sim.snapshot().score;
                info!(
                    match_id = %game_match.id,
                    scorer = ?side,
                    left = score.left,
                    right = score.right,
                    "Point scored"
                );
            }
            if let Some(side) = outcome.paddle_hit {
                trace!(match_id = %game_match.id, side = ?side, "Paddle hit");
            } else if outcome.wall_bounce {
                trace!(match_id = %game_match.id, "Wall bounce");
            }

            match game_match.sim.status() {
                MatchStatus::Playing | MatchStatus::Scored => {
                    broadcast_snapshot(&self.outbox, game_match);
                }
                MatchStatus::Finished => {
                    broadcast_snapshot(&self.outbox, game_match);
                    finished.push(game_match.id);
                }
                MatchStatus::Waiting => {}
            }
        }

        for match_id in finished {
            self.complete_match(match_id);
        }

        if self.ticks % 600 == 0 {
            debug!(
                tick = self.ticks,
                dt,
                active_matches = self.registry.active_matches(),
                "Scheduler heartbeat"
            );
        }

        self.publish_stats();
    }

    /// Announce the winner and remove a finished match
    fn complete_match(&mut self, match_id: MatchId) {
        let Some(game_match) = self.registry.remove(&match_id) else {
            return;
        };

        let winner = game_match.sim.winner();
        let msg = ServerMsg::MatchEnd {
            winner,
            reason: EndReason::Completed,
            message: completion_message(winner),
        };
        for conn in game_match.connections() {
            self.outbox.send(conn, msg.clone());
        }

        let score = game_match.sim.snapshot().score;
        info!(
            match_id = %match_id,
            winner = ?winner,
            left = score.left,
            right = score.right,
            "Match completed"
        );
    }
}

fn broadcast_snapshot<O: Outbox>(outbox: &O, game_match: &GameMatch) {
    let snapshot = game_match.sim.snapshot();
    for conn in game_match.connections() {
        outbox.send(conn, ServerMsg::StateSnapshot(snapshot.clone()));
    }
}

fn completion_message(winner: Option<Side>) -> String {
    match winner {
        Some(Side::Left) => "Left player wins!".to_string(),
        Some(Side::Right) => "Right player wins!".to_string(),
        None => "Match over.".to_string(),
    }
}
