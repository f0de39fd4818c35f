//! The game server: one task owning every match
//!
//! All match state lives in [`GameServer`], which runs on a single task and
//! alternates between handling inbound connection events and running ticks.
//! Nothing else touches matches, so no locking is needed around simulation
//! state.

pub mod lifecycle;
pub mod outbox;
pub mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::{GameConfig, MatchRegistry};
use crate::matchmaking::Matchmaker;
use crate::util::time::TickClock;
use crate::ws::protocol::{ClientMsg, ConnectionId, ServerMsg};

pub use outbox::{ConnectionHub, Outbox};

/// Inbound event buffer size
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Everything the transport layer reports to the game server
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connected(ConnectionId),
    Message {
        connection_id: ConnectionId,
        msg: ClientMsg,
    },
    Disconnected(ConnectionId),
}

/// Counters published once per tick for the health endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    pub active_matches: usize,
    pub waiting_players: usize,
    pub players_in_matches: usize,
    pub ticks: u64,
}

pub type SharedStats = Arc<RwLock<ServerStats>>;

/// Sending half of the server's event channel
#[derive(Clone)]
pub struct ServerHandle {
    events: mpsc::Sender<ServerEvent>,
}

impl ServerHandle {
    pub fn channel() -> (Self, mpsc::Receiver<ServerEvent>) {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self { events }, rx)
    }

    /// Queue an event. Returns false if the server has stopped.
    pub async fn send(&self, event: ServerEvent) -> bool {
        self.events.send(event).await.is_ok()
    }
}

pub struct GameServer<O> {
    matchmaker: Matchmaker,
    registry: MatchRegistry,
    outbox: O,
    stats: SharedStats,
    ticks: u64,
}

impl<O: Outbox> GameServer<O> {
    pub fn new(game_config: GameConfig, outbox: O, stats: SharedStats) -> Self {
        Self {
            matchmaker: Matchmaker::new(game_config),
            registry: MatchRegistry::new(),
            outbox,
            stats,
            ticks: 0,
        }
    }

    /// Drive ticks and events until the event channel closes
    pub async fn run(mut self, mut events: mpsc::Receiver<ServerEvent>, tick_rate_hz: u32) {
        let tick_duration = Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz.max(1)));
        let mut ticker = interval(tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = TickClock::new();

        info!(tick_rate_hz, "Game server loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let dt = clock.delta_secs();
                    self.tick(dt);
                }
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        info!("Event channel closed, stopping game server");
                        break;
                    }
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected(connection_id) => {
                debug!(connection_id = %connection_id, "Connection opened");
                self.outbox
                    .send(connection_id, ServerMsg::Connected { connection_id });
            }
            ServerEvent::Message { connection_id, msg } => match msg {
                ClientMsg::RequestMatch => self.handle_request_match(connection_id),
                ClientMsg::PaddleMove {
                    direction,
                    match_id,
                } => self.handle_paddle_move(connection_id, match_id, direction),
                ClientMsg::LeaveMatch => self.handle_leave(connection_id),
            },
            ServerEvent::Disconnected(connection_id) => self.handle_disconnect(connection_id),
        }
        self.publish_stats();
    }

    fn publish_stats(&self) {
        *self.stats.write() = ServerStats {
            active_matches: self.registry.active_matches(),
            waiting_players: self.matchmaker.waiting_count(),
            players_in_matches: self.registry.bound_connections(),
            ticks: self.ticks,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Side;
    use std::time::Duration;
    use tokio::time::timeout;
    use uuid::Uuid;

    async fn next_msg(rx: &mut mpsc::Receiver<ServerMsg>) -> ServerMsg {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for message")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_run_loop_pairs_and_streams_snapshots() {
        let hub = ConnectionHub::new();
        let stats = SharedStats::default();
        let (handle, events) = ServerHandle::channel();
        let server = GameServer::new(GameConfig::default(), hub.clone(), stats.clone());
        let task = tokio::spawn(server.run(events, 60));

        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);

        assert!(handle.send(ServerEvent::Connected(a)).await);
        assert_eq!(next_msg(&mut rx_a).await, ServerMsg::Connected { connection_id: a });

        for conn in [a, b] {
            handle
                .send(ServerEvent::Message {
                    connection_id: conn,
                    msg: ClientMsg::RequestMatch,
                })
                .await;
        }

        assert!(matches!(
            next_msg(&mut rx_a).await,
            ServerMsg::WaitingForOpponent { .. }
        ));
        assert!(matches!(
            next_msg(&mut rx_a).await,
            ServerMsg::MatchFound { side: Side::Left, .. }
        ));
        assert!(matches!(
            next_msg(&mut rx_b).await,
            ServerMsg::MatchFound { side: Side::Right, .. }
        ));

        // Initial snapshot, then at least one from the tick loop
        for _ in 0..2 {
            assert!(matches!(
                next_msg(&mut rx_b).await,
                ServerMsg::StateSnapshot(_)
            ));
        }

        handle.send(ServerEvent::Disconnected(a)).await;
        loop {
            match next_msg(&mut rx_b).await {
                ServerMsg::StateSnapshot(_) => continue,
                msg => {
                    assert!(matches!(msg, ServerMsg::OpponentDisconnected { .. }));
                    break;
                }
            }
        }

        drop(handle);
        timeout(Duration::from_secs(2), task)
            .await
            .expect("server did not stop")
            .unwrap();
        assert_eq!(stats.read().active_matches, 0);
    }
}
