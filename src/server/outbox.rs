//! Outbound message routing to connected sockets

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::ws::protocol::{ConnectionId, ServerMsg};

/// Per-connection outbound buffer size
pub const OUTBOUND_CAPACITY: usize = 128;

/// Delivery of server messages to a connection. Fire-and-forget.
pub trait Outbox {
    fn send(&self, to: ConnectionId, msg: ServerMsg);
}

/// Outbound channels of every open socket, shared between socket tasks and
/// the game server
#[derive(Clone, Default)]
pub struct ConnectionHub {
    senders: Arc<DashMap<ConnectionId, mpsc::Sender<ServerMsg>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an outbound channel for a new socket
    pub fn register(&self, connection_id: ConnectionId) -> mpsc::Receiver<ServerMsg> {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        if self.senders.insert(connection_id, tx).is_some() {
            warn!(connection_id = %connection_id, "Replaced existing outbound channel");
        }
        rx
    }

    pub fn unregister(&self, connection_id: &ConnectionId) {
        self.senders.remove(connection_id);
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl Outbox for ConnectionHub {
    fn send(&self, to: ConnectionId, msg: ServerMsg) {
        let Some(sender) = self.senders.get(&to).map(|s| s.value().clone()) else {
            debug!(connection_id = %to, "Dropping message for unknown connection");
            return;
        };

        match sender.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(connection_id = %to, "Outbound buffer full, dropping message");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection_id = %to, "Outbound channel closed");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Records every message instead of delivering it
    #[derive(Default)]
    pub struct RecordingOutbox {
        pub sent: RefCell<Vec<(ConnectionId, ServerMsg)>>,
    }

    impl RecordingOutbox {
        pub fn to(&self, conn: ConnectionId) -> Vec<ServerMsg> {
            self.sent
                .borrow()
                .iter()
                .filter(|(to, _)| *to == conn)
                .map(|(_, msg)| msg.clone())
                .collect()
        }

        pub fn clear(&self) {
            self.sent.borrow_mut().clear();
        }
    }

    impl Outbox for RecordingOutbox {
        fn send(&self, to: ConnectionId, msg: ServerMsg) {
            self.sent.borrow_mut().push((to, msg));
        }
    }
}
