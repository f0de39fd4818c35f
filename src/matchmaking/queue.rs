//! Single-slot waiting queue

use std::time::{Duration, Instant};

use crate::ws::protocol::ConnectionId;

/// The connection currently waiting for an opponent
#[derive(Debug, Clone, Copy)]
pub struct WaitingPlayer {
    pub connection_id: ConnectionId,
    pub queued_at: Instant,
}

impl WaitingPlayer {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            queued_at: Instant::now(),
        }
    }

    /// How long this player has been waiting
    pub fn wait_time(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

/// Holds at most one unmatched connection
#[derive(Debug, Default)]
pub struct WaitingSlot {
    waiting: Option<WaitingPlayer>,
}

impl WaitingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a connection in the slot, replacing whoever was there
    pub fn occupy(&mut self, connection_id: ConnectionId) -> Option<WaitingPlayer> {
        self.waiting.replace(WaitingPlayer::new(connection_id))
    }

    /// Take the waiting connection out of the slot
    pub fn take(&mut self) -> Option<WaitingPlayer> {
        self.waiting.take()
    }

    /// Clear the slot if `connection_id` is the one waiting
    pub fn release(&mut self, connection_id: &ConnectionId) -> Option<WaitingPlayer> {
        if self.contains(connection_id) {
            self.waiting.take()
        } else {
            None
        }
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.waiting
            .as_ref()
            .is_some_and(|p| &p.connection_id == connection_id)
    }

    pub fn len(&self) -> usize {
        usize::from(self.waiting.is_some())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_none()
    }
}
