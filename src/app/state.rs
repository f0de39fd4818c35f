//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::server::{ConnectionHub, ServerHandle, SharedStats};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Inbound event channel of the game server
    pub server: ServerHandle,
    /// Outbound channels of open sockets
    pub hub: ConnectionHub,
    /// Counters published by the game server
    pub stats: SharedStats,
}

impl AppState {
    pub fn new(config: Config, server: ServerHandle, hub: ConnectionHub, stats: SharedStats) -> Self {
        Self {
            config: Arc::new(config),
            server,
            hub,
            stats,
        }
    }
}
