//! Time utilities for the tick loop and health reporting

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Server start, recorded once at startup
static SERVER_START: OnceLock<(Instant, DateTime<Utc>)> = OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(|| (Instant::now(), Utc::now()));
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|(start, _)| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Wall-clock time the server started, if initialized
pub fn started_at() -> Option<DateTime<Utc>> {
    SERVER_START.get().map(|(_, at)| *at)
}

/// Measures real elapsed time between ticks
#[derive(Debug, Clone)]
pub struct TickClock {
    last: Instant,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call (or since creation), and restart
    pub fn delta_secs(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_tick_clock_measures_elapsed_time() {
        let mut clock = TickClock::new();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let dt = clock.delta_secs();
        assert!(dt >= 0.02, "dt was {dt}");
        assert!(dt < 1.0, "dt was {dt}");

        let again = clock.delta_secs();
        assert!(again < dt);
    }

    #[test]
    fn test_uptime_after_init() {
        init_server_time();
        assert!(started_at().is_some());
        assert!(uptime_secs() < 60);
    }
}
