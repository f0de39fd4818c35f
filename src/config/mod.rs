//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::game::GameConfig;
use crate::util::rate_limit::DEFAULT_INPUT_RATE_LIMIT;

/// Upper bound for TICK_RATE_HZ, keeps the tick period well above zero
pub const MAX_TICK_RATE_HZ: u32 = 1000;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, comma-separated
    pub client_origin: String,
    /// Scheduler ticks per second
    pub tick_rate_hz: u32,
    /// Max inbound WebSocket messages per second per connection
    pub input_rate_limit: u32,
    /// Board and physics tuning
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3001".to_string()),
        };

        let tick_rate_hz = parse_positive(&lookup, "TICK_RATE_HZ", 60)?;
        if tick_rate_hz > MAX_TICK_RATE_HZ {
            return Err(ConfigError::Invalid("TICK_RATE_HZ", tick_rate_hz.to_string()));
        }

        let game = GameConfig {
            win_score: parse_positive(&lookup, "WIN_SCORE", GameConfig::default().win_score)?,
            ..GameConfig::default()
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            client_origin: lookup("CLIENT_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),

            tick_rate_hz,
            input_rate_limit: parse_positive(&lookup, "INPUT_RATE_LIMIT", DEFAULT_INPUT_RATE_LIMIT)?,
            game,
        })
    }
}

/// Parse an optional numeric variable that must be greater than zero
fn parse_positive<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::Invalid(key, raw)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = assert_ok!(load(&[]));
        assert_eq!(config.server_addr, "0.0.0.0:3001".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.client_origin, "http://localhost:5173");
        assert_eq!(config.tick_rate_hz, 60);
        assert_eq!(config.input_rate_limit, DEFAULT_INPUT_RATE_LIMIT);
        assert_eq!(config.game, GameConfig::default());
    }

    #[test]
    fn test_port_wins_over_server_addr() {
        let config = assert_ok!(load(&[("PORT", "9000"), ("SERVER_ADDR", "127.0.0.1:1234")]));
        assert_eq!(config.server_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());

        let config = assert_ok!(load(&[("SERVER_ADDR", "127.0.0.1:1234")]));
        assert_eq!(config.server_addr, "127.0.0.1:1234".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_overrides() {
        let config = assert_ok!(load(&[("WIN_SCORE", "11"), ("TICK_RATE_HZ", "30")]));
        assert_eq!(config.game.win_score, 11);
        assert_eq!(config.tick_rate_hz, 30);

        let config = assert_ok!(load(&[("TICK_RATE_HZ", "1000")]));
        assert_eq!(config.tick_rate_hz, MAX_TICK_RATE_HZ);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            assert_err!(load(&[("TICK_RATE_HZ", "0")])),
            ConfigError::Invalid("TICK_RATE_HZ", _)
        ));
        assert!(matches!(
            assert_err!(load(&[("TICK_RATE_HZ", "4000000000")])),
            ConfigError::Invalid("TICK_RATE_HZ", _)
        ));
        assert!(matches!(
            assert_err!(load(&[("WIN_SCORE", "lots")])),
            ConfigError::Invalid("WIN_SCORE", _)
        ));
        assert!(matches!(
            assert_err!(load(&[("SERVER_ADDR", "not an address")])),
            ConfigError::InvalidAddress
        ));
    }
}
