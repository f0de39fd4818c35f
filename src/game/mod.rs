//! Pong simulation modules

pub mod r#match;
pub mod physics;
pub mod simulation;
pub mod state;

pub use r#match::{GameMatch, MatchId, MatchRegistry};
pub use physics::GameConfig;
pub use state::{Direction, GameState, MatchStatus, Side};
