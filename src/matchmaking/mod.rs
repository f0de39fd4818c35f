//! Matchmaking: the waiting slot and pairing into matches

pub mod queue;
pub mod service;

pub use service::{MatchError, MatchRequest, Matchmaker};
