//! Authoritative match state
//!
//! These types are both the simulation's working data and the serialization
//! unit pushed to clients. Snapshots are produced by cloning, so a holder of a
//! snapshot can never reach back into the running simulation.

use serde::{Deserialize, Serialize};

use super::physics::GameConfig;

/// Which paddle a connection controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Desired paddle direction, held until the client changes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Idle,
}

impl Direction {
    /// Sign of the vertical movement (screen coordinates, y grows downward)
    pub fn sign(self) -> f32 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
            Direction::Idle => 0.0,
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Created but not started
    Waiting,
    /// Ball in play
    Playing,
    /// A point was just scored (resolved within the same tick)
    Scored,
    /// A side reached the win score; terminal
    Finished,
}

/// Ball position (top-left corner) and velocity in px/s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl BallState {
    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }
}

/// A paddle's vertical offset; its x is fixed by side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleState {
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PaddleState {
    pub fn centered(config: &GameConfig) -> Self {
        Self {
            y: config.board_height / 2.0 - config.paddle_height / 2.0,
            width: config.paddle_width,
            height: config.paddle_height,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddles {
    pub left: PaddleState,
    pub right: PaddleState,
}

impl Paddles {
    pub fn get(&self, side: Side) -> &PaddleState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut PaddleState {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub left: u32,
    pub right: u32,
}

impl ScoreState {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn increment(&mut self, side: Side) -> u32 {
        let slot = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *slot += 1;
        *slot
    }
}

/// Full game state as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub ball: BallState,
    pub paddles: Paddles,
    pub score: ScoreState,
    pub status: MatchStatus,
    pub winner: Option<Side>,
    pub board_width: f32,
    pub board_height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_state_wire_shape() {
        let config = GameConfig::default();
        let state = GameState {
            ball: BallState {
                x: 395.0,
                y: 295.0,
                vx: 200.0,
                vy: -100.0,
            },
            paddles: Paddles {
                left: PaddleState::centered(&config),
                right: PaddleState::centered(&config),
            },
            score: ScoreState { left: 2, right: 1 },
            status: MatchStatus::Playing,
            winner: None,
            board_width: config.board_width,
            board_height: config.board_height,
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "playing");
        assert_eq!(json["winner"], serde_json::Value::Null);
        assert_eq!(json["boardWidth"], 800.0);
        assert_eq!(json["boardHeight"], 600.0);
        assert_eq!(json["paddles"]["left"]["y"], 260.0);
        assert_eq!(json["paddles"]["right"]["height"], 80.0);
        assert_eq!(json["score"]["left"], 2);
    }

    #[test]
    fn test_score_increment() {
        let mut score = ScoreState::default();
        assert_eq!(score.increment(Side::Right), 1);
        assert_eq!(score.increment(Side::Right), 2);
        assert_eq!(score.get(Side::Left), 0);
        assert_eq!(score.get(Side::Right), 2);
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Left.opponent(), Side::Right);
        assert_eq!(Side::Right.opponent(), Side::Left);
    }
}
