//! Authoritative per-match simulation
//!
//! `Simulation::update` is the whole state machine:
//! `waiting -> playing -> (scored -> playing)* -> finished`.
//! Scoring resolves within a single update, so `scored` is never observed
//! between ticks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::physics::{GameConfig, PhysicsSystem};
use super::state::{BallState, Direction, GameState, MatchStatus, PaddleState, Paddles, ScoreState, Side};

/// What happened during one update, for logging by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub wall_bounce: bool,
    pub paddle_hit: Option<Side>,
    pub scored: Option<Side>,
}

pub struct Simulation {
    config: GameConfig,
    state: GameState,
    rng: ChaCha8Rng,
}

impl Simulation {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ball = serve_ball(&config, &mut rng);
        let state = GameState {
            ball,
            paddles: Paddles {
                left: PaddleState::centered(&config),
                right: PaddleState::centered(&config),
            },
            score: ScoreState::default(),
            status: MatchStatus::Waiting,
            winner: None,
            board_width: config.board_width,
            board_height: config.board_height,
        };

        Self { config, state, rng }
    }

    pub fn status(&self) -> MatchStatus {
        self.state.status
    }

    pub fn winner(&self) -> Option<Side> {
        self.state.winner
    }

    /// Copy of the current state, safe to hand out
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Begin play. Only valid from `waiting`; returns whether it started.
    pub fn start(&mut self) -> bool {
        if self.state.status == MatchStatus::Waiting {
            self.state.status = MatchStatus::Playing;
            true
        } else {
            false
        }
    }

    /// Apply a movement intent to one paddle for `dt` seconds
    pub fn move_paddle(&mut self, side: Side, direction: Direction, dt: f32) {
        if self.state.status != MatchStatus::Playing {
            return;
        }
        let paddle = self.state.paddles.get_mut(side);
        PhysicsSystem::move_paddle(paddle, direction, dt, &self.config);
    }

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.state.status != MatchStatus::Playing || dt <= 0.0 || !dt.is_finite() {
            return outcome;
        }

        PhysicsSystem::integrate(&mut self.state.ball, dt);
        outcome.wall_bounce = PhysicsSystem::bounce_walls(&mut self.state.ball, &self.config);

        for side in [Side::Left, Side::Right] {
            let paddle = *self.state.paddles.get(side);
            if PhysicsSystem::is_paddle_hit(&self.state.ball, &paddle, side, &self.config) {
                PhysicsSystem::deflect(&mut self.state.ball, &paddle, side, &self.config);
                outcome.paddle_hit = Some(side);
            }
        }

        if let Some(side) = PhysicsSystem::scoring_side(&self.state.ball, &self.config) {
            self.award_point(side);
            outcome.scored = Some(side);
        }

        self.check_game_end();
        outcome
    }

    fn award_point(&mut self, side: Side) {
        self.state.status = MatchStatus::Scored;
        self.state.score.increment(side);
        self.state.ball = serve_ball(&self.config, &mut self.rng);
        self.state.paddles.left = PaddleState::centered(&self.config);
        self.state.paddles.right = PaddleState::centered(&self.config);
        self.state.status = MatchStatus::Playing;
    }

    /// Finish the match once a side reaches the win score
    fn check_game_end(&mut self) {
        if self.state.status == MatchStatus::Finished {
            return;
        }

        let win_score = self.config.win_score;
        let winner = [Side::Left, Side::Right]
            .into_iter()
            .find(|side| self.state.score.get(*side) >= win_score);

        if let Some(side) = winner {
            self.state.status = MatchStatus::Finished;
            self.state.winner = Some(side);
        }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

/// Ball at the board center heading in a random diagonal
fn serve_ball(config: &GameConfig, rng: &mut impl Rng) -> BallState {
    let dir_x = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let dir_y = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

    BallState {
        x: config.board_width / 2.0 - config.ball_size / 2.0,
        y: config.board_height / 2.0 - config.ball_size / 2.0,
        vx: config.initial_ball_speed * dir_x,
        vy: config.initial_ball_speed * config.serve_vertical_ratio * dir_y,
    }
}
