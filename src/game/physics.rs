//! Ball and paddle physics

use std::f32::consts::FRAC_PI_4;

use super::state::{BallState, Direction, PaddleState, Side};

/// Board geometry and tuning constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub board_width: f32,
    pub board_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Gap between the board edge and the outer face of each paddle
    pub paddle_margin: f32,
    /// The ball is a square of this size
    pub ball_size: f32,
    /// Horizontal serve speed in px/s
    pub initial_ball_speed: f32,
    /// Vertical serve speed as a fraction of the horizontal one
    pub serve_vertical_ratio: f32,
    /// Paddle speed in px/s
    pub paddle_speed: f32,
    /// Multiplier applied to ball speed on every paddle hit
    pub speed_increase_factor: f32,
    /// Deflection angle at the very tip of a paddle, in radians
    pub max_bounce_angle: f32,
    pub win_score: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 800.0,
            board_height: 600.0,
            paddle_width: 10.0,
            paddle_height: 80.0,
            paddle_margin: 30.0,
            ball_size: 10.0,
            initial_ball_speed: 200.0,
            serve_vertical_ratio: 0.5,
            paddle_speed: 300.0,
            speed_increase_factor: 1.05,
            max_bounce_angle: FRAC_PI_4,
            win_score: 5,
        }
    }
}

impl GameConfig {
    /// Left edge of a side's paddle
    pub fn paddle_x(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.paddle_margin,
            Side::Right => self.board_width - self.paddle_margin - self.paddle_width,
        }
    }

    /// Highest allowed paddle offset
    pub fn paddle_max_y(&self) -> f32 {
        (self.board_height - self.paddle_height).max(0.0)
    }
}

/// Stateless physics helpers for the pong board
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Explicit Euler step, no sub-stepping
    pub fn integrate(ball: &mut BallState, dt: f32) {
        ball.x += ball.vx * dt;
        ball.y += ball.vy * dt;
    }

    /// Reflect off the top and bottom walls. Returns true on a bounce.
    pub fn bounce_walls(ball: &mut BallState, config: &GameConfig) -> bool {
        if ball.y < 0.0 {
            ball.y = 0.0;
            ball.vy = ball.vy.abs();
            true
        } else if ball.y + config.ball_size > config.board_height {
            ball.y = config.board_height - config.ball_size;
            ball.vy = -ball.vy.abs();
            true
        } else {
            false
        }
    }

    /// Whether the ball is hitting the given side's paddle this step
    pub fn is_paddle_hit(
        ball: &BallState,
        paddle: &PaddleState,
        side: Side,
        config: &GameConfig,
    ) -> bool {
        let paddle_left = config.paddle_x(side);
        let paddle_right = paddle_left + paddle.width;

        let approaching_face = match side {
            Side::Left => {
                ball.vx < 0.0 && ball.x <= paddle_right && ball.x + config.ball_size >= paddle_left
            }
            Side::Right => {
                ball.vx > 0.0 && ball.x + config.ball_size >= paddle_left && ball.x <= paddle_right
            }
        };
        if !approaching_face {
            return false;
        }

        ball.y < paddle.y + paddle.height && ball.y + config.ball_size > paddle.y
    }

    /// Send the ball back from a paddle. The bounce angle depends on where the
    /// ball struck relative to the paddle center and the speed grows by the
    /// configured factor.
    pub fn deflect(ball: &mut BallState, paddle: &PaddleState, side: Side, config: &GameConfig) {
        let ball_center_y = ball.y + config.ball_size / 2.0;
        let half_height = paddle.height / 2.0;
        let hit_offset = if half_height > 0.0 {
            ((ball_center_y - paddle.center_y()) / half_height).clamp(-1.0, 1.0)
        } else {
            0.0
        };

        let speed = ball.speed() * config.speed_increase_factor;
        let angle = hit_offset * config.max_bounce_angle;

        // Horizontal direction always points away from the paddle that was hit
        let (away, flush_x) = match side {
            Side::Left => (1.0, config.paddle_x(side) + paddle.width),
            Side::Right => (-1.0, config.paddle_x(side) - config.ball_size),
        };

        ball.vx = away * (speed * angle.cos()).abs();
        ball.vy = speed * angle.sin();
        ball.x = flush_x;
    }

    /// Which side scores if the ball has left the board horizontally
    pub fn scoring_side(ball: &BallState, config: &GameConfig) -> Option<Side> {
        if ball.x < 0.0 {
            Some(Side::Right)
        } else if ball.x + config.ball_size > config.board_width {
            Some(Side::Left)
        } else {
            None
        }
    }

    /// Move a paddle by `paddle_speed * dt` and clamp it to the board
    pub fn move_paddle(paddle: &mut PaddleState, direction: Direction, dt: f32, config: &GameConfig) {
        let y = paddle.y + direction.sign() * config.paddle_speed * dt;
        paddle.y = y.clamp(0.0, config.paddle_max_y());
    }
}
