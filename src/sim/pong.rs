//! Cabinet Pong played inside the arcade overlay
//!
//! Left paddle is the player, right paddle follows the ball.

use glam::Vec2;

pub const COURT_W: f32 = 480.0;
pub const COURT_H: f32 = 320.0;
pub const PADDLE_W: f32 = 10.0;
pub const PADDLE_H: f32 = 60.0;
pub const PLAYER_SPEED: f32 = 220.0;
pub const AI_SPEED: f32 = 180.0;
pub const BALL_RADIUS: f32 = 5.0;
/// Cabinet frames clamp slightly looser than the scene driver
pub const MAX_CABINET_DT: f32 = 0.033;

const SERVE_VEL: Vec2 = Vec2::new(180.0, 140.0);
/// Ball x past which a paddle can return it
const PADDLE_REACH: f32 = 20.0;
/// Ball this far outside the court is re-served
const OUT_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PongInput {
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pong {
    pub ball: Vec2,
    pub vel: Vec2,
    /// Top edge of the player's paddle
    pub player_y: f32,
    /// Top edge of the computer's paddle
    pub ai_y: f32,
    /// Balls that left the court
    pub serves: u32,
}

impl Default for Pong {
    fn default() -> Self {
        Self::new()
    }
}

impl Pong {
    pub fn new() -> Self {
        Self {
            ball: Vec2::new(COURT_W / 2.0, COURT_H / 2.0),
            vel: SERVE_VEL,
            player_y: 140.0,
            ai_y: 140.0,
            serves: 0,
        }
    }

    pub fn player_x() -> f32 {
        10.0
    }

    pub fn ai_x() -> f32 {
        COURT_W - 20.0
    }

    pub fn tick(&mut self, input: PongInput, dt: f32) {
        let dt = dt.clamp(0.0, MAX_CABINET_DT);
        let max_y = COURT_H - PADDLE_H;

        if input.up {
            self.player_y -= PLAYER_SPEED * dt;
        }
        if input.down {
            self.player_y += PLAYER_SPEED * dt;
        }
        self.player_y = self.player_y.clamp(0.0, max_y);

        let target = self.ball.y - PADDLE_H / 2.0;
        if self.ai_y < target {
            self.ai_y = (self.ai_y + AI_SPEED * dt).min(target);
        } else if self.ai_y > target {
            self.ai_y = (self.ai_y - AI_SPEED * dt).max(target);
        }
        self.ai_y = self.ai_y.clamp(0.0, max_y);

        self.ball += self.vel * dt;
        if self.ball.y < 0.0 {
            self.ball.y = 0.0;
            self.vel.y = -self.vel.y;
        }
        if self.ball.y > COURT_H {
            self.ball.y = COURT_H;
            self.vel.y = -self.vel.y;
        }

        let covers = |top: f32, y: f32| y > top && y < top + PADDLE_H;
        if self.ball.x < PADDLE_REACH && covers(self.player_y, self.ball.y) {
            self.ball.x = PADDLE_REACH;
            self.vel.x = self.vel.x.abs();
        }
        if self.ball.x > COURT_W - PADDLE_REACH && covers(self.ai_y, self.ball.y) {
            self.ball.x = COURT_W - PADDLE_REACH;
            self.vel.x = -self.vel.x.abs();
        }

        if self.ball.x < -OUT_MARGIN || self.ball.x > COURT_W + OUT_MARGIN {
            self.ball = Vec2::new(COURT_W / 2.0, COURT_H / 2.0);
            self.vel.x = -self.vel.x;
            self.serves += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_bounces_off_walls() {
        let mut pong = Pong::new();
        pong.ball = Vec2::new(240.0, 2.0);
        pong.vel = Vec2::new(0.0, -140.0);
        pong.tick(PongInput::default(), 0.03);
        assert_eq!(pong.ball.y, 0.0);
        assert_eq!(pong.vel.y, 140.0);
    }

    #[test]
    fn test_player_paddle_returns_ball() {
        let mut pong = Pong::new();
        pong.player_y = 100.0;
        pong.ball = Vec2::new(22.0, 130.0);
        pong.vel = Vec2::new(-180.0, 0.0);
        pong.tick(PongInput::default(), 0.03);
        assert_eq!(pong.ball.x, 20.0);
        assert_eq!(pong.vel.x, 180.0);
    }

    #[test]
    fn test_miss_reserves_from_centre() {
        let mut pong = Pong::new();
        pong.player_y = 0.0;
        pong.ball = Vec2::new(-9.0, 300.0);
        pong.vel = Vec2::new(-180.0, 0.0);
        pong.tick(PongInput::default(), 0.03);
        assert_eq!(pong.ball, Vec2::new(240.0, 160.0));
        assert_eq!(pong.vel.x, 180.0);
        assert_eq!(pong.serves, 1);
    }

    #[test]
    fn test_paddles_stay_in_court() {
        let mut pong = Pong::new();
        let up = PongInput { up: true, down: false };
        for _ in 0..200 {
            pong.tick(up, 0.05);
            assert!(pong.player_y >= 0.0 && pong.player_y <= COURT_H - PADDLE_H);
            assert!(pong.ai_y >= 0.0 && pong.ai_y <= COURT_H - PADDLE_H);
        }
        assert_eq!(pong.player_y, 0.0);
    }

    #[test]
    fn test_ai_tracks_ball_without_overshoot() {
        let mut pong = Pong::new();
        pong.vel = Vec2::ZERO;
        pong.ball.y = 141.0;
        pong.ai_y = 108.0;
        pong.tick(PongInput::default(), 0.033);
        assert_eq!(pong.ai_y, 111.0);
    }

    #[test]
    fn test_frame_step_is_clamped() {
        let mut pong = Pong::new();
        pong.tick(PongInput::default(), 1.0);
        let expected = Vec2::new(240.0, 160.0) + SERVE_VEL * MAX_CABINET_DT;
        assert!((pong.ball - expected).length() < 1e-3);
    }
}
