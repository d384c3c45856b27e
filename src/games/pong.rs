//! Pong: player paddle on the left against a tracking AI on the right

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::approach;
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors};
use crate::sim::{GameRng, Rect, circle_rect, paddle_deflection};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const PADDLE_W: f32 = 12.0;
const PADDLE_H: f32 = 90.0;
const PADDLE_MARGIN: f32 = 30.0;
const PLAYER_SPEED: f32 = 480.0;
const POINTER_SPEED: f32 = 900.0;
const AI_SPEED: f32 = 330.0;
const BALL_RADIUS: f32 = 8.0;
const BALL_START_SPEED: f32 = 360.0;
const BALL_MAX_SPEED: f32 = 900.0;
/// Speed multiplier per paddle hit
const BALL_SPEEDUP: f32 = 1.06;
const MAX_BOUNCE_ANGLE: f32 = 1.05;
const SERVE_DELAY: f32 = 1.0;
pub const WINNING_SCORE: u32 = 7;

pub struct Pong {
    phase: Phase,
    rng: GameRng,
    player_y: f32,
    ai_y: f32,
    ball_pos: Vec2,
    ball_vel: Vec2,
    /// Seconds until the ball launches; direction is +1 toward the AI
    serve_timer: f32,
    serve_dir: f32,
    player_score: u32,
    ai_score: u32,
    rally: u32,
    events: Vec<GameEvent>,
}

impl Pong {
    pub fn new(seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let serve_dir = rng.sign();
        Self {
            phase: Phase::Ready,
            rng,
            player_y: HEIGHT / 2.0,
            ai_y: HEIGHT / 2.0,
            ball_pos: Vec2::new(WIDTH, HEIGHT) / 2.0,
            ball_vel: Vec2::ZERO,
            serve_timer: SERVE_DELAY,
            serve_dir,
            player_score: 0,
            ai_score: 0,
            rally: 0,
            events: Vec::new(),
        }
    }

    fn player_rect(&self) -> Rect {
        Rect::from_center(
            Vec2::new(PADDLE_MARGIN, self.player_y),
            Vec2::new(PADDLE_W, PADDLE_H),
        )
    }

    fn ai_rect(&self) -> Rect {
        Rect::from_center(
            Vec2::new(WIDTH - PADDLE_MARGIN, self.ai_y),
            Vec2::new(PADDLE_W, PADDLE_H),
        )
    }

    pub fn ball_pos(&self) -> Vec2 {
        self.ball_pos
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.player_score, self.ai_score)
    }

    fn reset_ball(&mut self, toward_ai: bool) {
        self.ball_pos = Vec2::new(WIDTH, HEIGHT) / 2.0;
        self.ball_vel = Vec2::ZERO;
        self.serve_timer = SERVE_DELAY;
        self.serve_dir = if toward_ai { 1.0 } else { -1.0 };
        self.rally = 0;
    }

    fn launch(&mut self) {
        let angle = self.rng.range_f32(-0.5, 0.5);
        self.ball_vel = Vec2::new(angle.cos() * self.serve_dir, angle.sin()) * BALL_START_SPEED;
    }

    fn move_player(&mut self, input: &FrameInput, dt: f32) {
        let axis = input.axis_y();
        if axis != 0.0 {
            self.player_y += axis * PLAYER_SPEED * dt;
        } else if let Some(pointer) = input.pointer {
            self.player_y = approach(self.player_y, pointer.y, POINTER_SPEED * dt);
        }
        self.player_y = self.player_y.clamp(PADDLE_H / 2.0, HEIGHT - PADDLE_H / 2.0);
    }

    fn move_ai(&mut self, dt: f32) {
        // Track the ball while it approaches, otherwise drift back to centre
        let target = if self.ball_vel.x > 0.0 {
            self.ball_pos.y
        } else {
            HEIGHT / 2.0
        };
        self.ai_y = approach(self.ai_y, target, AI_SPEED * dt);
        self.ai_y = self.ai_y.clamp(PADDLE_H / 2.0, HEIGHT - PADDLE_H / 2.0);
    }

    fn bounce_off_paddle(&mut self, paddle: Rect, facing: f32) {
        let hit = circle_rect(self.ball_pos, BALL_RADIUS, &paddle);
        // Only bounce when travelling into the paddle's face
        if !hit.hit || self.ball_vel.x * facing >= 0.0 {
            return;
        }
        let offset = (self.ball_pos.y - paddle.center().y) / (PADDLE_H / 2.0);
        let angle = paddle_deflection(offset, MAX_BOUNCE_ANGLE);
        let speed = (self.ball_vel.length() * BALL_SPEEDUP).min(BALL_MAX_SPEED);
        self.ball_vel = Vec2::new(angle.cos() * facing, angle.sin()) * speed;
        self.ball_pos.x = if facing > 0.0 {
            paddle.right() + BALL_RADIUS
        } else {
            paddle.x - BALL_RADIUS
        };
        self.rally += 1;
        self.events.push(GameEvent::Bounce);
    }

    fn point_scored(&mut self, by_player: bool) {
        if by_player {
            self.player_score += 1;
            self.events.push(GameEvent::Score);
        } else {
            self.ai_score += 1;
            self.events.push(GameEvent::LifeLost);
        }

        if self.player_score >= WINNING_SCORE {
            self.phase = Phase::Won;
            self.events.push(GameEvent::Won);
        } else if self.ai_score >= WINNING_SCORE {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        } else {
            // Serve toward whoever lost the point
            self.reset_ball(by_player);
        }
    }
}

impl ArcadeGame for Pong {
    fn id(&self) -> GameId {
        GameId::Pong
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.player_score as u64
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("You", self.player_score),
            HudItem::new("CPU", self.ai_score),
            HudItem::new("Rally", self.rally),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        match self.phase {
            Phase::Ready => {
                if start_pressed(input) {
                    self.phase = Phase::Playing;
                } else {
                    return;
                }
            }
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        self.move_player(input, dt);
        self.move_ai(dt);

        if self.ball_vel == Vec2::ZERO {
            self.serve_timer -= dt;
            if self.serve_timer <= 0.0 || input.pressed(Key::Action) {
                self.launch();
            }
            return;
        }

        self.ball_pos += self.ball_vel * dt;

        // Top and bottom walls
        if self.ball_pos.y < BALL_RADIUS && self.ball_vel.y < 0.0 {
            self.ball_pos.y = BALL_RADIUS;
            self.ball_vel.y = -self.ball_vel.y;
            self.events.push(GameEvent::Blip);
        } else if self.ball_pos.y > HEIGHT - BALL_RADIUS && self.ball_vel.y > 0.0 {
            self.ball_pos.y = HEIGHT - BALL_RADIUS;
            self.ball_vel.y = -self.ball_vel.y;
            self.events.push(GameEvent::Blip);
        }

        self.bounce_off_paddle(self.player_rect(), 1.0);
        self.bounce_off_paddle(self.ai_rect(), -1.0);

        if self.ball_pos.x < -BALL_RADIUS {
            self.point_scored(false);
        } else if self.ball_pos.x > WIDTH + BALL_RADIUS {
            self.point_scored(true);
        }
    }

    fn draw(&self, scene: &mut Scene) {
        // Centre net
        let mut y = 10.0;
        while y < HEIGHT {
            scene.rect(Rect::new(WIDTH / 2.0 - 2.0, y, 4.0, 20.0), colors::DIM);
            y += 40.0;
        }

        scene.digits_centered(self.player_score as u64, Vec2::new(WIDTH * 0.25, 60.0), 10.0, colors::DIM);
        scene.digits_centered(self.ai_score as u64, Vec2::new(WIDTH * 0.75, 60.0), 10.0, colors::DIM);

        scene.rect(self.player_rect(), colors::TEAL);
        scene.rect(self.ai_rect(), colors::PINK);

        // Blink the ball while waiting to serve
        let visible = self.ball_vel != Vec2::ZERO || (self.serve_timer * 4.0) as i32 % 2 == 0;
        if visible {
            scene.circle(self.ball_pos, BALL_RADIUS, colors::WHITE);
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn started() -> Pong {
        let mut game = Pong::new(7);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        game
    }

    #[test]
    fn waits_for_start() {
        let mut game = Pong::new(1);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.phase(), Phase::Ready);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn ball_past_ai_scores_for_player() {
        let mut game = started();
        game.ball_pos = Vec2::new(WIDTH + BALL_RADIUS + 1.0, 100.0);
        game.ball_vel = Vec2::new(400.0, 0.0);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.scores(), (1, 0));
        assert!(game.take_events().contains(&GameEvent::Score));
        assert_eq!(game.serve_dir, 1.0);
    }

    #[test]
    fn paddle_hit_reverses_and_speeds_up() {
        let mut game = started();
        game.ball_pos = Vec2::new(PADDLE_MARGIN + PADDLE_W / 2.0 + BALL_RADIUS - 1.0, game.player_y);
        game.ball_vel = Vec2::new(-400.0, 0.0);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert!(game.ball_vel.x > 0.0);
        assert!(game.ball_vel.length() > 400.0);
    }

    #[test]
    fn off_centre_hit_deflects() {
        let mut game = started();
        game.ball_pos = Vec2::new(
            PADDLE_MARGIN + PADDLE_W / 2.0 + BALL_RADIUS - 1.0,
            game.player_y + PADDLE_H * 0.4,
        );
        game.ball_vel = Vec2::new(-400.0, 0.0);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert!(game.ball_vel.y > 0.0);
    }

    #[test]
    fn seventh_point_wins() {
        let mut game = started();
        game.player_score = WINNING_SCORE - 1;
        game.point_scored(true);
        assert_eq!(game.phase(), Phase::Won);
        assert_eq!(game.result(), Some(WINNING_SCORE as u64));
    }

    #[test]
    fn ai_reaching_seven_ends_game() {
        let mut game = started();
        game.ai_score = WINNING_SCORE - 1;
        game.point_scored(false);
        assert_eq!(game.phase(), Phase::GameOver);
    }
}
