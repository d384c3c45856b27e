//! Breakout: paddle, ball and a 10x6 brick wall

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::approach;
use crate::platform::{FrameInput, Key};
use crate::renderer::{Color, Scene, colors, with_alpha};
use crate::sim::{GameRng, Rect, circle_rect, paddle_deflection, reflect_velocity};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const PADDLE_W: f32 = 110.0;
const PADDLE_H: f32 = 14.0;
const PADDLE_Y: f32 = 560.0;
const PADDLE_SPEED: f32 = 620.0;
const BALL_RADIUS: f32 = 7.0;
const BALL_SPEED: f32 = 380.0;
const LEVEL_SPEEDUP: f32 = 40.0;
const MAX_BOUNCE_ANGLE: f32 = 1.1;
pub const BRICK_COLS: usize = 10;
pub const BRICK_ROWS: usize = 6;
const BRICK_W: f32 = 72.0;
const BRICK_H: f32 = 22.0;
const BRICK_GAP: f32 = 6.0;
const BRICK_TOP: f32 = 70.0;
pub const START_LIVES: u32 = 3;
const MAX_PARTICLES: usize = 120;

/// Row-based brick colors (top to bottom)
const ROW_COLORS: [Color; BRICK_ROWS] = [
    colors::RED,
    colors::ORANGE,
    colors::YELLOW,
    colors::GREEN,
    colors::TEAL,
    colors::BLUE,
];

#[derive(Debug, Clone)]
struct Brick {
    rect: Rect,
    row: usize,
    alive: bool,
}

impl Brick {
    /// Higher rows pay more
    fn points(&self) -> u64 {
        ((BRICK_ROWS - self.row) * 10) as u64
    }
}

#[derive(Debug, Clone)]
struct Particle {
    pos: Vec2,
    vel: Vec2,
    life: f32,
    color: Color,
}

pub struct Breakout {
    phase: Phase,
    rng: GameRng,
    paddle_x: f32,
    ball_pos: Vec2,
    ball_vel: Vec2,
    /// Ball sits on the paddle until served
    attached: bool,
    bricks: Vec<Brick>,
    particles: Vec<Particle>,
    lives: u32,
    level: u32,
    score: u64,
    events: Vec<GameEvent>,
}

fn build_wall() -> Vec<Brick> {
    let total_w = BRICK_COLS as f32 * (BRICK_W + BRICK_GAP) - BRICK_GAP;
    let left = (WIDTH - total_w) / 2.0;
    (0..BRICK_ROWS)
        .flat_map(|row| {
            (0..BRICK_COLS).map(move |col| Brick {
                rect: Rect::new(
                    left + col as f32 * (BRICK_W + BRICK_GAP),
                    BRICK_TOP + row as f32 * (BRICK_H + BRICK_GAP),
                    BRICK_W,
                    BRICK_H,
                ),
                row,
                alive: true,
            })
        })
        .collect()
}

impl Breakout {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            paddle_x: WIDTH / 2.0,
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            attached: true,
            bricks: build_wall(),
            particles: Vec::new(),
            lives: START_LIVES,
            level: 1,
            score: 0,
            events: Vec::new(),
        };
        game.attach_ball();
        game
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    fn paddle_rect(&self) -> Rect {
        Rect::from_center(Vec2::new(self.paddle_x, PADDLE_Y), Vec2::new(PADDLE_W, PADDLE_H))
    }

    fn ball_speed(&self) -> f32 {
        BALL_SPEED + (self.level - 1) as f32 * LEVEL_SPEEDUP
    }

    fn attach_ball(&mut self) {
        self.attached = true;
        self.ball_vel = Vec2::ZERO;
        self.ball_pos = Vec2::new(self.paddle_x, PADDLE_Y - PADDLE_H / 2.0 - BALL_RADIUS - 1.0);
    }

    fn serve(&mut self) {
        self.attached = false;
        let angle = self.rng.range_f32(-0.4, 0.4);
        self.ball_vel = Vec2::new(angle.sin(), -angle.cos()) * self.ball_speed();
        self.events.push(GameEvent::Blip);
    }

    fn move_paddle(&mut self, input: &FrameInput, dt: f32) {
        let axis = input.axis_x();
        if axis != 0.0 {
            self.paddle_x += axis * PADDLE_SPEED * dt;
        } else if let Some(pointer) = input.pointer {
            self.paddle_x = approach(self.paddle_x, pointer.x, PADDLE_SPEED * 2.0 * dt);
        }
        self.paddle_x = self.paddle_x.clamp(PADDLE_W / 2.0, WIDTH - PADDLE_W / 2.0);
    }

    fn burst(&mut self, at: Vec2, color: Color) {
        for _ in 0..8 {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let angle = self.rng.range_f32(0.0, std::f32::consts::TAU);
            let speed = self.rng.range_f32(60.0, 180.0);
            self.particles.push(Particle {
                pos: at,
                vel: Vec2::from_angle(angle) * speed,
                life: 0.6,
                color,
            });
        }
    }

    fn collide_walls(&mut self) {
        if self.ball_pos.x < BALL_RADIUS && self.ball_vel.x < 0.0 {
            self.ball_pos.x = BALL_RADIUS;
            self.ball_vel.x = -self.ball_vel.x;
            self.events.push(GameEvent::Blip);
        } else if self.ball_pos.x > WIDTH - BALL_RADIUS && self.ball_vel.x > 0.0 {
            self.ball_pos.x = WIDTH - BALL_RADIUS;
            self.ball_vel.x = -self.ball_vel.x;
            self.events.push(GameEvent::Blip);
        }
        if self.ball_pos.y < BALL_RADIUS && self.ball_vel.y < 0.0 {
            self.ball_pos.y = BALL_RADIUS;
            self.ball_vel.y = -self.ball_vel.y;
            self.events.push(GameEvent::Blip);
        }
    }

    fn collide_paddle(&mut self) {
        let paddle = self.paddle_rect();
        let hit = circle_rect(self.ball_pos, BALL_RADIUS, &paddle);
        if !hit.hit || self.ball_vel.y <= 0.0 {
            return;
        }
        let offset = (self.ball_pos.x - paddle.center().x) / (PADDLE_W / 2.0);
        let angle = paddle_deflection(offset, MAX_BOUNCE_ANGLE);
        let speed = self.ball_vel.length().max(self.ball_speed());
        self.ball_vel = Vec2::new(angle.sin(), -angle.cos()) * speed;
        self.ball_pos.y = paddle.y - BALL_RADIUS;
        self.events.push(GameEvent::Bounce);
    }

    fn collide_bricks(&mut self) {
        // One brick per step keeps corner hits from double-reflecting
        let Some((index, hit)) = self
            .bricks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.alive)
            .map(|(i, b)| (i, circle_rect(self.ball_pos, BALL_RADIUS, &b.rect)))
            .find(|(_, hit)| hit.hit)
        else {
            return;
        };

        if self.ball_vel.dot(hit.normal) < 0.0 {
            self.ball_vel = reflect_velocity(self.ball_vel, hit.normal);
        }
        self.ball_pos += hit.normal * hit.penetration;

        let brick = &mut self.bricks[index];
        brick.alive = false;
        let points = brick.points();
        let center = brick.rect.center();
        let color = ROW_COLORS[brick.row];
        self.score += points;
        self.events.push(GameEvent::Hit);
        self.burst(center, color);

        if self.bricks_left() == 0 {
            self.level += 1;
            self.bricks = build_wall();
            self.attach_ball();
            self.events.push(GameEvent::LevelUp);
        }
    }

    fn lose_ball(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        } else {
            self.events.push(GameEvent::LifeLost);
            self.attach_ball();
        }
    }
}

impl ArcadeGame for Breakout {
    fn id(&self) -> GameId {
        GameId::Breakout
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Lives", self.lives),
            HudItem::new("Level", self.level),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        let launch = start_pressed(input);
        match self.phase {
            Phase::Ready if launch => self.phase = Phase::Playing,
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        self.move_paddle(input, dt);

        self.particles.retain_mut(|p| {
            p.pos += p.vel * dt;
            p.life -= dt;
            p.life > 0.0
        });

        if self.attached {
            self.ball_pos.x = self.paddle_x;
            if launch || input.pressed(Key::Up) {
                self.serve();
            }
            return;
        }

        self.ball_pos += self.ball_vel * dt;
        self.collide_walls();
        self.collide_paddle();
        self.collide_bricks();

        if self.ball_pos.y > HEIGHT + BALL_RADIUS {
            self.lose_ball();
        }
    }

    fn draw(&self, scene: &mut Scene) {
        for brick in self.bricks.iter().filter(|b| b.alive) {
            scene.rect(brick.rect, ROW_COLORS[brick.row]);
        }
        scene.rect(self.paddle_rect(), colors::WHITE);
        scene.circle(self.ball_pos, BALL_RADIUS, colors::WHITE);

        for i in 0..self.lives {
            scene.circle(Vec2::new(20.0 + i as f32 * 18.0, 24.0), 5.0, colors::PINK);
        }
        scene.digits(self.score, Vec2::new(WIDTH - 160.0, 14.0), 4.0, colors::WHITE);

        if scene.effects_enabled() {
            for p in &self.particles {
                scene.rect(
                    Rect::from_center(p.pos, Vec2::splat(4.0)),
                    with_alpha(p.color, (p.life / 0.6).clamp(0.0, 1.0)),
                );
            }
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

    fn served() -> Breakout {
        let mut game = Breakout::new(4);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        assert!(!game.attached);
        game
    }

    #[test]
    fn ball_waits_on_paddle() {
        let mut game = Breakout::new(1);
        game.phase = Phase::Playing;
        game.tick(&FrameInput::idle().with_held(Key::Right), 0.1);
        assert!(game.attached);
        assert_eq!(game.ball_pos.x, game.paddle_x);
    }

    #[test]
    fn brick_hit_scores_by_row() {
        let mut game = served();
        let target = game.bricks[0].rect;
        game.ball_pos = Vec2::new(target.center().x, target.bottom() + BALL_RADIUS - 1.0);
        game.ball_vel = Vec2::new(0.0, -300.0);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert!(!game.bricks[0].alive);
        assert_eq!(game.score(), 60);
        assert!(game.ball_vel.y > 0.0);
    }

    #[test]
    fn missed_ball_costs_a_life() {
        let mut game = served();
        game.ball_pos = Vec2::new(100.0, HEIGHT + 20.0);
        game.ball_vel = Vec2::new(0.0, 300.0);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.lives(), START_LIVES - 1);
        assert!(game.attached);
    }

    #[test]
    fn last_life_ends_game() {
        let mut game = served();
        game.lives = 1;
        game.lose_ball();
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn clearing_wall_advances_level() {
        let mut game = served();
        for brick in game.bricks.iter_mut().skip(1) {
            brick.alive = false;
        }
        let target = game.bricks[0].rect;
        game.ball_pos = Vec2::new(target.center().x, target.bottom() + BALL_RADIUS - 1.0);
        game.ball_vel = Vec2::new(0.0, -300.0);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.level(), 2);
        assert_eq!(game.bricks_left(), BRICK_COLS * BRICK_ROWS);
        assert!(game.ball_speed() > BALL_SPEED);
    }

    #[test]
    fn paddle_edge_deflects_outward() {
        let mut game = served();
        game.ball_pos = Vec2::new(game.paddle_x + PADDLE_W * 0.45, PADDLE_Y - PADDLE_H / 2.0 - BALL_RADIUS + 2.0);
        game.ball_vel = Vec2::new(0.0, 300.0);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert!(game.ball_vel.x > 0.0);
        assert!(game.ball_vel.y < 0.0);
    }
}
