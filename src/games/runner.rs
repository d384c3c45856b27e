//! Runner: endless side-scroller, jump the cacti and duck the birds

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors};
use crate::sim::{GameRng, Rect};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 300.0;
const GROUND_Y: f32 = 250.0;
const RUNNER_X: f32 = 80.0;
const RUNNER_W: f32 = 40.0;
const STAND_H: f32 = 60.0;
const DUCK_H: f32 = 30.0;
const GRAVITY: f32 = 2400.0;
const JUMP_VELOCITY: f32 = -780.0;
/// Upward speed cap once the jump key is released
const JUMP_CUTOFF: f32 = -320.0;
/// Extra gravity while holding Down in the air
const FAST_FALL: f32 = 3.0;
const START_SPEED: f32 = 360.0;
const MAX_SPEED: f32 = 900.0;
/// Speed gained per second of running
const ACCEL: f32 = 9.0;
/// Pixels per scored metre
const PX_PER_POINT: f32 = 10.0;
const MILESTONE: u64 = 100;
/// Hitboxes shrink by this much so grazes are forgiven
const HIT_SLACK: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    SmallCactus,
    LargeCactus,
    /// Bird whose body sits at the given height band
    Bird(BirdHeight),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirdHeight {
    /// Must be jumped
    Low,
    /// Must be ducked
    Mid,
    /// Passes overhead
    High,
}

#[derive(Debug, Clone)]
struct Obstacle {
    kind: ObstacleKind,
    x: f32,
    /// Cacti standing side by side
    count: u32,
}

impl Obstacle {
    fn rect(&self) -> Rect {
        match self.kind {
            ObstacleKind::SmallCactus => {
                Rect::new(self.x, GROUND_Y - 40.0, 20.0 * self.count as f32, 40.0)
            }
            ObstacleKind::LargeCactus => {
                Rect::new(self.x, GROUND_Y - 60.0, 28.0 * self.count as f32, 60.0)
            }
            ObstacleKind::Bird(height) => {
                let bottom = match height {
                    BirdHeight::Low => GROUND_Y - 10.0,
                    BirdHeight::Mid => GROUND_Y - DUCK_H - 8.0,
                    BirdHeight::High => GROUND_Y - 90.0,
                };
                Rect::new(self.x, bottom - 30.0, 46.0, 30.0)
            }
        }
    }
}

pub struct Runner {
    phase: Phase,
    rng: GameRng,
    /// Height of the runner's feet above the ground (negative is up)
    lift: f32,
    vel_y: f32,
    ducking: bool,
    speed: f32,
    distance: f32,
    obstacles: Vec<Obstacle>,
    /// Distance left before the next obstacle spawns
    next_gap: f32,
    clock: f32,
    events: Vec<GameEvent>,
}

impl Runner {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            lift: 0.0,
            vel_y: 0.0,
            ducking: false,
            speed: START_SPEED,
            distance: 0.0,
            obstacles: Vec::new(),
            next_gap: WIDTH * 0.6,
            clock: 0.0,
            events: Vec::new(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn grounded(&self) -> bool {
        self.lift >= 0.0
    }

    fn runner_rect(&self) -> Rect {
        let h = if self.ducking && self.grounded() { DUCK_H } else { STAND_H };
        let w = if self.ducking && self.grounded() { RUNNER_W * 1.4 } else { RUNNER_W };
        Rect::new(RUNNER_X, GROUND_Y + self.lift - h, w, h)
    }

    fn spawn_obstacle(&mut self) {
        // Birds only show up once the pace picks up
        let birds = self.distance > 3000.0;
        let roll = self.rng.index(if birds { 5 } else { 3 });
        let kind = match roll {
            0 | 1 => ObstacleKind::SmallCactus,
            2 => ObstacleKind::LargeCactus,
            _ => {
                let height = [BirdHeight::Low, BirdHeight::Mid, BirdHeight::High];
                ObstacleKind::Bird(*self.rng.pick(&height).unwrap_or(&BirdHeight::High))
            }
        };
        let count = match kind {
            ObstacleKind::Bird(_) => 1,
            _ => self.rng.range_i32(1, 3) as u32,
        };
        self.obstacles.push(Obstacle {
            kind,
            x: WIDTH + 20.0,
            count,
        });
        // Faster runs need longer gaps to stay jumpable
        self.next_gap = self.speed * self.rng.range_f32(0.9, 1.6) + 120.0;
    }

    fn crash(&mut self) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::Hit);
        self.events.push(GameEvent::GameOver);
    }
}

impl ArcadeGame for Runner {
    fn id(&self) -> GameId {
        GameId::Runner
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        (self.distance / PX_PER_POINT) as u64
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![HudItem::new("Speed", self.speed as u32)]
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Space to jump, Down to duck".to_string()),
            Phase::GameOver => Some(format!("Ran {}m. R to retry", self.score())),
            _ => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        self.clock += dt;
        let jump = input.pressed(Key::Action) || input.pressed(Key::Up) || input.primary_click().is_some();
        match self.phase {
            Phase::Ready if start_pressed(input) || jump => self.phase = Phase::Playing,
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        self.ducking = input.held(Key::Down);
        if jump && self.grounded() && !self.ducking {
            self.vel_y = JUMP_VELOCITY;
            self.events.push(GameEvent::Blip);
        }
        let jump_held = input.held(Key::Action) || input.held(Key::Up);
        if !jump_held && self.vel_y < JUMP_CUTOFF {
            self.vel_y = JUMP_CUTOFF;
        }
        let gravity = if self.ducking { GRAVITY * FAST_FALL } else { GRAVITY };
        if !self.grounded() || self.vel_y < 0.0 {
            self.vel_y += gravity * dt;
            self.lift += self.vel_y * dt;
            if self.lift >= 0.0 {
                self.lift = 0.0;
                self.vel_y = 0.0;
            }
        }

        let before = self.score();
        let step = self.speed * dt;
        self.distance += step;
        self.speed = (self.speed + ACCEL * dt).min(MAX_SPEED);
        if self.score() / MILESTONE > before / MILESTONE {
            self.events.push(GameEvent::Score);
        }

        for obstacle in &mut self.obstacles {
            let extra = match obstacle.kind {
                ObstacleKind::Bird(_) => 40.0,
                _ => 0.0,
            };
            obstacle.x -= step + extra * dt;
        }
        self.obstacles.retain(|o| o.rect().right() > -10.0);

        self.next_gap -= step;
        if self.next_gap <= 0.0 {
            self.spawn_obstacle();
        }

        let me = self.runner_rect().inflate(-HIT_SLACK);
        if self.obstacles.iter().any(|o| o.rect().inflate(-HIT_SLACK).intersects(&me)) {
            self.crash();
        }
    }

    fn draw(&self, scene: &mut Scene) {
        scene.rect(Rect::new(0.0, GROUND_Y, WIDTH, 2.0), colors::GRAY);
        let offset = (self.distance * 0.5) % 60.0;
        let mut x = -offset;
        while x < WIDTH {
            scene.rect(Rect::new(x, GROUND_Y + 12.0, 14.0, 2.0), colors::DIM);
            x += 60.0;
        }

        for obstacle in &self.obstacles {
            let rect = obstacle.rect();
            match obstacle.kind {
                ObstacleKind::Bird(_) => {
                    let flap = if (self.clock * 8.0).sin() > 0.0 { -12.0 } else { 12.0 };
                    let c = rect.center();
                    scene.rect(Rect::from_center(c, Vec2::new(rect.w, 12.0)), colors::GRAY);
                    scene.triangle(
                        c + Vec2::new(-8.0, 0.0),
                        c + Vec2::new(8.0, 0.0),
                        c + Vec2::new(0.0, flap),
                        colors::GRAY,
                    );
                }
                _ => {
                    let w = rect.w / obstacle.count as f32;
                    for i in 0..obstacle.count {
                        let trunk = Rect::new(rect.x + i as f32 * w + w * 0.3, rect.y, w * 0.4, rect.h);
                        scene.rect(trunk, colors::GREEN);
                        scene.rect(Rect::new(rect.x + i as f32 * w, rect.y + rect.h * 0.3, w, 6.0), colors::GREEN);
                    }
                }
            }
        }

        let me = self.runner_rect();
        scene.rect(me, colors::WHITE);
        scene.rect(Rect::new(me.right() - 12.0, me.y + 6.0, 6.0, 6.0), colors::BACKGROUND);
        if self.grounded() && self.phase == Phase::Playing {
            // Alternate legs
            let stride = if (self.clock * 14.0).sin() > 0.0 { 0.0 } else { 16.0 };
            scene.rect(Rect::new(me.x + 6.0 + stride, me.bottom(), 8.0, 6.0), colors::WHITE);
        }

        scene.digits(self.score(), Vec2::new(WIDTH - 140.0, 16.0), 4.0, colors::WHITE);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn playing() -> Runner {
        let mut game = Runner::new(21);
        game.phase = Phase::Playing;
        // Keep the track clear unless a test adds obstacles
        game.next_gap = f32::MAX;
        game
    }

    fn obstacle(kind: ObstacleKind, x: f32) -> Obstacle {
        Obstacle { kind, x, count: 1 }
    }

    #[test]
    fn jump_arcs_and_lands() {
        let mut game = playing();
        game.tick(&FrameInput::idle().with_pressed(Key::Action), DT);
        assert!(!game.grounded());
        let mut peak = 0.0f32;
        for _ in 0..120 {
            game.tick(&FrameInput::idle().with_held(Key::Action), DT);
            peak = peak.min(game.lift);
        }
        assert!(game.grounded());
        assert!(peak < -STAND_H);
    }

    #[test]
    fn releasing_early_makes_a_short_hop() {
        let mut full = playing();
        let mut short = playing();
        full.tick(&FrameInput::idle().with_pressed(Key::Action), DT);
        short.tick(&FrameInput::idle().with_pressed(Key::Action), DT);
        let (mut full_peak, mut short_peak) = (0.0f32, 0.0f32);
        for _ in 0..60 {
            full.tick(&FrameInput::idle().with_held(Key::Action), DT);
            short.tick(&FrameInput::idle(), DT);
            full_peak = full_peak.min(full.lift);
            short_peak = short_peak.min(short.lift);
        }
        assert!(short_peak > full_peak);
    }

    #[test]
    fn cactus_ends_run() {
        let mut game = playing();
        game.obstacles.push(obstacle(ObstacleKind::SmallCactus, RUNNER_X + 10.0));
        game.tick(&FrameInput::idle(), DT);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn ducking_clears_mid_bird() {
        let mut game = playing();
        game.obstacles.push(obstacle(ObstacleKind::Bird(BirdHeight::Mid), RUNNER_X + 10.0));
        game.tick(&FrameInput::idle().with_held(Key::Down), DT);
        assert_eq!(game.phase(), Phase::Playing);

        let mut standing = playing();
        standing.obstacles.push(obstacle(ObstacleKind::Bird(BirdHeight::Mid), RUNNER_X + 10.0));
        standing.tick(&FrameInput::idle(), DT);
        assert_eq!(standing.phase(), Phase::GameOver);
    }

    #[test]
    fn high_bird_passes_overhead() {
        let mut game = playing();
        game.obstacles.push(obstacle(ObstacleKind::Bird(BirdHeight::High), RUNNER_X + 10.0));
        game.tick(&FrameInput::idle(), DT);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn distance_scores_and_speed_grows() {
        let mut game = playing();
        for _ in 0..120 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert!(game.score() > 0);
        assert!(game.speed() > START_SPEED);
    }

    #[test]
    fn obstacles_keep_coming() {
        let mut game = Runner::new(3);
        game.phase = Phase::Playing;
        game.next_gap = 0.0;
        game.tick(&FrameInput::idle(), DT);
        assert_eq!(game.obstacles.len(), 1);
        assert!(game.next_gap > 0.0);
    }
}
