//! Flappy: gravity bird threading scrolling pipe gaps

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors};
use crate::sim::{GameRng, Rect, circle_rect};

const WIDTH: f32 = 480.0;
const HEIGHT: f32 = 640.0;
const GROUND_H: f32 = 80.0;
const BIRD_X: f32 = 120.0;
const BIRD_RADIUS: f32 = 14.0;
const GRAVITY: f32 = 1500.0;
const FLAP_VELOCITY: f32 = -430.0;
const MAX_FALL: f32 = 620.0;
const PIPE_W: f32 = 70.0;
const PIPE_GAP: f32 = 160.0;
const PIPE_SPACING: f32 = 230.0;
const SCROLL_SPEED: f32 = 170.0;
/// Gap centres stay this far from the ceiling and ground
const GAP_MARGIN: f32 = 110.0;

#[derive(Debug, Clone)]
struct Pipe {
    x: f32,
    gap_center: f32,
    passed: bool,
}

impl Pipe {
    fn rects(&self) -> [Rect; 2] {
        let top = self.gap_center - PIPE_GAP / 2.0;
        let bottom = self.gap_center + PIPE_GAP / 2.0;
        [
            Rect::new(self.x, 0.0, PIPE_W, top),
            Rect::new(self.x, bottom, PIPE_W, HEIGHT - GROUND_H - bottom),
        ]
    }
}

pub struct Flappy {
    phase: Phase,
    rng: GameRng,
    bird_y: f32,
    bird_vel: f32,
    pipes: Vec<Pipe>,
    /// Seconds alive, drives the idle bob and ground scroll
    clock: f32,
    score: u64,
    events: Vec<GameEvent>,
}

impl Flappy {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            bird_y: (HEIGHT - GROUND_H) / 2.0,
            bird_vel: 0.0,
            pipes: Vec::new(),
            clock: 0.0,
            score: 0,
            events: Vec::new(),
        }
    }

    fn bird(&self) -> Vec2 {
        Vec2::new(BIRD_X, self.bird_y)
    }

    fn spawn_pipe(&mut self, x: f32) {
        let gap_center = self
            .rng
            .range_f32(GAP_MARGIN, HEIGHT - GROUND_H - GAP_MARGIN);
        self.pipes.push(Pipe {
            x,
            gap_center,
            passed: false,
        });
    }

    fn flap(&mut self) {
        self.bird_vel = FLAP_VELOCITY;
        self.events.push(GameEvent::Blip);
    }

    fn crash(&mut self) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::Hit);
        self.events.push(GameEvent::GameOver);
    }
}

impl ArcadeGame for Flappy {
    fn id(&self) -> GameId {
        GameId::Flappy
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

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Space or click to flap".to_string()),
            Phase::GameOver => Some(format!("{} pipes. R to retry, Q for menu", self.score)),
            _ => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        self.clock += dt;
        let flap = start_pressed(input) || input.pressed(Key::Up);
        match self.phase {
            Phase::Ready => {
                if !flap {
                    self.bird_y = (HEIGHT - GROUND_H) / 2.0 + (self.clock * 4.0).sin() * 6.0;
                    return;
                }
                self.phase = Phase::Playing;
                self.spawn_pipe(WIDTH + 40.0);
            }
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        if flap {
            self.flap();
        }
        self.bird_vel = (self.bird_vel + GRAVITY * dt).min(MAX_FALL);
        self.bird_y += self.bird_vel * dt;

        for pipe in &mut self.pipes {
            pipe.x -= SCROLL_SPEED * dt;
        }
        self.pipes.retain(|p| p.x + PIPE_W > -10.0);
        if let Some(last_x) = self.pipes.last().map(|p| p.x) {
            if last_x < WIDTH + 40.0 - PIPE_SPACING {
                self.spawn_pipe(last_x + PIPE_SPACING);
            }
        } else {
            self.spawn_pipe(WIDTH + 40.0);
        }

        for pipe in self.pipes.iter_mut().filter(|p| !p.passed) {
            if pipe.x + PIPE_W < BIRD_X - BIRD_RADIUS {
                pipe.passed = true;
                self.score += 1;
                self.events.push(GameEvent::Score);
            }
        }

        let bird = self.bird();
        let hit_pipe = self
            .pipes
            .iter()
            .flat_map(|p| p.rects())
            .any(|r| circle_rect(bird, BIRD_RADIUS, &r).hit);
        let hit_bounds = bird.y - BIRD_RADIUS < 0.0 || bird.y + BIRD_RADIUS > HEIGHT - GROUND_H;
        if hit_pipe || hit_bounds {
            self.crash();
        }
    }

    fn draw(&self, scene: &mut Scene) {
        scene.set_background(colors::NAVY);
        for pipe in &self.pipes {
            for rect in pipe.rects() {
                scene.rect(rect, colors::GREEN);
                scene.rect_outline(rect, 3.0, colors::LIME);
            }
        }

        let ground = Rect::new(0.0, HEIGHT - GROUND_H, WIDTH, GROUND_H);
        scene.rect(ground, colors::BROWN);
        // Scrolling stripes sell the motion
        let offset = if self.phase == Phase::GameOver {
            0.0
        } else {
            (self.clock * SCROLL_SPEED) % 40.0
        };
        let mut x = -offset;
        while x < WIDTH {
            scene.rect(Rect::new(x, ground.y, 20.0, 8.0), colors::LIME);
            x += 40.0;
        }

        let bird = self.bird();
        scene.circle(bird, BIRD_RADIUS, colors::YELLOW);
        scene.circle(bird + Vec2::new(5.0, -4.0), 3.0, colors::BACKGROUND);
        scene.triangle(
            bird + Vec2::new(BIRD_RADIUS - 2.0, -3.0),
            bird + Vec2::new(BIRD_RADIUS + 8.0, 1.0),
            bird + Vec2::new(BIRD_RADIUS - 2.0, 5.0),
            colors::ORANGE,
        );

        scene.digits_centered(self.score, Vec2::new(WIDTH / 2.0, 50.0), 8.0, colors::WHITE);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn ready_bird_hovers() {
        let mut game = Flappy::new(1);
        for _ in 0..120 {
            game.tick(&FrameInput::idle(), SIM_DT);
        }
        assert_eq!(game.phase(), Phase::Ready);
        assert!((game.bird_y - (HEIGHT - GROUND_H) / 2.0).abs() <= 6.0);
    }

    #[test]
    fn falling_hits_ground() {
        let mut game = Flappy::new(2);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        for _ in 0..180 {
            game.tick(&FrameInput::idle(), SIM_DT);
        }
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn flap_goes_up() {
        let mut game = Flappy::new(3);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        assert!(game.bird_vel < 0.0);
    }

    #[test]
    fn passing_a_pipe_scores() {
        let mut game = Flappy::new(4);
        game.phase = Phase::Playing;
        game.pipes.push(Pipe {
            x: BIRD_X - BIRD_RADIUS - PIPE_W + 1.0,
            gap_center: game.bird_y,
            passed: false,
        });
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.score(), 1);
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn pipe_collision_ends_run() {
        let mut game = Flappy::new(5);
        game.phase = Phase::Playing;
        game.pipes.push(Pipe {
            x: BIRD_X - 10.0,
            gap_center: game.bird_y + 200.0,
            passed: false,
        });
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.phase(), Phase::GameOver);
    }
}
