//! Asteroids: wrap-around ship, splitting rocks, respawn invulnerability

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors, with_alpha};
use crate::sim::{GameRng, circle_circle, wrap_position};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const SHIP_RADIUS: f32 = 12.0;
const TURN_SPEED: f32 = 4.2;
const THRUST: f32 = 280.0;
const DRAG: f32 = 0.45;
const MAX_SPEED: f32 = 420.0;
const BULLET_SPEED: f32 = 520.0;
const BULLET_LIFETIME: f32 = 1.0;
const BULLET_LIMIT: usize = 5;
const FIRE_COOLDOWN: f32 = 0.18;
const RESPAWN_INVULNERABLE: f32 = 2.5;
/// Rocks never spawn this close to the ship
const SAFE_SPAWN_DISTANCE: f32 = 160.0;
pub const START_LIVES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RockSize {
    Large,
    Medium,
    Small,
}

impl RockSize {
    pub fn radius(&self) -> f32 {
        match self {
            RockSize::Large => 40.0,
            RockSize::Medium => 22.0,
            RockSize::Small => 12.0,
        }
    }

    pub fn points(&self) -> u64 {
        match self {
            RockSize::Large => 20,
            RockSize::Medium => 50,
            RockSize::Small => 100,
        }
    }

    fn speed_range(&self) -> (f32, f32) {
        match self {
            RockSize::Large => (30.0, 70.0),
            RockSize::Medium => (60.0, 110.0),
            RockSize::Small => (90.0, 160.0),
        }
    }

    fn smaller(&self) -> Option<RockSize> {
        match self {
            RockSize::Large => Some(RockSize::Medium),
            RockSize::Medium => Some(RockSize::Small),
            RockSize::Small => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rock {
    pub pos: Vec2,
    vel: Vec2,
    pub size: RockSize,
    spin: f32,
    angle: f32,
    /// Radius multipliers for the jagged outline
    outline: Vec<f32>,
}

#[derive(Debug, Clone)]
struct Bullet {
    pos: Vec2,
    vel: Vec2,
    life: f32,
}

#[derive(Debug, Clone)]
struct Ship {
    pos: Vec2,
    vel: Vec2,
    /// Radians, 0 = pointing up
    angle: f32,
    invulnerable: f32,
    thrusting: bool,
}

impl Ship {
    fn spawn() -> Self {
        Self {
            pos: Vec2::new(WIDTH, HEIGHT) / 2.0,
            vel: Vec2::ZERO,
            angle: 0.0,
            invulnerable: RESPAWN_INVULNERABLE,
            thrusting: false,
        }
    }

    fn facing(&self) -> Vec2 {
        Vec2::new(self.angle.sin(), -self.angle.cos())
    }

    fn nose(&self) -> Vec2 {
        self.pos + self.facing() * SHIP_RADIUS * 1.4
    }
}

pub struct Asteroids {
    phase: Phase,
    rng: GameRng,
    ship: Ship,
    rocks: Vec<Rock>,
    bullets: Vec<Bullet>,
    fire_cooldown: f32,
    lives: u32,
    wave: u32,
    score: u64,
    events: Vec<GameEvent>,
}

impl Asteroids {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            ship: Ship::spawn(),
            rocks: Vec::new(),
            bullets: Vec::new(),
            fire_cooldown: 0.0,
            lives: START_LIVES,
            wave: 0,
            score: 0,
            events: Vec::new(),
        };
        game.next_wave();
        game
    }

    pub fn rocks(&self) -> &[Rock] {
        &self.rocks
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    fn make_rock(&mut self, pos: Vec2, size: RockSize) -> Rock {
        let (lo, hi) = size.speed_range();
        let heading = self.rng.range_f32(0.0, std::f32::consts::TAU);
        let speed = self.rng.range_f32(lo, hi);
        let points = self.rng.range_i32(8, 12) as usize;
        let outline = (0..points).map(|_| self.rng.range_f32(0.75, 1.15)).collect();
        Rock {
            pos,
            vel: Vec2::from_angle(heading) * speed,
            size,
            spin: self.rng.range_f32(-1.5, 1.5),
            angle: 0.0,
            outline,
        }
    }

    fn next_wave(&mut self) {
        self.wave += 1;
        let count = 3 + self.wave as usize;
        for _ in 0..count {
            let mut pos;
            loop {
                pos = Vec2::new(self.rng.range_f32(0.0, WIDTH), self.rng.range_f32(0.0, HEIGHT));
                if pos.distance(self.ship.pos) > SAFE_SPAWN_DISTANCE {
                    break;
                }
            }
            let rock = self.make_rock(pos, RockSize::Large);
            self.rocks.push(rock);
        }
        if self.wave > 1 {
            self.events.push(GameEvent::LevelUp);
        }
    }

    fn steer(&mut self, input: &FrameInput, dt: f32) {
        let ship = &mut self.ship;
        ship.angle += input.axis_x() * TURN_SPEED * dt;
        ship.thrusting = input.held(Key::Up);
        if ship.thrusting {
            ship.vel += ship.facing() * THRUST * dt;
        }
        ship.vel *= 1.0 - DRAG * dt;
        ship.vel = ship.vel.clamp_length_max(MAX_SPEED);
        ship.pos = wrap_position(ship.pos + ship.vel * dt, Vec2::new(WIDTH, HEIGHT));
        ship.invulnerable = (ship.invulnerable - dt).max(0.0);

        self.fire_cooldown -= dt;
        // Holding fire auto-repeats at the cooldown rate
        let fire = input.held(Key::Action) && self.fire_cooldown <= 0.0;
        if fire && self.bullets.len() < BULLET_LIMIT {
            let dir = self.ship.facing();
            self.bullets.push(Bullet {
                pos: self.ship.nose(),
                vel: dir * BULLET_SPEED + self.ship.vel,
                life: BULLET_LIFETIME,
            });
            self.fire_cooldown = FIRE_COOLDOWN;
            self.events.push(GameEvent::Blip);
        }
    }

    fn shoot_rocks(&mut self) {
        let mut split = Vec::new();
        for bullet in &mut self.bullets {
            if let Some(rock) = self
                .rocks
                .iter_mut()
                .find(|r| !r.outline.is_empty() && circle_circle(bullet.pos, 2.0, r.pos, r.size.radius()))
            {
                bullet.life = 0.0;
                self.score += rock.size.points();
                split.push((rock.pos, rock.size));
                // Emptied outline marks the rock for removal
                rock.outline.clear();
            }
        }
        if split.is_empty() {
            return;
        }
        self.rocks.retain(|r| !r.outline.is_empty());
        self.bullets.retain(|b| b.life > 0.0);
        for (pos, size) in split {
            if let Some(smaller) = size.smaller() {
                for _ in 0..2 {
                    let rock = self.make_rock(pos, smaller);
                    self.rocks.push(rock);
                }
            }
            self.events.push(GameEvent::Explosion);
        }
    }

    fn check_ship(&mut self) {
        if self.ship.invulnerable > 0.0 {
            return;
        }
        let hit = self
            .rocks
            .iter()
            .any(|r| circle_circle(self.ship.pos, SHIP_RADIUS, r.pos, r.size.radius() * 0.9));
        if !hit {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        } else {
            self.ship = Ship::spawn();
            self.events.push(GameEvent::LifeLost);
        }
    }
}

impl ArcadeGame for Asteroids {
    fn id(&self) -> GameId {
        GameId::Asteroids
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
            HudItem::new("Wave", self.wave),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        match self.phase {
            Phase::Ready if start_pressed(input) => self.phase = Phase::Playing,
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        let size = Vec2::new(WIDTH, HEIGHT);
        self.steer(input, dt);
        for rock in &mut self.rocks {
            rock.pos = wrap_position(rock.pos + rock.vel * dt, size);
            rock.angle += rock.spin * dt;
        }
        self.bullets.retain_mut(|b| {
            b.pos = wrap_position(b.pos + b.vel * dt, size);
            b.life -= dt;
            b.life > 0.0
        });

        self.shoot_rocks();
        self.check_ship();

        if self.phase == Phase::Playing && self.rocks.is_empty() {
            self.next_wave();
        }
    }

    fn draw(&self, scene: &mut Scene) {
        for rock in &self.rocks {
            let n = rock.outline.len();
            let points: Vec<Vec2> = rock
                .outline
                .iter()
                .enumerate()
                .map(|(i, k)| {
                    let a = rock.angle + i as f32 / n as f32 * std::f32::consts::TAU;
                    rock.pos + Vec2::from_angle(a) * rock.size.radius() * k
                })
                .collect();
            scene.polygon_outline(&points, 2.0, colors::GRAY);
        }

        for bullet in &self.bullets {
            scene.circle(bullet.pos, 2.0, colors::WHITE);
        }

        let ship = &self.ship;
        let blink = ship.invulnerable > 0.0 && (ship.invulnerable * 8.0) as i32 % 2 == 1;
        if !blink && self.phase != Phase::GameOver {
            let forward = ship.facing();
            let side = Vec2::new(-forward.y, forward.x);
            let nose = ship.nose();
            let left = ship.pos - forward * SHIP_RADIUS + side * SHIP_RADIUS * 0.8;
            let right = ship.pos - forward * SHIP_RADIUS - side * SHIP_RADIUS * 0.8;
            scene.polygon_outline(&[nose, left, right], 2.0, colors::WHITE);
            if ship.thrusting && scene.effects_enabled() {
                let tail = ship.pos - forward * SHIP_RADIUS * 1.8;
                scene.triangle(
                    left.lerp(ship.pos, 0.3),
                    right.lerp(ship.pos, 0.3),
                    tail,
                    with_alpha(colors::ORANGE, 0.8),
                );
            }
        }

        scene.digits(self.score, Vec2::new(20.0, 14.0), 4.0, colors::WHITE);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn playing() -> Asteroids {
        let mut game = Asteroids::new(21);
        game.phase = Phase::Playing;
        game
    }

    #[test]
    fn first_wave_spawns_clear_of_ship() {
        let game = Asteroids::new(5);
        assert_eq!(game.rocks().len(), 4);
        for rock in game.rocks() {
            assert!(rock.pos.distance(game.ship.pos) > SAFE_SPAWN_DISTANCE);
        }
    }

    #[test]
    fn large_rock_splits_into_two_mediums() {
        let mut game = playing();
        game.rocks.truncate(1);
        let pos = game.rocks[0].pos;
        game.bullets.push(Bullet {
            pos,
            vel: Vec2::ZERO,
            life: 1.0,
        });
        game.shoot_rocks();
        assert_eq!(game.score(), 20);
        assert_eq!(game.rocks().len(), 2);
        assert!(game.rocks().iter().all(|r| r.size == RockSize::Medium));
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn small_rock_vanishes() {
        let mut game = playing();
        game.rocks.truncate(1);
        game.rocks[0].size = RockSize::Small;
        let pos = game.rocks[0].pos;
        game.bullets.push(Bullet {
            pos,
            vel: Vec2::ZERO,
            life: 1.0,
        });
        game.shoot_rocks();
        assert!(game.rocks().is_empty());
        assert_eq!(game.score(), 100);
    }

    #[test]
    fn ship_wraps_around() {
        let mut game = playing();
        game.rocks.clear();
        game.ship.pos = Vec2::new(WIDTH - 1.0, 300.0);
        game.ship.vel = Vec2::new(200.0, 0.0);
        game.steer(&FrameInput::idle(), SIM_DT);
        assert!(game.ship.pos.x < 10.0);
    }

    #[test]
    fn bullets_expire() {
        let mut game = playing();
        game.rocks.clear();
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        assert_eq!(game.bullets.len(), 1);
        for _ in 0..70 {
            game.tick(&FrameInput::idle(), SIM_DT);
        }
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn invulnerable_ship_survives_collision() {
        let mut game = playing();
        game.rocks[0].pos = game.ship.pos;
        game.check_ship();
        assert_eq!(game.lives(), START_LIVES);
        game.ship.invulnerable = 0.0;
        game.check_ship();
        assert_eq!(game.lives(), START_LIVES - 1);
        assert!(game.ship.invulnerable > 0.0);
    }

    #[test]
    fn cleared_field_brings_bigger_wave() {
        let mut game = playing();
        game.rocks.clear();
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.wave(), 2);
        assert_eq!(game.rocks().len(), 5);
    }
}
