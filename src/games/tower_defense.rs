//! Tower defense: creeps walk a fixed path, towers placed on free tiles
//!
//! Enemies follow waypoints in pixel space; towers pick the enemy furthest
//! along the path inside their range and fire homing projectiles.

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Color, Scene, colors, with_alpha};
use crate::sim::{Cell, GameRng, Grid, Rect, point_in_circle};

pub const COLS: i32 = 16;
pub const ROWS: i32 = 12;
const TILE: f32 = 50.0;
/// Tile corners of the enemy route; first and last lie just off the map
const WAYPOINTS: [Cell; 8] = [
    (-1, 2),
    (4, 2),
    (4, 8),
    (9, 8),
    (9, 3),
    (13, 3),
    (13, 9),
    (16, 9),
];
pub const START_GOLD: u32 = 150;
pub const START_LIVES: u32 = 20;
pub const FINAL_WAVE: u32 = 20;
const SPAWN_INTERVAL: f32 = 0.8;
const ENEMY_RADIUS: f32 = 12.0;
const PROJECTILE_SPEED: f32 = 420.0;
const KILL_POINTS: u64 = 10;
const WAVE_POINTS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TowerKind {
    Gun,
    Cannon,
    Frost,
}

impl TowerKind {
    pub const ALL: [TowerKind; 3] = [TowerKind::Gun, TowerKind::Cannon, TowerKind::Frost];

    pub fn cost(&self) -> u32 {
        match self {
            TowerKind::Gun => 50,
            TowerKind::Cannon => 100,
            TowerKind::Frost => 75,
        }
    }

    pub fn range(&self) -> f32 {
        match self {
            TowerKind::Gun => 120.0,
            TowerKind::Cannon => 140.0,
            TowerKind::Frost => 100.0,
        }
    }

    /// Seconds between shots
    fn cooldown(&self) -> f32 {
        match self {
            TowerKind::Gun => 0.4,
            TowerKind::Cannon => 1.2,
            TowerKind::Frost => 0.8,
        }
    }

    fn damage(&self) -> f32 {
        match self {
            TowerKind::Gun => 10.0,
            TowerKind::Cannon => 30.0,
            TowerKind::Frost => 4.0,
        }
    }

    fn splash(&self) -> f32 {
        match self {
            TowerKind::Cannon => 50.0,
            _ => 0.0,
        }
    }

    fn color(&self) -> Color {
        match self {
            TowerKind::Gun => colors::YELLOW,
            TowerKind::Cannon => colors::ORANGE,
            TowerKind::Frost => colors::TEAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ground {
    Grass,
    Path,
    Tower,
}

#[derive(Debug, Clone)]
pub struct Tower {
    pub kind: TowerKind,
    pub cell: Cell,
    cooldown: f32,
}

impl Tower {
    fn center(&self) -> Vec2 {
        tile_center(self.cell)
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    id: u32,
    pub pos: Vec2,
    /// Index of the waypoint being walked toward
    next: usize,
    /// Pixels walked since spawning
    travelled: f32,
    hp: f32,
    max_hp: f32,
    speed: f32,
    slow_timer: f32,
    bounty: u32,
}

#[derive(Debug, Clone)]
struct Projectile {
    pos: Vec2,
    target: u32,
    /// Last seen target position; the shell bursts here if the target dies
    aim: Vec2,
    kind: TowerKind,
}

pub struct TowerDefense {
    phase: Phase,
    rng: GameRng,
    ground: Grid<Ground>,
    route: Vec<Vec2>,
    towers: Vec<Tower>,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    selected: TowerKind,
    hover: Option<Cell>,
    gold: u32,
    lives: u32,
    wave: u32,
    wave_active: bool,
    to_spawn: u32,
    spawn_timer: f32,
    next_enemy_id: u32,
    score: u64,
    events: Vec<GameEvent>,
}

fn tile_center((x, y): Cell) -> Vec2 {
    Vec2::new((x as f32 + 0.5) * TILE, (y as f32 + 0.5) * TILE)
}

impl TowerDefense {
    pub fn new(seed: u64) -> Self {
        let mut ground = Grid::new(COLS, ROWS, Ground::Grass);
        for pair in WAYPOINTS.windows(2) {
            let (mut x, mut y) = pair[0];
            let (tx, ty) = pair[1];
            loop {
                ground.set((x, y), Ground::Path);
                if (x, y) == (tx, ty) {
                    break;
                }
                x += (tx - x).signum();
                y += (ty - y).signum();
            }
        }
        Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            ground,
            route: WAYPOINTS.iter().map(|&c| tile_center(c)).collect(),
            towers: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            selected: TowerKind::Gun,
            hover: None,
            gold: START_GOLD,
            lives: START_LIVES,
            wave: 0,
            wave_active: false,
            to_spawn: 0,
            spawn_timer: 0.0,
            next_enemy_id: 0,
            score: 0,
            events: Vec::new(),
        }
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        let cell = ((pos.x / TILE).floor() as i32, (pos.y / TILE).floor() as i32);
        self.ground.in_bounds(cell).then_some(cell)
    }

    /// Build a tower if the tile is free grass and we can afford it
    pub fn place(&mut self, kind: TowerKind, cell: Cell) -> bool {
        if self.ground.get(cell) != Some(&Ground::Grass) || self.gold < kind.cost() {
            return false;
        }
        self.gold -= kind.cost();
        self.ground.set(cell, Ground::Tower);
        self.towers.push(Tower {
            kind,
            cell,
            cooldown: 0.0,
        });
        self.events.push(GameEvent::Blip);
        true
    }

    /// Remove a tower for half its cost
    pub fn sell(&mut self, cell: Cell) -> bool {
        let Some(index) = self.towers.iter().position(|t| t.cell == cell) else {
            return false;
        };
        let tower = self.towers.swap_remove(index);
        self.gold += tower.kind.cost() / 2;
        self.ground.set(cell, Ground::Grass);
        self.events.push(GameEvent::PowerUp);
        true
    }

    pub fn start_wave(&mut self) -> bool {
        if self.wave_active || self.wave >= FINAL_WAVE {
            return false;
        }
        self.wave += 1;
        self.wave_active = true;
        self.to_spawn = 6 + self.wave * 2;
        self.spawn_timer = 0.0;
        self.events.push(GameEvent::LevelUp);
        true
    }

    fn spawn_enemy(&mut self) {
        let wave = self.wave as f32;
        // Every third wave swaps numbers for speed
        let fast = self.wave % 3 == 0 && self.rng.chance(0.5);
        let hp = 30.0 * 1.18f32.powf(wave - 1.0) * if fast { 0.6 } else { 1.0 };
        let speed = (55.0 + wave * 3.0) * if fast { 1.6 } else { 1.0 };
        self.enemies.push(Enemy {
            id: self.next_enemy_id,
            pos: self.route[0],
            next: 1,
            travelled: 0.0,
            hp,
            max_hp: hp,
            speed,
            slow_timer: 0.0,
            bounty: 5 + self.wave / 2,
        });
        self.next_enemy_id += 1;
    }

    fn move_enemies(&mut self, dt: f32) {
        let mut leaked = 0;
        for enemy in &mut self.enemies {
            let factor = if enemy.slow_timer > 0.0 { 0.5 } else { 1.0 };
            enemy.slow_timer = (enemy.slow_timer - dt).max(0.0);
            let mut budget = enemy.speed * factor * dt;
            while budget > 0.0 && enemy.next < self.route.len() {
                let target = self.route[enemy.next];
                let to_target = target - enemy.pos;
                let dist = to_target.length();
                if dist <= budget {
                    enemy.pos = target;
                    enemy.travelled += dist;
                    budget -= dist;
                    enemy.next += 1;
                } else {
                    enemy.pos += to_target / dist * budget;
                    enemy.travelled += budget;
                    budget = 0.0;
                }
            }
            if enemy.next >= self.route.len() {
                leaked += 1;
                enemy.hp = 0.0;
            }
        }
        if leaked > 0 {
            self.enemies.retain(|e| e.next < self.route.len());
            self.lives = self.lives.saturating_sub(leaked);
            self.events.push(GameEvent::LifeLost);
        }
    }

    fn fire_towers(&mut self, dt: f32) {
        for tower in &mut self.towers {
            tower.cooldown -= dt;
            if tower.cooldown > 0.0 {
                continue;
            }
            let center = tower.center();
            let target = self
                .enemies
                .iter()
                .filter(|e| e.hp > 0.0 && point_in_circle(e.pos, center, tower.kind.range()))
                .max_by(|a, b| a.travelled.total_cmp(&b.travelled));
            if let Some(enemy) = target {
                self.projectiles.push(Projectile {
                    pos: center,
                    target: enemy.id,
                    aim: enemy.pos,
                    kind: tower.kind,
                });
                tower.cooldown = tower.kind.cooldown();
            }
        }
    }

    fn move_projectiles(&mut self, dt: f32) {
        let mut impacts = Vec::new();
        for shot in &mut self.projectiles {
            if let Some(enemy) = self.enemies.iter().find(|e| e.id == shot.target) {
                shot.aim = enemy.pos;
            }
            let step = PROJECTILE_SPEED * dt;
            let to_aim = shot.aim - shot.pos;
            if to_aim.length() <= step + ENEMY_RADIUS {
                impacts.push((shot.target, shot.aim, shot.kind));
                // Mark spent
                shot.target = u32::MAX;
            } else {
                shot.pos += to_aim.normalize_or_zero() * step;
            }
        }
        self.projectiles.retain(|p| p.target != u32::MAX);

        for (target, at, kind) in impacts {
            self.apply_hit(target, at, kind);
        }

        // Remove the dead and pay out
        let before = self.enemies.len();
        let bounty: u32 = self.enemies.iter().filter(|e| e.hp <= 0.0).map(|e| e.bounty).sum();
        self.enemies.retain(|e| e.hp > 0.0);
        let kills = (before - self.enemies.len()) as u64;
        if kills > 0 {
            self.gold += bounty;
            self.score += kills * KILL_POINTS * self.wave as u64;
            self.events.push(GameEvent::Explosion);
        }
    }

    fn apply_hit(&mut self, target: u32, at: Vec2, kind: TowerKind) {
        let splash = kind.splash();
        for enemy in &mut self.enemies {
            let direct = enemy.id == target;
            let splashed = splash > 0.0 && point_in_circle(enemy.pos, at, splash);
            if !direct && !splashed {
                continue;
            }
            enemy.hp -= kind.damage();
            if kind == TowerKind::Frost {
                enemy.slow_timer = 1.5;
            }
        }
        self.events.push(GameEvent::Hit);
    }

    fn finish_wave_if_clear(&mut self) {
        if !self.wave_active || self.to_spawn > 0 || !self.enemies.is_empty() {
            return;
        }
        self.wave_active = false;
        self.projectiles.clear();
        self.score += WAVE_POINTS * self.wave as u64;
        self.gold += 20 + self.wave * 5;
        if self.wave >= FINAL_WAVE {
            self.phase = Phase::Won;
            self.events.push(GameEvent::Won);
        } else {
            self.events.push(GameEvent::Score);
        }
    }

    fn handle_input(&mut self, input: &FrameInput) {
        for key in input.pressed_keys() {
            if let Key::Digit(n @ 1..=3) = key {
                self.selected = TowerKind::ALL[(*n - 1) as usize];
            }
        }
        self.hover = input.pointer.and_then(|p| self.cell_at(p));
        if let Some(cell) = input.primary_click().and_then(|p| self.cell_at(p)) {
            self.place(self.selected, cell);
        }
        if let Some(cell) = input.secondary_click().and_then(|p| self.cell_at(p)) {
            self.sell(cell);
        }
        if input.pressed(Key::Action) {
            self.start_wave();
        }
    }
}

impl ArcadeGame for TowerDefense {
    fn id(&self) -> GameId {
        GameId::TowerDefense
    }

    fn size(&self) -> Vec2 {
        Vec2::new(COLS as f32 * TILE, ROWS as f32 * TILE)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Wave", format!("{}/{}", self.wave, FINAL_WAVE)),
            HudItem::new("Gold", self.gold),
            HudItem::new("Lives", self.lives),
            HudItem::new("Tower", format!("{:?} ({}g)", self.selected, self.selected.cost())),
        ]
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Place towers, Space to send the first wave".to_string()),
            Phase::Playing if !self.wave_active => Some(format!("Space for wave {}", self.wave + 1)),
            Phase::Playing => None,
            Phase::Won => Some("All waves held! R to play again".to_string()),
            Phase::GameOver => Some("The creeps got through. R to retry".to_string()),
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        match self.phase {
            Phase::Ready => {
                if !start_pressed(input) {
                    self.handle_input(input);
                    return;
                }
                self.phase = Phase::Playing;
            }
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        self.handle_input(input);

        if self.wave_active && self.to_spawn > 0 {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 {
                self.spawn_enemy();
                self.to_spawn -= 1;
                self.spawn_timer = SPAWN_INTERVAL;
            }
        }

        self.move_enemies(dt);
        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }
        self.fire_towers(dt);
        self.move_projectiles(dt);
        self.finish_wave_if_clear();
    }

    fn draw(&self, scene: &mut Scene) {
        for (cell, ground) in self.ground.iter() {
            let rect = Rect::new(cell.0 as f32 * TILE, cell.1 as f32 * TILE, TILE, TILE);
            let color = match ground {
                Ground::Path => colors::BROWN,
                _ => with_alpha(colors::GREEN, 0.25),
            };
            scene.rect(rect.inflate(-1.0), color);
        }

        if let Some(cell) = self.hover {
            let ok = self.ground.get(cell) == Some(&Ground::Grass) && self.gold >= self.selected.cost();
            let color = if ok { colors::WHITE } else { colors::RED };
            let center = tile_center(cell);
            scene.rect_outline(Rect::from_center(center, Vec2::splat(TILE)), 2.0, color);
            if ok {
                scene.ring(center, self.selected.range() - 1.5, self.selected.range(), with_alpha(color, 0.4));
            }
        }

        for tower in &self.towers {
            let c = tower.center();
            scene.rect(Rect::from_center(c, Vec2::splat(TILE * 0.7)), colors::GRAY);
            scene.circle(c, TILE * 0.25, tower.kind.color());
        }

        for enemy in &self.enemies {
            let color = if enemy.slow_timer > 0.0 { colors::TEAL } else { colors::RED };
            scene.circle(enemy.pos, ENEMY_RADIUS, color);
            let frac = (enemy.hp / enemy.max_hp).clamp(0.0, 1.0);
            let bar = Rect::new(enemy.pos.x - 14.0, enemy.pos.y - 20.0, 28.0, 4.0);
            scene.rect(bar, colors::PANEL);
            scene.rect(Rect::new(bar.x, bar.y, bar.w * frac, bar.h), colors::LIME);
        }

        for shot in &self.projectiles {
            let radius = if shot.kind == TowerKind::Cannon { 6.0 } else { 3.0 };
            scene.circle(shot.pos, radius, shot.kind.color());
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
