//! Space Invaders: marching formation, erodible bunkers, mystery ship

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Color, Scene, colors};
use crate::sim::{GameRng, Grid, Rect};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
pub const FORMATION_COLS: usize = 11;
pub const FORMATION_ROWS: usize = 5;
const INVADER_SIZE: Vec2 = Vec2::new(32.0, 22.0);
const SPACING: Vec2 = Vec2::new(48.0, 40.0);
const FORMATION_TOP: f32 = 80.0;
const WAVE_DROP: f32 = 20.0;
const MARCH_STEP: f32 = 10.0;
const DROP_STEP: f32 = 20.0;
const SLOWEST_MARCH: f32 = 0.6;
const FASTEST_MARCH: f32 = 0.04;
const EDGE_MARGIN: f32 = 16.0;
const PLAYER_Y: f32 = 550.0;
const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 18.0);
const PLAYER_SPEED: f32 = 300.0;
const SHOT_SPEED: f32 = 620.0;
const BOMB_SPEED: f32 = 240.0;
/// Invaders reaching this line have landed
const INVASION_Y: f32 = PLAYER_Y - 20.0;
const BUNKER_Y: f32 = 460.0;
const BUNKER_BLOCK: f32 = 6.0;
const BUNKER_COLS: i32 = 12;
const BUNKER_ROWS: i32 = 8;
const MYSTERY_Y: f32 = 50.0;
const MYSTERY_SPEED: f32 = 130.0;
const MYSTERY_POINTS: [u64; 4] = [50, 100, 150, 300];
const RESPAWN_GRACE: f32 = 1.5;
pub const START_LIVES: u32 = 3;

#[derive(Debug, Clone)]
struct Invader {
    pos: Vec2,
    row: usize,
    col: usize,
    alive: bool,
}

impl Invader {
    fn rect(&self) -> Rect {
        Rect::from_center(self.pos, INVADER_SIZE)
    }

    fn points(&self) -> u64 {
        match self.row {
            0 => 30,
            1 | 2 => 20,
            _ => 10,
        }
    }

    fn color(&self) -> Color {
        match self.row {
            0 => colors::PINK,
            1 | 2 => colors::TEAL,
            _ => colors::LIME,
        }
    }
}

#[derive(Debug, Clone)]
struct Bunker {
    origin: Vec2,
    blocks: Grid<bool>,
}

impl Bunker {
    fn new(origin: Vec2) -> Self {
        let mut blocks = Grid::new(BUNKER_COLS, BUNKER_ROWS, true);
        // Arch cut out of the bottom middle
        for y in BUNKER_ROWS - 3..BUNKER_ROWS {
            for x in 4..BUNKER_COLS - 4 {
                blocks.set((x, y), false);
            }
        }
        blocks.set((0, 0), false);
        blocks.set((BUNKER_COLS - 1, 0), false);
        Self { origin, blocks }
    }

    fn block_rect(&self, (x, y): (i32, i32)) -> Rect {
        Rect::new(
            self.origin.x + x as f32 * BUNKER_BLOCK,
            self.origin.y + y as f32 * BUNKER_BLOCK,
            BUNKER_BLOCK,
            BUNKER_BLOCK,
        )
    }

    /// Knock out the block under `area`, returning whether anything was hit
    fn erode(&mut self, area: &Rect, rng: &mut GameRng) -> bool {
        let hit = self
            .blocks
            .iter()
            .filter(|(_, solid)| **solid)
            .map(|(cell, _)| cell)
            .find(|&cell| self.block_rect(cell).intersects(area));
        let Some(cell) = hit else {
            return false;
        };
        self.blocks.set(cell, false);
        // Chip a random neighbour for a ragged crater
        let neighbours: Vec<_> = self.blocks.neighbors8(cell).collect();
        if let Some(&n) = rng.pick(&neighbours) {
            self.blocks.set(n, false);
        }
        true
    }

    fn solid_blocks(&self) -> usize {
        self.blocks.values().filter(|b| **b).count()
    }
}

#[derive(Debug, Clone)]
struct Mystery {
    pos: Vec2,
    dir: f32,
}

pub struct Invaders {
    phase: Phase,
    rng: GameRng,
    invaders: Vec<Invader>,
    march_dir: f32,
    march_timer: f32,
    player_x: f32,
    shot: Option<Vec2>,
    bombs: Vec<Vec2>,
    bomb_timer: f32,
    bunkers: Vec<Bunker>,
    mystery: Option<Mystery>,
    mystery_timer: f32,
    grace: f32,
    lives: u32,
    wave: u32,
    score: u64,
    events: Vec<GameEvent>,
}

fn formation(wave: u32) -> Vec<Invader> {
    let top = FORMATION_TOP + (wave.saturating_sub(1) as f32 * WAVE_DROP).min(120.0);
    let width = (FORMATION_COLS - 1) as f32 * SPACING.x;
    let left = (WIDTH - width) / 2.0;
    (0..FORMATION_ROWS)
        .flat_map(|row| {
            (0..FORMATION_COLS).map(move |col| Invader {
                pos: Vec2::new(left + col as f32 * SPACING.x, top + row as f32 * SPACING.y),
                row,
                col,
                alive: true,
            })
        })
        .collect()
}

impl Invaders {
    pub fn new(seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let bomb_timer = rng.range_f32(0.5, 1.5);
        let mystery_timer = rng.range_f32(15.0, 25.0);
        let bunkers = (0..4)
            .map(|i| {
                let center_x = WIDTH * (i as f32 + 0.5) / 4.0;
                Bunker::new(Vec2::new(center_x - BUNKER_COLS as f32 * BUNKER_BLOCK / 2.0, BUNKER_Y))
            })
            .collect();
        Self {
            phase: Phase::Ready,
            rng,
            invaders: formation(1),
            march_dir: 1.0,
            march_timer: SLOWEST_MARCH,
            player_x: WIDTH / 2.0,
            shot: None,
            bombs: Vec::new(),
            bomb_timer,
            bunkers,
            mystery: None,
            mystery_timer,
            grace: 0.0,
            lives: START_LIVES,
            wave: 1,
            score: 0,
            events: Vec::new(),
        }
    }

    pub fn alive(&self) -> usize {
        self.invaders.iter().filter(|i| i.alive).count()
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    fn player_rect(&self) -> Rect {
        Rect::from_center(Vec2::new(self.player_x, PLAYER_Y), PLAYER_SIZE)
    }

    /// Formation thins out, march speeds up
    fn march_interval(&self) -> f32 {
        let total = (FORMATION_COLS * FORMATION_ROWS) as f32;
        (SLOWEST_MARCH * self.alive() as f32 / total).max(FASTEST_MARCH)
    }

    fn march(&mut self) {
        let (min_x, max_x) = self
            .invaders
            .iter()
            .filter(|i| i.alive)
            .fold((f32::MAX, f32::MIN), |(lo, hi), i| (lo.min(i.pos.x), hi.max(i.pos.x)));
        let half = INVADER_SIZE.x / 2.0;
        let next_min = min_x + self.march_dir * MARCH_STEP - half;
        let next_max = max_x + self.march_dir * MARCH_STEP + half;

        let step = if next_min < EDGE_MARGIN || next_max > WIDTH - EDGE_MARGIN {
            self.march_dir = -self.march_dir;
            Vec2::new(0.0, DROP_STEP)
        } else {
            Vec2::new(self.march_dir * MARCH_STEP, 0.0)
        };
        for invader in self.invaders.iter_mut().filter(|i| i.alive) {
            invader.pos += step;
        }
        self.events.push(GameEvent::Blip);
    }

    fn drop_bomb(&mut self) {
        // Only the lowest invader in a column can fire
        let mut shooters: Vec<&Invader> = Vec::new();
        for col in 0..FORMATION_COLS {
            if let Some(lowest) = self
                .invaders
                .iter()
                .filter(|i| i.alive && i.col == col)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            {
                shooters.push(lowest);
            }
        }
        let Some(shooter) = self.rng.pick(&shooters) else {
            return;
        };
        let from = shooter.pos + Vec2::new(0.0, INVADER_SIZE.y / 2.0);
        self.bombs.push(from);
    }

    fn update_shot(&mut self, dt: f32) {
        let Some(mut shot) = self.shot.take() else {
            return;
        };
        shot.y -= SHOT_SPEED * dt;
        let area = Rect::from_center(shot, Vec2::new(3.0, 12.0));
        if shot.y < 0.0 {
            return;
        }

        if let Some(invader) = self
            .invaders
            .iter_mut()
            .find(|i| i.alive && i.rect().intersects(&area))
        {
            invader.alive = false;
            self.score += invader.points();
            self.events.push(GameEvent::Explosion);
            return;
        }

        if let Some(m) = &self.mystery {
            if Rect::from_center(m.pos, Vec2::new(48.0, 18.0)).intersects(&area) {
                let bonus = self.rng.pick(&MYSTERY_POINTS).copied().unwrap_or(100);
                self.score += bonus;
                self.mystery = None;
                self.events.push(GameEvent::PowerUp);
                return;
            }
        }

        for bunker in &mut self.bunkers {
            if bunker.erode(&area, &mut self.rng) {
                return;
            }
        }
        self.shot = Some(shot);
    }

    fn update_bombs(&mut self, dt: f32) {
        let player = self.player_rect();
        let mut player_hit = false;
        let bunkers = &mut self.bunkers;
        let rng = &mut self.rng;
        self.bombs.retain_mut(|bomb| {
            bomb.y += BOMB_SPEED * dt;
            let area = Rect::from_center(*bomb, Vec2::new(4.0, 10.0));
            if bomb.y > HEIGHT {
                return false;
            }
            if bunkers.iter_mut().any(|b| b.erode(&area, rng)) {
                return false;
            }
            if player.intersects(&area) {
                player_hit = true;
                return false;
            }
            true
        });

        if player_hit && self.grace <= 0.0 {
            self.lose_life();
        }
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.bombs.clear();
        self.grace = RESPAWN_GRACE;
        if self.lives == 0 {
            self.game_over();
        } else {
            self.events.push(GameEvent::LifeLost);
        }
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::GameOver);
    }

    fn update_mystery(&mut self, dt: f32) {
        match self.mystery.as_mut() {
            Some(m) => {
                m.pos.x += m.dir * MYSTERY_SPEED * dt;
                if m.pos.x < -40.0 || m.pos.x > WIDTH + 40.0 {
                    self.mystery = None;
                }
            }
            None => {
                self.mystery_timer -= dt;
                if self.mystery_timer <= 0.0 {
                    let dir = self.rng.sign();
                    let x = if dir > 0.0 { -30.0 } else { WIDTH + 30.0 };
                    self.mystery = Some(Mystery {
                        pos: Vec2::new(x, MYSTERY_Y),
                        dir,
                    });
                    self.mystery_timer = self.rng.range_f32(15.0, 25.0);
                }
            }
        }
    }

    fn next_wave(&mut self) {
        self.wave += 1;
        self.invaders = formation(self.wave);
        self.march_dir = 1.0;
        self.bombs.clear();
        self.shot = None;
        self.events.push(GameEvent::LevelUp);
    }
}

impl ArcadeGame for Invaders {
    fn id(&self) -> GameId {
        GameId::Invaders
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

        self.grace = (self.grace - dt).max(0.0);
        self.player_x += input.axis_x() * PLAYER_SPEED * dt;
        self.player_x = self.player_x.clamp(PLAYER_SIZE.x / 2.0, WIDTH - PLAYER_SIZE.x / 2.0);

        if input.pressed(Key::Action) && self.shot.is_none() {
            self.shot = Some(Vec2::new(self.player_x, PLAYER_Y - PLAYER_SIZE.y / 2.0));
            self.events.push(GameEvent::Blip);
        }

        self.march_timer -= dt;
        if self.march_timer <= 0.0 {
            self.march();
            self.march_timer = self.march_interval();
        }

        self.bomb_timer -= dt;
        if self.bomb_timer <= 0.0 {
            self.drop_bomb();
            self.bomb_timer = self.rng.range_f32(0.4, 1.4) / (1.0 + self.wave as f32 * 0.1);
        }

        self.update_shot(dt);
        self.update_bombs(dt);
        self.update_mystery(dt);
        if self.phase != Phase::Playing {
            return;
        }

        // Invaders chew through bunkers they touch
        for invader in self.invaders.iter().filter(|i| i.alive) {
            let rect = invader.rect();
            for bunker in &mut self.bunkers {
                while bunker.erode(&rect, &mut self.rng) {}
            }
        }

        if self
            .invaders
            .iter()
            .any(|i| i.alive && i.pos.y + INVADER_SIZE.y / 2.0 >= INVASION_Y)
        {
            self.game_over();
            return;
        }

        if self.alive() == 0 {
            self.next_wave();
        }
    }

    fn draw(&self, scene: &mut Scene) {
        for invader in self.invaders.iter().filter(|i| i.alive) {
            let r = invader.rect();
            scene.rect(r, invader.color());
            // Eyes
            scene.rect(Rect::new(r.x + 7.0, r.y + 6.0, 5.0, 5.0), colors::BACKGROUND);
            scene.rect(Rect::new(r.right() - 12.0, r.y + 6.0, 5.0, 5.0), colors::BACKGROUND);
        }

        for bunker in &self.bunkers {
            for (cell, solid) in bunker.blocks.iter() {
                if *solid {
                    scene.rect(bunker.block_rect(cell), colors::GREEN);
                }
            }
        }

        if let Some(m) = &self.mystery {
            scene.rect(Rect::from_center(m.pos, Vec2::new(48.0, 16.0)), colors::RED);
            scene.circle(m.pos - Vec2::new(0.0, 8.0), 10.0, colors::RED);
        }

        // Blink during respawn grace
        if self.grace <= 0.0 || (self.grace * 8.0) as i32 % 2 == 0 {
            let p = self.player_rect();
            scene.rect(p, colors::GREEN);
            scene.rect(Rect::from_center(Vec2::new(p.center().x, p.y - 4.0), Vec2::new(6.0, 8.0)), colors::GREEN);
        }

        if let Some(shot) = self.shot {
            scene.rect(Rect::from_center(shot, Vec2::new(3.0, 12.0)), colors::WHITE);
        }
        for bomb in &self.bombs {
            scene.rect(Rect::from_center(*bomb, Vec2::new(4.0, 10.0)), colors::YELLOW);
        }

        scene.rect(Rect::new(0.0, PLAYER_Y + 20.0, WIDTH, 2.0), colors::GREEN);
        for i in 0..self.lives {
            scene.rect(Rect::new(20.0 + i as f32 * 30.0, HEIGHT - 18.0, 22.0, 8.0), colors::GREEN);
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

    fn playing() -> Invaders {
        let mut game = Invaders::new(8);
        game.phase = Phase::Playing;
        game
    }

    #[test]
    fn formation_is_full() {
        let game = Invaders::new(1);
        assert_eq!(game.alive(), FORMATION_COLS * FORMATION_ROWS);
    }

    #[test]
    fn only_one_shot_at_a_time() {
        let mut game = playing();
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        let first = game.shot;
        assert!(first.is_some());
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        assert!(game.shot.unwrap().y < first.unwrap().y);
    }

    #[test]
    fn shot_kills_invader_and_scores() {
        let mut game = playing();
        let target = game.invaders[0].pos;
        game.shot = Some(target + Vec2::new(0.0, 12.0));
        game.update_shot(SIM_DT);
        assert!(!game.invaders[0].alive);
        assert_eq!(game.score(), 30);
        assert!(game.shot.is_none());
    }

    #[test]
    fn march_speeds_up_as_formation_thins() {
        let mut game = playing();
        let full = game.march_interval();
        for invader in game.invaders.iter_mut().take(40) {
            invader.alive = false;
        }
        assert!(game.march_interval() < full);
    }

    #[test]
    fn edge_reverses_and_drops() {
        let mut game = playing();
        let before = game.invaders[0].pos.y;
        // March right until the formation turns around
        for _ in 0..40 {
            game.march();
            if game.march_dir < 0.0 {
                break;
            }
        }
        assert_eq!(game.march_dir, -1.0);
        assert_eq!(game.invaders[0].pos.y, before + DROP_STEP);
    }

    #[test]
    fn bomb_erodes_bunker() {
        let mut game = playing();
        let before = game.bunkers[0].solid_blocks();
        let center = game.bunkers[0].block_rect((2, 0)).center();
        game.bombs.push(center - Vec2::new(0.0, 8.0));
        game.update_bombs(SIM_DT);
        assert!(game.bunkers[0].solid_blocks() < before);
        assert!(game.bombs.is_empty());
    }

    #[test]
    fn bomb_on_player_costs_life() {
        let mut game = playing();
        game.bombs.push(Vec2::new(game.player_x, PLAYER_Y));
        game.update_bombs(SIM_DT);
        assert_eq!(game.lives(), START_LIVES - 1);
    }

    #[test]
    fn mystery_ship_appears_when_timer_runs_out() {
        let mut game = playing();
        assert!(game.mystery.is_none());
        game.mystery_timer = SIM_DT / 2.0;
        game.update_mystery(SIM_DT);
        let m = game.mystery.clone().unwrap();
        assert_eq!(m.pos.y, MYSTERY_Y);
        // Enters from the side it is flying away from
        assert!(m.pos.x < 0.0 || m.pos.x > WIDTH);
        assert!(game.mystery_timer >= 15.0);
    }

    #[test]
    fn shooting_mystery_ship_pays_a_bonus() {
        let mut game = playing();
        game.mystery = Some(Mystery {
            pos: Vec2::new(WIDTH / 2.0, MYSTERY_Y),
            dir: 1.0,
        });
        game.shot = Some(Vec2::new(WIDTH / 2.0, MYSTERY_Y + 10.0));
        game.update_shot(SIM_DT);
        assert!(game.mystery.is_none());
        assert!(game.shot.is_none());
        assert!(MYSTERY_POINTS.contains(&game.score()));
        assert!(game.take_events().contains(&GameEvent::PowerUp));
    }

    #[test]
    fn mystery_ship_leaves_the_screen() {
        let mut game = playing();
        game.mystery = Some(Mystery {
            pos: Vec2::new(WIDTH + 39.0, MYSTERY_Y),
            dir: 1.0,
        });
        let timer = game.mystery_timer;
        game.update_mystery(SIM_DT);
        assert!(game.mystery.is_none());
        // The spawn timer only runs while no ship is flying
        assert_eq!(game.mystery_timer, timer);
    }

    #[test]
    fn landing_ends_game() {
        let mut game = playing();
        for invader in &mut game.invaders {
            invader.pos.y = INVASION_Y;
        }
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn cleared_wave_starts_lower() {
        let mut game = playing();
        for invader in &mut game.invaders {
            invader.alive = false;
        }
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.wave(), 2);
        assert_eq!(game.invaders[0].pos.y, FORMATION_TOP + WAVE_DROP);
    }
}
