//! Frogger: hop across traffic, ride logs home

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir, start_pressed};
use crate::platform::FrameInput;
use crate::renderer::{Scene, colors, with_alpha};
use crate::sim::{Dir, GameRng, Rect};

pub const COLS: i32 = 15;
pub const ROWS: i32 = 13;
const CELL: f32 = 50.0;
const WIDTH: f32 = COLS as f32 * CELL;
const HOME_ROW: i32 = 0;
const START_ROW: i32 = ROWS - 1;
const BAY_COLS: [i32; 5] = [1, 4, 7, 10, 13];
/// How close to a bay centre counts as landing in it
const BAY_TOLERANCE: f32 = 20.0;
const FROG_SIZE: f32 = 36.0;
const LIFE_TIME: f32 = 30.0;
const LEVEL_SPEEDUP: f32 = 1.15;
pub const START_LIVES: u32 = 3;
const HOP_POINTS: u64 = 10;
const HOME_POINTS: u64 = 50;
const LEVEL_POINTS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaneKind {
    Road,
    River,
}

#[derive(Debug, Clone)]
struct Lane {
    row: i32,
    kind: LaneKind,
    /// Pixels per second, negative flows left
    speed: f32,
    /// Length in cells of every object in this lane
    length: f32,
    /// Left edges in pixels
    objects: Vec<f32>,
}

impl Lane {
    fn spans(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.objects.iter().map(|&x| (x, x + self.length * CELL))
    }

    fn advance(&mut self, dt: f32) {
        let span = WIDTH + self.length * CELL;
        let len = self.length * CELL;
        for x in &mut self.objects {
            *x += self.speed * dt;
            // Wrap through the off-screen strip
            *x = (*x + len).rem_euclid(span) - len;
        }
    }
}

/// (row, kind, speed, object length, object count)
const LANE_LAYOUT: [(i32, LaneKind, f32, f32, usize); 10] = [
    (1, LaneKind::River, 70.0, 3.0, 3),
    (2, LaneKind::River, -90.0, 2.0, 4),
    (3, LaneKind::River, 110.0, 4.0, 2),
    (4, LaneKind::River, -60.0, 3.0, 3),
    (5, LaneKind::River, 80.0, 2.0, 3),
    (7, LaneKind::Road, -80.0, 1.0, 3),
    (8, LaneKind::Road, 100.0, 2.0, 2),
    (9, LaneKind::Road, -120.0, 1.0, 3),
    (10, LaneKind::Road, 70.0, 1.0, 4),
    (11, LaneKind::Road, -150.0, 1.0, 2),
];

pub struct Frogger {
    phase: Phase,
    rng: GameRng,
    lanes: Vec<Lane>,
    frog_x: f32,
    frog_row: i32,
    /// Furthest row reached this life (lower is further)
    best_row: i32,
    bays: [bool; 5],
    timer: f32,
    lives: u32,
    level: u32,
    score: u64,
    events: Vec<GameEvent>,
}

impl Frogger {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            lanes: Vec::new(),
            frog_x: 0.0,
            frog_row: START_ROW,
            best_row: START_ROW,
            bays: [false; 5],
            timer: LIFE_TIME,
            lives: START_LIVES,
            level: 1,
            score: 0,
            events: Vec::new(),
        };
        game.build_lanes();
        game.reset_frog();
        game
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn frog(&self) -> (f32, i32) {
        (self.frog_x, self.frog_row)
    }

    fn build_lanes(&mut self) {
        let factor = LEVEL_SPEEDUP.powi(self.level as i32 - 1);
        self.lanes = LANE_LAYOUT
            .iter()
            .map(|&(row, kind, speed, length, count)| {
                let span = WIDTH + length * CELL;
                let spacing = span / count as f32;
                let jitter = self.rng.range_f32(0.0, spacing * 0.3);
                Lane {
                    row,
                    kind,
                    speed: speed * factor,
                    length,
                    objects: (0..count).map(|i| i as f32 * spacing + jitter - length * CELL).collect(),
                }
            })
            .collect();
    }

    fn reset_frog(&mut self) {
        self.frog_x = (COLS / 2) as f32 * CELL + CELL / 2.0;
        self.frog_row = START_ROW;
        self.best_row = START_ROW;
        self.timer = LIFE_TIME;
    }

    fn frog_rect(&self) -> Rect {
        Rect::from_center(
            Vec2::new(self.frog_x, self.frog_row as f32 * CELL + CELL / 2.0),
            Vec2::splat(FROG_SIZE),
        )
    }

    fn hop(&mut self, dir: Dir) {
        let (dx, dy) = dir.delta();
        let next_row = (self.frog_row + dy).clamp(HOME_ROW, START_ROW);
        let next_x = self.frog_x + dx as f32 * CELL;
        if next_x < CELL / 2.0 - 1.0 || next_x > WIDTH - CELL / 2.0 + 1.0 {
            return;
        }
        self.frog_x = next_x;
        self.frog_row = next_row;
        self.events.push(GameEvent::Blip);

        if self.frog_row < self.best_row {
            self.best_row = self.frog_row;
            self.score += HOP_POINTS;
        }
        if self.frog_row == HOME_ROW {
            self.land_home();
        }
    }

    fn land_home(&mut self) {
        let bay = BAY_COLS.iter().position(|&col| {
            let center = col as f32 * CELL + CELL / 2.0;
            (self.frog_x - center).abs() <= BAY_TOLERANCE
        });
        match bay {
            Some(i) if !self.bays[i] => {
                self.bays[i] = true;
                // Unused seconds pay out
                self.score += HOME_POINTS + self.timer as u64 * 10;
                self.events.push(GameEvent::Score);
                if self.bays.iter().all(|b| *b) {
                    self.level += 1;
                    self.score += LEVEL_POINTS;
                    self.bays = [false; 5];
                    self.build_lanes();
                    self.events.push(GameEvent::LevelUp);
                }
                self.reset_frog();
            }
            _ => self.die(),
        }
    }

    fn die(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        } else {
            self.events.push(GameEvent::LifeLost);
            self.reset_frog();
        }
    }

    fn check_lane(&mut self, dt: f32) {
        let Some(lane) = self.lanes.iter().find(|l| l.row == self.frog_row) else {
            return;
        };
        let frog = self.frog_rect();
        match lane.kind {
            LaneKind::Road => {
                let squashed = lane
                    .spans()
                    .any(|(l, r)| frog.intersects(&Rect::new(l + 4.0, frog.y, r - l - 8.0, frog.h)));
                if squashed {
                    self.events.push(GameEvent::Hit);
                    self.die();
                }
            }
            LaneKind::River => {
                let center = self.frog_x;
                let afloat = lane.spans().any(|(l, r)| center >= l && center <= r);
                if !afloat {
                    self.die();
                    return;
                }
                // Ride the log; drifting off screen is fatal
                self.frog_x += lane.speed * dt;
                if self.frog_x < 0.0 || self.frog_x > WIDTH {
                    self.die();
                }
            }
        }
    }
}

impl ArcadeGame for Frogger {
    fn id(&self) -> GameId {
        GameId::Frogger
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, ROWS as f32 * CELL)
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
            HudItem::new("Time", self.timer.ceil() as u32),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        let hop = pressed_dir(input);
        match self.phase {
            Phase::Ready if start_pressed(input) || hop.is_some() => self.phase = Phase::Playing,
            Phase::Ready => {
                for lane in &mut self.lanes {
                    lane.advance(dt);
                }
                return;
            }
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        for lane in &mut self.lanes {
            lane.advance(dt);
        }

        if let Some(dir) = hop {
            self.hop(dir);
            if self.phase != Phase::Playing {
                return;
            }
        }

        self.check_lane(dt);

        self.timer -= dt;
        if self.timer <= 0.0 && self.phase == Phase::Playing {
            self.die();
        }
    }

    fn draw(&self, scene: &mut Scene) {
        // Bands: home, river, median, road, start
        for row in 0..ROWS {
            let color = match row {
                HOME_ROW => colors::GREEN,
                1..=5 => colors::NAVY,
                6 | START_ROW => with_alpha(colors::PURPLE, 0.5),
                _ => colors::PANEL,
            };
            scene.rect(Rect::new(0.0, row as f32 * CELL, WIDTH, CELL), color);
        }
        for (i, &col) in BAY_COLS.iter().enumerate() {
            let bay = Rect::new(col as f32 * CELL, 4.0, CELL, CELL - 4.0);
            scene.rect(bay, colors::NAVY);
            if self.bays[i] {
                scene.circle(bay.center(), FROG_SIZE / 2.0, colors::LIME);
            }
        }

        for lane in &self.lanes {
            let (color, inset) = match lane.kind {
                LaneKind::River => (colors::BROWN, 6.0),
                LaneKind::Road if lane.speed > 0.0 => (colors::YELLOW, 8.0),
                LaneKind::Road => (colors::RED, 8.0),
            };
            for (l, r) in lane.spans() {
                scene.rect(
                    Rect::new(l + 2.0, lane.row as f32 * CELL + inset, r - l - 4.0, CELL - inset * 2.0),
                    color,
                );
            }
        }

        if self.phase != Phase::GameOver {
            let frog = self.frog_rect();
            scene.rect(frog, colors::LIME);
            scene.circle(Vec2::new(frog.x + 8.0, frog.y + 6.0), 4.0, colors::WHITE);
            scene.circle(Vec2::new(frog.right() - 8.0, frog.y + 6.0), 4.0, colors::WHITE);
        }

        // Time bar along the bottom edge
        let frac = (self.timer / LIFE_TIME).clamp(0.0, 1.0);
        scene.rect(
            Rect::new(0.0, ROWS as f32 * CELL - 6.0, WIDTH * frac, 6.0),
            if frac < 0.25 { colors::RED } else { colors::YELLOW },
        );
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::platform::Key;

    fn playing() -> Frogger {
        let mut game = Frogger::new(3);
        game.phase = Phase::Playing;
        game
    }

    fn clear_lane(game: &mut Frogger, row: i32) {
        if let Some(lane) = game.lanes.iter_mut().find(|l| l.row == row) {
            lane.objects.clear();
        }
    }

    #[test]
    fn hop_forward_scores_once_per_row() {
        let mut game = playing();
        game.hop(Dir::Up);
        assert_eq!(game.score(), HOP_POINTS);
        game.hop(Dir::Down);
        game.hop(Dir::Up);
        assert_eq!(game.score(), HOP_POINTS);
    }

    #[test]
    fn car_squashes_frog() {
        let mut game = playing();
        game.frog_row = 7;
        let lane = game.lanes.iter_mut().find(|l| l.row == 7).unwrap();
        lane.objects = vec![game.frog_x - CELL / 2.0];
        game.check_lane(SIM_DT);
        assert_eq!(game.lives(), START_LIVES - 1);
        assert_eq!(game.frog().1, START_ROW);
    }

    #[test]
    fn empty_river_drowns() {
        let mut game = playing();
        clear_lane(&mut game, 3);
        game.frog_row = 3;
        game.check_lane(SIM_DT);
        assert_eq!(game.lives(), START_LIVES - 1);
    }

    #[test]
    fn log_carries_frog() {
        let mut game = playing();
        game.frog_row = 1;
        let lane = game.lanes.iter_mut().find(|l| l.row == 1).unwrap();
        lane.objects = vec![game.frog_x - CELL];
        let speed = lane.speed;
        let before = game.frog_x;
        game.check_lane(0.1);
        assert_eq!(game.lives(), START_LIVES);
        assert!((game.frog_x - (before + speed * 0.1)).abs() < 1e-3);
    }

    #[test]
    fn landing_in_bay_fills_it() {
        let mut game = playing();
        game.frog_row = 1;
        game.frog_x = BAY_COLS[2] as f32 * CELL + CELL / 2.0;
        game.hop(Dir::Up);
        assert!(game.bays[2]);
        assert_eq!(game.frog().1, START_ROW);
        assert_eq!(game.lives(), START_LIVES);
    }

    #[test]
    fn missing_the_bay_is_fatal() {
        let mut game = playing();
        game.frog_row = 1;
        game.frog_x = 2.5 * CELL + CELL / 2.0;
        game.hop(Dir::Up);
        assert_eq!(game.lives(), START_LIVES - 1);
    }

    #[test]
    fn all_bays_advance_level() {
        let mut game = playing();
        game.bays = [true, true, true, true, false];
        game.frog_row = 1;
        game.frog_x = BAY_COLS[4] as f32 * CELL + CELL / 2.0;
        game.hop(Dir::Up);
        assert_eq!(game.level(), 2);
        assert!(game.bays.iter().all(|b| !b));
        assert!(game.lanes[0].speed.abs() > LANE_LAYOUT[0].2.abs());
    }

    #[test]
    fn timer_runs_out() {
        let mut game = playing();
        // Keep the frog on the safe start row
        game.tick(&FrameInput::idle().with_pressed(Key::Confirm), SIM_DT);
        game.timer = SIM_DT / 2.0;
        game.tick(&FrameInput::idle(), SIM_DT);
        assert_eq!(game.lives(), START_LIVES - 1);
    }
}
