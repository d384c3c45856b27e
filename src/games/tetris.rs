//! Tetris: 10x20 well, 7-bag randomizer, wall kicks, soft and hard drop

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Color, Scene, colors, with_alpha};
use crate::sim::{Cell, GameRng, Grid, Rect};

pub const WELL_W: i32 = 10;
pub const WELL_H: i32 = 20;
const CELL: f32 = 28.0;
const WELL_ORIGIN: Vec2 = Vec2::new(20.0, 20.0);
const BASE_GRAVITY: f32 = 0.8;
const GRAVITY_FACTOR: f32 = 0.85;
const MIN_GRAVITY: f32 = 0.05;
const SOFT_DROP_INTERVAL: f32 = 0.04;
const LOCK_DELAY: f32 = 0.5;
/// Delayed auto shift before held left/right repeats
const DAS: f32 = 0.17;
const ARR: f32 = 0.05;
const LINES_PER_LEVEL: u32 = 10;
const LINE_SCORES: [u64; 5] = [0, 40, 100, 300, 1200];
/// Offsets tried in order when a rotation collides
const KICKS: [Cell; 6] = [(0, 0), (-1, 0), (1, 0), (0, -1), (-2, 0), (2, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Side of the rotation box
    fn box_size(&self) -> i32 {
        match self {
            PieceKind::I => 4,
            PieceKind::O => 2,
            _ => 3,
        }
    }

    /// Cells in spawn orientation, relative to the box
    fn base_cells(&self) -> [Cell; 4] {
        match self {
            PieceKind::I => [(0, 1), (1, 1), (2, 1), (3, 1)],
            PieceKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            PieceKind::T => [(1, 0), (0, 1), (1, 1), (2, 1)],
            PieceKind::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
            PieceKind::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
            PieceKind::J => [(0, 0), (0, 1), (1, 1), (2, 1)],
            PieceKind::L => [(2, 0), (0, 1), (1, 1), (2, 1)],
        }
    }

    pub fn color(&self) -> Color {
        match self {
            PieceKind::I => colors::TEAL,
            PieceKind::O => colors::YELLOW,
            PieceKind::T => colors::PURPLE,
            PieceKind::S => colors::GREEN,
            PieceKind::Z => colors::RED,
            PieceKind::J => colors::BLUE,
            PieceKind::L => colors::ORANGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    /// Quarter turns clockwise
    pub rotation: u8,
    /// Top-left of the rotation box in well cells
    pub x: i32,
    pub y: i32,
}

impl Piece {
    fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: 0,
            x: (WELL_W - kind.box_size()) / 2,
            y: 0,
        }
    }

    pub fn cells(&self) -> [Cell; 4] {
        let size = self.kind.box_size();
        self.kind.base_cells().map(|(mut cx, mut cy)| {
            for _ in 0..self.rotation % 4 {
                (cx, cy) = (size - 1 - cy, cx);
            }
            (self.x + cx, self.y + cy)
        })
    }

    fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % 4,
            ..*self
        }
    }
}

pub struct Tetris {
    phase: Phase,
    rng: GameRng,
    well: Grid<Option<PieceKind>>,
    piece: Piece,
    bag: Vec<PieceKind>,
    next: PieceKind,
    gravity_timer: f32,
    lock_timer: f32,
    /// Held direction and time until it repeats
    shift: Option<(i32, f32)>,
    lines: u32,
    score: u64,
    events: Vec<GameEvent>,
}

impl Tetris {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            well: Grid::new(WELL_W, WELL_H, None),
            piece: Piece::spawn(PieceKind::O),
            bag: Vec::new(),
            next: PieceKind::O,
            gravity_timer: 0.0,
            lock_timer: 0.0,
            shift: None,
            lines: 0,
            score: 0,
            events: Vec::new(),
        };
        let first = game.draw_from_bag();
        game.piece = Piece::spawn(first);
        game.next = game.draw_from_bag();
        game
    }

    pub fn level(&self) -> u32 {
        self.lines / LINES_PER_LEVEL
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }

    fn gravity_interval(&self) -> f32 {
        (BASE_GRAVITY * GRAVITY_FACTOR.powi(self.level() as i32)).max(MIN_GRAVITY)
    }

    fn draw_from_bag(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            self.bag = PieceKind::ALL.to_vec();
            self.rng.shuffle(&mut self.bag);
        }
        self.bag.pop().unwrap_or(PieceKind::T)
    }

    fn fits(&self, piece: &Piece) -> bool {
        piece.cells().iter().all(|&(x, y)| {
            // Cells above the well are allowed while rotating near the top
            x >= 0 && x < WELL_W && y < WELL_H && (y < 0 || self.well.get((x, y)) == Some(&None))
        })
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let moved = self.piece.shifted(dx, dy);
        if self.fits(&moved) {
            self.piece = moved;
            true
        } else {
            false
        }
    }

    fn rotate(&mut self) {
        let turned = self.piece.rotated();
        for (dx, dy) in KICKS {
            let candidate = turned.shifted(dx, dy);
            if self.fits(&candidate) {
                self.piece = candidate;
                self.events.push(GameEvent::Blip);
                return;
            }
        }
    }

    fn hard_drop(&mut self) {
        let mut rows = 0;
        while self.try_move(0, 1) {
            rows += 1;
        }
        self.score += rows * 2;
        self.lock_piece();
    }

    fn lock_piece(&mut self) {
        let mut inside = true;
        for cell in self.piece.cells() {
            inside &= self.well.set(cell, Some(self.piece.kind));
        }
        self.events.push(GameEvent::Hit);
        // Locking with any block above the well is a lock-out
        if !inside {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }
        self.clear_lines();
        self.spawn_next();
    }

    fn clear_lines(&mut self) {
        let full: Vec<i32> = (0..WELL_H)
            .filter(|&y| self.well.row(y).iter().all(Option::is_some))
            .collect();
        if full.is_empty() {
            return;
        }

        // Rebuild the well bottom-up skipping the full rows
        let mut rows: Vec<Vec<Option<PieceKind>>> = (0..WELL_H)
            .filter(|y| !full.contains(y))
            .map(|y| self.well.row(y).to_vec())
            .collect();
        while rows.len() < WELL_H as usize {
            rows.insert(0, vec![None; WELL_W as usize]);
        }
        self.well = Grid::from_rows(rows);

        let level_before = self.level();
        self.score += LINE_SCORES[full.len().min(4)] * (level_before as u64 + 1);
        self.lines += full.len() as u32;
        self.events.push(GameEvent::Score);
        if self.level() > level_before {
            self.events.push(GameEvent::LevelUp);
        }
    }

    fn spawn_next(&mut self) {
        let kind = self.next;
        self.next = self.draw_from_bag();
        self.piece = Piece::spawn(kind);
        self.gravity_timer = 0.0;
        self.lock_timer = 0.0;
        if !self.fits(&self.piece) {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    fn handle_shift(&mut self, input: &FrameInput, dt: f32) {
        let dir = if input.pressed(Key::Left) {
            Some(-1)
        } else if input.pressed(Key::Right) {
            Some(1)
        } else {
            None
        };

        if let Some(dx) = dir {
            if self.try_move(dx, 0) {
                self.events.push(GameEvent::Blip);
            }
            self.shift = Some((dx, DAS));
            return;
        }

        let held = match self.shift {
            Some((-1, _)) => input.held(Key::Left),
            Some((_, _)) => input.held(Key::Right),
            None => false,
        };
        if !held {
            self.shift = None;
            return;
        }
        if let Some((dx, timer)) = self.shift.as_mut() {
            *timer -= dt;
            if *timer <= 0.0 {
                *timer += ARR;
                let dx = *dx;
                self.try_move(dx, 0);
            }
        }
    }
}

impl ArcadeGame for Tetris {
    fn id(&self) -> GameId {
        GameId::Tetris
    }

    fn size(&self) -> Vec2 {
        Vec2::new(480.0, 600.0)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Level", self.level()),
            HudItem::new("Lines", self.lines),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        match self.phase {
            Phase::Ready => {
                if start_pressed(input) {
                    self.phase = Phase::Playing;
                }
                return;
            }
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        if input.pressed(Key::Action) {
            self.hard_drop();
            return;
        }
        if input.pressed(Key::Up) {
            self.rotate();
        }
        self.handle_shift(input, dt);

        let soft = input.held(Key::Down);
        let interval = if soft {
            SOFT_DROP_INTERVAL.min(self.gravity_interval())
        } else {
            self.gravity_interval()
        };

        self.gravity_timer += dt;
        while self.gravity_timer >= interval {
            self.gravity_timer -= interval;
            if self.try_move(0, 1) {
                self.lock_timer = 0.0;
                if soft {
                    self.score += 1;
                }
            }
        }

        // Resting on something: lock after a short grace period
        if !self.fits(&self.piece.shifted(0, 1)) {
            self.lock_timer += dt;
            if self.lock_timer >= LOCK_DELAY {
                self.lock_piece();
            }
        }
    }

    fn draw(&self, scene: &mut Scene) {
        let well_rect = Rect::new(
            WELL_ORIGIN.x,
            WELL_ORIGIN.y,
            WELL_W as f32 * CELL,
            WELL_H as f32 * CELL,
        );
        scene.rect(well_rect, colors::PANEL);
        scene.rect_outline(well_rect.inflate(3.0), 3.0, colors::DIM);

        let cell_rect = |(x, y): Cell| {
            Rect::new(
                WELL_ORIGIN.x + x as f32 * CELL + 1.0,
                WELL_ORIGIN.y + y as f32 * CELL + 1.0,
                CELL - 2.0,
                CELL - 2.0,
            )
        };

        for (cell, kind) in self.well.iter() {
            if let Some(kind) = kind {
                scene.rect(cell_rect(cell), kind.color());
            }
        }

        if self.phase == Phase::Playing {
            // Ghost shows where a hard drop would land
            let mut ghost = self.piece;
            while self.fits(&ghost.shifted(0, 1)) {
                ghost = ghost.shifted(0, 1);
            }
            for cell in ghost.cells().into_iter().filter(|c| c.1 >= 0) {
                scene.rect(cell_rect(cell), with_alpha(self.piece.kind.color(), 0.25));
            }
        }
        for cell in self.piece.cells().into_iter().filter(|c| c.1 >= 0) {
            scene.rect(cell_rect(cell), self.piece.kind.color());
        }

        // Side panel: next piece, score, lines
        let panel_x = well_rect.right() + 30.0;
        let preview = Piece {
            kind: self.next,
            rotation: 0,
            x: 0,
            y: 0,
        };
        for (x, y) in preview.cells() {
            scene.rect(
                Rect::new(panel_x + x as f32 * 22.0, 40.0 + y as f32 * 22.0, 20.0, 20.0),
                self.next.color(),
            );
        }
        scene.digits(self.score, Vec2::new(panel_x, 160.0), 5.0, colors::WHITE);
        scene.digits(self.lines as u64, Vec2::new(panel_x, 220.0), 5.0, colors::DIM);
        scene.digits(self.level() as u64, Vec2::new(panel_x, 280.0), 5.0, colors::YELLOW);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn started() -> Tetris {
        let mut game = Tetris::new(11);
        game.tick(&FrameInput::idle().with_pressed(Key::Confirm), SIM_DT);
        game
    }

    #[test]
    fn bag_deals_all_seven_before_repeating() {
        let mut game = Tetris::new(3);
        game.bag.clear();
        let mut dealt: Vec<PieceKind> = (0..7).map(|_| game.draw_from_bag()).collect();
        dealt.sort_by_key(|k| *k as u8);
        assert_eq!(dealt, PieceKind::ALL.to_vec());
    }

    #[test]
    fn four_rotations_return_to_start() {
        for kind in PieceKind::ALL {
            let piece = Piece::spawn(kind);
            let mut turned = piece;
            for _ in 0..4 {
                turned = turned.rotated();
            }
            assert_eq!(turned.cells(), piece.cells());
        }
    }

    #[test]
    fn hard_drop_lands_on_floor() {
        let mut game = started();
        game.piece = Piece::spawn(PieceKind::O);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), SIM_DT);
        assert!(game.well.row(WELL_H - 1).iter().filter(|c| c.is_some()).count() == 2);
        assert!(game.score() >= 2 * (WELL_H as u64 - 2));
    }

    #[test]
    fn single_line_scores_forty() {
        let mut game = started();
        for x in 0..WELL_W - 4 {
            game.well.set((x, WELL_H - 1), Some(PieceKind::J));
        }
        // Horizontal I fills the last four columns
        game.piece = Piece {
            kind: PieceKind::I,
            rotation: 0,
            x: WELL_W - 4,
            y: WELL_H - 2,
        };
        game.lock_piece();
        assert_eq!(game.lines(), 1);
        assert_eq!(game.score(), 40);
        assert!(game.well.row(WELL_H - 1).iter().all(Option::is_none));
    }

    #[test]
    fn tetris_at_level_one_scores_double() {
        let mut game = started();
        game.lines = 10;
        for y in WELL_H - 4..WELL_H {
            for x in 1..WELL_W {
                game.well.set((x, y), Some(PieceKind::L));
            }
        }
        game.piece = Piece {
            kind: PieceKind::I,
            rotation: 1,
            x: -2,
            y: WELL_H - 4,
        };
        assert!(game.fits(&game.piece));
        game.lock_piece();
        assert_eq!(game.lines(), 14);
        assert_eq!(game.score(), 1200 * 2);
    }

    #[test]
    fn rotation_kicks_off_wall() {
        let mut game = started();
        game.piece = Piece {
            kind: PieceKind::T,
            rotation: 1,
            x: -1,
            y: 5,
        };
        assert!(game.fits(&game.piece));
        game.rotate();
        assert_eq!(game.piece.rotation, 2);
        assert!(game.fits(&game.piece));
    }

    #[test]
    fn blocked_spawn_tops_out() {
        let mut game = started();
        for x in 0..WELL_W {
            game.well.set((x, 0), Some(PieceKind::Z));
            game.well.set((x, 1), Some(PieceKind::Z));
        }
        game.spawn_next();
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn locking_above_the_well_tops_out() {
        let mut game = started();
        game.piece = Piece {
            kind: PieceKind::O,
            rotation: 0,
            x: 4,
            y: -1,
        };
        assert!(game.fits(&game.piece));
        game.lock_piece();
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(game.take_events().contains(&GameEvent::GameOver));
        // The part inside the well still lands
        assert_eq!(game.well.get((4, 0)), Some(&Some(PieceKind::O)));
    }

    #[test]
    fn gravity_quickens_every_ten_lines() {
        let mut game = started();
        let level_zero = game.gravity_interval();
        assert_eq!(level_zero, BASE_GRAVITY);

        game.lines = LINES_PER_LEVEL - 1;
        for x in 0..WELL_W - 4 {
            game.well.set((x, WELL_H - 1), Some(PieceKind::J));
        }
        game.piece = Piece {
            kind: PieceKind::I,
            rotation: 0,
            x: WELL_W - 4,
            y: WELL_H - 2,
        };
        game.lock_piece();
        assert_eq!(game.level(), 1);
        assert!(game.take_events().contains(&GameEvent::LevelUp));
        assert!((game.gravity_interval() - BASE_GRAVITY * GRAVITY_FACTOR).abs() < 1e-6);
        assert!(game.gravity_interval() < level_zero);
    }

    #[test]
    fn soft_drop_falls_faster_and_scores() {
        let mut soft = started();
        let mut idle = started();
        soft.piece = Piece::spawn(PieceKind::O);
        idle.piece = Piece::spawn(PieceKind::O);
        let start_y = soft.piece.y;

        for _ in 0..10 {
            soft.tick(&FrameInput::idle().with_held(Key::Down), SIM_DT);
            idle.tick(&FrameInput::idle(), SIM_DT);
        }
        let dropped = soft.piece.y - start_y;
        assert!(dropped >= 3);
        assert_eq!(idle.piece.y, start_y);
        // One point per row fallen under soft drop
        assert_eq!(soft.score(), dropped as u64);
        assert_eq!(idle.score(), 0);
    }

    #[test]
    fn held_left_auto_repeats() {
        let mut game = started();
        game.piece = Piece::spawn(PieceKind::O);
        let start_x = game.piece.x;
        game.tick(&FrameInput::idle().with_pressed(Key::Left), SIM_DT);
        assert_eq!(game.piece.x, start_x - 1);
        for _ in 0..30 {
            game.tick(&FrameInput::idle().with_held(Key::Left), SIM_DT);
        }
        assert_eq!(game.piece.x, 0);
    }
}
