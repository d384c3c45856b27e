//! 2048: slide and merge powers of two on a 4x4 board

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir, start_pressed};
use crate::platform::FrameInput;
use crate::renderer::{Color, Scene, colors, rgb};
use crate::sim::{Dir, GameRng, Grid, Rect};

pub const SIZE: i32 = 4;
const TILE: f32 = 110.0;
const GAP: f32 = 12.0;
const BOARD: f32 = SIZE as f32 * TILE + (SIZE + 1) as f32 * GAP;
const TARGET: u32 = 2048;
/// Probability a spawned tile is a 4
const FOUR_CHANCE: f32 = 0.1;
/// Seconds a freshly spawned or merged tile pulses
const POP_TIME: f32 = 0.12;

/// Slide one line toward index 0. Each tile merges at most once.
/// Returns the new line and the sum of merged values.
pub fn slide_line(line: [u32; 4]) -> ([u32; 4], u64) {
    let mut out = [0u32; 4];
    let mut gained = 0u64;
    let mut write = 0usize;
    let mut pending: Option<u32> = None;
    for value in line.into_iter().filter(|v| *v != 0) {
        match pending {
            Some(p) if p == value => {
                out[write] = p * 2;
                gained += u64::from(p * 2);
                write += 1;
                pending = None;
            }
            Some(p) => {
                out[write] = p;
                write += 1;
                pending = Some(value);
            }
            None => pending = Some(value),
        }
    }
    if let Some(p) = pending {
        out[write] = p;
    }
    (out, gained)
}

pub struct Twenty48 {
    phase: Phase,
    rng: GameRng,
    board: Grid<u32>,
    score: u64,
    moves: u32,
    /// Cells to pulse and remaining pulse time
    pops: Vec<((i32, i32), f32)>,
    events: Vec<GameEvent>,
}

impl Twenty48 {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            board: Grid::new(SIZE, SIZE, 0),
            score: 0,
            moves: 0,
            pops: Vec::new(),
            events: Vec::new(),
        };
        game.spawn_tile();
        game.spawn_tile();
        game.pops.clear();
        game
    }

    pub fn board(&self) -> &Grid<u32> {
        &self.board
    }

    pub fn best_tile(&self) -> u32 {
        self.board.values().copied().max().unwrap_or(0)
    }

    fn spawn_tile(&mut self) {
        let empty: Vec<_> = self
            .board
            .iter()
            .filter(|(_, v)| **v == 0)
            .map(|(cell, _)| cell)
            .collect();
        if let Some(&cell) = self.rng.pick(&empty) {
            let value = if self.rng.chance(FOUR_CHANCE) { 4 } else { 2 };
            self.board.set(cell, value);
            self.pops.push((cell, POP_TIME));
        }
    }

    /// Cells of line `i` ordered from the edge tiles slide toward
    fn line_cells(dir: Dir, i: i32) -> [(i32, i32); 4] {
        std::array::from_fn(|k| {
            let k = k as i32;
            match dir {
                Dir::Left => (k, i),
                Dir::Right => (SIZE - 1 - k, i),
                Dir::Up => (i, k),
                Dir::Down => (i, SIZE - 1 - k),
            }
        })
    }

    /// Apply a move; returns whether anything changed
    pub fn shift(&mut self, dir: Dir) -> bool {
        let mut changed = false;
        let mut gained = 0;
        for i in 0..SIZE {
            let cells = Self::line_cells(dir, i);
            let line = cells.map(|c| self.board.get(c).copied().unwrap_or(0));
            let (slid, points) = slide_line(line);
            if slid != line {
                changed = true;
                for (cell, value) in cells.iter().zip(slid) {
                    self.board.set(*cell, value);
                }
            }
            if points > 0 {
                // Merged cells are the ones that grew
                for (k, cell) in cells.iter().enumerate() {
                    if slid[k] != 0 && !line.contains(&slid[k]) {
                        self.pops.push((*cell, POP_TIME));
                    }
                }
            }
            gained += points;
        }
        self.score += gained;
        changed
    }

    fn has_moves(&self) -> bool {
        self.board.iter().any(|(cell, v)| {
            *v == 0
                || [Dir::Right, Dir::Down]
                    .iter()
                    .any(|d| self.board.get(d.step(cell)) == Some(v))
        })
    }

    fn tile_color(value: u32) -> Color {
        match value {
            2 => rgb(0xEEE4DA),
            4 => rgb(0xEDE0C8),
            8 => rgb(0xF2B179),
            16 => rgb(0xF59563),
            32 => rgb(0xF67C5F),
            64 => rgb(0xF65E3B),
            128..=512 => rgb(0xEDCC61),
            1024 | 2048 => rgb(0xEDC22E),
            _ => colors::PURPLE,
        }
    }
}

impl ArcadeGame for Twenty48 {
    fn id(&self) -> GameId {
        GameId::Twenty48
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(BOARD)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Moves", self.moves),
            HudItem::new("Best tile", self.best_tile()),
        ]
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Arrow keys to slide".to_string()),
            Phase::Won => Some(format!("{TARGET}! R to play again")),
            Phase::GameOver => Some("No moves left. R to retry".to_string()),
            Phase::Playing => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        self.pops.retain_mut(|(_, t)| {
            *t -= dt;
            *t > 0.0
        });

        let dir = pressed_dir(input);
        match self.phase {
            Phase::Ready if start_pressed(input) || dir.is_some() => self.phase = Phase::Playing,
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        let Some(dir) = dir else {
            return;
        };
        let before = self.score;
        if !self.shift(dir) {
            return;
        }
        self.moves += 1;
        self.events.push(if self.score > before {
            GameEvent::Score
        } else {
            GameEvent::Blip
        });
        self.spawn_tile();

        if self.best_tile() >= TARGET {
            self.phase = Phase::Won;
            self.events.push(GameEvent::Won);
        } else if !self.has_moves() {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    fn draw(&self, scene: &mut Scene) {
        scene.rect(Rect::new(0.0, 0.0, BOARD, BOARD), rgb(0xBBADA0));
        for (cell, value) in self.board.iter() {
            let origin = Vec2::new(
                GAP + cell.0 as f32 * (TILE + GAP),
                GAP + cell.1 as f32 * (TILE + GAP),
            );
            let slot = Rect::new(origin.x, origin.y, TILE, TILE);
            if *value == 0 {
                scene.rect(slot, rgb(0xCDC1B4));
                continue;
            }
            let pulse = self
                .pops
                .iter()
                .find(|(c, _)| *c == cell)
                .map_or(0.0, |(_, t)| t / POP_TIME * 6.0);
            scene.rect(slot.inflate(pulse), Self::tile_color(*value));
            let ink = if *value <= 4 { rgb(0x776E65) } else { colors::WHITE };
            let pixel = if *value >= 1024 { 5.0 } else { 7.0 };
            scene.digits_centered(u64::from(*value), slot.center(), pixel, ink);
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Key;
    use proptest::prelude::*;

    fn with_board(rows: [[u32; 4]; 4]) -> Twenty48 {
        let mut game = Twenty48::new(1);
        game.board = Grid::from_rows(rows.iter().map(|r| r.to_vec()).collect());
        game.phase = Phase::Playing;
        game
    }

    #[test]
    fn merges_once_per_move() {
        assert_eq!(slide_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
        assert_eq!(slide_line([4, 4, 8, 0]), ([8, 8, 0, 0], 8));
        assert_eq!(slide_line([0, 2, 0, 2]), ([4, 0, 0, 0], 4));
        assert_eq!(slide_line([2, 4, 2, 4]), ([2, 4, 2, 4], 0));
    }

    #[test]
    fn starts_with_two_tiles() {
        let game = Twenty48::new(9);
        assert_eq!(game.board().values().filter(|v| **v != 0).count(), 2);
    }

    #[test]
    fn no_spawn_without_change() {
        let mut game = with_board([[2, 0, 0, 0], [4, 0, 0, 0], [0; 4], [0; 4]]);
        game.tick(&FrameInput::idle().with_pressed(Key::Left), 0.016);
        assert_eq!(game.board().values().filter(|v| **v != 0).count(), 2);
        game.tick(&FrameInput::idle().with_pressed(Key::Right), 0.016);
        assert_eq!(game.board().values().filter(|v| **v != 0).count(), 3);
    }

    #[test]
    fn right_slide_merges_toward_edge() {
        let mut game = with_board([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(game.shift(Dir::Right));
        assert_eq!(game.board().row(0), &[0, 0, 4, 4]);
        assert_eq!(game.score(), 4);
    }

    #[test]
    fn reaching_target_wins() {
        let mut game = with_board([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        game.tick(&FrameInput::idle().with_pressed(Key::Left), 0.016);
        assert_eq!(game.phase(), Phase::Won);
        assert_eq!(game.score(), 2048);
    }

    #[test]
    fn locked_board_ends() {
        let mut game = with_board([[2, 4, 2, 4], [4, 2, 4, 2], [8, 4, 2, 4], [16, 8, 16, 0]]);
        // The spawn lands in the corner and neither a 2 nor a 4 can merge there
        game.tick(&FrameInput::idle().with_pressed(Key::Right), 0.016);
        assert_eq!(game.board().row(3)[1..], [16, 8, 16]);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    proptest! {
        #[test]
        fn slide_conserves_sum(line in prop::array::uniform4(prop_oneof![Just(0u32), Just(2), Just(4), Just(8), Just(16)])) {
            let (out, gained) = slide_line(line);
            prop_assert_eq!(out.iter().sum::<u32>(), line.iter().sum::<u32>());
            prop_assert_eq!(gained % 2, 0);
            // Tiles pack toward index 0
            let first_zero = out.iter().position(|v| *v == 0).unwrap_or(4);
            prop_assert!(out[first_zero..].iter().all(|v| *v == 0));
        }
    }
}
