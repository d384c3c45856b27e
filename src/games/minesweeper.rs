//! Minesweeper: 16x16 field with 40 mines, safe first click, chording

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors};
use crate::sim::{Cell, GameRng, Grid, Rect};

pub const SIZE: i32 = 16;
pub const MINES: usize = 40;
const CELL: f32 = 32.0;
const HEADER: f32 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cover {
    Hidden,
    Flagged,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub mine: bool,
    pub adjacent: u8,
    pub cover: Cover,
}

const EMPTY_TILE: Tile = Tile {
    mine: false,
    adjacent: 0,
    cover: Cover::Hidden,
};

pub struct Minesweeper {
    phase: Phase,
    rng: GameRng,
    field: Grid<Tile>,
    cursor: Cell,
    elapsed: f32,
    opened: usize,
    /// Mine that ended the run
    detonated: Option<Cell>,
    events: Vec<GameEvent>,
}

impl Minesweeper {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            field: Grid::new(SIZE, SIZE, EMPTY_TILE),
            cursor: (SIZE / 2, SIZE / 2),
            elapsed: 0.0,
            opened: 0,
            detonated: None,
            events: Vec::new(),
        }
    }

    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.field.get(cell).copied()
    }

    pub fn flags(&self) -> usize {
        self.field.values().filter(|t| t.cover == Cover::Flagged).count()
    }

    fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        let x = (pos.x / CELL).floor() as i32;
        let y = ((pos.y - HEADER) / CELL).floor() as i32;
        (pos.y >= HEADER && self.field.in_bounds((x, y))).then_some((x, y))
    }

    /// Lay mines anywhere except the first click and its neighbours
    fn place_mines(&mut self, safe: Cell) {
        let mut candidates: Vec<Cell> = self
            .field
            .iter()
            .map(|(c, _)| c)
            .filter(|&(x, y)| (x - safe.0).abs() > 1 || (y - safe.1).abs() > 1)
            .collect();
        self.rng.shuffle(&mut candidates);
        for &cell in candidates.iter().take(MINES) {
            if let Some(tile) = self.field.get_mut(cell) {
                tile.mine = true;
            }
        }
        let cells: Vec<Cell> = self.field.iter().map(|(c, _)| c).collect();
        for cell in cells {
            let count = self
                .field
                .neighbors8(cell)
                .filter(|n| self.field.get(*n).is_some_and(|t| t.mine))
                .count() as u8;
            if let Some(tile) = self.field.get_mut(cell) {
                tile.adjacent = count;
            }
        }
    }

    fn reveal(&mut self, start: Cell) {
        if self.phase == Phase::Ready {
            self.place_mines(start);
            self.phase = Phase::Playing;
        }
        match self.tile(start) {
            Some(t) if t.cover == Cover::Hidden => {}
            _ => return,
        }

        if self.tile(start).is_some_and(|t| t.mine) {
            self.explode(start);
            return;
        }

        // Flood fill through zero-count tiles
        let mut stack = vec![start];
        while let Some(cell) = stack.pop() {
            let Some(tile) = self.field.get_mut(cell) else {
                continue;
            };
            if tile.cover != Cover::Hidden || tile.mine {
                continue;
            }
            tile.cover = Cover::Open;
            self.opened += 1;
            if tile.adjacent == 0 {
                stack.extend(self.field.neighbors8(cell));
            }
        }
        self.events.push(GameEvent::Blip);

        if self.opened == (SIZE * SIZE) as usize - MINES {
            self.phase = Phase::Won;
            // Flag the remaining mines for the final board
            for tile in self.field.values_mut().filter(|t| t.mine) {
                tile.cover = Cover::Flagged;
            }
            self.events.push(GameEvent::Won);
        }
    }

    fn explode(&mut self, cell: Cell) {
        self.detonated = Some(cell);
        for tile in self.field.values_mut().filter(|t| t.mine) {
            tile.cover = Cover::Open;
        }
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::Explosion);
        self.events.push(GameEvent::GameOver);
    }

    fn toggle_flag(&mut self, cell: Cell) {
        if let Some(tile) = self.field.get_mut(cell) {
            tile.cover = match tile.cover {
                Cover::Hidden => Cover::Flagged,
                Cover::Flagged => Cover::Hidden,
                Cover::Open => return,
            };
            self.events.push(GameEvent::Blip);
        }
    }

    /// Open every unflagged neighbour of a satisfied number
    fn chord(&mut self, cell: Cell) {
        let Some(tile) = self.tile(cell) else {
            return;
        };
        if tile.cover != Cover::Open || tile.adjacent == 0 {
            return;
        }
        let neighbours: Vec<Cell> = self.field.neighbors8(cell).collect();
        let flagged = neighbours
            .iter()
            .filter(|n| self.tile(**n).is_some_and(|t| t.cover == Cover::Flagged))
            .count();
        if flagged != tile.adjacent as usize {
            return;
        }
        for n in neighbours {
            if self.phase != Phase::Playing {
                break;
            }
            self.reveal(n);
        }
    }

    fn open(&mut self, cell: Cell) {
        match self.tile(cell).map(|t| t.cover) {
            Some(Cover::Open) => self.chord(cell),
            Some(Cover::Hidden) => self.reveal(cell),
            _ => {}
        }
    }
}

impl ArcadeGame for Minesweeper {
    fn id(&self) -> GameId {
        GameId::Minesweeper
    }

    fn size(&self) -> Vec2 {
        Vec2::new(SIZE as f32 * CELL, SIZE as f32 * CELL + HEADER)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    /// Whole seconds on the clock
    fn score(&self) -> u64 {
        self.elapsed as u64
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![HudItem::new(
            "Mines",
            MINES as i64 - self.flags() as i64,
        )]
    }

    fn result(&self) -> Option<u64> {
        (self.phase == Phase::Won).then(|| self.score())
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Click any cell to start".to_string()),
            Phase::Won => Some(format!("Cleared in {}s! R to play again", self.score())),
            Phase::GameOver => Some("Boom. R to retry, Q for menu".to_string()),
            Phase::Playing => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        if self.phase.is_terminal() {
            return;
        }
        if self.phase == Phase::Playing {
            self.elapsed += dt;
        }

        if let Some(dir) = pressed_dir(input) {
            let next = dir.step(self.cursor);
            if self.field.in_bounds(next) {
                self.cursor = next;
            }
        }
        if let Some(pos) = input.pointer {
            if let Some(cell) = self.cell_at(pos) {
                self.cursor = cell;
            }
        }

        if let Some(cell) = input.primary_click().and_then(|p| self.cell_at(p)) {
            self.open(cell);
        } else if input.pressed(Key::Action) {
            self.open(self.cursor);
        }

        if self.phase == Phase::Playing {
            if let Some(cell) = input.secondary_click().and_then(|p| self.cell_at(p)) {
                self.toggle_flag(cell);
            } else if input.pressed(Key::Confirm) {
                self.toggle_flag(self.cursor);
            }
        }
    }

    fn draw(&self, scene: &mut Scene) {
        let width = SIZE as f32 * CELL;
        scene.rect(Rect::new(0.0, 0.0, width, HEADER), colors::PANEL);
        let remaining = MINES.saturating_sub(self.flags()) as u64;
        scene.digits(remaining, Vec2::new(12.0, 12.0), 5.0, colors::RED);
        scene.digits_centered(self.score(), Vec2::new(width - 60.0, HEADER / 2.0), 5.0, colors::YELLOW);

        for ((x, y), tile) in self.field.iter() {
            let rect = Rect::new(x as f32 * CELL, HEADER + y as f32 * CELL, CELL, CELL).inflate(-1.0);
            match tile.cover {
                Cover::Hidden => scene.rect(rect, colors::GRAY),
                Cover::Flagged => {
                    scene.rect(rect, colors::GRAY);
                    let c = rect.center();
                    scene.triangle(
                        c + Vec2::new(-6.0, -9.0),
                        c + Vec2::new(8.0, -4.0),
                        c + Vec2::new(-6.0, 1.0),
                        colors::RED,
                    );
                    scene.rect(Rect::new(c.x - 7.0, c.y - 9.0, 2.0, 18.0), colors::WHITE);
                }
                Cover::Open if tile.mine => {
                    let bg = if self.detonated == Some((x, y)) { colors::RED } else { colors::PANEL };
                    scene.rect(rect, bg);
                    scene.circle(rect.center(), CELL * 0.3, colors::WHITE);
                }
                Cover::Open => {
                    scene.rect(rect, colors::PANEL);
                    if tile.adjacent > 0 {
                        scene.digits_centered(tile.adjacent as u64, rect.center(), 4.0, number_color(tile.adjacent));
                    }
                }
            }
        }

        if self.phase == Phase::Playing || self.phase == Phase::Ready {
            let (x, y) = self.cursor;
            scene.rect_outline(
                Rect::new(x as f32 * CELL, HEADER + y as f32 * CELL, CELL, CELL),
                2.0,
                colors::YELLOW,
            );
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

fn number_color(n: u8) -> crate::renderer::Color {
    match n {
        1 => colors::BLUE,
        2 => colors::GREEN,
        3 => colors::RED,
        4 => colors::PURPLE,
        5 => colors::BROWN,
        6 => colors::TEAL,
        _ => colors::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PointerButton;

    fn click_pos((x, y): Cell) -> Vec2 {
        Vec2::new((x as f32 + 0.5) * CELL, HEADER + (y as f32 + 0.5) * CELL)
    }

    #[test]
    fn first_click_is_safe_and_opens_area() {
        for seed in 0..10 {
            let mut game = Minesweeper::new(seed);
            game.tick(&FrameInput::idle().with_click(click_pos((0, 0)), PointerButton::Primary), 0.016);
            assert_eq!(game.phase(), Phase::Playing);
            assert_eq!(game.field.values().filter(|t| t.mine).count(), MINES);
            let first = game.tile((0, 0)).unwrap();
            assert!(!first.mine);
            assert_eq!(first.adjacent, 0);
            assert!(game.opened > 1, "zero tile should flood");
        }
    }

    #[test]
    fn flags_toggle_and_block_reveal() {
        let mut game = Minesweeper::new(2);
        game.reveal((8, 8));
        let hidden = game
            .field
            .iter()
            .find(|(_, t)| t.cover == Cover::Hidden)
            .map(|(c, _)| c)
            .unwrap();
        game.tick(&FrameInput::idle().with_click(click_pos(hidden), PointerButton::Secondary), 0.016);
        assert_eq!(game.tile(hidden).unwrap().cover, Cover::Flagged);
        game.open(hidden);
        assert_eq!(game.tile(hidden).unwrap().cover, Cover::Flagged);
        game.toggle_flag(hidden);
        assert_eq!(game.tile(hidden).unwrap().cover, Cover::Hidden);
    }

    #[test]
    fn clicking_a_mine_ends_the_game() {
        let mut game = Minesweeper::new(5);
        game.reveal((8, 8));
        let mine = game.field.iter().find(|(_, t)| t.mine).map(|(c, _)| c).unwrap();
        game.open(mine);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.result(), None);
    }

    #[test]
    fn opening_every_safe_tile_wins() {
        let mut game = Minesweeper::new(9);
        game.reveal((3, 3));
        game.elapsed = 42.7;
        let safe: Vec<Cell> = game.field.iter().filter(|(_, t)| !t.mine).map(|(c, _)| c).collect();
        for cell in safe {
            game.reveal(cell);
        }
        assert_eq!(game.phase(), Phase::Won);
        assert_eq!(game.result(), Some(42));
    }

    #[test]
    fn chord_opens_neighbours_when_flags_match() {
        let mut game = Minesweeper::new(13);
        game.reveal((8, 8));
        // Find an open number whose mines we can flag
        let target = game
            .field
            .iter()
            .find(|(_, t)| t.cover == Cover::Open && t.adjacent > 0)
            .map(|(c, _)| c)
            .unwrap();
        let neighbours: Vec<Cell> = game.field.neighbors8(target).collect();
        for &n in &neighbours {
            if game.tile(n).unwrap().mine {
                game.toggle_flag(n);
            }
        }
        game.open(target);
        assert_eq!(game.phase(), Phase::Playing);
        for n in neighbours {
            let t = game.tile(n).unwrap();
            assert!(t.mine || t.cover == Cover::Open);
        }
    }
}
