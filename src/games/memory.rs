//! Memory Match: find the eight pairs on a face-down 4x4 board

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Color, Scene, colors};
use crate::sim::{Cell, GameRng, Grid, Rect};

pub const SIZE: i32 = 4;
const PAIRS: usize = (SIZE * SIZE / 2) as usize;
const CARD: f32 = 110.0;
const GAP: f32 = 14.0;
const BOARD: f32 = SIZE as f32 * (CARD + GAP) + GAP;
/// Seconds a mismatched pair stays face up
const MISMATCH_DELAY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Card {
    symbol: u8,
    face_up: bool,
    matched: bool,
}

pub struct Memory {
    phase: Phase,
    cards: Grid<Card>,
    /// Face-up unmatched cards of the current move
    picks: Vec<Cell>,
    /// Countdown before a mismatched pair flips back
    hide_timer: Option<f32>,
    cursor: Cell,
    moves: u64,
    elapsed: f32,
    events: Vec<GameEvent>,
}

impl Memory {
    pub fn new(seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let mut symbols: Vec<u8> = (0..PAIRS as u8).flat_map(|s| [s, s]).collect();
        rng.shuffle(&mut symbols);
        let rows = symbols
            .chunks(SIZE as usize)
            .map(|row| {
                row.iter()
                    .map(|&symbol| Card {
                        symbol,
                        face_up: false,
                        matched: false,
                    })
                    .collect()
            })
            .collect();
        Self {
            phase: Phase::Ready,
            cards: Grid::from_rows(rows),
            picks: Vec::with_capacity(2),
            hide_timer: None,
            cursor: (0, 0),
            moves: 0,
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.values().filter(|c| c.matched).count() / 2
    }

    fn card_rect((x, y): Cell) -> Rect {
        Rect::new(
            GAP + x as f32 * (CARD + GAP),
            GAP + y as f32 * (CARD + GAP),
            CARD,
            CARD,
        )
    }

    fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        self.cards
            .iter()
            .map(|(cell, _)| cell)
            .find(|cell| Self::card_rect(*cell).contains(pos))
    }

    fn flip(&mut self, cell: Cell) {
        if self.hide_timer.is_some() {
            return;
        }
        let Some(card) = self.cards.get_mut(cell) else {
            return;
        };
        if card.face_up || card.matched {
            return;
        }
        card.face_up = true;
        self.picks.push(cell);
        self.events.push(GameEvent::Blip);

        if let &[a, b] = self.picks.as_slice() {
            self.moves += 1;
            let same = self.cards.get(a).map(|c| c.symbol) == self.cards.get(b).map(|c| c.symbol);
            if same {
                for cell in [a, b] {
                    if let Some(card) = self.cards.get_mut(cell) {
                        card.matched = true;
                    }
                }
                self.picks.clear();
                self.events.push(GameEvent::Score);
                if self.matched_pairs() == PAIRS {
                    self.phase = Phase::Won;
                    self.events.push(GameEvent::Won);
                }
            } else {
                self.hide_timer = Some(MISMATCH_DELAY);
            }
        }
    }

    fn hide_picks(&mut self) {
        for cell in self.picks.drain(..) {
            if let Some(card) = self.cards.get_mut(cell) {
                card.face_up = false;
            }
        }
        self.hide_timer = None;
    }

    fn symbol_color(symbol: u8) -> Color {
        [
            colors::RED,
            colors::ORANGE,
            colors::YELLOW,
            colors::LIME,
            colors::TEAL,
            colors::BLUE,
            colors::PURPLE,
            colors::PINK,
        ][symbol as usize % PAIRS]
    }

    fn draw_symbol(scene: &mut Scene, symbol: u8, center: Vec2) {
        let color = Self::symbol_color(symbol);
        let r = CARD * 0.3;
        // Shape and colour both encode the symbol
        match symbol % 4 {
            0 => scene.circle(center, r, color),
            1 => scene.rect(Rect::from_center(center, Vec2::splat(r * 1.6)), color),
            2 => scene.triangle(
                center + Vec2::new(0.0, -r),
                center + Vec2::new(r, r * 0.8),
                center + Vec2::new(-r, r * 0.8),
                color,
            ),
            _ => scene.ring(center, r * 0.5, r, color),
        }
        if symbol >= 4 {
            scene.circle(center, r * 0.25, colors::WHITE);
        }
    }
}

impl ArcadeGame for Memory {
    fn id(&self) -> GameId {
        GameId::Memory
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(BOARD)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.moves
    }

    fn result(&self) -> Option<u64> {
        (self.phase == Phase::Won).then_some(self.moves)
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Pairs", format!("{}/{PAIRS}", self.matched_pairs())),
            HudItem::new("Time", self.elapsed as u32),
        ]
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Click a card to begin".to_string()),
            Phase::Won => Some(format!("All pairs in {} moves! R to play again", self.moves)),
            _ => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        let dir = pressed_dir(input);
        match self.phase {
            Phase::Ready if start_pressed(input) || dir.is_some() => self.phase = Phase::Playing,
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }
        self.elapsed += dt;

        if let Some(timer) = &mut self.hide_timer {
            *timer -= dt;
        }
        if self.hide_timer.is_some_and(|t| t <= 0.0) {
            self.hide_picks();
        }

        if let Some(dir) = dir {
            let next = dir.step(self.cursor);
            if self.cards.in_bounds(next) {
                self.cursor = next;
            }
        }
        if let Some(cell) = input.pointer.and_then(|p| self.cell_at(p)) {
            self.cursor = cell;
        }

        if let Some(cell) = input.primary_click().and_then(|p| self.cell_at(p)) {
            self.flip(cell);
        } else if input.pressed(Key::Action) || input.pressed(Key::Confirm) {
            self.flip(self.cursor);
        }
    }

    fn draw(&self, scene: &mut Scene) {
        for (cell, card) in self.cards.iter() {
            let rect = Self::card_rect(cell);
            if card.face_up || card.matched {
                scene.rect(rect, if card.matched { colors::PANEL } else { colors::NAVY });
                Self::draw_symbol(scene, card.symbol, rect.center());
            } else {
                scene.rect(rect, colors::BLUE);
                scene.rect_outline(rect.inflate(-8.0), 2.0, colors::NAVY);
            }
        }
        if self.phase != Phase::Won {
            scene.rect_outline(Self::card_rect(self.cursor).inflate(4.0), 3.0, colors::YELLOW);
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn playing() -> Memory {
        let mut game = Memory::new(5);
        game.phase = Phase::Playing;
        game
    }

    /// Two cells holding the same symbol, and one holding another
    fn pair_and_other(game: &Memory) -> (Cell, Cell, Cell) {
        let cells: Vec<_> = game.cards.iter().map(|(c, card)| (c, card.symbol)).collect();
        let (a, sym) = cells[0];
        let b = cells.iter().skip(1).find(|(_, s)| *s == sym).map(|(c, _)| *c).unwrap();
        let other = cells.iter().find(|(_, s)| *s != sym).map(|(c, _)| *c).unwrap();
        (a, b, other)
    }

    #[test]
    fn deck_has_eight_pairs() {
        let game = Memory::new(1);
        for symbol in 0..PAIRS as u8 {
            assert_eq!(game.cards.values().filter(|c| c.symbol == symbol).count(), 2);
        }
    }

    #[test]
    fn matching_pair_stays_up() {
        let mut game = playing();
        let (a, b, _) = pair_and_other(&game);
        game.flip(a);
        game.flip(b);
        assert_eq!(game.moves(), 1);
        assert_eq!(game.matched_pairs(), 1);
        assert!(game.hide_timer.is_none());
    }

    #[test]
    fn mismatch_flips_back_after_delay() {
        let mut game = playing();
        let (a, _, other) = pair_and_other(&game);
        game.flip(a);
        game.flip(other);
        assert_eq!(game.moves(), 1);
        // Board is locked while the pair is showing
        let (_, b, _) = pair_and_other(&game);
        game.flip(b);
        assert_eq!(game.picks.len(), 2);

        for _ in 0..(MISMATCH_DELAY / DT) as usize + 2 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert!(game.picks.is_empty());
        assert!(!game.cards.get(a).unwrap().face_up);
        assert!(!game.cards.get(other).unwrap().face_up);
    }

    #[test]
    fn flipping_same_card_twice_is_ignored() {
        let mut game = playing();
        game.flip((0, 0));
        game.flip((0, 0));
        assert_eq!(game.picks.len(), 1);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn clearing_board_wins_with_moves_as_result() {
        let mut game = playing();
        for symbol in 0..PAIRS as u8 {
            let cells: Vec<_> = game
                .cards
                .iter()
                .filter(|(_, c)| c.symbol == symbol)
                .map(|(c, _)| c)
                .collect();
            game.flip(cells[0]);
            game.flip(cells[1]);
        }
        assert_eq!(game.phase(), Phase::Won);
        assert_eq!(game.result(), Some(PAIRS as u64));
    }

    #[test]
    fn no_result_before_winning() {
        let mut game = playing();
        game.flip((0, 0));
        assert_eq!(game.result(), None);
    }
}
