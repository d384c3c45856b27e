//! Lights Out: switch every light off with as few presses as possible

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors, with_alpha};
use crate::sim::{Cell, GameRng, Grid, Rect};

pub const SIZE: i32 = 5;
const CELL: f32 = 100.0;
const GAP: f32 = 10.0;
const BOARD: f32 = SIZE as f32 * (CELL + GAP) + GAP;
/// Random presses used to scramble the solved board
const SCRAMBLE_PRESSES: usize = 12;

/// Toggle `cell` and its orthogonal neighbours
pub fn toggle_plus(lights: &mut Grid<bool>, cell: Cell) {
    if !lights.in_bounds(cell) {
        return;
    }
    let neighbors: Vec<Cell> = lights.neighbors4(cell).collect();
    for c in std::iter::once(cell).chain(neighbors) {
        if let Some(light) = lights.get_mut(c) {
            *light = !*light;
        }
    }
}

pub struct LightsOut {
    phase: Phase,
    lights: Grid<bool>,
    /// Presses that generated this puzzle; replaying them solves it
    scramble: Vec<Cell>,
    cursor: Cell,
    presses: u64,
    events: Vec<GameEvent>,
}

impl LightsOut {
    pub fn new(seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let mut cells: Vec<Cell> = (0..SIZE).flat_map(|y| (0..SIZE).map(move |x| (x, y))).collect();
        let mut lights = Grid::new(SIZE, SIZE, false);
        let mut scramble = Vec::new();
        // Distinct presses can still cancel out into a dark board
        while lights.values().all(|on| !on) {
            rng.shuffle(&mut cells);
            lights.fill(false);
            scramble = cells[..SCRAMBLE_PRESSES].to_vec();
            for &cell in &scramble {
                toggle_plus(&mut lights, cell);
            }
        }
        Self {
            phase: Phase::Ready,
            lights,
            scramble,
            cursor: (SIZE / 2, SIZE / 2),
            presses: 0,
            events: Vec::new(),
        }
    }

    pub fn lights_on(&self) -> usize {
        self.lights.values().filter(|on| **on).count()
    }

    pub fn presses(&self) -> u64 {
        self.presses
    }

    fn cell_rect((x, y): Cell) -> Rect {
        Rect::new(
            GAP + x as f32 * (CELL + GAP),
            GAP + y as f32 * (CELL + GAP),
            CELL,
            CELL,
        )
    }

    fn cell_at(pos: Vec2) -> Option<Cell> {
        let x = ((pos.x - GAP) / (CELL + GAP)).floor() as i32;
        let y = ((pos.y - GAP) / (CELL + GAP)).floor() as i32;
        ((0..SIZE).contains(&x) && (0..SIZE).contains(&y) && Self::cell_rect((x, y)).contains(pos))
            .then_some((x, y))
    }

    pub fn press(&mut self, cell: Cell) {
        if self.phase != Phase::Playing || !self.lights.in_bounds(cell) {
            return;
        }
        toggle_plus(&mut self.lights, cell);
        self.presses += 1;
        self.events.push(GameEvent::Blip);
        if self.lights_on() == 0 {
            self.phase = Phase::Won;
            self.events.push(GameEvent::Won);
        }
    }
}

impl ArcadeGame for LightsOut {
    fn id(&self) -> GameId {
        GameId::LightsOut
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(BOARD)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.presses
    }

    fn result(&self) -> Option<u64> {
        (self.phase == Phase::Won).then_some(self.presses)
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Lit", self.lights_on()),
            HudItem::new("Par", self.scramble.len()),
        ]
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Turn every light off. Click to begin".to_string()),
            Phase::Won => Some(format!("Lights out in {} presses!", self.presses)),
            _ => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, _dt: f32) {
        let dir = pressed_dir(input);
        match self.phase {
            Phase::Ready if start_pressed(input) || dir.is_some() => self.phase = Phase::Playing,
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        if let Some(dir) = dir {
            let next = dir.step(self.cursor);
            if self.lights.in_bounds(next) {
                self.cursor = next;
            }
        }
        if let Some(cell) = input.pointer.and_then(Self::cell_at) {
            self.cursor = cell;
        }

        if let Some(cell) = input.primary_click().and_then(Self::cell_at) {
            self.press(cell);
        } else if input.pressed(Key::Action) || input.pressed(Key::Confirm) {
            self.press(self.cursor);
        }
    }

    fn draw(&self, scene: &mut Scene) {
        for (cell, on) in self.lights.iter() {
            let rect = Self::cell_rect(cell);
            if *on {
                scene.rect(rect.inflate(4.0), with_alpha(colors::YELLOW, 0.3));
                scene.rect(rect, colors::YELLOW);
            } else {
                scene.rect(rect, colors::PANEL);
            }
        }
        if self.phase == Phase::Playing {
            scene.rect_outline(Self::cell_rect(self.cursor).inflate(3.0), 3.0, colors::TEAL);
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PointerButton;
    use proptest::prelude::*;

    #[test]
    fn corner_press_toggles_three() {
        let mut lights = Grid::new(SIZE, SIZE, false);
        toggle_plus(&mut lights, (0, 0));
        assert_eq!(lights.values().filter(|on| **on).count(), 3);
        toggle_plus(&mut lights, (2, 2));
        assert_eq!(lights.values().filter(|on| **on).count(), 8);
    }

    #[test]
    fn replaying_scramble_solves() {
        let mut game = LightsOut::new(4);
        game.phase = Phase::Playing;
        let moves = game.scramble.clone();
        for cell in moves {
            if game.phase() == Phase::Playing {
                game.press(cell);
            }
        }
        assert_eq!(game.phase(), Phase::Won);
        assert!(game.result().is_some_and(|p| p <= SCRAMBLE_PRESSES as u64));
    }

    #[test]
    fn click_presses_cell_under_pointer() {
        let mut game = LightsOut::new(6);
        game.phase = Phase::Playing;
        let before = game.lights.clone();
        let center = LightsOut::cell_rect((1, 3)).center();
        game.tick(&FrameInput::idle().with_click(center, PointerButton::Primary), 0.016);
        assert_eq!(game.presses(), 1);
        let mut expected = before;
        toggle_plus(&mut expected, (1, 3));
        assert_eq!(game.lights, expected);
    }

    #[test]
    fn gaps_between_cells_are_dead() {
        assert_eq!(LightsOut::cell_at(Vec2::new(GAP / 2.0, 50.0)), None);
        assert_eq!(LightsOut::cell_at(Vec2::new(GAP + 1.0, GAP + 1.0)), Some((0, 0)));
    }

    #[test]
    fn unsolved_has_no_result() {
        let game = LightsOut::new(2);
        assert!(game.lights_on() > 0);
        assert_eq!(game.result(), None);
    }

    proptest! {
        #[test]
        fn every_seed_starts_lit(seed in any::<u64>()) {
            let game = LightsOut::new(seed);
            prop_assert!(game.lights_on() > 0);
        }

        #[test]
        fn pressing_twice_is_identity(x in 0..SIZE, y in 0..SIZE) {
            let mut lights = Grid::new(SIZE, SIZE, false);
            toggle_plus(&mut lights, (x, y));
            toggle_plus(&mut lights, (x, y));
            prop_assert!(lights.values().all(|on| !on));
        }
    }
}
