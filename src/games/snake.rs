//! Snake on a 30x20 board

use glam::Vec2;
use std::collections::VecDeque;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir, start_pressed};
use crate::platform::FrameInput;
use crate::renderer::{Scene, colors};
use crate::sim::{Cell, Dir, GameRng, Rect};

pub const COLS: i32 = 30;
pub const ROWS: i32 = 20;
const CELL: f32 = 25.0;
const START_STEP: f32 = 0.12;
const MIN_STEP: f32 = 0.05;
const SPEEDUP: f32 = 0.9;
const FOODS_PER_SPEEDUP: u32 = 5;
const FOOD_POINTS: u64 = 10;
/// Turns queued ahead of movement
const TURN_BUFFER: usize = 2;

pub struct Snake {
    phase: Phase,
    rng: GameRng,
    /// Head first
    body: VecDeque<Cell>,
    dir: Dir,
    turns: VecDeque<Dir>,
    food: Option<Cell>,
    step_timer: f32,
    step_interval: f32,
    eaten: u32,
    score: u64,
    events: Vec<GameEvent>,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        let mid = (COLS / 2, ROWS / 2);
        let body: VecDeque<Cell> = (0..3).map(|i| (mid.0 - i, mid.1)).collect();
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            body,
            dir: Dir::Right,
            turns: VecDeque::new(),
            food: None,
            step_timer: 0.0,
            step_interval: START_STEP,
            eaten: 0,
            score: 0,
            events: Vec::new(),
        };
        game.food = game.spawn_food();
        game
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    fn spawn_food(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..ROWS)
            .flat_map(|y| (0..COLS).map(move |x| (x, y)))
            .filter(|c| !self.body.contains(c))
            .collect();
        self.rng.pick(&free).copied()
    }

    fn queue_turn(&mut self, dir: Dir) {
        let last = self.turns.back().copied().unwrap_or(self.dir);
        // No reversing into the neck, no duplicate turns
        if dir == last || dir == last.opposite() || self.turns.len() >= TURN_BUFFER {
            return;
        }
        self.turns.push_back(dir);
    }

    fn step(&mut self) {
        if let Some(turn) = self.turns.pop_front() {
            self.dir = turn;
        }
        let next = self.dir.step(self.head());
        let grows = self.food == Some(next);

        let out_of_bounds = next.0 < 0 || next.1 < 0 || next.0 >= COLS || next.1 >= ROWS;
        // The tail cell frees up this step unless we grow
        let body_len = if grows { self.body.len() } else { self.body.len() - 1 };
        let bites_self = self.body.iter().take(body_len).any(|&c| c == next);
        if out_of_bounds || bites_self {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }

        self.body.push_front(next);
        if !grows {
            self.body.pop_back();
            return;
        }

        self.eaten += 1;
        self.score += FOOD_POINTS;
        self.events.push(GameEvent::Score);
        if self.eaten % FOODS_PER_SPEEDUP == 0 {
            self.step_interval = (self.step_interval * SPEEDUP).max(MIN_STEP);
            self.events.push(GameEvent::LevelUp);
        }
        self.food = self.spawn_food();
        if self.food.is_none() {
            self.phase = Phase::Won;
            self.events.push(GameEvent::Won);
        }
    }
}

impl ArcadeGame for Snake {
    fn id(&self) -> GameId {
        GameId::Snake
    }

    fn size(&self) -> Vec2 {
        Vec2::new(COLS as f32 * CELL, ROWS as f32 * CELL)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Length", self.body.len()),
            HudItem::new("Speed", format!("{:.0}/s", 1.0 / self.step_interval)),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        let turn = pressed_dir(input);
        match self.phase {
            Phase::Ready => {
                if !start_pressed(input) && turn.is_none() {
                    return;
                }
                self.phase = Phase::Playing;
            }
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        if let Some(dir) = turn {
            self.queue_turn(dir);
        }

        self.step_timer += dt;
        while self.step_timer >= self.step_interval && self.phase == Phase::Playing {
            self.step_timer -= self.step_interval;
            self.step();
        }
    }

    fn draw(&self, scene: &mut Scene) {
        let size = self.size();
        scene.rect_outline(Rect::new(0.0, 0.0, size.x, size.y), 2.0, colors::DIM);

        if let Some((x, y)) = self.food {
            let center = Vec2::new((x as f32 + 0.5) * CELL, (y as f32 + 0.5) * CELL);
            scene.circle(center, CELL * 0.4, colors::RED);
        }

        for (i, &(x, y)) in self.body.iter().enumerate() {
            let color = if i == 0 { colors::LIME } else { colors::GREEN };
            scene.rect(
                Rect::new(x as f32 * CELL + 1.0, y as f32 * CELL + 1.0, CELL - 2.0, CELL - 2.0),
                color,
            );
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

    fn started(seed: u64) -> Snake {
        let mut game = Snake::new(seed);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), 0.0);
        game
    }

    #[test]
    fn food_spawns_off_body() {
        for seed in 0..20 {
            let game = Snake::new(seed);
            let food = game.food().unwrap();
            assert!(!game.body.contains(&food));
        }
    }

    #[test]
    fn cannot_reverse() {
        let mut game = started(1);
        game.tick(&FrameInput::idle().with_pressed(Key::Left), START_STEP);
        assert_eq!(game.dir, Dir::Right);
        assert_eq!(game.head(), (COLS / 2 + 1, ROWS / 2));
    }

    #[test]
    fn quick_double_turn_is_buffered() {
        let mut game = started(1);
        game.queue_turn(Dir::Up);
        game.queue_turn(Dir::Left);
        game.tick(&FrameInput::idle(), START_STEP);
        assert_eq!(game.dir, Dir::Up);
        game.tick(&FrameInput::idle(), START_STEP);
        assert_eq!(game.dir, Dir::Left);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut game = started(3);
        let ahead = Dir::Right.step(game.head());
        game.food = Some(ahead);
        game.tick(&FrameInput::idle(), START_STEP);
        assert_eq!(game.length(), 4);
        assert_eq!(game.score(), FOOD_POINTS);
        assert_ne!(game.food(), Some(ahead));
    }

    #[test]
    fn wall_ends_game() {
        let mut game = started(4);
        for _ in 0..COLS {
            game.tick(&FrameInput::idle(), START_STEP);
        }
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn every_fifth_food_speeds_up() {
        let mut game = started(6);
        for eaten in 1..=FOODS_PER_SPEEDUP {
            assert_eq!(game.step_interval, START_STEP);
            game.food = Some(Dir::Right.step(game.head()));
            game.tick(&FrameInput::idle(), START_STEP);
            assert_eq!(game.eaten, eaten);
        }
        assert_eq!(game.step_interval, START_STEP * SPEEDUP);
        assert!(game.take_events().contains(&GameEvent::LevelUp));
    }

    #[test]
    fn filling_the_board_wins() {
        let mut game = started(7);
        let last = (COLS - 1, ROWS - 1);
        let head = (COLS - 2, ROWS - 1);
        let mut body: VecDeque<Cell> = (0..ROWS)
            .flat_map(|y| (0..COLS).map(move |x| (x, y)))
            .filter(|&c| c != last && c != head)
            .collect();
        body.push_front(head);
        game.body = body;
        game.dir = Dir::Right;
        game.turns.clear();
        game.food = Some(last);
        game.take_events();

        game.tick(&FrameInput::idle(), START_STEP);
        assert_eq!(game.phase(), Phase::Won);
        assert_eq!(game.length(), (COLS * ROWS) as usize);
        assert_eq!(game.food(), None);
        assert!(game.take_events().contains(&GameEvent::Won));
    }

    #[test]
    fn moving_into_vacating_tail_is_safe() {
        let mut game = started(5);
        // Tight loop: turning down lands on the tail cell as it moves away
        game.body = VecDeque::from(vec![(5, 5), (6, 5), (6, 6), (5, 6)]);
        game.dir = Dir::Left;
        game.turns.clear();
        game.food = Some((0, 0));
        game.queue_turn(Dir::Down);
        game.tick(&FrameInput::idle(), START_STEP);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.head(), (5, 6));
    }
}
