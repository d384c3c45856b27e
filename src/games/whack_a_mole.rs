//! Whack-a-Mole: thirty seconds of bonking moles and dodging bombs

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors, with_alpha};
use crate::sim::{GameRng, Rect};

const SIZE: f32 = 540.0;
const HOLES: usize = 9;
const HOLE_SPACING: f32 = 160.0;
const HOLE_RADIUS: f32 = 56.0;
pub const ROUND_TIME: f32 = 30.0;
/// Up-time at the start and end of the round
const UP_TIME_START: f32 = 1.3;
const UP_TIME_END: f32 = 0.55;
const SPAWN_START: f32 = 0.9;
const SPAWN_END: f32 = 0.4;
const GOLDEN_CHANCE: f32 = 0.1;
const BOMB_CHANCE: f32 = 0.12;
const BONK_TIME: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleKind {
    Normal,
    Golden,
    Bomb,
}

impl MoleKind {
    /// Points gained (or lost) for a whack
    fn value(self) -> i64 {
        match self {
            MoleKind::Normal => 10,
            MoleKind::Golden => 50,
            MoleKind::Bomb => -25,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Mole {
    kind: MoleKind,
    /// Seconds left above ground
    timer: f32,
    up_time: f32,
    /// Set once whacked; counts the bonk animation down
    bonked: Option<f32>,
}

pub struct WhackAMole {
    phase: Phase,
    rng: GameRng,
    holes: [Option<Mole>; HOLES],
    time_left: f32,
    spawn_timer: f32,
    score: u64,
    whacked: u32,
    events: Vec<GameEvent>,
}

fn hole_center(index: usize) -> Vec2 {
    let (x, y) = ((index % 3) as f32, (index / 3) as f32);
    Vec2::new(SIZE / 2.0 + (x - 1.0) * HOLE_SPACING, SIZE / 2.0 + 20.0 + (y - 1.0) * HOLE_SPACING)
}

impl WhackAMole {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            holes: [None; HOLES],
            time_left: ROUND_TIME,
            spawn_timer: 0.5,
            score: 0,
            whacked: 0,
            events: Vec::new(),
        }
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// 0 at the start of the round, 1 at the end
    fn progress(&self) -> f32 {
        (1.0 - self.time_left / ROUND_TIME).clamp(0.0, 1.0)
    }

    fn up_time(&self) -> f32 {
        UP_TIME_START + (UP_TIME_END - UP_TIME_START) * self.progress()
    }

    fn spawn_interval(&self) -> f32 {
        SPAWN_START + (SPAWN_END - SPAWN_START) * self.progress()
    }

    fn spawn(&mut self) {
        let free: Vec<usize> = (0..HOLES).filter(|i| self.holes[*i].is_none()).collect();
        let Some(&hole) = self.rng.pick(&free) else {
            return;
        };
        let kind = if self.rng.chance(GOLDEN_CHANCE) {
            MoleKind::Golden
        } else if self.rng.chance(BOMB_CHANCE) {
            MoleKind::Bomb
        } else {
            MoleKind::Normal
        };
        let up_time = match kind {
            // Golden moles duck fast
            MoleKind::Golden => self.up_time() * 0.6,
            _ => self.up_time(),
        };
        self.holes[hole] = Some(Mole {
            kind,
            timer: up_time,
            up_time,
            bonked: None,
        });
    }

    fn hole_at(pos: Vec2) -> Option<usize> {
        (0..HOLES).find(|&i| pos.distance(hole_center(i)) <= HOLE_RADIUS)
    }

    /// Digits 1-9 map onto the holes like a phone keypad
    fn hole_for_key(input: &FrameInput) -> Option<usize> {
        input.pressed_keys().iter().find_map(|k| match k {
            Key::Digit(n @ 1..=9) => Some(*n as usize - 1),
            _ => None,
        })
    }

    fn whack(&mut self, hole: usize) {
        let Some(mole) = self.holes[hole].as_mut().filter(|m| m.bonked.is_none()) else {
            return;
        };
        mole.bonked = Some(BONK_TIME);
        let value = mole.kind.value();
        if value >= 0 {
            self.score += value as u64;
            self.whacked += 1;
        } else {
            self.score = self.score.saturating_sub(value.unsigned_abs());
        }
        self.events.push(match mole.kind {
            MoleKind::Normal => GameEvent::Hit,
            MoleKind::Golden => GameEvent::PowerUp,
            MoleKind::Bomb => GameEvent::Explosion,
        });
    }
}

impl ArcadeGame for WhackAMole {
    fn id(&self) -> GameId {
        GameId::WhackAMole
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(SIZE)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Time", self.time_left.ceil() as u32),
            HudItem::new("Whacked", self.whacked),
        ]
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Click moles or press 1-9. Avoid bombs!".to_string()),
            Phase::GameOver => Some(format!("Time! {} points. R to play again", self.score)),
            _ => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        match self.phase {
            Phase::Ready if start_pressed(input) => {
                self.phase = Phase::Playing;
                return;
            }
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        self.time_left -= dt;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }

        for slot in &mut self.holes {
            let Some(mole) = slot else {
                continue;
            };
            let gone = match &mut mole.bonked {
                Some(t) => {
                    *t -= dt;
                    *t <= 0.0
                }
                None => {
                    mole.timer -= dt;
                    mole.timer <= 0.0
                }
            };
            if gone {
                *slot = None;
            }
        }

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn();
            self.spawn_timer = self.spawn_interval() * self.rng.range_f32(0.7, 1.3);
        }

        if let Some(hole) = input.primary_click().and_then(Self::hole_at) {
            self.whack(hole);
        }
        if let Some(hole) = Self::hole_for_key(input) {
            self.whack(hole);
        }
    }

    fn draw(&self, scene: &mut Scene) {
        scene.set_background(colors::GREEN);
        // Time bar
        let frac = self.time_left / ROUND_TIME;
        scene.rect(Rect::new(20.0, 16.0, SIZE - 40.0, 14.0), colors::PANEL);
        scene.rect(Rect::new(20.0, 16.0, (SIZE - 40.0) * frac, 14.0), colors::YELLOW);

        for (i, slot) in self.holes.iter().enumerate() {
            let center = hole_center(i);
            scene.circle(center + Vec2::new(0.0, 20.0), HOLE_RADIUS, colors::BROWN);
            scene.circle(center + Vec2::new(0.0, 24.0), HOLE_RADIUS - 10.0, colors::BACKGROUND);
            let Some(mole) = slot else {
                continue;
            };
            // Rise then sink over the mole's lifetime
            let t = 1.0 - mole.timer / mole.up_time;
            let rise = (t * std::f32::consts::PI).sin().clamp(0.0, 1.0).max(0.5);
            let head = center + Vec2::new(0.0, 20.0 - 36.0 * rise);
            let body = match mole.kind {
                MoleKind::Normal => colors::BROWN,
                MoleKind::Golden => colors::YELLOW,
                MoleKind::Bomb => colors::GRAY,
            };
            if mole.bonked.is_some() {
                scene.circle(head, 40.0, with_alpha(body, 0.5));
                scene.line(head + Vec2::new(-14.0, -4.0), head + Vec2::new(-4.0, -4.0), 3.0, colors::WHITE);
                scene.line(head + Vec2::new(4.0, -4.0), head + Vec2::new(14.0, -4.0), 3.0, colors::WHITE);
                continue;
            }
            scene.circle(head, 40.0, body);
            if mole.kind == MoleKind::Bomb {
                scene.line(head + Vec2::new(20.0, -30.0), head + Vec2::new(30.0, -44.0), 4.0, colors::ORANGE);
            } else {
                scene.circle(head + Vec2::new(-13.0, -8.0), 5.0, colors::BACKGROUND);
                scene.circle(head + Vec2::new(13.0, -8.0), 5.0, colors::BACKGROUND);
                scene.circle(head + Vec2::new(0.0, 6.0), 7.0, colors::PINK);
            }
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

    const DT: f32 = 1.0 / 60.0;

    fn playing() -> WhackAMole {
        let mut game = WhackAMole::new(8);
        game.phase = Phase::Playing;
        game
    }

    fn place(game: &mut WhackAMole, hole: usize, kind: MoleKind) {
        game.holes[hole] = Some(Mole {
            kind,
            timer: 1.0,
            up_time: 1.0,
            bonked: None,
        });
    }

    #[test]
    fn clicking_a_mole_scores() {
        let mut game = playing();
        place(&mut game, 4, MoleKind::Normal);
        game.tick(&FrameInput::idle().with_click(hole_center(4), PointerButton::Primary), DT);
        assert_eq!(game.score(), 10);
        // Bonked moles can't be hit twice
        game.tick(&FrameInput::idle().with_pressed(Key::Digit(5)), DT);
        assert_eq!(game.score(), 10);
    }

    #[test]
    fn golden_pays_more_and_bombs_cost() {
        let mut game = playing();
        place(&mut game, 0, MoleKind::Golden);
        place(&mut game, 8, MoleKind::Bomb);
        game.tick(&FrameInput::idle().with_pressed(Key::Digit(1)), DT);
        assert_eq!(game.score(), 50);
        game.tick(&FrameInput::idle().with_pressed(Key::Digit(9)), DT);
        assert_eq!(game.score(), 25);
    }

    #[test]
    fn bombs_never_go_negative() {
        let mut game = playing();
        place(&mut game, 2, MoleKind::Bomb);
        game.whack(2);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn unwhacked_moles_duck() {
        let mut game = playing();
        game.spawn_timer = f32::MAX;
        place(&mut game, 3, MoleKind::Normal);
        for _ in 0..70 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert!(game.holes[3].is_none());
    }

    #[test]
    fn up_time_shrinks() {
        let mut game = playing();
        let early = game.up_time();
        game.time_left = 2.0;
        assert!(game.up_time() < early);
        assert!(game.spawn_interval() < SPAWN_START);
    }

    #[test]
    fn round_ends_after_thirty_seconds() {
        let mut game = playing();
        for _ in 0..(ROUND_TIME / DT) as usize + 2 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.time_left(), 0.0);
    }
}
