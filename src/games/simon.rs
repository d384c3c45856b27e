//! Simon: repeat a growing sequence of pad flashes

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir, start_pressed};
use crate::platform::FrameInput;
use crate::renderer::{Color, Scene, colors, with_alpha};
use crate::sim::{Dir, GameRng};

const SIZE: f32 = 520.0;
const CENTER: Vec2 = Vec2::new(SIZE / 2.0, SIZE / 2.0);
const PAD_RADIUS: f32 = 80.0;
/// Distance from the centre to each pad
const PAD_OFFSET: f32 = 150.0;
/// Pause before a playback starts
const LEAD_IN: f32 = 0.8;
const GAP_TIME: f32 = 0.15;
const PRESS_FLASH: f32 = 0.25;
/// Seconds the player has to press each pad
const INPUT_TIMEOUT: f32 = 5.0;

/// Pads in clockwise order starting at the top, matching the arrow keys
const PADS: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

fn pad_center(pad: usize) -> Vec2 {
    let (dx, dy) = PADS[pad].delta();
    CENTER + Vec2::new(dx as f32, dy as f32) * PAD_OFFSET
}

fn pad_color(pad: usize) -> Color {
    [colors::GREEN, colors::RED, colors::YELLOW, colors::BLUE][pad]
}

/// Seconds each pad stays lit during playback; later rounds play faster
fn flash_time(round: u32) -> f32 {
    (0.6 - 0.025 * round as f32).max(0.25)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    /// Showing `sequence[index]`; `lit` is false during the gap before it
    Playback { index: usize, timer: f32, lit: bool },
    /// Waiting for the player to press `sequence[index]`
    Echo { index: usize, timer: f32 },
}

pub struct Simon {
    phase: Phase,
    rng: GameRng,
    sequence: Vec<usize>,
    stage: Stage,
    /// Pad lit by the player's last press and its remaining glow
    flash: Option<(usize, f32)>,
    rounds: u64,
    events: Vec<GameEvent>,
}

impl Simon {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            sequence: Vec::new(),
            stage: Stage::Playback {
                index: 0,
                timer: LEAD_IN,
                lit: false,
            },
            flash: None,
            rounds: 0,
            events: Vec::new(),
        }
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    fn extend_and_play(&mut self) {
        self.sequence.push(self.rng.index(PADS.len()));
        self.stage = Stage::Playback {
            index: 0,
            timer: LEAD_IN,
            lit: false,
        };
    }

    fn pad_at(pos: Vec2) -> Option<usize> {
        (0..PADS.len()).find(|&pad| pos.distance(pad_center(pad)) <= PAD_RADIUS)
    }

    fn pressed_pad(input: &FrameInput) -> Option<usize> {
        if let Some(dir) = pressed_dir(input) {
            return PADS.iter().position(|d| *d == dir);
        }
        input.primary_click().and_then(Self::pad_at)
    }

    fn lit_pad(&self) -> Option<usize> {
        match self.stage {
            Stage::Playback {
                index, lit: true, ..
            } => self.sequence.get(index).copied(),
            _ => self.flash.map(|(pad, _)| pad),
        }
    }

    fn fail(&mut self) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::Hit);
        self.events.push(GameEvent::GameOver);
    }

    fn advance_playback(&mut self, dt: f32) {
        let Stage::Playback { index, timer, lit } = &mut self.stage else {
            return;
        };
        *timer -= dt;
        if *timer > 0.0 {
            return;
        }
        if !*lit {
            *lit = true;
            *timer = flash_time(self.rounds as u32);
            self.events.push(GameEvent::Blip);
        } else if *index + 1 < self.sequence.len() {
            *index += 1;
            *lit = false;
            *timer = GAP_TIME;
        } else {
            self.stage = Stage::Echo {
                index: 0,
                timer: INPUT_TIMEOUT,
            };
        }
    }

    fn echo(&mut self, input: &FrameInput, dt: f32) {
        let Stage::Echo { index, timer } = self.stage else {
            return;
        };
        let Some(pad) = Self::pressed_pad(input) else {
            let timer = timer - dt;
            if timer <= 0.0 {
                self.fail();
            } else {
                self.stage = Stage::Echo { index, timer };
            }
            return;
        };

        self.flash = Some((pad, PRESS_FLASH));
        if self.sequence.get(index) != Some(&pad) {
            self.fail();
            return;
        }
        self.events.push(GameEvent::Blip);
        if index + 1 < self.sequence.len() {
            self.stage = Stage::Echo {
                index: index + 1,
                timer: INPUT_TIMEOUT,
            };
        } else {
            self.rounds += 1;
            self.events.push(GameEvent::Score);
            self.extend_and_play();
        }
    }
}

impl ArcadeGame for Simon {
    fn id(&self) -> GameId {
        GameId::Simon
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(SIZE)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.rounds
    }

    fn hud(&self) -> Vec<HudItem> {
        let turn = match self.stage {
            Stage::Playback { .. } => "Watch",
            Stage::Echo { .. } => "Repeat",
        };
        vec![
            HudItem::new("Round", self.sequence.len()),
            HudItem::new("Turn", turn),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        if let Some((_, glow)) = &mut self.flash {
            *glow -= dt;
        }
        if self.flash.is_some_and(|(_, glow)| glow <= 0.0) {
            self.flash = None;
        }

        match self.phase {
            Phase::Ready if start_pressed(input) => {
                self.phase = Phase::Playing;
                self.extend_and_play();
                return;
            }
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        match self.stage {
            Stage::Playback { .. } => self.advance_playback(dt),
            Stage::Echo { .. } => self.echo(input, dt),
        }
    }

    fn draw(&self, scene: &mut Scene) {
        let lit = self.lit_pad();
        scene.circle(CENTER, PAD_OFFSET + PAD_RADIUS + 12.0, colors::PANEL);
        for pad in 0..PADS.len() {
            let color = if lit == Some(pad) {
                pad_color(pad)
            } else {
                with_alpha(pad_color(pad), 0.3)
            };
            scene.circle(pad_center(pad), PAD_RADIUS, color);
            if lit == Some(pad) {
                scene.ring(pad_center(pad), PAD_RADIUS, PAD_RADIUS + 6.0, colors::WHITE);
            }
        }
        scene.circle(CENTER, 48.0, colors::BACKGROUND);
        scene.digits_centered(self.rounds, CENTER, 6.0, colors::WHITE);

        // Echo countdown ring
        if let Stage::Echo { timer, .. } = self.stage {
            let frac = (timer / INPUT_TIMEOUT).clamp(0.0, 1.0);
            scene.ring(CENTER, 50.0, 50.0 + 6.0 * frac, colors::DIM);
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Key, PointerButton};

    const DT: f32 = 1.0 / 60.0;

    fn started() -> Simon {
        let mut game = Simon::new(11);
        game.tick(&FrameInput::idle().with_pressed(Key::Action), DT);
        game
    }

    fn run_playback(game: &mut Simon) {
        for _ in 0..600 {
            if matches!(game.stage, Stage::Echo { .. }) {
                return;
            }
            game.tick(&FrameInput::idle(), DT);
        }
        panic!("playback never finished");
    }

    fn key_for(pad: usize) -> Key {
        match PADS[pad] {
            Dir::Up => Key::Up,
            Dir::Right => Key::Right,
            Dir::Down => Key::Down,
            Dir::Left => Key::Left,
        }
    }

    #[test]
    fn start_adds_first_step() {
        let game = started();
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.sequence().len(), 1);
    }

    #[test]
    fn correct_echo_grows_sequence() {
        let mut game = started();
        run_playback(&mut game);
        let pad = game.sequence()[0];
        game.tick(&FrameInput::idle().with_pressed(key_for(pad)), DT);
        assert_eq!(game.score(), 1);
        assert_eq!(game.sequence().len(), 2);
        assert!(matches!(game.stage, Stage::Playback { .. }));
    }

    #[test]
    fn clicking_a_pad_counts() {
        let mut game = started();
        run_playback(&mut game);
        let pad = game.sequence()[0];
        game.tick(
            &FrameInput::idle().with_click(pad_center(pad), PointerButton::Primary),
            DT,
        );
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn wrong_pad_ends() {
        let mut game = started();
        run_playback(&mut game);
        let wrong = (game.sequence()[0] + 1) % PADS.len();
        game.tick(&FrameInput::idle().with_pressed(key_for(wrong)), DT);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn presses_during_playback_are_ignored() {
        let mut game = started();
        game.tick(&FrameInput::idle().with_pressed(Key::Up), DT);
        game.tick(&FrameInput::idle().with_pressed(Key::Down), DT);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn idle_echo_times_out() {
        let mut game = started();
        run_playback(&mut game);
        for _ in 0..(INPUT_TIMEOUT / DT) as usize + 2 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn playback_speeds_up() {
        assert!(flash_time(10) < flash_time(0));
        assert!(flash_time(100) >= 0.25);
    }
}
