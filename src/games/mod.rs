//! The arcade's games
//!
//! Each game is an independent module owning its state, fixed-timestep update,
//! input handling and scoring. The shell only sees them through
//! [`ArcadeGame`], which is deliberately thin: mount, tick, draw, report.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::highscores::ScoreOrder;
use crate::platform::{FrameInput, Key};
use crate::renderer::Scene;
use crate::sim::Dir;

pub mod asteroids;
pub mod breakout;
pub mod flappy;
pub mod frogger;
pub mod invaders;
pub mod lights_out;
pub mod maze_chase;
pub mod memory;
pub mod minesweeper;
pub mod missile_command;
pub mod pong;
pub mod runner;
pub mod simon;
pub mod snake;
pub mod tetris;
pub mod tower_defense;
pub mod twenty48;
pub mod whack_a_mole;

/// Catalog of every game in the cabinet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameId {
    Pong,
    Snake,
    Tetris,
    Breakout,
    Invaders,
    Asteroids,
    Minesweeper,
    TowerDefense,
    Flappy,
    Frogger,
    Twenty48,
    Simon,
    Memory,
    WhackAMole,
    Runner,
    MissileCommand,
    LightsOut,
    MazeChase,
}

impl GameId {
    /// Menu order
    pub const ALL: [GameId; 18] = [
        GameId::Pong,
        GameId::Snake,
        GameId::Tetris,
        GameId::Breakout,
        GameId::Invaders,
        GameId::Asteroids,
        GameId::Minesweeper,
        GameId::TowerDefense,
        GameId::Flappy,
        GameId::Frogger,
        GameId::Twenty48,
        GameId::Simon,
        GameId::Memory,
        GameId::WhackAMole,
        GameId::Runner,
        GameId::MissileCommand,
        GameId::LightsOut,
        GameId::MazeChase,
    ];

    /// URL path segment and storage key suffix
    pub fn slug(&self) -> &'static str {
        match self {
            GameId::Pong => "pong",
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::Breakout => "breakout",
            GameId::Invaders => "invaders",
            GameId::Asteroids => "asteroids",
            GameId::Minesweeper => "minesweeper",
            GameId::TowerDefense => "tower-defense",
            GameId::Flappy => "flappy",
            GameId::Frogger => "frogger",
            GameId::Twenty48 => "2048",
            GameId::Simon => "simon",
            GameId::Memory => "memory",
            GameId::WhackAMole => "whack-a-mole",
            GameId::Runner => "runner",
            GameId::MissileCommand => "missile-command",
            GameId::LightsOut => "lights-out",
            GameId::MazeChase => "maze-chase",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.slug() == slug)
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameId::Pong => "Pong",
            GameId::Snake => "Snake",
            GameId::Tetris => "Tetris",
            GameId::Breakout => "Breakout",
            GameId::Invaders => "Space Invaders",
            GameId::Asteroids => "Asteroids",
            GameId::Minesweeper => "Minesweeper",
            GameId::TowerDefense => "Tower Defense",
            GameId::Flappy => "Flappy",
            GameId::Frogger => "Frogger",
            GameId::Twenty48 => "2048",
            GameId::Simon => "Simon",
            GameId::Memory => "Memory Match",
            GameId::WhackAMole => "Whack-a-Mole",
            GameId::Runner => "Runner",
            GameId::MissileCommand => "Missile Command",
            GameId::LightsOut => "Lights Out",
            GameId::MazeChase => "Maze Chase",
        }
    }

    pub fn blurb(&self) -> &'static str {
        match self {
            GameId::Pong => "First to 7 against the machine",
            GameId::Snake => "Eat, grow, don't bite yourself",
            GameId::Tetris => "Clear lines before the well fills",
            GameId::Breakout => "Smash every brick in the wall",
            GameId::Invaders => "Hold the line against the march",
            GameId::Asteroids => "Split rocks, dodge the debris",
            GameId::Minesweeper => "Clear the field without a bang",
            GameId::TowerDefense => "Build towers, stop the creeps",
            GameId::Flappy => "Flap through the pipes",
            GameId::Frogger => "Cross the road, ride the logs",
            GameId::Twenty48 => "Slide and merge to 2048",
            GameId::Simon => "Repeat the growing pattern",
            GameId::Memory => "Find every pair",
            GameId::WhackAMole => "Thirty seconds of whacking",
            GameId::Runner => "Jump the cacti, duck the birds",
            GameId::MissileCommand => "Defend the cities",
            GameId::LightsOut => "Switch every light off",
            GameId::MazeChase => "Clear the maze, dodge the ghosts",
        }
    }

    pub fn controls(&self) -> &'static str {
        match self {
            GameId::Pong => "Up/Down or mouse to move, Space to serve",
            GameId::Snake => "Arrows/WASD to steer",
            GameId::Tetris => "Left/Right move, Up rotate, Down soft drop, Space hard drop",
            GameId::Breakout => "Left/Right or mouse, Space/click to launch",
            GameId::Invaders => "Left/Right move, Space fire",
            GameId::Asteroids => "Left/Right rotate, Up thrust, Space fire",
            GameId::Minesweeper => "Click reveal, right-click flag",
            GameId::TowerDefense => "1-3 pick tower, click place, Space next wave",
            GameId::Flappy => "Space/click to flap",
            GameId::Frogger => "Arrows/WASD to hop",
            GameId::Twenty48 => "Arrows/WASD to slide",
            GameId::Simon => "Click pads or use arrows",
            GameId::Memory => "Click cards to flip",
            GameId::WhackAMole => "Click the moles, avoid bombs",
            GameId::Runner => "Space/Up jump, Down duck",
            GameId::MissileCommand => "Click to fire interceptors",
            GameId::LightsOut => "Click a light to toggle it and its neighbours",
            GameId::MazeChase => "Arrows/WASD to steer",
        }
    }

    /// How results compare on this game's leaderboard
    pub fn score_order(&self) -> ScoreOrder {
        match self {
            GameId::Minesweeper | GameId::Memory | GameId::LightsOut => {
                ScoreOrder::LowerIsBetter
            }
            _ => ScoreOrder::HigherIsBetter,
        }
    }

    /// What the leaderboard number means
    pub fn score_label(&self) -> &'static str {
        match self {
            GameId::Minesweeper => "Seconds",
            GameId::Memory | GameId::LightsOut => "Moves",
            GameId::Simon => "Rounds",
            GameId::Flappy => "Pipes",
            GameId::Pong => "Points",
            _ => "Score",
        }
    }
}

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first input
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended in victory
    Won,
    /// Run ended in defeat
    GameOver,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Won | Phase::GameOver)
    }
}

/// Things that happened during a tick, for audio and flashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Small UI/step feedback (moves, flips, hops)
    Blip,
    /// Ball or body bounced off something
    Bounce,
    /// Something was hit but survived
    Hit,
    /// Points scored
    Score,
    /// Something blew up or was destroyed
    Explosion,
    /// Pickup/bonus collected
    PowerUp,
    LifeLost,
    LevelUp,
    Won,
    GameOver,
    /// Shell-only: a result took first place on its leaderboard
    NewHighScore,
}

/// A label/value pair for the DOM HUD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudItem {
    pub label: &'static str,
    pub value: String,
}

impl HudItem {
    pub fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

/// What the shell needs from a mounted game
pub trait ArcadeGame {
    fn id(&self) -> GameId;

    /// Game-space playfield size (the renderer letterboxes it)
    fn size(&self) -> Vec2;

    fn phase(&self) -> Phase;

    /// Current score in this game's leaderboard unit
    fn score(&self) -> u64;

    /// Extra HUD lines beyond the score
    fn hud(&self) -> Vec<HudItem> {
        Vec::new()
    }

    /// Advance one fixed timestep
    fn tick(&mut self, input: &FrameInput, dt: f32);

    /// Describe the current frame
    fn draw(&self, scene: &mut Scene);

    /// Drain events raised since the last call
    fn take_events(&mut self) -> Vec<GameEvent>;

    /// Value to submit to the leaderboard once the run is over
    fn result(&self) -> Option<u64> {
        self.phase().is_terminal().then(|| self.score())
    }

    /// One-line status shown over the playfield (start prompt, game over)
    fn banner(&self) -> Option<String> {
        match self.phase() {
            Phase::Ready => Some("Press Space to start".to_string()),
            Phase::Won => Some("You win! R to play again, Q for menu".to_string()),
            Phase::GameOver => Some("Game over. R to retry, Q for menu".to_string()),
            Phase::Playing => None,
        }
    }
}

/// First direction key pressed this frame
pub(crate) fn pressed_dir(input: &FrameInput) -> Option<Dir> {
    input.pressed_keys().iter().find_map(|k| match k {
        Key::Up => Some(Dir::Up),
        Key::Right => Some(Dir::Right),
        Key::Down => Some(Dir::Down),
        Key::Left => Some(Dir::Left),
        _ => None,
    })
}

/// Start signal shared by games that wait on the Ready screen
pub(crate) fn start_pressed(input: &FrameInput) -> bool {
    input.pressed(Key::Action) || input.pressed(Key::Confirm) || input.primary_click().is_some()
}

/// Mount a fresh run of a game
pub fn create(id: GameId, seed: u64) -> Box<dyn ArcadeGame> {
    match id {
        GameId::Pong => Box::new(pong::Pong::new(seed)),
        GameId::Snake => Box::new(snake::Snake::new(seed)),
        GameId::Tetris => Box::new(tetris::Tetris::new(seed)),
        GameId::Breakout => Box::new(breakout::Breakout::new(seed)),
        GameId::Invaders => Box::new(invaders::Invaders::new(seed)),
        GameId::Asteroids => Box::new(asteroids::Asteroids::new(seed)),
        GameId::Minesweeper => Box::new(minesweeper::Minesweeper::new(seed)),
        GameId::TowerDefense => Box::new(tower_defense::TowerDefense::new(seed)),
        GameId::Flappy => Box::new(flappy::Flappy::new(seed)),
        GameId::Frogger => Box::new(frogger::Frogger::new(seed)),
        GameId::Twenty48 => Box::new(twenty48::Twenty48::new(seed)),
        GameId::Simon => Box::new(simon::Simon::new(seed)),
        GameId::Memory => Box::new(memory::Memory::new(seed)),
        GameId::WhackAMole => Box::new(whack_a_mole::WhackAMole::new(seed)),
        GameId::Runner => Box::new(runner::Runner::new(seed)),
        GameId::MissileCommand => Box::new(missile_command::MissileCommand::new(seed)),
        GameId::LightsOut => Box::new(lights_out::LightsOut::new(seed)),
        GameId::MazeChase => Box::new(maze_chase::MazeChase::new(seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn slugs_roundtrip_and_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for id in GameId::ALL {
            assert_eq!(GameId::from_slug(id.slug()), Some(id));
            assert!(seen.insert(id.slug()));
        }
        assert_eq!(GameId::from_slug("pacman"), None);
    }

    #[test]
    fn every_game_mounts_ready_and_survives_a_second() {
        for id in GameId::ALL {
            let mut game = create(id, 1234);
            assert_eq!(game.id(), id);
            assert_eq!(game.phase(), Phase::Ready, "{:?}", id);
            assert_eq!(game.score(), 0, "{:?}", id);

            let start = FrameInput::idle().with_pressed(Key::Action);
            game.tick(&start, SIM_DT);
            for _ in 0..60 {
                game.tick(&FrameInput::idle(), SIM_DT);
            }

            let mut scene = Scene::new(game.size());
            game.draw(&mut scene);
            assert!(!scene.vertices().is_empty(), "{:?} drew nothing", id);
            let _ = game.take_events();
        }
    }

    #[test]
    fn lower_is_better_games() {
        assert_eq!(GameId::Minesweeper.score_order(), ScoreOrder::LowerIsBetter);
        assert_eq!(GameId::Tetris.score_order(), ScoreOrder::HigherIsBetter);
    }
}
