//! Arcade Cabinet - a browser arcade of classic single-screen games
//!
//! Core modules:
//! - `games`: One self-contained simulation per game behind a small trait
//! - `shell`: Menu, routing, pause/restart and high-score bookkeeping
//! - `sim`: Geometry, grid and RNG helpers shared by the games
//! - `renderer`: WebGPU pipeline drawing procedural 2D primitives
//! - `platform`: Browser/native abstraction (input, storage, frame timing)

pub mod audio;
pub mod games;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod shell;
pub mod sim;

pub use games::{ArcadeGame, GameEvent, GameId, Phase};
pub use highscores::{Leaderboard, ScoreBook, ScoreOrder};
pub use settings::Settings;
pub use shell::{Cabinet, Route};

/// Game loop configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed to the accumulator (tab switches, breakpoints)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approach_clamps_step() {
        assert_eq!(approach(0.0, 10.0, 3.0), 3.0);
        assert_eq!(approach(0.0, -10.0, 3.0), -3.0);
        assert_eq!(approach(9.0, 10.0, 3.0), 10.0);
    }
}
