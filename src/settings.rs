//! Player preferences
//!
//! Persisted separately from high scores. Every field has a serde default so
//! settings saved by older builds still load.

use serde::{Deserialize, Serialize};

use crate::platform::storage::{KeyValueStore, StorageError, load_json, save_json};
use crate::renderer::{Color, colors};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Pause and silence when the window loses focus
    pub mute_on_blur: bool,

    // === HUD ===
    pub show_fps: bool,

    // === Visual effects ===
    /// Particles, screen flashes and other flourishes
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (disables flashes regardless of `particles`)
    pub reduced_motion: bool,
    /// Pure black background
    pub high_contrast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,
            show_fps: false,
            particles: true,
            reduced_motion: false,
            high_contrast: false,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "arcade_cabinet.settings";

    /// Gain applied to every sound effect
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective particles/flash toggle (respects reduced_motion)
    pub fn effects_enabled(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn background(&self) -> Color {
        if self.high_contrast {
            colors::BACKGROUND_HIGH_CONTRAST
        } else {
            colors::BACKGROUND
        }
    }

    /// Load settings, falling back to defaults on absence or corruption
    pub fn load(store: &impl KeyValueStore) -> Self {
        match load_json::<Settings>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
