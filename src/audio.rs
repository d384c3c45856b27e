//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects, no external files needed. The
//! event-to-sound mapping is platform independent; only [`AudioManager`]
//! touches the browser.

use crate::games::GameEvent;

/// Sounds played per frame at most; bursts (chain explosions) collapse
pub const MAX_SOUNDS_PER_FRAME: usize = 4;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SoundEffect {
    /// Short UI tick (moves, flips, hops)
    Blip,
    /// Ball bouncing off a paddle or wall
    Bounce,
    /// Something struck but not destroyed
    Hit,
    /// Points scored
    Score,
    Explosion,
    PowerUp,
    LifeLost,
    LevelUp,
    Win,
    GameOver,
    HighScore,
}

impl SoundEffect {
    pub fn for_event(event: GameEvent) -> Self {
        match event {
            GameEvent::Blip => Self::Blip,
            GameEvent::Bounce => Self::Bounce,
            GameEvent::Hit => Self::Hit,
            GameEvent::Score => Self::Score,
            GameEvent::Explosion => Self::Explosion,
            GameEvent::PowerUp => Self::PowerUp,
            GameEvent::LifeLost => Self::LifeLost,
            GameEvent::LevelUp => Self::LevelUp,
            GameEvent::Won => Self::Win,
            GameEvent::GameOver => Self::GameOver,
            GameEvent::NewHighScore => Self::HighScore,
        }
    }
}

/// Sounds for one frame's events: each effect once, most significant first
pub fn frame_sounds(events: &[GameEvent]) -> Vec<SoundEffect> {
    let mut sounds: Vec<SoundEffect> = events.iter().copied().map(SoundEffect::for_event).collect();
    sounds.sort_unstable_by(|a, b| b.cmp(a));
    sounds.dedup();
    sounds.truncate(MAX_SOUNDS_PER_FRAME);
    sounds
}

#[cfg(target_arch = "wasm32")]
pub use browser::AudioManager;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::SoundEffect;
    use crate::settings::Settings;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the cabinet
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Silence everything until the next `resume` (window blur)
        pub fn suspend(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.suspend();
            }
        }

        /// Pick up volume and mute changes
        pub fn apply(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Blip => self.tone(ctx, 660.0, OscillatorType::Square, vol * 0.15, 0.05),
                SoundEffect::Bounce => self.play_bounce(ctx, vol),
                SoundEffect::Hit => self.tone(ctx, 300.0, OscillatorType::Triangle, vol * 0.25, 0.08),
                SoundEffect::Score => self.arpeggio(ctx, &[700.0, 1050.0], 0.05, vol * 0.2),
                SoundEffect::Explosion => self.play_explosion(ctx, vol),
                SoundEffect::PowerUp => self.arpeggio(ctx, &[600.0, 800.0, 1000.0], 0.08, vol * 0.25),
                SoundEffect::LifeLost => self.play_life_lost(ctx, vol),
                SoundEffect::LevelUp => self.arpeggio(ctx, &[400.0, 500.0, 600.0, 800.0], 0.1, vol * 0.3),
                SoundEffect::Win => self.arpeggio(ctx, &[523.0, 659.0, 784.0, 1047.0], 0.12, vol * 0.3),
                SoundEffect::GameOver => self.arpeggio(ctx, &[400.0, 350.0, 300.0, 200.0], 0.2, vol * 0.3),
                SoundEffect::HighScore => {
                    self.arpeggio(ctx, &[500.0, 600.0, 700.0, 800.0, 1000.0], 0.08, vol * 0.25)
                }
            }
        }

        /// Oscillator wired through a gain node to the output
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single note with an exponential decay
        fn tone(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType, level: f32, len: f64) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + len)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + len + 0.03).ok();
        }

        /// Notes in sequence, `step` seconds apart
        fn arpeggio(&self, ctx: &AudioContext, freqs: &[f32], step: f64, level: f32) {
            for (i, freq) in freqs.iter().enumerate() {
                let delay = i as f64 * step;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(level, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + step * 2.5)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + step * 3.0).ok();
                }
            }
        }

        /// Solid thump
        fn play_bounce(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 150.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.6, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(150.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(60.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();

            // High frequency crack
            if let Some((osc2, gain2)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain2.gain().set_value_at_time(vol * 0.2, t).ok();
                gain2
                    .gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc2.start().ok();
                osc2.stop_with_when(t + 0.15).ok();
            }
        }

        /// Ominous descend
        fn play_life_lost(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.6)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.7).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_to_one_sound() {
        let events = vec![GameEvent::Explosion; 12];
        assert_eq!(frame_sounds(&events), vec![SoundEffect::Explosion]);
    }

    #[test]
    fn significant_sounds_survive_the_cap() {
        let events = [
            GameEvent::Blip,
            GameEvent::Bounce,
            GameEvent::Hit,
            GameEvent::Score,
            GameEvent::Explosion,
            GameEvent::GameOver,
            GameEvent::NewHighScore,
        ];
        let sounds = frame_sounds(&events);
        assert_eq!(sounds.len(), MAX_SOUNDS_PER_FRAME);
        assert_eq!(sounds[0], SoundEffect::HighScore);
        assert_eq!(sounds[1], SoundEffect::GameOver);
        assert!(!sounds.contains(&SoundEffect::Blip));
    }

    #[test]
    fn quiet_frame_is_silent() {
        assert!(frame_sounds(&[]).is_empty());
    }
}
