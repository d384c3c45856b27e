//! Fixed timestep frame clock

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

const FPS_WINDOW: usize = 60;

/// Converts variable frame deltas into whole simulation steps
#[derive(Debug, Clone)]
pub struct FrameClock {
    accumulator: f32,
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Feed one frame's delta (seconds), returns the number of SIM_DT steps to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Drop whatever the substep cap could not absorb
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    /// Forget any banked time (mount, restart, unpause)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Track a frame timestamp (ms) for the FPS counter
    pub fn record_frame(&mut self, time_ms: f64) {
        self.frame_times[self.frame_index] = time_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;

        // Oldest sample sits at the slot we are about to overwrite
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((FPS_WINDOW as f64 - 1.0) * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_partial_frames() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert_eq!(clock.advance(SIM_DT * 0.85), 0);
    }

    #[test]
    fn clamps_long_frames() {
        let mut clock = FrameClock::new();
        // 5 seconds of stall must not produce more than the cap
        let steps = clock.advance(5.0);
        assert!(steps <= MAX_SUBSTEPS);
        // and must not leave a backlog behind
        assert!(clock.advance(0.0) <= 1);
    }

    #[test]
    fn reports_fps_after_window_fills() {
        let mut clock = FrameClock::new();
        for i in 1..=120 {
            clock.record_frame(i as f64 * 1000.0 / 60.0);
        }
        assert!((clock.fps() as i32 - 60).abs() <= 1);
    }
}
