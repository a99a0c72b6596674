//! Frame timer used by the main loop for pacing statistics.

use std::time::{Duration, Instant};

/// Measures frame deltas and the average frame rate over a reporting window.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    window_start: Instant,
    window_frames: u32,
    total_frames: u64,
}

impl Timer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            window_start: now,
            window_frames: 0,
            total_frames: 0,
        }
    }

    /// Get the total elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Mark the end of a frame and return the time since the previous one.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        self.window_frames += 1;
        self.total_frames += 1;
        delta
    }

    /// Total number of ticks since creation or the last [`reset`](Self::reset).
    pub fn frame_count(&self) -> u64 {
        self.total_frames
    }

    /// Frames in the current reporting window.
    pub fn window_frames(&self) -> u32 {
        self.window_frames
    }

    /// Average frames per second over the current window, then start a new one.
    ///
    /// Returns `0.0` when no time has passed.
    pub fn take_window_fps(&mut self) -> f32 {
        let now = Instant::now();
        let secs = (now - self.window_start).as_secs_f32();
        let fps = if secs > 0.0 {
            self.window_frames as f32 / secs
        } else {
            0.0
        };
        self.window_start = now;
        self.window_frames = 0;
        fps
    }

    /// Reset the timer to the current time.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
