//! Fixed-step clock
//!
//! Turns variable frame durations into a whole number of fixed-size
//! physics steps, carrying the fractional remainder to the next frame.

use log::debug;
use std::collections::VecDeque;
use std::fmt;

/// Converts wall-clock frame durations into fixed simulation steps
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    fixed_dt: f32,
    max_steps: u32,
    accumulator: f32,
    last_frame: f32,
    window: usize,
    frame_times: VecDeque<f32>,
    frame_time_sum: f32,
}

impl FixedStepClock {
    /// `fixed_dt` must be positive; `max_steps` and `window` are raised to at least 1.
    pub fn new(fixed_dt: f32, max_steps: u32, window: usize) -> Self {
        let window = window.max(1);
        Self {
            fixed_dt,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            last_frame: 0.0,
            window,
            frame_times: VecDeque::with_capacity(window),
            frame_time_sum: 0.0,
        }
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Time carried over to the next call, always below one step
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    /// Record a frame of `frame_seconds` and return how many fixed steps to run now.
    ///
    /// Non-finite or negative durations count as zero. When more than
    /// `max_steps` steps are owed, the surplus whole steps are dropped.
    pub fn update(&mut self, frame_seconds: f32) -> u32 {
        let frame = if frame_seconds.is_finite() && frame_seconds > 0.0 {
            frame_seconds
        } else {
            0.0
        };
        self.record_frame(frame);

        self.accumulator += frame;
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_steps {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }

        if self.accumulator >= self.fixed_dt {
            let dropped = (self.accumulator / self.fixed_dt).floor();
            debug!(
                "frame of {:.3}s exceeds {} steps; dropping {} steps",
                frame, self.max_steps, dropped
            );
            self.accumulator %= self.fixed_dt;
        }

        steps
    }

    /// Forget accumulated time and frame history
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_frame = 0.0;
        self.frame_times.clear();
        self.frame_time_sum = 0.0;
    }

    fn record_frame(&mut self, frame: f32) {
        self.last_frame = frame;
        if self.frame_times.len() == self.window {
            if let Some(old) = self.frame_times.pop_front() {
                self.frame_time_sum -= old;
            }
        }
        self.frame_times.push_back(frame);
        self.frame_time_sum += frame;
    }

    pub fn last_frame_ms(&self) -> f32 {
        self.last_frame * 1000.0
    }

    pub fn average_frame_ms(&self) -> f32 {
        self.average_frame() * 1000.0
    }

    pub fn last_fps(&self) -> f32 {
        per_second(self.last_frame)
    }

    pub fn average_fps(&self) -> f32 {
        per_second(self.average_frame())
    }

    fn average_frame(&self) -> f32 {
        if self.frame_times.is_empty() {
            0.0
        } else {
            (self.frame_time_sum / self.frame_times.len() as f32).max(0.0)
        }
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            last_fps: self.last_fps(),
            average_fps: self.average_fps(),
            last_ms: self.last_frame_ms(),
            average_ms: self.average_frame_ms(),
        }
    }
}

fn per_second(seconds: f32) -> f32 {
    if seconds > 0.0 {
        1.0 / seconds
    } else {
        0.0
    }
}

/// Snapshot of frame-rate figures, derived from the clock's history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub last_fps: f32,
    pub average_fps: f32,
    pub last_ms: f32,
    pub average_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Good,
    Average,
    Poor,
}

impl FrameStats {
    pub fn rating(&self, target_fps: f32) -> Performance {
        if self.average_fps >= target_fps * 0.95 {
            Performance::Good
        } else if self.average_fps >= target_fps * 0.8 {
            Performance::Average
        } else {
            Performance::Poor
        }
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {:6.1} (Avg: {:6.1}) | MS: {:6.2} (Avg: {:6.2})",
            self.last_fps, self.average_fps, self.last_ms, self.average_ms
        )
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Performance::Good => "[Good]",
            Performance::Average => "[Average]",
            Performance::Poor => "[Poor]",
        };
        write!(f, "{:<9}", label)
    }
}
