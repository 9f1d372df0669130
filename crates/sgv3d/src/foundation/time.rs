//! Time sources for frame-stepped rendering
//!
//! Animations read the frame time as `f64` seconds. Anything that can report
//! the current time without blocking can drive a frame through [`FrameClock`].

use std::cell::Cell;
use std::time::Instant;

/// Monotonic source of frame time in seconds
pub trait FrameClock {
    /// Current time in seconds since the clock started
    fn now(&self) -> f64;
}

/// Wall-clock timer for frame timing
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
    last_frame: Instant,
    delta_time: f64,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Time between the last two `update` calls in seconds
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Total elapsed time since timer creation
    pub fn total_time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Number of `update` calls so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl FrameClock for Timer {
    fn now(&self) -> f64 {
        self.total_time()
    }
}

/// Clock that only moves when told to
///
/// Useful for deterministic playback and tests. Interior mutability lets a
/// shared reference be stepped between frames.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: Cell<f64>,
}

impl ManualClock {
    /// Create a clock at the given time
    pub fn new(time: f64) -> Self {
        Self { time: Cell::new(time) }
    }

    /// Jump to an absolute time
    pub fn set(&self, time: f64) {
        self.time.set(time);
    }

    /// Advance by `dt` seconds
    pub fn advance(&self, dt: f64) {
        self.time.set(self.time.get() + dt);
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::new(1.0);
        clock.advance(0.5);
        assert_eq!(clock.now(), 1.5);
        clock.set(0.25);
        assert_eq!(clock.now(), 0.25);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_time() >= 0.0);
        assert!(timer.now() >= 0.0);
    }
}
