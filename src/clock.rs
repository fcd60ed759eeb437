//! Frame timing.

use std::time::{Duration, Instant};

/// Measures the time between frames.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> FrameClock {
        FrameClock::default()
    }

    /// Starts (or restarts) measuring from now.
    pub fn start(&mut self) {
        self.last = Some(Instant::now());
    }

    /// Stops measuring; subsequent ticks report zero.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }

    /// Returns the time since the previous tick (or since `start`).
    pub fn tick(&mut self) -> Duration {
        let last = match self.last {
            Some(last) => last,
            None => return Duration::default(),
        };
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(last);
        self.last = Some(now);
        elapsed
    }
}

/// Accumulates frame times and fires once per elapsed interval.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval: Duration,
    accumulated: Duration,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> IntervalTimer {
        IntervalTimer {
            interval,
            accumulated: Duration::default(),
        }
    }

    /// Adds frame time; returns true if an interval has passed.
    ///
    /// Leftover time carries over to the next interval.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.accumulated += elapsed;
        if self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> Duration {
        self.interval
            .checked_sub(self.accumulated)
            .unwrap_or_default()
    }
}
