//! Mouse motion coalescing.
//!
//! A high-resolution mouse can produce several hundred move events per
//! second, far more than the wireless link should carry.  [`MouseCoalescer`]
//! sums the motion and lets one report through per interval.  A report axis
//! holds at most ±127; motion beyond that stays in the accumulator and goes
//! out with the next report.

use std::time::{Duration, Instant};

use hydra_core::report::mouse::clamp_axis;

/// Default mouse report rate.
pub const DEFAULT_RATE_HZ: u32 = 60;

#[derive(Debug, Clone)]
pub struct MouseCoalescer {
    interval: Duration,
    last_flush: Option<Instant>,
    dx: i32,
    dy: i32,
}

impl MouseCoalescer {
    /// A coalescer that emits at most `rate_hz` reports per second.
    ///
    /// A rate of `0` disables rate limiting: every push is due.
    pub fn new(rate_hz: u32) -> Self {
        let interval = match rate_hz {
            0 => Duration::ZERO,
            hz => Duration::from_secs(1) / hz,
        };
        Self {
            interval,
            last_flush: None,
            dx: 0,
            dy: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Adds motion and returns the deltas to report if a report is due.
    pub fn push(&mut self, dx: i32, dy: i32, now: Instant) -> Option<(i8, i8)> {
        self.dx = self.dx.saturating_add(dx);
        self.dy = self.dy.saturating_add(dy);
        if self.is_due(now) {
            Some(self.take(now))
        } else {
            None
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_flush {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.dx != 0 || self.dy != 0
    }

    /// Takes up to one report's worth of motion, regardless of the rate.
    pub fn take(&mut self, now: Instant) -> (i8, i8) {
        let dx = clamp_axis(self.dx);
        let dy = clamp_axis(self.dy);
        self.dx -= i32::from(dx);
        self.dy -= i32::from(dy);
        self.last_flush = Some(now);
        (dx, dy)
    }

    /// Discards accumulated motion and the rate history.
    pub fn reset(&mut self) {
        self.dx = 0;
        self.dy = 0;
        self.last_flush = None;
    }

    /// Motion still waiting, per axis.
    pub fn pending(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }
}

impl Default for MouseCoalescer {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_HZ)
    }
}
