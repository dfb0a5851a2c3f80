use std::time::Duration;

/// Accumulates elapsed frame time and reports when a tick is due.
///
/// Firing resets the accumulator to zero instead of subtracting the interval,
/// so a long stall produces one tick, never a burst of catch-up ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickClock {
    elapsed: Duration,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dt` and return true if `interval` has been reached
    pub fn accumulate(&mut self, dt: Duration, interval: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed >= interval {
            self.elapsed = Duration::ZERO;
            true
        } else {
            false
        }
    }

    /// Forget any accumulated time, as if the last tick happened now
    pub fn rebase(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
