//! Time management for the game loop.
//!
//! Two separate notions of time live here:
//! - [`Time`]: the simulation's frame timer. Deltas are clamped so a stall (pause, window
//!   backgrounded) never feeds a huge step into physics, and `elapsed` is the sum of clamped
//!   deltas, which is what obstacle motion is driven by.
//! - [`Clock`]: a monotonic wall-clock source used for run timing. Swappable so tests can
//!   pin exact timestamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default upper bound for a single frame delta.
pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(100);

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Clamped duration of the last frame.
    delta: Duration,
    /// Total simulated time (sum of clamped deltas).
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Largest delta a single frame may report.
    max_delta: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Set the clamp applied to every frame delta.
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Update timing at the start of a new frame from the wall clock.
    pub fn update(&mut self) {
        let now = Instant::now();
        let raw = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(raw);
    }

    /// Advance by an externally supplied delta (headless loops, tests).
    pub fn advance(&mut self, raw: Duration) {
        if raw > self.max_delta {
            log::debug!(
                "Frame delta {:.3}s clamped to {:.3}s",
                raw.as_secs_f32(),
                self.max_delta.as_secs_f32()
            );
        }
        self.delta = raw.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the delta time as a Duration.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get total simulated time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total simulated time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Monotonic time source for run timing.
///
/// `now` is measured from an arbitrary, fixed epoch; only differences are meaningful.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Hand-driven clock. Starts at zero and only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute reading.
    pub fn set(&self, now: Duration) {
        self.nanos.store(now.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: u64) {
        self.set(Duration::from_millis(millis));
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_clamps_stalls() {
        let mut time = Time::new().with_max_delta(Duration::from_millis(100));
        time.advance(Duration::from_secs(5));
        assert_eq!(time.delta(), Duration::from_millis(100));
        assert_eq!(time.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn elapsed_is_sum_of_clamped_deltas() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(16));
        time.advance(Duration::from_millis(16));
        time.advance(Duration::from_secs(2));
        assert_eq!(time.elapsed(), Duration::from_millis(132));
        assert_eq!(time.frame_count(), 3);
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.set_millis(1000);
        clock.advance(Duration::from_millis(230));
        assert_eq!(clock.now(), Duration::from_millis(1230));
    }
}
