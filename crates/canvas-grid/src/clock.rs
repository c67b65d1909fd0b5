//! Frame timing threaded through the render scheduler.
//!
//! The clock is an explicit value rather than loose fields on the loop, so
//! tests can drive it with synthetic timestamps and draw callbacks can read
//! it without reaching into scheduler internals.

/// Timing state for the render loop.
///
/// Advanced only on frames that actually execute work; a frame skipped by
/// the fps throttle leaves the clock untouched, so the skipped time is
/// attributed to the next working frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last_render_ms: f64,
    delta_seconds: f64,
    elapsed_seconds: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the last working frame, in milliseconds.
    pub fn last_render_ms(&self) -> f64 {
        self.last_render_ms
    }

    /// Seconds between the last two working frames.
    pub fn delta_seconds(&self) -> f64 {
        self.delta_seconds
    }

    /// Cumulative seconds across all working frames.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Instantaneous frame rate this timestamp would produce.
    pub(crate) fn fps_at(&self, timestamp_ms: f64) -> f64 {
        1000.0 / (timestamp_ms - self.last_render_ms)
    }

    /// Commit a working frame at `timestamp_ms`.
    pub(crate) fn advance(&mut self, timestamp_ms: f64) {
        self.delta_seconds = (timestamp_ms - self.last_render_ms) / 1000.0;
        self.elapsed_seconds += self.delta_seconds;
        self.last_render_ms = timestamp_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_elapsed_time() {
        let mut clock = FrameClock::new();
        clock.advance(16.0);
        clock.advance(48.0);
        assert_eq!(clock.last_render_ms(), 48.0);
        assert_eq!(clock.delta_seconds(), 0.032);
        assert!((clock.elapsed_seconds() - 0.048).abs() < 1e-12);
    }

    #[test]
    fn fps_reflects_time_since_last_working_frame() {
        let mut clock = FrameClock::new();
        clock.advance(100.0);
        assert_eq!(clock.fps_at(150.0), 20.0);
        // Zero elapsed time reads as infinitely fast, which a throttle
        // always skips.
        assert!(clock.fps_at(100.0).is_infinite());
    }
}
