//! Frame statistics.
//!
//! Counters and timings for the last completed frame, readable through
//! `Engine::frame_stats`. The per-phase timings are also emitted at `debug`
//! level when a frame ends.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Statistics for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    /// Frame counter, starting at 1 for the first `begin_frame`.
    pub frame: u64,
    pub element_count: usize,
    pub command_count: usize,
    /// Arena bytes used by the frame.
    pub arena_used: usize,
    pub arena_capacity: usize,
    /// Most arena bytes any frame has used so far.
    pub arena_high_water: usize,
    /// Time from `begin_frame` to `end_frame` (the declaration phase).
    pub declare_time: Duration,
    pub layout_time: Duration,
    pub emit_time: Duration,
    pub measure_hits: u64,
    pub measure_misses: u64,
    pub diagnostics: u32,
    /// The frame was abandoned and its output replaced.
    pub abandoned: bool,
}

impl FrameStats {
    pub fn total_time(&self) -> Duration {
        self.declare_time + self.layout_time + self.emit_time
    }
}

/// Run `f` and return its result with the elapsed wall time.
#[inline]
pub(crate) fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_time_sums_phases() {
        let stats = FrameStats {
            declare_time: Duration::from_micros(10),
            layout_time: Duration::from_micros(20),
            emit_time: Duration::from_micros(5),
            ..Default::default()
        };
        assert_eq!(stats.total_time(), Duration::from_micros(35));
    }

    #[test]
    fn timed_returns_result() {
        let (value, elapsed) = timed(|| 2 + 2);
        assert_eq!(value, 4);
        assert!(elapsed < Duration::from_secs(1));
    }
}
