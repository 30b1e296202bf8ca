use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStatsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub position_writes_per_second: f32,
}

/// Rolls frame counts and position writes into one snapshot per interval.
#[derive(Debug)]
pub(crate) struct FrameStatsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    frame_time_sum: Duration,
    position_writes_at_start: u64,
    position_writes_latest: u64,
}

impl FrameStatsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_start: Instant::now(),
            interval,
            frames: 0,
            frame_time_sum: Duration::ZERO,
            position_writes_at_start: 0,
            position_writes_latest: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    /// `total` is the stage's running write counter. Stages are swapped on
    /// scene switches, so a smaller total restarts the interval baseline.
    pub(crate) fn observe_position_writes(&mut self, total: u64) {
        if total < self.position_writes_latest {
            self.position_writes_at_start = 0;
        }
        self.position_writes_latest = total;
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<FrameStatsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };
        let writes = self
            .position_writes_latest
            .saturating_sub(self.position_writes_at_start);

        let snapshot = FrameStatsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            frame_time_ms,
            position_writes_per_second: writes as f32 / elapsed_seconds,
        };

        self.interval_start = now;
        self.frames = 0;
        self.frame_time_sum = Duration::ZERO;
        self.position_writes_at_start = self.position_writes_latest;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_computes_expected_values() {
        let mut stats = FrameStatsAccumulator::new(Duration::from_secs(1));
        let base = stats.interval_start;

        stats.record_frame(Duration::from_millis(16));
        stats.record_frame(Duration::from_millis(16));
        stats.observe_position_writes(10);

        let snapshot = stats
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("snapshot should be emitted");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 16.0).abs() < 0.001);
        assert!((snapshot.position_writes_per_second - 10.0).abs() < 0.05);
    }

    #[test]
    fn snapshot_not_emitted_before_interval() {
        let mut stats = FrameStatsAccumulator::new(Duration::from_secs(1));
        let base = stats.interval_start;
        stats.record_frame(Duration::from_millis(16));

        assert!(stats
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn write_rate_counts_only_the_current_interval() {
        let mut stats = FrameStatsAccumulator::new(Duration::from_secs(1));
        let base = stats.interval_start;
        stats.observe_position_writes(50);
        stats.maybe_snapshot(base + Duration::from_secs(1));

        stats.observe_position_writes(80);
        let snapshot = stats
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second snapshot");

        assert!((snapshot.position_writes_per_second - 30.0).abs() < 0.05);
    }

    #[test]
    fn counter_reset_after_scene_switch_does_not_underflow() {
        let mut stats = FrameStatsAccumulator::new(Duration::from_secs(1));
        let base = stats.interval_start;
        stats.observe_position_writes(500);
        stats.maybe_snapshot(base + Duration::from_secs(1));

        stats.observe_position_writes(20);
        let snapshot = stats
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("snapshot");

        assert!((snapshot.position_writes_per_second - 20.0).abs() < 0.05);
    }
}
