use std::time::Duration;

use tracing::debug;

use super::layout::{LayoutGeneration, Viewport};

pub const DEFAULT_RESIZE_QUIET_PERIOD: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingResize {
    generation: LayoutGeneration,
    viewport: Viewport,
    last_event_at: Duration,
}

/// Coalesces bursts of resize events. The last recorded viewport wins and is
/// released once no further event arrives for the quiet period.
#[derive(Debug)]
pub struct ResizeDebouncer {
    quiet_period: Duration,
    pending: Option<PendingResize>,
    next_generation: u64,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_QUIET_PERIOD)
    }
}

impl ResizeDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
            next_generation: 1,
        }
    }

    /// Generations handed out start after `generation`.
    pub fn starting_after(mut self, generation: LayoutGeneration) -> Self {
        self.next_generation = generation.0.saturating_add(1);
        self
    }

    pub fn record(&mut self, viewport: Viewport, now: Duration) -> LayoutGeneration {
        let generation = LayoutGeneration(self.next_generation);
        self.next_generation = self.next_generation.saturating_add(1);
        if let Some(previous) = self.pending {
            debug!(
                superseded = previous.generation.0,
                generation = generation.0,
                "resize_coalesced"
            );
        }
        self.pending = Some(PendingResize {
            generation,
            viewport,
            last_event_at: now,
        });
        generation
    }

    pub fn poll(&mut self, now: Duration) -> Option<(LayoutGeneration, Viewport)> {
        let pending = self.pending?;
        if now.saturating_sub(pending.last_event_at) < self.quiet_period {
            return None;
        }
        self.pending = None;
        Some((pending.generation, pending.viewport))
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(100);

    #[test]
    fn burst_releases_only_last_viewport() {
        let mut debouncer = ResizeDebouncer::new(QUIET);
        debouncer.record(Viewport::new(800, 600), Duration::from_millis(0));
        debouncer.record(Viewport::new(900, 650), Duration::from_millis(30));
        let last = debouncer.record(Viewport::new(1024, 768), Duration::from_millis(60));

        assert_eq!(debouncer.poll(Duration::from_millis(120)), None);
        assert_eq!(
            debouncer.poll(Duration::from_millis(160)),
            Some((last, Viewport::new(1024, 768)))
        );
        assert_eq!(debouncer.poll(Duration::from_millis(400)), None);
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn generations_increase_per_event() {
        let mut debouncer = ResizeDebouncer::new(QUIET).starting_after(LayoutGeneration(4));
        let first = debouncer.record(Viewport::new(10, 10), Duration::ZERO);
        let second = debouncer.record(Viewport::new(20, 20), Duration::ZERO);

        assert_eq!(first, LayoutGeneration(5));
        assert!(second > first);
    }

    #[test]
    fn zero_quiet_period_releases_immediately() {
        let mut debouncer = ResizeDebouncer::new(Duration::ZERO);
        let generation = debouncer.record(Viewport::new(300, 200), Duration::from_secs(1));
        assert_eq!(
            debouncer.poll(Duration::from_secs(1)),
            Some((generation, Viewport::new(300, 200)))
        );
    }

    #[test]
    fn clear_drops_pending_resize() {
        let mut debouncer = ResizeDebouncer::new(QUIET);
        debouncer.record(Viewport::new(300, 200), Duration::ZERO);
        debouncer.clear();
        assert_eq!(debouncer.poll(Duration::from_secs(5)), None);
    }
}
