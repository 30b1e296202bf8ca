use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

/// Frame-synced callback bookkeeping for a single event loop.
///
/// Owners request a frame, remember the returned id, and are handed that id
/// back from [`FrameScheduler::take_due`] on the next frame. Cancelled ids are
/// never delivered. Ids are never reused.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Vec<FrameRequestId>,
}

impl FrameScheduler {
    pub fn request_frame(&mut self) -> FrameRequestId {
        let id = FrameRequestId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.pending.push(id);
        id
    }

    pub fn cancel_frame(&mut self, id: FrameRequestId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pending| *pending != id);
        let cancelled = self.pending.len() != before;
        if cancelled {
            debug!(request = id.0, "frame_request_cancelled");
        }
        cancelled
    }

    /// Drains every request due this frame. Requests made while servicing the
    /// returned ids belong to the next frame.
    pub fn take_due(&mut self) -> Vec<FrameRequestId> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.pending.contains(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique_and_increasing() {
        let mut scheduler = FrameScheduler::default();
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        scheduler.take_due();
        let third = scheduler.request_frame();

        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn take_due_drains_pending_requests() {
        let mut scheduler = FrameScheduler::default();
        let id = scheduler.request_frame();

        assert_eq!(scheduler.take_due(), vec![id]);
        assert!(scheduler.take_due().is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn cancelled_request_is_never_delivered() {
        let mut scheduler = FrameScheduler::default();
        let kept = scheduler.request_frame();
        let cancelled = scheduler.request_frame();

        assert!(scheduler.cancel_frame(cancelled));
        assert!(!scheduler.is_pending(cancelled));
        assert_eq!(scheduler.take_due(), vec![kept]);
    }

    #[test]
    fn cancelling_unknown_or_delivered_request_is_noop() {
        let mut scheduler = FrameScheduler::default();
        let id = scheduler.request_frame();
        scheduler.take_due();

        assert!(!scheduler.cancel_frame(id));
        assert!(!scheduler.cancel_frame(FrameRequestId(99)));
    }
}
