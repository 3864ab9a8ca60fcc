//! Once-per-frame coalescing for the drag engine's deferred snap phase.
//!
//! An explicit task slot with a single in-flight guard token, independent
//! of any UI framework's render loop. Any number of pointer events may
//! request work; the frame tick runs it at most once, and a request whose
//! token no longer matches the active gesture is discarded (cooperative
//! cancellation, not a kill signal).

use uuid::Uuid;

#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Option<Uuid>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request deferred work for the gesture identified by `token`.
    /// Multiple requests within one frame coalesce into one.
    pub fn request(&mut self, token: Uuid) {
        self.pending = Some(token);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending request. Returns `true` only when its token
    /// still matches the active gesture; a stale request is dropped
    /// silently either way.
    pub fn take_if_current(&mut self, active: Option<Uuid>) -> bool {
        match self.pending.take() {
            Some(token) => active == Some(token),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_coalesce() {
        let mut scheduler = FrameScheduler::new();
        let token = Uuid::new_v4();
        scheduler.request(token);
        scheduler.request(token);
        scheduler.request(token);

        assert!(scheduler.take_if_current(Some(token)));
        // The slot is consumed: a second frame runs nothing.
        assert!(!scheduler.take_if_current(Some(token)));
    }

    #[test]
    fn test_stale_request_discarded() {
        let mut scheduler = FrameScheduler::new();
        let old_gesture = Uuid::new_v4();
        let new_gesture = Uuid::new_v4();
        scheduler.request(old_gesture);

        // The gesture changed before the frame fired.
        assert!(!scheduler.take_if_current(Some(new_gesture)));
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_no_active_gesture_discards() {
        let mut scheduler = FrameScheduler::new();
        scheduler.request(Uuid::new_v4());
        assert!(!scheduler.take_if_current(None));
    }
}
