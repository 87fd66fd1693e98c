use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Completion flags written by the producer and read by the consumer.
///
/// Both flags only ever go from `false` to `true`. `failed` is always set
/// before `done`, so a reader that sees `done` also sees `failed` if it was
/// set.
#[derive(Debug, Default)]
pub struct PipelineStatus {
    done: AtomicBool,
    failed: AtomicBool,
}

impl PipelineStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The producer reached the end of the document. Every record it
    /// published is already in the queue.
    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// The producer hit a fatal fault and has stopped.
    pub fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
        self.done.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

/// Cooperative cancellation, observed by both tasks at every queue poll.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_clear() {
        let s = PipelineStatus::new();
        assert!(!s.is_done());
        assert!(!s.has_failed());
    }

    #[test]
    fn done_without_failure() {
        let s = PipelineStatus::new();
        s.mark_done();
        assert!(s.is_done());
        assert!(!s.has_failed());
    }

    #[test]
    fn failure_implies_done() {
        let s = PipelineStatus::new();
        s.mark_failed();
        assert!(s.is_done());
        assert!(s.has_failed());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
