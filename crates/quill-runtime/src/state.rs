//! Per-task retry state

use quill_protocol::TaskKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::BoxedCallback;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Attempting,
    Retrying,
    Succeeded,
    Exhausted,
    Interrupted,
}

impl TaskPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted | Self::Interrupted)
    }
}

/// Single-slot guard shared between a task and the delay queue.
///
/// Holds at most one pending retry, and a sticky cancellation flag that is set
/// once the task succeeds.
#[derive(Debug, Default)]
pub struct RetrySlot {
    pending: AtomicBool,
    cancelled: AtomicBool,
}

impl RetrySlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the slot for a new pending retry; fails if one is already queued
    /// or the task was cancelled.
    pub fn try_reserve(&self) -> bool {
        !self.is_cancelled()
            && self
                .pending
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
    }

    pub fn release(&self) {
        self.pending.store(false, Ordering::SeqCst);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Owned by whichever stage currently drives the task: an in-flight attempt
/// or a queued retry. Never shared, so attempts cannot overlap.
pub(crate) struct RetryState {
    pub id: TaskId,
    pub text: String,
    pub kind: TaskKind,
    pub callback: BoxedCallback,
    pub max_attempts: u32,
    pub attempts_so_far: u32,
    pub retry_delay: Duration,
    pub epoch: u64,
    pub phase: TaskPhase,
    pub slot: Arc<RetrySlot>,
}

impl RetryState {
    pub fn can_retry(&self) -> bool {
        self.attempts_so_far < self.max_attempts
    }

    /// 1-based number of the attempt about to run or running
    pub fn attempt_number(&self) -> u32 {
        self.attempts_so_far + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_holds_one_pending_retry() {
        let slot = RetrySlot::new();
        assert!(slot.try_reserve());
        assert!(!slot.try_reserve());

        slot.release();
        assert!(slot.try_reserve());
    }

    #[test]
    fn test_cancelled_slot_refuses_reservations() {
        let slot = RetrySlot::new();
        slot.cancel();
        assert!(!slot.try_reserve());
        assert!(slot.is_cancelled());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(TaskPhase::Succeeded.is_terminal());
        assert!(TaskPhase::Exhausted.is_terminal());
        assert!(TaskPhase::Interrupted.is_terminal());
        assert!(!TaskPhase::Retrying.is_terminal());
        assert!(!TaskPhase::Attempting.is_terminal());
    }
}
