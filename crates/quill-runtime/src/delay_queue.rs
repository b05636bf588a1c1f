//! Single-worker queue that waits out retry delays
//!
//! One worker per orchestrator: delays of all tasks are served strictly one
//! after another. `reset` cancels the worker, interrupts every queued item and
//! starts a fresh worker so the queue stays usable.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{RetrySlot, TaskId};

/// Why a scheduled retry's continuation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryTrigger {
    /// The delay elapsed
    Fire,
    /// The queue was reset or closed before the delay elapsed
    Interrupted,
}

pub struct ScheduledRetry {
    pub task_id: TaskId,
    pub delay: Duration,
    slot: Arc<RetrySlot>,
    run: Box<dyn FnOnce(RetryTrigger) + Send + 'static>,
}

impl ScheduledRetry {
    pub fn new(
        task_id: TaskId,
        delay: Duration,
        slot: Arc<RetrySlot>,
        run: impl FnOnce(RetryTrigger) + Send + 'static,
    ) -> Self {
        Self {
            task_id,
            delay,
            slot,
            run: Box::new(run),
        }
    }

    fn fire(self, trigger: RetryTrigger) {
        (self.run)(trigger)
    }
}

struct Worker {
    tx: UnboundedSender<ScheduledRetry>,
    token: CancellationToken,
    generation: u64,
}

pub struct DelayQueue {
    runtime: Handle,
    worker: Mutex<Worker>,
    pending: Arc<AtomicUsize>,
}

impl DelayQueue {
    pub fn new(runtime: Handle) -> Self {
        let pending = Arc::new(AtomicUsize::new(0));
        let worker = start_worker(&runtime, pending.clone(), 0);
        Self {
            runtime,
            worker: Mutex::new(worker),
            pending,
        }
    }

    /// Queue a retry. Returns `false` if it was interrupted immediately
    /// because the task already has a pending retry or the queue is closed.
    pub fn schedule(&self, item: ScheduledRetry) -> bool {
        if !item.slot.try_reserve() {
            warn!(task_id = %item.task_id, "retry slot unavailable, interrupting retry");
            item.fire(RetryTrigger::Interrupted);
            return false;
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        let rejected = {
            let worker = self.worker.lock();
            if worker.token.is_cancelled() {
                Some(item)
            } else {
                worker.tx.send(item).err().map(|e| e.0)
            }
        };

        match rejected {
            Some(item) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                item.slot.release();
                debug!(task_id = %item.task_id, "delay queue closed, interrupting retry");
                item.fire(RetryTrigger::Interrupted);
                false
            }
            None => true,
        }
    }

    /// Interrupt everything queued and replace the worker with a fresh one.
    pub fn reset(&self) {
        let mut worker = self.worker.lock();
        worker.token.cancel();
        let generation = worker.generation + 1;
        *worker = start_worker(&self.runtime, self.pending.clone(), generation);
        debug!(generation, "delay queue reset");
    }

    /// Interrupt everything queued and refuse further items.
    pub fn close(&self) {
        self.worker.lock().token.cancel();
    }

    /// Retries waiting for their delay to elapse
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Number of times the worker has been replaced
    pub fn generation(&self) -> u64 {
        self.worker.lock().generation
    }
}

impl Drop for DelayQueue {
    fn drop(&mut self) {
        self.close();
    }
}

fn start_worker(runtime: &Handle, pending: Arc<AtomicUsize>, generation: u64) -> Worker {
    let (tx, rx) = unbounded_channel();
    let token = CancellationToken::new();
    runtime.spawn(run_worker(rx, token.clone(), pending, generation));
    Worker {
        tx,
        token,
        generation,
    }
}

async fn run_worker(
    mut rx: UnboundedReceiver<ScheduledRetry>,
    token: CancellationToken,
    pending: Arc<AtomicUsize>,
    generation: u64,
) {
    loop {
        let item = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            item = rx.recv() => match item {
                Some(item) => item,
                None => break,
            },
        };

        let interrupted = tokio::select! {
            biased;
            _ = token.cancelled() => true,
            _ = tokio::time::sleep(item.delay) => false,
        };

        pending.fetch_sub(1, Ordering::SeqCst);
        item.slot.release();

        if interrupted {
            debug!(task_id = %item.task_id, generation, "retry delay interrupted");
            item.fire(RetryTrigger::Interrupted);
            break;
        }

        if item.slot.is_cancelled() {
            debug!(task_id = %item.task_id, "task already completed, dropping retry");
            continue;
        }

        item.fire(RetryTrigger::Fire);
    }

    rx.close();
    while let Ok(item) = rx.try_recv() {
        pending.fetch_sub(1, Ordering::SeqCst);
        item.slot.release();
        item.fire(RetryTrigger::Interrupted);
    }
    debug!(generation, "delay worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::sync::mpsc;

    fn item(
        id: u64,
        delay_ms: u64,
        slot: Arc<RetrySlot>,
        tx: mpsc::UnboundedSender<(u64, RetryTrigger, Instant)>,
    ) -> ScheduledRetry {
        ScheduledRetry::new(
            TaskId(id),
            Duration::from_millis(delay_ms),
            slot,
            move |trigger| {
                let _ = tx.send((id, trigger, Instant::now()));
            },
        )
    }

    #[tokio::test]
    async fn test_fires_after_delay() {
        let queue = DelayQueue::new(Handle::current());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();

        assert!(queue.schedule(item(1, 30, RetrySlot::new(), tx)));
        assert_eq!(queue.pending(), 1);

        let (id, trigger, at) = rx.recv().await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(trigger, RetryTrigger::Fire);
        assert!(at.duration_since(start) >= Duration::from_millis(30));
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_delays_are_served_one_at_a_time() {
        let queue = DelayQueue::new(Handle::current());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();

        queue.schedule(item(1, 40, RetrySlot::new(), tx.clone()));
        queue.schedule(item(2, 40, RetrySlot::new(), tx));

        let (first, _, _) = rx.recv().await.unwrap();
        let (second, _, at) = rx.recv().await.unwrap();
        assert_eq!((first, second), (1, 2));
        assert!(at.duration_since(start) >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_reset_interrupts_pending_and_recreates_worker() {
        let queue = DelayQueue::new(Handle::current());
        let (tx, mut rx) = mpsc::unbounded_channel();

        queue.schedule(item(1, 60_000, RetrySlot::new(), tx.clone()));
        queue.schedule(item(2, 60_000, RetrySlot::new(), tx.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;

        queue.reset();
        let mut interrupted = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        interrupted.sort_by_key(|(id, _, _)| *id);
        assert!(interrupted
            .iter()
            .all(|(_, trigger, _)| *trigger == RetryTrigger::Interrupted));
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.generation(), 1);

        assert!(queue.schedule(item(3, 10, RetrySlot::new(), tx)));
        let (id, trigger, _) = rx.recv().await.unwrap();
        assert_eq!((id, trigger), (3, RetryTrigger::Fire));
    }

    #[tokio::test]
    async fn test_second_pending_retry_for_same_task_is_refused() {
        let queue = DelayQueue::new(Handle::current());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let slot = RetrySlot::new();

        assert!(queue.schedule(item(1, 50, slot.clone(), tx.clone())));
        assert!(!queue.schedule(item(1, 50, slot.clone(), tx)));

        let (_, trigger, _) = rx.recv().await.unwrap();
        assert_eq!(trigger, RetryTrigger::Interrupted);
        let (_, trigger, _) = rx.recv().await.unwrap();
        assert_eq!(trigger, RetryTrigger::Fire);
    }

    #[tokio::test]
    async fn test_cancelled_slot_skips_queued_retry() {
        let queue = DelayQueue::new(Handle::current());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let slot = RetrySlot::new();

        queue.schedule(item(1, 30, slot.clone(), tx.clone()));
        slot.cancel();
        queue.schedule(item(2, 10, RetrySlot::new(), tx));

        let (id, trigger, _) = rx.recv().await.unwrap();
        assert_eq!((id, trigger), (2, RetryTrigger::Fire));
    }

    #[tokio::test]
    async fn test_closed_queue_interrupts_new_items() {
        let queue = DelayQueue::new(Handle::current());
        let (tx, mut rx) = mpsc::unbounded_channel();

        queue.close();
        assert!(!queue.schedule(item(1, 10, RetrySlot::new(), tx)));
        let (_, trigger, _) = rx.recv().await.unwrap();
        assert_eq!(trigger, RetryTrigger::Interrupted);
    }
}
