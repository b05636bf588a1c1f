//! Consumer execution contexts
//!
//! A consumer context is where terminal callbacks run: typically a UI thread.
//! [`EventLoop`] provides a dedicated thread that behaves like one;
//! [`InlineContext`] runs callbacks wherever the result was produced.

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, error};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("consumer context has been shut down")]
pub struct ContextClosed;

pub trait ConsumerContext: Send + Sync {
    /// Whether the calling thread already is this context
    fn is_current(&self) -> bool;

    /// Queue `job` to run on this context
    fn post(&self, job: Job) -> Result<(), ContextClosed>;
}

/// Runs every job immediately on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineContext;

impl ConsumerContext for InlineContext {
    fn is_current(&self) -> bool {
        true
    }

    fn post(&self, job: Job) -> Result<(), ContextClosed> {
        job();
        Ok(())
    }
}

/// Single dedicated thread draining a job queue in FIFO order
pub struct EventLoop {
    sender: Mutex<Option<UnboundedSender<Job>>>,
    closed: Arc<AtomicBool>,
    thread_id: ThreadId,
    name: String,
}

impl EventLoop {
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Arc<Self>> {
        let name = name.into();
        let (tx, mut rx) = unbounded_channel::<Job>();
        let closed = Arc::new(AtomicBool::new(false));
        let loop_closed = closed.clone();
        let loop_name = name.clone();

        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            while let Some(job) = rx.blocking_recv() {
                if loop_closed.load(Ordering::SeqCst) {
                    break;
                }
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!(context = %loop_name, "consumer job panicked");
                }
            }
            debug!(context = %loop_name, "event loop stopped");
        })?;

        Ok(Arc::new(Self {
            sender: Mutex::new(Some(tx)),
            closed,
            thread_id: handle.thread().id(),
            name,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop the loop. Jobs not yet started are dropped without running.
    ///
    /// Does not wait for a job that is currently running.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.sender.lock().take().is_some() {
            debug!(context = %self.name, "event loop shutting down");
        }
    }
}

impl ConsumerContext for EventLoop {
    fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    fn post(&self, job: Job) -> Result<(), ContextClosed> {
        if self.is_shut_down() {
            return Err(ContextClosed);
        }
        match self.sender.lock().as_ref() {
            Some(tx) => tx.send(job).map_err(|_| ContextClosed),
            None => Err(ContextClosed),
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
