//! Delivers terminal outcomes on the consumer context

use quill_providers::AiError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::{BoxedCallback, ConsumerContext, TaskId};

pub(crate) struct Dispatcher {
    context: Arc<dyn ConsumerContext>,
    epoch: Arc<AtomicU64>,
}

impl Dispatcher {
    pub fn new(context: Arc<dyn ConsumerContext>, epoch: Arc<AtomicU64>) -> Self {
        Self { context, epoch }
    }

    /// Hand `outcome` to `callback` exactly once, on the consumer context.
    ///
    /// Runs synchronously when already on the context. The delivery is
    /// dropped if the orchestrator was shut down after the task was
    /// submitted (`epoch` moved on) or the context is gone.
    pub fn deliver(
        &self,
        task_id: TaskId,
        epoch: u64,
        callback: BoxedCallback,
        outcome: Result<String, AiError>,
    ) {
        let live_epoch = self.epoch.clone();
        let job = move || {
            if live_epoch.load(Ordering::SeqCst) != epoch {
                debug!(%task_id, "orchestrator shut down, dropping result");
                return;
            }
            match outcome {
                Ok(reply) => callback.on_success(reply),
                Err(error) => callback.on_failure(error),
            }
        };

        if self.context.is_current() {
            job();
        } else if self.context.post(Box::new(job)).is_err() {
            debug!(%task_id, "consumer context closed, dropping result");
        }
    }
}
