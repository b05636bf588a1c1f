//! Quill Runtime - task lifecycle for text-processing requests
//!
//! Turns `submit(text, kind, callback)` into exactly one terminal callback:
//! attempts run on the tokio runtime, failed attempts are retried after a
//! fixed delay on a shared single-worker delay queue, and the outcome is
//! delivered on the caller's consumer context.

mod callback;
mod config;
mod context;
mod delay_queue;
mod dispatcher;
mod error;
mod orchestrator;
mod provider;
mod state;

pub use callback::{callback_fn, BoxedCallback, FnCallback, ResultCallback};
pub use config::{AiConfig, OrchestratorConfig};
pub use context::{ConsumerContext, ContextClosed, EventLoop, InlineContext, Job};
pub use delay_queue::{DelayQueue, RetryTrigger, ScheduledRetry};
pub use error::SubmitError;
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use provider::AiProvider;
pub use state::{RetrySlot, TaskId, TaskPhase};
