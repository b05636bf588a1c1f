//! Retry orchestrator
//!
//! Each submitted task moves through
//! `Attempting -> {Succeeded | Retrying -> Attempting | Exhausted}`.
//! The task's [`RetryState`] is owned by exactly one stage at a time (an
//! in-flight attempt or a queued retry), so attempts of one task never
//! overlap and the callback is handed to the dispatcher exactly once.
//!
//! `shutdown` bumps the orchestrator epoch: attempts and deliveries that
//! belong to an older epoch are discarded without invoking their callbacks.

use parking_lot::RwLock;
use quill_protocol::TaskKind;
use quill_providers::{
    decode_reply, encode, system_prompt, AiError, HttpTransport, ProviderConfig, Transport,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::state::RetryState;
use crate::{
    BoxedCallback, ConsumerContext, DelayQueue, InlineContext, OrchestratorConfig, ResultCallback,
    RetrySlot, RetryTrigger, ScheduledRetry, SubmitError, TaskId, TaskPhase,
};

pub struct OrchestratorBuilder {
    provider: ProviderConfig,
    config: OrchestratorConfig,
    transport: Option<Arc<dyn Transport>>,
    context: Option<Arc<dyn ConsumerContext>>,
    runtime: Option<Handle>,
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Where callbacks run; defaults to [`InlineContext`]
    pub fn context(mut self, context: Arc<dyn ConsumerContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Runtime for attempts and the delay worker; defaults to the current one
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Orchestrator, AiError> {
        self.provider.validate()?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| {
                AiError::Configuration(
                    "orchestrator must be built inside a tokio runtime or given a handle".into(),
                )
            })?,
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.provider)?),
        };
        let context = self.context.unwrap_or_else(|| Arc::new(InlineContext));
        let epoch = Arc::new(AtomicU64::new(0));

        let inner = Arc::new(Inner {
            auth_header: self.provider.auth_header(),
            provider: self.provider,
            config: RwLock::new(self.config),
            transport,
            dispatcher: Dispatcher::new(context, epoch.clone()),
            delay_queue: DelayQueue::new(runtime.clone()),
            runtime,
            epoch,
            next_task_id: AtomicU64::new(1),
        });

        Ok(Orchestrator { inner })
    }
}

/// Runs text-processing tasks against one provider.
///
/// Dropping the orchestrator shuts it down.
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    provider: ProviderConfig,
    auth_header: String,
    config: RwLock<OrchestratorConfig>,
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    delay_queue: DelayQueue,
    runtime: Handle,
    epoch: Arc<AtomicU64>,
    next_task_id: AtomicU64,
}

impl Orchestrator {
    pub fn builder(provider: ProviderConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            provider,
            config: OrchestratorConfig::default(),
            transport: None,
            context: None,
            runtime: None,
        }
    }

    /// Start a task. The outcome reaches `callback` exactly once.
    ///
    /// Fails synchronously, without any attempt, when `callback` is absent
    /// (`InvalidArgument`, nothing delivered) or when `text` is empty or
    /// `kind` is absent (`InvalidInput`, also delivered to `callback`).
    pub fn submit(
        &self,
        text: &str,
        kind: Option<TaskKind>,
        callback: Option<BoxedCallback>,
    ) -> Result<TaskId, SubmitError> {
        let callback = callback
            .ok_or_else(|| SubmitError::InvalidArgument("a result callback is required".into()))?;

        let id = TaskId(self.inner.next_task_id.fetch_add(1, Ordering::SeqCst));
        let epoch = self.inner.epoch.load(Ordering::SeqCst);

        let checked = match kind {
            _ if text.is_empty() => Err("input text must not be empty"),
            None => Err("a task kind is required (translate, polish, summarize, correct or other)"),
            Some(kind) => Ok(kind),
        };
        let kind = match checked {
            Ok(kind) => kind,
            Err(reason) => {
                debug!(task_id = %id, reason, "rejecting task");
                self.inner.dispatcher.deliver(
                    id,
                    epoch,
                    callback,
                    Err(AiError::InvalidInput(reason.to_string())),
                );
                return Err(SubmitError::InvalidInput(reason.to_string()));
            }
        };

        let config = *self.inner.config.read();
        let state = RetryState {
            id,
            text: text.to_string(),
            kind,
            callback,
            max_attempts: config.max_retries(),
            attempts_so_far: 0,
            retry_delay: config.retry_delay(),
            epoch,
            phase: TaskPhase::Attempting,
            slot: RetrySlot::new(),
        };

        info!(
            task_id = %id,
            kind = %kind,
            text_len = text.len(),
            max_retries = state.max_attempts,
            "task submitted"
        );
        self.inner.spawn_attempt(state);
        Ok(id)
    }

    /// Typed convenience over [`Orchestrator::submit`]
    pub fn process(
        &self,
        text: &str,
        kind: TaskKind,
        callback: impl ResultCallback,
    ) -> Result<TaskId, SubmitError> {
        self.submit(text, Some(kind), Some(Box::new(callback)))
    }

    /// Replace the retry policy for tasks submitted from now on.
    pub fn update_config(&self, config: OrchestratorConfig) {
        *self.inner.config.write() = config;
    }

    pub fn config(&self) -> OrchestratorConfig {
        *self.inner.config.read()
    }

    pub fn system_prompt(&self, kind: TaskKind) -> &'static str {
        system_prompt(kind)
    }

    /// Retries currently waiting out their delay
    pub fn pending_retries(&self) -> usize {
        self.inner.delay_queue.pending()
    }

    /// Abort every waiting retry; affected tasks fail with `InterruptedRetry`.
    pub fn interrupt_retries(&self) {
        warn!(pending = self.pending_retries(), "interrupting pending retries");
        self.inner.delay_queue.reset();
    }

    /// Discard all in-flight work without invoking callbacks.
    ///
    /// Idempotent. The delay queue is recreated, so tasks submitted after
    /// shutdown run normally.
    pub fn shutdown(&self) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.delay_queue.reset();
        info!(epoch, "orchestrator shut down");
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.delay_queue.close();
    }
}

impl Inner {
    fn is_stale(&self, state: &RetryState) -> bool {
        self.epoch.load(Ordering::SeqCst) != state.epoch
    }

    fn spawn_attempt(self: &Arc<Self>, state: RetryState) {
        let inner = Arc::clone(self);
        self.runtime.spawn(async move { inner.attempt(state).await });
    }

    async fn attempt(self: Arc<Self>, mut state: RetryState) {
        if self.is_stale(&state) {
            debug!(task_id = %state.id, "orchestrator shut down, dropping attempt");
            return;
        }
        state.phase = TaskPhase::Attempting;

        let request = encode(
            &self.provider.model,
            system_prompt(state.kind),
            &state.text,
            self.provider.thinking,
        );
        debug!(
            task_id = %state.id,
            attempt = state.attempt_number(),
            max_retries = state.max_attempts,
            "attempting"
        );

        let outcome = match self.transport.send(&self.auth_header, &request).await {
            Ok(reply) => decode_reply(&reply),
            Err(e) => Err(AiError::TransportFailure(e)),
        };

        if self.is_stale(&state) {
            debug!(task_id = %state.id, "orchestrator shut down, discarding attempt result");
            return;
        }

        match outcome {
            Ok(reply) => {
                state.slot.cancel();
                state.phase = TaskPhase::Succeeded;
                info!(
                    task_id = %state.id,
                    attempt = state.attempt_number(),
                    reply_len = reply.len(),
                    "task succeeded"
                );
                self.finish(state, Ok(reply));
            }
            Err(error) => self.retry_or_fail(state, error),
        }
    }

    fn retry_or_fail(self: &Arc<Self>, mut state: RetryState, error: AiError) {
        if !state.can_retry() {
            state.phase = TaskPhase::Exhausted;
            warn!(
                task_id = %state.id,
                retries = state.max_attempts,
                error = %error,
                "task failed, no retries left"
            );
            let exhausted = AiError::Exhausted {
                retries: state.max_attempts,
                last: Box::new(error),
            };
            self.finish(state, Err(exhausted));
            return;
        }

        state.attempts_so_far += 1;
        state.phase = TaskPhase::Retrying;
        warn!(
            task_id = %state.id,
            retry = state.attempts_so_far,
            max_retries = state.max_attempts,
            delay_ms = state.retry_delay.as_millis() as u64,
            error = %error,
            "attempt failed, retrying after delay"
        );

        let id = state.id;
        let delay = state.retry_delay;
        let slot = state.slot.clone();
        let inner = Arc::clone(self);
        self.delay_queue.schedule(ScheduledRetry::new(
            id,
            delay,
            slot,
            move |trigger| match trigger {
                RetryTrigger::Fire => inner.spawn_attempt(state),
                RetryTrigger::Interrupted => inner.interrupted(state, error),
            },
        ));
    }

    fn interrupted(&self, mut state: RetryState, last: AiError) {
        if self.is_stale(&state) {
            debug!(task_id = %state.id, "orchestrator shut down, dropping interrupted retry");
            return;
        }
        state.phase = TaskPhase::Interrupted;
        warn!(task_id = %state.id, retry = state.attempts_so_far, "retry delay interrupted");
        let error = AiError::InterruptedRetry(format!(
            "retry {} of {} was cancelled before it ran; last failure: {}",
            state.attempts_so_far, state.max_attempts, last
        ));
        self.finish(state, Err(error));
    }

    fn finish(&self, state: RetryState, outcome: Result<String, AiError>) {
        debug_assert!(state.phase.is_terminal());
        self.dispatcher
            .deliver(state.id, state.epoch, state.callback, outcome);
    }
}
