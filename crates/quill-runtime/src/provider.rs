//! Application-facing facade over one [`Orchestrator`]

use parking_lot::RwLock;
use quill_protocol::TaskKind;
use quill_providers::{system_prompt, AiError, Transport};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

use crate::{
    AiConfig, ConsumerContext, InlineContext, Orchestrator, ResultCallback, SubmitError, TaskId,
};

/// Explicitly constructed entry point: `init`, then `process`, then `destroy`.
pub struct AiProvider {
    context: Arc<dyn ConsumerContext>,
    runtime: Option<Handle>,
    orchestrator: RwLock<Option<Arc<Orchestrator>>>,
}

impl Default for AiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AiProvider {
    /// Callbacks run inline on whichever thread produced the result.
    pub fn new() -> Self {
        Self::with_context(Arc::new(InlineContext))
    }

    pub fn with_context(context: Arc<dyn ConsumerContext>) -> Self {
        Self {
            context,
            runtime: None,
            orchestrator: RwLock::new(None),
        }
    }

    /// Run attempts on `runtime` instead of the runtime current at `init`.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validate `config` and start a fresh orchestrator talking HTTP.
    ///
    /// Re-initializing shuts the previous orchestrator down first.
    pub fn init(&self, config: AiConfig) -> Result<(), AiError> {
        self.install(config, None)
    }

    /// Like [`AiProvider::init`] with a caller-supplied transport
    pub fn init_with_transport(
        &self,
        config: AiConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<(), AiError> {
        self.install(config, Some(transport))
    }

    fn install(
        &self,
        config: AiConfig,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<(), AiError> {
        config.validate()?;

        let mut builder = Orchestrator::builder(config.provider.clone())
            .config(config.orchestrator)
            .context(self.context.clone());
        if let Some(transport) = transport {
            builder = builder.transport(transport);
        }
        if let Some(runtime) = &self.runtime {
            builder = builder.runtime(runtime.clone());
        }
        let orchestrator = Arc::new(builder.build()?);

        let previous = self.orchestrator.write().replace(orchestrator);
        if let Some(previous) = previous {
            previous.shutdown();
        }
        info!(
            model = %config.provider.model,
            base_url = %config.provider.base_url,
            max_retries = config.orchestrator.max_retries(),
            "ai provider initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.orchestrator.read().is_some()
    }

    pub fn process(
        &self,
        text: &str,
        kind: TaskKind,
        callback: impl ResultCallback,
    ) -> Result<TaskId, SubmitError> {
        let orchestrator = self.orchestrator.read().clone();
        match orchestrator {
            Some(orchestrator) => orchestrator.process(text, kind, callback),
            None => Err(SubmitError::NotInitialized(
                "call init before processing text".into(),
            )),
        }
    }

    pub fn system_prompt(&self, kind: TaskKind) -> &'static str {
        system_prompt(kind)
    }

    /// The running orchestrator, for retry control and inspection
    pub fn orchestrator(&self) -> Option<Arc<Orchestrator>> {
        self.orchestrator.read().clone()
    }

    /// Shut down and forget the orchestrator. Safe to call repeatedly.
    pub fn destroy(&self) {
        if let Some(orchestrator) = self.orchestrator.write().take() {
            orchestrator.shutdown();
            info!("ai provider destroyed");
        }
    }
}

impl Drop for AiProvider {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback_fn;
    use quill_providers::ProviderConfig;

    #[test]
    fn test_process_before_init_is_rejected() {
        let provider = AiProvider::new();
        let outcome = provider.process("hello", TaskKind::Translate, callback_fn(|_| {}, |_| {}));
        assert!(matches!(outcome, Err(SubmitError::NotInitialized(_))));
        assert!(!provider.is_initialized());
    }

    #[tokio::test]
    async fn test_init_rejects_missing_settings() {
        let provider = AiProvider::new();
        let config = AiConfig::new(ProviderConfig::new("", "model", "key"));
        assert!(matches!(
            provider.init(config),
            Err(AiError::Configuration(_))
        ));
        assert!(!provider.is_initialized());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let provider = AiProvider::new();
        provider
            .init(AiConfig::new(ProviderConfig::new(
                "https://example.invalid/api/v3",
                "model",
                "key",
            )))
            .unwrap();
        assert!(provider.is_initialized());

        provider.destroy();
        provider.destroy();
        assert!(!provider.is_initialized());
    }

    #[test]
    fn test_system_prompt_without_init() {
        let provider = AiProvider::new();
        assert!(!provider.system_prompt(TaskKind::Polish).is_empty());
    }
}
