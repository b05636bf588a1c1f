//! Orchestrator configuration

use quill_providers::{AiError, ProviderConfig};
use std::time::Duration;

/// Retry policy, snapshotted by each task at submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub retry_enabled: bool,
    /// Retries after the first attempt
    pub max_retry_count: u32,
    /// Fixed wait before each retry, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry_enabled: true,
            max_retry_count: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl OrchestratorConfig {
    pub fn no_retry() -> Self {
        Self {
            retry_enabled: false,
            ..Self::default()
        }
    }

    /// Retries a task submitted now may use
    pub fn max_retries(&self) -> u32 {
        if self.retry_enabled {
            self.max_retry_count
        } else {
            0
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Everything [`crate::AiProvider::init`] needs
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: ProviderConfig,
    pub orchestrator: OrchestratorConfig,
}

impl AiConfig {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            orchestrator: OrchestratorConfig::default(),
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: OrchestratorConfig) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn validate(&self) -> Result<(), AiError> {
        self.provider.validate()
    }
}
