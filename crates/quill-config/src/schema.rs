use anyhow::{Context, Result};
use quill_protocol::ThinkingMode;
use quill_providers::ProviderConfig;
use quill_runtime::{AiConfig, OrchestratorConfig};
use quill_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

/// Main Quill configuration
///
/// Loaded from (in priority order) `quill.jsonc`, `quill.json`, `quill.yml`,
/// `quill.yaml`, their hidden `.quill.*` variants, then the same names under
/// `~/.config/quill/`.
///
/// # Example
///
/// ```yaml
/// provider:
///   base_url: https://ark.cn-beijing.volces.com/api/v3
///   model: doubao-seed-1-6-250615
///   api_key: ${ARK_API_KEY}
///   thinking: disabled
/// retry:
///   enabled: true
///   max_retry_count: 3
///   retry_delay_ms: 1000
/// telemetry:
///   level: info
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl QuillConfig {
    /// Build the runtime configuration, failing on missing provider settings.
    pub fn to_ai_config(&self) -> Result<AiConfig> {
        let provider = self.provider.to_provider_config();
        provider
            .validate()
            .context("provider section is incomplete; set it in quill.yml or via QUILL_* variables")?;
        Ok(AiConfig::new(provider).with_orchestrator(self.retry.to_orchestrator_config()))
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.provider.api_key = copy.provider.api_key.as_deref().map(mask_secret);
        copy
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL without `/chat/completions`
    #[serde(default)]
    pub base_url: String,

    /// Model or endpoint id
    #[serde(default)]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingMode>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("thinking", &self.thinking)
            .finish()
    }
}

impl ProviderSettings {
    pub fn to_provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new(
            self.base_url.clone(),
            self.model.clone(),
            self.api_key.clone().unwrap_or_default(),
        );
        config.timeout_seconds = self.timeout_seconds;
        config.thinking = self.thinking;
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_retry_enabled")]
    pub enabled: bool,

    /// Retries after the first attempt (default: 3)
    #[serde(default = "default_max_retry_count")]
    pub max_retry_count: u32,

    /// Fixed delay before each retry (default: 1000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: default_retry_enabled(),
            max_retry_count: default_max_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RetrySettings {
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            retry_enabled: self.enabled,
            max_retry_count: self.max_retry_count,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

fn default_retry_enabled() -> bool {
    true
}

fn default_max_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "********".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("********{tail}")
}
