//! Provider configuration

use quill_protocol::ThinkingMode;
use secrecy::{ExposeSecret, SecretString};

use crate::AiError;

/// Connect and read timeout applied when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Endpoint, model and credentials for the completion service
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL without the `/chat/completions` suffix,
    /// e.g. `https://ark.cn-beijing.volces.com/api/v3`
    pub base_url: String,

    /// Model (or endpoint) identifier sent in every request
    pub model: String,

    pub api_key: SecretString,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,

    /// Optional `thinking` switch; omitted from the payload when `None`
    pub thinking: Option<ThinkingMode>,
}

impl ProviderConfig {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout_seconds: None,
            thinking: None,
        }
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_thinking(mut self, mode: ThinkingMode) -> Self {
        self.thinking = Some(mode);
        self
    }

    /// Reject configurations that could never produce a successful request.
    pub fn validate(&self) -> Result<(), AiError> {
        let mut missing = Vec::new();
        if self.base_url.trim().is_empty() {
            missing.push("base_url");
        }
        if self.model.trim().is_empty() {
            missing.push("model");
        }
        if self.api_key.expose_secret().trim().is_empty() {
            missing.push("api_key");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AiError::Configuration(format!(
                "missing provider settings: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ProviderConfig::new("https://api.example.com/v3/", "m", "k");
        assert_eq!(
            config.chat_completions_url(),
            "https://api.example.com/v3/chat/completions"
        );
    }

    #[test]
    fn test_auth_header_uses_bearer_scheme() {
        let config = ProviderConfig::new("https://x", "m", "sk-123");
        assert_eq!(config.auth_header(), "Bearer sk-123");
    }

    #[test]
    fn test_validate_lists_every_missing_field() {
        let err = ProviderConfig::new("", "m", " ").validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("base_url"));
        assert!(msg.contains("api_key"));
        assert!(!msg.contains("model"));
    }

    #[test]
    fn test_default_timeout() {
        let config = ProviderConfig::new("https://x", "m", "k");
        assert_eq!(config.timeout().as_secs(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.with_timeout_seconds(5).timeout().as_secs(), 5);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let config = ProviderConfig::new("https://x", "m", "sk-secret");
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}
