//! Optional JSONL payload logging for debugging and auditing
//!
//! Enable via `QUILL_PAYLOAD_LOG=true` environment variable.
//! Logs are written to `~/.local/share/quill/logs/payload.jsonl` by default.
//! Override path with `QUILL_PAYLOAD_LOG_FILE`.

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Payload log event structure
#[derive(Debug, Clone, Serialize)]
pub struct PayloadLogEvent {
    pub ts: String,
    pub stage: String, // "request" | "response" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PayloadLogEvent {
    fn new(stage: &str) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            stage: stage.to_string(),
            model_id: None,
            payload_digest: None,
            status: None,
            body_bytes: None,
            error: None,
        }
    }
}

/// Payload logger with environment-based opt-in
#[derive(Debug, Clone)]
pub struct PayloadLogger {
    enabled: bool,
    log_path: PathBuf,
}

impl PayloadLogger {
    /// Create logger from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("QUILL_PAYLOAD_LOG")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let log_path = std::env::var("QUILL_PAYLOAD_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_log_path());

        Self { enabled, log_path }
    }

    pub fn to_file(log_path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            log_path: log_path.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            log_path: Self::default_log_path(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn default_log_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("quill");
        path.push("logs");
        path.push("payload.jsonl");
        path
    }

    /// Log a request payload with SHA-256 digest
    pub fn log_request(&self, model_id: &str, payload: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let redacted = redact_secrets(payload);
        let mut event = PayloadLogEvent::new("request");
        event.model_id = Some(model_id.to_string());
        event.payload_digest = Some(compute_digest(&redacted));

        self.write_event(&event);
    }

    pub fn log_response(&self, status: u16, body: Option<&str>) {
        if !self.enabled {
            return;
        }

        let mut event = PayloadLogEvent::new("response");
        event.status = Some(status);
        event.body_bytes = Some(body.map(str::len).unwrap_or(0));

        self.write_event(&event);
    }

    pub fn log_error(&self, error: &str) {
        if !self.enabled {
            return;
        }

        let mut event = PayloadLogEvent::new("error");
        event.error = Some(error.to_string());

        self.write_event(&event);
    }

    fn write_event(&self, event: &PayloadLogEvent) {
        if let Some(parent) = self.log_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
        {
            Ok(mut file) => {
                if let Ok(json) = serde_json::to_string(event) {
                    let _ = writeln!(file, "{}", json);
                }
            }
            Err(e) => {
                tracing::debug!(path = %self.log_path.display(), error = %e, "payload log unavailable");
            }
        }
    }
}

fn redact_secrets(payload: &serde_json::Value) -> serde_json::Value {
    let mut redacted = payload.clone();

    if let Some(obj) = redacted.as_object_mut() {
        let secret_keys = ["api_key", "apiKey", "token", "authorization", "secret"];
        for key in &secret_keys {
            if obj.contains_key(*key) {
                obj.insert(key.to_string(), serde_json::json!("[REDACTED]"));
            }
        }
    }

    redacted
}

fn compute_digest(payload: &serde_json::Value) -> String {
    let json_str = serde_json::to_string(payload).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json_str.as_bytes());
    hex::encode(hasher.finalize())
}
