//! Helpers for turning non-2xx responses into readable messages

use serde::Deserialize;

/// Build a failure message from an error response body.
///
/// Understands both the nested OpenAI shape (`{"error": {...}}`) and a flat
/// `{"message", "type", "code"}` object; falls back to the raw text, then to
/// the status' canonical reason.
pub fn describe_error_body(status: u16, body: Option<&str>) -> String {
    let text = body.map(str::trim).unwrap_or_default();

    if !text.is_empty() {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(text) {
            if let Some(detail) = envelope.error {
                if !detail.is_empty() {
                    return detail.to_string();
                }
            }
        }
        if let Ok(detail) = serde_json::from_str::<ErrorDetail>(text) {
            if !detail.is_empty() {
                return detail.to_string();
            }
        }
        return text.to_string();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

/// Common error response structure used by OpenAI-compatible APIs
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(alias = "type")]
    error_type: Option<String>,
    #[serde(alias = "message")]
    error_message: Option<String>,
    #[serde(alias = "code")]
    error_code: Option<serde_json::Value>,
}

impl ErrorDetail {
    fn is_empty(&self) -> bool {
        self.error_type.is_none() && self.error_message.is_none() && self.error_code.is_none()
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if let Some(code) = &self.error_code {
            match code {
                serde_json::Value::String(s) => parts.push(format!("code: {}", s)),
                other => parts.push(format!("code: {}", other)),
            }
        }
        if let Some(error_type) = &self.error_type {
            parts.push(format!("type: {}", error_type));
        }
        if let Some(message) = &self.error_message {
            parts.push(format!("message: {}", message));
        }

        write!(f, "{}", parts.join(", "))
    }
}
