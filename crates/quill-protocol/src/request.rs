//! Outbound chat-completion request payload

use serde::{Deserialize, Serialize};

use crate::{ChatMessage, ThinkingMode};

/// Body of `POST <base_url>/chat/completions`
///
/// Built fresh for every attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Thinking>,
}

/// `{"type": "enabled" | "disabled"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thinking {
    #[serde(rename = "type")]
    pub mode: ThinkingMode,
}

impl From<ThinkingMode> for Thinking {
    fn from(mode: ThinkingMode) -> Self {
        Self { mode }
    }
}

impl CompletionRequest {
    pub fn system_message(&self) -> Option<&ChatMessage> {
        self.messages.first()
    }

    pub fn user_message(&self) -> Option<&ChatMessage> {
        self.messages.get(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_without_thinking() {
        let request = CompletionRequest {
            model: "doubao-lite".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hello")],
            stream: false,
            thinking: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "doubao-lite",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hello"}
                ],
                "stream": false
            })
        );
    }

    #[test]
    fn test_thinking_is_nested_under_type() {
        let request = CompletionRequest {
            model: "m".to_string(),
            messages: Vec::new(),
            stream: false,
            thinking: Some(ThinkingMode::Disabled.into()),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["thinking"], json!({"type": "disabled"}));
    }
}
