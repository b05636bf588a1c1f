//! Request encoding and response decoding for `/chat/completions`

use quill_protocol::{ChatMessage, CompletionRequest, ThinkingMode};
use serde::Deserialize;

use crate::{response_handling::describe_error_body, AiError, HttpReply};

/// Wrap a system instruction and the user's text as a two-message conversation.
///
/// Streaming is always off: the pipeline only consumes complete replies.
pub fn encode(
    model: &str,
    system_prompt: &str,
    user_text: &str,
    thinking: Option<ThinkingMode>,
) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_text)],
        stream: false,
        thinking: thinking.map(Into::into),
    }
}

/// Extract `choices[0].message.content` from a response body.
///
/// Structural absence (no body, no choices, no message) is a
/// `MalformedResponse`; a missing or null `content` decodes to `""`.
pub fn decode(body: Option<&str>) -> Result<String, AiError> {
    let body = match body.map(str::trim) {
        Some(body) if !body.is_empty() => body,
        _ => return Err(AiError::MalformedResponse("response body is empty".into())),
    };

    let response: Option<CompletionResponse> = serde_json::from_str(body).map_err(|e| {
        AiError::MalformedResponse(format!("response is not a valid completion: {e}"))
    })?;
    let response =
        response.ok_or_else(|| AiError::MalformedResponse("response body is null".into()))?;

    let first = response
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| AiError::MalformedResponse("response has no choices".into()))?;

    let message = first
        .and_then(|choice| choice.message)
        .ok_or_else(|| AiError::MalformedResponse("first choice has no message".into()))?;

    Ok(message.content.unwrap_or_default())
}

/// Turn one HTTP exchange into a reply or a classified failure.
pub fn decode_reply(reply: &HttpReply) -> Result<String, AiError> {
    if !reply.is_success() {
        return Err(AiError::BusinessFailure {
            status: reply.status,
            message: describe_error_body(reply.status, reply.body.as_deref()),
        });
    }
    decode(reply.body.as_deref())
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Option<Choice>>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
