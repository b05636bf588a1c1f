//! Output formatting for task outcomes

use quill_protocol::TaskKind;
use quill_providers::AiError;
use serde_json::json;

/// JSON document describing one finished task
pub fn outcome_json(task: TaskKind, outcome: &Result<String, AiError>) -> serde_json::Value {
    match outcome {
        Ok(reply) => json!({
            "task": task,
            "status": "ok",
            "reply": reply,
        }),
        Err(error) => json!({
            "task": task,
            "status": "error",
            "error": {
                "kind": error.kind().as_str(),
                "cause": error.last_failure().kind().as_str(),
                "message": error.to_string(),
            },
        }),
    }
}
