//! Common types used across the Quill protocol

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Kind of text-processing task; selects the system instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Translate,
    Polish,
    #[serde(alias = "summary")]
    Summarize,
    Correct,
    Other,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Translate,
        TaskKind::Polish,
        TaskKind::Summarize,
        TaskKind::Correct,
        TaskKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Polish => "polish",
            Self::Summarize => "summarize",
            Self::Correct => "correct",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task kind: {0} (expected translate, polish, summarize, correct or other)")]
pub struct ParseTaskKindError(pub String);

impl FromStr for TaskKind {
    type Err = ParseTaskKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "translate" => Ok(Self::Translate),
            "polish" => Ok(Self::Polish),
            "summarize" | "summary" => Ok(Self::Summarize),
            "correct" => Ok(Self::Correct),
            "other" => Ok(Self::Other),
            _ => Err(ParseTaskKindError(s.to_string())),
        }
    }
}

/// Reasoning switch understood by some OpenAI-compatible endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingMode {
    Enabled,
    Disabled,
}
