//! Error types for the request pipeline

use thiserror::Error;

/// Coarse classification of an [`AiError`], useful for matching and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotInitialized,
    Configuration,
    TransportFailure,
    BusinessFailure,
    MalformedResponse,
    Exhausted,
    InterruptedRetry,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotInitialized => "not_initialized",
            Self::Configuration => "configuration",
            Self::TransportFailure => "transport_failure",
            Self::BusinessFailure => "business_failure",
            Self::MalformedResponse => "malformed_response",
            Self::Exhausted => "exhausted",
            Self::InterruptedRetry => "interrupted_retry",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not initialized: {0}")]
    NotInitialized(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport failure: {0}")]
    TransportFailure(#[from] TransportError),

    #[error("request failed with status {status}: {message}")]
    BusinessFailure { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("failed after {retries} retries: {last}")]
    Exhausted {
        retries: u32,
        #[source]
        last: Box<AiError>,
    },

    #[error("retry delay interrupted: {0}")]
    InterruptedRetry(String),
}

impl AiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotInitialized(_) => ErrorKind::NotInitialized,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::TransportFailure(_) => ErrorKind::TransportFailure,
            Self::BusinessFailure { .. } => ErrorKind::BusinessFailure,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Exhausted { .. } => ErrorKind::Exhausted,
            Self::InterruptedRetry(_) => ErrorKind::InterruptedRetry,
        }
    }

    /// Whether a fresh attempt could plausibly succeed.
    ///
    /// Only the orchestrator acts on this; callers see it for diagnostics.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure(_) | Self::BusinessFailure { .. } | Self::MalformedResponse(_)
        )
    }

    /// The failure that ended the last attempt, unwrapping `Exhausted`.
    pub fn last_failure(&self) -> &AiError {
        match self {
            Self::Exhausted { last, .. } => last.last_failure(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Body,
    Request,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connection error"),
            Self::Body => write!(f, "body read error"),
            Self::Request => write!(f, "request error"),
        }
    }
}

/// Network-level failure: no HTTP status was obtained
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Request
        };
        Self::new(kind, err.to_string())
    }
}
