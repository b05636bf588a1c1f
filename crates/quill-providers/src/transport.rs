//! Transport seam: performs exactly one HTTP exchange per call

use async_trait::async_trait;
use quill_protocol::CompletionRequest;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use crate::{AiError, PayloadLogger, ProviderConfig, TransportError};

/// Status and raw body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    /// `None` when the server sent no body
    pub body: Option<String>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one chat-completion call.
///
/// Implementations report any HTTP status as `Ok`; `Err` is reserved for
/// failures where no response was obtained (timeout, DNS, reset, ...).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        auth_header: &str,
        request: &CompletionRequest,
    ) -> Result<HttpReply, TransportError>;
}

/// reqwest-backed transport posting to `<base_url>/chat/completions`
pub struct HttpTransport {
    client: Client,
    url: String,
    payload_log: PayloadLogger,
}

impl HttpTransport {
    pub fn new(config: &ProviderConfig) -> Result<Self, AiError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.chat_completions_url(),
            payload_log: PayloadLogger::from_env(),
        })
    }

    pub fn with_payload_logger(mut self, logger: PayloadLogger) -> Self {
        self.payload_log = logger;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        auth_header: &str,
        request: &CompletionRequest,
    ) -> Result<HttpReply, TransportError> {
        if self.payload_log.is_enabled() {
            if let Ok(value) = serde_json::to_value(request) {
                self.payload_log.log_request(&request.model, &value);
            }
        }

        debug!(url = %self.url, model = %request.model, "sending chat completion request");

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, auth_header)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let err = TransportError::from(e);
                self.payload_log.log_error(&err.to_string());
                err
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            let err = TransportError::from(e);
            self.payload_log.log_error(&err.to_string());
            err
        })?;

        self.payload_log.log_response(status, Some(&text));
        debug!(status, body_bytes = text.len(), "chat completion response received");

        Ok(HttpReply {
            status,
            body: if text.is_empty() { None } else { Some(text) },
        })
    }
}
