//! Quill Providers - everything needed to perform one chat-completion attempt
//!
//! - system prompts per task kind
//! - request encoding and response decoding
//! - the transport seam and its reqwest implementation

mod codec;
mod config;
mod error;
mod payload_log;
mod prompts;
mod response_handling;
mod transport;

pub use codec::{decode, decode_reply, encode};
pub use config::{ProviderConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{AiError, ErrorKind, TransportError, TransportErrorKind};
pub use payload_log::{PayloadLogEvent, PayloadLogger};
pub use prompts::system_prompt;
pub use response_handling::describe_error_body;
pub use secrecy::{ExposeSecret, SecretString};
pub use transport::{HttpReply, HttpTransport, Transport};
