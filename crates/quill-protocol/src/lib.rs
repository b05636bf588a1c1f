//! Quill Protocol - Shared types for the text-processing pipeline
//!
//! This crate defines the fundamental types used across Quill:
//! - Task kinds that select a system instruction
//! - Chat messages exchanged with the completion endpoint
//! - The outbound completion request payload

mod messages;
mod request;
mod types;

pub use messages::*;
pub use request::*;
pub use types::*;
