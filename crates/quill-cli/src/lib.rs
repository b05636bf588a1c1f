//! Quill CLI - Command-line interface
//!
//! Provides the `quill` binary:
//! - `run`: process text with the configured model
//! - `prompt`: print the system instruction for a task kind
//! - `config show`: print the effective configuration with secrets masked

pub mod commands;
pub mod render;

pub use commands::{Cli, Commands, ConfigCommands};
