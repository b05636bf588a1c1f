//! CLI commands

use clap::{Parser, Subcommand};
use quill_protocol::TaskKind;
use std::path::PathBuf;

/// Quill - AI text processing for notes
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process text with the configured model
    Run {
        /// Task to perform (translate, polish, summarize, correct, other)
        #[arg(short, long)]
        task: TaskKind,

        /// Config file (default: quill.* in the working directory, then ~/.config/quill/)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Text to process; read from stdin when omitted
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Print the system instruction used for a task kind
    Prompt {
        /// Task kind (translate, polish, summarize, correct, other)
        kind: TaskKind,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (API key masked)
    Show {
        /// Config file to inspect instead of the discovered one
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "quill", "run", "--task", "summary", "--json", "hello", "world",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                task,
                config,
                json,
                text,
            } => {
                assert_eq!(task, TaskKind::Summarize);
                assert!(config.is_none());
                assert!(json);
                assert_eq!(text, vec!["hello", "world"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_task_kind_is_rejected() {
        assert!(Cli::try_parse_from(["quill", "run", "--task", "rewrite", "x"]).is_err());
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["quill", "config", "show", "--config", "quill.yml"]).unwrap();
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Show { config },
            } => assert_eq!(config, Some(PathBuf::from("quill.yml"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
