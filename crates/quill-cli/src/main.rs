//! Quill - AI text processing for notes

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use quill_cli::commands::{Cli, Commands, ConfigCommands};
use quill_cli::render::outcome_json;
use quill_config::resolve_config;
use quill_protocol::TaskKind;
use quill_providers::{system_prompt, AiError};
use quill_runtime::{AiProvider, EventLoop, SubmitError};
use quill_telemetry::init_subscriber;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            task,
            config,
            json,
            text,
        } => run_task(task, config.as_deref(), json, text).await,
        Commands::Prompt { kind } => {
            run_prompt(kind);
            Ok(())
        }
        Commands::Config { command } => run_config(command),
    };

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run_task(
    task: TaskKind,
    config_path: Option<&Path>,
    json_output: bool,
    words: Vec<String>,
) -> Result<()> {
    let resolved = resolve_config(config_path)?;
    // a subscriber may already be installed
    let _ = init_subscriber(&resolved.config.telemetry);
    debug!(path = ?resolved.path, "configuration resolved");

    let ai_config = resolved.config.to_ai_config()?;
    let text = read_input(words)?;

    let consumer = EventLoop::spawn("quill-consumer").context("failed to start consumer thread")?;
    let provider = AiProvider::with_context(consumer.clone());
    provider.init(ai_config)?;

    if !json_output {
        eprintln!("{} {}", "Running:".cyan().bold(), task.to_string().yellow());
    }

    let (tx, rx) = oneshot::channel::<Result<String, AiError>>();
    let outcome = match provider.process(&text, task, tx) {
        Ok(_) | Err(SubmitError::InvalidInput(_)) => {
            rx.await.map_err(|_| anyhow!("task ended without a result"))?
        }
        Err(e) => return Err(e.into()),
    };

    provider.destroy();
    consumer.shutdown();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome_json(task, &outcome))?);
    }

    match outcome {
        Ok(reply) => {
            if !json_output {
                println!("{reply}");
            }
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}

/// Joined arguments, or all of stdin when no arguments were given and
/// stdin is not a terminal.
fn read_input(words: Vec<String>) -> Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }

    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text.trim_end_matches(&['\r', '\n'][..]).to_string())
}

fn run_prompt(kind: TaskKind) {
    println!("{}", system_prompt(kind));
}

fn run_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { config } => show_config(config),
    }
}

fn show_config(config_path: Option<PathBuf>) -> Result<()> {
    let resolved = resolve_config(config_path.as_deref())?;
    let source = match &resolved.path {
        Some(path) => path.display().to_string(),
        None => "defaults + environment".to_string(),
    };

    println!("{} {}", "Configuration:".cyan().bold(), source.dimmed());
    println!(
        "{}",
        serde_json::to_string_pretty(&resolved.config.redacted())?
    );

    if let Err(e) = resolved.config.to_ai_config() {
        eprintln!("{}: {:#}", "Warning".yellow().bold(), e);
    }
    Ok(())
}
