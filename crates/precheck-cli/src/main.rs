//! precheck CLI
//!
//! Structural pre-check of model responses before LLM judging.
//!
//! # Usage
//!
//! ```bash
//! # Validate one response (stdin when FILE is omitted)
//! precheck validate --task spellScripting response.txt
//!
//! # Validate stored records, one JSON object per line
//! precheck batch responses.jsonl > verdicts.jsonl
//!
//! # List or inspect registered schemas
//! precheck schemas --show automataScripting
//! ```
//!
//! # Exit Codes
//!
//! - 0: Passed, or skipped (no schema for the task type)
//! - 1: Failed
//! - 3: Invalid input, arguments, or configuration

mod commands;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};

use settings::Settings;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "precheck", version, about = "Structural pre-check for generated outputs")]
struct Cli {
    /// Config file (YAML): validator settings and extra schema files
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stop at the first violation
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Maximum node-list nesting depth
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Locate JSON by balanced braces instead of first `{` to last `}`
    #[arg(long, global = true)]
    balanced: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a single response
    Validate {
        /// Task type, e.g. spellScripting
        #[arg(long)]
        task: String,

        /// Response file; reads stdin when omitted
        file: Option<PathBuf>,

        #[arg(long, default_value = "text", value_enum)]
        output: OutputFormat,
    },

    /// Validate stored records (JSONL with row_id, task_key, model_response)
    Batch {
        file: PathBuf,
    },

    /// List registered task types
    Schemas {
        /// Print the definition of one task type as YAML
        #[arg(long)]
        show: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_error_code(&e));
        }
    };

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(commands::EXIT_INPUT_ERROR)
        }
    }
}

/// `--help` and `--version` exit 0; every other argument error is an input error.
fn parse_error_code(e: &clap::Error) -> u8 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => commands::EXIT_INPUT_ERROR,
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.apply_overrides(cli.fail_fast, cli.max_depth, cli.balanced);
    let validator = settings.build_validator()?;

    match cli.command {
        Commands::Validate { task, file, output } => {
            commands::validate(&validator, &task, file.as_deref(), output)
        }
        Commands::Batch { file } => commands::batch(&validator, &file),
        Commands::Schemas { show } => commands::schemas(&validator, show.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit_code(args: &[&str]) -> u8 {
        match Cli::try_parse_from(args) {
            Ok(_) => 0,
            Err(e) => parse_error_code(&e),
        }
    }

    #[test]
    fn test_invalid_arguments_are_input_errors() {
        assert_eq!(exit_code(&["precheck", "bogus"]), commands::EXIT_INPUT_ERROR);
        assert_eq!(exit_code(&["precheck", "validate"]), commands::EXIT_INPUT_ERROR);
        assert_eq!(
            exit_code(&["precheck", "--max-depth", "deep", "schemas"]),
            commands::EXIT_INPUT_ERROR
        );
    }

    #[test]
    fn test_help_and_version_exit_zero() {
        assert_eq!(exit_code(&["precheck", "--help"]), 0);
        assert_eq!(exit_code(&["precheck", "--version"]), 0);
        assert_eq!(exit_code(&["precheck", "validate", "--task", "spellScripting"]), 0);
    }
}
