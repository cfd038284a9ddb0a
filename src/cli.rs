//! Command-line interface for cozeflow
//!
//! Maps pipeline failures to short user-facing status messages; full detail
//! is retained in the tracing output for operators.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging;
use crate::{ClientError, Config, WorkflowClient};

/// Exit code for a failed workflow call
const EXIT_FAILURE: i32 = 1;
/// Exit code for configuration problems
const EXIT_CONFIG: i32 = 2;

/// cozeflow - run Coze workflows from the command line
#[derive(Parser)]
#[command(name = "cozeflow")]
#[command(about = "Run Coze workflows with retry and tolerant response parsing")]
#[command(long_about = r#"
cozeflow submits a prompt to a configured Coze workflow and prints the
generated image URL and caption.

EXAMPLES:
  # Generate from a prompt
  cozeflow run "a red fox in the snow"

  # Use an explicit config file and disable retries
  cozeflow --config ./cozeflow.toml run "a red fox" --no-retry

  # Query the mode-check workflow
  cozeflow mode
"#)]
struct Cli {
    /// Path to the config file (default: COZEFLOW_CONFIG or ./cozeflow.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug-level diagnostics
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a prompt to the generate workflow and print URL and caption
    Run {
        /// Prompt passed to the workflow as the `input` parameter
        prompt: String,

        /// Override the configured retry ceiling
        #[arg(long)]
        max_retries: Option<u32>,

        /// Fail on the first error instead of retrying
        #[arg(long)]
        no_retry: bool,
    },
    /// Query the mode-check workflow and print the mode number
    Mode,
}

/// Run the CLI. Returns the process exit code on failure.
pub fn run() -> Result<(), i32> {
    let cli = Cli::parse();

    if let Err(error) = logging::init_tracing(cli.verbose) {
        eprintln!("Failed to initialize logging: {error}");
    }

    let config = Config::discover(cli.config.as_deref()).map_err(|error| {
        eprintln!("{error}");
        EXIT_CONFIG
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| {
            eprintln!("Failed to start async runtime: {error}");
            EXIT_FAILURE
        })?;

    match cli.command {
        Command::Run {
            prompt,
            max_retries,
            no_retry,
        } => {
            let client = build_client(config)?;
            let mut options = client.retry_options();
            if let Some(ceiling) = max_retries {
                options.max_retries = ceiling;
            }
            if no_retry {
                options.retry_enabled = false;
            }

            let result = runtime
                .block_on(client.generate_with_options(&prompt, &options))
                .map_err(|error| {
                    tracing::error!(%error, "generation failed");
                    eprintln!("{}", error.user_message());
                    EXIT_FAILURE
                })?;

            println!("{}", result.url);
            println!("{}", result.caption);
            Ok(())
        }
        Command::Mode => {
            let client = build_client(config)?;
            let mode = runtime.block_on(client.check_mode());
            println!("{mode}");
            Ok(())
        }
    }
}

fn build_client(config: Config) -> Result<WorkflowClient, i32> {
    WorkflowClient::from_config(config).map_err(|error| {
        tracing::error!(%error, "client construction failed");
        match error {
            ClientError::Misconfiguration(detail) => {
                eprintln!("{detail}");
                EXIT_CONFIG
            }
            other => {
                eprintln!("{}", other.user_message());
                EXIT_FAILURE
            }
        }
    })
}
