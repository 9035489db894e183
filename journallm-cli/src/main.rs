//! journallm - journal extraction and advice from the command line
//!
//! **Usage:**
//! ```bash
//! journallm extract <INPUT>... [--output journal.xml]
//! journallm report <INPUT>... [--output advice.md] [--save-journal [PATH]]
//! journallm submit <FILE> [--server URL] [--api-key KEY] [--interval SECS]
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use journallm_cli::commands::{self, SaveJournal, Submitted};
use journallm_cli::poller::{DEFAULT_SERVER_URL, StatusPoller};
use journallm_common::config::{self, CliOverrides, Settings};
use journallm_common::generation::AnthropicClient;
use journallm_common::Error;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Journal extraction and personalized advice
#[derive(Parser, Debug)]
#[command(name = "journallm")]
#[command(about = "Turn journal exports into personalized advice", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize journal exports into the XML exchange format
    Extract {
        /// Journal files (.zip, .json, .xml, .txt, .md)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (default: journal-YYYYMMDD-HHMMSS.xml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize journal exports and generate an advice report
    Report {
        /// Journal files; an .xml input is a previously extracted journal
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (default: advice-YYYYMMDD-HHMMSS.md)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also keep the extracted journal, optionally at PATH
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        save_journal: Option<Option<PathBuf>>,

        /// API key for the generation service
        #[arg(long)]
        api_key: Option<String>,

        /// Model to use
        #[arg(long)]
        model: Option<String>,
    },

    /// Upload a journal to a running journallm-web service and wait for the report
    Submit {
        /// Journal file to upload
        file: PathBuf,

        /// Service base URL
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,

        /// API key to send with the upload (needed when the server has none)
        #[arg(long)]
        api_key: Option<String>,

        /// Seconds between status checks
        #[arg(long, default_value_t = 2)]
        interval: u64,

        /// Save the finished report here (default: advice-YYYYMMDD-HHMMSS.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    fn overrides(&self, debug: bool) -> CliOverrides {
        let (api_key, model) = match self {
            Command::Report { api_key, model, .. } => (api_key.clone(), model.clone()),
            // submit forwards only its explicit --api-key, never a resolved one
            Command::Submit { .. } | Command::Extract { .. } => (None, None),
        };
        CliOverrides {
            api_key,
            model,
            log_level: debug.then(|| "debug".to_string()),
            ..CliOverrides::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    let cli = Cli::parse();

    let toml_config = config::load_toml_config(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli.command.overrides(cli.debug), &toml_config)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Command::Extract { inputs, output } => {
            let written = commands::extract(&inputs, output.as_deref())?;
            if let Some(path) = written.journal {
                println!("Journal saved to {}", path.display());
            }
        }

        Command::Report {
            inputs,
            output,
            save_journal,
            ..
        } => {
            let api_key = settings.api_key.clone().ok_or(Error::MissingCredential).context(
                "Set JOURNALLM_API_KEY, add api_key to the config file, or pass --api-key",
            )?;
            let client = AnthropicClient::new(api_key, settings.generation.clone())?;

            let written = commands::report(
                &inputs,
                output.as_deref(),
                SaveJournal::from(save_journal),
                &client,
            )
            .await?;
            if let Some(path) = written.journal {
                println!("Journal saved to {}", path.display());
            }
            if let Some(path) = written.report {
                println!("Advice saved to {}", path.display());
            }
        }

        Command::Submit {
            file,
            server,
            api_key,
            interval,
            output,
        } => {
            let poller = StatusPoller::new(server, Duration::from_secs(interval.max(1)))?;

            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_ctrl_c.cancel();
                }
            });

            println!("Uploading {}, waiting for the report...", file.display());
            match commands::submit(&poller, &file, api_key.as_deref(), output.as_deref(), cancel).await? {
                Submitted::Saved {
                    report, redirect, ..
                } => {
                    println!("Advice saved to {}", report.display());
                    println!("View online: {}", poller.url(&redirect));
                }
                Submitted::Cancelled { job_id } => {
                    println!("Cancelled. Check later at {}", poller.url(&format!("/status/{job_id}")));
                }
            }
        }
    }

    info!("Done");
    Ok(())
}
