//! CLI for the Leasehub API client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use leasehub_core::config;
use leasehub_core::logger::Logger;

use commands::{run_classify, run_config, run_fetch, run_get, ClassifyArgs, RetryArgs};

/// Top-level CLI for the Leasehub CRM API client.
#[derive(Debug, Parser)]
#[command(name = "leasehub")]
#[command(about = "Leasehub: leasing CRM API client with failure classification and retry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify a described failure and print the result as JSON.
    Classify {
        /// HTTP status of the response (omit for a failure without response).
        #[arg(long)]
        status: Option<u16>,
        /// Response body (JSON, or raw text).
        #[arg(long)]
        body: Option<String>,
        /// Diagnostic message of the failure.
        #[arg(long)]
        message: Option<String>,
        /// Low-level error code, e.g. ECONNABORTED.
        #[arg(long)]
        code: Option<String>,
        /// Describe a non-transport failure instead.
        #[arg(long, conflicts_with_all = ["status", "body", "code"])]
        plain: bool,
    },

    /// Fetch a resource collection (bots, leads, team, billing, documents, agents).
    Fetch {
        /// Resource name.
        resource: String,
        /// Total attempts (overrides config).
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
        /// Base delay between attempts in milliseconds (overrides config).
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,
        /// Use a flat delay instead of exponential backoff.
        #[arg(long)]
        no_backoff: bool,
    },

    /// GET an arbitrary API path with the configured retry policy.
    Get {
        /// Path relative to the API base URL, e.g. /api/leads/42.
        path: String,
    },

    /// Show the config file path and effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let logger = Logger::new(cfg.log_level);

        match cli.command {
            CliCommand::Classify {
                status,
                body,
                message,
                code,
                plain,
            } => run_classify(&ClassifyArgs {
                status,
                body,
                message,
                code,
                plain,
            })?,
            CliCommand::Fetch {
                resource,
                retries,
                delay_ms,
                no_backoff,
            } => {
                let retry = RetryArgs {
                    retries,
                    delay_ms,
                    no_backoff,
                };
                run_fetch(&cfg, &logger, &resource, &retry).await?
            }
            CliCommand::Get { path } => run_get(&cfg, &logger, &path).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}
