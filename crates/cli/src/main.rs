//! Carecast CLI
//!
//! A command-line tool for forecasting next-day severity from caregiving
//! logs, either in-process or through a running forecast service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use commands::{health, predict};
use forecast_lib::StrategyKind;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Carecast CLI
#[derive(Parser)]
#[command(name = "carecast")]
#[command(author, version, about = "CLI for the Carecast severity forecaster", long_about = None)]
pub struct Cli {
    /// Forecast service URL (can also be set via CARECAST_API_URL env var)
    #[arg(long, env = "CARECAST_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast tomorrow's severity from a JSON file of daily logs
    Predict {
        /// Path to a JSON array of daily log records
        file: PathBuf,

        /// Forecasting strategy for local evaluation (trend, ensemble, linear)
        #[arg(long, short)]
        strategy: Option<String>,

        /// Send the logs to the forecast service instead of evaluating locally
        #[arg(long)]
        remote: bool,
    },

    /// Show forecast service health
    Health,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let user_config = config::Config::load()?;

    let api_url = cli
        .api_url
        .or(user_config.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let format = match (cli.format, user_config.default_format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(name)) => <output::OutputFormat as ValueEnum>::from_str(name, true)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Invalid default_format `{}` in config", name))?,
        (None, None) => output::OutputFormat::default(),
    };

    match cli.command {
        Commands::Predict {
            file,
            strategy,
            remote,
        } => {
            if remote {
                if strategy.is_some() {
                    output::print_warning(
                        "--strategy is ignored with --remote; the service uses its configured strategy",
                    );
                }
                let client = client::ApiClient::new(&api_url)?;
                predict::predict(&file, predict::Target::Remote(&client), format, cli.verbose).await?;
            } else {
                let strategy = resolve_strategy(strategy.or(user_config.default_strategy))?;
                predict::predict(&file, predict::Target::Local(strategy), format, cli.verbose).await?;
            }
        }
        Commands::Health => {
            let client = client::ApiClient::new(&api_url)?;
            health::show_health(&client, format).await?;
        }
    }

    Ok(())
}

fn resolve_strategy(name: Option<String>) -> Result<StrategyKind> {
    match name {
        Some(name) => name
            .parse()
            .with_context(|| format!("Invalid strategy `{}`", name)),
        None => Ok(StrategyKind::default()),
    }
}
