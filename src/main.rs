use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spot_saver::{
    config::Config,
    job::{JobRunner, JobScheduler},
    services::SendGridNotifier,
    sources::BetterAirportClient,
};

#[derive(Parser)]
#[command(name = "spot-saver")]
#[command(version)]
#[command(about = "Emails the Spot Saver eligible flight schedule as a CSV report")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE", env = "SPOT_SAVER_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the job once and exit
    Run {
        /// Schedule date to report (defaults to today plus the configured offset)
        #[arg(short, long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Run the job on the configured cron schedule until interrupted
    Schedule,
}

#[tokio::main]
async fn main() -> Result<()> {
    let (cli, dotenv_path) = parse_cli(None, std::env::args_os()).unwrap_or_else(|e| e.exit());

    let log_filter = format!("spot_saver={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Spot Saver v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!(
        "Configuration loaded: {} airport(s), schedule '{}' in {}",
        config.airports.len(),
        config.schedule.cron,
        config.schedule.timezone
    );

    let runner = build_runner(&config)?;

    match cli.command {
        Command::Run { date } => {
            let date = match date {
                Some(date) => date,
                None => runner.target_date(Utc::now())?,
            };
            let summary = runner.run(date).await;
            let summary = summary.into_result()?;
            info!("Spot Saver run complete: {}", summary);
        }
        Command::Schedule => {
            JobScheduler::new(runner, &config.schedule.cron)?
                .start()
                .await?;
        }
    }

    Ok(())
}

/// Load `.env` (the working directory's unless `dotenv_file` is given), then
/// parse `args`, so `.env` can supply `SPOT_SAVER_CONFIG_FILE` to `--config`.
/// Values from `.env` never override the real environment.
fn parse_cli<I, T>(
    dotenv_file: Option<&Path>,
    args: I,
) -> Result<(Cli, Option<PathBuf>), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let loaded = match dotenv_file {
        Some(path) => dotenvy::from_path(path).ok().map(|_| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    };
    let cli = Cli::try_parse_from(args)?;
    Ok((cli, loaded))
}

fn build_runner(config: &Config) -> Result<JobRunner> {
    let source = Arc::new(BetterAirportClient::new(
        &config.api.base_url,
        config.http.timeout(),
    )?);
    let notifier = Arc::new(SendGridNotifier::new(
        config.email.sendgrid_api_key.clone(),
        config.email.sendgrid_base_url.clone(),
        config.email.sender(),
        config.http.timeout(),
    ));

    Ok(JobRunner::new(config, source.clone(), source, notifier)?)
}
