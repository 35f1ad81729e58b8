use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod error;
mod models;
mod report;
mod server;
mod source;
mod stats;
mod trend;

use config::AppConfig;
use source::{HttpSource, RecordSource};
use trend::Period;

#[derive(Parser)]
#[command(name = "reclamation-stats")]
#[command(about = "Reclamation statistics for the production dashboard", long_about = None)]
#[command(group(
    ArgGroup::new("input")
        .args(["file", "csv", "mock"])
        .multiple(false)
))]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read records from a JSON file instead of the upstream API
    #[arg(long)]
    file: Option<PathBuf>,
    /// Read records from a CSV file (date,product,customer,reason)
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Use the built-in sample records
    #[arg(long)]
    mock: bool,
    /// Override the upstream API URL
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard statistics
    Summary {
        #[arg(long)]
        json: bool,
        /// Reference instant, e.g. 2024-03-10T08:00:00 (defaults to now, UTC)
        #[arg(long)]
        now: Option<NaiveDateTime>,
    },
    /// Write a markdown dashboard report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long)]
        now: Option<NaiveDateTime>,
    },
    /// Print the fetched records as JSON
    Records,
    /// Serve records and statistics over HTTP
    Serve {
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[derive(Serialize)]
struct SummaryOutput {
    summary: models::StatsSummary,
    metrics: trend::DashboardMetrics,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn select_source(cli: &Cli, config: &AppConfig) -> anyhow::Result<RecordSource> {
    if let Some(path) = &cli.file {
        return Ok(RecordSource::JsonFile(path.clone()));
    }
    if let Some(path) = &cli.csv {
        return Ok(RecordSource::CsvFile(path.clone()));
    }
    if cli.mock {
        return Ok(RecordSource::Mock);
    }
    let http = HttpSource::new(config.api.clone()).context("failed to set up upstream client")?;
    Ok(RecordSource::Http(http))
}

async fn load_summary(
    source: &RecordSource,
    now: NaiveDateTime,
) -> anyhow::Result<models::StatsSummary> {
    let records = source
        .fetch_all()
        .await
        .context("failed to fetch reclamation records")?;
    let summary =
        stats::compute_summary(&records, now).context("cannot compute reclamation statistics")?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok());
    if let Some(url) = &cli.api_url {
        config.api.url = url.clone();
    }

    let source = select_source(&cli, &config)?;

    match cli.command {
        Commands::Summary { json, now } => {
            let now = now.unwrap_or_else(|| Utc::now().naive_utc());
            let summary = load_summary(&source, now).await?;
            let metrics = trend::dashboard_metrics(&summary, now.date());

            if json {
                let output = SummaryOutput { summary, metrics };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            match &summary.newest {
                Some(newest) => println!(
                    "Uusin reklamaatio: {} ({}, {}) {}",
                    trend::format_fi_date(newest.date),
                    newest.product,
                    newest.customer,
                    trend::short_reason(&newest.reason)
                ),
                None => println!("Uusin reklamaatio: {}", trend::NO_DATA_LABEL),
            }
            println!(
                "Päiviä edellisestä reklamaatiosta: {} ({})",
                summary.days_since_previous,
                metrics.streak_tier.title()
            );
            println!(
                "Pisin jakso ilman reklamaatioita: {} päivää ({}), nykyinen jakso {:.0}%",
                summary.longest_gap.days, metrics.longest_streak_range, metrics.streak_progress
            );
            println!(
                "Reklamaatiot tänä vuonna ({}): {} ({} {})",
                summary.year,
                metrics.year.current,
                metrics.year.signed_label(),
                metrics.year.caption(Period::Year)
            );
            println!(
                "Reklamaatiot tässä kuussa: {} ({} {})",
                metrics.month.current,
                metrics.month.signed_label(),
                metrics.month.caption(Period::Month)
            );
        }
        Commands::Report { out, now } => {
            let now = now.unwrap_or_else(|| Utc::now().naive_utc());
            let summary = load_summary(&source, now).await?;
            let report = report::build_report(&summary, now.date());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Raportti kirjoitettu: {}", out.display());
        }
        Commands::Records => {
            let records = source
                .fetch_all()
                .await
                .context("failed to fetch reclamation records")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or(config.server.bind);
            server::run(bind, source).await?;
        }
    }

    Ok(())
}
