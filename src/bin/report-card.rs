//! Report Card pipeline
//!
//! Each subcommand is an independent batch job: `run` executes every stage,
//! the others execute one stage against the current store contents.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use report_card::config::{PipelineConfig, StoreConfig};
use report_card::core::{log_summary, render_markdown, PipelineRuntime, Stage};
use report_card::db::PostgresStore;
use report_card::jobs::PipelineContext;
use report_card::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "report-card", version, about = "Climate & economy report card pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Year to score (defaults to SCORING_YEAR, then the previous calendar year)
    #[arg(long, global = true, env = "SCORING_YEAR")]
    scoring_year: Option<i32>,

    /// Write a markdown run report to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Restrict ingestion to these indicator codes
    #[arg(long = "indicator", global = true)]
    indicators: Vec<String>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Ingest, derive, score and validate
    Run,
    /// Fetch raw indicators through their fallback chains
    Ingest,
    /// Regenerate derived indicators
    Derive,
    /// Score countries for the scoring year
    Score,
    /// Run QA checks; exits non-zero when a check fails
    Validate,
}

impl Command {
    fn stages(self) -> Vec<Stage> {
        match self {
            Command::Run => Stage::all().to_vec(),
            Command::Ingest => vec![Stage::Ingest],
            Command::Derive => vec![Stage::Derive],
            Command::Score => vec![Stage::Score],
            Command::Validate => vec![Stage::Validate],
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let cli = Cli::parse();

    // Missing credentials are fatal before any work begins
    let store_config = StoreConfig::from_env()?;
    let mut config = PipelineConfig::from_env()?;
    if let Some(year) = cli.scoring_year {
        config = config.with_scoring_year(year);
    }

    info!("Starting Report Card pipeline");
    info!(
        environment = %config.environment,
        scoring_year = config.scoring_year,
        years = %config.years,
        "Configuration loaded"
    );

    let store = PostgresStore::connect(&store_config).await?;
    info!("Database connected");

    let context = PipelineContext::from_config(config, Arc::new(store), &cli.indicators)?;
    let runtime = PipelineRuntime::new(context);

    let summary = match runtime.run(&cli.command.stages()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Pipeline aborted");
            return Err(e.into());
        }
    };

    log_summary(&summary);

    if let Some(path) = &cli.report {
        tokio::fs::write(path, render_markdown(&summary)).await?;
        info!(path = %path.display(), "Report written");
    }

    if summary.validate.as_ref().is_some_and(|qa| qa.has_failures()) {
        error!("QA checks failed");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
