mod config;
mod pipeline;
mod registry;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use schemafog_core::{AmbiguityLevel, Error as CoreError};
use schemafog_eval::render_report;
use schemafog_rewrite::{BenchmarkSample, RewriteError, load_samples, save_samples};
use thiserror::Error;
use uuid::Uuid;

use config::Config;
use pipeline::{Mode, Pipeline};
use registry::{RunContext, RunSummary, finish_run, init_run_logging, start_run};

/// Failed queries listed in `report.md`.
const REPORT_MAX_EXAMPLES: usize = 20;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),
    #[error("{failed} of {total} databases failed; see {summary}")]
    DatabasesFailed {
        failed: usize,
        total: usize,
        summary: String,
    },
}

#[derive(Parser, Debug)]
#[command(name = "schemafog", version, about = "Schema anonymization for text-to-SQL benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map, materialize, rewrite, and verify every selected database.
    Anonymize(RunArgs),
    /// Generate and persist identifier maps only.
    Map(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to schemafog.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Dataset name as configured (spider, bird, kaggledbqa, ...).
    #[arg(long)]
    dataset: String,
    /// Ambiguity level (L0-L3).
    #[arg(long)]
    level: AmbiguityLevel,
    /// Database id(s) to process; defaults to every schema of the dataset.
    #[arg(long = "db-id", value_name = "DB_ID")]
    db_ids: Vec<String>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Skip executing rewritten queries.
    #[arg(long, default_value_t = false)]
    no_verify: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Anonymize(args) => {
            let mode = Mode::Full {
                verify: !args.no_verify,
            };
            run(args, "anonymize", mode).await
        }
        Command::Map(args) => run(args, "map", Mode::MapOnly).await,
    }
}

async fn run(args: RunArgs, command: &str, mode: Mode) -> Result<(), CliError> {
    let RunArgs {
        config,
        dataset,
        level,
        db_ids,
        run_dir,
        no_verify,
    } = args;

    // Configuration problems abort before any run artifact is written.
    let config = Config::load(config.as_deref())?;
    let dataset_config = config.dataset(&dataset)?;
    let db_ids = if db_ids.is_empty() {
        config.discover_db_ids(&dataset)?
    } else {
        db_ids
    };
    let samples: Vec<BenchmarkSample> = match mode {
        Mode::Full { .. } => load_samples(&dataset_config.samples_path)?,
        Mode::MapOnly => Vec::new(),
    };

    let run_ctx = RunContext {
        run_id: Uuid::new_v4().to_string(),
        started_at: chrono::Utc::now(),
        command: command.to_string(),
        dataset: dataset.clone(),
        level,
        verify: matches!(mode, Mode::Full { verify: true }),
        run_dir,
    };
    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(
        event = "run_started",
        run_id = %run_ctx.run_id,
        command,
        dataset = %dataset,
        level = %level,
        databases = db_ids.len(),
        no_verify
    );
    let timer = Instant::now();

    let pipeline = Pipeline::new(&config, dataset_config, config.layout(&dataset, level), mode);
    let output = pipeline.run(&db_ids, &samples).await;

    let samples_path = match mode {
        Mode::Full { .. } => {
            let path = pipeline.layout().samples_path();
            save_samples(&path, &output.samples)?;
            Some(path)
        }
        Mode::MapOnly => None,
    };

    let summary = RunSummary {
        run_id: run_ctx.run_id.clone(),
        started_at: run_ctx.started_at.to_rfc3339(),
        finished_at: chrono::Utc::now().to_rfc3339(),
        dataset: dataset.clone(),
        level,
        samples_path,
        databases: output.databases,
    };
    let report = render_report(
        &dataset,
        level,
        &summary.databases,
        &output.verifications,
        REPORT_MAX_EXAMPLES,
    );
    finish_run(&run_paths, &summary, &report)?;

    let failed = summary.failed_databases();
    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = if failed == 0 { "success" } else { "partial" },
        failed,
        duration_ms = duration_ms,
        summary = %run_paths.summary_path.display()
    );

    if failed > 0 {
        return Err(CliError::DatabasesFailed {
            failed,
            total: summary.databases.len(),
            summary: run_paths.summary_path.display().to_string(),
        });
    }

    Ok(())
}
