// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — OCR post-processing for scanned pages
//
// Entry point. Parses arguments, initialises logging, loads configuration,
// and runs the OCR pipeline, the table pipeline, or both over the input
// directory.
//
// Exit codes: 0 success (or nothing to do), 1 fatal setup error, 2 the batch
// ran but at least one image failed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use folio_core::PipelineConfig;
use folio_core::types::BatchSummary;
use folio_document::{
    Annotator, CommandConverter, OcrPipeline, Pipeline, TablePipeline, backend_from_config,
    run_pipelines,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Triage OCR output, infer headings, annotate scans, and extract markdown tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run OCR post-processing: text, missed-text report, overlay, styles.
    Ocr(RunArgs),
    /// Convert each image to markdown and extract its tables.
    Tables(RunArgs),
    /// Run both pipelines.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// JSON configuration file. Fields it omits keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory scanned for input images.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Root directory for per-image output.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Tokens scoring below this percentage are reported as missed.
    #[arg(long)]
    confidence_threshold: Option<i32>,

    /// Number of images processed concurrently.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Pad or truncate table rows to the header width.
    #[arg(long)]
    pad_rows: bool,

    /// TTF/OTF font used for overlay labels.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print the batch summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

impl RunArgs {
    fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(threshold) = self.confidence_threshold {
            config.confidence_threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.pad_rows {
            config.tables.pad_rows = true;
        }
        if let Some(font) = &self.font {
            config.annotation.font_path = Some(font.clone());
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn ocr_pipeline(config: &PipelineConfig) -> Result<OcrPipeline> {
    let backend = backend_from_config(&config.ocr).context("failed to set up the OCR engine")?;
    backend.probe().context("OCR engine is not available")?;
    let annotator = Annotator::new(&config.annotation).context("failed to load label font")?;
    Ok(OcrPipeline::new(backend, annotator, config))
}

fn table_pipeline(config: &PipelineConfig) -> TablePipeline {
    TablePipeline::new(
        Box::new(CommandConverter::from_config(&config.converter)),
        config,
    )
}

fn run(command: &Commands, args: &RunArgs) -> Result<BatchSummary> {
    let config = args.load_config()?;
    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        workers = config.workers,
        "Folio starting"
    );

    let summary = match command {
        Commands::Ocr(_) => {
            let ocr = ocr_pipeline(&config)?;
            run_pipelines(&config, &[&ocr as &dyn Pipeline])
        }
        Commands::Tables(_) => {
            let tables = table_pipeline(&config);
            run_pipelines(&config, &[&tables as &dyn Pipeline])
        }
        Commands::Run(_) => {
            let ocr = ocr_pipeline(&config)?;
            let tables = table_pipeline(&config);
            run_pipelines(&config, &[&ocr as &dyn Pipeline, &tables])
        }
    };
    summary.context("batch could not start")
}

fn log_summary(summary: &BatchSummary) {
    info!(
        processed = summary.processed(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
        "Done"
    );
    for (image, reason) in summary.failures() {
        error!(image = %image.display(), "{}", reason);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let args = match &cli.command {
        Commands::Ocr(args) | Commands::Tables(args) | Commands::Run(args) => args,
    };
    init_logging(args.verbose);

    match run(&cli.command, args) {
        Ok(summary) => {
            log_summary(&summary);
            if args.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(err) => error!("failed to serialize summary: {}", err),
                }
            }
            if summary.failed() > 0 {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}
