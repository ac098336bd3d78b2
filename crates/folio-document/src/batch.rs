// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch driver: input discovery and per-image dispatch.

use std::path::PathBuf;

use chrono::Utc;
use folio_core::config::PipelineConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::{BatchSummary, ImageOutcome};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::pipeline::Pipeline;

/// What input discovery found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The input directory did not exist and has been created empty.
    Created(PathBuf),
    /// Accepted images, sorted by path.
    Images(Vec<PathBuf>),
}

impl Discovery {
    pub fn images(&self) -> &[PathBuf] {
        match self {
            Discovery::Created(_) => &[],
            Discovery::Images(images) => images,
        }
    }
}

/// List accepted images directly inside `config.input_dir`.
///
/// A missing directory is created so the user has somewhere to drop files;
/// the caller should treat that as an empty batch, not an error.
#[instrument(skip(config), fields(input_dir = %config.input_dir.display()))]
pub fn discover_images(config: &PipelineConfig) -> Result<Discovery> {
    let dir = &config.input_dir;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!(
            "Created input directory {}; add images there and run again",
            dir.display()
        );
        return Ok(Discovery::Created(dir.clone()));
    }
    if !dir.is_dir() {
        return Err(FolioError::UnsupportedInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && config.accepts(&path) {
            images.push(path);
        }
    }
    images.sort();

    if images.is_empty() {
        warn!("No images with accepted extensions found");
    } else {
        info!(count = images.len(), "Discovered images");
    }
    Ok(Discovery::Images(images))
}

/// Run `pipeline` over `images`.
///
/// With `workers > 1` the images are spread over a dedicated thread pool.
/// Outcomes come back in input order either way.
pub fn run_batch<P>(pipeline: &P, images: &[PathBuf], workers: usize) -> Result<BatchSummary>
where
    P: Pipeline + ?Sized,
{
    let started_at = Utc::now();
    info!(pipeline = pipeline.name(), images = images.len(), workers, "Starting batch");

    let outcomes: Vec<ImageOutcome> = if workers > 1 && images.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|err| FolioError::Config(format!("cannot start worker pool: {}", err)))?;
        pool.install(|| {
            images
                .par_iter()
                .map(|image| pipeline.process_image(image))
                .collect()
        })
    } else {
        images
            .iter()
            .map(|image| pipeline.process_image(image))
            .collect()
    };

    let summary = BatchSummary {
        started_at,
        finished_at: Utc::now(),
        outcomes,
    };
    info!(
        pipeline = pipeline.name(),
        processed = summary.processed(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "Batch complete"
    );
    Ok(summary)
}

/// Discover inputs and run every pipeline over them in turn, merging the
/// outcomes. An empty or freshly created input directory yields an empty
/// summary.
pub fn run_pipelines(config: &PipelineConfig, pipelines: &[&dyn Pipeline]) -> Result<BatchSummary> {
    let discovery = discover_images(config)?;
    let images = discovery.images();

    let mut summary = BatchSummary {
        started_at: Utc::now(),
        finished_at: Utc::now(),
        outcomes: Vec::new(),
    };
    for pipeline in pipelines {
        summary = summary.merge(run_batch(*pipeline, images, config.workers)?);
    }
    Ok(summary)
}
