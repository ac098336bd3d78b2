// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-image pipelines.
//
// OCR pipeline: image → token stream → {triage, headers, annotation, styles}
//   → extracted_text.txt, annotated_image.png, report.json, visual_styles.json
//
// Table pipeline: image → markdown → table blocks → tables/table_<n>.{md,json}
//
// The two share no state. Each `process_image` call turns every failure into
// an `ImageOutcome` instead of returning an error, so the batch driver never
// has to catch anything.

use std::path::{Path, PathBuf};

use folio_core::config::{PipelineConfig, TableConfig};
use folio_core::error::Result;
use folio_core::types::{ImageOutcome, ImageStatus};
use tracing::{debug, error, info, instrument, warn};

use crate::analysis::{extract_styles, infer_headers, triage};
use crate::convert::MarkdownConverter;
use crate::image::{Annotator, PageImage};
use crate::output::{self, OutputLayout};
use crate::report::{assemble_report, write_report};
use crate::scan::{OcrBackend, TokenStream};
use crate::tables::{extract_tables, normalize_markdown, parse_table};

/// A unit of per-image work the batch driver can run.
pub trait Pipeline: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Process one image to completion. Never panics on bad input; failures
    /// come back as [`ImageStatus::Failed`].
    fn process_image(&self, image: &Path) -> ImageOutcome;
}

fn finish(image: &Path, pipeline: &'static str, result: Result<ImageStatus>) -> ImageOutcome {
    let status = match result {
        Ok(status) => status,
        Err(err) => {
            error!(image = %image.display(), pipeline, error = %err, "Image processing failed");
            ImageStatus::Failed {
                reason: err.to_string(),
            }
        }
    };
    ImageOutcome {
        image: image.to_path_buf(),
        status,
    }
}

// -- OCR pipeline ------------------------------------------------------------

/// Token-stream reconstruction: text, missed spans, headers, overlay, styles.
pub struct OcrPipeline {
    backend: Box<dyn OcrBackend>,
    annotator: Annotator,
    output_dir: PathBuf,
    confidence_threshold: i32,
    header_min_height: u32,
}

impl OcrPipeline {
    pub fn new(backend: Box<dyn OcrBackend>, annotator: Annotator, config: &PipelineConfig) -> Self {
        Self {
            backend,
            annotator,
            output_dir: config.output_dir.clone(),
            confidence_threshold: config.confidence_threshold,
            header_min_height: config.header_min_height,
        }
    }

    fn run(&self, image: &Path) -> Result<ImageStatus> {
        let layout = OutputLayout::for_image(&self.output_dir, image)?;
        let page = PageImage::open(image)?;
        let data = self.backend.recognize(page.as_dynamic())?;

        if !data.has_text() {
            warn!(image = %image.display(), "No text extracted");
            return Ok(ImageStatus::Skipped {
                reason: "no text extracted".into(),
            });
        }
        let tokens = TokenStream::from_ocr_data(&data)?;
        debug!(tokens = tokens.len(), "Token stream ready");

        // The four consumers only read the token stream.
        let ((triaged, headers), (annotated, styles)) = rayon::join(
            || {
                rayon::join(
                    || triage(&tokens, self.confidence_threshold),
                    || infer_headers(&tokens, self.header_min_height),
                )
            },
            || {
                rayon::join(
                    || self.annotator.render(&page, &tokens),
                    || extract_styles(&tokens),
                )
            },
        );

        layout.create()?;

        output::write_text(&layout.extracted_text(), &triaged.full_text)?;
        info!(path = %layout.extracted_text().display(), "Text file generated");

        output::write_png(&layout.annotated_image(), &annotated)?;

        let report = assemble_report(triaged.full_text, triaged.missed, headers);
        write_report(&report, &layout.report())?;

        output::write_json(&layout.visual_styles(), &styles)?;

        Ok(ImageStatus::Processed {
            artifacts: vec![
                layout.extracted_text(),
                layout.annotated_image(),
                layout.report(),
                layout.visual_styles(),
            ],
        })
    }
}

impl Pipeline for OcrPipeline {
    fn name(&self) -> &'static str {
        "ocr"
    }

    #[instrument(skip(self), fields(pipeline = "ocr"))]
    fn process_image(&self, image: &Path) -> ImageOutcome {
        info!(image = %image.display(), "Processing image");
        finish(image, self.name(), self.run(image))
    }
}

// -- Table pipeline ----------------------------------------------------------

/// Markdown table extraction through an external document converter.
pub struct TablePipeline {
    converter: Box<dyn MarkdownConverter>,
    output_dir: PathBuf,
    options: TableConfig,
}

impl TablePipeline {
    pub fn new(converter: Box<dyn MarkdownConverter>, config: &PipelineConfig) -> Self {
        Self {
            converter,
            output_dir: config.output_dir.clone(),
            options: config.tables.clone(),
        }
    }

    fn run(&self, image: &Path) -> Result<ImageStatus> {
        let layout = OutputLayout::for_image(&self.output_dir, image)?;
        let markdown = self.converter.to_markdown(image)?;
        let markdown = normalize_markdown(&markdown);

        let blocks = extract_tables(&markdown);
        if blocks.is_empty() {
            info!(image = %image.display(), "No tables found");
            return Ok(ImageStatus::Skipped {
                reason: "no tables found".into(),
            });
        }

        layout.create_tables_dir()?;
        let mut artifacts = Vec::with_capacity(blocks.len() * 2);
        for (number, block) in (1..).zip(&blocks) {
            let markdown_path = layout.table_markdown(number);
            output::write_text(&markdown_path, block.text)?;
            artifacts.push(markdown_path);

            match parse_table(block.text, &self.options) {
                Ok(table) => {
                    let json_path = layout.table_json(number);
                    output::write_json(&json_path, &table)?;
                    artifacts.push(json_path);
                }
                Err(err) => {
                    warn!(
                        image = %image.display(),
                        table = number,
                        error = %err,
                        "Skipping structured output for table"
                    );
                }
            }
        }

        info!(image = %image.display(), tables = blocks.len(), "Extracted tables");
        Ok(ImageStatus::Processed { artifacts })
    }
}

impl Pipeline for TablePipeline {
    fn name(&self) -> &'static str {
        "tables"
    }

    #[instrument(skip(self), fields(pipeline = "tables"))]
    fn process_image(&self, image: &Path) -> ImageOutcome {
        info!(image = %image.display(), "Processing image");
        finish(image, self.name(), self.run(image))
    }
}
