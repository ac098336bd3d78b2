// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — OCR post-processing and table extraction for scanned pages.
//
// Provides the OCR token stream model and backends (Tesseract TSV, optional
// ocrs), token analysis (confidence triage, header inference, visual styles),
// annotation overlays, report assembly, markdown table extraction, and the
// per-image pipelines with their batch driver.

pub mod analysis;
pub mod batch;
pub mod convert;
pub mod image;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod tables;

// Re-export the primary entry points so callers can use `folio_document::OcrPipeline` etc.
pub use batch::{Discovery, discover_images, run_batch, run_pipelines};
pub use convert::{CommandConverter, MarkdownConverter};
pub use image::{Annotator, PageImage};
pub use pipeline::{OcrPipeline, Pipeline, TablePipeline};
pub use scan::{OcrBackend, OcrData, TesseractCommand, TokenStream, backend_from_config};

#[cfg(feature = "ocr")]
pub use scan::OcrsBackend;
