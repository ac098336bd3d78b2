// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end batch runs over a temporary input directory with stub OCR and
// conversion collaborators.

use std::fs;
use std::path::Path;

use folio_core::config::PipelineConfig;
use folio_core::error::Result;
use folio_core::types::{BoundingBox, ImageStatus, Report};
use folio_document::scan::TokenGroup;
use folio_document::{
    Annotator, Discovery, MarkdownConverter, OcrBackend, OcrData, OcrPipeline, Pipeline,
    TablePipeline, discover_images, run_batch, run_pipelines,
};
use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;

fn stub_backend() -> Box<dyn OcrBackend> {
    Box::new(|image: &DynamicImage| -> Result<OcrData> {
        let mut data = OcrData::default();
        let bbox = |left, height| BoundingBox {
            left,
            top: 4,
            width: 30,
            height,
        };
        data.push("Heading", bbox(2, image.height().min(28)), 97, TokenGroup::default());
        data.push("smudge", bbox(40, 10), 12.5, TokenGroup::default());
        data.push("text", bbox(80, 10), "90", TokenGroup::default());
        Ok(data)
    })
}

fn stub_converter() -> Box<dyn MarkdownConverter> {
    Box::new(|path: &Path| -> Result<String> {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy().into_owned();
        Ok(format!(
            "# {stem}\r\n\r\n| Key | Value |\r\n|-----|-------|\r\n| name | {stem} |"
        ))
    })
}

struct Workspace {
    _root: TempDir,
    config: PipelineConfig,
}

/// Input directory with two valid PNGs and one file that only claims to be one.
fn workspace(workers: usize) -> Workspace {
    let root = TempDir::new().unwrap();
    let input = root.path().join("images");
    fs::create_dir(&input).unwrap();
    for name in ["alpha.png", "gamma.png"] {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 40, Rgb([250, 250, 250])))
            .save(input.join(name))
            .unwrap();
    }
    fs::write(input.join("beta.png"), b"not really a png").unwrap();
    fs::write(input.join("readme.txt"), b"ignored").unwrap();

    let config = PipelineConfig {
        input_dir: input,
        output_dir: root.path().join("output"),
        workers,
        ..PipelineConfig::default()
    };
    Workspace { _root: root, config }
}

#[test]
fn undecodable_image_does_not_stop_the_batch() {
    let ws = workspace(1);
    let pipeline = OcrPipeline::new(stub_backend(), Annotator::without_labels(), &ws.config);
    let discovery = discover_images(&ws.config).unwrap();

    let summary = run_batch(&pipeline, discovery.images(), ws.config.workers).unwrap();

    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.processed(), 2);
    assert_eq!(summary.failed(), 1);
    let (failed, _) = summary.failures().next().unwrap();
    assert!(failed.ends_with("beta.png"));

    for stem in ["alpha", "gamma"] {
        let dir = ws.config.output_dir.join(stem);
        for artifact in [
            "extracted_text.txt",
            "annotated_image.png",
            "report.json",
            "visual_styles.json",
        ] {
            assert!(dir.join(artifact).is_file(), "{stem}/{artifact} missing");
        }
        let report: Report =
            serde_json::from_str(&fs::read_to_string(dir.join("report.json")).unwrap()).unwrap();
        assert_eq!(report.extracted_text, "Heading smudge text");
        assert_eq!(report.stats.total_characters, 19);
        assert_eq!(report.stats.missed_characters, 6);
        assert_eq!(report.missed_text[0].confidence.percent(), 12);
        assert_eq!(report.stats.header_count, 1);

        let annotated = image::open(dir.join("annotated_image.png")).unwrap();
        assert_eq!((annotated.width(), annotated.height()), (120, 40));
    }
    assert!(!ws.config.output_dir.join("beta").exists());
}

#[test]
fn parallel_batch_matches_sequential_order() {
    let ws = workspace(3);
    let pipeline = OcrPipeline::new(stub_backend(), Annotator::without_labels(), &ws.config);
    let images = discover_images(&ws.config).unwrap();

    let summary = run_batch(&pipeline, images.images(), ws.config.workers).unwrap();
    let order: Vec<_> = summary
        .outcomes
        .iter()
        .map(|outcome| outcome.image.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(order, ["alpha.png", "beta.png", "gamma.png"]);
}

#[test]
fn table_artifacts_are_written_per_image() {
    let ws = workspace(1);
    let pipeline = TablePipeline::new(stub_converter(), &ws.config);
    let images = discover_images(&ws.config).unwrap();

    let summary = run_batch(&pipeline, images.images(), 1).unwrap();
    assert_eq!(summary.processed(), 3);

    let tables = ws.config.output_dir.join("gamma").join("tables");
    assert_eq!(
        fs::read_to_string(tables.join("table_1.md")).unwrap(),
        "| Key | Value |\n|-----|-------|\n| name | gamma |\n"
    );
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tables.join("table_1.json")).unwrap()).unwrap();
    assert_eq!(json["headers"], serde_json::json!(["Key", "Value"]));
    assert_eq!(json["rows"], serde_json::json!([["name", "gamma"]]));
}

#[test]
fn combined_run_reports_both_pipelines() {
    let ws = workspace(2);
    let ocr = OcrPipeline::new(stub_backend(), Annotator::without_labels(), &ws.config);
    let tables = TablePipeline::new(stub_converter(), &ws.config);
    let pipelines: [&dyn Pipeline; 2] = [&ocr, &tables];

    let summary = run_pipelines(&ws.config, &pipelines).unwrap();
    assert_eq!(summary.outcomes.len(), 6);
    assert_eq!(summary.failed(), 1);
    assert!(
        summary
            .outcomes
            .iter()
            .all(|outcome| !matches!(outcome.status, ImageStatus::Skipped { .. }))
    );
}

#[test]
fn missing_input_directory_is_created_and_batch_is_empty() {
    let root = TempDir::new().unwrap();
    let config = PipelineConfig {
        input_dir: root.path().join("incoming"),
        output_dir: root.path().join("output"),
        ..PipelineConfig::default()
    };

    let discovery = discover_images(&config).unwrap();
    assert!(matches!(discovery, Discovery::Created(_)));
    assert!(config.input_dir.is_dir());

    let ocr = OcrPipeline::new(stub_backend(), Annotator::without_labels(), &config);
    let pipelines: [&dyn Pipeline; 1] = [&ocr];
    let summary = run_pipelines(&config, &pipelines).unwrap();
    assert!(summary.outcomes.is_empty());
    assert!(!config.output_dir.exists());
}
