// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pure-Rust OCR backend built on the `ocrs` crate, a neural OCR engine whose
// models run on `rten`.
//
// # Feature Gate
//
// This module is only available when the `ocr` feature is enabled:
//
// ```toml
// folio-document = { path = "crates/folio-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine requires two model files:
//
// - **Detection model** (`text-detection.rten`): locates words in the image.
// - **Recognition model** (`text-recognition.rten`): decodes characters from detected lines.
//
// Running `ocrs-cli` once downloads both into `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is where this backend looks by default.
//
// # Confidence
//
// `ocrs` does not score individual words. Every token from this backend is
// reported at 100%, so nothing it produces lands in missed text.

use std::path::{Path, PathBuf};

use folio_core::error::{FolioError, Result};
use folio_core::types::BoundingBox;
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams, TextItem};
use rten::Model;
use tracing::{debug, info, instrument};

use super::OcrBackend;
use super::tokens::{OcrData, TokenGroup};

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Confidence reported for every word, since the engine has no word scores.
const UNSCORED_CONFIDENCE: i32 = 100;

/// Default directory for cached OCR model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs` when
/// `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Model locations for an [`OcrsBackend`].
#[derive(Debug, Clone)]
pub struct OcrsConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrsConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrsConfig {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(FolioError::OcrError(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Word-level OCR through `ocrs`.
///
/// Model loading is the expensive step, so one backend is built per batch
/// and shared across images.
pub struct OcrsBackend {
    engine: OcrsEngine,
}

impl OcrsBackend {
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrsConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            FolioError::OcrError(format!(
                "failed to load detection model from {}: {}",
                config.detection_model_path.display(),
                err
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                FolioError::OcrError(format!(
                    "failed to load recognition model from {}: {}",
                    config.recognition_model_path.display(),
                    err
                ))
            })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| FolioError::OcrError(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine initialised successfully");
        Ok(Self { engine })
    }

    pub fn from_model_dir(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::new(OcrsConfig::from_dir(dir)),
            None => Self::new(OcrsConfig::default()),
        }
    }
}

impl OcrBackend for OcrsBackend {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<OcrData> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            FolioError::OcrError(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| FolioError::OcrError(format!("OCR preprocessing failed: {}", err)))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| FolioError::OcrError(format!("word detection failed: {}", err)))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        debug!(
            word_count = word_rects.len(),
            line_count = line_rects.len(),
            "Words grouped into lines"
        );

        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| FolioError::OcrError(format!("line recognition failed: {}", err)))?;

        let mut data = OcrData::default();
        for (line_idx, line) in lines.iter().enumerate() {
            let Some(line) = line else { continue };
            for word in line.words() {
                let rect = word.bounding_rect();
                data.push(
                    word.to_string(),
                    BoundingBox {
                        left: rect.left().max(0) as u32,
                        top: rect.top().max(0) as u32,
                        width: rect.width().max(0) as u32,
                        height: rect.height().max(0) as u32,
                    },
                    UNSCORED_CONFIDENCE,
                    TokenGroup {
                        line_num: line_idx as u32 + 1,
                        ..TokenGroup::default()
                    },
                );
            }
        }

        info!(tokens = data.len(), "ocrs recognition complete");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_dir() {
        let config = OcrsConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn validate_missing_models() {
        let config = OcrsConfig::from_dir("/nonexistent/path/ocr-models");
        assert!(config.validate().is_err(), "validate should fail for missing models");
    }
}
