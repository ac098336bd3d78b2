// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.
//
// Every field has a default so a partial JSON file only needs to name the
// settings it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Tokens scoring below this percentage are reported as missed text.
pub const DEFAULT_CONFIDENCE_THRESHOLD: i32 = 70;

/// Tokens must be strictly taller than this (pixels) to be header candidates.
pub const DEFAULT_HEADER_MIN_HEIGHT: u32 = 20;

/// Image extensions accepted by both pipelines, matched case-insensitively.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "bmp"];

/// Settings shared by the OCR pipeline and the table pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned (non-recursively) for input images.
    pub input_dir: PathBuf,
    /// Root of the per-image output directories.
    pub output_dir: PathBuf,
    /// Accepted file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Confidence percentage below which a token is flagged for review.
    pub confidence_threshold: i32,
    /// Minimum token height (exclusive) for header candidacy.
    pub header_min_height: u32,
    /// Number of images processed concurrently. `1` keeps the batch sequential.
    pub workers: usize,
    pub tables: TableConfig,
    pub annotation: AnnotationConfig,
    pub ocr: OcrBackendConfig,
    pub converter: ConverterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("output"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            header_min_height: DEFAULT_HEADER_MIN_HEIGHT,
            workers: 1,
            tables: TableConfig::default(),
            annotation: AnnotationConfig::default(),
            ocr: OcrBackendConfig::default(),
            converter: ConverterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load settings from a JSON file. Fields absent from the file keep their
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data).map_err(|err| {
            FolioError::Config(format!("{}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no pipeline run could honour.
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(FolioError::Config("extension list is empty".into()));
        }
        if !(0..=100).contains(&self.confidence_threshold) {
            return Err(FolioError::Config(format!(
                "confidence threshold {} is outside 0..=100",
                self.confidence_threshold
            )));
        }
        if self.workers == 0 {
            return Err(FolioError::Config("workers must be at least 1".into()));
        }
        if self.annotation.font_scale <= 0.0 {
            return Err(FolioError::Config(format!(
                "font scale {} must be positive",
                self.annotation.font_scale
            )));
        }
        Ok(())
    }

    /// Whether `path` carries one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Markdown table handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Pad or truncate every data row to the header's column count.
    pub pad_rows: bool,
    /// Reject blocks whose second line is not a `|---|` separator row.
    pub validate_separator: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            pad_rows: false,
            validate_separator: true,
        }
    }
}

/// Annotated-image rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// TrueType/OpenType font used for token labels. When unset, a few common
    /// system locations are tried.
    pub font_path: Option<PathBuf>,
    /// Label height in pixels.
    pub font_scale: f32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_scale: 12.0,
        }
    }
}

/// Which OCR engine produces the token stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum OcrBackendConfig {
    /// The `tesseract` command-line tool, read through its TSV output.
    Tesseract {
        #[serde(default = "default_tesseract_program")]
        program: PathBuf,
        language: Option<String>,
        psm: Option<u8>,
    },
    /// The pure-Rust `ocrs` engine (requires the `ocr` feature).
    Ocrs { model_dir: Option<PathBuf> },
}

fn default_tesseract_program() -> PathBuf {
    PathBuf::from("tesseract")
}

impl Default for OcrBackendConfig {
    fn default() -> Self {
        Self::Tesseract {
            program: default_tesseract_program(),
            language: None,
            psm: None,
        }
    }
}

/// External document-to-markdown command.
///
/// `{input}` in `args` is replaced by the image path. When `{output_dir}`
/// appears, the command runs against a scratch directory and the markdown
/// file it leaves there is read back; otherwise stdout is the markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("docling"),
            args: ["--to", "md", "--output", "{output_dir}", "{input}"]
                .iter()
                .map(|arg| (*arg).to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.confidence_threshold, 70);
        assert_eq!(config.header_min_height, 20);
        assert_eq!(config.workers, 1);
        assert!(!config.tables.pad_rows);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let config = PipelineConfig::default();
        assert!(config.accepts(Path::new("scan.PNG")));
        assert!(config.accepts(Path::new("dir/page.Tiff")));
        assert!(config.accepts(Path::new("photo.jpeg")));
        assert!(!config.accepts(Path::new("notes.txt")));
        assert!(!config.accepts(Path::new("no_extension")));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "confidence_threshold": 55, "tables": { "pad_rows": true } }"#)
                .unwrap();
        assert_eq!(config.confidence_threshold, 55);
        assert!(config.tables.pad_rows);
        assert!(config.tables.validate_separator);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn ocr_backend_is_tagged() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "ocr": { "backend": "ocrs", "model_dir": "/models" } }"#)
                .unwrap();
        match config.ocr {
            OcrBackendConfig::Ocrs { model_dir } => {
                assert_eq!(model_dir, Some(PathBuf::from("/models")));
            }
            other => panic!("expected ocrs backend, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let config = PipelineConfig {
            confidence_threshold: 140,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let config = PipelineConfig {
            workers: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
