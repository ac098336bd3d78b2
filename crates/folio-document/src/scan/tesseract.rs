// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract backend.
//
// Drives the `tesseract` command-line tool and reads its TSV output, which
// carries exactly the per-word columns of the token stream (level, page,
// block, paragraph, line, word, box, confidence, text). The image is piped
// in as PNG on stdin and the TSV is read from stdout, so nothing touches the
// filesystem.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use folio_core::error::{FolioError, Result};
use folio_core::types::BoundingBox;
use image::DynamicImage;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::OcrBackend;
use super::tokens::{OcrData, TokenGroup};
use crate::image::processor::PageImage;

/// Runs `tesseract stdin stdout [-l lang] [--psm n] tsv` per image.
#[derive(Debug, Clone)]
pub struct TesseractCommand {
    program: PathBuf,
    language: Option<String>,
    psm: Option<u8>,
}

impl Default for TesseractCommand {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            language: None,
            psm: None,
        }
    }

    /// Recognition language(s), e.g. `eng` or `eng+deu`.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Page segmentation mode (0..=13).
    pub fn with_psm(mut self, psm: Option<u8>) -> Self {
        self.psm = psm;
        self
    }

    fn arguments(&self) -> Vec<String> {
        let mut args = vec!["stdin".to_string(), "stdout".to_string()];
        if let Some(language) = &self.language {
            args.push("-l".into());
            args.push(language.clone());
        }
        if let Some(psm) = self.psm {
            args.push("--psm".into());
            args.push(psm.to_string());
        }
        args.push("tsv".into());
        args
    }
}

impl OcrBackend for TesseractCommand {
    #[instrument(skip_all, fields(program = %self.program.display(), width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<OcrData> {
        let png = PageImage::encode_png(image)?;

        let mut child = Command::new(&self.program)
            .args(self.arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                FolioError::OcrError(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    err
                ))
            })?;

        // Tesseract reads all of stdin before writing anything, so the image
        // can be written in full before collecting output. A process that
        // exits early breaks the pipe; its status and stderr explain why.
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(FolioError::OcrError(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        sent.map_err(|err| {
            FolioError::OcrError(format!("failed to send image to tesseract: {}", err))
        })?;

        let tsv = String::from_utf8(output.stdout).map_err(|err| {
            FolioError::OcrError(format!("tesseract emitted invalid UTF-8: {}", err))
        })?;
        let data = parse_tsv(&tsv)?;
        info!(rows = data.len(), "Tesseract recognition complete");
        Ok(data)
    }

    fn probe(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|err| {
                FolioError::OcrError(format!(
                    "{} is not runnable: {}",
                    self.program.display(),
                    err
                ))
            })?;
        if !output.status.success() {
            return Err(FolioError::OcrError(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }
        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        let version = String::from_utf8_lossy(&banner);
        debug!(version = version.lines().next().unwrap_or_default(), "Tesseract available");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TsvRow {
    level: u32,
    page_num: u32,
    block_num: u32,
    line_num: u32,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    conf: String,
    // Structural rows end without a text field.
    #[serde(default)]
    text: String,
}

/// Parse Tesseract TSV output into column form.
pub fn parse_tsv(tsv: &str) -> Result<OcrData> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(tsv.as_bytes());

    let mut data = OcrData::default();
    for (line, row) in reader.deserialize::<TsvRow>().enumerate() {
        let row = row.map_err(|err| {
            FolioError::MalformedTokens(format!("TSV row {}: {}", line + 2, err))
        })?;
        data.push(
            row.text,
            BoundingBox {
                left: row.left,
                top: row.top,
                width: row.width,
                height: row.height,
            },
            row.conf.as_str(),
            TokenGroup {
                level: row.level,
                page_num: row.page_num,
                block_num: row.block_num,
                line_num: row.line_num,
            },
        );
    }
    debug!(rows = data.len(), "Parsed TSV");
    Ok(data)
}
