// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact layout and atomic writes.
//
// Layout per input image `<stem>.<ext>`:
//
//   <output>/<stem>/extracted_text.txt
//   <output>/<stem>/annotated_image.png
//   <output>/<stem>/report.json
//   <output>/<stem>/visual_styles.json
//   <output>/<stem>/tables/table_<n>.md     (n from 1)
//   <output>/<stem>/tables/table_<n>.json
//
// Every file is fully serialised in memory, written to a temporary file in
// the destination directory, then renamed into place, so a reader never sees
// a partial artifact.

use std::io::Write;
use std::path::{Path, PathBuf};

use folio_core::error::{FolioError, Result};
use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

pub const EXTRACTED_TEXT_FILE: &str = "extracted_text.txt";
pub const ANNOTATED_IMAGE_FILE: &str = "annotated_image.png";
pub const REPORT_FILE: &str = "report.json";
pub const VISUAL_STYLES_FILE: &str = "visual_styles.json";
pub const TABLES_DIR: &str = "tables";

/// Paths of every artifact for one input image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
}

impl OutputLayout {
    /// `<output_root>/<image stem>`.
    pub fn for_image(output_root: &Path, image: &Path) -> Result<Self> {
        let stem = image.file_stem().ok_or_else(|| {
            FolioError::UnsupportedInput(format!("{} has no file name", image.display()))
        })?;
        Ok(Self {
            dir: output_root.join(stem),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extracted_text(&self) -> PathBuf {
        self.dir.join(EXTRACTED_TEXT_FILE)
    }

    pub fn annotated_image(&self) -> PathBuf {
        self.dir.join(ANNOTATED_IMAGE_FILE)
    }

    pub fn report(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    pub fn visual_styles(&self) -> PathBuf {
        self.dir.join(VISUAL_STYLES_FILE)
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.dir.join(TABLES_DIR)
    }

    /// `tables/table_<number>.md`; numbering starts at 1.
    pub fn table_markdown(&self, number: usize) -> PathBuf {
        self.tables_dir().join(format!("table_{number}.md"))
    }

    /// `tables/table_<number>.json`; numbering starts at 1.
    pub fn table_json(&self, number: usize) -> PathBuf {
        self.tables_dir().join(format!("table_{number}.json"))
    }

    pub fn create(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn create_tables_dir(&self) -> Result<()> {
        std::fs::create_dir_all(self.tables_dir())?;
        Ok(())
    }
}

/// Write `bytes` to `path` via a sibling temporary file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|err| FolioError::Io(err.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Artifact written");
    Ok(())
}

/// UTF-8 text artifact.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    write_atomic(path, text.as_bytes())
}

/// Serialise `value` as two-space indented JSON with non-ASCII characters
/// left unescaped.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// JSON artifact in the shared formatting convention.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = to_pretty_json(value)?;
    write_atomic(path, json.as_bytes())
}

/// PNG artifact.
pub fn write_png(path: &Path, image: &RgbaImage) -> Result<()> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|err| FolioError::ImageError(format!("PNG encoding failed: {}", err)))?;
    write_atomic(path, &buffer)
}
