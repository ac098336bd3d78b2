// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Folio OCR post-processor.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Tokens ------------------------------------------------------------------

/// OCR confidence as an integer percentage.
///
/// Engines report confidence as integers, floats, or numeric strings; it is
/// normalised exactly once, truncating toward zero (`69.9` becomes `69`).
/// Tesseract reports `-1` for structural rows, so negative values are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(pub i32);

impl Confidence {
    /// Normalise a floating-point score. Returns `None` for NaN or infinity.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let truncated = value.trunc();
        if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
            return None;
        }
        Some(Self(truncated as i32))
    }

    /// Parse a numeric string such as `"96"`, `"96.58"`, or `"-1"`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().and_then(Self::from_f64)
    }

    pub fn percent(self) -> i32 {
        self.0
    }

    /// Strictly below `threshold`.
    pub fn is_below(self, threshold: i32) -> bool {
        self.0 < threshold
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Axis-aligned box in pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// One OCR-recognised text unit.
///
/// `index` is the token's position in the engine's output and identifies the
/// occurrence across every derived artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub text: String,
    pub bbox: BoundingBox,
    pub confidence: Confidence,
    pub level: u32,
    pub page_num: u32,
    pub block_num: u32,
    pub line_num: u32,
}

impl Token {
    /// Blank tokens (empty or whitespace-only) are dropped from every
    /// derived artifact.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// -- Triage ------------------------------------------------------------------

/// A token scoring below the confidence threshold, kept for human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedTextEntry {
    /// The token text as recognised, untrimmed.
    pub text: String,
    pub confidence: Confidence,
    /// `(left, top)` of the token's box.
    pub position: (u32, u32),
}

// -- Structure ---------------------------------------------------------------

/// Heuristic header level. Only the two tallest candidates get distinct
/// levels; everything after saturates at `H3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeaderLevel {
    H1,
    H2,
    H3,
}

impl HeaderLevel {
    /// Level for a zero-based rank in the height ordering.
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Self::H1,
            1 => Self::H2,
            _ => Self::H3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
        }
    }
}

impl std::fmt::Display for HeaderLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The level assigned to one header occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub token_index: usize,
    pub text: String,
    pub level: HeaderLevel,
}

/// Header levels for one image, in rank order (tallest first).
///
/// Entries are keyed by token occurrence, so two headers with identical text
/// are both kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderAssignment {
    entries: Vec<HeaderEntry>,
}

impl HeaderAssignment {
    pub fn new(entries: Vec<HeaderEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    /// Level assigned to the token at `token_index`, if it was a candidate.
    pub fn level_of(&self, token_index: usize) -> Option<HeaderLevel> {
        self.entries
            .iter()
            .find(|entry| entry.token_index == token_index)
            .map(|entry| entry.level)
    }
}

// -- Styles ------------------------------------------------------------------

/// Per-token geometry and grouping, written for downstream style analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    pub text: String,
    pub font_height: u32,
    pub font_width: u32,
    pub confidence: Confidence,
    pub block_num: u32,
    pub line_num: u32,
}

// -- Report ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    /// Characters in `extracted_text`, counted as Unicode scalar values.
    pub total_characters: usize,
    /// Characters across missed-text entries only.
    pub missed_characters: usize,
    pub header_count: usize,
}

/// Everything learned about one image, written once as `report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub extracted_text: String,
    pub missed_text: Vec<MissedTextEntry>,
    pub document_structure: HeaderAssignment,
    pub stats: ReportStats,
}

impl Report {
    /// Assemble a report, deriving `stats` from the three inputs.
    pub fn new(
        extracted_text: impl ToString,
        missed_text: Vec<MissedTextEntry>,
        document_structure: HeaderAssignment,
    ) -> Self {
        let extracted_text = extracted_text.to_string();
        let stats = ReportStats {
            total_characters: extracted_text.chars().count(),
            missed_characters: missed_text
                .iter()
                .map(|entry| entry.text.chars().count())
                .sum(),
            header_count: document_structure.len(),
        };
        Self {
            extracted_text,
            missed_text,
            document_structure,
            stats,
        }
    }
}

// -- Tables ------------------------------------------------------------------

/// A markdown table split into cells. Rows may have a different column count
/// from the header; nothing is enforced unless padding is requested.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructuredTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StructuredTable {
    /// Whether any data row's width differs from the header's.
    pub fn is_ragged(&self) -> bool {
        self.rows.iter().any(|row| row.len() != self.headers.len())
    }

    /// Pad short rows with empty cells and truncate long ones so every row
    /// matches the header width.
    pub fn pad_to_headers(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}

// -- Batch -------------------------------------------------------------------

/// How one image fared in a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageStatus {
    /// Every artifact was written.
    Processed { artifacts: Vec<PathBuf> },
    /// Nothing to write (no text recognised, no tables found).
    Skipped { reason: String },
    /// Processing aborted; other images are unaffected.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOutcome {
    pub image: PathBuf,
    #[serde(flatten)]
    pub status: ImageStatus,
}

impl ImageOutcome {
    pub fn processed(image: PathBuf, artifacts: Vec<PathBuf>) -> Self {
        Self {
            image,
            status: ImageStatus::Processed { artifacts },
        }
    }

    pub fn skipped(image: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            image,
            status: ImageStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(image: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            image,
            status: ImageStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ImageStatus::Failed { .. })
    }
}

/// Aggregated outcomes of a batch, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<ImageOutcome>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.count(|status| matches!(status, ImageStatus::Processed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, ImageStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, ImageStatus::Failed { .. }))
    }

    /// `(image, reason)` for every failed image.
    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            ImageStatus::Failed { reason } => Some((&outcome.image, reason.as_str())),
            _ => None,
        })
    }

    /// Fold another pipeline's outcomes into this summary.
    pub fn merge(mut self, other: BatchSummary) -> Self {
        self.started_at = self.started_at.min(other.started_at);
        self.finished_at = self.finished_at.max(other.finished_at);
        self.outcomes.extend(other.outcomes);
        self
    }

    fn count(&self, predicate: impl Fn(&ImageStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}
