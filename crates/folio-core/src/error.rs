// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Input errors --
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("font loading failed: {0}")]
    FontError(String),

    // -- OCR / token stream --
    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("malformed token stream: {0}")]
    MalformedTokens(String),

    // -- Markdown / tables --
    #[error("markdown conversion failed: {0}")]
    Conversion(String),

    #[error("table parse failed: {0}")]
    TableParse(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
