// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text assembly and confidence triage.

use folio_core::types::MissedTextEntry;
use tracing::{debug, warn};

use crate::scan::tokens::{OcrData, TokenStream};

/// Full text of a page plus the tokens flagged for review.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triage {
    /// Non-blank tokens joined with single spaces, in scan order.
    pub full_text: String,
    /// Tokens whose confidence is strictly below the threshold, in scan order.
    pub missed: Vec<MissedTextEntry>,
}

/// Walk the token stream once, assembling text and collecting low-confidence
/// tokens.
pub fn triage(tokens: &TokenStream, threshold: i32) -> Triage {
    let mut words = Vec::with_capacity(tokens.len());
    let mut missed = Vec::new();

    for token in tokens.non_blank() {
        words.push(token.text.as_str());
        if token.confidence.is_below(threshold) {
            missed.push(MissedTextEntry {
                text: token.text.clone(),
                confidence: token.confidence,
                position: (token.bbox.left, token.bbox.top),
            });
        }
    }

    debug!(words = words.len(), missed = missed.len(), threshold, "Triage complete");
    Triage {
        full_text: words.join(" "),
        missed,
    }
}

/// Triage raw engine output, treating a malformed stream as empty.
///
/// One damaged page must not abort a batch, so validation failures are
/// logged and yield `("", [])`.
pub fn triage_ocr_data(data: &OcrData, threshold: i32) -> Triage {
    match TokenStream::from_ocr_data(data) {
        Ok(tokens) => triage(&tokens, threshold),
        Err(err) => {
            warn!(error = %err, "Invalid token stream; triage yields no text");
            Triage::default()
        }
    }
}
