// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Header-level inference.
//
// Tall tokens are treated as headings: candidates are ranked tallest first
// (earlier page breaks ties) and the first two ranks become H1 and H2, the
// rest H3. This is a height heuristic, not layout analysis.

use std::cmp::Reverse;

use folio_core::error::Result;
use folio_core::types::{HeaderAssignment, HeaderEntry, HeaderLevel, Token};
use tracing::debug;

use crate::scan::tokens::{OcrData, TokenStream};

/// Assign header levels to every non-blank token taller than `min_height`.
///
/// Each occurrence gets its own entry, keyed by token index, so repeated
/// heading text is not collapsed. The sort is stable: equal heights on the
/// same page keep scan order.
pub fn infer_headers(tokens: &TokenStream, min_height: u32) -> HeaderAssignment {
    let mut candidates: Vec<&Token> = tokens
        .non_blank()
        .filter(|token| token.bbox.height > min_height)
        .collect();
    candidates.sort_by_key(|token| (Reverse(token.bbox.height), token.page_num));

    let entries: Vec<HeaderEntry> = candidates
        .into_iter()
        .enumerate()
        .map(|(rank, token)| HeaderEntry {
            token_index: token.index,
            text: token.text.clone(),
            level: HeaderLevel::from_rank(rank),
        })
        .collect();

    debug!(headers = entries.len(), min_height, "Header inference complete");
    HeaderAssignment::new(entries)
}

/// Strict variant over raw engine output: a malformed stream is an error
/// for the caller to handle.
pub fn infer_headers_from_ocr_data(data: &OcrData, min_height: u32) -> Result<HeaderAssignment> {
    let tokens = TokenStream::from_ocr_data(data)?;
    Ok(infer_headers(&tokens, min_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::tokens::TokenGroup;
    use folio_core::types::BoundingBox;

    fn data(words: &[(&str, u32, u32)]) -> OcrData {
        let mut data = OcrData::default();
        for (text, height, page) in words {
            data.push(
                *text,
                BoundingBox {
                    left: 0,
                    top: 0,
                    width: 50,
                    height: *height,
                },
                90,
                TokenGroup {
                    page_num: *page,
                    ..TokenGroup::default()
                },
            );
        }
        data
    }

    fn levels(assignment: &HeaderAssignment) -> Vec<(&str, HeaderLevel)> {
        assignment
            .entries()
            .iter()
            .map(|entry| (entry.text.as_str(), entry.level))
            .collect()
    }

    #[test]
    fn ranks_by_height_and_saturates() {
        let ocr = data(&[("Small", 25, 1), ("Tiny", 10, 1), ("Title", 40, 1), ("Sub", 30, 1)]);
        let headers = infer_headers_from_ocr_data(&ocr, 20).unwrap();

        assert_eq!(headers.len(), 3);
        assert_eq!(
            levels(&headers),
            vec![
                ("Title", HeaderLevel::H1),
                ("Sub", HeaderLevel::H2),
                ("Small", HeaderLevel::H3),
            ]
        );
    }

    #[test]
    fn height_threshold_is_exclusive() {
        let ocr = data(&[("Edge", 20, 1), ("Over", 21, 1)]);
        let headers = infer_headers_from_ocr_data(&ocr, 20).unwrap();
        assert_eq!(levels(&headers), vec![("Over", HeaderLevel::H1)]);
    }

    #[test]
    fn earlier_page_wins_height_ties() {
        let ocr = data(&[("Later", 30, 2), ("Earlier", 30, 1), ("Third", 30, 3), ("Fourth", 30, 4)]);
        let headers = infer_headers_from_ocr_data(&ocr, 20).unwrap();
        assert_eq!(
            levels(&headers),
            vec![
                ("Earlier", HeaderLevel::H1),
                ("Later", HeaderLevel::H2),
                ("Third", HeaderLevel::H3),
                ("Fourth", HeaderLevel::H3),
            ]
        );
    }

    #[test]
    fn duplicate_text_keeps_every_occurrence() {
        let ocr = data(&[("Summary", 40, 1), ("Summary", 30, 1)]);
        let headers = infer_headers_from_ocr_data(&ocr, 20).unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.level_of(0), Some(HeaderLevel::H1));
        assert_eq!(headers.level_of(1), Some(HeaderLevel::H2));
    }

    #[test]
    fn blank_tall_tokens_are_not_candidates() {
        let ocr = data(&[("", 90, 1), ("   ", 80, 1), ("Real", 25, 1)]);
        let headers = infer_headers_from_ocr_data(&ocr, 20).unwrap();
        assert_eq!(levels(&headers), vec![("Real", HeaderLevel::H1)]);
        assert_eq!(headers.entries()[0].token_index, 2);
    }

    #[test]
    fn inference_is_deterministic() {
        let ocr = data(&[("A", 30, 1), ("B", 30, 1), ("C", 45, 2)]);
        let first = infer_headers_from_ocr_data(&ocr, 20).unwrap();
        let second = infer_headers_from_ocr_data(&ocr, 20).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_stream_is_an_error() {
        let mut ocr = data(&[("A", 30, 1)]);
        ocr.height.clear();
        assert!(infer_headers_from_ocr_data(&ocr, 20).is_err());
    }
}
