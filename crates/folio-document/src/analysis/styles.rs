// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Visual style records: per-token geometry for downstream style analysis.

use folio_core::types::StyleRecord;

use crate::scan::tokens::TokenStream;

/// One record per non-blank token, in scan order.
pub fn extract_styles(tokens: &TokenStream) -> Vec<StyleRecord> {
    tokens
        .non_blank()
        .map(|token| StyleRecord {
            text: token.text.clone(),
            font_height: token.bbox.height,
            font_width: token.bbox.width,
            confidence: token.confidence,
            block_num: token.block_num,
            line_num: token.line_num,
        })
        .collect()
}
