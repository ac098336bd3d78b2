// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Markdown table detection.
//
// A table block is a pipe-delimited header row, a separator row made only of
// `|`, `-`, `:`, spaces and tabs on a single line, then one or more
// pipe-delimited rows, every row newline-terminated. A blank line ends the
// block.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static TABLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|[^\n]+\|\n\|[-:| \t]+\|\n(?:\|[^\n]+\|\n)+")
        .expect("hardcoded table block regex is valid")
});

/// One matched table, borrowed from the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBlock<'a> {
    /// Byte offset of the block within the document.
    pub start: usize,
    /// The raw block, including its trailing newline.
    pub text: &'a str,
}

/// Every non-overlapping table block in `markdown`, in document order.
pub fn extract_tables(markdown: &str) -> Vec<TableBlock<'_>> {
    let blocks: Vec<_> = TABLE_BLOCK
        .find_iter(markdown)
        .map(|found| TableBlock {
            start: found.start(),
            text: found.as_str(),
        })
        .collect();
    debug!(tables = blocks.len(), "Scanned markdown for tables");
    blocks
}

/// Convert CRLF line endings to LF and make sure the document ends with a
/// newline, so a table closing the document still matches.
pub fn normalize_markdown(markdown: &str) -> Cow<'_, str> {
    let needs_crlf_fix = markdown.contains('\r');
    let needs_newline = !markdown.is_empty() && !markdown.ends_with('\n');
    if !needs_crlf_fix && !needs_newline {
        return Cow::Borrowed(markdown);
    }

    let mut normalized = if needs_crlf_fix {
        markdown.replace("\r\n", "\n")
    } else {
        markdown.to_string()
    };
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    Cow::Owned(normalized)
}
