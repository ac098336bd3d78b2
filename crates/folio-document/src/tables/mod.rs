// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Markdown tables: detection of pipe-table blocks and parsing into
// header/row form.

pub mod extract;
pub mod parse;

pub use extract::{TableBlock, extract_tables, normalize_markdown};
pub use parse::{is_separator_row, parse_table};
