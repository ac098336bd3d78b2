// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Markdown table parsing: one table block into headers and rows.

use std::sync::LazyLock;

use folio_core::config::TableConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::StructuredTable;
use regex::Regex;

static SEPARATOR_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|[-:| \t]+\|$").expect("hardcoded separator regex is valid")
});

/// Whether `line` looks like a `|---|:--:|` separator row.
pub fn is_separator_row(line: &str) -> bool {
    SEPARATOR_ROW.is_match(line.trim())
}

/// Cells between the leading and trailing pipe, trimmed.
fn split_cells(line: &str) -> Vec<String> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    parts[1..parts.len() - 1]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Parse one table block.
///
/// Line 0 is the header, line 1 the separator (skipped), and every further
/// non-blank line a data row. Row widths are not checked against the header
/// unless `options.pad_rows` is set.
pub fn parse_table(block: &str, options: &TableConfig) -> Result<StructuredTable> {
    let lines: Vec<&str> = block.trim().split('\n').collect();

    if options.validate_separator {
        match lines.get(1) {
            Some(line) if is_separator_row(line) => {}
            Some(line) => {
                return Err(FolioError::TableParse(format!(
                    "second line is not a separator row: {:?}",
                    line.trim()
                )));
            }
            None => {
                return Err(FolioError::TableParse(
                    "table has no separator row".into(),
                ));
            }
        }
    }

    let headers = lines.first().map(|line| split_cells(line)).unwrap_or_default();
    let rows = lines
        .iter()
        .skip(2)
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_cells(line))
        .collect();

    let mut table = StructuredTable { headers, rows };
    if options.pad_rows {
        table.pad_to_headers();
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| (*cell).to_string()).collect()
    }

    #[test]
    fn parses_minimal_table() {
        let table = parse_table("| A | B |\n|---|---|\n| 1 | 2 |\n", &TableConfig::default()).unwrap();
        assert_eq!(table.headers, strs(&["A", "B"]));
        assert_eq!(table.rows, vec![strs(&["1", "2"])]);
    }

    #[test]
    fn ragged_rows_are_kept_as_is() {
        let block = "| A | B | C |\n|---|---|---|\n| 1 |\n| 1 | 2 | 3 | 4 |\n";
        let table = parse_table(block, &TableConfig::default()).unwrap();
        assert_eq!(table.rows[0], strs(&["1"]));
        assert_eq!(table.rows[1], strs(&["1", "2", "3", "4"]));
        assert!(table.is_ragged());
    }

    #[test]
    fn padding_is_opt_in() {
        let options = TableConfig {
            pad_rows: true,
            ..TableConfig::default()
        };
        let table = parse_table("| A | B |\n|---|---|\n| 1 |\n", &options).unwrap();
        assert_eq!(table.rows, vec![strs(&["1", ""])]);
    }

    #[test]
    fn empty_cells_and_alignment_markers() {
        let block = "| Name | | Total |\n|:---|:-:|---:|\n|  Ada  |  | 10 |\n";
        let table = parse_table(block, &TableConfig::default()).unwrap();
        assert_eq!(table.headers, strs(&["Name", "", "Total"]));
        assert_eq!(table.rows, vec![strs(&["Ada", "", "10"])]);
    }

    #[test]
    fn blank_data_lines_are_skipped() {
        let block = "| A |\n|---|\n| 1 |\n   \n| 2 |";
        let table = parse_table(block, &TableConfig::default()).unwrap();
        assert_eq!(table.rows, vec![strs(&["1"]), strs(&["2"])]);
    }

    #[test]
    fn invalid_separator_is_rejected_by_default() {
        let block = "| A | B |\n| x | y |\n| 1 | 2 |\n";
        assert!(matches!(
            parse_table(block, &TableConfig::default()),
            Err(FolioError::TableParse(_))
        ));
    }

    #[test]
    fn unvalidated_separator_is_skipped_unconditionally() {
        let options = TableConfig {
            validate_separator: false,
            ..TableConfig::default()
        };
        let table = parse_table("| A | B |\n| x | y |\n| 1 | 2 |\n", &options).unwrap();
        assert_eq!(table.rows, vec![strs(&["1", "2"])]);
    }

    #[test]
    fn separator_shapes() {
        assert!(is_separator_row("|---|---|"));
        assert!(is_separator_row(" | :-- | --: | "));
        assert!(!is_separator_row("| a |"));
        assert!(!is_separator_row("---"));
        assert!(!is_separator_row("|---|\n|---|"));
        assert!(is_separator_row("|\t---\t|"));
    }
}
