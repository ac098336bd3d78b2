// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report assembly: merges triage, structure, and stats into `report.json`.

use std::path::Path;

use folio_core::error::Result;
use folio_core::types::{HeaderAssignment, MissedTextEntry, Report};
use tracing::{error, info, instrument};

use crate::output;

/// Build a report from its three inputs. `full_text` is accepted as anything
/// printable and stored in its string form.
pub fn assemble_report(
    full_text: impl ToString,
    missed: Vec<MissedTextEntry>,
    headers: HeaderAssignment,
) -> Report {
    Report::new(full_text, missed, headers)
}

/// Persist `report` to `path`.
///
/// On failure the report is dumped to the error log before the error is
/// returned, so the data is not lost with the artifact.
#[instrument(skip(report), fields(path = %path.display()))]
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    match output::write_json(path, report) {
        Ok(()) => {
            info!(
                total_characters = report.stats.total_characters,
                missed_characters = report.stats.missed_characters,
                header_count = report.stats.header_count,
                "Report generated"
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, report = ?report, "Failed to write report");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::types::{Confidence, HeaderEntry, HeaderLevel};
    use tempfile::tempdir;

    fn sample() -> Report {
        assemble_report(
            "Ledger 2024 ±5",
            vec![MissedTextEntry {
                text: "±5".into(),
                confidence: Confidence(33),
                position: (120, 48),
            }],
            HeaderAssignment::new(vec![HeaderEntry {
                token_index: 0,
                text: "Ledger".into(),
                level: HeaderLevel::H1,
            }]),
        )
    }

    #[test]
    fn non_string_text_is_coerced() {
        let report = assemble_report(2024, Vec::new(), HeaderAssignment::default());
        assert_eq!(report.extracted_text, "2024");
        assert_eq!(report.stats.total_characters, 4);
    }

    #[test]
    fn written_report_has_expected_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&sample(), &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("±5"), "non-ASCII must be preserved: {raw}");

        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["extracted_text"], "Ledger 2024 ±5");
        assert_eq!(json["missed_text"][0]["position"], serde_json::json!([120, 48]));
        assert_eq!(json["document_structure"][0]["level"], "H1");
        assert_eq!(json["document_structure"][0]["token_index"], 0);
        assert_eq!(json["stats"]["missed_characters"], 2);
        assert_eq!(json["stats"]["header_count"], 1);
    }

    #[test]
    fn write_failure_is_returned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("report.json");
        assert!(write_report(&sample(), &path).is_err());
    }
}
