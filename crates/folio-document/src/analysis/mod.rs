// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Token-stream consumers: confidence triage, header inference, style records.
// All three are pure and independent of each other.

pub mod structure;
pub mod styles;
pub mod triage;

pub use structure::{infer_headers, infer_headers_from_ocr_data};
pub use styles::extract_styles;
pub use triage::{Triage, triage, triage_ocr_data};
