// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: page decoding/encoding and token annotation overlays.

pub mod annotate;
pub mod processor;

pub use annotate::Annotator;
pub use processor::PageImage;
