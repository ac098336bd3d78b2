// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR collaborator seam: the backend trait, the engines behind it, and the
// token stream they produce.

pub mod tesseract;
pub mod tokens;

#[cfg(feature = "ocr")]
pub mod ocr;

use folio_core::config::OcrBackendConfig;
use folio_core::error::Result;
use image::DynamicImage;

pub use tesseract::TesseractCommand;
pub use tokens::{OcrData, RawConfidence, TokenGroup, TokenStream};

#[cfg(feature = "ocr")]
pub use ocr::OcrsBackend;

/// Anything that turns a decoded image into column-form OCR output.
///
/// Backends are shared across worker threads, so they must be `Send + Sync`.
/// Closures implement the trait, which keeps tests and embedders free of
/// boilerplate.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrData>;

    /// Check the engine is usable before a batch starts.
    fn probe(&self) -> Result<()> {
        Ok(())
    }
}

impl<F> OcrBackend for F
where
    F: Fn(&DynamicImage) -> Result<OcrData> + Send + Sync,
{
    fn recognize(&self, image: &DynamicImage) -> Result<OcrData> {
        self(image)
    }
}

/// Build the backend named in the configuration.
pub fn backend_from_config(config: &OcrBackendConfig) -> Result<Box<dyn OcrBackend>> {
    match config {
        OcrBackendConfig::Tesseract {
            program,
            language,
            psm,
        } => Ok(Box::new(
            TesseractCommand::new(program.clone())
                .with_language(language.clone())
                .with_psm(*psm),
        )),
        #[cfg(feature = "ocr")]
        OcrBackendConfig::Ocrs { model_dir } => {
            Ok(Box::new(OcrsBackend::from_model_dir(model_dir.as_deref())?))
        }
        #[cfg(not(feature = "ocr"))]
        OcrBackendConfig::Ocrs { .. } => Err(folio_core::error::FolioError::Config(
            "the ocrs backend requires building with the `ocr` feature".into(),
        )),
    }
}
