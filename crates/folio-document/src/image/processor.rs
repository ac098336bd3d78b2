// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image loading and encoding. Operates on in-memory images using the
// `image` crate.

use std::path::Path;

use folio_core::error::{FolioError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{info, instrument};

/// A decoded page image, the input to OCR and annotation.
///
/// ```ignore
/// let page = PageImage::open("scan.png")?;
/// let tokens = backend.recognize(page.as_dynamic())?;
/// ```
pub struct PageImage {
    image: DynamicImage,
}

impl PageImage {
    // -- Construction ---------------------------------------------------------

    /// Load and decode an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            FolioError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// An RGBA copy to draw on; the source stays untouched.
    pub fn to_canvas(&self) -> RgbaImage {
        self.image.to_rgba8()
    }

    // -- Output ---------------------------------------------------------------

    /// Encode any image as PNG bytes.
    pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| FolioError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn encoded_png_decodes_to_same_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 7, Rgb([200, 10, 10])));
        let bytes = PageImage::encode_png(&image).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }

    #[test]
    fn canvas_is_an_rgba_copy() {
        let page = PageImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            3,
            2,
            Rgb([1, 2, 3]),
        )));
        let canvas = page.to_canvas();
        assert_eq!(canvas.dimensions(), (3, 2));
        assert_eq!(canvas.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let result = PageImage::open("/nonexistent/scan.png");
        assert!(matches!(result, Err(FolioError::ImageError(_))));
    }
}
