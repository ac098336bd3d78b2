// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation overlay: one red outline and one blue label per visible token,
// drawn onto a copy of the page with `imageproc`. Debugging output only;
// nothing downstream reads it.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use folio_core::config::AnnotationConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::BoundingBox;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, instrument, warn};

use super::processor::PageImage;
use crate::scan::tokens::TokenStream;

const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);
const LABEL: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Labels sit this many pixels above the token's top edge.
const LABEL_OFFSET: i32 = 10;

/// Fonts probed when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws token boxes and labels. Built once per batch and shared.
pub struct Annotator {
    font: Option<FontVec>,
    scale: PxScale,
}

impl Annotator {
    /// Load the configured font, or the first system font found.
    ///
    /// An explicitly configured font that cannot be loaded is an error. With
    /// no font configured and none found, labels are skipped and only the
    /// outlines are drawn.
    pub fn new(config: &AnnotationConfig) -> Result<Self> {
        let scale = PxScale::from(config.font_scale);
        let font = match &config.font_path {
            Some(path) => Some(load_font(path)?),
            None => probe_system_fonts(),
        };
        if font.is_none() {
            warn!("No label font found; annotated images will carry outlines only");
        }
        Ok(Self { font, scale })
    }

    /// Outlines only.
    pub fn without_labels() -> Self {
        Self {
            font: None,
            scale: PxScale::from(12.0),
        }
    }

    /// Render every non-blank token onto a copy of `page`.
    ///
    /// The rectangle spans `(left, top)` to `(left + width, top + height)`
    /// inclusive. Labels start at `(left, top - 10)` and are clipped, not
    /// moved, when that falls off the canvas.
    #[instrument(skip_all, fields(tokens = tokens.len()))]
    pub fn render(&self, page: &PageImage, tokens: &TokenStream) -> RgbaImage {
        let mut canvas = page.to_canvas();
        let mut drawn = 0usize;

        let (canvas_width, canvas_height) = canvas.dimensions();

        for token in tokens.non_blank() {
            let bbox = token.bbox;
            // Boxes grow right and down, so one starting off the canvas has
            // nothing visible.
            if bbox.left < canvas_width && bbox.top < canvas_height {
                let right = bbox.right().min(canvas_width);
                let bottom = bbox.bottom().min(canvas_height);
                let rect = Rect::at(coord(bbox.left), coord(bbox.top))
                    .of_size(right - bbox.left + 1, bottom - bbox.top + 1);
                draw_hollow_rect_mut(&mut canvas, rect, OUTLINE);
            }

            if let Some(font) = &self.font {
                let (x, y) = label_origin(bbox);
                if x < coord(canvas_width) && y < coord(canvas_height) {
                    draw_text_mut(&mut canvas, LABEL, x, y, self.scale, font, &token.text);
                }
            }
            drawn += 1;
        }

        debug!(drawn, "Annotation overlay rendered");
        canvas
    }
}

fn coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Top-left corner of a token's label.
fn label_origin(bbox: BoundingBox) -> (i32, i32) {
    (coord(bbox.left), coord(bbox.top).saturating_sub(LABEL_OFFSET))
}

fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path).map_err(|err| {
        FolioError::FontError(format!("failed to read {}: {}", path.display(), err))
    })?;
    FontVec::try_from_vec(bytes).map_err(|err| {
        FolioError::FontError(format!("{} is not a usable font: {}", path.display(), err))
    })
}

fn probe_system_fonts() -> Option<FontVec> {
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .filter(|path| path.exists())
        .find_map(|path| match load_font(&path) {
            Ok(font) => {
                debug!(font = %path.display(), "Using system font for labels");
                Some(font)
            }
            Err(err) => {
                debug!(error = %err, "Skipping system font");
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::tokens::{OcrData, TokenGroup};
    use image::{DynamicImage, RgbaImage};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn blank_page() -> PageImage {
        PageImage::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            60, 40, WHITE,
        )))
    }

    fn stream(words: &[(&str, BoundingBox)]) -> TokenStream {
        let mut data = OcrData::default();
        for (text, bbox) in words {
            data.push(*text, *bbox, 95, TokenGroup::default());
        }
        TokenStream::from_ocr_data(&data).unwrap()
    }

    fn bbox(left: u32, top: u32, width: u32, height: u32) -> BoundingBox {
        BoundingBox {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn outlines_cover_inclusive_corners() {
        let tokens = stream(&[("word", bbox(5, 8, 10, 6))]);
        let canvas = Annotator::without_labels().render(&blank_page(), &tokens);

        assert_eq!(*canvas.get_pixel(5, 8), OUTLINE);
        assert_eq!(*canvas.get_pixel(15, 14), OUTLINE);
        assert_eq!(*canvas.get_pixel(10, 11), WHITE, "interior stays untouched");
    }

    #[test]
    fn blank_tokens_are_not_drawn() {
        let tokens = stream(&[("   ", bbox(5, 8, 10, 6))]);
        let canvas = Annotator::without_labels().render(&blank_page(), &tokens);
        assert!(canvas.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn source_page_is_not_modified() {
        let page = blank_page();
        let tokens = stream(&[("word", bbox(0, 0, 4, 4))]);
        let _ = Annotator::without_labels().render(&page, &tokens);
        assert!(page.to_canvas().pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn boxes_past_the_edge_are_clipped() {
        let tokens = stream(&[("edge", bbox(55, 35, 30, 30))]);
        let canvas = Annotator::without_labels().render(&blank_page(), &tokens);
        assert_eq!(*canvas.get_pixel(55, 35), OUTLINE);
    }

    #[test]
    fn coordinates_beyond_i32_do_not_wrap() {
        let tokens = stream(&[
            ("far", bbox(u32::MAX - 5, u32::MAX, 10, 10)),
            ("wide", bbox(2, 3, u32::MAX, u32::MAX)),
        ]);
        let canvas = Annotator::without_labels().render(&blank_page(), &tokens);

        assert_eq!(*canvas.get_pixel(2, 3), OUTLINE);
        assert_eq!(*canvas.get_pixel(59, 3), OUTLINE);
        assert_eq!(*canvas.get_pixel(2, 39), OUTLINE);
        assert_eq!(*canvas.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn label_origin_saturates() {
        assert_eq!(label_origin(bbox(4, 3, 1, 1)), (4, -7));
        assert_eq!(
            label_origin(bbox(u32::MAX, u32::MAX, 1, 1)),
            (i32::MAX, i32::MAX - LABEL_OFFSET)
        );
        assert_eq!(label_origin(bbox(0, 0, 1, 1)), (0, -LABEL_OFFSET));
    }

    #[test]
    fn missing_configured_font_is_an_error() {
        let config = AnnotationConfig {
            font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..AnnotationConfig::default()
        };
        assert!(matches!(
            Annotator::new(&config),
            Err(FolioError::FontError(_))
        ));
    }
}
