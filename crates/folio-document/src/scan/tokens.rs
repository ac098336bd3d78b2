// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Token stream model.
//
// OCR engines hand back column-oriented data: one array per field, all of
// the same length, index `i` describing the same token in every column
// (the shape of Tesseract's `image_to_data` dictionary). `OcrData` keeps that
// raw shape; `TokenStream` is the validated, row-oriented form every
// downstream stage consumes.

use folio_core::error::{FolioError, Result};
use folio_core::types::{BoundingBox, Confidence, Token};
use serde::{Deserialize, Serialize};

/// A confidence value as the engine emitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawConfidence {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawConfidence {
    /// Convert to an integer percentage: float first, then truncate.
    pub fn normalize(&self) -> Option<Confidence> {
        match self {
            Self::Integer(value) => i32::try_from(*value).ok().map(Confidence),
            Self::Float(value) => Confidence::from_f64(*value),
            Self::Text(raw) => Confidence::parse(raw),
        }
    }
}

impl From<i32> for RawConfidence {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for RawConfidence {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for RawConfidence {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Column-oriented OCR output for one image.
///
/// Missing columns deserialize as empty and are caught by
/// [`TokenStream::from_ocr_data`]'s length check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrData {
    pub level: Vec<u32>,
    pub page_num: Vec<u32>,
    pub block_num: Vec<u32>,
    pub line_num: Vec<u32>,
    pub left: Vec<u32>,
    pub top: Vec<u32>,
    pub width: Vec<u32>,
    pub height: Vec<u32>,
    pub conf: Vec<RawConfidence>,
    pub text: Vec<String>,
}

/// Grouping indices for one token (page > block > line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenGroup {
    pub level: u32,
    pub page_num: u32,
    pub block_num: u32,
    pub line_num: u32,
}

impl Default for TokenGroup {
    fn default() -> Self {
        Self {
            level: 5,
            page_num: 1,
            block_num: 1,
            line_num: 1,
        }
    }
}

impl OcrData {
    /// Append one token across every column.
    pub fn push(
        &mut self,
        text: impl Into<String>,
        bbox: BoundingBox,
        conf: impl Into<RawConfidence>,
        group: TokenGroup,
    ) {
        self.level.push(group.level);
        self.page_num.push(group.page_num);
        self.block_num.push(group.block_num);
        self.line_num.push(group.line_num);
        self.left.push(bbox.left);
        self.top.push(bbox.top);
        self.width.push(bbox.width);
        self.height.push(bbox.height);
        self.conf.push(conf.into());
        self.text.push(text.into());
    }

    /// Number of rows, taken from the `text` column.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether any row carries non-blank text.
    pub fn has_text(&self) -> bool {
        self.text.iter().any(|text| !text.trim().is_empty())
    }

    fn check_columns(&self) -> Result<()> {
        let expected = self.text.len();
        let columns = [
            ("level", self.level.len()),
            ("page_num", self.page_num.len()),
            ("block_num", self.block_num.len()),
            ("line_num", self.line_num.len()),
            ("left", self.left.len()),
            ("top", self.top.len()),
            ("width", self.width.len()),
            ("height", self.height.len()),
            ("conf", self.conf.len()),
        ];
        for (name, len) in columns {
            if len != expected {
                return Err(FolioError::MalformedTokens(format!(
                    "column `{name}` has {len} entries, `text` has {expected}"
                )));
            }
        }
        Ok(())
    }
}

/// Validated tokens in engine scan order. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Validate column lengths and normalise every confidence once.
    pub fn from_ocr_data(data: &OcrData) -> Result<Self> {
        data.check_columns()?;

        let tokens = (0..data.len())
            .map(|i| {
                let confidence = data.conf[i].normalize().ok_or_else(|| {
                    FolioError::MalformedTokens(format!(
                        "token {i} has non-numeric confidence {:?}",
                        data.conf[i]
                    ))
                })?;
                Ok(Token {
                    index: i,
                    text: data.text[i].clone(),
                    bbox: BoundingBox {
                        left: data.left[i],
                        top: data.top[i],
                        width: data.width[i],
                        height: data.height[i],
                    },
                    confidence,
                    level: data.level[i],
                    page_num: data.page_num[i],
                    block_num: data.block_num[i],
                    line_num: data.line_num[i],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens with visible text, in scan order.
    pub fn non_blank(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| !token.is_blank())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
