//! Inline images and hyperlinks.

use crate::color::Rgb;
use crate::error::{DecodeError, ValidationError};
use crate::format::CharFormat;
use std::ops::RangeInclusive;
use std::path::Path;

/// Allowed display width/height for inserted images, in pixels.
pub const IMAGE_DIMENSION_RANGE: RangeInclusive<u32> = 1..=3000;

/// Native pixel dimensions of the image at `path`.
///
/// The format is sniffed from the file content, not the extension.
pub fn probe_image(path: &Path) -> Result<(u32, u32), DecodeError> {
    let decode_error = |source| DecodeError {
        path: path.to_path_buf(),
        source,
    };
    image::ImageReader::open(path)
        .map_err(|err| decode_error(image::ImageError::IoError(err)))?
        .with_guessed_format()
        .map_err(|err| decode_error(image::ImageError::IoError(err)))?
        .into_dimensions()
        .map_err(decode_error)
}

/// Clamp a proposed image dimension into [`IMAGE_DIMENSION_RANGE`].
pub fn clamp_dimension(value: u32) -> u32 {
    value.clamp(*IMAGE_DIMENSION_RANGE.start(), *IMAGE_DIMENSION_RANGE.end())
}

/// A validated hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    text: String,
    href: String,
}

impl LinkSpec {
    /// Validate that both the visible text and the address are non-empty.
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        let href = href.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyLinkText);
        }
        if href.trim().is_empty() {
            return Err(ValidationError::EmptyLinkUrl);
        }
        Ok(Self {
            text,
            href: href.trim().to_string(),
        })
    }

    /// Visible text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Target address.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Format of the anchor's characters: underlined, link blue, carrying the address.
    pub fn char_format(&self) -> CharFormat {
        CharFormat::new()
            .with_anchor(self.href.clone())
            .with_underline(true)
            .with_color(Rgb::LINK_BLUE)
    }
}
