//! Character and paragraph formats.
//!
//! Both format types store every attribute as an `Option`: an unset field means "inherit / leave
//! untouched". This is what makes [`CharFormat::merge`] a *merge* rather than a replacement: applying
//! a bold-only format over a selection keeps each character's family, size and color.

use crate::color::Rgb;

/// Default font family used when neither the document nor the configuration names one.
pub const DEFAULT_FONT_FAMILY: &str = "Times New Roman";

/// Default point size.
pub const DEFAULT_POINT_SIZE: u32 = 12;

/// Width of one indentation level in CSS pixels, as written into markup.
pub const INDENT_WIDTH_PX: u32 = 40;

/// Deepest indentation level a paragraph can carry.
pub const MAX_INDENT: u32 = 100;

/// Character-level format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CharFormat {
    /// Font family name.
    pub font_family: Option<String>,
    /// Font size in points.
    pub point_size: Option<u32>,
    /// Bold weight.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,
    /// Underline decoration.
    pub underline: Option<bool>,
    /// Foreground color.
    pub color: Option<Rgb>,
    /// Hyperlink target; set on the characters of an anchor.
    pub anchor_href: Option<String>,
}

impl CharFormat {
    /// An empty format (merging it is a no-op).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Set the point size.
    pub fn with_point_size(mut self, size: u32) -> Self {
        self.point_size = Some(size);
        self
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set the italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Set the underline flag.
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    /// Set the foreground color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Mark the characters as an anchor pointing at `href`.
    pub fn with_anchor(mut self, href: impl Into<String>) -> Self {
        self.anchor_href = Some(href.into());
        self
    }

    /// Overwrite every field that `other` sets; fields `other` leaves unset are kept.
    pub fn merge(&mut self, other: &CharFormat) {
        if let Some(family) = &other.font_family {
            self.font_family = Some(family.clone());
        }
        if other.point_size.is_some() {
            self.point_size = other.point_size;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if let Some(href) = &other.anchor_href {
            self.anchor_href = Some(href.clone());
        }
    }

    /// Returns a copy of `self` with `other` merged on top.
    pub fn merged(&self, other: &CharFormat) -> CharFormat {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Effective weight (unset means regular).
    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    /// Effective style (unset means upright).
    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    /// Effective underline (unset means none).
    pub fn is_underlined(&self) -> bool {
        self.underline.unwrap_or(false)
    }
}

/// Paragraph-level format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlockFormat {
    /// Indentation level (each level is [`INDENT_WIDTH_PX`] wide).
    pub indent: Option<u32>,
    /// Line height relative to single spacing, in percent (`150` = 1.5 lines).
    pub line_height_percent: Option<u32>,
}

impl BlockFormat {
    /// An empty block format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation level.
    pub fn with_indent(mut self, indent: u32) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Set the proportional line height.
    pub fn with_line_height_percent(mut self, percent: u32) -> Self {
        self.line_height_percent = Some(percent);
        self
    }

    /// Overwrite every field that `other` sets.
    pub fn merge(&mut self, other: &BlockFormat) {
        if other.indent.is_some() {
            self.indent = other.indent;
        }
        if other.line_height_percent.is_some() {
            self.line_height_percent = other.line_height_percent;
        }
    }
}

/// Convert a user-facing line spacing multiplier (`1.5`) into a percentage.
///
/// Returns `None` for non-finite or non-positive values.
pub fn line_spacing_percent(multiplier: f32) -> Option<u32> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return None;
    }
    let percent = (multiplier * 100.0).round();
    if percent < 1.0 {
        return None;
    }
    Some(percent.min(u32::MAX as f32) as u32)
}
