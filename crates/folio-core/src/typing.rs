//! Typing context and named style records.

use crate::color::Rgb;
use crate::error::ValidationError;
use crate::format::{CharFormat, DEFAULT_FONT_FAMILY, DEFAULT_POINT_SIZE};

/// Toggleable character attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleAttribute {
    /// Font weight.
    Bold,
    /// Font style.
    Italic,
    /// Underline decoration.
    Underline,
}

/// The format that the next typed characters receive.
///
/// One instance lives in each editing session; every format command updates it, and text typed at
/// a collapsed caret is reconciled against it. The toggle flags are never read back from the
/// surface: toggling over a selection with mixed formatting flips the flag regardless of what the
/// selection looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingContext {
    /// Bold toggle.
    pub bold_active: bool,
    /// Italic toggle.
    pub italic_active: bool,
    /// Underline toggle.
    pub underlined_active: bool,
    /// Foreground color.
    pub current_color: Rgb,
    /// Font family.
    pub current_font_family: String,
    /// Point size.
    pub current_point_size: u32,
    /// Line spacing multiplier (`1.0` = single).
    pub current_line_spacing: f32,
    /// Indentation level.
    pub current_indent: u32,
}

impl Default for TypingContext {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_FAMILY, DEFAULT_POINT_SIZE)
    }
}

impl TypingContext {
    /// A context with the given base font and every toggle off.
    pub fn new(font_family: impl Into<String>, point_size: u32) -> Self {
        Self {
            bold_active: false,
            italic_active: false,
            underlined_active: false,
            current_color: Rgb::BLACK,
            current_font_family: font_family.into(),
            current_point_size: point_size,
            current_line_spacing: 1.0,
            current_indent: 0,
        }
    }

    /// Current value of a toggle.
    pub fn is_active(&self, attr: ToggleAttribute) -> bool {
        match attr {
            ToggleAttribute::Bold => self.bold_active,
            ToggleAttribute::Italic => self.italic_active,
            ToggleAttribute::Underline => self.underlined_active,
        }
    }

    /// Flip a toggle and return its new value.
    pub fn flip(&mut self, attr: ToggleAttribute) -> bool {
        let flag = match attr {
            ToggleAttribute::Bold => &mut self.bold_active,
            ToggleAttribute::Italic => &mut self.italic_active,
            ToggleAttribute::Underline => &mut self.underlined_active,
        };
        *flag = !*flag;
        *flag
    }

    /// The complete character format typed text receives.
    pub fn char_format(&self) -> CharFormat {
        CharFormat::new()
            .with_font_family(self.current_font_family.clone())
            .with_point_size(self.current_point_size)
            .with_bold(self.bold_active)
            .with_italic(self.italic_active)
            .with_underline(self.underlined_active)
            .with_color(self.current_color)
    }

    /// Adopt every attribute of a named style.
    pub fn adopt(&mut self, style: &StyleRecord) {
        self.current_font_family = style.font_family.clone();
        self.current_point_size = style.point_size;
        self.bold_active = style.bold;
        self.italic_active = style.italic;
        self.underlined_active = style.underline;
        self.current_line_spacing = style.line_spacing;
        self.current_color = style.color;
    }
}

/// A named, reusable format preset.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRecord {
    /// Style name (non-empty).
    pub name: String,
    /// Font family.
    pub font_family: String,
    /// Point size (> 0).
    pub point_size: u32,
    /// Bold weight.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
    /// Underline decoration.
    pub underline: bool,
    /// Line spacing multiplier (> 0).
    pub line_spacing: f32,
    /// Foreground color.
    pub color: Rgb,
}

impl StyleRecord {
    /// A style with the default font and no decorations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            point_size: DEFAULT_POINT_SIZE,
            bold: false,
            italic: false,
            underline: false,
            line_spacing: 1.0,
            color: Rgb::BLACK,
        }
    }

    /// Capture the current typing context under `name`.
    pub fn from_context(name: impl Into<String>, ctx: &TypingContext) -> Self {
        Self {
            name: name.into(),
            font_family: ctx.current_font_family.clone(),
            point_size: ctx.current_point_size,
            bold: ctx.bold_active,
            italic: ctx.italic_active,
            underline: ctx.underlined_active,
            line_spacing: ctx.current_line_spacing,
            color: ctx.current_color,
        }
    }

    /// Reject records that cannot be stored.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyStyleName);
        }
        if self.point_size == 0 {
            return Err(ValidationError::ZeroPointSize);
        }
        if !(self.line_spacing.is_finite() && self.line_spacing > 0.0) {
            return Err(ValidationError::InvalidLineSpacing(self.line_spacing));
        }
        Ok(())
    }

    /// Character format this style applies.
    pub fn char_format(&self) -> CharFormat {
        CharFormat::new()
            .with_font_family(self.font_family.clone())
            .with_point_size(self.point_size)
            .with_bold(self.bold)
            .with_italic(self.italic)
            .with_underline(self.underline)
            .with_color(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_twice_restores() {
        let mut ctx = TypingContext::default();
        assert!(ctx.flip(ToggleAttribute::Bold));
        assert!(!ctx.flip(ToggleAttribute::Bold));
        assert!(!ctx.bold_active);
    }

    #[test]
    fn test_style_validation() {
        assert_eq!(
            StyleRecord::new("  ").validate(),
            Err(ValidationError::EmptyStyleName)
        );
        assert!(StyleRecord::new("Heading").validate().is_ok());
    }

    #[test]
    fn test_style_validation_rejects_unusable_metrics() {
        let mut style = StyleRecord::new("Tiny");
        style.point_size = 0;
        assert_eq!(style.validate(), Err(ValidationError::ZeroPointSize));

        style.point_size = 12;
        for spacing in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            style.line_spacing = spacing;
            assert!(matches!(
                style.validate(),
                Err(ValidationError::InvalidLineSpacing(_))
            ));
        }
    }
}
