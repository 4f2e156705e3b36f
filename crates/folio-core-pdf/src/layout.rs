//! Page-aware layout.
//!
//! Each editor page starts a new sheet. Paragraphs are broken into lines that fit the content
//! width; a line that does not fit below the previous one moves to a fresh sheet. All positions
//! are in PDF user space (points, origin at the bottom-left corner).

use crate::font::BaseFont;
use crate::options::PdfOptions;
use folio_core::{
    Block, CharFormat, DEFAULT_FONT_FAMILY, DEFAULT_POINT_SIZE, INDENT_WIDTH_PX, Inline, RichText,
    Rgb,
};

/// CSS pixels to points.
const PX_TO_PT: f32 = 0.75;

/// Part of the line height above the baseline, relative to the font size.
const ASCENT: f32 = 0.95;
/// Part of the line height below the baseline, relative to the font size.
const DESCENT: f32 = 0.25;

/// Visual attributes shared by a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Face.
    pub font: BaseFont,
    /// Size in points.
    pub size: f32,
    /// Fill color.
    pub color: Rgb,
    /// Draw an underline.
    pub underline: bool,
    /// Link target.
    pub href: Option<String>,
}

impl TextStyle {
    fn from_format(format: &CharFormat) -> Self {
        let family = format.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY);
        Self {
            font: BaseFont::resolve(family, format.is_bold(), format.is_italic()),
            size: format.point_size.unwrap_or(DEFAULT_POINT_SIZE).max(1) as f32,
            color: format.color.unwrap_or(Rgb::BLACK),
            underline: format.is_underlined(),
            href: format.anchor_href.clone(),
        }
    }
}

/// A positioned drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A run of text starting at `(x, baseline)`.
    Text {
        /// Left edge.
        x: f32,
        /// Baseline.
        baseline: f32,
        /// Advance width of the whole run.
        width: f32,
        /// Text.
        text: String,
        /// Attributes.
        style: TextStyle,
    },
    /// An image whose lower-left corner is `(x, y)`.
    Image {
        /// Left edge.
        x: f32,
        /// Bottom edge.
        y: f32,
        /// Drawn width.
        width: f32,
        /// Drawn height.
        height: f32,
        /// Source path as written in the markup.
        src: String,
    },
}

/// One output page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Drawing operations in paint order.
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
enum Fragment {
    Word {
        text: String,
        style: TextStyle,
        width: f32,
    },
    Space {
        text: String,
        style: TextStyle,
        width: f32,
    },
    Image {
        src: String,
        width: f32,
        height: f32,
    },
}

impl Fragment {
    fn width(&self) -> f32 {
        match self {
            Fragment::Word { width, .. }
            | Fragment::Space { width, .. }
            | Fragment::Image { width, .. } => *width,
        }
    }

    fn is_space(&self) -> bool {
        matches!(self, Fragment::Space { .. })
    }

    /// Height above and below the baseline.
    fn extent(&self) -> (f32, f32) {
        match self {
            Fragment::Word { style, .. } | Fragment::Space { style, .. } => {
                (style.size * ASCENT, style.size * DESCENT)
            }
            Fragment::Image { height, .. } => (*height, 0.0),
        }
    }
}

/// Lays out editor pages onto sheets.
pub struct LayoutEngine<'a> {
    options: &'a PdfOptions,
    sheets: Vec<Sheet>,
    /// Distance from the top of the content box to the top of the next line.
    cursor: f32,
}

impl<'a> LayoutEngine<'a> {
    /// An engine with no sheets yet.
    pub fn new(options: &'a PdfOptions) -> Self {
        Self {
            options,
            sheets: Vec::new(),
            cursor: 0.0,
        }
    }

    /// Lay out one editor page, starting on a fresh sheet.
    pub fn layout_page(&mut self, page: &RichText) {
        self.start_sheet();
        for block in page.blocks() {
            self.layout_block(block);
        }
    }

    /// The laid out sheets.
    pub fn finish(self) -> Vec<Sheet> {
        self.sheets
    }

    fn start_sheet(&mut self) {
        self.sheets.push(Sheet::default());
        self.cursor = 0.0;
    }

    fn layout_block(&mut self, block: &Block) {
        let indent = block.format.indent.unwrap_or(0) as f32 * INDENT_WIDTH_PX as f32 * PX_TO_PT;
        let indent = indent.min(self.options.content_width() * 0.5);
        let available = self.options.content_width() - indent;
        let spacing = block.format.line_height_percent.unwrap_or(100) as f32 / 100.0;

        let fragments = self.fragments(block, available);
        if fragments.is_empty() {
            let size = DEFAULT_POINT_SIZE as f32;
            self.advance(size * (ASCENT + DESCENT) * spacing);
            return;
        }

        let mut line: Vec<Fragment> = Vec::new();
        let mut width = 0.0;
        let mut wrapped = false;
        for fragment in fragments {
            // Continuation lines never start with whitespace.
            if wrapped && line.is_empty() && fragment.is_space() {
                continue;
            }
            if !line.is_empty() && !fragment.is_space() && width + fragment.width() > available {
                self.emit_line(&line, indent, spacing);
                line.clear();
                width = 0.0;
                wrapped = true;
            }
            width += fragment.width();
            line.push(fragment);
        }
        if !line.is_empty() {
            self.emit_line(&line, indent, spacing);
        }
    }

    fn fragments(&self, block: &Block, available: f32) -> Vec<Fragment> {
        let mut out = Vec::new();
        for span in &block.spans {
            match &span.content {
                Inline::Image(image) => {
                    let (width, height) = self.fit_image(image.width, image.height, available);
                    out.push(Fragment::Image {
                        src: image.src.clone(),
                        width,
                        height,
                    });
                }
                Inline::Text(text) => {
                    let style = TextStyle::from_format(&span.format);
                    for (is_space, piece) in split_words(text) {
                        if is_space {
                            out.push(Fragment::Space {
                                width: style.font.text_width(piece, style.size),
                                text: piece.to_string(),
                                style: style.clone(),
                            });
                        } else {
                            self.push_word(&mut out, piece, &style, available);
                        }
                    }
                }
            }
        }
        out
    }

    /// Push a word, breaking it between characters when it is wider than a whole line.
    fn push_word(&self, out: &mut Vec<Fragment>, word: &str, style: &TextStyle, available: f32) {
        let mut piece = String::new();
        let mut width = 0.0;
        for c in word.chars() {
            let w = style.font.text_width(c.encode_utf8(&mut [0; 4]), style.size);
            if !piece.is_empty() && width + w > available {
                out.push(Fragment::Word {
                    text: std::mem::take(&mut piece),
                    style: style.clone(),
                    width,
                });
                width = 0.0;
            }
            piece.push(c);
            width += w;
        }
        if !piece.is_empty() {
            out.push(Fragment::Word {
                text: piece,
                style: style.clone(),
                width,
            });
        }
    }

    fn fit_image(&self, width_px: u32, height_px: u32, available: f32) -> (f32, f32) {
        let mut width = width_px.max(1) as f32 * PX_TO_PT;
        let mut height = height_px.max(1) as f32 * PX_TO_PT;
        let scale = (available / width)
            .min(self.options.content_height() / height)
            .min(1.0);
        width *= scale;
        height *= scale;
        (width, height)
    }

    fn emit_line(&mut self, line: &[Fragment], indent: f32, spacing: f32) {
        let (ascent, descent) = line
            .iter()
            .map(Fragment::extent)
            .fold((0.0f32, 0.0f32), |(a, d), (fa, fd)| (a.max(fa), d.max(fd)));
        let height = (ascent + descent) * spacing;

        let sheet_has_content = self.sheets.last().is_some_and(|s| !s.items.is_empty());
        if self.cursor + height > self.options.content_height() && sheet_has_content {
            self.start_sheet();
        }

        let top = self.options.page_height - self.options.margin - self.cursor;
        let baseline = top - ascent;
        let mut x = self.options.margin + indent;
        let mut items: Vec<Item> = Vec::new();
        for fragment in line {
            match fragment {
                Fragment::Word { text, style, width } | Fragment::Space { text, style, width } => {
                    if let Some(Item::Text {
                        text: prev_text,
                        style: prev_style,
                        width: prev_width,
                        ..
                    }) = items.last_mut()
                        && prev_style == style
                    {
                        prev_text.push_str(text);
                        *prev_width += width;
                    } else {
                        items.push(Item::Text {
                            x,
                            baseline,
                            width: *width,
                            text: text.clone(),
                            style: style.clone(),
                        });
                    }
                }
                Fragment::Image { src, width, height } => items.push(Item::Image {
                    x,
                    y: baseline,
                    width: *width,
                    height: *height,
                    src: src.clone(),
                }),
            }
            x += fragment.width();
        }

        trim_trailing_space(&mut items);
        if let Some(sheet) = self.sheets.last_mut() {
            sheet.items.extend(items);
        }
        self.cursor += height;
    }

    fn advance(&mut self, height: f32) {
        if self.cursor + height > self.options.content_height() {
            self.start_sheet();
        }
        self.cursor += height;
    }
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        if current.is_some_and(|kind| kind != is_space) {
            out.push((!is_space, &text[start..i]));
            start = i;
        }
        current = Some(is_space);
    }
    if let Some(kind) = current {
        out.push((kind, &text[start..]));
    }
    out
}

fn trim_trailing_space(items: &mut Vec<Item>) {
    if let Some(Item::Text {
        text, style, width, ..
    }) = items.last_mut()
    {
        let trimmed = text.trim_end();
        if trimmed.len() != text.len() {
            let removed = style.font.text_width(&text[trimmed.len()..], style.size);
            text.truncate(trimmed.len());
            *width -= removed;
        }
        if text.is_empty() {
            items.pop();
        }
    }
}
