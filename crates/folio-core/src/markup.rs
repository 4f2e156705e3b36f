//! Markup codec for page content.
//!
//! Pages are serialized to a small HTML subset: one `<p>` per paragraph, `<span style>` runs,
//! `<a href>` anchors and `<img>` references. The parser accepts that output plus the common
//! HTML emitted by other rich-text widgets (`<b>`, `<i>`, `<u>`, `<br>`, `<div>`, headings,
//! `-qt-block-indent`, pixel font sizes, character entities and comments).
//!
//! `from_markup(&to_markup(doc)) == doc` holds for every normalized document.

use crate::color::Rgb;
use crate::document::{Block, ImageRef, Inline, RichText, Span};
use crate::format::{BlockFormat, CharFormat, INDENT_WIDTH_PX, MAX_INDENT};
use std::fmt::Write as _;

/// Markup parse errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unterminated tag starting at byte {offset}")]
    /// A `<` without a matching `>`.
    UnterminatedTag {
        /// Byte offset of the `<`.
        offset: usize,
    },

    #[error("unterminated comment starting at byte {offset}")]
    /// A `<!--` without a matching `-->`.
    UnterminatedComment {
        /// Byte offset of the comment start.
        offset: usize,
    },

    #[error("invalid value '{value}' for attribute '{attr}' of <{tag}>")]
    /// An attribute value that must be numeric is not.
    InvalidAttribute {
        /// Tag name.
        tag: String,
        /// Attribute name.
        attr: String,
        /// Offending value.
        value: String,
    },
}

// ---------------------------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------------------------

/// Serialize a page. A single empty, unformatted paragraph serializes to `""`.
pub fn to_markup(doc: &RichText) -> String {
    if doc.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for (i, block) in doc.blocks().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_block(&mut out, block);
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    let mut style = String::new();
    if let Some(indent) = block.format.indent {
        let _ = write!(style, "margin-left:{}px;", indent.saturating_mul(INDENT_WIDTH_PX));
    }
    if let Some(percent) = block.format.line_height_percent {
        let _ = write!(style, "line-height:{}%;", percent);
    }
    if style.is_empty() {
        out.push_str("<p>");
    } else {
        let _ = write!(out, "<p style=\"{}\">", style);
    }
    for span in &block.spans {
        write_span(out, span);
    }
    out.push_str("</p>");
}

fn write_span(out: &mut String, span: &Span) {
    match &span.content {
        Inline::Image(image) => {
            let _ = write!(
                out,
                "<img src=\"{}\" width=\"{}\" height=\"{}\" />",
                escape(&image.src),
                image.width,
                image.height
            );
        }
        Inline::Text(text) => {
            if let Some(href) = &span.format.anchor_href {
                let _ = write!(out, "<a href=\"{}\">", escape(href));
            }
            let style = char_style(&span.format);
            if style.is_empty() {
                out.push_str(&escape(text));
            } else {
                let _ = write!(
                    out,
                    "<span style=\"{}\">{}</span>",
                    escape(&style),
                    escape(text)
                );
            }
            if span.format.anchor_href.is_some() {
                out.push_str("</a>");
            }
        }
    }
}

fn char_style(format: &CharFormat) -> String {
    let mut style = String::new();
    if let Some(family) = &format.font_family {
        let _ = write!(style, "font-family:'{}';", quote_family(family));
    }
    if let Some(size) = format.point_size {
        let _ = write!(style, "font-size:{}pt;", size);
    }
    if let Some(bold) = format.bold {
        let _ = write!(style, "font-weight:{};", if bold { 700 } else { 400 });
    }
    if let Some(italic) = format.italic {
        let _ = write!(style, "font-style:{};", if italic { "italic" } else { "normal" });
    }
    if let Some(underline) = format.underline {
        let _ = write!(
            style,
            "text-decoration:{};",
            if underline { "underline" } else { "none" }
        );
    }
    if let Some(color) = format.color {
        let _ = write!(style, "color:{};", color.to_hex());
    }
    style
}

/// Backslash-escape a family name for a single-quoted CSS string.
fn quote_family(family: &str) -> String {
    let mut out = String::with_capacity(family.len());
    for ch in family.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, MarkupError> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        let rest = &input[pos..];
        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or(MarkupError::UnterminatedComment { offset: pos })?;
            pos += end + 3;
            continue;
        }
        if rest.starts_with('<') {
            let end = find_tag_end(rest).ok_or(MarkupError::UnterminatedTag { offset: pos })?;
            if let Some(token) = parse_tag(&rest[1..end]) {
                tokens.push(token);
            }
            pos += end + 1;
            continue;
        }
        let end = rest.find('<').unwrap_or(rest.len());
        tokens.push(Token::Text(decode_entities(&rest[..end])));
        pos += end;
    }
    Ok(tokens)
}

/// Byte index of the `>` closing the tag that starts `s`, skipping quoted attribute values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in s.char_indices().skip(1) {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '>' => return Some(i),
            None => {}
        }
    }
    None
}

fn parse_tag(inner: &str) -> Option<Token> {
    let inner = inner.trim();
    if inner.starts_with('!') || inner.starts_with('?') {
        // <!DOCTYPE ...>, <?xml ...?>
        return None;
    }
    if let Some(name) = inner.strip_prefix('/') {
        return Some(Token::Close {
            name: name.trim().to_ascii_lowercase(),
        });
    }
    let (body, self_closing) = match inner.strip_suffix('/') {
        Some(body) => (body, true),
        None => (inner, false),
    };
    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let name = body[..name_end].to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    Some(Token::Open {
        name,
        attrs: parse_attrs(&body[name_end..]),
        self_closing,
    })
}

fn parse_attrs(mut s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        s = s.trim_start();
        if s.is_empty() {
            break;
        }
        let name_end = s
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(s.len());
        let name = s[..name_end].to_ascii_lowercase();
        s = s[name_end..].trim_start();
        let Some(after_eq) = s.strip_prefix('=') else {
            // Bare attribute (`<input disabled>`).
            if !name.is_empty() {
                attrs.push((name, String::new()));
            }
            if name_end == 0 {
                // Stray character; skip it to guarantee progress.
                let mut chars = s.chars();
                chars.next();
                s = chars.as_str();
            }
            continue;
        };
        let after_eq = after_eq.trim_start();
        let (value, rest) = match after_eq.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &after_eq[1..];
                let close = body.find(q).unwrap_or(body.len());
                let rest = body.get(close + 1..).unwrap_or("");
                (&body[..close], rest)
            }
            _ => {
                let end = after_eq
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };
        attrs.push((name, decode_entities(value)));
        s = rest;
    }
    attrs
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------------------------

const BLOCK_TAGS: &[&str] = &["p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li"];
const SKIPPED_TAGS: &[&str] = &["head", "style", "title", "script"];

struct Builder {
    blocks: Vec<Block>,
    current: Option<Block>,
    /// Open inline elements: tag name plus the format in effect inside it.
    inline_stack: Vec<(String, CharFormat)>,
    skip_depth: usize,
}

impl Builder {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current: None,
            inline_stack: Vec::new(),
            skip_depth: 0,
        }
    }

    fn current_format(&self) -> CharFormat {
        self.inline_stack
            .last()
            .map(|(_, f)| f.clone())
            .unwrap_or_default()
    }

    fn finish_block(&mut self) {
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }

    fn block_mut(&mut self) -> &mut Block {
        self.current.get_or_insert_with(Block::default)
    }

    fn text(&mut self, text: String) {
        if self.skip_depth > 0 {
            return;
        }
        // Whitespace between paragraphs is layout noise, not content.
        if self.current.is_none() && text.trim().is_empty() {
            return;
        }
        let format = self.current_format();
        let block = self.block_mut();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                block.spans.push(Span::text(" ", format.clone()));
            }
            block.spans.push(Span::text(line, format.clone()));
        }
    }

    fn open(&mut self, name: String, attrs: Vec<(String, String)>, self_closing: bool) -> Result<(), MarkupError> {
        if SKIPPED_TAGS.contains(&name.as_str()) {
            if !self_closing {
                self.skip_depth += 1;
            }
            return Ok(());
        }
        if self.skip_depth > 0 {
            return Ok(());
        }
        let attr = |key: &str| attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

        if BLOCK_TAGS.contains(&name.as_str()) {
            self.finish_block();
            let format = attr("style").map(parse_block_style).unwrap_or_default();
            self.current = Some(Block::new(format));
            if self_closing {
                self.finish_block();
            }
            return Ok(());
        }

        match name.as_str() {
            "br" => {
                let format = self.current.as_ref().map(|b| b.format).unwrap_or_default();
                self.finish_block();
                self.current = Some(Block::new(format));
            }
            "img" => {
                let src = attr("src").unwrap_or_default().to_string();
                let width = parse_dimension(&attrs, "width")?;
                let height = parse_dimension(&attrs, "height")?;
                self.block_mut().spans.push(Span::image(
                    ImageRef::new(src, width, height),
                    CharFormat::default(),
                ));
            }
            _ => {
                let mut format = self.current_format();
                match name.as_str() {
                    "b" | "strong" => format.bold = Some(true),
                    "i" | "em" => format.italic = Some(true),
                    "u" => format.underline = Some(true),
                    "a" => {
                        if let Some(href) = attr("href") {
                            format.anchor_href = Some(href.to_string());
                        }
                    }
                    _ => {}
                }
                if let Some(style) = attr("style") {
                    format.merge(&parse_char_style(style));
                }
                if let Some(color) = attr("color").and_then(|c| c.parse::<Rgb>().ok()) {
                    format.color = Some(color);
                }
                if !self_closing {
                    self.inline_stack.push((name, format));
                }
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &str) {
        if SKIPPED_TAGS.contains(&name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        if BLOCK_TAGS.contains(&name) {
            self.finish_block();
            return;
        }
        if let Some(index) = self.inline_stack.iter().rposition(|(n, _)| n == name) {
            self.inline_stack.truncate(index);
        }
    }

    fn finish(mut self) -> RichText {
        self.finish_block();
        RichText::from_blocks(self.blocks)
    }
}

fn parse_dimension(attrs: &[(String, String)], key: &str) -> Result<u32, MarkupError> {
    let Some((_, value)) = attrs.iter().find(|(k, _)| k == key) else {
        return Ok(0);
    };
    let trimmed = value.trim().trim_end_matches("px");
    trimmed
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32)
        .ok_or_else(|| MarkupError::InvalidAttribute {
            tag: "img".to_string(),
            attr: key.to_string(),
            value: value.clone(),
        })
}

/// Split on `sep` outside of quoted CSS strings.
fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(_) if ch == '\\' => escaped = true,
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == sep => {
                parts.push(&s[start..i]);
                start = i + ch.len_utf8();
            }
            None => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn style_declarations(style: &str) -> impl Iterator<Item = (String, &str)> {
    split_unquoted(style, ';').into_iter().filter_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        Some((prop.trim().to_ascii_lowercase(), value.trim()))
    })
}

/// First family of a `font-family` list, unquoted.
fn parse_font_family(value: &str) -> Option<String> {
    let first = split_unquoted(value, ',').into_iter().next().unwrap_or(value).trim();
    let family = match first.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let mut family = String::new();
            let mut chars = first[1..].chars();
            while let Some(ch) = chars.next() {
                match ch {
                    '\\' => family.extend(chars.next()),
                    c if c == q => break,
                    c => family.push(c),
                }
            }
            family
        }
        _ => first.to_string(),
    };
    (!family.is_empty()).then_some(family)
}

fn parse_length_px(value: &str) -> Option<f32> {
    let value = value.trim();
    if let Some(pt) = value.strip_suffix("pt") {
        // 1pt == 4/3 px.
        return pt.trim().parse::<f32>().ok().map(|v| v * 4.0 / 3.0);
    }
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}

fn parse_block_style(style: &str) -> BlockFormat {
    let mut format = BlockFormat::default();
    for (prop, value) in style_declarations(style) {
        match prop.as_str() {
            "margin-left" => {
                if let Some(px) = parse_length_px(value).filter(|px| px.is_finite()) {
                    let levels = (px / INDENT_WIDTH_PX as f32).round();
                    format.indent = Some(levels.clamp(0.0, MAX_INDENT as f32) as u32);
                }
            }
            "-qt-block-indent" => {
                if let Ok(levels) = value.parse::<u32>() {
                    format.indent = Some(levels.min(MAX_INDENT));
                }
            }
            "line-height" => {
                if let Some(percent) = value.strip_suffix('%').and_then(|p| p.trim().parse::<f32>().ok()) {
                    format.line_height_percent = Some(percent.round().max(1.0) as u32);
                }
            }
            _ => {}
        }
    }
    format
}

fn parse_char_style(style: &str) -> CharFormat {
    let mut format = CharFormat::default();
    for (prop, value) in style_declarations(style) {
        match prop.as_str() {
            "font-family" => {
                if let Some(family) = parse_font_family(value) {
                    format.font_family = Some(family);
                }
            }
            "font-size" => {
                let size = if let Some(pt) = value.strip_suffix("pt") {
                    pt.trim().parse::<f32>().ok()
                } else if let Some(px) = value.strip_suffix("px") {
                    px.trim().parse::<f32>().ok().map(|v| v * 0.75)
                } else {
                    value.parse::<f32>().ok()
                };
                if let Some(size) = size.filter(|s| *s > 0.0) {
                    format.point_size = Some(size.round().max(1.0) as u32);
                }
            }
            "font-weight" => {
                format.bold = match value {
                    "bold" | "bolder" => Some(true),
                    "normal" | "lighter" => Some(false),
                    other => other.parse::<u32>().ok().map(|w| w >= 600),
                };
            }
            "font-style" => format.italic = Some(matches!(value, "italic" | "oblique")),
            "text-decoration" | "text-decoration-line" => {
                format.underline = Some(value.contains("underline"));
            }
            "color" => format.color = value.parse::<Rgb>().ok(),
            _ => {}
        }
    }
    format
}

/// Parse page markup.
pub fn from_markup(markup: &str) -> Result<RichText, MarkupError> {
    let mut builder = Builder::new();
    for token in tokenize(markup)? {
        match token {
            Token::Text(text) => builder.text(text),
            Token::Open {
                name,
                attrs,
                self_closing,
            } => builder.open(name, attrs, self_closing)?,
            Token::Close { name } => builder.close(&name),
        }
    }
    Ok(builder.finish())
}
