//! Paginated rich-text content for a single page.
//!
//! A [`RichText`] is an ordered list of paragraphs ([`Block`]s). Each block carries a
//! [`BlockFormat`] and a list of [`Span`]s; a span is either a run of text or an inline image,
//! together with its [`CharFormat`].
//!
//! All public offsets are **character offsets** into the plain-text projection (see
//! [`RichText::plain_text`]): blocks are joined by `'\n'`, and each inline image counts as one
//! character ([`OBJECT_REPLACEMENT_CHAR`]).

use crate::format::{BlockFormat, CharFormat};
use std::ops::Range;

/// Character that stands in for an inline image in the plain-text projection.
pub const OBJECT_REPLACEMENT_CHAR: char = '\u{FFFC}';

/// Inline image reference (images are stored by path, never embedded).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// Source path or URL of the image.
    pub src: String,
    /// Display width in pixels.
    pub width: u32,
    /// Display height in pixels.
    pub height: u32,
}

impl ImageRef {
    /// Create an image reference.
    pub fn new(src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            width,
            height,
        }
    }
}

/// Content of a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// A run of text (never contains `'\n'`).
    Text(String),
    /// An inline image.
    Image(ImageRef),
}

impl Inline {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        match self {
            Inline::Text(text) => text.chars().count(),
            Inline::Image(_) => 1,
        }
    }
}

/// A formatted run inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Text or image.
    pub content: Inline,
    /// Character format of the whole span.
    pub format: CharFormat,
}

impl Span {
    /// A text span.
    pub fn text(text: impl Into<String>, format: CharFormat) -> Self {
        Self {
            content: Inline::Text(text.into()),
            format,
        }
    }

    /// An image span.
    pub fn image(image: ImageRef, format: CharFormat) -> Self {
        Self {
            content: Inline::Image(image),
            format,
        }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.content.char_len()
    }
}

/// A paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// Paragraph format.
    pub format: BlockFormat,
    /// Runs, in order.
    pub spans: Vec<Span>,
}

impl Block {
    /// An empty paragraph with the given format.
    pub fn new(format: BlockFormat) -> Self {
        Self {
            format,
            spans: Vec::new(),
        }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.spans.iter().map(Span::char_len).sum()
    }

    /// Plain-text projection of the paragraph.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match &span.content {
                Inline::Text(text) => out.push_str(text),
                Inline::Image(_) => out.push(OBJECT_REPLACEMENT_CHAR),
            }
        }
        out
    }

    /// Ensure a span boundary at `offset` (block-local) and return the index of the first span at
    /// or after it.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut acc = 0;
        for i in 0..self.spans.len() {
            if acc == offset {
                return i;
            }
            let len = self.spans[i].char_len();
            if offset < acc + len {
                // Images are one character wide, so only text spans can be split inside.
                let Inline::Text(text) = &mut self.spans[i].content else {
                    return i;
                };
                let byte = text
                    .char_indices()
                    .nth(offset - acc)
                    .map(|(b, _)| b)
                    .unwrap_or(text.len());
                let tail = text.split_off(byte);
                let format = self.spans[i].format.clone();
                self.spans.insert(i + 1, Span::text(tail, format));
                return i + 1;
            }
            acc += len;
        }
        self.spans.len()
    }

    /// Drop empty text runs and coalesce neighbouring text runs with equal formats.
    fn normalize(&mut self) {
        let mut out: Vec<Span> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if matches!(&span.content, Inline::Text(t) if t.is_empty()) {
                continue;
            }
            if let Some(last) = out.last_mut()
                && last.format == span.format
                && let (Inline::Text(prev), Inline::Text(next)) = (&mut last.content, &span.content)
            {
                prev.push_str(next);
                continue;
            }
            out.push(span);
        }
        self.spans = out;
    }

    /// Format of the span covering block-local character `offset`.
    fn format_of_char(&self, offset: usize) -> Option<&CharFormat> {
        let mut acc = 0;
        for span in &self.spans {
            let len = span.char_len();
            if offset < acc + len {
                return Some(&span.format);
            }
            acc += len;
        }
        None
    }
}

/// Rich content of one page. Always holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    blocks: Vec<Block>,
}

impl Default for RichText {
    fn default() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }
}

impl RichText {
    /// An empty document (one empty paragraph).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from blocks; an empty list yields one empty paragraph.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        if doc.blocks.is_empty() {
            doc.blocks.push(Block::default());
        }
        for block in &mut doc.blocks {
            block.normalize();
        }
        doc
    }

    /// Unformatted document: one paragraph per `'\n'`-separated line.
    pub fn from_plain_text(text: &str) -> Self {
        let blocks = text
            .split('\n')
            .map(|line| {
                let mut block = Block::default();
                if !line.is_empty() {
                    block.spans.push(Span::text(line, CharFormat::default()));
                }
                block
            })
            .collect();
        Self::from_blocks(blocks)
    }

    /// Paragraphs in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Total length in characters, counting one separator between paragraphs.
    pub fn char_count(&self) -> usize {
        let content: usize = self.blocks.iter().map(Block::char_len).sum();
        content + self.blocks.len() - 1
    }

    /// Returns `true` for a single empty paragraph with default format.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].spans.is_empty()
            && self.blocks[0].format == BlockFormat::default()
    }

    /// Plain-text projection (formatting stripped, images as [`OBJECT_REPLACEMENT_CHAR`]).
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&block.plain_text());
        }
        out
    }

    /// Map a document offset to `(block index, block-local offset)`, clamping past-the-end offsets.
    fn locate(&self, offset: usize) -> (usize, usize) {
        let mut start = 0;
        for (i, block) in self.blocks.iter().enumerate() {
            let len = block.char_len();
            if offset <= start + len {
                return (i, offset - start);
            }
            start += len + 1;
        }
        let last = self.blocks.len() - 1;
        (last, self.blocks[last].char_len())
    }

    /// Character range covered by block `index` (separator excluded).
    pub fn block_range(&self, index: usize) -> Range<usize> {
        let mut start = 0;
        for block in &self.blocks[..index.min(self.blocks.len())] {
            start += block.char_len() + 1;
        }
        let len = self.blocks.get(index).map(Block::char_len).unwrap_or(0);
        start..start + len
    }

    /// Indices of the blocks touched by `range`; an empty range yields the block holding it.
    pub fn blocks_in_range(&self, range: Range<usize>) -> Range<usize> {
        let (first, _) = self.locate(range.start);
        if range.end <= range.start {
            return first..first + 1;
        }
        let (last, _) = self.locate(range.end);
        first..last + 1
    }

    /// Merge `format` into every text character of `range`.
    pub fn merge_char_format(&mut self, range: Range<usize>, format: &CharFormat) {
        if range.start >= range.end || format.is_empty() {
            return;
        }
        let mut block_start = 0;
        for block in &mut self.blocks {
            let len = block.char_len();
            let block_end = block_start + len;
            let local_start = range.start.max(block_start);
            let local_end = range.end.min(block_end);
            if local_start < local_end {
                let i = block.split_at(local_start - block_start);
                let j = block.split_at(local_end - block_start);
                for span in &mut block.spans[i..j] {
                    // Images stay unformatted.
                    if matches!(span.content, Inline::Text(_)) {
                        span.format.merge(format);
                    }
                }
                block.normalize();
            }
            if block_end >= range.end {
                break;
            }
            block_start = block_end + 1;
        }
    }

    /// Merge `format` into every paragraph touched by `range`.
    pub fn merge_block_format(&mut self, range: Range<usize>, format: &BlockFormat) {
        for index in self.blocks_in_range(range) {
            self.blocks[index].format.merge(format);
        }
    }

    /// Character format in effect at `offset`: the character before the offset, or the first
    /// character of the paragraph at its start.
    pub fn char_format_at(&self, offset: usize) -> CharFormat {
        let (bi, local) = self.locate(offset);
        let block = &self.blocks[bi];
        let at = local.saturating_sub(1);
        block.format_of_char(at).cloned().unwrap_or_default()
    }

    /// Paragraph format at `offset`.
    pub fn block_format_at(&self, offset: usize) -> BlockFormat {
        let (bi, _) = self.locate(offset);
        self.blocks[bi].format
    }

    /// Insert `text` at `offset` with `format`; `'\n'` starts a new paragraph that inherits the
    /// current paragraph format. Returns the inserted character range.
    pub fn insert_text(&mut self, offset: usize, text: &str, format: &CharFormat) -> Range<usize> {
        let start = offset.min(self.char_count());
        let mut cursor = start;
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.split_block(cursor);
                cursor += 1;
            }
            if !line.is_empty() {
                self.insert_span(cursor, Span::text(line, format.clone()));
                cursor += line.chars().count();
            }
        }
        start..cursor
    }

    /// Insert an inline image at `offset`. Returns the inserted one-character range.
    pub fn insert_image(&mut self, offset: usize, image: ImageRef, format: &CharFormat) -> Range<usize> {
        let start = offset.min(self.char_count());
        self.insert_span(start, Span::image(image, format.clone()));
        start..start + 1
    }

    fn insert_span(&mut self, offset: usize, span: Span) {
        let (bi, local) = self.locate(offset);
        let block = &mut self.blocks[bi];
        let index = block.split_at(local);
        block.spans.insert(index, span);
        block.normalize();
    }

    fn split_block(&mut self, offset: usize) {
        let (bi, local) = self.locate(offset);
        let block = &mut self.blocks[bi];
        let index = block.split_at(local);
        let tail = block.spans.split_off(index);
        let format = block.format;
        block.normalize();
        let mut next = Block::new(format);
        next.spans = tail;
        next.normalize();
        self.blocks.insert(bi + 1, next);
    }

    /// Remove the characters in `range` (paragraph separators inside it join paragraphs).
    pub fn remove(&mut self, range: Range<usize>) {
        let total = self.char_count();
        let start = range.start.min(total);
        let end = range.end.min(total);
        if start >= end {
            return;
        }
        let (sb, so) = self.locate(start);
        let (eb, eo) = self.locate(end);
        if sb == eb {
            let block = &mut self.blocks[sb];
            let i = block.split_at(so);
            let j = block.split_at(eo);
            block.spans.drain(i..j);
            block.normalize();
            return;
        }

        let tail = {
            let last = &mut self.blocks[eb];
            let j = last.split_at(eo);
            last.spans.split_off(j)
        };
        let first = &mut self.blocks[sb];
        let i = first.split_at(so);
        first.spans.truncate(i);
        first.spans.extend(tail);
        first.normalize();
        self.blocks.drain(sb + 1..=eb);
    }

    /// Word containing or touching `offset`. Word characters are alphanumerics and `_`.
    pub fn word_range_at(&self, offset: usize) -> Option<Range<usize>> {
        let chars: Vec<char> = self.plain_text().chars().collect();
        let offset = offset.min(chars.len());
        let is_word = |c: char| c == '_' || c.is_alphanumeric();

        let at = chars.get(offset).is_some_and(|c| is_word(*c));
        let before = offset > 0 && is_word(chars[offset - 1]);
        if !at && !before {
            return None;
        }

        let mut start = offset;
        while start > 0 && is_word(chars[start - 1]) {
            start -= 1;
        }
        let mut end = offset;
        while end < chars.len() && is_word(chars[end]) {
            end += 1;
        }
        Some(start..end)
    }

    /// Hyperlink target of the character at `offset` (or just before it).
    pub fn href_at(&self, offset: usize) -> Option<String> {
        let (bi, local) = self.locate(offset);
        let block = &self.blocks[bi];
        let at = block.format_of_char(local).and_then(|f| f.anchor_href.clone());
        at.or_else(|| {
            local
                .checked_sub(1)
                .and_then(|prev| block.format_of_char(prev))
                .and_then(|f| f.anchor_href.clone())
        })
    }

    /// All inline images, in document order.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.blocks
            .iter()
            .flat_map(|b| b.spans.iter())
            .filter_map(|s| match &s.content {
                Inline::Image(image) => Some(image),
                Inline::Text(_) => None,
            })
    }
}
