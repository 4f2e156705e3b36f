//! Standard PDF fonts.
//!
//! Output only uses the base-14 Type 1 faces every viewer ships, so nothing is embedded. Font
//! families are mapped onto Times, Helvetica or Courier by name.

/// One of the three base-14 text families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    /// Serif faces.
    Times,
    /// Sans-serif faces.
    Helvetica,
    /// Monospaced faces.
    Courier,
}

/// A concrete base-14 face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaseFont {
    /// Family.
    pub family: Family,
    /// Bold variant.
    pub bold: bool,
    /// Italic/oblique variant.
    pub italic: bool,
}

// Advance widths (1/1000 em) for U+0020..=U+007E, from the Adobe AFM files.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a..z
    334, 260, 334, 584, // {..~
];

const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '../
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // 0..9
    278, 278, 564, 564, 564, 444, 921, // :..@
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611, // A..Z
    333, 278, 333, 469, 500, 333, // [..`
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444, // a..z
    480, 200, 480, 541, // {..~
];

const COURIER_WIDTH: u16 = 600;

// Bold faces are set wider; the regular metrics are scaled rather than carrying six more tables.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

impl BaseFont {
    /// Map a font family name and flags onto a base-14 face.
    pub fn resolve(font_family: &str, bold: bool, italic: bool) -> Self {
        let name = font_family.to_ascii_lowercase();
        let family = if ["courier", "mono", "consol", "menlo", "typewriter"]
            .iter()
            .any(|k| name.contains(k))
        {
            Family::Courier
        } else if ["times", "roman", "georgia", "garamond", "cambria", "book"]
            .iter()
            .any(|k| name.contains(k))
            || (name.contains("serif") && !name.contains("sans"))
        {
            Family::Times
        } else {
            Family::Helvetica
        };
        Self {
            family,
            bold,
            italic,
        }
    }

    /// PostScript name used as `/BaseFont`.
    pub fn postscript_name(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (Family::Times, false, false) => "Times-Roman",
            (Family::Times, true, false) => "Times-Bold",
            (Family::Times, false, true) => "Times-Italic",
            (Family::Times, true, true) => "Times-BoldItalic",
            (Family::Helvetica, false, false) => "Helvetica",
            (Family::Helvetica, true, false) => "Helvetica-Bold",
            (Family::Helvetica, false, true) => "Helvetica-Oblique",
            (Family::Helvetica, true, true) => "Helvetica-BoldOblique",
            (Family::Courier, false, false) => "Courier",
            (Family::Courier, true, false) => "Courier-Bold",
            (Family::Courier, false, true) => "Courier-Oblique",
            (Family::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Resource name inside a page's `/Font` dictionary (`F1`..`F12`).
    pub fn resource_name(&self) -> String {
        let family = match self.family {
            Family::Times => 0,
            Family::Helvetica => 1,
            Family::Courier => 2,
        };
        let variant = usize::from(self.bold) + 2 * usize::from(self.italic);
        format!("F{}", family * 4 + variant + 1)
    }

    /// Advance width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        let factor = if self.bold && self.family != Family::Courier {
            BOLD_WIDTH_FACTOR
        } else {
            1.0
        };
        units as f32 * size / 1000.0 * factor
    }

    fn char_width(&self, c: char) -> u16 {
        let table = match self.family {
            Family::Courier => return COURIER_WIDTH,
            Family::Helvetica => &HELVETICA_WIDTHS,
            Family::Times => &TIMES_WIDTHS,
        };
        let code = c as u32;
        if (0x20..=0x7e).contains(&code) {
            table[(code - 0x20) as usize]
        } else {
            // Width of 'o' for everything else.
            table[('o' as u32 - 0x20) as usize]
        }
    }
}

/// Encode `text` as WinAnsi bytes. Characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{201a}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201e}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02c6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8a,
            '\u{2039}' => 0x8b,
            '\u{0152}' => 0x8c,
            '\u{017d}' => 0x8e,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02dc}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9a,
            '\u{203a}' => 0x9b,
            '\u{0153}' => 0x9c,
            '\u{017e}' => 0x9e,
            '\u{0178}' => 0x9f,
            _ => b'?',
        })
        .collect()
}
