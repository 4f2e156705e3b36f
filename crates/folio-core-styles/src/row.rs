//! Text encoding of style rows.
//!
//! Every column is stored as text. Flags are the literal tokens `"True"` / `"False"`, numbers are
//! decimal text and the color is `#rrggbb`.

use crate::error::StoreError;
use folio_core::{Rgb, StyleRecord};
use serde::{Deserialize, Serialize};

/// Column names of the `styles` table, in schema order.
pub const COLUMNS: [&str; 8] = [
    "name",
    "shrift",
    "pt",
    "bold",
    "italic",
    "underlined",
    "interval",
    "color",
];

const TRUE: &str = "True";
const FALSE: &str = "False";

/// One stored row, exactly as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRow {
    /// Style name.
    pub name: String,
    /// Font family.
    pub shrift: String,
    /// Point size.
    pub pt: String,
    /// Bold flag.
    pub bold: String,
    /// Italic flag.
    pub italic: String,
    /// Underline flag.
    pub underlined: String,
    /// Line spacing multiplier.
    pub interval: String,
    /// Text color.
    pub color: String,
}

impl StyleRow {
    /// Encode a record.
    pub fn from_record(record: &StyleRecord) -> Self {
        Self {
            name: record.name.clone(),
            shrift: record.font_family.clone(),
            pt: record.point_size.to_string(),
            bold: encode_flag(record.bold).to_string(),
            italic: encode_flag(record.italic).to_string(),
            underlined: encode_flag(record.underline).to_string(),
            interval: encode_interval(record.line_spacing),
            color: record.color.to_hex(),
        }
    }

    /// Decode into a record.
    pub fn to_record(&self) -> Result<StyleRecord, StoreError> {
        Ok(StyleRecord {
            name: self.name.clone(),
            font_family: self.shrift.clone(),
            point_size: self
                .pt
                .trim()
                .parse()
                .map_err(|_| corrupt("pt", &self.pt))?,
            bold: decode_flag("bold", &self.bold)?,
            italic: decode_flag("italic", &self.italic)?,
            underline: decode_flag("underlined", &self.underlined)?,
            line_spacing: self
                .interval
                .trim()
                .parse()
                .map_err(|_| corrupt("interval", &self.interval))?,
            color: self
                .color
                .trim()
                .parse::<Rgb>()
                .map_err(|_| corrupt("color", &self.color))?,
        })
    }
}

fn encode_flag(value: bool) -> &'static str {
    if value { TRUE } else { FALSE }
}

fn decode_flag(column: &'static str, value: &str) -> Result<bool, StoreError> {
    match value {
        TRUE => Ok(true),
        FALSE => Ok(false),
        _ => Err(corrupt(column, value)),
    }
}

/// Whole multipliers keep one decimal place (`2.0`), as the table has always stored them.
fn encode_interval(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn corrupt(column: &'static str, value: &str) -> StoreError {
    StoreError::Corrupt {
        column,
        value: value.to_string(),
    }
}
