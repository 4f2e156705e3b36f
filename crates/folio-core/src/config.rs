//! Editor configuration.
//!
//! Loaded from JSON; every field is optional and falls back to [`EditorConfig::default`].
//!
//! ```rust
//! use folio_core::EditorConfig;
//!
//! let config = EditorConfig::from_json_str(r#"{ "default_point_size": 14 }"#).unwrap();
//! assert_eq!(config.default_point_size, 14);
//! assert_eq!(config.page_margin, 50.0);
//! ```

use crate::color::Rgb;
use crate::format::{DEFAULT_FONT_FAMILY, DEFAULT_POINT_SIZE};
use crate::pages::PAGE_MARGIN;
use crate::surface::Margins;
use crate::typing::TypingContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    /// The file could not be read.
    Io {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    /// The file is not valid JSON for [`EditorConfig`].
    Json(#[from] serde_json::Error),
}

/// Editor-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font family of a fresh typing context.
    pub default_font_family: String,
    /// Point size of a fresh typing context.
    pub default_point_size: u32,
    /// Text color of a fresh typing context.
    pub default_color: Rgb,
    /// Page frame margin on all four sides.
    pub page_margin: f32,
    /// Location of the style table.
    pub style_store_path: PathBuf,
    /// PDF page width in points.
    pub pdf_page_width: f32,
    /// PDF page height in points.
    pub pdf_page_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_font_family: DEFAULT_FONT_FAMILY.to_string(),
            default_point_size: DEFAULT_POINT_SIZE,
            default_color: Rgb::BLACK,
            page_margin: PAGE_MARGIN,
            style_store_path: PathBuf::from("styles.json"),
            // A4
            pdf_page_width: 595.0,
            pdf_page_height: 842.0,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Page frame margins.
    pub fn margins(&self) -> Margins {
        Margins::uniform(self.page_margin)
    }

    /// A fresh typing context using the configured defaults.
    pub fn typing_context(&self) -> TypingContext {
        let mut ctx = TypingContext::new(
            self.default_font_family.clone(),
            self.default_point_size.max(1),
        );
        ctx.current_color = self.default_color;
        ctx
    }
}
