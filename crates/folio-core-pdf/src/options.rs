use folio_core::{EditorConfig, PAGE_MARGIN};
use std::path::PathBuf;

/// Sheet geometry and document metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Sheet width in points.
    pub page_width: f32,
    /// Sheet height in points.
    pub page_height: f32,
    /// Margin on all four sides, in points.
    pub margin: f32,
    /// Directory relative image paths are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Document title (`/Title` in the info dictionary).
    pub title: Option<String>,
}

impl Default for PdfOptions {
    /// A4 with the editor's page margin.
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: PAGE_MARGIN,
            base_dir: None,
            title: None,
        }
    }
}

impl PdfOptions {
    /// Geometry taken from the editor configuration.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            page_width: config.pdf_page_width,
            page_height: config.pdf_page_height,
            margin: config.page_margin,
            ..Self::default()
        }
    }

    /// Width available to text.
    pub fn content_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin).max(1.0)
    }

    /// Height available to text.
    pub fn content_height(&self) -> f32 {
        (self.page_height - 2.0 * self.margin).max(1.0)
    }
}
