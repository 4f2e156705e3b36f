//! PDF serialization.
//!
//! Turns laid out sheets into a PDF 1.4 file: catalog, page tree, one Type 1 font object per face
//! in use, image XObjects, per-sheet content streams and link annotations, followed by the
//! cross-reference table and trailer.

use crate::font::{BaseFont, encode_win_ansi};
use crate::layout::{Item, Sheet, TextStyle};
use crate::options::PdfOptions;
use image::{ImageError, ImageReader, RgbImage};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CATALOG: usize = 1;
const PAGES: usize = 2;
const INFO: usize = 3;

/// Outcome of loading an image referenced by the document.
enum Embedded {
    /// Image XObject with its resource name (e.g. `Im1`) and object id.
    XObject { name: String, id: usize },
    /// The file could not be decoded; an outline is drawn instead.
    Placeholder,
}

/// Accumulates numbered objects and writes the final file.
pub struct PdfWriter<'a> {
    options: &'a PdfOptions,
    objects: Vec<Vec<u8>>,
}

impl<'a> PdfWriter<'a> {
    /// A writer producing sheets of the given geometry.
    pub fn new(options: &'a PdfOptions) -> Self {
        Self {
            options,
            objects: Vec::new(),
        }
    }

    /// Serialize `sheets` into a complete PDF file.
    pub fn write(mut self, sheets: &[Sheet]) -> Vec<u8> {
        // Fixed ids first so every later object can reference them.
        for _ in [CATALOG, PAGES, INFO] {
            self.reserve();
        }

        let fonts = self.write_fonts(sheets);
        let images = self.write_images(sheets);
        let resources = self.add(resources_dict(&fonts, &images).into_bytes());

        let mut kids = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            kids.push(self.write_sheet(sheet, resources, &images));
        }

        let kids_refs: Vec<String> = kids.iter().map(|id| format!("{id} 0 R")).collect();
        self.set(
            PAGES,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids_refs.join(" "),
                kids.len()
            )
            .into_bytes(),
        );
        self.set(
            CATALOG,
            format!("<< /Type /Catalog /Pages {PAGES} 0 R >>").into_bytes(),
        );
        self.set(INFO, self.info_dict());

        debug!(
            sheets = sheets.len(),
            objects = self.objects.len(),
            "pdf assembled"
        );
        self.finish()
    }

    fn reserve(&mut self) -> usize {
        self.objects.push(Vec::new());
        self.objects.len()
    }

    fn set(&mut self, id: usize, body: Vec<u8>) {
        self.objects[id - 1] = body;
    }

    fn add(&mut self, body: Vec<u8>) -> usize {
        self.objects.push(body);
        self.objects.len()
    }

    fn add_stream(&mut self, dict: &str, data: &[u8]) -> usize {
        let mut body = format!("<< {dict} /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.add(body)
    }

    fn write_fonts(&mut self, sheets: &[Sheet]) -> BTreeMap<BaseFont, usize> {
        let faces: BTreeSet<BaseFont> = sheets
            .iter()
            .flat_map(|sheet| &sheet.items)
            .filter_map(|item| match item {
                Item::Text { style, .. } => Some(style.font),
                Item::Image { .. } => None,
            })
            .collect();
        faces
            .into_iter()
            .map(|font| {
                let id = self.add(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.postscript_name()
                    )
                    .into_bytes(),
                );
                (font, id)
            })
            .collect()
    }

    fn write_images(&mut self, sheets: &[Sheet]) -> BTreeMap<String, Embedded> {
        let mut images = BTreeMap::new();
        for item in sheets.iter().flat_map(|sheet| &sheet.items) {
            let Item::Image { src, .. } = item else {
                continue;
            };
            if images.contains_key(src) {
                continue;
            }
            let path = self.resolve_image_path(src);
            let entry = match load_rgb(&path) {
                Ok(pixels) => {
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceRGB /BitsPerComponent 8",
                        pixels.width(),
                        pixels.height()
                    );
                    Embedded::XObject {
                        name: format!("Im{}", images.len() + 1),
                        id: self.add_stream(&dict, pixels.as_raw()),
                    }
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "image not embedded, drawing placeholder");
                    Embedded::Placeholder
                }
            };
            images.insert(src.clone(), entry);
        }
        images
    }

    fn resolve_image_path(&self, src: &str) -> PathBuf {
        let path = Path::new(src.strip_prefix("file://").unwrap_or(src));
        match &self.options.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn write_sheet(
        &mut self,
        sheet: &Sheet,
        resources: usize,
        images: &BTreeMap<String, Embedded>,
    ) -> usize {
        let mut content = String::new();
        let mut annotations = Vec::new();

        for item in &sheet.items {
            match item {
                Item::Text {
                    x,
                    baseline,
                    width,
                    text,
                    style,
                } => {
                    write_text(&mut content, *x, *baseline, text, style);
                    if style.underline {
                        write_underline(&mut content, *x, *baseline, *width, style);
                    }
                    if let Some(href) = &style.href {
                        let rect = [
                            *x,
                            baseline - style.size * 0.25,
                            x + width,
                            baseline + style.size * 0.95,
                        ];
                        annotations.push(link_annotation(rect, href));
                    }
                }
                Item::Image {
                    x,
                    y,
                    width,
                    height,
                    src,
                } => match images.get(src) {
                    Some(Embedded::XObject { name, .. }) => {
                        let _ = writeln!(
                            content,
                            "q {} 0 0 {} {} {} cm /{name} Do Q",
                            num(*width),
                            num(*height),
                            num(*x),
                            num(*y)
                        );
                    }
                    _ => {
                        let _ = writeln!(
                            content,
                            "q 0.6 0.6 0.6 RG 0.5 w {} {} {} {} re S Q",
                            num(*x),
                            num(*y),
                            num(*width),
                            num(*height)
                        );
                    }
                },
            }
        }

        let contents = self.add_stream("", content.as_bytes());
        let annots: Vec<String> = annotations
            .into_iter()
            .map(|body| format!("{} 0 R", self.add(body.into_bytes())))
            .collect();

        let mut page = format!(
            "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {} {}] \
             /Resources {resources} 0 R /Contents {contents} 0 R",
            num(self.options.page_width),
            num(self.options.page_height)
        );
        if !annots.is_empty() {
            let _ = write!(page, " /Annots [{}]", annots.join(" "));
        }
        page.push_str(" >>");
        self.add(page.into_bytes())
    }

    fn info_dict(&self) -> Vec<u8> {
        let mut dict = b"<< /Producer ".to_vec();
        dict.extend(literal_string(concat!("folio-core-pdf ", env!("CARGO_PKG_VERSION"))));
        if let Some(title) = &self.options.title {
            dict.extend_from_slice(b" /Title ");
            dict.extend(literal_string(title));
        }
        dict.extend_from_slice(b" >>");
        dict
    }

    fn finish(self) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
        let mut offsets = Vec::with_capacity(self.objects.len());
        for (index, body) in self.objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend(format!("{} 0 obj\n", index + 1).into_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref = out.len();
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in offsets {
            let _ = write!(table, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            self.objects.len() + 1
        );
        out.extend(table.into_bytes());
        out
    }
}

fn load_rgb(path: &Path) -> Result<RgbImage, ImageError> {
    Ok(ImageReader::open(path)
        .map_err(ImageError::IoError)?
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .decode()?
        .to_rgb8())
}

fn resources_dict(fonts: &BTreeMap<BaseFont, usize>, images: &BTreeMap<String, Embedded>) -> String {
    let mut dict = String::from("<< /ProcSet [/PDF /Text /ImageC] /Font <<");
    for (font, id) in fonts {
        let _ = write!(dict, " /{} {id} 0 R", font.resource_name());
    }
    dict.push_str(" >>");
    let xobjects: Vec<String> = images
        .values()
        .filter_map(|embedded| match embedded {
            Embedded::XObject { name, id } => Some(format!("/{name} {id} 0 R")),
            Embedded::Placeholder => None,
        })
        .collect();
    if !xobjects.is_empty() {
        let _ = write!(dict, " /XObject << {} >>", xobjects.join(" "));
    }
    dict.push_str(" >>");
    dict
}

fn write_text(content: &mut String, x: f32, baseline: f32, text: &str, style: &TextStyle) {
    let (r, g, b) = style.color.to_unit();
    let _ = writeln!(
        content,
        "BT /{} {} Tf {} {} {} rg {} {} Td {} Tj ET",
        style.font.resource_name(),
        num(style.size),
        num(r),
        num(g),
        num(b),
        num(x),
        num(baseline),
        // Content streams are written as text; the string is escaped to ASCII.
        String::from_utf8_lossy(&literal_string(text))
    );
}

fn write_underline(content: &mut String, x: f32, baseline: f32, width: f32, style: &TextStyle) {
    let (r, g, b) = style.color.to_unit();
    let y = baseline - style.size * 0.12;
    let _ = writeln!(
        content,
        "{} {} {} RG {} w {} {} m {} {} l S",
        num(r),
        num(g),
        num(b),
        num((style.size / 18.0).max(0.5)),
        num(x),
        num(y),
        num(x + width),
        num(y)
    );
}

fn link_annotation(rect: [f32; 4], href: &str) -> String {
    let uri = String::from_utf8_lossy(&literal_string(href)).into_owned();
    format!(
        "<< /Type /Annot /Subtype /Link /Rect [{} {} {} {}] /Border [0 0 0] \
         /A << /S /URI /URI {uri} >> >>",
        num(rect[0]),
        num(rect[1]),
        num(rect[2]),
        num(rect[3])
    )
}

/// A PDF literal string. Non-ASCII bytes are written as octal escapes so the result is ASCII.
fn literal_string(text: &str) -> Vec<u8> {
    let mut out = vec![b'('];
    for byte in encode_win_ansi(text) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7e => out.push(byte),
            _ => out.extend(format!("\\{byte:03o}").into_bytes()),
        }
    }
    out.push(b')');
    out
}

/// Compact number formatting: at most two decimals, no trailing zeros.
fn num(value: f32) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(num(595.0), "595");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(1.0 / 3.0), "0.33");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn test_literal_string_escapes() {
        assert_eq!(literal_string("a(b)\\"), b"(a\\(b\\)\\\\)".to_vec());
        assert_eq!(literal_string("caf\u{e9}"), b"(caf\\351)".to_vec());
    }

    fn rfind(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .rposition(|window| window == needle)
            .unwrap()
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let options = PdfOptions::default();
        let bytes = PdfWriter::new(&options).write(&[Sheet::default()]);

        let start = rfind(&bytes, b"startxref\n") + "startxref\n".len();
        let tail = std::str::from_utf8(&bytes[start..]).unwrap();
        let xref: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(bytes[xref..].starts_with(b"xref"));

        let table = std::str::from_utf8(&bytes[xref..]).unwrap();
        let first = table.lines().nth(3).unwrap();
        let offset: usize = first[..10].parse().unwrap();
        assert!(bytes[offset..].starts_with(b"1 0 obj"));
    }
}
