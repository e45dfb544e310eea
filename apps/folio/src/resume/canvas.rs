//! Drawing capability consumed by the PDF pagination engine.
//!
//! Coordinates are millimetres from the top-left corner of the page and `y` is
//! the text baseline. `PdfWriterCanvas` turns the calls into a PDF using the
//! base-14 Helvetica faces, so no font data is embedded.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use thiserror::Error;

use crate::resume::font_metrics::{is_supported_family, metrics_for, FontFace};
use crate::resume::theme::{FontSpec, PageSize, Rgb};

const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("unsupported font family '{0}'")]
    UnsupportedFont(String),

    #[error("text drawn before any font was selected")]
    NoFont,

    #[error("document has already been serialized")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

pub trait PdfCanvas: Send {
    fn page_size(&self) -> PageSize;

    fn set_font(&mut self, font: &FontSpec) -> Result<(), CanvasError>;

    fn current_font(&self) -> Option<&FontSpec>;

    fn set_text_color(&mut self, color: Rgb);

    fn set_draw_color(&mut self, color: Rgb);

    fn set_line_width(&mut self, width: f32);

    /// Draws `text` with its anchor at `x` (left edge, centre or right edge per `align`).
    fn text(&mut self, text: &str, x: f32, y: f32, align: Align) -> Result<(), CanvasError>;

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);

    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    /// Serializes the document. The canvas cannot be drawn on afterwards.
    fn finish(&mut self) -> Result<Vec<u8>, CanvasError>;

    /// Width of `text` in the current font, in millimetres.
    fn text_width(&self, text: &str) -> f32 {
        match self.current_font() {
            Some(font) => metrics_for(font).width_mm(text, font.size),
            None => 0.0,
        }
    }

    /// Wraps `text` to `max_width` millimetres in the current font.
    fn split_text_to_size(&self, text: &str, max_width: f32) -> Vec<String> {
        match self.current_font() {
            Some(font) => metrics_for(font).wrap_lines(text, max_width, font.size),
            None => text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Creates a fresh canvas for each render.
pub trait CanvasFactory: Send + Sync {
    fn create(&self, page: PageSize) -> Box<dyn PdfCanvas>;
}

// ────────────────────────────────────────────────────────────────────────────
// pdf-writer backend
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfWriterFactory;

impl CanvasFactory for PdfWriterFactory {
    fn create(&self, page: PageSize) -> Box<dyn PdfCanvas> {
        Box::new(PdfWriterCanvas::new(page))
    }
}

pub struct PdfWriterCanvas {
    size: PageSize,
    pages: Vec<Content>,
    font: Option<FontSpec>,
    text_color: Rgb,
    draw_color: Rgb,
    line_width: f32,
    finished: bool,
}

impl PdfWriterCanvas {
    /// A canvas with one empty page.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![Content::new()],
            font: None,
            text_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            line_width: 0.2,
            finished: false,
        }
    }

    fn to_pt(&self, x: f32, y: f32) -> (f32, f32) {
        (x * PT_PER_MM, (self.size.height - y) * PT_PER_MM)
    }

    fn page(&mut self) -> &mut Content {
        if self.pages.is_empty() {
            self.pages.push(Content::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

fn resource_name(face: FontFace) -> &'static [u8] {
    match face {
        FontFace::Helvetica => b"F1",
        FontFace::HelveticaBold => b"F2",
        FontFace::HelveticaOblique => b"F3",
        FontFace::HelveticaBoldOblique => b"F4",
    }
}

/// Encodes text for a base-14 font's built-in StandardEncoding.
fn encode_standard(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{2019}' => 0x27,
            '\u{2018}' => 0x60,
            '\u{2022}' => 0xB7,
            '\u{2013}' => 0xB1,
            '\u{2014}' => 0xD0,
            '\u{201C}' => 0xAA,
            '\u{201D}' => 0xBA,
            '\u{2026}' => 0xBC,
            _ => b'?',
        })
        .collect()
}

impl PdfCanvas for PdfWriterCanvas {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn set_font(&mut self, font: &FontSpec) -> Result<(), CanvasError> {
        if !is_supported_family(&font.family) {
            return Err(CanvasError::UnsupportedFont(font.family.clone()));
        }
        self.font = Some(font.clone());
        Ok(())
    }

    fn current_font(&self) -> Option<&FontSpec> {
        self.font.as_ref()
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn text(&mut self, text: &str, x: f32, y: f32, align: Align) -> Result<(), CanvasError> {
        if self.finished {
            return Err(CanvasError::Finished);
        }
        let font = self.font.clone().ok_or(CanvasError::NoFont)?;
        let left = match align {
            Align::Left => x,
            Align::Center => x - self.text_width(text) / 2.0,
            Align::Right => x - self.text_width(text),
        };
        let (x_pt, y_pt) = self.to_pt(left, y);
        let Rgb(r, g, b) = self.text_color;
        let encoded = encode_standard(text);
        let face = FontFace::for_style(font.style);

        let content = self.page();
        content.begin_text();
        content.set_font(Name(resource_name(face)), font.size);
        content.set_fill_rgb(r, g, b);
        content.next_line(x_pt, y_pt);
        content.show(Str(&encoded));
        content.end_text();
        Ok(())
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (ax, ay) = self.to_pt(x1, y1);
        let (bx, by) = self.to_pt(x2, y2);
        let Rgb(r, g, b) = self.draw_color;
        let width = self.line_width * PT_PER_MM;

        let content = self.page();
        content.set_stroke_rgb(r, g, b);
        content.set_line_width(width);
        content.move_to(ax, ay);
        content.line_to(bx, by);
        content.stroke();
    }

    fn add_page(&mut self) {
        self.pages.push(Content::new());
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(&mut self) -> Result<Vec<u8>, CanvasError> {
        if self.finished {
            return Err(CanvasError::Finished);
        }
        self.finished = true;

        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let font_ids: Vec<(FontFace, Ref)> = FontFace::ALL
            .iter()
            .enumerate()
            .map(|(i, face)| (*face, Ref::new(3 + i as i32)))
            .collect();
        let first_page = 3 + font_ids.len() as i32;
        let page_ids: Vec<(Ref, Ref)> = (0..self.pages.len() as i32)
            .map(|i| (Ref::new(first_page + 2 * i), Ref::new(first_page + 2 * i + 1)))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|(page, _)| *page))
            .count(page_ids.len() as i32);

        for (face, id) in &font_ids {
            pdf.type1_font(*id).base_font(Name(face.base_font().as_bytes()));
        }

        let media_box = Rect::new(
            0.0,
            0.0,
            self.size.width * PT_PER_MM,
            self.size.height * PT_PER_MM,
        );
        let pages = std::mem::take(&mut self.pages);
        for ((page_id, content_id), content) in page_ids.iter().zip(pages) {
            {
                let mut page = pdf.page(*page_id);
                page.media_box(media_box);
                page.parent(tree_id);
                page.contents(*content_id);
                let mut resources = page.resources();
                let mut fonts = resources.fonts();
                for (face, id) in &font_ids {
                    fonts.pair(Name(resource_name(*face)), *id);
                }
            }
            pdf.stream(*content_id, &content.finish());
        }

        Ok(pdf.finish())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test double
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::theme::{FontStyle, PdfTheme};

    fn body() -> FontSpec {
        PdfTheme::default().fonts.body
    }

    #[test]
    fn test_encode_standard_maps_typographic_glyphs() {
        assert_eq!(encode_standard("Ada"), b"Ada".to_vec());
        assert_eq!(encode_standard("\u{2022}"), vec![0xB7]);
        assert_eq!(encode_standard("1\u{2013}2"), vec![b'1', 0xB1, b'2']);
        assert_eq!(encode_standard("\u{00e9}"), b"?".to_vec());
    }

    #[test]
    fn test_text_without_font_is_error() {
        let mut canvas = PdfWriterCanvas::new(PageSize::A4);
        let err = canvas.text("x", 10.0, 10.0, Align::Left).unwrap_err();
        assert!(matches!(err, CanvasError::NoFont));
    }

    #[test]
    fn test_unsupported_font_family_is_rejected() {
        let mut canvas = PdfWriterCanvas::new(PageSize::A4);
        let font = FontSpec {
            family: "Garamond".to_string(),
            style: FontStyle::Normal,
            size: 9.0,
        };
        assert!(matches!(
            canvas.set_font(&font),
            Err(CanvasError::UnsupportedFont(f)) if f == "Garamond"
        ));
    }

    #[test]
    fn test_finish_produces_pdf_with_every_page() {
        let mut canvas = PdfWriterCanvas::new(PageSize::A4);
        canvas.set_font(&body()).unwrap();
        canvas.text("Ada Lovelace", 105.0, 25.0, Align::Center).unwrap();
        canvas.line(25.0, 40.0, 185.0, 40.0);
        canvas.add_page();
        canvas.text("Page two", 25.0, 25.0, Align::Left).unwrap();
        assert_eq!(canvas.page_count(), 2);

        let bytes = canvas.finish().unwrap();
        let raw = String::from_utf8_lossy(&bytes);
        assert!(raw.starts_with("%PDF-"));
        assert!(raw.contains("/Count 2"));
        assert!(raw.contains("/Helvetica-Bold"));
        assert!(raw.contains("(Ada Lovelace)"));
    }

    #[test]
    fn test_finish_twice_is_error() {
        let mut canvas = PdfWriterCanvas::new(PageSize::A4);
        canvas.finish().unwrap();
        assert!(matches!(canvas.finish(), Err(CanvasError::Finished)));
    }

    #[test]
    fn test_split_text_uses_current_font() {
        let mut canvas = PdfWriterCanvas::new(PageSize::A4);
        canvas.set_font(&body()).unwrap();
        let lines = canvas.split_text_to_size("one two three four five six seven", 20.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(canvas.text_width(line) <= 20.0 + 1e-3);
        }
    }
}
