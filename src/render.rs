// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! PDF rendering backend.
//!
//! This module provides low-level abstractions over [`printpdf`][]:  A [`Renderer`][] creates a
//! document with one or more pages.  A [`Page`][] wraps the single layer of a page that all content
//! is drawn on.  [`PdfSurface`][] combines a renderer with a [`FontCache`][] and implements the
//! [`Surface`][] trait, which is the interface used by all layouts.
//!
//! [`printpdf`]: https://docs.rs/printpdf/latest/printpdf
//! [`Renderer`]: struct.Renderer.html
//! [`Page`]: struct.Page.html
//! [`PdfSurface`]: struct.PdfSurface.html
//! [`FontCache`]: ../fonts/struct.FontCache.html
//! [`Surface`]: ../surface/trait.Surface.html

use std::io;

use crate::error::{Context as _, Error, ErrorKind};
use crate::fonts;
use crate::style::{Color, Style};
use crate::surface::Surface;
use crate::{LayoutBox, Mm, Position, Size};

/// The resolution used to embed raster images before they are scaled into their box.
const IMAGE_DPI: f64 = 300.0;

impl From<Position> for printpdf::Point {
    fn from(pos: Position) -> printpdf::Point {
        printpdf::Point::new(pos.x.into(), pos.y.into())
    }
}

/// Renders a PDF document with one or more pages.
///
/// This is a wrapper around a [`printpdf::PdfDocumentReference`][].
///
/// [`printpdf::PdfDocumentReference`]: https://docs.rs/printpdf/0.3.2/printpdf/types/pdf_document/struct.PdfDocumentReference.html
pub struct Renderer {
    doc: printpdf::PdfDocumentReference,
    // invariant: pages.len() >= 1
    pages: Vec<Page>,
}

impl Renderer {
    /// Creates a new PDF document renderer with one page of the given size and the given title.
    pub fn new(size: impl Into<Size>, title: impl AsRef<str>) -> Result<Renderer, Error> {
        let size = size.into();
        let (doc, page_idx, layer_idx) = printpdf::PdfDocument::new(
            title.as_ref(),
            size.width.into(),
            size.height.into(),
            "Layer 1",
        );
        let page_ref = doc.get_page(page_idx);
        let layer_ref = page_ref.get_layer(layer_idx);
        let page = Page::new(layer_ref, size);

        Ok(Renderer {
            doc,
            pages: vec![page],
        })
    }

    /// Sets the PDF conformance for the generated PDF document.
    pub fn with_conformance(mut self, conformance: printpdf::PdfConformance) -> Self {
        self.doc = self.doc.with_conformance(conformance);
        self
    }

    /// Adds a new page with the given size to the document.
    pub fn add_page(&mut self, size: impl Into<Size>) {
        let size = size.into();
        let (page_idx, layer_idx) =
            self.doc
                .add_page(size.width.into(), size.height.into(), "Layer 1");
        let page_ref = self.doc.get_page(page_idx);
        let layer_ref = page_ref.get_layer(layer_idx);
        self.pages.push(Page::new(layer_ref, size))
    }

    /// Returns the number of pages in this document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns a page of this document.
    pub fn get_page(&self, idx: usize) -> Option<&Page> {
        self.pages.get(idx)
    }

    /// Loads the built-in font, adds it to the generated document and returns a reference to it.
    pub fn add_builtin_font(
        &self,
        builtin: printpdf::BuiltinFont,
    ) -> Result<printpdf::IndirectFontRef, Error> {
        self.doc
            .add_builtin_font(builtin)
            .context("Failed to load PDF font")
    }

    /// Loads the font from the given data, adds it to the generated document and returns a
    /// reference to it.
    pub fn add_embedded_font(&self, data: &[u8]) -> Result<printpdf::IndirectFontRef, Error> {
        self.doc
            .add_external_font(data)
            .context("Failed to load PDF font")
    }

    /// Writes this PDF document to a writer.
    pub fn write(self, w: impl io::Write) -> Result<(), Error> {
        self.doc
            .save(&mut io::BufWriter::new(w))
            .context("Failed to save document")
    }
}

/// A page of a PDF document.
///
/// This is a wrapper around the [`printpdf::PdfLayerReference`][] of the page's only layer.
///
/// [`printpdf::PdfLayerReference`]: https://docs.rs/printpdf/0.3.2/printpdf/types/pdf_layer/struct.PdfLayerReference.html
pub struct Page {
    layer: printpdf::PdfLayerReference,
    size: Size,
}

impl Page {
    fn new(layer: printpdf::PdfLayerReference, size: Size) -> Page {
        Page { layer, size }
    }

    /// Returns the size of this page.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Transforms the given position that is relative to the upper left corner of the page to a
    /// position that is relative to the lower left corner of the page (as used by `printpdf`).
    fn transform_position(&self, mut position: Position) -> Position {
        position.y = self.size.height - position.y;
        position
    }

    fn draw_shape(
        &self,
        points: &[Position],
        is_closed: bool,
        fill: Option<Color>,
        stroke: Option<Color>,
    ) {
        if points.len() < 2 || (fill.is_none() && stroke.is_none()) {
            return;
        }
        let line_points: Vec<_> = points
            .iter()
            .map(|pos| (self.transform_position(*pos).into(), false))
            .collect();
        if let Some(color) = fill {
            self.layer.set_fill_color(color.into());
        }
        if let Some(color) = stroke {
            self.layer.set_outline_color(color.into());
        }
        self.layer.add_shape(printpdf::Line {
            points: line_points,
            is_closed,
            has_fill: fill.is_some(),
            has_stroke: stroke.is_some(),
            is_clipping_path: false,
        });
    }

    fn print_str(
        &self,
        font_cache: &fonts::FontCache,
        position: Position,
        style: Style,
        s: &str,
    ) -> Result<(), Error> {
        let font = style.font(font_cache);
        let codepoints = if font.is_builtin() {
            // Built-in fonts always use the Windows-1252 encoding
            let (codepoints, replaced) = encode_win1252(s);
            if replaced > 0 {
                log::warn!(
                    "Replaced {} character(s) not supported by the Windows-1252 encoding in '{}'",
                    replaced,
                    s
                );
            }
            codepoints
        } else {
            font.glyph_ids(font_cache, s.chars())
        };
        let pdf_font = font_cache.get_pdf_font(font).ok_or_else(|| {
            Error::new("Could not find PDF font in font cache", ErrorKind::Internal)
        })?;

        let height = font.glyph_height(style.font_size());
        let cursor = self.transform_position(position);
        self.layer.begin_text_section();
        self.layer
            .set_fill_color(style.color().unwrap_or(Color::BLACK).into());
        self.layer.set_font(pdf_font, style.font_size().into());
        self.layer
            .set_text_cursor(cursor.x.into(), (cursor.y - height).into());
        self.layer
            .write_positioned_codepoints(codepoints.into_iter().map(|c| (0, c)));
        self.layer.end_text_section();
        Ok(())
    }

    fn add_image(&self, rect: LayoutBox, image: &image::DynamicImage) {
        use image::GenericImageView as _;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let natural_width = Mm::from(printpdf::Mm(f64::from(width) / IMAGE_DPI * 25.4));
        let natural_height = Mm::from(printpdf::Mm(f64::from(height) / IMAGE_DPI * 25.4));
        let bottom_left = self.transform_position(Position::new(rect.x, rect.bottom()));
        printpdf::Image::from_dynamic_image(image).add_to_layer(
            self.layer.clone(),
            Some(bottom_left.x.into()),
            Some(bottom_left.y.into()),
            None,
            Some(rect.width.as_f64() / natural_width.as_f64()),
            Some(rect.height.as_f64() / natural_height.as_f64()),
            Some(IMAGE_DPI),
        );
    }
}

/// A [`Surface`][] that draws into a PDF document.
///
/// `printpdf` creates the first page together with the document.  The first call to
/// [`Surface::add_page`][] claims that page, so the page count always equals the number of
/// `add_page` calls.
///
/// [`Surface`]: ../surface/trait.Surface.html
/// [`Surface::add_page`]: ../surface/trait.Surface.html#tymethod.add_page
pub struct PdfSurface {
    renderer: Renderer,
    font_cache: fonts::FontCache,
    current: usize,
    first_page_claimed: bool,
}

impl PdfSurface {
    /// Creates a new PDF surface with the given page size, document title and fonts.
    pub fn new(
        size: impl Into<Size>,
        title: impl AsRef<str>,
        mut font_cache: fonts::FontCache,
    ) -> Result<PdfSurface, Error> {
        let renderer = Renderer::new(size, title)?;
        font_cache.load_pdf_fonts(&renderer)?;
        Ok(PdfSurface {
            renderer,
            font_cache,
            current: 0,
            first_page_claimed: false,
        })
    }

    /// Sets the minimal PDF conformance settings for this document.
    ///
    /// If this method is called, the generation of ICC profiles and XMP metadata is deactivated,
    /// leading to a smaller file size.
    pub fn with_minimal_conformance(mut self) -> Self {
        self.renderer = self.renderer.with_conformance(printpdf::PdfConformance::Custom(
            printpdf::CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            },
        ));
        self
    }

    /// Serializes the document and returns the PDF data.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.renderer.write(&mut buf)?;
        Ok(buf)
    }

    fn page(&self) -> &Page {
        // `current` is always a valid index as pages are never removed
        &self.renderer.pages[self.current]
    }
}

impl Surface for PdfSurface {
    fn add_page(&mut self, size: Size) {
        if self.first_page_claimed {
            self.renderer.add_page(size);
            self.current = self.renderer.page_count() - 1;
        } else {
            self.first_page_claimed = true;
            self.current = 0;
        }
    }

    fn current_page_number(&self) -> usize {
        if self.first_page_claimed {
            self.current + 1
        } else {
            0
        }
    }

    fn total_pages(&self) -> usize {
        if self.first_page_claimed {
            self.renderer.page_count()
        } else {
            0
        }
    }

    fn page_size(&self) -> Size {
        self.page().size()
    }

    fn select_page(&mut self, number: usize) -> Result<(), Error> {
        if number == 0 || number > self.total_pages() {
            return Err(Error::new(
                format!(
                    "There is no page {} in a document with {} pages",
                    number,
                    self.total_pages()
                ),
                ErrorKind::Internal,
            ));
        }
        self.current = number - 1;
        Ok(())
    }

    fn font_cache(&self) -> &fonts::FontCache {
        &self.font_cache
    }

    fn draw_rect(&mut self, rect: LayoutBox, fill: Option<Color>, stroke: Option<Color>) {
        let points = [
            rect.position(),
            Position::new(rect.right(), rect.y),
            Position::new(rect.right(), rect.bottom()),
            Position::new(rect.x, rect.bottom()),
        ];
        self.page().draw_shape(&points, true, fill, stroke);
    }

    fn draw_line(&mut self, points: &[Position], color: Color, thickness: Mm) {
        let page = self.page();
        page.layer
            .set_outline_thickness(printpdf::Pt::from(thickness).0);
        page.draw_shape(points, false, None, Some(color));
        page.layer.set_outline_thickness(1.0);
    }

    fn draw_polygon(&mut self, points: &[Position], fill: Option<Color>, stroke: Option<Color>) {
        self.page().draw_shape(points, true, fill, stroke);
    }

    fn draw_text(&mut self, position: Position, text: &str, style: Style) -> Result<(), Error> {
        if text.is_empty() {
            return Ok(());
        }
        self.page()
            .print_str(&self.font_cache, position, style, text)
    }

    fn draw_image(&mut self, rect: LayoutBox, image: &image::DynamicImage) {
        self.page().add_image(rect, image);
    }
}

/// Encodes the given string using the Windows-1252 encoding for use with built-in PDF fonts.
///
/// Characters that are not supported by the encoding are replaced with a question mark.  Returns
/// the encoded string and the number of replaced characters.
fn encode_win1252(s: &str) -> (Vec<u16>, usize) {
    let mut buf = [0; 4];
    let mut replaced = 0;
    let codepoints = s
        .chars()
        .map(|c| {
            let c = c.encode_utf8(&mut buf);
            let bytes = lopdf::Document::encode_text(Some("WinAnsiEncoding"), c);
            // Windows-1252 is a single-byte encoding, so one byte is one character.
            match bytes.as_slice() {
                [byte] => u16::from(*byte),
                _ => {
                    replaced += 1;
                    u16::from(b'?')
                }
            }
        })
        .collect();
    (codepoints, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaperSize;

    #[test]
    fn win1252_accepts_spanish_text() {
        let (encoded, replaced) = encode_win1252("Página…");
        assert_eq!(replaced, 0);
        assert_eq!(encoded.len(), 7);
        assert_eq!(encoded[1], 0xe1);
        assert_eq!(encoded[6], 0x85);
    }

    #[test]
    fn win1252_replaces_unsupported_characters() {
        let (encoded, replaced) = encode_win1252("Omega 3 ≥1000mg ▲");
        assert_eq!(replaced, 2);
        assert_eq!(encoded.len(), 17);
        assert_eq!(encoded[8], u16::from(b'?'));
        assert_eq!(encoded[16], u16::from(b'?'));
        assert_eq!(encoded[9], u16::from(b'1'));
    }

    #[test]
    fn first_page_is_claimed_by_add_page() {
        let mut surface =
            PdfSurface::new(PaperSize::A4, "Test", fonts::FontCache::builtin()).unwrap();
        assert_eq!(surface.total_pages(), 0);
        surface.add_page(PaperSize::A4.into());
        assert_eq!(surface.total_pages(), 1);
        surface.add_page(PaperSize::A4.into());
        assert_eq!(surface.total_pages(), 2);
        assert_eq!(surface.current_page_number(), 2);
        surface
            .draw_text(Position::new(10, 10), "Reporte de inventario", Style::new())
            .unwrap();
        let bytes = surface.into_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
