// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Page flow control.
//!
//! A [`PageFlow`][] owns the vertical cursor of the document.  Sections that can grow ask it
//! whether their next block fits on the current page using [`ensure_space`][]; if it does not, the
//! flow appends a new page with the header band and resets the cursor.  There is no implicit
//! overflow handling: a block that does not fit is never split by the flow itself.
//!
//! Once all content has been drawn, [`finalize`][] revisits every page to stamp the footer with
//! the final page count and to draw the watermark.
//!
//! [`PageFlow`]: struct.PageFlow.html
//! [`ensure_space`]: struct.PageFlow.html#method.ensure_space
//! [`finalize`]: struct.PageFlow.html#method.finalize

use crate::assets;
use crate::error::{Error, ErrorKind};
use crate::geometry;
use crate::style::{palette, Color, Style};
use crate::surface::{Alignment, Surface};
use crate::{LayoutBox, Mm, Position, Size};

/// The height of the header band at the top of every content page.
pub const HEADER_HEIGHT: f64 = 28.0;

/// The gap between the header band and the first content block.
pub const HEADER_GAP: f64 = 8.0;

/// The space at the bottom of every page that is reserved for the footer.
pub const FOOTER_RESERVE: f64 = 20.0;

const LOGO_SIZE: f64 = 18.0;
const WATERMARK_COLOR: Color = Color::Rgb(236, 236, 236);
const WATERMARK_FONT_SIZE: u8 = 54;

/// The cursor state of the current page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageState {
    /// The 1-based number of the current page, or 0 before the first page.
    pub page_number: usize,
    /// The vertical position where the next block is drawn.
    pub cursor_y: Mm,
    /// The height of the pages.
    pub page_height: Mm,
    /// The width of the pages.
    pub page_width: Mm,
    /// The left and right margin.
    pub margin: Mm,
}

/// Whether the flow is drawing on a page or currently switching to the next one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlowState {
    /// Content is drawn on the current page.
    Drawing,
    /// A page break is in progress.
    PageBreak,
}

/// The texts and images that decorate every page.
#[derive(Clone, Debug, Default)]
pub struct Decoration {
    /// The title in the header band.
    pub title: String,
    /// The subtitle in the header band.
    pub subtitle: String,
    /// The formatted generation timestamp printed in the footer.
    pub generated: String,
    /// The attribution line printed in the footer.
    pub attribution: String,
    /// The watermark caption.
    pub watermark: Option<String>,
    /// The logo drawn in the header band.
    pub logo: Option<image::DynamicImage>,
}

/// The page flow of a document.
///
/// # Example
///
/// ```
/// use rxreport::flow::{Decoration, PageFlow};
/// use rxreport::surface::RecordingSurface;
/// use rxreport::{Mm, PaperSize};
///
/// let mut surface = RecordingSurface::new();
/// let mut flow = PageFlow::new(PaperSize::A4, Mm::from(15), Decoration::default());
/// flow.new_page(&mut surface, true).unwrap();
/// let block = flow.content_box(Mm::from(50));
/// flow.advance(block.height);
/// assert!(flow.fits(Mm::from(100)));
/// assert!(!flow.ensure_space(&mut surface, Mm::from(100)).unwrap());
/// assert!(flow.ensure_space(&mut surface, Mm::from(200)).unwrap());
/// assert_eq!(flow.state().page_number, 2);
/// ```
#[derive(Clone, Debug)]
pub struct PageFlow {
    state: PageState,
    flow_state: FlowState,
    decoration: Decoration,
}

impl PageFlow {
    /// Creates a new page flow for pages of the given size.
    pub fn new(size: impl Into<Size>, margin: Mm, decoration: Decoration) -> PageFlow {
        let size = size.into();
        PageFlow {
            state: PageState {
                page_number: 0,
                cursor_y: Mm::from(0),
                page_height: size.height,
                page_width: size.width,
                margin,
            },
            flow_state: FlowState::Drawing,
            decoration,
        }
    }

    /// Returns the cursor state.
    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Returns whether a page break is in progress.
    pub fn flow_state(&self) -> FlowState {
        self.flow_state
    }

    /// Returns the page decoration.
    pub fn decoration(&self) -> &Decoration {
        &self.decoration
    }

    /// Returns the size of the pages.
    pub fn page_size(&self) -> Size {
        Size::new(self.state.page_width, self.state.page_height)
    }

    /// Returns the width available for content between the margins.
    pub fn content_width(&self) -> Mm {
        self.state.page_width - self.state.margin * 2.0
    }

    /// Returns the lowest position content may reach on any page.
    pub fn content_bottom(&self) -> Mm {
        self.state.page_height - Mm::from(FOOTER_RESERVE)
    }

    /// Returns the first content position on a page with a header band.
    pub fn content_top(&self) -> Mm {
        Mm::from(HEADER_HEIGHT + HEADER_GAP)
    }

    /// Returns the height available on an empty page with a header band.
    ///
    /// No block that is taller than this can ever be drawn.
    pub fn max_block_height(&self) -> Mm {
        (self.content_bottom() - self.content_top()).max(Mm::from(0))
    }

    /// Returns the height that is left on the current page.
    pub fn remaining(&self) -> Mm {
        if self.state.page_number == 0 {
            return Mm::from(0);
        }
        (self.content_bottom() - self.state.cursor_y).max(Mm::from(0))
    }

    /// Returns `true` if a block with the given height fits on the current page.
    pub fn fits(&self, height: Mm) -> bool {
        height <= self.remaining()
    }

    /// Returns the box for a block with the given height at the cursor.
    pub fn content_box(&self, height: Mm) -> LayoutBox {
        LayoutBox::new(
            self.state.margin,
            self.state.cursor_y,
            self.content_width(),
            height,
        )
    }

    /// Moves the cursor down by the given height.
    ///
    /// Negative heights are ignored so that the cursor never moves up.
    pub fn advance(&mut self, height: Mm) {
        self.state.cursor_y += height.max(Mm::from(0));
    }

    /// Appends a new page to the surface and resets the cursor.
    ///
    /// If `with_header` is set, the header band is drawn and the cursor is placed below it.
    /// Otherwise the cursor is placed at the top margin.
    pub fn new_page<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        with_header: bool,
    ) -> Result<(), Error> {
        surface.add_page(self.page_size());
        self.state.page_number += 1;
        log::debug!("Starting page {}", self.state.page_number);
        if with_header {
            self.draw_header(surface)?;
            self.state.cursor_y = self.content_top();
        } else {
            self.state.cursor_y = self.state.margin;
        }
        self.flow_state = FlowState::Drawing;
        Ok(())
    }

    /// Makes sure that a block with the given height fits on the current page.
    ///
    /// If it does not fit, a new page with a header band is started and `true` is returned.  If the
    /// block is taller than an empty page, a [`LayoutOverflow`][] error is returned.
    ///
    /// [`LayoutOverflow`]: ../error/enum.ErrorKind.html#variant.LayoutOverflow
    pub fn ensure_space<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        height: Mm,
    ) -> Result<bool, Error> {
        if height > self.max_block_height() {
            return Err(Error::new(
                format!(
                    "A block of {:.1} mm does not fit on an empty page with {:.1} mm of content \
                     space",
                    height.as_f64(),
                    self.max_block_height().as_f64()
                ),
                ErrorKind::LayoutOverflow,
            ));
        }
        if self.state.page_number > 0 && self.fits(height) {
            return Ok(false);
        }
        self.flow_state = FlowState::PageBreak;
        self.new_page(surface, true)?;
        Ok(true)
    }

    fn draw_header<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), Error> {
        let band = LayoutBox::new(0, 0, self.state.page_width, HEADER_HEIGHT);
        geometry::gradient_fill(
            surface,
            band,
            palette::PRIMARY,
            palette::PRIMARY_LIGHT,
            geometry::GRADIENT_STEPS,
        );

        let margin = self.state.margin;
        let logo_top = (HEADER_HEIGHT - LOGO_SIZE) / 2.0;
        let logo_box = LayoutBox::new(margin, logo_top, LOGO_SIZE, LOGO_SIZE);
        surface.draw_rounded_rect(logo_box, Mm::from(2), Some(Color::WHITE), None);
        match &self.decoration.logo {
            Some(logo) => assets::draw_image_fitted(surface, logo, logo_box.inset(2)),
            None => draw_cross(surface, logo_box.inset(4), palette::ACCENT),
        }

        let text_x = logo_box.right() + Mm::from(6);
        let width = self.state.page_width - margin - text_x;
        let title_style = Style::new()
            .with_font_size(16)
            .with_color(Color::WHITE)
            .bold();
        let title = surface.fit_text(&self.decoration.title, title_style, width);
        surface.draw_text(Position::new(text_x, logo_box.y), &title, title_style)?;
        let subtitle_style = Style::new().with_font_size(10).with_color(Color::WHITE);
        let subtitle = surface.fit_text(&self.decoration.subtitle, subtitle_style, width);
        surface.draw_text(
            Position::new(text_x, logo_box.y + surface.line_height(title_style) + Mm::from(2)),
            &subtitle,
            subtitle_style,
        )
    }

    /// Draws the footer and the watermark on every page of the surface.
    ///
    /// This is the only operation that revisits earlier pages.  The current page is restored
    /// afterwards.
    pub fn finalize<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), Error> {
        let total = surface.total_pages();
        let current = surface.current_page_number();
        log::debug!("Finalizing {} pages", total);
        for number in 1..=total {
            surface.select_page(number)?;
            self.draw_footer(surface, number, total)?;
        }
        if let Some(watermark) = &self.decoration.watermark {
            for number in 1..=total {
                surface.select_page(number)?;
                self.draw_watermark(surface, watermark)?;
            }
        }
        if current > 0 {
            surface.select_page(current)?;
        }
        Ok(())
    }

    fn draw_footer<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        number: usize,
        total: usize,
    ) -> Result<(), Error> {
        let margin = self.state.margin;
        let top = self.state.page_height - Mm::from(FOOTER_RESERVE) + Mm::from(5);
        surface.draw_line(
            &[
                Position::new(margin, top),
                Position::new(self.state.page_width - margin, top),
            ],
            palette::GRID,
            Mm::from(0.3),
        );

        let style = Style::new().with_font_size(8).with_color(palette::MUTED);
        let line = LayoutBox::new(
            margin,
            top + Mm::from(2),
            self.content_width(),
            surface.line_height(style),
        );
        surface.draw_text_aligned(line, &page_label(number, total), style, Alignment::Right)?;
        if !self.decoration.generated.is_empty() {
            let generated = format!("Generado: {}", self.decoration.generated);
            surface.draw_text_aligned(line, &generated, style, Alignment::Left)?;
        }
        if !self.decoration.attribution.is_empty() {
            let line = line.translate((Mm::from(0), line.height + Mm::from(1)));
            let attribution = surface.fit_text(&self.decoration.attribution, style, line.width);
            surface.draw_text_aligned(line, &attribution, style, Alignment::Center)?;
        }
        Ok(())
    }

    fn draw_watermark<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        text: &str,
    ) -> Result<(), Error> {
        let style = Style::new()
            .with_font_size(WATERMARK_FONT_SIZE)
            .with_color(WATERMARK_COLOR)
            .bold();
        let text = surface.fit_text(text, style, self.content_width());
        let height = surface.line_height(style);
        let line = LayoutBox::new(
            self.state.margin,
            (self.state.page_height - height) / 2.0,
            self.content_width(),
            height,
        );
        surface.draw_text_aligned(line, &text, style, Alignment::Center)
    }
}

/// Returns the page label of the footer, for example `Página 2 de 5`.
pub fn page_label(number: usize, total: usize) -> String {
    format!("Página {} de {}", number, total)
}

/// Draws a pharmacy cross that fills the given square.
fn draw_cross<S: Surface + ?Sized>(surface: &mut S, rect: LayoutBox, color: Color) {
    let third = rect.width / 3.0;
    let (x0, x1, x2, x3) = (rect.x, rect.x + third, rect.x + third * 2.0, rect.right());
    let third = rect.height / 3.0;
    let (y0, y1, y2, y3) = (rect.y, rect.y + third, rect.y + third * 2.0, rect.bottom());
    let points = [
        Position::new(x1, y0),
        Position::new(x2, y0),
        Position::new(x2, y1),
        Position::new(x3, y1),
        Position::new(x3, y2),
        Position::new(x2, y2),
        Position::new(x2, y3),
        Position::new(x1, y3),
        Position::new(x1, y2),
        Position::new(x0, y2),
        Position::new(x0, y1),
        Position::new(x1, y1),
    ];
    surface.draw_polygon(&points, Some(color), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use crate::PaperSize;

    fn flow() -> PageFlow {
        let decoration = Decoration {
            title: "Reporte de inventario".to_owned(),
            subtitle: "Farmacia Central".to_owned(),
            generated: "01/02/2024 09:30".to_owned(),
            attribution: "Sistema de farmacia".to_owned(),
            watermark: Some("CONFIDENCIAL".to_owned()),
            logo: None,
        };
        PageFlow::new(PaperSize::A4, Mm::from(15), decoration)
    }

    #[test]
    fn cursor_resets_on_new_pages() {
        let mut surface = RecordingSurface::new();
        let mut flow = flow();
        flow.new_page(&mut surface, false).unwrap();
        assert_eq!(flow.state().cursor_y, Mm::from(15));
        flow.advance(Mm::from(100));
        flow.advance(Mm::from(-20));
        assert_eq!(flow.state().cursor_y, Mm::from(115));
        flow.new_page(&mut surface, true).unwrap();
        assert_eq!(flow.state().cursor_y, flow.content_top());
        assert_eq!(flow.state().page_number, 2);
        assert_eq!(surface.total_pages(), 2);
        assert!(surface.page(2).unwrap().contains_text("Reporte de inventario"));
        assert!(!surface.page(1).unwrap().contains_text("Reporte de inventario"));
    }

    #[test]
    fn ensure_space_breaks_pages() {
        let mut surface = RecordingSurface::new();
        let mut flow = flow();
        assert!(flow.ensure_space(&mut surface, Mm::from(10)).unwrap());
        assert_eq!(flow.flow_state(), FlowState::Drawing);
        flow.advance(flow.max_block_height() - Mm::from(5));
        assert!(!flow.ensure_space(&mut surface, Mm::from(5)).unwrap());
        assert!(flow.ensure_space(&mut surface, Mm::from(6)).unwrap());
        assert_eq!(surface.total_pages(), 2);
    }

    #[test]
    fn oversized_blocks_overflow() {
        let mut surface = RecordingSurface::new();
        let mut flow = flow();
        flow.new_page(&mut surface, true).unwrap();
        let err = flow
            .ensure_space(&mut surface, flow.max_block_height() + Mm::from(1))
            .unwrap_err();
        assert!(err.is_layout_overflow());
        assert_eq!(surface.total_pages(), 1);
    }

    #[test]
    fn finalize_stamps_every_page() {
        let mut surface = RecordingSurface::new();
        let mut flow = flow();
        flow.new_page(&mut surface, false).unwrap();
        flow.new_page(&mut surface, true).unwrap();
        flow.new_page(&mut surface, true).unwrap();
        flow.finalize(&mut surface).unwrap();
        for number in 1..=3 {
            let page = surface.page(number).unwrap();
            assert!(page.contains_text(&format!("Página {} de 3", number)));
            assert!(page.contains_text("Generado: 01/02/2024 09:30"));
            assert!(page.contains_text("Sistema de farmacia"));
            assert_eq!(page.texts().last(), Some(&"CONFIDENCIAL"));
        }
        assert_eq!(surface.current_page_number(), 3);
    }
}
