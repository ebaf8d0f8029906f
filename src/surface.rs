// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! The drawing surface that all layouts draw on.
//!
//! A [`Surface`][] is a paginated 2D canvas.  It places rectangles, lines, polygons, text and
//! images at absolute positions on the current page, keeps track of the current page and the page
//! count and can append new pages.  Drawing is forward-only: only the page that was added last is
//! drawn on, with the exception of the finalize passes in [`flow`][] that use
//! [`Surface::select_page`][] to revisit all pages once the page count is known.
//!
//! There are two implementations:
//! - [`render::PdfSurface`][] draws into a PDF document using `printpdf`.
//! - [`RecordingSurface`][] keeps a display list of all draw calls per page.  It is used to test
//!   layouts and to compare the textual content of reports.
//!
//! [`Surface`]: trait.Surface.html
//! [`Surface::select_page`]: trait.Surface.html#tymethod.select_page
//! [`RecordingSurface`]: struct.RecordingSurface.html
//! [`render::PdfSurface`]: ../render/struct.PdfSurface.html
//! [`flow`]: ../flow/

use std::f64::consts::PI;

use crate::error::{Error, ErrorKind};
use crate::fonts;
use crate::style::{Color, Style};
use crate::{LayoutBox, Mm, Position, Size};

/// Number of line segments used for each corner of a rounded rectangle.
pub const ROUNDED_CORNER_STEPS: usize = 6;

/// Number of edges of the polygon that approximates a circle.
pub const CIRCLE_STEPS: usize = 36;

/// The horizontal alignment of a text within a box.
///
/// The default alignment is left-flushed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Alignment {
    /// Left-flushed.
    Left,
    /// Right-flushed.
    Right,
    /// Centered.
    Center,
}

impl Default for Alignment {
    fn default() -> Alignment {
        Alignment::Left
    }
}

/// A paginated canvas with absolute coordinates.
///
/// All positions are measured in millimeters from the top left corner of the current page.
pub trait Surface {
    /// Appends a new page with the given size and makes it the current page.
    fn add_page(&mut self, size: Size);

    /// Returns the 1-based number of the current page, or 0 if no page has been added yet.
    fn current_page_number(&self) -> usize;

    /// Returns the number of pages that have been added so far.
    ///
    /// While pages are still being drawn, this is not the final page count.
    fn total_pages(&self) -> usize;

    /// Returns the size of the current page.
    fn page_size(&self) -> Size;

    /// Makes the page with the given 1-based number the current page.
    ///
    /// This is only used by finalize passes that decorate all pages after the content has been
    /// drawn.
    fn select_page(&mut self, number: usize) -> Result<(), Error>;

    /// Returns the font cache used to measure and draw text.
    fn font_cache(&self) -> &fonts::FontCache;

    /// Draws a rectangle that is filled and/or stroked with the given colors.
    fn draw_rect(&mut self, rect: LayoutBox, fill: Option<Color>, stroke: Option<Color>);

    /// Draws an open line through the given points.
    fn draw_line(&mut self, points: &[Position], color: Color, thickness: Mm);

    /// Draws a closed polygon through the given points.
    fn draw_polygon(&mut self, points: &[Position], fill: Option<Color>, stroke: Option<Color>);

    /// Draws a single line of text whose top left corner is at the given position.
    fn draw_text(&mut self, position: Position, text: &str, style: Style) -> Result<(), Error>;

    /// Draws the given image scaled into the given rectangle.
    fn draw_image(&mut self, rect: LayoutBox, image: &image::DynamicImage);

    /// Draws a rectangle with rounded corners.
    ///
    /// The corners are approximated with [`ROUNDED_CORNER_STEPS`][] line segments each.
    ///
    /// [`ROUNDED_CORNER_STEPS`]: constant.ROUNDED_CORNER_STEPS.html
    fn draw_rounded_rect(
        &mut self,
        rect: LayoutBox,
        radius: Mm,
        fill: Option<Color>,
        stroke: Option<Color>,
    ) {
        let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0);
        if radius <= Mm::from(0) {
            self.draw_rect(rect, fill, stroke);
            return;
        }
        let corners = [
            (Position::new(rect.right() - radius, rect.y + radius), -PI / 2.0),
            (Position::new(rect.right() - radius, rect.bottom() - radius), 0.0),
            (Position::new(rect.x + radius, rect.bottom() - radius), PI / 2.0),
            (Position::new(rect.x + radius, rect.y + radius), PI),
        ];
        let mut points = Vec::with_capacity(4 * (ROUNDED_CORNER_STEPS + 1));
        for (center, start) in corners.iter() {
            for step in 0..=ROUNDED_CORNER_STEPS {
                let angle = start + (PI / 2.0) * step as f64 / ROUNDED_CORNER_STEPS as f64;
                points.push(point_on_circle(*center, radius, angle));
            }
        }
        self.draw_polygon(&points, fill, stroke);
    }

    /// Draws a circle approximated by a polygon with [`CIRCLE_STEPS`][] edges.
    ///
    /// [`CIRCLE_STEPS`]: constant.CIRCLE_STEPS.html
    fn draw_circle(
        &mut self,
        center: Position,
        radius: Mm,
        fill: Option<Color>,
        stroke: Option<Color>,
    ) {
        let points: Vec<_> = (0..CIRCLE_STEPS)
            .map(|step| {
                let angle = 2.0 * PI * step as f64 / CIRCLE_STEPS as f64;
                point_on_circle(center, radius, angle)
            })
            .collect();
        self.draw_polygon(&points, fill, stroke);
    }

    /// Calculates the width of the given text with the given style.
    fn text_width(&self, text: &str, style: Style) -> Mm {
        style.str_width(self.font_cache(), text)
    }

    /// Calculates the line height for the given style.
    fn line_height(&self, style: Style) -> Mm {
        style.line_height(self.font_cache())
    }

    /// Draws a line of text aligned within the horizontal extent of the given box.
    ///
    /// The text is drawn at the top of the box.
    fn draw_text_aligned(
        &mut self,
        rect: LayoutBox,
        text: &str,
        style: Style,
        alignment: Alignment,
    ) -> Result<(), Error> {
        let width = self.text_width(text, style);
        let x = match alignment {
            Alignment::Left => rect.x,
            Alignment::Center => rect.x + (rect.width - width) / 2.0,
            Alignment::Right => rect.right() - width,
        };
        self.draw_text(Position::new(x, rect.y), text, style)
    }

    /// Shortens the given text with a trailing ellipsis until it fits into the given width.
    fn fit_text(&self, text: &str, style: Style, width: Mm) -> String {
        if self.text_width(text, style) <= width {
            return text.to_owned();
        }
        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().chain(std::iter::once(&'…')).collect();
            if self.text_width(&candidate, style) <= width {
                return candidate;
            }
        }
        String::new()
    }
}

/// Returns the point on the circle with the given center and radius at the given angle.
///
/// Angles are measured in radians from the positive x axis.  As the y axis points down, positive
/// angles turn clockwise on the page.
pub fn point_on_circle(center: Position, radius: Mm, angle: f64) -> Position {
    Position::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// A single recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// A rectangle.
    Rect {
        /// The rectangle.
        rect: LayoutBox,
        /// The fill color.
        fill: Option<Color>,
        /// The stroke color.
        stroke: Option<Color>,
    },
    /// An open line.
    Line {
        /// The points of the line.
        points: Vec<Position>,
        /// The stroke color.
        color: Color,
        /// The line thickness.
        thickness: Mm,
    },
    /// A closed polygon.
    Polygon {
        /// The corners of the polygon.
        points: Vec<Position>,
        /// The fill color.
        fill: Option<Color>,
        /// The stroke color.
        stroke: Option<Color>,
    },
    /// A line of text.
    Text {
        /// The top left corner of the text.
        position: Position,
        /// The text.
        text: String,
        /// The text style.
        style: Style,
    },
    /// An image.
    Image {
        /// The target rectangle.
        rect: LayoutBox,
        /// The width of the source image in pixels.
        width: u32,
        /// The height of the source image in pixels.
        height: u32,
    },
}

/// A page recorded by a [`RecordingSurface`][].
///
/// [`RecordingSurface`]: struct.RecordingSurface.html
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedPage {
    /// The size of the page.
    pub size: Size,
    /// The draw calls in the order they were issued.
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    /// Returns all texts drawn on this page in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns `true` if a text containing the given string was drawn on this page.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }
}

/// A surface that records all draw calls instead of rendering them.
///
/// # Example
///
/// ```
/// use rxreport::surface::{RecordingSurface, Surface as _};
/// use rxreport::{PaperSize, Position};
///
/// let mut surface = RecordingSurface::new();
/// surface.add_page(PaperSize::A4.into());
/// surface.draw_text(Position::new(10, 10), "Hola", Default::default()).unwrap();
/// assert_eq!(surface.page(1).unwrap().texts(), vec!["Hola"]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSurface {
    font_cache: fonts::FontCache,
    pages: Vec<RecordedPage>,
    current: usize,
}

impl RecordingSurface {
    /// Creates a new recording surface without pages that measures text with the built-in fonts.
    pub fn new() -> RecordingSurface {
        RecordingSurface::default()
    }

    /// Creates a new recording surface that measures text with the given font cache.
    pub fn with_font_cache(font_cache: fonts::FontCache) -> RecordingSurface {
        RecordingSurface {
            font_cache,
            ..Default::default()
        }
    }

    /// Returns all recorded pages.
    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    /// Returns the page with the given 1-based number.
    pub fn page(&self, number: usize) -> Option<&RecordedPage> {
        number.checked_sub(1).and_then(|idx| self.pages.get(idx))
    }

    /// Returns the texts of every page, one vector per page.
    pub fn page_texts(&self) -> Vec<Vec<String>> {
        self.pages
            .iter()
            .map(|page| page.texts().into_iter().map(ToOwned::to_owned).collect())
            .collect()
    }

    fn record(&mut self, op: DrawOp) {
        match self.pages.get_mut(self.current) {
            Some(page) => page.ops.push(op),
            None => log::warn!("Dropping draw call issued before the first page: {:?}", op),
        }
    }
}

impl Surface for RecordingSurface {
    fn add_page(&mut self, size: Size) {
        self.pages.push(RecordedPage {
            size,
            ops: Vec::new(),
        });
        self.current = self.pages.len() - 1;
    }

    fn current_page_number(&self) -> usize {
        if self.pages.is_empty() {
            0
        } else {
            self.current + 1
        }
    }

    fn total_pages(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self) -> Size {
        self.pages
            .get(self.current)
            .map(|page| page.size)
            .unwrap_or_default()
    }

    fn select_page(&mut self, number: usize) -> Result<(), Error> {
        if number == 0 || number > self.pages.len() {
            return Err(Error::new(
                format!(
                    "There is no page {} in a document with {} pages",
                    number,
                    self.pages.len()
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
        self.record(DrawOp::Rect { rect, fill, stroke });
    }

    fn draw_line(&mut self, points: &[Position], color: Color, thickness: Mm) {
        self.record(DrawOp::Line {
            points: points.to_vec(),
            color,
            thickness,
        });
    }

    fn draw_polygon(&mut self, points: &[Position], fill: Option<Color>, stroke: Option<Color>) {
        self.record(DrawOp::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    fn draw_text(&mut self, position: Position, text: &str, style: Style) -> Result<(), Error> {
        self.record(DrawOp::Text {
            position,
            text: text.to_owned(),
            style,
        });
        Ok(())
    }

    fn draw_image(&mut self, rect: LayoutBox, image: &image::DynamicImage) {
        use image::GenericImageView as _;

        let (width, height) = image.dimensions();
        self.record(DrawOp::Image {
            rect,
            width,
            height,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaperSize;

    #[test]
    fn page_numbers_follow_added_pages() {
        let mut surface = RecordingSurface::new();
        assert_eq!(surface.current_page_number(), 0);
        surface.add_page(PaperSize::A4.into());
        surface.add_page(PaperSize::A4.into());
        assert_eq!(surface.current_page_number(), 2);
        assert_eq!(surface.total_pages(), 2);
        surface.select_page(1).unwrap();
        assert_eq!(surface.current_page_number(), 1);
        assert!(surface.select_page(3).is_err());
        assert!(surface.select_page(0).is_err());
    }

    #[test]
    fn rounded_rect_stays_inside_its_box() {
        let mut surface = RecordingSurface::new();
        surface.add_page(PaperSize::A4.into());
        let rect = LayoutBox::new(10, 20, 40, 30);
        surface.draw_rounded_rect(rect, Mm::from(3), Some(Color::WHITE), None);
        match &surface.page(1).unwrap().ops[0] {
            DrawOp::Polygon { points, .. } => {
                assert_eq!(points.len(), 4 * (ROUNDED_CORNER_STEPS + 1));
                for point in points {
                    assert!(rect.contains(&LayoutBox::from_parts(*point, Size::default())));
                }
            }
            op => panic!("Unexpected draw call {:?}", op),
        }
    }

    #[test]
    fn fit_text_appends_ellipsis() {
        let mut surface = RecordingSurface::new();
        surface.add_page(PaperSize::A4.into());
        let style = Style::new();
        let text = "Amoxicilina con ácido clavulánico";
        let fitted = surface.fit_text(text, style, Mm::from(20));
        assert!(fitted.ends_with('…'));
        assert!(surface.text_width(&fitted, style) <= Mm::from(20));
        assert_eq!(surface.fit_text("Ibuprofeno", style, Mm::from(100)), "Ibuprofeno");
    }

    #[test]
    fn draw_calls_before_first_page_are_dropped() {
        let mut surface = RecordingSurface::new();
        surface.draw_rect(LayoutBox::new(0, 0, 1, 1), None, Some(Color::BLACK));
        assert!(surface.pages().is_empty());
    }
}
