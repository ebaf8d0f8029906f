// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Paginated report rendering for pharmacy back offices.
//!
//! `rxreport` turns a list of products or sales transactions into a printable, multi-page
//! document: a cover page, a page of statistic cards, bar and pie charts drawn from primitive
//! shapes, and data tables that continue across pages.  PDF output is produced with
//! [`printpdf`][]; the same report model can also be exported as CSV or JSON.
//!
//! # Quickstart
//!
//! ```no_run
//! use rxreport::{export, ReportFormat, ReportKind, ReportOptions};
//! use rxreport::records::{Product, Record};
//!
//! let product = Product::new(1, "Paracetamol 500mg", "Analgésicos", 40, 10, 2.5);
//! let records = vec![Record::Product(product)];
//! let mut options = ReportOptions::default();
//! options.set_organization("Farmacia Central");
//! let exported = export(ReportKind::Inventory, &records, &options, ReportFormat::Pdf)
//!     .expect("Failed to generate report");
//! std::fs::write(&exported.filename, &exported.bytes).expect("Failed to write report");
//! ```
//!
//! # Overview
//!
//! The engine is organized in layers, each one only talking to the layers below it:
//!
//! - [`surface`][]: the [`Surface`][] trait, a paginated 2D canvas that places rectangles, lines,
//!   polygons, text and images at absolute positions on the current page.  [`render`][] contains
//!   the `printpdf` implementation, [`surface::RecordingSurface`][] records a display list and is
//!   used in tests.
//! - [`geometry`][]: decorative primitives built on a surface (gradients, borders, stat cards,
//!   bars, pie wedges).
//! - [`chart`][]: bar and pie chart layouts, including the paginated horizontal bar chart.
//! - [`flow`][]: the [`PageFlow`][] state that tracks the vertical cursor, opens new pages with a
//!   header band and stamps footers and the watermark once all pages exist.
//! - [`table`][]: data tables with a repeating head row.
//! - [`report`][]: computes the statistics of a report and arranges all of the above into the
//!   inventory and sales documents.
//! - [`export`][]: serializes a report as PDF, CSV or JSON.
//!
//! All lengths are measured in millimeters with the origin in the top left corner of the page.
//! The only exceptions are font sizes that are measured in points.  The [`Mm`][] newtype struct is
//! used for all lengths, and the [`Position`][], [`Size`][] and [`LayoutBox`][] types describe
//! points and rectangles.
//!
//! # Page Flow
//!
//! Drawing is strictly forward-only: content is always drawn on the current (last) page.  There is
//! no global auto-flow; sections that can grow (tables, the horizontal bar chart and the pie chart
//! legend) ask the [`PageFlow`][] whether their next block fits and open a new page otherwise.
//! If a block does not even fit on an empty page, rendering is aborted with a
//! [`LayoutOverflow`][] error.  Footers with the total page count and the watermark are drawn in a
//! final pass once the page count is known.
//!
//! [`printpdf`]: https://docs.rs/printpdf
//! [`surface`]: ./surface/
//! [`render`]: ./render/
//! [`geometry`]: ./geometry/
//! [`chart`]: ./chart/
//! [`flow`]: ./flow/
//! [`table`]: ./table/
//! [`report`]: ./report/
//! [`export`]: ./export/
//! [`Surface`]: surface/trait.Surface.html
//! [`surface::RecordingSurface`]: surface/struct.RecordingSurface.html
//! [`PageFlow`]: flow/struct.PageFlow.html
//! [`LayoutOverflow`]: error/enum.ErrorKind.html#variant.LayoutOverflow
//! [`Mm`]: struct.Mm.html
//! [`Size`]: struct.Size.html
//! [`Position`]: struct.Position.html
//! [`LayoutBox`]: struct.LayoutBox.html

#![warn(missing_docs, rust_2018_idioms)]

pub mod assets;
pub mod chart;
pub mod error;
pub mod export;
pub mod flow;
pub mod fonts;
pub mod geometry;
pub mod locale;
pub mod options;
pub mod records;
pub mod render;
pub mod report;
pub mod style;
pub mod surface;
pub mod table;

use derive_more::{
    Add, AddAssign, Div, DivAssign, From, Into, Mul, MulAssign, Sub, SubAssign, Sum,
};
use serde::{Deserialize, Serialize};

pub use crate::export::{export, ExportedReport, ReportFormat};
pub use crate::options::ReportOptions;
pub use crate::report::{generate_report, Report, ReportKind};

/// A length measured in millimeters.
///
/// `rxreport` always uses millimeters as its length unit, except for the font size that is
/// measured in points.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Div,
    DivAssign,
    From,
    Into,
    Mul,
    MulAssign,
    Sub,
    SubAssign,
    Sum,
    Serialize,
    Deserialize,
)]
pub struct Mm(f64);

impl Mm {
    /// Returns the maximum of this value and the given value.
    pub fn max(self, other: Mm) -> Mm {
        Mm(self.0.max(other.0))
    }

    /// Returns the minimum of this value and the given value.
    pub fn min(self, other: Mm) -> Mm {
        Mm(self.0.min(other.0))
    }

    /// Returns the raw number of millimeters.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl From<i8> for Mm {
    fn from(mm: i8) -> Mm {
        Mm(mm.into())
    }
}

impl From<i16> for Mm {
    fn from(mm: i16) -> Mm {
        Mm(mm.into())
    }
}

impl From<i32> for Mm {
    fn from(mm: i32) -> Mm {
        Mm(mm.into())
    }
}

impl From<u8> for Mm {
    fn from(mm: u8) -> Mm {
        Mm(mm.into())
    }
}

impl From<u16> for Mm {
    fn from(mm: u16) -> Mm {
        Mm(mm.into())
    }
}

impl From<u32> for Mm {
    fn from(mm: u32) -> Mm {
        Mm(mm.into())
    }
}

impl From<f32> for Mm {
    fn from(mm: f32) -> Mm {
        Mm(mm.into())
    }
}

impl From<printpdf::Mm> for Mm {
    fn from(mm: printpdf::Mm) -> Mm {
        Mm(mm.0)
    }
}

impl From<printpdf::Pt> for Mm {
    fn from(pt: printpdf::Pt) -> Mm {
        let mm: printpdf::Mm = pt.into();
        mm.into()
    }
}

impl From<Mm> for printpdf::Mm {
    fn from(mm: Mm) -> printpdf::Mm {
        printpdf::Mm(mm.0)
    }
}

impl From<Mm> for printpdf::Pt {
    fn from(mm: Mm) -> printpdf::Pt {
        printpdf::Mm(mm.0).into()
    }
}

/// A position on a page, measured in millimeters from the top left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Add, AddAssign, Sub, SubAssign)]
pub struct Position {
    /// The x coordinate of the position, measured from the left border of the page.
    pub x: Mm,
    /// The y coordinate of the position, measured from the top border of the page.
    pub y: Mm,
}

impl Position {
    /// Creates a new position from the given coordinates.
    pub fn new(x: impl Into<Mm>, y: impl Into<Mm>) -> Position {
        Position {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl<X: Into<Mm>, Y: Into<Mm>> From<(X, Y)> for Position {
    fn from(values: (X, Y)) -> Position {
        Position::new(values.0, values.1)
    }
}

/// A size of an area on a page, measured in millimeters.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, PartialOrd, Add, AddAssign, Sub, SubAssign, Serialize,
    Deserialize,
)]
pub struct Size {
    /// The width of the area.
    pub width: Mm,
    /// The height of the area.
    pub height: Mm,
}

impl Size {
    /// Creates a new size from the given width and height.
    pub fn new(width: impl Into<Mm>, height: impl Into<Mm>) -> Size {
        Size {
            width: width.into(),
            height: height.into(),
        }
    }
}

impl<W: Into<Mm>, H: Into<Mm>> From<(W, H)> for Size {
    fn from(values: (W, H)) -> Size {
        Size::new(values.0, values.1)
    }
}

/// A paper size like A4, legal or letter.
///
/// This enum provides variants for typical paper sizes that can be converted into [`Size`][]
/// instances.
///
/// [`Size`]: struct.Size.html
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    /// The A4 paper size (210x297mm).
    A4,
    /// The legal paper size (216x356mm).
    Legal,
    /// The letter paper size (216x279mm).
    Letter,
}

impl Default for PaperSize {
    fn default() -> PaperSize {
        PaperSize::A4
    }
}

impl From<PaperSize> for Size {
    fn from(size: PaperSize) -> Size {
        match size {
            PaperSize::A4 => Size::new(210, 297),
            PaperSize::Legal => Size::new(216, 356),
            PaperSize::Letter => Size::new(216, 279),
        }
    }
}

/// The margins of an area, measured in millimeters.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Margins {
    /// The top margin of the area.
    pub top: Mm,
    /// The right margin of the area.
    pub right: Mm,
    /// The bottom margin of the area.
    pub bottom: Mm,
    /// The left margin of the area.
    pub left: Mm,
}

impl Margins {
    /// Creates a new `Margins` instance from the given top, right, bottom and left margins.
    pub fn trbl(
        top: impl Into<Mm>,
        right: impl Into<Mm>,
        bottom: impl Into<Mm>,
        left: impl Into<Mm>,
    ) -> Margins {
        Margins {
            top: top.into(),
            right: right.into(),
            bottom: bottom.into(),
            left: left.into(),
        }
    }

    /// Creates a new `Margins` instance from the given vertical (top and bottom) and horizontal
    /// (left and right) margins.
    pub fn vh(vertical: impl Into<Mm>, horizontal: impl Into<Mm>) -> Margins {
        let (vertical, horizontal) = (vertical.into(), horizontal.into());
        Margins::trbl(vertical, horizontal, vertical, horizontal)
    }

    /// Creates a new `Margins` instance with all four margins set to the given value.
    pub fn all(all: impl Into<Mm>) -> Margins {
        let all = all.into();
        Margins::trbl(all, all, all, all)
    }
}

impl<V: Into<Mm>, H: Into<Mm>> From<(V, H)> for Margins {
    fn from(values: (V, H)) -> Margins {
        Margins::vh(values.0, values.1)
    }
}

impl<T: Into<Mm>> From<T> for Margins {
    fn from(value: T) -> Margins {
        Margins::all(value)
    }
}

/// A rectangle on a page that a chart, table or card is laid out in.
///
/// Layout boxes are plain values: every layout function receives its box by value and never
/// hands it on as shared state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutBox {
    /// The x coordinate of the left edge.
    pub x: Mm,
    /// The y coordinate of the top edge.
    pub y: Mm,
    /// The width of the box.
    pub width: Mm,
    /// The height of the box.
    pub height: Mm,
}

impl LayoutBox {
    /// Creates a new box from its top left corner and its size.
    pub fn new(
        x: impl Into<Mm>,
        y: impl Into<Mm>,
        width: impl Into<Mm>,
        height: impl Into<Mm>,
    ) -> LayoutBox {
        LayoutBox {
            x: x.into(),
            y: y.into(),
            width: width.into(),
            height: height.into(),
        }
    }

    /// Creates a new box at the given position with the given size.
    pub fn from_parts(position: Position, size: Size) -> LayoutBox {
        LayoutBox::new(position.x, position.y, size.width, size.height)
    }

    /// Returns the top left corner of this box.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Returns the size of this box.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the x coordinate of the right edge.
    pub fn right(&self) -> Mm {
        self.x + self.width
    }

    /// Returns the y coordinate of the bottom edge.
    pub fn bottom(&self) -> Mm {
        self.y + self.height
    }

    /// Returns the center of this box.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns a copy of this box moved by the given offset.
    #[must_use]
    pub fn translate(mut self, offset: impl Into<Position>) -> LayoutBox {
        let offset = offset.into();
        self.x += offset.x;
        self.y += offset.y;
        self
    }

    /// Returns a copy of this box shrunk by the given margins.
    ///
    /// The width and height never drop below zero.
    #[must_use]
    pub fn inset(mut self, margins: impl Into<Margins>) -> LayoutBox {
        let margins = margins.into();
        self.x += margins.left;
        self.y += margins.top;
        self.width = (self.width - margins.left - margins.right).max(Mm(0.0));
        self.height = (self.height - margins.top - margins.bottom).max(Mm(0.0));
        self
    }

    /// Returns a copy of this box with the given height.
    #[must_use]
    pub fn with_height(mut self, height: impl Into<Mm>) -> LayoutBox {
        self.height = height.into();
        self
    }

    /// Returns `true` if the given box lies completely inside this box.
    ///
    /// A small tolerance absorbs floating point noise.
    pub fn contains(&self, other: &LayoutBox) -> bool {
        const EPSILON: f64 = 1e-6;
        other.x.0 >= self.x.0 - EPSILON
            && other.y.0 >= self.y.0 - EPSILON
            && other.right().0 <= self.right().0 + EPSILON
            && other.bottom().0 <= self.bottom().0 + EPSILON
    }

    /// Splits this box horizontally using the given weights.
    ///
    /// The returned vector has the same number of elements as the provided slice.  The width of
    /// the *i*-th box is *width \* weights[i] / total_weight*, where *width* is the width of this
    /// box, and *total_weight* is the sum of all given weights.
    pub fn split_horizontally(&self, weights: &[usize]) -> Vec<LayoutBox> {
        let total_weight: usize = weights.iter().sum();
        if total_weight == 0 {
            return Vec::new();
        }
        let factor = self.width / total_weight as f64;
        let mut offset = Mm(0.0);
        let mut boxes = Vec::with_capacity(weights.len());
        for weight in weights {
            let width = factor * *weight as f64;
            boxes.push(LayoutBox::new(self.x + offset, self.y, width, self.height));
            offset += width;
        }
        boxes
    }

    /// Splits this box into a grid of `columns` x `rows` cells separated by the given gap.
    ///
    /// The cells are returned row by row.
    pub fn grid(&self, columns: usize, rows: usize, gap: impl Into<Mm>) -> Vec<LayoutBox> {
        if columns == 0 || rows == 0 {
            return Vec::new();
        }
        let gap = gap.into();
        let width = (self.width - gap * (columns - 1) as f64) / columns as f64;
        let height = (self.height - gap * (rows - 1) as f64) / rows as f64;
        let mut cells = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(LayoutBox::new(
                    self.x + (width + gap) * column as f64,
                    self.y + (height + gap) * row as f64,
                    width,
                    height,
                ));
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_never_produces_negative_sizes() {
        let rect = LayoutBox::new(10, 10, 4, 4).inset(5);
        assert_eq!(rect.width, Mm(0.0));
        assert_eq!(rect.height, Mm(0.0));
        assert_eq!(rect.position(), Position::new(15, 15));
    }

    #[test]
    fn split_horizontally_uses_weights() {
        let boxes = LayoutBox::new(0, 0, 90, 10).split_horizontally(&[1, 2]);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].width, Mm(30.0));
        assert_eq!(boxes[1].x, Mm(30.0));
        assert_eq!(boxes[1].width, Mm(60.0));
    }

    #[test]
    fn grid_cells_stay_inside() {
        let outer = LayoutBox::new(15, 40, 180, 70);
        let cells = outer.grid(2, 2, 6);
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|cell| outer.contains(cell)));
        assert_eq!(cells[3].right(), outer.right());
        assert_eq!(cells[3].bottom(), outer.bottom());
    }
}
