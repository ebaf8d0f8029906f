// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Data tables that continue across pages.
//!
//! A [`Table`][] has a head row and any number of body rows.  The columns are sized by weights
//! relative to the content width.  When the next row does not fit on the current page, a new page
//! is started and the head row is drawn again.
//!
//! Cells can either be plain text or a [`StyledString`][].  Styled cells mark values that need
//! attention; if a table contains any, a legend is printed below it.
//!
//! [`Table`]: struct.Table.html
//! [`StyledString`]: ../style/struct.StyledString.html

use crate::error::{Error, ErrorKind};
use crate::flow::PageFlow;
use crate::geometry;
use crate::style::{palette, Color, Style, StyledString};
use crate::surface::{Alignment, Surface};
use crate::{LayoutBox, Margins, Mm, Position};

/// The height of a body row.
pub const ROW_HEIGHT: f64 = 7.0;

/// The height of the head row.
pub const HEAD_HEIGHT: f64 = 8.0;

const TITLE_HEIGHT: f64 = 9.0;
const CELL_PADDING: f64 = 1.5;
const ROW_TINT: Color = Color::Rgb(242, 246, 250);

/// The default legend printed below tables with highlighted cells.
pub const DEFAULT_LEGEND: &str = "Los valores resaltados requieren atención";

/// A table cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Plain text in the default style.
    Plain(String),
    /// Highlighted text.
    Styled(StyledString),
}

impl Cell {
    /// Returns the text of this cell.
    pub fn text(&self) -> &str {
        match self {
            Cell::Plain(s) => s,
            Cell::Styled(s) => &s.s,
        }
    }

    /// Returns `true` if this cell is highlighted.
    pub fn is_styled(&self) -> bool {
        matches!(self, Cell::Styled(_))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        Cell::Plain(s.to_owned())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Cell {
        Cell::Plain(s)
    }
}

impl From<StyledString> for Cell {
    fn from(s: StyledString) -> Cell {
        Cell::Styled(s)
    }
}

/// The result of drawing a table.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TableSummary {
    /// The number of pages the table was drawn on.
    pub pages: usize,
    /// The number of body rows.
    pub rows: usize,
}

/// A data table with a repeating head row.
///
/// # Example
///
/// ```
/// use rxreport::flow::{Decoration, PageFlow};
/// use rxreport::style::{Color, StyledString};
/// use rxreport::surface::RecordingSurface;
/// use rxreport::table::{Cell, Table};
/// use rxreport::{Mm, PaperSize};
///
/// let mut table = Table::new(vec!["Producto", "Stock"], vec![3, 1]).unwrap();
/// table.push_row(vec![Cell::from("Paracetamol"), Cell::from("40")]).unwrap();
/// table.push_row(vec![
///     Cell::from("Ibuprofeno"),
///     Cell::from(StyledString::new("3", Color::Rgb(192, 57, 43))),
/// ]).unwrap();
///
/// let mut surface = RecordingSurface::new();
/// let mut flow = PageFlow::new(PaperSize::A4, Mm::from(15), Decoration::default());
/// let summary = table.render(&mut surface, &mut flow).unwrap();
/// assert_eq!(summary.rows, 2);
/// assert_eq!(summary.pages, 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    title: Option<String>,
    headers: Vec<String>,
    weights: Vec<usize>,
    alignments: Vec<Alignment>,
    rows: Vec<Vec<Cell>>,
    legend: String,
}

impl Table {
    /// Creates a new table with the given column headers and column weights.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidData`][] error if the number of headers and weights differ or if all
    /// weights are zero.
    ///
    /// [`InvalidData`]: ../error/enum.ErrorKind.html#variant.InvalidData
    pub fn new<H: Into<String>>(headers: Vec<H>, weights: Vec<usize>) -> Result<Table, Error> {
        if headers.len() != weights.len() {
            return Err(Error::new(
                format!(
                    "Expected {} column weights, received {}",
                    headers.len(),
                    weights.len()
                ),
                ErrorKind::InvalidData,
            ));
        }
        if weights.iter().all(|weight| *weight == 0) {
            return Err(Error::new(
                "A table needs at least one column with a positive weight",
                ErrorKind::InvalidData,
            ));
        }
        Ok(Table {
            title: None,
            alignments: vec![Alignment::Left; headers.len()],
            headers: headers.into_iter().map(Into::into).collect(),
            weights,
            rows: Vec::new(),
            legend: DEFAULT_LEGEND.to_owned(),
        })
    }

    /// Sets the title that is printed above the table.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Sets the title that is printed above the table and returns the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Table {
        self.set_title(title);
        self
    }

    /// Sets the alignment of the column with the given index.
    pub fn set_alignment(&mut self, column: usize, alignment: Alignment) {
        if let Some(a) = self.alignments.get_mut(column) {
            *a = alignment;
        }
    }

    /// Sets the legend that is printed below the table if it contains highlighted cells.
    pub fn set_legend(&mut self, legend: impl Into<String>) {
        self.legend = legend.into();
    }

    /// Returns the number of columns.
    pub fn columns(&self) -> usize {
        self.headers.len()
    }

    /// Returns the body rows.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Appends a body row.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidData`][] error if the row does not have one cell per column.
    ///
    /// [`InvalidData`]: ../error/enum.ErrorKind.html#variant.InvalidData
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), Error> {
        if row.len() != self.columns() {
            return Err(Error::new(
                format!(
                    "Expected {} cells in table row, received {}",
                    self.columns(),
                    row.len()
                ),
                ErrorKind::InvalidData,
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Draws the table at the cursor of the page flow.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutOverflow`][] error if the head row and a single body row do not fit on an
    /// empty page.
    ///
    /// [`LayoutOverflow`]: ../error/enum.ErrorKind.html#variant.LayoutOverflow
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        flow: &mut PageFlow,
    ) -> Result<TableSummary, Error> {
        let title_height = if self.title.is_some() {
            Mm::from(TITLE_HEIGHT)
        } else {
            Mm::from(0)
        };
        let first_block = title_height + Mm::from(HEAD_HEIGHT + ROW_HEIGHT);
        flow.ensure_space(surface, first_block)?;
        let first_page = flow.state().page_number;

        if let Some(title) = &self.title {
            let style = Style::new()
                .with_font_size(12)
                .with_color(palette::TEXT)
                .bold();
            let rect = flow.content_box(title_height);
            let title = surface.fit_text(title, style, rect.width);
            surface.draw_text(rect.position(), &title, style)?;
            flow.advance(title_height);
        }
        self.draw_head(surface, flow)?;

        if self.rows.is_empty() {
            let style = Style::new().with_font_size(8).with_color(palette::MUTED).italic();
            let rect = flow.content_box(Mm::from(ROW_HEIGHT));
            let line = vertical_center(surface, rect, style);
            surface.draw_text_aligned(line, geometry::NO_DATA_TEXT, style, Alignment::Center)?;
            flow.advance(rect.height);
        }

        let mut has_styled = false;
        for (idx, row) in self.rows.iter().enumerate() {
            if !flow.fits(Mm::from(ROW_HEIGHT)) {
                flow.ensure_space(surface, Mm::from(HEAD_HEIGHT + ROW_HEIGHT))?;
                self.draw_head(surface, flow)?;
            }
            let rect = flow.content_box(Mm::from(ROW_HEIGHT));
            if idx % 2 == 1 {
                surface.draw_rect(rect, Some(ROW_TINT), None);
            }
            has_styled |= row.iter().any(Cell::is_styled);
            self.draw_cells(surface, rect, row)?;
            flow.advance(rect.height);
        }

        if has_styled {
            self.draw_legend(surface, flow)?;
        }
        flow.advance(Mm::from(4));

        let pages = flow.state().page_number - first_page + 1;
        log::debug!("Drew {} table rows on {} page(s)", self.rows.len(), pages);
        Ok(TableSummary {
            pages,
            rows: self.rows.len(),
        })
    }

    fn column_boxes(&self, rect: LayoutBox) -> Vec<LayoutBox> {
        rect.split_horizontally(&self.weights)
    }

    fn draw_head<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        flow: &mut PageFlow,
    ) -> Result<(), Error> {
        let rect = flow.content_box(Mm::from(HEAD_HEIGHT));
        surface.draw_rect(rect, Some(palette::PRIMARY), None);
        let style = Style::new()
            .with_font_size(8)
            .with_color(Color::WHITE)
            .bold();
        for ((cell, header), alignment) in self
            .column_boxes(rect)
            .into_iter()
            .zip(&self.headers)
            .zip(&self.alignments)
        {
            draw_cell_text(surface, cell, header, style, *alignment)?;
        }
        flow.advance(rect.height);
        Ok(())
    }

    fn draw_cells<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        rect: LayoutBox,
        row: &[Cell],
    ) -> Result<(), Error> {
        let base = Style::new().with_font_size(8).with_color(palette::TEXT);
        for ((cell_box, cell), alignment) in self
            .column_boxes(rect)
            .into_iter()
            .zip(row)
            .zip(&self.alignments)
        {
            let style = match cell {
                Cell::Plain(_) => base,
                Cell::Styled(s) => base.and(s.style),
            };
            draw_cell_text(surface, cell_box, cell.text(), style, *alignment)?;
        }
        surface.draw_line(
            &[
                Position::new(rect.x, rect.bottom()),
                Position::new(rect.right(), rect.bottom()),
            ],
            palette::GRID,
            Mm::from(0.1),
        );
        Ok(())
    }

    fn draw_legend<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        flow: &mut PageFlow,
    ) -> Result<(), Error> {
        let height = Mm::from(ROW_HEIGHT);
        flow.ensure_space(surface, height)?;
        let rect = flow.content_box(height);
        let flag_color = self
            .rows
            .iter()
            .flatten()
            .find_map(|cell| match cell {
                Cell::Styled(s) => s.style.color(),
                Cell::Plain(_) => None,
            })
            .unwrap_or(palette::NEGATIVE);
        let swatch = LayoutBox::new(rect.x, rect.y + Mm::from(2), 3, 3);
        surface.draw_rect(swatch, Some(flag_color), None);
        let style = Style::new().with_font_size(7).with_color(palette::MUTED).italic();
        let line = vertical_center(surface, rect.inset(Margins::trbl(0, 0, 0, 5)), style);
        surface.draw_text_aligned(line, &self.legend, style, Alignment::Left)?;
        flow.advance(height);
        Ok(())
    }
}

fn vertical_center<S: Surface + ?Sized>(surface: &S, rect: LayoutBox, style: Style) -> LayoutBox {
    let height = surface.line_height(style);
    LayoutBox::new(rect.x, rect.y + (rect.height - height) / 2.0, rect.width, height)
}

fn draw_cell_text<S: Surface + ?Sized>(
    surface: &mut S,
    cell: LayoutBox,
    text: &str,
    style: Style,
    alignment: Alignment,
) -> Result<(), Error> {
    let inner = cell.inset((0, CELL_PADDING));
    let text = surface.fit_text(text, style, inner.width);
    let line = vertical_center(surface, inner, style);
    surface.draw_text_aligned(line, &text, style, alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Decoration;
    use crate::surface::RecordingSurface;
    use crate::PaperSize;

    fn flow() -> PageFlow {
        PageFlow::new(PaperSize::A4, Mm::from(15), Decoration::default())
    }

    #[test]
    fn rows_must_match_columns() {
        let mut table = Table::new(vec!["A", "B"], vec![1, 1]).unwrap();
        let err = table.push_row(vec![Cell::from("x")]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidData));
        assert!(Table::new(vec!["A"], vec![1, 2]).is_err());
        assert!(Table::new(vec!["A"], vec![0]).is_err());
    }

    #[test]
    fn head_row_repeats_on_every_page() {
        let mut table = Table::new(vec!["Producto", "Stock"], vec![3, 1])
            .unwrap()
            .with_title("Detalle de productos");
        for i in 0..60 {
            table
                .push_row(vec![Cell::from(format!("Producto {}", i + 1)), Cell::from("10")])
                .unwrap();
        }
        let mut surface = RecordingSurface::new();
        let mut flow = flow();
        let summary = table.render(&mut surface, &mut flow).unwrap();
        assert_eq!(summary.rows, 60);
        assert_eq!(summary.pages, surface.total_pages());
        assert!(summary.pages > 1);
        for page in surface.pages() {
            assert!(page.contains_text("Producto"));
            assert_eq!(page.texts().iter().filter(|text| ***text == *"Stock").count(), 1);
        }
        assert!(surface.page(1).unwrap().contains_text("Detalle de productos"));
        assert!(!surface.page(2).unwrap().contains_text("Detalle de productos"));
        let last = surface.pages().last().unwrap();
        assert!(last.contains_text("Producto 60"));
        assert!(!last.contains_text(DEFAULT_LEGEND));
    }

    #[test]
    fn legend_follows_highlighted_tables() {
        let mut table = Table::new(vec!["Producto", "Stock"], vec![3, 1]).unwrap();
        table
            .push_row(vec![
                Cell::from("Amoxicilina"),
                Cell::from(StyledString::new("2", palette::NEGATIVE)),
            ])
            .unwrap();
        let mut surface = RecordingSurface::new();
        let mut flow = flow();
        table.render(&mut surface, &mut flow).unwrap();
        let texts = surface.page(1).unwrap().texts();
        assert_eq!(texts.last(), Some(&DEFAULT_LEGEND));
    }

    #[test]
    fn empty_tables_show_placeholder() {
        let table = Table::new(vec!["Fecha", "Total"], vec![1, 1]).unwrap();
        let mut surface = RecordingSurface::new();
        let mut flow = flow();
        let summary = table.render(&mut surface, &mut flow).unwrap();
        assert_eq!(summary.rows, 0);
        assert!(surface.page(1).unwrap().contains_text(geometry::NO_DATA_TEXT));
    }

    #[test]
    fn tiny_pages_overflow() {
        let table = Table::new(vec!["A"], vec![1]).unwrap();
        let mut surface = RecordingSurface::new();
        let mut flow = PageFlow::new((100, 60), Mm::from(10), Decoration::default());
        let err = table.render(&mut surface, &mut flow).unwrap_err();
        assert!(err.is_layout_overflow());
    }
}
