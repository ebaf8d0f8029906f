// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Bar and pie chart layouts.
//!
//! Three layouts are available:
//!
//! - [`draw_vertical_bars`][] draws a column chart into a fixed box.
//! - [`draw_horizontal_bars`][] draws a bar chart that continues on new pages if it has more rows
//!   than fit on one page.  Every page repeats the panel, the axis and the title, and the titles
//!   after the first page get a `(continuación i/n)` suffix.
//! - [`draw_pie_chart`][] draws a pie chart followed by a legend whose rows may continue on new
//!   pages.
//!
//! Datasets without data or with a zero total are drawn as a no-data panel.
//!
//! [`draw_vertical_bars`]: fn.draw_vertical_bars.html
//! [`draw_horizontal_bars`]: fn.draw_horizontal_bars.html
//! [`draw_pie_chart`]: fn.draw_pie_chart.html

use std::f64::consts::PI;
use std::ops::Range;

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation as _;

use crate::error::{Error, ErrorKind};
use crate::flow::PageFlow;
use crate::geometry::{self, BarDirection};
use crate::locale::LocaleFormat;
use crate::options::{AxisScale, ReportOptions};
use crate::style::{palette, Color, Style};
use crate::surface::{Alignment, Surface};
use crate::{LayoutBox, Margins, Mm, Position};

/// The number of grid divisions of a value axis.
pub const GRID_DIVISIONS: usize = 5;

/// The height of a bar in a horizontal bar chart.
pub const BAR_HEIGHT: f64 = 8.0;

/// The vertical space between two bars in a horizontal bar chart.
pub const BAR_GAP: f64 = 6.0;

/// The share of a column slot that is covered by the column.
pub const BAR_WIDTH_RATIO: f64 = 0.7;

/// Labels with more grapheme clusters than this are truncated.
pub const LABEL_MAX_LEN: usize = 15;

/// The number of grapheme clusters kept when a label is truncated.
pub const LABEL_KEEP_LEN: usize = 13;

/// The minimum share of a pie slice that gets a percentage label.
pub const PIE_LABEL_MIN_SHARE: f64 = 0.1;

/// The height of the panel of a pie chart, excluding the legend.
pub const PIE_PANEL_HEIGHT: f64 = 95.0;

/// The height of a legend row.
pub const LEGEND_ROW_HEIGHT: f64 = 7.0;

/// The height of the panel drawn for a chart without data.
pub const NO_DATA_HEIGHT: f64 = 50.0;

// title, value axis and annotation of a horizontal bar panel
const HBAR_CHROME: f64 = 30.0;
const HBAR_LABEL_WIDTH: f64 = 38.0;
const HBAR_VALUE_WIDTH: f64 = 24.0;
const AXIS_LABEL_HEIGHT: f64 = 5.0;
const SECTION_GAP: f64 = 6.0;

/// A labelled, colored value of a chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartDatum {
    /// The label of the value.
    pub label: String,
    /// The value, never negative.
    pub value: f64,
    /// The color of the bar or slice.
    pub color: Color,
}

impl ChartDatum {
    /// Creates a new datum, clamping negative and non-finite values to zero.
    pub fn new(label: impl Into<String>, value: f64, color: Color) -> ChartDatum {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        ChartDatum {
            label: label.into(),
            value,
            color,
        }
    }
}

/// An ordered list of chart values.
pub type ChartDataset = Vec<ChartDatum>;

/// Builds a dataset from label/value pairs, assigning the series colors in order.
pub fn dataset<L: Into<String>>(values: impl IntoIterator<Item = (L, f64)>) -> ChartDataset {
    values
        .into_iter()
        .enumerate()
        .map(|(idx, (label, value))| ChartDatum::new(label, value, palette::series(idx)))
        .collect()
}

/// How chart values are printed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// Whole numbers, for example unit counts.
    Integer,
    /// Currency amounts.
    Currency,
}

impl ValueFormat {
    /// Formats the given value.
    pub fn format(self, locale: &LocaleFormat, value: f64) -> String {
        match self {
            ValueFormat::Integer => locale.format_number(value, 0),
            ValueFormat::Currency => locale.format_currency(value),
        }
    }
}

/// Settings shared by all chart layouts.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
    /// The scaling of paginated horizontal bar charts.
    pub axis_scale: AxisScale,
    /// Overrides the number of rows per page of horizontal bar charts.
    pub items_per_page: Option<usize>,
    /// The number of triangles per pie wedge.
    pub pie_steps: usize,
    /// How values are printed.
    pub value_format: ValueFormat,
    /// Number formatting.
    pub locale: LocaleFormat,
}

impl Default for ChartConfig {
    fn default() -> ChartConfig {
        ChartConfig {
            axis_scale: AxisScale::Global,
            items_per_page: None,
            pie_steps: geometry::PIE_STEPS,
            value_format: ValueFormat::Integer,
            locale: LocaleFormat::default(),
        }
    }
}

impl ChartConfig {
    /// Creates a chart configuration from the report options.
    pub fn new(options: &ReportOptions) -> ChartConfig {
        ChartConfig {
            axis_scale: options.axis_scale,
            items_per_page: None,
            pie_steps: options.pie_steps,
            value_format: ValueFormat::Integer,
            locale: options.locale.clone(),
        }
    }

    /// Sets the value format and returns the configuration.
    pub fn with_value_format(mut self, value_format: ValueFormat) -> ChartConfig {
        self.value_format = value_format;
        self
    }

    /// Fixes the number of rows per page of horizontal bar charts and returns the configuration.
    pub fn with_items_per_page(mut self, items_per_page: usize) -> ChartConfig {
        self.items_per_page = Some(items_per_page);
        self
    }

    fn format(&self, value: f64) -> String {
        self.value_format.format(&self.locale, value)
    }
}

/// Shortens labels with more than 15 grapheme clusters to 13 clusters and an ellipsis.
///
/// ```
/// use rxreport::chart::truncate_label;
/// assert_eq!(truncate_label("Antibióticos"), "Antibióticos");
/// assert_eq!(truncate_label("Antiinflamatorios"), "Antiinflamato…");
/// ```
pub fn truncate_label(label: &str) -> String {
    let graphemes: Vec<&str> = label.graphemes(true).collect();
    if graphemes.len() > LABEL_MAX_LEN {
        let mut s: String = graphemes[..LABEL_KEEP_LEN].concat();
        s.push('…');
        s
    } else {
        label.to_owned()
    }
}

/// Returns the number of horizontal bars that fit into the given height.
pub fn items_per_page(available_height: Mm) -> usize {
    let rows = available_height.as_f64() / (BAR_HEIGHT + BAR_GAP);
    if rows.is_finite() && rows > 0.0 {
        rows.floor() as usize
    } else {
        0
    }
}

/// Splits `n` items into contiguous chunks of at most `per_page` items.
///
/// Returns no chunks if `n` or `per_page` is zero.
pub fn paginate(n: usize, per_page: usize) -> Vec<Range<usize>> {
    if per_page == 0 {
        return Vec::new();
    }
    (0..n)
        .step_by(per_page)
        .map(|start| start..(start + per_page).min(n))
        .collect()
}

/// The result of a chart layout that may span several pages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartPages {
    /// The numbers of the pages the chart was drawn on.
    pub pages: Vec<usize>,
    /// The rows of the dataset drawn on each page.
    pub chunks: Vec<Range<usize>>,
}

fn max_value(data: &[ChartDatum]) -> f64 {
    data.iter().map(|datum| datum.value).fold(0.0, f64::max)
}

/// Draws a column chart into the given box.
///
/// Every value gets a slot of equal width; the column covers 70% of the slot.  The columns are
/// scaled to the largest value and annotated with their value and label.
pub fn draw_vertical_bars<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    title: &str,
    data: &[ChartDatum],
    config: &ChartConfig,
) -> Result<(), Error> {
    let max = max_value(data);
    if data.is_empty() || max <= 0.0 {
        return geometry::no_data_panel(surface, rect, title);
    }

    let body = geometry::titled_panel(surface, rect, title)?;
    let axis_style = Style::new().with_font_size(7).with_color(palette::MUTED);
    let label_style = Style::new().with_font_size(7).with_color(palette::TEXT);
    let line_height = surface.line_height(axis_style);
    let plot = body.inset(Margins::trbl(
        line_height + Mm::from(1),
        0,
        line_height * 2.0,
        16,
    ));

    for i in 0..=GRID_DIVISIONS {
        let y = plot.bottom() - plot.height * (i as f64 / GRID_DIVISIONS as f64);
        surface.draw_line(
            &[Position::new(plot.x, y), Position::new(plot.right(), y)],
            palette::GRID,
            Mm::from(0.2),
        );
        let value = max * i as f64 / GRID_DIVISIONS as f64;
        let label_box = LayoutBox::new(body.x, y - line_height / 2.0, Mm::from(14), line_height);
        surface.draw_text_aligned(
            label_box,
            &config.locale.format_axis_value(value),
            axis_style,
            Alignment::Right,
        )?;
    }

    let slot = plot.width / data.len() as f64;
    let bar_width = slot * BAR_WIDTH_RATIO;
    for (idx, datum) in data.iter().enumerate() {
        let slot_box = LayoutBox::new(plot.x + slot * idx as f64, plot.y, slot, plot.height);
        let height = plot.height * (datum.value / max);
        let column = LayoutBox::new(
            slot_box.x + (slot - bar_width) / 2.0,
            plot.bottom() - height,
            bar_width,
            height,
        );
        geometry::bar(surface, column, datum.color, BarDirection::Vertical);

        let value = surface.fit_text(&config.format(datum.value), axis_style, slot);
        let value_offset = column.y - plot.y - line_height - Mm::from(0.5);
        let value_box = slot_box.translate((Mm::from(0), value_offset));
        surface.draw_text_aligned(value_box, &value, axis_style, Alignment::Center)?;
        let label = surface.fit_text(&truncate_label(&datum.label), label_style, slot);
        let label_box = slot_box.translate((Mm::from(0), plot.height + Mm::from(1.5)));
        surface.draw_text_aligned(label_box, &label, label_style, Alignment::Center)?;
    }
    Ok(())
}

/// Draws a horizontal bar chart at the cursor of the page flow, continuing on new pages as needed.
///
/// The rows per page are fixed by [`ChartConfig::items_per_page`][] or computed from the height of
/// an empty page.  The chart only uses the remaining space of the current page if the first chunk
/// fits into it.
///
/// # Errors
///
/// Returns a [`LayoutOverflow`][] error if not a single row fits on a page.
///
/// [`ChartConfig::items_per_page`]: struct.ChartConfig.html#structfield.items_per_page
/// [`LayoutOverflow`]: ../error/enum.ErrorKind.html#variant.LayoutOverflow
pub fn draw_horizontal_bars<S: Surface + ?Sized>(
    surface: &mut S,
    flow: &mut PageFlow,
    title: &str,
    data: &[ChartDatum],
    config: &ChartConfig,
) -> Result<ChartPages, Error> {
    if data.is_empty() {
        flow.ensure_space(surface, Mm::from(NO_DATA_HEIGHT))?;
        let rect = flow.content_box(Mm::from(NO_DATA_HEIGHT));
        geometry::no_data_panel(surface, rect, title)?;
        flow.advance(rect.height + Mm::from(SECTION_GAP));
        return Ok(ChartPages {
            pages: vec![flow.state().page_number],
            chunks: Vec::new(),
        });
    }

    let per_page = config
        .items_per_page
        .unwrap_or_else(|| items_per_page(flow.max_block_height() - Mm::from(HBAR_CHROME)));
    if per_page == 0 {
        return Err(Error::new(
            format!("Not a single row of the chart '{}' fits on a page", title),
            ErrorKind::LayoutOverflow,
        ));
    }

    let chunks = paginate(data.len(), per_page);
    let global_max = max_value(data);
    let mut pages = Vec::with_capacity(chunks.len());
    for (idx, chunk) in chunks.iter().enumerate() {
        let height = hbar_panel_height(chunk.len());
        if idx == 0 {
            flow.ensure_space(surface, height)?;
        } else {
            flow.new_page(surface, true)?;
        }

        let chunk_title = if chunks.len() > 1 && idx > 0 {
            format!("{} (continuación {}/{})", title, idx + 1, chunks.len())
        } else {
            title.to_owned()
        };
        let max = match config.axis_scale {
            AxisScale::Global => global_max,
            AxisScale::PerChunk => max_value(&data[chunk.clone()]),
        };
        let rect = flow.content_box(height);
        draw_bar_panel(surface, rect, &chunk_title, data, chunk.clone(), max, config)?;
        flow.advance(height + Mm::from(SECTION_GAP));
        pages.push(flow.state().page_number);
    }
    log::debug!(
        "Drew {} bars of '{}' on {} page(s)",
        data.len(),
        title,
        pages.len()
    );
    Ok(ChartPages { pages, chunks })
}

fn hbar_panel_height(rows: usize) -> Mm {
    Mm::from(HBAR_CHROME + (BAR_HEIGHT + BAR_GAP) * rows as f64)
}

fn draw_bar_panel<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    title: &str,
    data: &[ChartDatum],
    rows: Range<usize>,
    max: f64,
    config: &ChartConfig,
) -> Result<(), Error> {
    let body = geometry::titled_panel(surface, rect, title)?;
    let axis_style = Style::new().with_font_size(7).with_color(palette::MUTED);
    let label_style = Style::new().with_font_size(8).with_color(palette::TEXT);
    let value_style = Style::new().with_font_size(7).with_color(palette::TEXT).bold();

    let bar_x = body.x + Mm::from(HBAR_LABEL_WIDTH);
    let bar_area = (body.right() - bar_x - Mm::from(HBAR_VALUE_WIDTH)).max(Mm::from(0));
    let rows_top = body.y + Mm::from(AXIS_LABEL_HEIGHT);
    let rows_height = Mm::from(BAR_HEIGHT + BAR_GAP) * rows.len() as f64;

    for i in 0..=GRID_DIVISIONS {
        let x = bar_x + bar_area * (i as f64 / GRID_DIVISIONS as f64);
        surface.draw_line(
            &[
                Position::new(x, rows_top),
                Position::new(x, rows_top + rows_height),
            ],
            palette::GRID,
            Mm::from(0.2),
        );
        let value = max * i as f64 / GRID_DIVISIONS as f64;
        let label_box = LayoutBox::new(
            x - Mm::from(10),
            body.y,
            Mm::from(20),
            Mm::from(AXIS_LABEL_HEIGHT),
        );
        surface.draw_text_aligned(
            label_box,
            &config.locale.format_axis_value(value),
            axis_style,
            Alignment::Center,
        )?;
    }

    let label_height = surface.line_height(label_style);
    for (row, idx) in rows.clone().enumerate() {
        let datum = &data[idx];
        let y = rows_top + Mm::from(BAR_HEIGHT + BAR_GAP) * row as f64;
        let bar_y = y + Mm::from(BAR_GAP / 2.0);
        let text_y = bar_y + (Mm::from(BAR_HEIGHT) - label_height) / 2.0;

        let label = surface.fit_text(
            &truncate_label(&datum.label),
            label_style,
            Mm::from(HBAR_LABEL_WIDTH - 2.0),
        );
        surface.draw_text(Position::new(body.x, text_y), &label, label_style)?;

        let length = if max > 0.0 {
            bar_area * (datum.value / max).min(1.0)
        } else {
            Mm::from(0)
        };
        geometry::bar(
            surface,
            LayoutBox::new(bar_x, bar_y, length, BAR_HEIGHT),
            datum.color,
            BarDirection::Horizontal,
        );
        surface.draw_text(
            Position::new(bar_x + length + Mm::from(3), text_y),
            &config.format(datum.value),
            value_style,
        )?;

        let separator = y + Mm::from(BAR_HEIGHT + BAR_GAP);
        surface.draw_line(
            &[Position::new(body.x, separator), Position::new(body.right(), separator)],
            palette::GRID,
            Mm::from(0.1),
        );
    }

    let note_style = Style::new().with_font_size(7).with_color(palette::MUTED).italic();
    let note = format!(
        "Mostrando filas {}–{} de {}",
        rows.start + 1,
        rows.end,
        data.len()
    );
    surface.draw_text_aligned(
        LayoutBox::new(body.x, rows_top + rows_height + Mm::from(2), body.width, Mm::from(4)),
        &note,
        note_style,
        Alignment::Right,
    )
}

/// A slice of a pie chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieSlice {
    /// The start angle in radians.
    pub start: f64,
    /// The end angle in radians.
    pub end: f64,
    /// The share of the total, between 0 and 1.
    pub share: f64,
}

impl PieSlice {
    /// Returns the angular span of the slice.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Computes the slices of a pie chart, starting at the top and running clockwise.
///
/// Returns no slices if the total is zero.
pub fn pie_slices(values: &[f64]) -> Vec<PieSlice> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }
    let mut start = geometry::PIE_START_ANGLE;
    values
        .iter()
        .map(|value| {
            let share = value / total;
            let end = start + share * 2.0 * PI;
            let slice = PieSlice { start, end, share };
            start = end;
            slice
        })
        .collect()
}

/// Computes the legend percentages of the given values in tenths of a percent.
///
/// The percentages are rounded with the largest remainder method, so they add up to exactly
/// 100,0% if the total is positive.  Ties are broken in favor of earlier values.
pub fn legend_tenths(values: &[f64]) -> Vec<u64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return vec![0; values.len()];
    }
    let exact: Vec<f64> = values.iter().map(|value| value / total * 1000.0).collect();
    let mut tenths: Vec<u64> = exact.iter().map(|value| value.floor() as u64).collect();
    let assigned: u64 = tenths.iter().sum();
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    for &idx in order.iter().take(1000u64.saturating_sub(assigned) as usize) {
        tenths[idx] += 1;
    }
    tenths
}

/// The result of a pie chart layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PieSummary {
    /// The numbers of the pages the chart and its legend were drawn on.
    pub pages: Vec<usize>,
    /// The slices of the pie.
    pub slices: Vec<PieSlice>,
    /// The legend percentages in tenths of a percent.
    pub tenths: Vec<u64>,
}

/// Draws a pie chart with a legend at the cursor of the page flow.
///
/// Slices with a share above 10% are labelled with their percentage.  The legend lists every
/// value with its color, its percentage and its formatted value; its rows continue on new pages
/// if the current page is full.
pub fn draw_pie_chart<S: Surface + ?Sized>(
    surface: &mut S,
    flow: &mut PageFlow,
    title: &str,
    data: &[ChartDatum],
    config: &ChartConfig,
) -> Result<PieSummary, Error> {
    let values: Vec<f64> = data.iter().map(|datum| datum.value).collect();
    let slices = pie_slices(&values);
    if slices.is_empty() {
        flow.ensure_space(surface, Mm::from(NO_DATA_HEIGHT))?;
        let rect = flow.content_box(Mm::from(NO_DATA_HEIGHT));
        geometry::no_data_panel(surface, rect, title)?;
        flow.advance(rect.height + Mm::from(SECTION_GAP));
        return Ok(PieSummary {
            pages: vec![flow.state().page_number],
            ..Default::default()
        });
    }

    let mut pages = Vec::new();
    flow.ensure_space(surface, Mm::from(PIE_PANEL_HEIGHT + LEGEND_ROW_HEIGHT))?;
    pages.push(flow.state().page_number);
    let rect = flow.content_box(Mm::from(PIE_PANEL_HEIGHT));
    let body = geometry::titled_panel(surface, rect, title)?;
    let center = body.center();
    let radius = (body.height.min(body.width) / 2.0 - Mm::from(2)).max(Mm::from(0));

    for (slice, datum) in slices.iter().zip(data) {
        geometry::pie_wedge(
            surface,
            center,
            radius,
            slice.start,
            slice.end,
            datum.color,
            config.pie_steps,
        );
    }
    let label_style = Style::new().with_font_size(7).with_color(palette::TEXT).bold();
    for slice in slices.iter().filter(|slice| slice.share > PIE_LABEL_MIN_SHARE) {
        let angle = geometry::mid_angle(slice.start, slice.end);
        let anchor = crate::surface::point_on_circle(center, radius / 2.0, angle);
        let label_radius = Mm::from(5);
        surface.draw_circle(anchor, label_radius, Some(Color::WHITE), None);
        let height = surface.line_height(label_style);
        let line = LayoutBox::new(
            anchor.x - label_radius,
            anchor.y - height / 2.0,
            label_radius * 2.0,
            height,
        );
        let text = config.locale.format_percent((slice.share * 100.0).round(), 0);
        surface.draw_text_aligned(line, &text, label_style, Alignment::Center)?;
    }
    flow.advance(rect.height + Mm::from(2));

    let tenths = legend_tenths(&values);
    let style = Style::new().with_font_size(8).with_color(palette::TEXT);
    for (datum, tenth) in data.iter().zip(&tenths) {
        let row_height = Mm::from(LEGEND_ROW_HEIGHT);
        if flow.ensure_space(surface, row_height)? {
            pages.push(flow.state().page_number);
            let heading = Style::new().with_font_size(9).with_color(palette::TEXT).bold();
            let line = flow.content_box(row_height);
            surface.draw_text(line.position(), &format!("{} (continuación)", title), heading)?;
            flow.advance(row_height);
        }
        let line = flow.content_box(row_height).inset((0, 4));
        let swatch = LayoutBox::new(line.x, line.y + Mm::from(1), 4, 4);
        surface.draw_rect(swatch, Some(datum.color), None);
        let columns = line
            .inset(Margins::trbl(0, 0, 0, 7))
            .split_horizontally(&[3, 1, 2]);
        let label = surface.fit_text(&truncate_label(&datum.label), style, columns[0].width);
        surface.draw_text(columns[0].position(), &label, style)?;
        let percent = config.locale.format_percent(*tenth as f64 / 10.0, 1);
        surface.draw_text_aligned(columns[1], &percent, style, Alignment::Right)?;
        let value = config.format(datum.value);
        surface.draw_text_aligned(columns[2], &value, style, Alignment::Right)?;
        flow.advance(row_height);
    }
    flow.advance(Mm::from(SECTION_GAP));

    Ok(PieSummary {
        pages,
        slices,
        tenths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Decoration;
    use crate::surface::{DrawOp, RecordingSurface};
    use crate::PaperSize;

    fn setup() -> (RecordingSurface, PageFlow) {
        let mut surface = RecordingSurface::new();
        let mut flow = PageFlow::new(PaperSize::A4, Mm::from(15), Decoration::default());
        flow.new_page(&mut surface, true).unwrap();
        (surface, flow)
    }

    fn categories(n: usize) -> ChartDataset {
        dataset((0..n).map(|i| (format!("Categoría {}", i + 1), (n - i) as f64 * 10.0)))
    }

    #[test]
    fn labels_are_truncated_by_grapheme() {
        assert_eq!(truncate_label("Vitaminas"), "Vitaminas");
        assert_eq!(truncate_label("Dermatológicos1"), "Dermatológicos1");
        assert_eq!(truncate_label("Dermatológicos12"), "Dermatológico…");
        assert_eq!(truncate_label("Gastrointestinales").graphemes(true).count(), 14);
    }

    #[test]
    fn pagination_preserves_order() {
        assert_eq!(paginate(14, 10), vec![0..10, 10..14]);
        assert_eq!(paginate(10, 10), vec![0..10]);
        assert!(paginate(0, 10).is_empty());
        for (n, k) in [(1, 1), (7, 3), (30, 7), (100, 15)].iter() {
            let chunks = paginate(*n, *k);
            assert_eq!(chunks.len(), (n + k - 1) / k);
            let flat: Vec<usize> = chunks.into_iter().flatten().collect();
            assert_eq!(flat, (0..*n).collect::<Vec<_>>());
        }
        assert_eq!(items_per_page(Mm::from(140)), 10);
        assert_eq!(items_per_page(Mm::from(139.9)), 9);
        assert_eq!(items_per_page(Mm::from(-3)), 0);
    }

    #[test]
    fn pie_slices_cover_the_circle() {
        let slices = pie_slices(&[3.0, 1.0, 0.0, 6.0]);
        let total: f64 = slices.iter().map(PieSlice::span).sum();
        assert!((total - 2.0 * PI).abs() < 1e-9);
        assert!((slices[0].start + PI / 2.0).abs() < 1e-12);
        assert_eq!(slices[2].span(), 0.0);
        assert!(pie_slices(&[0.0, 0.0]).is_empty());
    }

    #[test]
    fn legend_percentages_add_up() {
        let tenths = legend_tenths(&[1.0, 1.0, 1.0]);
        assert_eq!(tenths, vec![334, 333, 333]);
        let tenths = legend_tenths(&[12.0, 7.0, 3.0, 3.0, 1.0, 9.0, 2.0]);
        assert_eq!(tenths.iter().sum::<u64>(), 1000);
        assert_eq!(legend_tenths(&[0.0, 0.0]), vec![0, 0]);
    }

    #[test]
    fn negative_values_are_clamped() {
        assert_eq!(ChartDatum::new("x", -5.0, Color::BLACK).value, 0.0);
        assert_eq!(ChartDatum::new("x", f64::NAN, Color::BLACK).value, 0.0);
    }

    #[test]
    fn fourteen_categories_span_two_pages() {
        let (mut surface, mut flow) = setup();
        let config = ChartConfig::default().with_items_per_page(10);
        let title = "Productos por categoría";
        let result =
            draw_horizontal_bars(&mut surface, &mut flow, title, &categories(14), &config).unwrap();
        assert_eq!(result.pages, vec![1, 2]);
        assert_eq!(result.chunks, vec![0..10, 10..14]);
        let first = surface.page(1).unwrap();
        let second = surface.page(2).unwrap();
        assert!(first.contains_text("Productos por categoría"));
        assert!(!first.contains_text("continuación"));
        assert!(second.contains_text("Productos por categoría (continuación 2/2)"));
        assert!(first.contains_text("Mostrando filas 1–10 de 14"));
        assert!(second.contains_text("Mostrando filas 11–14 de 14"));
        assert!(second.contains_text("Categoría 14"));
        assert!(!second.contains_text("Categoría 10"));
    }

    #[test]
    fn exactly_one_page_of_rows_is_not_paginated() {
        let (mut surface, mut flow) = setup();
        let config = ChartConfig::default().with_items_per_page(10);
        let result =
            draw_horizontal_bars(&mut surface, &mut flow, "Top", &categories(10), &config).unwrap();
        assert_eq!(result.pages, vec![1]);
        assert!(surface.page(1).unwrap().contains_text("Top"));
        assert!(!surface.page(1).unwrap().contains_text("continuación"));
    }

    fn bar_lengths(surface: &RecordingSurface, page: usize) -> Vec<f64> {
        // shadows and highlights never use a series color
        surface
            .page(page)
            .unwrap()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, fill: Some(fill), .. }
                    if palette::SERIES.contains(fill) && rect.height == Mm::from(BAR_HEIGHT) =>
                {
                    Some(rect.width.as_f64())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn axis_scale_controls_later_pages() {
        let data = categories(4);
        let config = ChartConfig::default().with_items_per_page(2);

        let (mut surface, mut flow) = setup();
        draw_horizontal_bars(&mut surface, &mut flow, "Global", &data, &config).unwrap();
        let first = bar_lengths(&surface, 1);
        let second = bar_lengths(&surface, 2);
        // values 40, 30 | 20, 10 share one axis
        assert!((second[0] / first[0] - 0.5).abs() < 1e-9);

        let config = ChartConfig {
            axis_scale: AxisScale::PerChunk,
            ..config
        };
        let (mut surface, mut flow) = setup();
        draw_horizontal_bars(&mut surface, &mut flow, "Por página", &data, &config).unwrap();
        let first = bar_lengths(&surface, 1);
        let second = bar_lengths(&surface, 2);
        assert!((second[0] - first[0]).abs() < 1e-9);
    }

    #[test]
    fn zero_rows_per_page_overflow() {
        let (mut surface, mut flow) = setup();
        let config = ChartConfig::default().with_items_per_page(0);
        let err = draw_horizontal_bars(&mut surface, &mut flow, "X", &categories(3), &config)
            .unwrap_err();
        assert!(err.is_layout_overflow());
    }

    #[test]
    fn empty_datasets_draw_a_placeholder() {
        let (mut surface, mut flow) = setup();
        let config = ChartConfig::default();
        let bars = draw_horizontal_bars(&mut surface, &mut flow, "Vacío", &[], &config).unwrap();
        assert!(bars.chunks.is_empty());
        let pie =
            draw_pie_chart(&mut surface, &mut flow, "Vacío", &categories(0), &config).unwrap();
        assert!(pie.slices.is_empty());
        draw_vertical_bars(&mut surface, LayoutBox::new(15, 200, 180, 60), "Vacío", &[], &config)
            .unwrap();
        let texts = surface.page(1).unwrap().texts();
        let placeholders = texts.iter().filter(|text| ***text == *geometry::NO_DATA_TEXT).count();
        assert_eq!(placeholders, 3);
    }

    #[test]
    fn pie_legend_continues_on_new_pages() {
        let (mut surface, mut flow) = setup();
        let config = ChartConfig::default();
        let data = categories(30);
        let summary = draw_pie_chart(&mut surface, &mut flow, "Stock", &data, &config).unwrap();
        assert_eq!(summary.tenths.iter().sum::<u64>(), 1000);
        assert_eq!(summary.pages, vec![1, 2]);
        assert!(surface.page(2).unwrap().contains_text("Stock (continuación)"));
        assert!(surface.page(2).unwrap().contains_text("Categoría 30"));
    }

    #[test]
    fn vertical_bars_are_scaled_to_the_maximum() {
        let (mut surface, _) = setup();
        let data = dataset(vec![("Lunes", 50.0), ("Martes", 100.0)]);
        let rect = LayoutBox::new(15, 40, 180, 80);
        draw_vertical_bars(&mut surface, rect, "Ventas", &data, &ChartConfig::default()).unwrap();
        let columns: Vec<LayoutBox> = surface
            .page(1)
            .unwrap()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, fill: Some(fill), .. } if palette::SERIES.contains(fill) => {
                    Some(*rect)
                }
                _ => None,
            })
            .collect();
        assert_eq!(columns.len(), 2);
        assert!((columns[1].height.as_f64() - 2.0 * columns[0].height.as_f64()).abs() < 1e-9);
        assert!((columns[0].bottom() - columns[1].bottom()).as_f64().abs() < 1e-9);
        assert!(rect.contains(&columns[1]));
        assert!(surface.page(1).unwrap().contains_text("Martes"));
    }
}
