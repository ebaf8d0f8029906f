// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Decorative shapes composed from surface primitives.
//!
//! The surfaces only know flat, opaque shapes.  This module builds the visual vocabulary of the
//! reports on top of them: color gradients made of bands, drop shadows, stat cards, bars with a
//! highlight stripe and pie wedges approximated by triangle fans.
//!
//! All functions draw on the current page of the surface and never change the page.

use std::f64::consts::PI;

use crate::error::Error;
use crate::locale::LocaleFormat;
use crate::style::{palette, Color, Style};
use crate::surface::{self, Alignment, Surface};
use crate::{LayoutBox, Margins, Mm, Position};

/// The default number of bands of a gradient.
pub const GRADIENT_STEPS: usize = 40;

/// The default number of triangles of a pie wedge.
pub const PIE_STEPS: usize = 36;

/// The offset of drop shadows to the right and to the bottom.
pub const SHADOW_OFFSET: f64 = 2.0;

/// The length of the diagonal strokes in the corners of a decorative border.
pub const CORNER_LENGTH: f64 = 5.0;

/// The height of the accent bar of a stat card.
pub const ACCENT_HEIGHT: f64 = 8.0;

/// The share of a bar that is covered by the highlight stripe.
pub const HIGHLIGHT_RATIO: f64 = 0.3;

const BAND_OVERLAP: f64 = 0.5;
const HIGHLIGHT_AMOUNT: f64 = 0.35;
const CARD_RADIUS: f64 = 3.0;

/// Fills the given box with a vertical gradient from `start` (top) to `end` (bottom).
///
/// The gradient is drawn as `steps` horizontal bands.  Every band overlaps its successor by half
/// a millimeter to avoid hairline gaps in PDF viewers; the last band is clipped to the box.
pub fn gradient_fill<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    start: Color,
    end: Color,
    steps: usize,
) {
    let steps = steps.max(1);
    let band_height = rect.height / steps as f64;
    for i in 0..steps {
        let color = start.lerp(end, i as f64 / steps as f64);
        let y = rect.y + band_height * i as f64;
        let height = (band_height + Mm::from(BAND_OVERLAP)).min(rect.bottom() - y);
        surface.draw_rect(LayoutBox::new(rect.x, y, rect.width, height), Some(color), None);
    }
}

/// Draws a frame along the edges of the given box with diagonal strokes across the corners.
pub fn decorative_border<S: Surface + ?Sized>(surface: &mut S, rect: LayoutBox, color: Color) {
    let thickness = Mm::from(0.5);
    let top_left = rect.position();
    let top_right = Position::new(rect.right(), rect.y);
    let bottom_right = Position::new(rect.right(), rect.bottom());
    let bottom_left = Position::new(rect.x, rect.bottom());
    surface.draw_line(
        &[top_left, top_right, bottom_right, bottom_left, top_left],
        color,
        thickness,
    );

    let corner = Mm::from(CORNER_LENGTH)
        .min(rect.width / 2.0)
        .min(rect.height / 2.0);
    let zero = Mm::from(0);
    let corners = [
        (top_left, corner, corner),
        (top_right, zero - corner, corner),
        (bottom_right, zero - corner, zero - corner),
        (bottom_left, corner, zero - corner),
    ];
    for (origin, dx, dy) in corners.iter() {
        surface.draw_line(
            &[
                Position::new(origin.x + *dx, origin.y),
                Position::new(origin.x, origin.y + *dy),
            ],
            color,
            thickness,
        );
    }
}

/// Draws a filled rounded rectangle above a gray shadow offset to the bottom right.
pub fn shadow_rect<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    radius: Mm,
    fill: Color,
    stroke: Option<Color>,
) {
    let shadow = rect.translate((SHADOW_OFFSET, SHADOW_OFFSET));
    surface.draw_rounded_rect(shadow, radius, Some(palette::SHADOW), None);
    surface.draw_rounded_rect(rect, radius, Some(fill), stroke);
}

/// The direction of a trend compared to a previous period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trend {
    /// The relative change in percent.
    pub percentage: f64,
    /// Whether the change is favorable.
    pub is_positive: bool,
}

impl Trend {
    /// Creates a trend from a relative change, treating growth as favorable.
    pub fn from_change(percentage: f64) -> Trend {
        Trend {
            percentage,
            is_positive: percentage >= 0.0,
        }
    }
}

/// A key figure shown on a card with a colored accent bar.
#[derive(Clone, Debug, PartialEq)]
pub struct StatCard {
    /// The caption of the card.
    pub title: String,
    /// The formatted value.
    pub value: String,
    /// The color of the accent bar.
    pub accent: Color,
    /// An optional trend marker.
    pub trend: Option<Trend>,
}

impl StatCard {
    /// Creates a new card without a trend marker.
    pub fn new(title: impl Into<String>, value: impl Into<String>, accent: Color) -> StatCard {
        StatCard {
            title: title.into(),
            value: value.into(),
            accent,
            trend: None,
        }
    }

    /// Adds a trend marker and returns the card.
    pub fn with_trend(mut self, trend: Trend) -> StatCard {
        self.trend = Some(trend);
        self
    }
}

/// Draws a stat card into the given box.
///
/// The card consists of a shadow, a white rounded background, an accent bar along the top with
/// the title, the large value and, if present, a trend triangle with the signed percentage.
pub fn stat_card<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    card: &StatCard,
    locale: &LocaleFormat,
) -> Result<(), Error> {
    let radius = Mm::from(CARD_RADIUS);
    shadow_rect(surface, rect, radius, Color::WHITE, Some(palette::GRID));
    let accent = rect.with_height(Mm::from(ACCENT_HEIGHT).min(rect.height));
    surface.draw_rounded_rect(accent, radius, Some(card.accent), None);
    // square off the lower corners of the accent bar
    let lower = accent.inset(Margins::trbl(accent.height / 2.0, 0, 0, 0));
    surface.draw_rect(lower, Some(card.accent), None);

    let inner = rect.inset((0, 4));
    let title_style = Style::new()
        .with_font_size(9)
        .with_color(Color::WHITE)
        .bold();
    let title = surface.fit_text(&card.title, title_style, inner.width);
    let title_y = accent.y + (accent.height - surface.line_height(title_style)) / 2.0;
    surface.draw_text(Position::new(inner.x, title_y), &title, title_style)?;

    let value_style = Style::new()
        .with_font_size(18)
        .with_color(palette::TEXT)
        .bold();
    let value = surface.fit_text(&card.value, value_style, inner.width);
    surface.draw_text(
        Position::new(inner.x, accent.bottom() + Mm::from(3)),
        &value,
        value_style,
    )?;

    if let Some(trend) = card.trend {
        let color = if trend.is_positive {
            palette::POSITIVE
        } else {
            palette::NEGATIVE
        };
        let style = Style::new().with_font_size(8).with_color(color).bold();
        let text = locale.format_signed_percent(trend.percentage);
        let height = surface.line_height(style);
        let line = LayoutBox::new(
            inner.x,
            rect.bottom() - height - Mm::from(2),
            inner.width,
            height,
        );
        surface.draw_text_aligned(line, &text, style, Alignment::Right)?;
        let size = Mm::from(2.5);
        let right = line.right() - surface.text_width(&text, style) - Mm::from(1.5);
        let marker = LayoutBox::new(right - size, line.y + (height - size) / 2.0, size, size);
        trend_marker(surface, marker, trend.percentage >= 0.0, color);
    }
    Ok(())
}

/// Draws a triangle pointing up or down that fills the given box.
pub fn trend_marker<S: Surface + ?Sized>(surface: &mut S, rect: LayoutBox, up: bool, color: Color) {
    let mid = rect.x + rect.width / 2.0;
    let points = if up {
        [
            Position::new(mid, rect.y),
            Position::new(rect.right(), rect.bottom()),
            Position::new(rect.x, rect.bottom()),
        ]
    } else {
        [
            Position::new(rect.x, rect.y),
            Position::new(rect.right(), rect.y),
            Position::new(mid, rect.bottom()),
        ]
    };
    surface.draw_polygon(&points, Some(color), None);
}

/// The direction in which a bar grows.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BarDirection {
    /// The bar grows upwards from a baseline; the highlight runs along its left side.
    Vertical,
    /// The bar grows to the right; the highlight runs along its top side.
    Horizontal,
}

/// Draws a bar with a drop shadow and a lighter highlight stripe.
///
/// Bars without an area are skipped.
pub fn bar<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    color: Color,
    direction: BarDirection,
) {
    if rect.width <= Mm::from(0) || rect.height <= Mm::from(0) {
        return;
    }
    surface.draw_rect(
        rect.translate((SHADOW_OFFSET, SHADOW_OFFSET)),
        Some(palette::SHADOW),
        None,
    );
    surface.draw_rect(rect, Some(color), None);
    let highlight = match direction {
        BarDirection::Vertical => {
            LayoutBox::new(rect.x, rect.y, rect.width * HIGHLIGHT_RATIO, rect.height)
        }
        BarDirection::Horizontal => rect.with_height(rect.height * HIGHLIGHT_RATIO),
    };
    surface.draw_rect(highlight, Some(color.lighten(HIGHLIGHT_AMOUNT)), None);
}

/// Draws a pie wedge between the angles `start` and `end` as a fan of `steps` triangles.
///
/// Angles are measured in radians, clockwise from the positive x axis.  A thin white separator is
/// stroked along both boundary radii.  Returns the number of triangles drawn.
pub fn pie_wedge<S: Surface + ?Sized>(
    surface: &mut S,
    center: Position,
    radius: Mm,
    start: f64,
    end: f64,
    color: Color,
    steps: usize,
) -> usize {
    if end <= start || radius <= Mm::from(0) {
        return 0;
    }
    let steps = steps.max(1);
    let step = (end - start) / steps as f64;
    for i in 0..steps {
        let a0 = start + step * i as f64;
        let a1 = if i + 1 == steps { end } else { a0 + step };
        surface.draw_polygon(
            &[
                center,
                surface::point_on_circle(center, radius, a0),
                surface::point_on_circle(center, radius, a1),
            ],
            Some(color),
            None,
        );
    }
    let separator = Mm::from(0.4);
    for angle in [start, end].iter() {
        surface.draw_line(
            &[center, surface::point_on_circle(center, radius, *angle)],
            Color::WHITE,
            separator,
        );
    }
    steps
}

/// Returns the angle halfway between two angles.
pub fn mid_angle(start: f64, end: f64) -> f64 {
    start + (end - start) / 2.0
}

/// The start angle of pie charts, pointing straight up.
pub const PIE_START_ANGLE: f64 = -PI / 2.0;

/// Draws the placeholder panel shown instead of a chart without data.
pub fn no_data_panel<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    title: &str,
) -> Result<(), Error> {
    let radius = Mm::from(CARD_RADIUS);
    surface.draw_rounded_rect(rect, radius, Some(palette::PANEL), Some(palette::GRID));
    let title_style = Style::new()
        .with_font_size(12)
        .with_color(palette::TEXT)
        .bold();
    let inner = rect.inset(4);
    let title = surface.fit_text(title, title_style, inner.width);
    surface.draw_text(inner.position(), &title, title_style)?;

    let style = Style::new().with_font_size(11).with_color(palette::MUTED).italic();
    let height = surface.line_height(style);
    let line = LayoutBox::new(
        rect.x,
        rect.y + (rect.height - height) / 2.0,
        rect.width,
        height,
    );
    surface.draw_text_aligned(line, NO_DATA_TEXT, style, Alignment::Center)
}

/// The caption of the no-data panel.
pub const NO_DATA_TEXT: &str = "Sin datos disponibles";

/// Draws a rounded panel background with a title and returns the box below the title.
pub fn titled_panel<S: Surface + ?Sized>(
    surface: &mut S,
    rect: LayoutBox,
    title: &str,
) -> Result<LayoutBox, Error> {
    let radius = Mm::from(CARD_RADIUS);
    surface.draw_rounded_rect(rect, radius, Some(palette::PANEL), Some(palette::GRID));
    let style = Style::new()
        .with_font_size(12)
        .with_color(palette::TEXT)
        .bold();
    let inner = rect.inset(4);
    let title = surface.fit_text(title, style, inner.width);
    surface.draw_text(inner.position(), &title, style)?;
    let offset = surface.line_height(style) + Mm::from(3);
    Ok(inner.inset(Margins::trbl(offset, 0, 0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};
    use crate::PaperSize;

    fn surface() -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        surface.add_page(PaperSize::A4.into());
        surface
    }

    fn rects(surface: &RecordingSurface) -> Vec<(LayoutBox, Option<Color>)> {
        surface
            .page(1)
            .unwrap()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, fill, .. } => Some((*rect, *fill)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn gradient_bands_stay_inside_and_cover_the_box() {
        let mut surface = surface();
        let rect = LayoutBox::new(0, 0, 210, 40);
        gradient_fill(&mut surface, rect, palette::PRIMARY, palette::PRIMARY_LIGHT, GRADIENT_STEPS);
        let bands = rects(&surface);
        assert_eq!(bands.len(), GRADIENT_STEPS);
        assert!(bands.iter().all(|(band, _)| rect.contains(band)));
        assert_eq!(bands[0].1, Some(palette::PRIMARY));
        for pair in bands.windows(2) {
            assert!(pair[0].0.bottom() >= pair[1].0.y);
        }
        assert!((bands[GRADIENT_STEPS - 1].0.bottom() - rect.bottom()).as_f64().abs() < 1e-9);
    }

    #[test]
    fn border_lines_stay_inside() {
        let mut surface = surface();
        let rect = LayoutBox::new(10, 10, 190, 277);
        decorative_border(&mut surface, rect, palette::PRIMARY);
        let ops = &surface.page(1).unwrap().ops;
        assert_eq!(ops.len(), 5);
        for op in ops {
            match op {
                DrawOp::Line { points, .. } => {
                    for point in points {
                        assert!(rect.contains(&LayoutBox::from_parts(*point, Default::default())));
                    }
                }
                op => panic!("Unexpected draw call {:?}", op),
            }
        }
    }

    #[test]
    fn bar_highlight_covers_thirty_percent() {
        let mut surface = surface();
        bar(&mut surface, LayoutBox::new(10, 10, 20, 50), palette::NORMAL, BarDirection::Vertical);
        let drawn = rects(&surface);
        assert_eq!(drawn.len(), 3);
        assert_eq!(drawn[0].0, LayoutBox::new(12, 12, 20, 50));
        assert_eq!(drawn[2].0.width, Mm::from(6));
        assert_eq!(drawn[2].1, Some(palette::NORMAL.lighten(HIGHLIGHT_AMOUNT)));

        let mut surface = self::surface();
        bar(&mut surface, LayoutBox::new(10, 10, 0, 8), palette::NORMAL, BarDirection::Horizontal);
        assert!(rects(&surface).is_empty());
    }

    #[test]
    fn pie_wedge_is_a_triangle_fan() {
        let mut surface = surface();
        let center = Position::new(100, 100);
        let triangles = pie_wedge(&mut surface, center, Mm::from(40), 0.0, PI, palette::HIGH, 36);
        assert_eq!(triangles, 36);
        let ops = &surface.page(1).unwrap().ops;
        let polygons: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Polygon { points, .. } => Some(points.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(polygons.len(), 36);
        assert!(polygons.iter().all(|points| points.len() == 3 && points[0] == center));
        let last = &polygons[35][2];
        assert!((last.x - Mm::from(60)).as_f64().abs() < 1e-9);
        assert_eq!(ops.len(), 38);
        assert_eq!(pie_wedge(&mut surface, center, Mm::from(40), 1.0, 1.0, palette::HIGH, 36), 0);
    }

    #[test]
    fn stat_card_draws_title_value_and_trend() {
        let mut surface = surface();
        let card = StatCard::new("Valor del inventario", "$12.500,00", palette::PRIMARY)
            .with_trend(Trend::from_change(-4.3));
        stat_card(&mut surface, LayoutBox::new(15, 40, 85, 32), &card, &LocaleFormat::default())
            .unwrap();
        let page = surface.page(1).unwrap();
        assert_eq!(page.texts(), vec!["Valor del inventario", "$12.500,00", "-4,3%"]);
        let marker = page.ops.iter().rev().find_map(|op| match op {
            DrawOp::Polygon { points, fill, .. } if points.len() == 3 => {
                Some((points.clone(), *fill))
            }
            _ => None,
        });
        let (points, fill) = marker.unwrap();
        assert_eq!(fill, Some(palette::NEGATIVE));
        // a downward triangle has its apex at the bottom
        assert!(points[2].y > points[0].y);
    }

    #[test]
    fn no_data_panel_shows_caption() {
        let mut surface = surface();
        no_data_panel(&mut surface, LayoutBox::new(15, 40, 180, 80), "Ventas por día").unwrap();
        assert!(surface.page(1).unwrap().contains_text(NO_DATA_TEXT));
    }
}
