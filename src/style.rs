// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Colors, text styles and styled strings.
//!
//! A [`Style`][] is a combination of a font size, a [`Color`][] and a combination of
//! [`Effect`][]s (bold or italic).  A [`StyledString`][] is a [`String`][] with a [`Style`][]
//! annotation; table cells use it to mark emphasized values.
//!
//! # Example
//!
//! ```
//! use rxreport::style;
//! let style = style::Style::new().bold();
//! let ss1 = style::StyledString::new("bold", style);
//! let ss2 = style::StyledString::new("red", style::Color::Rgb(255, 0, 0));
//! ```
//!
//! [`Color`]: enum.Color.html
//! [`Effect`]: enum.Effect.html
//! [`Style`]: struct.Style.html
//! [`StyledString`]: struct.StyledString.html
//! [`String`]: https://doc.rust-lang.org/std/string/struct.String.html

use serde::{Deserialize, Serialize};

use crate::fonts;
use crate::Mm;

/// A color, represented by RGB, CMYK or Greyscale values.
///
/// For all variants, the possible values range from 0 to 255.
///
/// # Examples
///
/// ```
/// let red = rxreport::style::Color::Rgb(255, 0, 0);
/// let cyan = rxreport::style::Color::Cmyk(255, 0, 0, 0);
/// let grey = rxreport::style::Color::Greyscale(127);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// An RGB color with red, green and blue values between 0 and 255.
    Rgb(u8, u8, u8),
    /// An CMYK color with cyan, magenta, yellow and key values between 0 and 255.
    Cmyk(u8, u8, u8, u8),
    /// A greyscale color with a value between 0 and 255.
    Greyscale(u8),
}

impl Color {
    /// Pure white.
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    /// Pure black.
    pub const BLACK: Color = Color::Rgb(0, 0, 0);

    /// Returns the red, green and blue channels of this color.
    ///
    /// CMYK values are converted naively without a color profile.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Rgb(r, g, b) => (r, g, b),
            Color::Greyscale(val) => (val, val, val),
            Color::Cmyk(c, m, y, k) => {
                let k = 1.0 - f64::from(k) / 255.0;
                let channel = |v: u8| ((1.0 - f64::from(v) / 255.0) * k * 255.0).round() as u8;
                (channel(c), channel(m), channel(y))
            }
        }
    }

    /// Linearly interpolates every RGB channel between this color and `other`.
    ///
    /// `t = 0` yields this color, `t = 1` yields `other`.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.max(0.0).min(1.0);
        let (r0, g0, b0) = self.to_rgb();
        let (r1, g1, b1) = other.to_rgb();
        let channel =
            |c0: u8, c1: u8| (f64::from(c0) + t * (f64::from(c1) - f64::from(c0))).round() as u8;
        Color::Rgb(channel(r0, r1), channel(g0, g1), channel(b0, b1))
    }

    /// Blends this color towards white.
    ///
    /// This is how translucent white overlays are drawn, as the surfaces only paint opaque
    /// colors.
    pub fn lighten(self, amount: f64) -> Color {
        self.lerp(Color::WHITE, amount)
    }
}

impl From<Color> for printpdf::Color {
    fn from(color: Color) -> printpdf::Color {
        match color {
            Color::Rgb(r, g, b) => printpdf::Color::Rgb(printpdf::Rgb::new(
                f64::from(r) / 255.0,
                f64::from(g) / 255.0,
                f64::from(b) / 255.0,
                None,
            )),
            Color::Cmyk(c, m, y, k) => printpdf::Color::Cmyk(printpdf::Cmyk::new(
                f64::from(c) / 255.0,
                f64::from(m) / 255.0,
                f64::from(y) / 255.0,
                f64::from(k) / 255.0,
                None,
            )),
            Color::Greyscale(val) => {
                printpdf::Color::Greyscale(printpdf::Greyscale::new(f64::from(val) / 255.0, None))
            }
        }
    }
}

/// A text effect (bold or italic).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Bold text.
    Bold,
    /// Italic text.
    Italic,
}

/// A style annotation for a string.
///
/// The annotation consists of:
/// - a font size in points (defaults to 10)
/// - a fill color for the text, see [`Color`][] (defaults to black)
/// - a combination of text effects, see [`Effect`][] (defaults to none)
///
/// All properties are optional.  If they are not set, they can be inferred from parent styles or
/// from the defaults.
///
/// [`Color`]: enum.Color.html
/// [`Effect`]: enum.Effect.html
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Style {
    font_size: Option<u8>,
    color: Option<Color>,
    is_bold: bool,
    is_italic: bool,
}

impl Style {
    /// Creates a new style without settings.
    pub fn new() -> Style {
        Style::default()
    }

    /// Merges the given style into this style.
    pub fn merge(&mut self, style: impl Into<Style>) {
        let style = style.into();
        if let Some(font_size) = style.font_size {
            self.font_size = Some(font_size);
        }
        if let Some(color) = style.color {
            self.color = Some(color);
        }
        if style.is_bold {
            self.is_bold = true;
        }
        if style.is_italic {
            self.is_italic = true;
        }
    }

    /// Combines this style and the given style and returns the result.
    pub fn and(mut self, style: impl Into<Style>) -> Style {
        self.merge(style);
        self
    }

    /// Returns the text color for this style, if set.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns whether the bold text effect is set.
    pub fn is_bold(&self) -> bool {
        self.is_bold
    }

    /// Returns whether the italic text effect is set.
    pub fn is_italic(&self) -> bool {
        self.is_italic
    }

    /// Returns the font size for this style in points, or 10 if no font size is set.
    pub fn font_size(&self) -> u8 {
        self.font_size.unwrap_or(10)
    }

    /// Sets the bold effect for this style.
    pub fn set_bold(&mut self) {
        self.is_bold = true;
    }

    /// Sets the bold effect for this style and returns it.
    pub fn bold(mut self) -> Style {
        self.set_bold();
        self
    }

    /// Sets the italic effect for this style.
    pub fn set_italic(&mut self) {
        self.is_italic = true;
    }

    /// Sets the italic effect for this style and returns it.
    pub fn italic(mut self) -> Style {
        self.set_italic();
        self
    }

    /// Sets the font size in points for this style.
    pub fn set_font_size(&mut self, font_size: u8) {
        self.font_size = Some(font_size);
    }

    /// Sets the font size in points for this style and returns it.
    pub fn with_font_size(mut self, font_size: u8) -> Style {
        self.set_font_size(font_size);
        self
    }

    /// Sets the text color for this style.
    pub fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }

    /// Sets the text color for this style and returns it.
    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    /// Calculates the width of the given string with this style using the given font cache.
    pub fn str_width(&self, font_cache: &fonts::FontCache, s: &str) -> Mm {
        self.font(font_cache)
            .str_width(font_cache, s, self.font_size())
    }

    /// Returns the font for this style using the given font cache.
    pub fn font(&self, font_cache: &fonts::FontCache) -> fonts::Font {
        font_cache.font_family().get(*self)
    }

    /// Calculates the line height for strings with this style using the given font cache.
    pub fn line_height(&self, font_cache: &fonts::FontCache) -> Mm {
        self.font(font_cache).get_line_height(self.font_size())
    }
}

impl From<Color> for Style {
    fn from(color: Color) -> Style {
        Style::new().with_color(color)
    }
}

impl From<Effect> for Style {
    fn from(effect: Effect) -> Style {
        let style = Style::new();
        match effect {
            Effect::Bold => style.bold(),
            Effect::Italic => style.italic(),
        }
    }
}

/// A [`String`][] with a [`Style`][] annotation.
///
/// # Example
///
/// ```
/// use rxreport::style;
/// let ss1 = style::StyledString::new("bold".to_owned(), style::Effect::Bold);
/// let ss2 = style::StyledString::new("red".to_owned(), style::Color::Rgb(255, 0, 0));
/// ```
///
/// [`Style`]: struct.Style.html
/// [`String`]: https://doc.rust-lang.org/std/string/struct.String.html
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyledString {
    /// The annotated string.
    pub s: String,
    /// The style annotation.
    pub style: Style,
}

impl StyledString {
    /// Creates a new styled string from the given string and style.
    pub fn new(s: impl Into<String>, style: impl Into<Style>) -> StyledString {
        StyledString {
            s: s.into(),
            style: style.into(),
        }
    }
}

impl From<String> for StyledString {
    fn from(s: String) -> StyledString {
        StyledString::new(s, Style::new())
    }
}

impl<'a> From<&'a str> for StyledString {
    fn from(s: &'a str) -> StyledString {
        StyledString::from(s.to_owned())
    }
}

/// The colors shared by all report pages.
pub mod palette {
    use super::Color;

    /// The primary brand color used for headers and table heads.
    pub const PRIMARY: Color = Color::Rgb(22, 96, 136);
    /// The lighter end of the header gradient.
    pub const PRIMARY_LIGHT: Color = Color::Rgb(58, 160, 190);
    /// The accent color of the cover page.
    pub const ACCENT: Color = Color::Rgb(0, 150, 136);
    /// Dark text.
    pub const TEXT: Color = Color::Rgb(44, 62, 80);
    /// Secondary text such as axis labels and footers.
    pub const MUTED: Color = Color::Rgb(127, 140, 141);
    /// Grid lines and separators.
    pub const GRID: Color = Color::Rgb(220, 224, 228);
    /// Panel backgrounds.
    pub const PANEL: Color = Color::Rgb(248, 249, 250);
    /// Drop shadows.
    pub const SHADOW: Color = Color::Rgb(200, 200, 200);
    /// Positive trends and healthy stock.
    pub const POSITIVE: Color = Color::Rgb(39, 174, 96);
    /// Negative trends and flagged values.
    pub const NEGATIVE: Color = Color::Rgb(231, 76, 60);
    /// Stock at or below half of the reorder level.
    pub const CRITICAL: Color = Color::Rgb(192, 57, 43);
    /// Stock at or below the reorder level.
    pub const LOW: Color = Color::Rgb(243, 156, 18);
    /// Stock up to twice the reorder level.
    pub const NORMAL: Color = Color::Rgb(52, 152, 219);
    /// Stock above twice the reorder level.
    pub const HIGH: Color = Color::Rgb(39, 174, 96);

    /// Colors assigned to chart categories in order.
    pub const SERIES: [Color; 10] = [
        Color::Rgb(52, 152, 219),
        Color::Rgb(46, 204, 113),
        Color::Rgb(155, 89, 182),
        Color::Rgb(241, 196, 15),
        Color::Rgb(230, 126, 34),
        Color::Rgb(231, 76, 60),
        Color::Rgb(26, 188, 156),
        Color::Rgb(52, 73, 94),
        Color::Rgb(236, 112, 160),
        Color::Rgb(149, 165, 166),
    ];

    /// Returns the series color for the category with the given index.
    pub fn series(idx: usize) -> Color {
        SERIES[idx % SERIES.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_interpolates_each_channel() {
        let start = Color::Rgb(0, 100, 200);
        let end = Color::Rgb(100, 200, 0);
        assert_eq!(start.lerp(end, 0.0), start);
        assert_eq!(start.lerp(end, 1.0), end);
        assert_eq!(start.lerp(end, 0.5), Color::Rgb(50, 150, 100));
    }

    #[test]
    fn lighten_moves_towards_white() {
        assert_eq!(Color::Rgb(0, 0, 0).lighten(1.0), Color::WHITE);
        assert_eq!(Color::Greyscale(100).lighten(0.0), Color::Rgb(100, 100, 100));
    }

    #[test]
    fn merge_keeps_effects() {
        let style = Style::new().bold().and(Style::new().with_font_size(14));
        assert!(style.is_bold());
        assert_eq!(style.font_size(), 14);
        assert_eq!(style.color(), None);
    }
}
