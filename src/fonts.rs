// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Fonts, font families and a font cache.
//!
//! The [`FontCache`][] holds the font family used by a report.  By default, reports are set in the
//! built-in PDF font Helvetica, which needs no font files and covers the Windows-1252 character
//! set.  If the report options name a font directory, a TrueType family is loaded from it instead
//! and embedded into the PDF document.
//!
//! # Internals
//!
//! Text is measured before it is drawn so that labels can be centered and truncated.  For
//! TrueType fonts, a [`rusttype::Font`][] provides the glyph metrics.  For the built-in fonts, the
//! advance widths of the printable ASCII characters are taken from the Helvetica AFM metrics.
//! Once the PDF document is created, a [`printpdf::IndirectFontRef`][] is registered for every
//! font with [`FontCache::load_pdf_fonts`][].
//!
//! [`FontCache`]: struct.FontCache.html
//! [`FontCache::load_pdf_fonts`]: struct.FontCache.html#method.load_pdf_fonts
//! [`rusttype::Font`]: https://docs.rs/rusttype/0.8.3/rusttype/struct.Font.html
//! [`printpdf::IndirectFontRef`]: https://docs.rs/printpdf/0.3.2/printpdf/types/plugins/graphics/two_dimensional/font/struct.IndirectFontRef.html

use std::fmt;
use std::fs;
use std::path;

use crate::error::{Error, ErrorKind};
use crate::render;
use crate::style::Style;
use crate::Mm;

/// Advance widths of the Helvetica characters from ` ` (0x20) to `~` (0x7e) in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0' - '?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@' - 'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P' - '_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`' - 'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p' - '~'
];

/// Width used for characters outside of the ASCII table, in 1/1000 em.
const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// Helvetica Bold is slightly wider than the regular cut.
const HELVETICA_BOLD_FACTOR: f64 = 1.06;

/// Stores the fonts of a report and their PDF references.
///
/// If you use the high-level interface provided by [`generate_report`][], you don’t have to
/// access this type.  See the [module documentation](index.html) for details on the internals.
///
/// [`generate_report`]: ../fn.generate_report.html
#[derive(Debug)]
pub struct FontCache {
    fonts: Vec<FontData>,
    pdf_fonts: Vec<printpdf::IndirectFontRef>,
    family: FontFamily<Font>,
}

impl FontCache {
    /// Creates a new font cache that uses the built-in Helvetica fonts.
    pub fn builtin() -> FontCache {
        let fonts = vec![
            FontData::Builtin(BuiltinFont::Helvetica),
            FontData::Builtin(BuiltinFont::HelveticaBold),
            FontData::Builtin(BuiltinFont::HelveticaOblique),
            FontData::Builtin(BuiltinFont::HelveticaBoldOblique),
        ];
        let family = FontFamily {
            regular: Font::builtin(0, BuiltinFont::Helvetica),
            bold: Font::builtin(1, BuiltinFont::HelveticaBold),
            italic: Font::builtin(2, BuiltinFont::HelveticaOblique),
            bold_italic: Font::builtin(3, BuiltinFont::HelveticaBoldOblique),
        };
        FontCache {
            fonts,
            pdf_fonts: Vec::new(),
            family,
        }
    }

    /// Creates a new font cache and loads the TrueType font family with the given name from the
    /// given directory.
    ///
    /// This method assumes that in the given directory, these files exist and are valid font
    /// files:
    /// - `{name}-Regular.ttf`
    /// - `{name}-Bold.ttf`
    /// - `{name}-Italic.ttf`
    /// - `{name}-BoldItalic.ttf`
    pub fn new(dir: impl AsRef<path::Path>, name: &str) -> Result<FontCache, Error> {
        let mut font_cache = FontCache::builtin();
        font_cache.fonts.clear();
        let dir = dir.as_ref();
        font_cache.family = FontFamily {
            regular: font_cache.load_font(&dir.join(format!("{}-Regular.ttf", name)))?,
            bold: font_cache.load_font(&dir.join(format!("{}-Bold.ttf", name)))?,
            italic: font_cache.load_font(&dir.join(format!("{}-Italic.ttf", name)))?,
            bold_italic: font_cache.load_font(&dir.join(format!("{}-BoldItalic.ttf", name)))?,
        };
        Ok(font_cache)
    }

    fn load_font(&mut self, path: &path::Path) -> Result<Font, Error> {
        let data = fs::read(path).map_err(|err| {
            Error::new(format!("Failed to read font file {}", path.display()), err)
        })?;
        let rt_font = rusttype::Font::from_bytes(data.clone()).map_err(|err| {
            Error::new(
                format!("Failed to load rusttype font from file {}", path.display()),
                err,
            )
        })?;
        let font = Font::embedded(self.fonts.len(), &rt_font)?;
        log::debug!("Loaded font {}", path.display());
        self.fonts.push(FontData::Embedded { rt_font, data });
        Ok(font)
    }

    /// Registers all fonts with the document generated by the given renderer and caches a
    /// reference to them.
    pub fn load_pdf_fonts(&mut self, renderer: &render::Renderer) -> Result<(), Error> {
        self.pdf_fonts.clear();
        for font in &self.fonts {
            let pdf_font = match font {
                FontData::Builtin(builtin) => renderer.add_builtin_font((*builtin).into())?,
                FontData::Embedded { data, .. } => renderer.add_embedded_font(data)?,
            };
            self.pdf_fonts.push(pdf_font);
        }
        Ok(())
    }

    /// Returns the font family of this font cache.
    pub fn font_family(&self) -> FontFamily<Font> {
        self.family
    }

    /// Returns a reference to the PDF font for the given font, if available.
    ///
    /// PDF fonts are only available once [`load_pdf_fonts`][] has been called.
    ///
    /// [`load_pdf_fonts`]: #method.load_pdf_fonts
    pub fn get_pdf_font(&self, font: Font) -> Option<&printpdf::IndirectFontRef> {
        self.pdf_fonts.get(font.idx)
    }

    fn get_rt_font(&self, font: Font) -> Option<&rusttype::Font<'static>> {
        match self.fonts.get(font.idx) {
            Some(FontData::Embedded { rt_font, .. }) => Some(rt_font),
            _ => None,
        }
    }
}

impl Default for FontCache {
    fn default() -> FontCache {
        FontCache::builtin()
    }
}

enum FontData {
    Builtin(BuiltinFont),
    Embedded {
        rt_font: rusttype::Font<'static>,
        data: Vec<u8>,
    },
}

impl fmt::Debug for FontData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontData::Builtin(builtin) => write!(f, "Builtin({:?})", builtin),
            FontData::Embedded { data, .. } => write!(f, "Embedded({} bytes)", data.len()),
        }
    }
}

/// The built-in PDF fonts used by default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuiltinFont {
    /// Helvetica.
    Helvetica,
    /// Helvetica Bold.
    HelveticaBold,
    /// Helvetica Oblique.
    HelveticaOblique,
    /// Helvetica Bold Oblique.
    HelveticaBoldOblique,
}

impl BuiltinFont {
    fn is_bold(self) -> bool {
        matches!(
            self,
            BuiltinFont::HelveticaBold | BuiltinFont::HelveticaBoldOblique
        )
    }
}

impl From<BuiltinFont> for printpdf::BuiltinFont {
    fn from(font: BuiltinFont) -> printpdf::BuiltinFont {
        match font {
            BuiltinFont::Helvetica => printpdf::BuiltinFont::Helvetica,
            BuiltinFont::HelveticaBold => printpdf::BuiltinFont::HelveticaBold,
            BuiltinFont::HelveticaOblique => printpdf::BuiltinFont::HelveticaOblique,
            BuiltinFont::HelveticaBoldOblique => printpdf::BuiltinFont::HelveticaBoldOblique,
        }
    }
}

/// A collection of fonts with different styles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontFamily<T: Clone + Copy + fmt::Debug + PartialEq> {
    /// The regular variant of this font family.
    pub regular: T,
    /// The bold variant of this font family.
    pub bold: T,
    /// The italic variant of this font family.
    pub italic: T,
    /// The bold italic variant of this font family.
    pub bold_italic: T,
}

impl<T: Clone + Copy + fmt::Debug + PartialEq> FontFamily<T> {
    /// Returns the font for the given style.
    pub fn get(&self, style: Style) -> T {
        if style.is_bold() && style.is_italic() {
            self.bold_italic
        } else if style.is_bold() {
            self.bold
        } else if style.is_italic() {
            self.italic
        } else {
            self.regular
        }
    }
}

/// A reference to a font stored in a [`FontCache`][].
///
/// [`FontCache`]: struct.FontCache.html
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    idx: usize,
    builtin: Option<BuiltinFont>,
    scale: f32,
    line_height: Mm,
    glyph_height: Mm,
}

impl Font {
    fn builtin(idx: usize, builtin: BuiltinFont) -> Font {
        // Helvetica: ascender 718, descender -207, with the customary 15% leading.
        let glyph_height = 0.925;
        Font {
            idx,
            builtin: Some(builtin),
            scale: 1000.0,
            line_height: printpdf::Pt(glyph_height * 1.15).into(),
            glyph_height: printpdf::Pt(glyph_height).into(),
        }
    }

    fn embedded(idx: usize, rt_font: &rusttype::Font<'static>) -> Result<Font, Error> {
        let scale = rt_font.units_per_em();
        if scale == 0 {
            return Err(Error::new(
                "The font is not scalable",
                ErrorKind::InvalidFont,
            ));
        }
        let scale = f32::from(scale);
        let v_metrics = rt_font.v_metrics_unscaled() * (1.0 / scale);
        let glyph_height = v_metrics.ascent - v_metrics.descent;
        let line_height = glyph_height + v_metrics.line_gap;
        Ok(Font {
            idx,
            builtin: None,
            scale,
            line_height: printpdf::Pt(f64::from(line_height)).into(),
            glyph_height: printpdf::Pt(f64::from(glyph_height)).into(),
        })
    }

    /// Returns whether this is one of the built-in PDF fonts.
    pub fn is_builtin(&self) -> bool {
        self.builtin.is_some()
    }

    /// Returns the line height for text with this font and the given font size.
    pub fn get_line_height(&self, font_size: u8) -> Mm {
        self.line_height * f64::from(font_size)
    }

    /// Returns the glyph height for text with this font and the given font size.
    pub fn glyph_height(&self, font_size: u8) -> Mm {
        self.glyph_height * f64::from(font_size)
    }

    /// Returns the width of a character with this font and the given font size.
    ///
    /// The given [`FontCache`][] must be the font cache that created this font.
    ///
    /// [`FontCache`]: struct.FontCache.html
    pub fn char_width(&self, font_cache: &FontCache, c: char, font_size: u8) -> Mm {
        let units = if let Some(builtin) = self.builtin {
            let idx = (c as u32).wrapping_sub(0x20) as usize;
            let width = f64::from(
                HELVETICA_WIDTHS
                    .get(idx)
                    .copied()
                    .unwrap_or(HELVETICA_DEFAULT_WIDTH),
            );
            if builtin.is_bold() {
                width * HELVETICA_BOLD_FACTOR
            } else {
                width
            }
        } else {
            font_cache
                .get_rt_font(*self)
                .and_then(|font| font.glyph(c).standalone().get_data())
                .map(|data| f64::from(data.unit_h_metrics.advance_width))
                .unwrap_or(0.0)
        };
        let width = units / f64::from(self.scale) * f64::from(font_size);
        Mm::from(printpdf::Pt(width))
    }

    /// Returns the width of a string with this font and the given font size.
    ///
    /// The given [`FontCache`][] must be the font cache that created this font.
    ///
    /// [`FontCache`]: struct.FontCache.html
    pub fn str_width(&self, font_cache: &FontCache, s: &str, font_size: u8) -> Mm {
        s.chars()
            .map(|c| self.char_width(font_cache, c, font_size))
            .sum()
    }

    /// Returns the glyph IDs of the given characters in this font.
    ///
    /// Built-in fonts have no glyph IDs, an empty vector is returned for them.
    pub fn glyph_ids(
        &self,
        font_cache: &FontCache,
        iter: impl IntoIterator<Item = char>,
    ) -> Vec<u16> {
        match font_cache.get_rt_font(*self) {
            Some(font) => iter
                .into_iter()
                .map(|c| font.glyph(c).id().0 as u16)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_widths_follow_helvetica_metrics() {
        let cache = FontCache::builtin();
        let font = cache.font_family().regular;
        // "0" is 556/1000 em; at 10pt that is 5.56pt.
        let expected: Mm = printpdf::Pt(5.56).into();
        let width = font.char_width(&cache, '0', 10);
        assert!((width.as_f64() - expected.as_f64()).abs() < 1e-9);
        assert!(font.str_width(&cache, "iii", 10) < font.str_width(&cache, "WWW", 10));
    }

    #[test]
    fn bold_is_wider() {
        let cache = FontCache::builtin();
        let family = cache.font_family();
        let bold = family.bold.str_width(&cache, "Inventario", 12);
        assert!(bold > family.regular.str_width(&cache, "Inventario", 12));
        assert!(family.bold.is_builtin());
    }

    #[test]
    fn missing_font_directory_is_an_error() {
        let err = FontCache::new("/nonexistent/fonts", "Missing").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::IoError(_)));
    }
}
