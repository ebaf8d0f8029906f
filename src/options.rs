// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Report configuration.
//!
//! [`ReportOptions`][] bundles everything that influences the appearance of a report but is not
//! part of the records: paper size and margins, the organization shown in the header, the
//! watermark, the locale conventions, fonts and assets.  All fields have defaults, so options can
//! be loaded from partial JSON documents:
//!
//! ```
//! let options = rxreport::ReportOptions::from_json(r#"{"organization": "Farmacia Norte"}"#)
//!     .expect("Invalid options");
//! assert_eq!(options.organization, "Farmacia Norte");
//! assert_eq!(options.pie_steps, 36);
//! ```
//!
//! [`ReportOptions`]: struct.ReportOptions.html

use std::path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::assets;
use crate::error::{Context as _, Error, ErrorKind};
use crate::fonts;
use crate::locale::LocaleFormat;
use crate::{Mm, PaperSize};

/// The scaling of the value axis of a paginated horizontal bar chart.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    /// One maximum across all pages, so bar lengths can be compared across pages.
    Global,
    /// The maximum is recomputed for every page.
    PerChunk,
}

impl Default for AxisScale {
    fn default() -> AxisScale {
        AxisScale::Global
    }
}

/// The configuration of a report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// The paper size of all pages.
    pub paper_size: PaperSize,
    /// The left and right page margin.
    pub margin: Mm,
    /// The name of the organization shown on the cover and in the header.
    pub organization: String,
    /// The attribution line printed in every footer.
    pub attribution: String,
    /// The watermark text, or `None` to disable the watermark.
    pub watermark: Option<String>,
    /// The generation timestamp, or `None` to use the current local time.
    ///
    /// Reports generated with the same records and a fixed timestamp are identical.
    pub generated_at: Option<NaiveDateTime>,
    /// Number and date formatting.
    pub locale: LocaleFormat,
    /// The value axis scaling of paginated horizontal bar charts.
    pub axis_scale: AxisScale,
    /// The number of triangles per pie wedge.
    pub pie_steps: usize,
    /// The number of days within which an expiration date is reported as upcoming.
    pub expiry_window_days: i64,
    /// The number of entries in top-N charts.
    pub top_n: usize,
    /// The directory with the TTF files of the font family, or `None` for built-in Helvetica.
    pub font_dir: Option<path::PathBuf>,
    /// The name of the font family in `font_dir`.
    pub font_name: String,
    /// The directory with decorative images, or `None` to draw without images.
    pub asset_dir: Option<path::PathBuf>,
    /// The file name of the logo within `asset_dir`.
    pub logo: Option<String>,
    /// Whether ICC profiles and XMP metadata are omitted from PDF output.
    pub minimal_conformance: bool,
}

impl Default for ReportOptions {
    fn default() -> ReportOptions {
        ReportOptions {
            paper_size: PaperSize::A4,
            margin: Mm::from(15),
            organization: "Farmacia".to_owned(),
            attribution: "Generado por el sistema de gestión de farmacia".to_owned(),
            watermark: Some("CONFIDENCIAL".to_owned()),
            generated_at: None,
            locale: LocaleFormat::default(),
            axis_scale: AxisScale::Global,
            pie_steps: 36,
            expiry_window_days: 90,
            top_n: 10,
            font_dir: None,
            font_name: "LiberationSans".to_owned(),
            asset_dir: None,
            logo: None,
            minimal_conformance: false,
        }
    }
}

impl ReportOptions {
    /// Parses report options from a JSON document.  Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<ReportOptions, Error> {
        let options: ReportOptions =
            serde_json::from_str(json).context("Failed to parse the report options")?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that the options describe a drawable document.
    pub fn validate(&self) -> Result<(), Error> {
        if self.pie_steps == 0 {
            return Err(Error::new(
                "The pie step count must be positive",
                ErrorKind::InvalidData,
            ));
        }
        if self.margin < Mm::from(0) {
            return Err(Error::new(
                "The page margin must not be negative",
                ErrorKind::InvalidData,
            ));
        }
        Ok(())
    }

    /// Sets the paper size.
    pub fn set_paper_size(&mut self, paper_size: PaperSize) {
        self.paper_size = paper_size;
    }

    /// Sets the left and right page margin.
    pub fn set_margin(&mut self, margin: impl Into<Mm>) {
        self.margin = margin.into();
    }

    /// Sets the organization name.
    pub fn set_organization(&mut self, organization: impl Into<String>) {
        self.organization = organization.into();
    }

    /// Sets the attribution line.
    pub fn set_attribution(&mut self, attribution: impl Into<String>) {
        self.attribution = attribution.into();
    }

    /// Sets the watermark text.
    pub fn set_watermark(&mut self, watermark: impl Into<String>) {
        self.watermark = Some(watermark.into());
    }

    /// Disables the watermark.
    pub fn clear_watermark(&mut self) {
        self.watermark = None;
    }

    /// Fixes the generation timestamp.
    pub fn set_generated_at(&mut self, generated_at: NaiveDateTime) {
        self.generated_at = Some(generated_at);
    }

    /// Fixes the generation timestamp and returns the options.
    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> ReportOptions {
        self.set_generated_at(generated_at);
        self
    }

    /// Sets the axis scaling of paginated horizontal bar charts.
    pub fn set_axis_scale(&mut self, axis_scale: AxisScale) {
        self.axis_scale = axis_scale;
    }

    /// Sets the font directory and family name.
    pub fn set_font(&mut self, dir: impl Into<path::PathBuf>, name: impl Into<String>) {
        self.font_dir = Some(dir.into());
        self.font_name = name.into();
    }

    /// Sets the asset directory and the logo file name.
    pub fn set_logo(&mut self, asset_dir: impl Into<path::PathBuf>, logo: impl Into<String>) {
        self.asset_dir = Some(asset_dir.into());
        self.logo = Some(logo.into());
    }

    /// Returns the generation timestamp, falling back to the current local time.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.generated_at
            .unwrap_or_else(|| chrono::Local::now().naive_local())
    }

    /// Loads the font family configured by these options.
    pub fn font_cache(&self) -> Result<fonts::FontCache, Error> {
        match &self.font_dir {
            Some(dir) => fonts::FontCache::new(dir, &self.font_name),
            None => Ok(fonts::FontCache::builtin()),
        }
    }

    /// Returns the asset provider configured by these options.
    pub fn asset_provider(&self) -> Box<dyn assets::AssetProvider> {
        match &self.asset_dir {
            Some(dir) => Box::new(assets::DirAssetProvider::new(dir)),
            None => Box::new(assets::NoAssets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = ReportOptions::from_json(
            r#"{"axis_scale": "per_chunk", "watermark": null, "paper_size": "letter"}"#,
        )
        .unwrap();
        assert_eq!(options.axis_scale, AxisScale::PerChunk);
        assert_eq!(options.watermark, None);
        assert_eq!(options.paper_size, PaperSize::Letter);
        assert_eq!(options.expiry_window_days, 90);
        assert_eq!(options.locale, LocaleFormat::default());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let err = ReportOptions::from_json(r#"{"pie_steps": 0}"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidData));
        let err = ReportOptions::from_json("{").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::JsonError(_)));
    }

    #[test]
    fn fixed_timestamp_is_used() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let options = ReportOptions::default().with_generated_at(ts);
        assert_eq!(options.timestamp(), ts);
    }
}
