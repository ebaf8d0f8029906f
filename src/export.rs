// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Report exports in different file formats.
//!
//! Every [`ReportFormat`][] has a [`Serializer`][] that turns a [`ReportModel`][] into bytes.  The
//! PDF serializer draws the full report; the CSV serializer writes the data table and the JSON
//! serializer writes the complete model including the statistics and chart datasets.
//!
//! # Example
//!
//! ```
//! use rxreport::records::{Product, Record};
//! use rxreport::{export, ReportFormat, ReportKind, ReportOptions};
//!
//! let records: Vec<Record> = vec![Product::new(1, "Gasas", "Curaciones", 12, 5, 1.5).into()];
//! let options = ReportOptions::default();
//! let exported = export(ReportKind::Inventory, &records, &options, ReportFormat::Csv)
//!     .expect("Failed to export report");
//! assert!(exported.filename.starts_with("inventory_"));
//! assert!(exported.filename.ends_with(".csv"));
//! ```
//!
//! [`ReportFormat`]: enum.ReportFormat.html
//! [`Serializer`]: trait.Serializer.html
//! [`ReportModel`]: ../report/struct.ReportModel.html

use serde::{Deserialize, Serialize};

use crate::error::{Context as _, Error};
use crate::options::ReportOptions;
use crate::records::Record;
use crate::render::PdfSurface;
use crate::report::{ReportBuilder, ReportKind, ReportModel, ReportWarning};

/// The file format of an export.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// A PDF document with cover, statistics, charts and table.
    Pdf,
    /// The data table as comma-separated values.
    Csv,
    /// The report model as JSON.
    Json,
}

impl ReportFormat {
    /// Returns the file extension of this format.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    /// Returns the serializer for this format.
    pub fn serializer(self) -> Box<dyn Serializer> {
        match self {
            ReportFormat::Pdf => Box::new(PdfSerializer),
            ReportFormat::Csv => Box::new(CsvSerializer),
            ReportFormat::Json => Box::new(JsonSerializer),
        }
    }
}

/// The serialized data of a report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Serialized {
    /// The file content.
    pub bytes: Vec<u8>,
    /// The non-fatal problems that occurred while serializing.
    pub warnings: Vec<ReportWarning>,
}

impl From<Vec<u8>> for Serialized {
    fn from(bytes: Vec<u8>) -> Serialized {
        Serialized {
            bytes,
            warnings: Vec::new(),
        }
    }
}

/// Turns a report model into the bytes of a file.
pub trait Serializer {
    /// Serializes the given model.
    fn serialize(&self, model: &ReportModel, options: &ReportOptions) -> Result<Serialized, Error>;
}

/// Draws the report into a PDF document.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfSerializer;

impl Serializer for PdfSerializer {
    fn serialize(&self, model: &ReportModel, options: &ReportOptions) -> Result<Serialized, Error> {
        let mut surface =
            PdfSurface::new(options.paper_size, &model.title, options.font_cache()?)?;
        if options.minimal_conformance {
            surface = surface.with_minimal_conformance();
        }
        let outcome = ReportBuilder::new(options).render(model, &mut surface)?;
        Ok(Serialized {
            bytes: surface.into_bytes()?,
            warnings: outcome.warnings,
        })
    }
}

/// Writes the data table of the report as comma-separated values.
///
/// The first line contains the column headers.  Fields that contain a comma, a double quote or a
/// line break are quoted, and double quotes in quoted fields are doubled.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvSerializer;

impl Serializer for CsvSerializer {
    fn serialize(
        &self,
        model: &ReportModel,
        _options: &ReportOptions,
    ) -> Result<Serialized, Error> {
        let mut out = String::new();
        push_csv_line(&mut out, model.table.headers.iter().map(String::as_str));
        for row in &model.table.rows {
            push_csv_line(&mut out, row.iter().map(|cell| cell.text.as_str()));
        }
        Ok(out.into_bytes().into())
    }
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&csv_field(field));
    }
    out.push_str("\r\n");
}

/// Quotes the given field if it contains a separator, a quote or a line break.
pub fn csv_field(field: &str) -> String {
    if field.contains(|c: char| c == ',' || c == '"' || c == '\n' || c == '\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// Writes the report model as pretty-printed JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(
        &self,
        model: &ReportModel,
        _options: &ReportOptions,
    ) -> Result<Serialized, Error> {
        let bytes = serde_json::to_vec_pretty(model).context("Failed to serialize report model")?;
        Ok(bytes.into())
    }
}

/// An exported report file.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportedReport {
    /// The file content.
    pub bytes: Vec<u8>,
    /// The suggested file name, for example `inventory_20240315_103000.pdf`.
    pub filename: String,
    /// The non-fatal problems that occurred while generating the report.
    pub warnings: Vec<ReportWarning>,
}

/// Returns the file name of a report of the given kind and format generated at the given time.
pub fn filename(
    kind: ReportKind,
    format: ReportFormat,
    generated_at: chrono::NaiveDateTime,
) -> String {
    format!(
        "{}_{}.{}",
        kind.slug(),
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Builds a report of the given kind and exports it in the given format.
pub fn export(
    kind: ReportKind,
    records: &[Record],
    options: &ReportOptions,
    format: ReportFormat,
) -> Result<ExportedReport, Error> {
    options.validate()?;
    let model = ReportBuilder::new(options).build(kind, records);
    let serialized = format.serializer().serialize(&model, options)?;
    let mut warnings = model.warnings();
    warnings.extend(serialized.warnings);
    let filename = filename(kind, format, model.generated_at);
    log::info!(
        "Exported {} ({} bytes, {} warnings)",
        filename,
        serialized.bytes.len(),
        warnings.len()
    );
    Ok(ExportedReport {
        bytes: serialized.bytes,
        filename,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Product, SaleItem, Transaction};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn options() -> ReportOptions {
        ReportOptions::default().with_generated_at(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 30, 5)
                .unwrap(),
        )
    }

    #[test]
    fn csv_fields_are_quoted() {
        assert_eq!(csv_field("Gasas"), "Gasas");
        assert_eq!(csv_field("Gasas, estériles"), "\"Gasas, estériles\"");
        assert_eq!(csv_field("Jarabe \"infantil\""), "\"Jarabe \"\"infantil\"\"\"");
        assert_eq!(csv_field("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn csv_export_writes_the_table() {
        let records: Vec<Record> = vec![
            Product::new(1, "Gasas, estériles", "Curaciones", 12, 5, 1.5).into(),
            Product::new(2, "Alcohol 70%", "Curaciones", 3, 5, 2.0).into(),
        ];
        let exported = export(
            ReportKind::Inventory,
            &records,
            &options(),
            ReportFormat::Csv,
        )
        .unwrap();
        assert_eq!(exported.filename, "inventory_20240315_103005.csv");
        let csv = String::from_utf8(exported.bytes).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Código,Producto,Categoría,Stock,Mínimo,Precio,Vence");
        assert!(lines[1].starts_with("P-0001,\"Gasas, estériles\",Curaciones,12,5,"));
        assert!(lines[2].starts_with("P-0002,Alcohol 70%,"));
    }

    #[test]
    fn json_export_contains_the_statistics() {
        let records: Vec<Record> = vec![Transaction::new(
            7,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            "Tarjeta",
            vec![SaleItem::new("Omeprazol 20mg", 3, 4.0)],
        )
        .into()];
        let exported =
            export(ReportKind::Sales, &records, &options(), ReportFormat::Json).unwrap();
        assert_eq!(exported.filename, "sales_20240315_103005.json");
        let value: serde_json::Value = serde_json::from_slice(&exported.bytes).unwrap();
        assert_eq!(value["kind"], "sales");
        assert_eq!(value["summary"]["kind"], "sales");
        assert_eq!(value["summary"]["completed"], 1);
        assert_eq!(value["summary"]["revenue"], 12.0);
        assert_eq!(value["charts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut options = options();
        options.pie_steps = 0;
        let err = export(ReportKind::Sales, &[], &options, ReportFormat::Json).unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::InvalidData));
    }
}
