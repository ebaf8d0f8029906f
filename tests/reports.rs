// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

use rxreport::flow::{Decoration, PageFlow};
use rxreport::geometry::NO_DATA_TEXT;
use rxreport::records::{Product, Record, SaleItem, StockLevel, Transaction};
use rxreport::report::{generate_report, render_report, ReportBuilder, ReportWarning, Summary};
use rxreport::surface::{RecordingSurface, Surface as _};
use rxreport::table::Table;
use rxreport::{export, Mm, ReportFormat, ReportKind, ReportOptions, Size};

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

fn options() -> ReportOptions {
    ReportOptions::default().with_generated_at(timestamp())
}

fn inventory(categories: usize) -> Vec<Record> {
    (0..categories * 2)
        .map(|i| {
            Product::new(
                i as u64 + 1,
                format!("Producto {}", i + 1),
                format!("Categoría {:02}", i % categories),
                (i as u32 * 3) % 40,
                10,
                2.0 + i as f64,
            )
            .into()
        })
        .collect()
}

fn sales() -> Vec<Record> {
    (1..=10u32)
        .map(|day| {
            let date = NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap();
            let items = vec![SaleItem::new("Loratadina 10mg", day, 1.5)];
            Transaction::new(u64::from(day), date, "Tarjeta", items).into()
        })
        .collect()
}

#[test]
fn rendering_is_idempotent() {
    let options = options();
    let records = inventory(6);
    let first = render_report(ReportKind::Inventory, &records, &options, RecordingSurface::new())
        .expect("Failed to render report");
    let second = render_report(ReportKind::Inventory, &records, &options, RecordingSurface::new())
        .expect("Failed to render report");
    assert_eq!(first.pages(), second.pages());
    assert_eq!(first.surface().page_texts(), second.surface().page_texts());
}

#[test]
fn stock_buckets() {
    let records: Vec<Record> = [4, 8, 15, 25]
        .iter()
        .enumerate()
        .map(|(i, stock)| Product::new(i as u64, "Producto", "General", *stock, 10, 1.0).into())
        .collect();
    let options = options();
    let model = ReportBuilder::new(&options).build(ReportKind::Inventory, &records);
    let stats = match &model.summary {
        Summary::Inventory(stats) => stats,
        summary => panic!("Unexpected summary {:?}", summary),
    };
    for level in StockLevel::ALL.iter() {
        assert_eq!(stats.buckets.get(*level), 1, "{:?}", level);
    }
    assert_eq!(stats.buckets.total(), stats.product_count);
    assert_eq!(model.charts[0].data.len(), 4);
}

#[test]
fn empty_reports_show_placeholders() {
    for kind in &[ReportKind::Inventory, ReportKind::Sales] {
        let report = render_report(*kind, &[], &options(), RecordingSurface::new())
            .expect("Failed to render report");
        let placeholders = report
            .surface()
            .pages()
            .iter()
            .flat_map(|page| page.texts())
            .filter(|text| *text == NO_DATA_TEXT)
            .count();
        // three charts and the table
        assert_eq!(placeholders, 4, "{}", kind);
    }
}

#[test]
fn long_category_charts_continue_on_new_pages() {
    let report = render_report(
        ReportKind::Inventory,
        &inventory(20),
        &options(),
        RecordingSurface::new(),
    )
    .expect("Failed to render report");
    let pages = report.surface().pages();
    let second = pages
        .iter()
        .position(|page| page.contains_text("Productos por categoría (continuación 2/2)"))
        .expect("Missing continued chart page");
    assert!(pages[second - 1].contains_text("Productos por categoría"));
    assert!(!pages[second - 1].contains_text("Productos por categoría (continuación"));
}

#[test]
fn text_outside_win1252_is_replaced() {
    let records: Vec<Record> = vec![
        Product::new(1, "Omega 3 ≥1000mg", "Suplementos ✓", 5, 10, 12.5).into(),
        Transaction::new(2, timestamp(), "Tarjeta", vec![]).into(),
    ];
    for kind in &[ReportKind::Inventory, ReportKind::Sales] {
        let report =
            generate_report(*kind, &records, &options()).expect("Failed to render report");
        let pdf = report.into_bytes().expect("Failed to serialize report");
        assert!(pdf.starts_with(b"%PDF"), "{}", kind);
    }
    let sale = Transaction::new(
        3,
        timestamp(),
        "Código QR 📱",
        vec![SaleItem::new("Vitamina B₁₂", 2, 4.0)],
    )
    .with_customer("李 María");
    let report = generate_report(ReportKind::Sales, &[sale.into()], &options())
        .expect("Failed to render report");
    assert!(report.pages() >= 4);
}

#[test]
fn sales_report_pages() {
    let report = render_report(ReportKind::Sales, &sales(), &options(), RecordingSurface::new())
        .expect("Failed to render report");
    let surface = report.surface();
    assert_eq!(surface.total_pages(), report.pages());
    assert!(surface.page(1).unwrap().contains_text("Reporte de Ventas"));
    let texts: Vec<Vec<String>> = surface.page_texts();
    assert!(texts.iter().flatten().any(|text| text == "Ventas por día"));
    assert!(texts.iter().flatten().any(|text| text == "Productos más vendidos"));
    for (idx, page) in texts.iter().enumerate() {
        let label = format!("Página {} de {}", idx + 1, report.pages());
        assert!(page.contains(&label), "Missing footer on page {}", idx + 1);
    }
}

#[test]
fn tables_that_never_fit_overflow() {
    let mut surface = RecordingSurface::new();
    let mut flow = PageFlow::new(Size::new(100, 60), Mm::from(10), Decoration::default());
    let table = Table::new(vec!["Producto", "Stock"], vec![3, 1]).unwrap();
    let err = table.render(&mut surface, &mut flow).unwrap_err();
    assert!(err.is_layout_overflow());
}

#[test]
fn mixed_records_and_missing_logo_are_warnings() {
    let mut records = inventory(2);
    records.extend(sales());
    let mut options = options();
    options.set_logo("/nonexistent", "logo.png");
    let exported = export(ReportKind::Inventory, &records, &options, ReportFormat::Pdf)
        .expect("Failed to export report");
    assert_eq!(exported.filename, "inventory_20240315_103000.pdf");
    assert!(exported.bytes.starts_with(b"%PDF"));
    assert_eq!(exported.warnings.len(), 2);
    assert_eq!(
        exported.warnings[0],
        ReportWarning::SkippedRecords { count: 10 }
    );
    assert!(matches!(exported.warnings[1], ReportWarning::Asset(_)));
}
