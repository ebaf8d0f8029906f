// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: CC0-1.0

//! This example generates an inventory and a sales report for a small demo pharmacy and writes
//! them to the directory that was passed as the first command-line argument.
//!
//! The reports use the built-in Helvetica font.  Set `RXREPORT_FONT_DIR` to a directory with
//! `LiberationSans-{Regular,Bold,Italic,BoldItalic}.ttf` to embed that font family instead.  Set
//! `RUST_LOG=debug` to see the layout decisions.

use std::env;
use std::fs;
use std::path;

use chrono::NaiveDate;

use rxreport::records::{Product, Record, SaleItem, Transaction};
use rxreport::{export, ReportFormat, ReportKind, ReportOptions};

const CATEGORIES: &[&str] = &[
    "Analgésicos",
    "Antibióticos",
    "Antigripales",
    "Vitaminas",
    "Dermatológicos",
    "Gastrointestinales",
    "Cardiovasculares",
    "Respiratorios",
    "Higiene personal",
    "Curaciones",
    "Oftalmológicos",
    "Pediatría",
];

const PAYMENT_METHODS: &[&str] = &["Efectivo", "Tarjeta", "Transferencia"];

fn products() -> Vec<Record> {
    (0..48u32)
        .map(|i| {
            let category = CATEGORIES[i as usize % CATEGORIES.len()];
            let stock = (i * 7) % 60;
            let reorder_level = 10 + (i % 3) * 5;
            let price = 1.5 + f64::from(i % 17) * 1.25;
            let mut product = Product::new(
                u64::from(i) + 1,
                format!("{} {}", category, i + 1),
                category,
                stock,
                reorder_level,
                price,
            )
            .with_supplier("Distribuidora Central");
            if i % 5 == 0 {
                if let Some(date) = NaiveDate::from_ymd_opt(2024, 4, 1 + i % 28) {
                    product = product.with_expiration_date(date);
                }
            }
            product.into()
        })
        .collect()
}

fn transactions() -> Vec<Record> {
    (0..60u32)
        .filter_map(|i| {
            let date = NaiveDate::from_ymd_opt(2024, 2, 1 + i % 28)?;
            let date = date.and_hms_opt(9 + i % 9, 15, 0)?;
            let items = vec![
                SaleItem::new(format!("Analgésicos {}", 1 + i % 6), 1 + i % 3, 2.5),
                SaleItem::new(format!("Vitaminas {}", 4 + i % 4), 1, 6.75),
            ];
            let method = PAYMENT_METHODS[i as usize % PAYMENT_METHODS.len()];
            let transaction = Transaction::new(u64::from(i) + 1000, date, method, items)
                .with_customer(format!("Cliente {}", 1 + i % 12));
            Some(if i % 13 == 0 {
                transaction.cancelled().into()
            } else {
                transaction.into()
            })
        })
        .collect()
}

fn main() {
    env_logger::init();

    let args: Vec<_> = env::args().skip(1).collect();
    if args.len() != 1 {
        panic!("Missing argument: output directory");
    }
    let output_dir = path::Path::new(&args[0]);

    let mut options = ReportOptions::default();
    options.set_organization("Farmacia San Rafael");
    options.set_attribution("Sistema de gestión farmacéutica");
    if let Ok(font_dir) = env::var("RXREPORT_FONT_DIR") {
        options.set_font(font_dir, "LiberationSans");
    }
    options.minimal_conformance = true;

    let jobs = [
        (ReportKind::Inventory, products()),
        (ReportKind::Sales, transactions()),
    ];
    for (kind, records) in jobs.iter() {
        for format in &[ReportFormat::Pdf, ReportFormat::Csv, ReportFormat::Json] {
            let exported =
                export(*kind, records, &options, *format).expect("Failed to export report");
            for warning in &exported.warnings {
                log::warn!("{}", warning);
            }
            let path = output_dir.join(&exported.filename);
            fs::write(&path, &exported.bytes).expect("Failed to write report");
            println!("Wrote {}", path.display());
        }
    }
}
