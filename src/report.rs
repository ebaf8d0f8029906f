// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Inventory and sales reports.
//!
//! A report is produced in two steps:
//!
//! 1. [`ReportBuilder::build`][] computes a [`ReportModel`][] from the records: the key figures
//!    shown on stat cards, the chart datasets and the rows of the data table.
//! 2. [`ReportBuilder::render`][] draws the model onto a [`Surface`][] in a fixed page sequence:
//!    cover page, key figures, charts, data table.  Footers and the watermark are added once all
//!    pages exist.
//!
//! The model is also the input of the CSV and JSON exports, see [`export`][].
//!
//! [`ReportBuilder::build`]: struct.ReportBuilder.html#method.build
//! [`ReportBuilder::render`]: struct.ReportBuilder.html#method.render
//! [`ReportModel`]: struct.ReportModel.html
//! [`Surface`]: ../surface/trait.Surface.html
//! [`export`]: ../export/

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::assets;
use crate::chart::{self, ChartConfig, ChartDatum, ValueFormat};
use crate::error::{AssetError, Error};
use crate::flow::{Decoration, PageFlow};
use crate::geometry::{self, StatCard, Trend};
use crate::options::ReportOptions;
use crate::records::{Product, Record, StockLevel, Transaction};
use crate::render::PdfSurface;
use crate::style::{palette, Color, Style, StyledString};
use crate::surface::{Alignment, Surface};
use crate::table::{Cell, Table};
use crate::{LayoutBox, Margins, Mm};

/// The number of days shown in the daily sales chart.
pub const MAX_DAY_BARS: usize = 14;

const CARD_HEIGHT: f64 = 32.0;
const CARD_GAP: f64 = 6.0;
const HEADING_HEIGHT: f64 = 10.0;
const VERTICAL_CHART_HEIGHT: f64 = 90.0;

/// The kind of a report.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// A report on the products in stock.
    Inventory,
    /// A report on sales transactions.
    Sales,
}

impl ReportKind {
    /// Returns the title of reports of this kind.
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Inventory => "Reporte de Inventario",
            ReportKind::Sales => "Reporte de Ventas",
        }
    }

    /// Returns the identifier used in file names.
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::Inventory => "inventory",
            ReportKind::Sales => "sales",
        }
    }

    fn accepts(self, record: &Record) -> bool {
        match self {
            ReportKind::Inventory => record.as_product().is_some(),
            ReportKind::Sales => record.as_transaction().is_some(),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A non-fatal problem that occurred while generating a report.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportWarning {
    /// Records that do not belong to the report kind were ignored.
    SkippedRecords {
        /// The number of ignored records.
        count: usize,
    },
    /// A decorative image could not be loaded and was left out.
    Asset(AssetError),
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportWarning::SkippedRecords { count } => {
                write!(f, "Skipped {} records of a different kind", count)
            }
            ReportWarning::Asset(err) => err.fmt(f),
        }
    }
}

/// A key figure of a report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statistic {
    /// The caption.
    pub label: String,
    /// The formatted value.
    pub value: String,
    /// The raw value.
    pub raw: f64,
    /// The relative change compared to the previous period in percent.
    pub trend: Option<f64>,
    /// The accent color of the stat card.
    #[serde(skip)]
    pub accent: Color,
}

impl Statistic {
    fn new(label: &str, value: String, raw: f64, accent: Color) -> Statistic {
        Statistic {
            label: label.to_owned(),
            value,
            raw,
            trend: None,
            accent,
        }
    }

    fn with_trend(mut self, trend: Option<f64>) -> Statistic {
        self.trend = trend;
        self
    }

    fn card(&self) -> StatCard {
        let card = StatCard::new(self.label.clone(), self.value.clone(), self.accent);
        match self.trend {
            Some(trend) => card.with_trend(Trend::from_change(trend)),
            None => card,
        }
    }
}

/// The layout of a chart in a report.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartLayout {
    /// A column chart in a fixed box.
    VerticalBars,
    /// A horizontal bar chart that may continue on new pages.
    HorizontalBars,
    /// A pie chart with a legend.
    Pie,
}

/// A chart of a report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartModel {
    /// The chart title.
    pub title: String,
    /// The chart layout.
    pub layout: ChartLayout,
    /// How the values are printed.
    pub value_format: ValueFormat,
    /// The values in drawing order.
    pub data: Vec<ChartDatum>,
}

/// A cell of the data table of a report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableCell {
    /// The formatted value.
    pub text: String,
    /// Whether the value needs attention.
    pub flagged: bool,
}

/// The data table of a report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableModel {
    /// The table title.
    pub title: String,
    /// The column headers.
    pub headers: Vec<String>,
    /// The relative column widths.
    #[serde(skip)]
    pub weights: Vec<usize>,
    /// The indices of the right-aligned numeric columns.
    #[serde(skip)]
    pub numeric: Vec<usize>,
    /// The body rows.
    pub rows: Vec<Vec<TableCell>>,
    /// The legend explaining flagged cells.
    pub legend: String,
}

impl TableModel {
    /// Converts this model into a drawable table.
    pub fn to_table(&self) -> Result<Table, Error> {
        let mut table = Table::new(self.headers.clone(), self.weights.clone())?
            .with_title(self.title.clone());
        for column in &self.numeric {
            table.set_alignment(*column, Alignment::Right);
        }
        table.set_legend(self.legend.clone());
        let flagged = Style::new().with_color(palette::CRITICAL).bold();
        for row in &self.rows {
            let cells = row
                .iter()
                .map(|cell| {
                    if cell.flagged {
                        Cell::from(StyledString::new(cell.text.clone(), flagged))
                    } else {
                        Cell::from(cell.text.clone())
                    }
                })
                .collect();
            table.push_row(cells)?;
        }
        Ok(table)
    }
}

/// The number of products per stock level.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StockBuckets {
    /// Products at most at half of their reorder level.
    pub critical: usize,
    /// Products at most at their reorder level.
    pub low: usize,
    /// Products at most at twice their reorder level.
    pub normal: usize,
    /// Products above twice their reorder level.
    pub high: usize,
}

impl StockBuckets {
    fn add(&mut self, level: StockLevel) {
        match level {
            StockLevel::Critical => self.critical += 1,
            StockLevel::Low => self.low += 1,
            StockLevel::Normal => self.normal += 1,
            StockLevel::High => self.high += 1,
        }
    }

    /// Returns the number of products with the given stock level.
    pub fn get(&self, level: StockLevel) -> usize {
        match level {
            StockLevel::Critical => self.critical,
            StockLevel::Low => self.low,
            StockLevel::Normal => self.normal,
            StockLevel::High => self.high,
        }
    }

    /// Returns the total number of products.
    pub fn total(&self) -> usize {
        self.critical + self.low + self.normal + self.high
    }
}

/// Returns the chart color of a stock level.
pub fn stock_level_color(level: StockLevel) -> Color {
    match level {
        StockLevel::Critical => palette::CRITICAL,
        StockLevel::Low => palette::LOW,
        StockLevel::Normal => palette::NORMAL,
        StockLevel::High => palette::HIGH,
    }
}

/// The statistics of an inventory report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InventoryStats {
    /// The number of products.
    pub product_count: usize,
    /// The number of units in stock.
    pub total_units: u64,
    /// The value of all units in stock.
    pub inventory_value: f64,
    /// The number of distinct categories.
    pub category_count: usize,
    /// The products per stock level.
    pub buckets: StockBuckets,
    /// The number of products at or below their reorder level.
    pub reorder_count: usize,
    /// The number of products per category, sorted by descending count.
    pub products_per_category: Vec<(String, usize)>,
    /// The inventory value per category, sorted by descending value.
    pub value_per_category: Vec<(String, f64)>,
    /// The number of products that expire within the expiry window.
    pub expiring_soon: usize,
    /// The number of products that have already expired.
    pub expired: usize,
}

impl InventoryStats {
    /// Computes the statistics of the given products.
    ///
    /// Expiration dates are compared to `today`; products expiring within `window_days` days are
    /// counted as expiring soon.
    pub fn compute(products: &[&Product], today: NaiveDate, window_days: i64) -> InventoryStats {
        let mut stats = InventoryStats {
            product_count: products.len(),
            ..Default::default()
        };
        let mut categories: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        let horizon = today + chrono::Duration::days(window_days.max(0));
        for product in products {
            stats.total_units += u64::from(product.stock);
            stats.inventory_value += product.stock_value();
            stats.buckets.add(product.stock_level());
            if product.needs_reorder() {
                stats.reorder_count += 1;
            }
            let entry = categories.entry(product.category.as_str()).or_default();
            entry.0 += 1;
            entry.1 += product.stock_value();
            match product.expiration_date {
                Some(date) if date < today => stats.expired += 1,
                Some(date) if date <= horizon => stats.expiring_soon += 1,
                _ => {}
            }
        }
        stats.category_count = categories.len();

        let mut per_category: Vec<(String, usize)> = categories
            .iter()
            .map(|(name, (count, _))| ((*name).to_owned(), *count))
            .collect();
        // stable sort keeps categories with equal counts in alphabetical order
        per_category.sort_by(|a, b| b.1.cmp(&a.1));
        stats.products_per_category = per_category;

        let mut per_value: Vec<(String, f64)> = categories
            .iter()
            .map(|(name, (_, value))| ((*name).to_owned(), *value))
            .collect();
        per_value.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        stats.value_per_category = per_value;
        stats
    }
}

/// The statistics of a sales report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SalesStats {
    /// The number of completed transactions.
    pub completed: usize,
    /// The number of cancelled transactions.
    pub cancelled: usize,
    /// The revenue of all completed transactions.
    pub revenue: f64,
    /// The average revenue per completed transaction.
    pub average_ticket: f64,
    /// The number of units sold in completed transactions.
    pub units_sold: u64,
    /// The change of the revenue in the second half of the period compared to the first half, in
    /// percent.  `None` if the period has less than two days or no revenue in the first half.
    pub trend: Option<f64>,
    /// The revenue per day in chronological order.
    pub revenue_per_day: Vec<(NaiveDate, f64)>,
    /// The products with the highest revenue, sorted by descending revenue.
    pub top_products: Vec<(String, f64)>,
    /// The revenue per payment method, sorted by descending revenue.
    pub revenue_per_payment: Vec<(String, f64)>,
}

impl SalesStats {
    /// Computes the statistics of the given transactions, keeping the `top_n` best-selling
    /// products.
    pub fn compute(transactions: &[&Transaction], top_n: usize) -> SalesStats {
        let mut stats = SalesStats::default();
        let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut per_product: HashMap<&str, f64> = HashMap::new();
        let mut per_payment: BTreeMap<&str, f64> = BTreeMap::new();
        for transaction in transactions {
            if !transaction.is_completed() {
                stats.cancelled += 1;
                continue;
            }
            stats.completed += 1;
            stats.revenue += transaction.total;
            stats.units_sold += transaction.units();
            *per_day.entry(transaction.date.date()).or_default() += transaction.total;
            *per_payment
                .entry(transaction.payment_method.as_str())
                .or_default() += transaction.total;
            for item in &transaction.items {
                *per_product.entry(item.product_name.as_str()).or_default() += item.subtotal();
            }
        }
        if stats.completed > 0 {
            stats.average_ticket = stats.revenue / stats.completed as f64;
        }
        stats.trend = half_period_trend(&per_day);
        stats.revenue_per_day = per_day.into_iter().collect();
        stats.top_products = sorted_desc(per_product);
        stats.top_products.truncate(top_n);
        stats.revenue_per_payment = sorted_desc(per_payment);
        stats
    }
}

fn sorted_desc<'a>(values: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<(String, f64)> {
    let mut values: Vec<(String, f64)> = values
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect();
    values.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    values
}

/// Compares the revenue of the second half of the period with the first half.
///
/// Days before the midpoint of the period belong to the first half.
fn half_period_trend(per_day: &BTreeMap<NaiveDate, f64>) -> Option<f64> {
    let first_day = *per_day.keys().next()?;
    let last_day = *per_day.keys().next_back()?;
    let span = (last_day - first_day).num_days();
    if span == 0 {
        return None;
    }
    let (mut first, mut second) = (0.0, 0.0);
    for (day, revenue) in per_day {
        if (*day - first_day).num_days() * 2 < span {
            first += revenue;
        } else {
            second += revenue;
        }
    }
    if first > 0.0 {
        Some((second - first) / first * 100.0)
    } else {
        None
    }
}

/// The statistics of a report.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Summary {
    /// Inventory statistics.
    Inventory(InventoryStats),
    /// Sales statistics.
    Sales(SalesStats),
}

/// Everything that is shown in a report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportModel {
    /// The report kind.
    pub kind: ReportKind,
    /// The report title.
    pub title: String,
    /// The organization the report was generated for.
    pub organization: String,
    /// The generation timestamp.
    pub generated_at: NaiveDateTime,
    /// The number of records the report is based on.
    pub record_count: usize,
    /// The number of records that were ignored because they have a different kind.
    pub skipped: usize,
    /// The key figures.
    pub statistics: Vec<Statistic>,
    /// The charts in drawing order.
    pub charts: Vec<ChartModel>,
    /// The data table.
    pub table: TableModel,
    /// The raw statistics.
    pub summary: Summary,
}

impl ReportModel {
    /// Returns the warnings caused by the records.
    pub fn warnings(&self) -> Vec<ReportWarning> {
        if self.skipped > 0 {
            vec![ReportWarning::SkippedRecords {
                count: self.skipped,
            }]
        } else {
            Vec::new()
        }
    }
}

/// The result of drawing a report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOutcome {
    /// The number of pages.
    pub pages: usize,
    /// The non-fatal problems that occurred while drawing.
    pub warnings: Vec<ReportWarning>,
}

/// Computes and draws reports with the given options.
#[derive(Clone, Copy, Debug)]
pub struct ReportBuilder<'a> {
    options: &'a ReportOptions,
}

impl<'a> ReportBuilder<'a> {
    /// Creates a new builder.
    pub fn new(options: &'a ReportOptions) -> ReportBuilder<'a> {
        ReportBuilder { options }
    }

    /// Computes the report model of the given kind from the records.
    ///
    /// Records of a different kind are skipped and counted in [`ReportModel::skipped`][].
    ///
    /// [`ReportModel::skipped`]: struct.ReportModel.html#structfield.skipped
    pub fn build(&self, kind: ReportKind, records: &[Record]) -> ReportModel {
        let generated_at = self.options.timestamp();
        let (accepted, skipped): (Vec<&Record>, Vec<&Record>) =
            records.iter().partition(|record| kind.accepts(record));
        if !skipped.is_empty() {
            log::warn!(
                "Skipping {} records that do not belong to the {} report",
                skipped.len(),
                kind
            );
        }

        let mut model = match kind {
            ReportKind::Inventory => {
                let products: Vec<&Product> =
                    accepted.iter().copied().filter_map(Record::as_product).collect();
                self.inventory_model(&products, generated_at)
            }
            ReportKind::Sales => {
                let transactions: Vec<&Transaction> = accepted
                    .iter()
                    .copied()
                    .filter_map(Record::as_transaction)
                    .collect();
                self.sales_model(&transactions, generated_at)
            }
        };
        model.record_count = accepted.len();
        model.skipped = skipped.len();
        log::info!(
            "Built {} report model from {} records",
            kind,
            model.record_count
        );
        model
    }

    fn inventory_model(&self, products: &[&Product], generated_at: NaiveDateTime) -> ReportModel {
        let locale = &self.options.locale;
        let stats = InventoryStats::compute(
            products,
            generated_at.date(),
            self.options.expiry_window_days,
        );

        let statistics = vec![
            Statistic::new(
                "Total de productos",
                locale.format_integer(stats.product_count as u64),
                stats.product_count as f64,
                palette::PRIMARY,
            ),
            Statistic::new(
                "Unidades en stock",
                locale.format_integer(stats.total_units),
                stats.total_units as f64,
                palette::NORMAL,
            ),
            Statistic::new(
                "Valor del inventario",
                locale.format_currency(stats.inventory_value),
                stats.inventory_value,
                palette::ACCENT,
            ),
            Statistic::new(
                "Categorías",
                locale.format_integer(stats.category_count as u64),
                stats.category_count as f64,
                palette::series(2),
            ),
            Statistic::new(
                "Requieren reposición",
                locale.format_integer(stats.reorder_count as u64),
                stats.reorder_count as f64,
                palette::CRITICAL,
            ),
            Statistic::new(
                &format!("Vencen en {} días", self.options.expiry_window_days),
                locale.format_integer(stats.expiring_soon as u64),
                stats.expiring_soon as f64,
                palette::LOW,
            ),
        ];

        let charts = vec![
            ChartModel {
                title: "Distribución de stock".to_owned(),
                layout: ChartLayout::VerticalBars,
                value_format: ValueFormat::Integer,
                data: StockLevel::ALL
                    .iter()
                    .map(|level| {
                        ChartDatum::new(
                            level.label(),
                            stats.buckets.get(*level) as f64,
                            stock_level_color(*level),
                        )
                    })
                    .collect(),
            },
            ChartModel {
                title: "Productos por categoría".to_owned(),
                layout: ChartLayout::HorizontalBars,
                value_format: ValueFormat::Integer,
                data: chart::dataset(
                    stats
                        .products_per_category
                        .iter()
                        .map(|(name, count)| (name.clone(), *count as f64)),
                ),
            },
            ChartModel {
                title: "Valor del inventario por categoría".to_owned(),
                layout: ChartLayout::Pie,
                value_format: ValueFormat::Currency,
                data: chart::dataset(stats.value_per_category.iter().cloned()),
            },
        ];

        let rows = products
            .iter()
            .map(|product| {
                let flagged = product.needs_reorder();
                let cell = |text: String| TableCell { text, flagged };
                vec![
                    cell(product.code.clone()),
                    cell(product.name.clone()),
                    cell(product.category.clone()),
                    cell(locale.format_integer(u64::from(product.stock))),
                    cell(locale.format_integer(u64::from(product.reorder_level))),
                    cell(locale.format_currency(product.price)),
                    cell(
                        product
                            .expiration_date
                            .map(|date| locale.format_date(date))
                            .unwrap_or_else(|| "-".to_owned()),
                    ),
                ]
            })
            .collect();
        let table = TableModel {
            title: "Detalle de productos".to_owned(),
            headers: ["Código", "Producto", "Categoría", "Stock", "Mínimo", "Precio", "Vence"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            weights: vec![2, 5, 3, 1, 1, 2, 2],
            numeric: vec![3, 4, 5],
            rows,
            legend: "En rojo: productos con stock igual o inferior al mínimo".to_owned(),
        };

        ReportModel {
            kind: ReportKind::Inventory,
            title: ReportKind::Inventory.title().to_owned(),
            organization: self.options.organization.clone(),
            generated_at,
            record_count: products.len(),
            skipped: 0,
            statistics,
            charts,
            table,
            summary: Summary::Inventory(stats),
        }
    }

    fn sales_model(
        &self,
        transactions: &[&Transaction],
        generated_at: NaiveDateTime,
    ) -> ReportModel {
        let locale = &self.options.locale;
        let stats = SalesStats::compute(transactions, self.options.top_n);

        let statistics = vec![
            Statistic::new(
                "Ventas completadas",
                locale.format_integer(stats.completed as u64),
                stats.completed as f64,
                palette::PRIMARY,
            ),
            Statistic::new(
                "Ingresos totales",
                locale.format_currency(stats.revenue),
                stats.revenue,
                palette::ACCENT,
            )
            .with_trend(stats.trend),
            Statistic::new(
                "Ticket promedio",
                locale.format_currency(stats.average_ticket),
                stats.average_ticket,
                palette::NORMAL,
            ),
            Statistic::new(
                "Unidades vendidas",
                locale.format_integer(stats.units_sold),
                stats.units_sold as f64,
                palette::series(2),
            ),
            Statistic::new(
                "Ventas canceladas",
                locale.format_integer(stats.cancelled as u64),
                stats.cancelled as f64,
                palette::CRITICAL,
            ),
            Statistic::new(
                "Métodos de pago",
                locale.format_integer(stats.revenue_per_payment.len() as u64),
                stats.revenue_per_payment.len() as f64,
                palette::LOW,
            ),
        ];

        let days = &stats.revenue_per_day;
        let recent = &days[days.len().saturating_sub(MAX_DAY_BARS)..];
        let charts = vec![
            ChartModel {
                title: "Ventas por día".to_owned(),
                layout: ChartLayout::VerticalBars,
                value_format: ValueFormat::Currency,
                data: recent
                    .iter()
                    .map(|(day, revenue)| {
                        ChartDatum::new(day.format("%d/%m").to_string(), *revenue, palette::NORMAL)
                    })
                    .collect(),
            },
            ChartModel {
                title: "Productos más vendidos".to_owned(),
                layout: ChartLayout::HorizontalBars,
                value_format: ValueFormat::Currency,
                data: chart::dataset(stats.top_products.iter().cloned()),
            },
            ChartModel {
                title: "Ventas por método de pago".to_owned(),
                layout: ChartLayout::Pie,
                value_format: ValueFormat::Currency,
                data: chart::dataset(stats.revenue_per_payment.iter().cloned()),
            },
        ];

        let rows = transactions
            .iter()
            .map(|transaction| {
                let flagged = !transaction.is_completed();
                let cell = |text: String| TableCell { text, flagged };
                vec![
                    cell(transaction.id.to_string()),
                    cell(locale.format_datetime(transaction.date)),
                    cell(
                        transaction
                            .customer
                            .clone()
                            .unwrap_or_else(|| "Consumidor final".to_owned()),
                    ),
                    cell(locale.format_integer(transaction.units())),
                    cell(transaction.payment_method.clone()),
                    cell(locale.format_currency(transaction.total)),
                    cell(transaction.status.label().to_owned()),
                ]
            })
            .collect();
        let table = TableModel {
            title: "Detalle de transacciones".to_owned(),
            headers: ["N.º", "Fecha", "Cliente", "Unidades", "Pago", "Total", "Estado"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            weights: vec![1, 3, 4, 2, 2, 2, 2],
            numeric: vec![0, 3, 5],
            rows,
            legend: "En rojo: transacciones canceladas".to_owned(),
        };

        ReportModel {
            kind: ReportKind::Sales,
            title: ReportKind::Sales.title().to_owned(),
            organization: self.options.organization.clone(),
            generated_at,
            record_count: transactions.len(),
            skipped: 0,
            statistics,
            charts,
            table,
            summary: Summary::Sales(stats),
        }
    }

    /// Draws the given model onto the surface and finalizes all pages.
    ///
    /// # Errors
    ///
    /// Returns an error if a section does not fit on an empty page or if text cannot be drawn.
    /// Missing assets are reported as warnings in the returned outcome.
    pub fn render<S: Surface + ?Sized>(
        &self,
        model: &ReportModel,
        surface: &mut S,
    ) -> Result<RenderOutcome, Error> {
        let mut warnings = Vec::new();
        let logo = self.load_logo(&mut warnings);
        let locale = &self.options.locale;
        let decoration = Decoration {
            title: model.title.clone(),
            subtitle: format!(
                "{} · {}",
                model.organization,
                locale.format_date(model.generated_at.date())
            ),
            generated: locale.format_datetime(model.generated_at),
            attribution: self.options.attribution.clone(),
            watermark: self.options.watermark.clone(),
            logo,
        };
        let mut flow = PageFlow::new(self.options.paper_size, self.options.margin, decoration);

        self.draw_cover(model, surface, &mut flow)?;
        self.draw_statistics(model, surface, &mut flow)?;
        self.draw_charts(model, surface, &mut flow)?;

        flow.new_page(surface, true)?;
        model.table.to_table()?.render(surface, &mut flow)?;

        flow.finalize(surface)?;
        let pages = surface.total_pages();
        log::info!("Rendered {} report with {} pages", model.kind, pages);
        Ok(RenderOutcome { pages, warnings })
    }

    fn load_logo(&self, warnings: &mut Vec<ReportWarning>) -> Option<image::DynamicImage> {
        let name = self.options.logo.as_ref()?;
        match self.options.asset_provider().load(name) {
            Ok(image) => Some(image),
            Err(err) => {
                log::warn!("Drawing report without logo: {}", err);
                warnings.push(ReportWarning::Asset(err));
                None
            }
        }
    }

    fn draw_cover<S: Surface + ?Sized>(
        &self,
        model: &ReportModel,
        surface: &mut S,
        flow: &mut PageFlow,
    ) -> Result<(), Error> {
        flow.new_page(surface, false)?;
        let size = flow.page_size();
        let page = LayoutBox::new(0, 0, size.width, size.height);
        geometry::decorative_border(surface, page.inset(10), palette::PRIMARY);

        let margin = flow.state().margin;
        if let Some(logo) = &flow.decoration().logo {
            let logo_box = LayoutBox::new(size.width / 2.0 - Mm::from(20), 25, 40, 40);
            assets::draw_image_fitted(surface, logo, logo_box);
        }

        let band = LayoutBox::new(margin, 75, size.width - margin * 2.0, 60);
        geometry::gradient_fill(
            surface,
            band,
            palette::PRIMARY,
            palette::ACCENT,
            geometry::GRADIENT_STEPS,
        );
        let locale = &self.options.locale;
        let lines = [
            (model.title.clone(), Style::new().with_font_size(24).bold(), 10.0),
            (model.organization.clone(), Style::new().with_font_size(14), 27.0),
            (
                format!("Generado el {}", locale.format_datetime(model.generated_at)),
                Style::new().with_font_size(10),
                42.0,
            ),
        ];
        for (text, style, offset) in lines.iter() {
            let style = style.with_color(Color::WHITE);
            let line = LayoutBox::new(
                band.x,
                band.y + Mm::from(*offset),
                band.width,
                surface.line_height(style),
            );
            let text = surface.fit_text(text, style, band.width);
            surface.draw_text_aligned(line, &text, style, Alignment::Center)?;
        }

        let style = Style::new().with_font_size(11).with_color(palette::TEXT);
        let mut y = band.bottom() + Mm::from(20);
        for statistic in model.statistics.iter().take(3) {
            let line = LayoutBox::new(band.x, y, band.width, surface.line_height(style));
            let text = format!("{}: {}", statistic.label, statistic.value);
            surface.draw_text_aligned(line, &text, style, Alignment::Center)?;
            y += line.height + Mm::from(3);
        }
        Ok(())
    }

    fn draw_statistics<S: Surface + ?Sized>(
        &self,
        model: &ReportModel,
        surface: &mut S,
        flow: &mut PageFlow,
    ) -> Result<(), Error> {
        flow.new_page(surface, true)?;
        let columns = 2;
        let rows = (model.statistics.len() + columns - 1) / columns;
        let gaps = rows.saturating_sub(1) as f64;
        let grid_height = Mm::from(CARD_HEIGHT) * rows as f64 + Mm::from(CARD_GAP) * gaps;
        heading(surface, flow, "Indicadores clave", grid_height)?;
        let grid = flow.content_box(grid_height);
        let cells = grid.grid(columns, rows, CARD_GAP);
        for (statistic, cell) in model.statistics.iter().zip(cells) {
            // leave room for the card shadow
            let shadow = geometry::SHADOW_OFFSET;
            let cell = cell.inset(Margins::trbl(0, shadow, shadow, 0));
            geometry::stat_card(surface, cell, &statistic.card(), &self.options.locale)?;
        }
        flow.advance(grid_height + Mm::from(CARD_GAP));
        Ok(())
    }

    fn draw_charts<S: Surface + ?Sized>(
        &self,
        model: &ReportModel,
        surface: &mut S,
        flow: &mut PageFlow,
    ) -> Result<(), Error> {
        flow.new_page(surface, true)?;
        let base = ChartConfig::new(self.options);
        for chart in &model.charts {
            let config = base.clone().with_value_format(chart.value_format);
            match chart.layout {
                ChartLayout::VerticalBars => {
                    let height = Mm::from(VERTICAL_CHART_HEIGHT);
                    flow.ensure_space(surface, height)?;
                    let rect = flow.content_box(height);
                    chart::draw_vertical_bars(surface, rect, &chart.title, &chart.data, &config)?;
                    flow.advance(height + Mm::from(CARD_GAP));
                }
                ChartLayout::HorizontalBars => {
                    let pages = chart::draw_horizontal_bars(
                        surface,
                        flow,
                        &chart.title,
                        &chart.data,
                        &config,
                    )?;
                    log::debug!("Chart '{}' spans pages {:?}", chart.title, pages.pages);
                }
                ChartLayout::Pie => {
                    let summary =
                        chart::draw_pie_chart(surface, flow, &chart.title, &chart.data, &config)?;
                    log::debug!("Chart '{}' spans pages {:?}", chart.title, summary.pages);
                }
            }
        }
        Ok(())
    }
}

fn heading<S: Surface + ?Sized>(
    surface: &mut S,
    flow: &mut PageFlow,
    text: &str,
    following: Mm,
) -> Result<(), Error> {
    flow.ensure_space(surface, Mm::from(HEADING_HEIGHT) + following)?;
    let style = Style::new()
        .with_font_size(14)
        .with_color(palette::TEXT)
        .bold();
    let rect = flow.content_box(Mm::from(HEADING_HEIGHT));
    surface.draw_text(rect.position(), text, style)?;
    flow.advance(rect.height);
    Ok(())
}

/// A rendered report.
pub struct Report<S> {
    surface: S,
    model: ReportModel,
    warnings: Vec<ReportWarning>,
    pages: usize,
}

impl<S> Report<S> {
    /// Returns the surface the report was drawn on.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Returns the model of the report.
    pub fn model(&self) -> &ReportModel {
        &self.model
    }

    /// Returns the non-fatal problems that occurred while generating the report.
    pub fn warnings(&self) -> &[ReportWarning] {
        &self.warnings
    }

    /// Returns the number of pages.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Returns the surface, discarding the model.
    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl Report<PdfSurface> {
    /// Serializes the report and returns the PDF data.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        self.surface.into_bytes()
    }
}

/// Builds a report of the given kind and draws it onto the given surface.
///
/// Use this function with a [`RecordingSurface`][] to inspect the layout of a report.
///
/// [`RecordingSurface`]: ../surface/struct.RecordingSurface.html
pub fn render_report<S: Surface>(
    kind: ReportKind,
    records: &[Record],
    options: &ReportOptions,
    mut surface: S,
) -> Result<Report<S>, Error> {
    options.validate()?;
    let builder = ReportBuilder::new(options);
    let model = builder.build(kind, records);
    let outcome = builder.render(&model, &mut surface)?;
    let mut warnings = model.warnings();
    warnings.extend(outcome.warnings);
    Ok(Report {
        surface,
        model,
        warnings,
        pages: outcome.pages,
    })
}

/// Generates a PDF report of the given kind.
///
/// # Example
///
/// ```
/// use rxreport::records::{Product, Record};
/// use rxreport::{generate_report, ReportKind, ReportOptions};
///
/// let records: Vec<Record> =
///     vec![Product::new(1, "Ibuprofeno 400mg", "Analgésicos", 5, 20, 3.2).into()];
/// let report = generate_report(ReportKind::Inventory, &records, &ReportOptions::default())
///     .expect("Failed to generate report");
/// assert!(report.pages() >= 4);
/// let pdf = report.into_bytes().expect("Failed to serialize report");
/// assert!(pdf.starts_with(b"%PDF"));
/// ```
pub fn generate_report(
    kind: ReportKind,
    records: &[Record],
    options: &ReportOptions,
) -> Result<Report<PdfSurface>, Error> {
    let mut surface = PdfSurface::new(options.paper_size, kind.title(), options.font_cache()?)?;
    if options.minimal_conformance {
        surface = surface.with_minimal_conformance();
    }
    render_report(kind, records, options, surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SaleItem;
    use crate::surface::RecordingSurface;
    use pretty_assertions::assert_eq;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(10, 30, 0).unwrap()
    }

    fn options() -> ReportOptions {
        ReportOptions::default().with_generated_at(timestamp())
    }

    fn products() -> Vec<Record> {
        vec![
            Product::new(1, "Paracetamol 500mg", "Analgésicos", 4, 10, 2.5).into(),
            Product::new(2, "Ibuprofeno 400mg", "Analgésicos", 8, 10, 3.0)
                .with_expiration_date(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
                .into(),
            Product::new(3, "Amoxicilina 500mg", "Antibióticos", 15, 10, 7.5)
                .with_expiration_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
                .into(),
            Product::new(4, "Vitamina C", "Vitaminas", 25, 10, 4.0).into(),
        ]
    }

    fn sale(id: u64, day: u32, price: f64) -> Transaction {
        Transaction::new(
            id,
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            "Efectivo",
            vec![SaleItem::new("Paracetamol 500mg", 2, price)],
        )
    }

    #[test]
    fn inventory_statistics() {
        let records = products();
        let products: Vec<&Product> = records.iter().filter_map(Record::as_product).collect();
        let stats = InventoryStats::compute(&products, timestamp().date(), 90);
        assert_eq!(stats.product_count, 4);
        assert_eq!(stats.total_units, 52);
        assert_eq!(
            stats.buckets,
            StockBuckets {
                critical: 1,
                low: 1,
                normal: 1,
                high: 1
            }
        );
        assert_eq!(stats.reorder_count, 2);
        assert_eq!(stats.category_count, 3);
        assert_eq!(stats.products_per_category[0], ("Analgésicos".to_owned(), 2));
        assert_eq!(stats.value_per_category[0].0, "Antibióticos");
        assert_eq!(stats.expiring_soon, 1);
        assert_eq!(stats.expired, 1);
    }

    #[test]
    fn sales_statistics() {
        let records = vec![
            sale(1, 1, 10.0),
            sale(2, 2, 10.0),
            sale(3, 9, 20.0),
            sale(4, 9, 20.0).cancelled(),
        ];
        let transactions: Vec<&Transaction> = records.iter().collect();
        let stats = SalesStats::compute(&transactions, 10);
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.revenue, 80.0);
        assert_eq!(stats.units_sold, 6);
        assert_eq!(stats.revenue_per_day.len(), 3);
        assert_eq!(stats.top_products, vec![("Paracetamol 500mg".to_owned(), 80.0)]);
        // first half: days 1 and 2 with 40, second half: day 9 with 40
        assert_eq!(stats.trend, Some(0.0));
    }

    #[test]
    fn trend_needs_two_days() {
        let records = vec![sale(1, 1, 10.0), sale(2, 1, 10.0)];
        let transactions: Vec<&Transaction> = records.iter().collect();
        assert_eq!(SalesStats::compute(&transactions, 10).trend, None);
    }

    #[test]
    fn records_of_other_kinds_are_skipped() {
        let mut records = products();
        records.push(sale(1, 1, 10.0).into());
        let options = options();
        let model = ReportBuilder::new(&options).build(ReportKind::Inventory, &records);
        assert_eq!(model.record_count, 4);
        assert_eq!(model.skipped, 1);
        assert_eq!(
            model.warnings(),
            vec![ReportWarning::SkippedRecords { count: 1 }]
        );
    }

    #[test]
    fn inventory_table_flags_reorder_rows() {
        let options = options();
        let model = ReportBuilder::new(&options).build(ReportKind::Inventory, &products());
        let flagged: Vec<bool> = model.table.rows.iter().map(|row| row[0].flagged).collect();
        assert_eq!(flagged, vec![true, true, false, false]);
        assert_eq!(model.statistics.len(), 6);
        assert_eq!(model.charts.len(), 3);
    }

    #[test]
    fn daily_chart_is_limited() {
        let records: Vec<Record> = (1..=20)
            .map(|day| sale(u64::from(day), day, 5.0).into())
            .collect();
        let options = options();
        let model = ReportBuilder::new(&options).build(ReportKind::Sales, &records);
        let daily = &model.charts[0];
        assert_eq!(daily.data.len(), MAX_DAY_BARS);
        assert_eq!(daily.data[0].label, "07/03");
    }

    #[test]
    fn report_page_sequence() {
        let options = options();
        let report =
            render_report(ReportKind::Inventory, &products(), &options, RecordingSurface::new())
                .unwrap();
        let surface = report.surface();
        assert_eq!(report.pages(), surface.total_pages());
        assert!(surface.page(1).unwrap().contains_text("Reporte de Inventario"));
        assert!(surface.page(2).unwrap().contains_text("Indicadores clave"));
        let last = surface.pages().last().unwrap();
        assert!(last.contains_text("Detalle de productos"));
        assert!(last.contains_text(&crate::flow::page_label(report.pages(), report.pages())));
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn missing_logo_is_a_warning() {
        let mut options = options();
        options.set_logo("/nonexistent", "logo.png");
        let report =
            render_report(ReportKind::Sales, &[], &options, RecordingSurface::new()).unwrap();
        match report.warnings() {
            [ReportWarning::Asset(err)] => assert!(err.asset().ends_with("logo.png")),
            warnings => panic!("Unexpected warnings {:?}", warnings),
        }
    }
}
