// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! The records that reports are generated from.
//!
//! Records are read-only snapshots supplied by the caller.  They can be deserialized from the JSON
//! documents produced by the back office:
//!
//! ```
//! use rxreport::records::Record;
//!
//! let json = r#"[{"type": "product", "id": 7, "code": "P-007", "name": "Ibuprofeno 400mg",
//!     "category": "Analgésicos", "stock": 12, "reorder_level": 20, "price": 3.2}]"#;
//! let records: Vec<Record> = serde_json::from_str(json).unwrap();
//! assert_eq!(records[0].as_product().unwrap().stock, 12);
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A product in the pharmacy's inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// The database ID of the product.
    pub id: u64,
    /// The internal product code.
    #[serde(default)]
    pub code: String,
    /// The product name.
    pub name: String,
    /// The product category.
    pub category: String,
    /// The number of units in stock.
    pub stock: u32,
    /// The stock level at which the product should be reordered.
    pub reorder_level: u32,
    /// The unit price.
    pub price: f64,
    /// The supplier of the product, if known.
    #[serde(default)]
    pub supplier: Option<String>,
    /// The expiration date of the current batch, if known.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

impl Product {
    /// Creates a new product without code, supplier and expiration date.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        category: impl Into<String>,
        stock: u32,
        reorder_level: u32,
        price: f64,
    ) -> Product {
        Product {
            id,
            code: format!("P-{:04}", id),
            name: name.into(),
            category: category.into(),
            stock,
            reorder_level,
            price,
            supplier: None,
            expiration_date: None,
        }
    }

    /// Sets the supplier and returns the product.
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Product {
        self.supplier = Some(supplier.into());
        self
    }

    /// Sets the expiration date and returns the product.
    pub fn with_expiration_date(mut self, date: NaiveDate) -> Product {
        self.expiration_date = Some(date);
        self
    }

    /// Returns the value of the units in stock.
    pub fn stock_value(&self) -> f64 {
        f64::from(self.stock) * self.price
    }

    /// Returns `true` if the stock is at or below the reorder level.
    pub fn needs_reorder(&self) -> bool {
        self.stock <= self.reorder_level
    }

    /// Returns the stock bucket of this product.
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.stock, self.reorder_level)
    }
}

/// The stock bucket of a product relative to its reorder level.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    /// At most half of the reorder level.
    Critical,
    /// At most the reorder level.
    Low,
    /// At most twice the reorder level.
    Normal,
    /// More than twice the reorder level.
    High,
}

impl StockLevel {
    /// All stock levels, from the most to the least urgent.
    pub const ALL: [StockLevel; 4] = [
        StockLevel::Critical,
        StockLevel::Low,
        StockLevel::Normal,
        StockLevel::High,
    ];

    /// Classifies the given stock.
    ///
    /// The thresholds are inclusive and compared in integer arithmetic, so a stock of 5 with a
    /// reorder level of 10 is critical and a stock of 20 is still normal.
    pub fn classify(stock: u32, reorder_level: u32) -> StockLevel {
        let stock = u64::from(stock);
        let reorder_level = u64::from(reorder_level);
        if stock * 2 <= reorder_level {
            StockLevel::Critical
        } else if stock <= reorder_level {
            StockLevel::Low
        } else if stock <= reorder_level * 2 {
            StockLevel::Normal
        } else {
            StockLevel::High
        }
    }

    /// Returns the display label of this level.
    pub fn label(self) -> &'static str {
        match self {
            StockLevel::Critical => "Crítico",
            StockLevel::Low => "Bajo",
            StockLevel::Normal => "Normal",
            StockLevel::High => "Alto",
        }
    }
}

/// A line item of a sale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    /// The name of the sold product.
    pub product_name: String,
    /// The number of sold units.
    pub quantity: u32,
    /// The price per unit.
    pub unit_price: f64,
}

impl SaleItem {
    /// Creates a new line item.
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_price: f64) -> SaleItem {
        SaleItem {
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the amount of this line item.
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// The status of a transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// A completed sale.
    Completed,
    /// A cancelled sale that does not count towards the revenue.
    Cancelled,
}

impl Default for TransactionStatus {
    fn default() -> TransactionStatus {
        TransactionStatus::Completed
    }
}

impl TransactionStatus {
    /// Returns the display label of this status.
    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completada",
            TransactionStatus::Cancelled => "Cancelada",
        }
    }
}

/// A sales transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The database ID of the transaction.
    pub id: u64,
    /// The date and time of the sale.
    pub date: NaiveDateTime,
    /// The customer, if known.
    #[serde(default)]
    pub customer: Option<String>,
    /// The sold items.
    #[serde(default)]
    pub items: Vec<SaleItem>,
    /// The payment method, for example `Efectivo` or `Tarjeta`.
    pub payment_method: String,
    /// The total amount charged.
    pub total: f64,
    /// The status of the transaction.
    #[serde(default)]
    pub status: TransactionStatus,
}

impl Transaction {
    /// Creates a new completed transaction from the given items.
    ///
    /// The total is the sum of the item subtotals.
    pub fn new(
        id: u64,
        date: NaiveDateTime,
        payment_method: impl Into<String>,
        items: Vec<SaleItem>,
    ) -> Transaction {
        let total = items.iter().map(SaleItem::subtotal).sum();
        Transaction {
            id,
            date,
            customer: None,
            items,
            payment_method: payment_method.into(),
            total,
            status: TransactionStatus::Completed,
        }
    }

    /// Sets the customer and returns the transaction.
    pub fn with_customer(mut self, customer: impl Into<String>) -> Transaction {
        self.customer = Some(customer.into());
        self
    }

    /// Marks the transaction as cancelled and returns it.
    pub fn cancelled(mut self) -> Transaction {
        self.status = TransactionStatus::Cancelled;
        self
    }

    /// Returns `true` if this transaction counts towards the revenue.
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    /// Returns the number of sold units.
    pub fn units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// A single input record of a report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    /// An inventory record.
    Product(Product),
    /// A sales record.
    Transaction(Transaction),
}

impl Record {
    /// Returns the product if this is an inventory record.
    pub fn as_product(&self) -> Option<&Product> {
        match self {
            Record::Product(product) => Some(product),
            Record::Transaction(_) => None,
        }
    }

    /// Returns the transaction if this is a sales record.
    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Record::Transaction(transaction) => Some(transaction),
            Record::Product(_) => None,
        }
    }
}

impl From<Product> for Record {
    fn from(product: Product) -> Record {
        Record::Product(product)
    }
}

impl From<Transaction> for Record {
    fn from(transaction: Transaction) -> Record {
        Record::Transaction(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_levels_use_inclusive_thresholds() {
        assert_eq!(StockLevel::classify(0, 10), StockLevel::Critical);
        assert_eq!(StockLevel::classify(5, 10), StockLevel::Critical);
        assert_eq!(StockLevel::classify(6, 10), StockLevel::Low);
        assert_eq!(StockLevel::classify(10, 10), StockLevel::Low);
        assert_eq!(StockLevel::classify(11, 10), StockLevel::Normal);
        assert_eq!(StockLevel::classify(20, 10), StockLevel::Normal);
        assert_eq!(StockLevel::classify(21, 10), StockLevel::High);
        assert_eq!(StockLevel::classify(3, 0), StockLevel::High);
        assert_eq!(StockLevel::classify(2, 5), StockLevel::Critical);
        assert_eq!(StockLevel::classify(3, 5), StockLevel::Low);
    }

    #[test]
    fn transaction_total_is_sum_of_items() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let transaction = Transaction::new(
            1,
            date,
            "Efectivo",
            vec![SaleItem::new("Paracetamol", 2, 2.5), SaleItem::new("Gasas", 1, 4.0)],
        );
        assert_eq!(transaction.total, 9.0);
        assert_eq!(transaction.units(), 3);
        assert!(transaction.is_completed());
        assert!(!transaction.cancelled().is_completed());
    }

    #[test]
    fn records_are_tagged_in_json() {
        let record = Record::from(Product::new(3, "Gasas", "Curación", 4, 10, 1.5));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "product");
        assert_eq!(json["code"], "P-0003");
        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
        assert!(back.as_transaction().is_none());
    }
}
