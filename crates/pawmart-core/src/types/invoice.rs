//! Shop invoices.
//!
//! ## Totals
//! ```text
//! lineTotal = unitPrice × quantity
//! subtotal  = Σ lineTotal
//! tax       = round_half_up(subtotal × taxRateBps / 10000)
//! total     = subtotal + tax
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCustomer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Invoice line with name and price snapshotted from the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub product: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl InvoiceItem {
    pub fn new(product: &str, name: &str, quantity: i64, unit_price: Money) -> Self {
        InvoiceItem {
            product: product.to_string(),
            name: name.to_string(),
            quantity,
            unit_price,
            line_total: unit_price.multiply_quantity(quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    /// `INV-YYYYMMDD-NNNN`
    pub invoice_number: String,
    pub shop: String,
    /// User id of the owner or employee who issued it.
    pub issued_by: String,
    pub customer: InvoiceCustomer,
    pub items: Vec<InvoiceItem>,
    pub subtotal: Money,
    pub tax_rate_bps: u32,
    pub tax: Money,
    pub total: Money,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Builds an `unpaid` invoice and computes its totals.
    pub fn new(
        invoice_number: String,
        shop: &str,
        issued_by: &str,
        customer: InvoiceCustomer,
        items: Vec<InvoiceItem>,
        tax_rate: TaxRate,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let subtotal: Money = items.iter().map(|i| i.line_total).sum();
        let tax = subtotal.calculate_tax(tax_rate);
        Invoice {
            id: uuid::Uuid::new_v4().to_string(),
            invoice_number,
            shop: shop.to_string(),
            issued_by: issued_by.to_string(),
            customer,
            items,
            subtotal,
            tax_rate_bps: tax_rate.bps(),
            tax,
            total: subtotal + tax,
            status: InvoiceStatus::Unpaid,
            notes,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Formats an invoice number: `INV-YYYYMMDD-NNNN`.
///
/// `sequence` is the 1-based count of invoices issued on `date`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use pawmart_core::types::invoice_number;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
/// assert_eq!(invoice_number(date, 7), "INV-20260314-0007");
/// ```
pub fn invoice_number(date: NaiveDate, sequence: u32) -> String {
    format!("INV-{}-{:04}", date.format("%Y%m%d"), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_totals_round_half_up() {
        let invoice = Invoice::new(
            "INV-20260101-0001".to_string(),
            "shop",
            "seller",
            InvoiceCustomer {
                name: "Walk-in".to_string(),
                email: None,
                phone: None,
            },
            vec![
                InvoiceItem::new("p1", "Shampoo", 2, Money::from_cents(250)),
                InvoiceItem::new("p2", "Brush", 1, Money::from_cents(500)),
            ],
            TaxRate::from_bps(825),
            None,
        );

        assert_eq!(invoice.subtotal.cents(), 1000);
        assert_eq!(invoice.tax.cents(), 83);
        assert_eq!(invoice.total.cents(), 1083);
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn test_invoice_number_padding() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(invoice_number(date, 1), "INV-20260105-0001");
        assert_eq!(invoice_number(date, 12345), "INV-20260105-12345");
    }
}
