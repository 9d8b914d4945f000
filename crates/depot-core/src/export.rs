//! # CSV Export
//!
//! Flattens the displayed report into one row per sale item and serializes
//! it as CSV bytes. Writing the bytes somewhere is the console's job.
//!
//! ## Format
//! ```text
//! "sale_id","created_at","customer",...,"sale_total","item"
//! "9f1c…","2025-01-01 23:59:00","Maria",...,"100.00","1"
//! "9f1c…","2025-01-01 23:59:00","Maria",...,"100.00","2"
//! ```
//!
//! - every field quoted, embedded quotes doubled
//! - amounts and quantities with two decimals, `.` separator, no grouping
//! - an empty report still gets one all-empty data row

use std::io::Write;

use crate::date_range::{DateRange, ReportZone};
use crate::error::{ReportError, ReportResult};
use crate::money::Money;
use crate::types::Sale;

/// Customer column value for walk-in sales.
pub const UNASSIGNED_CUSTOMER: &str = "unassigned";

pub const REPORT_COLUMNS: usize = 10;

pub const REPORT_HEADER: [&str; REPORT_COLUMNS] = [
    "sale_id",
    "created_at",
    "customer",
    "payment_method",
    "product",
    "quantity",
    "unit_price",
    "subtotal",
    "sale_total",
    "item",
];

// =============================================================================
// Report Row
// =============================================================================

/// One sale item, flattened with its sale's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub sale_id: String,
    /// Wall time in the report zone, `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
    pub customer: String,
    pub payment_method: String,
    pub product: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    pub sale_total: Money,
    /// 1-based position of the item inside its sale.
    pub item_number: usize,
}

impl ReportRow {
    pub fn to_record(&self) -> [String; REPORT_COLUMNS] {
        [
            self.sale_id.clone(),
            self.created_at.clone(),
            self.customer.clone(),
            self.payment_method.clone(),
            self.product.clone(),
            format!("{}.00", self.quantity),
            self.unit_price.to_decimal_string(),
            self.subtotal.to_decimal_string(),
            self.sale_total.to_decimal_string(),
            self.item_number.to_string(),
        ]
    }
}

/// Sales then items, in display order.
pub fn flatten(sales: &[Sale], zone: ReportZone) -> Vec<ReportRow> {
    sales
        .iter()
        .flat_map(|sale| {
            let created_at = zone.format_timestamp(&sale.created_at);
            let customer = sale.customer_name().unwrap_or(UNASSIGNED_CUSTOMER).to_string();
            let payment_method = sale
                .payment_method
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            sale.items.iter().enumerate().map(move |(index, item)| ReportRow {
                sale_id: sale.id.clone(),
                created_at: created_at.clone(),
                customer: customer.clone(),
                payment_method: payment_method.clone(),
                product: item.product_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal(),
                sale_total: sale.total_amount,
                item_number: index + 1,
            })
        })
        .collect()
}

// =============================================================================
// Serialization
// =============================================================================

/// Writes header plus rows. An empty slice yields one placeholder row.
pub fn write_csv(rows: &[ReportRow], writer: impl Write) -> ReportResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(REPORT_HEADER)?;

    if rows.is_empty() {
        csv.write_record([""; REPORT_COLUMNS])?;
    }
    for row in rows {
        csv.write_record(row.to_record())?;
    }

    csv.flush().map_err(|e| ReportError::Export(e.to_string()))?;
    Ok(())
}

/// A finished export, ready for a download sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Data rows, not counting the header or the placeholder.
    pub row_count: usize,
}

/// `sales-report_2025-01-01_2025-01-31.csv`
pub fn export_filename(range: &DateRange) -> String {
    format!(
        "sales-report_{}_{}.csv",
        range.from_day().format("%Y-%m-%d"),
        range.to_day().format("%Y-%m-%d")
    )
}

/// Flattens and serializes the displayed sales for `range`.
pub fn export_report(sales: &[Sale], range: &DateRange, zone: ReportZone) -> ReportResult<CsvExport> {
    let rows = flatten(sales, zone);
    let mut bytes = Vec::new();
    write_csv(&rows, &mut bytes)?;

    Ok(CsvExport {
        filename: export_filename(range),
        bytes,
        row_count: rows.len(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
