//! # Dashboard
//!
//! Period KPIs, per-product tallies and stock gauges for the home screen.
//!
//! ```text
//! ┌──────────────────────┐ ┌──────────────────────┐ ┌──────────────────────┐
//! │ Period total / count │ │ GÁS  12 un  R$ 1320  │ │ GÁS  stock ███░ 18   │
//! │ (Today ▾)            │ │ ÁGUA 30 un  R$  360  │ │ ÁGUA stock █░░░  4 ! │
//! └──────────────────────┘ └──────────────────────┘ └──────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ProductKind, SaleItem, StockSummaryRow};
use crate::{STOCK_BAR_BASE, STOCK_CRITICAL_MAX, STOCK_LOW_MAX};

// =============================================================================
// Period KPIs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodKpis {
    pub total: Money,
    pub sale_count: usize,
}

impl PeriodKpis {
    /// Folds the stored sale totals of a period.
    pub fn from_totals<I>(totals: I) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        totals.into_iter().fold(PeriodKpis::default(), |acc, total| PeriodKpis {
            total: acc.total + total,
            sale_count: acc.sale_count + 1,
        })
    }
}

// =============================================================================
// Product Tallies
// =============================================================================

/// Units sold and revenue for one product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductTally {
    pub kind: ProductKind,
    pub quantity: i64,
    pub total: Money,
}

/// One tally per product line, gas first, zeros included. Items outside
/// the vocabulary are ignored.
pub fn tally_products(items: &[SaleItem]) -> Vec<ProductTally> {
    ProductKind::ALL
        .iter()
        .map(|&kind| {
            let (quantity, total) = items
                .iter()
                .filter(|item| ProductKind::from_name(&item.product_name) == Some(kind))
                .fold((0i64, Money::zero()), |(qty, total), item| {
                    (qty.saturating_add(item.quantity), total + item.subtotal())
                });
            ProductTally {
                kind,
                quantity,
                total,
            }
        })
        .collect()
}

// =============================================================================
// Stock Gauges
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// At or below 5 units.
    Critical,
    /// At or below 15 units.
    Low,
    Ok,
}

impl StockLevel {
    pub fn classify(quantity: i64) -> Self {
        if quantity <= STOCK_CRITICAL_MAX {
            StockLevel::Critical
        } else if quantity <= STOCK_LOW_MAX {
            StockLevel::Low
        } else {
            StockLevel::Ok
        }
    }
}

/// Bar fill against a 30-unit base, clamped to 0..=100.
pub fn fill_percent(quantity: i64) -> u8 {
    let percent = (quantity.max(0).saturating_mul(100) / STOCK_BAR_BASE).min(100);
    // Clamped to 0..=100 above
    percent as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockGauge {
    pub name: String,
    pub quantity: i64,
    pub level: StockLevel,
    pub fill_percent: u8,
}

impl StockGauge {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        StockGauge {
            name: name.into(),
            quantity,
            level: StockLevel::classify(quantity),
            fill_percent: fill_percent(quantity),
        }
    }
}

impl From<&StockSummaryRow> for StockGauge {
    fn from(row: &StockSummaryRow) -> Self {
        StockGauge::new(row.name.clone(), row.quantity)
    }
}

/// Gauges for gas and water, in that order. A product missing from the
/// summary shows as zero stock.
pub fn product_gauges(rows: &[StockSummaryRow]) -> Vec<StockGauge> {
    ProductKind::ALL
        .iter()
        .map(|&kind| {
            let quantity = rows
                .iter()
                .find(|row| ProductKind::from_name(&row.name) == Some(kind))
                .map_or(0, |row| row.quantity);
            StockGauge::new(kind.label(), quantity)
        })
        .collect()
}

// =============================================================================
// Dashboard Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    /// `2025-01-04..2025-01-10`
    pub period: String,
    pub kpis: PeriodKpis,
    pub products: Vec<ProductTally>,
    pub stock: Vec<StockGauge>,
    /// Unread customer conversations.
    pub unread_messages: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: i64, cents: i64) -> SaleItem {
        SaleItem {
            product_id: format!("p-{name}"),
            product_name: name.into(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_period_kpis() {
        let kpis = PeriodKpis::from_totals([Money::from_cents(11000), Money::from_cents(2400)]);
        assert_eq!(kpis.total, Money::from_cents(13400));
        assert_eq!(kpis.sale_count, 2);
        assert_eq!(PeriodKpis::from_totals([]), PeriodKpis::default());
    }

    #[test]
    fn test_tally_products_ignores_unknown() {
        let tallies = tally_products(&[
            item("gas", 2, 11000),
            item("Agua", 5, 1200),
            item("gas", 1, 10500),
            item("carvao", 9, 999),
        ]);
        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies[0].kind, ProductKind::Gas);
        assert_eq!(tallies[0].quantity, 3);
        assert_eq!(tallies[0].total, Money::from_cents(32500));
        assert_eq!(tallies[1].kind, ProductKind::Water);
        assert_eq!(tallies[1].quantity, 5);
        assert_eq!(tallies[1].total, Money::from_cents(6000));
    }

    #[test]
    fn test_stock_level_thresholds() {
        assert_eq!(StockLevel::classify(-2), StockLevel::Critical);
        assert_eq!(StockLevel::classify(5), StockLevel::Critical);
        assert_eq!(StockLevel::classify(6), StockLevel::Low);
        assert_eq!(StockLevel::classify(15), StockLevel::Low);
        assert_eq!(StockLevel::classify(16), StockLevel::Ok);
    }

    #[test]
    fn test_fill_percent_clamps() {
        assert_eq!(fill_percent(-4), 0);
        assert_eq!(fill_percent(15), 50);
        assert_eq!(fill_percent(30), 100);
        assert_eq!(fill_percent(90), 100);
        assert_eq!(fill_percent(i64::MAX), 100);
    }

    #[test]
    fn test_product_gauges_default_to_zero() {
        let rows = vec![StockSummaryRow {
            product_id: Some("p1".into()),
            name: "gas".into(),
            quantity: 18,
        }];
        let gauges = product_gauges(&rows);
        assert_eq!(gauges[0].name, "GÁS");
        assert_eq!(gauges[0].level, StockLevel::Ok);
        assert_eq!(gauges[1].name, "ÁGUA");
        assert_eq!(gauges[1].quantity, 0);
        assert_eq!(gauges[1].level, StockLevel::Critical);
    }
}
