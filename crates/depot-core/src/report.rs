//! # Sales Report Pipeline
//!
//! The pure part of the sales report: filter state, the query it turns into,
//! client-side product refinement and aggregation.
//!
//! ## Data Flow
//! ```text
//! ┌──────────────┐  apply(action)  ┌──────────────┐
//! │ ReportFilter │ ───────────────►│ ReportFilter │  (new value, old untouched)
//! └──────┬───────┘                 └──────────────┘
//!        │ query(zone)
//!        ▼
//! ┌──────────────┐   store fetch   ┌──────────────┐
//! │  SalesQuery  │ ───────────────►│  Vec<Sale>   │  newest first
//! └──────────────┘                 └──────┬───────┘
//!                                         │ refine(item_filter)
//!                                         ▼
//!                                  ┌──────────────┐ aggregate ┌───────────────┐
//!                                  │  Vec<Sale>   │──────────►│ ReportSummary │
//!                                  │  (display)   │           │ KPIs + days   │
//!                                  └──────────────┘           └───────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::date_range::{DateRange, Preset, ReportZone, DAY_FORMAT};
use crate::error::ReportResult;
use crate::money::Money;
use crate::types::{PaymentMethod, ProductKind, Sale, SaleItem};

// =============================================================================
// Filter State
// =============================================================================

/// Everything the operator can set on the report screen.
///
/// The value is never mutated in place: every control produces a
/// [`FilterAction`] and [`ReportFilter::apply`] returns the next state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    /// First day, `YYYY-MM-DD`, as typed.
    pub from: String,
    /// Last day, `YYYY-MM-DD`, as typed.
    pub to: String,
    /// Product name, matched locally.
    pub product_name: Option<String>,
    /// Product id, pushed down to the backend.
    pub product_id: Option<String>,
    pub customer_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

/// One operator action on the filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetFrom(String),
    SetTo(String),
    /// Blank clears the product name filter.
    SetProductName(Option<String>),
    SetProductId(Option<String>),
    SetCustomer(Option<String>),
    SetPaymentMethod(Option<PaymentMethod>),
    /// Replace both days with a preset relative to `today`.
    ApplyPreset { preset: Preset, today: NaiveDate },
    /// Back to a single-day report for `today` with no other filters.
    Reset { today: NaiveDate },
}

impl ReportFilter {
    /// A report for one day with no other filters.
    pub fn for_day(day: NaiveDate) -> Self {
        let day = day.format(DAY_FORMAT).to_string();
        ReportFilter {
            from: day.clone(),
            to: day,
            product_name: None,
            product_id: None,
            customer_id: None,
            payment_method: None,
        }
    }

    /// Produces the next filter state.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use depot_core::report::{FilterAction, ReportFilter};
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    /// let filter = ReportFilter::for_day(today);
    /// let next = filter.apply(FilterAction::SetProductName(Some("agua".into())));
    ///
    /// assert_eq!(filter.product_name, None);
    /// assert_eq!(next.product_name.as_deref(), Some("agua"));
    /// ```
    pub fn apply(&self, action: FilterAction) -> ReportFilter {
        let mut next = self.clone();
        match action {
            FilterAction::SetFrom(from) => next.from = from,
            FilterAction::SetTo(to) => next.to = to,
            FilterAction::SetProductName(name) => next.product_name = non_blank(name),
            FilterAction::SetProductId(id) => next.product_id = non_blank(id),
            FilterAction::SetCustomer(id) => next.customer_id = non_blank(id),
            FilterAction::SetPaymentMethod(method) => next.payment_method = method,
            FilterAction::ApplyPreset { preset, today } => {
                if let Some((from, to)) = preset.days(today) {
                    next.from = from.format(DAY_FORMAT).to_string();
                    next.to = to.format(DAY_FORMAT).to_string();
                }
            }
            FilterAction::Reset { today } => next = ReportFilter::for_day(today),
        }
        next
    }

    /// Folds a sequence of actions, as the console does for command-line
    /// flags.
    pub fn apply_all<I>(&self, actions: I) -> ReportFilter
    where
        I: IntoIterator<Item = FilterAction>,
    {
        actions
            .into_iter()
            .fold(self.clone(), |filter, action| filter.apply(action))
    }

    pub fn range(&self, zone: ReportZone) -> ReportResult<DateRange> {
        DateRange::build(&self.from, &self.to, zone)
    }

    /// The backend query for this filter.
    ///
    /// ## Errors
    /// `InvalidRange` from the date inputs. Nothing is sent in that case.
    pub fn query(&self, zone: ReportZone) -> ReportResult<SalesQuery> {
        Ok(SalesQuery {
            range: self.range(zone)?,
            product_id: self.product_id.clone(),
            customer_id: self.customer_id.clone(),
            payment_method: self.payment_method,
        })
    }

    /// The local item filter, if any product filter is set.
    pub fn item_filter(&self) -> Option<ItemFilter> {
        if self.product_name.is_none() && self.product_id.is_none() {
            return None;
        }
        Some(ItemFilter {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// What the store layer is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesQuery {
    pub range: DateRange,
    pub product_id: Option<String>,
    pub customer_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

// =============================================================================
// Client-Side Refinement
// =============================================================================

/// Which sale items survive refinement. Both parts must match when both
/// are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    pub product_id: Option<String>,
    /// Case-insensitive exact name match.
    pub product_name: Option<String>,
}

impl ItemFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        ItemFilter {
            product_id: None,
            product_name: Some(name.into()),
        }
    }

    pub fn matches(&self, item: &SaleItem) -> bool {
        let id_ok = self
            .product_id
            .as_deref()
            .map_or(true, |id| item.product_id == id);
        let name_ok = self
            .product_name
            .as_deref()
            .map_or(true, |name| names_match(&item.product_name, name));
        id_ok && name_ok
    }
}

fn names_match(item_name: &str, wanted: &str) -> bool {
    match (ProductKind::from_name(item_name), ProductKind::from_name(wanted)) {
        (Some(a), Some(b)) => a == b,
        _ => item_name.trim().to_lowercase() == wanted.trim().to_lowercase(),
    }
}

/// Applies the local product filter.
///
/// With a filter, each sale keeps only its matching items, sales left
/// without items are dropped, and `total_amount` becomes Σ quantity × unit
/// price over the survivors. Without a filter the input is returned as is.
/// Order is preserved either way.
pub fn refine(sales: Vec<Sale>, filter: Option<&ItemFilter>) -> Vec<Sale> {
    let Some(filter) = filter else {
        return sales;
    };

    sales
        .into_iter()
        .filter_map(|mut sale| {
            sale.items.retain(|item| filter.matches(item));
            if sale.items.is_empty() {
                return None;
            }
            sale.total_amount = sale.items_total();
            Some(sale)
        })
        .collect()
}

// =============================================================================
// Aggregation
// =============================================================================

/// Sales of one calendar day, in the order they were fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DayBucket {
    /// `YYYY-MM-DD`
    pub day: String,
    pub total: Money,
    pub sales: Vec<Sale>,
}

/// KPIs and day buckets for the report screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportSummary {
    /// Σ total_amount over every displayed sale.
    pub total: Money,
    /// Number of displayed sales.
    pub sale_count: usize,
    /// Number of displayed line items.
    pub item_count: usize,
    /// Newest day first.
    pub days: Vec<DayBucket>,
}

/// Computes the KPIs and groups sales by day.
///
/// Buckets are keyed by [`Sale::day_key`] and ordered by key, descending.
/// Inside a bucket the input order is kept. Empty input gives zero KPIs and
/// no buckets.
pub fn aggregate(sales: &[Sale]) -> ReportSummary {
    let mut days: BTreeMap<String, DayBucket> = BTreeMap::new();

    for sale in sales {
        let key = sale.day_key();
        let bucket = days.entry(key.clone()).or_insert_with(|| DayBucket {
            day: key,
            total: Money::zero(),
            sales: Vec::new(),
        });
        bucket.total += sale.total_amount;
        bucket.sales.push(sale.clone());
    }

    ReportSummary {
        total: sales.iter().map(|s| s.total_amount).sum(),
        sale_count: sales.len(),
        item_count: sales.iter().map(|s| s.items.len()).sum(),
        days: days.into_values().rev().collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerRef;
    use chrono::{DateTime, FixedOffset};
    use proptest::prelude::*;

    fn brt() -> ReportZone {
        ReportZone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap())
    }

    fn item(name: &str, quantity: i64, cents: i64) -> SaleItem {
        SaleItem {
            product_id: format!("p-{name}"),
            product_name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    fn sale(id: &str, created_at: &str, items: Vec<SaleItem>) -> Sale {
        let total = items.iter().map(SaleItem::subtotal).sum();
        Sale {
            id: id.to_string(),
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
            total_amount: total,
            payment_method: Some(PaymentMethod::Cash),
            customer: Some(CustomerRef {
                id: "c1".into(),
                name: "Maria".into(),
            }),
            items,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
    }

    // -------------------------------------------------------------------------
    // Filter state
    // -------------------------------------------------------------------------

    #[test]
    fn test_filter_apply_returns_new_value() {
        let base = ReportFilter::for_day(day("2025-01-10"));
        let next = base.apply_all([
            FilterAction::SetFrom("2025-01-01".into()),
            FilterAction::SetCustomer(Some("c1".into())),
            FilterAction::SetPaymentMethod(Some(PaymentMethod::Pix)),
            FilterAction::SetProductName(Some("  ".into())),
        ]);

        assert_eq!(base.from, "2025-01-10");
        assert_eq!(base.customer_id, None);
        assert_eq!(next.from, "2025-01-01");
        assert_eq!(next.to, "2025-01-10");
        assert_eq!(next.customer_id.as_deref(), Some("c1"));
        assert_eq!(next.payment_method, Some(PaymentMethod::Pix));
        assert_eq!(next.product_name, None);
        assert_eq!(next.item_filter(), None);
    }

    #[test]
    fn test_filter_preset_and_reset() {
        let today = day("2025-01-10");
        let filter = ReportFilter::for_day(today)
            .apply(FilterAction::SetProductName(Some("gas".into())))
            .apply(FilterAction::ApplyPreset {
                preset: Preset::Last7Days,
                today,
            });
        assert_eq!(filter.from, "2025-01-04");
        assert_eq!(filter.to, "2025-01-10");
        assert_eq!(filter.product_name.as_deref(), Some("gas"));

        let reset = filter.apply(FilterAction::Reset { today });
        assert_eq!(reset, ReportFilter::for_day(today));
    }

    #[test]
    fn test_filter_query_carries_pushdown_filters() {
        let filter = ReportFilter::for_day(day("2025-01-01")).apply_all([
            FilterAction::SetProductId(Some("p-gas".into())),
            FilterAction::SetPaymentMethod(Some(PaymentMethod::Card)),
        ]);
        let query = filter.query(brt()).unwrap();
        assert_eq!(query.range.start_rfc3339(), "2025-01-01T03:00:00Z");
        assert_eq!(query.product_id.as_deref(), Some("p-gas"));
        assert_eq!(query.customer_id, None);
        assert_eq!(query.payment_method, Some(PaymentMethod::Card));
    }

    #[test]
    fn test_filter_query_rejects_cleared_day() {
        let filter = ReportFilter::for_day(day("2025-01-01")).apply(FilterAction::SetTo(String::new()));
        assert!(matches!(
            filter.query(brt()),
            Err(crate::error::ReportError::InvalidRange(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Refinement
    // -------------------------------------------------------------------------

    #[test]
    fn test_refine_without_filter_passes_through() {
        let mut s = sale("s1", "2025-01-01T10:00:00-03:00", vec![item("gas", 1, 11000)]);
        // A stored total that disagrees with the items stays untouched
        s.total_amount = Money::from_cents(1);
        let out = refine(vec![s.clone()], None);
        assert_eq!(out, vec![s]);
    }

    #[test]
    fn test_refine_keeps_matching_items_and_recomputes_total() {
        let mixed = sale(
            "s1",
            "2025-01-01T10:00:00-03:00",
            vec![item("gas", 1, 11000), item("agua", 3, 1200)],
        );
        let gas_only = sale("s2", "2025-01-01T09:00:00-03:00", vec![item("gas", 2, 11000)]);

        let out = refine(vec![mixed, gas_only], Some(&ItemFilter::by_name("Agua")));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "s1");
        assert_eq!(out[0].items.len(), 1);
        assert_eq!(out[0].total_amount, Money::from_cents(3600));
    }

    #[test]
    fn test_refine_by_product_id() {
        let s = sale(
            "s1",
            "2025-01-01T10:00:00-03:00",
            vec![item("gas", 1, 11000), item("agua", 2, 1200)],
        );
        let filter = ItemFilter {
            product_id: Some("p-gas".into()),
            product_name: None,
        };
        let out = refine(vec![s], Some(&filter));
        assert_eq!(out[0].total_amount, Money::from_cents(11000));
    }

    #[test]
    fn test_refine_and_aggregate_saturate_instead_of_panicking() {
        let huge = sale(
            "s1",
            "2025-01-01T10:00:00-03:00",
            vec![item("gas", 2_147_483_647, 9_999_999_999), item("agua", 1, 1200)],
        );
        let out = refine(vec![huge.clone(), huge], Some(&ItemFilter::by_name("gas")));
        assert_eq!(out[0].total_amount.cents(), i64::MAX);

        let summary = aggregate(&out);
        assert_eq!(summary.total.cents(), i64::MAX);
        assert_eq!(summary.sale_count, 2);
    }

    #[test]
    fn test_day_bucket_follows_backend_offset() {
        // 23:30 in -03:00, reported by the backend in UTC
        let late = sale("s1", "2025-01-02T02:30:00+00:00", vec![item("gas", 1, 11000)]);
        let summary = aggregate(&[late]);
        assert_eq!(summary.days[0].day, "2025-01-02");
        assert_eq!(
            brt().format_timestamp(&summary.days[0].sales[0].created_at),
            "2025-01-01 23:30:00"
        );
    }

    #[test]
    fn test_name_match_accepts_accented_vocabulary() {
        let filter = ItemFilter::by_name("água");
        assert!(filter.matches(&item("agua", 1, 100)));
        assert!(!filter.matches(&item("gas", 1, 100)));
        assert!(ItemFilter::by_name("Carvão").matches(&item("carvão", 1, 100)));
    }

    // -------------------------------------------------------------------------
    // Aggregation
    // -------------------------------------------------------------------------

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[]);
        assert_eq!(summary, ReportSummary::default());
        assert!(summary.total.is_zero());
    }

    #[test]
    fn test_aggregate_groups_by_day_descending() {
        let sales = vec![
            sale("a", "2025-01-03T08:00:00-03:00", vec![item("gas", 1, 11000)]),
            sale("b", "2025-01-01T18:00:00-03:00", vec![item("agua", 2, 1000)]),
            sale("c", "2025-01-03T07:00:00-03:00", vec![item("agua", 1, 1000)]),
            sale("d", "2025-01-02T12:00:00-03:00", vec![item("gas", 1, 10000)]),
        ];
        let summary = aggregate(&sales);

        assert_eq!(summary.sale_count, 4);
        assert_eq!(summary.item_count, 4);
        assert_eq!(summary.total, Money::from_cents(24000));

        let keys: Vec<&str> = summary.days.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(keys, ["2025-01-03", "2025-01-02", "2025-01-01"]);

        let first_ids: Vec<&str> = summary.days[0].sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(first_ids, ["a", "c"]);
        assert_eq!(summary.days[0].total, Money::from_cents(12000));
    }

    #[test]
    fn test_day_key_uses_reported_offset() {
        // 23:59 in -03:00 is already the next day in UTC
        let s = sale("a", "2025-01-01T23:59:00-03:00", vec![item("gas", 1, 100)]);
        assert_eq!(aggregate(&[s]).days[0].day, "2025-01-01");
    }

    // -------------------------------------------------------------------------
    // Scenarios
    // -------------------------------------------------------------------------

    #[test]
    fn test_scenario_single_late_gas_sale() {
        let filter = ReportFilter::for_day(day("2025-01-01"));
        let range = filter.range(brt()).unwrap();
        let s = sale("s1", "2025-01-01T23:59:00-03:00", vec![item("gas", 2, 5000)]);
        assert!(range.contains(s.created_at.with_timezone(&chrono::Utc)));

        let refined = refine(vec![s], filter.item_filter().as_ref());
        let summary = aggregate(&refined);
        assert_eq!(summary.total.to_decimal_string(), "100.00");
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.days.len(), 1);
        assert_eq!(summary.days[0].sales.len(), 1);
    }

    #[test]
    fn test_scenario_water_filter_drops_gas_sale() {
        let filter = ReportFilter::for_day(day("2025-01-01"))
            .apply(FilterAction::SetProductName(Some("agua".into())));
        let s = sale("s1", "2025-01-01T23:59:00-03:00", vec![item("gas", 2, 5000)]);

        let refined = refine(vec![s], filter.item_filter().as_ref());
        let summary = aggregate(&refined);
        assert_eq!(summary.total.to_decimal_string(), "0.00");
        assert_eq!(summary.sale_count, 0);
        assert!(summary.days.is_empty());
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    fn arb_sale() -> impl Strategy<Value = Sale> {
        (
            0u32..40,
            0u32..24,
            prop::collection::vec((prop::bool::ANY, 1i64..20, 0i64..20_000), 1..5),
        )
            .prop_map(|(day_offset, hour, lines)| {
                let items = lines
                    .into_iter()
                    .map(|(is_gas, qty, cents)| item(if is_gas { "gas" } else { "agua" }, qty, cents))
                    .collect();
                let ts = format!(
                    "2025-01-{:02}T{:02}:00:00-03:00",
                    1 + day_offset % 28,
                    hour
                );
                sale("generated", &ts, items)
            })
    }

    proptest! {
        #[test]
        fn prop_refined_total_equals_matching_items(sales in prop::collection::vec(arb_sale(), 0..20)) {
            let sales: Vec<Sale> = sales
                .into_iter()
                .enumerate()
                .map(|(i, mut s)| {
                    s.id = format!("s{i}");
                    s
                })
                .collect();
            let filter = ItemFilter::by_name("gas");
            let refined = refine(sales.clone(), Some(&filter));

            for out in &refined {
                let original = sales.iter().find(|s| s.id == out.id).unwrap();
                let expected: Money = original
                    .items
                    .iter()
                    .filter(|i| i.product_name == "gas")
                    .map(SaleItem::subtotal)
                    .sum();
                prop_assert_eq!(out.total_amount, expected);
                prop_assert!(out.items.iter().all(|i| i.product_name == "gas"));
            }
            let with_gas = sales.iter().filter(|s| s.items.iter().any(|i| i.product_name == "gas")).count();
            prop_assert_eq!(refined.len(), with_gas);
        }

        #[test]
        fn prop_aggregate_is_a_descending_partition(sales in prop::collection::vec(arb_sale(), 0..30)) {
            let summary = aggregate(&sales);

            prop_assert_eq!(summary.sale_count, sales.len());
            let bucket_sum: Money = summary.days.iter().map(|d| d.total).sum();
            prop_assert_eq!(summary.total, bucket_sum);

            let bucketed: usize = summary.days.iter().map(|d| d.sales.len()).sum();
            prop_assert_eq!(bucketed, sales.len());

            for bucket in &summary.days {
                prop_assert!(bucket.sales.iter().all(|s| s.day_key() == bucket.day));
            }
            for pair in summary.days.windows(2) {
                prop_assert!(pair[0].day > pair[1].day);
            }
        }
    }
}
