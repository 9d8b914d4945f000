//! # Text Rendering
//!
//! Plain-text screens for the terminal. Each function takes the data a
//! command produced and returns the text to print; nothing here talks to
//! the backend.
//!
//! ```text
//! Sales report 2025-01-01..2025-01-31 (product: agua)
//!
//!   Total     R$ 360.00
//!   Sales     12
//!   Items     12
//!
//! 2025-01-31                                    R$ 24.00
//!   2025-01-31 18:02:11  Maria        pix       R$ 24.00
//!       2 × ÁGUA @ R$ 12.00 = R$ 24.00
//! ```

use depot_core::dashboard::{DashboardSummary, StockGauge, StockLevel};
use depot_core::report::{ReportFilter, ReportSummary};
use depot_core::{product_label, Customer, DateRange, ReportZone, Sale, StockMovement};

use crate::state::ConsoleConfig;

/// Customer column for a sale without one.
pub const WALK_IN: &str = "walk-in";

const BAR_CELLS: usize = 20;

/// The report screen: range, active filters, KPIs and day buckets.
pub fn report(
    config: &ConsoleConfig,
    range: &DateRange,
    filter: &ReportFilter,
    summary: &ReportSummary,
) -> String {
    let zone = config.zone();
    let mut lines = Vec::new();

    let filters = active_filters(filter);
    if filters.is_empty() {
        lines.push(format!("Sales report {range}"));
    } else {
        lines.push(format!("Sales report {range} ({})", filters.join(", ")));
    }
    lines.push(String::new());
    lines.push(format!("  Total     {}", config.format_currency(summary.total)));
    lines.push(format!("  Sales     {}", summary.sale_count));
    lines.push(format!("  Items     {}", summary.item_count));

    if summary.days.is_empty() {
        lines.push(String::new());
        lines.push("No sales in this period.".to_string());
    }

    for bucket in &summary.days {
        lines.push(String::new());
        lines.push(format!(
            "{:<46}{}",
            bucket.day,
            config.format_currency(bucket.total)
        ));
        for sale in &bucket.sales {
            push_sale(&mut lines, config, zone, sale);
        }
    }

    lines.join("\n")
}

fn active_filters(filter: &ReportFilter) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(name) = &filter.product_name {
        parts.push(format!("product: {name}"));
    }
    if let Some(id) = &filter.product_id {
        parts.push(format!("product id: {id}"));
    }
    if let Some(id) = &filter.customer_id {
        parts.push(format!("customer: {id}"));
    }
    if let Some(method) = filter.payment_method {
        parts.push(format!("payment: {method}"));
    }
    parts
}

fn push_sale(lines: &mut Vec<String>, config: &ConsoleConfig, zone: ReportZone, sale: &Sale) {
    lines.push(format!(
        "  {}  {:<12} {:<9} {}",
        zone.format_timestamp(&sale.created_at),
        sale.customer_name().unwrap_or(WALK_IN),
        sale.payment_method.map(|m| m.as_str()).unwrap_or("-"),
        config.format_currency(sale.total_amount),
    ));
    for item in &sale.items {
        lines.push(format!(
            "      {} × {} @ {} = {}",
            item.quantity,
            product_label(&item.product_name),
            config.format_currency(item.unit_price),
            config.format_currency(item.subtotal()),
        ));
    }
}

/// The home screen.
pub fn dashboard(config: &ConsoleConfig, label: &str, summary: &DashboardSummary) -> String {
    let mut lines = vec![
        format!("{label} ({})", summary.period),
        String::new(),
        format!(
            "  Sales     {}  ({} sales)",
            config.format_currency(summary.kpis.total),
            summary.kpis.sale_count
        ),
    ];

    for tally in &summary.products {
        lines.push(format!(
            "  {:<8}  {:>4} un  {}",
            tally.kind.label(),
            tally.quantity,
            config.format_currency(tally.total)
        ));
    }

    lines.push(String::new());
    lines.push("Stock".to_string());
    lines.extend(summary.stock.iter().map(gauge_line));

    lines.push(String::new());
    lines.push(format!("Unread messages: {}", summary.unread_messages));
    lines.join("\n")
}

/// `[████████░░░░░░░░░░░░]`
pub fn bar(fill_percent: u8) -> String {
    let filled = (usize::from(fill_percent.min(100)) * BAR_CELLS + 50) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

fn level_tag(level: StockLevel) -> &'static str {
    match level {
        StockLevel::Critical => "CRITICAL",
        StockLevel::Low => "low",
        StockLevel::Ok => "ok",
    }
}

fn gauge_line(gauge: &StockGauge) -> String {
    format!(
        "  {:<8}  {} {:>4}  {}",
        gauge.name,
        bar(gauge.fill_percent),
        gauge.quantity,
        level_tag(gauge.level)
    )
}

/// The inventory screen.
pub fn stock(gauges: &[StockGauge]) -> String {
    if gauges.is_empty() {
        return "No products in stock view.".to_string();
    }
    gauges
        .iter()
        .map(|gauge| {
            gauge_line(&StockGauge {
                name: product_label(&gauge.name),
                ..gauge.clone()
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn movements(config: &ConsoleConfig, movements: &[StockMovement]) -> String {
    if movements.is_empty() {
        return "No stock movements yet.".to_string();
    }
    let zone = config.zone();
    movements
        .iter()
        .map(|m| {
            let cost = m
                .unit_cost
                .map(|c| format!("  @ {}", config.format_currency(c)))
                .unwrap_or_default();
            format!(
                "{}  {:<3}  {:>4} × {}{}",
                zone.format_timestamp(&m.created_at),
                m.movement_type.as_str(),
                m.quantity,
                product_label(&m.product_name),
                cost
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn customers(customers: &[Customer]) -> String {
    if customers.is_empty() {
        return "No customers found.".to_string();
    }
    customers
        .iter()
        .map(customer_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn customer_line(customer: &Customer) -> String {
    format!(
        "{}  {:<24} {:<16} {}",
        customer.id,
        customer.name,
        customer.phone.as_deref().unwrap_or("-"),
        customer.address.as_deref().unwrap_or("-")
    )
}

/// The sales screen's recent list.
pub fn recent_sales(config: &ConsoleConfig, sales: &[Sale]) -> String {
    if sales.is_empty() {
        return "No sales yet.".to_string();
    }
    let zone = config.zone();
    let mut lines = Vec::new();
    for sale in sales {
        push_sale(&mut lines, config, zone, sale);
    }
    lines.join("\n")
}
