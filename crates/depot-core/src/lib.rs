//! # depot-core: Pure Business Logic for the Depot console
//!
//! This crate holds everything the console computes on its own: money math,
//! date ranges in the business calendar, report refinement and aggregation,
//! dashboard tallies and CSV serialization. It never touches the network or
//! the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Depot Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/console (CLI)                           │   │
//! │  │    report ──► dashboard ──► sales ──► stock ──► customers       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ depot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │date_range │  │  report   │  │  export   │  │ dashboard │  │   │
//! │  │   │ DateRange │  │  refine   │  │ ReportRow │  │ StockLevel│  │   │
//! │  │   │  Preset   │  │ aggregate │  │  to_csv   │  │  tallies  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  depot-store (Backend Layer)                    │   │
//! │  │         PostgREST queries, auth sessions, RPC calls             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, SaleItem, Customer, Product, stock rows)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`date_range`] - Half-open day ranges in the business calendar
//! - [`report`] - Filter state, client-side refinement, KPIs, day buckets
//! - [`export`] - Flattened report rows and CSV serialization
//! - [`dashboard`] - Period tallies and stock level classification
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use depot_core::date_range::{DateRange, ReportZone};
//! use chrono::FixedOffset;
//!
//! let zone = ReportZone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap());
//! let range = DateRange::build("2025-01-01", "2025-01-01", zone).unwrap();
//!
//! assert_eq!(range.start_rfc3339(), "2025-01-01T03:00:00Z");
//! assert_eq!(range.end_rfc3339(), "2025-01-02T03:00:00Z");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod date_range;
pub mod error;
pub mod export;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use date_range::{DateRange, Preset, ReportZone};
pub use error::{CoreError, ReportError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted on a single sale line or stock entry.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 before the backend decrements stock.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of recent sales shown on the sales entry screen.
pub const RECENT_SALES_LIMIT: usize = 15;

/// Number of recent stock movements shown on the inventory screen.
pub const RECENT_MOVEMENTS_LIMIT: usize = 10;

/// Stock at or below this is critical.
pub const STOCK_CRITICAL_MAX: i64 = 5;

/// Stock at or below this (and above critical) is low.
pub const STOCK_LOW_MAX: i64 = 15;

/// Quantity that counts as a "full" stock bar.
pub const STOCK_BAR_BASE: i64 = 30;
