//! # Report State
//!
//! The in-memory view model of the sales report screen.
//!
//! ## Refresh Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ReportFilter ──► DateRange ──► seq = next() ──► SalesSource::fetch     │
//! │        │              │                               │                 │
//! │        │        InvalidRange                          ▼                 │
//! │        │        (nothing sent)              seq still the latest?       │
//! │        │                                     │              │           │
//! │        │                                    yes             no          │
//! │        │                                     │              │           │
//! │        │                                     ▼              ▼           │
//! │        └──────────── item filter ────► refine ──► aggregate  discard    │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                         ReportView                      │
//! │                                                                         │
//! │  A failed fetch records the message and leaves the previous rows.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The view sits behind a `Mutex`; the sequence counter is atomic so a
//! refresh can be issued while another is in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use depot_core::export::{export_report, CsvExport};
use depot_core::report::{aggregate, refine, ReportFilter, ReportSummary};
use depot_core::{DateRange, ReportError, ReportZone, Sale};
use depot_store::SalesSource;

/// What the report screen currently shows.
#[derive(Debug, Clone, Default)]
pub struct ReportView {
    /// Filter of the last applied result.
    pub filter: Option<ReportFilter>,
    pub range: Option<DateRange>,
    /// Refined sales, newest first.
    pub sales: Vec<Sale>,
    pub summary: ReportSummary,
    /// Sequence number of the applied result; 0 before the first one.
    pub applied_seq: u64,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
}

impl ReportView {
    pub fn is_loaded(&self) -> bool {
        self.applied_seq > 0
    }
}

/// Result of a refresh that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was the latest and is now displayed.
    Applied(ReportSummary),
    /// A newer refresh was issued while this one was in flight.
    Superseded { seq: u64, latest: u64 },
}

pub struct ReportState {
    source: Arc<dyn SalesSource>,
    zone: ReportZone,
    issued: AtomicU64,
    view: Mutex<ReportView>,
}

impl ReportState {
    pub fn new(source: Arc<dyn SalesSource>, zone: ReportZone) -> Self {
        ReportState {
            source,
            zone,
            issued: AtomicU64::new(0),
            view: Mutex::new(ReportView::default()),
        }
    }

    pub fn zone(&self) -> ReportZone {
        self.zone
    }

    /// Executes a function with read access to the view.
    pub fn with_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ReportView) -> R,
    {
        let view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&view)
    }

    fn with_view_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ReportView) -> R,
    {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut view)
    }

    /// Fetches, refines and aggregates the report for `filter`.
    ///
    /// ## Errors
    /// - `InvalidRange`: nothing is sent and the view is untouched
    /// - `ReportQueryFailed`: the message is recorded, previous rows stay
    ///
    /// A response overtaken by a newer refresh is dropped, success or
    /// failure, and reported as [`RefreshOutcome::Superseded`].
    pub async fn refresh(&self, filter: &ReportFilter) -> Result<RefreshOutcome, ReportError> {
        let query = filter.query(self.zone)?;
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, range = %query.range, "Report requested");

        let result = self.source.fetch_report(&query).await;

        // Check and apply under one lock so an older response can never
        // overwrite a newer one.
        self.with_view_mut(|view| {
            let latest = self.issued.load(Ordering::SeqCst);
            if seq != latest {
                warn!(seq, latest, "Discarding superseded report response");
                return Ok(RefreshOutcome::Superseded { seq, latest });
            }

            match result {
                Ok(sales) => {
                    let sales = refine(sales, filter.item_filter().as_ref());
                    let summary = aggregate(&sales);
                    info!(
                        seq,
                        sales = summary.sale_count,
                        days = summary.days.len(),
                        "Report updated"
                    );
                    *view = ReportView {
                        filter: Some(filter.clone()),
                        range: Some(query.range),
                        sales,
                        summary: summary.clone(),
                        applied_seq: seq,
                        error: None,
                    };
                    Ok(RefreshOutcome::Applied(summary))
                }
                Err(e) => {
                    let err = ReportError::from(e);
                    view.error = Some(err.to_string());
                    Err(err)
                }
            }
        })
    }

    /// CSV of the displayed sales.
    ///
    /// ## Errors
    /// `ExportNoOp` until a result has been applied. A loaded but empty
    /// result exports the placeholder row.
    pub fn export(&self) -> Result<CsvExport, ReportError> {
        self.with_view(|view| match (&view.range, view.is_loaded()) {
            (Some(range), true) => export_report(&view.sales, range, self.zone),
            _ => Err(ReportError::ExportNoOp),
        })
    }
}
