//! # Report Command
//!
//! ```text
//! ReportArgs ──► FilterAction* ──► ReportFilter
//!                                      │
//!                                      ▼
//!                       ReportState::refresh (fetch, refine, aggregate)
//!                                      │
//!                     ┌────────────────┴────────────────┐
//!                     ▼                                 ▼
//!              render::report                 --export: ReportState::export
//!                                                       │
//!                                                       ▼
//!                                              DownloadSink::save
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use depot_core::report::{FilterAction, ReportFilter, ReportSummary};

use super::{customer_id, Context, Reply};
use crate::cli::ReportArgs;
use crate::download::{DirectorySink, DownloadSink};
use crate::error::{ApiError, ApiResult};
use crate::render;
use crate::state::{RefreshOutcome, ReportState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// `2025-01-01..2025-01-31`
    pub range: String,
    pub filter: ReportFilter,
    pub summary: ReportSummary,
    /// Where the CSV was saved, when exported.
    pub export_path: Option<PathBuf>,
}

pub async fn run(ctx: &Context, args: ReportArgs) -> ApiResult<Reply> {
    let sink = args
        .export
        .as_ref()
        .map(|dir| DirectorySink::new(dir.clone().unwrap_or_else(|| ctx.config.export_dir())));
    let today = ctx.today();
    execute(ctx, args, today, sink.as_ref().map(|s| s as &dyn DownloadSink)).await
}

/// The filter the flags describe, starting from a one-day report for
/// `today`. A preset is applied before explicit days so `--from`/`--to`
/// win.
pub fn build_filter(args: &ReportArgs, today: NaiveDate, customer_id: Option<String>) -> ReportFilter {
    let mut actions = Vec::new();
    if let Some(preset) = args.preset {
        actions.push(FilterAction::ApplyPreset { preset, today });
    }
    if let Some(from) = &args.from {
        actions.push(FilterAction::SetFrom(from.clone()));
    }
    if let Some(to) = &args.to {
        actions.push(FilterAction::SetTo(to.clone()));
    }
    actions.push(FilterAction::SetProductName(args.product.clone()));
    actions.push(FilterAction::SetProductId(args.product_id.clone()));
    actions.push(FilterAction::SetCustomer(customer_id));
    actions.push(FilterAction::SetPaymentMethod(args.payment));

    ReportFilter::for_day(today).apply_all(actions)
}

pub async fn execute(
    ctx: &Context,
    args: ReportArgs,
    today: NaiveDate,
    sink: Option<&dyn DownloadSink>,
) -> ApiResult<Reply> {
    debug!(?args, "report command");
    ctx.require_session().await?;

    let customer = match args.customer.as_deref() {
        Some(key) => Some(customer_id(ctx, key).await?),
        None => None,
    };
    let filter = build_filter(&args, today, customer);

    let state = ReportState::new(Arc::new(ctx.backend.sales()), ctx.zone());
    match state.refresh(&filter).await? {
        RefreshOutcome::Applied(_) => {}
        RefreshOutcome::Superseded { seq, latest } => {
            return Err(ApiError::internal(format!(
                "Report request {seq} was superseded by {latest}"
            )));
        }
    }

    let export_path = match sink {
        Some(sink) => save_export(&state, sink).await?,
        None => None,
    };

    let (text, response) = state.with_view(|view| {
        let range = view.range.clone();
        let text = range
            .as_ref()
            .map(|range| render::report(&ctx.config, range, &filter, &view.summary))
            .unwrap_or_default();
        let response = ReportResponse {
            range: range.map(|r| r.to_string()).unwrap_or_default(),
            filter: filter.clone(),
            summary: view.summary.clone(),
            export_path: export_path.clone(),
        };
        (text, response)
    });

    let text = match &export_path {
        Some(path) => format!("{text}\n\nSaved {}", path.display()),
        None => text,
    };
    Reply::new(text, &response)
}

/// Nothing loaded means nothing to save, and that is not reported.
async fn save_export(state: &ReportState, sink: &dyn DownloadSink) -> ApiResult<Option<PathBuf>> {
    let export = match state.export() {
        Ok(export) => export,
        Err(e) if e.is_silent() => {
            warn!("Export skipped: {}", e);
            return Ok(None);
        }
        Err(e) => return Err(ApiError::from(e)),
    };

    let path = sink.save(&export.filename, &export.bytes).await?;
    debug!(rows = export.row_count, path = ?path, "Report exported");
    Ok(Some(path))
}
