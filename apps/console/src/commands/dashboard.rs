//! # Dashboard Command
//!
//! Three reads run concurrently; the unread count never fails the screen.

use chrono::NaiveDate;
use tracing::debug;

use depot_core::dashboard::{product_gauges, tally_products, DashboardSummary, PeriodKpis};
use depot_core::Preset;

use super::{Context, Reply};
use crate::error::ApiResult;
use crate::render;

pub async fn show(ctx: &Context, period: Preset) -> ApiResult<Reply> {
    let today = ctx.today();
    let summary = summarize(ctx, period, today).await?;
    Reply::new(render::dashboard(&ctx.config, period.label(), &summary), &summary)
}

pub async fn summarize(ctx: &Context, period: Preset, today: NaiveDate) -> ApiResult<DashboardSummary> {
    debug!(%period, %today, "dashboard command");
    ctx.require_session().await?;

    let range = period.range(today, ctx.zone())?;
    let sales = ctx.backend.sales();
    let stock = ctx.backend.stock();
    let conversations = ctx.backend.conversations();

    let (totals, items, stock_rows, unread) = tokio::join!(
        sales.period_totals(&range),
        sales.period_items(&range),
        stock.summary(),
        conversations.unread_count_or_zero(),
    );

    Ok(DashboardSummary {
        period: range.to_string(),
        kpis: PeriodKpis::from_totals(totals?),
        products: tally_products(&items?),
        stock: product_gauges(&stock_rows?),
        unread_messages: unread,
    })
}
