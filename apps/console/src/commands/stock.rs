//! # Stock Commands

use tracing::debug;

use depot_core::dashboard::StockGauge;
use depot_core::{validation, NewStockEntry};

use super::{resolve_product, Context, Reply};
use crate::error::ApiResult;
use crate::render;

pub async fn summary(ctx: &Context) -> ApiResult<Reply> {
    debug!("stock summary command");
    ctx.require_session().await?;

    let rows = ctx.backend.stock().summary().await?;
    let gauges: Vec<StockGauge> = rows.iter().map(StockGauge::from).collect();
    Reply::new(render::stock(&gauges), &gauges)
}

/// Records goods received for `product` (name or id).
pub async fn add(ctx: &Context, product: &str, quantity: i64, cost: Option<&str>) -> ApiResult<Reply> {
    debug!(product, quantity, "stock entry command");
    ctx.require_session().await?;

    let unit_cost = cost
        .map(|c| validation::parse_amount("unit_cost", c))
        .transpose()?;
    let products = ctx.backend.products().list().await?;
    let product = resolve_product(&products, Some(product))?;

    let entry = NewStockEntry {
        product_id: product.id.clone(),
        quantity,
        unit_cost,
    };
    ctx.backend.stock().add_entry(&entry).await?;

    Ok(Reply::message(format!(
        "Stock entry recorded: {} × {}",
        quantity,
        product.label()
    )))
}

pub async fn movements(ctx: &Context, limit: usize) -> ApiResult<Reply> {
    debug!(limit, "stock movements command");
    ctx.require_session().await?;

    let movements = ctx.backend.stock().recent_movements(limit).await?;
    Reply::new(render::movements(&ctx.config, &movements), &movements)
}
