//! # Customer Commands

use tracing::debug;

use depot_core::CustomerDraft;

use super::{Context, Reply};
use crate::cli::CustomerFields;
use crate::error::ApiResult;
use crate::render;

impl From<CustomerFields> for CustomerDraft {
    fn from(fields: CustomerFields) -> Self {
        CustomerDraft {
            name: fields.name,
            phone: fields.phone,
            address: fields.address,
        }
    }
}

pub async fn list(ctx: &Context, search: Option<&str>) -> ApiResult<Reply> {
    debug!(?search, "list customers command");
    ctx.require_session().await?;

    let customers = ctx.backend.customers().list(search).await?;
    Reply::new(render::customers(&customers), &customers)
}

pub async fn add(ctx: &Context, fields: CustomerFields) -> ApiResult<Reply> {
    debug!("add customer command");
    ctx.require_session().await?;

    let customer = ctx.backend.customers().create(fields.into()).await?;
    Reply::new(
        format!("Customer created\n{}", render::customer_line(&customer)),
        &customer,
    )
}

pub async fn edit(ctx: &Context, id: &str, fields: CustomerFields) -> ApiResult<Reply> {
    debug!(id, "edit customer command");
    ctx.require_session().await?;

    let customer = ctx.backend.customers().update(id, fields.into()).await?;
    Reply::new(
        format!("Customer updated\n{}", render::customer_line(&customer)),
        &customer,
    )
}

pub async fn delete(ctx: &Context, id: &str) -> ApiResult<Reply> {
    debug!(id, "delete customer command");
    ctx.require_session().await?;

    ctx.backend.customers().delete(id).await?;
    Ok(Reply::message(format!("Customer {id} deleted")))
}
