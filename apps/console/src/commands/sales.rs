//! # Sale Commands
//!
//! ```text
//! SaleForm ──► catalog lookup (default: gas) ──► price (default: catalog)
//!                                                     │
//!                     customer name/id ──► id ────────┤
//!                                                     ▼
//!                                   NewSale ──► rpc register_sale (atomic)
//! ```

use serde::Serialize;
use tracing::debug;

use depot_core::{product_label, validation, Money, NewSale, PaymentMethod};

use super::{customer_id, resolve_product, Context, Reply};
use crate::error::ApiResult;
use crate::render;

/// The sales screen's one-line form, as typed.
#[derive(Debug, Clone)]
pub struct SaleForm {
    /// Name or id; `None` picks the default product.
    pub product: Option<String>,
    pub quantity: i64,
    /// `None` uses the catalog price.
    pub price: Option<String>,
    pub payment: PaymentMethod,
    /// Name or id; `None` is a walk-in sale.
    pub customer: Option<String>,
}

impl Default for SaleForm {
    fn default() -> Self {
        SaleForm {
            product: None,
            quantity: 1,
            price: None,
            payment: PaymentMethod::Cash,
            customer: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSaleResponse {
    pub sale_id: Option<String>,
    pub product: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
}

pub async fn register(ctx: &Context, form: SaleForm) -> ApiResult<Reply> {
    debug!(?form, "register sale command");
    ctx.require_session().await?;

    let products = ctx.backend.products().list().await?;
    let product = resolve_product(&products, form.product.as_deref())?;
    let unit_price = match form.price.as_deref() {
        Some(price) => validation::parse_amount("unit_price", price)?,
        None => product.price,
    };
    let customer_id = match form.customer.as_deref() {
        Some(key) => Some(customer_id(ctx, key).await?),
        None => None,
    };

    let sale = NewSale {
        customer_id,
        product_id: product.id.clone(),
        quantity: form.quantity,
        unit_price,
        payment_method: form.payment,
    };
    let sale_id = ctx.backend.sales().register(&sale).await?;

    let response = RegisterSaleResponse {
        sale_id,
        product: product.name.clone(),
        quantity: sale.quantity,
        unit_price: sale.unit_price,
        total: sale.total(),
        payment_method: sale.payment_method,
        customer_id: sale.customer_id.clone(),
    };
    let text = format!(
        "Sale registered: {} × {} = {} ({})",
        sale.quantity,
        product_label(&product.name),
        ctx.config.format_currency(sale.total()),
        sale.payment_method.label()
    );
    Reply::new(text, &response)
}

pub async fn recent(ctx: &Context, limit: usize) -> ApiResult<Reply> {
    debug!(limit, "recent sales command");
    ctx.require_session().await?;

    let sales = ctx.backend.sales().recent(limit).await?;
    Reply::new(render::recent_sales(&ctx.config, &sales), &sales)
}

pub async fn products(ctx: &Context) -> ApiResult<Reply> {
    debug!("products command");
    ctx.require_session().await?;

    let products = ctx.backend.products().list().await?;
    let text = if products.is_empty() {
        "No products in the catalog.".to_string()
    } else {
        products
            .iter()
            .map(|p| format!("{}  {:<8} {}", p.id, p.label(), ctx.config.format_currency(p.price)))
            .collect::<Vec<_>>()
            .join("\n")
    };
    Reply::new(text, &products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;
    use httpmock::prelude::*;
    use serde_json::json;

    const MARIA: &str = "5f0c6a7e-1c2b-4d3e-8f9a-0b1c2d3e4f50";

    async fn catalog(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/products");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([
                        { "id": "p-agua", "name": "agua", "unit_price": 12 },
                        { "id": "p-gas", "name": "gas", "unit_price": 110 }
                    ]));
            })
            .await;
    }

    fn form() -> SaleForm {
        SaleForm::default()
    }

    #[tokio::test]
    async fn test_defaults_to_gas_at_catalog_price() {
        let server = MockServer::start_async().await;
        catalog(&server).await;
        let rpc = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/rpc/register_sale")
                    .json_body(json!({
                        "customer_id": null,
                        "product_id": "p-gas",
                        "quantity": 1,
                        "unit_price": 110.0,
                        "payment_method": "dinheiro"
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!("s-42"));
            })
            .await;

        let ctx = test_support::context(&server, true).await;
        let reply = register(&ctx, form()).await.unwrap();
        rpc.assert_async().await;
        assert_eq!(reply.text, "Sale registered: 1 × GÁS = R$ 110.00 (Cash)");
        assert_eq!(reply.json["saleId"], "s-42");
    }

    #[tokio::test]
    async fn test_customer_by_name_and_typed_price() {
        let server = MockServer::start_async().await;
        catalog(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/customers")
                    .query_param("select", "id,name");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([{ "id": MARIA, "name": "Maria" }]));
            })
            .await;
        let rpc = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/rpc/register_sale")
                    .json_body(json!({
                        "customer_id": MARIA,
                        "product_id": "p-agua",
                        "quantity": 3,
                        "unit_price": 11.5,
                        "payment_method": "pix"
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!(null));
            })
            .await;

        let ctx = test_support::context(&server, true).await;
        let reply = register(
            &ctx,
            SaleForm {
                product: Some("agua".into()),
                quantity: 3,
                price: Some("11,50".into()),
                payment: PaymentMethod::Pix,
                customer: Some("maria".into()),
            },
        )
        .await
        .unwrap();
        rpc.assert_async().await;
        assert_eq!(reply.json["total"], 3450);
        assert_eq!(reply.json["saleId"], json!(null));
    }

    #[tokio::test]
    async fn test_zero_quantity_never_reaches_rpc() {
        let server = MockServer::start_async().await;
        catalog(&server).await;
        let rpc = server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/rpc/register_sale");
                then.status(200).json_body(json!(null));
            })
            .await;

        let ctx = test_support::context(&server, true).await;
        let err = register(&ctx, SaleForm { quantity: 0, ..form() }).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        rpc.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/products");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([]));
            })
            .await;

        let ctx = test_support::context(&server, true).await;
        let err = register(&ctx, form()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "No products available");
    }
}
