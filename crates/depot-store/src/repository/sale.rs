//! # Sale Repository
//!
//! Backend operations for sales and sale items.
//!
//! ## Report Query
//! ```text
//! GET /rest/v1/sales
//!     ?select=id,created_at,total_amount,payment_method,customer_id,
//!             customers(name),
//!             sale_items(quantity,unit_price,product_id,products(name))
//!     &created_at=gte.<start of from-day, UTC>
//!     &created_at=lt.<start of day after to-day, UTC>
//!     [&customer_id=eq.<id>]
//!     [&payment_method=eq.<dinheiro|pix|cartao>]
//!     &order=created_at.desc
//! ```
//!
//! With a product id filter the embed becomes `sale_items!inner(...)` plus
//! `sale_items.product_id=eq.<id>`, so only sales containing that product
//! come back, carrying only that product's items.
//!
//! ## Registration
//! A sale and its single item are written by the `register_sale` procedure
//! in one transaction; the console never inserts into `sales` directly.

use async_trait::async_trait;
use depot_core::report::SalesQuery;
use depot_core::{DateRange, Money, NewSale, Sale, SaleItem};
use serde_json::json;
use tracing::{debug, info};

use crate::client::RestClient;
use crate::error::StoreResult;
use crate::query::Query;
use crate::wire::{self, RegisteredSale, SaleItemRow, SaleRow, SaleTotalRow};

const ITEM_COLUMNS: &str = "quantity,unit_price,product_id,products(name)";
const SALE_COLUMNS: &str = "id,created_at,total_amount,payment_method,customer_id,customers(name)";

/// Anything that can answer the report query.
///
/// The console's report state talks to this trait so tests can substitute
/// a scripted source.
#[async_trait]
pub trait SalesSource: Send + Sync {
    async fn fetch_report(&self, query: &SalesQuery) -> StoreResult<Vec<Sale>>;
}

/// Repository for sale operations.
///
/// ## Usage
/// ```rust,ignore
/// let sales = backend.sales().report(&query).await?;
/// let recent = backend.sales().recent(15).await?;
/// let id = backend.sales().register(&new_sale).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    client: RestClient,
}

impl SaleRepository {
    pub fn new(client: RestClient) -> Self {
        SaleRepository { client }
    }

    /// Query pairs for a report fetch, newest first.
    pub fn report_query(query: &SalesQuery) -> Query {
        let select = match query.product_id {
            Some(_) => format!("{SALE_COLUMNS},sale_items!inner({ITEM_COLUMNS})"),
            None => format!("{SALE_COLUMNS},sale_items({ITEM_COLUMNS})"),
        };

        Query::select(select)
            .gte("created_at", query.range.start_rfc3339())
            .lt("created_at", query.range.end_rfc3339())
            .eq_opt("sale_items.product_id", query.product_id.as_deref())
            .eq_opt("customer_id", query.customer_id.as_deref())
            .eq_opt("payment_method", query.payment_method.map(|m| m.as_str()))
            .order_desc("created_at")
    }

    /// Sales inside the range matching the pushed-down filters, with items.
    pub async fn report(&self, query: &SalesQuery) -> StoreResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = self.client.select("sales", &Self::report_query(query)).await?;
        let sales: Vec<Sale> = wire::convert_all(rows)?;
        debug!(range = %query.range, count = sales.len(), "Report sales fetched");
        Ok(sales)
    }

    /// Latest sales regardless of date.
    pub async fn recent(&self, limit: usize) -> StoreResult<Vec<Sale>> {
        let query = Query::select(format!("{SALE_COLUMNS},sale_items({ITEM_COLUMNS})"))
            .order_desc("created_at")
            .limit(limit);
        let rows: Vec<SaleRow> = self.client.select("sales", &query).await?;
        wire::convert_all(rows)
    }

    /// Registers a one-item sale atomically. Returns the new sale id when
    /// the procedure reports one.
    ///
    /// The sale is validated before anything is sent.
    pub async fn register(&self, sale: &NewSale) -> StoreResult<Option<String>> {
        sale.validate()?;

        let body = json!({
            "customer_id": sale.customer_id,
            "product_id": sale.product_id,
            "quantity": sale.quantity,
            "unit_price": wire::money_json(sale.unit_price),
            "payment_method": sale.payment_method.as_str(),
        });
        let registered: RegisteredSale = self.client.rpc("register_sale", &body).await?;
        let id = registered.into_id();

        info!(
            sale_id = ?id,
            product_id = %sale.product_id,
            quantity = sale.quantity,
            total = %sale.total(),
            "Sale registered"
        );
        Ok(id)
    }

    /// Stored totals of the sales inside `range`, for the dashboard KPIs.
    pub async fn period_totals(&self, range: &DateRange) -> StoreResult<Vec<Money>> {
        let query = Query::select("total_amount,created_at")
            .gte("created_at", range.start_rfc3339())
            .lt("created_at", range.end_rfc3339());
        let rows: Vec<SaleTotalRow> = self.client.select("sales", &query).await?;
        Ok(rows.into_iter().map(|r| r.total_amount).collect())
    }

    /// Items of the sales inside `range`, for the per-product breakdown.
    pub async fn period_items(&self, range: &DateRange) -> StoreResult<Vec<SaleItem>> {
        let query = Query::select(format!("{ITEM_COLUMNS},sales!inner(created_at)"))
            .gte("sales.created_at", range.start_rfc3339())
            .lt("sales.created_at", range.end_rfc3339());
        let rows: Vec<SaleItemRow> = self.client.select("sale_items", &query).await?;
        wire::convert_all(rows)
    }
}

#[async_trait]
impl SalesSource for SaleRepository {
    async fn fetch_report(&self, query: &SalesQuery) -> StoreResult<Vec<Sale>> {
        self.report(query).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Backend, BackendConfig};
    use crate::error::StoreError;
    use chrono::FixedOffset;
    use depot_core::{Money, PaymentMethod, ReportZone};
    use httpmock::prelude::*;

    fn backend(server: &MockServer) -> Backend {
        Backend::new(BackendConfig::new(&server.base_url(), "anon").unwrap()).unwrap()
    }

    fn brt() -> ReportZone {
        ReportZone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap())
    }

    fn query(product_id: Option<&str>) -> SalesQuery {
        SalesQuery {
            range: DateRange::build("2025-01-01", "2025-01-01", brt()).unwrap(),
            product_id: product_id.map(String::from),
            customer_id: Some("c-1".into()),
            payment_method: Some(PaymentMethod::Pix),
        }
    }

    fn pairs(query: &Query) -> Vec<(&str, &str)> {
        query
            .pairs()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_report_query_pairs() {
        let q = SaleRepository::report_query(&query(None));
        assert_eq!(
            pairs(&q),
            [
                (
                    "select",
                    "id,created_at,total_amount,payment_method,customer_id,customers(name),\
                     sale_items(quantity,unit_price,product_id,products(name))"
                ),
                ("created_at", "gte.2025-01-01T03:00:00Z"),
                ("created_at", "lt.2025-01-02T03:00:00Z"),
                ("customer_id", "eq.c-1"),
                ("payment_method", "eq.pix"),
                ("order", "created_at.desc"),
            ]
        );
    }

    #[test]
    fn test_report_query_product_inner_join() {
        let q = SaleRepository::report_query(&query(Some("p-gas")));
        assert!(q
            .get("select")
            .unwrap()
            .ends_with("sale_items!inner(quantity,unit_price,product_id,products(name))"));
        assert_eq!(q.get("sale_items.product_id"), Some("eq.p-gas"));
    }

    #[tokio::test]
    async fn test_report_fetch_decodes_sales() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/sales")
                    .header("apikey", "anon")
                    .header("authorization", "Bearer anon")
                    .query_param("customer_id", "eq.c-1")
                    .query_param("order", "created_at.desc");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!([
                        {
                            "id": "s-2",
                            "created_at": "2025-01-01T20:00:00-03:00",
                            "total_amount": 24,
                            "payment_method": "pix",
                            "customer_id": "c-1",
                            "customers": { "name": "Ana" },
                            "sale_items": [
                                { "quantity": 2, "unit_price": 12, "product_id": "p-agua", "products": { "name": "agua" } }
                            ]
                        },
                        {
                            "id": "s-1",
                            "created_at": "2025-01-01T08:00:00-03:00",
                            "total_amount": 110,
                            "payment_method": "pix",
                            "customer_id": "c-1",
                            "customers": { "name": "Ana" },
                            "sale_items": []
                        }
                    ]));
            })
            .await;

        let sales = backend(&server).sales().report(&query(None)).await.unwrap();
        mock.assert_async().await;
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].id, "s-2");
        assert_eq!(sales[0].items[0].subtotal(), Money::from_cents(2400));
        assert!(sales[1].items.is_empty());
    }

    #[tokio::test]
    async fn test_report_failure_keeps_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/sales");
                then.status(400)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({
                        "message": "failed to parse filter (gte.bad)",
                        "code": "PGRST100",
                        "details": null,
                        "hint": null
                    }));
            })
            .await;

        let err = backend(&server)
            .sales()
            .fetch_report(&query(None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend { status: 400, .. }));
        let report: depot_core::ReportError = err.into();
        assert_eq!(report.to_string(), "failed to parse filter (gte.bad)");
    }

    #[tokio::test]
    async fn test_register_calls_procedure() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/rpc/register_sale")
                    .json_body(serde_json::json!({
                        "customer_id": null,
                        "product_id": "p-gas",
                        "quantity": 2,
                        "unit_price": 110.5,
                        "payment_method": "dinheiro"
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!("s-77"));
            })
            .await;

        let sale = NewSale {
            customer_id: None,
            product_id: "p-gas".into(),
            quantity: 2,
            unit_price: Money::from_cents(11050),
            payment_method: PaymentMethod::Cash,
        };
        let id = backend(&server).sales().register(&sale).await.unwrap();
        mock.assert_async().await;
        assert_eq!(id.as_deref(), Some("s-77"));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_before_sending() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/rpc/register_sale");
                then.status(200);
            })
            .await;

        let sale = NewSale {
            customer_id: None,
            product_id: "p-gas".into(),
            quantity: 0,
            unit_price: Money::from_cents(11000),
            payment_method: PaymentMethod::Cash,
        };
        assert!(matches!(
            backend(&server).sales().register(&sale).await,
            Err(StoreError::Invalid(_))
        ));
        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_period_items_filters_on_parent_sale() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/sale_items")
                    .query_param(
                        "select",
                        "quantity,unit_price,product_id,products(name),sales!inner(created_at)",
                    );
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!([
                        {
                            "quantity": 3,
                            "unit_price": "110.00",
                            "product_id": "p-gas",
                            "products": { "name": "gas" },
                            "sales": { "created_at": "2025-01-01T10:00:00+00:00" }
                        }
                    ]));
            })
            .await;

        let range = DateRange::build("2025-01-01", "2025-01-01", brt()).unwrap();
        let items = backend(&server).sales().period_items(&range).await.unwrap();
        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].subtotal(), Money::from_cents(33000));
    }
}
