//! # Stock Repository
//!
//! Stock levels and goods-received entries.
//!
//! ## Data Sources
//! ```text
//! v_stock_summary   view: one row per product, quantity = Σ in − Σ out
//! stock_movements   table: every in/out movement; sales write "out" rows
//!                   through register_sale, the console writes "in" rows
//! ```

use depot_core::{MovementType, NewStockEntry, StockMovement, StockSummaryRow};
use serde_json::json;
use tracing::info;

use crate::client::RestClient;
use crate::error::StoreResult;
use crate::query::Query;
use crate::wire::{self, MovementRow, StockSummaryWire};

#[derive(Debug, Clone)]
pub struct StockRepository {
    client: RestClient,
}

impl StockRepository {
    pub fn new(client: RestClient) -> Self {
        StockRepository { client }
    }

    /// Current quantity per product, by name.
    pub async fn summary(&self) -> StoreResult<Vec<StockSummaryRow>> {
        let rows: Vec<StockSummaryWire> = self
            .client
            .select("v_stock_summary", &Query::select("*").order_asc("name"))
            .await?;
        Ok(rows.into_iter().map(StockSummaryRow::from).collect())
    }

    /// Records goods received. Validated before sending.
    pub async fn add_entry(&self, entry: &NewStockEntry) -> StoreResult<()> {
        entry.validate()?;

        let body = json!({
            "product_id": entry.product_id,
            "type": MovementType::In.as_str(),
            "quantity": entry.quantity,
            "unit_cost": entry.unit_cost.map(wire::money_json),
        });
        self.client.insert_minimal("stock_movements", &body).await?;

        info!(
            product_id = %entry.product_id,
            quantity = entry.quantity,
            "Stock entry recorded"
        );
        Ok(())
    }

    /// Latest movements, newest first.
    pub async fn recent_movements(&self, limit: usize) -> StoreResult<Vec<StockMovement>> {
        let query = Query::select("id,type,quantity,unit_cost,created_at,product_id,products(name)")
            .order_desc("created_at")
            .limit(limit);
        let rows: Vec<MovementRow> = self.client.select("stock_movements", &query).await?;
        wire::convert_all(rows)
    }
}
