//! # Customer Repository
//!
//! Customer CRUD and name search.
//!
//! ## Key Operations
//! - List, newest first, optionally filtered by a case-insensitive name
//!   fragment
//! - Id/name options for the report and sales customer pickers
//! - Create, update and delete

use depot_core::validation::validate_search_query;
use depot_core::{Customer, CustomerDraft, CustomerRef};
use serde_json::json;
use tracing::info;

use crate::client::RestClient;
use crate::error::{StoreError, StoreResult};
use crate::query::Query;
use crate::wire::{self, CustomerRow};

const CUSTOMER_COLUMNS: &str = "id,name,phone,address,created_at";

/// Repository for customer operations.
///
/// ## Usage
/// ```rust,ignore
/// let all = backend.customers().list(None).await?;
/// let some = backend.customers().list(Some("ana")).await?;
/// let created = backend.customers().create(draft).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    client: RestClient,
}

impl CustomerRepository {
    pub fn new(client: RestClient) -> Self {
        CustomerRepository { client }
    }

    pub fn list_query(search: Option<&str>) -> StoreResult<Query> {
        let mut query = Query::select(CUSTOMER_COLUMNS);
        if let Some(search) = search {
            let needle = validate_search_query(search)?;
            if !needle.is_empty() {
                query = query.ilike_contains("name", &needle);
            }
        }
        Ok(query.order_desc("created_at"))
    }

    /// Customers, newest first. A blank search lists everyone.
    pub async fn list(&self, search: Option<&str>) -> StoreResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = self.client.select("customers", &Self::list_query(search)?).await?;
        wire::convert_all(rows)
    }

    /// Id/name pairs sorted by name.
    pub async fn options(&self) -> StoreResult<Vec<CustomerRef>> {
        let query = Query::select("id,name").order_asc("name");
        let rows: Vec<CustomerRow> = self.client.select("customers", &query).await?;
        Ok(rows.into_iter().map(CustomerRef::from).collect())
    }

    pub async fn create(&self, draft: CustomerDraft) -> StoreResult<Customer> {
        let draft = draft.normalized()?;
        let rows: Vec<CustomerRow> = self
            .client
            .insert("customers", &body(&draft), CUSTOMER_COLUMNS)
            .await?;
        let customer = first(rows, "new")?;
        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// ## Errors
    /// `NotFound` when no row has `id`.
    pub async fn update(&self, id: &str, draft: CustomerDraft) -> StoreResult<Customer> {
        let draft = draft.normalized()?;
        let filter = Query::new().eq("id", id).param("select", CUSTOMER_COLUMNS);
        let rows: Vec<CustomerRow> = self.client.update("customers", &filter, &body(&draft)).await?;
        let customer = first(rows, id)?;
        info!(customer_id = %customer.id, "Customer updated");
        Ok(customer)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.client.delete("customers", &Query::new().eq("id", id)).await?;
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}

fn body(draft: &CustomerDraft) -> serde_json::Value {
    json!({
        "name": draft.name,
        "phone": draft.phone,
        "address": draft.address,
    })
}

fn first(rows: Vec<CustomerRow>, id: &str) -> StoreResult<Customer> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found("Customer", id))
        .and_then(Customer::try_from)
}
