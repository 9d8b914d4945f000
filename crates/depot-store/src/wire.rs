//! # Wire Rows
//!
//! Row shapes exactly as the data API sends them, and their conversion into
//! `depot-core` types.
//!
//! ## Decoding Rules
//! ```text
//! numeric columns     → JSON number or numeric string → Money (cents)
//! timestamptz         → RFC 3339 with offset; a bare timestamp is UTC
//! embedded relations  → customers(name) / products(name) may be null
//! payment_method      → dinheiro | pix | cartao | null; anything else fails
//! ```
//!
//! A row that breaks a core invariant (non-positive quantity, negative
//! price, item without a product name) fails the whole response with
//! [`StoreError::Decode`] instead of being skipped.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use depot_core::{
    Customer, CustomerRef, MovementType, Money, PaymentMethod, Product, Sale, SaleItem,
    StockMovement, StockSummaryRow,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Field Deserializers
// =============================================================================

fn money_from_value(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => Money::parse_decimal(&n.to_string()),
        Value::String(s) => Money::parse_decimal(s),
        _ => None,
    }
}

fn money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    money_from_value(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {value}")))
}

fn opt_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => money_from_value(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {value}"))),
    }
}

/// Integer counts; aggregate views may send `18`, `18.0` or `"18"`.
fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Null => Some(0),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| serde::de::Error::custom(format!("invalid count: {value}")))
}

/// Identifiers are uuids on most tables but bigint on some deployments.
fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}

fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!("invalid id: {other}"))),
    }
}

/// Amount as a JSON number for request bodies.
pub fn money_json(amount: Money) -> Value {
    serde_json::json!(amount.cents() as f64 / 100.0)
}

/// Parses a `timestamptz` value, keeping the offset it was sent with.
pub fn parse_timestamp(raw: &str) -> StoreResult<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| StoreError::decode(format!("invalid timestamp '{raw}'")))
}

// =============================================================================
// Sales
// =============================================================================

/// Embedded `customers(name)` / `products(name)` relation.
#[derive(Debug, Clone, Deserialize)]
pub struct NameRow {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub created_at: String,
    #[serde(deserialize_with = "money")]
    pub total_amount: Money,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, deserialize_with = "opt_id")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customers: Option<NameRow>,
    #[serde(default)]
    pub sale_items: Vec<SaleItemRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleItemRow {
    #[serde(deserialize_with = "count")]
    pub quantity: i64,
    #[serde(deserialize_with = "money")]
    pub unit_price: Money,
    #[serde(default, deserialize_with = "opt_id")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub products: Option<NameRow>,
}

impl TryFrom<SaleItemRow> for SaleItem {
    type Error = StoreError;

    fn try_from(row: SaleItemRow) -> StoreResult<Self> {
        if row.quantity <= 0 {
            return Err(StoreError::decode(format!(
                "sale item quantity must be positive, got {}",
                row.quantity
            )));
        }
        if row.unit_price.is_negative() {
            return Err(StoreError::decode(format!(
                "sale item unit price must not be negative, got {}",
                row.unit_price.to_decimal_string()
            )));
        }
        if row.unit_price.checked_multiply_quantity(row.quantity).is_none() {
            return Err(StoreError::decode(format!(
                "sale item total overflows: {} × {}",
                row.quantity,
                row.unit_price.to_decimal_string()
            )));
        }
        let product_name = row
            .products
            .and_then(|p| p.name)
            .ok_or_else(|| StoreError::decode("sale item without product name"))?;

        Ok(SaleItem {
            product_id: row.product_id.unwrap_or_default(),
            product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        })
    }
}

impl TryFrom<SaleRow> for Sale {
    type Error = StoreError;

    fn try_from(row: SaleRow) -> StoreResult<Self> {
        let customer = match (row.customer_id, row.customers.and_then(|c| c.name)) {
            (Some(id), Some(name)) => Some(CustomerRef { id, name }),
            (None, Some(name)) => Some(CustomerRef {
                id: String::new(),
                name,
            }),
            (_, None) => None,
        };
        let items = row
            .sale_items
            .into_iter()
            .map(SaleItem::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.subtotal()))
            .ok_or_else(|| StoreError::decode(format!("sale {} items total overflows", row.id)))?;

        Ok(Sale {
            id: row.id,
            created_at: parse_timestamp(&row.created_at)?,
            total_amount: row.total_amount,
            payment_method: row.payment_method,
            customer,
            items,
        })
    }
}

/// Dashboard KPI row: `sales?select=total_amount,created_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleTotalRow {
    #[serde(deserialize_with = "money")]
    pub total_amount: Money,
}

/// `register_sale` returns the new sale id, bare or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegisteredSale {
    Id(#[serde(deserialize_with = "id")] String),
    Row {
        #[serde(deserialize_with = "id")]
        id: String,
    },
    Nothing,
}

impl RegisteredSale {
    pub fn into_id(self) -> Option<String> {
        match self {
            RegisteredSale::Id(id) | RegisteredSale::Row { id } => Some(id),
            RegisteredSale::Nothing => None,
        }
    }
}

// =============================================================================
// Customers & Products
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = StoreError;

    fn try_from(row: CustomerRow) -> StoreResult<Self> {
        let created_at = row.created_at.as_deref().map(parse_timestamp).transpose()?;
        Ok(Customer {
            id: row.id,
            name: row.name,
            phone: row.phone.filter(|p| !p.trim().is_empty()),
            address: row.address.filter(|a| !a.trim().is_empty()),
            created_at,
        })
    }
}

impl From<CustomerRow> for CustomerRef {
    fn from(row: CustomerRow) -> Self {
        CustomerRef {
            id: row.id,
            name: row.name,
        }
    }
}

/// `products` row. The price column is `unit_price` on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "opt_money")]
    pub unit_price: Option<Money>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.unit_price.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Stock & Conversations
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StockSummaryWire {
    #[serde(default, deserialize_with = "opt_id")]
    pub product_id: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "count")]
    pub quantity: i64,
}

impl From<StockSummaryWire> for StockSummaryRow {
    fn from(row: StockSummaryWire) -> Self {
        StockSummaryRow {
            product_id: row.product_id,
            name: row.name,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovementRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[serde(deserialize_with = "count")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "opt_money")]
    pub unit_cost: Option<Money>,
    pub created_at: String,
    #[serde(default)]
    pub products: Option<NameRow>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = StoreError;

    fn try_from(row: MovementRow) -> StoreResult<Self> {
        Ok(StockMovement {
            id: row.id,
            product_name: row.products.and_then(|p| p.name).unwrap_or_default(),
            movement_type: row.movement_type,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnreadRow {
    #[serde(default, deserialize_with = "count")]
    pub unread_count: i64,
}

/// Decodes every row, failing on the first bad one.
pub fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sale_json() -> Value {
        json!({
            "id": "s-1",
            "created_at": "2025-01-01T23:59:00+00:00",
            "total_amount": 110,
            "payment_method": "pix",
            "customer_id": "c-1",
            "customers": { "name": "Ana" },
            "sale_items": [
                { "quantity": 1, "unit_price": "110.00", "product_id": "p-gas", "products": { "name": "gas" } }
            ]
        })
    }

    #[test]
    fn test_sale_row_decodes() {
        let row: SaleRow = serde_json::from_value(sale_json()).unwrap();
        let sale = Sale::try_from(row).unwrap();
        assert_eq!(sale.id, "s-1");
        assert_eq!(sale.day_key(), "2025-01-01");
        assert_eq!(sale.total_amount, Money::from_cents(11000));
        assert_eq!(sale.payment_method, Some(PaymentMethod::Pix));
        assert_eq!(sale.customer_name(), Some("Ana"));
        assert_eq!(sale.items[0].unit_price, Money::from_cents(11000));
        assert_eq!(sale.items[0].product_name, "gas");
    }

    #[test]
    fn test_sale_row_nulls() {
        let mut value = sale_json();
        value["payment_method"] = Value::Null;
        value["customer_id"] = Value::Null;
        value["customers"] = Value::Null;
        value["id"] = json!(42);
        let sale = Sale::try_from(serde_json::from_value::<SaleRow>(value).unwrap()).unwrap();
        assert_eq!(sale.id, "42");
        assert_eq!(sale.payment_method, None);
        assert_eq!(sale.customer, None);
    }

    #[test]
    fn test_unknown_payment_method_fails() {
        let mut value = sale_json();
        value["payment_method"] = json!("boleto");
        assert!(serde_json::from_value::<SaleRow>(value).is_err());
    }

    #[test]
    fn test_item_invariants_enforced() {
        let mut value = sale_json();
        value["sale_items"][0]["quantity"] = json!(0);
        let row: SaleRow = serde_json::from_value(value).unwrap();
        assert!(matches!(Sale::try_from(row), Err(StoreError::Decode(_))));

        let mut value = sale_json();
        value["sale_items"][0]["products"] = Value::Null;
        let row: SaleRow = serde_json::from_value(value).unwrap();
        assert!(matches!(Sale::try_from(row), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_overflowing_totals_are_rejected() {
        let mut value = sale_json();
        value["sale_items"][0]["quantity"] = json!(2_147_483_647);
        value["sale_items"][0]["unit_price"] = json!("99999999.99");
        let row: SaleRow = serde_json::from_value(value).unwrap();
        assert!(matches!(Sale::try_from(row), Err(StoreError::Decode(_))));

        let mut value = sale_json();
        let line = json!({
            "quantity": 1_000_000_000,
            "unit_price": "50000000.00",
            "product_id": "p-gas",
            "products": { "name": "gas" }
        });
        value["sale_items"] = json!([line.clone(), line]);
        let row: SaleRow = serde_json::from_value(value).unwrap();
        assert!(matches!(Sale::try_from(row), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let ts = parse_timestamp("2025-01-02T01:30:00.123456-03:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(ts.format("%Y-%m-%d").to_string(), "2025-01-02");

        let bare = parse_timestamp("2025-01-02T01:30:00").unwrap();
        assert_eq!(bare.offset().local_minus_utc(), 0);

        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_counts_and_amounts_are_lenient() {
        let row: StockSummaryWire =
            serde_json::from_value(json!({ "name": "gas", "quantity": "18" })).unwrap();
        assert_eq!(row.quantity, 18);
        assert_eq!(row.product_id, None);

        let row: StockSummaryWire =
            serde_json::from_value(json!({ "product_id": 7, "name": "agua", "quantity": 4.0 })).unwrap();
        assert_eq!(row.quantity, 4);
        assert_eq!(row.product_id.as_deref(), Some("7"));

        let row: UnreadRow = serde_json::from_value(json!({ "unread_count": null })).unwrap();
        assert_eq!(row.unread_count, 0);

        let product: Product =
            serde_json::from_value::<ProductRow>(json!({ "id": "p", "name": "gas", "unit_price": 110.5 }))
                .unwrap()
                .into();
        assert_eq!(product.price, Money::from_cents(11050));
    }

    #[test]
    fn test_registered_sale_shapes() {
        let bare: RegisteredSale = serde_json::from_value(json!("s-9")).unwrap();
        assert_eq!(bare.into_id().as_deref(), Some("s-9"));
        let row: RegisteredSale = serde_json::from_value(json!({ "id": "s-9" })).unwrap();
        assert_eq!(row.into_id().as_deref(), Some("s-9"));
        let nothing: RegisteredSale = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(nothing.into_id(), None);
    }

    #[test]
    fn test_money_json() {
        assert_eq!(money_json(Money::from_cents(11050)), json!(110.5));
        assert_eq!(money_json(Money::from_cents(0)), json!(0.0));
    }
}
