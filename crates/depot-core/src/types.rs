//! # Domain Types
//!
//! Typed records for everything the console reads from or writes to the
//! backend. The store layer decodes backend JSON into these at the boundary;
//! nothing past that point handles untyped rows.
//!
//! ## Entity Relationships
//! ```text
//! ┌──────────────┐        ┌──────────────┐        ┌──────────────┐
//! │   Customer   │ 0..1   │     Sale     │ 1    * │   SaleItem   │
//! │  id, name    │◄───────│ total_amount │───────►│ qty × price  │
//! └──────────────┘        │ payment      │        └──────┬───────┘
//!                         └──────────────┘               │ *
//!                                                        ▼ 1
//!                         ┌──────────────┐        ┌──────────────┐
//!                         │StockMovement │ *    1 │   Product    │
//!                         │ in / out     │───────►│ gas | agua   │
//!                         └──────────────┘        └──────────────┘
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. The wire names are the backend's column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash.
    #[serde(rename = "dinheiro")]
    Cash,
    /// Instant bank transfer.
    #[serde(rename = "pix")]
    Pix,
    /// Card on an external terminal.
    #[serde(rename = "cartao")]
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Pix, PaymentMethod::Card];

    /// Column value as stored by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "dinheiro",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Card => "cartao",
        }
    }

    /// Label for screens.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Card => "Card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the wire names plus the English aliases the console shows.
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dinheiro" | "cash" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            "cartao" | "cartão" | "card" => Ok(PaymentMethod::Card),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// The two product lines the business sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Gas,
    Water,
}

impl ProductKind {
    pub const ALL: [ProductKind; 2] = [ProductKind::Gas, ProductKind::Water];

    /// Classifies a catalog name. Matching ignores case and surrounding
    /// whitespace; anything outside the vocabulary is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "gas" | "gás" => Some(ProductKind::Gas),
            "agua" | "água" => Some(ProductKind::Water),
            _ => None,
        }
    }

    /// Catalog name as stored by the backend.
    pub fn catalog_name(&self) -> &'static str {
        match self {
            ProductKind::Gas => "gas",
            ProductKind::Water => "agua",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductKind::Gas => "GÁS",
            ProductKind::Water => "ÁGUA",
        }
    }
}

/// Display label for any product name: the vocabulary gets its accented
/// label, everything else is upper-cased.
pub fn product_label(name: &str) -> String {
    match ProductKind::from_name(name) {
        Some(kind) => kind.label().to_string(),
        None => name.to_uppercase(),
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Default unit price suggested on the sales form.
    pub price: Money,
}

impl Product {
    pub fn kind(&self) -> Option<ProductKind> {
        ProductKind::from_name(&self.name)
    }

    pub fn label(&self) -> String {
        product_label(&self.name)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// The slice of a customer embedded in a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerRef {
    pub id: String,
    pub name: String,
}

/// Fields for creating or editing a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDraft {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerDraft {
    /// Trims every field, turns blank optionals into `None` and checks
    /// the name.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        validation::validate_customer_name(&name)?;
        Ok(CustomerDraft {
            name,
            phone: blank_to_none(self.phone),
            address: blank_to_none(self.address),
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Sale
// =============================================================================

/// A sale with its line items, as the report query returns it.
///
/// `total_amount` is the backend's stored total. After client-side product
/// refinement it holds the recomputed display total instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<FixedOffset>,
    pub total_amount: Money,
    pub payment_method: Option<PaymentMethod>,
    pub customer: Option<CustomerRef>,
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Day bucket key: the calendar day of `created_at` in the offset the
    /// backend reported it in (the first ten characters of its ISO form).
    pub fn day_key(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }

    /// Σ quantity × unit price over the items currently attached.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(SaleItem::subtotal).sum()
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().map(|c| c.name.as_str())
    }
}

/// One product line of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl SaleItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A one-line sale as entered on the sales screen, sent to the atomic
/// `register_sale` procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    /// `None` for a walk-in sale.
    pub customer_id: Option<String>,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub payment_method: PaymentMethod,
}

impl NewSale {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product".to_string(),
            });
        }
        validation::validate_quantity(self.quantity)?;
        validation::validate_unit_price(self.unit_price)?;
        if let Some(customer_id) = &self.customer_id {
            validation::validate_uuid(customer_id)?;
        }
        Ok(())
    }

    pub fn total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Stock
// =============================================================================

/// One row of the stock summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockSummaryRow {
    /// Not every deployment of the view exposes it.
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: i64,
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
        }
    }
}

/// A stock movement with its product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_name: String,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub unit_cost: Option<Money>,
    #[ts(as = "String")]
    pub created_at: DateTime<FixedOffset>,
}

/// A stock entry (goods received) to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockEntry {
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost: Option<Money>,
}

impl NewStockEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product".to_string(),
            });
        }
        validation::validate_quantity(self.quantity)?;
        if let Some(cost) = self.unit_cost {
            validation::validate_unit_price(cost)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
