//! # Console Commands
//!
//! One function per subcommand. Each returns a [`Reply`] that the entry
//! point prints as text or JSON.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (Context, Reply, dispatch, lookups)
//! ├── auth.rs       ◄─── login, logout, whoami
//! ├── report.rs     ◄─── sales report and CSV export
//! ├── dashboard.rs  ◄─── period KPIs, product totals, stock gauges
//! ├── customers.rs  ◄─── customer CRUD
//! ├── stock.rs      ◄─── stock summary, entries, movements
//! ├── sales.rs      ◄─── sale entry, recent sales, product catalog
//! └── config.rs     ◄─── effective configuration
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  $ depot customers list --search maria                                  │
//! │         │                                                               │
//! │         │ (clap)                                                        │
//! │         ▼                                                               │
//! │  dispatch(&ctx, Command::Customers(List { search }))                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  customers::list(&ctx, search)                                          │
//! │      ctx.require_session() ──► NOT_AUTHENTICATED if signed out          │
//! │      ctx.backend.customers().list(..)                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Reply { text, json } ──► stdout                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod customers;
pub mod dashboard;
pub mod report;
pub mod sales;
pub mod stock;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use depot_core::{validation, CoreError, CustomerRef, Product, ProductKind, ReportZone};
use depot_store::{Backend, Session};

use crate::cli::{Command, CustomerCommand, SaleCommand, StockCommand};
use crate::error::{ApiError, ApiResult};
use crate::state::ConsoleConfig;

/// What every command gets: the loaded configuration and the backend.
#[derive(Clone)]
pub struct Context {
    pub config: ConsoleConfig,
    pub backend: Backend,
}

impl Context {
    pub fn new(config: ConsoleConfig, backend: Backend) -> Self {
        Context { config, backend }
    }

    pub fn zone(&self) -> ReportZone {
        self.config.zone()
    }

    /// Today in the report calendar.
    pub fn today(&self) -> NaiveDate {
        self.zone().today(Utc::now())
    }

    /// The current session, refreshed if close to expiry.
    pub async fn require_session(&self) -> ApiResult<Session> {
        Ok(self.backend.auth().require().await?)
    }
}

/// A command result in both output forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub json: Value,
}

impl Reply {
    pub fn new<T: Serialize>(text: impl Into<String>, value: &T) -> ApiResult<Self> {
        Ok(Reply {
            text: text.into(),
            json: serde_json::to_value(value)?,
        })
    }

    /// A reply that is only a confirmation line.
    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        Reply {
            json: serde_json::json!({ "message": text }),
            text,
        }
    }
}

/// Routes a parsed command to its implementation.
pub async fn dispatch(ctx: &Context, command: Command) -> ApiResult<Reply> {
    match command {
        Command::Login { email, password } => auth::login(ctx, &email, &password).await,
        Command::Logout => auth::logout(ctx).await,
        Command::Whoami => auth::whoami(ctx).await,
        Command::Report(args) => report::run(ctx, args).await,
        Command::Dashboard { period } => dashboard::show(ctx, period).await,
        Command::Customers(cmd) => match cmd {
            CustomerCommand::List { search } => customers::list(ctx, search.as_deref()).await,
            CustomerCommand::Add(fields) => customers::add(ctx, fields).await,
            CustomerCommand::Edit { id, fields } => customers::edit(ctx, &id, fields).await,
            CustomerCommand::Delete { id } => customers::delete(ctx, &id).await,
        },
        Command::Stock(cmd) => match cmd {
            StockCommand::Summary => stock::summary(ctx).await,
            StockCommand::Add {
                product,
                quantity,
                cost,
            } => stock::add(ctx, &product, quantity, cost.as_deref()).await,
            StockCommand::Movements { limit } => stock::movements(ctx, limit).await,
        },
        Command::Sales(cmd) => match cmd {
            SaleCommand::New {
                product,
                quantity,
                price,
                payment,
                customer,
            } => {
                let form = sales::SaleForm {
                    product,
                    quantity,
                    price,
                    payment,
                    customer,
                };
                sales::register(ctx, form).await
            }
            SaleCommand::Recent { limit } => sales::recent(ctx, limit).await,
        },
        Command::Products => sales::products(ctx).await,
        Command::Config => config::show(ctx),
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Picks a product by id or name. With no key: gas when the catalog has
/// it, otherwise the first product.
pub fn resolve_product<'a>(products: &'a [Product], key: Option<&str>) -> Result<&'a Product, CoreError> {
    let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) else {
        return products
            .iter()
            .find(|p| p.kind() == Some(ProductKind::Gas))
            .or_else(|| products.first())
            .ok_or(CoreError::EmptyCatalog);
    };

    let wanted_kind = ProductKind::from_name(key);
    products
        .iter()
        .find(|p| p.id == key)
        .or_else(|| {
            products.iter().find(|p| match wanted_kind {
                Some(kind) => p.kind() == Some(kind),
                None => p.name.eq_ignore_ascii_case(key),
            })
        })
        .ok_or_else(|| CoreError::ProductNotFound(key.to_string()))
}

/// Picks a customer by id or by exact, case-insensitive name.
///
/// ## Errors
/// - `NOT_FOUND` when nothing matches
/// - `VALIDATION_ERROR` when the name matches more than one customer
pub fn resolve_customer(options: &[CustomerRef], key: &str) -> ApiResult<CustomerRef> {
    let key = key.trim();
    if let Some(found) = options.iter().find(|c| c.id == key) {
        return Ok(found.clone());
    }

    let wanted = key.to_lowercase();
    let mut matches = options.iter().filter(|c| c.name.trim().to_lowercase() == wanted);
    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found.clone()),
        (Some(_), Some(_)) => Err(ApiError::validation(format!(
            "More than one customer is named '{key}'; use the id"
        ))),
        (None, _) => Err(ApiError::not_found("Customer", key)),
    }
}

/// Turns a customer argument into an id, asking the backend only when the
/// argument is not already an id.
pub async fn customer_id(ctx: &Context, key: &str) -> ApiResult<String> {
    if validation::validate_uuid(key).is_ok() {
        return Ok(key.trim().to_string());
    }
    let options = ctx.backend.customers().options().await?;
    Ok(resolve_customer(&options, key)?.id)
}
