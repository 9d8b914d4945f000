//! # depot-store: Backend Access Layer for Depot
//!
//! This crate talks to the hosted backend: a PostgREST data API for tables,
//! views and procedures, and a GoTrue identity API for sessions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apps/console ──► Backend::sales().report(&query)                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                ★ depot-store (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  repository/*  ──►  RestClient  ──►  reqwest  ──►  /rest/v1/*   │   │
//! │  │       │                 │                                       │   │
//! │  │       │                 └── bearer token from AuthClient        │   │
//! │  │       ▼                                   │                     │   │
//! │  │  wire rows ──► depot-core types           └──►  /auth/v1/*      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - Backend handle, HTTP plumbing, error body parsing
//! - [`query`] - PostgREST query string builder
//! - [`auth`] - Sign-in, token refresh, sign-out, session change stream
//! - [`wire`] - Row shapes as the backend sends them, decoded into core types
//! - [`repository`] - Sales, customers, products, stock, conversations
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depot_store::{Backend, BackendConfig};
//!
//! let config = BackendConfig::new("https://xyz.supabase.co", "anon-key")?;
//! let backend = Backend::new(config)?;
//!
//! backend.auth().sign_in("owner@depot.com.br", "secret").await?;
//! let sales = backend.sales().report(&query).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod client;
pub mod error;
pub mod query;
pub mod repository;
pub mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{AuthClient, AuthUser, Session, SessionEvent};
pub use client::{Backend, BackendConfig};
pub use error::{StoreError, StoreResult};
pub use query::Query;

pub use repository::conversation::ConversationRepository;
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleRepository, SalesSource};
pub use repository::stock::StockRepository;
