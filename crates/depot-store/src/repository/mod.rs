//! # Repository Module
//!
//! Backend repositories for Depot, one per table family.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Console command                                                       │
//! │       │                                                                 │
//! │       │  backend.sales().report(&query)                                │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── report(&self, query)                                              │
//! │  ├── recent(&self, limit)                                              │
//! │  └── register(&self, sale)                                             │
//! │       │                                                                 │
//! │       │  Query (select / filters / order)                              │
//! │       ▼                                                                 │
//! │  RestClient ──► /rest/v1/sales?...                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  wire rows ──► depot-core types                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SaleRepository`](sale::SaleRepository) - Report query, recent sales, registration, dashboard totals
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD and search
//! - [`ProductRepository`](product::ProductRepository) - Product catalog
//! - [`StockRepository`](stock::StockRepository) - Stock summary, entries, movements
//! - [`ConversationRepository`](conversation::ConversationRepository) - Unread message count

pub mod conversation;
pub mod customer;
pub mod product;
pub mod sale;
pub mod stock;
