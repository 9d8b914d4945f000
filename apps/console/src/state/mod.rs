//! # State Module
//!
//! Manages console state for one invocation.
//!
//! Each state type has one job, and commands take only the ones they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      lib::execute                               │   │
//! │  │  ConsoleConfig::load(..)                                        │   │
//! │  │  SessionStore::load() ──► backend.auth().restore(..)            │   │
//! │  │  ReportState::new(backend.sales(), zone)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │ConsoleConfig │  │ SessionStore │  │   ReportState    │              │
//! │  │              │  │              │  │                  │              │
//! │  │  backend     │  │ session.json │  │  Mutex<          │              │
//! │  │  report zone │  │ in data dir  │  │    ReportView    │              │
//! │  │  display     │  │              │  │  > + seq token   │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • ConsoleConfig: Read-only after load                                 │
//! │  • SessionStore: Written only by the persist task                      │
//! │  • ReportState: View behind a Mutex, sequence counter atomic           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod report;
mod session;

pub use config::{
    BackendSection, ConfigError, ConsoleConfig, DisplaySection, ReportSection, CONFIG_FILE,
};
pub use report::{RefreshOutcome, ReportState, ReportView};
pub use session::{persist_changes, SessionStore, SESSION_FILE};
