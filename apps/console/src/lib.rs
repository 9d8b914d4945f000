//! # Depot Console Library
//!
//! Command-line console for the depot's back office: sales report,
//! dashboard, customers, stock and sale entry.
//!
//! ## Module Organization
//! ```text
//! depot_console/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap definitions
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── Configuration (file + env)
//! │   ├── session.rs  ◄─── Saved session on disk
//! │   └── report.rs   ◄─── Report view model with request sequencing
//! ├── commands/       ◄─── One module per command group
//! ├── render.rs       ◄─── Text screens
//! ├── download.rs     ◄─── Where exports are written
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod cli;
pub mod commands;
pub mod download;
pub mod error;
pub mod render;
pub mod state;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use commands::{Context, Reply};
use depot_store::Backend;
use error::{ApiError, ApiResult};
use state::{persist_changes, ConsoleConfig, SessionStore, SESSION_FILE};

/// How long the session writer may take to flush after the command.
const PERSIST_GRACE: Duration = Duration::from_secs(2);

/// Runs the console.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Console Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │     • Default: info,depot=debug,reqwest=warn; override with RUST_LOG    │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → console.toml → DEPOT_* environment                     │
/// │                                                                         │
/// │  3. Restore Session ──────────────────────────────────────────────────► │
/// │     • <data_dir>/session.json → AuthClient::restore                     │
/// │     • session changes are written back by a background task             │
/// │                                                                         │
/// │  4. Dispatch Command ─────────────────────────────────────────────────► │
/// │     • text on stdout, or JSON with --json                               │
/// │     • errors on stderr, exit code 1                                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    match execute(cli).await {
        Ok(reply) => {
            print_reply(&reply, json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_error(&err, json);
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=depot=trace` - Show trace for depot crates only
/// - Default: `info,depot=debug,reqwest=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,depot=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads state, runs the command, then lets the session writer finish.
pub async fn execute(cli: Cli) -> ApiResult<Reply> {
    let config = ConsoleConfig::load(cli.config.as_deref())?;
    let store = session_store(cli.session_file)?;
    let backend = Backend::new(config.backend_config()?)?;

    let saved = store
        .load()
        .await
        .map_err(|e| ApiError::internal(format!("Cannot read {}: {e}", store.path().display())))?;
    if let Some(session) = saved {
        debug!(user_id = %session.user_id, "Restoring saved session");
        backend.auth().restore(session).await;
    }

    // Subscribed after the restore so loading does not rewrite the file
    let persister = tokio::spawn(persist_changes(store, backend.auth().changes()));

    let result = {
        let ctx = Context::new(config, backend);
        commands::dispatch(&ctx, cli.command).await
    };

    // Every Backend handle is gone now, which ends the change stream
    if tokio::time::timeout(PERSIST_GRACE, persister).await.is_err() {
        warn!("Session writer did not finish in time");
    }
    result
}

fn session_store(path: Option<std::path::PathBuf>) -> ApiResult<SessionStore> {
    let path = path
        .or_else(SessionStore::default_path)
        .ok_or_else(|| ApiError::internal(format!("Cannot locate a data directory for {SESSION_FILE}")))?;
    debug!(path = ?path, "Session file");
    Ok(SessionStore::new(path))
}

fn print_reply(reply: &Reply, json: bool) {
    if json {
        match serde_json::to_string_pretty(&reply.json) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("error: {e}"),
        }
    } else if !reply.text.is_empty() {
        println!("{}", reply.text);
    }
}

fn print_error(err: &ApiError, json: bool) {
    if json {
        match serde_json::to_string(err) {
            Ok(text) => eprintln!("{text}"),
            Err(_) => eprintln!("error: {err}"),
        }
    } else {
        eprintln!("error: {err}");
    }
}
