//! Depot console entry point.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    depot_console::run().await
}
