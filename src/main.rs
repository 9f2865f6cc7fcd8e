// Entry point of the sheet_cards command-line tool.
//
// **Architecture Overview:**
// - `core/` = Business logic (column typing, cards, token lifecycle, ports)
// - `infra/` = Implementations of core traits (Google APIs, key-value stores)
// - `cli/` = Terminal adapter (argument parsing, wiring, rendering)
//
// This file's job is to:
// 1. Load `.env` and initialize logging
// 2. Parse the command line
// 3. Hand over to the CLI layer and turn its result into an exit status

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for `--json` output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let args = cli::Args::parse();

    match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
