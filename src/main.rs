mod config;
mod domain;
mod engine;
mod input;
mod ledger;

use tracing_subscriber::EnvFilter;

use crate::engine::Bank;
use crate::input::LineReader;
use crate::ledger::AccountTable;

#[tokio::main(flavor = "current_thread")] // one caller, one table
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Diagnostics go to stderr so stdout carries only the menu.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut bank = Bank::new(
        LineReader::stdin(),
        AccountTable::default(),
        std::io::stdout(),
    );
    bank.run().await?;

    Ok(())
}
