//! Celo transaction-kind runner
//!
//! Submits a legacy, a dynamic-fee (EIP-1559) and a custom-fee-currency
//! transfer on the Alfajores testnet, waiting for each receipt before
//! starting the next submission.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

mod chain;
mod config;
mod error;
mod runner;
mod tx;

use chain::ChainProvider;
use config::Settings;
use runner::DemoRunner;
use tx::WalletClient;

#[tokio::main]
async fn main() {
    init_logging();

    // Single top-level handler: log and exit non-zero, no recovery
    if let Err(e) = run().await {
        error!("An error occurred: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    info!("Starting celo-txkinds v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    info!(
        "Running {} transaction kind(s) against {} (chain {})",
        settings.demo.kinds.len(),
        settings.chain.name,
        settings.chain.chain_id
    );

    let provider = Arc::new(ChainProvider::new(
        settings.chain.clone(),
        settings.receipt.clone(),
    )?);
    let client = WalletClient::new(provider, &settings)?;
    info!("Sending from {:?}", client.address());

    DemoRunner::new(client, settings).run().await?;

    info!("All demos complete");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,celo_txkinds=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
