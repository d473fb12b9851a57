//! Submission path: wallet loading, signing and broadcast
//!
//! The `Broadcaster` trait is the seam between the demo runner and the
//! network; the production implementation signs with a local wallet and
//! broadcasts through the chain provider.

use super::request::TransferRequest;
use crate::chain::ChainProvider;
use crate::config::Settings;
use crate::error::{RunnerError, RunnerResult};

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, TransactionReceipt, H256};
use std::sync::Arc;
use tracing::{debug, info};

/// Submission and confirmation operations the runner depends on
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Submit a transfer, returning the transaction hash
    async fn submit(&self, request: &TransferRequest) -> RunnerResult<H256>;

    /// Block until the transaction is mined and return its receipt
    async fn wait_for_receipt(&self, tx_hash: H256) -> RunnerResult<TransactionReceipt>;
}

/// Wallet-backed broadcaster over a chain provider
pub struct WalletClient {
    provider: Arc<ChainProvider>,
    wallet: LocalWallet,
    chain_id: u64,
}

impl WalletClient {
    /// Create a client, loading the signing key from the configured
    /// environment variable.
    pub fn new(provider: Arc<ChainProvider>, settings: &Settings) -> RunnerResult<Self> {
        let chain_id = settings.chain.chain_id;
        let wallet = Self::load_wallet(&settings.wallet.private_key_env)?.with_chain_id(chain_id);

        info!("Wallet loaded for account {:?}", wallet.address());

        Ok(Self {
            provider,
            wallet,
            chain_id,
        })
    }

    /// Load the wallet from the environment
    fn load_wallet(env_var: &str) -> RunnerResult<LocalWallet> {
        let key = std::env::var(env_var).map_err(|_| {
            RunnerError::Wallet(format!(
                "No private key configured. Set the {} environment variable",
                env_var
            ))
        })?;

        key.trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| RunnerError::Wallet(format!("Invalid private key: {}", e)))
    }

    /// Sending account address
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl Broadcaster for WalletClient {
    async fn submit(&self, request: &TransferRequest) -> RunnerResult<H256> {
        let from = self.wallet.address();

        let nonce = self.provider.next_nonce(from).await?;
        let mut tx = request.to_typed(from, self.chain_id, nonce);

        // Gas estimation is delegated to the node
        let gas = self.provider.estimate_gas(&tx).await?;
        tx.set_gas(gas);

        let signature = self
            .wallet
            .sign_transaction(&tx)
            .await
            .map_err(|e| RunnerError::Wallet(format!("Signing failed: {}", e)))?;
        let raw = tx.rlp_signed(&signature);

        debug!(
            kind = request.kind().as_str(),
            %nonce,
            %gas,
            "Broadcasting signed transaction"
        );

        self.provider.send_raw_transaction(raw).await
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> RunnerResult<TransactionReceipt> {
        self.provider.wait_for_receipt(tx_hash).await
    }
}
