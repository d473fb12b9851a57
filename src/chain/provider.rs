//! Chain provider with multi-RPC support and round-robin failover

use crate::config::{ChainConfig, ReceiptConfig};
use crate::error::{RunnerError, RunnerResult};

use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockNumber, Bytes, TransactionReceipt, H256, U256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Read/broadcast client over one or more HTTP RPC endpoints
pub struct ChainProvider {
    /// Chain configuration
    config: ChainConfig,
    /// Receipt polling configuration
    receipt_config: ReceiptConfig,
    /// HTTP providers (multiple for failover)
    http_providers: Vec<Provider<Http>>,
    /// Current active provider index
    current_provider: AtomicUsize,
}

impl ChainProvider {
    /// Create a new chain provider
    pub fn new(config: ChainConfig, receipt_config: ReceiptConfig) -> RunnerResult<Self> {
        let mut http_providers = Vec::new();

        for url in &config.rpc_urls {
            match Provider::<Http>::try_from(url.as_str()) {
                Ok(provider) => {
                    debug!("Added HTTP provider for {}: {}", config.name, url);
                    http_providers.push(provider);
                }
                Err(e) => {
                    warn!("Failed to create provider for {}: {}", url, e);
                }
            }
        }

        if http_providers.is_empty() {
            return Err(RunnerError::Rpc(format!(
                "No valid RPC providers for chain {}",
                config.name
            )));
        }

        Ok(Self {
            config,
            receipt_config,
            http_providers,
            current_provider: AtomicUsize::new(0),
        })
    }

    /// Get the active HTTP provider
    fn http(&self) -> &Provider<Http> {
        let idx = self.current_provider.load(Ordering::Relaxed);
        &self.http_providers[idx % self.http_providers.len()]
    }

    /// Switch to the next available provider
    fn failover(&self) {
        let current = self.current_provider.load(Ordering::Relaxed);
        let next = (current + 1) % self.http_providers.len();
        self.current_provider.store(next, Ordering::Relaxed);
        warn!("Chain {} failover to provider {}", self.config.name, next);
    }

    /// Next nonce for an account, including transactions still in the pool
    pub async fn next_nonce(&self, address: Address) -> RunnerResult<U256> {
        self.http()
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(|e| RunnerError::Rpc(format!("Failed to fetch nonce: {}", e)))
    }

    /// Estimate gas for a transaction
    pub async fn estimate_gas(&self, tx: &TypedTransaction) -> RunnerResult<U256> {
        self.http()
            .estimate_gas(tx, None)
            .await
            .map_err(|e| RunnerError::GasEstimation(e.to_string()))
    }

    /// Broadcast a signed transaction, returning its hash
    pub async fn send_raw_transaction(&self, raw: Bytes) -> RunnerResult<H256> {
        let pending = self
            .http()
            .send_raw_transaction(raw)
            .await
            .map_err(|e| RunnerError::Submission(e.to_string()))?;

        Ok(pending.tx_hash())
    }

    /// Get transaction receipt with failover
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> RunnerResult<Option<TransactionReceipt>> {
        for _ in 0..self.http_providers.len() {
            match self.http().get_transaction_receipt(tx_hash).await {
                Ok(receipt) => return Ok(receipt),
                Err(e) => {
                    warn!(
                        "Receipt lookup failed on chain {}: {}",
                        self.config.name, e
                    );
                    self.failover();
                }
            }
        }

        Err(RunnerError::Rpc(
            "All providers failed to fetch receipt".to_string(),
        ))
    }

    /// Poll until the transaction is mined or the configured timeout elapses
    pub async fn wait_for_receipt(&self, tx_hash: H256) -> RunnerResult<TransactionReceipt> {
        let poll_interval = Duration::from_millis(self.receipt_config.poll_interval_ms);
        let timeout = Duration::from_secs(self.receipt_config.timeout_secs);
        let started = Instant::now();

        loop {
            if let Some(receipt) = self.get_transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }

            if started.elapsed() >= timeout {
                return Err(RunnerError::ReceiptTimeout {
                    tx_hash: format!("{:?}", tx_hash),
                    waited_secs: self.receipt_config.timeout_secs,
                });
            }

            debug!("Transaction {:?} not yet mined, polling", tx_hash);
            tokio::time::sleep(poll_interval).await;
        }
    }

}
