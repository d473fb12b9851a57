//! Demo runner - one submission/confirmation pair per selected kind
//!
//! Kinds run strictly sequentially: each receipt is awaited before the next
//! submission begins. There is no retry and no recovery; the first failure
//! propagates to the caller.

use crate::config::Settings;
use crate::error::{RunnerError, RunnerResult};
use crate::tx::{Broadcaster, FeeDescriptor, TransferRequest, TxKind};

use ethers::types::TransactionReceipt;
use tracing::{info, warn};

/// Runs the configured transaction kinds against a broadcaster
pub struct DemoRunner<B> {
    broadcaster: B,
    settings: Settings,
}

impl<B: Broadcaster> DemoRunner<B> {
    pub fn new(broadcaster: B, settings: Settings) -> Self {
        Self {
            broadcaster,
            settings,
        }
    }

    /// Run every selected kind in configuration order
    pub async fn run(&self) -> RunnerResult<()> {
        for kind in &self.settings.demo.kinds {
            self.run_kind(*kind).await?;
        }
        Ok(())
    }

    /// Build the request for a kind from the demo settings
    fn build_request(&self, kind: TxKind) -> RunnerResult<TransferRequest> {
        let demo = &self.settings.demo;
        let value = demo
            .value_wei()
            .map_err(|e| RunnerError::Config(e.to_string()))?;

        let fee = match kind {
            TxKind::Legacy => FeeDescriptor::Legacy {
                gas_price: demo.legacy_gas_price(),
            },
            TxKind::DynamicFee => FeeDescriptor::DynamicFee {
                max_fee_per_gas: demo.max_fee_per_gas(),
                max_priority_fee_per_gas: demo.max_priority_fee_per_gas(),
            },
            TxKind::FeeCurrency => FeeDescriptor::FeeCurrency {
                max_fee_per_gas: demo.max_fee_per_gas(),
                max_priority_fee_per_gas: demo.max_priority_fee_per_gas(),
                fee_currency: demo.fee_currency,
            },
        };

        Ok(TransferRequest {
            to: demo.recipient,
            value,
            fee,
        })
    }

    /// Submit one kind and block until its receipt arrives
    async fn run_kind(&self, kind: TxKind) -> RunnerResult<()> {
        info!("Initiating {} transaction...", kind);

        let request = self.build_request(kind)?;
        let tx_hash = self.broadcaster.submit(&request).await?;
        info!("{} transaction: {:?}", kind, tx_hash);

        let receipt = self.broadcaster.wait_for_receipt(tx_hash).await?;
        self.log_receipt(kind, &receipt);

        Ok(())
    }

    fn log_receipt(&self, kind: TxKind, receipt: &TransactionReceipt) {
        match receipt.status.map(|s| s.as_u64()) {
            Some(1) => info!(
                "{} transaction confirmed in block {:?}",
                kind, receipt.block_number
            ),
            status => warn!(
                "{} transaction mined with status {:?} in block {:?}",
                kind, status, receipt.block_number
            ),
        }

        info!(
            "Receipt: gas used {:?}, effective gas price {:?}",
            receipt.gas_used, receipt.effective_gas_price
        );
        info!(
            "See in explorer: {}{:?}",
            self.settings.chain.explorer_tx_url, receipt.transaction_hash
        );
    }
}
