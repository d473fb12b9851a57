//! Error types for the transaction-kind runner

use thiserror::Error;

/// Main error type for the runner
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Gas estimation error: {0}")]
    GasEstimation(String),

    #[error("Transaction submission error: {0}")]
    Submission(String),

    #[error("Timed out after {waited_secs}s waiting for receipt of {tx_hash}")]
    ReceiptTimeout { tx_hash: String, waited_secs: u64 },
}

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;
