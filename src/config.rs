//! Configuration management for the transaction-kind runner
//!
//! Loads configuration from a TOML file with environment variable
//! substitution. The original demo is driven entirely by literals, so every
//! setting carries a built-in default mirroring them and the binary runs
//! without any config file present.

use crate::tx::TxKind;

use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Celo Alfajores testnet chain ID.
pub const ALFAJORES_CHAIN_ID: u64 = 44787;

const FORNO_URL: &str = "https://alfajores-forno.celo-testnet.org";
const EXPLORER_TX_URL: &str = "https://alfajores.celoscan.io/tx/";

/// Illustrative recipient used by the demo transfers.
const RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
/// cUSD token on Alfajores, used as the alternate fee currency.
const CUSD_ALFAJORES: &str = "0x874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chain: ChainConfig,
    pub wallet: WalletConfig,
    pub demo: DemoConfig,
    pub receipt: ReceiptConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_urls: Vec<String>,
    pub explorer_tx_url: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: "alfajores".to_string(),
            chain_id: ALFAJORES_CHAIN_ID,
            rpc_urls: vec![FORNO_URL.to_string()],
            explorer_tx_url: EXPLORER_TX_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Name of the environment variable holding the hex private key
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: "PRIVATE_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub recipient: Address,
    /// Transfer value in CELO, decimal string
    pub value_celo: String,
    pub legacy_gas_price_gwei: u64,
    pub max_fee_per_gas_gwei: u64,
    pub max_priority_fee_per_gas_gwei: u64,
    pub fee_currency: Address,
    /// Kinds to run, in order
    pub kinds: Vec<TxKind>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            recipient: RECIPIENT.parse().expect("valid recipient literal"),
            value_celo: "0.01".to_string(),
            legacy_gas_price_gwei: 20,
            max_fee_per_gas_gwei: 10,
            max_priority_fee_per_gas_gwei: 10,
            fee_currency: CUSD_ALFAJORES.parse().expect("valid token literal"),
            kinds: vec![TxKind::Legacy, TxKind::DynamicFee, TxKind::FeeCurrency],
        }
    }
}

impl DemoConfig {
    /// Transfer value in wei
    pub fn value_wei(&self) -> Result<U256> {
        parse_ether(&self.value_celo)
            .with_context(|| format!("Invalid CELO value: {}", self.value_celo))
    }

    pub fn legacy_gas_price(&self) -> U256 {
        gwei(self.legacy_gas_price_gwei)
    }

    pub fn max_fee_per_gas(&self) -> U256 {
        gwei(self.max_fee_per_gas_gwei)
    }

    pub fn max_priority_fee_per_gas(&self) -> U256 {
        gwei(self.max_priority_fee_per_gas_gwei)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            timeout_secs: 120,
        }
    }
}

impl Settings {
    /// Load settings from the configuration file, falling back to built-in
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        let config_path = env::var("CELO_TXKINDS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        let settings = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                let config_str = substitute_env_vars(&config_str);
                toml::from_str(&config_str)
                    .with_context(|| format!("Failed to parse config file: {:?}", config_path))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {:?}, using defaults", config_path);
                Settings::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {:?}", config_path))
            }
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.chain.rpc_urls.is_empty() {
            anyhow::bail!("No RPC URLs configured for chain {}", self.chain.name);
        }

        if self.demo.kinds.is_empty() {
            anyhow::bail!("No transaction kinds selected");
        }

        self.demo.value_wei()?;

        Ok(())
    }
}

fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(9)
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static pattern");

    let mut result = input.to_string();
    for cap in re.captures_iter(input) {
        let var_value = env::var(&cap[1]).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_var_substitution() {
        env::set_var("TXKINDS_TEST_VAR", "forno.example.org");
        let input = "rpc_urls = [\"https://${TXKINDS_TEST_VAR}/rpc\"]";
        let result = substitute_env_vars(input);
        assert_eq!(result, "rpc_urls = [\"https://forno.example.org/rpc\"]");
    }

    #[test]
    fn test_defaults_mirror_demo_literals() {
        let settings = Settings::default();

        assert_eq!(settings.chain.chain_id, ALFAJORES_CHAIN_ID);
        assert_eq!(
            settings.demo.recipient,
            RECIPIENT.parse::<Address>().unwrap()
        );
        assert_eq!(
            settings.demo.fee_currency,
            CUSD_ALFAJORES.parse::<Address>().unwrap()
        );
        // 0.01 CELO
        assert_eq!(settings.demo.value_wei().unwrap(), U256::exp10(16));
        // 20 gwei legacy, 10/10 gwei dynamic
        assert_eq!(settings.demo.legacy_gas_price(), U256::exp10(9) * 20);
        assert_eq!(settings.demo.max_fee_per_gas(), U256::exp10(9) * 10);
        assert_eq!(
            settings.demo.max_priority_fee_per_gas(),
            U256::exp10(9) * 10
        );
        assert_eq!(
            settings.demo.kinds,
            vec![TxKind::Legacy, TxKind::DynamicFee, TxKind::FeeCurrency]
        );
        settings.validate().unwrap();
    }

    #[test]
    fn test_partial_config_file_overrides_defaults() {
        let toml_str = r#"
            [demo]
            kinds = ["fee-currency"]
            value_celo = "0.25"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.demo.kinds, vec![TxKind::FeeCurrency]);
        assert_eq!(settings.demo.value_celo, "0.25");
        // Untouched sections keep their defaults
        assert_eq!(settings.chain.chain_id, ALFAJORES_CHAIN_ID);
        assert_eq!(settings.receipt.poll_interval_ms, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[chain]\nname = \"local\"\nchain_id = 31337\nrpc_urls = [\"http://127.0.0.1:8545\"]"
        )
        .unwrap();

        env::set_var("CELO_TXKINDS_CONFIG", file.path());
        let settings = Settings::load().unwrap();
        env::remove_var("CELO_TXKINDS_CONFIG");

        assert_eq!(settings.chain.chain_id, 31337);
        assert_eq!(settings.chain.name, "local");
    }

    #[test]
    fn test_validate_rejects_empty_kinds() {
        let mut settings = Settings::default();
        settings.demo.kinds.clear();
        assert!(settings.validate().is_err());
    }
}
