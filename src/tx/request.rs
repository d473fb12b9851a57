//! Transaction request shapes for the three demonstrated kinds
//!
//! A transfer is the recipient, the value, and a kind-specific fee
//! descriptor. Conversion into the client library's typed transaction is the
//! only place the three kinds diverge: the legacy kind carries a single gas
//! price, the dynamic-fee kind the EIP-1559 pair, and the fee-currency kind
//! additionally the token address gas is paid in. ethers signs fee-currency
//! transfers only as the Celo legacy envelope (its `celo` feature puts the
//! fee currency fields on `TransactionRequest`), so that kind rides the
//! legacy envelope with the fee cap as its single price.

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest, TransactionRequest, U256};
use serde::Deserialize;
use std::fmt;

/// The transaction kinds the runner demonstrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxKind {
    Legacy,
    DynamicFee,
    FeeCurrency,
}

impl TxKind {
    /// EIP-2718 type byte of the envelope this kind is encoded in. The
    /// fee-currency kind is signed as the Celo legacy format, which is
    /// untyped like the plain legacy envelope.
    pub fn envelope_type(&self) -> u8 {
        match self {
            TxKind::Legacy => 0x00,
            TxKind::DynamicFee => 0x02,
            TxKind::FeeCurrency => 0x00,
        }
    }

    /// Stable token used in configuration and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Legacy => "legacy",
            TxKind::DynamicFee => "dynamic-fee",
            TxKind::FeeCurrency => "fee-currency",
        }
    }

    /// Human-readable description
    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Legacy => "legacy",
            TxKind::DynamicFee => "dynamic fee (EIP-1559)",
            TxKind::FeeCurrency => "custom fee currency",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind-specific fee fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeDescriptor {
    Legacy {
        gas_price: U256,
    },
    DynamicFee {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
    FeeCurrency {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
        fee_currency: Address,
    },
}

impl FeeDescriptor {
    pub fn kind(&self) -> TxKind {
        match self {
            FeeDescriptor::Legacy { .. } => TxKind::Legacy,
            FeeDescriptor::DynamicFee { .. } => TxKind::DynamicFee,
            FeeDescriptor::FeeCurrency { .. } => TxKind::FeeCurrency,
        }
    }
}

/// A native-currency transfer with kind-specific fees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub value: U256,
    pub fee: FeeDescriptor,
}

impl TransferRequest {
    pub fn kind(&self) -> TxKind {
        self.fee.kind()
    }

    /// Convert into the client library's typed transaction, ready for gas
    /// estimation and signing. Gas limit is left unset; the submitter fills
    /// it from the node's estimate.
    pub fn to_typed(&self, from: Address, chain_id: u64, nonce: U256) -> TypedTransaction {
        match &self.fee {
            FeeDescriptor::Legacy { gas_price } => {
                let tx = TransactionRequest::new()
                    .from(from)
                    .to(self.to)
                    .value(self.value)
                    .nonce(nonce)
                    .gas_price(*gas_price)
                    .chain_id(chain_id);
                TypedTransaction::Legacy(tx)
            }
            FeeDescriptor::DynamicFee {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                let tx = Eip1559TransactionRequest::new()
                    .from(from)
                    .to(self.to)
                    .value(self.value)
                    .nonce(nonce)
                    .max_fee_per_gas(*max_fee_per_gas)
                    .max_priority_fee_per_gas(*max_priority_fee_per_gas)
                    .chain_id(chain_id);
                TypedTransaction::Eip1559(tx)
            }
            FeeDescriptor::FeeCurrency {
                max_fee_per_gas,
                max_priority_fee_per_gas: _,
                fee_currency,
            } => {
                // The Celo legacy envelope has a single price field: the fee
                // cap becomes the gas price, the priority cap is not encoded.
                let tx = TransactionRequest::new()
                    .from(from)
                    .to(self.to)
                    .value(self.value)
                    .nonce(nonce)
                    .gas_price(*max_fee_per_gas)
                    .fee_currency(*fee_currency)
                    .chain_id(chain_id);
                TypedTransaction::Legacy(tx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::NameOrAddress;

    fn recipient() -> Address {
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
            .parse()
            .unwrap()
    }

    fn sender() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    fn cusd() -> Address {
        "0x874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1"
            .parse()
            .unwrap()
    }

    fn gwei(n: u64) -> U256 {
        U256::from(n) * U256::exp10(9)
    }

    #[test]
    fn legacy_request_has_gas_price_and_no_dynamic_fees() {
        let request = TransferRequest {
            to: recipient(),
            value: U256::exp10(16),
            fee: FeeDescriptor::Legacy {
                gas_price: gwei(20),
            },
        };

        let typed = request.to_typed(sender(), 44787, U256::from(7));
        match typed {
            TypedTransaction::Legacy(inner) => {
                assert_eq!(inner.gas_price, Some(gwei(20)));
                assert_eq!(inner.to, Some(NameOrAddress::Address(recipient())));
                assert_eq!(inner.value, Some(U256::exp10(16)));
                assert_eq!(inner.nonce, Some(U256::from(7)));
                assert_eq!(inner.fee_currency, None);
            }
            other => panic!("expected legacy envelope, got {:?}", other),
        }
    }

    #[test]
    fn dynamic_fee_request_has_both_caps() {
        let request = TransferRequest {
            to: recipient(),
            value: U256::exp10(16),
            fee: FeeDescriptor::DynamicFee {
                max_fee_per_gas: gwei(10),
                max_priority_fee_per_gas: gwei(10),
            },
        };

        let typed = request.to_typed(sender(), 44787, U256::zero());
        match typed {
            TypedTransaction::Eip1559(inner) => {
                assert_eq!(inner.max_fee_per_gas, Some(gwei(10)));
                assert_eq!(inner.max_priority_fee_per_gas, Some(gwei(10)));
                assert_eq!(inner.to, Some(NameOrAddress::Address(recipient())));
                assert_eq!(inner.value, Some(U256::exp10(16)));
            }
            other => panic!("expected EIP-1559 envelope, got {:?}", other),
        }
    }

    #[test]
    fn fee_currency_request_uses_the_celo_legacy_envelope() {
        let request = TransferRequest {
            to: recipient(),
            value: U256::exp10(16),
            fee: FeeDescriptor::FeeCurrency {
                max_fee_per_gas: gwei(10),
                max_priority_fee_per_gas: gwei(10),
                fee_currency: cusd(),
            },
        };

        let typed = request.to_typed(sender(), 44787, U256::zero());
        match typed {
            TypedTransaction::Legacy(inner) => {
                assert_eq!(inner.fee_currency, Some(cusd()));
                // The fee cap maps to the envelope's single price field
                assert_eq!(inner.gas_price, Some(gwei(10)));
                assert_eq!(inner.to, Some(NameOrAddress::Address(recipient())));
                assert_eq!(inner.value, Some(U256::exp10(16)));
            }
            other => panic!("expected Celo legacy envelope, got {:?}", other),
        }
    }

    #[test]
    fn kind_maps_to_envelope_type_byte() {
        assert_eq!(TxKind::Legacy.envelope_type(), 0x00);
        assert_eq!(TxKind::DynamicFee.envelope_type(), 0x02);
        // Fee currency rides the untyped Celo legacy envelope
        assert_eq!(TxKind::FeeCurrency.envelope_type(), 0x00);
    }

    #[test]
    fn kind_parses_from_config_tokens() {
        for kind in [TxKind::Legacy, TxKind::DynamicFee, TxKind::FeeCurrency] {
            let token = format!("\"{}\"", kind.as_str());
            let parsed: TxKind = serde_json::from_str(&token).unwrap();
            assert_eq!(parsed, kind);
        }
        assert!(serde_json::from_str::<TxKind>("\"blob\"").is_err());
    }
}
