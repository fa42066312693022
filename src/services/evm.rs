use crate::{
    contracts::{decode_transfer, format_amount},
    models::{ChainDescriptor, TransferRecord},
    services::probe::{ChainProbe, ProbeError},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::{
    prelude::*,
    providers::{Http, JsonRpcClient, Provider},
    types::{Address, Transaction, H256, U64},
    utils::to_checksum,
};
use std::str::FromStr;
use std::time::Duration;

/// Probe for an account-based EVM chain.
///
/// Looks at the receipt first (existence and status), then the transaction body,
/// and decodes ERC-20 `transfer` calls sent straight to the payment-asset contract.
pub struct EvmProbe<P = Http> {
    key: String,
    descriptor: ChainDescriptor,
    provider: Provider<P>,
    asset_contract: Address,
}

impl EvmProbe<Http> {
    pub fn connect(
        key: impl Into<String>,
        descriptor: ChainDescriptor,
        rpc_timeout: Duration,
    ) -> Result<Self> {
        let url = reqwest::Url::parse(&descriptor.rpc_url)
            .with_context(|| format!("Invalid RPC URL for {}", descriptor.name))?;
        let client = reqwest::Client::builder()
            .timeout(rpc_timeout)
            .build()
            .context("Failed to build RPC HTTP client")?;

        Self::with_provider(key, descriptor, Provider::new(Http::new_with_client(url, client)))
    }
}

impl<P: JsonRpcClient> EvmProbe<P> {
    pub fn with_provider(
        key: impl Into<String>,
        descriptor: ChainDescriptor,
        provider: Provider<P>,
    ) -> Result<Self> {
        let asset_contract = Address::from_str(&descriptor.asset_address).with_context(|| {
            format!(
                "Invalid payment-asset contract for {}: {}",
                descriptor.name, descriptor.asset_address
            )
        })?;

        Ok(Self {
            key: key.into(),
            descriptor,
            provider,
            asset_contract,
        })
    }

    fn interpret(&self, tx: &Transaction) -> TransferRecord {
        let plain_to = tx.to.map(|to| to_checksum(&to, None));

        if tx.to != Some(self.asset_contract) {
            return TransferRecord::other(&self.key, plain_to);
        }

        let decoded = decode_transfer(tx.input.as_ref()).and_then(|(recipient, raw)| {
            format_amount(raw, self.descriptor.asset_decimals).map(|amount| (recipient, amount))
        });

        match decoded {
            Some((recipient, amount)) => {
                TransferRecord::payment(&self.key, to_checksum(&recipient, None), amount)
            }
            None => {
                tracing::debug!(
                    chain = %self.key,
                    tx = ?tx.hash,
                    "Call to payment-asset contract is not a transfer"
                );
                TransferRecord::other(&self.key, plain_to)
            }
        }
    }
}

#[async_trait]
impl<P: JsonRpcClient + 'static> ChainProbe for EvmProbe<P> {
    fn key(&self) -> &str {
        &self.key
    }

    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    async fn probe(&self, reference: &str) -> Result<TransferRecord, ProbeError> {
        let Ok(tx_hash) = H256::from_str(reference.trim_start_matches("0x")) else {
            return Ok(TransferRecord::not_found("Malformed transaction hash"));
        };

        let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? else {
            return Ok(TransferRecord::not_found("Transaction not found"));
        };

        if receipt.status != Some(U64::from(1u64)) {
            return Ok(TransferRecord::failed(&self.key, "Transaction failed"));
        }

        let Some(tx) = self.provider.get_transaction(tx_hash).await? else {
            return Ok(TransferRecord::not_found("Transaction details not found"));
        };

        Ok(self.interpret(&tx))
    }
}
