use crate::{
    models::{ChainDescriptor, TransferRecord, SOLANA_KEY},
    services::probe::{ChainProbe, ProbeError},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Probe for Solana, driven by `getTransaction` with `jsonParsed` encoding.
///
/// Payments are recovered from SPL token balance deltas rather than from
/// instructions, so transfers routed through other programs are still seen.
pub struct SolanaProbe {
    descriptor: ChainDescriptor,
    client: reqwest::Client,
    commitment: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ParsedTransaction {
    #[serde(default)]
    meta: Option<TransactionMeta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionMeta {
    #[serde(default)]
    err: Option<serde_json::Value>,
    #[serde(default)]
    pre_token_balances: Option<Vec<TokenBalance>>,
    #[serde(default)]
    post_token_balances: Option<Vec<TokenBalance>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalance {
    mint: String,
    #[serde(default)]
    owner: Option<String>,
    ui_token_amount: UiTokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiTokenAmount {
    #[serde(default)]
    ui_amount: Option<f64>,
    #[serde(default)]
    ui_amount_string: Option<String>,
}

impl UiTokenAmount {
    /// Balance in human units as reported by the node.
    fn value(&self) -> Decimal {
        self.ui_amount_string
            .as_deref()
            .and_then(|s| Decimal::from_str(s).ok())
            .or_else(|| self.ui_amount.and_then(|f| Decimal::try_from(f).ok()))
            .unwrap_or(Decimal::ZERO)
    }
}

impl SolanaProbe {
    pub fn connect(
        descriptor: ChainDescriptor,
        commitment: impl Into<String>,
        rpc_timeout: Duration,
    ) -> Result<Self> {
        reqwest::Url::parse(&descriptor.rpc_url)
            .with_context(|| format!("Invalid RPC URL for {}", descriptor.name))?;
        let client = reqwest::Client::builder()
            .timeout(rpc_timeout)
            .build()
            .context("Failed to build Solana HTTP client")?;

        Ok(Self {
            descriptor,
            client,
            commitment: commitment.into(),
        })
    }

    async fn get_parsed_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<ParsedTransaction>, ProbeError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTransaction",
            "params": [
                signature,
                {
                    "encoding": "jsonParsed",
                    "maxSupportedTransactionVersion": 0,
                    "commitment": self.commitment
                }
            ]
        });

        let response = self
            .client
            .post(&self.descriptor.rpc_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::MalformedResponse(format!(
                "Solana RPC returned HTTP {}",
                status
            )));
        }

        let body: RpcResponse<ParsedTransaction> = response.json().await?;
        if let Some(error) = body.error {
            return Err(ProbeError::JsonRpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(body.result)
    }
}

/// Owners whose balance of `mint` went up, in post-balance order.
fn balance_increases(meta: &TransactionMeta, mint: &str) -> Vec<(String, Decimal)> {
    let (Some(pre), Some(post)) = (&meta.pre_token_balances, &meta.post_token_balances) else {
        return Vec::new();
    };

    let before: HashMap<&str, Decimal> = pre
        .iter()
        .filter(|balance| balance.mint == mint)
        .filter_map(|balance| Some((balance.owner.as_deref()?, balance.ui_token_amount.value())))
        .collect();

    post.iter()
        .filter(|balance| balance.mint == mint)
        .filter_map(|balance| {
            let owner = balance.owner.as_deref()?;
            // token accounts created by this transaction have no pre balance
            let pre_amount = before.get(owner).copied().unwrap_or(Decimal::ZERO);
            let post_amount = balance.ui_token_amount.value();
            (post_amount > pre_amount).then(|| (owner.to_string(), post_amount - pre_amount))
        })
        .collect()
}

fn is_valid_pubkey(address: &str) -> bool {
    bs58::decode(address)
        .into_vec()
        .map(|bytes| bytes.len() == 32)
        .unwrap_or(false)
}

fn format_ui_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(6);
    rounded.rescale(6);
    rounded.to_string()
}

#[async_trait]
impl ChainProbe for SolanaProbe {
    fn key(&self) -> &str {
        SOLANA_KEY
    }

    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    async fn probe(&self, reference: &str) -> Result<TransferRecord, ProbeError> {
        let Some(transaction) = self.get_parsed_transaction(reference).await? else {
            return Ok(TransferRecord::not_found("Transaction not found on Solana"));
        };

        let meta = transaction.meta.unwrap_or_default();
        if meta.err.as_ref().is_some_and(|err| !err.is_null()) {
            return Ok(TransferRecord::failed(SOLANA_KEY, "Transaction failed on Solana"));
        }

        let transfer = balance_increases(&meta, &self.descriptor.asset_address)
            .into_iter()
            .find(|(owner, _)| {
                let valid = is_valid_pubkey(owner);
                if !valid {
                    tracing::warn!(owner = %owner, "Skipping token balance with malformed owner");
                }
                valid
            });

        Ok(match transfer {
            Some((owner, amount)) => {
                TransferRecord::payment(SOLANA_KEY, owner, format_ui_amount(amount))
            }
            None => TransferRecord::other(SOLANA_KEY, None),
        })
    }
}
