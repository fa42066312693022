use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain key under which the Solana probe is registered.
pub const SOLANA_KEY: &str = "solana";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => f.write_str("evm"),
            ChainFamily::Solana => f.write_str("solana"),
        }
    }
}

/// Connection and payment-asset parameters for one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub name: String,
    pub family: ChainFamily,
    pub rpc_url: String,
    /// ERC-20 contract on EVM chains, SPL mint on Solana.
    pub asset_address: String,
    pub asset_decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl ChainDescriptor {
    pub fn evm(
        name: impl Into<String>,
        rpc_url: impl Into<String>,
        asset_address: impl Into<String>,
        asset_decimals: u8,
        chain_id: u64,
    ) -> Self {
        Self {
            name: name.into(),
            family: ChainFamily::Evm,
            rpc_url: rpc_url.into(),
            asset_address: asset_address.into(),
            asset_decimals,
            chain_id: Some(chain_id),
            explorer_url: None,
        }
    }

    pub fn solana(rpc_url: impl Into<String>, mint: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: "Solana".to_string(),
            family: ChainFamily::Solana,
            rpc_url: rpc_url.into(),
            asset_address: mint.into(),
            asset_decimals: decimals,
            chain_id: None,
            explorer_url: None,
        }
    }

    pub fn with_explorer(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }

    /// Explorer link for a transaction on this chain, if an explorer is configured.
    pub fn explorer_tx_url(&self, reference: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), reference))
    }
}

/// Entry returned by `GET /api/chains`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary {
    pub key: String,
    pub name: String,
    pub family: ChainFamily,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_url_joins_without_double_slash() {
        let chain = ChainDescriptor::evm("Base", "http://rpc", "0x00", 6, 8453)
            .with_explorer("https://basescan.org/");
        assert_eq!(
            chain.explorer_tx_url("0xabc").as_deref(),
            Some("https://basescan.org/tx/0xabc")
        );
    }

    #[test]
    fn descriptor_deserializes_from_camel_case() {
        let json = r#"{
            "name": "Polygon",
            "family": "evm",
            "rpcUrl": "https://polygon-rpc.com",
            "assetAddress": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174",
            "assetDecimals": 6,
            "chainId": 137
        }"#;
        let chain: ChainDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(chain.family, ChainFamily::Evm);
        assert_eq!(chain.chain_id, Some(137));
        assert!(chain.explorer_url.is_none());
    }
}
