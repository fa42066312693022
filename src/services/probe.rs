use crate::models::{ChainDescriptor, ChainFamily, TransferRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Faults that stop one chain from answering. The orchestrator absorbs these and
/// moves on to the next chain.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("RPC error: {0}")]
    Rpc(#[from] ethers::providers::ProviderError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// Looks a reference up on one specific chain.
///
/// "Not found" is an `Ok` record with `is_valid == false`; `Err` is reserved for
/// transport and RPC faults.
#[async_trait]
pub trait ChainProbe: Send + Sync {
    fn key(&self) -> &str;

    fn descriptor(&self) -> &ChainDescriptor;

    fn family(&self) -> ChainFamily {
        self.descriptor().family
    }

    async fn probe(&self, reference: &str) -> Result<TransferRecord, ProbeError>;
}
