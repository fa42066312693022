use serde::{Deserialize, Serialize};

/// Normalized outcome of inspecting one transaction on one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_address: Option<String>,
    pub is_payment_asset: bool,
    /// Human units, already divided by the asset's decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferRecord {
    /// The chain has no such transaction.
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            blockchain: None,
            receiver_address: None,
            is_payment_asset: false,
            amount: None,
            error: Some(reason.into()),
        }
    }

    /// The transaction exists on `chain` but did not succeed.
    pub fn failed(chain: &str, reason: impl Into<String>) -> Self {
        Self {
            blockchain: Some(chain.to_string()),
            ..Self::not_found(reason)
        }
    }

    /// A successful transfer of the payment asset.
    pub fn payment(chain: &str, receiver: String, amount: String) -> Self {
        Self {
            is_valid: true,
            blockchain: Some(chain.to_string()),
            receiver_address: Some(receiver),
            is_payment_asset: true,
            amount: Some(amount),
            error: None,
        }
    }

    /// A successful transaction that moved something other than the payment asset.
    pub fn other(chain: &str, receiver: Option<String>) -> Self {
        Self {
            is_valid: true,
            blockchain: Some(chain.to_string()),
            receiver_address: receiver,
            is_payment_asset: false,
            amount: None,
            error: None,
        }
    }

    /// Transaction was seen on a chain and reverted there.
    pub fn is_onchain_failure(&self) -> bool {
        !self.is_valid && self.blockchain.is_some()
    }
}

/// Aggregate answer for one submitted reference.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationVerdict {
    pub is_valid: bool,
    pub transfer: Option<TransferRecord>,
    pub error: Option<String>,
}

impl VerificationVerdict {
    pub fn accepted(transfer: TransferRecord) -> Self {
        Self {
            is_valid: true,
            transfer: Some(transfer),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            transfer: None,
            error: Some(error.into()),
        }
    }

    pub fn blockchain(&self) -> Option<&str> {
        self.transfer.as_ref().and_then(|t| t.blockchain.as_deref())
    }
}

/// JSON shape of a verdict returned to HTTP callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_payment_asset: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&VerificationVerdict> for VerdictResponse {
    fn from(verdict: &VerificationVerdict) -> Self {
        let transfer = verdict.transfer.as_ref();
        Self {
            is_valid: verdict.is_valid,
            blockchain: transfer.and_then(|t| t.blockchain.clone()),
            receiver_address: transfer.and_then(|t| t.receiver_address.clone()),
            is_payment_asset: transfer.map(|t| t.is_payment_asset),
            amount: transfer.and_then(|t| t.amount.clone()),
            error: verdict
                .error
                .clone()
                .or_else(|| transfer.and_then(|t| t.error.clone())),
        }
    }
}

/// A payment that passed verification, policy and the replay guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedPayment {
    pub reference: String,
    pub blockchain: String,
    pub receiver_address: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub accepted_at: chrono::DateTime<chrono::Utc>,
}
