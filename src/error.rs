use crate::services::{PolicyViolation, ReplayError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Payment required: {} USDC", .0.payment.amount)]
    PaymentRequired(Box<PaymentInstructions>),

    #[error("Payment verification failed: {0}")]
    PaymentVerificationFailed(String),

    #[error("Invalid payment proof: {0}")]
    InvalidPaymentProof(String),

    #[error("Payment rejected: {0}")]
    PaymentRejected(#[from] PolicyViolation),

    #[error("Transaction already used")]
    ReferenceAlreadyUsed,

    #[error("Replay store error: {0}")]
    ReplayStore(#[from] ReplayError),

    #[error("Invalid chain registration: {0}")]
    InvalidChain(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_instructions: Option<PaymentInstructions>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentInstructions {
    #[serde(rename = "type")]
    pub type_: String,
    pub version: String,
    pub payment: PaymentDetails,
    pub instructions: PaymentFormat,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentDetails {
    pub asset: String,
    pub amount: String,
    pub chains: Vec<String>,
    pub recipients: PaymentRecipients,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentRecipients {
    pub evm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solana: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentFormat {
    pub header: String,
    pub format: String,
}

impl PaymentInstructions {
    pub fn new(amount: String, chains: Vec<String>, recipients: PaymentRecipients) -> Self {
        Self {
            type_: "payment_required".to_string(),
            version: "1.0.0".to_string(),
            payment: PaymentDetails {
                asset: "USDC".to_string(),
                amount,
                chains,
                recipients,
            },
            instructions: PaymentFormat {
                header: crate::middleware::PAYMENT_HEADER.to_string(),
                format: "transaction_hash".to_string(),
            },
        }
    }
}

impl SentinelError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            SentinelError::PaymentRequired(_) => (StatusCode::PAYMENT_REQUIRED, "PAYMENT_REQUIRED"),
            SentinelError::PaymentVerificationFailed(_) => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_VERIFICATION_FAILED")
            }
            SentinelError::PaymentRejected(_) => (StatusCode::PAYMENT_REQUIRED, "PAYMENT_REJECTED"),
            SentinelError::InvalidPaymentProof(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_PAYMENT_PROOF")
            }
            SentinelError::ReferenceAlreadyUsed => (StatusCode::CONFLICT, "REFERENCE_ALREADY_USED"),
            SentinelError::ReplayStore(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "REPLAY_STORE_UNAVAILABLE")
            }
            SentinelError::InvalidChain(_) => (StatusCode::BAD_REQUEST, "INVALID_CHAIN"),
            SentinelError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            SentinelError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for SentinelError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let (status, error_code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, error_code = error_code, "Request failed");
        } else {
            tracing::warn!(error = %self, error_code = error_code, "Request rejected");
        }

        let error = self.to_string();
        let payment_instructions = match self {
            SentinelError::PaymentRequired(instructions) => Some(*instructions),
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            error,
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
            payment_instructions,
        };

        (status, Json(body)).into_response()
    }
}
