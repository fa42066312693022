use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub chains: usize,
    pub replay_store: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub verifications: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub replays_blocked: u64,
    pub cache_hits: u64,
    /// Accepted payments per chain key.
    pub accepted_by_chain: BTreeMap<String, u64>,
    pub uptime_seconds: u64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub transaction_hash: String,
}

#[derive(Deserialize, Debug)]
pub struct RegisterChainRequest {
    pub key: String,
    #[serde(flatten)]
    pub descriptor: super::ChainDescriptor,
}
