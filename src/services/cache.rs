use crate::models::TransferRecord;
use moka::future::Cache;
use std::time::Duration;

/// Short-lived cache of valid transfer records keyed by normalized reference.
///
/// Only successful lookups are cached: a confirmed transaction does not change,
/// while a "not found" may turn into a hit once the transaction lands.
pub struct RecordCache {
    memory: Option<Cache<String, TransferRecord>>,
}

impl RecordCache {
    pub fn new(ttl: Duration) -> Self {
        if ttl.is_zero() {
            return Self::disabled();
        }

        let memory = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();

        Self {
            memory: Some(memory),
        }
    }

    pub fn disabled() -> Self {
        Self { memory: None }
    }

    pub async fn get(&self, key: &str) -> Option<TransferRecord> {
        let cached = self.memory.as_ref()?.get(key).await;
        if cached.is_some() {
            tracing::debug!("Record cache hit for {}", key);
        }
        cached
    }

    pub async fn insert(&self, key: &str, record: &TransferRecord) {
        if !record.is_valid {
            return;
        }
        if let Some(memory) = &self.memory {
            memory.insert(key.to_string(), record.clone()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_only_valid_records() {
        let cache = RecordCache::new(Duration::from_secs(60));
        cache
            .insert("missing", &TransferRecord::not_found("Transaction not found"))
            .await;
        cache
            .insert("hit", &TransferRecord::other("base", None))
            .await;

        assert!(cache.get("missing").await.is_none());
        assert_eq!(cache.get("hit").await, Some(TransferRecord::other("base", None)));
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let cache = RecordCache::new(Duration::ZERO);
        cache.insert("hit", &TransferRecord::other("base", None)).await;
        assert!(cache.get("hit").await.is_none());
    }
}
