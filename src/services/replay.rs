use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashSet;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Replay store unavailable: {0}")]
    Unavailable(String),
}

/// At-most-once use of payment references.
///
/// `claim` must be atomic: of any number of concurrent claims for one key,
/// exactly one returns `true`.
#[async_trait]
pub trait ReplayGuard: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn is_used(&self, key: &str) -> Result<bool, ReplayError>;

    /// Mark `key` used. Returns `false` if it already was.
    async fn claim(&self, key: &str) -> Result<bool, ReplayError>;

    async fn ping(&self) -> bool {
        true
    }
}

/// Process-local guard. Claims are lost on restart.
#[derive(Default)]
pub struct MemoryReplayGuard {
    used: Mutex<HashSet<String>>,
}

impl MemoryReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn used(&self) -> Result<std::sync::MutexGuard<'_, HashSet<String>>, ReplayError> {
        self.used
            .lock()
            .map_err(|e| ReplayError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl ReplayGuard for MemoryReplayGuard {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn is_used(&self, key: &str) -> Result<bool, ReplayError> {
        Ok(self.used()?.contains(key))
    }

    async fn claim(&self, key: &str) -> Result<bool, ReplayError> {
        Ok(self.used()?.insert(key.to_string()))
    }
}

/// Redis-backed guard; claims use `SET NX` so they are atomic across instances.
pub struct RedisReplayGuard {
    redis: redis::aio::ConnectionManager,
    prefix: String,
}

impl RedisReplayGuard {
    pub async fn connect(redis_url: &str) -> Result<Self, ReplayError> {
        let client = redis::Client::open(redis_url)?;
        let redis = client.get_connection_manager().await?;
        tracing::info!("Redis replay guard connected");

        Ok(Self {
            redis,
            prefix: "tx-sentinel:used:".to_string(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl ReplayGuard for RedisReplayGuard {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn is_used(&self, key: &str) -> Result<bool, ReplayError> {
        let mut redis = self.redis.clone();
        Ok(redis.exists(self.key(key)).await?)
    }

    async fn claim(&self, key: &str) -> Result<bool, ReplayError> {
        let mut redis = self.redis.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.key(key))
            .arg(chrono::Utc::now().to_rfc3339())
            .arg("NX")
            .query_async(&mut redis)
            .await?;
        Ok(reply.is_some())
    }

    async fn ping(&self) -> bool {
        let mut redis = self.redis.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut redis)
            .await
            .is_ok()
    }
}
