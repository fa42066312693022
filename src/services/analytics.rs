use crate::models::Stats;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

pub struct Analytics {
    verifications: AtomicU64,
    malformed: AtomicU64,
    cache_hits: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    replays_blocked: AtomicU64,
    accepted_by_chain: Mutex<BTreeMap<String, u64>>,
    start_time: Instant,
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}

impl Analytics {
    pub fn new() -> Self {
        Self {
            verifications: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            replays_blocked: AtomicU64::new(0),
            accepted_by_chain: Mutex::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    pub fn record_verification(&self) {
        self.verifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay(&self) {
        self.replays_blocked.fetch_add(1, Ordering::Relaxed);
        self.record_rejection();
    }

    pub fn record_payment(&self, chain: &str, amount: &str, reference: &str) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut by_chain) = self.accepted_by_chain.lock() {
            *by_chain.entry(chain.to_string()).or_insert(0) += 1;
        }

        tracing::info!(
            chain = %chain,
            amount = %amount,
            reference = %reference,
            "Payment accepted"
        );
    }

    pub fn get_stats(&self) -> Stats {
        let accepted_by_chain = self
            .accepted_by_chain
            .lock()
            .map(|by_chain| by_chain.clone())
            .unwrap_or_default();

        Stats {
            verifications: self.verifications.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            replays_blocked: self.replays_blocked.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            accepted_by_chain,
            uptime_seconds: self.uptime_seconds(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
