use crate::{
    models::{TransferRecord, VerificationVerdict},
    services::{
        analytics::Analytics,
        cache::RecordCache,
        classifier,
        probe::ChainProbe,
        registry::ChainRegistry,
    },
};
use anyhow::bail;
use futures::stream::{FuturesUnordered, StreamExt};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const MALFORMED_REFERENCE: &str = "Unsupported or malformed reference";
pub const NOT_FOUND_ANYWHERE: &str = "Transaction not found on any supported chain";
pub const VERIFICATION_TIMED_OUT: &str = "Verification timed out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// One chain at a time in registry order.
    Sequential,
    /// All candidate chains at once; the first valid answer wins and the rest are dropped.
    Parallel,
}

impl FromStr for ProbeStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(ProbeStrategy::Sequential),
            "parallel" => Ok(ProbeStrategy::Parallel),
            _ => bail!("Unknown probe strategy: {}", s),
        }
    }
}

enum Outcome {
    Found(TransferRecord),
    /// No chain had a valid transaction; keeps the first on-chain failure seen, if any.
    Exhausted(Option<TransferRecord>),
}

/// Turns an untrusted reference into a verdict by asking every plausible chain.
pub struct PaymentVerifier {
    registry: ChainRegistry,
    cache: RecordCache,
    analytics: Arc<Analytics>,
    strategy: ProbeStrategy,
    budget: Duration,
}

impl PaymentVerifier {
    pub fn new(
        registry: ChainRegistry,
        cache: RecordCache,
        analytics: Arc<Analytics>,
        strategy: ProbeStrategy,
        budget: Duration,
    ) -> Self {
        Self {
            registry,
            cache,
            analytics,
            strategy,
            budget,
        }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub async fn verify(&self, reference: &str) -> VerificationVerdict {
        self.analytics.record_verification();

        let families = classifier::classify(reference);
        if families.is_empty() {
            self.analytics.record_malformed();
            tracing::debug!("Rejected malformed reference without probing");
            return VerificationVerdict::rejected(MALFORMED_REFERENCE);
        }

        let cache_key = classifier::normalize(reference);
        if let Some(record) = self.cache.get(&cache_key).await {
            self.analytics.record_cache_hit();
            return VerificationVerdict::accepted(record);
        }

        let candidates = self.registry.snapshot().await.candidates(&families);

        let search = async {
            match self.strategy {
                ProbeStrategy::Sequential => probe_sequential(reference, &candidates).await,
                ProbeStrategy::Parallel => probe_parallel(reference, &candidates).await,
            }
        };

        let outcome = match tokio::time::timeout(self.budget, search).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    budget_ms = self.budget.as_millis() as u64,
                    chains = candidates.len(),
                    "Verification budget exhausted"
                );
                return VerificationVerdict::rejected(VERIFICATION_TIMED_OUT);
            }
        };

        match outcome {
            Outcome::Found(record) => {
                self.cache.insert(&cache_key, &record).await;
                VerificationVerdict::accepted(record)
            }
            Outcome::Exhausted(Some(failure)) => {
                let chain = failure.blockchain.clone().unwrap_or_default();
                VerificationVerdict {
                    is_valid: false,
                    transfer: Some(failure),
                    error: Some(format!("Transaction failed on {}", chain)),
                }
            }
            Outcome::Exhausted(None) => VerificationVerdict::rejected(NOT_FOUND_ANYWHERE),
        }
    }
}

async fn run_probe(probe: &Arc<dyn ChainProbe>, reference: &str) -> Option<TransferRecord> {
    match probe.probe(reference).await {
        Ok(record) => {
            tracing::debug!(
                chain = %probe.key(),
                valid = record.is_valid,
                payment = record.is_payment_asset,
                error = record.error.as_deref().unwrap_or(""),
                "Probe finished"
            );
            Some(record)
        }
        Err(e) => {
            tracing::warn!(chain = %probe.key(), error = %e, "Probe failed, skipping chain");
            None
        }
    }
}

async fn probe_sequential(reference: &str, candidates: &[Arc<dyn ChainProbe>]) -> Outcome {
    let mut failure = None;
    for probe in candidates {
        match run_probe(probe, reference).await {
            Some(record) if record.is_valid => return Outcome::Found(record),
            Some(record) if record.is_onchain_failure() => {
                failure.get_or_insert(record);
            }
            _ => {}
        }
    }
    Outcome::Exhausted(failure)
}

async fn probe_parallel(reference: &str, candidates: &[Arc<dyn ChainProbe>]) -> Outcome {
    let mut pending: FuturesUnordered<_> = candidates
        .iter()
        .map(|probe| run_probe(probe, reference))
        .collect();

    let mut failure = None;
    while let Some(result) = pending.next().await {
        match result {
            Some(record) if record.is_valid => return Outcome::Found(record),
            Some(record) if record.is_onchain_failure() => {
                failure.get_or_insert(record);
            }
            _ => {}
        }
    }
    Outcome::Exhausted(failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy() {
        assert_eq!("Sequential".parse::<ProbeStrategy>().unwrap(), ProbeStrategy::Sequential);
        assert_eq!("parallel".parse::<ProbeStrategy>().unwrap(), ProbeStrategy::Parallel);
        assert!("random".parse::<ProbeStrategy>().is_err());
    }
}
