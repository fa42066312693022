//! Runtime-extensible catalogue of chain probes.
//!
//! Readers take a snapshot (`Arc<ChainSet>`) and keep using it for the whole
//! verification, so a concurrent registration is seen either entirely or not at all.

use crate::{
    models::{ChainDescriptor, ChainFamily, ChainSummary, SOLANA_KEY},
    services::{
        evm::EvmProbe,
        probe::ChainProbe,
        solana::SolanaProbe,
    },
};
use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Immutable view of the registered chains: EVM chains in registration order,
/// then Solana.
#[derive(Clone, Default)]
pub struct ChainSet {
    evm: Vec<Arc<dyn ChainProbe>>,
    solana: Option<Arc<dyn ChainProbe>>,
}

impl ChainSet {
    /// Probes to try for a reference of the given families, in probe order.
    pub fn candidates(&self, families: &[ChainFamily]) -> Vec<Arc<dyn ChainProbe>> {
        let mut probes = Vec::new();
        if families.contains(&ChainFamily::Evm) {
            probes.extend(self.evm.iter().cloned());
        }
        if families.contains(&ChainFamily::Solana) {
            probes.extend(self.solana.iter().cloned());
        }
        probes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ChainProbe>> {
        self.evm.iter().chain(self.solana.iter())
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn ChainProbe>> {
        self.iter().find(|probe| probe.key() == key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|probe| probe.key().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.evm.len() + usize::from(self.solana.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct ChainRegistry {
    chains: Arc<RwLock<Arc<ChainSet>>>,
    rpc_timeout: Duration,
    solana_commitment: String,
}

impl ChainRegistry {
    pub fn new(rpc_timeout: Duration, solana_commitment: impl Into<String>) -> Self {
        Self {
            chains: Arc::new(RwLock::new(Arc::new(ChainSet::default()))),
            rpc_timeout,
            solana_commitment: solana_commitment.into(),
        }
    }

    /// Build a probe for `descriptor` and register it under `key`.
    ///
    /// Re-registering a key replaces the previous chain in place.
    pub async fn register(&self, key: &str, descriptor: ChainDescriptor) -> Result<()> {
        let probe: Arc<dyn ChainProbe> = match descriptor.family {
            ChainFamily::Evm => {
                if key == SOLANA_KEY {
                    bail!("Chain key '{}' is reserved for Solana", SOLANA_KEY);
                }
                Arc::new(EvmProbe::connect(key, descriptor, self.rpc_timeout)?)
            }
            ChainFamily::Solana => {
                if key != SOLANA_KEY {
                    bail!("Solana must be registered as '{}', got '{}'", SOLANA_KEY, key);
                }
                Arc::new(SolanaProbe::connect(
                    descriptor,
                    self.solana_commitment.clone(),
                    self.rpc_timeout,
                )?)
            }
        };

        self.register_probe(probe).await;
        Ok(())
    }

    /// Register an already-built probe under its own key.
    pub async fn register_probe(&self, probe: Arc<dyn ChainProbe>) {
        let mut chains = self.chains.write().await;
        let mut next = ChainSet::clone(&chains);

        match probe.family() {
            ChainFamily::Solana => next.solana = Some(probe.clone()),
            ChainFamily::Evm => {
                match next.evm.iter().position(|existing| existing.key() == probe.key()) {
                    Some(index) => next.evm[index] = probe.clone(),
                    None => next.evm.push(probe.clone()),
                }
            }
        }

        *chains = Arc::new(next);

        tracing::info!(
            chain = %probe.key(),
            name = %probe.descriptor().name,
            family = %probe.family(),
            "Chain registered"
        );
    }

    pub async fn snapshot(&self) -> Arc<ChainSet> {
        self.chains.read().await.clone()
    }

    /// Registered chain keys: EVM chains first, Solana last.
    pub async fn list_supported(&self) -> Vec<String> {
        self.snapshot().await.keys()
    }

    pub async fn summaries(&self) -> Vec<ChainSummary> {
        self.snapshot()
            .await
            .iter()
            .map(|probe| {
                let descriptor = probe.descriptor();
                ChainSummary {
                    key: probe.key().to_string(),
                    name: descriptor.name.clone(),
                    family: descriptor.family,
                    chain_id: descriptor.chain_id,
                    explorer_url: descriptor.explorer_url.clone(),
                }
            })
            .collect()
    }
}
