#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tx_sentinel::{
    middleware::PaymentGate,
    models::{ChainDescriptor, TransferRecord, SOLANA_KEY},
    services::{
        Analytics, ChainProbe, ChainRegistry, MemoryReplayGuard, PaymentPolicy, PaymentVerifier,
        ProbeError, ProbeStrategy, RecordCache,
    },
};

pub const EVM_HASH: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const EVM_WALLET: &str = "0xAbCdEf0000000000000000000000000000000001";
pub const SOL_WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
pub const USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
pub const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

pub fn solana_signature() -> String {
    "5".repeat(44) + &"K".repeat(44)
}

#[derive(Clone)]
pub enum Answer {
    Record(TransferRecord),
    Transport,
}

/// Scripted chain probe that counts how often it is asked.
pub struct FakeProbe {
    key: String,
    descriptor: ChainDescriptor,
    answer: Answer,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn evm(key: &str, answer: Answer) -> Arc<Self> {
        Self::build(
            key,
            ChainDescriptor::evm(key, "http://localhost:8545", USDC, 6, 1)
                .with_explorer(format!("https://{}.example", key)),
            answer,
            Duration::ZERO,
        )
    }

    pub fn solana(answer: Answer) -> Arc<Self> {
        Self::build(
            SOLANA_KEY,
            ChainDescriptor::solana("http://localhost:8899", MINT, 6),
            answer,
            Duration::ZERO,
        )
    }

    pub fn slow_evm(key: &str, answer: Answer, delay: Duration) -> Arc<Self> {
        Self::build(
            key,
            ChainDescriptor::evm(key, "http://localhost:8545", USDC, 6, 1),
            answer,
            delay,
        )
    }

    fn build(key: &str, descriptor: ChainDescriptor, answer: Answer, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            key: key.to_string(),
            descriptor,
            answer,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainProbe for FakeProbe {
    fn key(&self) -> &str {
        &self.key
    }

    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    async fn probe(&self, _reference: &str) -> Result<TransferRecord, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.answer {
            Answer::Record(record) => Ok(record.clone()),
            Answer::Transport => Err(ProbeError::MalformedResponse("connection refused".into())),
        }
    }
}

pub fn not_found() -> Answer {
    Answer::Record(TransferRecord::not_found("Transaction not found"))
}

pub fn failed(chain: &str) -> Answer {
    Answer::Record(TransferRecord::failed(chain, "Transaction failed"))
}

pub fn paid(chain: &str, to: &str, amount: &str) -> Answer {
    Answer::Record(TransferRecord::payment(chain, to.to_string(), amount.to_string()))
}

pub async fn registry_with(probes: &[Arc<FakeProbe>]) -> ChainRegistry {
    let registry = ChainRegistry::new(Duration::from_secs(1), "finalized");
    for probe in probes {
        registry.register_probe(probe.clone()).await;
    }
    registry
}

pub fn verifier(registry: ChainRegistry, strategy: ProbeStrategy, budget: Duration) -> PaymentVerifier {
    PaymentVerifier::new(
        registry,
        RecordCache::disabled(),
        Arc::new(Analytics::new()),
        strategy,
        budget,
    )
}

pub fn policy() -> PaymentPolicy {
    PaymentPolicy::new(Decimal::from(3), EVM_WALLET, Some(SOL_WALLET.to_string()))
}

pub async fn gate_with(probes: &[Arc<FakeProbe>]) -> (PaymentGate, Arc<Analytics>) {
    let analytics = Arc::new(Analytics::new());
    let verifier = PaymentVerifier::new(
        registry_with(probes).await,
        RecordCache::disabled(),
        analytics.clone(),
        ProbeStrategy::Sequential,
        Duration::from_secs(5),
    );
    let gate = PaymentGate::new(
        Arc::new(verifier),
        policy(),
        Arc::new(MemoryReplayGuard::new()),
        analytics.clone(),
    );
    (gate, analytics)
}
