pub mod analytics;
pub mod cache;
pub mod classifier;
pub mod evm;
pub mod policy;
pub mod probe;
pub mod registry;
pub mod replay;
pub mod solana;
pub mod verifier;

pub use analytics::Analytics;
pub use cache::RecordCache;
pub use evm::EvmProbe;
pub use policy::{PaymentPolicy, PolicyViolation};
pub use probe::{ChainProbe, ProbeError};
pub use registry::{ChainRegistry, ChainSet};
pub use replay::{MemoryReplayGuard, RedisReplayGuard, ReplayError, ReplayGuard};
pub use solana::SolanaProbe;
pub use verifier::{PaymentVerifier, ProbeStrategy};
