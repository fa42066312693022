use crate::models::ChainFamily;
use once_cell::sync::Lazy;
use regex::Regex;

static EVM_TX_HASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{64}$").expect("valid EVM hash pattern"));

static SOLANA_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{88}$").expect("valid Solana signature pattern")
});

/// Chain families whose reference format `reference` matches. Never touches the network.
pub fn classify(reference: &str) -> Vec<ChainFamily> {
    let mut families = Vec::with_capacity(1);
    if EVM_TX_HASH.is_match(reference) {
        families.push(ChainFamily::Evm);
    }
    if SOLANA_SIGNATURE.is_match(reference) {
        families.push(ChainFamily::Solana);
    }
    families
}

/// Key used for replay protection and caching.
///
/// EVM hashes are hex and case-insensitive, so they are lower-cased; Base58
/// signatures are case-sensitive and kept as submitted.
pub fn normalize(reference: &str) -> String {
    if EVM_TX_HASH.is_match(reference) {
        reference.to_ascii_lowercase()
    } else {
        reference.to_string()
    }
}
