use crate::{
    models::{ChainDescriptor, SOLANA_KEY},
    services::ProbeStrategy,
};
use anyhow::{bail, Context, Result};
use ethers::types::Address;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Chains, probed in this order with Solana last
    pub evm_chains: Vec<(String, ChainDescriptor)>,
    pub solana: Option<ChainDescriptor>,
    pub solana_commitment: String,

    // Payment policy
    pub evm_receiver: String,
    pub solana_receiver: Option<String>,
    pub payment_price: Decimal,

    // Verification
    pub rpc_timeout: Duration,
    pub verify_timeout: Duration,
    pub probe_strategy: ProbeStrategy,
    pub record_cache_ttl: Duration,

    // Replay guard
    pub redis_url: Option<String>,

    pub admin_token: Option<String>,
}

/// Built-in parameters for the chains enabled out of the box.
struct KnownChain {
    key: &'static str,
    name: &'static str,
    rpc_url: &'static str,
    usdc_contract: &'static str,
    chain_id: u64,
    explorer_url: &'static str,
}

const KNOWN_EVM_CHAINS: &[KnownChain] = &[
    KnownChain {
        key: "base",
        name: "Base",
        rpc_url: "https://mainnet.base.org",
        usdc_contract: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
        chain_id: 8453,
        explorer_url: "https://basescan.org",
    },
    KnownChain {
        key: "scroll",
        name: "Scroll",
        rpc_url: "https://rpc.scroll.io",
        usdc_contract: "0x06eFdBFf2a14a7c8E15944D1F4A48F9F95F663A4",
        chain_id: 534352,
        explorer_url: "https://scrollscan.com",
    },
];

const SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const SOLANA_USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let var_or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let environment = Self::parse_environment(&var_or("ENVIRONMENT", "development"))?;

        let evm_chains = var_or("EVM_CHAINS", "base,scroll")
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Ok((key.to_lowercase(), Self::evm_chain(key, &var)?)))
            .collect::<Result<Vec<_>>>()?;

        let solana_enabled: bool = var_or("SOLANA_ENABLED", "true")
            .parse()
            .context("Invalid SOLANA_ENABLED")?;

        let solana = if solana_enabled {
            Some(
                ChainDescriptor::solana(
                    var_or("SOLANA_RPC_URL", SOLANA_RPC_URL),
                    var_or("SOLANA_USDC_MINT", SOLANA_USDC_MINT),
                    var_or("SOLANA_USDC_DECIMALS", "6")
                        .parse()
                        .context("Invalid SOLANA_USDC_DECIMALS")?,
                )
                .with_explorer("https://solscan.io"),
            )
        } else {
            None
        };

        let solana_receiver = if solana_enabled {
            Some(var("SOLANA_ADDRESS").context("SOLANA_ADDRESS required")?)
        } else {
            None
        };

        let config = Self {
            environment,
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "8080").parse().context("Invalid PORT")?,

            evm_chains,
            solana,
            solana_commitment: var_or("SOLANA_COMMITMENT", "finalized").to_lowercase(),

            evm_receiver: var("WALLET_ADDRESS").context("WALLET_ADDRESS required")?,
            solana_receiver,
            payment_price: Decimal::from_str(&var_or("PAYMENT_PRICE", "3"))
                .context("Invalid PAYMENT_PRICE")?,

            rpc_timeout: Duration::from_millis(
                var_or("RPC_TIMEOUT_MS", "10000")
                    .parse()
                    .context("Invalid RPC_TIMEOUT_MS")?,
            ),
            verify_timeout: Duration::from_millis(
                var_or("VERIFY_TIMEOUT_MS", "30000")
                    .parse()
                    .context("Invalid VERIFY_TIMEOUT_MS")?,
            ),
            probe_strategy: var_or("PROBE_STRATEGY", "sequential").parse()?,
            record_cache_ttl: Duration::from_secs(
                var_or("RECORD_CACHE_TTL_SECS", "60")
                    .parse()
                    .context("Invalid RECORD_CACHE_TTL_SECS")?,
            ),

            redis_url: var("REDIS_URL"),
            admin_token: var("ADMIN_TOKEN"),
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(env: &str) -> Result<Environment> {
        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    /// Read `<KEY>_RPC_URL`, `<KEY>_USDC_CONTRACT`, ... falling back to built-in
    /// values for known chains.
    fn evm_chain(key: &str, var: &impl Fn(&str) -> Option<String>) -> Result<ChainDescriptor> {
        let prefix = key.to_uppercase().replace('-', "_");
        let known = KNOWN_EVM_CHAINS
            .iter()
            .find(|chain| chain.key.eq_ignore_ascii_case(key));

        let setting = |suffix: &str, fallback: Option<String>| -> Result<String> {
            let name = format!("{}_{}", prefix, suffix);
            var(&name)
                .or(fallback)
                .with_context(|| format!("{} required", name))
        };

        let name = setting("NAME", Some(known.map_or(key.to_string(), |k| k.name.to_string())))?;
        let rpc_url = setting("RPC_URL", known.map(|k| k.rpc_url.to_string()))?;
        let usdc_contract = setting("USDC_CONTRACT", known.map(|k| k.usdc_contract.to_string()))?;
        let decimals = setting("USDC_DECIMALS", Some("6".to_string()))?
            .parse()
            .with_context(|| format!("Invalid {}_USDC_DECIMALS", prefix))?;
        let chain_id = setting("CHAIN_ID", known.map(|k| k.chain_id.to_string()))?
            .parse()
            .with_context(|| format!("Invalid {}_CHAIN_ID", prefix))?;

        let mut descriptor = ChainDescriptor::evm(name, rpc_url, usdc_contract, decimals, chain_id);
        if let Some(explorer) = var(&format!("{}_EXPLORER_URL", prefix))
            .or_else(|| known.map(|k| k.explorer_url.to_string()))
        {
            descriptor = descriptor.with_explorer(explorer);
        }
        Ok(descriptor)
    }

    fn validate(&self) -> Result<()> {
        if self.evm_chains.is_empty() && self.solana.is_none() {
            bail!("At least one chain must be configured");
        }

        for (key, chain) in &self.evm_chains {
            if key == SOLANA_KEY {
                bail!("EVM chain key '{}' is reserved", SOLANA_KEY);
            }
            if !chain.rpc_url.starts_with("http") {
                bail!("{} RPC URL must be HTTP(S) URL", key);
            }
            Address::from_str(&chain.asset_address)
                .with_context(|| format!("Invalid USDC contract for {}", key))?;
            if chain.asset_decimals > 36 {
                bail!("{} USDC decimals must be at most 36", key);
            }
        }

        if let Some(solana) = &self.solana {
            if !solana.rpc_url.starts_with("http") {
                bail!("SOLANA_RPC_URL must be HTTP(S) URL");
            }
            // getTransaction rejects "processed"
            if !matches!(self.solana_commitment.as_str(), "confirmed" | "finalized") {
                bail!("Unknown SOLANA_COMMITMENT: {}", self.solana_commitment);
            }
        }

        Address::from_str(&self.evm_receiver).context("Invalid WALLET_ADDRESS")?;

        if let Some(receiver) = &self.solana_receiver {
            let bytes = bs58::decode(receiver)
                .into_vec()
                .context("Invalid SOLANA_ADDRESS")?;
            if bytes.len() != 32 {
                bail!("SOLANA_ADDRESS must decode to 32 bytes");
            }
        }

        if self.payment_price <= Decimal::ZERO {
            bail!("PAYMENT_PRICE must be positive");
        }

        if self.rpc_timeout.is_zero() || self.verify_timeout.is_zero() {
            bail!("Timeouts must be positive");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const WALLET: &str = "0x1111111111111111111111111111111111111111";
    const SOL_WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_base_scroll_and_solana() {
        let config = load(&[("WALLET_ADDRESS", WALLET), ("SOLANA_ADDRESS", SOL_WALLET)]).unwrap();

        let keys: Vec<_> = config.evm_chains.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["base", "scroll"]);
        assert_eq!(config.evm_chains[0].1.chain_id, Some(8453));
        assert!(config.solana.is_some());
        assert_eq!(config.payment_price, Decimal::from(3));
        assert_eq!(config.probe_strategy, ProbeStrategy::Sequential);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn custom_chain_reads_prefixed_variables() {
        let config = load(&[
            ("WALLET_ADDRESS", WALLET),
            ("SOLANA_ENABLED", "false"),
            ("EVM_CHAINS", "polygon"),
            ("POLYGON_RPC_URL", "https://polygon-rpc.com"),
            ("POLYGON_USDC_CONTRACT", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
            ("POLYGON_CHAIN_ID", "137"),
        ])
        .unwrap();

        let (key, chain) = &config.evm_chains[0];
        assert_eq!(key, "polygon");
        assert_eq!(chain.name, "polygon");
        assert_eq!(chain.chain_id, Some(137));
        assert!(chain.explorer_url.is_none());
        assert!(config.solana.is_none());
        assert!(config.solana_receiver.is_none());
    }

    #[test]
    fn unknown_chain_without_rpc_is_an_error() {
        let err = load(&[
            ("WALLET_ADDRESS", WALLET),
            ("SOLANA_ENABLED", "false"),
            ("EVM_CHAINS", "polygon"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("POLYGON_RPC_URL"));
    }

    #[test]
    fn requires_receivers() {
        assert!(load(&[("SOLANA_ADDRESS", SOL_WALLET)]).is_err());
        assert!(load(&[("WALLET_ADDRESS", WALLET)]).is_err());
        assert!(load(&[("WALLET_ADDRESS", "0x1234"), ("SOLANA_ADDRESS", SOL_WALLET)]).is_err());
        assert!(load(&[("WALLET_ADDRESS", WALLET), ("SOLANA_ADDRESS", "OWNER1")]).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        let base = [("WALLET_ADDRESS", WALLET), ("SOLANA_ADDRESS", SOL_WALLET)];
        let with = |extra: (&'static str, &'static str)| {
            let mut vars = base.to_vec();
            vars.push(extra);
            load(&vars)
        };

        assert!(with(("PAYMENT_PRICE", "0")).is_err());
        assert!(with(("PAYMENT_PRICE", "abc")).is_err());
        assert!(with(("PROBE_STRATEGY", "random")).is_err());
        assert!(with(("SOLANA_COMMITMENT", "eventually")).is_err());
        assert!(with(("SOLANA_COMMITMENT", "processed")).is_err());
        assert!(with(("SOLANA_COMMITMENT", "Confirmed")).is_ok());
        assert!(with(("BASE_RPC_URL", "ftp://example.com")).is_err());
        assert!(with(("ENVIRONMENT", "staging")).is_err());
        assert!(with(("RPC_TIMEOUT_MS", "0")).is_err());
    }
}
