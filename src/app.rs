use crate::{
    config::Config,
    handlers::*,
    middleware::{payment_gate_layer, PaymentGate},
    services::*,
};
use anyhow::{Context, Result};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<PaymentGate>,
    pub analytics: Arc<Analytics>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let registry = ChainRegistry::new(config.rpc_timeout, config.solana_commitment.clone());
        for (key, descriptor) in &config.evm_chains {
            registry
                .register(key, descriptor.clone())
                .await
                .with_context(|| format!("Failed to register chain {}", key))?;
        }
        if let Some(solana) = &config.solana {
            registry
                .register(crate::models::SOLANA_KEY, solana.clone())
                .await
                .context("Failed to register Solana")?;
        }

        let replay: Arc<dyn ReplayGuard> = match &config.redis_url {
            Some(url) => Arc::new(
                RedisReplayGuard::connect(url)
                    .await
                    .context("Failed to connect replay guard to Redis")?,
            ),
            None => {
                tracing::warn!("REDIS_URL not set, replay protection is process-local");
                Arc::new(MemoryReplayGuard::new())
            }
        };

        let analytics = Arc::new(Analytics::new());
        let verifier = Arc::new(PaymentVerifier::new(
            registry,
            RecordCache::new(config.record_cache_ttl),
            analytics.clone(),
            config.probe_strategy,
            config.verify_timeout,
        ));
        let policy = PaymentPolicy::new(
            config.payment_price,
            config.evm_receiver.clone(),
            config.solana_receiver.clone(),
        );

        Ok(Self {
            gate: Arc::new(PaymentGate::new(verifier, policy, replay, analytics.clone())),
            analytics,
            admin_token: config.admin_token.clone(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let gate = state.gate.clone();

    Router::new()
        // Public endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/api/chains", get(list_chains).post(register_chain))
        .route("/api/payments/verify", post(verify_payment))
        // Consumes the payment named in X-Payment
        .route(
            "/api/payments/redeem",
            post(redeem).layer(axum_middleware::from_fn(move |req, next| {
                let gate = gate.clone();
                async move { payment_gate_layer(gate, req, next).await }
            })),
        )
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
