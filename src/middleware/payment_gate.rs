use crate::{
    error::{PaymentInstructions, PaymentRecipients, SentinelError},
    models::AcceptedPayment,
    services::{
        classifier,
        verifier::MALFORMED_REFERENCE,
        Analytics, PaymentPolicy, PaymentVerifier, ReplayGuard,
    },
};
use axum::{extract::Request, middleware::Next, response::Response};
use chrono::Utc;
use std::sync::Arc;

pub const PAYMENT_HEADER: &str = "X-Payment";

/// Verify, apply policy, then atomically consume a payment reference.
pub struct PaymentGate {
    verifier: Arc<PaymentVerifier>,
    policy: PaymentPolicy,
    replay: Arc<dyn ReplayGuard>,
    analytics: Arc<Analytics>,
}

impl PaymentGate {
    pub fn new(
        verifier: Arc<PaymentVerifier>,
        policy: PaymentPolicy,
        replay: Arc<dyn ReplayGuard>,
        analytics: Arc<Analytics>,
    ) -> Self {
        Self {
            verifier,
            policy,
            replay,
            analytics,
        }
    }

    pub fn verifier(&self) -> &PaymentVerifier {
        &self.verifier
    }

    pub fn replay(&self) -> &Arc<dyn ReplayGuard> {
        &self.replay
    }

    pub async fn payment_instructions(&self) -> PaymentInstructions {
        PaymentInstructions::new(
            self.policy.required_amount().to_string(),
            self.verifier.registry().list_supported().await,
            PaymentRecipients {
                evm: self.policy.evm_receiver().to_string(),
                solana: self.policy.solana_receiver().map(str::to_string),
            },
        )
    }

    /// Admit the payment named by `payment_header`, or explain why not.
    ///
    /// The reference is consumed only after verification and policy both pass,
    /// and the consuming claim is the single atomic step against the replay store.
    pub async fn admit(
        &self,
        payment_header: Option<&str>,
    ) -> Result<AcceptedPayment, SentinelError> {
        let Some(reference) = payment_header.map(str::trim).filter(|r| !r.is_empty()) else {
            return Err(SentinelError::PaymentRequired(Box::new(
                self.payment_instructions().await,
            )));
        };

        if classifier::classify(reference).is_empty() {
            self.analytics.record_malformed();
            self.analytics.record_rejection();
            return Err(SentinelError::InvalidPaymentProof(MALFORMED_REFERENCE.to_string()));
        }

        let replay_key = classifier::normalize(reference);

        // Cheap early exit; the claim below is what actually enforces single use.
        if self.replay.is_used(&replay_key).await? {
            self.analytics.record_replay();
            return Err(SentinelError::ReferenceAlreadyUsed);
        }

        let verdict = self.verifier.verify(reference).await;
        let transfer = match verdict.transfer {
            Some(transfer) if verdict.is_valid => transfer,
            _ => {
                self.analytics.record_rejection();
                return Err(SentinelError::PaymentVerificationFailed(
                    verdict
                        .error
                        .unwrap_or_else(|| "Transaction is not valid".to_string()),
                ));
            }
        };

        if let Err(violation) = self.policy.evaluate(&transfer) {
            self.analytics.record_rejection();
            return Err(violation.into());
        }

        if !self.replay.claim(&replay_key).await? {
            self.analytics.record_replay();
            return Err(SentinelError::ReferenceAlreadyUsed);
        }

        // evaluate() guarantees these are present
        let (Some(blockchain), Some(receiver_address), Some(amount)) = (
            transfer.blockchain,
            transfer.receiver_address,
            transfer.amount,
        ) else {
            return Err(SentinelError::InternalError(
                "Accepted transfer is missing fields".to_string(),
            ));
        };

        let explorer_url = self
            .verifier
            .registry()
            .snapshot()
            .await
            .get(&blockchain)
            .and_then(|probe| probe.descriptor().explorer_tx_url(reference));

        self.analytics.record_payment(&blockchain, &amount, &replay_key);

        Ok(AcceptedPayment {
            reference: replay_key,
            blockchain,
            receiver_address,
            amount,
            explorer_url,
            accepted_at: Utc::now(),
        })
    }
}

// Axum middleware function
pub async fn payment_gate_layer(
    gate: Arc<PaymentGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, SentinelError> {
    let payment_header = request
        .headers()
        .get(PAYMENT_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let payment = gate.admit(payment_header.as_deref()).await?;

    // Payment consumed, hand it to the handler
    request.extensions_mut().insert(payment);
    Ok(next.run(request).await)
}
