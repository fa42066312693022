use crate::{
    app::AppState,
    models::{AcceptedPayment, ApiResponse, VerdictResponse, VerifyRequest},
};
use axum::{extract::State, http::StatusCode, Extension, Json};

/// Look a reference up without applying policy or consuming it.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Json<VerdictResponse> {
    let verdict = state
        .gate
        .verifier()
        .verify(request.transaction_hash.trim())
        .await;
    Json(VerdictResponse::from(&verdict))
}

/// Reached only through the payment gate, which has already consumed the reference.
pub async fn redeem(
    Extension(payment): Extension<AcceptedPayment>,
) -> (StatusCode, Json<ApiResponse<AcceptedPayment>>) {
    (StatusCode::CREATED, Json(ApiResponse::ok(payment)))
}
