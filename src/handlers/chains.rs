use crate::{
    app::AppState,
    error::SentinelError,
    models::{ApiResponse, ChainSummary, RegisterChainRequest},
};
use axum::{extract::State, http::HeaderMap, Json};

pub const ADMIN_HEADER: &str = "X-Admin-Token";

pub async fn list_chains(State(state): State<AppState>) -> Json<ApiResponse<Vec<ChainSummary>>> {
    Json(ApiResponse::ok(
        state.gate.verifier().registry().summaries().await,
    ))
}

/// Add or replace a chain at runtime. Disabled unless an admin token is configured.
pub async fn register_chain(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterChainRequest>,
) -> Result<Json<ApiResponse<Vec<ChainSummary>>>, SentinelError> {
    let presented = headers.get(ADMIN_HEADER).and_then(|h| h.to_str().ok());
    match (state.admin_token.as_deref(), presented) {
        (Some(expected), Some(presented)) if expected == presented => {}
        _ => return Err(SentinelError::Unauthorized),
    }

    let registry = state.gate.verifier().registry();
    registry
        .register(&request.key, request.descriptor)
        .await
        .map_err(|e| SentinelError::InvalidChain(format!("{:#}", e)))?;

    Ok(Json(ApiResponse::ok(registry.summaries().await)))
}
