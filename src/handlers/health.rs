use super::SharedState;
use crate::models::{HealthResponse, DEFAULT_NETWORK, SERVICES};
use axum::{extract::State, Json};

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        network: DEFAULT_NETWORK.to_string(),
        usdc_address: format!("{:?}", state.config.usdc_address),
        services: SERVICES.len(),
        demo: state.config.demo_mode,
    })
}
