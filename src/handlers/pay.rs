use super::SharedState;
use crate::{
    error::ApiError,
    models::{PayResponse, Receipt, ReceiptStatus, DEFAULT_NETWORK},
    services::{client_key, NO_TX_SENTINEL},
};
use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    #[serde(rename = "amountUSDC")]
    pub amount_usdc: Option<String>,
    pub partner_id: Option<String>,
    pub service_id: Option<String>,
    pub service_label: Option<String>,
}

pub async fn pay(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<PayRequest>,
) -> Result<Json<PayResponse>, ApiError> {
    state.limiter.check(&client_key(&headers))?;

    let amount = body
        .amount_usdc
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("amountUSDC is required".to_string()))?
        .to_string();

    match state.payment.send_payment(&amount).await {
        Ok(outcome) => Ok(Json(PayResponse {
            success: true,
            tx_hash: Some(outcome.tx_hash),
            explorer_url: Some(outcome.explorer_url),
            amount_usdc: outcome.amount_usdc,
            partner_usdc: outcome.partner_usdc,
            platform_usdc: outcome.platform_usdc,
            split_mode: "offchain-stub".to_string(),
            service_id: body.service_id,
            service_label: body.service_label,
        })),
        // Failed attempts stay auditable; validation and rate-limit
        // rejections never reach the store.
        Err(err @ (ApiError::PaymentFailed { .. } | ApiError::Rpc(_))) => {
            log_failed_payment(&state, &body, &amount, &err).await;
            Err(err)
        }
        Err(err) => Err(err),
    }
}

async fn log_failed_payment(state: &SharedState, body: &PayRequest, amount: &str, err: &ApiError) {
    let reason = match err {
        ApiError::PaymentFailed { reason } => reason.clone(),
        other => other.to_string(),
    };

    let fallback = Receipt {
        tx: NO_TX_SENTINEL.to_string(),
        service: body.service_label.clone(),
        service_id: body.service_id.clone(),
        service_label: body.service_label.clone(),
        partner: body.partner_id.clone(),
        partner_usdc: None,
        platform_usdc: None,
        split_mode: None,
        amount_usdc: amount.to_string(),
        network: DEFAULT_NETWORK.to_string(),
        status: ReceiptStatus::Failed,
        reason: Some(reason),
        trust_score: None,
        explorer_url: String::new(),
        pdf_url: String::new(),
        created_at: Utc::now().to_rfc3339(),
    };

    if let Err(log_err) = state.store.add(fallback).await {
        tracing::warn!(error = %log_err, "failed to log fallback receipt");
    }
}
