use super::SharedState;
use crate::{
    error::ApiError,
    models::{ReceiptStatus, VerifiedResponse, VerifyStatusBody},
    services::{client_key, ChainResolution, ReceiptOverrides},
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQuery {
    pub tx: Option<String>,
    pub tx_hash: Option<String>,
    pub transaction_hash: Option<String>,
    pub service_id: Option<String>,
    pub service_label: Option<String>,
    pub network: Option<String>,
    pub status: Option<ReceiptStatus>,
}

pub async fn verify(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<VerifyQuery>,
) -> Result<Response, ApiError> {
    state.limiter.check(&client_key(&headers))?;

    let tx = query
        .tx
        .or(query.tx_hash)
        .or(query.transaction_hash)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("Missing tx parameter.".to_string()))?;

    let overrides = ReceiptOverrides {
        service_id: query.service_id,
        service_label: query.service_label,
        partner: None,
        network: query.network,
        status: query.status,
    };

    match state.chain.resolve_receipt(&tx, overrides).await? {
        ChainResolution::Pending { message } => Ok((
            StatusCode::ACCEPTED,
            Json(VerifyStatusBody {
                status: "pending".to_string(),
                message,
            }),
        )
            .into_response()),
        ChainResolution::Failed { message } => Ok(Json(VerifyStatusBody {
            status: "failed".to_string(),
            message,
        })
        .into_response()),
        ChainResolution::Verified(receipt) => {
            let trust_score_new = state.trust.record_verified(&receipt.tx);

            // Resolution and persistence are deliberately uncoupled; losing
            // this write loses the local record, not the on-chain payment.
            if let Err(err) = state.store.add((*receipt).clone()).await {
                tracing::warn!(error = %err, "failed to persist verified receipt");
            }

            Ok(Json(VerifiedResponse {
                ok: true,
                status: "verified".to_string(),
                service: receipt.service_label.clone().unwrap_or_default(),
                amount: receipt.amount_usdc.clone(),
                network: receipt.network.clone(),
                trust_score_new,
                tx_hash: receipt.tx.clone(),
                receipt_url: format!("/receipts/{}", receipt.tx),
                pdf_url: receipt.pdf_url.clone(),
                explorer_url: receipt.explorer_url.clone(),
            })
            .into_response())
        }
    }
}
