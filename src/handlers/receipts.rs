use super::SharedState;
use crate::{
    error::ApiError,
    explorer::{build_explorer_tx_url, build_qr_url, normalize_tx_hash},
    models::{find_service, ItemsBody, Receipt, ReceiptStatus, ReceiptView, DEFAULT_NETWORK, DEFAULT_PARTNER},
    services::{client_key, pdf},
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ReceiptFormatQuery {
    pub format: Option<String>,
}

pub async fn get_receipt(
    State(state): State<SharedState>,
    Path(tx): Path<String>,
    Query(query): Query<ReceiptFormatQuery>,
) -> Result<Response, ApiError> {
    let canonical = normalize_tx_hash(&tx).ok_or(ApiError::InvalidTx)?;
    let receipt = state
        .store
        .get(&canonical)
        .await?
        .ok_or(ApiError::NotFound)?;

    let service = receipt.service_id.as_deref().and_then(find_service);
    let partner = receipt
        .partner
        .clone()
        .or_else(|| service.and_then(|s| s.partner.map(str::to_string)))
        .unwrap_or_else(|| DEFAULT_PARTNER.to_string());
    let service_label = receipt
        .service_label
        .clone()
        .or_else(|| receipt.service.clone())
        .or_else(|| receipt.service_id.clone())
        .unwrap_or_else(|| "N/A".to_string());
    let amount = if receipt.amount_usdc.is_empty() {
        "1.00".to_string()
    } else {
        receipt.amount_usdc.clone()
    };
    let network = if receipt.network.is_empty() {
        DEFAULT_NETWORK.to_string()
    } else {
        receipt.network.clone()
    };

    let explorer_url = build_explorer_tx_url(&state.config.explorer_base, &canonical);
    let qr_url = build_qr_url(&explorer_url, 240, 1);
    let pdf_url = format!("/api/receipts/{}?format=pdf", canonical);

    let want_pdf = query
        .format
        .as_deref()
        .map(str::to_lowercase)
        .as_deref()
        == Some("pdf");

    if !want_pdf {
        let view = ReceiptView {
            tx_hash: canonical,
            service: service_label,
            partner,
            amount: format!("{} USDC", amount),
            network,
            status: receipt.status,
            explorer_url,
            qr_url,
            pdf_url,
        };
        return Ok(([(header::CACHE_CONTROL, "no-store")], Json(view)).into_response());
    }

    let qr_png = pdf::fetch_qr_png(&state.http, &qr_url).await;

    let mut presented = receipt;
    presented.tx = canonical.clone();
    presented.partner = Some(partner);
    presented.service_label = Some(service_label);
    presented.amount_usdc = amount;
    presented.network = network;

    let bytes = pdf::render_receipt_pdf(&presented, &explorer_url, qr_png.as_deref())?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=smart-turjman-receipt-{}.pdf", canonical),
        ),
        (header::CACHE_CONTROL, "no-store".to_string()),
    ];
    Ok((headers, bytes).into_response())
}

/// Demo/debug surface: direct store access, disabled in production.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogReceiptBody {
    pub tx: Option<String>,
    pub service: Option<String>,
    pub service_id: Option<String>,
    pub service_label: Option<String>,
    pub partner: Option<String>,
    #[serde(rename = "partnerUSDC", default)]
    pub partner_usdc: Option<Value>,
    #[serde(rename = "platformUSDC", default)]
    pub platform_usdc: Option<Value>,
    pub split_mode: Option<String>,
    #[serde(rename = "amountUSDC", default)]
    pub amount_usdc: Option<Value>,
    pub network: Option<String>,
    pub status: Option<ReceiptStatus>,
    pub trust_score: Option<u64>,
    pub explorer_url: Option<String>,
    pub pdf_url: Option<String>,
}

pub async fn list_logged_receipts(
    State(state): State<SharedState>,
) -> Result<Json<ItemsBody<Receipt>>, ApiError> {
    guard_demo_only(&state)?;
    let items = state
        .store
        .list()
        .await
        .into_iter()
        .map(apply_partner_fallback)
        .collect();
    Ok(Json(ItemsBody { items }))
}

pub async fn log_receipt(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<LogReceiptBody>,
) -> Result<Json<Receipt>, ApiError> {
    guard_demo_only(&state)?;
    state.limiter.check(&client_key(&headers))?;

    let tx = require(body.tx.clone(), "tx")?;
    let amount_usdc =
        coerce_string(&body.amount_usdc).ok_or_else(|| missing_field("amountUSDC"))?;
    let service_label = require(body.service_label.clone(), "serviceLabel")?;
    let explorer_url = require(body.explorer_url.clone(), "explorerUrl")?;
    let pdf_url = require(body.pdf_url.clone(), "pdfUrl")?;
    let service_id = require(body.service_id.clone(), "serviceId")?;

    let service = find_service(&service_id);
    let partner = body
        .partner
        .clone()
        .or_else(|| service.and_then(|s| s.partner.map(str::to_string)))
        .unwrap_or_else(|| DEFAULT_PARTNER.to_string());

    let receipt = Receipt {
        tx,
        service: body.service.clone().or_else(|| Some(service_label.clone())),
        service_id: Some(service_id),
        service_label: Some(service_label),
        partner: Some(partner),
        partner_usdc: coerce_f64(&body.partner_usdc),
        platform_usdc: coerce_f64(&body.platform_usdc),
        split_mode: body.split_mode.clone(),
        amount_usdc,
        network: body
            .network
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
        status: body.status.unwrap_or(ReceiptStatus::Verified),
        reason: None,
        trust_score: body.trust_score,
        explorer_url,
        pdf_url,
        created_at: Utc::now().to_rfc3339(),
    };

    let saved = state
        .store
        .add(receipt)
        .await
        .map_err(|err| ApiError::Validation(err.to_string()))?;
    Ok(Json(apply_partner_fallback(saved)))
}

pub async fn receipts_health(State(state): State<SharedState>) -> Response {
    match state.store.list_strict().await {
        Ok(receipts) => Json(json!({ "ok": true, "count": receipts.len() })).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "receipts store corrupted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

fn guard_demo_only(state: &SharedState) -> Result<(), ApiError> {
    if state.config.is_production() {
        Err(ApiError::NotAvailable)
    } else {
        Ok(())
    }
}

fn apply_partner_fallback(mut receipt: Receipt) -> Receipt {
    if receipt.partner.is_none() {
        let service = receipt.service_id.as_deref().and_then(find_service);
        receipt.partner = Some(
            service
                .and_then(|s| s.partner.map(str::to_string))
                .unwrap_or_else(|| DEFAULT_PARTNER.to_string()),
        );
    }
    receipt
}

fn require(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value.filter(|s| !s.is_empty()).ok_or_else(|| missing_field(field))
}

fn missing_field(field: &str) -> ApiError {
    ApiError::Validation(format!("Missing {field}"))
}

fn coerce_string(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_f64(value: &Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
