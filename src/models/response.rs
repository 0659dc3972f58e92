use super::ReceiptStatus;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(rename = "amountUSDC")]
    pub amount_usdc: f64,
    #[serde(rename = "partnerUSDC")]
    pub partner_usdc: f64,
    #[serde(rename = "platformUSDC")]
    pub platform_usdc: f64,
    pub split_mode: String,
    pub service_id: Option<String>,
    pub service_label: Option<String>,
}

/// Body for the verify endpoint's pending/failed outcomes.
#[derive(Serialize, Deserialize, Debug)]
pub struct VerifyStatusBody {
    pub status: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedResponse {
    pub ok: bool,
    pub status: String,
    pub service: String,
    pub amount: String,
    pub network: String,
    pub trust_score_new: u64,
    pub tx_hash: String,
    pub receipt_url: String,
    pub pdf_url: String,
    pub explorer_url: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub tx_hash: String,
    pub service: String,
    pub partner: String,
    pub amount: String,
    pub network: String,
    pub status: ReceiptStatus,
    pub explorer_url: String,
    pub qr_url: String,
    pub pdf_url: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: String,
    pub label: String,
    #[serde(rename = "priceUSDC")]
    pub price_usdc: f64,
    pub partner_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ItemsBody<T> {
    pub items: Vec<T>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub network: String,
    pub usdc_address: String,
    pub services: usize,
    pub demo: bool,
}
