use crate::{
    config::Config,
    error::ApiError,
    explorer::{build_explorer_tx_url, normalize_tx_hash},
    models::{
        find_service, Receipt, ReceiptStatus, DEFAULT_NETWORK, DEFAULT_PARTNER,
        DEFAULT_SERVICE_LABEL,
    },
};
use chrono::Utc;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, Log, H256, U256},
};
use std::str::FromStr;
use std::sync::Arc;
use url::form_urlencoded;

/// Presentation overrides merged over the service catalog when assembling
/// the verified receipt (override -> catalog -> default).
#[derive(Debug, Clone, Default)]
pub struct ReceiptOverrides {
    pub service_id: Option<String>,
    pub service_label: Option<String>,
    pub partner: Option<String>,
    pub network: Option<String>,
    pub status: Option<ReceiptStatus>,
}

#[derive(Debug)]
pub enum ChainResolution {
    Verified(Box<Receipt>),
    Pending { message: String },
    Failed { message: String },
}

pub struct ChainService {
    provider: Arc<Provider<Http>>,
    usdc_address: Address,
    merchant_address: Address,
    usdc_decimals: u32,
    explorer_base: String,
}

impl ChainService {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ApiError::Config(format!("Invalid ARC_RPC_URL: {e}")))?;

        Ok(Self {
            provider: Arc::new(provider),
            usdc_address: config.usdc_address,
            merchant_address: config.merchant_address,
            usdc_decimals: config.usdc_decimals,
            explorer_base: config.explorer_base.clone(),
        })
    }

    /// Looks up the mined receipt for `tx_hash` and cross-checks the USDC
    /// transfer to the merchant wallet. Read-only: persisting the resolved
    /// receipt is the caller's job.
    pub async fn resolve_receipt(
        &self,
        tx_hash: &str,
        overrides: ReceiptOverrides,
    ) -> Result<ChainResolution, ApiError> {
        let normalized = normalize_tx_hash(tx_hash).ok_or_else(|| {
            ApiError::Validation("tx must be a 0x-prefixed 64-character hex hash".to_string())
        })?;
        let hash = H256::from_str(normalized.trim_start_matches("0x"))
            .map_err(|e| ApiError::Validation(format!("Invalid tx hash: {e}")))?;

        let Some(receipt) = self.provider.get_transaction_receipt(hash).await? else {
            return Ok(ChainResolution::Pending {
                message: "Transaction not indexed yet. Try again in a few seconds.".to_string(),
            });
        };

        if receipt.status != Some(1.into()) {
            return Ok(ChainResolution::Failed {
                message: "Transaction reverted on-chain.".to_string(),
            });
        }

        let Some(amount_raw) = self.find_merchant_transfer(&receipt.logs) else {
            return Ok(ChainResolution::Failed {
                message: "USDC transfer to the merchant wallet was not found in this transaction."
                    .to_string(),
            });
        };

        let amount_usdc = format_token_amount(amount_raw, self.usdc_decimals);

        // Prefer the hash reported by the mined receipt over caller input;
        // rendering the typed hash keeps the key lower-case hex.
        let canonical = format!("{:?}", receipt.transaction_hash);

        let service = overrides.service_id.as_deref().and_then(find_service);
        let service_label = overrides
            .service_label
            .clone()
            .or_else(|| service.map(|s| s.service_label.to_string()))
            .unwrap_or_else(|| DEFAULT_SERVICE_LABEL.to_string());
        let partner = overrides
            .partner
            .clone()
            .or_else(|| service.and_then(|s| s.partner.map(str::to_string)))
            .unwrap_or_else(|| DEFAULT_PARTNER.to_string());
        let network = overrides
            .network
            .clone()
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        let status = overrides.status.unwrap_or(ReceiptStatus::Verified);

        let explorer_url = build_explorer_tx_url(&self.explorer_base, &canonical);
        let pdf_url = build_pdf_url(
            &canonical,
            overrides.service_id.as_deref(),
            &service_label,
            &partner,
            &network,
            status,
        );

        tracing::info!(tx = %canonical, amount = %amount_usdc, "transfer to merchant verified");

        let record = Receipt {
            tx: canonical,
            service: Some(service_label.clone()),
            service_id: overrides.service_id,
            service_label: Some(service_label),
            partner: Some(partner),
            partner_usdc: None,
            platform_usdc: None,
            split_mode: None,
            amount_usdc,
            network,
            status,
            reason: None,
            trust_score: None,
            explorer_url,
            pdf_url,
            created_at: Utc::now().to_rfc3339(),
        };

        Ok(ChainResolution::Verified(Box::new(record)))
    }

    /// First successfully-decoded transfer to the merchant wins; logs from
    /// other contracts and non-transfer events are skipped, not errors.
    fn find_merchant_transfer(&self, logs: &[Log]) -> Option<U256> {
        for log in logs {
            if log.address != self.usdc_address {
                continue;
            }
            let Some((to, value)) = decode_transfer(log) else {
                continue;
            };
            if to == self.merchant_address {
                return Some(value);
            }
        }
        None
    }
}

fn decode_transfer(log: &Log) -> Option<(Address, U256)> {
    // Transfer(address,address,uint256)
    let transfer_topic = H256::from_str(
        "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
    )
    .unwrap();

    if log.topics.first() != Some(&transfer_topic) || log.topics.len() < 3 {
        return None;
    }
    if log.data.len() != 32 {
        return None;
    }

    let to = Address::from(log.topics[2]);
    let value = U256::from_big_endian(&log.data);
    Some((to, value))
}

fn build_pdf_url(
    tx: &str,
    service_id: Option<&str>,
    service_label: &str,
    partner: &str,
    network: &str,
    status: ReceiptStatus,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(id) = service_id {
        query.append_pair("serviceId", id);
    }
    query.append_pair("serviceLabel", service_label);
    query.append_pair("partner", partner);
    query.append_pair("network", network);
    query.append_pair("status", &status.to_string());
    query.append_pair("format", "pdf");
    format!("/api/receipts/{}?{}", tx, query.finish())
}

/// Renders a raw token amount as a decimal string, trimming trailing zeros
/// but keeping at least one fractional digit (75000000 @ 6 -> "75.0").
/// Fixed-point throughout; the raw integer never touches a float.
pub fn format_token_amount(raw: U256, decimals: u32) -> String {
    let divisor = U256::exp10(decimals as usize);
    let whole = raw / divisor;
    let frac = raw % divisor;

    let mut frac_str = frac.to_string();
    while frac_str.len() < decimals as usize {
        frac_str.insert(0, '0');
    }
    let trimmed = frac_str.trim_end_matches('0');
    let frac_part = if trimmed.is_empty() { "0" } else { trimmed };

    format!("{}.{}", whole, frac_part)
}
