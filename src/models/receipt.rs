use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_NETWORK: &str = "Arc Testnet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Verified,
    Pending,
    Failed,
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReceiptStatus::Verified => "Verified",
            ReceiptStatus::Pending => "Pending",
            ReceiptStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Durable record of a completed or failed payment, keyed by normalized tx hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,

    // Legacy stores carry these as numbers or strings
    #[serde(
        rename = "partnerUSDC",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_f64"
    )]
    pub partner_usdc: Option<f64>,

    #[serde(
        rename = "platformUSDC",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_f64"
    )]
    pub platform_usdc: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_mode: Option<String>,

    #[serde(rename = "amountUSDC")]
    pub amount_usdc: String,

    pub network: String,

    pub status: ReceiptStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<u64>,

    pub explorer_url: String,

    pub pdf_url: String,

    pub created_at: String,
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => Ok(s.trim().parse().ok()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected number or string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let receipt = Receipt {
            tx: "0xabc".to_string(),
            service: None,
            service_id: Some("golden-visa".to_string()),
            service_label: Some("Golden Visa Application".to_string()),
            partner: Some("Turjman Group".to_string()),
            partner_usdc: Some(0.9),
            platform_usdc: Some(0.1),
            split_mode: None,
            amount_usdc: "1.0".to_string(),
            network: DEFAULT_NETWORK.to_string(),
            status: ReceiptStatus::Verified,
            reason: None,
            trust_score: None,
            explorer_url: "https://testnet.arcscan.app/tx/0xabc".to_string(),
            pdf_url: "/api/receipts/0xabc?format=pdf".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["amountUSDC"], "1.0");
        assert_eq!(json["partnerUSDC"], 0.9);
        assert_eq!(json["serviceId"], "golden-visa");
        assert_eq!(json["explorerUrl"], "https://testnet.arcscan.app/tx/0xabc");
        assert_eq!(json["status"], "Verified");
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00Z");
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn deserializes_string_split_amounts() {
        let json = serde_json::json!({
            "tx": "0xabc",
            "amountUSDC": "1.0",
            "partnerUSDC": "0.90",
            "platformUSDC": 0.10,
            "network": "Arc Testnet",
            "status": "Failed",
            "explorerUrl": "",
            "pdfUrl": "",
            "createdAt": "2026-01-01T00:00:00Z"
        });

        let receipt: Receipt = serde_json::from_value(json).unwrap();
        assert_eq!(receipt.partner_usdc, Some(0.90));
        assert_eq!(receipt.platform_usdc, Some(0.10));
        assert_eq!(receipt.status, ReceiptStatus::Failed);
    }
}
