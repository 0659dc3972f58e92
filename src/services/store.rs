use crate::models::Receipt;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Placeholder hash carried by fallback records for payments that never
/// produced a transaction.
pub const NO_TX_SENTINEL: &str = "(none)";

/// File-backed map of normalized tx hash -> receipt. Writes are funneled
/// through a single in-process queue and land via temp-file + atomic rename;
/// there is no cross-process locking (single-instance deployment).
pub struct ReceiptStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ReceiptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Upsert. A sentinel hash gets a synthetic unique key so fallback
    /// records never collide. Returns the record as stored.
    pub async fn add(&self, receipt: Receipt) -> Result<Receipt> {
        let key = if receipt.tx == NO_TX_SENTINEL {
            format!(
                "{}-{}-{}",
                NO_TX_SENTINEL,
                Utc::now().timestamp_millis(),
                Uuid::new_v4().simple()
            )
        } else {
            receipt.tx.to_lowercase()
        };

        let mut record = receipt;
        record.tx = key.clone();

        let _guard = self.write_lock.lock().await;

        let mut map = self.read_map().await?;
        map.insert(key.clone(), record.clone());

        let json = serde_json::to_string_pretty(&map).context("serialize receipts store")?;
        let tmp_path = self
            .path
            .with_file_name(format!("receipts.tmp.{}.json", Uuid::new_v4().simple()));
        fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("rename into {}", self.path.display()))?;

        tracing::info!(tx = %key, "receipt saved");
        Ok(record)
    }

    pub async fn get(&self, tx: &str) -> Result<Option<Receipt>> {
        let map = self.read_map().await?;
        Ok(map.get(&tx.to_lowercase()).cloned())
    }

    /// Lenient listing: a corrupt backing file degrades to an empty list so
    /// read paths keep serving.
    pub async fn list(&self) -> Vec<Receipt> {
        match self.list_strict().await {
            Ok(receipts) => receipts,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse receipts store");
                Vec::new()
            }
        }
    }

    /// Strict listing for the health path: parse errors surface to the caller.
    pub async fn list_strict(&self) -> Result<Vec<Receipt>> {
        let map = self.read_map().await?;
        Ok(map.into_values().collect())
    }

    async fn read_map(&self) -> Result<BTreeMap<String, Receipt>> {
        self.ensure_file().await?;
        let raw = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        let parsed: Value = serde_json::from_str(&raw).context("parse receipts store")?;
        to_receipt_map(parsed)
    }

    async fn ensure_file(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create {}", dir.display()))?;
        }
        if fs::metadata(&self.path).await.is_err() {
            fs::write(&self.path, "{}")
                .await
                .with_context(|| format!("seed {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Accepts both layouts: the current hash-keyed map, and the legacy ordered
/// sequence (converted on read, later entries overwriting earlier ones).
fn to_receipt_map(raw: Value) -> Result<BTreeMap<String, Receipt>> {
    match raw {
        Value::Null => Ok(BTreeMap::new()),
        Value::Array(entries) => {
            let mut map = BTreeMap::new();
            for entry in entries {
                let Ok(receipt) = serde_json::from_value::<Receipt>(entry) else {
                    continue;
                };
                map.insert(receipt.tx.to_lowercase(), receipt);
            }
            Ok(map)
        }
        Value::Object(_) => {
            serde_json::from_value(raw).context("parse receipts store mapping")
        }
        _ => bail!("Receipts store is malformed."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReceiptStatus, DEFAULT_NETWORK};
    use std::sync::Arc;

    fn sample_receipt(tx: &str) -> Receipt {
        Receipt {
            tx: tx.to_string(),
            service: None,
            service_id: Some("golden-visa".to_string()),
            service_label: Some("Golden Visa Application".to_string()),
            partner: Some("Turjman Group".to_string()),
            partner_usdc: None,
            platform_usdc: None,
            split_mode: None,
            amount_usdc: "1.0".to_string(),
            network: DEFAULT_NETWORK.to_string(),
            status: ReceiptStatus::Verified,
            reason: None,
            trust_score: None,
            explorer_url: format!("https://testnet.arcscan.app/tx/{tx}"),
            pdf_url: format!("/api/receipts/{tx}?format=pdf"),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn hash(n: u8) -> String {
        format!("0x{}", format!("{:02x}", n).repeat(32))
    }

    fn store_in(dir: &tempfile::TempDir) -> ReceiptStore {
        ReceiptStore::new(dir.path().join("receipts.json"))
    }

    #[tokio::test]
    async fn add_then_get_roundtrips_with_normalized_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let upper = hash(0xab).to_uppercase().replace("0X", "0x");
        let saved = store.add(sample_receipt(&upper)).await.unwrap();
        assert_eq!(saved.tx, hash(0xab));

        let fetched = store.get(&upper).await.unwrap().unwrap();
        assert_eq!(fetched.tx, hash(0xab));
        assert_eq!(fetched.amount_usdc, "1.0");
        assert_eq!(fetched.status, ReceiptStatus::Verified);
    }

    #[tokio::test]
    async fn unknown_hash_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.get(&hash(0x01)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_write_for_same_hash_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.add(sample_receipt(&hash(0x01))).await.unwrap();
        let mut updated = sample_receipt(&hash(0x01));
        updated.amount_usdc = "2.0".to_string();
        store.add(updated).await.unwrap();

        let receipts = store.list_strict().await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].amount_usdc, "2.0");
    }

    #[tokio::test]
    async fn sentinel_records_get_unique_synthetic_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let first = store.add(sample_receipt(NO_TX_SENTINEL)).await.unwrap();
        let second = store.add(sample_receipt(NO_TX_SENTINEL)).await.unwrap();

        assert!(first.tx.starts_with("(none)-"));
        assert!(second.tx.starts_with("(none)-"));
        assert_ne!(first.tx, second.tx);
        assert_eq!(store.list_strict().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_adds_all_land_and_file_stays_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut tasks = tokio::task::JoinSet::new();
        for n in 1..=8u8 {
            let store = store.clone();
            tasks.spawn(async move { store.add(sample_receipt(&hash(n))).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let receipts = store.list_strict().await.unwrap();
        assert_eq!(receipts.len(), 8);

        let raw = std::fs::read_to_string(dir.path().join("receipts.json")).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_object());
    }

    #[tokio::test]
    async fn legacy_sequence_layout_converts_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.json");

        let mut first = sample_receipt(&hash(0x01));
        first.amount_usdc = "1.0".to_string();
        let mut duplicate = sample_receipt(&hash(0x01));
        duplicate.amount_usdc = "3.0".to_string();
        let other = sample_receipt(&hash(0x02));
        let legacy = serde_json::to_string(&vec![&first, &other, &duplicate]).unwrap();
        std::fs::write(&path, legacy).unwrap();

        let store = ReceiptStore::new(&path);
        let receipts = store.list_strict().await.unwrap();
        assert_eq!(receipts.len(), 2);

        let kept = store.get(&hash(0x01)).await.unwrap().unwrap();
        assert_eq!(kept.amount_usdc, "3.0");
    }

    #[tokio::test]
    async fn corrupt_file_degrades_listing_but_fails_strict_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = ReceiptStore::new(&path);
        assert!(store.list().await.is_empty());
        assert!(store.list_strict().await.is_err());
    }
}
