use anyhow::{bail, Context, Result};
use ethers::types::Address;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Arc Testnet (payment network)
    pub rpc_url: String,
    pub chain_id: Option<u64>,
    pub usdc_address: Address,
    pub usdc_decimals: u32,

    // Custodial signer & merchant
    pub service_private_key: String,
    pub merchant_address: Address,

    // Presentation
    pub explorer_base: String,
    pub demo_mode: bool,

    // Receipt store
    pub receipts_path: PathBuf,

    // Rate Limiting
    pub rate_limit_per_second: f64,
    pub rate_limit_burst: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;

        let config = Self {
            environment,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            rpc_url: std::env::var("ARC_RPC_URL").context("ARC_RPC_URL required")?,
            chain_id: Self::parse_chain_id()?,
            usdc_address: Self::parse_address("USDC_ADDRESS")?,
            usdc_decimals: std::env::var("USDC_DECIMALS")
                .context("USDC_DECIMALS required")?
                .parse()
                .context("USDC_DECIMALS must be a non-negative integer")?,

            service_private_key: std::env::var("SERVICE_PRIVATE_KEY")
                .context("SERVICE_PRIVATE_KEY required")?,
            merchant_address: Self::parse_address("MERCHANT_ADDRESS")?,

            explorer_base: std::env::var("ARC_EXPLORER_BASE")
                .unwrap_or_else(|_| "https://testnet.arcscan.app".to_string())
                .trim_end_matches('/')
                .to_string(),
            demo_mode: std::env::var("DEMO_MODE").map(|v| v == "1").unwrap_or(false),

            receipts_path: std::env::var("RECEIPTS_PATH")
                .unwrap_or_else(|_| "data/receipts.json".to_string())
                .into(),

            rate_limit_per_second: std::env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("Invalid RATE_LIMIT_PER_SECOND")?,
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid RATE_LIMIT_BURST")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_chain_id() -> Result<Option<u64>> {
        match std::env::var("ARC_CHAIN_ID") {
            Ok(raw) if !raw.is_empty() => {
                let id: u64 = raw.parse().context("Invalid ARC_CHAIN_ID")?;
                Ok((id > 0).then_some(id))
            }
            _ => Ok(None),
        }
    }

    fn parse_address(var: &str) -> Result<Address> {
        let addr_str = std::env::var(var).with_context(|| format!("{} required", var))?;
        Address::from_str(&addr_str).with_context(|| format!("Invalid address for {}", var))
    }

    fn validate(&self) -> Result<()> {
        if !self.rpc_url.starts_with("http") {
            bail!("ARC_RPC_URL must be HTTP(S) URL");
        }

        let key = self.service_private_key.trim_start_matches("0x");
        let key_bytes = hex::decode(key).context("SERVICE_PRIVATE_KEY must be hex")?;
        if key_bytes.len() != 32 {
            bail!("SERVICE_PRIVATE_KEY must be a 32-byte hex key");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}
