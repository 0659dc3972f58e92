use crate::{
    config::Config,
    contracts::IERC20,
    error::ApiError,
    explorer::build_explorer_tx_url,
    models::{calc_split, DEFAULT_SPLIT},
    services::chain::format_token_amount,
};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, U256},
    utils::parse_units,
};
use std::sync::Arc;

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub tx_hash: String,
    pub explorer_url: String,
    pub amount_usdc: f64,
    pub partner_usdc: f64,
    pub platform_usdc: f64,
}

/// Moves stablecoin from the custodial signer to the merchant wallet.
pub struct PaymentService {
    client: Arc<SignerClient>,
    usdc: IERC20<SignerClient>,
    merchant_address: Address,
    usdc_decimals: u32,
    explorer_base: String,
}

impl PaymentService {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ApiError::Config(format!("Invalid ARC_RPC_URL: {e}")))?;

        let mut wallet = config
            .service_private_key
            .parse::<LocalWallet>()
            .map_err(|e| ApiError::Config(format!("Invalid SERVICE_PRIVATE_KEY: {e}")))?;
        if let Some(chain_id) = config.chain_id {
            wallet = wallet.with_chain_id(chain_id);
        }

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let usdc = IERC20::new(config.usdc_address, client.clone());

        Ok(Self {
            client,
            usdc,
            merchant_address: config.merchant_address,
            usdc_decimals: config.usdc_decimals,
            explorer_base: config.explorer_base.clone(),
        })
    }

    pub async fn send_payment(&self, amount_usdc: &str) -> Result<PaymentOutcome, ApiError> {
        let amount_str = amount_usdc.trim();
        let amount_number: f64 = amount_str
            .parse()
            .map_err(|_| ApiError::Validation("amountUSDC must be numeric".to_string()))?;
        if !amount_number.is_finite() || amount_number < 0.0 {
            return Err(ApiError::Validation("amountUSDC must be numeric".to_string()));
        }

        let amount: U256 = parse_units(amount_str, self.usdc_decimals)
            .map_err(|e| {
                ApiError::Validation(format!("amountUSDC is not a valid token amount: {e}"))
            })?
            .into();

        // Check balance first; no partial transfer is ever attempted
        let balance = self
            .usdc
            .balance_of(self.client.address())
            .call()
            .await
            .map_err(|e| ApiError::PaymentFailed {
                reason: e.to_string(),
            })?;

        if balance < amount {
            return Err(ApiError::InsufficientBalance {
                need: amount_str.to_string(),
                have: format_token_amount(balance, self.usdc_decimals),
            });
        }

        let (partner_usdc, platform_usdc) = calc_split(amount_number, DEFAULT_SPLIT);

        tracing::info!(
            amount = amount_str,
            merchant = ?self.merchant_address,
            "sending USDC transfer"
        );

        let call = self.usdc.transfer(self.merchant_address, amount);
        let pending_tx = call.send().await.map_err(|e| ApiError::PaymentFailed {
            reason: e.to_string(),
        })?;

        let receipt = pending_tx
            .await
            .map_err(|e| ApiError::PaymentFailed {
                reason: e.to_string(),
            })?
            .ok_or_else(|| ApiError::PaymentFailed {
                reason: "Transaction dropped from the mempool".to_string(),
            })?;

        if receipt.status != Some(1.into()) {
            return Err(ApiError::PaymentFailed {
                reason: "Transaction reverted on-chain.".to_string(),
            });
        }

        let tx_hash = format!("{:?}", receipt.transaction_hash);
        let explorer_url = build_explorer_tx_url(&self.explorer_base, &tx_hash);

        tracing::info!(tx = %tx_hash, "payment confirmed");

        Ok(PaymentOutcome {
            tx_hash,
            explorer_url,
            amount_usdc: amount_number,
            partner_usdc,
            platform_usdc,
        })
    }
}
