pub mod health;
pub mod pay;
pub mod receipts;
pub mod services;
pub mod verify;

pub use health::health;
pub use pay::pay;
pub use receipts::{get_receipt, list_logged_receipts, log_receipt, receipts_health};
pub use services::list_services;
pub use verify::verify;

use crate::{
    config::Config,
    services::{ChainService, PaymentService, RateLimiter, ReceiptStore, TrustScore},
};
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub chain: ChainService,
    pub payment: PaymentService,
    pub store: ReceiptStore,
    pub trust: TrustScore,
    pub limiter: RateLimiter,
    pub http: reqwest::Client,
}

pub type SharedState = Arc<AppState>;
