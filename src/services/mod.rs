pub mod chain;
pub mod payment;
pub mod pdf;
pub mod rate_limit;
pub mod store;
pub mod trust;

pub use chain::{format_token_amount, ChainResolution, ChainService, ReceiptOverrides};
pub use payment::{PaymentOutcome, PaymentService};
pub use rate_limit::{client_key, RateLimiter};
pub use store::{ReceiptStore, NO_TX_SENTINEL};
pub use trust::{TrustScore, TRUST_SCORE_SEED};
