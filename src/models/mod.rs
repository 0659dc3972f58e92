pub mod receipt;
pub mod response;
pub mod service;
pub mod split;

pub use receipt::{Receipt, ReceiptStatus, DEFAULT_NETWORK};
pub use response::*;
pub use service::{find_service, ServiceItem, DEFAULT_PARTNER, DEFAULT_SERVICE_LABEL, SERVICES};
pub use split::{calc_split, round2, Split, DEFAULT_SPLIT};
