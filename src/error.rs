use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Insufficient tUSDC balance on signer")]
    InsufficientBalance { need: String, have: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("invalid-tx")]
    InvalidTx,

    #[error("not-found")]
    NotFound,

    #[error("not-available")]
    NotAvailable,

    #[error("Payment failed")]
    PaymentFailed { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] ethers::providers::ProviderError),

    #[error("internal-error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub need: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub have: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            reason: None,
            need: None,
            have: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(message.clone()))
            }
            ApiError::InsufficientBalance { need, have } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    need: Some(need.clone()),
                    have: Some(have.clone()),
                    ..ErrorBody::new(self.to_string())
                },
            ),
            ApiError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, ErrorBody::new(self.to_string()))
            }
            ApiError::InvalidTx => (StatusCode::BAD_REQUEST, ErrorBody::new(self.to_string())),
            ApiError::NotFound | ApiError::NotAvailable => {
                (StatusCode::NOT_FOUND, ErrorBody::new(self.to_string()))
            }
            ApiError::PaymentFailed { reason } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    reason: Some(reason.clone()),
                    ..ErrorBody::new(self.to_string())
                },
            ),
            ApiError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(self.to_string()))
            }
            ApiError::Rpc(_) => (StatusCode::BAD_GATEWAY, ErrorBody::new(self.to_string())),
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("internal-error"))
            }
        };

        match status {
            StatusCode::TOO_MANY_REQUESTS => tracing::warn!(error = ?self, "request throttled"),
            s if s.is_server_error() => tracing::error!(error = ?self, "request failed"),
            _ => tracing::warn!(error = ?self, "request rejected"),
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_carries_need_and_have() {
        let err = ApiError::InsufficientBalance {
            need: "100".to_string(),
            have: "5.0".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let response = ApiError::RateLimitExceeded.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn unexpected_errors_map_to_500() {
        let err = ApiError::Internal(anyhow::anyhow!("backing file corrupted"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
