pub mod config;
pub mod contracts;
pub mod error;
pub mod explorer;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use handlers::SharedState;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/services", get(handlers::list_services))
        .route("/api/pay", post(handlers::pay))
        .route("/api/verify", get(handlers::verify))
        .route(
            "/api/receipts/log",
            get(handlers::list_logged_receipts).post(handlers::log_receipt),
        )
        .route("/api/receipts/health", get(handlers::receipts_health))
        .route("/api/receipts/:tx", get(handlers::get_receipt))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
