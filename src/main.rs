use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use turjman_pay::{
    config::Config,
    handlers::AppState,
    services::{
        ChainService, PaymentService, RateLimiter, ReceiptStore, TrustScore, TRUST_SCORE_SEED,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; missing or malformed settings abort startup
    let config = Config::from_env()?;

    tracing::info!("Starting turjman-pay API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);
    tracing::info!("Receipts store: {}", config.receipts_path.display());

    // Initialize services; process-wide state lives here and is handed to
    // handlers through shared state
    let chain = ChainService::new(&config)?;
    let payment = PaymentService::new(&config)?;
    let store = ReceiptStore::new(config.receipts_path.clone());
    let trust = TrustScore::new(TRUST_SCORE_SEED);
    let limiter = RateLimiter::new(config.rate_limit_burst, config.rate_limit_per_second);
    let http = reqwest::Client::new();

    let addr = format!("{}:{}", config.host, config.port);

    let state = Arc::new(AppState {
        config,
        chain,
        payment,
        store,
        trust,
        limiter,
        http,
    });

    let app = turjman_pay::app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");
    tracing::info!("Shutting down gracefully...");
}
