//! Router-level contract tests: catalog, health, receipt log/fetch surface,
//! verify flow against a stubbed RPC endpoint, and rate limiting.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use turjman_pay::config::{Config, Environment};
use turjman_pay::handlers::AppState;
use turjman_pay::services::{
    ChainService, PaymentService, RateLimiter, ReceiptStore, TrustScore, TRUST_SCORE_SEED,
};

const TX: &str = "0xcccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";

fn test_config(rpc_url: &str, dir: &tempfile::TempDir, environment: Environment) -> Config {
    Config {
        environment,
        host: "127.0.0.1".to_string(),
        port: 0,
        rpc_url: rpc_url.to_string(),
        chain_id: None,
        usdc_address: "0x1000000000000000000000000000000000000001"
            .parse()
            .unwrap(),
        usdc_decimals: 6,
        service_private_key:
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        merchant_address: "0x2000000000000000000000000000000000000002"
            .parse()
            .unwrap(),
        explorer_base: "https://testnet.arcscan.app".to_string(),
        demo_mode: true,
        receipts_path: dir.path().join("receipts.json"),
        rate_limit_per_second: 0.0,
        rate_limit_burst: 100.0,
    }
}

fn test_app(config: Config) -> axum::Router {
    let chain = ChainService::new(&config).unwrap();
    let payment = PaymentService::new(&config).unwrap();
    let store = ReceiptStore::new(config.receipts_path.clone());
    let trust = TrustScore::new(TRUST_SCORE_SEED);
    let limiter = RateLimiter::new(config.rate_limit_burst, config.rate_limit_per_second);

    turjman_pay::app(Arc::new(AppState {
        config,
        chain,
        payment,
        store,
        trust,
        limiter,
        http: reqwest::Client::new(),
    }))
}

fn default_app(dir: &tempfile::TempDir) -> axum::Router {
    test_app(test_config(
        "http://127.0.0.1:1",
        dir,
        Environment::Development,
    ))
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn log_body(tx: &str) -> Value {
    json!({
        "tx": tx,
        "amountUSDC": "2.5",
        "serviceId": "golden-visa",
        "serviceLabel": "Golden Visa Application",
        "explorerUrl": format!("https://testnet.arcscan.app/tx/{tx}"),
        "pdfUrl": format!("/api/receipts/{tx}?format=pdf"),
        "status": "Verified"
    })
}

#[tokio::test]
async fn services_endpoint_lists_the_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let response = default_app(&dir)
        .oneshot(get("/api/services"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["id"], "mofa-legal-translation");
    assert_eq!(items[0]["priceUSDC"], 1.0);
    assert_eq!(items[0]["partnerId"], "translator-023");
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let response = default_app(&dir).oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["network"], "Arc Testnet");
    assert_eq!(body["services"], 5);
    assert_eq!(body["demo"], true);
}

#[tokio::test]
async fn pay_requires_an_amount() {
    let dir = tempfile::tempdir().unwrap();
    let response = default_app(&dir)
        .oneshot(post_json("/api/pay", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "amountUSDC is required");
}

#[tokio::test]
async fn logged_receipts_round_trip_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let app = default_app(&dir);

    let response = app
        .clone()
        .oneshot(post_json("/api/receipts/log", log_body(TX)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved["tx"], TX);
    assert_eq!(saved["partner"], "Turjman Group");

    let response = app
        .clone()
        .oneshot(get(&format!("/api/receipts/{TX}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store"
    );
    let view = body_json(response).await;
    assert_eq!(view["txHash"], TX);
    assert_eq!(view["amount"], "2.5 USDC");
    assert_eq!(view["service"], "Golden Visa Application");
    assert_eq!(view["status"], "Verified");
    assert_eq!(
        view["explorerUrl"],
        format!("https://testnet.arcscan.app/tx/{TX}")
    );
    assert!(view["qrUrl"].as_str().unwrap().starts_with("https://quickchart.io/qr?"));

    let response = app.oneshot(get("/api/receipts/log")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn log_post_reports_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = log_body(TX);
    body.as_object_mut().unwrap().remove("serviceId");
    let response = default_app(&dir)
        .oneshot(post_json("/api/receipts/log", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing serviceId");
}

#[tokio::test]
async fn receipt_lookup_rejects_malformed_hashes() {
    let dir = tempfile::tempdir().unwrap();
    let response = default_app(&dir)
        .oneshot(get("/api/receipts/not-a-hash"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid-tx");
}

#[tokio::test]
async fn receipt_lookup_misses_with_404() {
    let dir = tempfile::tempdir().unwrap();
    let response = default_app(&dir)
        .oneshot(get(&format!("/api/receipts/{TX}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not-found");
}

#[tokio::test]
async fn verify_requires_a_tx_parameter() {
    let dir = tempfile::tempdir().unwrap();
    let response = default_app(&dir).oneshot(get("/api/verify")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing tx parameter.");
}

#[tokio::test]
async fn verify_reports_pending_for_unindexed_transactions() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = test_app(test_config(&server.url(), &dir, Environment::Development));

    let response = app
        .oneshot(get(&format!("/api/verify?tx={TX}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert!(body["message"].as_str().unwrap().contains("not indexed yet"));
}

#[tokio::test]
async fn log_surface_is_disabled_in_production() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(test_config(
        "http://127.0.0.1:1",
        &dir,
        Environment::Production,
    ));

    let response = app
        .clone()
        .oneshot(get("/api/receipts/log"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not-available");

    let response = app
        .oneshot(post_json("/api/receipts/log", log_body(TX)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn receipts_health_counts_stored_records() {
    let dir = tempfile::tempdir().unwrap();
    let app = default_app(&dir);

    app.clone()
        .oneshot(post_json("/api/receipts/log", log_body(TX)))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/receipts/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn exhausted_clients_get_429() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config("http://127.0.0.1:1", &dir, Environment::Development);
    config.rate_limit_burst = 1.0;
    let app = test_app(config);

    let first = Request::builder()
        .method("POST")
        .uri("/api/pay")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "1.2.3.4")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(first).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let second = Request::builder()
        .method("POST")
        .uri("/api/pay")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "1.2.3.4")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(second).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"], "Rate limit exceeded");
}
