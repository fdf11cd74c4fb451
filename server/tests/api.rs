//! Router-level integration tests over in-memory stores.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cambio_common::{Currency, RateTable};
use cambio_fx::{
    ConversionService, HttpRateProvider, MockRateProvider, RateEngine, RateEngineConfig,
    RateProvider, TransactionStore,
};
use cambio_server::{router, AppState};
use cambio_store::{MemoryRateStore, MemoryTransactionStore};

fn eur_table() -> RateTable {
    RateTable::new(
        Currency::eur(),
        HashMap::from([
            (Currency::usd(), dec!(1.18)),
            (Currency::jpy(), dec!(129.55)),
        ]),
    )
}

fn app_with_provider(provider: Arc<dyn RateProvider>) -> axum::Router {
    let rates = Arc::new(RateEngine::new(
        provider,
        Arc::new(MemoryRateStore::new()),
        RateEngineConfig::default(),
    ));
    let transactions: Arc<dyn TransactionStore> = Arc::new(MemoryTransactionStore::new());
    let conversions = ConversionService::new(rates.clone(), transactions.clone());
    let state = Arc::new(AppState {
        rates,
        conversions,
        transactions,
    });
    router(state)
}

fn make_app() -> (axum::Router, Arc<MockRateProvider>) {
    let provider = Arc::new(MockRateProvider::new());
    provider.set_table(eur_table());
    (app_with_provider(provider.clone()), provider)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn convert_request(user_id: &str, from: &str, to: &str, amount: &str) -> Request<Body> {
    Request::post("/api/v1/convert")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "user_id": user_id,
                "from_currency": from,
                "to_currency": to,
                "amount": amount,
            })
            .to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let (app, _) = make_app();

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_convert_success() {
    let (app, _) = make_app();

    let response = app
        .oneshot(convert_request("alice", "USD", "EUR", "100.00"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["rate"], "0.85");
    assert_eq!(body["from"]["currency"], "USD");
    assert_eq!(body["from"]["amount"], "100.00");
    assert_eq!(body["to"]["currency"], "EUR");
    assert_eq!(body["to"]["amount"], "85.00");
    assert!(body["transaction_id"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_convert_invalid_amount_is_bad_request() {
    let (app, _) = make_app();

    let response = app
        .oneshot(convert_request("alice", "USD", "EUR", "-1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_convert_unsupported_currency_is_bad_request() {
    let (app, _) = make_app();

    let response = app
        .oneshot(convert_request("alice", "XYZ", "EUR", "10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("XYZ"));
}

#[tokio::test]
async fn test_convert_with_provider_down_is_service_unavailable() {
    let (app, provider) = make_app();
    provider.set_failing(true);

    let response = app
        .oneshot(convert_request("alice", "USD", "EUR", "10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_rate_lookup() {
    let (app, _) = make_app();

    let response = app
        .oneshot(
            Request::get("/api/v1/rates?from=USD&to=JPY")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["from_currency"], "USD");
    assert_eq!(body["to_currency"], "JPY");
    assert_eq!(body["rate"], "109.788135593");
}

#[tokio::test]
async fn test_history_for_unknown_user_is_not_found() {
    let (app, _) = make_app();

    let response = app
        .oneshot(
            Request::get("/api/v1/transactions/nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_lists_recorded_conversions() {
    let (app, _) = make_app();

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(convert_request("alice", "USD", "EUR", "100.00"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::get("/api/v1/transactions/alice?limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 3);
    assert_eq!(body["transactions"][0]["rate"], "0.85");
}

#[tokio::test]
async fn test_convert_end_to_end_over_http_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"base": "EUR", "rates": {"USD": 1.18, "EUR": 1.0}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let provider = Arc::new(
        HttpRateProvider::new(
            format!("{}/latest", server.uri()),
            "test-key",
            std::time::Duration::from_secs(5),
        )
        .unwrap(),
    );
    let app = app_with_provider(provider);

    let response = app
        .oneshot(convert_request("alice", "USD", "EUR", "100.00"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["rate"], "0.85");
    assert_eq!(body["to"]["amount"], "85.00");
}
