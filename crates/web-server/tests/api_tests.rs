//! In-process tests of the HTTP surface against the bundled sample dataset.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use configuration::Config;
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use web_server::{build_router, error::AppError, AppState};

fn sample_dataset() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/StockMarket.csv")
}

fn app_with_dataset(path: PathBuf) -> Router {
    let mut config = Config::default();
    config.data.path = path;
    let state = AppState::from_config(&config).unwrap();
    build_router(Arc::new(state))
}

fn app() -> Router {
    app_with_dataset(sample_dataset())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

#[tokio::test]
async fn test_root_and_health() {
    let (status, body) = get(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = get(app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_summary_dashboard_shape() {
    let (status, body) = get(app(), "/api/dashboard1").await;
    assert_eq!(status, StatusCode::OK);

    for key in ["Avg Return (%)", "Volatility (%)", "Sharpe Ratio", "Avg Volume (M)", "Beta"] {
        assert!(body["kpi"][key].is_number(), "missing kpi field {key}");
    }
    let area = body["area"].as_array().unwrap();
    let dates: Vec<&str> = area.iter().map(|p| p["Date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2022-12-31", "2023-12-31", "2024-12-31"]);
    assert_eq!(body["bar"].as_array().unwrap().len(), 3);
    assert_eq!(body["line"].as_array().unwrap().len(), 3);
    assert!(body["scatter"][0]["Return"].is_number());
    assert!(body["scatter"][0]["Volume"].is_number());
}

#[tokio::test]
async fn test_sector_risk_dashboard_shape() {
    let (status, body) = get(app(), "/api/dashboard2?period=").await;
    assert_eq!(status, StatusCode::OK);

    let sectors: Vec<&str> = body["heatmap"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["Sector"].as_str().unwrap())
        .collect();
    assert_eq!(sectors, vec!["Energy", "Financials", "Healthcare", "Technology", "Utilities"]);

    let radar: Vec<&str> = body["radar"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(radar, vec!["Volatility", "Sharpe Ratio", "Beta", "Return", "Liquidity"]);

    let share: f64 = body["pie"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_f64().unwrap())
        .sum();
    assert!((share - 100.0).abs() < 1e-9);
    assert!(body["bubble"][0]["MarketCap"].is_number());
}

#[tokio::test]
async fn test_deep_dive_dashboard_shape() {
    let (status, body) = get(app(), "/api/dashboard3?sector=Energy").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["treemap"].as_array().unwrap().len(), 1);
    assert_eq!(body["treemap"][0]["Industry"], "Oil & Gas");
    let waterfall = body["waterfall"].as_array().unwrap();
    assert!(!waterfall.is_empty());
    assert!(waterfall.iter().all(|p| p["EPS"].is_number() && p["DividendYield"].is_number()));
    assert_eq!(body["gauge"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unmatched_filter_returns_empty_payload() {
    let (status, body) = get(app(), "/api/dashboard1?sector=Aerospace&risk=High").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kpi"]["Avg Return (%)"], 0.0);
    assert_eq!(body["area"], Value::Array(vec![]));
    assert_eq!(body["scatter"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let app = app();
    let (_, first) = get(app.clone(), "/api/dashboard2?sector=Technology&period=M").await;
    let (_, second) = get(app, "/api/dashboard2?sector=Technology&period=M").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_risk_is_rejected() {
    let (status, body) = get(app(), "/api/dashboard1?risk=Extreme").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Extreme"));
}

#[tokio::test]
async fn test_overview_kpis() {
    for (uri, label) in [
        ("/api/kpi/market", "Average Beta"),
        ("/api/kpi/performance", "Risk Score"),
        ("/api/kpi/valuation", "Total MarketCap (Bn)"),
    ] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body[label].is_number(), "{uri} is missing {label}");
    }
}

#[tokio::test]
async fn test_missing_dataset_is_a_server_error() {
    let (status, body) = get(app_with_dataset(PathBuf::from("/nonexistent/StockMarket.csv")), "/api/dashboard1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("StockMarket.csv"));
}

#[test]
fn test_invalid_config_is_rejected_before_serving() {
    let mut config = Config::default();
    config.data.path = sample_dataset();
    config.analytics.volatility_window = 1;

    match AppState::from_config(&config) {
        Err(AppError::Config(err)) => assert!(err.to_string().contains("analytics.volatility_window")),
        Err(other) => panic!("expected a configuration error, got {other}"),
        Ok(_) => panic!("expected a configuration error"),
    }
}
