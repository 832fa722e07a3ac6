use analytics::AggregationSettings;
use axum::{routing::get, Router};
use configuration::Config;
use dashboards::{CachePolicy, DashboardService};
use dataset::DatasetStore;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

use crate::error::AppError;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub service: DashboardService,
}

impl AppState {
    /// Builds the dashboard service described by `config`. Nothing is read from disk yet.
    ///
    /// The configuration is validated first; an invalid one is `AppError::Config`.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        config.validate()?;
        let settings = AggregationSettings::new(
            config.analytics.volatility_window,
            config.analytics.volatility_alignment,
        )?;
        let service = DashboardService::new(
            DatasetStore::new(&config.data.path),
            CachePolicy::from_ttl(config.cache.ttl),
            settings,
        );
        Ok(Self { service })
    }
}

/// Defines the application routes on top of the shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard1", get(handlers::get_summary_dashboard))
        .route("/api/dashboard2", get(handlers::get_sector_risk_dashboard))
        .route("/api/dashboard3", get(handlers::get_deep_dive_dashboard))
        .route("/api/kpi/market", get(handlers::get_market_kpis))
        .route("/api/kpi/performance", get(handlers::get_performance_kpis))
        .route("/api/kpi/valuation", get(handlers::get_valuation_kpis))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);

    // A failed warm-up is not fatal: the store stays empty and the next request retries.
    let warm_state = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || warm_state.service.warm_up()).await? {
        Ok(rows) => tracing::info!(rows, path = %config.data.path.display(), "Dataset ready."),
        Err(e) => tracing::error!(error = %e, "Dataset warm-up failed; will retry on first request."),
    }

    let app = build_router(state);
    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
