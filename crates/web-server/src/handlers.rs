use crate::{error::AppError, AppState};
use analytics::OverviewKind;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use core_types::{FilterRequest, Period, Risk, ViewFilter};
use dashboards::ViewId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// The query string shared by every dashboard endpoint.
///
/// Everything arrives as text; an empty value is the same as an absent one.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub sector: Option<String>,
    pub risk: Option<String>,
    pub period: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl DashboardQuery {
    /// Converts the raw query into a typed filter request.
    ///
    /// An unknown risk tier is rejected. An unknown period code falls back to yearly.
    pub fn into_request(self) -> Result<FilterRequest, AppError> {
        let risk = non_empty(self.risk)
            .map(|r| r.parse::<Risk>())
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let period = non_empty(self.period).map(|p| Period::from_code_lossy(&p));
        Ok(FilterRequest::new(non_empty(self.sector), risk, period))
    }

    fn into_filter(self) -> Result<ViewFilter, AppError> {
        Ok(self.into_request()?.filter)
    }
}

/// # GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "MarketLens analytics API is running" }))
}

async fn dashboard(state: &AppState, view: ViewId, query: DashboardQuery) -> Result<Response, AppError> {
    let request = query.into_request()?;
    let payload = state.service.view(view, &request)?;
    Ok(Json(payload.as_ref()).into_response())
}

/// # GET /api/dashboard1
/// Summary view: return, volume and volatility by year unless `period` says otherwise.
pub async fn get_summary_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    dashboard(&state, ViewId::Summary, query).await
}

/// # GET /api/dashboard2
/// Sector and risk breakdowns, quarterly by default.
pub async fn get_sector_risk_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    dashboard(&state, ViewId::SectorRisk, query).await
}

/// # GET /api/dashboard3
pub async fn get_deep_dive_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    dashboard(&state, ViewId::DeepDive, query).await
}

async fn overview(state: &AppState, kind: OverviewKind, query: DashboardQuery) -> Result<Response, AppError> {
    let filter = query.into_filter()?;
    let overview = state.service.overview(kind, &filter)?;
    Ok(Json(overview).into_response())
}

/// # GET /api/kpi/market
pub async fn get_market_kpis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    overview(&state, OverviewKind::Market, query).await
}

/// # GET /api/kpi/performance
pub async fn get_performance_kpis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    overview(&state, OverviewKind::Performance, query).await
}

/// # GET /api/kpi/valuation
pub async fn get_valuation_kpis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    overview(&state, OverviewKind::Valuation, query).await
}
