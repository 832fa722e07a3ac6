use crate::assemble::assemble;
use crate::cache::{CacheKey, CachePolicy, ResultCache};
use crate::error::DashboardError;
use crate::views::{ViewId, ViewPayload};
use analytics::{summarize, AggregationSettings, AnalyticsError, KpiSummary, Overview, OverviewKind, Sanitize};
use core_types::{FilterRequest, Record, ViewFilter};
use dataset::DatasetStore;
use std::sync::Arc;

/// The dashboard orchestration layer.
///
/// Owns the dataset store and the result cache, and turns a `FilterRequest`
/// into a JSON-safe payload for a given view.
pub struct DashboardService {
    store: DatasetStore,
    cache: ResultCache<ViewPayload>,
    settings: AggregationSettings,
}

impl DashboardService {
    pub fn new(store: DatasetStore, policy: CachePolicy, settings: AggregationSettings) -> Self {
        Self {
            store,
            cache: ResultCache::new(policy),
            settings,
        }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Loads the dataset now instead of on the first request. Returns the row count.
    pub fn warm_up(&self) -> Result<usize, DashboardError> {
        let table = self.store.table()?;
        tracing::info!(rows = table.len(), "Dataset warmed up.");
        Ok(table.len())
    }

    /// Returns the payload for `view` under `request`, computing it on a cache miss.
    ///
    /// A request whose filters match no rows yields `ViewPayload::empty`. That
    /// result is cached like any other.
    pub fn view(&self, view: ViewId, request: &FilterRequest) -> Result<Arc<ViewPayload>, DashboardError> {
        let period = request.period.unwrap_or_else(|| view.default_period());
        let key = CacheKey::new(view, &request.filter, period);

        self.cache.get_or_compute(key, || -> Result<ViewPayload, DashboardError> {
            let table = self.store.table()?;
            let rows = table.filter(&request.filter);
            tracing::debug!(%view, %period, rows = rows.len(), "Computing view.");

            match assemble(view, &rows, period, self.settings) {
                Ok(payload) => Ok(payload.sanitized()),
                Err(AnalyticsError::EmptyResult) => {
                    tracing::warn!(
                        %view,
                        sector = ?request.filter.sector,
                        risk = ?request.filter.risk,
                        "Filters matched no rows; returning an empty view."
                    );
                    Ok(ViewPayload::empty(view))
                }
                Err(e) => Err(DashboardError::from(e)),
            }
        })
    }

    /// The five-field KPI summary of the filtered view. Zero when nothing matches.
    pub fn kpi(&self, filter: &ViewFilter) -> Result<KpiSummary, DashboardError> {
        self.with_rows(filter, |rows| match summarize(rows) {
            Ok(kpi) => Ok(kpi.sanitized()),
            Err(AnalyticsError::EmptyResult) => Ok(KpiSummary::default()),
            Err(e) => Err(e.into()),
        })
    }

    /// Computes one of the overview KPI sets over the filtered view.
    pub fn overview(&self, kind: OverviewKind, filter: &ViewFilter) -> Result<Overview, DashboardError> {
        self.with_rows(filter, |rows| Ok(kind.compute(rows)))
    }

    /// Number of payloads currently held by the cache.
    pub fn cached_views(&self) -> usize {
        self.cache.len()
    }

    fn with_rows<T, F>(&self, filter: &ViewFilter, f: F) -> Result<T, DashboardError>
    where
        F: FnOnce(&[&Record]) -> Result<T, DashboardError>,
    {
        let table = self.store.table()?;
        let rows = table.filter(filter);
        f(&rows)
    }
}
