use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{0}")]
    Dataset(#[from] dataset::DatasetError),

    #[error("{0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Unknown view '{0}'; expected summary, sector-risk or deep-dive")]
    UnknownView(String),
}
