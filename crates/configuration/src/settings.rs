use crate::error::ConfigError;
use core_types::VolatilityAlignment;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty or missing file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub data: Data,
    pub cache: Cache,
    pub analytics: Analytics,
    pub logging: Logging,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Server {
    /// The `host:port` string handed to the TCP listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Location of the stock dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Data {
    pub path: PathBuf,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/StockMarket.csv"),
        }
    }
}

/// Retention of computed dashboard payloads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cache {
    /// How long a payload is kept, e.g. "15m". Absent means for the lifetime of the process.
    #[serde(with = "humantime_serde")]
    pub ttl: Option<Duration>,
}

/// Parameters of the aggregation engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Analytics {
    /// Number of consecutive returns in each rolling volatility window.
    pub volatility_window: usize,
    pub volatility_alignment: VolatilityAlignment,
}

impl Default for Analytics {
    fn default() -> Self {
        Self {
            volatility_window: 10,
            volatility_alignment: VolatilityAlignment::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects values that would only fail later, at bind time or on the first request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                key: "server.port",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.analytics.volatility_window < 2 {
            return Err(ConfigError::Invalid {
                key: "analytics.volatility_window",
                reason: format!("must be at least 2, got {}", self.analytics.volatility_window),
            });
        }
        if self.data.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "data.path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
