use thiserror::Error;

/// Failures while reading or checking the MarketLens settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file or a `MARKETLENS_*` override could not be parsed.
    #[error("Could not read MarketLens settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A setting parsed but holds a value the server cannot run with.
    #[error("Invalid MarketLens setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}
