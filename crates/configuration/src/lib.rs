//! # MarketLens Configuration
//!
//! Loads the application settings from an optional TOML file and `MARKETLENS_`
//! environment variables, and validates them before anything starts.

use config::{Environment, File};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Analytics, Cache, Config, Data, Logging, Server};

/// Prefix of every environment variable the application reads.
pub const ENV_PREFIX: &str = "MARKETLENS";

/// The environment source: `MARKETLENS_SERVER__PORT=8080` sets `server.port`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Loads the application configuration.
///
/// `path` is optional on disk: when it does not exist the defaults apply.
/// Environment variables override values from the file. The result is
/// validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_with_environment(path, environment())
}

fn load_with_environment(path: &Path, env: Environment) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), ?config, "Configuration loaded.");
    Ok(config)
}
