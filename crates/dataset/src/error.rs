use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset at '{path}' is unavailable: {reason}")]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("Dataset is missing required column '{0}'")]
    Schema(String),
}
