use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    DataFormat(String),

    #[error("Missing field `{field}` in {location}")]
    MissingField {
        location: String,
        field: &'static str,
    },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for RecoError {
    fn from(err: reqwest::Error) -> Self {
        RecoError::ExternalService(err.to_string())
    }
}

impl From<candle_core::Error> for RecoError {
    fn from(err: candle_core::Error) -> Self {
        RecoError::ExternalService(format!("embedding model: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, RecoError>;
