use client::ClientError;
use connectors::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No server URL given; pass --url or set {0}")]
    MissingUrl(&'static str),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] ConfigError),

    #[error("Query failed: {0}")]
    Query(#[from] ClientError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CliError::Query(ClientError::Cancelled))
    }
}
