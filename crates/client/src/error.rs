use connectors::error::{ConfigError, TransportError};
use model::error::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A continuation reference was empty or malformed.
    #[error("Invalid continuation reference: {0:?}")]
    InvalidReference(String),

    /// A page payload could not be decoded.
    #[error("Failed to decode page: {0}")]
    Decode(#[source] serde_json::Error),

    /// The server reported a query failure inside a page.
    #[error("Server error {code}: {message}")]
    ServerReported { code: i64, message: String },

    /// The transport failed (network, timeout, auth, bad status).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The query was interrupted while waiting on the server.
    #[error("Query cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl From<PageError> for ClientError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::InvalidReference(raw) => ClientError::InvalidReference(raw),
            PageError::Decode(e) => ClientError::Decode(e),
            PageError::Server { code, message } => ClientError::ServerReported { code, message },
        }
    }
}
