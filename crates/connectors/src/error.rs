use thiserror::Error;

/// Failures surfaced by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network, TLS or timeout failure reported by the HTTP client.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// A request target could not be built from the base URL and a reference.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// A continuation was requested after the connection was released.
    #[error("Transport is disconnected")]
    Disconnected,
}

/// Errors raised while turning a connection URL into a [`ConnectionConfig`](crate::config::ConnectionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Connection URL has no host")]
    MissingHost,

    #[error("Invalid value for '{name}': {value} (expected seconds)")]
    InvalidTimeout { name: String, value: String },

    #[error("Invalid boolean value: {0}")]
    InvalidBool(String),
}
