use thiserror::Error;

/// Errors raised while turning a raw server response into a [`Page`](crate::pagination::page::Page).
#[derive(Debug, Error)]
pub enum PageError {
    /// A continuation reference was empty or not usable as a request target.
    #[error("Invalid continuation reference: {0:?}")]
    InvalidReference(String),

    /// The payload is not a well-formed page.
    #[error("Failed to decode page: {0}")]
    Decode(#[from] serde_json::Error),

    /// The page decoded fine but the server reported a query failure in it.
    #[error("Server reported error {code}: {message}")]
    Server { code: i64, message: String },
}
