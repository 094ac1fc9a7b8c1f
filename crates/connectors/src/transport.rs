use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// One physical connection to a query server.
///
/// Implementations return raw page payloads; decoding and error inspection
/// happen above this layer. A transport serves one query at a time and
/// applies its own timeout policy, if any. Nothing here retries.
#[async_trait]
pub trait Transport: Send {
    /// Submits `query` and returns the raw first page.
    async fn execute(&mut self, query: &str, query_id: Option<&str>)
    -> Result<Bytes, TransportError>;

    /// Fetches the page named by a continuation reference from an earlier page.
    async fn fetch_raw(&mut self, next_uri: &str) -> Result<Bytes, TransportError>;

    /// Releases the underlying connection. Calling it again is a no-op.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}
