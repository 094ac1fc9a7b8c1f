use crate::{error::ClientError, sequencer::PageSequencer, stream::RowStream};
use connectors::{config::ConnectionConfig, http::HttpTransport, transport::Transport};
use model::{
    pagination::page::Page,
    records::{column::ColumnType, row::Row},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// First response of a query, already checked for errors.
struct Submitted {
    query_id: String,
    column_types: Vec<ColumnType>,
    first: Page,
}

/// Caller-facing handle owning one connection to the server.
///
/// A session runs one query at a time: result streams borrow the session
/// mutably until they are dropped. When a query fails or is cancelled
/// mid-flight the connection is dropped before the error is returned; the
/// next query reconnects.
pub struct Session<T: Transport = HttpTransport> {
    transport: T,
    cancel: CancellationToken,
    // Set while a submission is outstanding, so an abandoned one is noticed.
    submitting: bool,
}

impl Session<HttpTransport> {
    pub fn from_url(url: &str) -> Result<Self, ClientError> {
        let config = ConnectionConfig::from_url(url)?;
        Ok(Session::from_config(config))
    }

    pub fn from_config(config: ConnectionConfig) -> Self {
        Session::new(HttpTransport::new(config))
    }
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Session {
            transport,
            cancel: CancellationToken::new(),
            submitting: false,
        }
    }

    /// Uses `cancel` as the interrupt signal for every request this session makes.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs `query` and collects every row before returning.
    pub async fn execute(&mut self, query: &str) -> Result<Vec<Row>, ClientError> {
        let (rows, _) = self.execute_with_column_types(query).await?;
        Ok(rows)
    }

    /// Like [`execute`](Self::execute), also returning the column layout.
    pub async fn execute_with_column_types(
        &mut self,
        query: &str,
    ) -> Result<(Vec<Row>, Vec<ColumnType>), ClientError> {
        let Submitted {
            query_id,
            column_types,
            first,
        } = self.submit(query).await?;

        if first.is_terminal() {
            debug!(query_id = %query_id, rows = first.row_count(), "Query answered in one page");
            return Ok((first.into_rows(), column_types));
        }

        let pages = PageSequencer::new(&mut self.transport, self.cancel.clone(), &query_id, first);
        let rows = pages.drain().await?;

        info!(query_id = %query_id, rows = rows.len(), "Query completed");
        Ok((rows, column_types))
    }

    /// Runs `query` and returns its rows as a lazily paged stream.
    pub async fn execute_streaming(&mut self, query: &str) -> Result<RowStream<'_, T>, ClientError> {
        let Submitted {
            query_id,
            column_types,
            first,
        } = self.submit(query).await?;

        if first.is_terminal() {
            return Ok(RowStream::single(first, column_types));
        }

        let pages = PageSequencer::new(&mut self.transport, self.cancel.clone(), query_id, first);
        Ok(RowStream::paged(pages, column_types))
    }

    /// Releases the connection. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    async fn submit(&mut self, query: &str) -> Result<Submitted, ClientError> {
        if self.submitting {
            warn!("Previous query was abandoned mid-request, resetting connection");
            self.transport.disconnect();
        }

        let query_id = Uuid::new_v4().to_string();
        debug!(query_id = %query_id, "Executing query");

        self.submitting = true;
        let result = self.first_page(query, &query_id).await;
        self.submitting = false;

        match result {
            Ok(first) => Ok(Submitted {
                column_types: first.column_types(),
                query_id,
                first,
            }),
            Err(err) => {
                warn!(query_id = %query_id, error = %err, "Query failed, disconnecting");
                self.transport.disconnect();
                Err(err)
            }
        }
    }

    async fn first_page(&mut self, query: &str, query_id: &str) -> Result<Page, ClientError> {
        let raw = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ClientError::Cancelled),
            raw = self.transport.execute(query, Some(query_id)) => raw?,
        };

        let page = Page::decode(&raw)?;
        page.check_error()?;
        Ok(page)
    }
}
