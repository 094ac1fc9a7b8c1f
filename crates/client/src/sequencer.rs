use crate::error::ClientError;
use connectors::transport::Transport;
use model::{
    pagination::{continuation::ContinuationRef, page::Page},
    records::row::Row,
};
use std::mem;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

enum State {
    /// Holds the page that came back with the query submission.
    Start(Page),
    /// A continuation is pending; the next pull fetches it.
    Fetching(String),
    Exhausted,
    Failed,
}

/// Lazy, single-pass sequence of the pages of one query.
///
/// Pages are fetched one at a time, only when [`next_page`](Self::next_page)
/// is called, by following `next_uri` until it is `null`. Every failure
/// leaves the sequencer `Failed` and disconnects the transport before the
/// error is returned. Dropping the sequencer before the last page also
/// disconnects, so a half-read query never stays attached to the connection.
pub struct PageSequencer<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    cancel: CancellationToken,
    query_id: String,
    state: State,
    fetched: usize,
}

impl<'a, T: Transport + ?Sized> PageSequencer<'a, T> {
    pub fn new(
        transport: &'a mut T,
        cancel: CancellationToken,
        query_id: impl Into<String>,
        first: Page,
    ) -> Self {
        PageSequencer {
            transport,
            cancel,
            query_id: query_id.into(),
            state: State::Start(first),
            fetched: 0,
        }
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Number of continuation pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.fetched
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Exhausted | State::Failed)
    }

    /// Returns the next page, or `None` once the sequence is exhausted or has failed.
    pub async fn next_page(&mut self) -> Result<Option<Page>, ClientError> {
        let next_uri = match mem::replace(&mut self.state, State::Exhausted) {
            State::Exhausted => return Ok(None),
            State::Failed => {
                self.state = State::Failed;
                return Ok(None);
            }
            State::Start(first) => {
                self.advance(&first);
                return Ok(Some(first));
            }
            State::Fetching(uri) => {
                // Stays `Fetching` while the request is outstanding so that a
                // dropped future still counts as an abandoned query.
                self.state = State::Fetching(uri.clone());
                uri
            }
        };

        match self.fetch_page(&next_uri).await {
            Ok(page) => {
                self.fetched += 1;
                debug!(
                    query_id = %self.query_id,
                    page = self.fetched,
                    rows = page.row_count(),
                    "Received page"
                );
                self.advance(&page);
                Ok(Some(page))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Drains the whole sequence, collecting rows in arrival order.
    pub async fn drain(mut self) -> Result<Vec<Row>, ClientError> {
        let mut rows = Vec::new();
        while let Some(page) = self.next_page().await? {
            rows.extend(page.into_rows());
        }
        Ok(rows)
    }

    async fn fetch_page(&mut self, next_uri: &str) -> Result<Page, ClientError> {
        let reference = ContinuationRef::parse(next_uri)?;

        let raw = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ClientError::Cancelled),
            raw = self.transport.fetch_raw(reference.as_str()) => raw?,
        };

        let page = Page::decode(&raw)?;
        page.check_error()?;
        Ok(page)
    }

    fn advance(&mut self, page: &Page) {
        self.state = match &page.next_uri {
            Some(uri) => State::Fetching(uri.clone()),
            None => State::Exhausted,
        };
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        self.state = State::Failed;
        warn!(
            query_id = %self.query_id,
            pages_fetched = self.fetched,
            error = %err,
            "Query failed while paging, disconnecting"
        );
        self.transport.disconnect();
        err
    }
}

impl<T: Transport + ?Sized> Drop for PageSequencer<'_, T> {
    fn drop(&mut self) {
        if matches!(self.state, State::Start(_) | State::Fetching(_)) {
            warn!(
                query_id = %self.query_id,
                pages_fetched = self.fetched,
                "Query abandoned before its last page, disconnecting"
            );
            self.state = State::Failed;
            self.transport.disconnect();
        }
    }
}
