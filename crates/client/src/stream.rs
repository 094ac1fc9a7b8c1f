use crate::{error::ClientError, sequencer::PageSequencer};
use connectors::transport::Transport;
use futures::{Stream, stream};
use model::{
    pagination::page::Page,
    records::{column::ColumnType, row::Row},
};
use std::vec;

/// Rows of one query, pulled on demand across page boundaries.
///
/// Holds at most one page in memory. The next page is only requested once the
/// rows of the current one have been handed out and another row is asked for.
/// The stream is single pass: after the last row, or after an error, it keeps
/// returning `None`.
pub struct RowStream<'a, T: Transport + ?Sized> {
    column_types: Vec<ColumnType>,
    rows: vec::IntoIter<Row>,
    pages: Option<PageSequencer<'a, T>>,
}

impl<'a, T: Transport + ?Sized> RowStream<'a, T> {
    /// Result that fit in the first page; nothing left to fetch.
    pub(crate) fn single(page: Page, column_types: Vec<ColumnType>) -> Self {
        RowStream {
            column_types,
            rows: page.into_rows().into_iter(),
            pages: None,
        }
    }

    pub(crate) fn paged(pages: PageSequencer<'a, T>, column_types: Vec<ColumnType>) -> Self {
        RowStream {
            column_types,
            rows: Vec::new().into_iter(),
            pages: Some(pages),
        }
    }

    /// Columns announced by the first page.
    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    pub async fn next_row(&mut self) -> Result<Option<Row>, ClientError> {
        loop {
            if let Some(row) = self.rows.next() {
                return Ok(Some(row));
            }

            let Some(pages) = self.pages.as_mut() else {
                return Ok(None);
            };

            match pages.next_page().await? {
                Some(page) => self.rows = page.into_rows().into_iter(),
                None => {
                    self.pages = None;
                    return Ok(None);
                }
            }
        }
    }

    /// Adapts the rows into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<Row, ClientError>> + 'a {
        stream::try_unfold(self, |mut rows| async move {
            let row = rows.next_row().await?;
            Ok::<_, ClientError>(row.map(|row| (row, rows)))
        })
    }
}
