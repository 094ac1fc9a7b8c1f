//! Client for SQL-over-HTTP query servers.
//!
//! A [`Session`] submits a query and follows the server's `next_uri`
//! continuation chain until the final page. Results are either collected
//! into memory ([`Session::execute`]) or pulled row by row
//! ([`Session::execute_streaming`]); both read the same lazily fetched page
//! sequence. Any failure while paging, including cancellation, drops the
//! session's connection before the error is returned.

pub mod error;
pub mod sequencer;
pub mod session;
pub mod stream;

pub use error::ClientError;
pub use model::records::{column::ColumnType, row::Row};
pub use session::Session;
pub use stream::RowStream;
