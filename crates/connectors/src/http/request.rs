use crate::config::ConnectionConfig;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON body of a query submission.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub sql: &'a str,
    #[serde(skip_serializing_if = "SessionState::is_empty")]
    pub session: SessionState<'a>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct SessionState<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: &'a BTreeMap<String, String>,
}

impl SessionState<'_> {
    fn is_empty(&self) -> bool {
        self.database.is_none() && self.settings.is_empty()
    }
}

/// How long the server may hold a page request open waiting for rows, in
/// whole seconds (rounded, never below one).
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub wait_time_secs: u64,
}

impl<'a> QueryRequest<'a> {
    pub fn new(sql: &'a str, config: &'a ConnectionConfig) -> Self {
        QueryRequest {
            sql,
            session: SessionState {
                database: config.database.as_deref(),
                settings: &config.settings,
            },
            pagination: Pagination {
                wait_time_secs: (config.sync_request_timeout.as_secs_f64().round() as u64).max(1),
            },
        }
    }
}
