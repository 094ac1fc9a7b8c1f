#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use client::{Row, Session};
use connectors::{error::TransportError, transport::Transport};
use serde_json::{Value, json};
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

/// What the mock server answers for one request.
pub enum Reply {
    Body(String),
    Status(u16),
    /// Never answers; only a cancellation gets the caller out.
    Hang,
}

impl Reply {
    pub fn page(page: Value) -> Self {
        Reply::Body(page.to_string())
    }
}

#[derive(Default)]
pub struct Stats {
    pub executes: AtomicUsize,
    pub fetches: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub teardowns: AtomicUsize,
    pub fetched_uris: Mutex<Vec<String>>,
}

impl Stats {
    pub fn executes(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    pub fn fetched_uris(&self) -> Vec<String> {
        self.fetched_uris.lock().unwrap().clone()
    }
}

/// Scripted transport: one reply per submitted query, and a reply per
/// continuation reference. Each continuation can be fetched once.
pub struct MockTransport {
    submissions: VecDeque<Reply>,
    pages: HashMap<String, Reply>,
    connected: bool,
    stats: Arc<Stats>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            submissions: VecDeque::new(),
            pages: HashMap::new(),
            connected: false,
            stats: Arc::new(Stats::default()),
        }
    }

    pub fn on_execute(mut self, reply: Reply) -> Self {
        self.submissions.push_back(reply);
        self
    }

    pub fn on_fetch(mut self, uri: &str, reply: Reply) -> Self {
        self.pages.insert(uri.to_string(), reply);
        self
    }

    /// Scripts a query whose result spans `pages`, chained through
    /// `/v1/query/<query>/page/<n>` continuations.
    pub fn paged(mut self, query: &str, pages: Vec<Vec<Row>>) -> Self {
        let count = pages.len();
        for (index, rows) in pages.into_iter().enumerate() {
            let next = (index + 1 < count).then(|| page_uri(query, index + 1));
            let body = if index == 0 {
                first_page(rows, next.as_deref())
            } else {
                page(rows, next.as_deref())
            };

            if index == 0 {
                self = self.on_execute(Reply::page(body));
            } else {
                self = self.on_fetch(&page_uri(query, index), Reply::page(body));
            }
        }
        self
    }

    pub fn stats(&self) -> Arc<Stats> {
        self.stats.clone()
    }

    pub fn into_session(self) -> (Session<MockTransport>, Arc<Stats>) {
        let stats = self.stats();
        (Session::new(self), stats)
    }

    async fn answer(reply: Option<Reply>) -> Result<Bytes, TransportError> {
        match reply {
            Some(Reply::Body(body)) => Ok(Bytes::from(body)),
            Some(Reply::Status(status)) => Err(TransportError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            Some(Reply::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(TransportError::Status {
                status: 404,
                body: "no such page".to_string(),
            }),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(
        &mut self,
        _query: &str,
        _query_id: Option<&str>,
    ) -> Result<Bytes, TransportError> {
        self.stats.executes.fetch_add(1, Ordering::SeqCst);
        self.connected = true;
        let reply = self.submissions.pop_front();
        Self::answer(reply).await
    }

    async fn fetch_raw(&mut self, next_uri: &str) -> Result<Bytes, TransportError> {
        self.stats.fetches.fetch_add(1, Ordering::SeqCst);
        self.stats
            .fetched_uris
            .lock()
            .unwrap()
            .push(next_uri.to_string());
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        let reply = self.pages.remove(next_uri);
        Self::answer(reply).await
    }

    fn disconnect(&mut self) {
        self.stats.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.connected {
            self.connected = false;
            self.stats.teardowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

pub fn page_uri(query: &str, n: usize) -> String {
    format!("/v1/query/{query}/page/{n}")
}

pub fn first_page(rows: Vec<Row>, next: Option<&str>) -> Value {
    json!({
        "id": "q",
        "schema": {
            "fields": [
                { "name": "n", "data_type": { "type": "Int64" } },
                { "name": "label", "data_type": { "type": "String" } }
            ]
        },
        "data": rows,
        "next_uri": next,
        "error": null
    })
}

pub fn page(rows: Vec<Row>, next: Option<&str>) -> Value {
    json!({ "data": rows, "next_uri": next, "error": null })
}

pub fn error_page(code: i64, message: &str) -> Value {
    json!({
        "data": [],
        "next_uri": null,
        "error": { "code": code, "message": message }
    })
}

pub fn row(n: i64) -> Row {
    vec![json!(n.to_string()), json!(format!("row-{n}"))]
}

pub fn rows(range: std::ops::Range<i64>) -> Vec<Row> {
    range.map(row).collect()
}
