use crate::{
    config::ConnectionConfig, error::TransportError, http::request::QueryRequest,
    transport::Transport,
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, Url};
use tracing::{debug, info};

pub mod request;

pub const QUERY_PATH: &str = "/v1/query";
pub const QUERY_ID_HEADER: &str = "X-DATABEND-QUERY-ID";

const DEFAULT_USER_AGENT: &str = concat!("sqlhttp-driver/", env!("CARGO_PKG_VERSION"));

/// [`Transport`] speaking the JSON query protocol over HTTP(S).
///
/// The underlying `reqwest` client is created on the first query and dropped
/// by [`disconnect`](Transport::disconnect); the next query builds a fresh one.
pub struct HttpTransport {
    config: ConnectionConfig,
    client: Option<Client>,
}

impl HttpTransport {
    pub fn new(config: ConnectionConfig) -> Self {
        HttpTransport {
            config,
            client: None,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn connect(&mut self) -> Result<Client, TransportError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }

        let user_agent = self
            .config
            .client_name
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let client = Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.send_receive_timeout)
            .user_agent(user_agent)
            .build()?;

        info!("Connected to {}", self.config.base_url());
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Resolves a path or continuation reference against the server root.
    pub fn endpoint(&self, target: &str) -> Result<Url, TransportError> {
        let base = Url::parse(&self.config.base_url())
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.config.base_url())))?;
        base.join(target)
            .map_err(|e| TransportError::InvalidUrl(format!("{target}: {e}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.user {
            Some(user) => request.basic_auth(user, self.config.password.as_ref()),
            None => request,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &mut self,
        query: &str,
        query_id: Option<&str>,
    ) -> Result<Bytes, TransportError> {
        let client = self.connect()?;
        let url = self.endpoint(QUERY_PATH)?;
        let body = QueryRequest::new(query, &self.config);

        let mut request = self.authorize(client.post(url)).json(&body);
        if let Some(id) = query_id {
            request = request.header(QUERY_ID_HEADER, id);
        }

        debug!(query_id = query_id.unwrap_or_default(), "Submitting query");
        read_body(request.send().await?).await
    }

    async fn fetch_raw(&mut self, next_uri: &str) -> Result<Bytes, TransportError> {
        let client = self.client.clone().ok_or(TransportError::Disconnected)?;
        let url = self.endpoint(next_uri)?;

        debug!(next_uri, "Fetching page");
        let request = self.authorize(client.get(url));
        read_body(request.send().await?).await
    }

    fn disconnect(&mut self) {
        if self.client.take().is_some() {
            info!("Disconnected from {}", self.config.base_url());
        }
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }
}

async fn read_body(response: Response) -> Result<Bytes, TransportError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(url: &str) -> HttpTransport {
        HttpTransport::new(ConnectionConfig::from_url(url).unwrap())
    }

    #[test]
    fn test_endpoint_resolution() {
        let t = transport("https://host:8443/db");
        assert_eq!(
            t.endpoint(QUERY_PATH).unwrap().as_str(),
            "https://host:8443/v1/query"
        );
        assert_eq!(
            t.endpoint("/v1/query/abc/page/2").unwrap().as_str(),
            "https://host:8443/v1/query/abc/page/2"
        );
        assert_eq!(
            t.endpoint("http://other:9000/v1/query/abc/page/3")
                .unwrap()
                .as_str(),
            "http://other:9000/v1/query/abc/page/3"
        );
    }

    #[tokio::test]
    async fn test_fetch_before_connect_is_rejected() {
        let mut t = transport("http://127.0.0.1:1/db");
        assert!(!t.is_connected());
        let err = t.fetch_raw("/v1/query/abc/page/1").await.unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let mut t = transport("http://127.0.0.1:1/db");
        t.connect().unwrap();
        assert!(t.is_connected());
        t.disconnect();
        t.disconnect();
        assert!(!t.is_connected());
    }
}
