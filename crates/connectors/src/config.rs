use crate::error::ConfigError;
use reqwest::Url;
use serde::{Serialize, Serializer};
use std::{
    collections::{BTreeMap, HashSet},
    str::FromStr,
    time::Duration,
};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SEND_RECEIVE_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_SYNC_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_SECURE_PORT: u16 = 443;
const DEFAULT_PLAIN_PORT: u16 = 8000;

/// Everything needed to open a session against a query server.
///
/// Usually built from a URL of the form
/// `scheme://[user[:password]@]host[:port]/[database][?opt=val&...]`.
/// Recognised options are `client_name`, `secure`, `connect_timeout`,
/// `send_receive_timeout` and `sync_request_timeout`; anything else is kept
/// in [`settings`](Self::settings) and forwarded to the server with every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    #[serde(serialize_with = "redact")]
    pub password: Option<String>,
    pub database: Option<String>,
    pub secure: bool,
    pub client_name: Option<String>,
    #[serde(serialize_with = "as_secs")]
    pub connect_timeout: Duration,
    #[serde(serialize_with = "as_secs")]
    pub send_receive_timeout: Duration,
    #[serde(serialize_with = "as_secs")]
    pub sync_request_timeout: Duration,
    pub settings: BTreeMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ConnectionConfig {
            host: host.into(),
            port,
            user: None,
            password: None,
            database: None,
            secure: false,
            client_name: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            send_receive_timeout: DEFAULT_SEND_RECEIVE_TIMEOUT,
            sync_request_timeout: DEFAULT_SYNC_REQUEST_TIMEOUT,
            settings: BTreeMap::new(),
        }
    }

    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHost)?;

        let mut secure = parsed.scheme() == "https";
        let mut config = ConnectionConfig::new(host, 0);

        if !parsed.username().is_empty() {
            config.user = Some(percent_decode(parsed.username())?);
        }
        if let Some(password) = parsed.password() {
            config.password = Some(percent_decode(password)?);
        }

        let database = parsed.path().strip_prefix('/').unwrap_or(parsed.path());
        if !database.is_empty() {
            config.database = Some(database.to_string());
        }

        // Only the first occurrence of an option counts; blank values are ignored.
        let mut seen = HashSet::new();
        for (name, value) in parsed.query_pairs() {
            if value.is_empty() || !seen.insert(name.to_string()) {
                continue;
            }

            match &*name {
                "client_name" => config.client_name = Some(value.into_owned()),
                "secure" => secure = parse_bool(&value)?,
                "connect_timeout" => config.connect_timeout = parse_timeout(&name, &value)?,
                "send_receive_timeout" => {
                    config.send_receive_timeout = parse_timeout(&name, &value)?
                }
                "sync_request_timeout" => {
                    config.sync_request_timeout = parse_timeout(&name, &value)?
                }
                _ => {
                    config
                        .settings
                        .insert(name.to_string(), value.into_owned());
                }
            }
        }

        config.secure = secure;
        let default_port = if secure {
            DEFAULT_SECURE_PORT
        } else {
            DEFAULT_PLAIN_PORT
        };
        config.port = match parsed.port() {
            Some(port) => port,
            None if has_explicit_port(url) => {
                parsed.port_or_known_default().unwrap_or(default_port)
            }
            None => default_port,
        };

        Ok(config)
    }

    /// Root URL requests are resolved against, e.g. `https://host:443`.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

impl FromStr for ConnectionConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectionConfig::from_url(s)
    }
}

// `Url::port` hides a port equal to the scheme default, so check the raw authority.
fn has_explicit_port(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let after_host = host_port.rsplit_once(']').map_or(host_port, |(_, tail)| tail);

    after_host
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

fn percent_decode(raw: &str) -> Result<String, ConfigError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| ConfigError::InvalidUrl(e.to_string()))
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "t" | "1" => Ok(true),
        "false" | "no" | "off" | "n" | "f" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool(value.to_string())),
    }
}

fn parse_timeout(name: &str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidTimeout {
        name: name.to_string(),
        value: value.to_string(),
    };
    let secs: f64 = value.trim().parse().map_err(|_| invalid())?;
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

fn redact<S: Serializer>(password: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match password {
        Some(_) => serializer.serialize_some("****"),
        None => serializer.serialize_none(),
    }
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
