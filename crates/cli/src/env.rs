use crate::error::CliError;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

/// Variable holding the server URL when `--url` is not given.
pub const DSN_VAR: &str = "SQLHTTP_DSN";

const REDACTED: &str = "****";

/// Process environment, optionally overlaid with a `.env` style file.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
    sensitive_patterns: Vec<String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
            sensitive_patterns: Self::default_sensitive_patterns(),
        }
    }

    /// Loads `KEY=VALUE` lines from `path`. File values win over the process environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        for key in self.parse_env_content(&content)? {
            debug!(key = %key, value = %self.display_value(&key), "Loaded variable from env file");
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Server URL: the explicit argument if any, else [`DSN_VAR`].
    pub fn resolve_url(&self, explicit: Option<String>) -> Result<String, CliError> {
        explicit
            .or_else(|| self.get(DSN_VAR).map(str::to_string))
            .filter(|url| !url.trim().is_empty())
            .ok_or(CliError::MissingUrl(DSN_VAR))
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.sensitive_patterns.iter().any(|p| key.contains(p))
    }

    /// Value safe to print: sensitive variables are masked.
    pub fn display_value(&self, key: &str) -> &str {
        if self.is_sensitive(key) {
            return REDACTED;
        }
        self.get(key).unwrap_or_default()
    }

    fn parse_env_content(&mut self, content: &str) -> Result<Vec<String>, CliError> {
        let mut loaded = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
            loaded.push(key.to_string());
        }

        Ok(loaded)
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }

    // DSNs carry credentials, so they count as sensitive too.
    fn default_sensitive_patterns() -> Vec<String> {
        ["password", "passwd", "secret", "token", "key", "auth", "credential", "dsn"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}
