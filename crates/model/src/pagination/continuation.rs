use crate::error::PageError;
use std::{fmt, str::FromStr};

/// Opaque handle naming the next page of a running query.
///
/// The server hands these out in `next_uri`; the client never interprets
/// them beyond checking that they can be sent back as a request target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationRef(String);

impl ContinuationRef {
    pub fn parse(raw: &str) -> Result<Self, PageError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PageError::InvalidReference(raw.to_string()));
        }

        // Whitespace or control characters cannot be part of a request target.
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(PageError::InvalidReference(raw.to_string()));
        }

        Ok(ContinuationRef(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContinuationRef {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContinuationRef::parse(s)
    }
}

impl fmt::Display for ContinuationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContinuationRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
