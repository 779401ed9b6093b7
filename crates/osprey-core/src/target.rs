use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized audit target: a bare registrable domain.
///
/// Construction strips the scheme, a leading `www.`, any path/query/fragment,
/// and lowercases the rest. A `Target` never changes once an audit run has
/// started; it is the join key for cache entries and audit records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Parse raw user input into a normalized target.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().to_lowercase();
        if trimmed.is_empty() {
            return Err(Error::InvalidTarget("empty target".to_string()));
        }

        // Strip scheme if present
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(&trimmed);

        // Truncate path, query, fragment, port
        let host = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or(without_scheme);
        let host = host.split(':').next().unwrap_or(host);

        let host = host.strip_prefix("www.").unwrap_or(host);

        if host.is_empty() {
            return Err(Error::InvalidTarget(format!("no host in '{}'", input)));
        }
        if !host.contains('.') {
            return Err(Error::InvalidTarget(format!(
                "'{}' is not a domain",
                host
            )));
        }
        if !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(Error::InvalidTarget(format!(
                "invalid characters in '{}'",
                host
            )));
        }

        Ok(Self(host.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root domain via the Public Suffix List, falling back to the last two
    /// labels when the PSL has no answer.
    pub fn root_domain(&self) -> String {
        match psl::domain(self.0.as_bytes()) {
            Some(root) => String::from_utf8_lossy(root.as_bytes()).to_string(),
            None => {
                let parts: Vec<&str> = self.0.split('.').collect();
                if parts.len() >= 2 {
                    format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1])
                } else {
                    self.0.clone()
                }
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
