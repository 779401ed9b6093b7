use crate::{Error, Result};
use osprey_core::Target;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("osprey/", env!("CARGO_PKG_VERSION"));

/// A fetched page with the pieces the analyzer units inspect.
#[derive(Debug, Clone)]
pub struct Page {
    pub final_url: String,
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
    pub elapsed: Duration,
}

impl Page {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    pub fn is_https(&self) -> bool {
        self.final_url.starts_with("https://")
    }
}

/// Shared HTTP client for every analyzer unit.
///
/// Tries `https://` first and falls back to `http://`; redirects are
/// followed, so `Page::final_url` reflects where the site actually lives.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the homepage of `target`.
    pub async fn fetch(&self, target: &Target) -> Result<Page> {
        self.fetch_path(target, "/").await
    }

    /// Fetch an arbitrary path under `target`.
    pub async fn fetch_path(&self, target: &Target, path: &str) -> Result<Page> {
        let mut last_error = String::new();
        for scheme in ["https", "http"] {
            let url = format!("{scheme}://{target}{path}");
            tracing::debug!("Fetching {}", url);
            match self.get(&url).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    tracing::debug!("Fetch of {} failed: {}", url, e);
                    last_error = e.to_string();
                }
            }
        }
        Err(Error::Unreachable(format!("{target}: {last_error}")))
    }

    async fn get(&self, url: &str) -> std::result::Result<Page, reqwest::Error> {
        let started = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.text().await?;
        Ok(Page {
            final_url,
            status,
            headers,
            body,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(final_url: &str) -> Page {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/html".to_string());
        Page {
            final_url: final_url.to_string(),
            status: 200,
            headers,
            body: String::new(),
            elapsed: Duration::from_millis(120),
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let page = page("https://example.com/");
        assert_eq!(page.header("Content-Type"), Some("text/html"));
        assert_eq!(page.header("x-missing"), None);
    }

    #[test]
    fn test_is_https_follows_final_url() {
        assert!(page("https://example.com/").is_https());
        assert!(!page("http://example.com/").is_https());
    }
}
