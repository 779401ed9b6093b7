use crate::fetch::PageFetcher;
use async_trait::async_trait;
use futures::future::join_all;
use osprey_core::Target;
use osprey_core::analyzer::{Analyzer, DependentAnalyzer, UnitError, UnitResult};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey};
use serde_json::json;
use std::sync::Arc;
use url::Url;

use super::hrefs;
use super::seo::top_terms_of;

/// Hosts that show up as outbound links on most sites but are never
/// competitors.
const IGNORED_HOSTS: [&str; 10] = [
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "tiktok.com",
    "google.com",
    "apple.com",
    "cloudflare.com",
];

/// Discovers candidate competitor domains from outbound links. Downstream
/// phase-two units consume the `domains` field.
pub struct CompetitorsUnit {
    fetcher: Arc<PageFetcher>,
    max_domains: usize,
}

impl CompetitorsUnit {
    pub fn new(fetcher: Arc<PageFetcher>, max_domains: usize) -> Self {
        Self {
            fetcher,
            max_domains,
        }
    }

    /// External registrable domains linked from the page, deduplicated,
    /// self and well-known non-competitor hosts excluded.
    pub fn outbound_domains(html: &str, own_root: &str, limit: usize) -> Vec<String> {
        let mut domains = Vec::new();
        for href in hrefs(html) {
            let Ok(url) = Url::parse(&href) else { continue };
            let Some(host) = url.host_str() else { continue };
            let root = match psl::domain(host.as_bytes()) {
                Some(root) => String::from_utf8_lossy(root.as_bytes()).to_string(),
                None => continue,
            };
            if root == own_root || IGNORED_HOSTS.contains(&root.as_str()) {
                continue;
            }
            if !domains.contains(&root) {
                domains.push(root);
            }
            if domains.len() == limit {
                break;
            }
        }
        domains
    }
}

#[async_trait]
impl Analyzer for CompetitorsUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Competitors
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let domains =
            Self::outbound_domains(&page.body, &target.root_domain(), self.max_domains);
        tracing::debug!("Discovered {} candidate competitors", domains.len());

        let mut data = AnalyzerData::new();
        data.insert("domains".to_string(), json!(domains));
        Ok(data)
    }
}

/// Compares page weight and responsiveness against discovered competitors.
pub struct CompetitorComparisonUnit {
    fetcher: Arc<PageFetcher>,
}

impl CompetitorComparisonUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl DependentAnalyzer for CompetitorComparisonUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::CompetitorComparison
    }

    async fn analyze(&self, target: &Target, peers: &[Target]) -> UnitResult {
        let own = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let fetches = join_all(peers.iter().map(|peer| self.fetcher.fetch(peer))).await;

        let mut comparisons = Vec::new();
        for (peer, fetched) in peers.iter().zip(fetches) {
            // A peer that does not resolve is dropped from the comparison,
            // not an error for the whole unit.
            match fetched {
                Ok(page) => comparisons.push(json!({
                    "domain": peer.as_str(),
                    "page_bytes": page.body.len(),
                    "response_ms": page.elapsed.as_millis() as u64,
                })),
                Err(e) => {
                    tracing::debug!("Skipping unreachable competitor {}: {}", peer, e);
                }
            }
        }

        let mut data = AnalyzerData::new();
        data.insert("own_page_bytes".to_string(), json!(own.body.len()));
        data.insert(
            "own_response_ms".to_string(),
            json!(own.elapsed.as_millis() as u64),
        );
        data.insert("competitors".to_string(), json!(comparisons));
        Ok(data)
    }
}

/// Term overlap between the target's copy and each competitor's.
pub struct CompetitorKeywordsUnit {
    fetcher: Arc<PageFetcher>,
}

impl CompetitorKeywordsUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl DependentAnalyzer for CompetitorKeywordsUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::CompetitorKeywords
    }

    async fn analyze(&self, target: &Target, peers: &[Target]) -> UnitResult {
        let own = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;
        let own_terms: Vec<String> = top_terms_of(&own.body, 15)
            .into_iter()
            .map(|(term, _)| term)
            .collect();

        let fetches = join_all(peers.iter().map(|peer| self.fetcher.fetch(peer))).await;

        let mut overlaps = Vec::new();
        for (peer, fetched) in peers.iter().zip(fetches) {
            let Ok(page) = fetched else { continue };
            let peer_terms: Vec<String> = top_terms_of(&page.body, 15)
                .into_iter()
                .map(|(term, _)| term)
                .collect();
            let shared: Vec<&String> =
                own_terms.iter().filter(|t| peer_terms.contains(t)).collect();
            overlaps.push(json!({
                "domain": peer.as_str(),
                "shared_terms": shared,
            }));
        }

        let mut data = AnalyzerData::new();
        data.insert("own_terms".to_string(), json!(own_terms));
        data.insert("overlaps".to_string(), json!(overlaps));
        Ok(data)
    }
}
