use crate::fetch::PageFetcher;
use async_trait::async_trait;
use osprey_core::Target;
use osprey_core::analyzer::{Analyzer, UnitError, UnitResult};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey};
use serde_json::json;
use std::sync::Arc;

use super::{hrefs, weighted_score};

/// Homepage load characteristics: latency, weight, caching headers.
pub struct PerformanceUnit {
    fetcher: Arc<PageFetcher>,
}

impl PerformanceUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for PerformanceUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Performance
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let load_time_ms = page.elapsed.as_millis() as u64;
        let page_bytes = page.body.len() as u64;
        let compressed = page.header("content-encoding").is_some();
        let cache_control = page.header("cache-control").is_some();

        let score = weighted_score(&[
            (load_time_ms < 1_000, 3.0),
            (load_time_ms < 3_000, 2.0),
            (page_bytes < 1_500_000, 2.0),
            (compressed, 1.5),
            (cache_control, 1.5),
        ]);

        let mut data = AnalyzerData::new();
        data.insert("load_time_ms".to_string(), json!(load_time_ms));
        data.insert("page_bytes".to_string(), json!(page_bytes));
        data.insert("compressed".to_string(), json!(compressed));
        data.insert("cache_control".to_string(), json!(cache_control));
        data.insert("score".to_string(), json!(score));
        Ok(data)
    }
}

/// Rough traffic signals from the homepage itself. Without a panel data
/// provider this stays a proxy: page weight, link surface, and whether the
/// site responds fast enough to sustain load.
pub struct TrafficUnit {
    fetcher: Arc<PageFetcher>,
}

impl TrafficUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for TrafficUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Traffic
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let links = hrefs(&page.body);
        let internal = links
            .iter()
            .filter(|href| !href.starts_with("http") || href.contains(target.as_str()))
            .count();

        let mut data = AnalyzerData::new();
        data.insert("homepage_bytes".to_string(), json!(page.body.len()));
        data.insert("link_surface".to_string(), json!(links.len()));
        data.insert("internal_links".to_string(), json!(internal));
        data.insert(
            "response_ms".to_string(),
            json!(page.elapsed.as_millis() as u64),
        );
        Ok(data)
    }
}
