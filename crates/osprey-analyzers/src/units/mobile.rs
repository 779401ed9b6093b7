use crate::fetch::PageFetcher;
use async_trait::async_trait;
use lazy_static::lazy_static;
use osprey_core::Target;
use osprey_core::analyzer::{Analyzer, UnitError, UnitResult};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey};
use regex::Regex;
use serde_json::json;
use std::sync::Arc;

use super::{IMG_ALT_RE, IMG_RE, VIEWPORT_RE, weighted_score};

lazy_static! {
    static ref MEDIA_QUERY_RE: Regex = Regex::new(r"(?i)@media[^{]*\(").unwrap();
    static ref LANG_ATTR_RE: Regex = Regex::new(r#"(?i)<html[^>]+lang=["'][^"']+["']"#).unwrap();
    static ref ARIA_RE: Regex = Regex::new(r#"(?i)\baria-[a-z]+="#).unwrap();
    static ref SKIP_LINK_RE: Regex =
        Regex::new(r##"(?i)<a[^>]+href=["']#(main|content)["']"##).unwrap();
}

/// Mobile readiness: viewport meta, responsive CSS hints.
pub struct MobileUnit {
    fetcher: Arc<PageFetcher>,
}

impl MobileUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for MobileUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Mobile
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let viewport = VIEWPORT_RE.is_match(&page.body);
        let media_queries = MEDIA_QUERY_RE.find_iter(&page.body).count();
        let page_bytes = page.body.len() as u64;

        let score = weighted_score(&[
            (viewport, 4.0),
            (media_queries > 0, 2.0),
            (page_bytes < 1_000_000, 2.0),
        ]);

        let mut data = AnalyzerData::new();
        data.insert("viewport".to_string(), json!(viewport));
        data.insert("media_queries".to_string(), json!(media_queries));
        data.insert("page_bytes".to_string(), json!(page_bytes));
        data.insert("score".to_string(), json!(score));
        Ok(data)
    }
}

/// Accessibility hygiene visible from markup alone.
pub struct AccessibilityUnit {
    fetcher: Arc<PageFetcher>,
}

impl AccessibilityUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for AccessibilityUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Accessibility
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let images = IMG_RE.find_iter(&page.body).count();
        let images_with_alt = IMG_ALT_RE.find_iter(&page.body).count();
        let images_missing_alt = images.saturating_sub(images_with_alt);
        let lang_attr = LANG_ATTR_RE.is_match(&page.body);
        let aria_attributes = ARIA_RE.find_iter(&page.body).count();
        let skip_link = SKIP_LINK_RE.is_match(&page.body);

        let score = weighted_score(&[
            (images_missing_alt == 0, 3.0),
            (lang_attr, 2.5),
            (aria_attributes > 0, 1.5),
            (skip_link, 1.0),
        ]);

        let mut data = AnalyzerData::new();
        data.insert("images".to_string(), json!(images));
        data.insert("images_missing_alt".to_string(), json!(images_missing_alt));
        data.insert("lang_attr".to_string(), json!(lang_attr));
        data.insert("aria_attributes".to_string(), json!(aria_attributes));
        data.insert("skip_link".to_string(), json!(skip_link));
        data.insert("score".to_string(), json!(score));
        Ok(data)
    }
}
