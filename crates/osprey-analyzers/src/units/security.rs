use crate::fetch::PageFetcher;
use async_trait::async_trait;
use lazy_static::lazy_static;
use osprey_core::Target;
use osprey_core::analyzer::{Analyzer, UnitError, UnitResult};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey};
use regex::Regex;
use serde_json::json;
use std::sync::Arc;

use super::weighted_score;

lazy_static! {
    static ref GENERATOR_RE: Regex =
        Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']([^"']+)["']"#)
            .unwrap();
    static ref GA_RE: Regex =
        Regex::new(r"(?i)(googletagmanager\.com/gtag|google-analytics\.com|\bga\('create')")
            .unwrap();
    static ref GTM_RE: Regex = Regex::new(r"(?i)googletagmanager\.com/gtm").unwrap();
    static ref FB_PIXEL_RE: Regex = Regex::new(r"(?i)connect\.facebook\.net/[^/]+/fbevents")
        .unwrap();
    static ref HOTJAR_RE: Regex = Regex::new(r"(?i)static\.hotjar\.com").unwrap();
    static ref SEGMENT_RE: Regex = Regex::new(r"(?i)cdn\.segment\.com").unwrap();
}

/// Transport security posture from the response head.
pub struct SecurityUnit {
    fetcher: Arc<PageFetcher>,
}

impl SecurityUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for SecurityUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Security
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let https = page.is_https();
        let hsts = page.header("strict-transport-security").is_some();
        let csp = page.header("content-security-policy").is_some();
        let x_frame_options = page.header("x-frame-options").is_some();
        let x_content_type_options = page.header("x-content-type-options").is_some();

        let score = weighted_score(&[
            (https, 4.0),
            (hsts, 2.0),
            (csp, 2.0),
            (x_frame_options, 1.0),
            (x_content_type_options, 1.0),
        ]);

        let mut data = AnalyzerData::new();
        data.insert("https".to_string(), json!(https));
        data.insert("hsts".to_string(), json!(hsts));
        data.insert("csp".to_string(), json!(csp));
        data.insert("x_frame_options".to_string(), json!(x_frame_options));
        data.insert(
            "x_content_type_options".to_string(),
            json!(x_content_type_options),
        );
        data.insert("score".to_string(), json!(score));
        Ok(data)
    }
}

/// Server and framework fingerprints.
pub struct TechnologyUnit {
    fetcher: Arc<PageFetcher>,
}

impl TechnologyUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for TechnologyUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Technology
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let server = page.header("server").map(|s| s.to_string());
        let powered_by = page.header("x-powered-by").map(|s| s.to_string());
        let generator = GENERATOR_RE
            .captures(&page.body)
            .map(|cap| cap[1].to_string());

        let mut frameworks = Vec::new();
        for (needle, name) in [
            ("wp-content", "WordPress"),
            ("cdn.shopify.com", "Shopify"),
            ("data-reactroot", "React"),
            ("__NEXT_DATA__", "Next.js"),
            ("ng-version", "Angular"),
            ("data-v-app", "Vue"),
        ] {
            if page.body.contains(needle) {
                frameworks.push(name);
            }
        }

        let mut data = AnalyzerData::new();
        data.insert("server".to_string(), json!(server));
        data.insert("powered_by".to_string(), json!(powered_by));
        data.insert("generator".to_string(), json!(generator));
        data.insert("frameworks".to_string(), json!(frameworks));
        Ok(data)
    }
}

/// Measurement tooling detected on the page.
pub struct AnalyticsUnit {
    fetcher: Arc<PageFetcher>,
}

impl AnalyticsUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for AnalyticsUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Analytics
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let mut tools = Vec::new();
        if GA_RE.is_match(&page.body) {
            tools.push("Google Analytics");
        }
        if GTM_RE.is_match(&page.body) {
            tools.push("Google Tag Manager");
        }
        if FB_PIXEL_RE.is_match(&page.body) {
            tools.push("Meta Pixel");
        }
        if HOTJAR_RE.is_match(&page.body) {
            tools.push("Hotjar");
        }
        if SEGMENT_RE.is_match(&page.body) {
            tools.push("Segment");
        }

        let mut data = AnalyzerData::new();
        data.insert("instrumented".to_string(), json!(!tools.is_empty()));
        data.insert("tools".to_string(), json!(tools));
        Ok(data)
    }
}
