use crate::fetch::PageFetcher;
use async_trait::async_trait;
use lazy_static::lazy_static;
use osprey_core::Target;
use osprey_core::analyzer::{Analyzer, UnitError, UnitResult};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey};
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    H1_RE, META_DESCRIPTION_RE, extract_title, hrefs, visible_text, weighted_score,
};

lazy_static! {
    static ref CANONICAL_RE: Regex =
        Regex::new(r#"(?i)<link[^>]+rel=["']canonical["'][^>]*>"#).unwrap();
    static ref NOFOLLOW_RE: Regex =
        Regex::new(r#"(?i)<a[^>]+rel=["'][^"']*nofollow[^"']*["']"#).unwrap();
    static ref WORD_RE: Regex = Regex::new(r"[a-z]{4,}").unwrap();
}

/// Head-of-page SEO hygiene: title, description, headings, canonical.
pub struct SeoUnit {
    fetcher: Arc<PageFetcher>,
}

impl SeoUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for SeoUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Seo
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let title = extract_title(&page.body);
        let title_length = title.as_ref().map(|t| t.len()).unwrap_or(0);
        let meta_description = META_DESCRIPTION_RE.is_match(&page.body);
        let h1_count = H1_RE.find_iter(&page.body).count();
        let canonical = CANONICAL_RE.is_match(&page.body);

        let score = weighted_score(&[
            (title.is_some(), 2.5),
            ((10..=60).contains(&title_length), 1.5),
            (meta_description, 2.5),
            (h1_count == 1, 1.5),
            (canonical, 2.0),
        ]);

        let mut data = AnalyzerData::new();
        data.insert("title".to_string(), json!(title));
        data.insert("title_length".to_string(), json!(title_length));
        data.insert("meta_description".to_string(), json!(meta_description));
        data.insert("h1_count".to_string(), json!(h1_count));
        data.insert("canonical".to_string(), json!(canonical));
        data.insert("score".to_string(), json!(score));
        Ok(data)
    }
}

/// Top visible-copy terms of a raw HTML page.
pub(crate) fn top_terms_of(html: &str, limit: usize) -> Vec<(String, usize)> {
    KeywordsUnit::top_terms(&visible_text(html), limit)
}

/// Most frequent terms in the visible homepage copy.
pub struct KeywordsUnit {
    fetcher: Arc<PageFetcher>,
}

impl KeywordsUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Top terms of four letters or more, most frequent first.
    pub fn top_terms(text: &str, limit: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for m in WORD_RE.find_iter(&text.to_lowercase()) {
            *counts.entry(m.as_str().to_string()).or_insert(0) += 1;
        }
        let mut terms: Vec<_> = counts.into_iter().collect();
        // Deterministic: frequency desc, then alphabetical.
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(limit);
        terms
    }
}

#[async_trait]
impl Analyzer for KeywordsUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Keywords
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let text = visible_text(&page.body);
        let total_words = text.split_whitespace().count();
        let terms = Self::top_terms(&text, 10);

        let mut data = AnalyzerData::new();
        data.insert("total_words".to_string(), json!(total_words));
        data.insert(
            "top_terms".to_string(),
            json!(
                terms
                    .iter()
                    .map(|(term, count)| json!({"term": term, "count": count}))
                    .collect::<Vec<_>>()
            ),
        );
        Ok(data)
    }
}

/// Crawlability surface: robots.txt, sitemap, navigation breadth.
pub struct SiteStructureUnit {
    fetcher: Arc<PageFetcher>,
}

impl SiteStructureUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for SiteStructureUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::SiteStructure
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        // Missing robots/sitemap is a finding, not a unit failure.
        let robots_txt = match self.fetcher.fetch_path(target, "/robots.txt").await {
            Ok(robots) => robots.status == 200,
            Err(_) => false,
        };
        let sitemap = match self.fetcher.fetch_path(target, "/sitemap.xml").await {
            Ok(sitemap) => sitemap.status == 200,
            Err(_) => false,
        };

        let nav_links = hrefs(&page.body)
            .iter()
            .filter(|href| href.starts_with('/') && href.len() > 1)
            .count();

        let mut data = AnalyzerData::new();
        data.insert("robots_txt".to_string(), json!(robots_txt));
        data.insert("sitemap".to_string(), json!(sitemap));
        data.insert("nav_links".to_string(), json!(nav_links));
        Ok(data)
    }
}

/// Link profile of the homepage.
pub struct LinksUnit {
    fetcher: Arc<PageFetcher>,
}

impl LinksUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for LinksUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Links
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let links = hrefs(&page.body);
        let (external, internal): (Vec<_>, Vec<_>) = links
            .iter()
            .partition(|href| href.starts_with("http") && !href.contains(target.as_str()));
        let nofollow = NOFOLLOW_RE.find_iter(&page.body).count();

        let mut data = AnalyzerData::new();
        data.insert("internal_count".to_string(), json!(internal.len()));
        data.insert("external_count".to_string(), json!(external.len()));
        data.insert("nofollow_count".to_string(), json!(nofollow));
        Ok(data)
    }
}
