use crate::fetch::PageFetcher;
use async_trait::async_trait;
use lazy_static::lazy_static;
use osprey_core::Target;
use osprey_core::analyzer::{Analyzer, UnitError, UnitResult};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey};
use regex::Regex;
use serde_json::json;
use std::sync::Arc;

use super::{IMG_RE, extract_title, weighted_score, word_count};

lazy_static! {
    static ref OG_TAG_RE: Regex =
        Regex::new(r#"(?i)<meta[^>]+property=["']og:[a-z:]+["'][^>]*>"#).unwrap();
    static ref TWITTER_CARD_RE: Regex =
        Regex::new(r#"(?i)<meta[^>]+name=["']twitter:card["'][^>]*>"#).unwrap();
    static ref SOCIAL_LINK_RE: Regex = Regex::new(
        r#"(?i)href=["']https?://(?:www\.)?(facebook|instagram|linkedin|x|twitter|youtube|tiktok)\.com/[^"']*["']"#
    )
    .unwrap();
    static ref MAILTO_RE: Regex = Regex::new(r#"(?i)href=["']mailto:[^"']+["']"#).unwrap();
    static ref NEWSLETTER_RE: Regex =
        Regex::new(r#"(?i)(newsletter|subscribe)[^<]{0,80}|<input[^>]+type=["']email["']"#)
            .unwrap();
    static ref EMAIL_INPUT_RE: Regex =
        Regex::new(r#"(?i)<input[^>]+type=["']email["'][^>]*>"#).unwrap();
}

/// Editorial depth of the homepage.
pub struct ContentUnit {
    fetcher: Arc<PageFetcher>,
}

impl ContentUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for ContentUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Content
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let words = word_count(&page.body);
        let images = IMG_RE.find_iter(&page.body).count();
        let has_title = extract_title(&page.body).is_some();

        let score = weighted_score(&[
            (words >= 300, 3.0),
            (words >= 800, 1.5),
            (images > 0, 1.5),
            (has_title, 2.0),
        ]);

        let mut data = AnalyzerData::new();
        data.insert("word_count".to_string(), json!(words));
        data.insert("image_count".to_string(), json!(images));
        data.insert("score".to_string(), json!(score));
        Ok(data)
    }
}

/// Social reach hooks: Open Graph, Twitter cards, profile links.
pub struct SocialUnit {
    fetcher: Arc<PageFetcher>,
}

impl SocialUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for SocialUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Social
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let og_tags = OG_TAG_RE.find_iter(&page.body).count();
        let twitter_card = TWITTER_CARD_RE.is_match(&page.body);
        let mut profiles: Vec<String> = SOCIAL_LINK_RE
            .captures_iter(&page.body)
            .map(|cap| cap[1].to_lowercase())
            .collect();
        profiles.sort();
        profiles.dedup();

        let mut data = AnalyzerData::new();
        data.insert("og_tags".to_string(), json!(og_tags));
        data.insert("twitter_card".to_string(), json!(twitter_card));
        data.insert("profiles".to_string(), json!(profiles));
        Ok(data)
    }
}

/// Email capture surface.
pub struct EmailUnit {
    fetcher: Arc<PageFetcher>,
}

impl EmailUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for EmailUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Email
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let mailto = MAILTO_RE.is_match(&page.body);
        let email_input = EMAIL_INPUT_RE.is_match(&page.body);
        let newsletter = email_input || NEWSLETTER_RE.is_match(&page.body);

        let mut data = AnalyzerData::new();
        data.insert("mailto".to_string(), json!(mailto));
        data.insert("newsletter_form".to_string(), json!(newsletter));
        data.insert("email_input".to_string(), json!(email_input));
        Ok(data)
    }
}
