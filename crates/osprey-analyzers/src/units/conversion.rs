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
    static ref CTA_RE: Regex = Regex::new(
        r"(?i)\b(get started|sign up|try (it )?free|book a demo|request a quote|buy now|add to cart|contact us|subscribe now|start free)\b"
    )
    .unwrap();
    static ref FORM_RE: Regex = Regex::new(r"(?i)<form[\s>]").unwrap();
    static ref PHONE_RE: Regex =
        Regex::new(r#"(?i)href=["']tel:[^"']+["']|\+?\d[\d\s().-]{8,}\d"#).unwrap();
    static ref ADDRESS_RE: Regex = Regex::new(
        r"(?i)\b\d{1,5}\s+[A-Za-z][A-Za-z\s]{2,30}\s(street|st\.|avenue|ave\.|road|rd\.|boulevard|blvd\.|lane|ln\.|drive|dr\.)\b"
    )
    .unwrap();
    static ref MAPS_EMBED_RE: Regex =
        Regex::new(r"(?i)(google\.com/maps/embed|maps\.googleapis\.com)").unwrap();
    static ref PRIVACY_RE: Regex =
        Regex::new(r#"(?i)<a[^>]+href=["'][^"']*privacy[^"']*["']"#).unwrap();
    static ref TERMS_RE: Regex =
        Regex::new(r#"(?i)<a[^>]+href=["'][^"']*terms[^"']*["']"#).unwrap();
    static ref TESTIMONIAL_RE: Regex =
        Regex::new(r"(?i)\b(testimonial|trusted by|loved by|our customers|case stud)").unwrap();
    static ref ADSENSE_RE: Regex =
        Regex::new(r"(?i)pagead2\.googlesyndication\.com").unwrap();
    static ref RETARGETING_RE: Regex = Regex::new(
        r"(?i)(connect\.facebook\.net/[^/]+/fbevents|googleads\.g\.doubleclick\.net|snap\.licdn\.com|static\.ads-twitter\.com)"
    )
    .unwrap();
}

/// Conversion surface: calls to action, forms, direct contact routes.
pub struct ConversionUnit {
    fetcher: Arc<PageFetcher>,
}

impl ConversionUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for ConversionUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Conversion
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let cta_count = CTA_RE.find_iter(&page.body).count();
        let form_count = FORM_RE.find_iter(&page.body).count();
        let phone_visible = PHONE_RE.is_match(&page.body);

        let score = weighted_score(&[
            (cta_count > 0, 4.0),
            (cta_count >= 2, 1.0),
            (form_count > 0, 3.0),
            (phone_visible, 2.0),
        ]);

        let mut data = AnalyzerData::new();
        data.insert("cta_count".to_string(), json!(cta_count));
        data.insert("form_count".to_string(), json!(form_count));
        data.insert("phone_visible".to_string(), json!(phone_visible));
        data.insert("score".to_string(), json!(score));
        Ok(data)
    }
}

/// Credibility markers a first-time visitor looks for.
pub struct TrustSignalsUnit {
    fetcher: Arc<PageFetcher>,
}

impl TrustSignalsUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for TrustSignalsUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::TrustSignals
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let privacy_policy = PRIVACY_RE.is_match(&page.body);
        let terms = TERMS_RE.is_match(&page.body);
        let testimonials = TESTIMONIAL_RE.is_match(&page.body);

        let mut data = AnalyzerData::new();
        data.insert("privacy_policy".to_string(), json!(privacy_policy));
        data.insert("terms".to_string(), json!(terms));
        data.insert("testimonials".to_string(), json!(testimonials));
        Ok(data)
    }
}

/// Physical-presence signals for local discovery.
pub struct LocalPresenceUnit {
    fetcher: Arc<PageFetcher>,
}

impl LocalPresenceUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for LocalPresenceUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::LocalPresence
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let phone_found = PHONE_RE.is_match(&page.body);
        let address_found = ADDRESS_RE.is_match(&page.body);
        let maps_embed = MAPS_EMBED_RE.is_match(&page.body);

        let mut data = AnalyzerData::new();
        data.insert("phone_found".to_string(), json!(phone_found));
        data.insert("address_found".to_string(), json!(address_found));
        data.insert("maps_embed".to_string(), json!(maps_embed));
        Ok(data)
    }
}

/// Paid acquisition fingerprints.
pub struct AdvertisingUnit {
    fetcher: Arc<PageFetcher>,
}

impl AdvertisingUnit {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Analyzer for AdvertisingUnit {
    fn key(&self) -> AnalyzerKey {
        AnalyzerKey::Advertising
    }

    async fn analyze(&self, target: &Target) -> UnitResult {
        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;

        let adsense = ADSENSE_RE.is_match(&page.body);
        let retargeting = RETARGETING_RE.is_match(&page.body);

        let mut data = AnalyzerData::new();
        data.insert("adsense".to_string(), json!(adsense));
        data.insert("retargeting".to_string(), json!(retargeting));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cta_detection() {
        let html = r#"<a class="btn">Get Started</a> <button>Buy now</button>"#;
        assert_eq!(CTA_RE.find_iter(html).count(), 2);
        assert_eq!(CTA_RE.find_iter("<p>plain copy</p>").count(), 0);
    }

    #[test]
    fn test_phone_detection_matches_tel_links_and_raw_numbers() {
        assert!(PHONE_RE.is_match(r#"<a href="tel:+15551234567">call</a>"#));
        assert!(PHONE_RE.is_match("Call us: +1 (555) 123-4567"));
        assert!(!PHONE_RE.is_match("<p>no numbers here</p>"));
    }

    #[test]
    fn test_address_detection() {
        assert!(ADDRESS_RE.is_match("Visit us at 123 Main Street, Springfield"));
        assert!(!ADDRESS_RE.is_match("our main product"));
    }
}
