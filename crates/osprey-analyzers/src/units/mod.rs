//! Analyzer units.
//!
//! Each unit is one independent, I/O-bound analysis task. Heuristics are
//! deliberately shallow header/HTML sniffing; the orchestration layer does
//! not care how a unit arrives at its fields, only that field names stay
//! stable for the scoring pipeline.

mod competitors;
mod content;
mod conversion;
mod mobile;
mod performance;
mod security;
mod seo;

pub use competitors::{CompetitorComparisonUnit, CompetitorKeywordsUnit, CompetitorsUnit};
pub use content::{ContentUnit, EmailUnit, SocialUnit};
pub use conversion::{AdvertisingUnit, ConversionUnit, LocalPresenceUnit, TrustSignalsUnit};
pub use mobile::{AccessibilityUnit, MobileUnit};
pub use performance::{PerformanceUnit, TrafficUnit};
pub use security::{AnalyticsUnit, SecurityUnit, TechnologyUnit};
pub use seo::{KeywordsUnit, LinksUnit, SeoUnit, SiteStructureUnit};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub(crate) static ref TITLE_RE: Regex =
        Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    pub(crate) static ref META_DESCRIPTION_RE: Regex =
        Regex::new(r#"(?i)<meta[^>]+name=["']description["'][^>]*>"#).unwrap();
    pub(crate) static ref VIEWPORT_RE: Regex =
        Regex::new(r#"(?i)<meta[^>]+name=["']viewport["'][^>]*>"#).unwrap();
    pub(crate) static ref H1_RE: Regex = Regex::new(r"(?i)<h1[\s>]").unwrap();
    pub(crate) static ref ANCHOR_HREF_RE: Regex =
        Regex::new(r#"(?i)<a[^>]+href=["']([^"']+)["']"#).unwrap();
    pub(crate) static ref IMG_RE: Regex = Regex::new(r"(?i)<img[^>]*>").unwrap();
    pub(crate) static ref IMG_ALT_RE: Regex =
        Regex::new(r#"(?i)<img[^>]*\balt=["'][^"']*["'][^>]*>"#).unwrap();
    pub(crate) static ref TAG_RE: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    pub(crate) static ref SCRIPT_BLOCK_RE: Regex =
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap();
}

/// Weighted pass/fail checks folded into a 0..=100 score.
pub(crate) fn weighted_score(checks: &[(bool, f64)]) -> f64 {
    let total: f64 = checks.iter().map(|(_, w)| w).sum();
    if total == 0.0 {
        return 0.0;
    }
    let passed: f64 = checks.iter().filter(|(ok, _)| *ok).map(|(_, w)| w).sum();
    (passed / total * 100.0).round()
}

/// Visible text with script/style blocks and markup removed.
pub(crate) fn visible_text(html: &str) -> String {
    let without_blocks = SCRIPT_BLOCK_RE.replace_all(html, " ");
    TAG_RE.replace_all(&without_blocks, " ").to_string()
}

pub(crate) fn word_count(html: &str) -> usize {
    visible_text(html).split_whitespace().count()
}

/// All href values on the page.
pub(crate) fn hrefs(html: &str) -> Vec<String> {
    ANCHOR_HREF_RE
        .captures_iter(html)
        .map(|cap| cap[1].to_string())
        .collect()
}

pub(crate) fn extract_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|cap| cap[1].split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}
