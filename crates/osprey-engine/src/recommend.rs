use crate::{Error, Result};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey, AuditResults};
use osprey_core::report::{Effort, Recommendation, Severity};
use serde_json::Value;

const MAX_RECOMMENDATIONS: usize = 10;

/// Derive prioritized recommendations from the aggregated results.
///
/// Category rules run in a fixed order; the final sort by priority rank is
/// stable, so ties keep their emission order. Missing or failed sub-maps
/// contribute nothing.
pub fn recommend(results: &AuditResults) -> Result<Vec<Recommendation>> {
    let mut recs = Vec::new();

    if let Some(data) = results.data(AnalyzerKey::Security) {
        let https = flag(data, "https", AnalyzerKey::Security)?.unwrap_or(true);
        if !https {
            recs.push(rec(
                Severity::Critical,
                AnalyzerKey::Security,
                "Site is served over plain HTTP",
                "Protects visitors and removes browser security warnings",
                "Provision a TLS certificate and redirect all HTTP traffic to HTTPS",
                Effort::Hours(4),
            ));
        }
        if https && !flag(data, "hsts", AnalyzerKey::Security)?.unwrap_or(true) {
            recs.push(rec(
                Severity::Low,
                AnalyzerKey::Security,
                "No Strict-Transport-Security header",
                "Stops downgrade attacks on returning visitors",
                "Send an HSTS header with a max-age of at least six months",
                Effort::Minutes(30),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Mobile) {
        if !flag(data, "viewport", AnalyzerKey::Mobile)?.unwrap_or(true) {
            recs.push(rec(
                Severity::Critical,
                AnalyzerKey::Mobile,
                "No responsive viewport meta tag",
                "Mobile visitors currently see a desktop layout",
                "Add a viewport meta tag and audit layouts at phone widths",
                Effort::Hours(8),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Performance) {
        if !flag(data, "compressed", AnalyzerKey::Performance)?.unwrap_or(true) {
            recs.push(rec(
                Severity::High,
                AnalyzerKey::Performance,
                "Responses are not compressed",
                "Cuts transfer size for every page view",
                "Enable gzip or brotli compression at the edge or web server",
                Effort::Hours(1),
            ));
        }
        if number(data, "load_time_ms", AnalyzerKey::Performance)?.unwrap_or(0.0) > 3_000.0 {
            recs.push(rec(
                Severity::High,
                AnalyzerKey::Performance,
                "Homepage takes more than three seconds to load",
                "Load time is a direct conversion and ranking factor",
                "Profile the critical path and defer non-essential assets",
                Effort::Days(2),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Seo) {
        if number(data, "title_length", AnalyzerKey::Seo)?.unwrap_or(1.0) == 0.0 {
            recs.push(rec(
                Severity::High,
                AnalyzerKey::Seo,
                "Homepage has no title tag",
                "The title is the single strongest on-page ranking signal",
                "Write a descriptive title of 10 to 60 characters",
                Effort::Hours(1),
            ));
        }
        if !flag(data, "meta_description", AnalyzerKey::Seo)?.unwrap_or(true) {
            recs.push(rec(
                Severity::High,
                AnalyzerKey::Seo,
                "Missing meta description",
                "Search snippets fall back to arbitrary page text",
                "Add a meta description summarizing the offer in under 160 characters",
                Effort::Hours(2),
            ));
        }
        if !flag(data, "canonical", AnalyzerKey::Seo)?.unwrap_or(true) {
            recs.push(rec(
                Severity::Low,
                AnalyzerKey::Seo,
                "No canonical link element",
                "Prevents duplicate-content dilution across URL variants",
                "Emit a canonical link on every indexable page",
                Effort::Minutes(30),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Conversion) {
        if number(data, "cta_count", AnalyzerKey::Conversion)?.unwrap_or(1.0) == 0.0 {
            recs.push(rec(
                Severity::High,
                AnalyzerKey::Conversion,
                "No call to action above the fold",
                "Visitors have no obvious next step",
                "Add one primary call to action to the homepage hero",
                Effort::Hours(4),
            ));
        }
        if number(data, "form_count", AnalyzerKey::Conversion)?.unwrap_or(1.0) == 0.0 {
            recs.push(rec(
                Severity::Medium,
                AnalyzerKey::Conversion,
                "No lead capture form on the homepage",
                "Interested visitors leave without a contact route",
                "Embed a short contact or signup form",
                Effort::Hours(6),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Content) {
        if number(data, "word_count", AnalyzerKey::Content)?.unwrap_or(f64::MAX) < 300.0 {
            recs.push(rec(
                Severity::Medium,
                AnalyzerKey::Content,
                "Thin homepage copy",
                "Pages under 300 words rarely rank for anything",
                "Expand the homepage to cover the core offer and audience",
                Effort::Days(2),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Accessibility) {
        if number(data, "images_missing_alt", AnalyzerKey::Accessibility)?.unwrap_or(0.0) > 0.0 {
            recs.push(rec(
                Severity::Low,
                AnalyzerKey::Accessibility,
                "Images without alt text",
                "Screen readers and image search both depend on alt text",
                "Add descriptive alt attributes to every content image",
                Effort::Hours(2),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Analytics) {
        if !flag(data, "instrumented", AnalyzerKey::Analytics)?.unwrap_or(true) {
            recs.push(rec(
                Severity::Medium,
                AnalyzerKey::Analytics,
                "No analytics instrumentation detected",
                "Nothing downstream can be measured without it",
                "Install an analytics tag and define baseline conversion events",
                Effort::Hours(1),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Social) {
        if number(data, "og_tags", AnalyzerKey::Social)?.unwrap_or(1.0) == 0.0 {
            recs.push(rec(
                Severity::Low,
                AnalyzerKey::Social,
                "No Open Graph tags",
                "Shared links render without image or description",
                "Add og:title, og:description, and og:image to key pages",
                Effort::Hours(1),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::TrustSignals) {
        if !flag(data, "privacy_policy", AnalyzerKey::TrustSignals)?.unwrap_or(true) {
            recs.push(rec(
                Severity::Medium,
                AnalyzerKey::TrustSignals,
                "No privacy policy linked",
                "A visible policy is both a trust and a compliance baseline",
                "Publish a privacy policy and link it from the footer",
                Effort::Hours(3),
            ));
        }
    }

    if let Some(data) = results.data(AnalyzerKey::Email) {
        if !flag(data, "newsletter_form", AnalyzerKey::Email)?.unwrap_or(true) {
            recs.push(rec(
                Severity::Low,
                AnalyzerKey::Email,
                "No email capture",
                "Repeat visits are left to chance without a list",
                "Add a newsletter signup with a concrete reason to subscribe",
                Effort::Hours(2),
            ));
        }
    }

    // Stable: ties keep category emission order.
    recs.sort_by_key(|r| r.priority.rank());
    recs.truncate(MAX_RECOMMENDATIONS);
    Ok(recs)
}

/// Recommendations cheap enough to act on immediately.
pub fn quick_wins(recs: &[Recommendation]) -> Vec<Recommendation> {
    recs.iter()
        .filter(|r| r.effort.is_quick())
        .cloned()
        .collect()
}

fn rec(
    priority: Severity,
    category: AnalyzerKey,
    issue: &str,
    impact: &str,
    action: &str,
    effort: Effort,
) -> Recommendation {
    Recommendation {
        priority,
        category,
        issue: issue.to_string(),
        impact: impact.to_string(),
        action: action.to_string(),
        effort,
    }
}

fn flag(data: &AnalyzerData, field: &str, key: AnalyzerKey) -> Result<Option<bool>> {
    match data.get(field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::Synthesis(format!(
            "{key} field '{field}' is not a boolean: {other}"
        ))),
    }
}

fn number(data: &AnalyzerData, field: &str, key: AnalyzerKey) -> Result<Option<f64>> {
    crate::metrics::scalar(data, field, key)
}
