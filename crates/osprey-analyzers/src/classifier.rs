use crate::fetch::PageFetcher;
use crate::units::visible_text;
use async_trait::async_trait;
use osprey_core::Target;
use osprey_core::analyzer::{Classifier, UnitError};
use osprey_core::benchmarks::Industry;
use osprey_core::cache::TtlCache;
use std::sync::Arc;
use std::time::Duration;

const CLASSIFICATION_TTL: Duration = Duration::from_secs(60 * 60);

/// Classifies a target into an industry by keyword scoring over the
/// homepage copy. Results are cached per target; callers treat any failure
/// as soft and fall back to `Industry::Unknown`.
pub struct IndustryClassifier {
    fetcher: Arc<PageFetcher>,
    cache: TtlCache<Target, Industry>,
}

impl IndustryClassifier {
    pub fn new(fetcher: Arc<PageFetcher>) -> Self {
        Self {
            fetcher,
            cache: TtlCache::new(),
        }
    }

    /// Pure classification over page text.
    pub fn classify_text(text: &str) -> Industry {
        let lower = text.to_lowercase();
        let score = |needles: &[&str]| -> usize {
            needles.iter().map(|n| lower.matches(n).count()).sum()
        };

        let candidates = [
            (
                Industry::Ecommerce,
                score(&["add to cart", "checkout", "free shipping", "shop now", "our products"]),
            ),
            (
                Industry::Saas,
                score(&["free trial", "pricing", "api", "dashboard", "integrations"]),
            ),
            (
                Industry::Media,
                score(&["breaking news", "latest news", "editorial", "subscribe to read", "articles"]),
            ),
            (
                Industry::Finance,
                score(&["banking", "loans", "interest rate", "investment", "insurance"]),
            ),
            (
                Industry::Healthcare,
                score(&["patients", "clinic", "appointment", "medical", "doctors"]),
            ),
            (
                Industry::Education,
                score(&["courses", "students", "curriculum", "enroll", "tuition"]),
            ),
            (
                Industry::LocalServices,
                score(&["call us today", "free estimate", "our service area", "licensed and insured"]),
            ),
        ];

        candidates
            .into_iter()
            .filter(|(_, score)| *score >= 2)
            .max_by_key(|(_, score)| *score)
            .map(|(industry, _)| industry)
            .unwrap_or(Industry::Unknown)
    }
}

#[async_trait]
impl Classifier for IndustryClassifier {
    async fn classify(&self, target: &Target) -> Result<Industry, UnitError> {
        if let Some(cached) = self.cache.get(target) {
            tracing::debug!("Industry for {} served from cache", target);
            return Ok(cached);
        }

        let page = self
            .fetcher
            .fetch(target)
            .await
            .map_err(UnitError::connection)?;
        let industry = Self::classify_text(&visible_text(&page.body));
        tracing::info!("Classified {} as {}", target, industry);

        self.cache
            .insert(target.clone(), industry, CLASSIFICATION_TTL);
        Ok(industry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_text_picks_dominant_vertical() {
        let text = "Shop now for deals. Add to cart. Free shipping on orders. Checkout securely.";
        assert_eq!(
            IndustryClassifier::classify_text(text),
            Industry::Ecommerce
        );
    }

    #[test]
    fn test_classify_text_requires_enough_signal() {
        assert_eq!(
            IndustryClassifier::classify_text("a page about nothing in particular"),
            Industry::Unknown
        );
        // a single weak hit is not enough
        assert_eq!(
            IndustryClassifier::classify_text("see our pricing"),
            Industry::Unknown
        );
    }

    #[test]
    fn test_classify_text_saas() {
        let text = "Start your free trial. Explore the API and integrations. Simple pricing.";
        assert_eq!(IndustryClassifier::classify_text(text), Industry::Saas);
    }
}
