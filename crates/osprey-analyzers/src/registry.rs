use crate::fetch::PageFetcher;
use crate::units::{
    AccessibilityUnit, AdvertisingUnit, AnalyticsUnit, CompetitorComparisonUnit,
    CompetitorKeywordsUnit, CompetitorsUnit, ContentUnit, ConversionUnit, EmailUnit,
    KeywordsUnit, LinksUnit, LocalPresenceUnit, MobileUnit, PerformanceUnit, SecurityUnit,
    SeoUnit, SiteStructureUnit, SocialUnit, TechnologyUnit, TrafficUnit, TrustSignalsUnit,
};
use osprey_core::analyzer::Registry;
use std::sync::Arc;

/// The production unit set: nineteen independent units and the two units
/// that consume discovered competitors. All share one HTTP client.
pub fn registry(fetcher: Arc<PageFetcher>, max_competitors: usize) -> Registry {
    Registry {
        independent: vec![
            Arc::new(PerformanceUnit::new(Arc::clone(&fetcher))),
            Arc::new(SeoUnit::new(Arc::clone(&fetcher))),
            Arc::new(KeywordsUnit::new(Arc::clone(&fetcher))),
            Arc::new(SiteStructureUnit::new(Arc::clone(&fetcher))),
            Arc::new(MobileUnit::new(Arc::clone(&fetcher))),
            Arc::new(SecurityUnit::new(Arc::clone(&fetcher))),
            Arc::new(ContentUnit::new(Arc::clone(&fetcher))),
            Arc::new(AccessibilityUnit::new(Arc::clone(&fetcher))),
            Arc::new(ConversionUnit::new(Arc::clone(&fetcher))),
            Arc::new(TrustSignalsUnit::new(Arc::clone(&fetcher))),
            Arc::new(SocialUnit::new(Arc::clone(&fetcher))),
            Arc::new(TechnologyUnit::new(Arc::clone(&fetcher))),
            Arc::new(AnalyticsUnit::new(Arc::clone(&fetcher))),
            Arc::new(TrafficUnit::new(Arc::clone(&fetcher))),
            Arc::new(LinksUnit::new(Arc::clone(&fetcher))),
            Arc::new(LocalPresenceUnit::new(Arc::clone(&fetcher))),
            Arc::new(EmailUnit::new(Arc::clone(&fetcher))),
            Arc::new(AdvertisingUnit::new(Arc::clone(&fetcher))),
            Arc::new(CompetitorsUnit::new(Arc::clone(&fetcher), max_competitors)),
        ],
        dependent: vec![
            Arc::new(CompetitorComparisonUnit::new(Arc::clone(&fetcher))),
            Arc::new(CompetitorKeywordsUnit::new(fetcher)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osprey_core::outcome::AnalyzerKey;
    use std::time::Duration;

    #[test]
    fn test_registry_covers_every_key() {
        let fetcher = Arc::new(PageFetcher::new(Duration::from_secs(10)).unwrap());
        let registry = registry(fetcher, 3);

        let mut registered = registry.keys();
        registered.sort();
        let mut expected: Vec<_> = AnalyzerKey::all().collect();
        expected.sort();
        assert_eq!(registered, expected);
    }

    #[test]
    fn test_registry_phase_split() {
        let fetcher = Arc::new(PageFetcher::new(Duration::from_secs(10)).unwrap());
        let registry = registry(fetcher, 3);
        assert_eq!(registry.independent.len(), AnalyzerKey::PHASE_ONE.len());
        assert_eq!(registry.dependent.len(), AnalyzerKey::PHASE_TWO.len());
    }
}
