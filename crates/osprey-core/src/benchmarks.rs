use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Industry tag attached to a run for benchmark selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    Saas,
    Ecommerce,
    Media,
    Finance,
    Healthcare,
    Education,
    LocalServices,
    Unknown,
}

impl Industry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Saas => "saas",
            Industry::Ecommerce => "ecommerce",
            Industry::Media => "media",
            Industry::Finance => "finance",
            Industry::Healthcare => "healthcare",
            Industry::Education => "education",
            Industry::LocalServices => "local-services",
            Industry::Unknown => "unknown",
        }
    }

    pub fn all() -> [Industry; 8] {
        [
            Industry::Saas,
            Industry::Ecommerce,
            Industry::Media,
            Industry::Finance,
            Industry::Healthcare,
            Industry::Education,
            Industry::LocalServices,
            Industry::Unknown,
        ]
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Percentile thresholds for one `(industry, metric)` row. Higher is better
/// for every benchmarked metric; analyzers that measure "lower is better"
/// quantities invert before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Benchmark rows keyed by `(industry, metric)`.
///
/// A missing row means "no threshold available" and must never be read as
/// zero.
pub struct BenchmarkTable {
    rows: HashMap<(Industry, &'static str), Percentiles>,
}

impl BenchmarkTable {
    pub fn lookup<'a>(&'a self, industry: Industry, metric: &'a str) -> Option<&'a Percentiles> {
        self.rows.get(&(industry, metric))
    }

    pub fn metrics_for(&self, industry: Industry) -> Vec<(&'static str, Percentiles)> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|((ind, _), _)| *ind == industry)
            .map(|((_, metric), p)| (*metric, *p))
            .collect();
        rows.sort_by_key(|(metric, _)| *metric);
        rows
    }

    /// Built-in table. Industries without a row for a metric intentionally
    /// have none; `Unknown` in particular carries no `page-speed` row so an
    /// unclassified site is never penalized on thresholds we cannot justify.
    pub fn builtin() -> Self {
        let mut rows = HashMap::new();

        let mut row = |industry: Industry, metric: &'static str, p25, p50, p75, p90| {
            rows.insert((industry, metric), Percentiles { p25, p50, p75, p90 });
        };

        for industry in [
            Industry::Saas,
            Industry::Ecommerce,
            Industry::Media,
            Industry::Finance,
            Industry::Healthcare,
            Industry::Education,
            Industry::LocalServices,
        ] {
            row(industry, "page-speed", 45.0, 60.0, 75.0, 88.0);
            row(industry, "seo-score", 50.0, 65.0, 78.0, 90.0);
            row(industry, "mobile-score", 48.0, 62.0, 76.0, 89.0);
            row(industry, "security-score", 40.0, 58.0, 74.0, 90.0);
            row(industry, "accessibility-score", 42.0, 55.0, 70.0, 85.0);
        }

        // Conversion expectations differ enough per vertical to specialize.
        row(Industry::Saas, "conversion-score", 55.0, 68.0, 80.0, 91.0);
        row(Industry::Ecommerce, "conversion-score", 60.0, 72.0, 84.0, 93.0);
        row(Industry::Finance, "conversion-score", 50.0, 64.0, 77.0, 88.0);
        row(Industry::LocalServices, "conversion-score", 45.0, 60.0, 73.0, 86.0);

        // Content depth matters most where content is the product.
        row(Industry::Media, "content-score", 60.0, 72.0, 83.0, 92.0);
        row(Industry::Education, "content-score", 55.0, 68.0, 80.0, 90.0);
        row(Industry::Saas, "content-score", 48.0, 62.0, 75.0, 87.0);

        Self { rows }
    }
}
