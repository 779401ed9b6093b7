use crate::{Error, Result};
use osprey_core::benchmarks::{BenchmarkTable, Industry, Percentiles};
use osprey_core::outcome::{AnalyzerData, AnalyzerKey, AuditResults};
use osprey_core::report::{Effort, Issue, QuickWin, Severity};
use serde_json::Value;
use std::collections::BTreeMap;

const MAX_ISSUES: usize = 10;
const MAX_QUICK_WINS: usize = 5;

/// Scored domain, the benchmark row it is held against, its display label,
/// and the typical effort to fix a breach.
const SCORED_DOMAINS: [(AnalyzerKey, &str, &str, Effort); 7] = [
    (AnalyzerKey::Performance, "page-speed", "Page speed", Effort::Days(2)),
    (AnalyzerKey::Seo, "seo-score", "SEO hygiene", Effort::Hours(4)),
    (AnalyzerKey::Mobile, "mobile-score", "Mobile experience", Effort::Days(2)),
    (AnalyzerKey::Security, "security-score", "Transport security", Effort::Hours(3)),
    (
        AnalyzerKey::Accessibility,
        "accessibility-score",
        "Accessibility",
        Effort::Hours(6),
    ),
    (
        AnalyzerKey::Conversion,
        "conversion-score",
        "Conversion surface",
        Effort::Days(2),
    ),
    (AnalyzerKey::Content, "content-score", "Content depth", Effort::Days(3)),
];

/// Output of the scoring pass.
#[derive(Debug, Clone, Default)]
pub struct MetricsReport {
    pub issues: Vec<Issue>,
    pub quick_wins: Vec<QuickWin>,
    pub scores: BTreeMap<String, f64>,
}

/// Derive issues and quick wins from the aggregated results.
///
/// Pure and deterministic. Missing or failed sub-maps are skipped; absence
/// of data never synthesizes an issue. A sub-map whose `score` field exists
/// but is not a finite number is a contract violation and fails the whole
/// synthesis stage.
pub fn calculate(
    results: &AuditResults,
    industry: Industry,
    benchmarks: &BenchmarkTable,
) -> Result<MetricsReport> {
    let mut report = MetricsReport::default();

    for (key, metric, label, effort) in SCORED_DOMAINS {
        let Some(data) = results.data(key) else {
            continue;
        };
        let Some(score) = scalar(data, "score", key)? else {
            continue;
        };
        report.scores.insert(key.as_str().to_string(), score);

        // No benchmark row means no threshold available, not a zero target.
        let Some(bench) = benchmarks.lookup(industry, metric) else {
            continue;
        };
        if score >= bench.p50 {
            continue;
        }

        let impact = impact_score(score, bench);
        let severity = severity_for(impact);
        let issue = Issue {
            category: key,
            severity,
            title: format!("{label} below industry median"),
            current: format!("score {score:.0}"),
            target: format!("industry median {:.0}", bench.p50),
            impact_score: impact,
            effort,
        };
        if effort.is_quick() {
            report.quick_wins.push(QuickWin {
                category: key,
                title: issue.title.clone(),
                action: format!("Raise {label} to at least the industry median"),
                impact_score: impact,
                effort,
            });
        }
        report.issues.push(issue);
    }

    if !report.scores.is_empty() {
        let overall = report.scores.values().sum::<f64>() / report.scores.len() as f64;
        report.scores.insert("overall".to_string(), overall);
    }

    report
        .issues
        .sort_by(|a, b| b.impact_score.total_cmp(&a.impact_score));
    report.issues.truncate(MAX_ISSUES);
    report
        .quick_wins
        .sort_by(|a, b| b.impact_score.total_cmp(&a.impact_score));
    report.quick_wins.truncate(MAX_QUICK_WINS);

    Ok(report)
}

/// Impact of the gap to the median, scaled by the industry spread.
fn impact_score(score: f64, bench: &Percentiles) -> f64 {
    let spread = (bench.p90 - bench.p25).max(1.0);
    (((bench.p50 - score) / spread) * 100.0).clamp(5.0, 100.0)
}

/// Severity bands follow impact, so impact-descending order is also
/// priority-rank order.
fn severity_for(impact: f64) -> Severity {
    if impact >= 75.0 {
        Severity::Critical
    } else if impact >= 50.0 {
        Severity::High
    } else if impact >= 25.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Numeric field accessor. Absent fields are skippable; present but
/// non-numeric fields break the unit's contract.
pub(crate) fn scalar(data: &AnalyzerData, field: &str, key: AnalyzerKey) -> Result<Option<f64>> {
    match data.get(field) {
        None => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(Error::Synthesis(format!(
                "{key} field '{field}' is not a finite number"
            ))),
        },
        Some(other) => Err(Error::Synthesis(format!(
            "{key} field '{field}' is not numeric: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn results_with_scores(scores: &[(AnalyzerKey, f64)]) -> AuditResults {
        let mut map = BTreeMap::new();
        for (key, score) in scores {
            let mut data = AnalyzerData::new();
            data.insert("score".to_string(), json!(score));
            map.insert(*key, osprey_core::outcome::AnalyzerOutcome::Ok(data));
        }
        AuditResults(map)
    }

    #[test]
    fn test_low_score_emits_issue() {
        let results = results_with_scores(&[(AnalyzerKey::Performance, 20.0)]);
        let report =
            calculate(&results, Industry::Saas, &BenchmarkTable::builtin()).unwrap();

        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.category, AnalyzerKey::Performance);
        assert!(issue.impact_score > 0.0 && issue.impact_score <= 100.0);
    }

    #[test]
    fn test_score_above_median_emits_nothing() {
        let results = results_with_scores(&[(AnalyzerKey::Performance, 95.0)]);
        let report =
            calculate(&results, Industry::Saas, &BenchmarkTable::builtin()).unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(report.scores.get("performance"), Some(&95.0));
    }

    #[test]
    fn test_unknown_industry_without_benchmark_row_is_skipped() {
        // Scenario: no (unknown, page-speed) row exists. No issue, no error.
        let results = results_with_scores(&[(AnalyzerKey::Performance, 10.0)]);
        let report =
            calculate(&results, Industry::Unknown, &BenchmarkTable::builtin()).unwrap();
        assert!(report.issues.is_empty());
        // the score itself is still reported
        assert_eq!(report.scores.get("performance"), Some(&10.0));
    }

    #[test]
    fn test_failed_submap_is_skipped_not_zero() {
        let mut map = BTreeMap::new();
        map.insert(
            AnalyzerKey::Performance,
            osprey_core::outcome::AnalyzerOutcome::Err("timeout".to_string()),
        );
        let report = calculate(
            &AuditResults(map),
            Industry::Saas,
            &BenchmarkTable::builtin(),
        )
        .unwrap();
        assert!(report.issues.is_empty());
        assert!(report.scores.is_empty());
    }

    #[test]
    fn test_non_numeric_score_is_fatal() {
        let mut data = AnalyzerData::new();
        data.insert("score".to_string(), json!("fast"));
        let mut map = BTreeMap::new();
        map.insert(
            AnalyzerKey::Performance,
            osprey_core::outcome::AnalyzerOutcome::Ok(data),
        );
        let result = calculate(
            &AuditResults(map),
            Industry::Saas,
            &BenchmarkTable::builtin(),
        );
        assert!(matches!(result, Err(Error::Synthesis(_))));
    }

    #[test]
    fn test_issues_sorted_by_impact_and_rank() {
        let results = results_with_scores(&[
            (AnalyzerKey::Performance, 10.0),
            (AnalyzerKey::Seo, 55.0),
            (AnalyzerKey::Mobile, 30.0),
        ]);
        let report =
            calculate(&results, Industry::Saas, &BenchmarkTable::builtin()).unwrap();

        for pair in report.issues.windows(2) {
            assert!(pair[0].impact_score >= pair[1].impact_score);
            assert!(pair[0].severity.rank() <= pair[1].severity.rank());
        }
    }

    #[test]
    fn test_truncation_limits() {
        let results = results_with_scores(
            &SCORED_DOMAINS
                .iter()
                .map(|(key, _, _, _)| (*key, 5.0))
                .collect::<Vec<_>>(),
        );
        let report =
            calculate(&results, Industry::Saas, &BenchmarkTable::builtin()).unwrap();
        assert!(report.issues.len() <= MAX_ISSUES);
        assert!(report.quick_wins.len() <= MAX_QUICK_WINS);
        assert!(!report.quick_wins.is_empty());
        for win in &report.quick_wins {
            assert!(win.effort.is_quick());
        }
    }

    #[test]
    fn test_overall_score_is_mean() {
        let results = results_with_scores(&[
            (AnalyzerKey::Performance, 80.0),
            (AnalyzerKey::Seo, 60.0),
        ]);
        let report =
            calculate(&results, Industry::Saas, &BenchmarkTable::builtin()).unwrap();
        assert_eq!(report.scores.get("overall"), Some(&70.0));
    }
}
