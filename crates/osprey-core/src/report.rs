use crate::outcome::AnalyzerKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level, shared by issues (as `severity`) and recommendations
/// (as `priority`). Rank sorts critical first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Structured fix effort. Quick-win classification is a numeric threshold,
/// not a string match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "lowercase")]
pub enum Effort {
    Minutes(u32),
    Hours(u32),
    Days(u32),
}

impl Effort {
    pub fn as_minutes(&self) -> u64 {
        match self {
            Effort::Minutes(m) => *m as u64,
            Effort::Hours(h) => *h as u64 * 60,
            Effort::Days(d) => *d as u64 * 60 * 24,
        }
    }

    /// A fix taking no more than one day qualifies as a quick win.
    pub fn is_quick(&self) -> bool {
        self.as_minutes() <= 24 * 60
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effort::Minutes(1) => write!(f, "1 minute"),
            Effort::Minutes(m) => write!(f, "{} minutes", m),
            Effort::Hours(1) => write!(f, "1 hour"),
            Effort::Hours(h) => write!(f, "{} hours", h),
            Effort::Days(1) => write!(f, "1 day"),
            Effort::Days(d) => write!(f, "{} days", d),
        }
    }
}

/// A benchmark breach surfaced by the metrics calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub category: AnalyzerKey,
    pub severity: Severity,
    pub title: String,
    /// Human-readable current state ("page speed 38").
    pub current: String,
    /// Human-readable target state ("industry median 60").
    pub target: String,
    /// 0..=100.
    pub impact_score: f64,
    pub effort: Effort,
}

/// A low-effort issue worth surfacing separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickWin {
    pub category: AnalyzerKey,
    pub title: String,
    pub action: String,
    pub impact_score: f64,
    pub effort: Effort,
}

/// An action produced by the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Severity,
    pub category: AnalyzerKey,
    pub issue: String,
    pub impact: String,
    pub action: String,
    pub effort: Effort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_orders_critical_first() {
        assert!(Severity::Critical.rank() < Severity::High.rank());
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
    }

    #[test]
    fn test_effort_as_minutes() {
        assert_eq!(Effort::Minutes(30).as_minutes(), 30);
        assert_eq!(Effort::Hours(2).as_minutes(), 120);
        assert_eq!(Effort::Days(3).as_minutes(), 3 * 24 * 60);
    }

    #[test]
    fn test_quick_win_threshold_is_one_day() {
        assert!(Effort::Minutes(15).is_quick());
        assert!(Effort::Hours(8).is_quick());
        assert!(Effort::Days(1).is_quick());
        assert!(!Effort::Days(2).is_quick());
    }

    #[test]
    fn test_effort_display() {
        assert_eq!(Effort::Minutes(30).to_string(), "30 minutes");
        assert_eq!(Effort::Hours(1).to_string(), "1 hour");
        assert_eq!(Effort::Days(2).to_string(), "2 days");
    }
}
