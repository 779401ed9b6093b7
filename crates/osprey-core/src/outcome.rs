use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Payload produced by a single analyzer unit.
pub type AnalyzerData = BTreeMap<String, Value>;

/// Identifier for every registered analyzer unit.
///
/// Stable across runs; the join key for results, cache entries, and
/// telemetry. Phase-two units depend on phase-one output and are listed
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerKey {
    Performance,
    Seo,
    Keywords,
    SiteStructure,
    Mobile,
    Security,
    Content,
    Accessibility,
    Conversion,
    TrustSignals,
    Social,
    Technology,
    Analytics,
    Traffic,
    Links,
    LocalPresence,
    Email,
    Advertising,
    Competitors,
    CompetitorComparison,
    CompetitorKeywords,
}

impl AnalyzerKey {
    /// Units with no dependency on any other unit's output.
    pub const PHASE_ONE: [AnalyzerKey; 19] = [
        AnalyzerKey::Performance,
        AnalyzerKey::Seo,
        AnalyzerKey::Keywords,
        AnalyzerKey::SiteStructure,
        AnalyzerKey::Mobile,
        AnalyzerKey::Security,
        AnalyzerKey::Content,
        AnalyzerKey::Accessibility,
        AnalyzerKey::Conversion,
        AnalyzerKey::TrustSignals,
        AnalyzerKey::Social,
        AnalyzerKey::Technology,
        AnalyzerKey::Analytics,
        AnalyzerKey::Traffic,
        AnalyzerKey::Links,
        AnalyzerKey::LocalPresence,
        AnalyzerKey::Email,
        AnalyzerKey::Advertising,
        AnalyzerKey::Competitors,
    ];

    /// Units that consume competitor domains discovered in phase one.
    pub const PHASE_TWO: [AnalyzerKey; 2] = [
        AnalyzerKey::CompetitorComparison,
        AnalyzerKey::CompetitorKeywords,
    ];

    pub fn all() -> impl Iterator<Item = AnalyzerKey> {
        Self::PHASE_ONE.into_iter().chain(Self::PHASE_TWO)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKey::Performance => "performance",
            AnalyzerKey::Seo => "seo",
            AnalyzerKey::Keywords => "keywords",
            AnalyzerKey::SiteStructure => "site-structure",
            AnalyzerKey::Mobile => "mobile",
            AnalyzerKey::Security => "security",
            AnalyzerKey::Content => "content",
            AnalyzerKey::Accessibility => "accessibility",
            AnalyzerKey::Conversion => "conversion",
            AnalyzerKey::TrustSignals => "trust-signals",
            AnalyzerKey::Social => "social",
            AnalyzerKey::Technology => "technology",
            AnalyzerKey::Analytics => "analytics",
            AnalyzerKey::Traffic => "traffic",
            AnalyzerKey::Links => "links",
            AnalyzerKey::LocalPresence => "local-presence",
            AnalyzerKey::Email => "email",
            AnalyzerKey::Advertising => "advertising",
            AnalyzerKey::Competitors => "competitors",
            AnalyzerKey::CompetitorComparison => "competitor-comparison",
            AnalyzerKey::CompetitorKeywords => "competitor-keywords",
        }
    }

    pub fn from_str_key(s: &str) -> Result<Self> {
        Self::all()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for AnalyzerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit's result for one run: either its data map or a failure message.
/// Never partial or streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum AnalyzerOutcome {
    Ok(AnalyzerData),
    Err(String),
}

impl AnalyzerOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, AnalyzerOutcome::Ok(_))
    }

    pub fn data(&self) -> Option<&AnalyzerData> {
        match self {
            AnalyzerOutcome::Ok(data) => Some(data),
            AnalyzerOutcome::Err(_) => None,
        }
    }
}

/// Merged map of every registered unit's outcome for one run.
///
/// After `complete` the key set always equals the full registered set: a
/// unit that never returned is recorded as `Err("timeout")`, never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditResults(pub BTreeMap<AnalyzerKey, AnalyzerOutcome>);

impl AuditResults {
    pub const TIMEOUT: &'static str = "timeout";
    pub const NOT_RUN: &'static str = "not-run";

    /// Fill every registered key missing an outcome with `Err("timeout")`.
    pub fn complete(
        mut partial: BTreeMap<AnalyzerKey, AnalyzerOutcome>,
        registered: impl IntoIterator<Item = AnalyzerKey>,
    ) -> Self {
        for key in registered {
            partial
                .entry(key)
                .or_insert_with(|| AnalyzerOutcome::Err(Self::TIMEOUT.to_string()));
        }
        Self(partial)
    }

    pub fn get(&self, key: AnalyzerKey) -> Option<&AnalyzerOutcome> {
        self.0.get(&key)
    }

    /// Data map for a key, if that unit succeeded.
    pub fn data(&self, key: AnalyzerKey) -> Option<&AnalyzerData> {
        self.0.get(&key).and_then(|o| o.data())
    }

    pub fn succeeded(&self) -> usize {
        self.0.values().filter(|o| o.is_ok()).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnalyzerKey, &AnalyzerOutcome)> {
        self.0.iter()
    }
}
