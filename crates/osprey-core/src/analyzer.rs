use crate::Target;
use crate::benchmarks::Industry;
use crate::outcome::{AnalyzerData, AnalyzerKey};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure of a single analyzer unit. The orchestrator recovers these
/// locally: the message becomes `AnalyzerOutcome::Err`, siblings keep
/// running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct UnitError {
    pub message: String,
}

impl UnitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn connection(detail: impl fmt::Display) -> Self {
        Self::new(format!("ConnectionError: {detail}"))
    }
}

pub type UnitResult = std::result::Result<AnalyzerData, UnitError>;

/// One independent, I/O-bound analysis task against a target.
///
/// Units are pure with respect to orchestration: they never know about
/// sibling units, the cache, or the deadline. Ordinary parse problems are
/// handled internally (best-effort partial maps); a returned error means the
/// unit could not produce anything usable.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn key(&self) -> AnalyzerKey;
    async fn analyze(&self, target: &Target) -> UnitResult;
}

/// A unit that consumes related targets discovered in phase one
/// (e.g. comparing traffic against named competitors).
#[async_trait]
pub trait DependentAnalyzer: Send + Sync {
    fn key(&self) -> AnalyzerKey;
    async fn analyze(&self, target: &Target, peers: &[Target]) -> UnitResult;
}

/// Classifies a target into an industry for benchmark selection. Callers
/// treat failure as soft and fall back to `Industry::Unknown`.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, target: &Target) -> std::result::Result<Industry, UnitError>;
}

/// The unit set registered for a run: phase-one units plus the units that
/// depend on phase-one output.
pub struct Registry {
    pub independent: Vec<Arc<dyn Analyzer>>,
    pub dependent: Vec<Arc<dyn DependentAnalyzer>>,
}

impl Registry {
    /// Every registered key, phase one first. The aggregated result's key
    /// set must equal this after a run.
    pub fn keys(&self) -> Vec<AnalyzerKey> {
        self.independent
            .iter()
            .map(|u| u.key())
            .chain(self.dependent.iter().map(|u| u.key()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.independent.len() + self.dependent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.independent.is_empty() && self.dependent.is_empty()
    }
}
