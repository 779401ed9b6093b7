use crate::benchmarks::Industry;
use crate::outcome::AuditResults;
use crate::report::{Issue, QuickWin, Recommendation};
use crate::{Error, Result, Target};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of an audit record. `Analyzing` is the only non-terminal state;
/// terminal states are never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Analyzing,
    Completed,
    Partial,
    Failed,
}

impl AuditStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuditStatus::Analyzing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Analyzing => "analyzing",
            AuditStatus::Completed => "completed",
            AuditStatus::Partial => "partial",
            AuditStatus::Failed => "failed",
        }
    }
}

/// The persisted audit record. Mutated only by the orchestrator that owns
/// the run; the store applies last-write-wins on top of the status machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    pub id: String,
    pub target: Target,
    pub industry: Industry,
    pub status: AuditStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub results: AuditResults,
    pub issues: Vec<Issue>,
    pub quick_wins: Vec<QuickWin>,
    pub recommendations: Vec<Recommendation>,
    /// Per-category scores in 0..=100, keyed by analyzer key string.
    pub scores: BTreeMap<String, f64>,
}

impl Audit {
    pub fn new(id: String, target: Target) -> Self {
        Self {
            id,
            target,
            industry: Industry::Unknown,
            status: AuditStatus::Analyzing,
            started_at: Utc::now(),
            completed_at: None,
            results: AuditResults::default(),
            issues: Vec::new(),
            quick_wins: Vec::new(),
            recommendations: Vec::new(),
            scores: BTreeMap::new(),
        }
    }

    /// Move to `status`, enforcing the state machine: only
    /// `Analyzing -> {Completed, Partial, Failed}` is legal.
    pub fn transition(&mut self, status: AuditStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        if status.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        tracing::debug!("Audit {} -> {}", self.id, status.as_str());
        self.status = status;
        Ok(())
    }
}

/// Persistence seam for audit records. A dumb key-value mutation target:
/// no transactions, last-write-wins on the single owning run.
pub trait AuditStore: Send + Sync {
    fn create(&self, target: &Target) -> Audit;
    fn save(&self, audit: &Audit) -> Result<()>;
    fn get(&self, id: &str) -> Option<Audit>;
}

/// In-process store.
pub struct MemoryStore {
    records: Mutex<HashMap<String, Audit>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for MemoryStore {
    fn create(&self, target: &Target) -> Audit {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        let audit = Audit::new(format!("audit-{seq}"), target.clone());
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.insert(audit.id.clone(), audit.clone());
        audit
    }

    fn save(&self, audit: &Audit) -> Result<()> {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let existing = records
            .get(&audit.id)
            .ok_or_else(|| Error::AuditNotFound(audit.id.clone()))?;
        // A stored terminal record never changes status again.
        if existing.status.is_terminal() && existing.status != audit.status {
            return Err(Error::InvalidTransition {
                from: existing.status.as_str().to_string(),
                to: audit.status.as_str().to_string(),
            });
        }
        records.insert(audit.id.clone(), audit.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Option<Audit> {
        let records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.get(id).cloned()
    }
}
