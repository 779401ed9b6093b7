use crate::config::EngineConfig;
use crate::{Result, metrics, recommend};
use osprey_core::Target;
use osprey_core::analyzer::{Classifier, Registry};
use osprey_core::audit::{Audit, AuditStatus, AuditStore};
use osprey_core::benchmarks::{BenchmarkTable, Industry};
use osprey_core::cache::ResultCache;
use osprey_core::outcome::{AnalyzerKey, AnalyzerOutcome, AuditResults};
use osprey_core::progress::{ProgressSink, ProgressTracker};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Analyzer work fills progress up to here; synthesis takes the rest.
const UNIT_SPAN: u8 = 90;

type UnitTask = (AnalyzerKey, AnalyzerOutcome);

/// Drives one audit run: two fan-out phases under a single wall-clock
/// budget, per-unit failure isolation, read-through caching, ordered
/// progress, and the final scoring pipeline.
///
/// A deadline breach yields a successful `Partial` audit; callers inspect
/// `Audit::status`, they do not catch timeouts. Only a synthesis failure
/// returns an error (and leaves the audit marked `Failed`).
pub struct Orchestrator {
    registry: Arc<Registry>,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn AuditStore>,
    cache: Arc<ResultCache>,
    benchmarks: Arc<BenchmarkTable>,
    config: EngineConfig,
}

struct RunState<'a> {
    outcomes: BTreeMap<AnalyzerKey, AnalyzerOutcome>,
    completed: usize,
    total: usize,
    tracker: ProgressTracker<'a>,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<Registry>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn AuditStore>,
        cache: Arc<ResultCache>,
        benchmarks: Arc<BenchmarkTable>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            classifier,
            store,
            cache,
            benchmarks,
            config,
        }
    }

    pub async fn run(&self, raw_target: &str, sink: &dyn ProgressSink) -> Result<Audit> {
        let target = Target::parse(raw_target)?;
        let mut audit = self.store.create(&target);
        tracing::info!("Audit {} started for {}", audit.id, target);

        let deadline_at = Instant::now() + self.config.budget;
        let mut state = RunState {
            outcomes: BTreeMap::new(),
            completed: 0,
            total: self.registry.len(),
            tracker: ProgressTracker::new(sink),
        };
        state
            .tracker
            .emit("analyzing", format!("Auditing {target}"), 0);

        // Classification is soft: an unreachable or ambiguous site is
        // benchmarked as unknown, never failed.
        let industry = match self.classifier.classify(&target).await {
            Ok(industry) => industry,
            Err(e) => {
                tracing::warn!("Classifier failed for {}: {}", target, e);
                Industry::Unknown
            }
        };
        audit.industry = industry;

        // Phase 1: every independent unit, launched together.
        let mut set: JoinSet<UnitTask> = JoinSet::new();
        for unit in &self.registry.independent {
            let key = unit.key();
            if let Some(hit) = self.cache.get(&(key, target.clone())) {
                tracing::debug!("{} served from cache for {}", key, target);
                self.record(&mut state, key, hit, false, &target);
                continue;
            }
            let unit = Arc::clone(unit);
            let unit_target = target.clone();
            set.spawn(async move {
                let outcome = match unit.analyze(&unit_target).await {
                    Ok(data) => AnalyzerOutcome::Ok(data),
                    Err(e) => {
                        tracing::warn!("{} failed for {}: {}", key, unit_target, e);
                        AnalyzerOutcome::Err(e.to_string())
                    }
                };
                (key, outcome)
            });
        }
        let mut timed_out = self.drain(&mut set, deadline_at, &target, &mut state).await;

        // Phase 2: units that need the discovered competitors. Skipped
        // entirely once the budget is gone; their keys resolve to timeout.
        if !timed_out && !self.registry.dependent.is_empty() {
            let peers = self.peer_targets(&state.outcomes);
            if peers.is_empty() {
                tracing::debug!("No competitors discovered; skipping dependent units");
                for unit in &self.registry.dependent {
                    self.record(
                        &mut state,
                        unit.key(),
                        AnalyzerOutcome::Err(AuditResults::NOT_RUN.to_string()),
                        false,
                        &target,
                    );
                }
            } else {
                tracing::info!("Phase 2 with {} competitor(s)", peers.len());
                let mut set: JoinSet<UnitTask> = JoinSet::new();
                for unit in &self.registry.dependent {
                    let key = unit.key();
                    if let Some(hit) = self.cache.get(&(key, target.clone())) {
                        tracing::debug!("{} served from cache for {}", key, target);
                        self.record(&mut state, key, hit, false, &target);
                        continue;
                    }
                    let unit = Arc::clone(unit);
                    let unit_target = target.clone();
                    let peers = peers.clone();
                    set.spawn(async move {
                        let outcome = match unit.analyze(&unit_target, &peers).await {
                            Ok(data) => AnalyzerOutcome::Ok(data),
                            Err(e) => {
                                tracing::warn!("{} failed for {}: {}", key, unit_target, e);
                                AnalyzerOutcome::Err(e.to_string())
                            }
                        };
                        (key, outcome)
                    });
                }
                timed_out = self.drain(&mut set, deadline_at, &target, &mut state).await;
            }
        }

        audit.results =
            AuditResults::complete(std::mem::take(&mut state.outcomes), self.registry.keys());
        state
            .tracker
            .emit("synthesizing", "Scoring against benchmarks", 92);

        // Synthesis is fatal on failure: nothing derived from malformed
        // results is kept, and the caller must retry the whole run.
        let synthesized = metrics::calculate(&audit.results, industry, &self.benchmarks)
            .and_then(|report| {
                recommend::recommend(&audit.results).map(|recs| (report, recs))
            });
        let (report, recommendations) = match synthesized {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Synthesis failed for audit {}: {}", audit.id, e);
                audit.transition(AuditStatus::Failed)?;
                self.store.save(&audit)?;
                return Err(e);
            }
        };
        audit.issues = report.issues;
        audit.quick_wins = report.quick_wins;
        audit.scores = report.scores;
        audit.recommendations = recommendations;

        if timed_out {
            audit.transition(AuditStatus::Partial)?;
            self.store.save(&audit)?;
            tracing::warn!(
                "Audit {} partial: {}/{} units finished in time",
                audit.id,
                state.completed,
                state.total
            );
        } else {
            audit.transition(AuditStatus::Completed)?;
            self.store.save(&audit)?;
            state
                .tracker
                .emit("completed", format!("Audit of {target} complete"), 100);
            tracing::info!("Audit {} completed", audit.id);
        }
        Ok(audit)
    }

    /// Fan-in: collect outcomes until the set is empty or the deadline
    /// fires. On expiry every outstanding task is aborted; nothing keeps
    /// running behind the caller's back.
    async fn drain(
        &self,
        set: &mut JoinSet<UnitTask>,
        deadline_at: Instant,
        target: &Target,
        state: &mut RunState<'_>,
    ) -> bool {
        while !set.is_empty() {
            let remaining = deadline_at.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.abort_outstanding(set).await;
                return true;
            }
            match timeout(remaining, set.join_next()).await {
                Ok(Some(Ok((key, outcome)))) => {
                    self.record(state, key, outcome, true, target);
                }
                Ok(Some(Err(join_error))) => {
                    // A panicked unit is isolated to its own key, which is
                    // filled as a timeout when results are completed.
                    tracing::error!("Analyzer task aborted: {}", join_error);
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        "Deadline exceeded with {} unit(s) outstanding",
                        set.len()
                    );
                    self.abort_outstanding(set).await;
                    return true;
                }
            }
        }
        false
    }

    async fn abort_outstanding(&self, set: &mut JoinSet<UnitTask>) {
        set.abort_all();
        while set.join_next().await.is_some() {}
    }

    fn record(
        &self,
        state: &mut RunState<'_>,
        key: AnalyzerKey,
        outcome: AnalyzerOutcome,
        cacheable: bool,
        target: &Target,
    ) {
        // Only fresh successes are cached; failures retry on the next run.
        if cacheable && outcome.is_ok() {
            self.cache.insert(
                (key, target.clone()),
                outcome.clone(),
                self.config.cache_ttl,
            );
        }
        state.outcomes.insert(key, outcome);
        state.completed += 1;
        let percent = ProgressTracker::unit_percent(state.completed, state.total, UNIT_SPAN);
        state.tracker.emit(
            "analyzing",
            format!("{} finished ({}/{})", key, state.completed, state.total),
            percent,
        );
    }

    /// Competitor domains discovered in phase 1, parsed and capped.
    fn peer_targets(&self, outcomes: &BTreeMap<AnalyzerKey, AnalyzerOutcome>) -> Vec<Target> {
        let Some(AnalyzerOutcome::Ok(data)) = outcomes.get(&AnalyzerKey::Competitors) else {
            return Vec::new();
        };
        let Some(Value::Array(domains)) = data.get("domains") else {
            return Vec::new();
        };
        domains
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(|s| Target::parse(s).ok())
            .take(self.config.max_competitors)
            .collect()
    }
}
