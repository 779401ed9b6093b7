use async_trait::async_trait;
use osprey_core::Target;
use osprey_core::analyzer::{
    Analyzer, Classifier, DependentAnalyzer, Registry, UnitError, UnitResult,
};
use osprey_core::audit::{AuditStatus, AuditStore, MemoryStore};
use osprey_core::benchmarks::{BenchmarkTable, Industry};
use osprey_core::cache::ResultCache;
use osprey_core::outcome::{AnalyzerData, AnalyzerKey, AnalyzerOutcome};
use osprey_core::progress::{ChannelSink, NullSink, ProgressUpdate};
use osprey_engine::{EngineConfig, Error, Orchestrator};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct StubUnit {
    key: AnalyzerKey,
    delay: Duration,
    result: Result<AnalyzerData, String>,
    calls: Arc<AtomicUsize>,
}

impl StubUnit {
    fn ok(key: AnalyzerKey, data: AnalyzerData) -> Arc<Self> {
        Arc::new(Self {
            key,
            delay: Duration::ZERO,
            result: Ok(data),
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn slow(key: AnalyzerKey, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            key,
            delay,
            result: Ok(AnalyzerData::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn failing(key: AnalyzerKey, message: &str) -> Arc<Self> {
        Arc::new(Self {
            key,
            delay: Duration::ZERO,
            result: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Analyzer for StubUnit {
    fn key(&self) -> AnalyzerKey {
        self.key
    }

    async fn analyze(&self, _target: &Target) -> UnitResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.result {
            Ok(data) => Ok(data.clone()),
            Err(message) => Err(UnitError::connection(message)),
        }
    }
}

struct StubDependent {
    key: AnalyzerKey,
    seen_peers: Arc<Mutex<Vec<Vec<String>>>>,
    calls: Arc<AtomicUsize>,
}

impl StubDependent {
    fn new(key: AnalyzerKey) -> Arc<Self> {
        Arc::new(Self {
            key,
            seen_peers: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl DependentAnalyzer for StubDependent {
    fn key(&self) -> AnalyzerKey {
        self.key
    }

    async fn analyze(&self, _target: &Target, peers: &[Target]) -> UnitResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_peers
            .lock()
            .unwrap()
            .push(peers.iter().map(|p| p.as_str().to_string()).collect());
        let mut data = AnalyzerData::new();
        data.insert("peer_count".to_string(), json!(peers.len()));
        Ok(data)
    }
}

struct FixedClassifier(Industry);

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _target: &Target) -> Result<Industry, UnitError> {
        Ok(self.0)
    }
}

struct BrokenClassifier;

#[async_trait]
impl Classifier for BrokenClassifier {
    async fn classify(&self, _target: &Target) -> Result<Industry, UnitError> {
        Err(UnitError::connection("dns failure"))
    }
}

fn score_data(score: f64) -> AnalyzerData {
    let mut data = AnalyzerData::new();
    data.insert("score".to_string(), json!(score));
    data
}

fn domains_data(domains: &[&str]) -> AnalyzerData {
    let mut data = AnalyzerData::new();
    data.insert("domains".to_string(), json!(domains));
    data
}

/// Full stub registry: every phase-one key succeeds quickly with a healthy
/// score, competitors discovers `domains`, both dependent units record
/// their peers.
fn full_registry(domains: &[&str]) -> (Registry, Arc<StubDependent>, Arc<StubDependent>) {
    let mut independent: Vec<Arc<dyn Analyzer>> = Vec::new();
    for key in AnalyzerKey::PHASE_ONE {
        if key == AnalyzerKey::Competitors {
            independent.push(StubUnit::ok(key, domains_data(domains)));
        } else {
            independent.push(StubUnit::ok(key, score_data(82.0)));
        }
    }
    let comparison = StubDependent::new(AnalyzerKey::CompetitorComparison);
    let keywords = StubDependent::new(AnalyzerKey::CompetitorKeywords);
    let registry = Registry {
        independent,
        dependent: vec![comparison.clone(), keywords.clone()],
    };
    (registry, comparison, keywords)
}

fn orchestrator(
    registry: Registry,
    config: EngineConfig,
) -> (Orchestrator, Arc<MemoryStore>, Arc<ResultCache>) {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(ResultCache::new());
    let orchestrator = Orchestrator::new(
        Arc::new(registry),
        Arc::new(FixedClassifier(Industry::Saas)),
        store.clone(),
        cache.clone(),
        Arc::new(BenchmarkTable::builtin()),
        config,
    );
    (orchestrator, store, cache)
}

fn collect(
    mut rx: tokio::sync::mpsc::UnboundedReceiver<ProgressUpdate>,
) -> Vec<ProgressUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn scenario_a_all_units_ok_completes() {
    let (registry, _, _) = full_registry(&["rival-one.com", "rival-two.io"]);
    let (orchestrator, store, _) = orchestrator(registry, EngineConfig::default());
    let (sink, rx) = ChannelSink::new();

    let audit = orchestrator.run("https://www.example.com", &sink).await.unwrap();

    assert_eq!(audit.status, AuditStatus::Completed);
    assert_eq!(audit.target.as_str(), "example.com");
    assert_eq!(audit.results.len(), AnalyzerKey::all().count());
    assert_eq!(audit.results.succeeded(), AnalyzerKey::all().count());
    assert!(audit.issues.len() <= 10);
    assert!(audit.recommendations.len() <= 10);
    assert!(audit.completed_at.is_some());

    // The stored record matches the returned one.
    let stored = store.get(&audit.id).unwrap();
    assert_eq!(stored.status, AuditStatus::Completed);

    // Progress: ordered, monotone, 100 exactly once and last.
    let updates = collect(rx);
    assert!(!updates.is_empty());
    for pair in updates.windows(2) {
        assert!(pair[0].percent <= pair[1].percent);
    }
    assert_eq!(updates.iter().filter(|u| u.percent == 100).count(), 1);
    assert_eq!(updates.last().unwrap().percent, 100);
}

#[tokio::test]
async fn scenario_b_single_failure_is_isolated() {
    let (mut registry, _, _) = full_registry(&[]);
    registry.independent[0] =
        StubUnit::failing(AnalyzerKey::Performance, "connection refused");
    let (orchestrator, _, _) = orchestrator(registry, EngineConfig::default());

    let audit = orchestrator.run("example.com", &NullSink).await.unwrap();

    assert_eq!(audit.status, AuditStatus::Completed);
    match audit.results.get(AnalyzerKey::Performance).unwrap() {
        AnalyzerOutcome::Err(message) => {
            assert!(message.starts_with("ConnectionError:"), "got: {message}")
        }
        AnalyzerOutcome::Ok(_) => panic!("expected performance to fail"),
    }
    // Every sibling phase-one unit still succeeded.
    for key in AnalyzerKey::PHASE_ONE {
        if key == AnalyzerKey::Performance {
            continue;
        }
        assert!(
            audit.results.get(key).unwrap().is_ok(),
            "{key} should be unaffected"
        );
    }
}

#[tokio::test]
async fn scenario_c_deadline_yields_partial() {
    let mut independent: Vec<Arc<dyn Analyzer>> = Vec::new();
    for key in AnalyzerKey::PHASE_ONE {
        independent.push(StubUnit::slow(key, Duration::from_secs(30)));
    }
    let registry = Registry {
        independent,
        dependent: vec![StubDependent::new(AnalyzerKey::CompetitorComparison)],
    };
    let config = EngineConfig {
        budget: Duration::from_millis(50),
        ..EngineConfig::default()
    };
    let (orchestrator, store, _) = orchestrator(registry, config);
    let (sink, rx) = ChannelSink::new();

    let audit = orchestrator.run("example.com", &sink).await.unwrap();

    assert_eq!(audit.status, AuditStatus::Partial);
    for key in AnalyzerKey::PHASE_ONE {
        assert_eq!(
            audit.results.get(key),
            Some(&AnalyzerOutcome::Err("timeout".to_string())),
            "{key} should be a timeout"
        );
    }
    assert_eq!(
        audit.results.get(AnalyzerKey::CompetitorComparison),
        Some(&AnalyzerOutcome::Err("timeout".to_string()))
    );
    assert_eq!(store.get(&audit.id).unwrap().status, AuditStatus::Partial);

    // A partial run never reports 100.
    let updates = collect(rx);
    assert!(updates.iter().all(|u| u.percent < 100));
}

#[tokio::test]
async fn cache_skips_second_invocation_until_ttl_expires() {
    let unit = StubUnit::ok(AnalyzerKey::Performance, score_data(90.0));
    let calls = unit.calls.clone();
    let registry = Registry {
        independent: vec![unit],
        dependent: vec![],
    };
    let config = EngineConfig {
        cache_ttl: Duration::from_millis(80),
        ..EngineConfig::default()
    };
    let (orchestrator, _, _) = orchestrator(registry, config);

    orchestrator.run("example.com", &NullSink).await.unwrap();
    orchestrator.run("example.com", &NullSink).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second run should hit cache");

    tokio::time::sleep(Duration::from_millis(120)).await;
    orchestrator.run("example.com", &NullSink).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2, "expired entry should rerun");
}

#[tokio::test]
async fn cache_is_keyed_by_target() {
    let unit = StubUnit::ok(AnalyzerKey::Performance, score_data(90.0));
    let calls = unit.calls.clone();
    let registry = Registry {
        independent: vec![unit],
        dependent: vec![],
    };
    let (orchestrator, _, _) = orchestrator(registry, EngineConfig::default());

    orchestrator.run("example.com", &NullSink).await.unwrap();
    orchestrator.run("other.com", &NullSink).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_outcomes_are_not_cached() {
    let unit = StubUnit::failing(AnalyzerKey::Performance, "flaky upstream");
    let calls = unit.calls.clone();
    let registry = Registry {
        independent: vec![unit],
        dependent: vec![],
    };
    let (orchestrator, _, _) = orchestrator(registry, EngineConfig::default());

    orchestrator.run("example.com", &NullSink).await.unwrap();
    orchestrator.run("example.com", &NullSink).await.unwrap();
    assert_eq!(
        calls.load(Ordering::SeqCst),
        2,
        "failures must retry on the next run"
    );
}

#[tokio::test]
async fn dependent_units_receive_capped_peers() {
    let (registry, comparison, keywords) =
        full_registry(&["rival-one.com", "rival-two.io", "rival-three.net"]);
    let config = EngineConfig {
        max_competitors: 2,
        ..EngineConfig::default()
    };
    let (orchestrator, _, _) = orchestrator(registry, config);

    let audit = orchestrator.run("example.com", &NullSink).await.unwrap();

    assert_eq!(audit.status, AuditStatus::Completed);
    let seen = comparison.seen_peers.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &[vec!["rival-one.com".to_string(), "rival-two.io".to_string()]]
    );
    assert_eq!(keywords.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn no_discovered_competitors_marks_dependents_not_run() {
    let (registry, comparison, _) = full_registry(&[]);
    let (orchestrator, _, _) = orchestrator(registry, EngineConfig::default());

    let audit = orchestrator.run("example.com", &NullSink).await.unwrap();

    assert_eq!(audit.status, AuditStatus::Completed);
    assert_eq!(
        audit.results.get(AnalyzerKey::CompetitorComparison),
        Some(&AnalyzerOutcome::Err("not-run".to_string()))
    );
    assert_eq!(comparison.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn synthesis_error_marks_audit_failed() {
    let mut data = AnalyzerData::new();
    data.insert("score".to_string(), json!("fast"));
    let registry = Registry {
        independent: vec![StubUnit::ok(AnalyzerKey::Performance, data)],
        dependent: vec![],
    };
    let (orchestrator, store, _) = orchestrator(registry, EngineConfig::default());

    let result = orchestrator.run("example.com", &NullSink).await;

    assert!(matches!(result, Err(Error::Synthesis(_))));
    // The stored record ends up failed, terminally.
    let stored = store.get("audit-1").unwrap();
    assert_eq!(stored.status, AuditStatus::Failed);
}

#[tokio::test]
async fn classifier_failure_degrades_to_unknown() {
    let (registry, _, _) = full_registry(&[]);
    let store = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(
        Arc::new(registry),
        Arc::new(BrokenClassifier),
        store.clone(),
        Arc::new(ResultCache::new()),
        Arc::new(BenchmarkTable::builtin()),
        EngineConfig::default(),
    );

    let audit = orchestrator.run("example.com", &NullSink).await.unwrap();

    assert_eq!(audit.status, AuditStatus::Completed);
    assert_eq!(audit.industry, Industry::Unknown);
}

#[tokio::test]
async fn invalid_target_is_rejected_before_any_work() {
    let (registry, _, _) = full_registry(&[]);
    let (orchestrator, store, _) = orchestrator(registry, EngineConfig::default());

    let result = orchestrator.run("not a domain", &NullSink).await;

    assert!(result.is_err());
    assert!(store.get("audit-1").is_none());
}

#[tokio::test]
async fn issues_and_recommendations_are_rank_ordered() {
    // Low scores everywhere plus rule-triggering detail fields.
    let mut independent: Vec<Arc<dyn Analyzer>> = Vec::new();
    for key in AnalyzerKey::PHASE_ONE {
        let data = match key {
            AnalyzerKey::Security => {
                let mut d = score_data(20.0);
                d.insert("https".to_string(), json!(false));
                d
            }
            AnalyzerKey::Seo => {
                let mut d = score_data(30.0);
                d.insert("meta_description".to_string(), json!(false));
                d
            }
            AnalyzerKey::Competitors => domains_data(&[]),
            _ => score_data(25.0),
        };
        independent.push(StubUnit::ok(key, data));
    }
    let registry = Registry {
        independent,
        dependent: vec![],
    };
    let (orchestrator, _, _) = orchestrator(registry, EngineConfig::default());

    let audit = orchestrator.run("example.com", &NullSink).await.unwrap();

    assert!(!audit.issues.is_empty());
    assert!(!audit.recommendations.is_empty());
    for pair in audit.issues.windows(2) {
        assert!(pair[0].severity.rank() <= pair[1].severity.rank());
        assert!(pair[0].impact_score >= pair[1].impact_score);
    }
    for pair in audit.recommendations.windows(2) {
        assert!(pair[0].priority.rank() <= pair[1].priority.rank());
    }
}

#[tokio::test]
async fn outcomes_map_never_loses_registered_keys() {
    // Mix of fast, failing, and slow units under a tight budget.
    let mut independent: Vec<Arc<dyn Analyzer>> = Vec::new();
    let mut keys = AnalyzerKey::PHASE_ONE.into_iter();
    independent.push(StubUnit::ok(keys.next().unwrap(), score_data(70.0)));
    independent.push(StubUnit::failing(keys.next().unwrap(), "boom"));
    independent.push(StubUnit::slow(keys.next().unwrap(), Duration::from_secs(30)));
    let registry = Registry {
        independent,
        dependent: vec![],
    };
    let registered: BTreeMap<AnalyzerKey, ()> =
        registry.keys().into_iter().map(|k| (k, ())).collect();
    let config = EngineConfig {
        budget: Duration::from_millis(100),
        ..EngineConfig::default()
    };
    let (orchestrator, _, _) = orchestrator(registry, config);

    let audit = orchestrator.run("example.com", &NullSink).await.unwrap();

    assert_eq!(audit.status, AuditStatus::Partial);
    let result_keys: BTreeMap<AnalyzerKey, ()> =
        audit.results.iter().map(|(k, _)| (*k, ())).collect();
    assert_eq!(result_keys, registered);
}
