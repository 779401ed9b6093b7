use crate::OutputFormat;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use osprey_analyzers::{IndustryClassifier, PageFetcher, registry};
use osprey_core::audit::{Audit, AuditStatus, MemoryStore};
use osprey_core::benchmarks::BenchmarkTable;
use osprey_core::cache::ResultCache;
use osprey_core::progress::ChannelSink;
use osprey_engine::{EngineConfig, Orchestrator, recommend};
use std::sync::Arc;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one audit and return the finished record.
pub async fn run_audit(domain: &str, timeout_secs: u64, no_cache: bool) -> Result<Audit> {
    let mut config = EngineConfig {
        budget: Duration::from_secs(timeout_secs),
        ..EngineConfig::default()
    };
    if no_cache {
        // Zero TTL expires entries on write, which disables reuse.
        config.cache_ttl = Duration::ZERO;
    }

    let fetcher = Arc::new(PageFetcher::new(FETCH_TIMEOUT)?);
    let orchestrator = Orchestrator::new(
        Arc::new(registry(Arc::clone(&fetcher), config.max_competitors)),
        Arc::new(IndustryClassifier::new(fetcher)),
        Arc::new(MemoryStore::new()),
        Arc::new(ResultCache::new()),
        Arc::new(BenchmarkTable::builtin()),
        config,
    );

    let (sink, mut rx) = ChannelSink::new();
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan/dim} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let bar_task = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            bar.set_position(update.percent as u64);
            bar.set_message(update.message);
        }
        bar
    });

    let outcome = orchestrator.run(domain, &sink).await;
    drop(sink);
    if let Ok(bar) = bar_task.await {
        bar.finish_and_clear();
    }

    Ok(outcome?)
}

pub async fn execute(
    domain: &str,
    timeout_secs: u64,
    no_cache: bool,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Auditing {}", domain);

    let audit = run_audit(domain, timeout_secs, no_cache).await?;

    match format {
        OutputFormat::Json => output_json(&audit)?,
        OutputFormat::Pretty => output_pretty(&audit),
    }

    Ok(())
}

fn output_pretty(audit: &Audit) {
    use console::style;

    println!("\n{}", style("Osprey Audit Report").bold().cyan());
    println!("{}", style("===================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Target:     {}", audit.target);
    println!("  Industry:   {}", audit.industry);
    println!("  Status:     {}", status_line(audit.status));
    println!(
        "  Analyzers:  {}/{} succeeded",
        audit.results.succeeded(),
        audit.results.len()
    );

    if !audit.scores.is_empty() {
        println!("\n{}", style("Scores:").bold());
        for (category, score) in &audit.scores {
            println!("  {:<22} {:>5.0}", category, score);
        }
    }

    if !audit.issues.is_empty() {
        println!("\n{}", style("Top Issues:").bold());
        for (i, issue) in audit.issues.iter().enumerate() {
            println!(
                "  {}. [{}] {} ({} vs {}, impact {:.0})",
                i + 1,
                issue.severity.label(),
                issue.title,
                issue.current,
                issue.target,
                issue.impact_score
            );
        }
    }

    if !audit.quick_wins.is_empty() {
        println!("\n{}", style("Quick Wins:").bold());
        for win in &audit.quick_wins {
            println!("  - {} ({})", win.action, win.effort);
        }
    }

    if !audit.recommendations.is_empty() {
        println!("\n{}", style("Recommendations:").bold());
        for rec in &audit.recommendations {
            println!(
                "  [{}] {}\n      {} ({})",
                rec.priority.label(),
                rec.issue,
                rec.action,
                rec.effort
            );
        }
        let wins = recommend::quick_wins(&audit.recommendations);
        if !wins.is_empty() {
            println!(
                "\n  {} of these are doable within a day.",
                style(wins.len()).bold()
            );
        }
    }

    println!();
}

fn status_line(status: AuditStatus) -> String {
    use console::style;

    match status {
        AuditStatus::Completed => style("completed").green().to_string(),
        AuditStatus::Partial => style("partial (deadline exceeded)").yellow().to_string(),
        AuditStatus::Failed => style("failed").red().to_string(),
        AuditStatus::Analyzing => style("analyzing").to_string(),
    }
}

fn output_json(audit: &Audit) -> Result<()> {
    let json = serde_json::to_string_pretty(audit)?;
    println!("{}", json);
    Ok(())
}
