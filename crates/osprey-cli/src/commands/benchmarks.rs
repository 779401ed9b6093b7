use crate::OutputFormat;
use anyhow::{Result, bail};
use osprey_core::benchmarks::{BenchmarkTable, Industry};
use serde_json::json;

pub fn execute(industry: &str, format: OutputFormat) -> Result<()> {
    let Some(industry) = Industry::all()
        .into_iter()
        .find(|i| i.as_str() == industry.to_lowercase())
    else {
        let valid: Vec<_> = Industry::all().iter().map(|i| i.as_str()).collect();
        bail!(
            "unknown industry '{}' (expected one of: {})",
            industry,
            valid.join(", ")
        );
    };

    let table = BenchmarkTable::builtin();
    let rows = table.metrics_for(industry);

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = rows
                .iter()
                .map(|(metric, p)| {
                    json!({
                        "metric": metric,
                        "p25": p.p25,
                        "p50": p.p50,
                        "p75": p.p75,
                        "p90": p.p90,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "industry": industry.as_str(),
                    "benchmarks": rows,
                }))?
            );
        }
        OutputFormat::Pretty => {
            use console::style;

            println!(
                "\n{} {}",
                style("Benchmarks for").bold(),
                style(industry.as_str()).bold().cyan()
            );
            if rows.is_empty() {
                println!("  (no benchmark rows for this industry)");
            } else {
                println!("  {:<22} {:>6} {:>6} {:>6} {:>6}", "metric", "p25", "p50", "p75", "p90");
                for (metric, p) in rows {
                    println!(
                        "  {:<22} {:>6.0} {:>6.0} {:>6.0} {:>6.0}",
                        metric, p.p25, p.p50, p.p75, p.p90
                    );
                }
            }
            println!();
        }
    }

    Ok(())
}
