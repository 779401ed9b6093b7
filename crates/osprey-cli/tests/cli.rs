use assert_cmd::Command;
use predicates::prelude::*;

fn osprey() -> Command {
    Command::cargo_bin("osprey").expect("binary should build")
}

#[test]
fn test_no_arguments_shows_usage() {
    osprey()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_audit_requires_a_domain() {
    osprey()
        .arg("audit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOMAIN"));
}

#[test]
fn test_audit_rejects_invalid_domain_before_any_network_work() {
    osprey()
        .args(["audit", "not a domain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid target"));
}

#[test]
fn test_benchmarks_lists_rows_for_known_industry() {
    osprey()
        .args(["benchmarks", "saas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page-speed"))
        .stdout(predicate::str::contains("p50"));
}

#[test]
fn test_benchmarks_unknown_industry_fails_with_hint() {
    osprey()
        .args(["benchmarks", "astrology"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown industry"))
        .stderr(predicate::str::contains("ecommerce"));
}

#[test]
fn test_benchmarks_json_output_parses() {
    let output = osprey()
        .args(["benchmarks", "ecommerce", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout should be valid JSON");
    assert_eq!(parsed["industry"], "ecommerce");
    assert!(parsed["benchmarks"].as_array().is_some_and(|b| !b.is_empty()));
}

#[test]
fn test_unknown_industry_has_sparse_benchmarks() {
    // The unknown industry intentionally carries no threshold rows.
    let output = osprey()
        .args(["benchmarks", "unknown", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(parsed["benchmarks"].as_array().is_some_and(|b| b.is_empty()));
}

#[test]
fn test_completion_generates_a_script() {
    osprey()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("osprey"));
}
