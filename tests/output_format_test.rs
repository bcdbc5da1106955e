//! Tests for the JSON output format.

use std::path::PathBuf;

use globset::GlobSet;
use hintcheck::detect::Runner;
use hintcheck::discover::discover;
use hintcheck::report::{self, JsonReport};
use hintcheck::score::ScoringPolicy;

fn project_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("project")
}

/// Run the fixture project and build the JSON document.
fn run_and_get_json() -> JsonReport {
    hintcheck::init();

    let targets = vec!["ex0".to_string(), "ex1".to_string(), "ex2".to_string()];
    let discovery = discover(&project_path(), &targets, &GlobSet::empty()).expect("discovery");
    let policy = ScoringPolicy::default();
    let summary = Runner::new(policy.clone()).run(&discovery);
    report::build_json("testdata/project", &policy, &summary)
}

#[test]
fn test_json_report_structure() {
    let report = run_and_get_json();
    assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(report.path, "testdata/project");
    assert_eq!(report.threshold, 100.0);
    assert!(!report.passed);
    assert_eq!(report.files_scanned, 5);
    assert_eq!(report.files_passed, 2);
    assert_eq!(report.directories.len(), 3);
}

#[test]
fn test_json_file_statuses() {
    let report = run_and_get_json();
    let statuses: Vec<_> = report
        .files
        .iter()
        .map(|f| (f.path.as_str(), f.status.as_str()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("ex0/clean.py", "passed"),
            ("ex0/models.py", "passed"),
            ("ex1/broken.py", "error"),
            ("ex1/partial.py", "failed"),
            ("ex1/pkg/literals.py", "failed"),
        ]
    );
}

#[test]
fn test_json_diagnostics_format() {
    let report = run_and_get_json();
    let partial = report
        .files
        .iter()
        .find(|f| f.path == "ex1/partial.py")
        .unwrap();

    assert_eq!(partial.grade.as_deref(), Some("C"));
    assert_eq!(partial.coverage, Some(60.0));

    for d in &partial.diagnostics {
        assert!(!d.message.is_empty());
        assert!(d.line > 0);
        assert!(d.severity == "error" || d.severity == "warning");
    }
    let raw = partial
        .diagnostics
        .iter()
        .find(|d| d.rule == "raw_generic")
        .unwrap();
    assert_eq!(raw.severity, "warning");
    assert_eq!(raw.function, "raw");
}

#[test]
fn test_json_error_entry() {
    let report = run_and_get_json();
    let broken = report
        .files
        .iter()
        .find(|f| f.path == "ex1/broken.py")
        .unwrap();
    let err = broken.error.as_ref().unwrap();
    assert_eq!(err.kind, "parse");
    assert!(err.message.starts_with("syntax error"));
    assert!(broken.grade.is_none());
}

#[test]
fn test_json_field_names() {
    let report = run_and_get_json();
    let json = serde_json::to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    for key in [
        "version",
        "path",
        "threshold",
        "passed",
        "files_scanned",
        "files_passed",
        "files",
        "directories",
    ] {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }

    let dir = &value["directories"][2];
    assert_eq!(dir["name"], "ex2");
    assert_eq!(dir["status"], "empty");
}

#[test]
fn test_json_round_trips() {
    let report = run_and_get_json();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: JsonReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.files.len(), report.files.len());
    assert_eq!(parsed.passed, report.passed);
}
