//! Output formatting for hintcheck results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output grouped by target directory
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::detect::{Diagnostic, Severity};
use crate::score::{DirectoryResult, DirectoryStatus, FileOutcome, Grade, RunSummary, ScoringPolicy};

const RULE_WIDTH: usize = 58;

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub threshold: f64,
    pub passed: bool,
    pub files_scanned: usize,
    pub files_passed: usize,
    pub files: Vec<JsonFile>,
    pub directories: Vec<JsonDirectory>,
}

/// One file entry. Unanalyzable files carry `error` instead of scores.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFile {
    pub path: String,
    pub directory: String,
    /// "passed", "failed" or "error".
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default)]
    pub total_functions: usize,
    #[serde(default)]
    pub annotated_functions: usize,
    #[serde(default)]
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule: String,
    pub severity: String,
    pub function: String,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    /// "parse", "read" or "grammar".
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDirectory {
    pub name: String,
    /// "ok", "fail" or "empty".
    pub status: String,
    pub files: usize,
    pub passed: usize,
    pub failed: usize,
    pub unanalyzable: usize,
}

fn diagnostic_to_json(d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        rule: d.rule.as_str().to_string(),
        severity: d.severity.to_string(),
        function: d.function.clone(),
        line: d.line,
        message: d.message.clone(),
    }
}

fn file_to_json(outcome: &FileOutcome) -> JsonFile {
    match outcome {
        FileOutcome::Analyzed(r) => JsonFile {
            path: r.path.clone(),
            directory: r.directory.clone(),
            status: if r.passed { "passed" } else { "failed" }.to_string(),
            coverage: Some(r.coverage_percent),
            grade: Some(r.grade.to_string()),
            total_functions: r.total_functions,
            annotated_functions: r.annotated_functions,
            diagnostics: r.diagnostics.iter().map(diagnostic_to_json).collect(),
            error: None,
        },
        FileOutcome::Unanalyzable { directory, error } => JsonFile {
            path: error.path().to_string(),
            directory: directory.clone(),
            status: "error".to_string(),
            coverage: None,
            grade: None,
            total_functions: 0,
            annotated_functions: 0,
            diagnostics: Vec::new(),
            error: Some(JsonError {
                kind: error.kind().to_string(),
                line: error.line(),
                message: error.detail(),
            }),
        },
    }
}

fn directory_to_json(d: &DirectoryResult) -> JsonDirectory {
    JsonDirectory {
        name: d.name.clone(),
        status: d.status.as_str().to_lowercase(),
        files: d.files,
        passed: d.passed,
        failed: d.failed,
        unanalyzable: d.unanalyzable,
    }
}

/// Build the JSON document for a run.
pub fn build_json(path: &str, policy: &ScoringPolicy, summary: &RunSummary) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        threshold: policy.pass_threshold,
        passed: summary.all_passed(),
        files_scanned: summary.total_files(),
        files_passed: summary.passed_files(),
        files: summary.files.iter().map(file_to_json).collect(),
        directories: summary.directories.iter().map(directory_to_json).collect(),
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, policy: &ScoringPolicy, summary: &RunSummary) -> anyhow::Result<()> {
    let report = build_json(path, policy, summary);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, policy: &ScoringPolicy, summary: &RunSummary, verbose: bool) {
    print!("{}", "HINTCHECK".blue().bold());
    println!("{}", format!(" v{} (annotation coverage)", env!("CARGO_PKG_VERSION")).dimmed());
    println!(
        "{}",
        format!("Scanning: {}  Threshold: {}%", path, policy.pass_threshold).dimmed()
    );
    write_rule();

    for dir in &summary.directories {
        write_directory_header(dir);
        for outcome in summary.files.iter().filter(|f| f.directory() == dir.name) {
            write_file(outcome, verbose);
        }
    }

    write_rule();
    write_directory_summary(&summary.directories);
    write_rule();
    write_final_status(summary, verbose);
}

fn write_rule() {
    println!("{}", "-".repeat(RULE_WIDTH).dimmed());
}

fn write_directory_header(dir: &DirectoryResult) {
    let header = dir.name.bold();
    if dir.status == DirectoryStatus::Empty {
        println!("{}  {}", header, "! no .py files found".yellow());
    } else {
        println!("{}  {}", header, format!("{} file(s)", dir.files).dimmed());
    }
}

fn colored_grade(grade: Grade) -> ColoredString {
    let s = grade.as_str();
    match grade {
        Grade::S => s.green().bold(),
        Grade::A => s.green(),
        Grade::B => s.yellow(),
        Grade::C => s.yellow().bold(),
        Grade::D | Grade::F => s.red(),
    }
}

fn write_file(outcome: &FileOutcome, verbose: bool) {
    match outcome {
        FileOutcome::Analyzed(r) => {
            let mark = if r.passed { "✓".green() } else { "✗".red() };
            print!(
                "  {} {}  {:.1}%  {}",
                mark,
                r.path,
                r.coverage_percent,
                colored_grade(r.grade)
            );
            if !verbose && !r.diagnostics.is_empty() {
                print!("  {}", format!("({} issue(s))", r.diagnostics.len()).dimmed());
            }
            println!();
            if verbose {
                write_diagnostics(&r.diagnostics);
            }
        }
        FileOutcome::Unanalyzable { error, .. } => {
            println!(
                "  {} {}  {}",
                "✗".red(),
                error.path(),
                format!("could not analyze: {}", error.detail()).red()
            );
        }
    }
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        let bullet = match d.severity {
            Severity::Error => "-".red(),
            Severity::Warning => "~".yellow(),
        };
        println!(
            "     {} {} {} {}",
            bullet,
            format!("line {}:", d.line).dimmed(),
            format!("[{}]", d.rule).dimmed(),
            d.message
        );
    }
}

fn write_directory_summary(directories: &[DirectoryResult]) {
    println!("{}", "Summary".bold());
    let width = directories.iter().map(|d| d.name.len()).max().unwrap_or(3);

    for dir in directories {
        let status = match dir.status {
            DirectoryStatus::Ok => "OK".green(),
            DirectoryStatus::Fail => "FAIL".red(),
            DirectoryStatus::Empty => "EMPTY".yellow(),
        };
        println!(
            "  {:<width$}  {}  {}",
            dir.name,
            status,
            format!("{}/{} passed", dir.passed, dir.files).dimmed(),
            width = width
        );
    }
}

fn write_final_status(summary: &RunSummary, verbose: bool) {
    if summary.all_passed() {
        println!(
            "{}  {}",
            "✓ ALL GOOD".green().bold(),
            format!("({}/{} files)", summary.passed_files(), summary.total_files()).dimmed()
        );
        return;
    }

    println!(
        "{}  {}",
        "✗ FAILED".red().bold(),
        format!("({}/{} files)", summary.failed_files(), summary.total_files()).dimmed()
    );
    if !verbose {
        println!(
            "{}",
            "Tip: run with --verbose to see exact issues per file.".dimmed()
        );
    }
}
