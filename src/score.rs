//! Scoring and grading system for hintcheck.
//!
//! Turns per-function diagnostics into an annotation coverage percentage
//! and letter grade per file, then reduces files into directory verdicts
//! and one run-wide verdict.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::detect::{Diagnostic, Rule};
use crate::error::AnalysisError;

/// Pass threshold in strict mode: every function must be annotated.
pub const DEFAULT_STRICT_THRESHOLD: f64 = 100.0;

/// Pass threshold in lenient mode when none is configured.
pub const DEFAULT_LENIENT_THRESHOLD: f64 = 85.0;

/// Grade thresholds (inclusive lower bounds on coverage percent).
pub mod grades {
    pub const S_MIN: f64 = 95.0;
    pub const A_MIN: f64 = 85.0;
    pub const B_MIN: f64 = 70.0;
    pub const C_MIN: f64 = 50.0;
    pub const D_MIN: f64 = 30.0;
}

/// Letter grade for a coverage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// Higher is better.
    pub fn rank(&self) -> u8 {
        match self {
            Grade::S => 5,
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::D => 1,
            Grade::F => 0,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Determine the letter grade from a coverage percentage.
pub fn calculate_grade(coverage: f64) -> Grade {
    match coverage {
        c if c >= grades::S_MIN => Grade::S,
        c if c >= grades::A_MIN => Grade::A,
        c if c >= grades::B_MIN => Grade::B,
        c if c >= grades::C_MIN => Grade::C,
        c if c >= grades::D_MIN => Grade::D,
        _ => Grade::F,
    }
}

/// Coverage percentage; an empty file is vacuously fully covered.
pub fn coverage_percent(total_functions: usize, annotated_functions: usize) -> f64 {
    if total_functions == 0 {
        return 100.0;
    }
    annotated_functions as f64 / total_functions as f64 * 100.0
}

/// How a file's coverage becomes a pass/fail verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    /// Minimum coverage percent to pass.
    pub pass_threshold: f64,
    /// Blocking rules that fail a file on any occurrence, regardless of coverage.
    pub zero_tolerance: BTreeSet<Rule>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_STRICT_THRESHOLD,
            zero_tolerance: BTreeSet::new(),
        }
    }
}

/// The scored result for one analyzed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    /// Top-level target directory the file belongs to ("." for the root).
    pub directory: String,
    /// Ordered by line; rule order is kept within a line.
    pub diagnostics: Vec<Diagnostic>,
    pub total_functions: usize,
    /// Functions with zero blocking diagnostics.
    pub annotated_functions: usize,
    pub coverage_percent: f64,
    pub grade: Grade,
    pub passed: bool,
}

impl FileResult {
    pub fn blocking_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_blocking()).count()
    }

    pub fn style_count(&self) -> usize {
        self.diagnostics.len() - self.blocking_count()
    }
}

/// Score one file from the diagnostics of each of its functions.
pub fn score_file(
    path: &str,
    directory: &str,
    per_function: &[Vec<Diagnostic>],
    policy: &ScoringPolicy,
) -> FileResult {
    let total_functions = per_function.len();
    let annotated_functions = per_function
        .iter()
        .filter(|diags| !diags.iter().any(|d| d.is_blocking()))
        .count();

    let mut diagnostics: Vec<Diagnostic> = per_function.iter().flatten().cloned().collect();
    diagnostics.sort_by_key(|d| d.line);

    let coverage = coverage_percent(total_functions, annotated_functions);
    let zero_tolerance_hit = diagnostics
        .iter()
        .any(|d| d.is_blocking() && policy.zero_tolerance.contains(&d.rule));

    FileResult {
        path: path.to_string(),
        directory: directory.to_string(),
        diagnostics,
        total_functions,
        annotated_functions,
        coverage_percent: coverage,
        grade: calculate_grade(coverage),
        passed: coverage >= policy.pass_threshold && !zero_tolerance_hit,
    }
}

/// What happened to one candidate file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Analyzed(FileResult),
    /// Could not be parsed or read; excluded from coverage math.
    Unanalyzable {
        directory: String,
        error: AnalysisError,
    },
}

impl FileOutcome {
    pub fn unanalyzable(directory: &str, error: AnalysisError) -> Self {
        FileOutcome::Unanalyzable {
            directory: directory.to_string(),
            error,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            FileOutcome::Analyzed(r) => &r.path,
            FileOutcome::Unanalyzable { error, .. } => error.path(),
        }
    }

    pub fn directory(&self) -> &str {
        match self {
            FileOutcome::Analyzed(r) => &r.directory,
            FileOutcome::Unanalyzable { directory, .. } => directory,
        }
    }

    /// Unanalyzable files never pass.
    pub fn passed(&self) -> bool {
        match self {
            FileOutcome::Analyzed(r) => r.passed,
            FileOutcome::Unanalyzable { .. } => false,
        }
    }

    pub fn result(&self) -> Option<&FileResult> {
        match self {
            FileOutcome::Analyzed(r) => Some(r),
            FileOutcome::Unanalyzable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            FileOutcome::Analyzed(_) => None,
            FileOutcome::Unanalyzable { error, .. } => Some(error),
        }
    }
}

/// Directory verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryStatus {
    Ok,
    Fail,
    /// No candidate files; does not fail the run.
    Empty,
}

impl DirectoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectoryStatus::Ok => "OK",
            DirectoryStatus::Fail => "FAIL",
            DirectoryStatus::Empty => "EMPTY",
        }
    }
}

/// Counts over the files of one top-level target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryResult {
    pub name: String,
    pub files: usize,
    pub passed: usize,
    pub failed: usize,
    pub unanalyzable: usize,
    pub status: DirectoryStatus,
}

impl DirectoryResult {
    pub fn passed(&self) -> bool {
        self.status != DirectoryStatus::Fail
    }
}

/// Running counts for one directory while folding outcomes.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    passed: usize,
    failed: usize,
    unanalyzable: usize,
}

impl Tally {
    fn absorb(mut self, outcome: &FileOutcome) -> Self {
        match outcome {
            FileOutcome::Analyzed(r) if r.passed => self.passed += 1,
            FileOutcome::Analyzed(_) => self.failed += 1,
            FileOutcome::Unanalyzable { .. } => self.unanalyzable += 1,
        }
        self
    }

    fn finish(self, name: String) -> DirectoryResult {
        let files = self.passed + self.failed + self.unanalyzable;
        let status = if files == 0 {
            DirectoryStatus::Empty
        } else if self.failed + self.unanalyzable == 0 {
            DirectoryStatus::Ok
        } else {
            DirectoryStatus::Fail
        };
        DirectoryResult {
            name,
            files,
            passed: self.passed,
            failed: self.failed,
            unanalyzable: self.unanalyzable,
            status,
        }
    }
}

/// Everything a run produced, in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Sorted by directory, then path.
    pub files: Vec<FileOutcome>,
    /// Declared directories first, in declared order, then any others sorted.
    pub directories: Vec<DirectoryResult>,
}

impl RunSummary {
    /// Reduce file outcomes into directory results.
    pub fn build(mut files: Vec<FileOutcome>, declared_directories: &[String]) -> Self {
        files.sort_by(|a, b| {
            (a.directory(), a.path()).cmp(&(b.directory(), b.path()))
        });

        let tallies: BTreeMap<&str, Tally> =
            files.iter().fold(BTreeMap::new(), |mut acc, outcome| {
                let tally = acc.entry(outcome.directory()).or_insert_with(Tally::default);
                *tally = tally.absorb(outcome);
                acc
            });

        let mut directories: Vec<DirectoryResult> = declared_directories
            .iter()
            .map(|name| {
                tallies
                    .get(name.as_str())
                    .copied()
                    .unwrap_or_default()
                    .finish(name.clone())
            })
            .collect();

        for (name, tally) in &tallies {
            if !declared_directories.iter().any(|d| d == name) {
                directories.push(tally.finish(name.to_string()));
            }
        }

        Self { files, directories }
    }

    pub fn all_passed(&self) -> bool {
        self.files.iter().all(FileOutcome::passed)
            && self.directories.iter().all(DirectoryResult::passed)
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn passed_files(&self) -> usize {
        self.files.iter().filter(|f| f.passed()).count()
    }

    /// Failed plus unanalyzable files.
    pub fn failed_files(&self) -> usize {
        self.total_files() - self.passed_files()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Severity;

    fn diag(rule: Rule) -> Diagnostic {
        Diagnostic::new(rule, "f", 1, "test".to_string())
    }

    fn analyzed(dir: &str, path: &str, passed: bool) -> FileOutcome {
        let per_function = if passed {
            vec![vec![]]
        } else {
            vec![vec![diag(Rule::MissingArgAnnotation)]]
        };
        FileOutcome::Analyzed(score_file(path, dir, &per_function, &ScoringPolicy::default()))
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(calculate_grade(100.0), Grade::S);
        assert_eq!(calculate_grade(95.0), Grade::S);
        assert_eq!(calculate_grade(94.9), Grade::A);
        assert_eq!(calculate_grade(85.0), Grade::A);
        assert_eq!(calculate_grade(84.99), Grade::B);
        assert_eq!(calculate_grade(70.0), Grade::B);
        assert_eq!(calculate_grade(50.0), Grade::C);
        assert_eq!(calculate_grade(49.0), Grade::D);
        assert_eq!(calculate_grade(30.0), Grade::D);
        assert_eq!(calculate_grade(29.9), Grade::F);
        assert_eq!(calculate_grade(0.0), Grade::F);
    }

    #[test]
    fn test_grade_monotonic() {
        let mut previous = calculate_grade(0.0);
        for step in 0..=1000 {
            let grade = calculate_grade(step as f64 / 10.0);
            assert!(grade.rank() >= previous.rank(), "grade dropped at {}", step);
            previous = grade;
        }
    }

    #[test]
    fn test_coverage_percent() {
        assert_eq!(coverage_percent(0, 0), 100.0);
        assert_eq!(coverage_percent(4, 3), 75.0);
        assert_eq!(coverage_percent(3, 3), 100.0);
        assert_eq!(coverage_percent(2, 0), 0.0);
    }

    #[test]
    fn test_style_does_not_reduce_coverage() {
        let per_function = vec![vec![diag(Rule::RawGeneric)]];
        let result = score_file("a.py", ".", &per_function, &ScoringPolicy::default());
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
        assert_eq!(result.annotated_functions, 1);
        assert_eq!(result.coverage_percent, 100.0);
        assert_eq!(result.style_count(), 1);
        assert!(result.passed);
    }

    #[test]
    fn test_blocking_reduces_coverage() {
        let per_function = vec![
            vec![diag(Rule::MissingArgAnnotation), diag(Rule::MissingReturnAnnotation)],
            vec![],
        ];
        let result = score_file("a.py", ".", &per_function, &ScoringPolicy::default());
        assert_eq!(result.total_functions, 2);
        assert_eq!(result.annotated_functions, 1);
        assert_eq!(result.coverage_percent, 50.0);
        assert_eq!(result.grade, Grade::C);
        assert_eq!(result.blocking_count(), 2);
        assert!(!result.passed);
    }

    #[test]
    fn test_empty_file_passes() {
        let result = score_file("a.py", ".", &[], &ScoringPolicy::default());
        assert_eq!(result.coverage_percent, 100.0);
        assert_eq!(result.grade, Grade::S);
        assert!(result.passed);
    }

    #[test]
    fn test_lenient_threshold() {
        let mut per_function = vec![vec![]; 9];
        per_function.push(vec![diag(Rule::MissingArgAnnotation)]);
        let policy = ScoringPolicy {
            pass_threshold: DEFAULT_LENIENT_THRESHOLD,
            ..Default::default()
        };
        let result = score_file("a.py", ".", &per_function, &policy);
        assert_eq!(result.coverage_percent, 90.0);
        assert!(result.passed);
    }

    #[test]
    fn test_zero_tolerance_fails_despite_coverage() {
        let mut per_function = vec![vec![]; 9];
        per_function.push(vec![diag(Rule::ReturnLiteralMismatch)]);
        let policy = ScoringPolicy {
            pass_threshold: 50.0,
            zero_tolerance: [Rule::ReturnLiteralMismatch].into_iter().collect(),
        };
        let result = score_file("a.py", ".", &per_function, &policy);
        assert_eq!(result.coverage_percent, 90.0);
        assert!(!result.passed);
    }

    #[test]
    fn test_diagnostics_sorted_by_line() {
        let mut late = diag(Rule::MissingArgAnnotation);
        late.line = 9;
        let mut early = diag(Rule::MissingReturnAnnotation);
        early.line = 2;
        let result = score_file("a.py", ".", &[vec![late], vec![early]], &ScoringPolicy::default());
        let lines: Vec<_> = result.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![2, 9]);
    }

    #[test]
    fn test_directory_reduction() {
        let files = vec![
            analyzed("ex1", "ex1/b.py", false),
            analyzed("ex0", "ex0/a.py", true),
            FileOutcome::unanalyzable("ex1", AnalysisError::parse("ex1/c.py", 3, "bad")),
            analyzed("ex1", "ex1/a.py", true),
        ];
        let declared = vec!["ex0".to_string(), "ex1".to_string(), "ex2".to_string()];
        let summary = RunSummary::build(files, &declared);

        let paths: Vec<_> = summary.files.iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["ex0/a.py", "ex1/a.py", "ex1/b.py", "ex1/c.py"]);

        let ex0 = &summary.directories[0];
        assert_eq!((ex0.files, ex0.passed, ex0.status), (1, 1, DirectoryStatus::Ok));

        let ex1 = &summary.directories[1];
        assert_eq!(ex1.files, 3);
        assert_eq!((ex1.passed, ex1.failed, ex1.unanalyzable), (1, 1, 1));
        assert_eq!(ex1.status, DirectoryStatus::Fail);

        let ex2 = &summary.directories[2];
        assert_eq!(ex2.status, DirectoryStatus::Empty);
        assert!(ex2.passed());

        assert!(!summary.all_passed());
        assert_eq!(summary.passed_files(), 2);
        assert_eq!(summary.failed_files(), 2);
    }

    #[test]
    fn test_undeclared_directories_appended() {
        let files = vec![analyzed("zeta", "zeta/a.py", true), analyzed(".", "top.py", true)];
        let summary = RunSummary::build(files, &[]);
        let names: Vec<_> = summary.directories.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![".", "zeta"]);
        assert!(summary.all_passed());
    }

    #[test]
    fn test_empty_run_passes() {
        let summary = RunSummary::build(vec![], &[]);
        assert!(summary.all_passed());
        assert_eq!(summary.total_files(), 0);
    }
}
