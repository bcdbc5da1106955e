//! Detection runner: source → records → diagnostics → scores, per file.

use std::path::Path;

use rayon::prelude::*;

use crate::analysis::{classify, get_analyzer};
use crate::discover::{Candidate, Discovery};
use crate::error::AnalysisError;
use crate::score::{self, FileOutcome, RunSummary, ScoringPolicy};

use super::check_function;

/// Executes the annotation rules against a set of files.
pub struct Runner {
    policy: ScoringPolicy,
}

impl Runner {
    /// Create a new detection runner.
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Analyze in-memory source.
    ///
    /// `display` is the path shown in reports; its extension selects the
    /// analyzer.
    pub fn analyze_source(&self, display: &str, directory: &str, source: &[u8]) -> FileOutcome {
        let path = Path::new(display);
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let Some(analyzer) = get_analyzer(ext) else {
            return FileOutcome::unanalyzable(
                directory,
                AnalysisError::Grammar {
                    path: display.to_string(),
                    message: format!("no analyzer for extension {:?}", ext),
                },
            );
        };

        let parsed = match analyzer.parse(path, source) {
            Ok(parsed) => parsed,
            Err(e) => return FileOutcome::unanalyzable(directory, e),
        };

        let per_function: Vec<_> = classify(&parsed).iter().map(check_function).collect();
        log::debug!("{}: {} function(s)", display, per_function.len());

        FileOutcome::Analyzed(score::score_file(
            display,
            directory,
            &per_function,
            &self.policy,
        ))
    }

    /// Read and analyze one discovered file.
    pub fn analyze_candidate(&self, candidate: &Candidate) -> FileOutcome {
        match std::fs::read(&candidate.path) {
            Ok(source) => self.analyze_source(&candidate.display, &candidate.directory, &source),
            Err(e) => {
                log::debug!("{}: read failed: {}", candidate.display, e);
                FileOutcome::unanalyzable(
                    &candidate.directory,
                    AnalysisError::read(&candidate.display, &e),
                )
            }
        }
    }

    /// Analyze every discovered file.
    ///
    /// Files are processed in parallel; the summary is sorted by
    /// directory, then path, so output order does not depend on scheduling.
    pub fn run(&self, discovery: &Discovery) -> RunSummary {
        let outcomes: Vec<FileOutcome> = discovery
            .candidates
            .par_iter()
            .map(|c| self.analyze_candidate(c))
            .collect();

        RunSummary::build(outcomes, &discovery.directories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Rule;
    use crate::discover::Candidate;
    use tempfile::TempDir;

    fn runner() -> Runner {
        Runner::new(ScoringPolicy::default())
    }

    #[test]
    fn test_analyze_source_scores_file() {
        let outcome = runner().analyze_source(
            "pkg/mod.py",
            "pkg",
            b"def f(x): return 1\n\ndef g(y: int) -> int:\n    return y\n",
        );
        let result = outcome.result().expect("analyzed");
        assert_eq!(result.total_functions, 2);
        assert_eq!(result.annotated_functions, 1);
        assert_eq!(result.coverage_percent, 50.0);
        assert!(!result.passed);
        assert_eq!(result.diagnostics[0].rule, Rule::MissingArgAnnotation);
    }

    #[test]
    fn test_empty_file_is_fully_covered() {
        let outcome = runner().analyze_source("a.py", ".", b"");
        let result = outcome.result().expect("analyzed");
        assert_eq!(result.total_functions, 0);
        assert_eq!(result.coverage_percent, 100.0);
        assert!(result.passed);
    }

    #[test]
    fn test_syntax_error_is_unanalyzable() {
        let outcome = runner().analyze_source("bad.py", ".", b"def f(:\n    pass\n");
        assert!(outcome.result().is_none());
        let err = outcome.error().expect("error outcome");
        assert_eq!(err.kind(), "parse");
        assert_eq!(err.line(), Some(1));
        assert!(!outcome.passed());
    }

    #[test]
    fn test_python2_print_is_unanalyzable() {
        let source = b"def f() -> None:\n    print \"hello\"\n";
        let outcome = runner().analyze_source("py2.py", ".", source);
        assert!(outcome.result().is_none());
        let err = outcome.error().expect("error outcome");
        assert_eq!(err.kind(), "parse");
        assert_eq!(err.line(), Some(2));
        assert!(!outcome.passed());
    }

    #[test]
    fn test_run_isolates_failures_and_sorts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("ex0")).unwrap();
        std::fs::write(root.join("ex0/b.py"), "def ok() -> int:\n    return 1\n").unwrap();
        std::fs::write(root.join("ex0/a.py"), "def broken(:\n").unwrap();

        let discovery = Discovery {
            candidates: vec![
                Candidate {
                    path: root.join("ex0/b.py"),
                    display: "ex0/b.py".to_string(),
                    directory: "ex0".to_string(),
                },
                Candidate {
                    path: root.join("ex0/a.py"),
                    display: "ex0/a.py".to_string(),
                    directory: "ex0".to_string(),
                },
            ],
            directories: vec!["ex0".to_string()],
        };

        let summary = runner().run(&discovery);
        let paths: Vec<_> = summary.files.iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["ex0/a.py", "ex0/b.py"]);
        assert!(summary.files[0].error().is_some());
        assert!(summary.files[1].passed());
        assert_eq!(summary.directories[0].unanalyzable, 1);
        assert_eq!(summary.directories[0].passed, 1);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let candidate = Candidate {
            path: "/nonexistent/hintcheck/x.py".into(),
            display: "x.py".to_string(),
            directory: ".".to_string(),
        };
        let outcome = runner().analyze_candidate(&candidate);
        assert_eq!(outcome.error().map(|e| e.kind()), Some("read"));
    }

    #[test]
    fn test_idempotent() {
        let source = b"def f(x, y: List = None):\n    return 'a'\n\nclass C:\n    def m(self): return 1\n";
        let r = runner();
        let first = r.analyze_source("m.py", ".", source);
        let second = r.analyze_source("m.py", ".", source);
        assert_eq!(first, second);
    }
}
