//! Hintcheck - Python type-annotation coverage checker.
//!
//! Hintcheck parses Python sources with tree-sitter, classifies every
//! function and method, runs a fixed set of annotation rules over each
//! one, and scores files by the share of functions with no blocking
//! diagnostic.
//!
//! # Architecture
//!
//! - `analysis`: syntax tree provider and function classifier
//! - `detect`: annotation rules and the per-file runner
//! - `score`: coverage, grades, and file/directory verdicts
//! - `discover`: candidate file discovery
//! - `config`: YAML configuration schema
//! - `report`: output formatting (pretty, JSON)

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod discover;
pub mod error;
pub mod report;
pub mod score;

pub use analysis::{classify, register_analyzers, FunctionRecord, LanguageAnalyzer, PythonAnalyzer};
pub use config::Config;
pub use detect::{check_function, Diagnostic, Rule, Runner, Severity};
pub use discover::{discover, Candidate, Discovery};
pub use error::{AnalysisError, ConfigError};
pub use score::{FileOutcome, FileResult, Grade, RunSummary, ScoringPolicy};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}
