//! AST-backed function classification.
//!
//! This module turns Python source into [`FunctionRecord`]s, the facts the
//! rule engine consumes:
//! - Parameters in declaration order, with annotations and default kinds
//! - The return annotation as written
//! - The literal kinds of each direct `return` statement
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────────┐     ┌────────────┐     ┌────────────────┐
//! │ Source file │────▶│ PythonAnalyzer │────▶│ ParsedFile │────▶│ Classifier     │
//! └─────────────┘     │ (tree-sitter)  │     └────────────┘     │ FunctionRecord │
//!                     └────────────────┘                        └────────────────┘
//! ```
//!
//! Sources with syntax errors never reach the classifier; the analyzer
//! rejects them with [`crate::error::AnalysisError::Parse`].

mod classifier;
mod facts;
mod languages;
mod traits;

pub use classifier::{classify, Classifier, FunctionRecords};
pub use facts::{
    Annotation, FunctionRecord, LiteralKind, ParamKind, ParameterInfo, ReturnSite, ValueKind,
};
pub use languages::{get_analyzer, register_analyzers, registered_extensions, PythonAnalyzer};
pub use traits::{LanguageAnalyzer, ParsedFile};
