//! Core traits for syntax tree providers.

use std::path::Path;

use crate::error::AnalysisError;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Only ever constructed for source that parsed cleanly; files with syntax
/// errors are rejected by the provider before a `ParsedFile` exists.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// Source bytes, kept for node text extraction.
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Language-specific syntax tree provider.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser per
/// call. Analyzers themselves are shared across rayon workers.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a syntax tree.
    ///
    /// Any syntax error in the source is reported as
    /// [`AnalysisError::Parse`] with the line of the first offending node.
    fn parse(&self, path: &Path, source: &[u8]) -> Result<ParsedFile, AnalysisError>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
