//! Language-specific syntax tree providers.

mod python;

pub use python::PythonAnalyzer;

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Register all available language analyzers.
///
/// Idempotent; `get_analyzer` calls it on demand.
pub fn register_analyzers() {
    PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new);
}

/// Get an analyzer for the given file extension (without dot).
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    register_analyzers();

    match ext {
        "py" => PYTHON_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer),
        _ => None,
    }
}

/// Get all registered file extensions.
pub fn registered_extensions() -> Vec<&'static str> {
    register_analyzers();

    PYTHON_ANALYZER
        .get()
        .map(|a| a.file_extensions().to_vec())
        .unwrap_or_default()
}
