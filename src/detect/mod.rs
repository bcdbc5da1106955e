//! Annotation rule engine.

mod annotations;
mod rules;
mod runner;
mod types;

pub use annotations::{is_optional, raw_generic_suggestion, scalar_type, ScalarType};
pub use rules::{check_function, RULES};
pub use runner::Runner;
pub use types::{Diagnostic, Rule, Severity};
