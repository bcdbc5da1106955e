//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Severity levels for diagnostics.
///
/// `Error` diagnostics are blocking: they stop a function from counting as
/// annotated. `Warning` diagnostics are style advice only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Whether this severity reduces annotation coverage.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule names, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rule {
    #[serde(rename = "missing_arg_annotation")]
    MissingArgAnnotation,
    #[serde(rename = "missing_return_annotation")]
    MissingReturnAnnotation,
    #[serde(rename = "none_default_not_optional")]
    NoneDefaultNotOptional,
    #[serde(rename = "raw_generic")]
    RawGeneric,
    #[serde(rename = "return_literal_mismatch")]
    ReturnLiteralMismatch,
}

impl Rule {
    /// All rules in the order the engine evaluates them.
    pub const ALL: [Rule; 5] = [
        Rule::MissingArgAnnotation,
        Rule::MissingReturnAnnotation,
        Rule::NoneDefaultNotOptional,
        Rule::RawGeneric,
        Rule::ReturnLiteralMismatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::MissingArgAnnotation => "missing_arg_annotation",
            Rule::MissingReturnAnnotation => "missing_return_annotation",
            Rule::NoneDefaultNotOptional => "none_default_not_optional",
            Rule::RawGeneric => "raw_generic",
            Rule::ReturnLiteralMismatch => "return_literal_mismatch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "missing_arg_annotation" => Some(Rule::MissingArgAnnotation),
            "missing_return_annotation" => Some(Rule::MissingReturnAnnotation),
            "none_default_not_optional" => Some(Rule::NoneDefaultNotOptional),
            "raw_generic" => Some(Rule::RawGeneric),
            "return_literal_mismatch" => Some(Rule::ReturnLiteralMismatch),
            _ => None,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Rule::RawGeneric => Severity::Warning,
            Rule::MissingArgAnnotation
            | Rule::MissingReturnAnnotation
            | Rule::NoneDefaultNotOptional
            | Rule::ReturnLiteralMismatch => Severity::Error,
        }
    }

    /// One-line description for listings and machine-readable reports.
    pub fn description(&self) -> &'static str {
        match self {
            Rule::MissingArgAnnotation => "parameter has no type annotation",
            Rule::MissingReturnAnnotation => "function returns a value but has no return annotation",
            Rule::NoneDefaultNotOptional => "parameter defaults to None but its type is not Optional",
            Rule::RawGeneric => "container type used without type parameters",
            Rule::ReturnLiteralMismatch => "returned literal contradicts the declared return type",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule: Rule,
    /// Name of the function the diagnostic belongs to.
    pub function: String,
    pub message: String,
    /// Line number (1-indexed).
    pub line: usize,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(rule: Rule, function: &str, line: usize, message: String) -> Self {
        Self {
            rule,
            function: function.to_string(),
            message,
            line,
            severity: rule.default_severity(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names_round_trip() {
        for rule in Rule::ALL {
            assert_eq!(Rule::parse(rule.as_str()), Some(rule));
        }
        assert_eq!(Rule::parse("no_such_rule"), None);
    }

    #[test]
    fn test_only_raw_generic_is_style() {
        let style: Vec<_> = Rule::ALL
            .iter()
            .filter(|r| !r.default_severity().is_blocking())
            .collect();
        assert_eq!(style, vec![&Rule::RawGeneric]);
    }

    #[test]
    fn test_rule_serializes_snake_case() {
        let json = serde_json::to_string(&Rule::NoneDefaultNotOptional).unwrap();
        assert_eq!(json, "\"none_default_not_optional\"");
    }
}
